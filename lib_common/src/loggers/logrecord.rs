use chrono::{DateTime, Utc};
use serde_derive::Deserialize;
use serde_derive::Serialize;
use serde_json::Value;
use static_init::dynamic;

use crate::utils::misc::sys_info::{get_process_info, ProcessInfo, ProcessInfoError};
use crate::utils::misc::utils::current_datetime_rfc9557;

#[dynamic]
/// Statically initialized `ProcessInfo` instance, providing details about the current process.
pub static PROCESSINFO: Result<ProcessInfo, ProcessInfoError> = get_process_info();

/// # Logrecord
///
/// Represents one structured log entry as emitted by `LoggerLocal`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Logrecord {
    /// Timestamp (UTC) when the log record was created.
    pub ts: Option<DateTime<Utc>>,
    /// The severity level of the log (0 Silly up to 6 Fatal).
    pub loglevel: i64,
    /// Details about the message content.
    pub message: Message,
    /// Information about the application generating the log.
    pub app: App,
    /// Information about the host where the log originated.
    pub host: Host,
    /// Flexible JSON value for arbitrary tags or additional metadata.
    pub tags: Value,
    /// RFC 9557 formatted timestamp string.
    pub rfc9557: String,
}

impl Default for Logrecord {
    /// Creates a default `Logrecord` instance with predefined or empty values.
    ///
    /// Initializes `rfc9557` with the current UTC datetime in RFC 9557 format.
    fn default() -> Self {
        let rfc9557: String = current_datetime_rfc9557();

        Self {
            ts: None,
            loglevel: 0,
            message: Message::default(),
            app: App::default(),
            host: Host::default(),
            tags: serde_json::json!([]),
            rfc9557,
        }
    }
}

/// # Message
///
/// Represents the textual content of a log entry, including its language.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// The language of the message (e.g., "en" for English).
    pub lang: String,
    /// The actual text content of the message.
    pub text: String,
}

impl Default for Message {
    fn default() -> Self {
        Self {
            text: "".to_string(),
            lang: "en".to_string(),
        }
    }
}

/// # App
///
/// Contains information about the application that generated the log entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct App {
    /// The process ID (PID) of the application.
    pub pid: i64,
    /// The name of the application.
    pub name: String,
    /// The directory the executable runs from.
    pub location: String,
}

impl Default for App {
    /// Populates the fields from the statically captured process info.
    fn default() -> Self {
        match PROCESSINFO.as_ref() {
            Ok(info) => Self {
                pid: info.process_pid,
                name: info.process_basename.clone(),
                location: info.process_location.clone(),
            },
            Err(_) => Self {
                pid: 0,
                name: "".to_string(),
                location: "".to_string(),
            },
        }
    }
}

/// # Host
///
/// Contains information about the machine that generated the log entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Host {
    /// The hostname of the machine running the process.
    pub name: String,
}

impl Default for Host {
    fn default() -> Self {
        match PROCESSINFO.as_ref() {
            Ok(info) => Self {
                name: info.process_host.clone(),
            },
            Err(_) => Self {
                name: "".to_string(),
            },
        }
    }
}
