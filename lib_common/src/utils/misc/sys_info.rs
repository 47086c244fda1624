use std::path::PathBuf;
use std::{env, fmt};

use serde::{Deserialize, Serialize};

use hostname::get;

use thiserror::Error;

#[derive(Debug, Error)]
/// # Process Info Error
///
/// Defines custom error types that can occur during the retrieval of process
/// and system information.
pub enum ProcessInfoError {
    /// An I/O error occurred, typically when accessing the file system.
    #[error("I/O error occurred: {0}")]
    IoError(#[from] std::io::Error),

    /// A path component could not be converted to valid UTF-8.
    #[error("Path is not valid UTF-8: {0}")]
    PathError(String),

    /// An error occurred while accessing environment variables.
    #[error("Environment variable error: {0}")]
    VarError(#[from] env::VarError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// # Process Information
///
/// Holds various pieces of information about the current running process and its environment.
pub struct ProcessInfo {
    /// The full path to the current executable.
    pub process_current_exe: String,
    /// The base name of the executable (filename without extension).
    pub process_basename: String,
    /// The directory where the executable is located.
    pub process_location: String,
    /// The process ID (PID) of the current process.
    pub process_pid: i64,
    /// The hostname of the machine running the process.
    pub process_host: String,
}

impl fmt::Display for ProcessInfo {
    /// Formats the `ProcessInfo` for display, presenting its various fields
    /// in a human-readable, structured manner.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ProcessInfo
    Current exe: {},
    Basename: {},
    Location: {},
    Pid: {},
    Host: {}
",
            self.process_current_exe,
            self.process_basename,
            self.process_location,
            self.process_pid,
            self.process_host,
        )
    }
}

/// # Get Process Information
///
/// Collects and returns information about the current running process.
///
/// # Returns
/// A `Result<ProcessInfo, ProcessInfoError>` containing a `ProcessInfo` struct
/// on success, or an error if any piece of information cannot be retrieved.
pub fn get_process_info() -> Result<ProcessInfo, ProcessInfoError> {
    let current_exec: PathBuf = env::current_exe()?;
    let basename: String = process_basename(&current_exec)?;
    let location: String = process_location(&current_exec)?;
    let pid: i64 = std::process::id() as i64;
    let host: String = process_host();

    Ok(ProcessInfo {
        process_current_exe: current_exec.to_string_lossy().into_owned(),
        process_basename: basename,
        process_location: location,
        process_pid: pid,
        process_host: host,
    })
}

/// Extracts the base name of the executable (filename without extension).
fn process_basename(exe_path: &PathBuf) -> Result<String, ProcessInfoError> {
    exe_path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .map(|stem| stem.to_string())
        .ok_or_else(|| ProcessInfoError::PathError(exe_path.to_string_lossy().into_owned()))
}

/// Determines the directory the executable runs from.
fn process_location(exe_path: &PathBuf) -> Result<String, ProcessInfoError> {
    exe_path
        .parent()
        .map(|dir| dir.to_string_lossy().into_owned())
        .ok_or_else(|| ProcessInfoError::PathError(exe_path.to_string_lossy().into_owned()))
}

/// Retrieves the hostname, falling back to "unknown" if unavailable.
fn process_host() -> String {
    get()
        .ok()
        .and_then(|name| name.into_string().ok())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn process_info_is_populated() {
        let info = get_process_info().expect("process info");
        assert!(info.process_pid > 0);
        assert!(!info.process_basename.is_empty());
        assert!(!info.process_host.is_empty());
    }
}
