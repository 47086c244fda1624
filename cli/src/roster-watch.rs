//! # Roster Watch
//!
//! Terminal watcher for the event roster displays. Mounts one synchronization
//! instance for the guest book and one for the principal sponsors, renders
//! every state transition, and wires the keyboard to the refresh trigger and
//! the per-instance retry affordances:
//!
//! - `r` + Enter publishes a refresh signal (what the RSVP form does after a
//!   successful submission),
//! - `g` / `s` + Enter retries the guests / sponsors instance,
//! - `q` + Enter quits and unmounts both instances.

use clap::Parser;
use colored::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use lib_common::loggers::loggerlocal::{LoggerLocal, LoggerLocalOptions};
use lib_common::retrieve::api_client::ApiClient;
use lib_common::roster::guestbook::{GuestBookShaper, GuestBookView};
use lib_common::roster::service::RosterService;
use lib_common::roster::sponsors::{SponsorShaper, SponsorView};
use lib_common::sync::instance::SETTLE_DELAY_MS;
use lib_common::sync::{RefreshTrigger, SyncHandle, SyncOptions, SyncState};
use lib_common::utils::misc::utils::truncate_ellipsis;

use tokio::io::AsyncBufReadExt;

#[derive(Parser, Deserialize, Serialize, Debug, Clone, Default)]
#[clap(about = "Terminal watcher for the event roster displays", version)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[clap(long, env = "ROSTER_BASE_URL", help = "Base URL of the roster upstream.")]
    pub base_url: Option<String>,

    #[clap(long, env = "ROSTER_CONFIG_PATH", help = "Path to the JSON configuration file.")]
    pub config_path: Option<PathBuf>,

    #[clap(long, env = "ROSTER_GUESTS_PATH", help = "Relative path of the guest book endpoint.")]
    pub guests_path: Option<String>,

    #[clap(long, env = "ROSTER_SPONSORS_PATH", help = "Relative path of the principal sponsors endpoint.")]
    pub sponsors_path: Option<String>,

    #[clap(long, env = "ROSTER_SETTLE_DELAY_MS", help = "Delay in milliseconds between a refresh signal and the re-fetch.")]
    pub settle_delay_ms: Option<u64>,

    #[clap(long, env = "ROSTER_REQUEST_TIMEOUT_SECONDS", help = "Per-request timeout in seconds.")]
    pub request_timeout_seconds: Option<u64>,

    #[clap(long, env = "ROSTER_POLL_SECONDS", help = "Optional interval in seconds for automatic refresh publishing.")]
    pub poll_seconds: Option<u64>,

    #[clap(long, env = "ROSTER_LOG_DIR", help = "Directory for log files.")]
    pub log_dir: Option<PathBuf>,
}

impl Config {
    // Merge two Config structs, where 'other' overrides 'self' for Some values
    fn merge(self, other: Config) -> Config {
        Config {
            base_url: other.base_url.or(self.base_url),
            config_path: other.config_path.or(self.config_path),
            guests_path: other.guests_path.or(self.guests_path),
            sponsors_path: other.sponsors_path.or(self.sponsors_path),
            settle_delay_ms: other.settle_delay_ms.or(self.settle_delay_ms),
            request_timeout_seconds: other.request_timeout_seconds.or(self.request_timeout_seconds),
            poll_seconds: other.poll_seconds.or(self.poll_seconds),
            log_dir: other.log_dir.or(self.log_dir),
        }
    }
}

pub fn load_config() -> Config {
    // 1. Load defaults
    let default_config = Config {
        base_url: Some("http://127.0.0.1:3000/".to_string()),
        guests_path: Some("api/guests".to_string()),
        sponsors_path: Some("api/principal-sponsor".to_string()),
        settle_delay_ms: Some(SETTLE_DELAY_MS),
        request_timeout_seconds: Some(10),
        log_dir: Some(PathBuf::from("./logs")),
        ..Default::default()
    };

    // 2. Load from config file (roster-watch.conf) if present.
    //    Allow overriding the default config file path with a CLI arg.
    let cli_args_for_path = Config::parse();

    let config_file_path = cli_args_for_path
        .config_path
        .clone()
        .unwrap_or_else(|| PathBuf::from("roster-watch.conf"));

    let mut current_config = default_config;

    if config_file_path.exists() {
        if let Ok(config_str) = fs::read_to_string(&config_file_path) {
            if let Ok(file_config) = serde_json::from_str::<Config>(&config_str) {
                current_config = current_config.merge(file_config);
            } else {
                log::warn!(
                    "Failed to parse config file: {}. Falling back to other sources.",
                    config_file_path.display()
                );
            }
        } else {
            log::warn!(
                "Failed to read config file: {}. Falling back to other sources.",
                config_file_path.display()
            );
        }
    }

    // 3. Override with environment variables and CLI arguments.
    //    clap::Parser handles env vars and CLI args in one pass.
    current_config.merge(cli_args_for_path)
}

fn render_guests(state: &SyncState<GuestBookView>) {
    println!();
    println!("{}", "== Book of Guests ==".bright_magenta().bold());
    match state {
        SyncState::Idle | SyncState::Loading => {
            println!("{}", "Loading guests...".truecolor(128, 128, 128));
        }
        SyncState::Failed(message) => {
            println!("{}", message.bright_red());
            println!("{}", "press 'g' + Enter to try again".truecolor(128, 128, 128));
        }
        SyncState::Populated(view) => {
            let totals = view.totals;
            println!(
                "{}",
                format!(
                    "{} guest{} celebrating with us ({} RSVP entr{})",
                    totals.headcount,
                    if totals.headcount == 1 { "" } else { "s" },
                    totals.entries,
                    if totals.entries == 1 { "y" } else { "ies" },
                )
                .bright_green()
            );
            if view.guests.is_empty() {
                println!("No guests have RSVP'd yet. Be the first!");
            }
            for guest in &view.guests {
                let badge = format!("[{}]", guest.initials()).bright_magenta();
                let party = format!("x{}", guest.party_size).bright_yellow();
                let email = guest
                    .email
                    .as_deref()
                    .map(|e| format!(" <{}>", e))
                    .unwrap_or_default();
                println!("  {} {}{} {}", badge, guest.name.bold(), email, party);
                if let Some(message) = &guest.message {
                    println!(
                        "      {}",
                        format!("\"{}\"", truncate_ellipsis(message, 70)).italic()
                    );
                }
            }
        }
    }
}

fn render_sponsors(state: &SyncState<SponsorView>) {
    println!();
    println!("{}", "== Principal Sponsors ==".bright_magenta().bold());
    match state {
        SyncState::Idle | SyncState::Loading => {
            println!("{}", "Loading sponsors...".truecolor(128, 128, 128));
        }
        SyncState::Failed(message) => {
            println!("{}", message.bright_red());
            println!("{}", "press 's' + Enter to try again".truecolor(128, 128, 128));
        }
        SyncState::Populated(view) => {
            if view.pairs.is_empty() {
                println!("No sponsors yet");
            }
            for pair in &view.pairs {
                // Two aligned columns; a blank side stays a gap.
                println!(
                    "  {:>34}  {:<34}",
                    pair.male.as_deref().unwrap_or(""),
                    pair.female.as_deref().unwrap_or("")
                );
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = load_config();
    let base_url = config.base_url.clone().unwrap_or_default();
    let guests_path = config.guests_path.clone().unwrap_or_default();
    let sponsors_path = config.sponsors_path.clone().unwrap_or_default();
    let sync_options = SyncOptions {
        settle_delay: Duration::from_millis(config.settle_delay_ms.unwrap_or(SETTLE_DELAY_MS)),
    };

    // TTY stays reserved for the rendered lists; errors and the full trace go
    // to the log file.
    let logger = Arc::new(LoggerLocal::new(
        "roster-watch".to_string(),
        Some(LoggerLocalOptions {
            use_tty: Some(vec![6, 5]),
            use_file: Some(vec![6, 5, 4, 3, 2]),
            log_dir: config.log_dir.clone(),
        }),
    ));

    let client = ApiClient::with_policy(
        &base_url,
        Duration::from_secs(config.request_timeout_seconds.unwrap_or(10)),
        3,
    );
    let service = Arc::new(RosterService::new(client, Arc::clone(&logger)));
    let trigger = RefreshTrigger::new();

    let guests = {
        let service = Arc::clone(&service);
        let path = guests_path.clone();
        SyncHandle::mount("guests", &trigger, sync_options, GuestBookShaper, move || {
            let service = Arc::clone(&service);
            let path = path.clone();
            async move { service.fetch_roster(&path).await }
        })
    };
    let sponsors = {
        let service = Arc::clone(&service);
        let path = sponsors_path.clone();
        SyncHandle::mount("sponsors", &trigger, sync_options, SponsorShaper, move || {
            let service = Arc::clone(&service);
            let path = path.clone();
            async move { service.fetch_roster(&path).await }
        })
    };

    logger
        .info(&format!("Watching rosters at {}", base_url), None)
        .await;
    println!(
        "{}",
        "Commands: r = refresh, g = retry guests, s = retry sponsors, q = quit"
            .truecolor(128, 128, 128)
    );

    let mut guests_rx = guests.watch_state();
    let mut sponsors_rx = sponsors.watch_state();

    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    // Optional periodic refresh publisher; first tick only after one period.
    let poll_enabled = config.poll_seconds.is_some();
    let poll_period = Duration::from_secs(config.poll_seconds.unwrap_or(31_536_000));
    let mut poll = tokio::time::interval_at(tokio::time::Instant::now() + poll_period, poll_period);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                break;
            }

            changed = guests_rx.changed() => {
                if changed.is_err() { break; }
                render_guests(&guests_rx.borrow());
            }

            changed = sponsors_rx.changed() => {
                if changed.is_err() { break; }
                render_sponsors(&sponsors_rx.borrow());
            }

            _ = poll.tick(), if poll_enabled => {
                log::debug!("Poll interval elapsed, publishing refresh");
                trigger.publish();
            }

            line = lines.next_line(), if stdin_open => {
                match line {
                    Ok(Some(input)) => match input.trim() {
                        "r" => {
                            println!("{}", "Refresh published; re-fetching shortly...".truecolor(128, 128, 128));
                            trigger.publish();
                        }
                        "g" => {
                            if let Err(e) = guests.retry().await {
                                logger.error(&format!("Guests retry failed: {}", e), None).await;
                            }
                        }
                        "s" => {
                            if let Err(e) = sponsors.retry().await {
                                logger.error(&format!("Sponsors retry failed: {}", e), None).await;
                            }
                        }
                        "q" => break,
                        "" => {}
                        other => {
                            println!(
                                "{}",
                                format!("Unknown command '{}' (r, g, s, q)", other).truecolor(128, 128, 128)
                            );
                        }
                    },
                    // stdin closed (piped input ran out); keep watching.
                    Ok(None) => stdin_open = false,
                    Err(e) => {
                        logger.error(&format!("stdin error: {}", e), None).await;
                        stdin_open = false;
                    }
                }
            }
        }
    }

    logger.info("Unmounting roster instances", None).await;
    guests.unmount().await;
    sponsors.unmount().await;

    Ok(())
}
