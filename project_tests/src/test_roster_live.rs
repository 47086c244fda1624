//! # Roster Live Data Test
//!
//! Connects to a running roster stand-in (or the real upstream) via
//! lib_common to retrieve and display both rosters in raw and shaped form.

use clap::Parser;
use lib_common::loggers::loggerlocal::LoggerLocal;
use lib_common::retrieve::api_client::ApiClient;
use lib_common::roster::guestbook::GuestBookShaper;
use lib_common::roster::service::RosterService;
use lib_common::roster::sponsors::SponsorShaper;
use lib_common::roster::ListShaper;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser, Debug)]
#[clap(about = "Fetches and displays both rosters once", version)]
struct Args {
    #[clap(long, default_value = "http://127.0.0.1:3000/")]
    base_url: String,
}

/// Executes one live fetch of each roster.
///
/// // Statement: Prints raw rows and the shaped views to stdout on success.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // // Statement: Initialize LoggerLocal with the required app name and default options
    let logger = Arc::new(LoggerLocal::new("roster_test".to_string(), None));

    let client = ApiClient::with_policy(&args.base_url, Duration::from_secs(10), 3);
    let service = RosterService::new(client, logger);

    println!("[*] Requesting live roster data from {} ...", args.base_url);

    match service.fetch_roster("api/guests").await {
        Ok(rows) => {
            println!("\n[SUCCESS] Guest rows received:");
            println!("-----------------------------------------------");
            println!("{}", serde_json::to_string_pretty(&rows)?);
            println!("-----------------------------------------------");

            let view = GuestBookShaper.shape(&rows);
            println!(
                "[INFO] Attending: {} entries, headcount {}",
                view.totals.entries, view.totals.headcount
            );
        }
        Err(e) => {
            eprintln!("\n[ERROR] Guest roster retrieval failed:");
            eprintln!(">>> {}", e);
            std::process::exit(1);
        }
    }

    match service.fetch_roster("api/principal-sponsor").await {
        Ok(rows) => {
            let view = SponsorShaper.shape(&rows);
            println!("\n[SUCCESS] Sponsor pairs:");
            for pair in &view.pairs {
                println!(
                    "    {:>30} | {:<30}",
                    pair.male.as_deref().unwrap_or("-"),
                    pair.female.as_deref().unwrap_or("-")
                );
            }
        }
        Err(e) => {
            eprintln!("\n[ERROR] Sponsor roster retrieval failed:");
            eprintln!(">>> {}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}
