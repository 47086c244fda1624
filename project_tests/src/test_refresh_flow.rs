//! # Refresh Flow Test
//!
//! End-to-end demonstration against a running roster stand-in: mounts the
//! guest book instance, submits an RSVP through the stand-in's write
//! endpoint, publishes the refresh signal the way the production form does,
//! and prints every state transition until the new row shows up.

use clap::Parser;
use lib_common::loggers::loggerlocal::LoggerLocal;
use lib_common::retrieve::api_client::ApiClient;
use lib_common::roster::guestbook::GuestBookShaper;
use lib_common::roster::service::RosterService;
use lib_common::sync::{RefreshTrigger, SyncHandle, SyncOptions, SyncState};
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser, Debug)]
#[clap(about = "Submits an RSVP and watches the refresh flow pick it up", version)]
struct Args {
    #[clap(long, default_value = "http://127.0.0.1:3000/")]
    base_url: String,

    #[clap(long, default_value = "Refresh Flow Tester")]
    name: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let logger = Arc::new(LoggerLocal::new("refresh_flow".to_string(), None));
    let client = ApiClient::with_policy(&args.base_url, Duration::from_secs(10), 3);
    let service = Arc::new(RosterService::new(client, logger));
    let trigger = RefreshTrigger::new();

    let handle = {
        let service = Arc::clone(&service);
        SyncHandle::mount(
            "guests",
            &trigger,
            SyncOptions::default(),
            GuestBookShaper,
            move || {
                let service = Arc::clone(&service);
                async move { service.fetch_roster("api/guests").await }
            },
        )
    };

    let mut rx = handle.watch_state();
    let baseline = wait_for_populated(&mut rx, false).await?;
    println!("[*] Baseline headcount: {}", baseline);

    // // Statement: Submit an RSVP row through the stand-in's write endpoint
    let submit_url = format!("{}api/rsvp", args.base_url);
    let response = reqwest::Client::new()
        .post(&submit_url)
        .json(&serde_json::json!({
            "Name": args.name,
            "RSVP": "Yes",
            "Guest": "1",
            "Message": "Submitted by the refresh flow test"
        }))
        .send()
        .await?;
    anyhow::ensure!(
        response.status().is_success(),
        "RSVP submission failed: HTTP {}",
        response.status()
    );
    println!("[*] RSVP submitted; publishing refresh signal");

    // The production form publishes after a successful write; the settle
    // delay gives the upstream store time to become consistent.
    trigger.publish();

    let updated = wait_for_populated(&mut rx, true).await?;
    println!("[SUCCESS] Headcount after refresh: {}", updated);
    anyhow::ensure!(updated > baseline, "headcount did not grow");

    handle.unmount().await;
    Ok(())
}

/// Waits for a `Populated` state and returns its headcount.
///
/// With `skip_current` the state present at call time is marked as seen and
/// only a fresh transition counts; without it, an already-populated instance
/// returns immediately.
async fn wait_for_populated(
    rx: &mut tokio::sync::watch::Receiver<SyncState<lib_common::roster::guestbook::GuestBookView>>,
    skip_current: bool,
) -> anyhow::Result<u64> {
    let deadline = Duration::from_secs(15);
    tokio::time::timeout(deadline, async {
        if skip_current {
            let _ = rx.borrow_and_update();
            rx.changed().await?;
        }
        loop {
            {
                let state = rx.borrow_and_update();
                match &*state {
                    SyncState::Populated(view) => return Ok(view.totals.headcount),
                    SyncState::Failed(message) => anyhow::bail!("sync failed: {}", message),
                    _ => {}
                }
            }
            rx.changed().await?;
        }
    })
    .await
    .map_err(|_| anyhow::anyhow!("timed out waiting for Populated"))?
}
