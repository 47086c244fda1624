//! Regression suite for the roster synchronization engine, exercised through
//! the public lib_common API the way the binaries use it.

use lib_common::loggers::loggerlocal::{LoggerLocal, LoggerLocalOptions};
use lib_common::retrieve::api_client::{ApiClient, FetchError};
use lib_common::roster::guestbook::{self, GuestBookShaper};
use lib_common::roster::records::ListRecord;
use lib_common::roster::service::RosterService;
use lib_common::roster::ListShaper;
use lib_common::sync::{RefreshTrigger, SyncHandle, SyncOptions, SyncState};
use serde_json::json;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tokio::sync::watch;

fn rows(value: serde_json::Value) -> Vec<ListRecord> {
    serde_json::from_value(value).expect("row fixtures")
}

fn sample_rows() -> Vec<ListRecord> {
    rows(json!([
        {"Name": "A", "RSVP": "Yes", "Guest": "2"},
        {"Name": "B", "RSVP": "No"},
        {"Name": "C", "RSVP": "Yes"}
    ]))
}

/// A logger with every sink disabled, for wiring services under test.
fn silent_logger() -> Arc<LoggerLocal> {
    Arc::new(LoggerLocal::new(
        "sync_properties".to_string(),
        Some(LoggerLocalOptions {
            use_tty: None,
            use_file: None,
            log_dir: None,
        }),
    ))
}

/// Serves `hits` connections with a canned HTTP response on a random port.
fn mock_server(response: String, hits: usize) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    thread::spawn(move || {
        for _ in 0..hits {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut buf = [0u8; 2048];
                let _ = stream.read(&mut buf);
                let _ = stream.write_all(response.as_bytes());
            }
        }
    });

    format!("http://{}/", addr)
}

fn json_response(body: &str) -> String {
    format!(
        "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
        body.len(),
        body
    )
}

async fn wait_for<V>(
    rx: &mut watch::Receiver<SyncState<V>>,
    pred: impl Fn(&SyncState<V>) -> bool,
) {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if pred(&rx.borrow()) {
                return;
            }
            rx.changed().await.expect("state channel closed");
        }
    })
    .await
    .expect("timed out waiting for state");
}

#[test]
fn every_entry_counts_at_least_one_head() {
    let records = rows(json!([
        {"RSVP": "Yes"},
        {"RSVP": "Yes", "Guest": "0"},
        {"RSVP": "Yes", "Guest": "banana"},
        {"RSVP": "Yes", "Guest": "-2"}
    ]));
    for guest in guestbook::normalize(&records) {
        assert!(guest.party_size >= 1);
    }
}

#[test]
fn totals_match_the_displayed_badges() {
    let records = rows(json!([
        {"Name": "A", "RSVP": "Yes", "Guest": "3"},
        {"Name": "B", "RSVP": "Yes", "Guest": "x"},
        {"Name": "C", "RSVP": "maybe", "Guest": "7"}
    ]));
    let view = GuestBookShaper.shape(&records);
    let badge_sum: u64 = view.guests.iter().map(|g| u64::from(g.party_size)).sum();
    assert_eq!(view.totals.headcount, badge_sum);
    assert_eq!(view.totals.entries, view.guests.len());
    // The "maybe" row contributed to neither.
    assert_eq!(view.guests.len(), 2);
}

#[test]
fn the_reference_scenario_yields_three_heads() {
    let view = GuestBookShaper.shape(&sample_rows());
    assert_eq!(view.guests.len(), 2);
    assert_eq!(view.totals.headcount, 3);
}

#[tokio::test]
async fn service_fetches_and_shapes_against_a_mock_upstream() {
    let body = serde_json::to_string(&json!([
        {"Name": "Ana Reyes", "RSVP": "Yes", "Guest": "2", "Email": "Pending"},
        {"Name": "Luz Santos", "RSVP": "No"}
    ]))
    .unwrap();
    let base = mock_server(json_response(&body), 1);

    let client = ApiClient::with_policy(&base, Duration::from_secs(2), 0);
    let service = RosterService::new(client, silent_logger());

    let records = service.fetch_roster("api/guests").await.expect("fetch");
    let view = GuestBookShaper.shape(&records);
    assert_eq!(view.guests.len(), 1);
    assert_eq!(view.guests[0].initials(), "AR");
    assert_eq!(view.guests[0].email, None); // "Pending" counts as absent
    assert_eq!(view.totals.headcount, 2);
}

#[tokio::test]
async fn a_rejected_upstream_settles_into_failed_and_retry_recovers() {
    let calls = Arc::new(AtomicUsize::new(0));
    let trigger = RefreshTrigger::new();

    let fetch_calls = Arc::clone(&calls);
    let handle = SyncHandle::mount(
        "guests",
        &trigger,
        SyncOptions {
            settle_delay: Duration::from_millis(20),
        },
        GuestBookShaper,
        move || {
            let calls = Arc::clone(&fetch_calls);
            async move {
                if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(FetchError::UpstreamRejected { status: 502 })
                } else {
                    Ok(sample_rows())
                }
            }
        },
    );

    let mut rx = handle.watch_state();
    wait_for(&mut rx, |s| matches!(s, SyncState::Failed(_))).await;

    handle.retry().await.expect("retry ack");
    wait_for(&mut rx, |s| matches!(s, SyncState::Populated(_))).await;
    handle.unmount().await;
}

#[tokio::test(start_paused = true)]
async fn a_publish_burst_costs_exactly_one_refetch() {
    let calls = Arc::new(AtomicUsize::new(0));
    let trigger = RefreshTrigger::new();

    let fetch_calls = Arc::clone(&calls);
    let handle = SyncHandle::mount(
        "guests",
        &trigger,
        SyncOptions {
            settle_delay: Duration::from_millis(2000),
        },
        GuestBookShaper,
        move || {
            let calls = Arc::clone(&fetch_calls);
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(sample_rows())
            }
        },
    );

    let mut rx = handle.watch_state();
    wait_for(&mut rx, |s| matches!(s, SyncState::Populated(_))).await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    trigger.publish();
    trigger.publish();
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    handle.unmount().await;
}

#[tokio::test(start_paused = true)]
async fn teardown_discards_a_late_response() {
    let completed = Arc::new(AtomicUsize::new(0));
    let gate = Arc::new(tokio::sync::Semaphore::new(0));
    let trigger = RefreshTrigger::new();

    let fetch_completed = Arc::clone(&completed);
    let fetch_gate = Arc::clone(&gate);
    let handle = SyncHandle::mount(
        "guests",
        &trigger,
        SyncOptions::default(),
        GuestBookShaper,
        move || {
            let completed = Arc::clone(&fetch_completed);
            let gate = Arc::clone(&fetch_gate);
            async move {
                let _permit = gate.acquire().await.expect("gate closed");
                completed.fetch_add(1, Ordering::SeqCst);
                Ok(sample_rows())
            }
        },
    );

    let rx = handle.watch_state();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(rx.borrow().is_loading());

    handle.unmount().await;
    gate.add_permits(1);
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(completed.load(Ordering::SeqCst), 0);
    assert!(rx.borrow().is_loading());
}
