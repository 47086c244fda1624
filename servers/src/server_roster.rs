//! # Roster Stand-in Server
//!
//! Local test double for the spreadsheet-backed roster upstream. Serves the
//! guest book and principal sponsors as JSON arrays read fresh from disk on
//! every request (the files play the role of the sheet, editable while the
//! server runs), and accepts RSVP submissions by appending to the guests
//! file.
//!
//! Failure modes of the real upstream can be injected for exercising the
//! watcher's error states: `--latency-ms` delays every response and
//! `--fail-rate` answers a fraction of requests with HTTP 500.

use actix_web::{get, post, web, App, HttpResponse, HttpServer, Responder};
use clap::Parser;
use rand::Rng;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

#[derive(Parser, Debug, Clone)]
#[clap(about = "File-backed stand-in for the spreadsheet roster upstream", version)]
struct Args {
    #[clap(long, env = "ROSTER_PORT", default_value_t = 3000, help = "Port to listen on.")]
    port: u16,

    #[clap(long, env = "ROSTER_DATA_DIR", default_value = "./data", help = "Directory holding guests.json and sponsors.json.")]
    data_dir: PathBuf,

    #[clap(long, env = "ROSTER_LATENCY_MS", default_value_t = 0, help = "Artificial delay added to every response.")]
    latency_ms: u64,

    #[clap(long, env = "ROSTER_FAIL_RATE", default_value_t = 0.0, help = "Fraction of requests answered with HTTP 500 (0.0 - 1.0).")]
    fail_rate: f64,
}

struct ServerState {
    args: Args,
    // Guards read-modify-write cycles on the guests file.
    write_lock: Mutex<()>,
}

impl ServerState {
    fn data_path(&self, file: &str) -> PathBuf {
        self.args.data_dir.join(file)
    }
}

/// Serves one roster file as a JSON array, with injected latency/failures.
/// A missing file is an empty sheet, not an error.
async fn serve_roster(state: &ServerState, file: &str) -> HttpResponse {
    if state.args.latency_ms > 0 {
        tokio::time::sleep(Duration::from_millis(state.args.latency_ms)).await;
    }

    if state.args.fail_rate > 0.0 && rand::rng().random::<f64>() < state.args.fail_rate {
        log::warn!("Injected failure for {}", file);
        return HttpResponse::InternalServerError().finish();
    }

    let path = state.data_path(file);
    let rows: Value = match std::fs::read_to_string(&path) {
        Ok(text) => match serde_json::from_str(&text) {
            Ok(value @ Value::Array(_)) => value,
            Ok(_) | Err(_) => {
                log::error!("Data file {} is not a JSON array", path.display());
                return HttpResponse::InternalServerError().finish();
            }
        },
        Err(_) => json!([]),
    };

    HttpResponse::Ok()
        .insert_header(("cache-control", "no-store"))
        .json(rows)
}

#[get("/api/guests")]
async fn guests(state: web::Data<ServerState>) -> impl Responder {
    serve_roster(&state, "guests.json").await
}

#[get("/api/principal-sponsor")]
async fn principal_sponsor(state: web::Data<ServerState>) -> impl Responder {
    serve_roster(&state, "sponsors.json").await
}

/// Accepts an RSVP submission and appends it to the guests file, the way the
/// production form writes a row into the sheet. The submitter is expected to
/// publish a refresh signal afterwards; this endpoint only stores the row.
#[post("/api/rsvp")]
async fn rsvp(state: web::Data<ServerState>, body: web::Json<Value>) -> impl Responder {
    let mut row = match body.into_inner() {
        Value::Object(map) => map,
        _ => return HttpResponse::BadRequest().body("expected a JSON object"),
    };

    // The sheet defaults these columns when the form leaves them out.
    row.entry("RSVP".to_string()).or_insert(json!("Yes"));
    row.entry("Email".to_string()).or_insert(json!("Pending"));

    let path = state.data_path("guests.json");
    let _guard = state.write_lock.lock().expect("write lock poisoned");

    let mut rows: Vec<Value> = match std::fs::read_to_string(&path) {
        Ok(text) => serde_json::from_str(&text).unwrap_or_default(),
        Err(_) => Vec::new(),
    };
    rows.push(Value::Object(row));

    match serde_json::to_string_pretty(&rows)
        .map_err(anyhow::Error::from)
        .and_then(|text| std::fs::write(&path, text).map_err(anyhow::Error::from))
    {
        Ok(()) => {
            log::info!("RSVP stored; guests file now has {} rows", rows.len());
            HttpResponse::Ok().json(json!({ "ok": true, "rows": rows.len() }))
        }
        Err(e) => {
            log::error!("Failed to store RSVP: {}", e);
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init();
    let args = Args::parse();
    let port = args.port;

    println!(
        "Roster stand-in serving {} on port {} (latency {}ms, fail rate {})",
        args.data_dir.display(),
        port,
        args.latency_ms,
        args.fail_rate
    );

    let state = web::Data::new(ServerState {
        args,
        write_lock: Mutex::new(()),
    });

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(guests)
            .service(principal_sponsor)
            .service(rsvp)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
