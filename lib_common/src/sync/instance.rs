//! # Synchronization Instance Worker
//!
//! One mounted roster view = one [`SyncHandle`] = one worker task. The worker
//! owns the instance's state machine (`Idle -> Loading -> {Populated,
//! Failed}`, re-entrant on retry or refresh) and publishes every transition
//! through a watch channel.
//!
//! ## Workflow:
//! 1.  On mount the worker immediately leaves `Idle`, fetches once, and
//!     settles into `Populated` or `Failed`.
//! 2.  A refresh signal starts the settle window (the spreadsheet-backed
//!     upstream needs a moment after a write); when the window closes, the
//!     signal backlog is drained and exactly one re-fetch runs.
//! 3.  A manual retry command re-fetches right away and acknowledges the
//!     caller through a oneshot responder.
//! 4.  Teardown cancels whatever the worker is doing - settle sleep or
//!     in-flight fetch - so no late response can mutate state afterwards.
//!
//! Fetches are awaited inline, which makes overlapping fetches for one
//! instance impossible by construction.

use crate::retrieve::api_client::FetchError;
use crate::roster::records::ListRecord;
use crate::roster::ListShaper;
use crate::sync::refresh::RefreshTrigger;
use crate::sync::state::{AckResult, SyncCommand, SyncRequest, SyncState};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Settle delay observed by the original RSVP flow: the upstream sheet takes
/// about this long to reflect a write.
pub const SETTLE_DELAY_MS: u64 = 2000;

/// Per-instance tuning knobs.
#[derive(Debug, Clone, Copy)]
pub struct SyncOptions {
    /// How long to wait after a refresh signal before re-fetching.
    pub settle_delay: Duration,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_millis(SETTLE_DELAY_MS),
        }
    }
}

/// Handle to a mounted synchronization instance.
///
/// Dropping the handle (or calling [`Self::unmount`]) tears the worker down;
/// the last published state stays readable through any outstanding watch
/// receivers but never changes again.
pub struct SyncHandle<V> {
    label: String,
    state_rx: watch::Receiver<SyncState<V>>,
    cmd_tx: mpsc::UnboundedSender<SyncRequest>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl<V: Send + Sync + 'static> SyncHandle<V> {
    /// Spawns the worker for one roster view and returns its handle.
    ///
    /// # Arguments
    /// * `label` - Instance name used in logs ("guests", "sponsors", ...).
    /// * `trigger` - The process-wide refresh broadcast to subscribe to.
    /// * `options` - Settle-delay tuning.
    /// * `shaper` - Pure normalization policy applied after every fetch.
    /// * `fetch` - The remote read; invoked inline, one call at a time.
    pub fn mount<S, F, Fut>(
        label: impl Into<String>,
        trigger: &RefreshTrigger,
        options: SyncOptions,
        shaper: S,
        fetch: F,
    ) -> Self
    where
        S: ListShaper<View = V> + Send + 'static,
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = Result<Vec<ListRecord>, FetchError>> + Send + 'static,
    {
        let label = label.into();
        let (state_tx, state_rx) = watch::channel(SyncState::Idle);
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        let worker = Worker {
            label: label.clone(),
            state_tx,
            cmd_rx,
            refresh_rx: trigger.subscribe(),
            settle_delay: options.settle_delay,
            shaper,
            fetch,
            cancel: cancel.clone(),
        };
        let task = tokio::spawn(worker.run());

        Self {
            label,
            state_rx,
            cmd_tx,
            cancel,
            task,
        }
    }

    /// Instance name used in logs and rendering.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> SyncState<V> {
        self.state_rx.borrow().clone()
    }

    /// A watch receiver observing every state transition.
    pub fn watch_state(&self) -> watch::Receiver<SyncState<V>> {
        self.state_rx.clone()
    }

    /// Manual "try again" affordance. Acknowledged once the worker has
    /// accepted the command; the result of the re-fetch itself arrives
    /// through the state channel.
    pub async fn retry(&self) -> AckResult {
        let (tx, rx) = oneshot::channel();
        let request = SyncRequest {
            command: SyncCommand::Retry,
            responder: tx,
        };

        if self.cmd_tx.send(request).is_err() {
            return Err("Sync instance is no longer running.".to_string());
        }

        // Wait for the response from the worker task
        rx.await
            .unwrap_or_else(|_| Err("No response from sync instance.".to_string()))
    }

    /// Tears the worker down and waits for it to finish. Any in-flight fetch
    /// is dropped; observable state does not change afterwards.
    pub async fn unmount(self) {
        self.cancel.cancel();
        let _ = self.task.await;
    }
}

struct Worker<S: ListShaper, F> {
    label: String,
    state_tx: watch::Sender<SyncState<<S as ListShaper>::View>>,
    cmd_rx: mpsc::UnboundedReceiver<SyncRequest>,
    refresh_rx: broadcast::Receiver<()>,
    settle_delay: Duration,
    shaper: S,
    fetch: F,
    cancel: CancellationToken,
}

impl<S, F, Fut> Worker<S, F>
where
    S: ListShaper,
    F: Fn() -> Fut,
    Fut: Future<Output = Result<Vec<ListRecord>, FetchError>>,
{
    async fn run(mut self) {
        // Idle is never user-visible in practice: fetch immediately.
        if self.refetch().await {
            return;
        }

        let mut refresh_open = true;

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => break,

                req = self.cmd_rx.recv() => {
                    match req {
                        Some(SyncRequest { command: SyncCommand::Retry, responder }) => {
                            let _ = responder.send(Ok(()));
                            if self.refetch().await {
                                break;
                            }
                        }
                        // All handles dropped: same as teardown.
                        None => break,
                    }
                }

                sig = self.refresh_rx.recv(), if refresh_open => {
                    match sig {
                        // A lagged receiver still owes exactly one re-fetch.
                        Ok(()) | Err(RecvError::Lagged(_)) => {
                            // Settle window: let the upstream store catch up.
                            tokio::select! {
                                _ = self.cancel.cancelled() => break,
                                _ = tokio::time::sleep(self.settle_delay) => {}
                            }
                            self.drain_refresh_backlog();
                            if self.refetch().await {
                                break;
                            }
                        }
                        Err(RecvError::Closed) => {
                            // Trigger dropped; keep serving manual retries.
                            refresh_open = false;
                        }
                    }
                }
            }
        }

        log::debug!("Sync instance '{}' unmounted", self.label);
    }

    /// Absorbs publishes that landed during the settle window or an active
    /// fetch, collapsing a burst into the single re-fetch about to run.
    fn drain_refresh_backlog(&mut self) {
        loop {
            match self.refresh_rx.try_recv() {
                Ok(()) | Err(TryRecvError::Lagged(_)) => continue,
                Err(_) => break,
            }
        }
    }

    /// Runs one fetch cycle. Returns `true` if teardown interrupted it.
    async fn refetch(&mut self) -> bool {
        self.set_state(SyncState::Loading);

        tokio::select! {
            _ = self.cancel.cancelled() => true,
            result = (self.fetch)() => {
                match result {
                    Ok(records) => {
                        let view = self.shaper.shape(&records);
                        self.set_state(SyncState::Populated(Arc::new(view)));
                    }
                    Err(err) => {
                        log::warn!("Sync instance '{}' fetch failed: {}", self.label, err);
                        self.set_state(SyncState::Failed(err.to_string()));
                    }
                }
                false
            }
        }
    }

    fn set_state(&self, next: SyncState<<S as ListShaper>::View>) {
        log::debug!("Sync instance '{}' -> {}", self.label, next.name());
        let _ = self.state_tx.send(next);
    }
}
