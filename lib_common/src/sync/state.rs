//! # Synchronization State
//!
//! The lifecycle of one mounted instance, plus the command envelope used to
//! talk to its worker. An instance is in exactly one state at any time;
//! `Idle` exists only between creation and the immediate first fetch, so in
//! practice observers see `Loading` first.

use std::sync::Arc;
use tokio::sync::oneshot;

// Result type for acknowledgements
pub type AckResult = Result<(), String>;

// Struct to wrap the command and a one-time channel for the response
pub struct SyncRequest {
    pub command: SyncCommand,
    pub responder: oneshot::Sender<AckResult>,
}

#[derive(Debug)]
pub enum SyncCommand {
    /// Manual "try again" affordance; valid from any state.
    Retry,
}

/// Lifecycle of a synchronization instance.
///
/// `Populated` carries its view behind an `Arc` so observers get cheap
/// snapshots instead of clones of the whole list.
#[derive(Debug, PartialEq)]
pub enum SyncState<V> {
    /// Created but not yet fetching. Transient.
    Idle,
    /// A fetch is in flight.
    Loading,
    /// The last fetch succeeded; holds the shaped view.
    Populated(Arc<V>),
    /// The last fetch settled in failure; holds a short display message.
    Failed(String),
}

impl<V> SyncState<V> {
    /// Short state name for logs and transition traces.
    pub fn name(&self) -> &'static str {
        match self {
            SyncState::Idle => "Idle",
            SyncState::Loading => "Loading",
            SyncState::Populated(_) => "Populated",
            SyncState::Failed(_) => "Failed",
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, SyncState::Loading)
    }
}

// Manual impl: the view is shared, not cloned, so `V: Clone` is not required.
impl<V> Clone for SyncState<V> {
    fn clone(&self) -> Self {
        match self {
            SyncState::Idle => SyncState::Idle,
            SyncState::Loading => SyncState::Loading,
            SyncState::Populated(view) => SyncState::Populated(Arc::clone(view)),
            SyncState::Failed(message) => SyncState::Failed(message.clone()),
        }
    }
}
