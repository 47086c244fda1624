//! # Roster Synchronization Engine
//!
//! Keeps any number of mounted roster views fresh against the
//! spreadsheet-backed upstream. It is the plumbing behind the guest book and
//! the principal sponsors display, generalized so both (and anything else
//! shaped like them) share one implementation.
//!
//! ## Core Design Principles:
//!
//! 1.  **One worker per instance**: every mounted view owns a single async
//!     task that performs its fetches inline. Two fetches for one instance
//!     can never be in flight, so a slower earlier response can never
//!     overwrite a faster later one. The worker is the linearization point.
//!
//! 2.  **Typed refresh broadcast**: the [`refresh::RefreshTrigger`] is an
//!     explicit channel handle passed through construction. Any code may
//!     publish (e.g., after an RSVP submission), any mounted instance may
//!     subscribe; there are no ambient globals.
//!
//! 3.  **Settle-then-absorb debounce**: a refresh signal starts a settle
//!     window (the upstream sheet needs a moment to become consistent after
//!     a write). Publishes landing during the window, or while a fetch is
//!     active, are absorbed into at most one follow-up fetch. The window is
//!     never rescheduled by a second publish.
//!
//! 4.  **Clean teardown**: unmounting cancels the pending settle sleep and
//!     drops any in-flight fetch, so a late-arriving response can never
//!     mutate state after the instance is gone.
//!
//! Failure of one instance never affects its siblings; each carries its own
//! [`state::SyncState`] and nothing else is shared beyond the trigger.

pub mod instance;
pub mod refresh;
pub mod state;

pub use instance::{SyncHandle, SyncOptions};
pub use refresh::RefreshTrigger;
pub use state::{AckResult, SyncCommand, SyncState};
