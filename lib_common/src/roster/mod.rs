//! # Roster Data Module
//!
//! Typed access to the externally-sourced rosters behind the event site: the
//! RSVP guest book and the principal sponsors list. The upstream store is a
//! spreadsheet edited by the event organizers, so rows arrive as loosely-typed
//! JSON records; everything here is about turning those rows into
//! display-ready data through pure, total normalization policies.
//!
//! ## Contained Modules:
//!
//! - **`records`**: the [`records::ListRecord`] row type and its coercing
//!   field accessors. Absent or mistyped fields are "unknown", never errors.
//! - **`guestbook`**: the attending-guests policy (RSVP filter, party-size
//!   defaulting, totals fold, avatar initials).
//! - **`sponsors`**: the principal-sponsors policy (paired names, blank rows
//!   dropped, pairing preserved for aligned display).
//! - **`service`**: the fetch service coupling an `ApiClient` with the local
//!   logger (enabled with the `retrieve` and `loggers` features).

pub mod guestbook;
pub mod records;
#[cfg(all(feature = "retrieve", feature = "loggers"))]
pub mod service;
pub mod sponsors;

use records::ListRecord;

/// The reusable shaping seam between raw upstream rows and a display-ready
/// view. Implementations must be pure: same records in, same view out, no
/// hidden state. The synchronization engine re-runs a shaper after every
/// fetch.
pub trait ListShaper {
    /// The display-ready view this shaper produces.
    type View;

    /// Reshapes raw upstream rows into the view. Total over all inputs,
    /// including records with every field absent.
    fn shape(&self, records: &[ListRecord]) -> Self::View;
}
