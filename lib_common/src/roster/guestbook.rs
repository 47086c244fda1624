//! # Guest Book Normalization
//!
//! The attending-guests policy. Upstream rows carry `Name`, `Email`, `RSVP`,
//! `Guest` (party size), and `Message` columns, any of which may be absent or
//! mistyped. This module owns every defaulting decision for the guest book:
//!
//! - Only rows whose `RSVP` equals the affirmative marker (case-sensitive
//!   exact match) are kept; everything else is dropped from the list *and*
//!   from the totals.
//! - Party size parses the leading digits of the `Guest` cell; absence,
//!   parse failure, or values below 1 default to 1. The same resolved value
//!   feeds the per-entry badge and the headcount fold, so the two can never
//!   disagree.
//! - The upstream writes the placeholder `"Pending"` into `Email` before a
//!   guest confirms; it is treated as absent.
//!
//! All functions here are pure; upstream row order is preserved.

use super::records::ListRecord;
use super::ListShaper;
use serde::Serialize;

/// The exact `RSVP` cell value that marks a guest as attending.
pub const RSVP_AFFIRMATIVE: &str = "Yes";

/// Placeholder the upstream writes into `Email` before a guest confirms.
const EMAIL_PENDING: &str = "Pending";

/// A display-ready attending guest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedGuest {
    /// Display name; may be empty if the upstream row had none.
    pub name: String,
    /// Contact email, if present and confirmed.
    pub email: Option<String>,
    /// Free-form message left with the RSVP.
    pub message: Option<String>,
    /// Headcount this entry contributes. Always >= 1.
    pub party_size: u32,
}

impl NormalizedGuest {
    /// Avatar initials: first letters of up to two name words, uppercased,
    /// with `"?"` as the fallback for unusable names.
    pub fn initials(&self) -> String {
        let mut out = String::new();
        for part in self.name.split_whitespace().take(2) {
            if let Some(first) = part.chars().next() {
                out.extend(first.to_uppercase());
            }
        }
        if out.is_empty() {
            "?".to_string()
        } else {
            out
        }
    }
}

/// Aggregate counts over the attending guests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Totals {
    /// Number of attending RSVP rows.
    pub entries: usize,
    /// Sum of every entry's party size.
    pub headcount: u64,
}

/// The display-ready guest book: entries plus their aggregate counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuestBookView {
    /// Attending guests in upstream order.
    pub guests: Vec<NormalizedGuest>,
    /// Aggregate counts folded over `guests`.
    pub totals: Totals,
}

/// Filters and reshapes raw rows into attending guests, in upstream order.
pub fn normalize(records: &[ListRecord]) -> Vec<NormalizedGuest> {
    records
        .iter()
        .filter(|row| row.field("RSVP").as_deref() == Some(RSVP_AFFIRMATIVE))
        .map(|row| NormalizedGuest {
            name: row.text("Name").unwrap_or_default(),
            email: row.text("Email").filter(|e| e != EMAIL_PENDING),
            message: row.text("Message"),
            party_size: party_size(row),
        })
        .collect()
}

/// Deterministic fold over the normalized entries.
pub fn aggregate(guests: &[NormalizedGuest]) -> Totals {
    Totals {
        entries: guests.len(),
        headcount: guests.iter().map(|g| u64::from(g.party_size)).sum(),
    }
}

/// Resolves the party size for one row. This is the single place the
/// count default lives.
fn party_size(row: &ListRecord) -> u32 {
    row.field("Guest")
        .as_deref()
        .and_then(leading_count)
        .filter(|n| *n >= 1)
        .unwrap_or(1)
}

/// Parses the leading digit run of a spreadsheet cell ("2 adults" -> 2).
fn leading_count(raw: &str) -> Option<u32> {
    let digits: String = raw
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse::<u32>().ok()
}

/// The guest-book shaper mounted by the synchronization engine.
pub struct GuestBookShaper;

impl ListShaper for GuestBookShaper {
    type View = GuestBookView;

    fn shape(&self, records: &[ListRecord]) -> GuestBookView {
        let guests = normalize(records);
        let totals = aggregate(&guests);
        GuestBookView { guests, totals }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows(value: serde_json::Value) -> Vec<ListRecord> {
        serde_json::from_value(value).expect("row fixtures")
    }

    #[test]
    fn party_size_is_at_least_one_for_any_row() {
        let records = rows(json!([
            {"RSVP": "Yes"},
            {"RSVP": "Yes", "Guest": ""},
            {"RSVP": "Yes", "Guest": "zero"},
            {"RSVP": "Yes", "Guest": "0"},
            {"RSVP": "Yes", "Guest": "-3"},
            {"RSVP": "Yes", "Guest": "99999999999999999999"}
        ]));
        for guest in normalize(&records) {
            assert!(guest.party_size >= 1);
        }
        // The empty mapping is filtered (no RSVP), never an error.
        assert!(normalize(&rows(json!([{}]))).is_empty());
    }

    #[test]
    fn badge_and_headcount_never_diverge() {
        let records = rows(json!([
            {"Name": "A", "RSVP": "Yes", "Guest": "2"},
            {"Name": "B", "RSVP": "Yes", "Guest": "not a number"},
            {"Name": "C", "RSVP": "Yes", "Guest": 4},
            {"Name": "D", "RSVP": "Yes"}
        ]));
        let guests = normalize(&records);
        let totals = aggregate(&guests);
        let badge_sum: u64 = guests.iter().map(|g| u64::from(g.party_size)).sum();
        assert_eq!(totals.headcount, badge_sum);
        assert_eq!(totals.entries, guests.len());
    }

    #[test]
    fn only_affirmative_rows_are_kept() {
        let records = rows(json!([
            {"Name": "A", "RSVP": "Yes"},
            {"Name": "B", "RSVP": "No"},
            {"Name": "C", "RSVP": "yes"},
            {"Name": "D", "RSVP": "YES"},
            {"Name": "E"}
        ]));
        let guests = normalize(&records);
        assert_eq!(guests.len(), 1);
        assert_eq!(guests[0].name, "A");
        assert_eq!(aggregate(&guests).headcount, 1);
    }

    #[test]
    fn normalize_is_pure() {
        let records = rows(json!([
            {"Name": "A", "RSVP": "Yes", "Guest": "2"},
            {"Name": "B", "RSVP": "No"}
        ]));
        assert_eq!(normalize(&records), normalize(&records));
    }

    #[test]
    fn attending_scenario_from_the_book_of_guests() {
        let records = rows(json!([
            {"Name": "A", "RSVP": "Yes", "Guest": "2"},
            {"Name": "B", "RSVP": "No"},
            {"Name": "C", "RSVP": "Yes"}
        ]));
        let view = GuestBookShaper.shape(&records);
        assert_eq!(view.guests.len(), 2);
        assert_eq!(view.guests[0].name, "A");
        assert_eq!(view.guests[1].name, "C");
        assert_eq!(view.totals.headcount, 3);
    }

    #[test]
    fn pending_email_is_treated_as_absent() {
        let records = rows(json!([
            {"Name": "A", "RSVP": "Yes", "Email": "Pending"},
            {"Name": "B", "RSVP": "Yes", "Email": "b@example.com"}
        ]));
        let guests = normalize(&records);
        assert_eq!(guests[0].email, None);
        assert_eq!(guests[1].email.as_deref(), Some("b@example.com"));
    }

    #[test]
    fn initials_follow_the_avatar_rules() {
        let cases = [
            ("Ana Reyes", "AR"),
            ("ana", "A"),
            ("  maria   clara   luna ", "MC"),
            ("", "?"),
        ];
        for (name, expected) in cases {
            let guest = NormalizedGuest {
                name: name.to_string(),
                email: None,
                message: None,
                party_size: 1,
            };
            assert_eq!(guest.initials(), expected, "name: {:?}", name);
        }
    }
}
