//! # Roster Records
//!
//! The row type shared by every roster endpoint. Upstream is a spreadsheet,
//! so a row is a flat mapping from column name to whatever the organizers
//! typed into the cell: usually a string, sometimes a bare number, sometimes
//! nothing at all. A missing or mistyped field is "unknown", never an error;
//! all defaulting decisions belong to the normalizers, not to this type and
//! not to presentation code.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One row of externally-sourced tabular data.
///
/// Deserializes transparently from a flat JSON object, so a roster endpoint
/// payload is simply `Vec<ListRecord>`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListRecord(pub Map<String, Value>);

impl ListRecord {
    /// Returns the field value coerced to a string.
    ///
    /// Strings come back as-is; numbers and booleans are stringified
    /// (spreadsheet cells lose their types in transit); null, structured
    /// values, and absent fields are `None`.
    pub fn field(&self, name: &str) -> Option<String> {
        match self.0.get(name) {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            Some(Value::Bool(b)) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Like [`Self::field`], but trimmed and with blank values treated as
    /// absent. This is what the normalizers use for display text.
    pub fn text(&self, name: &str) -> Option<String> {
        self.field(name)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }
}
