//! # Principal Sponsors Normalization
//!
//! Principal sponsors are displayed as paired names (one column of men, one
//! of women, row-aligned). A row may carry only one side; the blank side is
//! kept as a gap so the pairing stays aligned. Rows blank on both sides are
//! dropped.

use super::records::ListRecord;
use super::ListShaper;
use serde::Serialize;

/// One honored witness couple, as the upstream pairs them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SponsorPair {
    /// Left-column (male) sponsor name, if present.
    pub male: Option<String>,
    /// Right-column (female) sponsor name, if present.
    pub female: Option<String>,
}

/// The display-ready sponsors list, pairing preserved, upstream order kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SponsorView {
    /// Pairs with at least one side present.
    pub pairs: Vec<SponsorPair>,
}

/// Reshapes raw rows into sponsor pairs, dropping fully blank rows.
pub fn normalize(records: &[ListRecord]) -> Vec<SponsorPair> {
    records
        .iter()
        .map(|row| SponsorPair {
            male: row.text("MalePrincipalSponsor"),
            female: row.text("FemalePrincipalSponsor"),
        })
        .filter(|pair| pair.male.is_some() || pair.female.is_some())
        .collect()
}

/// The sponsors shaper mounted by the synchronization engine.
pub struct SponsorShaper;

impl ListShaper for SponsorShaper {
    type View = SponsorView;

    fn shape(&self, records: &[ListRecord]) -> SponsorView {
        SponsorView {
            pairs: normalize(records),
        }
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
    fn blank_rows_are_dropped_but_half_pairs_survive() {
        let records = rows(json!([
            {"MalePrincipalSponsor": "Jose Cruz", "FemalePrincipalSponsor": "Lydia Cruz"},
            {"MalePrincipalSponsor": "", "FemalePrincipalSponsor": "Teresita Ramos"},
            {"MalePrincipalSponsor": "  ", "FemalePrincipalSponsor": ""},
            {}
        ]));
        let pairs = normalize(&records);
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].male.as_deref(), Some("Jose Cruz"));
        assert_eq!(pairs[1].male, None);
        assert_eq!(pairs[1].female.as_deref(), Some("Teresita Ramos"));
    }

    #[test]
    fn upstream_order_is_preserved() {
        let records = rows(json!([
            {"MalePrincipalSponsor": "B"},
            {"MalePrincipalSponsor": "A"}
        ]));
        let view = SponsorShaper.shape(&records);
        assert_eq!(view.pairs[0].male.as_deref(), Some("B"));
        assert_eq!(view.pairs[1].male.as_deref(), Some("A"));
    }
}
