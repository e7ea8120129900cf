//! Row selection by explicit control list, family key, or identifier range.

use std::collections::HashSet;
use std::str::FromStr;

use thiserror::Error;
use tracing::{error, info};

use crate::family::family_key_for;
use crate::record::ControlRecord;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid control range '{0}' (expected A.B.C-X.Y.Z)")]
pub struct RangeParseError(pub String);

/// Inclusive range over the third segment of `A.B.C` identifiers.
///
/// "3.1.1-3.1.10" selects 3.1.1 through 3.1.10. Only the start's family
/// prefix is compared; the end contributes its last segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlRange {
    family: [String; 2],
    start: u32,
    end: u32,
}

impl ControlRange {
    pub fn contains(&self, control_id: &str) -> bool {
        let parts: Vec<&str> = control_id.trim().split('.').collect();
        let [a, b, c] = parts.as_slice() else {
            return false;
        };
        if *a != self.family[0] || *b != self.family[1] {
            return false;
        }
        c.parse::<u32>()
            .is_ok_and(|n| (self.start..=self.end).contains(&n))
    }
}

impl FromStr for ControlRange {
    type Err = RangeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || RangeParseError(s.to_string());
        let (start, end) = s.trim().split_once('-').ok_or_else(err)?;
        let start_parts: Vec<&str> = start.trim().split('.').collect();
        let end_parts: Vec<&str> = end.trim().split('.').collect();

        let [a, b, c] = start_parts.as_slice() else {
            return Err(err());
        };
        let end_last = match end_parts.as_slice() {
            [_, _, z] => *z,
            _ => return Err(err()),
        };

        Ok(Self {
            family: [a.to_string(), b.to_string()],
            start: c.parse().map_err(|_| err())?,
            end: end_last.parse().map_err(|_| err())?,
        })
    }
}

/// Optional selection criteria; an empty filter selects every row.
#[derive(Debug, Clone, Default)]
pub struct ControlFilter {
    pub controls: Vec<String>,
    /// Family keys such as `AC` or `SI`.
    pub families: Vec<String>,
    /// Raw `A.B.C-X.Y.Z` range expression.
    pub range: Option<String>,
}

impl ControlFilter {
    pub fn is_active(&self) -> bool {
        !self.controls.is_empty() || !self.families.is_empty() || self.range.is_some()
    }

    /// Select rows: explicit controls first, then families, then the range.
    ///
    /// The union is deduplicated by control id, first occurrence kept. Rows
    /// without an id are never selected by an active filter. A malformed
    /// range is logged and selects nothing.
    pub fn apply<'a>(&self, rows: &'a [ControlRecord]) -> Vec<&'a ControlRecord> {
        if !self.is_active() {
            return rows.iter().collect();
        }

        let with_id = || rows.iter().filter_map(|r| r.control_id().map(|id| (id, r)));
        let mut selected: Vec<&ControlRecord> = Vec::new();

        if !self.controls.is_empty() {
            info!(controls = ?self.controls, "filtering for controls");
            selected.extend(
                with_id()
                    .filter(|(id, _)| self.controls.iter().any(|c| c.trim() == *id))
                    .map(|(_, r)| r),
            );
        }

        if !self.families.is_empty() {
            info!(families = ?self.families, "filtering for families");
            selected.extend(
                with_id()
                    .filter(|(id, _)| {
                        let key = family_key_for(id);
                        self.families.iter().any(|f| f.trim() == key)
                    })
                    .map(|(_, r)| r),
            );
        }

        if let Some(expr) = &self.range {
            info!(range = %expr, "filtering for range");
            match expr.parse::<ControlRange>() {
                Ok(range) => selected.extend(
                    with_id()
                        .filter(|(id, _)| range.contains(id))
                        .map(|(_, r)| r),
                ),
                Err(e) => error!(error = %e, "ignoring control range"),
            }
        }

        let mut seen = HashSet::new();
        selected.retain(|r| r.control_id().is_some_and(|id| seen.insert(id.to_string())));
        if !selected.is_empty() {
            info!(count = selected.len(), "filtered controls");
        }
        selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(ids: &[&str]) -> Vec<ControlRecord> {
        ids.iter()
            .map(|id| ControlRecord {
                id: Some(id.to_string()),
                ..Default::default()
            })
            .collect()
    }

    fn ids(selected: &[&ControlRecord]) -> Vec<String> {
        selected
            .iter()
            .filter_map(|r| r.control_id().map(str::to_string))
            .collect()
    }

    #[test]
    fn inactive_filter_keeps_everything() {
        let data = rows(&["3.1.1", "", "3.2.1"]);
        assert_eq!(ControlFilter::default().apply(&data).len(), 3);
    }

    #[test]
    fn explicit_controls() {
        let data = rows(&["3.1.1", "3.1.2", "3.2.1"]);
        let filter = ControlFilter {
            controls: vec!["3.2.1".into(), "3.1.1".into()],
            ..Default::default()
        };
        assert_eq!(ids(&filter.apply(&data)), vec!["3.1.1", "3.2.1"]);
    }

    #[test]
    fn families_by_key() {
        let data = rows(&["3.1.1", "3.13.1", "3.14.2", "3.1.20"]);
        let filter = ControlFilter {
            families: vec!["AC".into()],
            ..Default::default()
        };
        assert_eq!(ids(&filter.apply(&data)), vec!["3.1.1", "3.1.20"]);
    }

    #[test]
    fn range_is_numeric_on_last_segment() {
        let data = rows(&["3.1.1", "3.1.2", "3.1.10", "3.1.11", "3.2.5", "3.1"]);
        let filter = ControlFilter {
            range: Some("3.1.2-3.1.10".into()),
            ..Default::default()
        };
        assert_eq!(ids(&filter.apply(&data)), vec!["3.1.2", "3.1.10"]);
    }

    #[test]
    fn union_is_deduplicated_in_criteria_order() {
        let data = rows(&["3.1.1", "3.1.2", "3.2.1"]);
        let filter = ControlFilter {
            controls: vec!["3.2.1".into()],
            families: vec!["AC".into()],
            range: Some("3.1.1-3.1.1".into()),
        };
        assert_eq!(ids(&filter.apply(&data)), vec!["3.2.1", "3.1.1", "3.1.2"]);
    }

    #[test]
    fn malformed_range_selects_nothing() {
        let data = rows(&["3.1.1"]);
        let filter = ControlFilter {
            range: Some("3.1.x".into()),
            ..Default::default()
        };
        assert!(filter.apply(&data).is_empty());
    }

    #[test]
    fn range_parse_errors() {
        assert!("3.1.1".parse::<ControlRange>().is_err());
        assert!("3.1-3.2".parse::<ControlRange>().is_err());
        assert!("3.1.a-3.1.4".parse::<ControlRange>().is_err());
        assert!("3.1.1-3.1.4".parse::<ControlRange>().is_ok());
    }

    #[test]
    fn rows_without_id_never_match() {
        let data = rows(&["", "3.1.1"]);
        let filter = ControlFilter {
            families: vec!["Unknown".into()],
            ..Default::default()
        };
        assert!(filter.apply(&data).is_empty());
    }
}
