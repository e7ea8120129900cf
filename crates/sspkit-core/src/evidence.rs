//! Evidence reconciliation: joins evidence records onto control identifiers.
//!
//! An evidence record names the controls it supports in one of two mapping
//! columns. [`EvidenceIndexBuilder`] walks the records once, formats each into
//! a display entry, and accumulates it under every mapped control. The
//! finished [`EvidenceIndex`] is immutable and answers [`EvidenceIndex::lookup`]
//! by merging a control's inline evidence with the indexed entries.

use std::collections::{HashMap, HashSet};

use tracing::{debug, info};

use crate::record::{EvidenceRecord, IGNORE_MARKER, non_blank};
use crate::text::parse_delimited;

/// Format one evidence record as a display string.
///
/// `"[<link>] - <description>"` when both parts exist, either part alone
/// otherwise, or `""` when there is nothing to show. A description carrying
/// the `IGNORE` marker contributes nothing and does not fall back to the
/// file name.
pub fn format_entry(record: &EvidenceRecord) -> String {
    let link_part = non_blank(record.link.as_deref()).map(|link| format!("[{link}]"));

    let descriptive_part = match non_blank(record.description.as_deref()) {
        Some(desc) if desc.to_uppercase().contains(IGNORE_MARKER) => None,
        Some(desc) => Some(desc.to_string()),
        None => non_blank(record.file_name.as_deref()).map(str::to_string),
    };

    match (link_part, descriptive_part) {
        (Some(link), Some(desc)) => format!("{link} - {desc}"),
        (Some(part), None) | (None, Some(part)) => part,
        (None, None) => String::new(),
    }
}

/// Pick the mapping field that decides a record's target controls.
///
/// First non-empty field wins: the primary field shadows the fallback
/// entirely, even when the two list different controls. A whitespace-only
/// primary still counts as set and yields no targets.
pub fn select_mappings<'a>(primary: Option<&'a str>, fallback: Option<&'a str>) -> Option<&'a str> {
    is_set(primary).or_else(|| is_set(fallback))
}

fn is_set(field: Option<&str>) -> Option<&str> {
    field.filter(|s| !s.is_empty())
}

/// Control identifiers a record maps to, in field order.
pub fn target_controls(record: &EvidenceRecord) -> Vec<String> {
    let field = select_mappings(
        record.suggested_mappings.as_deref(),
        record.provided_mappings.as_deref(),
    );
    parse_delimited(field)
        .into_iter()
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .collect()
}

/// Counters collected while building an index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    /// Records seen.
    pub rows: usize,
    /// Records with neither mapping field set.
    pub unmapped: usize,
    /// Records whose description carries the `IGNORE` marker.
    pub ignored: usize,
    /// Mapped records that formatted to an empty entry.
    pub empty: usize,
    /// (control, entry) pairs appended.
    pub appended: usize,
}

/// Accumulates evidence entries per control during a single pass.
#[derive(Debug, Default)]
pub struct EvidenceIndexBuilder {
    entries: HashMap<String, Vec<String>>,
    order: Vec<String>,
    stats: BuildStats,
}

impl EvidenceIndexBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one evidence record into the index under construction.
    pub fn push(&mut self, record: &EvidenceRecord) {
        self.stats.rows += 1;

        if is_set(record.suggested_mappings.as_deref()).is_none()
            && is_set(record.provided_mappings.as_deref()).is_none()
        {
            self.stats.unmapped += 1;
            return;
        }

        if record.is_ignored() {
            info!(
                file = record.file_name.as_deref().unwrap_or(""),
                "skipping ignored evidence"
            );
            self.stats.ignored += 1;
            return;
        }

        let entry = format_entry(record);
        if entry.is_empty() {
            self.stats.empty += 1;
            return;
        }

        if is_set(record.suggested_mappings.as_deref()).is_none() {
            debug!(
                file = record.file_name.as_deref().unwrap_or(""),
                "using provided mappings as fallback"
            );
        }

        for control_id in target_controls(record) {
            debug!(control = %control_id, entry = %entry, "added evidence");
            self.append(control_id, entry.clone());
        }
    }

    fn append(&mut self, control_id: String, entry: String) {
        self.stats.appended += 1;
        match self.entries.get_mut(&control_id) {
            Some(list) => list.push(entry),
            None => {
                self.order.push(control_id.clone());
                self.entries.insert(control_id, vec![entry]);
            }
        }
    }

    /// Freeze the accumulated entries.
    pub fn finish(self) -> (EvidenceIndex, BuildStats) {
        let index = EvidenceIndex {
            entries: self.entries,
            order: self.order,
        };
        (index, self.stats)
    }
}

/// Read-only mapping from control identifier to its evidence entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvidenceIndex {
    entries: HashMap<String, Vec<String>>,
    /// Control identifiers in first-seen order.
    order: Vec<String>,
}

impl EvidenceIndex {
    /// Build an index from evidence records in input order.
    pub fn build<'a, I>(records: I) -> (Self, BuildStats)
    where
        I: IntoIterator<Item = &'a EvidenceRecord>,
    {
        let mut builder = EvidenceIndexBuilder::new();
        for record in records {
            builder.push(record);
        }
        let (index, stats) = builder.finish();
        info!(
            controls = index.len(),
            entries = index.total_entries(),
            ignored = stats.ignored,
            unmapped = stats.unmapped,
            "built evidence index"
        );
        (index, stats)
    }

    /// Indexed entries for one control, in insertion order.
    pub fn get(&self, control_id: &str) -> &[String] {
        self.entries
            .get(control_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Inline evidence for a control merged with its indexed entries.
    ///
    /// Inline items come first. Duplicates (exact string equality) are
    /// dropped, keeping the first occurrence.
    pub fn lookup(&self, control_id: &str, existing_evidence: Option<&str>) -> Vec<String> {
        let inline = parse_delimited(existing_evidence);
        let indexed = self.get(control_id).iter().cloned();

        let mut seen = HashSet::new();
        let mut merged = Vec::new();
        for item in inline.into_iter().chain(indexed) {
            if seen.insert(item.clone()) {
                merged.push(item);
            }
        }
        merged
    }

    /// Number of controls with at least one entry.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn total_entries(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    /// `(control_id, entries)` pairs in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.order
            .iter()
            .map(|id| (id.as_str(), self.get(id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn evidence(
        link: Option<&str>,
        description: Option<&str>,
        suggested: Option<&str>,
        provided: Option<&str>,
    ) -> EvidenceRecord {
        EvidenceRecord {
            file_name: None,
            link: link.map(Into::into),
            description: description.map(Into::into),
            suggested_mappings: suggested.map(Into::into),
            provided_mappings: provided.map(Into::into),
        }
    }

    // ── format_entry ──

    #[test]
    fn format_link_and_description() {
        let rec = evidence(Some("http://x"), Some("Policy doc"), None, None);
        assert_eq!(format_entry(&rec), "[http://x] - Policy doc");
    }

    #[test]
    fn format_ignored_description_only() {
        let rec = evidence(None, Some("please ignore this"), None, None);
        assert_eq!(format_entry(&rec), "");
    }

    #[test]
    fn format_ignored_description_does_not_fall_back() {
        let mut rec = evidence(Some("http://x"), Some("IGNORE"), None, None);
        rec.file_name = Some("f.pdf".into());
        assert_eq!(format_entry(&rec), "[http://x]");
    }

    #[test]
    fn format_file_name_fallback() {
        let rec = EvidenceRecord {
            file_name: Some("f.pdf".into()),
            ..Default::default()
        };
        assert_eq!(format_entry(&rec), "f.pdf");
    }

    #[test]
    fn format_link_with_file_name() {
        let rec = EvidenceRecord {
            file_name: Some(" scan.pdf ".into()),
            link: Some(" http://s/scan ".into()),
            ..Default::default()
        };
        assert_eq!(format_entry(&rec), "[http://s/scan] - scan.pdf");
    }

    #[test]
    fn format_nothing() {
        assert_eq!(format_entry(&EvidenceRecord::default()), "");
    }

    // ── select_mappings ──

    #[test]
    fn primary_shadows_fallback() {
        assert_eq!(select_mappings(Some("3.1.1"), Some("3.1.2")), Some("3.1.1"));
    }

    #[test]
    fn empty_primary_falls_back() {
        assert_eq!(select_mappings(None, Some("3.1.2")), Some("3.1.2"));
        assert_eq!(select_mappings(Some(""), Some("3.1.2")), Some("3.1.2"));
        assert_eq!(select_mappings(None, None), None);
    }

    #[test]
    fn whitespace_primary_shadows_fallback() {
        assert_eq!(select_mappings(Some("  "), Some("3.1.2")), Some("  "));

        let rows = [evidence(None, Some("Doc"), Some(" "), Some("3.1.2"))];
        let (index, stats) = EvidenceIndex::build(&rows);
        assert!(index.get("3.1.2").is_empty());
        assert!(index.is_empty());
        assert_eq!(stats.unmapped, 0);
        assert_eq!(stats.appended, 0);
    }

    // ── build ──

    #[test]
    fn precedence_is_not_a_union() {
        let rows = [evidence(None, Some("Doc"), Some("3.1.1"), Some("3.1.2"))];
        let (index, _) = EvidenceIndex::build(&rows);
        assert_eq!(index.get("3.1.1"), ["Doc".to_string()]);
        assert!(index.get("3.1.2").is_empty());
    }

    #[test]
    fn ignore_marker_excludes_mapped_row() {
        let rows = [evidence(
            Some("http://old"),
            Some("Old evidence - IGNORE"),
            Some("3.1.1"),
            None,
        )];
        let (index, stats) = EvidenceIndex::build(&rows);
        assert!(index.is_empty());
        assert_eq!(stats.ignored, 1);
    }

    #[test]
    fn unmapped_rows_are_skipped() {
        let rows = [evidence(Some("http://x"), Some("Doc"), None, Some(""))];
        let (index, stats) = EvidenceIndex::build(&rows);
        assert!(index.is_empty());
        assert_eq!(stats.unmapped, 1);
    }

    #[test]
    fn empty_entries_are_not_indexed() {
        let rows = [evidence(None, None, Some("3.1.1"), None)];
        let (index, stats) = EvidenceIndex::build(&rows);
        assert!(index.is_empty());
        assert_eq!(stats.empty, 1);
    }

    #[test]
    fn one_row_many_controls_in_input_order() {
        let rows = [
            evidence(None, Some("First"), Some("3.1.1|3.1.2"), None),
            evidence(None, Some("Second"), None, Some(" 3.1.2 ; 3.5.3 ")),
        ];
        let (index, stats) = EvidenceIndex::build(&rows);
        assert_eq!(index.get("3.1.1"), ["First".to_string()]);
        assert_eq!(
            index.get("3.1.2"),
            ["First".to_string(), "Second".to_string()]
        );
        assert_eq!(index.get("3.5.3"), ["Second".to_string()]);
        assert_eq!(stats.appended, 4);
        assert_eq!(index.total_entries(), 4);

        let order: Vec<&str> = index.iter().map(|(id, _)| id).collect();
        assert_eq!(order, vec!["3.1.1", "3.1.2", "3.5.3"]);
    }

    // ── lookup ──

    #[test]
    fn lookup_end_to_end() {
        let rows = [evidence(
            Some("http://s"),
            Some("Backup logs"),
            Some("3.4.1|3.4.2"),
            None,
        )];
        let (index, _) = EvidenceIndex::build(&rows);

        assert_eq!(
            index.lookup("3.4.1", Some("Manual review.")),
            vec!["Manual review", "[http://s] - Backup logs"]
        );
        assert_eq!(
            index.lookup("3.4.2", None),
            vec!["[http://s] - Backup logs"]
        );
    }

    #[test]
    fn lookup_dedups_at_first_position() {
        let rows = [
            evidence(None, Some("Shared"), Some("3.2.1"), None),
            evidence(None, Some("Only indexed"), Some("3.2.1"), None),
        ];
        let (index, _) = EvidenceIndex::build(&rows);
        assert_eq!(
            index.lookup("3.2.1", Some("Inline;Shared.")),
            vec!["Inline", "Shared", "Only indexed"]
        );
    }

    #[test]
    fn lookup_is_repeatable() {
        let rows = [evidence(None, Some("Doc"), Some("3.3.1"), None)];
        let (index, _) = EvidenceIndex::build(&rows);
        let first = index.lookup("3.3.1", Some("a|a|b"));
        let second = index.lookup("3.3.1", Some("a|a|b"));
        assert_eq!(first, second);
        assert_eq!(first, vec!["a", "b", "Doc"]);
    }

    #[test]
    fn lookup_unknown_control_and_no_text() {
        let index = EvidenceIndex::default();
        assert!(index.lookup("9.9.9", None).is_empty());
    }
}
