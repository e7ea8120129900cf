//! Render-ready view of a control row with its reconciled evidence.

use serde::Serialize;
use sspkit_core::family::{family_for, family_key};
use sspkit_core::record::non_blank;
use sspkit_core::{ControlRecord, EvidenceIndex, control_title, parse_delimited};

/// Policy cells that were exported from an untouched template.
const EMPTY_POLICY_TEMPLATE: &str = "header;bullet_1;bullet_2";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControlView {
    pub id: String,
    pub title: String,
    pub family: &'static str,
    pub status: &'static str,
    pub score: Option<u8>,
    pub policy_summary: Vec<String>,
    pub azure_mechanism: Vec<String>,
    pub azure_configuration_process: Vec<String>,
    pub azure_evidence: Vec<String>,
    pub avd_laptop: Vec<String>,
    pub avd_laptop_evidence: Vec<String>,
    /// Inline evidence merged with the evidence index.
    pub evidence: Vec<String>,
}

impl ControlView {
    /// Build the view for a row. Returns `None` for rows without an id.
    pub fn build(record: &ControlRecord, index: &EvidenceIndex) -> Option<Self> {
        let id = record.control_id()?;

        let policy = record
            .policy_statement
            .as_deref()
            .filter(|p| p.trim() != EMPTY_POLICY_TEMPLATE);

        Some(Self {
            id: id.to_string(),
            title: control_title(record.control.as_deref()),
            family: family_for(id),
            status: record.remediation_status().label(),
            score: record.score().map(|s| s.value()),
            policy_summary: narrative_items(policy),
            azure_mechanism: narrative_items(record.azure_mechanism.as_deref()),
            azure_configuration_process: narrative_items(
                record.azure_configuration_process.as_deref(),
            ),
            azure_evidence: parse_delimited(record.azure_evidence.as_deref()),
            avd_laptop: narrative_items(record.avd_laptop.as_deref()),
            avd_laptop_evidence: parse_delimited(record.avd_laptop_evidence.as_deref()),
            evidence: index.lookup(id, record.evidence_strings.as_deref()),
        })
    }

    pub fn family_key(&self) -> &'static str {
        family_key(self.family)
    }
}

/// Delimited narrative items; a non-blank cell that normalises to nothing is
/// kept verbatim as a single paragraph.
fn narrative_items(raw: Option<&str>) -> Vec<String> {
    let items = parse_delimited(raw);
    match non_blank(raw) {
        Some(text) if items.is_empty() => vec![text.to_string()],
        _ => items,
    }
}

/// Views grouped by family key, groups and members in first-seen order.
pub fn group_by_family(views: Vec<ControlView>) -> Vec<(&'static str, Vec<ControlView>)> {
    let mut groups: Vec<(&'static str, Vec<ControlView>)> = Vec::new();
    for view in views {
        let key = view.family_key();
        match groups.iter().position(|(k, _)| *k == key) {
            Some(i) => groups[i].1.push(view),
            None => groups.push((key, vec![view])),
        }
    }
    groups
}
