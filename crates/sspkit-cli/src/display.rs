//! Vertical card display for control records.
//!
//! Renders a single control as a grouped, human-readable card: identity and
//! status first, then each narrative section, then the reconciled evidence.

use std::fmt;

use sspkit_core::EvidenceIndex;

use crate::view::ControlView;

const MAX_LIST_ITEMS: usize = 10;

// ── Public API ──

/// Render a control as a vertical card.
pub fn render_control_card(view: &ControlView) -> String {
    ControlCard(view).to_string()
}

/// Render the evidence index: one line per control, in first-seen order.
pub fn render_index_overview(index: &EvidenceIndex) -> String {
    IndexOverview(index).to_string()
}

/// Render every indexed entry for one control.
pub fn render_index_entries(index: &EvidenceIndex, control_id: &str) -> String {
    IndexEntries { index, control_id }.to_string()
}

// ── Renderers ──

struct ControlCard<'a>(&'a ControlView);

impl fmt::Display for ControlCard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let view = self.0;
        writeln!(f, "=== {} ===", view.id)?;
        writeln!(f, "{}", view.title)?;
        writeln!(f)?;

        writeln!(f, "Identity")?;
        field(f, "id", &view.id)?;
        field(f, "family", view.family)?;
        match view.score {
            Some(score) => field(f, "score", &score.to_string())?,
            None => field(f, "score", "(invalid)")?,
        }
        field(f, "status", view.status)?;
        writeln!(f)?;

        section(f, "Policy Summary", &view.policy_summary)?;
        section(f, "Azure Mechanism", &view.azure_mechanism)?;
        section(
            f,
            "Azure Configuration Process",
            &view.azure_configuration_process,
        )?;
        section(f, "Azure Evidence", &view.azure_evidence)?;
        section(f, "AVD/Laptop Environment", &view.avd_laptop)?;
        section(f, "AVD/Laptop Evidence", &view.avd_laptop_evidence)?;
        section(f, "Evidence Strings", &view.evidence)
    }
}

struct IndexOverview<'a>(&'a EvidenceIndex);

impl fmt::Display for IndexOverview<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let index = self.0;
        writeln!(
            f,
            "Evidence index: {} controls, {} entries",
            index.len(),
            index.total_entries()
        )?;
        writeln!(f)?;
        for (control_id, entries) in index.iter() {
            writeln!(f, "  {:<26} {}", control_id, entries.len())?;
        }
        Ok(())
    }
}

struct IndexEntries<'a> {
    index: &'a EvidenceIndex,
    control_id: &'a str,
}

impl fmt::Display for IndexEntries<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.index.get(self.control_id);
        writeln!(f, "{} ({} entries)", self.control_id, entries.len())?;
        for entry in entries {
            writeln!(f, "  - {entry}")?;
        }
        Ok(())
    }
}

// ── Section rendering ──

fn field(f: &mut fmt::Formatter<'_>, name: &str, value: &str) -> fmt::Result {
    writeln!(f, "  {:<26} {}", name, value)
}

fn section(f: &mut fmt::Formatter<'_>, header: &str, items: &[String]) -> fmt::Result {
    if items.is_empty() {
        return Ok(());
    }

    writeln!(f, "{header} ({}):", items.len())?;
    for item in items.iter().take(MAX_LIST_ITEMS) {
        writeln!(f, "  - {item}")?;
    }
    if items.len() > MAX_LIST_ITEMS {
        writeln!(f, "  ... and {} more", items.len() - MAX_LIST_ITEMS)?;
    }
    writeln!(f)
}
