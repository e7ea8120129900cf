pub mod config;
mod error;
pub mod evidence;
pub mod family;
pub mod filter;
pub mod record;
pub mod summary;
pub mod text;
pub mod validate;

pub use config::Config;
pub use error::ConfigError;
pub use evidence::{BuildStats, EvidenceIndex, EvidenceIndexBuilder, format_entry};
pub use filter::ControlFilter;
pub use record::{ControlRecord, EvidenceRecord, RemediationStatus, Score};
pub use summary::{RunSummary, compute_summary};
pub use text::{control_title, parse_delimited};
pub use validate::{Finding, FindingKind, ValidationReport, validate_controls};
