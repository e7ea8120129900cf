//! Input layer: delimited text tables for control and evidence datasets.

mod error;
pub use error::StoreError;

pub mod dataset;
pub mod delimited;

pub use dataset::{load_controls, load_evidence};
pub use delimited::{Delimiter, Table};
