pub mod json;

pub use json::{JsonFormatter, SnapshotJson, SnapshotSummary};
