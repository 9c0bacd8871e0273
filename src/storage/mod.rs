pub mod traits;
pub mod json_file;
pub mod dedup_store;
pub mod run_log;

pub use traits::{DedupStore, RunLogRepository};
pub use dedup_store::JsonDedupStore;
pub use run_log::{JsonRunLog, RunLogEntry};
