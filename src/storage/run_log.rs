use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::FeederResult;
use crate::storage::json_file;
use crate::storage::traits::RunLogRepository;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunLogEntry {
    pub news_sent: usize,
    pub last_update: String,
}

/// Per-agent delivery log stored as a JSON object keyed by agent name
pub struct JsonRunLog {
    path: PathBuf,
}

impl JsonRunLog {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current entries; an unreadable log is treated as empty
    pub fn entries(&self) -> BTreeMap<String, RunLogEntry> {
        match json_file::read(&self.path) {
            Ok(entries) => entries.unwrap_or_default(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "unreadable run log, starting empty");
                BTreeMap::new()
            }
        }
    }

    pub fn record_at(&self, agent: &str, news_sent: usize, at: NaiveDateTime) -> FeederResult<()> {
        let mut entries = self.entries();
        entries.insert(
            agent.to_string(),
            RunLogEntry {
                news_sent,
                last_update: at.format(TIMESTAMP_FORMAT).to_string(),
            },
        );
        json_file::write_atomic(&self.path, &entries)
    }
}

impl RunLogRepository for JsonRunLog {
    fn record(&self, agent: &str, news_sent: usize) -> FeederResult<()> {
        self.record_at(agent, news_sent, Local::now().naive_local())
    }
}
