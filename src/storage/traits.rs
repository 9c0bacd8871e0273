use crate::domain::Fingerprint;
use crate::errors::FeederResult;

/// Set of fingerprints an agent has already reported
#[cfg_attr(test, mockall::automock)]
pub trait DedupStore {
    /// Replace the in-memory set with the persisted one. Unreadable state
    /// starts empty; this never fails.
    fn load(&mut self);
    fn contains(&self, fingerprint: &Fingerprint) -> bool;
    /// In-memory only
    fn add(&mut self, fingerprint: Fingerprint);
    fn persist(&self) -> FeederResult<()>;
}

#[cfg_attr(test, mockall::automock)]
pub trait RunLogRepository {
    /// Overwrite the entry for `agent` with `news_sent` and the current time
    fn record(&self, agent: &str, news_sent: usize) -> FeederResult<()>;
}
