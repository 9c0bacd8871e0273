use tracing::{info, warn};

use crate::domain::NewsItem;
use crate::errors::FeederResult;

pub trait NewsSource {
    /// Display name, stamped on every item as its source
    fn name(&self) -> &str;

    /// Fetch and normalize the current items, already filtered to recent ones
    fn fetch(&self) -> FeederResult<Vec<NewsItem>>;
}

/// Fetch from `source`, turning any failure into an empty result
pub fn fetch_or_empty(source: &dyn NewsSource) -> Vec<NewsItem> {
    match source.fetch() {
        Ok(items) => {
            info!(source = source.name(), count = items.len(), "fetched items");
            items
        }
        Err(e) => {
            warn!(source = source.name(), error = %e, "fetch failed");
            Vec::new()
        }
    }
}
