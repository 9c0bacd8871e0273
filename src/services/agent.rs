use std::path::Path;

use tracing::{debug, info};

use crate::config::AgentConfig;
use crate::domain::NewsItem;
use crate::errors::FeederResult;
use crate::sources::{fetch_or_empty, NewsSource, SourceRegistry};
use crate::storage::{DedupStore, JsonDedupStore};

/// One source paired with the store of fingerprints it has already reported
pub struct Agent<S: DedupStore> {
    name: String,
    source: Box<dyn NewsSource>,
    store: S,
}

impl<S: DedupStore> Agent<S> {
    pub fn new(name: impl Into<String>, source: Box<dyn NewsSource>, store: S) -> Self {
        Self {
            name: name.into(),
            source,
            store,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Fetch and return only the items not reported before. The store is
    /// re-read first so agents sharing a file see each other's additions,
    /// and written back only when something new was found.
    pub fn run(&mut self) -> FeederResult<Vec<NewsItem>> {
        self.store.load();

        let fetched = fetch_or_empty(self.source.as_ref());
        let total = fetched.len();

        let mut fresh = Vec::new();
        for item in fetched {
            let fingerprint = item.fingerprint();
            if self.store.contains(&fingerprint) {
                continue;
            }
            self.store.add(fingerprint);
            fresh.push(item);
        }

        if fresh.is_empty() {
            debug!(agent = %self.name, fetched = total, "nothing new");
            return Ok(fresh);
        }

        self.store.persist()?;
        info!(agent = %self.name, fetched = total, new = fresh.len(), "found new items");
        Ok(fresh)
    }
}

/// Build agents in table order, each with its store under `data_dir`
pub fn build_agents(
    configs: &[AgentConfig],
    registry: &SourceRegistry,
    data_dir: &Path,
) -> FeederResult<Vec<Agent<JsonDedupStore>>> {
    configs
        .iter()
        .map(|config| {
            let source = registry.build_agent_source(config)?;
            let store = JsonDedupStore::open(data_dir.join(&config.cache_file));
            Ok(Agent::new(config.name.clone(), source, store))
        })
        .collect()
}
