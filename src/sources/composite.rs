use crate::domain::NewsItem;
use crate::errors::FeederResult;
use crate::sources::traits::{fetch_or_empty, NewsSource};

/// Several sources reported under one agent. A failing child contributes
/// nothing without affecting its siblings.
pub struct CompositeSource {
    name: String,
    sources: Vec<Box<dyn NewsSource>>,
}

impl CompositeSource {
    pub fn new(name: impl Into<String>, sources: Vec<Box<dyn NewsSource>>) -> Self {
        Self {
            name: name.into(),
            sources,
        }
    }
}

impl NewsSource for CompositeSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self) -> FeederResult<Vec<NewsItem>> {
        Ok(self
            .sources
            .iter()
            .flat_map(|source| fetch_or_empty(source.as_ref()))
            .collect())
    }
}
