use chrono::{DateTime, Local};
use feed_rs::parser;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::NewsItem;
use crate::errors::{FeederError, FeederResult};
use crate::sources::dates::{self, DISPLAY_FORMAT};
use crate::sources::traits::NewsSource;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RssConfig {
    pub name: String,
    pub url: String,
}

/// Syndication feed keeping only entries published on the current day
pub struct RssSource {
    name: String,
    url: String,
    client: Client,
}

impl RssSource {
    pub fn new(client: Client, config: &RssConfig) -> FeederResult<Self> {
        crate::sources::html::parse_base_url(&config.url)?;
        Ok(Self {
            name: config.name.clone(),
            url: config.url.clone(),
            client,
        })
    }

    fn parse_bytes(bytes: &[u8]) -> FeederResult<feed_rs::model::Feed> {
        parser::parse(bytes).map_err(|e| FeederError::FeedParse(e.to_string()))
    }

    /// Entries dated on `now`'s calendar day; undated entries are dropped
    fn extract(&self, bytes: &[u8], now: DateTime<Local>) -> FeederResult<Vec<NewsItem>> {
        let parsed = Self::parse_bytes(bytes)?;
        debug!(source = %self.name, entries = parsed.entries.len(), "parsed feed");

        let mut items = Vec::new();
        for entry in parsed.entries {
            let title = entry
                .title
                .map(|t| t.content.trim().to_string())
                .unwrap_or_default();

            let Some(link) = entry.links.into_iter().next().map(|l| l.href) else {
                debug!(source = %self.name, %title, "skipping entry without link");
                continue;
            };

            let published = entry
                .published
                .or(entry.updated)
                .map(|dt| dt.with_timezone(&Local).naive_local());

            if !dates::is_today(published, now) {
                debug!(source = %self.name, %title, "skipping entry not published today");
                continue;
            }

            let date = published
                .map(|dt| dt.format(DISPLAY_FORMAT).to_string())
                .unwrap_or_default();

            match NewsItem::new(title, link, self.name.as_str(), date) {
                Ok(item) => items.push(item),
                Err(e) => debug!(source = %self.name, error = %e, "skipping invalid entry"),
            }
        }

        Ok(items)
    }
}

impl NewsSource for RssSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self) -> FeederResult<Vec<NewsItem>> {
        let response = self.client.get(&self.url).send()?.error_for_status()?;
        let bytes = response.bytes()?;

        self.extract(&bytes, Local::now())
    }
}
