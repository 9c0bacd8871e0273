use chrono::{DateTime, Local};
use reqwest::blocking::Client;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::domain::NewsItem;
use crate::errors::FeederResult;
use crate::sources::dates;
use crate::sources::html::{self, element_text, link_of};
use crate::sources::traits::NewsSource;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkListConfig {
    pub name: String,
    pub url: String,
    /// Matches the headline anchors directly
    pub selector: String,
}

/// Bare list of headline anchors. There is no publish date, so items are
/// stamped with the fetch time and nothing is filtered out.
pub struct LinkListSource {
    name: String,
    url: Url,
    client: Client,
    anchor: Selector,
}

impl LinkListSource {
    pub fn new(client: Client, config: &LinkListConfig) -> FeederResult<Self> {
        Ok(Self {
            name: config.name.clone(),
            url: html::parse_base_url(&config.url)?,
            client,
            anchor: html::selector(&config.selector)?,
        })
    }

    fn extract(&self, body: &str, now: DateTime<Local>) -> Vec<NewsItem> {
        let document = Html::parse_document(body);
        let date = dates::display_date(None, now);

        document
            .select(&self.anchor)
            .filter_map(|anchor| {
                let title = element_text(anchor);
                let link = link_of(anchor, None, &self.url)?;
                match NewsItem::new(title, link, self.name.as_str(), date.as_str()) {
                    Ok(item) => Some(item),
                    Err(e) => {
                        debug!(source = %self.name, error = %e, "skipping anchor");
                        None
                    }
                }
            })
            .collect()
    }
}

impl NewsSource for LinkListSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self) -> FeederResult<Vec<NewsItem>> {
        let body = html::fetch_page(&self.client, &self.url)?;
        Ok(self.extract(&body, Local::now()))
    }
}
