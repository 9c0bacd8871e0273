use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local};
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::domain::NewsItem;
use crate::errors::FeederResult;
use crate::sources::browser::{self, Browser};
use crate::sources::dates;
use crate::sources::html::{self, first_text, link_of};
use crate::sources::traits::NewsSource;

fn default_wait_secs() -> u64 {
    10
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedConfig {
    pub name: String,
    pub url: String,
    /// Element that only exists once page scripts have rendered the list
    pub block_selector: String,
    pub title_selector: String,
    pub link_selector: String,
    #[serde(default)]
    pub date_selector: Option<String>,
    #[serde(default = "default_wait_secs")]
    pub wait_secs: u64,
}

/// Page whose listing is built by JavaScript; needs a headless browser.
/// The slowest and heaviest source, one session per fetch.
pub struct RenderedSource {
    name: String,
    url: Url,
    browser: Arc<dyn Browser>,
    block_css: String,
    block: Selector,
    title: Selector,
    link: Selector,
    date: Option<Selector>,
    wait: Duration,
}

impl RenderedSource {
    pub fn new(browser: Arc<dyn Browser>, config: &RenderedConfig) -> FeederResult<Self> {
        Ok(Self {
            name: config.name.clone(),
            url: html::parse_base_url(&config.url)?,
            browser,
            block_css: config.block_selector.clone(),
            block: html::selector(&config.block_selector)?,
            title: html::selector(&config.title_selector)?,
            link: html::selector(&config.link_selector)?,
            date: html::optional_selector(config.date_selector.as_deref())?,
            wait: Duration::from_secs(config.wait_secs),
        })
    }

    /// Render the page and return its DOM; the session is released on every path
    fn render(&self) -> FeederResult<String> {
        let mut session = self.browser.open()?;
        session.navigate(self.url.as_str())?;
        let found = browser::wait_for(session.as_mut(), &self.block_css, self.wait)?;
        debug!(source = %self.name, blocks = found, "page rendered");
        session.page_source()
    }

    fn extract(&self, body: &str, now: DateTime<Local>) -> Vec<NewsItem> {
        let document = Html::parse_document(body);
        let mut items = Vec::new();

        for block in document.select(&self.block) {
            let Some(title) = first_text(block, &self.title) else {
                debug!(source = %self.name, "skipping block without title");
                continue;
            };
            let Some(link) = link_of(block, Some(&self.link), &self.url) else {
                debug!(source = %self.name, %title, "skipping block without link");
                continue;
            };
            let parsed = self
                .date
                .as_ref()
                .and_then(|date| first_text(block, date))
                .and_then(|text| dates::parse_date(&text, now));

            match NewsItem::new(title, link, self.name.as_str(), dates::display_date(parsed, now)) {
                Ok(item) => items.push(item),
                Err(e) => debug!(source = %self.name, error = %e, "skipping invalid block"),
            }
        }

        items
    }
}

impl NewsSource for RenderedSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self) -> FeederResult<Vec<NewsItem>> {
        let body = self.render()?;
        Ok(self.extract(&body, Local::now()))
    }
}
