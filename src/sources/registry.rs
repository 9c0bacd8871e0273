use std::sync::Arc;

use reqwest::blocking::Client;

use crate::config::{AgentConfig, Config, SourceConfig};
use crate::errors::FeederResult;
use crate::sources::browser::{Browser, WebDriver};
use crate::sources::category_list::CategoryListSource;
use crate::sources::composite::CompositeSource;
use crate::sources::link_list::LinkListSource;
use crate::sources::post_list::PostListSource;
use crate::sources::rendered::RenderedSource;
use crate::sources::rss::RssSource;
use crate::sources::traits::NewsSource;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Turns source descriptions into live adapters sharing one HTTP client
pub struct SourceRegistry {
    client: Client,
    browser: Arc<dyn Browser>,
}

impl SourceRegistry {
    pub fn new(config: &Config) -> FeederResult<Self> {
        let client = Client::builder()
            .timeout(config.http_timeout)
            .user_agent(USER_AGENT)
            .build()?;
        let browser = WebDriver::new(&config.webdriver_url, config.http_timeout)?;

        Ok(Self::with_parts(client, Arc::new(browser)))
    }

    pub fn with_parts(client: Client, browser: Arc<dyn Browser>) -> Self {
        Self { client, browser }
    }

    pub fn build(&self, config: &SourceConfig) -> FeederResult<Box<dyn NewsSource>> {
        let source: Box<dyn NewsSource> = match config {
            SourceConfig::Rss(c) => Box::new(RssSource::new(self.client.clone(), c)?),
            SourceConfig::PostList(c) => Box::new(PostListSource::new(self.client.clone(), c)?),
            SourceConfig::LinkList(c) => Box::new(LinkListSource::new(self.client.clone(), c)?),
            SourceConfig::CategoryList(c) => {
                Box::new(CategoryListSource::new(self.client.clone(), c)?)
            }
            SourceConfig::Rendered(c) => Box::new(RenderedSource::new(self.browser.clone(), c)?),
        };
        Ok(source)
    }

    /// A single source is used as is; several are merged under the agent's name
    pub fn build_agent_source(&self, agent: &AgentConfig) -> FeederResult<Box<dyn NewsSource>> {
        let mut sources = agent
            .sources
            .iter()
            .map(|c| self.build(c))
            .collect::<FeederResult<Vec<_>>>()?;

        if sources.len() == 1 {
            if let Some(source) = sources.pop() {
                return Ok(source);
            }
        }

        Ok(Box::new(CompositeSource::new(agent.name.clone(), sources)))
    }
}
