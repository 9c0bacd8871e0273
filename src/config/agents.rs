use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{FeederError, FeederResult};
use crate::sources::category_list::CategoryListConfig;
use crate::sources::link_list::LinkListConfig;
use crate::sources::post_list::{PostListConfig, Recency};
use crate::sources::rendered::RenderedConfig;
use crate::sources::rss::RssConfig;

/// Store shared by every agent that does not ask for its own
pub const SHARED_CACHE_FILE: &str = "news_cache.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SourceConfig {
    Rss(RssConfig),
    PostList(PostListConfig),
    LinkList(LinkListConfig),
    Rendered(RenderedConfig),
    CategoryList(CategoryListConfig),
}

impl SourceConfig {
    pub fn name(&self) -> &str {
        match self {
            SourceConfig::Rss(c) => &c.name,
            SourceConfig::PostList(c) => &c.name,
            SourceConfig::LinkList(c) => &c.name,
            SourceConfig::Rendered(c) => &c.name,
            SourceConfig::CategoryList(c) => &c.name,
        }
    }

    pub fn url(&self) -> &str {
        match self {
            SourceConfig::Rss(c) => &c.url,
            SourceConfig::PostList(c) => &c.url,
            SourceConfig::LinkList(c) => &c.url,
            SourceConfig::Rendered(c) => &c.url,
            SourceConfig::CategoryList(c) => &c.url,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SourceConfig::Rss(_) => "rss",
            SourceConfig::PostList(_) => "post_list",
            SourceConfig::LinkList(_) => "link_list",
            SourceConfig::Rendered(_) => "rendered",
            SourceConfig::CategoryList(_) => "category_list",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    pub name: String,
    /// Dedup store file name, relative to the data directory
    pub cache_file: String,
    pub sources: Vec<SourceConfig>,
}

/// Load the agent table from `path`, or the built-in table when absent
pub fn load(path: Option<&Path>) -> FeederResult<Vec<AgentConfig>> {
    let agents = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            serde_json::from_str(&content).map_err(|e| {
                FeederError::Config(format!("invalid agents file {}: {}", path.display(), e))
            })?
        }
        None => default_agents(),
    };

    validate(&agents)?;
    Ok(agents)
}

pub fn validate(agents: &[AgentConfig]) -> FeederResult<()> {
    if agents.is_empty() {
        return Err(FeederError::Config("no agents configured".to_string()));
    }

    let mut names = HashSet::new();
    for agent in agents {
        if agent.name.trim().is_empty() {
            return Err(FeederError::Config("agent with empty name".to_string()));
        }
        if !names.insert(agent.name.as_str()) {
            return Err(FeederError::Config(format!("duplicate agent name: {}", agent.name)));
        }
        if agent.cache_file.trim().is_empty() {
            return Err(FeederError::Config(format!("agent {} has no cache file", agent.name)));
        }
        if agent.sources.is_empty() {
            return Err(FeederError::Config(format!("agent {} has no sources", agent.name)));
        }
    }

    Ok(())
}

/// The Campinas news agents, in polling order
pub fn default_agents() -> Vec<AgentConfig> {
    vec![
        AgentConfig {
            name: "G1".to_string(),
            cache_file: SHARED_CACHE_FILE.to_string(),
            sources: vec![
                SourceConfig::Rss(RssConfig {
                    name: "G1 Campinas (RSS)".to_string(),
                    url: "https://g1.globo.com/rss/globo/campinas/".to_string(),
                }),
                SourceConfig::Rss(RssConfig {
                    name: "G1 Nacional (RSS)".to_string(),
                    url: "https://g1.globo.com/rss/globo/".to_string(),
                }),
                SourceConfig::PostList(PostListConfig {
                    name: "G1 Campinas (Site)".to_string(),
                    url: "https://g1.globo.com/sp/campinas-regiao/".to_string(),
                    post_selector: ".feed-post-body".to_string(),
                    title_selector: ".feed-post-body-title".to_string(),
                    link_selector: "a".to_string(),
                    time_selector: Some(".feed-post-datetime".to_string()),
                    summary_selector: None,
                    recency: Recency::TodayOrRelative {
                        markers: vec!["hora".to_string()],
                    },
                }),
            ],
        },
        AgentConfig {
            name: "Hora Campinas".to_string(),
            cache_file: SHARED_CACHE_FILE.to_string(),
            sources: vec![SourceConfig::PostList(PostListConfig {
                name: "Hora Campinas".to_string(),
                url: "https://horacampinas.com.br/ultimas-noticias/".to_string(),
                post_selector: "article.jeg_post".to_string(),
                title_selector: "h3.jeg_post_title a".to_string(),
                link_selector: "h3.jeg_post_title a".to_string(),
                time_selector: Some(".jeg_meta_date a".to_string()),
                summary_selector: Some(".jeg_post_excerpt p".to_string()),
                recency: Recency::Any,
            })],
        },
        AgentConfig {
            name: "Prefeitura de Campinas".to_string(),
            cache_file: SHARED_CACHE_FILE.to_string(),
            sources: vec![SourceConfig::Rendered(RenderedConfig {
                name: "Prefeitura de Campinas".to_string(),
                url: "https://campinas.sp.gov.br/mais-noticias/".to_string(),
                block_selector: "li.mt-5.divisor.ng-star-inserted".to_string(),
                title_selector: "p".to_string(),
                link_selector: "a".to_string(),
                date_selector: Some("span.block.color-helper".to_string()),
                wait_secs: 10,
            })],
        },
        AgentConfig {
            name: "SAMPI Campinas".to_string(),
            cache_file: "news_cache_sampi.json".to_string(),
            sources: vec![SourceConfig::CategoryList(CategoryListConfig {
                name: "SAMPI Campinas".to_string(),
                url: "https://sampi.net.br/campinas".to_string(),
                block_selector: ".container .row a.hoverActive".to_string(),
                title_selector: "h3".to_string(),
                category_selector: "span".to_string(),
            })],
        },
        AgentConfig {
            name: "Jornal Local".to_string(),
            cache_file: SHARED_CACHE_FILE.to_string(),
            sources: vec![SourceConfig::LinkList(LinkListConfig {
                name: "Jornal Local".to_string(),
                url: "https://jornalocal.com.br/campinas/".to_string(),
                selector: ".entry-title a".to_string(),
            })],
        },
    ]
}
