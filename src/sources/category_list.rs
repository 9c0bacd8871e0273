use chrono::{DateTime, Local};
use reqwest::blocking::Client;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::domain::NewsItem;
use crate::errors::FeederResult;
use crate::sources::dates;
use crate::sources::html::{self, first_text, link_of};
use crate::sources::traits::NewsSource;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryListConfig {
    pub name: String,
    pub url: String,
    /// Anchor wrapping a whole story card
    pub block_selector: String,
    pub title_selector: String,
    pub category_selector: String,
}

/// Story cards that are themselves links, each tagged with a section name
pub struct CategoryListSource {
    name: String,
    url: Url,
    client: Client,
    block: Selector,
    title: Selector,
    category: Selector,
}

impl CategoryListSource {
    pub fn new(client: Client, config: &CategoryListConfig) -> FeederResult<Self> {
        Ok(Self {
            name: config.name.clone(),
            url: html::parse_base_url(&config.url)?,
            client,
            block: html::selector(&config.block_selector)?,
            title: html::selector(&config.title_selector)?,
            category: html::selector(&config.category_selector)?,
        })
    }

    fn extract(&self, body: &str, now: DateTime<Local>) -> Vec<NewsItem> {
        let document = Html::parse_document(body);
        let date = dates::display_date(None, now);
        let mut items = Vec::new();

        for block in document.select(&self.block) {
            let Some(title) = first_text(block, &self.title) else {
                debug!(source = %self.name, "skipping card without title");
                continue;
            };
            let Some(link) = link_of(block, None, &self.url) else {
                debug!(source = %self.name, %title, "skipping card without link");
                continue;
            };
            let category = first_text(block, &self.category);

            match NewsItem::new(title, link, self.name.as_str(), date.as_str()) {
                Ok(item) => items.push(item.with_category(category)),
                Err(e) => debug!(source = %self.name, error = %e, "skipping invalid card"),
            }
        }

        items
    }
}

impl NewsSource for CategoryListSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self) -> FeederResult<Vec<NewsItem>> {
        let body = html::fetch_page(&self.client, &self.url)?;
        Ok(self.extract(&body, Local::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::dates::fixed_now;

    fn source() -> CategoryListSource {
        CategoryListSource::new(
            Client::new(),
            &CategoryListConfig {
                name: "SAMPI Campinas".to_string(),
                url: "https://sampi.net.br/campinas".to_string(),
                block_selector: ".container .row a.hoverActive".to_string(),
                title_selector: "h3".to_string(),
                category_selector: "span".to_string(),
            },
        )
        .unwrap()
    }

    #[test]
    fn test_extracts_title_and_category() {
        let body = r#"
            <div class="container"><div class="row">
              <a class="hoverActive" href="/campinas/cidades/2026/10/ponte">
                <span>Cidades</span><h3>Ponte é liberada</h3>
              </a>
              <a class="hoverActive" href="https://sampi.net.br/campinas/esportes/jogo">
                <h3>Guarani vence</h3>
              </a>
              <a class="hoverActive" href="/campinas/sem-titulo"><span>Geral</span></a>
              <a class="inactive" href="/campinas/ignorada"><h3>Ignorada</h3></a>
            </div></div>"#;

        let items = source().extract(body, fixed_now());

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title(), "Ponte é liberada");
        assert_eq!(items[0].category(), Some("Cidades"));
        assert_eq!(items[0].link(), "https://sampi.net.br/campinas/cidades/2026/10/ponte");
        assert_eq!(items[1].title(), "Guarani vence");
        assert_eq!(items[1].category(), None);
    }
}
