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

/// Which posts on a listing count as recent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum Recency {
    /// Time text carries a relative marker, or parses to today. Posts with no
    /// time element are dropped.
    TodayOrRelative { markers: Vec<String> },
    /// The listing only shows fresh posts; keep everything
    Any,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostListConfig {
    pub name: String,
    pub url: String,
    /// Repeating container, one per post
    pub post_selector: String,
    pub title_selector: String,
    /// Anchor inside the post carrying the article link
    pub link_selector: String,
    #[serde(default)]
    pub time_selector: Option<String>,
    #[serde(default)]
    pub summary_selector: Option<String>,
    pub recency: Recency,
}

/// Static HTML listing with one container element per post
pub struct PostListSource {
    name: String,
    url: Url,
    client: Client,
    post: Selector,
    title: Selector,
    link: Selector,
    time: Option<Selector>,
    summary: Option<Selector>,
    recency: Recency,
}

impl PostListSource {
    pub fn new(client: Client, config: &PostListConfig) -> FeederResult<Self> {
        Ok(Self {
            name: config.name.clone(),
            url: html::parse_base_url(&config.url)?,
            client,
            post: html::selector(&config.post_selector)?,
            title: html::selector(&config.title_selector)?,
            link: html::selector(&config.link_selector)?,
            time: html::optional_selector(config.time_selector.as_deref())?,
            summary: html::optional_selector(config.summary_selector.as_deref())?,
            recency: config.recency.clone(),
        })
    }

    fn extract(&self, body: &str, now: DateTime<Local>) -> Vec<NewsItem> {
        let document = Html::parse_document(body);
        let mut items = Vec::new();

        let posts: Vec<_> = document.select(&self.post).collect();
        debug!(source = %self.name, posts = posts.len(), "scraped listing");

        for post in posts {
            let Some(title) = first_text(post, &self.title) else {
                continue;
            };
            let Some(link) = link_of(post, Some(&self.link), &self.url) else {
                debug!(source = %self.name, %title, "skipping post without link");
                continue;
            };

            let time_text = self.time.as_ref().and_then(|time| first_text(post, time));
            let parsed = time_text.as_deref().and_then(|t| dates::parse_date(t, now));

            if let Recency::TodayOrRelative { markers } = &self.recency {
                let Some(text) = time_text.as_deref() else {
                    debug!(source = %self.name, %title, "skipping post without time");
                    continue;
                };
                if !dates::has_relative_marker(text, markers) && !dates::is_today(parsed, now) {
                    debug!(source = %self.name, %title, time = text, "skipping post not from today");
                    continue;
                }
            }

            let summary = self.summary.as_ref().and_then(|s| first_text(post, s));
            let date = dates::display_date(parsed, now);

            match NewsItem::new(title, link, self.name.as_str(), date) {
                Ok(item) => items.push(item.with_summary(summary)),
                Err(e) => debug!(source = %self.name, error = %e, "skipping invalid post"),
            }
        }

        items
    }
}

impl NewsSource for PostListSource {
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
    use crate::errors::FeederError;
    use crate::sources::dates::fixed_now;

    fn g1_config() -> PostListConfig {
        PostListConfig {
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
        }
    }

    fn g1_post(title: &str, href: &str, time: Option<&str>) -> String {
        let time = time
            .map(|t| format!(r#"<span class="feed-post-datetime">{}</span>"#, t))
            .unwrap_or_default();
        format!(
            r#"<div class="feed-post-body">
                 <div class="feed-post-body-title"><a href="{}">{}</a></div>
                 <div class="feed-post-metadata">{}</div>
               </div>"#,
            href, title, time
        )
    }

    fn page(posts: &[String]) -> String {
        format!("<html><body><main>{}</main></body></html>", posts.concat())
    }

    #[test]
    fn test_relative_and_today_posts_are_kept() {
        let source = PostListSource::new(Client::new(), &g1_config()).unwrap();
        let body = page(&[
            g1_post("Há duas horas", "https://g1.globo.com/1.ghtml", Some("Há 2 horas")),
            g1_post("Hoje cedo", "https://g1.globo.com/2.ghtml", Some("16/10/2026 08h10")),
            g1_post("Ano passado", "https://g1.globo.com/3.ghtml", Some("01/01/2024 10h00")),
            g1_post("Ontem", "https://g1.globo.com/4.ghtml", Some("ontem")),
            g1_post("Sem horário", "https://g1.globo.com/5.ghtml", None),
        ]);

        let items = source.extract(&body, fixed_now());
        let titles: Vec<_> = items.iter().map(|i| i.title()).collect();

        assert_eq!(titles, vec!["Há duas horas", "Hoje cedo"]);
        assert_eq!(items[0].date(), "16/10/2026 13:00");
        assert_eq!(items[1].date(), "16/10/2026 08:10");
        assert_eq!(items[1].source(), "G1 Campinas (Site)");
    }

    #[test]
    fn test_unparseable_times_yield_nothing() {
        let source = PostListSource::new(Client::new(), &g1_config()).unwrap();
        let body = page(&[
            g1_post("A", "https://g1.globo.com/a.ghtml", Some("ontem")),
            g1_post("B", "https://g1.globo.com/b.ghtml", Some("semana passada")),
        ]);

        assert!(source.extract(&body, fixed_now()).is_empty());
    }

    #[test]
    fn test_relative_links_resolved() {
        let source = PostListSource::new(Client::new(), &g1_config()).unwrap();
        let body = page(&[g1_post("Relativo", "/sp/campinas-regiao/noticia/x.ghtml", Some("Há 1 hora"))]);

        let items = source.extract(&body, fixed_now());
        assert_eq!(items[0].link(), "https://g1.globo.com/sp/campinas-regiao/noticia/x.ghtml");
    }

    #[test]
    fn test_any_recency_with_summary() {
        let config = PostListConfig {
            name: "Hora Campinas".to_string(),
            url: "https://horacampinas.com.br/ultimas-noticias/".to_string(),
            post_selector: "article.jeg_post".to_string(),
            title_selector: "h3.jeg_post_title a".to_string(),
            link_selector: "h3.jeg_post_title a".to_string(),
            time_selector: Some(".jeg_meta_date a".to_string()),
            summary_selector: Some(".jeg_post_excerpt p".to_string()),
            recency: Recency::Any,
        };
        let source = PostListSource::new(Client::new(), &config).unwrap();
        let body = r##"
            <article class="jeg_post">
              <h3 class="jeg_post_title"><a href="https://horacampinas.com.br/obra/">Obra no centro</a></h3>
              <div class="jeg_meta_date"><a href="#">15 de outubro de 2026</a></div>
              <div class="jeg_post_excerpt"><p>Trecho interditado até sexta.</p></div>
            </article>
            <article class="jeg_post">
              <h3 class="jeg_post_title"><a href="https://horacampinas.com.br/sem-data/">Sem data</a></h3>
            </article>"##;

        let items = source.extract(body, fixed_now());

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].link(), "https://horacampinas.com.br/obra/");
        assert_eq!(items[0].summary(), Some("Trecho interditado até sexta."));
        assert_eq!(items[0].date(), "15/10/2026 00:00");
        assert_eq!(items[1].summary(), None);
        assert_eq!(items[1].date(), "16/10/2026 15:00");
    }

    #[test]
    fn test_invalid_selector_rejected() {
        let mut config = g1_config();
        config.post_selector = "div[".to_string();
        assert!(matches!(
            PostListSource::new(Client::new(), &config),
            Err(FeederError::Selector(_))
        ));
    }

    #[test]
    fn test_recency_serde_shape() {
        let json = serde_json::to_value(Recency::TodayOrRelative {
            markers: vec!["hora".to_string()],
        })
        .unwrap();
        assert_eq!(json["policy"], "today_or_relative");
        assert_eq!(json["markers"][0], "hora");
    }
}
