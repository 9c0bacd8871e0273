use std::hash::{Hash, Hasher};

use url::Url;

use super::Fingerprint;
use crate::errors::{FeederError, FeederResult};

/// A story extracted from a source.
///
/// Identity is `(title, link)`: two fetches of the same story with a
/// refreshed date, summary or category compare equal.
#[derive(Debug, Clone)]
pub struct NewsItem {
    title: String,
    link: String,
    source: String,
    date: String,
    summary: Option<String>,
    category: Option<String>,
}

impl NewsItem {
    /// Build an item; the title must be non-empty and the link an absolute URL
    pub fn new(
        title: impl Into<String>,
        link: impl Into<String>,
        source: impl Into<String>,
        date: impl Into<String>,
    ) -> FeederResult<Self> {
        let title = title.into();
        let link = link.into();

        if title.trim().is_empty() {
            return Err(FeederError::InvalidItem(format!("empty title for {}", link)));
        }
        Url::parse(&link).map_err(|e| FeederError::InvalidUrl(format!("{}: {}", link, e)))?;

        Ok(Self {
            title,
            link,
            source: source.into(),
            date: date.into(),
            summary: None,
            category: None,
        })
    }

    pub fn with_summary(mut self, summary: Option<String>) -> Self {
        self.summary = summary.filter(|s| !s.trim().is_empty());
        self
    }

    pub fn with_category(mut self, category: Option<String>) -> Self {
        self.category = category.filter(|c| !c.trim().is_empty());
        self
    }

    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::of(&self.title, &self.link)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn link(&self) -> &str {
        &self.link
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }
}

impl PartialEq for NewsItem {
    fn eq(&self, other: &Self) -> bool {
        self.title == other.title && self.link == other.link
    }
}

impl Eq for NewsItem {}

impl Hash for NewsItem {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.title.hash(state);
        self.link.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_item() {
        let item = NewsItem::new(
            "Prefeitura anuncia obras",
            "https://campinas.sp.gov.br/noticia/1",
            "Prefeitura de Campinas",
            "16/10/2026 09:00",
        )
        .unwrap()
        .with_category(Some("Obras".to_string()));

        assert_eq!(item.title(), "Prefeitura anuncia obras");
        assert_eq!(item.category(), Some("Obras"));
        assert_eq!(item.summary(), None);
    }

    #[test]
    fn test_rejects_empty_title() {
        let err = NewsItem::new("  ", "https://example.com", "src", "now").unwrap_err();
        assert!(matches!(err, FeederError::InvalidItem(_)));
    }

    #[test]
    fn test_rejects_relative_link() {
        let err = NewsItem::new("Title", "/noticia/1", "src", "now").unwrap_err();
        assert!(matches!(err, FeederError::InvalidUrl(_)));
    }

    #[test]
    fn test_identity_ignores_date_and_extras() {
        let first = NewsItem::new("Title", "https://example.com/a", "src", "16/10/2026 08:00")
            .unwrap();
        let refreshed = NewsItem::new("Title", "https://example.com/a", "other", "16/10/2026 09:30")
            .unwrap()
            .with_summary(Some("updated".to_string()));

        assert_eq!(first, refreshed);
        assert_eq!(first.fingerprint(), refreshed.fingerprint());
    }

    #[test]
    fn test_blank_extras_are_dropped() {
        let item = NewsItem::new("Title", "https://example.com/a", "src", "now")
            .unwrap()
            .with_summary(Some("   ".to_string()))
            .with_category(Some(String::new()));

        assert_eq!(item.summary(), None);
        assert_eq!(item.category(), None);
    }
}
