use reqwest::blocking::Client;
use scraper::{ElementRef, Selector};
use url::Url;

use crate::errors::{FeederError, FeederResult};

pub fn selector(css: &str) -> FeederResult<Selector> {
    Selector::parse(css).map_err(|e| FeederError::Selector(format!("{}: {}", css, e)))
}

pub fn optional_selector(css: Option<&str>) -> FeederResult<Option<Selector>> {
    css.map(selector).transpose()
}

pub fn parse_base_url(url: &str) -> FeederResult<Url> {
    Url::parse(url).map_err(|e| FeederError::InvalidUrl(format!("{}: {}", url, e)))
}

/// GET a page body, failing on non-2xx responses
pub fn fetch_page(client: &Client, url: &Url) -> FeederResult<String> {
    let response = client.get(url.as_str()).send()?.error_for_status()?;
    Ok(response.text()?)
}

/// Text content with whitespace collapsed and trimmed
pub fn element_text(element: ElementRef<'_>) -> String {
    let text: String = element.text().collect();
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Text of the first descendant matching `selector`, if any and non-empty
pub fn first_text(element: ElementRef<'_>, selector: &Selector) -> Option<String> {
    element
        .select(selector)
        .next()
        .map(element_text)
        .filter(|t| !t.is_empty())
}

/// Resolve an `href` against the page URL; absolute links pass through
pub fn resolve_link(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') || href.starts_with("javascript:") {
        return None;
    }
    base.join(href).ok().map(|u| u.to_string())
}

/// `href` of `element` itself when it is an anchor, else of its first match for `selector`
pub fn link_of(element: ElementRef<'_>, selector: Option<&Selector>, base: &Url) -> Option<String> {
    let anchor = match selector {
        Some(selector) => element.select(selector).next()?,
        None => element,
    };
    anchor
        .value()
        .attr("href")
        .and_then(|href| resolve_link(base, href))
}
