use html_escape::encode_text;

use super::NewsItem;

/// Telegram rejects messages longer than this
pub const MAX_MESSAGE_CHARS: usize = 4096;

#[derive(Debug, Clone)]
pub struct Notification {
    pub title: String,
    pub date: String,
    pub link: String,
    pub source: String,
    pub category: Option<String>,
    pub summary: Option<String>,
}

impl Notification {
    pub fn from_item(item: &NewsItem) -> Self {
        Self {
            title: item.title().to_string(),
            date: item.date().to_string(),
            link: item.link().to_string(),
            source: item.source().to_string(),
            category: item.category().map(str::to_string),
            summary: item.summary().map(str::to_string),
        }
    }

    /// HTML message, every field entity-escaped, at most `MAX_MESSAGE_CHARS`
    /// long. The summary is shortened first, then the title, then the link.
    pub fn format(&self) -> String {
        let full = self.render(self.summary.as_deref());
        if fits(&full) {
            return full;
        }

        if let Some(summary) = self.summary.as_deref() {
            if let Some(message) = shrink_until_fits(summary, |s| self.render(Some(s))) {
                return message;
            }
        }

        let mut bare = self.clone();
        bare.summary = None;
        if let Some(message) = shrink_until_fits(&self.title, |t| {
            bare.title = t.to_string();
            bare.render(None)
        }) {
            return message;
        }

        bare.title.clear();
        if let Some(message) = shrink_until_fits(&self.link, |l| {
            bare.link = l.to_string();
            bare.render(None)
        }) {
            return message;
        }

        truncate_to_char_boundary(&bare.render(None), MAX_MESSAGE_CHARS)
    }

    fn render(&self, summary: Option<&str>) -> String {
        let mut message = format!(
            "📌 <b>{}</b>\n📅 Date: {}\n🔗 Link: {}\n📢 Source: {}",
            encode_text(&self.title),
            encode_text(&self.date),
            encode_text(&self.link),
            encode_text(&self.source),
        );

        if let Some(category) = &self.category {
            message.push_str("\n🏷️ Category: ");
            message.push_str(&encode_text(category));
        }

        if let Some(summary) = summary.filter(|s| !s.is_empty()) {
            message.push_str("\n📝 ");
            message.push_str(&encode_text(summary));
        }

        message
    }
}

fn fits(message: &str) -> bool {
    message.chars().count() <= MAX_MESSAGE_CHARS
}

/// Shorten `text` until `render` of it fits, or `None` if even an empty one doesn't
fn shrink_until_fits(text: &str, mut render: impl FnMut(&str) -> String) -> Option<String> {
    let mut keep = text.chars().count();
    loop {
        let message = render(&truncate_to_char_boundary(text, keep));
        let len = message.chars().count();
        if len <= MAX_MESSAGE_CHARS {
            return Some(message);
        }
        if keep == 0 {
            return None;
        }
        // Escaping can expand each char, so scale rather than subtract
        keep = (keep * MAX_MESSAGE_CHARS / len).min(keep - 1);
    }
}

/// Truncate string to at most `max_chars` characters, respecting char boundaries
fn truncate_to_char_boundary(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}
