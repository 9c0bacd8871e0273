//! Best-effort parsing of the date strings news sites print.
//!
//! Parsing is used for two separate things: the display date on a message,
//! which falls back to "now", and the published-today filter, which fails
//! closed on anything unparseable.

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;

pub const DISPLAY_FORMAT: &str = "%d/%m/%Y %H:%M";

/// Formats carrying an explicit offset, tried first
const ZONED_FORMATS: &[&str] = &["%a, %d %b %Y %H:%M:%S %z", "%a, %d %b %Y %H:%M %z"];

const DATE_TIME_FORMATS: &[&str] = &["%d/%m/%Y %Hh%M", "%d/%m/%Y %H:%M", "%d/%m/%Y - %H:%M"];

const DATE_FORMATS: &[&str] = &["%d/%m/%Y", "%d.%m.%Y", "%Y-%m-%d"];

const TIME_FORMATS: &[&str] = &["%Hh%M", "%H:%M"];

const MONTHS: &[&str] = &[
    "janeiro", "fevereiro", "março", "abril", "maio", "junho", "julho", "agosto", "setembro",
    "outubro", "novembro", "dezembro",
];

static LONG_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(\d{1,2})\s+de\s+([a-zç]+)\s+de\s+(\d{4})(?:\D+?(\d{1,2})[h:](\d{2}))?",
    )
    .expect("long date regex")
});

static RELATIVE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d+)\s*(minuto|min|hora|dia)s?\b").expect("relative regex"));

/// Parse `text` into a local timestamp, trying each known format in order
pub fn parse_date(text: &str, now: DateTime<Local>) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    for format in ZONED_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(text, format) {
            return Some(dt.with_timezone(&Local).naive_local());
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Local).naive_local());
    }

    for format in DATE_TIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt);
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Some(date.and_time(NaiveTime::MIN));
        }
    }

    // A bare time on a listing means today
    for format in TIME_FORMATS {
        if let Ok(time) = NaiveTime::parse_from_str(text, format) {
            return Some(now.date_naive().and_time(time));
        }
    }

    parse_long_date(text).or_else(|| parse_relative(text, now))
}

/// "16 de outubro de 2026", optionally followed by a time
fn parse_long_date(text: &str) -> Option<NaiveDateTime> {
    let caps = LONG_DATE.captures(text)?;
    let day: u32 = caps[1].parse().ok()?;
    let month_name = caps[2].to_lowercase();
    let month = MONTHS.iter().position(|m| *m == month_name)? as u32 + 1;
    let year: i32 = caps[3].parse().ok()?;
    let date = NaiveDate::from_ymd_opt(year, month, day)?;

    let time = match (caps.get(4), caps.get(5)) {
        (Some(h), Some(m)) => {
            NaiveTime::from_hms_opt(h.as_str().parse().ok()?, m.as_str().parse().ok()?, 0)?
        }
        _ => NaiveTime::MIN,
    };

    Some(date.and_time(time))
}

/// "Há 2 horas", "30 minutos atrás", "há 1 dia"
fn parse_relative(text: &str, now: DateTime<Local>) -> Option<NaiveDateTime> {
    let caps = RELATIVE.captures(text)?;
    let amount: i64 = caps[1].parse().ok()?;
    let age = match caps[2].to_lowercase().as_str() {
        "minuto" | "min" => Duration::try_minutes(amount)?,
        "hora" => Duration::try_hours(amount)?,
        "dia" => Duration::try_days(amount)?,
        _ => return None,
    };
    now.naive_local().checked_sub_signed(age)
}

/// Whether a parsed timestamp falls on `now`'s calendar day. Unparsed dates never match.
pub fn is_today(parsed: Option<NaiveDateTime>, now: DateTime<Local>) -> bool {
    parsed.is_some_and(|dt| dt.date() == now.date_naive())
}

/// Case-insensitive check for any relative-time marker ("hora", ...)
pub fn has_relative_marker(text: &str, markers: &[String]) -> bool {
    let text = text.to_lowercase();
    markers
        .iter()
        .any(|marker| !marker.is_empty() && text.contains(&marker.to_lowercase()))
}

/// Display form of a parsed date, or of `now` when parsing failed
pub fn display_date(parsed: Option<NaiveDateTime>, now: DateTime<Local>) -> String {
    parsed
        .unwrap_or_else(|| now.naive_local())
        .format(DISPLAY_FORMAT)
        .to_string()
}

#[cfg(test)]
pub(crate) fn fixed_now() -> DateTime<Local> {
    use chrono::TimeZone;
    Local
        .with_ymd_and_hms(2026, 10, 16, 15, 0, 0)
        .earliest()
        .expect("valid local time")
}
