//! Headless browser access over the W3C WebDriver HTTP protocol.
//!
//! A session is a scoped resource: `WebDriverSession` deletes the remote
//! session when dropped, so every exit path of a fetch releases the browser.

use std::thread;
use std::time::{Duration, Instant};

use reqwest::blocking::Client;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::errors::{FeederError, FeederResult};

pub const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:9515";

const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Floor for a single poll so the last one still has a chance to answer
const MIN_POLL_LIMIT: Duration = Duration::from_millis(100);

pub trait Browser {
    fn open(&self) -> FeederResult<Box<dyn BrowserSession>>;
}

/// A live page. Dropping it must release the browser.
pub trait BrowserSession {
    fn navigate(&mut self, url: &str) -> FeederResult<()>;
    /// Number of elements currently matching a CSS selector. The query
    /// itself must give up after `limit`.
    fn count(&mut self, css: &str, limit: Duration) -> FeederResult<usize>;
    /// Serialized DOM after scripts have run
    fn page_source(&mut self) -> FeederResult<String>;
}

/// Poll until `css` matches at least one element, or fail after `timeout`.
/// Each poll is bounded by the time left, so a slow driver cannot stretch the wait.
pub fn wait_for(session: &mut dyn BrowserSession, css: &str, timeout: Duration) -> FeederResult<usize> {
    let started = Instant::now();
    let timed_out = || {
        FeederError::Browser(format!("timed out after {:?} waiting for {}", timeout, css))
    };

    loop {
        let remaining = timeout.saturating_sub(started.elapsed()).max(MIN_POLL_LIMIT);
        match session.count(css, remaining) {
            Ok(found) if found > 0 => return Ok(found),
            Ok(_) => {}
            Err(_) if started.elapsed() >= timeout => return Err(timed_out()),
            Err(e) => return Err(e),
        }
        if started.elapsed() >= timeout {
            return Err(timed_out());
        }
        thread::sleep(POLL_INTERVAL.min(timeout.saturating_sub(started.elapsed())));
    }
}

#[derive(Debug, Deserialize)]
struct Reply<T> {
    value: T,
}

#[derive(Debug, Deserialize)]
struct NewSession {
    #[serde(rename = "sessionId")]
    session_id: String,
}

#[derive(Debug, Deserialize)]
struct ErrorValue {
    error: String,
    #[serde(default)]
    message: String,
}

/// Remote end such as chromedriver, driving headless Chrome
pub struct WebDriver {
    endpoint: String,
    client: Client,
}

impl WebDriver {
    pub fn new(endpoint: &str, timeout: Duration) -> FeederResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn capabilities() -> Value {
        json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": "chrome",
                    "goog:chromeOptions": {
                        "args": ["--headless", "--no-sandbox", "--disable-dev-shm-usage"]
                    }
                }
            }
        })
    }
}

impl Browser for WebDriver {
    fn open(&self) -> FeederResult<Box<dyn BrowserSession>> {
        let reply: NewSession = call(
            &self.client,
            Method::POST,
            &format!("{}/session", self.endpoint),
            Some(Self::capabilities()),
            None,
        )?;
        debug!(session = %reply.session_id, "browser session opened");

        Ok(Box::new(WebDriverSession {
            base: format!("{}/session/{}", self.endpoint, reply.session_id),
            client: self.client.clone(),
        }))
    }
}

pub struct WebDriverSession {
    base: String,
    client: Client,
}

impl BrowserSession for WebDriverSession {
    fn navigate(&mut self, url: &str) -> FeederResult<()> {
        let _: Value = call(
            &self.client,
            Method::POST,
            &format!("{}/url", self.base),
            Some(json!({ "url": url })),
            None,
        )?;
        Ok(())
    }

    fn count(&mut self, css: &str, limit: Duration) -> FeederResult<usize> {
        let elements: Vec<Value> = call(
            &self.client,
            Method::POST,
            &format!("{}/elements", self.base),
            Some(json!({ "using": "css selector", "value": css })),
            Some(limit),
        )?;
        Ok(elements.len())
    }

    fn page_source(&mut self) -> FeederResult<String> {
        call(&self.client, Method::GET, &format!("{}/source", self.base), None, None)
    }
}

impl Drop for WebDriverSession {
    fn drop(&mut self) {
        match self.client.delete(&self.base).send() {
            Ok(response) if response.status().is_success() => {
                debug!(session = %self.base, "browser session closed");
            }
            Ok(response) => {
                warn!(session = %self.base, status = %response.status(), "browser session close rejected");
            }
            Err(e) => warn!(session = %self.base, error = %e, "browser session close failed"),
        }
    }
}

fn call<T: DeserializeOwned>(
    client: &Client,
    method: Method,
    url: &str,
    body: Option<Value>,
    timeout: Option<Duration>,
) -> FeederResult<T> {
    let mut request = client.request(method, url);
    if let Some(body) = body {
        request = request.json(&body);
    }
    if let Some(timeout) = timeout {
        request = request.timeout(timeout);
    }

    let response = request.send()?;
    let status = response.status();
    let text = response.text()?;

    if !status.is_success() {
        let detail = serde_json::from_str::<Reply<ErrorValue>>(&text)
            .map(|r| format!("{}: {}", r.value.error, r.value.message))
            .unwrap_or_else(|_| text.chars().take(200).collect());
        return Err(FeederError::Browser(format!("{} {}", status, detail)));
    }

    let reply: Reply<T> = serde_json::from_str(&text)
        .map_err(|e| FeederError::Browser(format!("unexpected WebDriver reply: {}", e)))?;
    Ok(reply.value)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CountingSession {
        counts: Vec<usize>,
    }

    impl BrowserSession for CountingSession {
        fn navigate(&mut self, _url: &str) -> FeederResult<()> {
            Ok(())
        }

        fn count(&mut self, _css: &str, _limit: Duration) -> FeederResult<usize> {
            Ok(if self.counts.len() > 1 {
                self.counts.remove(0)
            } else {
                self.counts[0]
            })
        }

        fn page_source(&mut self) -> FeederResult<String> {
            Ok(String::new())
        }
    }

    #[test]
    fn test_wait_for_returns_once_present() {
        let mut session = CountingSession { counts: vec![0, 0, 3] };
        let found = wait_for(&mut session, "li", Duration::from_secs(5)).unwrap();
        assert_eq!(found, 3);
    }

    #[test]
    fn test_wait_for_times_out() {
        let mut session = CountingSession { counts: vec![0] };
        let err = wait_for(&mut session, "li.news", Duration::ZERO).unwrap_err();
        assert!(matches!(err, FeederError::Browser(msg) if msg.contains("li.news")));
    }

    /// Driver that answers slowly: each query blocks for its whole limit
    struct SlowSession {
        limits: Vec<Duration>,
    }

    impl BrowserSession for SlowSession {
        fn navigate(&mut self, _url: &str) -> FeederResult<()> {
            Ok(())
        }

        fn count(&mut self, _css: &str, limit: Duration) -> FeederResult<usize> {
            self.limits.push(limit);
            thread::sleep(limit);
            Err(FeederError::Browser("operation timed out".to_string()))
        }

        fn page_source(&mut self) -> FeederResult<String> {
            Ok(String::new())
        }
    }

    #[test]
    fn test_slow_polls_stay_within_wait_bound() {
        let timeout = Duration::from_millis(400);
        let mut session = SlowSession { limits: Vec::new() };

        let started = Instant::now();
        let err = wait_for(&mut session, "li.news", timeout).unwrap_err();

        assert!(matches!(err, FeederError::Browser(msg) if msg.contains("timed out after")));
        assert!(started.elapsed() < timeout + Duration::from_secs(1));
        assert!(session.limits.iter().all(|limit| *limit <= timeout));
    }

    #[test]
    fn test_driver_error_before_deadline_is_returned() {
        struct Broken;

        impl BrowserSession for Broken {
            fn navigate(&mut self, _url: &str) -> FeederResult<()> {
                Ok(())
            }

            fn count(&mut self, _css: &str, _limit: Duration) -> FeederResult<usize> {
                Err(FeederError::Browser("invalid session id".to_string()))
            }

            fn page_source(&mut self) -> FeederResult<String> {
                Ok(String::new())
            }
        }

        let err = wait_for(&mut Broken, "li", Duration::from_secs(5)).unwrap_err();
        assert!(matches!(err, FeederError::Browser(msg) if msg.contains("invalid session id")));
    }

    #[test]
    fn test_capabilities_are_headless_chrome() {
        let caps = WebDriver::capabilities();
        let always = &caps["capabilities"]["alwaysMatch"];
        assert_eq!(always["browserName"], "chrome");
        assert_eq!(always["goog:chromeOptions"]["args"][0], "--headless");
    }

    #[test]
    fn test_session_reply_parses() {
        let reply: Reply<NewSession> =
            serde_json::from_str(r#"{"value":{"sessionId":"abc123","capabilities":{}}}"#).unwrap();
        assert_eq!(reply.value.session_id, "abc123");
    }
}
