use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

use channels::{ChannelClient, ParseMode};
use tracing::{debug, info};

use crate::config::Config;
use crate::domain::{NewsItem, Notification};
use crate::errors::FeederResult;

#[cfg_attr(test, mockall::automock)]
pub trait Notifier {
    /// Deliver one item. Failures are reported, never retried here.
    fn send(&self, item: &NewsItem) -> FeederResult<()>;
}

/// Keeps consecutive sends at least `delay` apart, across all agents
#[derive(Debug)]
pub struct SendPacer {
    delay: Duration,
    last: Option<Instant>,
}

impl SendPacer {
    pub fn new(delay: Duration) -> Self {
        Self { delay, last: None }
    }

    /// Time still to wait before a send at `now` is allowed
    pub fn remaining(&self, now: Instant) -> Duration {
        match self.last {
            Some(last) => self.delay.saturating_sub(now.saturating_duration_since(last)),
            None => Duration::ZERO,
        }
    }

    pub fn wait(&mut self) {
        let pause = self.remaining(Instant::now());
        if !pause.is_zero() {
            debug!(?pause, "pacing send");
            thread::sleep(pause);
        }
        self.last = Some(Instant::now());
    }
}

/// Posts items to a Telegram chat
pub struct NotificationService {
    client: ChannelClient,
    chat_id: String,
    pacer: Mutex<SendPacer>,
}

impl NotificationService {
    pub fn new(config: &Config) -> FeederResult<Self> {
        let credentials = config.telegram_credentials()?;
        let client = ChannelClient::new(&config.telegram_api_url, &credentials.token)?;

        Ok(Self {
            client,
            chat_id: credentials.chat_id,
            pacer: Mutex::new(SendPacer::new(config.send_delay)),
        })
    }
}

impl Notifier for NotificationService {
    fn send(&self, item: &NewsItem) -> FeederResult<()> {
        let message = Notification::from_item(item).format();

        // A poisoned lock only means an earlier send panicked; pacing state is still valid
        self.pacer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .wait();

        let sent = self.client.send_message(&self.chat_id, &message, ParseMode::Html)?;
        debug!(message_id = sent.message_id, title = item.title(), "notification delivered");
        Ok(())
    }
}

/// Logs what would be sent instead of sending it
#[derive(Debug, Default)]
pub struct DryRunNotifier;

impl Notifier for DryRunNotifier {
    fn send(&self, item: &NewsItem) -> FeederResult<()> {
        let message = Notification::from_item(item).format();
        info!(source = item.source(), "[DRY RUN] would send:\n{}", message);
        Ok(())
    }
}
