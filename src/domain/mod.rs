pub mod fingerprint;
pub mod news_item;
pub mod notification;

pub use fingerprint::Fingerprint;
pub use news_item::NewsItem;
pub use notification::{Notification, MAX_MESSAGE_CHARS};
