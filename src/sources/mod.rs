pub mod traits;
pub mod dates;
pub mod html;
pub mod rss;
pub mod post_list;
pub mod link_list;
pub mod category_list;
pub mod browser;
pub mod rendered;
pub mod composite;
pub mod registry;

pub use traits::{fetch_or_empty, NewsSource};
pub use composite::CompositeSource;
pub use registry::SourceRegistry;
