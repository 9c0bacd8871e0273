pub mod agent;
pub mod monitor;
pub mod notification_service;

pub use agent::{build_agents, Agent};
pub use monitor::{CycleReport, Monitor};
pub use notification_service::{DryRunNotifier, NotificationService, Notifier};
