use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

use tracing::{error, info, warn};

use crate::domain::NewsItem;
use crate::services::agent::Agent;
use crate::services::notification_service::Notifier;
use crate::storage::{DedupStore, RunLogRepository};

/// Outcome of one pass over every agent
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub agents_run: usize,
    pub failed_agents: Vec<String>,
    pub found: usize,
    pub delivered: usize,
    pub failed_deliveries: usize,
}

pub struct Monitor<S: DedupStore, N: Notifier, L: RunLogRepository> {
    agents: Vec<Agent<S>>,
    notifier: N,
    run_log: L,
    interval: Duration,
}

impl<S: DedupStore, N: Notifier, L: RunLogRepository> Monitor<S, N, L> {
    pub fn new(agents: Vec<Agent<S>>, notifier: N, run_log: L, interval: Duration) -> Self {
        Self {
            agents,
            notifier,
            run_log,
            interval,
        }
    }

    /// Run every agent once, in order. A failing or panicking agent is
    /// logged and skipped; the rest of the cycle still runs.
    pub fn run_cycle(&mut self) -> CycleReport {
        let mut report = CycleReport::default();

        for agent in &mut self.agents {
            report.agents_run += 1;
            let name = agent.name().to_string();

            let items = match panic::catch_unwind(AssertUnwindSafe(|| agent.run())) {
                Ok(Ok(items)) => items,
                Ok(Err(e)) => {
                    error!(agent = %name, error = %e, "agent failed");
                    report.failed_agents.push(name);
                    continue;
                }
                Err(payload) => {
                    error!(agent = %name, panic = %panic_message(payload.as_ref()), "agent panicked");
                    report.failed_agents.push(name);
                    continue;
                }
            };

            if items.is_empty() {
                continue;
            }
            report.found += items.len();

            let (delivered, failed) = deliver(&self.notifier, &name, &items);
            report.delivered += delivered;
            report.failed_deliveries += failed;

            if delivered == 0 {
                continue;
            }
            if let Err(e) = self.run_log.record(&name, delivered) {
                warn!(agent = %name, error = %e, "could not update run log");
            }
        }

        report
    }

    /// Cycle until `shutdown` fires or its sender is dropped. The interval
    /// counts from the end of one cycle to the start of the next.
    pub fn run(&mut self, shutdown: &Receiver<()>) {
        info!(agents = self.agents.len(), interval = ?self.interval, "monitor started");

        loop {
            let report = self.run_cycle();
            info!(
                agents = report.agents_run,
                failed = report.failed_agents.len(),
                found = report.found,
                delivered = report.delivered,
                "cycle complete"
            );

            match shutdown.recv_timeout(self.interval) {
                Err(RecvTimeoutError::Timeout) => continue,
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        info!("monitor stopped");
    }
}

fn deliver<N: Notifier>(notifier: &N, agent: &str, items: &[NewsItem]) -> (usize, usize) {
    let mut delivered = 0;
    let mut failed = 0;

    for item in items {
        match notifier.send(item) {
            Ok(()) => delivered += 1,
            Err(e) => {
                warn!(agent, title = item.title(), error = %e, "delivery failed");
                failed += 1;
            }
        }
    }

    (delivered, failed)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
