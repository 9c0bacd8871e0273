use std::sync::mpsc;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use newswatch::cli::{Cli, Commands};
use newswatch::config::{agents, AgentConfig, Config};
use newswatch::services::{build_agents, Agent, DryRunNotifier, Monitor, NotificationService, Notifier};
use newswatch::sources::SourceRegistry;
use newswatch::storage::{JsonDedupStore, JsonRunLog};

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::from_env().context("loading configuration")?;
    let agents = agents::load(config.agents_file.as_deref()).context("loading agent table")?;

    match cli.command() {
        Commands::List => {
            cmd_list(&agents);
            Ok(())
        }
        Commands::Run { once, dry_run } => cmd_run(&config, &agents, once, dry_run),
    }
}

fn cmd_list(agents: &[AgentConfig]) {
    println!("Configured agents:\n");
    for agent in agents {
        println!("  {} (store: {})", agent.name, agent.cache_file);
        for source in &agent.sources {
            println!("    [{}] {}: {}", source.kind(), source.name(), source.url());
        }
        println!();
    }
}

fn cmd_run(config: &Config, agents: &[AgentConfig], once: bool, dry_run: bool) -> anyhow::Result<()> {
    let registry = SourceRegistry::new(config).context("building HTTP clients")?;
    let agents = build_agents(agents, &registry, &config.data_dir).context("building agents")?;
    let run_log = JsonRunLog::new(config.run_log_path());

    info!(data_dir = %config.data_dir.display(), dry_run, once, "starting");

    if dry_run {
        run_monitor(agents, DryRunNotifier, run_log, config, once);
    } else {
        let notifier = NotificationService::new(config).context("setting up Telegram")?;
        run_monitor(agents, notifier, run_log, config, once);
    }

    Ok(())
}

fn run_monitor<N: Notifier>(
    agents: Vec<Agent<JsonDedupStore>>,
    notifier: N,
    run_log: JsonRunLog,
    config: &Config,
    once: bool,
) {
    let mut monitor = Monitor::new(agents, notifier, run_log, config.interval);

    if once {
        let report = monitor.run_cycle();
        info!(
            agents = report.agents_run,
            failed = report.failed_agents.len(),
            found = report.found,
            delivered = report.delivered,
            "cycle complete"
        );
        return;
    }

    // Nothing ever sends on this channel; the process runs until killed
    let (_stop_tx, stop_rx) = mpsc::channel();
    monitor.run(&stop_rx);
}
