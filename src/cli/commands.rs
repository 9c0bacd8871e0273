use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "newswatch")]
#[command(about = "Polls Campinas news sources and posts new stories to Telegram")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Poll every agent on a fixed interval and send new items (default)
    Run {
        /// Run a single cycle and exit
        #[arg(long)]
        once: bool,

        /// Log what would be sent instead of sending it. Items are still marked as seen
        #[arg(long)]
        dry_run: bool,
    },

    /// List configured agents and their sources
    List,
}

impl Cli {
    /// The subcommand to run; a bare invocation starts the monitor
    pub fn command(&self) -> Commands {
        match &self.command {
            Some(Commands::Run { once, dry_run }) => Commands::Run {
                once: *once,
                dry_run: *dry_run,
            },
            Some(Commands::List) => Commands::List,
            None => Commands::Run {
                once: false,
                dry_run: false,
            },
        }
    }
}
