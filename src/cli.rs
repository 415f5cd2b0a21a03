use std::path::{Path, PathBuf};

mod check;
mod config;
mod run;
mod terminal;

use anyhow::Context;
use clap::ArgAction;
use lousd::Config;

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// The path to the documentation content root
    #[arg(short, long, default_value = "docs", global = true)]
    root: PathBuf,

    /// Workshop configuration file (TOML)
    ///
    /// Defaults to the built-in Learn OpenUSD workshop configuration.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        let config = load_config(self.config.as_deref())?;

        self.command
            .unwrap_or_else(|| Command::Run(run::Command::default()))
            .run(self.root, config)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    path.map_or_else(
        || Ok(Config::default()),
        |path| {
            Config::load(path)
                .with_context(|| format!("failed to load configuration from {}", path.display()))
        },
    )
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Trim the documentation tree for the workshop (default)
    ///
    /// Updates the site title, replaces the root index, deletes removed
    /// modules and setup pages, and converts references to removed content
    /// into external links.
    Run(run::Command),

    /// List references that would be converted into external links
    Check(check::Command),

    /// Show or write the workshop configuration
    Config(config::Command),
}

impl Command {
    fn run(self, root: PathBuf, config: Config) -> anyhow::Result<()> {
        match self {
            Self::Run(command) => command.run(root, config)?,
            Self::Check(command) => command.run(root, config)?,
            Self::Config(command) => command.run(&config)?,
        }
        Ok(())
    }
}

/// Output format shared by the reporting commands.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}
