use std::path::PathBuf;

use lousd::Config;
use tracing::instrument;

use crate::cli::terminal::Colorize;

/// Show or write the workshop configuration
///
/// Without `--config`, the built-in Learn OpenUSD workshop configuration is
/// used.
#[derive(Debug, clap::Parser)]
pub struct Command {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Debug, clap::Parser)]
enum ConfigCommand {
    /// Print the effective configuration as TOML
    Show,

    /// Write the effective configuration to a TOML file
    Init {
        /// Where to write the configuration
        #[arg(default_value = "workshop.toml")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

impl Command {
    #[instrument(skip(config))]
    pub fn run(self, config: &Config) -> anyhow::Result<()> {
        match self.command {
            ConfigCommand::Show => {
                print!("{}", config.to_toml()?);
            }
            ConfigCommand::Init { path, force } => {
                if path.exists() && !force {
                    anyhow::bail!(
                        "{} already exists (use --force to overwrite)",
                        path.display()
                    );
                }
                config.save(&path)?;
                println!(
                    "{}",
                    format!("✅ Wrote configuration to {}", path.display()).success()
                );
                println!(
                    "{}",
                    format!("Use it with: workshop-prep --config {}", path.display()).dim()
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_writes_loadable_configuration() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("workshop.toml");
        let command = Command {
            command: ConfigCommand::Init {
                path: path.clone(),
                force: false,
            },
        };

        command.run(&Config::default()).unwrap();

        assert_eq!(Config::load(&path).unwrap(), Config::default());
    }

    #[test]
    fn init_refuses_to_overwrite() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("workshop.toml");
        std::fs::write(&path, "existing").unwrap();
        let command = Command {
            command: ConfigCommand::Init {
                path: path.clone(),
                force: false,
            },
        };

        assert!(command.run(&Config::default()).is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "existing");
    }
}
