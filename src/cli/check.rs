use std::path::PathBuf;

use lousd::{Config, Trimmer};
use tracing::instrument;

use super::{OutputFormat, terminal::Colorize};

#[derive(Debug, clap::Parser)]
pub struct Command {
    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,
}

impl Command {
    #[instrument(skip(config))]
    pub fn run(self, root: PathBuf, config: Config) -> anyhow::Result<()> {
        let report = Trimmer::new(root, config).check()?;

        if let OutputFormat::Json = self.output {
            println!("{}", serde_json::to_string_pretty(&report)?);
            return Ok(());
        }

        if report.documents.is_empty() {
            println!("{}", "✅ No references to removed content.".success());
        } else {
            println!(
                "{}",
                format!(
                    "⚠️  {} references to removed content in {} documents:",
                    report.rewrite_count(),
                    report.documents.len()
                )
                .warning()
            );
            for document in &report.documents {
                println!();
                println!("{}", document.path.display());
                for rewrite in &document.rewrites {
                    println!("  • {}", rewrite.original);
                    println!("    {}", format!("→ {}", rewrite.replacement).dim());
                }
            }
        }

        for escaping in &report.outside_root {
            println!(
                "{}",
                format!(
                    "⚠️  {}: '{}' points outside the content root",
                    escaping.document.display(),
                    escaping.reference
                )
                .warning()
            );
        }

        Ok(())
    }
}
