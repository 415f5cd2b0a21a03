use std::{
    io::{self, BufRead},
    path::{Path, PathBuf},
};

use lousd::{Config, Mode, Report, Trimmer};
use tracing::instrument;

use super::{OutputFormat, terminal::Colorize};

#[derive(Debug, Default, clap::Parser)]
pub struct Command {
    /// Show what would be changed without making changes
    #[arg(long)]
    dry_run: bool,

    /// Skip the confirmation prompt
    #[arg(long, short)]
    yes: bool,

    /// Suppress output
    #[arg(long, short)]
    quiet: bool,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,
}

impl Command {
    #[instrument(skip(config))]
    pub fn run(self, root: PathBuf, config: Config) -> anyhow::Result<()> {
        let mode = if self.dry_run {
            Mode::DryRun
        } else {
            Mode::Apply
        };

        if mode == Mode::Apply && !self.yes && !self.quiet {
            Self::confirm(&root, &config)?;
        }

        let report = Trimmer::new(root.clone(), config).with_mode(mode).run()?;

        match self.output {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
            OutputFormat::Table if self.quiet => {}
            OutputFormat::Table => Self::output_table(&report, &root),
        }

        Ok(())
    }

    fn confirm(root: &Path, config: &Config) -> anyhow::Result<()> {
        eprintln!(
            "Will trim {} for the workshop. The following will be deleted:",
            root.display()
        );
        for module in config.removed_modules() {
            eprintln!("  • {module}/");
        }
        for file in config.removed_files() {
            eprintln!("  • {file}");
        }
        for module in config.kept_modules() {
            eprintln!("  • {module}/setup.md");
        }

        eprint!("\nProceed? (y/N) ");
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        if !line.trim().eq_ignore_ascii_case("y") {
            println!("Cancelled");
            std::process::exit(130);
        }
        Ok(())
    }

    fn output_table(report: &Report, root: &Path) {
        let verb = |past: &'static str, future: &'static str| {
            if report.dry_run { future } else { past }
        };

        if report.dry_run {
            println!("{}", "Dry run: no files were changed.".info());
            println!();
        }

        if report.title_updated {
            println!("✓ {} site title", verb("Updated", "Would update"));
        }
        if report.index_replaced {
            println!("✓ {} index.md", verb("Replaced", "Would replace"));
        }

        print_paths(
            verb("Removed", "Would remove"),
            "module directories",
            &report.removed_directories,
        );
        print_paths(
            verb("Removed", "Would remove"),
            "files",
            &report.removed_files,
        );
        print_paths(
            verb("Removed", "Would remove"),
            "setup pages",
            &report.removed_setup_pages,
        );

        if !report.documents.is_empty() {
            println!(
                "✓ {} {} references in {} documents",
                verb("Converted", "Would convert"),
                report.rewrite_count(),
                report.documents.len()
            );
            for document in &report.documents {
                println!(
                    "  • {} ({})",
                    document.path.display(),
                    document.rewrites.len()
                );
            }
        }

        if !report.outside_root.is_empty() {
            println!(
                "{}",
                format!(
                    "⚠️  {} references point outside the content root and were left unchanged:",
                    report.outside_root.len()
                )
                .warning()
            );
            for escaping in &report.outside_root {
                println!("  • {}: {}", escaping.document.display(), escaping.reference);
            }
        }

        if !report.dry_run {
            let docs = root.display();
            println!();
            println!("{}", "✅ Workshop preparation complete!".success());
            println!();
            println!("Next steps:");
            println!("  1. Review the changes with: git diff");
            println!("  2. Build the docs with: uv run sphinx-build -M html {docs}/ {docs}/_build/");
            println!(
                "  3. Preview locally with: uv run python -m http.server 8000 -d {docs}/_build/html/"
            );
        }
    }
}

fn print_paths(verb: &str, what: &str, paths: &[PathBuf]) {
    if paths.is_empty() {
        return;
    }
    println!("✓ {verb} {} {what}", paths.len());
    for path in paths {
        println!("  {}", format!("• {}", path.display()).dim());
    }
}
