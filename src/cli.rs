use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::catalog::HttpCatalogApi;
use crate::generator::Generator;
use crate::load_config::load_config;
use crate::writer::write_output;

/// CLI for api-power: generate TypeScript request code from YApi catalogs.
#[derive(Parser)]
#[clap(
    name = "api-power",
    version,
    about = "Generate typed TypeScript request functions from YApi-compatible API catalogs"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch every configured catalog and write the generated files
    Generate {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
        /// Directory relative output paths are resolved against (defaults to the current one)
        #[clap(long)]
        cwd: Option<PathBuf>,
        /// Print what would be generated without writing anything
        #[clap(long)]
        dry_run: bool,
    },
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Generate {
            config,
            cwd,
            dry_run,
        } => {
            let config = load_config(&config)?;
            let cwd = match cwd {
                Some(dir) if dir.is_absolute() => dir,
                Some(dir) => std::env::current_dir()
                    .context("Failed to read the current directory")?
                    .join(dir),
                None => std::env::current_dir().context("Failed to read the current directory")?,
            };

            println!("Generation starting...");
            let mut generator = Generator::new(config, cwd, HttpCatalogApi::new());
            let files = match generator.run().await {
                Ok(files) => files,
                Err(e) => {
                    eprintln!("[ERROR] Generation failed: {}", e);
                    return Err(anyhow::Error::new(e).context("Generation failed"));
                }
            };

            if dry_run {
                println!("Dry run, nothing written. Would generate:");
                for (path, group) in &files {
                    println!("  {} ({} interfaces)", path.display(), group.fragments.len());
                }
                return Ok(());
            }

            let report = write_output(generator.cwd(), &files).context("Failed to write generated files")?;
            println!("Generation complete.\nReport:");
            for (path, group) in &files {
                println!("  {} ({} interfaces)", path.display(), group.fragments.len());
            }
            for stub in &report.stubs {
                println!("  created {}", stub.display());
            }
            if let Some(index) = &report.index {
                println!("  index {}", index.display());
            }
            Ok(())
        }
    }
}
