//! Sitebinder main entry point
//!
//! This is the command-line interface for the sitebinder document compiler.

use anyhow::Context;
use clap::Parser;
use sitebinder::compiler::{plan_jobs, CompileOptions, Compiler};
use sitebinder::config::load_config;
use sitebinder::output::print_summary;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Sitebinder: compile website sections into offline documents
///
/// Sitebinder crawls the configured sections of a website with bounded
/// depth, rebuilds the page hierarchy, and writes one self-contained HTML
/// document per configured output.
#[derive(Parser, Debug)]
#[command(name = "sitebinder")]
#[command(version = "0.2.0")]
#[command(about = "Compile website sections into offline documents", long_about = None)]
struct Cli {
    /// Path to JSON configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Directory output documents are written to
    #[arg(short, long, default_value = "output")]
    output_dir: PathBuf,

    /// Compile only the section with this name
    #[arg(long, value_name = "NAME")]
    section: Option<String>,

    /// Validate config and show what would be compiled without fetching
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = load_config(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;

    if cli.dry_run {
        handle_dry_run(&config, cli.section.as_deref());
        return Ok(());
    }

    let options = CompileOptions {
        output_dir: cli.output_dir,
        section_filter: cli.section,
    };

    let compiler = Compiler::new(config, options).context("failed to initialize compiler")?;
    let summary = compiler.run().await.context("compile run failed")?;

    if !cli.quiet {
        print_summary(&summary);
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sitebinder=info,warn"),
            1 => EnvFilter::new("sitebinder=debug,info"),
            2 => EnvFilter::new("sitebinder=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows what would be compiled
fn handle_dry_run(config: &sitebinder::config::Config, section_filter: Option<&str>) {
    println!("=== Sitebinder Dry Run ===\n");

    println!("Settings:");
    println!("  Request delay: {}ms", config.settings.request_delay_ms);
    println!("  Max retries: {}", config.settings.max_retries);
    println!("  Timeout: {}s", config.settings.timeout_secs);
    println!("  Download images: {}", config.settings.download_images);
    match &config.settings.stylesheet_path {
        Some(path) => println!("  Stylesheet: {}", path.display()),
        None => println!("  Stylesheet: embedded default"),
    }

    let jobs = plan_jobs(config, section_filter);
    println!("\nDocuments to compile ({}):", jobs.len());
    for job in &jobs {
        println!("  - {}", job.name);
        for section in &job.sections {
            println!(
                "    section '{}': {} entry pages, max depth {}",
                section.section_name,
                section.pages.len(),
                section.max_depth.unwrap_or(1)
            );
            for page in &section.pages {
                println!("      * {}", page.url);
            }
        }
    }

    println!("\n✓ Configuration is valid");
    let entry_count: usize = jobs
        .iter()
        .flat_map(|j| j.sections.iter())
        .map(|s| s.pages.len())
        .sum();
    println!("✓ Would start compiling from {} entry pages", entry_count);
}
