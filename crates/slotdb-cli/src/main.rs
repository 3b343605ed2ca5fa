//! slotdb command-line interface
//!
//! Tools for exercising and inspecting slotted pages.
//!
//! # Usage
//!
//! ```bash
//! # Fill a page with random words, then delete, compact and shrink it
//! slotdb demo --page-size 1024 --seed 7
//!
//! # Show the header and slot directory after a few operations
//! slotdb layout --page-size 128 --insert AB --insert CDE --delete 0 --compact
//!
//! # Use page settings from a config file
//! slotdb --config slotdb.toml demo
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod demo;
mod layout;

use config::CliConfig;
use demo::DemoArgs;
use layout::LayoutArgs;

/// slotdb command-line interface
#[derive(Parser, Debug)]
#[command(
    name = "slotdb",
    version,
    about = "Exercise and inspect slotted pages",
    long_about = "Tools for exercising and inspecting slotdb slotted pages.\n\n\
                  Pages are built in memory; nothing is written to disk."
)]
struct Cli {
    /// Page size in bytes (overrides the config file)
    #[arg(short = 's', long, global = true, env = "SLOTDB_PAGE_SIZE")]
    page_size: Option<usize>,

    /// Configuration file path
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fill a page with random words, then empty it again
    Demo(DemoArgs),
    /// Apply operations to a fresh page and print its layout
    Layout(LayoutArgs),
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let config = CliConfig::load(cli.config.as_deref())?.with_page_size(cli.page_size)?;
    info!(page_size = config.page.page_size, "loaded configuration");

    match &cli.command {
        Command::Demo(args) => demo::run(&config.page, args).map(|_| ()),
        Command::Layout(args) => layout::run(&config.page, args),
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("slotdb=debug,slotdb_page=trace,slotdb_buffer=debug")
    } else {
        EnvFilter::new("slotdb=warn,slotdb_page=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_layout() {
        let cli = Cli::try_parse_from([
            "slotdb",
            "layout",
            "--page-size",
            "128",
            "--insert",
            "AB",
            "--insert",
            "CDE",
            "--update",
            "1=XY",
            "--delete",
            "0",
            "--compact",
        ])
        .unwrap();

        assert_eq!(cli.page_size, Some(128));
        let Command::Layout(args) = cli.command else {
            panic!("expected layout command");
        };
        assert_eq!(args.inserts, vec!["AB", "CDE"]);
        assert_eq!(args.updates, vec![(1, "XY".to_string())]);
        assert_eq!(args.deletes, vec![0]);
        assert!(args.compact);
        assert!(!args.shrink);
    }

    #[test]
    fn test_parse_demo_defaults() {
        let cli = Cli::try_parse_from(["slotdb", "demo"]).unwrap();
        let Command::Demo(args) = cli.command else {
            panic!("expected demo command");
        };
        assert_eq!(args.seed, 42);
        assert!(args.words.is_none());
    }

    #[test]
    fn test_rejects_bad_update() {
        assert!(Cli::try_parse_from(["slotdb", "layout", "--update", "oops"]).is_err());
    }
}
