//! Paramsync CLI binary entry point.
//! Loads config, delegates to the sync engine and prints results.

use clap::Parser;
use paramsync::cli::{Cli, Commands};
use paramsync::config;
use paramsync::document::YamlFileStore;
use paramsync::error::SyncError;
use paramsync::models::sync_policy::SyncConfig;
use paramsync::output::{self, Printer};
use paramsync::prompt::{AutoConfirm, Confirm, TerminalConfirm};
use paramsync::sync::{FileStatus, SyncOptions, Syncer};
use std::path::Path;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::Sync {
            source,
            target,
            config,
            params,
            delete,
            dry_run,
            sync_template,
            filter,
            yes,
            output,
        } => {
            let output = output.unwrap_or_else(|| "human".to_string());
            let printer = Printer::new(&output);
            let cwd = std::env::current_dir().unwrap_or_else(|_| ".".into());
            let cfg = config::resolve_config(config.as_deref(), &cwd)
                .unwrap_or_else(|e| exit_fatal(&e, &output));
            let opts = SyncOptions {
                dry_run,
                sync_template,
                filter,
                confirm: !yes,
                params,
                delete,
            };
            let outcome = if yes {
                run_single(&cfg, AutoConfirm::new(true), printer, &source, &target, &opts)
            } else {
                run_single(&cfg, TerminalConfirm, printer, &source, &target, &opts)
            };
            output::print_outcome(&outcome, &output);
            if outcome.status == FileStatus::Failed {
                std::process::exit(1);
            }
        }
        Commands::Bulk {
            source_pattern,
            target_pattern,
            config,
            dry_run,
            non_interactive,
            sync_template,
            yes,
            filter,
            output,
        } => {
            let output = output.unwrap_or_else(|| "human".to_string());
            let printer = Printer::new(&output);
            let cfg = config::load_config(Path::new(&config))
                .unwrap_or_else(|e| exit_fatal(&e, &output));
            let auto = yes || non_interactive;
            let opts = SyncOptions {
                dry_run,
                sync_template,
                filter,
                confirm: !auto,
                ..Default::default()
            };
            let result = if auto {
                Syncer::new(&cfg, YamlFileStore, AutoConfirm::new(true), printer)
                    .sync_bulk(&source_pattern, &target_pattern, &opts)
            } else {
                Syncer::new(&cfg, YamlFileStore, TerminalConfirm, printer)
                    .sync_bulk(&source_pattern, &target_pattern, &opts)
            };
            match result {
                Ok(summary) => output::print_bulk(&summary, &output),
                Err(e) => exit_fatal(&e, &output),
            }
        }
    }
}

fn run_single<C: Confirm>(
    cfg: &SyncConfig,
    confirm: C,
    printer: Printer,
    source: &str,
    target: &str,
    opts: &SyncOptions,
) -> paramsync::sync::FileOutcome {
    Syncer::new(cfg, YamlFileStore, confirm, printer).sync_file(
        Path::new(source),
        Path::new(target),
        opts,
    )
}

/// Print a run-level error and exit with status 2.
fn exit_fatal(e: &SyncError, output: &str) -> ! {
    output::print_fatal(&e.to_string(), output);
    std::process::exit(2);
}

fn init_tracing(verbose: u8) {
    use tracing_subscriber::EnvFilter;

    // RUST_LOG wins over -v
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}
