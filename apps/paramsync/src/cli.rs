//! CLI argument parsing via `clap`.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "paramsync",
    version,
    about = "Synchronize selected fields between YAML configuration files"
)]
/// Top-level CLI options and subcommands.
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
/// Supported subcommands for single-file and bulk sync.
pub enum Commands {
    /// Show version
    Version,
    /// Sync fields from one source file into one target file
    Sync {
        /// Source YAML file
        source: String,
        /// Target YAML file
        target: String,
        /// Config file defining sync rules
        #[arg(long, short)]
        config: Option<String>,
        /// Fields to copy into `parameters` (overrides config rules)
        #[arg(long, short, num_args = 1..)]
        params: Option<Vec<String>>,
        /// Fields to delete from `parameters` (overrides config rules)
        #[arg(long, short = 'D', num_args = 1..)]
        delete: Option<Vec<String>>,
        #[arg(long, short, action = clap::ArgAction::SetTrue, help = "Show changes without applying them")]
        dry_run: bool,
        #[arg(long, short = 'T', action = clap::ArgAction::SetTrue, help = "Sync the template section")]
        sync_template: bool,
        /// Only sync when the source matches (field.path:value, field.path:!value, ...)
        #[arg(long, short)]
        filter: Option<String>,
        #[arg(long, short, action = clap::ArgAction::SetTrue, help = "Apply changes without prompting")]
        yes: bool,
        #[arg(long)]
        output: Option<String>,
    },
    /// Sync many file pairs discovered from glob patterns
    Bulk {
        #[arg(long, short)]
        source_pattern: String,
        #[arg(long, short)]
        target_pattern: String,
        #[arg(long, short)]
        config: String,
        #[arg(long, short, action = clap::ArgAction::SetTrue, help = "Show changes without applying them")]
        dry_run: bool,
        #[arg(long, short, action = clap::ArgAction::SetTrue, help = "Apply all changes without prompting")]
        non_interactive: bool,
        #[arg(long, short = 'T', action = clap::ArgAction::SetTrue, help = "Sync the template section")]
        sync_template: bool,
        #[arg(long, short, action = clap::ArgAction::SetTrue, help = "Automatically apply all changes without prompting")]
        yes: bool,
        /// Only sync sources matching (field.path:value, field.path:!value, ...)
        #[arg(long, short)]
        filter: Option<String>,
        #[arg(long)]
        output: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sync_flags() {
        let cli = Cli::parse_from([
            "paramsync", "sync", "a.yaml", "b.yaml", "-p", "VpcCidr", "InstanceType", "-D",
            "OldParam", "-d", "-T", "-f", "template.type:!enhanced", "-y",
        ]);
        match cli.cmd {
            Commands::Sync {
                params,
                delete,
                dry_run,
                sync_template,
                filter,
                yes,
                config,
                ..
            } => {
                assert_eq!(params.unwrap(), vec!["VpcCidr", "InstanceType"]);
                assert_eq!(delete.unwrap(), vec!["OldParam"]);
                assert!(dry_run && sync_template && yes);
                assert_eq!(filter.as_deref(), Some("template.type:!enhanced"));
                assert!(config.is_none());
            }
            _ => panic!("expected sync"),
        }
    }

    #[test]
    fn test_bulk_requires_config() {
        assert!(Cli::try_parse_from(["paramsync", "bulk", "-s", "a/*.yaml", "-t", "b/*.yaml"]).is_err());
        let cli = Cli::try_parse_from([
            "paramsync", "-vv", "bulk", "-s", "a/*.yaml", "-t", "b/*.yaml", "-c", "cfg.yaml", "-n",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.cmd, Commands::Bulk { non_interactive: true, .. }));
    }
}
