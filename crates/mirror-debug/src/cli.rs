//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use mirror_debug::DomainSpec;

/// Validate the cached item graph of a file-sync mirror
#[derive(Parser, Debug)]
#[command(name = "mirror-debug")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// `[audit]` configuration file (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Serve validation requests as JSON-RPC over stdio
    ///
    /// Examples:
    ///   mirror-debug serve --domain docs=docs.json
    ///   mirror-debug serve --domain docs=docs.json --domain photos=photos.toml
    Serve {
        /// Domain and the snapshot file of its mirror, as <name>=<snapshot>
        #[arg(short, long = "domain", required = true)]
        domains: Vec<DomainSpec>,

        /// Deadline for requests that do not carry one, in milliseconds
        #[arg(long, default_value_t = 5000)]
        deadline_ms: u64,
    },

    /// Validate one subtree of a snapshot and print the report
    Check {
        /// Snapshot file (.toml, .json, .yaml)
        #[arg(short, long)]
        snapshot: PathBuf,

        /// Root identifier of the subtree
        identifier: String,

        /// Output the report as JSON
        #[arg(long)]
        json: bool,

        /// Session deadline in milliseconds
        #[arg(long, default_value_t = 5000)]
        deadline_ms: u64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_check() {
        let cli = Cli::parse_from([
            "mirror-debug",
            "check",
            "--snapshot",
            "mirror.json",
            "root",
            "--json",
        ]);
        match cli.command {
            Commands::Check {
                snapshot,
                identifier,
                json,
                deadline_ms,
            } => {
                assert_eq!(snapshot, PathBuf::from("mirror.json"));
                assert_eq!(identifier, "root");
                assert!(json);
                assert_eq!(deadline_ms, 5000);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_repeated_domains() {
        let cli = Cli::parse_from([
            "mirror-debug",
            "--config",
            "audit.toml",
            "serve",
            "--domain",
            "docs=a.json",
            "--domain",
            "photos=b.yaml",
        ]);
        assert_eq!(cli.config, Some(PathBuf::from("audit.toml")));
        let Commands::Serve { domains, .. } = cli.command else {
            panic!("expected serve");
        };
        let names: Vec<_> = domains.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["docs", "photos"]);
    }

    #[test]
    fn rejects_malformed_domain() {
        assert!(Cli::try_parse_from(["mirror-debug", "serve", "--domain", "docs"]).is_err());
    }
}
