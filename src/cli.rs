//! CLI argument definitions for upgrade-gate.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use upgrade_gate::preflight::Flavor;

#[derive(Parser)]
#[command(name = "upgrade-gate")]
#[command(version)]
#[command(
    about = "Compatibility and preflight gate for Kubernetes distribution upgrades",
    long_about = None
)]
#[command(
    after_help = "EXIT STATUS:\n    0  no blocker issues (warnings may have been reported)\n    1  at least one blocker issue, or the gate could not run"
)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Emit JSON instead of human-readable output
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all non-essential output
    #[arg(short, long, global = true, conflicts_with = "json")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run preflight probes and module compatibility from a config file
    Check {
        /// Gate config (default: $UPGRADE_GATE_CONFIG, ./upgrade-gate.yaml, user config dir)
        #[arg(long, short)]
        config: Option<PathBuf>,
    },
    /// Check module versions against the compatibility rules
    Compat {
        /// Target Kubernetes version, e.g. 1.35.0
        #[arg(long)]
        target: String,
        /// Module version as name=version (repeatable), e.g. --module auth=v0.6.0
        #[arg(long = "module", short = 'm', value_name = "NAME=VERSION", value_parser = parse_module)]
        modules: Vec<(String, String)>,
        /// Rule table to use instead of the builtin rules
        #[arg(long)]
        rules: Option<PathBuf>,
    },
    /// Run the preflight probes for a distribution flavor
    Preflight {
        /// Distribution flavor: on-premises or distribution
        #[arg(long, default_value = "on-premises")]
        flavor: Flavor,
        /// Target Kubernetes version
        #[arg(long, default_value = "1.35.0")]
        target: String,
        /// kubectl binary
        #[arg(long, default_value = "kubectl")]
        kubectl: String,
        /// Kubeconfig passed to kubectl
        #[arg(long)]
        kubeconfig: Option<PathBuf>,
        /// List the registered checks without running them
        #[arg(long)]
        list: bool,
    },
    /// List compatibility rules
    Rules {
        /// Only rules applicable to this Kubernetes version
        #[arg(long)]
        target: Option<String>,
        /// Rule table to use instead of the builtin rules
        #[arg(long)]
        rules: Option<PathBuf>,
    },
    /// Show version information (with -v: commit and build date)
    Version,
    /// Generate shell completions
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Parse `name=version`.
pub fn parse_module(value: &str) -> Result<(String, String), String> {
    let (name, version) = value
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VERSION, got '{}'", value))?;
    let name = name.trim();
    let version = version.trim();
    if name.is_empty() || version.is_empty() {
        return Err(format!("expected NAME=VERSION, got '{}'", value));
    }
    Ok((name.to_string(), version.to_string()))
}
