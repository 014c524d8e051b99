//! CLI entry point for upgrade-gate.

mod cli;
mod cmd;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands};
use cmd::output::{Output, OutputMode};
use cmd::preflight::PreflightArgs;
use upgrade_gate::logging::{self, LoggingConfig};

fn main() {
    match run() {
        Ok(false) => {}
        Ok(true) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Dispatch the command. `Ok(true)` means blocker issues were found.
fn run() -> Result<bool> {
    let cli = Cli::parse();

    logging::init(LoggingConfig::from_verbosity(cli.verbose).merge_with_env())?;
    let out = Output::new(OutputMode::from_flags(cli.json, cli.quiet));

    match cli.command {
        Commands::Check { config } => cmd::check::cmd_check(&out, config.as_deref()),
        Commands::Compat {
            target,
            modules,
            rules,
        } => cmd::compat::cmd_compat(&out, &target, &modules, rules.as_deref()),
        Commands::Preflight {
            flavor,
            target,
            kubectl,
            kubeconfig,
            list,
        } => cmd::preflight::cmd_preflight(
            &out,
            PreflightArgs {
                flavor,
                target,
                kubectl,
                kubeconfig,
                list,
            },
        ),
        Commands::Rules { target, rules } => {
            cmd::rules::cmd_rules(&out, target.as_deref(), rules.as_deref())?;
            Ok(false)
        }
        Commands::Version => {
            cmd::util::cmd_version(cli.verbose > 0)?;
            Ok(false)
        }
        Commands::Completion { shell } => {
            cmd::util::cmd_completion(shell)?;
            Ok(false)
        }
    }
}
