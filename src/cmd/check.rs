//! `upgrade-gate check`: the full gate driven by a config file.

use anyhow::Result;
use serde_json::json;
use std::path::Path;

use upgrade_gate::config::GateConfig;
use upgrade_gate::exec::{ClusterCommandRunner, HostCommandExecutor, StdHostExecutor};
use upgrade_gate::gate::{Gate, GateError};
use upgrade_gate::rules::RuleRegistry;

use super::output::{Output, OutputMode};

/// Run the gate described by the config. Returns `true` when blocked.
pub fn cmd_check(out: &Output, config: Option<&Path>) -> Result<bool> {
    let config = GateConfig::load(config)?;
    if let Some(source) = config.source() {
        tracing::info!(config = %source.display(), "Loaded gate config");
    }

    let runner = config.cluster.runner();
    run_gate(out, &config, &runner, &StdHostExecutor)
}

pub(crate) fn run_gate<C, H>(
    out: &Output,
    config: &GateConfig,
    cluster: &C,
    host: &H,
) -> Result<bool>
where
    C: ClusterCommandRunner + ?Sized,
    H: HostCommandExecutor + ?Sized,
{
    let custom = config.load_rules()?;
    let registry = custom.as_ref().unwrap_or(RuleRegistry::builtin());
    let gate = Gate::from_config(config, registry);

    out.step(&format!(
        "Checking {} upgrade to Kubernetes {}",
        gate.flavor, gate.target
    ));
    let outcome = gate.run(cluster, host)?;

    if out.mode() == OutputMode::Json {
        out.json(&json!({
            "target": outcome.target,
            "flavor": outcome.flavor,
            "passed": !outcome.has_blockers(),
            "preflight": outcome.preflight,
            "compatibility": outcome.compatibility,
        }));
    } else {
        out.report(&outcome.combined());
    }

    match outcome.into_result() {
        Ok(outcome) => {
            let warnings = outcome.combined().warnings.len();
            if warnings > 0 {
                out.warn(&format!("{} warning(s), upgrade may proceed", warnings));
            }
            out.success(&format!(
                "Kubernetes {} compatibility checks passed",
                outcome.target
            ));
            Ok(false)
        }
        Err(GateError::Blocked { target, count, .. }) => {
            out.error(&format!(
                "Upgrade to Kubernetes {} blocked by {} issue(s)",
                target, count
            ));
            Ok(true)
        }
        Err(e) => Err(e.into()),
    }
}
