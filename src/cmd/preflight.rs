//! `upgrade-gate preflight`: run or list a flavor's preflight probes.

use anyhow::Result;
use serde_json::json;
use std::path::PathBuf;

use upgrade_gate::exec::{
    ClusterCommandRunner, HostCommandExecutor, KubectlRunner, StdHostExecutor,
};
use upgrade_gate::preflight::{suite_for, Flavor};
use upgrade_gate::version::Version;

use super::output::{Output, OutputMode};

pub struct PreflightArgs {
    pub flavor: Flavor,
    pub target: String,
    pub kubectl: String,
    pub kubeconfig: Option<PathBuf>,
    pub list: bool,
}

/// Returns `true` when a blocker was found.
pub fn cmd_preflight(out: &Output, args: PreflightArgs) -> Result<bool> {
    let kubeconfig = args
        .kubeconfig
        .as_ref()
        .map(|p| PathBuf::from(shellexpand::tilde(&p.to_string_lossy()).to_string()));
    let runner = KubectlRunner::new(args.kubectl.clone(), kubeconfig);
    run_preflight(out, &args, &runner, &StdHostExecutor)
}

fn run_preflight<C, H>(
    out: &Output,
    args: &PreflightArgs,
    cluster: &C,
    host: &H,
) -> Result<bool>
where
    C: ClusterCommandRunner + ?Sized,
    H: HostCommandExecutor + ?Sized,
{
    let target = Version::parse(&args.target)?;
    let suite = suite_for(args.flavor, &target, cluster, host);

    if args.list {
        if out.mode() == OutputMode::Json {
            let checks: Vec<_> = suite
                .names()
                .into_iter()
                .map(|(name, severity)| json!({ "name": name, "severity": severity }))
                .collect();
            out.json(&json!({
                "flavor": args.flavor,
                "target": args.target,
                "checks": checks,
            }));
        } else {
            out.info(suite.title());
            for (name, severity) in suite.names() {
                out.detail(&format!("{:<20} {}", name, severity));
            }
        }
        return Ok(false);
    }

    if suite.is_empty() {
        out.success(suite.title());
        return Ok(false);
    }

    out.step(&format!("Running {} check(s): {}", suite.len(), suite.title()));
    let report = suite.run();

    if out.mode() == OutputMode::Json {
        out.json(&json!({
            "flavor": args.flavor,
            "target": args.target,
            "passed": !report.has_blockers(),
            "blockers": report.blockers,
            "warnings": report.warnings,
        }));
    } else {
        out.report(&report);
    }

    if report.has_blockers() {
        out.error(&format!("Kubernetes {} preflight checks failed", args.target));
        Ok(true)
    } else {
        if report.has_warnings() {
            out.warn(&format!("{} warning(s)", report.warnings.len()));
        }
        out.success(&format!("Kubernetes {} preflight checks passed", args.target));
        Ok(false)
    }
}
