//! `upgrade-gate compat`: module versions against the compatibility rules.

use anyhow::Result;
use serde_json::json;
use std::path::Path;

use upgrade_gate::compat::{CompatibilityValidator, ComponentVersions};
use upgrade_gate::rules::RuleRegistry;

use super::output::{Output, OutputMode};

/// Validate `modules` for `target`. Returns `true` when any module is
/// incompatible.
pub fn cmd_compat(
    out: &Output,
    target: &str,
    modules: &[(String, String)],
    rules: Option<&Path>,
) -> Result<bool> {
    let custom = super::load_rules(rules)?;
    let registry = custom.as_ref().unwrap_or(RuleRegistry::builtin());
    check_modules(out, registry, target, modules)
}

fn check_modules(
    out: &Output,
    registry: &RuleRegistry,
    target: &str,
    modules: &[(String, String)],
) -> Result<bool> {
    let components: ComponentVersions = modules.iter().cloned().collect();

    out.step(&format!(
        "Checking {} module(s) against Kubernetes {}",
        components.len(),
        target
    ));
    let report = CompatibilityValidator::new(registry).report(target, &components)?;

    if out.mode() == OutputMode::Json {
        out.json(&json!({
            "target": target,
            "modules": components,
            "compatible": !report.has_blockers(),
            "blockers": report.blockers,
        }));
    } else {
        out.report(&report);
    }

    if report.has_blockers() {
        out.error(&format!(
            "module compatibility check failed: {} incompatibilities detected",
            report.blockers.len()
        ));
        return Ok(true);
    }

    out.success(&format!("All modules compatible with Kubernetes {}", target));
    Ok(false)
}
