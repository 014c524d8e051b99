//! `upgrade-gate rules`: show the compatibility rule table.

use anyhow::Result;
use serde_json::json;
use std::path::Path;

use upgrade_gate::rules::RuleRegistry;
use upgrade_gate::version::Version;

use super::output::{Output, OutputMode};

pub fn cmd_rules(out: &Output, target: Option<&str>, rules: Option<&Path>) -> Result<()> {
    let custom = super::load_rules(rules)?;
    let registry = custom.as_ref().unwrap_or(RuleRegistry::builtin());
    list_rules(out, registry, target)
}

fn list_rules(out: &Output, registry: &RuleRegistry, target: Option<&str>) -> Result<()> {
    let Some(target) = target else {
        if out.mode() == OutputMode::Json {
            out.json(&json!({ "groups": registry.groups() }));
            return Ok(());
        }
        if registry.is_empty() {
            out.info("No compatibility rules defined");
        }
        for group in registry.groups() {
            out.info(&format!("Kubernetes {}:", group.kubernetes_version));
            for rule in &group.rules {
                out.detail(&format!(
                    "{} >= {}: {}",
                    rule.component, rule.min_version, rule.description
                ));
            }
        }
        return Ok(());
    };

    let version = Version::parse(target)?;
    let applicable = registry.applicable_rules(&version);

    if out.mode() == OutputMode::Json {
        let rules: Vec<_> = applicable
            .iter()
            .map(|a| {
                json!({
                    "introducedAt": a.introduced_at,
                    "component": a.rule.component,
                    "minVersion": a.rule.min_version,
                    "description": a.rule.description,
                    "migrationUrl": a.rule.migration_url,
                })
            })
            .collect();
        out.json(&json!({ "target": target, "rules": rules }));
        return Ok(());
    }

    if applicable.is_empty() {
        out.info(&format!("No compatibility rules apply to Kubernetes {}", target));
        return Ok(());
    }

    out.info(&format!(
        "{} rule(s) apply to Kubernetes {}:",
        applicable.len(),
        target
    ));
    for a in &applicable {
        out.detail(&format!(
            "{} >= {} (since Kubernetes {}): {}",
            a.rule.component, a.rule.min_version, a.introduced_at, a.rule.description
        ));
    }
    Ok(())
}
