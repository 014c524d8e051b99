//! Module compatibility validation against a target Kubernetes version.
//!
//! Every applicable rule is evaluated in one pass so the operator sees all
//! incompatibilities at once, not just the first.

use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

use crate::report::ValidationReport;
use crate::rules::{ApplicableRule, RuleRegistry};
use crate::version::{Version, VersionError};

/// Module name to configured version string, e.g. `"auth" -> "v0.6.0"`.
pub type ComponentVersions = BTreeMap<String, String>;

#[derive(Debug, Error)]
pub enum CompatibilityError {
    #[error("invalid kubernetes version format: {0}")]
    InvalidTarget(VersionError),
    #[error(
        "module compatibility check failed: {} incompatibilities detected:\n  - {}",
        .messages.len(),
        .messages.join("\n  - ")
    )]
    Incompatible { messages: Vec<String> },
}

impl CompatibilityError {
    /// Messages recorded before the check failed. Empty for an invalid target.
    pub fn messages(&self) -> &[String] {
        match self {
            Self::InvalidTarget(_) => &[],
            Self::Incompatible { messages } => messages,
        }
    }
}

/// Evaluates component versions against a [`RuleRegistry`].
#[derive(Debug, Clone, Copy)]
pub struct CompatibilityValidator<'r> {
    registry: &'r RuleRegistry,
}

impl Default for CompatibilityValidator<'static> {
    fn default() -> Self {
        Self::new(RuleRegistry::builtin())
    }
}

impl<'r> CompatibilityValidator<'r> {
    pub fn new(registry: &'r RuleRegistry) -> Self {
        Self { registry }
    }

    /// Check `components` against every rule that applies to `target`.
    ///
    /// Absent components are skipped. A malformed component version is
    /// recorded as a message and evaluation moves on. Only an unparsable
    /// `target` fails before any rule is looked at.
    pub fn validate(
        &self,
        target: &str,
        components: &ComponentVersions,
    ) -> Result<Vec<String>, CompatibilityError> {
        let target_version = Version::parse(target).map_err(CompatibilityError::InvalidTarget)?;

        let mut messages = Vec::new();
        for applicable in self.registry.applicable_rules(&target_version) {
            if let Some(message) = evaluate_rule(&applicable, components) {
                messages.push(message);
            }
        }

        if messages.is_empty() {
            Ok(messages)
        } else {
            Err(CompatibilityError::Incompatible { messages })
        }
    }

    /// Run [`validate`](Self::validate) and fold the outcome into a report.
    /// Every incompatibility is a blocker.
    pub fn report(
        &self,
        target: &str,
        components: &ComponentVersions,
    ) -> Result<ValidationReport, VersionError> {
        let mut report = ValidationReport::new();
        match self.validate(target, components) {
            Ok(_) => {}
            Err(CompatibilityError::InvalidTarget(e)) => return Err(e),
            Err(CompatibilityError::Incompatible { messages }) => {
                for message in messages {
                    report.add_blocker(message);
                }
            }
        }
        Ok(report)
    }
}

fn evaluate_rule(applicable: &ApplicableRule<'_>, components: &ComponentVersions) -> Option<String> {
    let rule = applicable.rule;

    let Some(current_raw) = components.get(&rule.component) else {
        debug!(component = %rule.component, "module not configured, skipping rule");
        return None;
    };

    let min_version = match Version::parse(&rule.min_version) {
        Ok(v) => v,
        Err(e) => {
            debug!(component = %rule.component, error = %e, "rule has unparsable minimum, skipping");
            return None;
        }
    };

    let current = match Version::parse(current_raw) {
        Ok(v) => v,
        Err(_) => {
            return Some(format!(
                "Module '{}' has invalid version format '{}'",
                rule.component, current_raw
            ));
        }
    };

    if current.greater_or_equal(&min_version) {
        return None;
    }

    let mut message = format!(
        "Module '{}' version {} is incompatible with Kubernetes {}. Required: {} or later. {}",
        rule.component, current_raw, applicable.introduced_at, rule.min_version, rule.description
    );
    if let Some(ref url) = rule.migration_url {
        message.push_str(&format!(" See: {}", url));
    }
    Some(message)
}

/// Validate against the builtin rules, folding all messages into one error.
pub fn check_module_compatibility(
    target: &str,
    components: &ComponentVersions,
) -> anyhow::Result<()> {
    CompatibilityValidator::default().validate(target, components)?;
    Ok(())
}
