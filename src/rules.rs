//! Compatibility rule registry.
//!
//! Rules are grouped by the Kubernetes version that introduced them. Once a
//! requirement exists it stays in force for every later version, so a target
//! picks up the union of all groups at or below it.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::OnceLock;
use thiserror::Error;
use tracing::debug;

use crate::version::Version;

/// A minimum module version required from a given Kubernetes version on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompatibilityRule {
    /// Module name (e.g. "auth", "logging")
    pub component: String,
    /// Minimum module version, e.g. "v0.6.0"
    pub min_version: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub migration_url: Option<String>,
}

/// Rules introduced by a single Kubernetes version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleGroup {
    pub kubernetes_version: String,
    #[serde(default)]
    pub rules: Vec<CompatibilityRule>,
}

/// A rule paired with the Kubernetes version that introduced it.
#[derive(Debug, Clone, Copy)]
pub struct ApplicableRule<'a> {
    pub introduced_at: &'a str,
    pub rule: &'a CompatibilityRule,
}

#[derive(Debug, Error)]
pub enum RuleLoadError {
    #[error("rule group '{group}' has an invalid Kubernetes version: {reason}")]
    InvalidGroupVersion { group: String, reason: String },
    #[error("rule for '{component}' (Kubernetes {group}) has an invalid minimum version '{min_version}'")]
    InvalidMinVersion {
        group: String,
        component: String,
        min_version: String,
    },
    #[error("rule for '{component}' (Kubernetes {group}) has an invalid migration URL '{url}'")]
    InvalidMigrationUrl {
        group: String,
        component: String,
        url: String,
    },
    #[error("rule for Kubernetes {group} has an empty component name")]
    EmptyComponent { group: String },
}

#[derive(Debug, Deserialize)]
struct RuleFile {
    #[serde(default)]
    groups: Vec<RuleGroup>,
}

/// Immutable, ordered table of compatibility rules.
#[derive(Debug, Clone, Default)]
pub struct RuleRegistry {
    groups: Vec<RuleGroup>,
}

impl RuleRegistry {
    /// Build a registry from an explicit table. Definition order is kept.
    pub fn new(groups: Vec<RuleGroup>) -> Self {
        Self { groups }
    }

    /// The rules shipped with this build.
    pub fn builtin() -> &'static RuleRegistry {
        static BUILTIN: OnceLock<RuleRegistry> = OnceLock::new();
        BUILTIN.get_or_init(|| RuleRegistry::new(builtin_groups()))
    }

    /// Parse a YAML rule table. The whole table is validated up front so a
    /// bad file is rejected before any gate runs against it.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let file: RuleFile =
            serde_yaml::from_str(content).context("Failed to parse rule table")?;
        validate_groups(&file.groups)?;
        Ok(Self::new(file.groups))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read rules from {}", path.display()))?;
        Self::from_yaml(&content)
            .with_context(|| format!("Invalid rule table in {}", path.display()))
    }

    pub fn groups(&self) -> &[RuleGroup] {
        &self.groups
    }

    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(|g| g.rules.is_empty())
    }

    /// Every rule introduced at or before `target`, in definition order.
    ///
    /// Groups whose own version does not parse are skipped.
    pub fn applicable_rules(&self, target: &Version) -> Vec<ApplicableRule<'_>> {
        let mut applicable = Vec::new();

        for group in &self.groups {
            let introduced = match Version::parse(&group.kubernetes_version) {
                Ok(v) => v,
                Err(e) => {
                    debug!(group = %group.kubernetes_version, error = %e, "skipping rule group");
                    continue;
                }
            };

            if target.greater_or_equal(&introduced) {
                applicable.extend(group.rules.iter().map(|rule| ApplicableRule {
                    introduced_at: group.kubernetes_version.as_str(),
                    rule,
                }));
            }
        }

        applicable
    }
}

fn validate_groups(groups: &[RuleGroup]) -> std::result::Result<(), RuleLoadError> {
    for group in groups {
        Version::parse(&group.kubernetes_version).map_err(|e| {
            RuleLoadError::InvalidGroupVersion {
                group: group.kubernetes_version.clone(),
                reason: e.to_string(),
            }
        })?;

        for rule in &group.rules {
            if rule.component.trim().is_empty() {
                return Err(RuleLoadError::EmptyComponent {
                    group: group.kubernetes_version.clone(),
                });
            }
            if Version::parse(&rule.min_version).is_err() {
                return Err(RuleLoadError::InvalidMinVersion {
                    group: group.kubernetes_version.clone(),
                    component: rule.component.clone(),
                    min_version: rule.min_version.clone(),
                });
            }
            if let Some(ref raw) = rule.migration_url {
                if url::Url::parse(raw).is_err() {
                    return Err(RuleLoadError::InvalidMigrationUrl {
                        group: group.kubernetes_version.clone(),
                        component: rule.component.clone(),
                        url: raw.clone(),
                    });
                }
            }
        }
    }
    Ok(())
}

fn rule(component: &str, min_version: &str, description: &str) -> CompatibilityRule {
    CompatibilityRule {
        component: component.to_string(),
        min_version: min_version.to_string(),
        description: description.to_string(),
        migration_url: None,
    }
}

/// Known breaking changes, oldest first. Append new groups at the end.
fn builtin_groups() -> Vec<RuleGroup> {
    vec![RuleGroup {
        kubernetes_version: "1.35.0".to_string(),
        rules: vec![
            rule(
                "networking",
                "v3.0.0",
                "Kubernetes 1.35 requires networking module v3.0.0+ for CNI compatibility improvements",
            ),
            rule(
                "monitoring",
                "v4.0.1",
                "Kubernetes 1.35 requires monitoring module v4.0.1+ for metric changes",
            ),
            rule(
                "auth",
                "v0.6.0",
                "Kubernetes 1.35 requires auth module v0.6.0+ for WebSocket RBAC validation",
            ),
            rule(
                "logging",
                "v5.2.0",
                "Kubernetes 1.35 requires logging module v5.2.0+ for new audit log formats",
            ),
        ],
    }]
}
