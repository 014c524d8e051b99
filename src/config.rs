//! Gate configuration.
//!
//! A single YAML file names the target Kubernetes version, the distribution
//! flavor, the configured module versions and how to reach the cluster.
//!
//! ```yaml
//! distribution:
//!   kubernetesVersion: 1.35.0
//!   flavor: on-premises
//!   modules:
//!     auth: v0.6.0
//!     logging: v5.2.0
//! cluster:
//!   kubeconfig: ~/.kube/config
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::compat::ComponentVersions;
use crate::exec::KubectlRunner;
use crate::preflight::Flavor;
use crate::rules::RuleRegistry;
use crate::version::Version;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "UPGRADE_GATE_CONFIG";
/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "upgrade-gate.yaml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("distribution.kubernetesVersion '{0}' is not a valid version")]
    InvalidKubernetesVersion(String),
    #[error(
        "no config file found (tried --config, $UPGRADE_GATE_CONFIG, ./upgrade-gate.yaml \
         and the user config directory)"
    )]
    NotFound,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GateConfig {
    pub distribution: DistributionConfig,
    #[serde(default)]
    pub cluster: ClusterConfig,
    /// Rule table replacing the builtin one. Relative paths resolve against
    /// the config file's directory.
    #[serde(default)]
    pub rules: Option<PathBuf>,
    #[serde(skip)]
    source: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionConfig {
    pub kubernetes_version: String,
    #[serde(default)]
    pub flavor: Flavor,
    #[serde(default)]
    pub modules: ModuleVersions,
}

/// Configured module versions. Unset modules are not deployed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleVersions {
    pub auth: Option<String>,
    pub aws: Option<String>,
    pub dr: Option<String>,
    pub ingress: Option<String>,
    pub logging: Option<String>,
    pub monitoring: Option<String>,
    pub opa: Option<String>,
    pub networking: Option<String>,
    pub tracing: Option<String>,
    /// Modules outside the standard set, kept for custom rule tables.
    #[serde(flatten)]
    pub other: BTreeMap<String, String>,
}

impl ModuleVersions {
    /// Component map for the validator. Unset and blank entries are left out.
    pub fn to_components(&self) -> ComponentVersions {
        let named = [
            ("auth", &self.auth),
            ("aws", &self.aws),
            ("dr", &self.dr),
            ("ingress", &self.ingress),
            ("logging", &self.logging),
            ("monitoring", &self.monitoring),
            ("opa", &self.opa),
            ("networking", &self.networking),
            ("tracing", &self.tracing),
        ];

        let mut components = ComponentVersions::new();
        for (name, version) in named {
            if let Some(v) = version.as_deref().filter(|v| !v.trim().is_empty()) {
                components.insert(name.to_string(), v.to_string());
            }
        }
        for (name, version) in &self.other {
            if !version.trim().is_empty() {
                components.insert(name.clone(), version.clone());
            }
        }
        components
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterConfig {
    #[serde(default = "default_kubectl")]
    pub kubectl: String,
    #[serde(default)]
    pub kubeconfig: Option<String>,
}

fn default_kubectl() -> String {
    "kubectl".to_string()
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            kubectl: default_kubectl(),
            kubeconfig: None,
        }
    }
}

impl ClusterConfig {
    /// Kubeconfig path with `~` expanded.
    pub fn kubeconfig_path(&self) -> Option<PathBuf> {
        self.kubeconfig
            .as_deref()
            .map(|p| PathBuf::from(shellexpand::tilde(p).to_string()))
    }

    pub fn runner(&self) -> KubectlRunner {
        KubectlRunner::new(
            shellexpand::tilde(&self.kubectl).to_string(),
            self.kubeconfig_path(),
        )
    }
}

impl GateConfig {
    /// Load from the first config found: `explicit`, `$UPGRADE_GATE_CONFIG`,
    /// `./upgrade-gate.yaml`, then the user config directory.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = resolve_config_path(explicit)?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let mut config = Self::parse(&content)
            .with_context(|| format!("Invalid config in {}", path.display()))?;
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: GateConfig =
            serde_yaml::from_str(content).context("Failed to parse gate config")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> std::result::Result<(), ConfigError> {
        let version = &self.distribution.kubernetes_version;
        if Version::parse(version).is_err() {
            return Err(ConfigError::InvalidKubernetesVersion(version.clone()));
        }

        Ok(())
    }

    /// The file this config was loaded from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn components(&self) -> ComponentVersions {
        self.distribution.modules.to_components()
    }

    /// Resolved path of the custom rule table, if configured.
    pub fn rules_path(&self) -> Option<PathBuf> {
        let rules = self.rules.as_ref()?;
        let expanded = PathBuf::from(shellexpand::tilde(&rules.to_string_lossy()).to_string());
        if expanded.is_absolute() {
            return Some(expanded);
        }
        let base = self
            .source
            .as_deref()
            .and_then(Path::parent)
            .unwrap_or_else(|| Path::new("."));
        Some(base.join(expanded))
    }

    /// Load the configured rule table, or `None` to use the builtin rules.
    pub fn load_rules(&self) -> Result<Option<RuleRegistry>> {
        self.rules_path()
            .map(|path| RuleRegistry::load_from(&path))
            .transpose()
    }
}

/// Path of the user-level config: `<config dir>/upgrade-gate/config.yaml`.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("upgrade-gate").join("config.yaml"))
}

fn resolve_config_path(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_ENV) {
        if !path.trim().is_empty() {
            return Ok(PathBuf::from(shellexpand::tilde(&path).to_string()));
        }
    }

    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.exists() {
        return Ok(local);
    }

    user_config_path()
        .filter(|p| p.exists())
        .ok_or_else(|| ConfigError::NotFound.into())
}
