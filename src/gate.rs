//! The upgrade gate: preflight probes plus module compatibility.
//!
//! Both halves report through the same blocker/warning convention. The gate
//! fails only when at least one blocker exists; warnings are logged and the
//! operation proceeds.

use serde::Serialize;
use std::fmt;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::compat::{CompatibilityValidator, ComponentVersions};
use crate::config::GateConfig;
use crate::exec::{ClusterCommandRunner, HostCommandExecutor};
use crate::preflight::{suite_for, Flavor};
use crate::report::ValidationReport;
use crate::rules::RuleRegistry;
use crate::version::{Version, VersionError};

#[derive(Debug, Error)]
pub enum GateError {
    #[error("invalid kubernetes version format: {0}")]
    InvalidTarget(VersionError),
    #[error("upgrade to Kubernetes {target} blocked by {count} issue(s):\n{report}")]
    Blocked {
        target: String,
        count: usize,
        report: ValidationReport,
    },
}

impl From<VersionError> for GateError {
    fn from(err: VersionError) -> Self {
        GateError::InvalidTarget(err)
    }
}

/// Inputs for one gate run.
#[derive(Debug, Clone)]
pub struct Gate<'r> {
    pub flavor: Flavor,
    pub target: String,
    pub components: ComponentVersions,
    registry: &'r RuleRegistry,
}

impl Gate<'static> {
    /// Gate using the builtin rules.
    pub fn new(flavor: Flavor, target: impl Into<String>, components: ComponentVersions) -> Self {
        Self::with_registry(flavor, target, components, RuleRegistry::builtin())
    }
}

impl<'r> Gate<'r> {
    pub fn with_registry(
        flavor: Flavor,
        target: impl Into<String>,
        components: ComponentVersions,
        registry: &'r RuleRegistry,
    ) -> Self {
        Self {
            flavor,
            target: target.into(),
            components,
            registry,
        }
    }

    /// Gate described by a loaded config, checked against `registry`.
    pub fn from_config(config: &GateConfig, registry: &'r RuleRegistry) -> Self {
        Self::with_registry(
            config.distribution.flavor,
            config.distribution.kubernetes_version.clone(),
            config.components(),
            registry,
        )
    }

    /// Run the flavor's preflight suite and the module compatibility check.
    ///
    /// An invalid target fails before any probe runs.
    pub fn run<C, H>(&self, cluster: &C, host: &H) -> Result<GateOutcome, GateError>
    where
        C: ClusterCommandRunner + ?Sized,
        H: HostCommandExecutor + ?Sized,
    {
        let target = Version::parse(&self.target)?;

        info!(flavor = %self.flavor, "Checking Kubernetes {} requirements...", target);
        let suite = suite_for(self.flavor, &target, cluster, host);
        let preflight = suite.run();

        info!(modules = self.components.len(), "Checking module compatibility...");
        let compatibility =
            CompatibilityValidator::new(self.registry).report(&self.target, &self.components)?;

        Ok(GateOutcome {
            target: self.target.clone(),
            flavor: self.flavor,
            preflight,
            compatibility,
        })
    }
}

/// Findings of one gate run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GateOutcome {
    pub target: String,
    pub flavor: Flavor,
    pub preflight: ValidationReport,
    pub compatibility: ValidationReport,
}

impl GateOutcome {
    pub fn has_blockers(&self) -> bool {
        self.preflight.has_blockers() || self.compatibility.has_blockers()
    }

    /// Preflight findings followed by compatibility findings.
    pub fn combined(&self) -> ValidationReport {
        let mut report = self.preflight.clone();
        report.extend(self.compatibility.clone());
        report
    }

    /// Fail on blockers; otherwise log every warning and pass.
    pub fn into_result(self) -> Result<GateOutcome, GateError> {
        let combined = self.combined();

        if combined.has_blockers() {
            error!("Kubernetes {} compatibility checks failed", self.target);
            return Err(GateError::Blocked {
                target: self.target,
                count: combined.blockers.len(),
                report: combined,
            });
        }

        if combined.has_warnings() {
            warn!("Kubernetes {} compatibility warnings:", self.target);
            for w in &combined.warnings {
                warn!("  - {}", w);
            }
        }

        info!("Kubernetes {} compatibility checks passed", self.target);
        Ok(self)
    }
}

impl fmt::Display for GateOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.combined())
    }
}
