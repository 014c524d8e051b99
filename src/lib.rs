//! # upgrade-gate - Kubernetes distribution upgrade gate
//!
//! Decides whether an upgrade or installation of a Kubernetes-based platform
//! distribution may proceed. Two questions are answered before anything
//! touches the cluster:
//!
//! - Are the configured add-on module versions compatible with the target
//!   Kubernetes version?
//! - Do the live cluster and the host meet the version-specific mandatory
//!   (blocker) and advisory (warning) requirements?
//!
//! The crate only decides. Facts come from command collaborators
//! ([`exec::ClusterCommandRunner`], [`exec::HostCommandExecutor`]), and
//! nothing is mutated, retried or cached.
//!
//! ## Modules
//!
//! - [`version`] - version parsing and ordering (`1.35.0`, `v0.6.0`)
//! - [`rules`] - compatibility rules grouped by introducing Kubernetes version
//! - [`compat`] - module compatibility validator
//! - [`preflight`] - probe suite, probe catalog and per-flavor policies
//! - [`report`] - blocker/warning report
//! - [`gate`] - the workflow composing preflight and compatibility
//! - [`config`] - YAML gate configuration
//! - [`exec`] - cluster and host command collaborators
//! - [`logging`] - diagnostic logging setup
//!
//! ## Example
//!
//! ```
//! use upgrade_gate::compat::{CompatibilityValidator, ComponentVersions};
//!
//! let mut modules = ComponentVersions::new();
//! modules.insert("auth".to_string(), "v0.5.0".to_string());
//!
//! let err = CompatibilityValidator::default()
//!     .validate("1.35.0", &modules)
//!     .unwrap_err();
//! assert_eq!(err.messages().len(), 1);
//! ```

pub mod compat;
pub mod config;
pub mod exec;
pub mod gate;
pub mod logging;
pub mod preflight;
pub mod report;
pub mod rules;
pub mod version;

pub use compat::{CompatibilityError, CompatibilityValidator, ComponentVersions};
pub use gate::{Gate, GateError, GateOutcome};
pub use report::{Finding, Severity, ValidationReport};
pub use rules::{CompatibilityRule, RuleGroup, RuleRegistry};
pub use version::{Version, VersionError};
