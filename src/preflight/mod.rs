//! Preflight checks against the live cluster and the local host.
//!
//! - [`suite`] - ordered runner that routes violations by registered severity
//! - [`probes`] - the individual cluster and host probes
//! - [`policy`] - which probes each distribution flavor registers

pub mod policy;
pub mod probes;
pub mod suite;

pub use policy::{suite_for, Flavor};
pub use suite::{PreflightCheckSuite, Probe, Violation};
