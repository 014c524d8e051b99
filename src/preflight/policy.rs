//! Probe registrations per distribution flavor.
//!
//! Each flavor assembles its own suite from the shared probe catalog. The two
//! policies are defined independently and are not derived from one another.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::probes::{
    CgroupVersionProbe, ContainerRuntimeProbe, NodeOsProbe, OsFamily, OsWhitelist, ProxyModeProbe,
};
use super::suite::PreflightCheckSuite;
use crate::exec::{ClusterCommandRunner, HostCommandExecutor};
use crate::version::Version;

/// First Kubernetes version whose host and cluster requirements are checked.
pub const PREFLIGHT_INTRODUCED_AT: &str = "1.35.0";

const KUBERNETES_LABEL: &str = "1.35";
const SUPPORTED_HOSTS: &str = "Ubuntu 22.04+, RHEL/CentOS 9+, or Debian 12+";

/// How the distribution is deployed, which decides the checks that apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Flavor {
    /// Nodes provisioned by the lifecycle tool; host checks run locally.
    #[default]
    OnPremises,
    /// Installed on an existing cluster; only cluster-level checks apply.
    Distribution,
}

impl Flavor {
    pub const ALL: [Flavor; 2] = [Flavor::OnPremises, Flavor::Distribution];

    pub fn as_str(&self) -> &'static str {
        match self {
            Flavor::OnPremises => "on-premises",
            Flavor::Distribution => "distribution",
        }
    }
}

impl fmt::Display for Flavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Flavor {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "on-premises" | "onpremises" => Ok(Flavor::OnPremises),
            "distribution" | "kfddistribution" => Ok(Flavor::Distribution),
            other => anyhow::bail!(
                "Unknown flavor '{}'. Expected one of: on-premises, distribution",
                other
            ),
        }
    }
}

pub fn on_premises_whitelist() -> OsWhitelist {
    OsWhitelist::new(
        vec![
            OsFamily::new("ubuntu", &["22.04", "24.", "25."]),
            OsFamily::new("rhel", &["9.", "10."]),
            OsFamily::new("red hat enterprise linux", &["9.", "10."]),
            OsFamily::new("centos", &["9"]),
            OsFamily::new("debian", &["12", "13"]),
        ],
        SUPPORTED_HOSTS,
    )
}

pub fn distribution_whitelist() -> OsWhitelist {
    OsWhitelist::new(
        vec![
            OsFamily::new("ubuntu", &["22.04", "24.", "25."]),
            OsFamily::new("rhel", &["9.", "10."]),
            OsFamily::new("red hat enterprise linux", &["9.", "10."]),
            OsFamily::new("centos", &["9"]),
            OsFamily::new("debian", &["12", "13"]),
            OsFamily::new("amazonlinux", &[]),
            OsFamily::new("amazon linux", &["2"]),
            OsFamily::new("al2", &[]),
        ],
        "Ubuntu 22.04+, RHEL/CentOS 9+, Debian 12+, or Amazon Linux 2",
    )
}

/// On-premises: host requirements are mandatory, cluster findings advisory.
pub fn on_premises_suite<'a, C, H>(cluster: &'a C, host: &'a H) -> PreflightCheckSuite<'a>
where
    C: ClusterCommandRunner + ?Sized,
    H: HostCommandExecutor + ?Sized,
{
    let mut suite = PreflightCheckSuite::new("Kubernetes 1.35 requirements (on-premises)");
    suite
        .blocker(
            "cgroup-v2",
            CgroupVersionProbe::new(host, SUPPORTED_HOSTS, KUBERNETES_LABEL),
        )
        .blocker(
            "containerd-version",
            ContainerRuntimeProbe::new(host, &["v2.", "v3."], KUBERNETES_LABEL),
        )
        .warning(
            "kube-proxy-mode",
            ProxyModeProbe::new(cluster, "ipvs", "nftables", KUBERNETES_LABEL),
        )
        .warning(
            "node-os",
            NodeOsProbe::new(cluster, on_premises_whitelist(), KUBERNETES_LABEL),
        );
    suite
}

/// Distribution on an existing cluster: cluster-level checks only.
pub fn distribution_suite<'a, C>(cluster: &'a C) -> PreflightCheckSuite<'a>
where
    C: ClusterCommandRunner + ?Sized,
{
    let mut suite = PreflightCheckSuite::new("Kubernetes 1.35 requirements (distribution)");
    suite
        .warning(
            "kube-proxy-mode",
            ProxyModeProbe::new(cluster, "ipvs", "nftables", KUBERNETES_LABEL),
        )
        .warning(
            "node-os",
            NodeOsProbe::new(cluster, distribution_whitelist(), KUBERNETES_LABEL),
        );
    suite
}

/// The suite for `flavor`, or an empty one when `target` predates the
/// requirements these probes check.
pub fn suite_for<'a, C, H>(
    flavor: Flavor,
    target: &Version,
    cluster: &'a C,
    host: &'a H,
) -> PreflightCheckSuite<'a>
where
    C: ClusterCommandRunner + ?Sized,
    H: HostCommandExecutor + ?Sized,
{
    let introduced = Version::parse(PREFLIGHT_INTRODUCED_AT).ok();
    if introduced.is_some_and(|v| target.less_than(&v)) {
        return PreflightCheckSuite::new(format!(
            "No preflight requirements for Kubernetes {}",
            target
        ));
    }

    match flavor {
        Flavor::OnPremises => on_premises_suite(cluster, host),
        Flavor::Distribution => distribution_suite(cluster),
    }
}
