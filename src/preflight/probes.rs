//! Cluster and host probes.
//!
//! Every probe treats a failed collaborator call as "cannot determine" and
//! passes. Reachability of the cluster or host is a precondition outside the
//! gate's control, not a compatibility finding.

use tracing::debug;

use super::suite::{Probe, Violation};
use crate::exec::{ClusterCommandRunner, HostCommandExecutor};

/// Expected filesystem type at the cgroup mount point on a cgroup v2 host.
pub const CGROUP_V2_FS_TYPE: &str = "cgroup2fs";
pub const CGROUP_MOUNT_POINT: &str = "/sys/fs/cgroup/";

const KUBE_PROXY_COMMAND_QUERY: &str =
    "jsonpath={.items[*].spec.template.spec.containers[*].command}";
const NODE_OS_IMAGE_QUERY: &str =
    "jsonpath={range .items[*]}{.status.nodeInfo.osImage}{\"\\n\"}{end}";

/// Flags a deprecated kube-proxy mode in the kube-proxy DaemonSet command line.
#[derive(Debug, Clone)]
pub struct ProxyModeProbe<C> {
    cluster: C,
    deprecated_token: String,
    replacement: String,
    kubernetes: String,
}

impl<C: ClusterCommandRunner> ProxyModeProbe<C> {
    pub fn new(
        cluster: C,
        deprecated_token: impl Into<String>,
        replacement: impl Into<String>,
        kubernetes: impl Into<String>,
    ) -> Self {
        Self {
            cluster,
            deprecated_token: deprecated_token.into(),
            replacement: replacement.into(),
            kubernetes: kubernetes.into(),
        }
    }
}

impl<C: ClusterCommandRunner> Probe for ProxyModeProbe<C> {
    fn check(&self) -> Result<(), Violation> {
        debug!("Checking kube-proxy mode...");

        let out = match self.cluster.exec(&[
            "get",
            "ds",
            "-n",
            "kube-system",
            "-l",
            "component=kube-proxy",
            "-o",
            KUBE_PROXY_COMMAND_QUERY,
        ]) {
            Ok(out) => out,
            Err(e) => {
                debug!(error = %e, "kube-proxy: cannot determine mode, assuming compatible");
                return Ok(());
            }
        };

        let command = String::from_utf8_lossy(&out);
        if command.contains(&self.deprecated_token) {
            let mode = self.deprecated_token.to_uppercase();
            return Err(Violation::new(format!(
                "kube-proxy: {mode} mode detected - {mode} is deprecated in Kubernetes {} \
                 and will be removed in future versions. Plan migration to {} for next cluster update",
                self.kubernetes, self.replacement
            )));
        }

        debug!("kube-proxy mode is compatible - OK");
        Ok(())
    }
}

/// An OS family and the version tokens accepted for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OsFamily {
    pub family: String,
    /// Substrings of the lowercased image name. Empty accepts every version.
    pub versions: Vec<String>,
}

impl OsFamily {
    pub fn new(family: &str, versions: &[&str]) -> Self {
        Self {
            family: family.to_lowercase(),
            versions: versions.iter().map(|v| v.to_lowercase()).collect(),
        }
    }

    fn accepts(&self, image_lower: &str) -> bool {
        image_lower.contains(&self.family)
            && (self.versions.is_empty() || self.versions.iter().any(|v| image_lower.contains(v)))
    }
}

/// Accepted node operating systems plus the human-readable requirement
/// quoted when a node falls outside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OsWhitelist {
    families: Vec<OsFamily>,
    requirement: String,
}

impl OsWhitelist {
    pub fn new(families: Vec<OsFamily>, requirement: impl Into<String>) -> Self {
        Self {
            families,
            requirement: requirement.into(),
        }
    }

    /// Case-insensitive match of an OS image name.
    pub fn accepts(&self, os_image: &str) -> bool {
        let lower = os_image.to_lowercase();
        self.families.iter().any(|f| f.accepts(&lower))
    }

    pub fn requirement(&self) -> &str {
        &self.requirement
    }

    pub fn families(&self) -> &[OsFamily] {
        &self.families
    }
}

/// Reports nodes whose OS image is outside a whitelist, aggregated into one
/// finding.
#[derive(Debug, Clone)]
pub struct NodeOsProbe<C> {
    cluster: C,
    whitelist: OsWhitelist,
    kubernetes: String,
}

impl<C: ClusterCommandRunner> NodeOsProbe<C> {
    pub fn new(cluster: C, whitelist: OsWhitelist, kubernetes: impl Into<String>) -> Self {
        Self {
            cluster,
            whitelist,
            kubernetes: kubernetes.into(),
        }
    }
}

impl<C: ClusterCommandRunner> Probe for NodeOsProbe<C> {
    fn check(&self) -> Result<(), Violation> {
        debug!("Checking node OS compatibility...");

        let out = match self
            .cluster
            .exec(&["get", "nodes", "-o", NODE_OS_IMAGE_QUERY])
        {
            Ok(out) => out,
            Err(e) => {
                debug!(error = %e, "node OS: cannot determine OS, assuming compatible");
                return Ok(());
            }
        };

        let images = String::from_utf8_lossy(&out);
        let unsupported: Vec<&str> = images
            .lines()
            .map(str::trim)
            .filter(|image| !image.is_empty())
            .filter(|image| !self.whitelist.accepts(image))
            .collect();

        if !unsupported.is_empty() {
            return Err(Violation::new(format!(
                "node OS: some nodes run unsupported OS versions: {}. Kubernetes {} requires {}",
                unsupported.join(", "),
                self.kubernetes,
                self.whitelist.requirement()
            )));
        }

        debug!("node OS versions are compatible - OK");
        Ok(())
    }
}

/// Requires the host's cgroup mount to report the cgroup v2 filesystem type.
#[derive(Debug, Clone)]
pub struct CgroupVersionProbe<H> {
    host: H,
    upgrade_path: String,
    kubernetes: String,
}

impl<H: HostCommandExecutor> CgroupVersionProbe<H> {
    pub fn new(host: H, upgrade_path: impl Into<String>, kubernetes: impl Into<String>) -> Self {
        Self {
            host,
            upgrade_path: upgrade_path.into(),
            kubernetes: kubernetes.into(),
        }
    }
}

impl<H: HostCommandExecutor> Probe for CgroupVersionProbe<H> {
    fn check(&self) -> Result<(), Violation> {
        debug!("Checking cgroup v2 support...");

        let out = match self.host.run("stat", &["-fc", "%T", CGROUP_MOUNT_POINT]) {
            Ok(out) => out,
            Err(e) => {
                debug!(error = %e, "cgroup v2: cannot determine cgroup version on host");
                return Ok(());
            }
        };

        let fs_type = String::from_utf8_lossy(&out).trim().to_string();
        if fs_type != CGROUP_V2_FS_TYPE {
            return Err(Violation::new(format!(
                "cgroup v2: cgroup v1 detected ({}) but Kubernetes {} requires cgroup v2. Upgrade to {}",
                fs_type, self.kubernetes, self.upgrade_path
            )));
        }

        debug!("cgroup v2 is enabled - OK");
        Ok(())
    }
}

/// Requires the installed containerd to report one of the accepted major
/// versions.
#[derive(Debug, Clone)]
pub struct ContainerRuntimeProbe<H> {
    host: H,
    accepted_majors: Vec<String>,
    kubernetes: String,
}

impl<H: HostCommandExecutor> ContainerRuntimeProbe<H> {
    pub fn new(host: H, accepted_majors: &[&str], kubernetes: impl Into<String>) -> Self {
        Self {
            host,
            accepted_majors: accepted_majors.iter().map(|m| m.to_string()).collect(),
            kubernetes: kubernetes.into(),
        }
    }
}

impl<H: HostCommandExecutor> Probe for ContainerRuntimeProbe<H> {
    fn check(&self) -> Result<(), Violation> {
        debug!("Checking containerd version...");

        let out = match self.host.run("containerd", &["--version"]) {
            Ok(out) => out,
            Err(e) => {
                debug!(error = %e, "containerd: cannot determine version");
                return Ok(());
            }
        };

        // e.g. "containerd github.com/containerd/containerd v2.0.0 207ad71"
        let version = String::from_utf8_lossy(&out).trim().to_string();
        if !self.accepted_majors.iter().any(|m| version.contains(m.as_str())) {
            return Err(Violation::new(format!(
                "containerd: containerd 1.x is EOL and not supported in Kubernetes {}. \
                 Upgrade to containerd {} or later (accepted: {}). Current: {}",
                self.kubernetes,
                self.accepted_majors
                    .first()
                    .map(|m| m.trim_start_matches('v').trim_end_matches('.'))
                    .unwrap_or("2"),
                self.accepted_majors.join(", "),
                version
            )));
        }

        debug!(version = %version, "containerd version OK");
        Ok(())
    }
}
