//! Canned cluster and host collaborators.

use anyhow::{anyhow, Result};
use std::cell::RefCell;
use upgrade_gate::exec::{ClusterCommandRunner, HostCommandExecutor};

/// Answers kubectl queries by inspecting the requested resource.
#[derive(Default)]
pub struct FakeCluster {
    /// kube-proxy DaemonSet container command, e.g. "[kube-proxy --proxy-mode=ipvs]"
    pub proxy_command: Option<String>,
    /// One OS image per line, as the node query returns them
    pub node_images: Option<String>,
    pub calls: RefCell<Vec<Vec<String>>>,
}

impl FakeCluster {
    pub fn healthy() -> Self {
        Self {
            proxy_command: Some("[kube-proxy --proxy-mode=iptables]".to_string()),
            node_images: Some("Ubuntu 22.04.4 LTS\nUbuntu 24.04.1 LTS\n".to_string()),
            calls: RefCell::default(),
        }
    }

    /// Every query fails, as with an unreachable API server.
    pub fn unreachable() -> Self {
        Self::default()
    }

    pub fn with_proxy(mut self, command: &str) -> Self {
        self.proxy_command = Some(command.to_string());
        self
    }

    pub fn with_nodes(mut self, images: &[&str]) -> Self {
        self.node_images = Some(images.join("\n"));
        self
    }
}

impl ClusterCommandRunner for FakeCluster {
    fn exec(&self, args: &[&str]) -> Result<Vec<u8>> {
        self.calls
            .borrow_mut()
            .push(args.iter().map(|a| a.to_string()).collect());

        let answer = if args.contains(&"nodes") {
            &self.node_images
        } else {
            &self.proxy_command
        };
        answer
            .as_ref()
            .map(|s| s.as_bytes().to_vec())
            .ok_or_else(|| anyhow!("Unable to connect to the server: connection refused"))
    }
}

/// Answers host commands by program name.
#[derive(Default)]
pub struct FakeHost {
    pub cgroup_fs: Option<String>,
    pub containerd_version: Option<String>,
}

impl FakeHost {
    pub fn healthy() -> Self {
        Self {
            cgroup_fs: Some("cgroup2fs\n".to_string()),
            containerd_version: Some(
                "containerd github.com/containerd/containerd/v2 v2.0.4 1a43cb6a\n".to_string(),
            ),
        }
    }

    pub fn unreachable() -> Self {
        Self::default()
    }

    pub fn with_cgroup(mut self, fs_type: &str) -> Self {
        self.cgroup_fs = Some(fs_type.to_string());
        self
    }

    pub fn with_containerd(mut self, version: &str) -> Self {
        self.containerd_version = Some(version.to_string());
        self
    }
}

impl HostCommandExecutor for FakeHost {
    fn run(&self, name: &str, _args: &[&str]) -> Result<Vec<u8>> {
        let answer = match name {
            "stat" => &self.cgroup_fs,
            "containerd" => &self.containerd_version,
            other => return Err(anyhow!("unexpected command '{}'", other)),
        };
        answer
            .as_ref()
            .map(|s| s.as_bytes().to_vec())
            .ok_or_else(|| anyhow!("{}: command not found", name))
    }
}
