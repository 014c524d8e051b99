//! Command execution against the cluster and the local host.
//!
//! Probes only see the two traits below. The shipped implementations wrap
//! `kubectl` and `std::process::Command`; tests substitute canned output.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::process::Command;

/// Runs queries against a live cluster.
pub trait ClusterCommandRunner {
    /// Run a cluster command (kubectl-style arguments) and return stdout.
    fn exec(&self, args: &[&str]) -> Result<Vec<u8>>;
}

/// Runs commands on the local host.
pub trait HostCommandExecutor {
    fn run(&self, name: &str, args: &[&str]) -> Result<Vec<u8>>;
}

impl<T: ClusterCommandRunner + ?Sized> ClusterCommandRunner for &T {
    fn exec(&self, args: &[&str]) -> Result<Vec<u8>> {
        (**self).exec(args)
    }
}

impl<T: HostCommandExecutor + ?Sized> HostCommandExecutor for &T {
    fn run(&self, name: &str, args: &[&str]) -> Result<Vec<u8>> {
        (**self).run(name, args)
    }
}

/// Run a command and return stdout on success.
///
/// # Errors
///
/// Returns an error if the command cannot be spawned or exits non-zero.
fn run_command(mut cmd: Command, display: &str) -> Result<Vec<u8>> {
    let output = cmd
        .output()
        .with_context(|| format!("Failed to run {}", display))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!("{} failed: {}", display, stderr.trim());
    }

    Ok(output.stdout)
}

/// [`ClusterCommandRunner`] backed by the `kubectl` binary.
#[derive(Debug, Clone)]
pub struct KubectlRunner {
    binary: PathBuf,
    kubeconfig: Option<PathBuf>,
}

impl KubectlRunner {
    pub fn new(binary: impl Into<PathBuf>, kubeconfig: Option<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            kubeconfig,
        }
    }

    pub fn kubeconfig(&self) -> Option<&std::path::Path> {
        self.kubeconfig.as_deref()
    }
}

impl Default for KubectlRunner {
    fn default() -> Self {
        Self::new("kubectl", None)
    }
}

impl ClusterCommandRunner for KubectlRunner {
    fn exec(&self, args: &[&str]) -> Result<Vec<u8>> {
        let mut cmd = Command::new(&self.binary);
        if let Some(ref kubeconfig) = self.kubeconfig {
            cmd.arg("--kubeconfig").arg(kubeconfig);
        }
        cmd.args(args);

        let display = format!("{} {}", self.binary.display(), args.join(" "));
        run_command(cmd, &display)
    }
}

/// [`HostCommandExecutor`] that spawns processes directly.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdHostExecutor;

impl HostCommandExecutor for StdHostExecutor {
    fn run(&self, name: &str, args: &[&str]) -> Result<Vec<u8>> {
        let mut cmd = Command::new(name);
        cmd.args(args);

        let display = format!("{} {}", name, args.join(" "));
        run_command(cmd, display.trim_end())
    }
}
