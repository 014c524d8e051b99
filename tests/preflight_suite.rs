//! Preflight suites and the flavor policies built on them.

mod support;

use support::fakes::{FakeCluster, FakeHost};
use upgrade_gate::preflight::policy::{distribution_suite, on_premises_suite};
use upgrade_gate::preflight::{suite_for, Flavor, PreflightCheckSuite, Violation};
use upgrade_gate::report::Severity;
use upgrade_gate::version::Version;

fn v(s: &str) -> Version {
    Version::parse(s).unwrap()
}

#[test]
fn test_every_check_runs_and_order_is_kept() {
    let mut suite = PreflightCheckSuite::new("ordering");
    suite
        .warning("first", || -> Result<(), Violation> { Err(Violation::new("w1")) })
        .blocker("second", || -> Result<(), Violation> { Err(Violation::new("b1")) })
        .blocker("third", || -> Result<(), Violation> { Ok(()) })
        .warning("fourth", || -> Result<(), Violation> { Err(Violation::new("w2")) })
        .blocker("fifth", || -> Result<(), Violation> { Err(Violation::new("b2")) });

    let report = suite.run();
    assert_eq!(report.blockers, vec!["b1", "b2"]);
    assert_eq!(report.warnings, vec!["w1", "w2"]);
}

#[test]
fn test_healthy_on_premises_cluster_is_clean() {
    let cluster = FakeCluster::healthy();
    let host = FakeHost::healthy();

    let report = suite_for(Flavor::OnPremises, &v("1.35.0"), &cluster, &host).run();
    assert!(report.is_clean(), "unexpected findings: {}", report);
}

#[test]
fn test_unreachable_collaborators_produce_no_findings() {
    let cluster = FakeCluster::unreachable();
    let host = FakeHost::unreachable();

    for flavor in Flavor::ALL {
        let report = suite_for(flavor, &v("1.35.0"), &cluster, &host).run();
        assert!(report.is_clean(), "{} reported: {}", flavor, report);
    }
}

#[test]
fn test_on_premises_host_failures_block() {
    let cluster = FakeCluster::healthy();
    let host = FakeHost::healthy()
        .with_cgroup("tmpfs\n")
        .with_containerd("containerd github.com/containerd/containerd v1.7.22 7f7fdf5f");

    let report = on_premises_suite(&cluster, &host).run();

    assert_eq!(report.blockers.len(), 2);
    assert!(report.blockers[0].starts_with("cgroup v2: cgroup v1 detected (tmpfs)"));
    assert!(report.blockers[1].starts_with("containerd: containerd 1.x is EOL"));
    assert!(report.blockers[1]
        .ends_with("Current: containerd github.com/containerd/containerd v1.7.22 7f7fdf5f"));
    assert!(report.warnings.is_empty());
}

#[test]
fn test_ipvs_is_a_warning_in_both_flavors() {
    let cluster = FakeCluster::healthy()
        .with_proxy("[kube-proxy --config=/var/lib/kube-proxy/config.conf --proxy-mode=ipvs]");
    let host = FakeHost::healthy();

    for flavor in Flavor::ALL {
        let report = suite_for(flavor, &v("1.35.0"), &cluster, &host).run();
        assert!(!report.has_blockers());
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].starts_with("kube-proxy: IPVS mode detected"));
        assert!(report.warnings[0].contains("nftables"));
    }
}

#[test]
fn test_unsupported_nodes_are_aggregated() {
    let cluster = FakeCluster::healthy().with_nodes(&[
        "Ubuntu 22.04.4 LTS",
        "Ubuntu 20.04.6 LTS",
        "CentOS Linux 7 (Core)",
        "Red Hat Enterprise Linux 9.4 (Plow)",
    ]);

    let report = distribution_suite(&cluster).run();
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].starts_with(
        "node OS: some nodes run unsupported OS versions: \
         Ubuntu 20.04.6 LTS, CentOS Linux 7 (Core). Kubernetes 1.35 requires"
    ));
}

#[test]
fn test_flavors_differ_on_amazon_linux() {
    let cluster = FakeCluster::healthy().with_nodes(&["Amazon Linux 2"]);
    let host = FakeHost::healthy();

    let distribution = suite_for(Flavor::Distribution, &v("1.35.0"), &cluster, &host).run();
    assert!(distribution.is_clean());

    let on_premises = suite_for(Flavor::OnPremises, &v("1.35.0"), &cluster, &host).run();
    assert_eq!(on_premises.warnings.len(), 1);
}

#[test]
fn test_same_check_has_policy_specific_severity() {
    let cluster = FakeCluster::healthy();
    let host = FakeHost::healthy();

    let on_premises = on_premises_suite(&cluster, &host);
    let distribution = distribution_suite(&cluster);

    assert_eq!(
        on_premises.names(),
        vec![
            ("cgroup-v2", Severity::Blocker),
            ("containerd-version", Severity::Blocker),
            ("kube-proxy-mode", Severity::Warning),
            ("node-os", Severity::Warning),
        ]
    );
    assert_eq!(
        distribution.names(),
        vec![
            ("kube-proxy-mode", Severity::Warning),
            ("node-os", Severity::Warning),
        ]
    );
}

#[test]
fn test_older_targets_skip_preflight() {
    let cluster = FakeCluster::healthy().with_proxy("[kube-proxy --proxy-mode=ipvs]");
    let host = FakeHost::healthy().with_cgroup("tmpfs");

    let suite = suite_for(Flavor::OnPremises, &v("1.34.9"), &cluster, &host);
    assert!(suite.is_empty());
    assert!(suite.run().is_clean());
    assert!(cluster.calls.borrow().is_empty());
}

#[test]
fn test_cluster_queries() {
    let cluster = FakeCluster::healthy();
    distribution_suite(&cluster).run();

    let calls = cluster.calls.borrow();
    assert_eq!(calls.len(), 2);
    assert_eq!(
        &calls[0][..6],
        &["get", "ds", "-n", "kube-system", "-l", "component=kube-proxy"]
    );
    assert_eq!(&calls[1][..2], &["get", "nodes"]);
}
