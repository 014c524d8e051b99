//! Ordered, severity-classified check runner.

use std::fmt;
use thiserror::Error;
use tracing::{debug, debug_span};

use crate::report::{Finding, Severity, ValidationReport};

/// A requirement a probe found unmet. The message is reported verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct Violation(pub String);

impl Violation {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    pub fn message(&self) -> &str {
        &self.0
    }
}

/// A single narrowly scoped check.
///
/// `Ok(())` means the requirement holds or could not be determined; the
/// suite does not distinguish the two.
pub trait Probe {
    fn check(&self) -> Result<(), Violation>;
}

impl<F> Probe for F
where
    F: Fn() -> Result<(), Violation>,
{
    fn check(&self) -> Result<(), Violation> {
        self()
    }
}

struct RegisteredCheck<'a> {
    name: String,
    severity: Severity,
    probe: Box<dyn Probe + 'a>,
}

/// Probes registered with the severity their caller assigns.
///
/// The same probe can be a blocker in one suite and a warning in another.
pub struct PreflightCheckSuite<'a> {
    title: String,
    checks: Vec<RegisteredCheck<'a>>,
}

impl<'a> PreflightCheckSuite<'a> {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            checks: Vec::new(),
        }
    }

    pub fn register(
        &mut self,
        name: impl Into<String>,
        severity: Severity,
        probe: impl Probe + 'a,
    ) -> &mut Self {
        self.checks.push(RegisteredCheck {
            name: name.into(),
            severity,
            probe: Box::new(probe),
        });
        self
    }

    pub fn blocker(&mut self, name: impl Into<String>, probe: impl Probe + 'a) -> &mut Self {
        self.register(name, Severity::Blocker, probe)
    }

    pub fn warning(&mut self, name: impl Into<String>, probe: impl Probe + 'a) -> &mut Self {
        self.register(name, Severity::Warning, probe)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    /// Registered check names with their severity, in run order.
    pub fn names(&self) -> Vec<(&str, Severity)> {
        self.checks
            .iter()
            .map(|c| (c.name.as_str(), c.severity))
            .collect()
    }

    /// Run every check in registration order and collect its findings,
    /// each tagged with the name it was registered under.
    ///
    /// A violation never stops the remaining checks.
    pub fn findings(&self) -> Vec<Finding> {
        let _span = debug_span!("preflight", suite = %self.title).entered();
        let mut findings = Vec::new();

        for check in &self.checks {
            match check.probe.check() {
                Ok(()) => debug!(check = %check.name, "passed"),
                Err(violation) => {
                    debug!(check = %check.name, severity = %check.severity, "violation");
                    findings.push(Finding::new(&check.name, violation.0, check.severity));
                }
            }
        }

        findings
    }

    /// Run every check and fold the findings into a report.
    pub fn run(&self) -> ValidationReport {
        let mut report = ValidationReport::new();
        for finding in self.findings() {
            report.push(finding);
        }
        report
    }
}

impl fmt::Debug for PreflightCheckSuite<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreflightCheckSuite")
            .field("title", &self.title)
            .field("checks", &self.names())
            .finish()
    }
}
