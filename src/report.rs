//! Blocker/warning report shared by the compatibility validator and the
//! preflight suite.

use serde::Serialize;
use std::fmt;

/// How a finding affects the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Must be fixed; the operation is aborted.
    Blocker,
    /// Reported, never blocks.
    Warning,
}

impl Severity {
    /// Section heading used when rendering a report.
    pub fn heading(&self) -> &'static str {
        match self {
            Self::Blocker => "BLOCKER ISSUES (must fix):",
            Self::Warning => "WARNINGS (recommended to fix):",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blocker => write!(f, "BLOCKER"),
            Self::Warning => write!(f, "WARNING"),
        }
    }
}

/// A single message produced by a named check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub check: String,
    pub message: String,
    pub severity: Severity,
}

impl Finding {
    pub fn new(check: impl Into<String>, message: impl Into<String>, severity: Severity) -> Self {
        Self {
            check: check.into(),
            message: message.into(),
            severity,
        }
    }

    pub fn blocker(check: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(check, message, Severity::Blocker)
    }

    pub fn warning(check: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(check, message, Severity::Warning)
    }
}

/// Result of one validation or preflight run.
///
/// Both lists keep detection order. Only blockers fail a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub blockers: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, finding: Finding) {
        match finding.severity {
            Severity::Blocker => self.blockers.push(finding.message),
            Severity::Warning => self.warnings.push(finding.message),
        }
    }

    pub fn add_blocker(&mut self, message: impl Into<String>) {
        self.blockers.push(message.into());
    }

    pub fn add_warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn has_blockers(&self) -> bool {
        !self.blockers.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// True when the run produced no findings at all.
    pub fn is_clean(&self) -> bool {
        self.blockers.is_empty() && self.warnings.is_empty()
    }

    /// Append another report's findings after this one's.
    pub fn extend(&mut self, other: ValidationReport) {
        self.blockers.extend(other.blockers);
        self.warnings.extend(other.warnings);
    }

    /// Render both sections, passing each heading through `heading` so
    /// callers can decorate it. Empty sections are omitted.
    pub fn render_with<F>(&self, heading: F) -> String
    where
        F: Fn(Severity) -> String,
    {
        let mut out = String::new();
        for (severity, items) in [
            (Severity::Blocker, &self.blockers),
            (Severity::Warning, &self.warnings),
        ] {
            if items.is_empty() {
                continue;
            }
            out.push_str(&heading(severity));
            out.push('\n');
            for item in items {
                out.push_str("  - ");
                out.push_str(item);
                out.push('\n');
            }
        }
        out
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render_with(|severity| severity.heading().to_string()))
    }
}
