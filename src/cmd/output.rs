//! Mode-aware terminal output for upgrade-gate commands.
//!
//! - Human: colored, symbol-prefixed lines
//! - Json: one JSON object per line
//! - Quiet: errors and blocker issues only
//!
//! Diagnostic logs go through `tracing` to stderr; this writes the results
//! a user asked for to stdout.

use colored::{Color, Colorize};
use serde_json::json;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use upgrade_gate::report::{Severity, ValidationReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
    Quiet,
}

impl OutputMode {
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if json {
            Self::Json
        } else if quiet {
            Self::Quiet
        } else {
            Self::Human
        }
    }
}

#[derive(Clone)]
pub struct Output {
    mode: OutputMode,
    writer: Arc<Mutex<Box<dyn Write + Send>>>,
    is_tty: bool,
}

impl Output {
    pub fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            writer: Arc::new(Mutex::new(Box::new(io::stdout()))),
            is_tty: atty::is(atty::Stream::Stdout),
        }
    }

    /// Output with a custom writer; color is disabled.
    pub fn with_writer(mode: OutputMode, writer: Box<dyn Write + Send>) -> Self {
        Self {
            mode,
            writer: Arc::new(Mutex::new(writer)),
            is_tty: false,
        }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// "→ {msg}" in cyan
    pub fn step(&self, msg: &str) {
        self.prefixed("→", Color::Cyan, "step", msg);
    }

    /// "✓ {msg}" in green
    pub fn success(&self, msg: &str) {
        self.prefixed("✓", Color::Green, "success", msg);
    }

    /// "⚠ {msg}" in yellow
    pub fn warn(&self, msg: &str) {
        self.prefixed("⚠", Color::Yellow, "warning", msg);
    }

    /// "✗ {msg}" in red. Printed in every mode.
    pub fn error(&self, msg: &str) {
        match self.mode {
            OutputMode::Quiet => self.write_line(&format!("✗ {}", msg)),
            _ => self.prefixed("✗", Color::Red, "error", msg),
        }
    }

    pub fn info(&self, msg: &str) {
        match self.mode {
            OutputMode::Human => self.write_line(msg),
            OutputMode::Json => self.write_json("info", msg),
            OutputMode::Quiet => {}
        }
    }

    /// Indented subordinate line
    pub fn detail(&self, msg: &str) {
        match self.mode {
            OutputMode::Human => self.write_line(&format!("  {}", msg)),
            OutputMode::Json => self.write_json("detail", msg),
            OutputMode::Quiet => {}
        }
    }

    /// Render a report: blocker section first, then warnings.
    ///
    /// Empty sections are omitted. In quiet mode only blockers are shown.
    pub fn report(&self, report: &ValidationReport) {
        match self.mode {
            OutputMode::Human => {
                let rendered = report.render_with(|severity| {
                    let color = match severity {
                        Severity::Blocker => Color::Red,
                        Severity::Warning => Color::Yellow,
                    };
                    self.paint(severity.heading(), color)
                });
                self.write_raw(&rendered);
            }
            OutputMode::Json => self.json(&json!({
                "blockers": report.blockers,
                "warnings": report.warnings,
            })),
            OutputMode::Quiet => {
                for blocker in &report.blockers {
                    self.write_line(&format!("✗ {}", blocker));
                }
            }
        }
    }

    /// Write a JSON value as a single line, regardless of mode.
    pub fn json(&self, value: &serde_json::Value) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", value);
        }
    }

    fn prefixed(&self, prefix: &str, color: Color, level: &str, msg: &str) {
        match self.mode {
            OutputMode::Human => {
                self.write_line(&format!("{} {}", self.paint(prefix, color), msg))
            }
            OutputMode::Json => self.write_json(level, msg),
            OutputMode::Quiet => {}
        }
    }

    fn paint(&self, text: &str, color: Color) -> String {
        if self.is_tty {
            text.color(color).bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn write_line(&self, line: &str) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", line);
        }
    }

    fn write_raw(&self, text: &str) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = write!(writer, "{}", text);
        }
    }

    fn write_json(&self, level: &str, msg: &str) {
        self.json(&json!({
            "level": level,
            "msg": msg,
        }));
    }
}
