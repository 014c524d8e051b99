//! Command handlers for the upgrade-gate CLI.

use anyhow::Result;
use std::path::Path;

use upgrade_gate::rules::RuleRegistry;

pub mod check;
pub mod compat;
pub mod output;
pub mod preflight;
pub mod rules;
pub mod util;

/// Load the rule table at `path`, or `None` to use the builtin rules.
pub fn load_rules(path: Option<&Path>) -> Result<Option<RuleRegistry>> {
    path.map(RuleRegistry::load_from).transpose()
}
