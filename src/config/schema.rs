//! Configuration schema - the ordered rule set

use crate::rules::Rule;
use indexmap::IndexMap;
use std::collections::HashSet;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::legacy::{self, LegacyData, MigrationReport};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Snapshot rules, in display order
    #[serde(rename = "SnapshotRules", default = "default_rules")]
    pub rules: Vec<Rule>,

    /// Keys the current schema does not know, kept until the legacy fixup runs
    #[serde(flatten)]
    extension: LegacyData,

    /// Set whenever migration, validation or naming changed a rule
    #[serde(skip)]
    modified: bool,
}

fn default_rules() -> Vec<Rule> {
    vec![Rule::placeholder()]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rules: default_rules(),
            extension: IndexMap::new(),
            modified: false,
        }
    }
}

impl Config {
    /// Create a config holding the given rules
    pub fn with_rules(rules: Vec<Rule>) -> Self {
        Self {
            rules,
            ..Default::default()
        }
    }

    /// Whether anything changed since load and the file should be written back
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Whether out-of-schema keys are still waiting for the fixup
    pub fn has_extension_data(&self) -> bool {
        !self.extension.is_empty()
    }

    /// Upgrade legacy keys captured during deserialization.
    ///
    /// Runs at most once per instance: the captured keys are dropped
    /// whether or not migration succeeded. Returns `None` when there was
    /// nothing to look at.
    pub fn on_deserialized_fixup(&mut self) -> Option<MigrationReport> {
        if self.extension.is_empty() {
            return None;
        }

        let report = legacy::migrate_legacy(&self.extension, &mut self.rules);
        if report.modified {
            self.modified = true;
        }

        trace!(
            "Dropping {} out-of-schema key(s): {:?}",
            self.extension.len(),
            self.extension.keys().collect::<Vec<_>>()
        );
        self.extension.clear();

        Some(report)
    }

    /// Stable sort of the rules by name. Returns true if the order changed.
    pub fn sort_rules(&mut self) -> bool {
        if self.rules.is_sorted_by(|a, b| a.cmp_by_name(b).is_le()) {
            return false;
        }
        self.rules.sort_by(Rule::cmp_by_name);
        true
    }

    /// Coerce malformed user input in every rule
    pub fn validate_user_input(&mut self) -> bool {
        let mut changed = false;
        for rule in &mut self.rules {
            if rule.validate_user_input() {
                debug!("Corrected invalid settings in rule '{}'", rule.name);
                changed = true;
            }
        }

        if changed {
            self.modified = true;
        }
        changed
    }

    /// Name every rule that is blank or still the placeholder, then make
    /// names unique.
    ///
    /// Names are `Unnamed Rule {n}` with `n` counting up from 1 over the
    /// rules being named; a number whose name is already taken is skipped.
    /// A later rule repeating an earlier name becomes `{name} ({n})` with
    /// `n` starting at 2.
    pub fn name_rules(&mut self) -> bool {
        let mut counter = 0;
        let mut changed = false;

        for index in 0..self.rules.len() {
            if !self.rules[index].needs_name() {
                continue;
            }

            let name = loop {
                counter += 1;
                let candidate = format!("Unnamed Rule {}", counter);
                let taken = self
                    .rules
                    .iter()
                    .any(|r| !r.needs_name() && r.name == candidate);
                if !taken {
                    break candidate;
                }
            };

            debug!("Naming rule {} '{}'", index + 1, name);
            self.rules[index].set_name(name);
            changed = true;
        }

        if self.dedupe_names() {
            changed = true;
        }

        if changed {
            self.modified = true;
        }
        changed
    }

    fn dedupe_names(&mut self) -> bool {
        let mut seen = HashSet::new();
        let mut changed = false;

        for index in 0..self.rules.len() {
            let name = self.rules[index].name.clone();
            if seen.insert(name.clone()) {
                continue;
            }

            let mut suffix = 2;
            let unique = loop {
                let candidate = format!("{} ({})", name, suffix);
                let taken =
                    seen.contains(&candidate) || self.rules.iter().any(|r| r.name == candidate);
                if !taken {
                    break candidate;
                }
                suffix += 1;
            };

            debug!("Renaming duplicate rule '{}' to '{}'", name, unique);
            seen.insert(unique.clone());
            self.rules[index].set_name(unique);
            changed = true;
        }

        changed
    }

    /// Validate, name and sort. Returns true if any rule changed.
    pub fn normalize(&mut self) -> bool {
        let validated = self.validate_user_input();
        let named = self.name_rules();
        let sorted = self.sort_rules();
        validated || named || sorted
    }

    /// Look up a rule by name
    pub fn rule(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.name == name)
    }
}
