//! Rule engine - evaluates rules against the live game state

use tracing::{debug, trace};

use super::{GameState, Rule};

/// Engine for evaluating snapshot rules
pub struct RuleEngine {
    rules: Vec<Rule>,
}

impl RuleEngine {
    /// Create a new rule engine with the given rules
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Every rule whose trigger matches, in rule order
    pub fn evaluate<'a, 's>(&'a self, state: &'s GameState) -> impl Iterator<Item = &'a Rule> {
        self.rules.iter().filter(move |rule| {
            let matched = rule.trigger.matches(state);
            if matched {
                debug!("Rule '{}' matched at {}", rule.name, state.time_of_day);
            } else {
                trace!("Rule '{}' did not match", rule.name);
            }
            matched
        })
    }

    /// First rule that matches, if any
    pub fn first_match(&self, state: &GameState) -> Option<&Rule> {
        self.evaluate(state).next()
    }

    /// Get all rules
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Rules fired by a button press
    pub fn key_rules(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter().filter(|r| r.trigger.is_key_trigger())
    }
}
