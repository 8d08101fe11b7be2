//! Per-level choice history

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Choices recorded within one level, keyed by choice id
pub type ChoiceMap = BTreeMap<String, Value>;

/// levelId -> choiceId -> value
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChoiceLog {
    levels: BTreeMap<String, ChoiceMap>,
}

impl ChoiceLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or overwrite a choice
    pub fn record(&mut self, level_id: &str, choice_id: &str, value: Value) {
        self.levels
            .entry(level_id.to_string())
            .or_default()
            .insert(choice_id.to_string(), value);
    }

    pub fn get(&self, level_id: &str, choice_id: &str) -> Option<&Value> {
        self.levels.get(level_id)?.get(choice_id)
    }

    pub fn level(&self, level_id: &str) -> Option<&ChoiceMap> {
        self.levels.get(level_id)
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Number of levels with at least one recorded choice
    pub fn len(&self) -> usize {
        self.levels.len()
    }
}
