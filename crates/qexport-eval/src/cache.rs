//! Memoization of condition outcomes
//!
//! One cache belongs to one export invocation. Keys are structured so that no choice of
//! delimiter can make two different conditions collide.

use qexport_model::Condition;
use std::collections::HashMap;

/// Identity of one condition evaluation
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConditionCacheKey {
    pub instance_id: i64,
    pub participant: String,
    pub condition: Condition,
}

impl ConditionCacheKey {
    pub fn new(instance_id: i64, participant: impl Into<String>, condition: &Condition) -> Self {
        Self {
            instance_id,
            participant: participant.into(),
            condition: condition.clone(),
        }
    }
}

/// Outcomes of already evaluated conditions
#[derive(Debug, Default)]
pub struct ConditionCache {
    outcomes: HashMap<ConditionCacheKey, bool>,
    hits: usize,
}

impl ConditionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached outcome for a key
    pub fn get(&mut self, key: &ConditionCacheKey) -> Option<bool> {
        let outcome = self.outcomes.get(key).copied();
        if outcome.is_some() {
            self.hits += 1;
        }
        outcome
    }

    pub fn insert(&mut self, key: ConditionCacheKey, outcome: bool) {
        self.outcomes.insert(key, outcome);
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Number of lookups answered from the cache
    pub fn hits(&self) -> usize {
        self.hits
    }
}
