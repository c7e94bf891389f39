use super::parameter::{ParameterKind, Vitals};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Parameter values of a creature at one age.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub age: u64,
    pub values: BTreeMap<ParameterKind, f64>,
}

impl StateSnapshot {
    pub fn capture(age: u64, vitals: &Vitals) -> Self {
        let values = vitals.iter().map(|p| (p.kind(), p.value())).collect();
        Self { age, values }
    }

    pub fn value(&self, kind: ParameterKind) -> Option<f64> {
        self.values.get(&kind).copied()
    }
}

/// Append-only log of snapshots. Entries cannot be modified once pushed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
    entries: Vec<StateSnapshot>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, snapshot: StateSnapshot) {
        self.entries.push(snapshot);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&StateSnapshot> {
        self.entries.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StateSnapshot> {
        self.entries.iter()
    }

    /// Time series of one parameter, oldest first. Snapshots without the kind are skipped.
    pub fn param_history(&self, kind: ParameterKind) -> Vec<f64> {
        self.entries.iter().filter_map(|s| s.value(kind)).collect()
    }

    /// Same as [`History::param_history`] paired with the age of each snapshot.
    pub fn param_series(&self, kind: ParameterKind) -> Vec<(u64, f64)> {
        self.entries
            .iter()
            .filter_map(|s| s.value(kind).map(|v| (s.age, v)))
            .collect()
    }
}
