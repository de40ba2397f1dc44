// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::Value;

/// One record in a stream: a finite mapping from field names to values.
///
/// Two rows may carry disjoint key sets; no schema is enforced anywhere in
/// the engine. Operators that need a field fail at evaluation time when a
/// row does not carry it. Rows are never mutated across operator
/// boundaries, operators that transform rows emit fresh ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Row(pub BTreeMap<String, Value>);

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Right-overlay merge: a fresh row starting from `self`'s fields with
    /// `right`'s fields written over them on matching keys.
    pub fn overlaid_with(&self, right: &Row) -> Row {
        let mut merged = self.clone();
        for (key, value) in &right.0 {
            merged.0.insert(key.clone(), value.clone());
        }
        merged
    }
}

impl FromIterator<(String, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Row(iter.into_iter().collect())
    }
}

impl<K: Into<String>, V: Into<Value>, const N: usize> From<[(K, V); N]> for Row {
    fn from(fields: [(K, V); N]) -> Self {
        fields
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect()
    }
}
