//! Resolved flag state
//!
//! A plain mapping from flag name to its effective value. Snapshots handed
//! out by the store are owned copies; mutating them does not touch the store.

use crate::value::FlagValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::Index;

/// Flag name to effective value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlagState {
    values: BTreeMap<String, FlagValue>,
}

impl FlagState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, flag: &str) -> Option<&FlagValue> {
        self.values.get(flag)
    }

    pub fn contains(&self, flag: &str) -> bool {
        self.values.contains_key(flag)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FlagValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn into_inner(self) -> BTreeMap<String, FlagValue> {
        self.values
    }

    pub(crate) fn insert(&mut self, flag: impl Into<String>, value: FlagValue) -> Option<FlagValue> {
        self.values.insert(flag.into(), value)
    }
}

impl Index<&str> for FlagState {
    type Output = FlagValue;

    /// Panics if `flag` is not part of the state.
    fn index(&self, flag: &str) -> &FlagValue {
        &self.values[flag]
    }
}

impl<K: Into<String>, V: Into<FlagValue>> FromIterator<(K, V)> for FlagState {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a FlagState {
    type Item = (&'a String, &'a FlagValue);
    type IntoIter = std::collections::btree_map::Iter<'a, String, FlagValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}
