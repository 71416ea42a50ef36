// Copyright 2024 Cornell University
// released under BSD 3-Clause License
// author: Kevin Laeufer <laeufer@cornell.edu>

use super::StringRef;
use indexmap::IndexMap;

/// Tracks the values assigned to variables while interpreting an update.
/// The term domain is generic: solver terms, expressions or concrete values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Valuations<T> {
    entries: IndexMap<StringRef, T>,
}

impl<T> Default for Valuations<T> {
    fn default() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }
}

impl<T> Valuations<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces any previous value of `name`.
    pub fn assign(&mut self, name: StringRef, value: T) {
        self.entries.insert(name, value);
    }

    pub fn get(&self, name: StringRef) -> Option<&T> {
        self.entries.get(&name)
    }

    pub fn contains(&self, name: StringRef) -> bool {
        self.entries.contains_key(&name)
    }

    /// Entries in the order in which variables were first assigned.
    pub fn iter(&self) -> impl Iterator<Item = (StringRef, &T)> + '_ {
        self.entries.iter().map(|(n, v)| (*n, v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> FromIterator<(StringRef, T)> for Valuations<T> {
    fn from_iter<I: IntoIterator<Item = (StringRef, T)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
