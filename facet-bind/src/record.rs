//! Source records and key lookups.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use core::hash::BuildHasher;
use std::collections::HashMap;

use indexmap::IndexMap;
use facet_value::{VObject, Value};

/// How record keys are matched against field names.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum KeyCase {
    /// Keys must equal field names exactly.
    #[default]
    Sensitive,
    /// Keys match field names ignoring letter case.
    Insensitive,
}

impl KeyCase {
    /// Whether `a` and `b` name the same thing under this mode.
    pub fn matches(self, a: &str, b: &str) -> bool {
        match self {
            KeyCase::Sensitive => a == b,
            KeyCase::Insensitive => eq_ignore_case(a, b),
        }
    }
}

fn eq_ignore_case(a: &str, b: &str) -> bool {
    if a.is_ascii() && b.is_ascii() {
        return a.eq_ignore_ascii_case(b);
    }
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

/// A flat mapping from text keys to dynamic values.
///
/// `entries` returns `None` when the record is not a mapping at all (an
/// absent record, or a [`Value`] that is not an object).
pub trait Record {
    /// The entries of the record, in the record's own iteration order.
    fn entries(&self) -> Option<Vec<(&str, &Value)>>;
}

impl<S: BuildHasher> Record for HashMap<String, Value, S> {
    fn entries(&self) -> Option<Vec<(&str, &Value)>> {
        Some(self.iter().map(|(k, v)| (k.as_str(), v)).collect())
    }
}

impl<S: BuildHasher> Record for IndexMap<String, Value, S> {
    fn entries(&self) -> Option<Vec<(&str, &Value)>> {
        Some(self.iter().map(|(k, v)| (k.as_str(), v)).collect())
    }
}

impl Record for BTreeMap<String, Value> {
    fn entries(&self) -> Option<Vec<(&str, &Value)>> {
        Some(self.iter().map(|(k, v)| (k.as_str(), v)).collect())
    }
}

impl Record for VObject {
    fn entries(&self) -> Option<Vec<(&str, &Value)>> {
        Some(self.iter().map(|(k, v)| (k.as_str(), v)).collect())
    }
}

impl Record for Value {
    fn entries(&self) -> Option<Vec<(&str, &Value)>> {
        self.as_object().and_then(Record::entries)
    }
}

impl<R: Record> Record for Option<R> {
    fn entries(&self) -> Option<Vec<(&str, &Value)>> {
        self.as_ref().and_then(Record::entries)
    }
}

impl<R: Record + ?Sized> Record for &R {
    fn entries(&self) -> Option<Vec<(&str, &Value)>> {
        (**self).entries()
    }
}

/// A read-only view of a record's entries under a key-case mode.
#[derive(Debug)]
pub(crate) struct Source<'a> {
    entries: Vec<(&'a str, &'a Value)>,
    key_case: KeyCase,
}

impl<'a> Source<'a> {
    pub(crate) fn new(entries: Vec<(&'a str, &'a Value)>, key_case: KeyCase) -> Self {
        Self { entries, key_case }
    }

    pub(crate) fn entries(&self) -> &[(&'a str, &'a Value)] {
        &self.entries
    }

    /// Keys in record order.
    pub(crate) fn keys(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.entries.iter().map(|(k, _)| *k)
    }

    pub(crate) fn key_case(&self) -> KeyCase {
        self.key_case
    }

    /// The value for `name`: the exact key in case-sensitive mode, the first
    /// key equal ignoring case otherwise.
    pub(crate) fn get(&self, name: &str) -> Option<&'a Value> {
        self.entries
            .iter()
            .find(|(k, _)| self.key_case.matches(k, name))
            .map(|(_, v)| *v)
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
}
