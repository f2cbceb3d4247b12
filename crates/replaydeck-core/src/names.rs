//! Player identity normalization
//!
//! Players show up under several account names. [`NameAliases`] maps each
//! known alias (case-insensitively) to one canonical name, which is what the
//! statistics are keyed by.

use std::collections::{BTreeMap, HashMap};

/// Immutable alias -> canonical name table
///
/// Built once at startup from configuration and passed by reference.
#[derive(Debug, Clone, Default)]
pub struct NameAliases {
    /// Lowercased alias -> canonical name
    lookup: HashMap<String, String>,
}

impl NameAliases {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `alias -> canonical` pairs
    ///
    /// When two aliases differ only by case, the later pair wins.
    pub fn from_pairs<I, A, C>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (A, C)>,
        A: AsRef<str>,
        C: Into<String>,
    {
        let lookup = pairs
            .into_iter()
            .map(|(alias, canonical)| (alias.as_ref().to_lowercase(), canonical.into()))
            .collect();
        Self { lookup }
    }

    pub fn len(&self) -> usize {
        self.lookup.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lookup.is_empty()
    }

    /// Canonical name for `name`; unmapped (and empty) names come back as-is
    pub fn canonical<'a>(&'a self, name: &'a str) -> &'a str {
        if name.is_empty() {
            return name;
        }
        self.lookup
            .get(&name.to_lowercase())
            .map(String::as_str)
            .unwrap_or(name)
    }

    /// Like [`canonical`](Self::canonical) but passes a missing name through
    pub fn normalize<'a>(&'a self, name: Option<&'a str>) -> Option<&'a str> {
        name.map(|n| self.canonical(n))
    }

    /// Canonical name only when normalization changed it
    pub fn changed(&self, name: Option<&str>) -> Option<String> {
        let name = name?;
        let canonical = self.canonical(name);
        (canonical != name).then(|| canonical.to_string())
    }
}

impl From<&BTreeMap<String, String>> for NameAliases {
    fn from(table: &BTreeMap<String, String>) -> Self {
        Self::from_pairs(table.iter().map(|(a, c)| (a.as_str(), c.clone())))
    }
}
