//! Unique scopes
//!
//! A unique scope is a set of identifiers whose combined values must be
//! unique. It is stored sorted and deduplicated so that equality is set
//! equality and ordering is lexicographic over the sorted members.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct UniqueScope(Vec<String>);

impl UniqueScope {
    pub fn new<I, S>(members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut members: Vec<String> = members.into_iter().map(Into::into).collect();
        members.sort();
        members.dedup();
        Self(members)
    }

    /// Sorted members
    pub fn members(&self) -> &[String] {
        &self.0
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|member| member == name)
    }

    /// True when every member appears in `names`
    pub fn is_covered_by<S: AsRef<str>>(&self, names: &[S]) -> bool {
        self.0
            .iter()
            .all(|member| names.iter().any(|name| name.as_ref() == member))
    }

    /// True when at least one member appears in `names`
    pub fn intersects<S: AsRef<str>>(&self, names: &[S]) -> bool {
        self.0
            .iter()
            .any(|member| names.iter().any(|name| name.as_ref() == member))
    }
}

impl fmt::Display for UniqueScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.join(", "))
    }
}

/// Sorts and deduplicates a scope list.
pub(crate) fn normalize(mut scopes: Vec<UniqueScope>) -> Vec<UniqueScope> {
    scopes.sort();
    scopes.dedup();
    scopes
}
