//! Core domain types for portfolio hierarchy management

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque key identifying a portfolio in SonarQube.
///
/// Keys are unique within a server instance; no internal structure is assumed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PortfolioKey(pub String);

impl PortfolioKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PortfolioKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PortfolioKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

impl From<String> for PortfolioKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

/// A parent portfolio and the child references it should contain.
///
/// Value object built fresh from desired configuration or from an API
/// response on every operation; never persisted. `references` must not
/// contain `key` itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortfolioHierarchy {
    pub key: PortfolioKey,
    pub references: Vec<PortfolioKey>,
}

impl PortfolioHierarchy {
    pub fn new(key: impl Into<PortfolioKey>, references: Vec<PortfolioKey>) -> Self {
        Self {
            key: key.into(),
            references,
        }
    }

    /// References as a set, for membership comparisons.
    pub fn reference_set(&self) -> BTreeSet<PortfolioKey> {
        self.references.iter().cloned().collect()
    }
}

/// The add/remove buckets computed for one update cycle.
///
/// Each key is classified into exactly one bucket, so the two sets are
/// disjoint by construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceDelta {
    pub to_add: BTreeSet<PortfolioKey>,
    pub to_remove: BTreeSet<PortfolioKey>,
}

impl ReferenceDelta {
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}

/// Derive the external resource identity for a hierarchy from its parent key.
///
/// The id is a pure function of the key, never of server-assigned data, so it
/// round-trips through state without an extra API call.
pub fn resource_id(key: &PortfolioKey) -> String {
    format!("{}-parent", key.0)
}
