//! Collection status tags.
//!
//! A collection carries an ordered set of [`Status`] tags rather than a single
//! state, e.g. `{active, default}`. At most one collection in a store may
//! carry [`Status::Default`]; the store enforces that whenever tags are
//! written.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Draft,
    Active,
    Default,
    Archived,
    Deprecated,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Active => "active",
            Self::Default => "default",
            Self::Archived => "archived",
            Self::Deprecated => "deprecated",
        }
    }

    pub fn from_str(s: &str) -> Result<Self, CoreError> {
        match s {
            "draft" => Ok(Self::Draft),
            "active" => Ok(Self::Active),
            "default" => Ok(Self::Default),
            "archived" => Ok(Self::Archived),
            "deprecated" => Ok(Self::Deprecated),
            _ => Err(CoreError::validation(
                "status",
                format!(
                    "Invalid status: '{s}'. Must be one of: draft, active, default, \
                     archived, deprecated"
                ),
            )),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// StatusSet
// ---------------------------------------------------------------------------

/// An ordered set of status tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusSet(BTreeSet<Status>);

impl StatusSet {
    pub fn new() -> Self {
        Self(BTreeSet::new())
    }

    pub fn of(tags: &[Status]) -> Self {
        Self(tags.iter().copied().collect())
    }

    pub fn contains(&self, status: Status) -> bool {
        self.0.contains(&status)
    }

    pub fn insert(&mut self, status: Status) -> bool {
        self.0.insert(status)
    }

    pub fn remove(&mut self, status: Status) -> bool {
        self.0.remove(&status)
    }

    /// Tags present in `self` but not in `other`.
    pub fn difference(&self, other: &StatusSet) -> StatusSet {
        Self(self.0.difference(&other.0).copied().collect())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = Status> + '_ {
        self.0.iter().copied()
    }

    /// `true` when the set carries `active` or `default`.
    pub fn is_live(&self) -> bool {
        self.contains(Status::Active) || self.contains(Status::Default)
    }
}

impl Default for StatusSet {
    fn default() -> Self {
        Self::of(&[Status::Draft])
    }
}

impl FromIterator<Status> for StatusSet {
    fn from_iter<I: IntoIterator<Item = Status>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Parses the pipe-joined form accepted at the boundary, e.g. `active|default`.
impl FromStr for StatusSet {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tags = s
            .split('|')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(Status::from_str)
            .collect::<Result<StatusSet, _>>()?;
        if tags.is_empty() {
            return Err(CoreError::validation("status", "Status must not be empty"));
        }
        Ok(tags)
    }
}

impl fmt::Display for StatusSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<&str> = self.0.iter().map(Status::as_str).collect();
        f.write_str(&joined.join("|"))
    }
}
