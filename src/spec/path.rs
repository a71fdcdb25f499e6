//! Slash-delimited group paths (`"Sales/Q1"`).
//!
//! Used for content `tabgroup`s as well as navbar and sidebar placement of
//! pages. Parsing is the only way to build one, so an empty segment can never
//! reach the tree resolver.

use crate::config::ConfigError;
use compact_str::CompactString;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use smallvec::SmallVec;
use std::{fmt, str::FromStr};

/// Separator between path segments.
pub const PATH_SEPARATOR: char = '/';

/// A validated, non-empty sequence of group labels.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TabPath {
    segments: SmallVec<[CompactString; 4]>,
}

impl TabPath {
    /// Parse a path such as `"Parent/Child"`.
    ///
    /// Whitespace around each segment is trimmed. Labels are case-sensitive.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let err = |reason| ConfigError::PathSyntax {
            path: raw.to_owned(),
            reason,
        };

        if raw.trim().is_empty() {
            return Err(err("path is empty"));
        }

        let segments = raw
            .split(PATH_SEPARATOR)
            .map(|segment| {
                let segment = segment.trim();
                if segment.is_empty() {
                    Err(err("empty segment"))
                } else {
                    Ok(CompactString::from(segment))
                }
            })
            .collect::<Result<SmallVec<_>, _>>()?;

        Ok(Self { segments })
    }

    pub fn segments(&self) -> impl ExactSizeIterator<Item = &str> {
        self.segments.iter().map(CompactString::as_str)
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Last segment, the label of the node an item lands in.
    pub fn leaf(&self) -> &str {
        // non-empty by construction
        self.segments.last().map_or("", CompactString::as_str)
    }

    /// Path made of the first `len` segments.
    pub fn prefix(&self, len: usize) -> Option<Self> {
        (1..=self.depth()).contains(&len).then(|| Self {
            segments: self.segments[..len].iter().cloned().collect(),
        })
    }

    pub fn starts_with(&self, other: &Self) -> bool {
        self.segments.starts_with(&other.segments)
    }
}

impl fmt::Display for TabPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, "{PATH_SEPARATOR}")?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

impl FromStr for TabPath {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for TabPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TabPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
