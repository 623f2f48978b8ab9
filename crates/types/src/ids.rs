//! Newtype wrappers for identifiers that flow between the import adapter,
//! the resolver, and the layout engine.
//!
//! Keeping them distinct prevents a style name from being used where a block
//! id is expected (both are plain strings in the source document).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Stable identifier of a flow block. Fragments refer back to their block by it.
#[derive(Debug, Clone, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(Arc<str>);

impl BlockId {
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for BlockId {
    fn from(s: String) -> Self {
        Self(s.into())
    }
}

impl From<&str> for BlockId {
    fn from(s: &str) -> Self {
        Self(s.into())
    }
}

impl AsRef<str> for BlockId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Name of a style definition (`w:styleId`). `basedOn` links are stored as this
/// type and resolved by lookup, never as owning pointers.
#[derive(Debug, Clone, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StyleId(Arc<str>);

impl StyleId {
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for StyleId {
    fn from(s: String) -> Self {
        Self(s.into())
    }
}

impl From<&str> for StyleId {
    fn from(s: &str) -> Self {
        Self(s.into())
    }
}

impl std::borrow::Borrow<str> for StyleId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StyleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
