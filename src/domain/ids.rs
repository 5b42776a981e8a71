use std::fmt;

use serde::{Deserialize, Serialize};

/// Row identifier of a catalog record. The slug remains the public key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PngId(i64);

impl PngId {
    pub const fn new(value: i64) -> Self {
        Self(value)
    }
}

impl From<i64> for PngId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<PngId> for i64 {
    fn from(id: PngId) -> Self {
        id.0
    }
}

impl fmt::Display for PngId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
