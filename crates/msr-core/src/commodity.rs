//! Commodity names: the keys the host uses to route requests and bids.

use std::fmt;

/// A named commodity (e.g. `"waste"`, `"fill"`).
///
/// Cheap to clone relative to the number of commodities a reactor trades in
/// one step; compared by string value.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Commodity(pub String);

impl Commodity {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Commodity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Commodity {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for Commodity {
    fn from(s: String) -> Self {
        Self(s)
    }
}
