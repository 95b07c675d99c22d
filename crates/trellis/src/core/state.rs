//! Node names and kind tags.

use std::{borrow::Borrow, fmt, str::FromStr};

use convert_case::{Case, Casing};

use crate::error::{Error, Result};

/// Characters allowed in node names besides ASCII alphanumerics.
const NAME_PUNCTUATION: &[char] = &['_', '-', '.'];

/// Can `c` appear in a node name?
pub fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || NAME_PUNCTUATION.contains(&c)
}

/// A unique node name: ASCII alphanumerics plus `_`, `-` and `.`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeName {
    /// The validated name.
    name: String,
}

impl NodeName {
    /// Validate a caller-supplied name.
    pub fn parse(name: &str) -> Result<Self> {
        if name.is_empty() || name.chars().any(|c| !is_name_char(c)) {
            return Err(Error::InvalidName(name.into()));
        }
        Ok(Self { name: name.into() })
    }

    /// Coerce any string into a name: snake case with disallowed characters
    /// removed. Falls back to `node`.
    pub fn convert(raw: &str) -> Self {
        let mut name: String = raw
            .to_case(Case::Snake)
            .chars()
            .filter(|c| is_name_char(*c))
            .collect();
        if name.is_empty() {
            name.push_str("node");
        }
        Self { name }
    }

    /// Generated name for the `n`th node of a kind.
    pub fn generated(kind: &NodeKind, n: u64) -> Self {
        let mut name = Self::convert(kind.as_str());
        name.name.push_str(&format!("_{n}"));
        name
    }

    /// The name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.name
    }
}

impl FromStr for NodeName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for NodeName {
    type Error = Error;

    fn try_from(name: &str) -> Result<Self> {
        Self::parse(name)
    }
}

impl fmt::Display for NodeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl Borrow<str> for NodeName {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl PartialEq<&str> for NodeName {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl PartialEq<String> for NodeName {
    fn eq(&self, other: &String) -> bool {
        self.as_str() == other
    }
}

/// Category tag for a node, e.g. `container` or `button`. Kinds select the
/// constructor used by the factory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeKind(String);

impl NodeKind {
    /// Build a kind tag. Kinds are case-insensitive and stored lower-case.
    pub fn new(kind: impl AsRef<str>) -> Self {
        Self(kind.as_ref().trim().to_ascii_lowercase())
    }

    /// The kind as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeKind {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl PartialEq<&str> for NodeKind {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
