use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A chemical element symbol, normalized to capitalized form (`"Cl"`, `"C"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Element(String);

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid element symbol: '{0}'")]
pub struct ParseElementError(pub String);

impl Element {
    pub fn symbol(&self) -> &str {
        &self.0
    }

    /// Hydrogen and its isotopes are excluded from distance and symmetry tests.
    pub fn is_hydrogen(&self) -> bool {
        matches!(self.0.as_str(), "H" | "D" | "T")
    }
}

impl FromStr for Element {
    type Err = ParseElementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let mut chars = trimmed.chars();
        let Some(first) = chars.next() else {
            return Err(ParseElementError(s.to_string()));
        };
        let rest: String = chars.collect();
        if !first.is_ascii_alphabetic()
            || rest.len() > 2
            || !rest.chars().all(|c| c.is_ascii_alphabetic())
        {
            return Err(ParseElementError(s.to_string()));
        }
        Ok(Self(format!(
            "{}{}",
            first.to_ascii_uppercase(),
            rest.to_ascii_lowercase()
        )))
    }
}

impl TryFrom<String> for Element {
    type Error = ParseElementError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Element> for String {
    fn from(value: Element) -> Self {
        value.0
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
