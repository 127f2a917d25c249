// Mod Domain Model - stylistic toggles for the generated text

use crate::domain::error::{DomainError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Stylistic tag selected by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mod {
    RickAstley,
    Yoda,
}

impl Mod {
    pub const ALL: [Mod; 2] = [Mod::RickAstley, Mod::Yoda];

    pub fn as_str(self) -> &'static str {
        match self {
            Mod::RickAstley => "rick_astley",
            Mod::Yoda => "yoda",
        }
    }

    /// Prompt line appended when the mod is selected
    pub fn prompt_fragment(self) -> &'static str {
        match self {
            Mod::RickAstley => "- Work in at least three Rick Astley song titles.",
            Mod::Yoda => "- Write every sentence the way Master Yoda speaks.",
        }
    }
}

impl std::fmt::Display for Mod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Mod {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        Mod::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| DomainError::UnknownMod(s.to_string()))
    }
}

/// Deduplicated set of mods, iterated in declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModSet(BTreeSet<Mod>);

impl ModSet {
    /// Parse a comma-delimited path segment such as `rick_astley,yoda`.
    ///
    /// Empty entries and surrounding whitespace are ignored, so `""` and
    /// `"yoda,"` are both accepted.
    pub fn parse_delimited(segment: &str) -> Result<Self> {
        Self::from_names(segment.split(','))
    }

    pub fn from_names<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = BTreeSet::new();
        for name in names {
            let name = name.as_ref().trim();
            if name.is_empty() {
                continue;
            }
            set.insert(name.parse::<Mod>()?);
        }
        Ok(Self(set))
    }

    pub fn contains(&self, m: Mod) -> bool {
        self.0.contains(&m)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Mod> + '_ {
        self.0.iter().copied()
    }

    pub fn names(&self) -> Vec<String> {
        self.iter().map(|m| m.as_str().to_string()).collect()
    }
}

impl FromIterator<Mod> for ModSet {
    fn from_iter<T: IntoIterator<Item = Mod>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
