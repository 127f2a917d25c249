// Profile Domain Model - normalized GitHub profile data

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One language entry of a repository (bytes of code)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageSize {
    pub name: String,
    pub size: u64,
}

impl LanguageSize {
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
        }
    }
}

/// Profile data as returned by the code-hosting API, before aggregation.
///
/// Nullable upstream fields stay `Option` here; normalization happens in
/// [`ProfileQueryResult::from_raw`].
#[derive(Debug, Clone, Default)]
pub struct RawProfile {
    pub login: String,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub readme: Option<String>,
    /// Stargazer count per repository (most-starred first)
    pub stargazer_counts: Vec<u64>,
    /// Largest languages per repository
    pub repository_languages: Vec<Vec<LanguageSize>>,
}

/// Per-language byte totals with a running total under [`LanguageBytes::TOTAL_KEY`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LanguageBytes(BTreeMap<String, u64>);

impl LanguageBytes {
    /// Reserved key holding the sum of all per-language sizes
    pub const TOTAL_KEY: &'static str = "total";

    pub fn new() -> Self {
        let mut map = BTreeMap::new();
        map.insert(Self::TOTAL_KEY.to_string(), 0);
        Self(map)
    }

    pub fn add(&mut self, language: &str, size: u64) {
        *self.0.entry(language.to_string()).or_insert(0) += size;
        *self.0.entry(Self::TOTAL_KEY.to_string()).or_insert(0) += size;
    }

    pub fn total(&self) -> u64 {
        self.0.get(Self::TOTAL_KEY).copied().unwrap_or(0)
    }

    pub fn get(&self, language: &str) -> Option<u64> {
        self.0.get(language).copied()
    }

    /// Languages without the reserved total
    pub fn languages(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0
            .iter()
            .filter(|(k, _)| k.as_str() != Self::TOTAL_KEY)
            .map(|(k, v)| (k.as_str(), *v))
    }

    pub fn as_map(&self) -> &BTreeMap<String, u64> {
        &self.0
    }
}

impl Default for LanguageBytes {
    fn default() -> Self {
        Self::new()
    }
}

/// Flat profile record fed to the prompt composer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileQueryResult {
    pub location: String,
    pub total_stars: u64,
    pub language_bytes: LanguageBytes,
    pub username: String,
    pub bio: String,
    pub readme_text: String,
}

impl ProfileQueryResult {
    /// Aggregate raw upstream data into the flat record.
    ///
    /// Stars and language sizes are summed over exactly the repositories
    /// given; limiting to the top 10 is the query's job.
    pub fn from_raw(raw: RawProfile) -> Self {
        let total_stars = raw.stargazer_counts.iter().sum();

        let mut language_bytes = LanguageBytes::new();
        for repo in &raw.repository_languages {
            for lang in repo {
                language_bytes.add(&lang.name, lang.size);
            }
        }

        Self {
            location: raw.location.unwrap_or_default(),
            total_stars,
            language_bytes,
            username: raw.login,
            bio: raw.bio.unwrap_or_default(),
            readme_text: raw.readme.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_with_repos() -> RawProfile {
        RawProfile {
            login: "octocat".to_string(),
            bio: Some("I like cats".to_string()),
            location: Some("San Francisco".to_string()),
            readme: Some("# Hi".to_string()),
            stargazer_counts: vec![120, 30, 0, 7],
            repository_languages: vec![
                vec![LanguageSize::new("Rust", 1000), LanguageSize::new("Shell", 20)],
                vec![LanguageSize::new("Rust", 500)],
                vec![],
                vec![LanguageSize::new("TypeScript", 300), LanguageSize::new("Shell", 5)],
            ],
        }
    }

    #[test]
    fn test_total_stars_is_sum_of_stargazers() {
        let raw = raw_with_repos();
        let expected: u64 = raw.stargazer_counts.iter().sum();
        let result = ProfileQueryResult::from_raw(raw);
        assert_eq!(result.total_stars, expected);
        assert_eq!(result.total_stars, 157);
    }

    #[test]
    fn test_language_total_equals_sum_of_languages() {
        let result = ProfileQueryResult::from_raw(raw_with_repos());
        let bytes = &result.language_bytes;

        assert_eq!(bytes.get("Rust"), Some(1500));
        assert_eq!(bytes.get("Shell"), Some(25));
        assert_eq!(bytes.get("TypeScript"), Some(300));

        let per_language: u64 = bytes.languages().map(|(_, v)| v).sum();
        assert_eq!(bytes.total(), per_language);
        assert_eq!(bytes.total(), 1825);
    }

    #[test]
    fn test_zero_repositories() {
        let result = ProfileQueryResult::from_raw(RawProfile {
            login: "ghost".to_string(),
            ..Default::default()
        });
        assert_eq!(result.total_stars, 0);
        assert_eq!(result.language_bytes.languages().count(), 0);
        assert_eq!(result.language_bytes.as_map().len(), 1);
        assert_eq!(result.language_bytes.total(), 0);
    }

    #[test]
    fn test_missing_fields_become_empty_strings() {
        let result = ProfileQueryResult::from_raw(RawProfile {
            login: "ghost".to_string(),
            ..Default::default()
        });
        assert_eq!(result.readme_text, "");
        assert_eq!(result.bio, "");
        assert_eq!(result.location, "");
        assert_eq!(result.username, "ghost");
    }

    #[test]
    fn test_language_bytes_serializes_flat() {
        let mut bytes = LanguageBytes::new();
        bytes.add("Go", 10);
        let json = serde_json::to_value(&bytes).unwrap();
        assert_eq!(json, serde_json::json!({"Go": 10, "total": 10}));
    }
}
