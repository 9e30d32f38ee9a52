//! Party-name alias normalization.
//!
//! Questions name parties informally ("국힘", "더민주") or with stray spaces
//! ("국민의 힘"). Everything downstream joins on the canonical spelling, so the
//! alias table maps each known variant to it.

use std::collections::BTreeMap;

/// Built-in aliases: informal names, abbreviations, and common misspellings
pub const DEFAULT_ALIASES: &[(&str, &str)] = &[
    ("국힘", "국민의힘"),
    ("국힘당", "국민의힘"),
    ("국민의 힘", "국민의힘"),
    ("국민의힘당", "국민의힘"),
    ("민주당", "더불어민주당"),
    ("더민주", "더불어민주당"),
    ("더민주당", "더불어민주당"),
    ("더불어 민주당", "더불어민주당"),
    ("조국당", "조국혁신당"),
    ("혁신당", "조국혁신당"),
    // keeps "혁신당" from claiming 개혁신당 when the party tables lack it
    ("개혁신당", "개혁신당"),
    ("조국 혁신당", "조국혁신당"),
    ("개혁 신당", "개혁신당"),
    ("기본당", "기본소득당"),
    ("사민당", "사회민주당"),
];

/// Party list used when the party tables cannot be read at startup
pub const FALLBACK_PARTIES: &[&str] = &[
    "더불어민주당",
    "국민의힘",
    "조국혁신당",
    "개혁신당",
    "진보당",
    "기본소득당",
    "사회민주당",
    "무소속",
];

/// A matched alias and the party it stands for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasMatch<'a> {
    pub alias: &'a str,
    pub canonical: &'a str,
}

/// Immutable alias → canonical party lookup.
///
/// Entries are kept longest-alias first so that the first substring hit is
/// also the most specific one ("조국혁신당" before "혁신당").
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    entries: Vec<(String, String)>,
}

impl AliasTable {
    pub fn new<I, A, C>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (A, C)>,
        A: Into<String>,
        C: Into<String>,
    {
        let mut by_alias: BTreeMap<String, String> = BTreeMap::new();
        for (alias, canonical) in pairs {
            let alias = alias.into().trim().to_string();
            let canonical = canonical.into().trim().to_string();
            if alias.is_empty() || canonical.is_empty() {
                continue;
            }
            by_alias.insert(alias, canonical);
        }

        let mut entries: Vec<(String, String)> = by_alias.into_iter().collect();
        // Longest first; BTreeMap order settles equal lengths deterministically
        entries.sort_by(|a, b| b.0.chars().count().cmp(&a.0.chars().count()));
        Self { entries }
    }

    /// Built-in aliases, then `extra` (which wins on conflict), then every
    /// canonical name mapped to itself.
    pub fn build<'a>(
        extra: &BTreeMap<String, String>,
        canonical: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let canonical: Vec<&str> = canonical.into_iter().collect();
        let pairs = DEFAULT_ALIASES
            .iter()
            .map(|(a, c)| ((*a).to_string(), (*c).to_string()))
            .chain(extra.iter().map(|(a, c)| (a.clone(), c.clone())))
            .chain(canonical.iter().map(|c| ((*c).to_string(), (*c).to_string())));
        Self::new(pairs)
    }

    /// Longest alias contained in `text`
    pub fn find(&self, text: &str) -> Option<AliasMatch<'_>> {
        self.entries
            .iter()
            .find(|(alias, _)| text.contains(alias.as_str()))
            .map(|(alias, canonical)| AliasMatch { alias, canonical })
    }

    /// Canonical party named anywhere in `text`
    #[cfg(test)]
    pub fn normalize(&self, text: &str) -> Option<&str> {
        self.find(text).map(|m| m.canonical)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(a, c)| (a.as_str(), c.as_str()))
    }
}
