//! Named, ordered sets of pure matchers describing known-transient failures.

use std::fmt;

use regex_lite::Regex;

/// Error building a catalog from user-supplied patterns.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("invalid retryable error pattern {pattern:?} (entry {id}): {source}")]
    InvalidPattern {
        id: String,
        pattern: String,
        #[source]
        source: regex_lite::Error,
    },
}

/// Pure text predicate over an error's rendered message.
///
/// No variant may consult the clock, the network, or mutable state; the same
/// text always yields the same answer.
#[derive(Clone)]
pub enum Matcher {
    /// Text contains the given substring (case-sensitive).
    Contains(String),
    /// Text matches the regular expression anywhere.
    Regex(Regex),
    /// Plain function pointer; cannot capture state.
    Predicate(fn(&str) -> bool),
    /// Matches every text.
    Any,
}

impl Matcher {
    pub fn matches(&self, text: &str) -> bool {
        match self {
            Matcher::Contains(needle) => text.contains(needle.as_str()),
            Matcher::Regex(re) => re.is_match(text),
            Matcher::Predicate(f) => f(text),
            Matcher::Any => true,
        }
    }
}

impl fmt::Debug for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Matcher::Contains(s) => write!(f, "Contains({:?})", s),
            Matcher::Regex(re) => write!(f, "Regex({:?})", re.as_str()),
            Matcher::Predicate(_) => f.write_str("Predicate(..)"),
            Matcher::Any => f.write_str("Any"),
        }
    }
}

/// One known-transient failure signature.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub id: String,
    pub matcher: Matcher,
    /// Human explanation of why this failure is transient.
    pub note: String,
}

impl CatalogEntry {
    pub fn new(id: impl Into<String>, matcher: Matcher, note: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            matcher,
            note: note.into(),
        }
    }

    pub fn matches(&self, text: &str) -> bool {
        self.matcher.matches(text)
    }
}

/// Ordered mapping of id to entry for one tool or API.
///
/// Ids are unique within a catalog. Evaluation order is insertion order; an
/// entry re-inserted under an existing id replaces it in place. An empty
/// catalog is legal and classifies everything as fatal.
#[derive(Debug, Clone, Default)]
pub struct ErrorCatalog {
    name: String,
    entries: Vec<CatalogEntry>,
}

impl ErrorCatalog {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    /// Build a catalog of regex entries keyed by their own pattern text,
    /// mirroring the usual `pattern -> description` retry tables.
    pub fn from_patterns<'a, I>(name: impl Into<String>, patterns: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut catalog = Self::new(name);
        for (pattern, note) in patterns {
            catalog = catalog.with_regex(pattern, pattern, note)?;
        }
        Ok(catalog)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Insert an entry, replacing any existing entry with the same id at its
    /// original position.
    pub fn insert(&mut self, entry: CatalogEntry) {
        match self.entries.iter_mut().find(|e| e.id == entry.id) {
            Some(slot) => *slot = entry,
            None => self.entries.push(entry),
        }
    }

    pub fn with_entry(mut self, entry: CatalogEntry) -> Self {
        self.insert(entry);
        self
    }

    pub fn with_substring(self, id: &str, needle: &str, note: &str) -> Self {
        self.with_entry(CatalogEntry::new(id, Matcher::Contains(needle.to_string()), note))
    }

    pub fn with_predicate(self, id: &str, predicate: fn(&str) -> bool, note: &str) -> Self {
        self.with_entry(CatalogEntry::new(id, Matcher::Predicate(predicate), note))
    }

    pub fn with_regex(self, id: &str, pattern: &str, note: &str) -> Result<Self, CatalogError> {
        let re = Regex::new(pattern).map_err(|source| CatalogError::InvalidPattern {
            id: id.to_string(),
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(self.with_entry(CatalogEntry::new(id, Matcher::Regex(re), note)))
    }

    /// Merge catalogs left to right. On id collision the later catalog's entry
    /// wins but keeps the position where the id first appeared, so the
    /// effective order stays deterministic.
    pub fn merge<'a, I>(name: impl Into<String>, catalogs: I) -> Self
    where
        I: IntoIterator<Item = &'a ErrorCatalog>,
    {
        let mut merged = Self::new(name);
        for catalog in catalogs {
            for entry in &catalog.entries {
                merged.insert(entry.clone());
            }
        }
        merged
    }

    /// First entry, in catalog order, whose matcher accepts `text`.
    pub fn first_match(&self, text: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.matches(text))
    }
}
