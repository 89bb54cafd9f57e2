//! Decide whether an observed error is transient (retry) or permanent (fail now).

use std::fmt;

use super::catalog::ErrorCatalog;

/// Result of classifying one error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// No catalog entry matched; stop retrying.
    Fatal,
    /// Matched a known-transient signature.
    Retryable { id: String, note: String },
}

impl Classification {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Classification::Retryable { .. })
    }

    pub fn matched_id(&self) -> Option<&str> {
        match self {
            Classification::Retryable { id, .. } => Some(id),
            Classification::Fatal => None,
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Classification::Fatal => f.write_str("fatal"),
            Classification::Retryable { id, note } if note.is_empty() => {
                write!(f, "retryable ({})", id)
            }
            Classification::Retryable { id, note } => write!(f, "retryable ({}): {}", id, note),
        }
    }
}

/// Classifier over one effective catalog, merged once at construction.
///
/// Unknown failures are fatal: with no catalogs, or only empty ones, every
/// error classifies as [`Classification::Fatal`].
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    effective: ErrorCatalog,
}

impl Classifier {
    /// Merge `catalogs` left to right; later catalogs override earlier ones on
    /// id collision.
    pub fn new<'a, I>(catalogs: I) -> Self
    where
        I: IntoIterator<Item = &'a ErrorCatalog>,
    {
        Self {
            effective: ErrorCatalog::merge("effective", catalogs),
        }
    }

    /// Classifier that treats every error as fatal.
    pub fn fail_closed() -> Self {
        Self::default()
    }

    pub fn catalog(&self) -> &ErrorCatalog {
        &self.effective
    }

    pub fn classify_text(&self, text: &str) -> Classification {
        match self.effective.first_match(text) {
            Some(entry) => Classification::Retryable {
                id: entry.id.clone(),
                note: entry.note.clone(),
            },
            None => Classification::Fatal,
        }
    }

    /// Classify an error by its rendered (`Display`) text.
    pub fn classify<E: fmt::Display + ?Sized>(&self, error: &E) -> Classification {
        self.classify_text(&error.to_string())
    }
}

/// One-shot classification against an ordered list of catalogs.
pub fn classify<E: fmt::Display + ?Sized>(error: &E, catalogs: &[&ErrorCatalog]) -> Classification {
    Classifier::new(catalogs.iter().copied()).classify(error)
}
