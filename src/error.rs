//! Error type for single-record lookups.
//!
//! Listing operations never fail (a broken source degrades to an empty
//! result), so only lookups by slug carry a typed error.

/// Why a post or author could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// No source has a record with this slug.
    #[error("not found: {0}")]
    NotFound(String),

    /// A record with this slug exists but could not be read or parsed.
    #[error("malformed content for '{slug}': {reason}")]
    Malformed { slug: String, reason: String },
}

impl ResolveError {
    pub fn not_found(slug: impl Into<String>) -> Self {
        Self::NotFound(slug.into())
    }

    pub fn malformed(slug: impl Into<String>, reason: impl ToString) -> Self {
        Self::Malformed {
            slug: slug.into(),
            reason: reason.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
