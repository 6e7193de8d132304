//! URL slug type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Slug`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum SlugError {
    /// The input string is empty or reduces to nothing.
    #[error("slug cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("slug must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains characters outside `[a-z0-9-]`.
    #[error("slug may only contain lowercase letters, digits, and hyphens")]
    InvalidCharacter,
}

/// A URL-safe identifier: lowercase ASCII letters, digits, and hyphens.
///
/// ## Examples
///
/// ```
/// use tamarind_core::Slug;
///
/// let slug = Slug::from_title("Hello, World! 2nd Edition");
/// assert_eq!(slug.as_str(), "hello-world-2nd-edition");
///
/// assert!(Slug::parse("valid-slug-42").is_ok());
/// assert!(Slug::parse("Not A Slug").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    /// Maximum length of a slug.
    pub const MAX_LENGTH: usize = 120;

    /// Parse a `Slug`, accepting only already-canonical input.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, too long, or contains
    /// characters outside `[a-z0-9-]`.
    pub fn parse(s: &str) -> Result<Self, SlugError> {
        if s.is_empty() {
            return Err(SlugError::Empty);
        }
        if s.len() > Self::MAX_LENGTH {
            return Err(SlugError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        if !s
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(SlugError::InvalidCharacter);
        }
        Ok(Self(s.to_owned()))
    }

    /// Derive a slug from free-form text.
    ///
    /// Lowercases, maps runs of non-alphanumeric characters to single
    /// hyphens, trims leading/trailing hyphens, and truncates to
    /// [`MAX_LENGTH`](Self::MAX_LENGTH). Falls back to `"untitled"` when
    /// nothing survives.
    #[must_use]
    pub fn from_title(title: &str) -> Self {
        let mut out = String::with_capacity(title.len());
        let mut last_hyphen = true; // suppress leading hyphen

        for c in title.chars() {
            if c.is_ascii_alphanumeric() {
                out.push(c.to_ascii_lowercase());
                last_hyphen = false;
            } else if !last_hyphen {
                out.push('-');
                last_hyphen = true;
            }
        }

        while out.ends_with('-') {
            out.pop();
        }
        out.truncate(Self::MAX_LENGTH);
        while out.ends_with('-') {
            out.pop();
        }

        if out.is_empty() {
            out.push_str("untitled");
        }

        Self(out)
    }

    /// Append a numeric suffix, used to deduplicate colliding slugs.
    #[must_use]
    pub fn with_suffix(&self, n: u32) -> Self {
        Self(format!("{}-{n}", self.0))
    }

    /// Returns the slug as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Slug` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Slug {
    type Err = SlugError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Slug {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Slug {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // Database values are assumed valid
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Slug {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_title_basic() {
        assert_eq!(Slug::from_title("Hello World").as_str(), "hello-world");
    }

    #[test]
    fn test_from_title_punctuation_runs() {
        assert_eq!(
            Slug::from_title("Rust & Coffee -- A Love Story!").as_str(),
            "rust-coffee-a-love-story"
        );
    }

    #[test]
    fn test_from_title_leading_trailing() {
        assert_eq!(Slug::from_title("  --spaced out--  ").as_str(), "spaced-out");
    }

    #[test]
    fn test_from_title_unicode_stripped() {
        assert_eq!(Slug::from_title("café ☕ time").as_str(), "caf-time");
    }

    #[test]
    fn test_from_title_empty_falls_back() {
        assert_eq!(Slug::from_title("!!!").as_str(), "untitled");
        assert_eq!(Slug::from_title("").as_str(), "untitled");
    }

    #[test]
    fn test_from_title_truncates() {
        let long = "word ".repeat(100);
        let slug = Slug::from_title(&long);
        assert!(slug.as_str().len() <= Slug::MAX_LENGTH);
        assert!(!slug.as_str().ends_with('-'));
    }

    #[test]
    fn test_with_suffix() {
        let slug = Slug::from_title("duplicate");
        assert_eq!(slug.with_suffix(2).as_str(), "duplicate-2");
    }

    #[test]
    fn test_parse_valid() {
        assert!(Slug::parse("abc-123").is_ok());
    }

    #[test]
    fn test_parse_rejects_uppercase() {
        assert!(matches!(
            Slug::parse("Abc"),
            Err(SlugError::InvalidCharacter)
        ));
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert!(matches!(Slug::parse(""), Err(SlugError::Empty)));
    }

    #[test]
    fn test_serde_transparent() {
        let slug = Slug::from_title("Some Post");
        let json = serde_json::to_string(&slug).unwrap();
        assert_eq!(json, "\"some-post\"");
    }
}
