//! Opaque, `/`-separated file tokens.

use std::fmt;

use crate::FileError;

/// Address of one stored file (or, as a prefix, of a group of files).
///
/// Tokens are relative paths made of non-empty segments. Absolute tokens and
/// `.`/`..` segments are rejected, so a token can never leave the storage root.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FileToken(String);

impl FileToken {
    /// Validate a token string.
    pub fn parse(raw: impl Into<String>) -> Result<Self, FileError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(FileError::InvalidToken("empty token".to_string()));
        }
        if raw.starts_with('/') || raw.contains('\\') {
            return Err(FileError::InvalidToken(raw));
        }
        if raw
            .split('/')
            .any(|segment| segment.is_empty() || segment == "." || segment == "..")
        {
            return Err(FileError::InvalidToken(raw));
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The `/`-separated segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }

    /// Check if `self` equals `prefix` or lies underneath it.
    pub fn starts_with(&self, prefix: &FileToken) -> bool {
        self.0 == prefix.0
            || (self.0.starts_with(&prefix.0) && self.0.as_bytes().get(prefix.0.len()) == Some(&b'/'))
    }
}

impl fmt::Display for FileToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for FileToken {
    type Err = FileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Build a file token from parts, joined with `/`.
///
/// Evaluates to `Result<FileToken, FileError>`.
///
/// # Example
///
/// ```rust,ignore
/// let token = file_token!("products", product_id, "image")?;
/// // "products/42/image"
/// ```
#[macro_export]
macro_rules! file_token {
    ($first:expr $(, $part:expr)* $(,)?) => {{
        let mut token = ::std::string::ToString::to_string(&$first);
        $(
            token.push('/');
            token.push_str(&::std::string::ToString::to_string(&$part));
        )*
        $crate::FileToken::parse(token)
    }};
}
