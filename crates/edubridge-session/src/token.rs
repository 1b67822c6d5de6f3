//! Opaque session tokens.

use std::fmt;

/// Opaque identifier handed to a client after a successful login.
///
/// Tokens are 32 lowercase hex characters drawn from a random v4 UUID,
/// which carries 122 bits of entropy.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionToken(String);

impl SessionToken {
    /// Generate a fresh random token.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    /// Wrap an existing token string (e.g. read from a request).
    pub fn from_string(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Borrow the token as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short prefix that is safe to put in logs.
    pub fn redacted(&self) -> &str {
        redact(&self.0)
    }

    /// Consume the token and return the inner string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

/// First eight characters of a token.
pub(crate) fn redact(token: &str) -> &str {
    let end = token
        .char_indices()
        .nth(8)
        .map(|(i, _)| i)
        .unwrap_or(token.len());
    &token[..end]
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SessionToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_format() {
        let token = SessionToken::generate();
        assert_eq!(token.as_str().len(), 32);
        assert!(token.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_generate_unique() {
        let tokens: HashSet<_> = (0..1000).map(|_| SessionToken::generate()).collect();
        assert_eq!(tokens.len(), 1000);
    }

    #[test]
    fn test_redacted_prefix() {
        let token = SessionToken::from_string("0123456789abcdef");
        assert_eq!(token.redacted(), "01234567");

        let short = SessionToken::from_string("abc");
        assert_eq!(short.redacted(), "abc");
    }
}
