use std::fmt;

use thiserror::Error;

/// Bearer credential for the remote API.
///
/// Opaque to the pipeline. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("bearer token must not be empty")]
pub struct EmptyTokenError;

impl BearerToken {
    /// Surrounding whitespace is trimmed; an empty result is rejected.
    pub fn new(token: impl Into<String>) -> Result<Self, EmptyTokenError> {
        let token = token.into();
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(EmptyTokenError);
        }
        if trimmed.len() == token.len() {
            Ok(Self(token))
        } else {
            Ok(Self(trimmed.to_owned()))
        }
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BearerToken(<redacted>)")
    }
}
