//! Authentication failure taxonomy and mapping helpers.
//! A single typed enum is used across the token codec, credential store and
//! realm backends, along with a helper mapper for HTTP hosts.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthError {
    /// Header present but undecodable: bad base64, bad UTF-8, or a
    /// missing/misplaced credentials delimiter.
    MalformedToken { message: String },
    /// Recognized-looking header whose scheme the active backend does not support.
    UnsupportedTokenKind { scheme: String },
    /// Decoded identity absent from the credential store.
    UnknownPrincipal { username: String },
    /// Known principal, presented secret does not match the stored hash.
    IncorrectCredentials { username: String },
    /// Invalid startup wiring: multiple backends, an unresolvable backend
    /// kind, or a malformed bootstrap record. Fatal, never request-time.
    Configuration { message: String },
}

impl AuthError {
    pub fn malformed<S: Into<String>>(msg: S) -> Self {
        AuthError::MalformedToken { message: msg.into() }
    }
    pub fn unsupported<S: Into<String>>(scheme: S) -> Self {
        AuthError::UnsupportedTokenKind { scheme: scheme.into() }
    }
    pub fn unknown_principal<S: Into<String>>(username: S) -> Self {
        AuthError::UnknownPrincipal { username: username.into() }
    }
    pub fn incorrect_credentials<S: Into<String>>(username: S) -> Self {
        AuthError::IncorrectCredentials { username: username.into() }
    }
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        AuthError::Configuration { message: msg.into() }
    }

    pub fn code_str(&self) -> &'static str {
        match self {
            AuthError::MalformedToken { .. } => "malformed_token",
            AuthError::UnsupportedTokenKind { .. } => "unsupported_token_kind",
            AuthError::UnknownPrincipal { .. } => "unknown_principal",
            AuthError::IncorrectCredentials { .. } => "incorrect_credentials",
            AuthError::Configuration { .. } => "configuration_error",
        }
    }

    pub fn message(&self) -> String {
        match self {
            AuthError::MalformedToken { message } => message.clone(),
            AuthError::UnsupportedTokenKind { scheme } => {
                format!("unsupported authentication scheme '{}'", scheme)
            }
            AuthError::UnknownPrincipal { username } => format!("unknown principal '{}'", username),
            AuthError::IncorrectCredentials { username } => {
                format!("incorrect credentials for '{}'", username)
            }
            AuthError::Configuration { message } => message.clone(),
        }
    }

    /// True for request-time rejections a host may want to collapse into a
    /// generic 401 without leaking whether the principal exists.
    pub fn is_rejection(&self) -> bool {
        !matches!(self, AuthError::Configuration { .. })
    }

    /// Map to HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            AuthError::MalformedToken { .. } => 400,
            AuthError::UnsupportedTokenKind { .. }
            | AuthError::UnknownPrincipal { .. }
            | AuthError::IncorrectCredentials { .. } => 401,
            AuthError::Configuration { .. } => 500,
        }
    }
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code_str(), self.message())
    }
}

impl std::error::Error for AuthError {}

pub type AuthResult<T> = Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_mapping() {
        assert_eq!(AuthError::malformed("bad b64").http_status(), 400);
        assert_eq!(AuthError::unsupported("Digest").http_status(), 401);
        assert_eq!(AuthError::unknown_principal("ghost").http_status(), 401);
        assert_eq!(AuthError::incorrect_credentials("alice").http_status(), 401);
        assert_eq!(AuthError::configuration("two backends").http_status(), 500);
    }

    #[test]
    fn rejection_excludes_configuration() {
        assert!(AuthError::incorrect_credentials("alice").is_rejection());
        assert!(AuthError::unknown_principal("ghost").is_rejection());
        assert!(AuthError::malformed("x").is_rejection());
        assert!(!AuthError::configuration("boom").is_rejection());
    }

    #[test]
    fn serde_tag_is_stable() {
        let e = AuthError::unsupported("Negotiate");
        let json = serde_json::to_string(&e).unwrap();
        assert!(json.contains("\"type\":\"unsupported_token_kind\""), "{}", json);
        let back: AuthError = serde_json::from_str(&json).unwrap();
        assert_eq!(back, e);
    }

    #[test]
    fn display_carries_code_and_message() {
        let e = AuthError::unknown_principal("ghost");
        let s = format!("{}", e);
        assert!(s.starts_with("unknown_principal:"));
        assert!(s.contains("ghost"));
    }
}
