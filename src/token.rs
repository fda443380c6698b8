//! Authorization header decoding into typed auth tokens.
//! The codec only understands the shapes of credentials; verifying them is
//! the job of the active realm backend.

use base64::Engine;
use std::fmt;

use crate::error::{AuthError, AuthResult};

/// Header the host layer extracts the raw value from.
pub const AUTH_HEADER_NAME: &str = "Authorization";

const BASIC_PREFIX: &str = "Basic";
const BEARER_PREFIX: &str = "Bearer";

/// A typed credential presentation extracted from an `Authorization` header.
#[derive(Clone, PartialEq, Eq)]
pub enum AuthToken {
    Basic { username: String, password: String },
    Bearer { token: String },
}

impl AuthToken {
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        AuthToken::Basic { username: username.into(), password: password.into() }
    }

    pub fn bearer(token: impl Into<String>) -> Self {
        AuthToken::Bearer { token: token.into() }
    }

    pub fn scheme(&self) -> &'static str {
        match self {
            AuthToken::Basic { .. } => BASIC_PREFIX,
            AuthToken::Bearer { .. } => BEARER_PREFIX,
        }
    }
}

// Manual Debug: secret material must never reach logs.
impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthToken::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            AuthToken::Bearer { .. } => {
                f.debug_struct("Bearer").field("token", &"<redacted>").finish()
            }
        }
    }
}

/// Decode a raw `Authorization` header value into a typed token.
///
/// A missing (or blank) header is not an error: there is simply no token,
/// and the caller decides whether anonymous access is acceptable.
pub fn decode(header_value: Option<&str>) -> AuthResult<Option<AuthToken>> {
    let Some(raw) = header_value else { return Ok(None) };
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    if let Some(rest) = raw.strip_prefix(BASIC_PREFIX) {
        return decode_basic(rest.trim()).map(Some);
    }
    if let Some(rest) = raw.strip_prefix(BEARER_PREFIX) {
        // Opaque payload, carried through untouched for the backend to judge.
        return Ok(Some(AuthToken::Bearer { token: rest.trim().to_string() }));
    }

    let scheme = raw.split_whitespace().next().unwrap_or(raw);
    tracing::warn!(scheme, "unsupported authorization scheme in header");
    Err(AuthError::unsupported(scheme))
}

/// Decode the base64 remainder of a `Basic` header and split it at the
/// FIRST colon only: text before is the username, everything after
/// (further colons included) is the password. An empty password is valid.
fn decode_basic(payload: &str) -> AuthResult<AuthToken> {
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| AuthError::malformed(format!("invalid base64 in Basic payload: {}", e)))?;
    let decoded = String::from_utf8(decoded)
        .map_err(|_| AuthError::malformed("Basic payload is not valid UTF-8"))?;

    match decoded.split_once(':') {
        // A leading colon would mean an empty username, which no store can hold.
        Some(("", _)) => Err(AuthError::malformed("empty username in Basic payload")),
        Some((username, password)) => {
            Ok(AuthToken::Basic { username: username.to_string(), password: password.to_string() })
        }
        None => Err(AuthError::malformed("missing ':' delimiter in Basic payload")),
    }
}
