//! Pluggable authentication backends (realms).
//! Keep the public surface thin and split implementation across sub-modules.

mod internal;
mod noop;

pub use internal::InternalRealm;
pub use noop::NoopRealm;

use std::sync::Arc;

use crate::error::{AuthError, AuthResult};
use crate::store::{CredentialStore, Principal};
use crate::token::AuthToken;

/// Polymorphic authentication source: verifies a presented token and yields
/// the verified principal, or a typed rejection reason.
pub trait Realm: Send + Sync {
    fn name(&self) -> &str;

    /// Verify a credential presentation. Blocking and potentially slow
    /// (password hashing); keep off latency-critical hot paths.
    fn authenticate(&self, token: &AuthToken) -> AuthResult<Principal>;

    /// Whether this backend actually checks anything. The permissive no-op
    /// backend returns false, and subjects it backs always pass checks.
    fn enforces(&self) -> bool {
        true
    }
}

impl std::fmt::Debug for dyn Realm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Realm").field("name", &self.name()).finish()
    }
}

/// Configuration string for the store-backed realm.
pub const INTERNAL_REALM: &str = "internal";
/// Configuration string for the permissive realm.
pub const NOOP_REALM: &str = "noop";

/// Explicit registry mapping a plain configuration string to a
/// compile-time-known factory, resolved once at startup. No dynamic loading.
pub fn resolve(kind: &str, store: &Arc<CredentialStore>) -> AuthResult<Arc<dyn Realm>> {
    match kind {
        INTERNAL_REALM => Ok(Arc::new(InternalRealm::new(store.clone()))),
        NOOP_REALM => Ok(Arc::new(NoopRealm)),
        other => Err(AuthError::configuration(format!("unknown realm kind '{}'", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_resolves_known_kinds() {
        let store = Arc::new(CredentialStore::new());
        assert_eq!(resolve(INTERNAL_REALM, &store).unwrap().name(), "internal");
        assert_eq!(resolve(NOOP_REALM, &store).unwrap().name(), "noop");
    }

    #[test]
    fn registry_rejects_unknown_kind() {
        let store = Arc::new(CredentialStore::new());
        let err = resolve("ldap", &store).unwrap_err();
        match err {
            AuthError::Configuration { message } => assert!(message.contains("ldap")),
            other => panic!("expected configuration error, got {}", other),
        }
    }
}
