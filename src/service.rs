//! Composition root owning the single active authentication backend.
//! Explicitly constructed and passed by reference; there is no process-wide
//! mutable static. "At most one backend" is enforced here, at startup.

use std::sync::Arc;

use crate::error::{AuthError, AuthResult};
use crate::realm::{NoopRealm, Realm};
use crate::subject::Subject;
use crate::token::AuthToken;

/// Identity and access control service for a server process.
///
/// Cheap to clone (shared realm handle inside). Replacing a service instance
/// is a startup-only operation and must not happen while requests are being
/// served.
#[derive(Clone, Debug)]
pub struct IdentityService {
    realm: Arc<dyn Realm>,
}

impl IdentityService {
    /// Wire up the service from the realms registered at startup.
    ///
    /// Zero realms installs the permissive no-op backend. More than one is a
    /// fatal configuration error, raised before any traffic is accepted and
    /// never resolved by silently picking one.
    pub fn new(realms: Vec<Arc<dyn Realm>>) -> AuthResult<Self> {
        match realms.len() {
            0 => {
                tracing::debug!("no realm registered, installing permissive noop backend");
                Ok(IdentityService { realm: Arc::new(NoopRealm) })
            }
            1 => {
                // len checked above
                let realm = realms.into_iter().next().unwrap();
                tracing::info!(realm = realm.name(), "identity backend installed");
                Ok(IdentityService { realm })
            }
            n => {
                let names: Vec<&str> = realms.iter().map(|r| r.name()).collect();
                Err(AuthError::configuration(format!(
                    "multiple identity backends are not supported, found {}: {}",
                    n,
                    names.join(", ")
                )))
            }
        }
    }

    /// Service with a single known backend.
    pub fn with_realm(realm: Arc<dyn Realm>) -> Self {
        IdentityService { realm }
    }

    /// Permissive service used when identity enforcement is disabled.
    pub fn permissive() -> Self {
        IdentityService { realm: Arc::new(NoopRealm) }
    }

    /// Fresh subject handle bound to the currently active backend.
    pub fn subject(&self) -> Subject {
        Subject::new(self.realm.clone())
    }

    /// Outbound contract for the host request layer: verify a token and hand
    /// back an authenticated subject, or the typed rejection reason.
    pub fn authenticate(&self, token: &AuthToken) -> AuthResult<Subject> {
        let mut subject = self.subject();
        subject.authenticate(token)?;
        Ok(subject)
    }

    pub fn realm(&self) -> &Arc<dyn Realm> {
        &self.realm
    }

    pub fn realm_name(&self) -> &str {
        self.realm.name()
    }

    /// Whether the active backend actually enforces identity.
    pub fn enforces(&self) -> bool {
        self.realm.enforces()
    }
}
