//! Store-backed realm: verifies Basic credentials against the internal
//! credential store. Only Basic is understood; anything else is reported as
//! unsupported so the host can answer with a proper challenge.

use std::sync::Arc;

use crate::error::{AuthError, AuthResult};
use crate::realm::Realm;
use crate::store::{CredentialStore, Principal};
use crate::token::AuthToken;

pub struct InternalRealm {
    name: String,
    store: Arc<CredentialStore>,
}

impl InternalRealm {
    pub fn new(store: Arc<CredentialStore>) -> Self {
        InternalRealm { name: "internal".to_string(), store }
    }

    pub fn with_name(name: impl Into<String>, store: Arc<CredentialStore>) -> Self {
        InternalRealm { name: name.into(), store }
    }

    pub fn store(&self) -> &Arc<CredentialStore> {
        &self.store
    }
}

impl Realm for InternalRealm {
    fn name(&self) -> &str {
        &self.name
    }

    fn authenticate(&self, token: &AuthToken) -> AuthResult<Principal> {
        match token {
            AuthToken::Basic { username, password } => {
                let principal = self.store.authenticate(username, password)?;
                tracing::info!(username, realm = %self.name, "authenticated");
                Ok(principal)
            }
            other => Err(AuthError::unsupported(other.scheme())),
        }
    }
}
