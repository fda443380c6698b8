//! Internal credential store: principal records, Argon2 password hashing
//! and the verification algorithm. Administrative add/remove is a
//! privileged operation; authorizing it is the caller's responsibility.

use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use password_hash::{PasswordHash, SaltString};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{AuthError, AuthResult};

/// Default identity seeded on a fresh store so a standalone node is
/// reachable before any users are provisioned.
///
/// Operational caveat: the default password equals the username and must be
/// rotated before the node is exposed to untrusted callers.
pub const BOOTSTRAP_USERNAME: &str = "admin";
pub const BOOTSTRAP_PASSWORD: &str = "admin";

/// Sentinel name reported by the permissive no-op backend.
pub const UNAUTHENTICATED_NAME: &str = "unauthenticated";

static UNAUTHENTICATED: Lazy<Principal> =
    Lazy::new(|| Principal(UNAUTHENTICATED_NAME.to_string()));

/// Opaque unique identifier of a caller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Principal(String);

impl Principal {
    pub fn new(name: impl Into<String>) -> Self {
        Principal(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    /// The synthetic principal handed out when identity enforcement is off.
    pub fn unauthenticated() -> Self {
        UNAUTHENTICATED.clone()
    }
}

impl std::fmt::Display for Principal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stored secret material in PHC string format. The string embeds the
/// algorithm and work-factor parameters chosen at record creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    phc: String,
}

impl Credential {
    /// Wrap an externally supplied PHC hash, validating its shape up front so
    /// a bad record fails at load time rather than at first login.
    pub fn from_phc(phc: impl Into<String>) -> AuthResult<Self> {
        let phc = phc.into();
        PasswordHash::new(&phc)
            .map_err(|e| AuthError::configuration(format!("invalid password hash: {}", e)))?;
        Ok(Credential { phc })
    }

    /// Hash a plaintext password with a fresh random salt.
    pub fn from_password(password: &str) -> AuthResult<Self> {
        Ok(Credential { phc: hash_password(password)? })
    }

    pub fn algorithm(&self) -> String {
        PasswordHash::new(&self.phc)
            .map(|h| h.algorithm.as_str().to_string())
            .unwrap_or_default()
    }

    /// Deliberately slow comparison against the stored hash.
    pub fn verify(&self, password: &str) -> bool {
        verify_password(&self.phc, password)
    }
}

pub fn hash_password(password: &str) -> AuthResult<String> {
    let mut salt_bytes = [0u8; 16];
    getrandom::getrandom(&mut salt_bytes)
        .map_err(|e| AuthError::configuration(format!("salt generation failed: {}", e)))?;
    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| AuthError::configuration(e.to_string()))?;
    let argon2 = Argon2::default();
    let phc = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::configuration(e.to_string()))?
        .to_string();
    Ok(phc)
}

pub fn verify_password(hash: &str, password: &str) -> bool {
    if let Ok(parsed) = PasswordHash::new(hash) {
        let argon2 = Argon2::default();
        argon2.verify_password(password.as_bytes(), &parsed).is_ok()
    } else {
        false
    }
}

/// Bootstrap credential definition as produced by the external
/// configuration loader: username, PHC hash and optional opaque metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserRecord {
    pub username: String,
    pub hash: String,
    #[serde(default)]
    pub attrs: Option<serde_json::Value>,
}

/// A stored principal plus its credential.
#[derive(Debug, Clone, PartialEq)]
pub struct InternalUser {
    pub principal: Principal,
    pub credential: Credential,
    pub attrs: Option<serde_json::Value>,
}

/// Thread-safe mapping of principal name to internal user. Single-key
/// operations are atomic; multi-key batches are not transactional.
#[derive(Debug)]
pub struct CredentialStore {
    users: RwLock<HashMap<String, InternalUser>>,
}

impl CredentialStore {
    /// Empty store with no seeded users.
    pub fn new() -> Self {
        CredentialStore { users: RwLock::new(HashMap::new()) }
    }

    /// Fresh store seeded with the bootstrap admin identity.
    pub fn with_bootstrap() -> AuthResult<Self> {
        let store = CredentialStore::new();
        store.add_user(BOOTSTRAP_USERNAME, BOOTSTRAP_PASSWORD)?;
        tracing::info!(username = BOOTSTRAP_USERNAME, "seeded bootstrap user");
        Ok(store)
    }

    /// Build a store from externally parsed records. One malformed entry
    /// aborts the whole load, naming the offending username; there is no
    /// partial load.
    pub fn from_records<I>(records: I) -> AuthResult<Self>
    where
        I: IntoIterator<Item = UserRecord>,
    {
        let store = CredentialStore::new();
        {
            let mut users = store.users.write();
            for rec in records {
                let credential = Credential::from_phc(rec.hash.as_str()).map_err(|_| {
                    AuthError::configuration(format!(
                        "invalid password hash for user '{}'",
                        rec.username
                    ))
                })?;
                users.insert(
                    rec.username.clone(),
                    InternalUser {
                        principal: Principal::new(rec.username.as_str()),
                        credential,
                        attrs: rec.attrs,
                    },
                );
            }
        }
        tracing::info!(count = store.len(), "loaded credential records");
        Ok(store)
    }

    /// Add (or replace) a user, hashing the plaintext password.
    pub fn add_user(&self, username: &str, password: &str) -> AuthResult<()> {
        let credential = Credential::from_password(password)?;
        self.users.write().insert(
            username.to_string(),
            InternalUser { principal: Principal::new(username), credential, attrs: None },
        );
        tracing::debug!(username, "stored user record");
        Ok(())
    }

    /// Add (or replace) a user from a pre-computed PHC hash.
    pub fn add_user_with_hash(&self, username: &str, phc: &str) -> AuthResult<()> {
        let credential = Credential::from_phc(phc)?;
        self.users.write().insert(
            username.to_string(),
            InternalUser { principal: Principal::new(username), credential, attrs: None },
        );
        Ok(())
    }

    /// Remove a user; returns whether a record was present.
    pub fn remove_user(&self, username: &str) -> bool {
        let removed = self.users.write().remove(username).is_some();
        if removed {
            tracing::debug!(username, "removed user record");
        }
        removed
    }

    pub fn get(&self, username: &str) -> Option<InternalUser> {
        self.users.read().get(username).cloned()
    }

    pub fn usernames(&self) -> Vec<String> {
        self.users.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.users.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.read().is_empty()
    }

    /// Verify a presented password for a named principal.
    ///
    /// This is a blocking, deliberately costly call (slow hash); keep it off
    /// latency-critical hot paths.
    pub fn authenticate(&self, username: &str, password: &str) -> AuthResult<Principal> {
        let user = self
            .get(username)
            .ok_or_else(|| AuthError::unknown_principal(username))?;
        if user.credential.verify(password) {
            tracing::debug!(username, "password verified");
            Ok(user.principal)
        } else {
            tracing::warn!(username, "password mismatch");
            Err(AuthError::incorrect_credentials(username))
        }
    }
}

impl Default for CredentialStore {
    fn default() -> Self {
        CredentialStore::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bootstrap_seeds_admin() {
        let store = CredentialStore::with_bootstrap().unwrap();
        assert_eq!(store.len(), 1);
        let p = store.authenticate("admin", "admin").unwrap();
        assert_eq!(p.name(), "admin");
    }

    #[test]
    fn unknown_principal_is_typed() {
        let store = CredentialStore::with_bootstrap().unwrap();
        let err = store.authenticate("ghost", "pw").unwrap_err();
        assert_eq!(err, AuthError::unknown_principal("ghost"));
    }

    #[test]
    fn wrong_password_is_typed() {
        let store = CredentialStore::with_bootstrap().unwrap();
        let err = store.authenticate("admin", "nope").unwrap_err();
        assert_eq!(err, AuthError::incorrect_credentials("admin"));
    }

    #[test]
    fn add_replaces_existing_record() {
        let store = CredentialStore::new();
        store.add_user("alice", "first").unwrap();
        store.add_user("alice", "second").unwrap();
        assert_eq!(store.len(), 1);
        assert!(store.authenticate("alice", "first").is_err());
        assert!(store.authenticate("alice", "second").is_ok());
    }

    #[test]
    fn remove_user_reports_presence() {
        let store = CredentialStore::new();
        store.add_user("alice", "pw").unwrap();
        assert!(store.remove_user("alice"));
        assert!(!store.remove_user("alice"));
        assert!(store.is_empty());
    }

    #[test]
    fn from_records_accepts_valid_phc() {
        let phc = hash_password("s3cr3t!").unwrap();
        let rec = UserRecord { username: "alice".into(), hash: phc, attrs: None };
        let store = CredentialStore::from_records(vec![rec]).unwrap();
        assert!(store.authenticate("alice", "s3cr3t!").is_ok());
    }

    #[test]
    fn from_records_aborts_naming_bad_entry() {
        let good = UserRecord {
            username: "alice".into(),
            hash: hash_password("pw").unwrap(),
            attrs: None,
        };
        let bad = UserRecord { username: "mallory".into(), hash: "not-a-phc".into(), attrs: None };
        let err = CredentialStore::from_records(vec![good, bad]).unwrap_err();
        match err {
            AuthError::Configuration { message } => assert!(message.contains("mallory"), "{}", message),
            other => panic!("expected configuration error, got {}", other),
        }
    }

    #[test]
    fn credential_reports_algorithm() {
        let cred = Credential::from_password("pw").unwrap();
        assert_eq!(cred.algorithm(), "argon2id");
    }

    #[test]
    fn user_record_deserializes_with_optional_attrs() {
        let phc = hash_password("pw").unwrap();
        let json = format!(r#"{{"username":"bob","hash":"{}"}}"#, phc);
        let rec: UserRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(rec.username, "bob");
        assert!(rec.attrs.is_none());
    }
}
