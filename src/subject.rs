//! Per-call identity handle: authentication state plus granted scopes.
//! A subject belongs to exactly one logical call context and is never
//! persisted; concurrent mutation of a shared subject is a caller bug.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::error::AuthResult;
use crate::realm::Realm;
use crate::scope::{self, Scope};
use crate::store::Principal;
use crate::token::AuthToken;

/// Where a subject came from, kept for audit trails. Run-as subjects minted
/// by trusted internal call paths are distinguishable from subjects that
/// authenticated via an external credential presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubjectOrigin {
    External,
    Internal,
}

#[derive(Clone)]
enum AuthState {
    Anonymous,
    Authenticated(Principal),
}

#[derive(Clone)]
pub struct Subject {
    realm: Arc<dyn Realm>,
    state: AuthState,
    scopes: HashSet<Scope>,
    origin: SubjectOrigin,
}

impl Subject {
    /// Fresh subject bound to the given realm. Subjects backed by the
    /// permissive realm start out (and stay) authenticated.
    pub fn new(realm: Arc<dyn Realm>) -> Self {
        let state = if realm.enforces() {
            AuthState::Anonymous
        } else {
            AuthState::Authenticated(Principal::unauthenticated())
        };
        Subject { realm, state, scopes: HashSet::new(), origin: SubjectOrigin::External }
    }

    /// Synthetic, pre-authenticated subject for trusted internal call paths.
    /// Never constructed from external input.
    pub(crate) fn internal(principal: Principal, realm: Arc<dyn Realm>) -> Self {
        Subject {
            realm,
            state: AuthState::Authenticated(principal),
            scopes: HashSet::new(),
            origin: SubjectOrigin::Internal,
        }
    }

    /// Log the subject in via the active realm. On success the verified
    /// principal is bound; the scope set starts empty at construction and is
    /// populated by a later, separate role lookup (before or after login).
    /// On failure the subject stays anonymous and the typed reason
    /// propagates to the caller.
    pub fn authenticate(&mut self, token: &AuthToken) -> AuthResult<()> {
        let principal = self.realm.authenticate(token)?;
        self.state = AuthState::Authenticated(principal);
        Ok(())
    }

    pub fn principal(&self) -> Option<&Principal> {
        match &self.state {
            AuthState::Anonymous => None,
            AuthState::Authenticated(p) => Some(p),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.state, AuthState::Authenticated(_))
    }

    /// Replace the scope set wholesale. Legal before or after
    /// authentication; there is no incremental merge.
    pub fn set_scopes(&mut self, scopes: impl IntoIterator<Item = Scope>) {
        self.scopes = scopes.into_iter().collect();
    }

    pub fn scopes(&self) -> &HashSet<Scope> {
        &self.scopes
    }

    pub fn origin(&self) -> SubjectOrigin {
        self.origin
    }

    pub fn realm_name(&self) -> &str {
        self.realm.name()
    }

    /// Authorization decision: any single required scope held by this
    /// subject authorizes. An empty required set is always denied. Subjects
    /// backed by the permissive realm always pass.
    pub fn is_allowed(&self, required: &[Scope]) -> bool {
        if !self.realm.enforces() {
            return true;
        }
        scope::any_match(&self.scopes, required)
    }
}

// Identity is the principal alone; scopes are deliberately excluded so that
// logging/deduplication comparisons never turn into access decisions.
impl PartialEq for Subject {
    fn eq(&self, other: &Self) -> bool {
        self.principal() == other.principal()
    }
}

impl fmt::Debug for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subject")
            .field("principal", &self.principal().map(|p| p.name()))
            .field("realm", &self.realm.name())
            .field("origin", &self.origin)
            .field("scopes", &self.scopes.len())
            .finish()
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.principal() {
            Some(p) => write!(f, "Subject(principal={})", p),
            None => write!(f, "Subject(anonymous)"),
        }
    }
}
