//! Permissive realm installed when identity enforcement is disabled.
//! Subjects it backs are always authenticated and always pass scope checks.

use crate::error::AuthResult;
use crate::realm::Realm;
use crate::store::Principal;
use crate::token::AuthToken;

pub struct NoopRealm;

impl Realm for NoopRealm {
    fn name(&self) -> &str {
        "noop"
    }

    fn authenticate(&self, _token: &AuthToken) -> AuthResult<Principal> {
        Ok(Principal::unauthenticated())
    }

    fn enforces(&self) -> bool {
        false
    }
}
