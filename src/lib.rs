pub mod context;
pub mod error;
pub mod realm;
pub mod scope;
pub mod service;
pub mod store;
pub mod subject;
pub mod token;

pub use context::{IdentityContext, RunAsSession};
pub use error::{AuthError, AuthResult};
pub use realm::Realm;
pub use scope::{Scope, ScopeNamespace};
pub use service::IdentityService;
pub use store::{CredentialStore, Principal, UserRecord};
pub use subject::{Subject, SubjectOrigin};
pub use token::AuthToken;

// Test-only printing helper: expands to eprintln! during tests and is absent otherwise.
// Usage in tests: tprintln!("debug: {}", value);
#[cfg(any(test, debug_assertions))]
#[macro_export]
macro_rules! tprintln {
    ($($arg:tt)*) => ( eprintln!($($arg)*) );
}

// In non-test builds, provide a no-op tprintln! so calls compile without effect.
#[cfg(not(any(test, debug_assertions)))]
#[macro_export]
macro_rules! tprintln {
    ($($arg:tt)*) => ({
        // Preserve formatting checks in release without producing code
        if false { let _ = format!($($arg)*); }
    });
}
