//! Run-as context propagation. An explicit context value owned by the call
//! path, not a hidden thread-local: bind/unbind is a push/pop on a stack
//! with a drop guard, so the previous binding is restored on every exit
//! path, including panics.

use parking_lot::Mutex;

use crate::service::IdentityService;
use crate::store::Principal;
use crate::subject::Subject;

/// Holds the identity bound to the current unit of work. Pass it by
/// reference to whatever needs to know "who is running this".
#[derive(Default)]
pub struct IdentityContext {
    stack: Mutex<Vec<Subject>>,
}

impl IdentityContext {
    pub fn new() -> Self {
        IdentityContext { stack: Mutex::new(Vec::new()) }
    }

    /// The innermost bound subject, if any.
    pub fn current(&self) -> Option<Subject> {
        self.stack.lock().last().cloned()
    }

    /// Current bind depth; observable for tests and diagnostics.
    pub fn depth(&self) -> usize {
        self.stack.lock().len()
    }

    fn bind(&self, subject: Subject) -> Binding<'_> {
        self.stack.lock().push(subject);
        Binding { ctx: self }
    }

    /// Wrap a unit of work so that, when executed, `subject` is bound to
    /// this context for that single execution and unbound afterward no
    /// matter how the work terminates.
    pub fn associate_with<'a, F, R>(&'a self, subject: Subject, work: F) -> impl FnOnce() -> R + 'a
    where
        F: FnOnce() -> R + 'a,
    {
        move || {
            let _bound = self.bind(subject);
            work()
        }
    }

    /// Immediate-execution convenience over [`associate_with`].
    ///
    /// [`associate_with`]: IdentityContext::associate_with
    pub fn run_as<F, R>(&self, subject: Subject, work: F) -> R
    where
        F: FnOnce() -> R,
    {
        let _bound = self.bind(subject);
        work()
    }

    /// Bind a synthetic, pre-authenticated subject for a trusted internal
    /// call path. The subject is tagged as internally originated so audit
    /// trails can tell it apart from externally authenticated callers.
    /// Dropping the returned session unbinds it.
    ///
    /// Must never be reachable from external input.
    pub fn dangerous_authenticate_as<'a>(
        &'a self,
        service: &IdentityService,
        principal_name: &str,
    ) -> RunAsSession<'a> {
        let subject = Subject::internal(Principal::new(principal_name), service.realm().clone());
        tracing::debug!(principal = principal_name, "binding internal run-as subject");
        RunAsSession { binding: self.bind(subject.clone()), subject }
    }
}

struct Binding<'a> {
    ctx: &'a IdentityContext,
}

impl Drop for Binding<'_> {
    fn drop(&mut self) {
        self.ctx.stack.lock().pop();
    }
}

/// Scoped run-as session; releasing it unbinds the internal subject.
pub struct RunAsSession<'a> {
    #[allow(dead_code)]
    binding: Binding<'a>,
    subject: Subject,
}

impl RunAsSession<'_> {
    pub fn subject(&self) -> &Subject {
        &self.subject
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::realm::InternalRealm;
    use crate::store::CredentialStore;
    use crate::subject::SubjectOrigin;
    use crate::token::AuthToken;
    use std::sync::Arc;

    fn service() -> IdentityService {
        let store = Arc::new(CredentialStore::with_bootstrap().unwrap());
        IdentityService::with_realm(Arc::new(InternalRealm::new(store)))
    }

    #[test]
    fn associate_with_binds_only_during_execution() {
        let svc = service();
        let ctx = IdentityContext::new();
        let subject = svc.authenticate(&AuthToken::basic("admin", "admin")).unwrap();

        assert!(ctx.current().is_none());
        let work = ctx.associate_with(subject, || {
            let bound = ctx.current().expect("subject bound during work");
            assert_eq!(bound.principal().unwrap().name(), "admin");
        });
        work();
        assert!(ctx.current().is_none());
        assert_eq!(ctx.depth(), 0);
    }

    #[test]
    fn unbind_runs_when_work_panics() {
        let svc = service();
        let ctx = IdentityContext::new();
        let subject = svc.authenticate(&AuthToken::basic("admin", "admin")).unwrap();

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            ctx.run_as(subject, || panic!("boom"));
        }));
        assert!(result.is_err());
        assert!(ctx.current().is_none());
        assert_eq!(ctx.depth(), 0);
    }

    #[test]
    fn nested_bindings_restore_the_outer_subject() {
        let svc = service();
        let ctx = IdentityContext::new();
        let outer = svc.authenticate(&AuthToken::basic("admin", "admin")).unwrap();

        ctx.run_as(outer.clone(), || {
            let session = ctx.dangerous_authenticate_as(&svc, "maintenance-task");
            assert_eq!(ctx.depth(), 2);
            assert_eq!(
                ctx.current().unwrap().principal().unwrap().name(),
                "maintenance-task"
            );
            drop(session);
            // Outer binding is back after the session is released.
            assert_eq!(ctx.current().unwrap(), outer);
        });
        assert_eq!(ctx.depth(), 0);
    }

    #[test]
    fn run_as_session_is_tagged_internal() {
        let svc = service();
        let ctx = IdentityContext::new();
        let session = ctx.dangerous_authenticate_as(&svc, "system");
        assert_eq!(session.subject().origin(), SubjectOrigin::Internal);
        assert!(session.subject().is_authenticated());
        assert_eq!(session.subject().principal().unwrap().name(), "system");
    }

    #[test]
    fn externally_authenticated_subject_is_tagged_external() {
        let svc = service();
        let subject = svc.authenticate(&AuthToken::basic("admin", "admin")).unwrap();
        assert_eq!(subject.origin(), SubjectOrigin::External);
    }
}
