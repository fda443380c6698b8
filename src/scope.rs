//! Permission scopes and the set-intersection authorization check.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ScopeNamespace {
    Action,
    Application,
    Extension,
}

impl fmt::Display for ScopeNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ScopeNamespace::Action => "action",
            ScopeNamespace::Application => "application",
            ScopeNamespace::Extension => "extension",
        };
        f.write_str(s)
    }
}

/// Structural permission descriptor: (namespace, area, action).
/// Two scopes are equal iff all three parts are equal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Scope {
    pub namespace: ScopeNamespace,
    pub area: String,
    pub action: String,
}

impl Scope {
    pub fn new(
        namespace: ScopeNamespace,
        area: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Scope { namespace, area: area.into(), action: action.into() }
    }

    /// Scope in the `action` namespace, e.g. `Scope::action("index", "read")`.
    pub fn action(area: impl Into<String>, action: impl Into<String>) -> Self {
        Scope::new(ScopeNamespace::Action, area, action)
    }

    pub fn application(area: impl Into<String>, action: impl Into<String>) -> Self {
        Scope::new(ScopeNamespace::Application, area, action)
    }

    pub fn extension(area: impl Into<String>, action: impl Into<String>) -> Self {
        Scope::new(ScopeNamespace::Extension, area, action)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.namespace, self.area, self.action)
    }
}

/// Authorization decision: true iff the granted set intersects the required
/// set. Required sets are OR-sets; any single match authorizes. An empty
/// required set never authorizes (default-deny).
pub fn any_match(granted: &HashSet<Scope>, required: &[Scope]) -> bool {
    required.iter().any(|s| granted.contains(s))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn granted(scopes: &[Scope]) -> HashSet<Scope> {
        scopes.iter().cloned().collect()
    }

    #[test]
    fn empty_required_is_denied() {
        let g = granted(&[Scope::action("index", "read")]);
        assert!(!any_match(&g, &[]));
    }

    #[test]
    fn empty_granted_is_denied() {
        assert!(!any_match(&HashSet::new(), &[Scope::action("index", "read")]));
    }

    #[test]
    fn single_overlap_authorizes() {
        let g = granted(&[Scope::action("index", "read"), Scope::action("index", "write")]);
        let required = vec![Scope::action("cluster", "admin"), Scope::action("index", "read")];
        assert!(any_match(&g, &required));
    }

    #[test]
    fn disjoint_sets_deny() {
        let g = granted(&[Scope::action("index", "read")]);
        assert!(!any_match(&g, &[Scope::action("index", "search")]));
    }

    #[test]
    fn equality_is_structural_across_all_parts() {
        assert_eq!(Scope::action("index", "read"), Scope::action("index", "read"));
        assert_ne!(Scope::action("index", "read"), Scope::application("index", "read"));
        assert_ne!(Scope::action("index", "read"), Scope::action("cluster", "read"));
        assert_ne!(Scope::action("index", "read"), Scope::action("index", "write"));
    }

    #[test]
    fn display_is_dotted_triple() {
        assert_eq!(Scope::action("index", "read").to_string(), "action.index.read");
    }
}
