//! Role-based navigation guard.
//!
//! # Design
//! - Authentication is checked strictly before authorization.
//! - Denial is a value, never an error; redirects always replace the history entry.
//! - Nothing is cached between navigations.

use std::collections::BTreeSet;

use tracing::debug;

use crate::context::SessionContextReader;
use crate::routes::{RouteMatch, RouteTable};

/// Lower-cased set of roles allowed to view a route. Empty allows any session.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AllowList {
    roles: BTreeSet<String>,
}

impl AllowList {
    /// Allow every authenticated role.
    #[must_use]
    pub const fn any() -> Self {
        Self {
            roles: BTreeSet::new(),
        }
    }

    /// Allow exactly the given roles.
    #[must_use]
    pub fn of<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            roles: roles
                .into_iter()
                .map(|role| role.as_ref().trim().to_lowercase())
                .filter(|role| !role.is_empty())
                .collect(),
        }
    }

    /// Whether the list places no restriction.
    #[must_use]
    pub fn is_unrestricted(&self) -> bool {
        self.roles.is_empty()
    }

    /// Whether `role` (any case) may pass.
    #[must_use]
    pub fn permits(&self, role: &str) -> bool {
        self.is_unrestricted() || self.roles.contains(&role.trim().to_lowercase())
    }

    /// Iterate the allowed roles.
    pub fn roles(&self) -> impl Iterator<Item = &str> {
        self.roles.iter().map(String::as_str)
    }
}

/// Why a navigation was redirected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RedirectReason {
    /// No session.
    Unauthenticated,
    /// Session role not in the allow-list.
    Forbidden,
    /// Legacy path mapped to its current location.
    Alias,
}

/// Outcome of one navigation attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    /// Mount the requested view.
    Render,
    /// Replace the current history entry with `to`.
    Redirect {
        /// Target path.
        to: String,
        /// Which gate produced the redirect.
        reason: RedirectReason,
    },
    /// No route matches the path.
    NotFound,
}

impl GuardDecision {
    /// Redirect target, if this is a redirect.
    #[must_use]
    pub fn redirect_target(&self) -> Option<&str> {
        match self {
            Self::Redirect { to, .. } => Some(to),
            Self::Render | Self::NotFound => None,
        }
    }

    /// Whether the navigation must replace the current history entry.
    #[must_use]
    pub const fn replaces_history(&self) -> bool {
        matches!(self, Self::Redirect { .. })
    }
}

/// Evaluates the authentication and authorization gates per navigation.
#[derive(Clone)]
pub struct RouteGuard {
    reader: SessionContextReader,
    login_route: String,
    routes: RouteTable,
}

impl RouteGuard {
    /// Guard using the dashboard's route declarations.
    #[must_use]
    pub fn new(reader: SessionContextReader, login_route: impl Into<String>) -> Self {
        Self {
            reader,
            login_route: login_route.into(),
            routes: RouteTable::talentrack(),
        }
    }

    /// Replace the route declarations.
    #[must_use]
    pub fn with_routes(mut self, routes: RouteTable) -> Self {
        self.routes = routes;
        self
    }

    /// Route declarations in use.
    #[must_use]
    pub const fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Gate a protected view guarded by `allow`.
    #[must_use]
    pub fn evaluate(&self, allow: &AllowList) -> GuardDecision {
        let Some(context) = self.reader.current() else {
            debug!("navigation denied: no session");
            return redirect(self.login_route.clone(), RedirectReason::Unauthenticated);
        };

        if allow.permits(&context.role) {
            return GuardDecision::Render;
        }

        let to = context
            .fallback()
            .map_or_else(|| self.login_route.clone(), str::to_string);
        debug!(role = %context.normalized_role(), to = %to, "navigation denied: role not allowed");
        redirect(to, RedirectReason::Forbidden)
    }

    /// Gate a navigation to `path` using the route declarations.
    #[must_use]
    pub fn navigate(&self, path: &str) -> GuardDecision {
        match self.routes.resolve(path) {
            RouteMatch::Public => GuardDecision::Render,
            RouteMatch::Alias(to) => redirect(to, RedirectReason::Alias),
            RouteMatch::Protected(allow) => self.evaluate(allow),
            RouteMatch::NotFound => GuardDecision::NotFound,
        }
    }
}

const fn redirect(to: String, reason: RedirectReason) -> GuardDecision {
    GuardDecision::Redirect { to, reason }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allow_list_normalises_case() {
        let allow = AllowList::of(["Manager", " AUDITOR ", ""]);
        assert!(allow.permits("manager"));
        assert!(allow.permits("Auditor"));
        assert!(!allow.permits("empleado"));
        assert_eq!(allow.roles().count(), 2);
    }

    #[test]
    fn empty_allow_list_permits_any_role() {
        assert!(AllowList::any().permits("anything"));
        assert!(AllowList::of(Vec::<String>::new()).is_unrestricted());
    }

    #[test]
    fn decision_helpers() {
        let redirect = GuardDecision::Redirect {
            to: "/login".into(),
            reason: RedirectReason::Unauthenticated,
        };
        assert_eq!(redirect.redirect_target(), Some("/login"));
        assert!(redirect.replaces_history());
        assert!(!GuardDecision::Render.replaces_history());
        assert!(GuardDecision::NotFound.redirect_target().is_none());
    }
}
