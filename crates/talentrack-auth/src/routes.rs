//! Route declarations for the dashboard navigation tree.
//!
//! Patterns are `/`-separated; a `:name` segment matches any single
//! non-empty segment and can be substituted into alias targets.

use crate::guard::AllowList;

/// Superadmin CRUD sections; each has a list, `/crear` and `/editar/:id` view.
const ADMIN_SECTIONS: [&str; 13] = [
    "empresas",
    "unidades-organizacionales",
    "puestos",
    "turnos",
    "reglas-asistencia",
    "tipos-ausencias",
    "kpis",
    "reportes-programados",
    "roles",
    "usuarios",
    "empleados",
    "permisos",
    "plantillas-kpi",
];

/// Home route of each role.
const ROLE_HOMES: [(&str, &str); 5] = [
    ("superadmin", "/superadmin/inicio"),
    ("rrhh", "/rrhh/inicio"),
    ("manager", "/manager/inicio"),
    ("empleado", "/empleado/inicio"),
    ("auditor", "/auditor/inicio"),
];

/// Access rule attached to a declared route.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RouteAccess {
    /// Visible without a session.
    Public,
    /// Requires a session whose role passes the allow-list.
    Protected(AllowList),
    /// Legacy path redirecting to another pattern.
    Alias(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct RouteEntry {
    segments: Vec<String>,
    access: RouteAccess,
}

/// Result of matching a path against the table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RouteMatch<'a> {
    /// Public view.
    Public,
    /// Protected view and its allow-list.
    Protected(&'a AllowList),
    /// Alias with parameters substituted into the target.
    Alias(String),
    /// No declared route matches.
    NotFound,
}

/// Ordered list of route declarations; the first match wins.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
}

impl RouteTable {
    /// Empty table.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Declare a route.
    #[must_use]
    pub fn route(mut self, pattern: &str, access: RouteAccess) -> Self {
        self.entries.push(RouteEntry {
            segments: split(pattern).map(str::to_string).collect(),
            access,
        });
        self
    }

    /// Declare a public route.
    #[must_use]
    pub fn public(self, pattern: &str) -> Self {
        self.route(pattern, RouteAccess::Public)
    }

    /// Declare a protected route.
    #[must_use]
    pub fn protected(self, pattern: &str, allow: AllowList) -> Self {
        self.route(pattern, RouteAccess::Protected(allow))
    }

    /// Declare a legacy alias.
    #[must_use]
    pub fn alias(self, pattern: &str, target: &str) -> Self {
        self.route(pattern, RouteAccess::Alias(target.to_string()))
    }

    /// The dashboard's navigation tree.
    #[must_use]
    pub fn talentrack() -> Self {
        let mut table = Self::new()
            .public("/")
            .public("/login")
            .public("/reset-password");

        for (role, home) in ROLE_HOMES {
            table = table.protected(home, AllowList::of([role]));
        }

        let superadmin = AllowList::of(["superadmin"]);
        for section in ADMIN_SECTIONS {
            table = table
                .protected(&format!("/admin/{section}"), superadmin.clone())
                .protected(&format!("/admin/{section}/crear"), superadmin.clone())
                .protected(&format!("/admin/{section}/editar/:id"), superadmin.clone());
        }

        table
            .alias("/admin/inicio", "/superadmin/inicio")
            .alias("/admin/empresas/crear-empresa", "/admin/empresas/crear")
            .alias(
                "/admin/empresas/editar-empresa/:id",
                "/admin/empresas/editar/:id",
            )
    }

    /// Home route declared for `role` (any case).
    #[must_use]
    pub fn role_home(role: &str) -> Option<&'static str> {
        let role = role.trim().to_lowercase();
        ROLE_HOMES
            .iter()
            .find(|(name, _)| *name == role)
            .map(|(_, home)| *home)
    }

    /// Number of declared routes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no routes are declared.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Match a navigation path (query and fragment are ignored).
    #[must_use]
    pub fn resolve(&self, path: &str) -> RouteMatch<'_> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = split(path).collect();

        for entry in &self.entries {
            let Some(params) = match_segments(&entry.segments, &segments) else {
                continue;
            };
            return match &entry.access {
                RouteAccess::Public => RouteMatch::Public,
                RouteAccess::Protected(allow) => RouteMatch::Protected(allow),
                RouteAccess::Alias(target) => RouteMatch::Alias(substitute(target, &params)),
            };
        }
        RouteMatch::NotFound
    }
}

fn split(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty())
}

fn match_segments<'p>(pattern: &'p [String], path: &[&'p str]) -> Option<Vec<(&'p str, &'p str)>> {
    if pattern.len() != path.len() {
        return None;
    }
    let mut params = Vec::new();
    for (expected, actual) in pattern.iter().zip(path) {
        if let Some(name) = expected.strip_prefix(':') {
            params.push((name, *actual));
        } else if expected != actual {
            return None;
        }
    }
    Some(params)
}

fn substitute(target: &str, params: &[(&str, &str)]) -> String {
    let segments: Vec<&str> = split(target)
        .map(|segment| {
            segment
                .strip_prefix(':')
                .and_then(|name| {
                    params
                        .iter()
                        .find(|(param, _)| *param == name)
                        .map(|(_, value)| *value)
                })
                .unwrap_or(segment)
        })
        .collect();
    format!("/{}", segments.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_routes_match_with_or_without_trailing_slash() {
        let table = RouteTable::talentrack();
        assert_eq!(table.resolve("/"), RouteMatch::Public);
        assert_eq!(table.resolve("/login/"), RouteMatch::Public);
        assert_eq!(table.resolve("/reset-password?token=x"), RouteMatch::Public);
    }

    #[test]
    fn role_homes_are_restricted_to_their_role() {
        let table = RouteTable::talentrack();
        let RouteMatch::Protected(allow) = table.resolve("/manager/inicio") else {
            panic!("manager home should be protected");
        };
        assert!(allow.permits("Manager"));
        assert!(!allow.permits("empleado"));
    }

    #[test]
    fn admin_sections_capture_ids() {
        let table = RouteTable::talentrack();
        assert_eq!(table.len(), 3 + 5 + 13 * 3 + 3);
        let RouteMatch::Protected(allow) = table.resolve("/admin/plantillas-kpi/editar/42") else {
            panic!("edit route should be protected");
        };
        assert!(allow.permits("superadmin"));
        assert_eq!(table.resolve("/admin/plantillas-kpi/editar"), RouteMatch::NotFound);
    }

    #[test]
    fn aliases_substitute_parameters() {
        let table = RouteTable::talentrack();
        assert_eq!(
            table.resolve("/admin/inicio"),
            RouteMatch::Alias("/superadmin/inicio".into())
        );
        assert_eq!(
            table.resolve("/admin/empresas/editar-empresa/9"),
            RouteMatch::Alias("/admin/empresas/editar/9".into())
        );
    }

    #[test]
    fn unknown_paths_are_not_found() {
        assert_eq!(
            RouteTable::talentrack().resolve("/nomina"),
            RouteMatch::NotFound
        );
        assert_eq!(RouteTable::new().resolve("/"), RouteMatch::NotFound);
    }

    #[test]
    fn role_home_lookup_ignores_case() {
        assert_eq!(RouteTable::role_home("RRHH"), Some("/rrhh/inicio"));
        assert_eq!(RouteTable::role_home("contador"), None);
    }
}
