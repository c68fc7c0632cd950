//! Translate guard decisions into router actions.

use talentrack_auth::GuardDecision;

/// What the router should do for one navigation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NavAction {
    /// Render the requested view.
    Mount,
    /// Replace the current history entry with this path.
    Replace(String),
    /// Render the not-found page.
    NotFound,
}

impl From<&GuardDecision> for NavAction {
    fn from(decision: &GuardDecision) -> Self {
        match decision {
            GuardDecision::Render => Self::Mount,
            GuardDecision::Redirect { to, .. } => Self::Replace(to.clone()),
            GuardDecision::NotFound => Self::NotFound,
        }
    }
}

/// Human title for a dashboard path, used by the placeholder views.
#[must_use]
pub fn view_title(path: &str) -> String {
    let segments: Vec<&str> = path
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect();
    match segments.as_slice() {
        [] => "Inicio".to_string(),
        [role, "inicio"] => format!("Inicio · {}", capitalize(role)),
        ["admin", section, rest @ ..] => {
            let section = capitalize(&section.replace('-', " "));
            match rest {
                ["crear"] => format!("{section} · Crear"),
                ["editar", id] => format!("{section} · Editar #{id}"),
                _ => section,
            }
        }
        other => other.join(" / "),
    }
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}
