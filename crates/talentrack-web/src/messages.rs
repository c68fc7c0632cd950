//! User-facing copy for session errors.

use talentrack_auth::LoginError;

/// Shown when the server refuses the credentials without a detail.
pub const INVALID_CREDENTIALS: &str = "Credenciales inválidas.";
/// Shown when the login response lacks credentials or a redirect.
pub const INCOMPLETE_RESPONSE: &str = "Respuesta incompleta del servidor.";
/// Shown for every other login failure.
pub const LOGIN_FAILED: &str = "Error al iniciar sesión.";

/// Message for the login form's error banner.
#[must_use]
pub fn login_error_message(err: &LoginError) -> String {
    match err {
        LoginError::Rejected { detail, .. } => detail
            .as_deref()
            .map(str::trim)
            .filter(|detail| !detail.is_empty())
            .unwrap_or(INVALID_CREDENTIALS)
            .to_string(),
        LoginError::IncompleteResponse | LoginError::MalformedBody => {
            INCOMPLETE_RESPONSE.to_string()
        }
        LoginError::Storage(_) | LoginError::Transport(_) => LOGIN_FAILED.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use talentrack_auth::TransportError;

    #[test]
    fn server_detail_wins_over_default_copy() {
        let err = LoginError::Rejected {
            status: 400,
            detail: Some("Usuario inactivo".into()),
        };
        assert_eq!(login_error_message(&err), "Usuario inactivo");

        let err = LoginError::Rejected {
            status: 401,
            detail: Some("  ".into()),
        };
        assert_eq!(login_error_message(&err), INVALID_CREDENTIALS);
    }

    #[test]
    fn other_failures_use_generic_copy() {
        assert_eq!(
            login_error_message(&LoginError::IncompleteResponse),
            INCOMPLETE_RESPONSE
        );
        assert_eq!(
            login_error_message(&LoginError::Transport(TransportError::Timeout)),
            LOGIN_FAILED
        );
    }
}
