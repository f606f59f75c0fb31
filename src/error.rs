use serde::Deserialize;

use crate::models::AppointmentId;
use crate::validation::ValidationErrors;

/// Error body some backends send: `{"error":{"code":"...","message":"..."}}`.
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorObject,
}

#[derive(Debug, Deserialize)]
pub struct ErrorObject {
    #[serde(default)]
    pub code: Option<String>,
    pub message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ClinicError {
    /// Transport, timeout or body decode failure.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server responded {status}: {message}")]
    Server { status: u16, message: String },
    #[error("appointment {0} not found")]
    NotFound(AppointmentId),
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
}

impl ClinicError {
    pub fn code(&self) -> &'static str {
        match self {
            ClinicError::Http(_) => "NETWORK_ERROR",
            ClinicError::Server { .. } => "SERVER_ERROR",
            ClinicError::NotFound(_) => "NOT_FOUND",
            ClinicError::Validation(_) => "VALIDATION_ERROR",
        }
    }

    /// True for failures of the backend call itself, as opposed to bad input
    /// or a missing record.
    pub fn is_network_or_server(&self) -> bool {
        matches!(self, ClinicError::Http(_) | ClinicError::Server { .. })
    }

    pub(crate) fn from_error_body(status: u16, body: &str) -> Self {
        let body = body.trim();
        let message = match serde_json::from_str::<ErrorResponse>(body) {
            Ok(parsed) => match parsed.error.code {
                Some(code) => format!("{} ({code})", parsed.error.message),
                None => parsed.error.message,
            },
            Err(_) if body.is_empty() => "empty response body".to_string(),
            Err(_) => body.to_string(),
        };
        ClinicError::Server { status, message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structured_error_body_is_unwrapped() {
        let err = ClinicError::from_error_body(
            400,
            r#"{"error":{"code":"VALIDATION_ERROR","message":"data is required"}}"#,
        );
        assert_eq!(err.code(), "SERVER_ERROR");
        assert_eq!(
            err.to_string(),
            "server responded 400: data is required (VALIDATION_ERROR)"
        );
        assert!(err.is_network_or_server());
    }

    #[test]
    fn plain_bodies_are_kept_verbatim() {
        let err = ClinicError::from_error_body(500, " Internal Server Error \n");
        assert_eq!(err.to_string(), "server responded 500: Internal Server Error");

        let err = ClinicError::from_error_body(502, "");
        assert_eq!(err.to_string(), "server responded 502: empty response body");
    }

    #[test]
    fn not_found_is_not_a_backend_failure() {
        let err = ClinicError::NotFound(AppointmentId(9));
        assert_eq!(err.code(), "NOT_FOUND");
        assert!(!err.is_network_or_server());
    }
}
