//! Error returned by the cloud provider's REST services.
//!
//! Every non-2xx response from the provider carries a JSON body of the form
//! `{"code": "...", "message": "..."}` and an `opc-request-id` header. [ServiceError] captures those along with the
//! HTTP status so callers can classify the failure without inspecting strings.

use {
    http::StatusCode,
    log::debug,
    serde::Deserialize,
    std::{
        error::Error,
        fmt::{Display, Formatter, Result as FmtResult},
    },
};

/// Returned when the caller lacks permission on a resource or the resource does not exist. The provider does not
/// distinguish between the two.
pub const NOT_AUTHORIZED_OR_NOT_FOUND: &str = "NotAuthorizedOrNotFound";

/// Returned on a 409 when the resource is in a state that does not allow the operation; retrying may succeed.
pub const INCORRECT_STATE: &str = "IncorrectState";

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ServiceError {
    pub status: StatusCode,
    pub code: String,
    pub message: String,
    pub opc_request_id: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    code: Option<String>,
    message: Option<String>,
}

impl ServiceError {
    pub fn new<C, M>(status: StatusCode, code: C, message: M) -> Self
    where
        C: Into<String>,
        M: Into<String>,
    {
        Self {
            status,
            code: code.into(),
            message: message.into(),
            opc_request_id: None,
        }
    }

    /// Build an error from a failed response. If the body is not the provider's JSON error shape, the code falls back
    /// to the canonical reason for the status and the message to the raw body.
    pub fn from_response(status: StatusCode, body: &[u8], opc_request_id: Option<String>) -> Self {
        let (code, message) = match serde_json::from_slice::<ErrorBody>(body) {
            Ok(parsed) => (parsed.code, parsed.message),
            Err(e) => {
                debug!("Error response body is not JSON: {}", e);
                (None, None)
            }
        };

        let code = code.unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown").replace(' ', ""));
        let message = message.unwrap_or_else(|| String::from_utf8_lossy(body).trim().to_string());

        Self {
            status,
            code,
            message,
            opc_request_id,
        }
    }

    #[inline]
    pub fn is_not_authorized_or_not_found(&self) -> bool {
        self.code == NOT_AUTHORIZED_OR_NOT_FOUND
    }

    /// Whether the request may succeed if sent again unchanged.
    pub fn is_retryable(&self) -> bool {
        match self.status {
            StatusCode::TOO_MANY_REQUESTS => true,
            StatusCode::CONFLICT => self.code == INCORRECT_STATE,
            StatusCode::NOT_IMPLEMENTED => false,
            s => s.is_server_error(),
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "{} {}: {}", self.status.as_u16(), self.code, self.message)?;
        if let Some(request_id) = &self.opc_request_id {
            write!(f, " (opc-request-id: {request_id})")?;
        }
        Ok(())
    }
}

impl Error for ServiceError {}

#[cfg(test)]
mod tests {
    use {
        super::{ServiceError, NOT_AUTHORIZED_OR_NOT_FOUND},
        http::StatusCode,
        pretty_assertions::assert_eq,
    };

    #[test_log::test]
    fn parse_json_body() {
        let body = br#"{"code": "NotAuthorizedOrNotFound", "message": "Authorization failed or requested resource not found."}"#;
        let e = ServiceError::from_response(StatusCode::NOT_FOUND, body, Some("ABCD/1234".to_string()));
        assert_eq!(e.code, NOT_AUTHORIZED_OR_NOT_FOUND);
        assert_eq!(e.message, "Authorization failed or requested resource not found.");
        assert!(e.is_not_authorized_or_not_found());
        assert!(!e.is_retryable());
        assert_eq!(
            e.to_string(),
            "404 NotAuthorizedOrNotFound: Authorization failed or requested resource not found. (opc-request-id: ABCD/1234)"
        );
    }

    #[test_log::test]
    fn non_json_body_falls_back_to_status() {
        let e = ServiceError::from_response(StatusCode::BAD_GATEWAY, b"<html>bad gateway</html>\n", None);
        assert_eq!(e.code, "BadGateway");
        assert_eq!(e.message, "<html>bad gateway</html>");
        assert!(e.is_retryable());
        assert_eq!(e.opc_request_id, None);
    }

    #[test_log::test]
    fn retryable_classification() {
        assert!(ServiceError::new(StatusCode::TOO_MANY_REQUESTS, "TooManyRequests", "slow down").is_retryable());
        assert!(ServiceError::new(StatusCode::CONFLICT, "IncorrectState", "busy").is_retryable());
        assert!(!ServiceError::new(StatusCode::CONFLICT, "Conflict", "exists").is_retryable());
        assert!(ServiceError::new(StatusCode::INTERNAL_SERVER_ERROR, "InternalServerError", "oops").is_retryable());
        assert!(ServiceError::new(StatusCode::SERVICE_UNAVAILABLE, "ServiceUnavailable", "later").is_retryable());
        assert!(!ServiceError::new(StatusCode::NOT_IMPLEMENTED, "NotImplemented", "no").is_retryable());
        assert!(!ServiceError::new(StatusCode::UNAUTHORIZED, "NotAuthenticated", "who").is_retryable());
    }

    #[test_log::test]
    fn partial_body_keeps_parsed_fields() {
        let e = ServiceError::from_response(StatusCode::BAD_REQUEST, br#"{"code": "InvalidParameter"}"#, Some("req-1".to_string()));
        assert_eq!(e.code, "InvalidParameter");
        assert_eq!(e.message, r#"{"code": "InvalidParameter"}"#);
        assert_eq!(e.opc_request_id.as_deref(), Some("req-1"));
    }
}
