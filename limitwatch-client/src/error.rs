use {
    limitwatch_auth::AuthError,
    limitwatch_errors::ServiceError,
    reqwest::Error as ReqwestError,
    std::{
        error::Error,
        fmt::{Display, Formatter, Result as FmtResult},
    },
};

#[derive(Debug)]
pub enum ClientError {
    Auth(AuthError),
    Builder(String),
    InvalidResponse(String),
    InvalidUrl(String),
    Service(ServiceError),
    Transport(ReqwestError),
}

impl ClientError {
    /// Whether the call may succeed if attempted again: throttling, most server-side failures, and transport errors
    /// that never reached the service.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Service(e) => e.is_retryable(),
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }

    pub fn is_not_authorized_or_not_found(&self) -> bool {
        self.service_error().is_some_and(ServiceError::is_not_authorized_or_not_found)
    }

    pub fn service_error(&self) -> Option<&ServiceError> {
        match self {
            Self::Service(e) => Some(e),
            _ => None,
        }
    }
}

impl Display for ClientError {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            Self::Auth(e) => write!(f, "Authentication failed: {e}"),
            Self::Builder(msg) => write!(f, "Invalid client configuration: {msg}"),
            Self::InvalidResponse(msg) => write!(f, "Invalid response: {msg}"),
            Self::InvalidUrl(url) => write!(f, "Invalid URL: {url}"),
            Self::Service(e) => Display::fmt(e, f),
            Self::Transport(e) => write!(f, "Transport error: {e}"),
        }
    }
}

impl Error for ClientError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Auth(e) => Some(e),
            Self::Service(e) => Some(e),
            Self::Transport(e) => Some(e),
            _ => None,
        }
    }
}

impl From<AuthError> for ClientError {
    fn from(e: AuthError) -> Self {
        Self::Auth(e)
    }
}

impl From<ReqwestError> for ClientError {
    fn from(e: ReqwestError) -> Self {
        Self::Transport(e)
    }
}

impl From<ServiceError> for ClientError {
    fn from(e: ServiceError) -> Self {
        Self::Service(e)
    }
}
