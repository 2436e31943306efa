use {
    http::StatusCode,
    limitwatch_config::ConfigError,
    limitwatch_errors::ServiceError,
    limitwatch_signature::SignatureError,
    reqwest::Error as ReqwestError,
    rsa::Error as RsaError,
    serde_json::Error as JsonError,
    std::{
        error::Error,
        fmt::{Display, Formatter, Result as FmtResult},
        path::PathBuf,
    },
};

#[derive(Debug)]
pub enum AuthError {
    Config(ConfigError),
    Federation(ServiceError),
    Http(ReqwestError),
    InvalidEndpoint(String),
    InvalidResponse(String),
    InvalidToken(String),
    Json(JsonError),
    KeyFile(PathBuf, SignatureError),
    KeyGeneration(RsaError),
    Metadata {
        url: String,
        status: StatusCode,
    },
    Signature(SignatureError),
    TenancyNotFound,
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            Self::Config(e) => write!(f, "Configuration error: {e}"),
            Self::Federation(e) => write!(f, "Federation request failed: {e}"),
            Self::Http(e) => write!(f, "HTTP error: {e}"),
            Self::InvalidEndpoint(url) => write!(f, "Invalid endpoint: {url}"),
            Self::InvalidResponse(msg) => write!(f, "Invalid response: {msg}"),
            Self::InvalidToken(msg) => write!(f, "Invalid security token: {msg}"),
            Self::Json(e) => write!(f, "JSON error: {e}"),
            Self::KeyFile(path, e) => write!(f, "Unable to load private key {}: {e}", path.display()),
            Self::KeyGeneration(e) => write!(f, "Unable to generate session key: {e}"),
            Self::Metadata {
                url,
                status,
            } => write!(f, "Instance metadata request {url} returned {status}"),
            Self::Signature(e) => write!(f, "Signature error: {e}"),
            Self::TenancyNotFound => write!(f, "Instance certificate does not identify a tenancy"),
        }
    }
}

impl Error for AuthError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Federation(e) => Some(e),
            Self::Http(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::KeyFile(_, e) => Some(e),
            Self::KeyGeneration(e) => Some(e),
            Self::Signature(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for AuthError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<JsonError> for AuthError {
    fn from(e: JsonError) -> Self {
        Self::Json(e)
    }
}

impl From<ReqwestError> for AuthError {
    fn from(e: ReqwestError) -> Self {
        Self::Http(e)
    }
}

impl From<SignatureError> for AuthError {
    fn from(e: SignatureError) -> Self {
        Self::Signature(e)
    }
}
