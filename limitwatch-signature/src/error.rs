use std::{
    error::Error,
    fmt::{Display, Formatter, Result as FmtResult},
    io::Error as IOError,
};

#[derive(Debug)]
pub enum SignatureError {
    IO(IOError),
    EncryptedPrivateKey,
    InvalidCertificate(String),
    InvalidHeaderValue(String),
    InvalidPrivateKey(String),
    InvalidSignature(String),
    InvalidUri(String),
    MissingHeader(String),
    NoPrivateKey,
    SigningFailed(rsa::Error),
}

impl Display for SignatureError {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            Self::IO(e) => write!(f, "I/O error: {e}"),
            Self::EncryptedPrivateKey => write!(f, "Encrypted private keys are not supported; decrypt the key file first"),
            Self::InvalidCertificate(msg) => write!(f, "Invalid certificate: {msg}"),
            Self::InvalidHeaderValue(header) => write!(f, "Header value is not valid ASCII: {header}"),
            Self::InvalidPrivateKey(msg) => write!(f, "Invalid private key: {msg}"),
            Self::InvalidSignature(msg) => write!(f, "Invalid signature: {msg}"),
            Self::InvalidUri(uri) => write!(f, "Invalid request URI: {uri}"),
            Self::MissingHeader(header) => write!(f, "Missing header: {header}"),
            Self::NoPrivateKey => write!(f, "No RSA private key found in PEM data"),
            Self::SigningFailed(e) => write!(f, "Signing failed: {e}"),
        }
    }
}

impl Error for SignatureError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::IO(e) => Some(e),
            Self::SigningFailed(e) => Some(e),
            _ => None,
        }
    }
}

impl From<IOError> for SignatureError {
    fn from(e: IOError) -> Self {
        Self::IO(e)
    }
}

impl From<rsa::Error> for SignatureError {
    fn from(e: rsa::Error) -> Self {
        Self::SigningFailed(e)
    }
}
