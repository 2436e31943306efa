use std::{
    error::Error,
    fmt::{Display, Formatter, Result as FmtResult},
    io::Error as IOError,
    path::PathBuf,
};

#[derive(Debug)]
pub enum ConfigError {
    IO(IOError),
    FileNotFound(PathBuf),
    Parse(config::ConfigError),
    MissingKey {
        section: String,
        key: String,
    },
    MissingProfile(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match &self {
            Self::IO(e) => write!(f, "I/O error: {}", e),
            Self::FileNotFound(path) => write!(f, "Configuration file not found: {}", path.display()),
            Self::Parse(e) => write!(f, "Unable to parse configuration: {}", e),
            Self::MissingKey {
                section,
                key,
            } => write!(f, "Missing required key '{}' in section [{}]", key, section),
            Self::MissingProfile(profile) => write!(f, "Profile [{}] not found", profile),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::IO(e) => Some(e),
            Self::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<IOError> for ConfigError {
    fn from(e: IOError) -> Self {
        ConfigError::IO(e)
    }
}

impl From<config::ConfigError> for ConfigError {
    fn from(e: config::ConfigError) -> Self {
        ConfigError::Parse(e)
    }
}
