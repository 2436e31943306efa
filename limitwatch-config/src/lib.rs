mod error;
mod limits;
mod profile;
mod sections;

pub use self::{
    error::ConfigError,
    limits::{LimitsConfig, DEFAULT_LIMITS_CONFIG_FILENAME},
    profile::{expand_home, OciProfile, DEFAULT_PROFILE},
};
