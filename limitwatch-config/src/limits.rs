use {
    crate::{
        error::ConfigError,
        sections::{IniSections, DEFAULT_SECTION},
    },
    log::{debug, warn},
    serde::Deserialize,
    std::{fs::read_to_string, io::ErrorKind, path::Path},
};

/// File name looked up next to the executable (and then in the working directory) when no path is given.
pub const DEFAULT_LIMITS_CONFIG_FILENAME: &str = "limits.conf";

const TENANCY_ID: &str = "tenancy_id";
const SERVICES: &str = "services";
const REGIONS: &str = "regions";

#[derive(Deserialize)]
struct LimitsSection {
    tenancy_id: Option<String>,
    services: Option<String>,
    regions: Option<String>,
}

/// The contents of `limits.conf`: which tenancy to inspect, which services to report on and in which regions.
///
/// ```text
/// [DEFAULT]
/// tenancy_id = ocid1.tenancy.oc1..xxxx
/// services = compute vcn object-storage
/// regions = us-ashburn-1 us-phoenix-1
/// ```
///
/// `tenancy_id` must be present but may be empty, in which case the tenancy comes from the credentials. Service and
/// region lists are whitespace separated and may continue on indented lines; duplicates are dropped, first
/// occurrence wins.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct LimitsConfig {
    pub tenancy_id: String,
    pub services: Vec<String>,
    pub regions: Vec<String>,
}

impl LimitsConfig {
    pub fn read_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = match read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(ConfigError::FileNotFound(path.to_path_buf())),
            Err(e) => return Err(ConfigError::IO(e)),
        };

        debug!("Read {} bytes from {}", text.len(), path.display());
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let section: LimitsSection = IniSections::parse(text)?.section(DEFAULT_SECTION)?;

        let tenancy_id = required(section.tenancy_id, TENANCY_ID)?.trim().to_string();
        let services = split_unique(&required(section.services, SERVICES)?);
        let regions = split_unique(&required(section.regions, REGIONS)?);

        if services.is_empty() {
            warn!("No services configured; no limits will be collected");
        }

        if regions.is_empty() {
            warn!("No regions configured; nothing will be reported");
        }

        Ok(Self {
            tenancy_id,
            services,
            regions,
        })
    }

    /// The tenancy to query: the configured one if set, otherwise `fallback` (typically from the credentials).
    pub fn tenancy_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        if self.tenancy_id.is_empty() {
            fallback
        } else {
            &self.tenancy_id
        }
    }
}

fn required(value: Option<String>, key: &str) -> Result<String, ConfigError> {
    value.ok_or_else(|| ConfigError::MissingKey {
        section: DEFAULT_SECTION.to_string(),
        key: key.to_string(),
    })
}

fn split_unique(value: &str) -> Vec<String> {
    let mut result: Vec<String> = Vec::new();
    for item in value.split_whitespace() {
        if !result.iter().any(|existing| existing == item) {
            result.push(item.to_string());
        }
    }
    result
}
