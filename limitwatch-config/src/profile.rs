use {
    crate::{
        error::ConfigError,
        sections::{IniSections, DEFAULT_SECTION},
    },
    log::{debug, info},
    serde::Deserialize,
    std::{
        fmt::{Debug, Formatter, Result as FmtResult},
        fs::read_to_string,
        io::ErrorKind,
        path::{Path, PathBuf},
    },
};

pub const DEFAULT_PROFILE: &str = DEFAULT_SECTION;

/// Location of the provider config file relative to the home directory.
const DEFAULT_PROVIDER_CONFIG_PATH: &str = ".oci/config";

#[derive(Deserialize)]
struct ProfileSection {
    user: Option<String>,
    fingerprint: Option<String>,
    key_file: Option<String>,
    tenancy: Option<String>,
    region: Option<String>,
    pass_phrase: Option<String>,
}

/// One profile of the provider's config file (`~/.oci/config`), used for API key authentication.
#[derive(Clone, Eq, PartialEq)]
pub struct OciProfile {
    pub name: String,
    pub user: String,
    pub fingerprint: String,
    pub key_file: PathBuf,
    pub tenancy: String,
    pub region: String,
    pub pass_phrase: Option<String>,
}

impl Debug for OciProfile {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        let pass_phrase = match &self.pass_phrase {
            None => "None",
            Some(_) => "Some(<redacted>)",
        };

        f.debug_struct("OciProfile")
            .field("name", &self.name)
            .field("user", &self.user)
            .field("fingerprint", &self.fingerprint)
            .field("key_file", &self.key_file)
            .field("tenancy", &self.tenancy)
            .field("region", &self.region)
            .field("pass_phrase", &pass_phrase)
            .finish()
    }
}

impl OciProfile {
    /// `~/.oci/config`, or `None` if the home directory cannot be determined.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(DEFAULT_PROVIDER_CONFIG_PATH))
    }

    pub fn read_file<P: AsRef<Path>>(path: P, profile: &str) -> Result<Self, ConfigError> {
        let path = expand_home(path.as_ref());
        let text = match read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(ConfigError::FileNotFound(path)),
            Err(e) => return Err(ConfigError::IO(e)),
        };

        info!("Reading profile [{}] from {}", profile, path.display());
        Self::parse(&text, profile)
    }

    /// Read `profile` from the text of a provider config file. Keys missing from the profile are taken from
    /// `DEFAULT`.
    pub fn parse(text: &str, profile: &str) -> Result<Self, ConfigError> {
        let sections = IniSections::parse(text)?;
        if !sections.has_section(profile) {
            return Err(ConfigError::MissingProfile(profile.to_string()));
        }

        let section: ProfileSection = sections.section(profile)?;
        let required = |value: Option<String>, key: &str| match value.map(|v| v.trim().to_string()) {
            Some(value) if !value.is_empty() => Ok(value),
            _ => Err(ConfigError::MissingKey {
                section: profile.to_string(),
                key: key.to_string(),
            }),
        };

        let user = required(section.user, "user")?;
        let fingerprint = required(section.fingerprint, "fingerprint")?;
        let key_file = expand_home(Path::new(&required(section.key_file, "key_file")?));
        let tenancy = required(section.tenancy, "tenancy")?;
        let region = required(section.region, "region")?;
        let pass_phrase = section.pass_phrase.filter(|p| !p.is_empty());
        debug!("Profile [{}] uses key file {}", profile, key_file.display());

        Ok(Self {
            name: profile.to_string(),
            user,
            fingerprint,
            key_file,
            tenancy,
            region,
            pass_phrase,
        })
    }

    /// The key id used in request signatures: `<tenancy>/<user>/<fingerprint>`.
    pub fn key_id(&self) -> String {
        format!("{}/{}/{}", self.tenancy, self.user, self.fingerprint)
    }
}

/// Replace a leading `~` with the user's home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };

    match dirs::home_dir() {
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}
