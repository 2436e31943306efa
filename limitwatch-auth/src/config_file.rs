use {
    crate::{AuthError, AuthProvider},
    limitwatch_config::OciProfile,
    limitwatch_signature::{load_private_key_file, SigningKey},
    log::{info, warn},
    std::path::Path,
};

/// API key credentials read from a provider config file profile.
#[derive(Debug)]
pub struct ConfigFileAuthProvider {
    profile: OciProfile,
    key: SigningKey,
}

impl ConfigFileAuthProvider {
    pub fn from_file<P: AsRef<Path>>(path: P, profile: &str) -> Result<Self, AuthError> {
        Self::from_profile(OciProfile::read_file(path, profile)?)
    }

    pub fn from_profile(profile: OciProfile) -> Result<Self, AuthError> {
        if profile.pass_phrase.is_some() {
            warn!("Profile [{}] specifies a pass_phrase; encrypted keys are not supported", profile.name);
        }

        let private_key =
            load_private_key_file(&profile.key_file).map_err(|e| AuthError::KeyFile(profile.key_file.clone(), e))?;
        info!("Loaded API key for profile [{}] from {}", profile.name, profile.key_file.display());

        let key = SigningKey::new(profile.key_id(), private_key);
        Ok(Self {
            profile,
            key,
        })
    }

    #[inline]
    pub fn profile(&self) -> &OciProfile {
        &self.profile
    }
}

impl AuthProvider for ConfigFileAuthProvider {
    fn tenancy_id(&self) -> &str {
        &self.profile.tenancy
    }

    fn region(&self) -> &str {
        &self.profile.region
    }

    fn signing_key(&self) -> Result<SigningKey, AuthError> {
        Ok(self.key.clone())
    }
}
