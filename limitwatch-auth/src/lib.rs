//! Credential resolution for calls to the Limits API.
//!
//! Two modes are supported:
//! * [ConfigFileAuthProvider]: an API key described by a profile of the provider config file.
//! * [InstancePrincipalAuthProvider]: the compute instance's own identity, federated into a short-lived security
//!   token via the instance metadata service.
//!
//! Both expose the tenancy they belong to and sign outgoing requests through [AuthProvider].

mod certificate;
mod config_file;
mod error;
mod instance_principal;
mod token;

pub use crate::{
    certificate::tenancy_from_certificate,
    config_file::ConfigFileAuthProvider,
    error::AuthError,
    instance_principal::{InstancePrincipalAuthProvider, InstancePrincipalAuthProviderBuilder, METADATA_BASE_URL},
    token::SecurityToken,
};

use {
    chrono::Utc,
    http::{HeaderMap, Method, Uri},
    limitwatch_signature::{sign_request, SigningKey},
};

pub trait AuthProvider: Send + Sync {
    /// The tenancy the credentials belong to.
    fn tenancy_id(&self) -> &str;

    /// The region the credentials were issued in; used for calls that are not tied to a configured region.
    fn region(&self) -> &str;

    /// The key to sign the next request with. Providers with expiring credentials renew them here.
    fn signing_key(&self) -> Result<SigningKey, AuthError>;

    /// Discard any cached credentials so the next [AuthProvider::signing_key] call obtains fresh ones. Called after the
    /// service rejects a request as unauthenticated.
    fn refresh(&self) -> Result<(), AuthError> {
        Ok(())
    }

    fn sign(&self, method: &Method, uri: &Uri, headers: &mut HeaderMap, body: Option<&[u8]>) -> Result<(), AuthError> {
        let key = self.signing_key()?;
        sign_request(&key, method, uri, headers, body, Utc::now())?;
        Ok(())
    }
}
