//! Signing of requests to the cloud provider's REST APIs.
//!
//! Every call to the Limits API is authenticated with an HTTP signature produced by an RSA key. The key id identifies
//! the credential: `<tenancy>/<user>/<fingerprint>` for API keys, `ST$<token>` for federated security tokens.

mod error;
mod key;
pub mod signer;

pub use crate::{
    error::SignatureError,
    key::{fingerprint_sha256, load_certificates_pem, load_private_key_file, load_private_key_pem, public_key_base64},
    signer::{http_date, sign_request, verify_request, SigningKey},
};
