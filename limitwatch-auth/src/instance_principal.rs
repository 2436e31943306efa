use {
    crate::{tenancy_from_certificate, AuthError, AuthProvider, SecurityToken},
    base64::{engine::general_purpose::STANDARD as BASE64, Engine},
    chrono::{TimeDelta, Utc},
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderMap, HeaderValue, Method, Uri,
    },
    limitwatch_errors::ServiceError,
    limitwatch_signature::{
        fingerprint_sha256, load_certificates_pem, load_private_key_pem, public_key_base64, sign_request, SigningKey,
    },
    log::{debug, info, warn},
    reqwest::blocking::Client,
    rsa::{rand_core::OsRng, RsaPrivateKey},
    serde::{Deserialize, Serialize},
    std::{
        fmt::{Debug, Formatter, Result as FmtResult},
        sync::{Mutex, PoisonError},
        time::Duration,
    },
};

/// Base URL of the instance metadata service (version 2).
pub const METADATA_BASE_URL: &str = "http://169.254.169.254/opc/v2";

const METADATA_AUTHORIZATION: &str = "Bearer Oracle";
const REGION_INFO_PATH: &str = "instance/regionInfo";
const LEAF_CERTIFICATE_PATH: &str = "identity/cert.pem";
const LEAF_KEY_PATH: &str = "identity/key.pem";
const INTERMEDIATE_CERTIFICATE_PATH: &str = "identity/intermediate.pem";
const FEDERATION_PATH: &str = "/v1/x509";

const DEFAULT_SESSION_KEY_BITS: usize = 2048;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Tokens are renewed this many minutes before they expire.
const REFRESH_MARGIN_MINUTES: i64 = 5;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegionInfo {
    region_identifier: String,
    realm_domain_component: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FederationRequest {
    certificate: String,
    public_key: String,
    intermediate_certificates: Vec<String>,
    purpose: &'static str,
    fingerprint_algorithm: &'static str,
}

#[derive(Deserialize)]
struct FederationResponse {
    token: String,
}

struct Session {
    token: SecurityToken,
    key: SigningKey,
}

/// Configures an [InstancePrincipalAuthProvider]. The defaults talk to the real metadata service and derive the
/// federation endpoint from the instance's region.
#[derive(Clone, Debug)]
pub struct InstancePrincipalAuthProviderBuilder {
    metadata_base_url: String,
    federation_endpoint: Option<String>,
    session_key_bits: usize,
    timeout: Duration,
}

impl Default for InstancePrincipalAuthProviderBuilder {
    fn default() -> Self {
        Self {
            metadata_base_url: METADATA_BASE_URL.to_string(),
            federation_endpoint: None,
            session_key_bits: DEFAULT_SESSION_KEY_BITS,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl InstancePrincipalAuthProviderBuilder {
    pub fn metadata_base_url<S: Into<String>>(&mut self, url: S) -> &mut Self {
        self.metadata_base_url = url.into();
        self
    }

    /// Full URL of the x509 federation endpoint, overriding `https://auth.<region>.<realm domain>/v1/x509`.
    pub fn federation_endpoint<S: Into<String>>(&mut self, url: S) -> &mut Self {
        self.federation_endpoint = Some(url.into());
        self
    }

    pub fn session_key_bits(&mut self, bits: usize) -> &mut Self {
        self.session_key_bits = bits;
        self
    }

    pub fn timeout(&mut self, timeout: Duration) -> &mut Self {
        self.timeout = timeout;
        self
    }

    /// Query the metadata service for the instance's region and tenancy, then obtain the first security token.
    pub fn build(&self) -> Result<InstancePrincipalAuthProvider, AuthError> {
        let client = Client::builder().timeout(self.timeout).build()?;
        let metadata_base_url = self.metadata_base_url.trim_end_matches('/').to_string();

        let region_info: RegionInfo =
            serde_json::from_str(&get_metadata(&client, &metadata_base_url, REGION_INFO_PATH)?)?;
        debug!(
            "Instance region {} in realm {}",
            region_info.region_identifier, region_info.realm_domain_component
        );

        let federation_endpoint = match &self.federation_endpoint {
            Some(endpoint) => endpoint.clone(),
            None => format!(
                "https://auth.{}.{}{FEDERATION_PATH}",
                region_info.region_identifier, region_info.realm_domain_component
            ),
        };
        let federation_uri: Uri =
            federation_endpoint.parse().map_err(|_| AuthError::InvalidEndpoint(federation_endpoint.clone()))?;

        let leaf_pem = get_metadata(&client, &metadata_base_url, LEAF_CERTIFICATE_PATH)?;
        let tenancy_id = tenancy_from_certificate(&first_certificate(&leaf_pem)?).ok_or(AuthError::TenancyNotFound)?;
        info!("Instance principal belongs to tenancy {}", tenancy_id);

        let provider = InstancePrincipalAuthProvider {
            client,
            metadata_base_url,
            federation_uri,
            tenancy_id,
            region: region_info.region_identifier,
            session_key_bits: self.session_key_bits,
            session: Mutex::new(None),
        };

        provider.signing_key()?;
        Ok(provider)
    }
}

/// Credentials of the compute instance this process runs on.
///
/// The instance's certificate and key, served by the metadata service, are exchanged for a security token bound to a
/// freshly generated session key. Requests are then signed with that session key. The token is renewed when it comes
/// within five minutes of expiry or when [AuthProvider::refresh] is called.
pub struct InstancePrincipalAuthProvider {
    client: Client,
    metadata_base_url: String,
    federation_uri: Uri,
    tenancy_id: String,
    region: String,
    session_key_bits: usize,
    session: Mutex<Option<Session>>,
}

impl Debug for InstancePrincipalAuthProvider {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        f.debug_struct("InstancePrincipalAuthProvider")
            .field("metadata_base_url", &self.metadata_base_url)
            .field("federation_uri", &self.federation_uri)
            .field("tenancy_id", &self.tenancy_id)
            .field("region", &self.region)
            .finish_non_exhaustive()
    }
}

impl InstancePrincipalAuthProvider {
    #[inline]
    pub fn builder() -> InstancePrincipalAuthProviderBuilder {
        InstancePrincipalAuthProviderBuilder::default()
    }

    /// Build a provider against the real metadata service.
    pub fn new() -> Result<Self, AuthError> {
        Self::builder().build()
    }

    fn federate(&self) -> Result<Session, AuthError> {
        let leaf_pem = get_metadata(&self.client, &self.metadata_base_url, LEAF_CERTIFICATE_PATH)?;
        let leaf_key_pem = get_metadata(&self.client, &self.metadata_base_url, LEAF_KEY_PATH)?;
        let intermediate_pem = get_metadata(&self.client, &self.metadata_base_url, INTERMEDIATE_CERTIFICATE_PATH)?;

        let leaf_der = first_certificate(&leaf_pem)?;
        let tenancy_id = tenancy_from_certificate(&leaf_der).ok_or(AuthError::TenancyNotFound)?;
        if tenancy_id != self.tenancy_id {
            warn!("Instance certificate now names tenancy {}; expected {}", tenancy_id, self.tenancy_id);
        }

        let leaf_key = load_private_key_pem(leaf_key_pem.as_bytes())?;
        let intermediate_certificates =
            load_certificates_pem(intermediate_pem.as_bytes())?.iter().map(|der| BASE64.encode(der)).collect();

        let session_key = RsaPrivateKey::new(&mut OsRng, self.session_key_bits).map_err(AuthError::KeyGeneration)?;
        let request = FederationRequest {
            certificate: BASE64.encode(&leaf_der),
            public_key: public_key_base64(&session_key.to_public_key())?,
            intermediate_certificates,
            purpose: "DEFAULT",
            fingerprint_algorithm: "SHA256",
        };
        let body = serde_json::to_vec(&request)?;

        let federation_key =
            SigningKey::new(format!("{tenancy_id}/fed-x509-sha256/{}", fingerprint_sha256(&leaf_der)), leaf_key);
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        sign_request(&federation_key, &Method::POST, &self.federation_uri, &mut headers, Some(&body), Utc::now())?;

        debug!("Requesting security token from {}", self.federation_uri);
        let response = self.client.post(self.federation_uri.to_string()).headers(headers).body(body).send()?;
        let status = response.status();
        let request_id = response.headers().get("opc-request-id").and_then(|v| v.to_str().ok()).map(str::to_string);
        let bytes = response.bytes()?;

        if !status.is_success() {
            return Err(AuthError::Federation(ServiceError::from_response(status, &bytes, request_id)));
        }

        let response: FederationResponse = serde_json::from_slice(&bytes)?;
        let token = SecurityToken::parse(&response.token)?;
        info!("Obtained security token expiring at {}", token.expires_at);

        let key = SigningKey::new(token.key_id(), session_key);
        Ok(Session {
            token,
            key,
        })
    }
}

impl AuthProvider for InstancePrincipalAuthProvider {
    fn tenancy_id(&self) -> &str {
        &self.tenancy_id
    }

    fn region(&self) -> &str {
        &self.region
    }

    fn signing_key(&self) -> Result<SigningKey, AuthError> {
        let mut session = self.session.lock().unwrap_or_else(PoisonError::into_inner);

        let stale = match session.as_ref() {
            None => true,
            Some(s) => s.token.expires_at - TimeDelta::minutes(REFRESH_MARGIN_MINUTES) <= Utc::now(),
        };

        if stale {
            *session = Some(self.federate()?);
        }

        match session.as_ref() {
            Some(s) => Ok(s.key.clone()),
            None => Err(AuthError::InvalidToken("no security token available".to_string())),
        }
    }

    fn refresh(&self) -> Result<(), AuthError> {
        debug!("Discarding cached security token");
        *self.session.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

fn get_metadata(client: &Client, base_url: &str, path: &str) -> Result<String, AuthError> {
    let url = format!("{base_url}/{path}");
    debug!("GET {}", url);

    let response = client.get(&url).header(AUTHORIZATION, METADATA_AUTHORIZATION).send()?;
    let status = response.status();
    if !status.is_success() {
        return Err(AuthError::Metadata {
            url,
            status,
        });
    }

    Ok(response.text()?)
}

fn first_certificate(pem: &str) -> Result<Vec<u8>, AuthError> {
    load_certificates_pem(pem.as_bytes())?
        .into_iter()
        .next()
        .ok_or_else(|| AuthError::InvalidResponse("metadata service returned no certificate".to_string()))
}
