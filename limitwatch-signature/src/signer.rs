//! Request signing for the provider's REST APIs.
//!
//! This implements the [draft-cavage HTTP signature](https://tools.ietf.org/html/draft-cavage-http-signatures-08)
//! profile used by the provider: RSA PKCS#1 v1.5 over SHA-256, with the `date`, `(request-target)` and `host`
//! headers always signed and `content-length`, `content-type` and `x-content-sha256` additionally signed for requests
//! that carry a body.

use {
    crate::SignatureError,
    base64::{engine::general_purpose::STANDARD as BASE64, Engine},
    chrono::{DateTime, Utc},
    http::{
        header::{HeaderName, HeaderValue, AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE, DATE, HOST},
        HeaderMap, Method, Uri,
    },
    log::trace,
    rsa::{Pkcs1v15Sign, RsaPrivateKey, RsaPublicKey},
    sha2::{Digest, Sha256},
    std::{
        collections::HashMap,
        fmt::{Debug, Formatter, Result as FmtResult},
        sync::Arc,
    },
};

/// Signature scheme version advertised in the Authorization header.
pub const SIGNATURE_VERSION: &str = "1";

/// The only algorithm the provider accepts.
pub const ALGORITHM: &str = "rsa-sha256";

/// Pseudo-header covering the method and path.
pub const REQUEST_TARGET: &str = "(request-target)";

/// Header carrying the base64 SHA-256 digest of the body.
pub const X_CONTENT_SHA256: &str = "x-content-sha256";

const AUTHORIZATION_PREFIX: &str = "Signature ";

const GENERIC_HEADERS: [&str; 3] = ["date", REQUEST_TARGET, "host"];
const BODY_HEADERS: [&str; 3] = ["content-length", "content-type", X_CONTENT_SHA256];

/// A key id paired with the RSA key that signs for it.
#[derive(Clone)]
pub struct SigningKey {
    key_id: String,
    private_key: Arc<RsaPrivateKey>,
}

impl Debug for SigningKey {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        f.debug_struct("SigningKey").field("key_id", &self.key_id).field("private_key", &"<redacted>").finish()
    }
}

impl SigningKey {
    pub fn new<S: Into<String>>(key_id: S, private_key: RsaPrivateKey) -> Self {
        Self::from_shared(key_id, Arc::new(private_key))
    }

    pub fn from_shared<S: Into<String>>(key_id: S, private_key: Arc<RsaPrivateKey>) -> Self {
        Self {
            key_id: key_id.into(),
            private_key,
        }
    }

    #[inline]
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    pub fn public_key(&self) -> RsaPublicKey {
        self.private_key.to_public_key()
    }

    /// Sign `data`, returning the base64-encoded signature.
    pub fn sign(&self, data: &[u8]) -> Result<String, SignatureError> {
        let digest = Sha256::digest(data);
        let signature = self.private_key.sign(Pkcs1v15Sign::new::<Sha256>(), &digest)?;
        Ok(BASE64.encode(signature))
    }
}

/// Whether requests with this method must sign their body headers.
#[inline]
pub fn requires_body(method: &Method) -> bool {
    *method == Method::POST || *method == Method::PUT || *method == Method::PATCH
}

/// HTTP date as used in the `date` header, e.g. `Sun, 05 Jan 2014 21:31:40 GMT`.
pub fn http_date(now: DateTime<Utc>) -> String {
    now.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Add the `date`, `host`, body headers (if applicable) and `authorization` headers to a request.
///
/// Existing `date`, `host` and `content-type` headers are kept and signed as they are.
pub fn sign_request(
    key: &SigningKey,
    method: &Method,
    uri: &Uri,
    headers: &mut HeaderMap,
    body: Option<&[u8]>,
    now: DateTime<Utc>,
) -> Result<(), SignatureError> {
    if !headers.contains_key(DATE) {
        headers.insert(DATE, header_value(&http_date(now))?);
    }

    if !headers.contains_key(HOST) {
        let authority = uri.authority().ok_or_else(|| SignatureError::InvalidUri(uri.to_string()))?;
        headers.insert(HOST, header_value(authority.as_str())?);
    }

    let mut signed_headers = GENERIC_HEADERS.to_vec();

    if requires_body(method) {
        let body = body.unwrap_or_default();
        headers.insert(CONTENT_LENGTH, HeaderValue::from(body.len()));
        if !headers.contains_key(CONTENT_TYPE) {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        headers.insert(HeaderName::from_static(X_CONTENT_SHA256), header_value(&BASE64.encode(Sha256::digest(body)))?);
        signed_headers.extend(BODY_HEADERS);
    }

    let to_sign = signing_string(method, uri, headers, &signed_headers)?;
    trace!("Signing string:\n{}", to_sign);
    let signature = key.sign(to_sign.as_bytes())?;

    let authorization = format!(
        r#"{AUTHORIZATION_PREFIX}version="{SIGNATURE_VERSION}",headers="{}",keyId="{}",algorithm="{ALGORITHM}",signature="{}""#,
        signed_headers.join(" "),
        key.key_id(),
        signature,
    );
    headers.insert(AUTHORIZATION, header_value(&authorization)?);
    Ok(())
}

/// Build the string that is signed: one `name: value` line per signed header, in order.
pub fn signing_string(
    method: &Method,
    uri: &Uri,
    headers: &HeaderMap,
    signed_headers: &[&str],
) -> Result<String, SignatureError> {
    let mut lines = Vec::with_capacity(signed_headers.len());

    for name in signed_headers {
        if *name == REQUEST_TARGET {
            let path_and_query = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
            lines.push(format!("{REQUEST_TARGET}: {} {}", method.as_str().to_lowercase(), path_and_query));
            continue;
        }

        let value = headers.get(*name).ok_or_else(|| SignatureError::MissingHeader(name.to_string()))?;
        let value = value.to_str().map_err(|_| SignatureError::InvalidHeaderValue(name.to_string()))?;
        lines.push(format!("{}: {}", name, value.trim()));
    }

    Ok(lines.join("\n"))
}

/// Parse the parameters of a `Signature ...` Authorization header.
pub fn parse_authorization(value: &str) -> Result<HashMap<String, String>, SignatureError> {
    let parameters = value
        .strip_prefix(AUTHORIZATION_PREFIX)
        .ok_or_else(|| SignatureError::InvalidSignature("not a Signature authorization header".to_string()))?;

    let mut result = HashMap::new();
    for parameter in parameters.split(',') {
        let Some((key, value)) = parameter.split_once('=') else {
            return Err(SignatureError::InvalidSignature(format!("malformed parameter: {parameter}")));
        };

        let value = value.trim().trim_matches('"');
        if result.insert(key.trim().to_string(), value.to_string()).is_some() {
            return Err(SignatureError::InvalidSignature(format!("duplicate parameter: {key}")));
        }
    }

    Ok(result)
}

/// Verify a signed request against `public_key`, recomputing the signing string from the headers it lists.
pub fn verify_request(
    public_key: &RsaPublicKey,
    method: &Method,
    uri: &Uri,
    headers: &HeaderMap,
) -> Result<HashMap<String, String>, SignatureError> {
    let authorization = headers.get(AUTHORIZATION).ok_or_else(|| SignatureError::MissingHeader("authorization".to_string()))?;
    let authorization =
        authorization.to_str().map_err(|_| SignatureError::InvalidHeaderValue("authorization".to_string()))?;
    let parameters = parse_authorization(authorization)?;

    let get = |name: &str| parameters.get(name).ok_or_else(|| SignatureError::InvalidSignature(format!("missing {name}")));
    if get("algorithm")? != ALGORITHM {
        return Err(SignatureError::InvalidSignature("unsupported algorithm".to_string()));
    }

    let signed_headers: Vec<&str> = get("headers")?.split(' ').collect();
    let to_sign = signing_string(method, uri, headers, &signed_headers)?;
    let signature = BASE64.decode(get("signature")?).map_err(|e| SignatureError::InvalidSignature(e.to_string()))?;

    public_key
        .verify(Pkcs1v15Sign::new::<Sha256>(), &Sha256::digest(to_sign.as_bytes()), &signature)
        .map_err(|e| SignatureError::InvalidSignature(e.to_string()))?;

    Ok(parameters)
}

fn header_value(value: &str) -> Result<HeaderValue, SignatureError> {
    HeaderValue::from_str(value).map_err(|_| SignatureError::InvalidHeaderValue(value.to_string()))
}
