use {
    crate::SignatureError,
    base64::{engine::general_purpose::STANDARD as BASE64, Engine},
    log::debug,
    rsa::{
        pkcs1::DecodeRsaPrivateKey,
        pkcs8::{DecodePrivateKey, EncodePublicKey},
        RsaPrivateKey, RsaPublicKey,
    },
    rustls_pemfile::Item,
    sha2::{Digest, Sha256},
    std::{fs::read, path::Path},
};

/// Load the first RSA private key (PKCS#1 `RSA PRIVATE KEY` or PKCS#8 `PRIVATE KEY`) from PEM data.
///
/// Encrypted keys are rejected with [SignatureError::EncryptedPrivateKey].
pub fn load_private_key_pem(pem: &[u8]) -> Result<RsaPrivateKey, SignatureError> {
    if String::from_utf8_lossy(pem).contains("ENCRYPTED") {
        return Err(SignatureError::EncryptedPrivateKey);
    }

    let mut reader = pem;
    loop {
        match rustls_pemfile::read_one(&mut reader)? {
            None => return Err(SignatureError::NoPrivateKey),
            Some(Item::Pkcs1Key(key)) => {
                debug!("Found PKCS#1 RSA private key");
                return RsaPrivateKey::from_pkcs1_der(key.secret_pkcs1_der())
                    .map_err(|e| SignatureError::InvalidPrivateKey(e.to_string()));
            }
            Some(Item::Pkcs8Key(key)) => {
                debug!("Found PKCS#8 private key");
                return RsaPrivateKey::from_pkcs8_der(key.secret_pkcs8_der())
                    .map_err(|e| SignatureError::InvalidPrivateKey(e.to_string()));
            }
            Some(_) => continue,
        }
    }
}

pub fn load_private_key_file<P: AsRef<Path>>(path: P) -> Result<RsaPrivateKey, SignatureError> {
    let pem = read(path)?;
    load_private_key_pem(&pem)
}

/// Decode every `CERTIFICATE` section of the PEM data to DER.
pub fn load_certificates_pem(pem: &[u8]) -> Result<Vec<Vec<u8>>, SignatureError> {
    let mut reader = pem;
    let mut certs = Vec::new();
    for cert in rustls_pemfile::certs(&mut reader) {
        let cert = cert.map_err(|e| SignatureError::InvalidCertificate(e.to_string()))?;
        certs.push(cert.as_ref().to_vec());
    }

    if certs.is_empty() {
        return Err(SignatureError::InvalidCertificate("no certificate found in PEM data".to_string()));
    }

    Ok(certs)
}

/// Colon-separated, upper-case SHA-256 fingerprint of DER data, e.g. `35:94:1D:…`.
pub fn fingerprint_sha256(der: &[u8]) -> String {
    Sha256::digest(der).iter().map(|b| hex::encode_upper([*b])).collect::<Vec<_>>().join(":")
}

/// The public key as base64-encoded DER SubjectPublicKeyInfo, i.e. a PEM body without armor or line breaks.
pub fn public_key_base64(public_key: &RsaPublicKey) -> Result<String, SignatureError> {
    let der = public_key.to_public_key_der().map_err(|e| SignatureError::InvalidPrivateKey(e.to_string()))?;
    Ok(BASE64.encode(der.as_bytes()))
}
