use {
    crate::AuthError,
    chrono::{DateTime, Utc},
    jsonwebtoken::{decode, Algorithm, DecodingKey, Validation},
    serde::Deserialize,
};

#[derive(Deserialize)]
struct Claims {
    exp: i64,
}

/// A federated security token (a JWT) and its expiry. The signature is not checked; the token is only ever handed
/// back to the provider.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SecurityToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl SecurityToken {
    pub fn parse(token: &str) -> Result<Self, AuthError> {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;

        let claims = decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?
            .claims;
        let expires_at = DateTime::from_timestamp(claims.exp, 0)
            .ok_or_else(|| AuthError::InvalidToken(format!("exp out of range: {}", claims.exp)))?;

        Ok(Self {
            token: token.to_string(),
            expires_at,
        })
    }

    /// The key id under which requests signed with this token's session key are sent.
    pub fn key_id(&self) -> String {
        format!("ST${}", self.token)
    }
}
