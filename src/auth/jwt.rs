use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use time::{Duration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use super::claims::Claims;
use crate::config::JwtConfig;

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,
    #[error("token signature is invalid")]
    InvalidSignature,
    #[error("token has expired")]
    Expired,
    #[error("token could not be signed: {0}")]
    Encoding(#[source] jsonwebtoken::errors::Error),
}

fn classify(err: jsonwebtoken::errors::Error) -> TokenError {
    match err.kind() {
        ErrorKind::ExpiredSignature => TokenError::Expired,
        // a token for another issuer/audience was not minted by this signer
        ErrorKind::InvalidSignature
        | ErrorKind::InvalidIssuer
        | ErrorKind::InvalidAudience
        | ErrorKind::InvalidAlgorithm => TokenError::InvalidSignature,
        _ => TokenError::Malformed,
    }
}

/// Signs and verifies HS256 tokens with one secret. Built once from config
/// and passed around by value; several instances can live side by side.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    audience: String,
    ttl: Duration,
}

impl JwtKeys {
    pub fn new(
        secret: &[u8],
        issuer: impl Into<String>,
        audience: impl Into<String>,
        ttl: Duration,
    ) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            issuer: issuer.into(),
            audience: audience.into(),
            ttl,
        }
    }

    pub fn from_config(cfg: &JwtConfig) -> Self {
        Self::new(
            cfg.secret.as_bytes(),
            cfg.issuer.clone(),
            cfg.audience.clone(),
            Duration::minutes(cfg.ttl_minutes),
        )
    }

    /// Mints a token for `identity_id` with the configured lifetime.
    pub fn sign(&self, identity_id: Uuid) -> Result<String, TokenError> {
        self.sign_with_ttl(identity_id, self.ttl)
    }

    pub fn sign_with_ttl(&self, identity_id: Uuid, ttl: Duration) -> Result<String, TokenError> {
        let now = OffsetDateTime::now_utc();
        let exp = now + ttl;
        let claims = Claims {
            sub: identity_id,
            iat: now.unix_timestamp().max(0) as usize,
            exp: exp.unix_timestamp().max(0) as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(TokenError::Encoding)?;
        debug!(identity_id = %identity_id, "jwt signed");
        Ok(token)
    }

    /// Checks signature, issuer, audience and expiry. The identity in the
    /// returned claims is not looked up in storage.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        validation.set_required_spec_claims(&["exp", "sub", "iss", "aud"]);

        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(classify)?;

        // expired once now >= exp
        if data.claims.exp as i64 <= OffsetDateTime::now_utc().unix_timestamp() {
            return Err(TokenError::Expired);
        }
        debug!(identity_id = %data.claims.sub, "jwt verified");
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_keys(secret: &str) -> JwtKeys {
        JwtKeys::new(secret.as_bytes(), "test-issuer", "test-aud", Duration::minutes(5))
    }

    #[test]
    fn sign_and_verify_returns_same_identity() {
        let keys = make_keys("dev-secret");
        let identity_id = Uuid::new_v4();
        let token = keys.sign(identity_id).expect("sign");
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.sub, identity_id);
        assert_eq!(claims.iss, "test-issuer");
        assert_eq!(claims.aud, "test-aud");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn expired_token_is_rejected() {
        let keys = make_keys("dev-secret");
        let token = keys
            .sign_with_ttl(Uuid::new_v4(), Duration::seconds(-30))
            .expect("sign");
        assert!(matches!(keys.verify(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn zero_ttl_token_is_already_expired() {
        let keys = make_keys("dev-secret");
        let token = keys.sign_with_ttl(Uuid::new_v4(), Duration::ZERO).expect("sign");
        assert!(matches!(keys.verify(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn token_from_another_secret_is_rejected() {
        let ours = make_keys("dev-secret");
        let theirs = make_keys("other-secret");
        let token = theirs.sign(Uuid::new_v4()).expect("sign");
        assert!(matches!(ours.verify(&token), Err(TokenError::InvalidSignature)));
    }

    #[test]
    fn swapped_signature_is_rejected() {
        let keys = make_keys("dev-secret");
        let a = keys.sign(Uuid::new_v4()).expect("sign a");
        let b = keys.sign(Uuid::new_v4()).expect("sign b");

        let (a_body, _) = a.rsplit_once('.').expect("three segments");
        let (_, b_sig) = b.rsplit_once('.').expect("three segments");
        let forged = format!("{a_body}.{b_sig}");

        assert!(matches!(keys.verify(&forged), Err(TokenError::InvalidSignature)));
    }

    #[test]
    fn garbage_is_malformed() {
        let keys = make_keys("dev-secret");
        assert!(matches!(keys.verify("not-a-token"), Err(TokenError::Malformed)));
        assert!(matches!(keys.verify(""), Err(TokenError::Malformed)));
    }

    #[test]
    fn wrong_issuer_is_rejected() {
        let good = make_keys("same-secret");
        let other = JwtKeys::new(b"same-secret", "elsewhere", "test-aud", Duration::minutes(5));
        let token = other.sign(Uuid::new_v4()).expect("sign");
        assert!(good.verify(&token).is_err());
    }

    #[test]
    fn rotated_signers_coexist() {
        let old = make_keys("secret-v1");
        let new = make_keys("secret-v2");
        let id = Uuid::new_v4();

        let old_token = old.sign(id).expect("sign old");
        let new_token = new.sign(id).expect("sign new");

        assert_eq!(old.verify(&old_token).expect("old verifies old").sub, id);
        assert_eq!(new.verify(&new_token).expect("new verifies new").sub, id);
        assert!(new.verify(&old_token).is_err());
    }
}
