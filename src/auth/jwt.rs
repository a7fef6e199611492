use std::time::Duration;

use base64ct::{Base64UrlUnpadded, Encoding};
use jsonwebtoken::{
    decode, decode_header, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header,
    Validation,
};
use thiserror::Error;
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;

use crate::{auth::claims::Claims, auth::repo_types::Role, config::JwtConfig};

/// Lifetime of every issued token.
pub const TOKEN_TTL: Duration = Duration::from_secs(3 * 60 * 60);

const ALGORITHM: Algorithm = Algorithm::HS256;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("failed to sign token")]
    Signing,
    #[error("invalid jwt signing method")]
    InvalidAlgorithm,
    #[error("invalid token signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("malformed token")]
    Malformed,
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            ErrorKind::InvalidAlgorithm => TokenError::InvalidAlgorithm,
            _ => TokenError::Malformed,
        }
    }
}

/// Holds JWT signing and verification keys with config data.
#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub issuer: String,
    pub audience: String,
    pub ttl: Duration,
}

impl JwtKeys {
    pub fn from_config(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            ttl: TOKEN_TTL,
        }
    }

    pub fn issue(&self, role: Role, user_id: i64) -> Result<String, TokenError> {
        let now = OffsetDateTime::now_utc();
        let exp = now + TimeDuration::seconds(self.ttl.as_secs() as i64);
        let claims = Claims {
            sub: role.as_str().to_string(),
            jti: user_id.to_string(),
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = encode(&Header::new(ALGORITHM), &claims, &self.encoding).map_err(|e| {
            debug!(error = %e, "jwt signing failed");
            TokenError::Signing
        })?;
        debug!(user_id, role = %role, "jwt signed");
        Ok(token)
    }

    /// Verifies signature, algorithm, expiry, issuer and audience.
    ///
    /// The header algorithm is checked before anything else, so a token
    /// signed with any other algorithm (or `none`) never reaches signature
    /// verification.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let header = match decode_header(token) {
            Ok(header) => header,
            // `none` and unknown algorithms do not parse as a jsonwebtoken header
            Err(_) => {
                return Err(match raw_header_alg(token) {
                    Some(alg) if alg != "HS256" => {
                        debug!(%alg, "jwt rejected: unsupported algorithm");
                        TokenError::InvalidAlgorithm
                    }
                    _ => TokenError::Malformed,
                });
            }
        };
        if header.alg != ALGORITHM {
            debug!(alg = ?header.alg, "jwt rejected: unexpected algorithm");
            return Err(TokenError::InvalidAlgorithm);
        }

        let mut validation = Validation::new(ALGORITHM);
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        validation.set_required_spec_claims(&["exp", "sub", "iss", "aud"]);

        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        debug!(jti = %data.claims.jti, sub = %data.claims.sub, "jwt verified");
        Ok(data.claims)
    }
}

/// `alg` field of the token's first segment, read without trusting it.
fn raw_header_alg(token: &str) -> Option<String> {
    let segment = token.split('.').next()?;
    let bytes = Base64UrlUnpadded::decode_vec(segment).ok()?;
    let header: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
    header.get("alg")?.as_str().map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_keys(secret: &str, issuer: &str, audience: &str) -> JwtKeys {
        JwtKeys::from_config(&JwtConfig {
            secret: secret.into(),
            issuer: issuer.into(),
            audience: audience.into(),
        })
    }

    fn sign_raw(keys: &JwtKeys, header: Header, claims: &Claims) -> String {
        encode(&header, claims, &keys.encoding).expect("sign raw")
    }

    fn claims_expiring_in(keys: &JwtKeys, seconds: i64) -> Claims {
        let now = OffsetDateTime::now_utc();
        Claims {
            sub: "ADMIN".into(),
            jti: "7".into(),
            iat: now.unix_timestamp() as usize,
            exp: (now + TimeDuration::seconds(seconds)).unix_timestamp() as usize,
            iss: keys.issuer.clone(),
            aud: keys.audience.clone(),
        }
    }

    #[test]
    fn issue_and_verify_roundtrip() {
        let keys = make_keys("dev-secret", "test-issuer", "test-aud");
        let token = keys.issue(Role::Admin, 42).expect("issue");
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.sub, "ADMIN");
        assert_eq!(claims.jti, "42");
        assert_eq!(claims.user_id(), Some(42));
        assert_eq!(claims.iss, "test-issuer");
        assert_eq!(claims.aud, "test-aud");
    }

    #[test]
    fn issued_token_lives_three_hours() {
        let keys = make_keys("dev-secret", "iss", "aud");
        let token = keys.issue(Role::Reader, 1).expect("issue");
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.exp - claims.iat, 3 * 60 * 60);
    }

    #[test]
    fn verify_rejects_other_hmac_algorithm() {
        let keys = make_keys("dev-secret", "iss", "aud");
        let claims = claims_expiring_in(&keys, 600);
        let token = sign_raw(&keys, Header::new(Algorithm::HS512), &claims);
        assert_eq!(keys.verify(&token), Err(TokenError::InvalidAlgorithm));
    }

    #[test]
    fn verify_rejects_unsigned_token() {
        let keys = make_keys("dev-secret", "iss", "aud");
        // {"alg":"none","typ":"JWT"} . {"sub":"ADMIN","jti":"1",...} . <empty>
        let token = "eyJhbGciOiJub25lIiwidHlwIjoiSldUIn0.\
                     eyJzdWIiOiJBRE1JTiIsImp0aSI6IjEiLCJpYXQiOjAsImV4cCI6OTk5OTk5OTk5OSwiaXNzIjoiaXNzIiwiYXVkIjoiYXVkIn0.";
        assert_eq!(keys.verify(token), Err(TokenError::InvalidAlgorithm));
    }

    #[test]
    fn verify_rejects_unknown_algorithm_name() {
        let keys = make_keys("dev-secret", "iss", "aud");
        let header = Base64UrlUnpadded::encode_string(br#"{"alg":"XY999","typ":"JWT"}"#);
        let token = format!("{header}.e30.c2ln");
        assert_eq!(keys.verify(&token), Err(TokenError::InvalidAlgorithm));
    }

    #[test]
    fn raw_header_alg_reads_first_segment() {
        let header = Base64UrlUnpadded::encode_string(br#"{"alg":"none"}"#);
        assert_eq!(raw_header_alg(&format!("{header}.x.y")).as_deref(), Some("none"));
        assert_eq!(raw_header_alg("not.a.jwt"), None);
        let no_alg = Base64UrlUnpadded::encode_string(br#"{"typ":"JWT"}"#);
        assert_eq!(raw_header_alg(&format!("{no_alg}.x.y")), None);
    }

    #[test]
    fn verify_rejects_expired_token() {
        let keys = make_keys("dev-secret", "iss", "aud");
        let claims = claims_expiring_in(&keys, -2 * 60 * 60);
        let token = sign_raw(&keys, Header::new(Algorithm::HS256), &claims);
        assert_eq!(keys.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn verify_rejects_wrong_secret() {
        let good = make_keys("secret-a", "iss", "aud");
        let bad = make_keys("secret-b", "iss", "aud");
        let token = good.issue(Role::Admin, 1).expect("issue");
        assert_eq!(bad.verify(&token), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn verify_rejects_wrong_issuer_or_audience() {
        let good = make_keys("same-secret", "good-iss", "good-aud");
        let bad = make_keys("same-secret", "bad-iss", "bad-aud");
        let token = good.issue(Role::Admin, 1).expect("issue");
        assert_eq!(bad.verify(&token), Err(TokenError::Malformed));
    }

    #[test]
    fn verify_rejects_garbage() {
        let keys = make_keys("dev-secret", "iss", "aud");
        assert_eq!(keys.verify("not.a.jwt"), Err(TokenError::Malformed));
        assert_eq!(keys.verify(""), Err(TokenError::Malformed));
    }
}
