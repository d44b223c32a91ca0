//! Minimal HS256 JSON Web Tokens.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

const HEADER: &str = r#"{"alg":"HS256","typ":"JWT"}"#;
pub const DEFAULT_TOKEN_TTL_DAYS: i64 = 7;
pub const MAX_TOKEN_TTL_DAYS: i64 = 3650;

#[derive(Debug, Error, PartialEq)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,
    #[error("invalid token signature")]
    BadSignature,
    #[error("token expired")]
    Expired,
    #[error("invalid signing key")]
    Key,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// User id, as a string.
    pub sub: String,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
}

#[derive(Clone)]
pub struct TokenIssuer {
    secret: Vec<u8>,
    ttl: Duration,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer").field("ttl", &self.ttl).finish_non_exhaustive()
    }
}

impl TokenIssuer {
    /// `ttl_days` is clamped to `1..=MAX_TOKEN_TTL_DAYS`.
    pub fn new(secret: &str, ttl_days: i64) -> Self {
        Self {
            secret: secret.as_bytes().to_vec(),
            ttl: Duration::days(ttl_days.clamp(1, MAX_TOKEN_TTL_DAYS)),
        }
    }

    fn mac(&self) -> Result<HmacSha256, TokenError> {
        HmacSha256::new_from_slice(&self.secret).map_err(|_| TokenError::Key)
    }

    pub fn issue(&self, user_id: i64) -> Result<String, TokenError> {
        let claims = Claims {
            sub: user_id.to_string(),
            exp: (Utc::now() + self.ttl).timestamp(),
        };
        self.encode(&claims)
    }

    pub fn encode(&self, claims: &Claims) -> Result<String, TokenError> {
        let payload = serde_json::to_vec(claims).map_err(|_| TokenError::Malformed)?;
        let signing_input = format!("{}.{}", URL_SAFE_NO_PAD.encode(HEADER), URL_SAFE_NO_PAD.encode(payload));
        let mut mac = self.mac()?;
        mac.update(signing_input.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
        Ok(format!("{signing_input}.{signature}"))
    }

    /// Checks signature and expiry; returns the user id carried in `sub`.
    pub fn verify(&self, token: &str) -> Result<i64, TokenError> {
        self.verify_at(token, Utc::now().timestamp())
    }

    pub fn verify_at(&self, token: &str, now: i64) -> Result<i64, TokenError> {
        let mut parts = token.trim().split('.');
        let (header, payload, signature) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(h), Some(p), Some(s), None) => (h, p, s),
            _ => return Err(TokenError::Malformed),
        };

        let header: serde_json::Value = URL_SAFE_NO_PAD
            .decode(header)
            .ok()
            .and_then(|h| serde_json::from_slice(&h).ok())
            .ok_or(TokenError::Malformed)?;
        if header.get("alg").and_then(|a| a.as_str()) != Some("HS256") {
            return Err(TokenError::Malformed);
        }

        let signature = URL_SAFE_NO_PAD.decode(signature).map_err(|_| TokenError::Malformed)?;
        let mut mac = self.mac()?;
        mac.update(signing_input(token).as_bytes());
        mac.verify_slice(&signature).map_err(|_| TokenError::BadSignature)?;

        let claims: Claims = URL_SAFE_NO_PAD
            .decode(payload)
            .ok()
            .and_then(|p| serde_json::from_slice(&p).ok())
            .ok_or(TokenError::Malformed)?;
        if claims.exp <= now {
            return Err(TokenError::Expired);
        }
        claims.sub.parse::<i64>().map_err(|_| TokenError::Malformed)
    }
}

/// `header.payload` part of a compact token.
fn signing_input(token: &str) -> &str {
    let token = token.trim();
    match token.rfind('.') {
        Some(i) => &token[..i],
        None => token,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_tokens_verify() {
        let issuer = TokenIssuer::new("s3cret", DEFAULT_TOKEN_TTL_DAYS);
        let token = issuer.issue(7).unwrap();
        assert_eq!(token.split('.').count(), 3);
        assert_eq!(issuer.verify(&token), Ok(7));
    }

    #[test]
    fn rejects_wrong_key_and_tampering() {
        let issuer = TokenIssuer::new("s3cret", 1);
        let token = issuer.issue(1).unwrap();
        assert_eq!(TokenIssuer::new("other", 1).verify(&token), Err(TokenError::BadSignature));

        let forged = issuer.encode(&Claims { sub: "2".into(), exp: i64::MAX }).unwrap();
        let (head, _) = token.rsplit_once('.').unwrap();
        let (_, forged_sig) = forged.rsplit_once('.').unwrap();
        assert_eq!(issuer.verify(&format!("{head}.{forged_sig}")), Err(TokenError::BadSignature));
        assert_eq!(issuer.verify("abc"), Err(TokenError::Malformed));
    }

    #[test]
    fn rejects_expired() {
        let issuer = TokenIssuer::new("s3cret", 1);
        let token = issuer.encode(&Claims { sub: "3".into(), exp: 100 }).unwrap();
        assert_eq!(issuer.verify_at(&token, 99), Ok(3));
        assert_eq!(issuer.verify_at(&token, 100), Err(TokenError::Expired));
    }

    #[test]
    fn out_of_range_ttl_is_clamped() {
        let stale = TokenIssuer::new("s3cret", -5);
        let token = stale.issue(4).unwrap();
        assert_eq!(stale.verify(&token), Ok(4));

        let huge = TokenIssuer::new("s3cret", i64::MAX);
        let token = huge.issue(5).unwrap();
        let limit = (Utc::now() + Duration::days(MAX_TOKEN_TTL_DAYS)).timestamp();
        assert_eq!(huge.verify_at(&token, limit - 60), Ok(5));
        assert_eq!(huge.verify_at(&token, limit + 60), Err(TokenError::Expired));
    }
}
