use std::{convert::Infallible, time::Duration};

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{config::JwtConfig, error::AppError, state::AppState};

/// JWT payload issued at login.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid, // user ID
    pub username: String,
    pub exp: usize,
    pub iat: usize,
    pub iss: String,
    pub aud: String,
}

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
            ttl: Duration::from_secs((cfg.ttl_minutes.max(0) as u64) * 60),
        }
    }

    pub fn sign(&self, user_id: Uuid, username: &str) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now + TimeDuration::seconds(self.ttl.as_secs() as i64);
        let claims = Claims {
            sub: user_id,
            username: username.to_string(),
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id = %user_id, "jwt signed");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> anyhow::Result<Claims> {
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        debug!(user_id = %data.claims.sub, "jwt verified");
        Ok(data.claims)
    }
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        Self::from_config(&state.config.jwt)
    }
}

/// Identity of the caller, taken from a verified bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: Uuid,
    pub username: String,
}

/// Outcome of reading the `Authorization` header.
///
/// Extraction never fails: handlers decide what a missing or rejected token
/// means for their operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Authentication {
    Anonymous,
    Rejected,
    Verified(Principal),
}

impl Authentication {
    pub fn require(self) -> Result<Principal, AppError> {
        match self {
            Authentication::Verified(p) => Ok(p),
            Authentication::Anonymous => Err(AppError::Unauthenticated),
            Authentication::Rejected => Err(AppError::TokenInvalid),
        }
    }

    pub fn from_header(header: Option<&str>, keys: &JwtKeys) -> Self {
        let Some(header) = header else {
            return Authentication::Anonymous;
        };
        let Some(token) = header
            .strip_prefix("Bearer ")
            .or_else(|| header.strip_prefix("bearer "))
        else {
            warn!("invalid auth scheme");
            return Authentication::Rejected;
        };
        match keys.verify(token.trim()) {
            Ok(claims) => Authentication::Verified(Principal {
                user_id: claims.sub,
                username: claims.username,
            }),
            Err(e) => {
                warn!(error = %e, "invalid or expired token");
                Authentication::Rejected
            }
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Authentication
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .map(|v| v.to_str().unwrap_or_default());
        Ok(Authentication::from_header(header, &keys))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_keys(secret: &str, issuer: &str, audience: &str) -> JwtKeys {
        JwtKeys::from_config(&JwtConfig {
            secret: secret.into(),
            issuer: issuer.into(),
            audience: audience.into(),
            ttl_minutes: 5,
        })
    }

    #[test]
    fn sign_and_verify_token() {
        let keys = make_keys("dev-secret", "test-issuer", "test-aud");
        let user_id = Uuid::new_v4();
        let token = keys.sign(user_id, "root").expect("sign");
        let claims = keys.verify(&token).expect("verify token");
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.username, "root");
        assert_eq!(claims.iss, "test-issuer");
        assert_eq!(claims.aud, "test-aud");
    }

    #[test]
    fn verify_rejects_wrong_issuer_or_audience() {
        let good_keys = make_keys("same-secret", "good-iss", "good-aud");
        let bad_keys = make_keys("same-secret", "bad-iss", "bad-aud");
        let token = good_keys.sign(Uuid::new_v4(), "root").expect("sign");
        assert!(bad_keys.verify(&token).is_err());
    }

    #[test]
    fn verify_rejects_foreign_signature() {
        let keys = make_keys("secret-a", "iss", "aud");
        let other = make_keys("secret-b", "iss", "aud");
        let token = other.sign(Uuid::new_v4(), "root").expect("sign");
        assert!(keys.verify(&token).is_err());
    }

    #[test]
    fn missing_header_is_anonymous() {
        let keys = make_keys("s", "iss", "aud");
        assert_eq!(Authentication::from_header(None, &keys), Authentication::Anonymous);
    }

    #[test]
    fn bad_scheme_or_garbage_token_is_rejected() {
        let keys = make_keys("s", "iss", "aud");
        assert_eq!(
            Authentication::from_header(Some("Basic abc"), &keys),
            Authentication::Rejected
        );
        assert_eq!(
            Authentication::from_header(Some("Bearer not.a.jwt"), &keys),
            Authentication::Rejected
        );
    }

    #[test]
    fn valid_bearer_token_yields_principal() {
        let keys = make_keys("s", "iss", "aud");
        let user_id = Uuid::new_v4();
        let token = keys.sign(user_id, "hellas").expect("sign");
        let auth = Authentication::from_header(Some(format!("Bearer {token}").as_str()), &keys);
        let principal = auth.require().expect("verified");
        assert_eq!(principal.user_id, user_id);
        assert_eq!(principal.username, "hellas");
    }

    #[test]
    fn require_maps_to_distinct_errors() {
        assert!(matches!(
            Authentication::Anonymous.require(),
            Err(AppError::Unauthenticated)
        ));
        assert!(matches!(
            Authentication::Rejected.require(),
            Err(AppError::TokenInvalid)
        ));
    }
}
