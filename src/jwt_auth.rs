use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, Request};
use axum::middleware::Next;
use axum::response::Response;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Config;
use crate::models::error::AppError;

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenClaims {
    pub id: i32,
    pub email: String,
    pub iat: usize,
    pub exp: usize,
}

/// The authenticated caller, inserted into request extensions by [`auth`].
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i32,
}

pub struct JwtConfig {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expires_in: Duration,
}

impl JwtConfig {
    pub fn new(secret: &str, expires_in: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expires_in,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.jwt_secret, Duration::days(config.jwt_expires_days))
    }

    pub fn issue(&self, id: i32, email: &str) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = TokenClaims {
            id,
            email: email.to_string(),
            iat: now.timestamp() as usize,
            exp: (now + self.expires_in).timestamp() as usize,
        };
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
    }

    pub fn verify(&self, token: &str) -> Result<TokenClaims, jsonwebtoken::errors::Error> {
        decode::<TokenClaims>(token, &self.decoding_key, &Validation::default()).map(|data| data.claims)
    }
}

fn bearer_token<B>(req: &Request<B>) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|auth_header| auth_header.to_str().ok())
        .and_then(|auth_value| auth_value.strip_prefix("Bearer "))
}

pub async fn auth<B>(
    State(jwt): State<Arc<JwtConfig>>,
    mut req: Request<B>,
    next: Next<B>,
) -> Result<Response, AppError> {
    let token = bearer_token(&req).ok_or(AppError::Unauthorized)?;

    let claims = jwt.verify(token).map_err(|e| {
        debug!("Rejected token: {}", e);
        AppError::InvalidToken
    })?;

    req.extensions_mut().insert(AuthUser { id: claims.id });
    Ok(next.run(req).await)
}
