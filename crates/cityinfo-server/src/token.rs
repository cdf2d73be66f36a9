//! Bearer token issuing and verification (HS256).

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use cityinfo_core::{AppError, AuthenticatedUser};

use crate::config::AuthConfig;

/// Lifetime of every issued token.
pub const TOKEN_LIFETIME_SECS: i64 = 3600;

/// Claims carried by an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    pub given_name: String,
    pub family_name: String,
    pub city: String,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
}

/// Signs and verifies access tokens with a symmetric key.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    audience: String,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .finish()
    }
}

impl TokenService {
    /// Build the service from auth configuration; the secret must be valid base64.
    pub fn new(config: &AuthConfig) -> Result<Self, AppError> {
        let encoding_key = EncodingKey::from_base64_secret(&config.secret).map_err(|e| {
            AppError::ConfigError(format!("CITYINFO_AUTH_SECRET is not valid base64: {e}"))
        })?;
        let decoding_key = DecodingKey::from_base64_secret(&config.secret).map_err(|e| {
            AppError::ConfigError(format!("CITYINFO_AUTH_SECRET is not valid base64: {e}"))
        })?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_audience(&[config.audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "nbf", "iss", "aud", "sub"]);
        validation.validate_nbf = true;

        Ok(Self {
            encoding_key,
            decoding_key,
            validation,
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
        })
    }

    /// Issue a token for `user`, valid for one hour from now.
    pub fn issue(&self, user: &AuthenticatedUser) -> Result<String, AppError> {
        self.issue_at(user, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    pub fn issue_at(&self, user: &AuthenticatedUser, now: DateTime<Utc>) -> Result<String, AppError> {
        let expires = now + Duration::seconds(TOKEN_LIFETIME_SECS);
        let claims = Claims {
            sub: user.user_id.to_string(),
            given_name: user.first_name.clone(),
            family_name: user.last_name.clone(),
            city: user.city.clone(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: expires.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::TokenError(format!("Failed to sign token: {e}")))
    }

    /// Check signature, issuer, audience and validity window, returning the claims.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    AppError::Unauthorized("Token has expired".into())
                }
                jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                    AppError::Unauthorized("Invalid token signature".into())
                }
                _ => AppError::Unauthorized(format!("Token validation failed: {e}")),
            })
    }
}
