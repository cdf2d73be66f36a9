use std::path::PathBuf;

use cityinfo_core::AppError;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_ISSUER: &str = "https://localhost:7169";
const DEFAULT_AUDIENCE: &str = "cityinfoapi";

/// Token signing settings.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Base64-encoded HMAC secret.
    pub secret: String,
    pub issuer: String,
    pub audience: String,
}

/// Server settings read at start-up.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub auth: AuthConfig,
    /// Directory holding the downloadable artifact.
    pub files_dir: PathBuf,
    /// Directory receiving uploaded files.
    pub upload_dir: PathBuf,
}

impl ServerConfig {
    /// Read configuration from environment variables.
    ///
    /// - `CITYINFO_AUTH_SECRET` (required, base64)
    /// - `CITYINFO_AUTH_ISSUER`, `CITYINFO_AUTH_AUDIENCE` (optional)
    /// - `CITYINFO_PORT` (optional, defaults to 3000)
    /// - `CITYINFO_FILES_DIR`, `CITYINFO_UPLOAD_DIR` (optional, default to the working directory)
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let secret = lookup("CITYINFO_AUTH_SECRET")
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| {
                AppError::ConfigError(
                    "CITYINFO_AUTH_SECRET not set. Required for signing tokens.".into(),
                )
            })?;

        let port = match lookup("CITYINFO_PORT") {
            None => DEFAULT_PORT,
            Some(raw) => raw.parse().map_err(|_| {
                AppError::ConfigError(format!("Invalid CITYINFO_PORT '{raw}': must be a port number"))
            })?,
        };

        Ok(Self {
            port,
            auth: AuthConfig {
                secret,
                issuer: lookup("CITYINFO_AUTH_ISSUER").unwrap_or_else(|| DEFAULT_ISSUER.to_string()),
                audience: lookup("CITYINFO_AUTH_AUDIENCE")
                    .unwrap_or_else(|| DEFAULT_AUDIENCE.to_string()),
            },
            files_dir: lookup("CITYINFO_FILES_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
            upload_dir: lookup("CITYINFO_UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
        })
    }
}
