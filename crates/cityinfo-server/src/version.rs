//! URL-segment API versioning (`/api/v1/...`, `/api/v0.1/...`).

use std::fmt;
use std::str::FromStr;

use axum::http::{HeaderMap, HeaderName, HeaderValue};

use cityinfo_core::AppError;

pub const SUPPORTED_VERSIONS_HEADER: HeaderName = HeaderName::from_static("api-supported-versions");
pub const DEPRECATED_VERSIONS_HEADER: HeaderName =
    HeaderName::from_static("api-deprecated-versions");

/// A `major.minor` API version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ApiVersion {
    pub major: u32,
    pub minor: u32,
}

impl ApiVersion {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for ApiVersion {
    type Err = String;

    /// Parses `v<major>` or `v<major>.<minor>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s
            .strip_prefix('v')
            .or_else(|| s.strip_prefix('V'))
            .ok_or_else(|| format!("'{s}' is not a version segment"))?;

        let (major, minor) = match raw.split_once('.') {
            Some((major, minor)) => (major, minor),
            None => (raw, "0"),
        };
        let parse = |part: &str| {
            part.parse::<u32>()
                .map_err(|_| format!("'{s}' is not a version segment"))
        };

        Ok(Self::new(parse(major)?, parse(minor)?))
    }
}

/// The versions one route group serves.
#[derive(Debug, Clone, Copy)]
pub struct VersionSet {
    pub supported: &'static [ApiVersion],
    pub deprecated: &'static [ApiVersion],
}

pub const CITIES: VersionSet = VersionSet {
    supported: &[ApiVersion::new(1, 0), ApiVersion::new(2, 0)],
    deprecated: &[],
};

pub const FILE_DOWNLOAD: VersionSet = VersionSet {
    supported: &[ApiVersion::new(1, 0)],
    deprecated: &[ApiVersion::new(0, 1)],
};

pub const FILE_UPLOAD: VersionSet = VersionSet {
    supported: &[ApiVersion::new(1, 0)],
    deprecated: &[],
};

impl VersionSet {
    /// Parse a path segment and check this set serves it.
    pub fn resolve(&self, segment: &str) -> Result<ApiVersion, AppError> {
        let version: ApiVersion = segment
            .parse()
            .map_err(AppError::UnsupportedApiVersion)?;

        if self.supported.contains(&version) || self.deprecated.contains(&version) {
            Ok(version)
        } else {
            Err(AppError::UnsupportedApiVersion(format!(
                "version {version} is not served here (supported: {})",
                join(self.supported)
            )))
        }
    }

    /// `api-supported-versions` / `api-deprecated-versions` response headers.
    pub fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Ok(value) = HeaderValue::from_str(&join(self.supported)) {
            headers.insert(SUPPORTED_VERSIONS_HEADER, value);
        }
        if !self.deprecated.is_empty()
            && let Ok(value) = HeaderValue::from_str(&join(self.deprecated))
        {
            headers.insert(DEPRECATED_VERSIONS_HEADER, value);
        }
        headers
    }
}

fn join(versions: &[ApiVersion]) -> String {
    versions
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
