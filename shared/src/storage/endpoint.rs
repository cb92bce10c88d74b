//! Storage endpoint normalization

use std::fmt;

use url::Url;

use super::{StorageError, StorageResult};

const DEFAULT_SCHEME: &str = "http";

/// A fully qualified object store endpoint (`scheme://host[:port]`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEndpoint {
    url: Url,
}

impl StorageEndpoint {
    /// Parse a configured endpoint. `http://` and `https://` endpoints are
    /// taken as-is; an endpoint without a scheme gets `http://`.
    pub fn parse(raw: &str) -> StorageResult<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(invalid(raw, "endpoint is empty"));
        }

        let url = match Url::parse(trimmed) {
            Ok(url) if url.has_host() && is_http(url.scheme()) => url,
            Ok(url) if trimmed.contains("://") => {
                return Err(invalid(raw, &format!("unsupported scheme {:?}", url.scheme())));
            }
            // "host:port" parses as a scheme-only URL or not at all
            _ => Url::parse(&format!("{}://{}", DEFAULT_SCHEME, trimmed))
                .map_err(|e| invalid(raw, &e.to_string()))?,
        };

        if url.host_str().map_or(true, str::is_empty) {
            return Err(invalid(raw, "endpoint has no host"));
        }

        Ok(Self { url })
    }

    pub fn scheme(&self) -> &str {
        self.url.scheme()
    }

    pub fn is_secure(&self) -> bool {
        self.url.scheme() == "https"
    }

    pub fn host(&self) -> &str {
        self.url.host_str().unwrap_or_default()
    }

    pub fn port(&self) -> Option<u16> {
        self.url.port_or_known_default()
    }

    /// `scheme://host[:port]` without path, as handed to the SDK.
    pub fn as_url(&self) -> String {
        match self.url.port() {
            Some(port) => format!("{}://{}:{}", self.scheme(), self.host(), port),
            None => format!("{}://{}", self.scheme(), self.host()),
        }
    }
}

impl fmt::Display for StorageEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_url())
    }
}

fn is_http(scheme: &str) -> bool {
    scheme == "http" || scheme == "https"
}

fn invalid(raw: &str, reason: &str) -> StorageError {
    StorageError::InvalidEndpoint {
        endpoint: raw.to_string(),
        reason: reason.to_string(),
    }
}
