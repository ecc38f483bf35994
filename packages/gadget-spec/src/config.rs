//! Configuration constants and input validation.

use std::time::Duration;

use url::Url;

use crate::error::{GadgetError, Result};

/// View name used when a content block does not declare one.
pub const DEFAULT_VIEW: &str = "default";

/// Quirks mode of a view when no content block declares it.
pub const DEFAULT_QUIRKS: bool = true;

/// Signing flags (`sign_owner`, `sign_viewer`) when not declared.
pub const DEFAULT_SIGN: bool = true;

/// HTTP timeout in seconds for fetching gadget documents.
pub const HTTP_TIMEOUT_SECS: u64 = 30;

/// Default maximum size of a fetched gadget document (1 MiB).
///
/// Gadget descriptors are small; anything larger is almost certainly not
/// a gadget and is refused before parsing.
pub const DEFAULT_MAX_DOCUMENT_SIZE: u64 = 1024 * 1024;

/// How long a parsed document stays fresh in the spec cache.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// How long an expired spec may still be served when refreshing it fails.
pub const DEFAULT_CACHE_STALE_SECS: u64 = 24 * 60 * 60;

/// Maximum number of documents held by the spec cache.
pub const DEFAULT_CACHE_MAX_ENTRIES: usize = 1024;

/// Maximum element nesting accepted by the reader.
pub const MAX_ELEMENT_DEPTH: usize = 256;

/// User agent string sent when fetching documents.
pub const USER_AGENT: &str = concat!("gadget-spec/", env!("CARGO_PKG_VERSION"));

/// Settings for the HTTP document fetcher.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Request timeout.
    pub timeout: Duration,
    /// Refuse documents larger than this many bytes.
    pub max_document_size: u64,
    /// User agent header value.
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(HTTP_TIMEOUT_SECS),
            max_document_size: DEFAULT_MAX_DOCUMENT_SIZE,
            user_agent: USER_AGENT.to_string(),
        }
    }
}

/// Settings for the spec factory cache.
#[derive(Debug, Clone)]
pub struct FactoryConfig {
    /// Time a cached spec is served without refetching.
    pub ttl: Duration,
    /// Age after which a cached spec is dropped, even as a fallback.
    pub stale_ttl: Duration,
    /// Upper bound on cached documents; the oldest are evicted first.
    pub max_entries: usize,
}

impl Default for FactoryConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            stale_ttl: Duration::from_secs(DEFAULT_CACHE_STALE_SECS),
            max_entries: DEFAULT_CACHE_MAX_ENTRIES,
        }
    }
}

/// Validate a gadget URL supplied by a caller.
///
/// Only absolute `http`, `https` and `file` URLs identify a gadget
/// document.
///
/// # Examples
/// ```
/// use gadget_spec::config::validate_spec_url;
///
/// assert!(validate_spec_url("http://example.org/gadget.xml").is_ok());
/// assert!(validate_spec_url("gadget.xml").is_err());
/// assert!(validate_spec_url("ftp://example.org/gadget.xml").is_err());
/// ```
pub fn validate_spec_url(url: &str) -> Result<Url> {
    let parsed = Url::parse(url.trim()).map_err(|e| GadgetError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    match parsed.scheme() {
        "http" | "https" | "file" => Ok(parsed),
        other => Err(GadgetError::InvalidUrl {
            url: url.to_string(),
            reason: format!("unsupported scheme '{other}'"),
        }),
    }
}
