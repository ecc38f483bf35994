//! Document retrieval: the collaborator that turns a gadget URL into raw
//! bytes for the parser.

use std::fs;
use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;
use url::Url;

use crate::config::FetchConfig;
use crate::error::{GadgetError, Result};

/// Maximum number of attempts for transient failures.
const MAX_RETRIES: u32 = 3;

/// Base delay for exponential backoff (milliseconds).
const RETRY_BASE_DELAY_MS: u64 = 500;

/// Raw bytes of a gadget document and the location they came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedDocument {
    pub bytes: Vec<u8>,
    /// Final location of the document; base for relative hrefs.
    pub source: Url,
}

/// Capability to retrieve gadget documents.
pub trait DocumentFetcher: Send + Sync {
    /// Retrieve the document at `url`.
    ///
    /// # Errors
    /// Returns a fetch error (`Http`, `FetchStatus`, `RetriesExhausted`,
    /// `DocumentTooLarge`, `Io`) or `InvalidUrl` for unsupported schemes.
    fn fetch(&self, url: &Url) -> Result<FetchedDocument>;
}

/// Fetcher for `http`, `https` and `file` URLs.
pub struct HttpFetcher {
    client: Client,
    config: FetchConfig,
}

impl HttpFetcher {
    /// Create a fetcher with the default configuration.
    pub fn new() -> Result<Self> {
        Self::with_config(FetchConfig::default())
    }

    /// Create a fetcher with a configured HTTP client.
    pub fn with_config(config: FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()?;
        Ok(Self { client, config })
    }

    fn check_size(&self, url: &Url, size: u64) -> Result<()> {
        if size > self.config.max_document_size {
            return Err(GadgetError::DocumentTooLarge {
                url: url.to_string(),
                size,
                limit: self.config.max_document_size,
            });
        }
        Ok(())
    }

    fn read_file(&self, url: &Url) -> Result<Vec<u8>> {
        let path = url.to_file_path().map_err(|()| GadgetError::InvalidUrl {
            url: url.to_string(),
            reason: "not a local file path".to_string(),
        })?;
        self.check_size(url, fs::metadata(&path)?.len())?;
        Ok(fs::read(path)?)
    }

    /// Download with retry logic.
    ///
    /// Uses exponential backoff for transient failures (connection errors,
    /// timeouts, 5xx responses). Client errors (4xx) fail immediately.
    fn download(&self, url: &Url) -> Result<Vec<u8>> {
        let mut last_error: Option<String> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 500ms, 1000ms
                let delay = RETRY_BASE_DELAY_MS * (1 << (attempt - 1));
                tracing::debug!(attempt, delay_ms = delay, "Retrying after delay");
                thread::sleep(Duration::from_millis(delay));
            }

            match self.client.get(url.as_str()).send() {
                Ok(response) => {
                    let status = response.status();

                    if status.is_server_error() {
                        tracing::warn!(
                            url = %url,
                            status = %status,
                            attempt = attempt + 1,
                            max_retries = MAX_RETRIES,
                            "Server error, will retry"
                        );
                        last_error = Some(format!("Server error: {status}"));
                        continue;
                    }
                    if !status.is_success() {
                        return Err(GadgetError::FetchStatus {
                            url: url.to_string(),
                            status: status.as_u16(),
                        });
                    }
                    if let Some(length) = response.content_length() {
                        self.check_size(url, length)?;
                    }
                    let bytes = response.bytes()?;
                    self.check_size(url, bytes.len() as u64)?;
                    return Ok(bytes.to_vec());
                }
                Err(e) => {
                    if e.is_connect() || e.is_timeout() {
                        tracing::warn!(
                            url = %url,
                            error = %e,
                            attempt = attempt + 1,
                            max_retries = MAX_RETRIES,
                            "Connection error, will retry"
                        );
                        last_error = Some(e.to_string());
                        continue;
                    }
                    return Err(GadgetError::Http(e));
                }
            }
        }

        Err(GadgetError::RetriesExhausted {
            attempts: MAX_RETRIES,
            message: last_error.unwrap_or_else(|| "Unknown error".to_string()),
        })
    }
}

impl DocumentFetcher for HttpFetcher {
    fn fetch(&self, url: &Url) -> Result<FetchedDocument> {
        let bytes = match url.scheme() {
            "http" | "https" => self.download(url)?,
            "file" => self.read_file(url)?,
            scheme => {
                return Err(GadgetError::InvalidUrl {
                    url: url.to_string(),
                    reason: format!("unsupported scheme '{scheme}'"),
                })
            }
        };
        tracing::debug!(url = %url, bytes = bytes.len(), "Fetched gadget document");
        Ok(FetchedDocument {
            bytes,
            source: url.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_create_fetcher() {
        assert!(HttpFetcher::new().is_ok());
    }

    #[test]
    fn test_file_url() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"<Module/>").unwrap();
        let url = Url::from_file_path(file.path()).unwrap();

        let document = HttpFetcher::new().unwrap().fetch(&url).unwrap();
        assert_eq!(document.bytes, b"<Module/>");
        assert_eq!(document.source, url);
    }

    #[test]
    fn test_file_too_large() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[b'x'; 64]).unwrap();
        let url = Url::from_file_path(file.path()).unwrap();

        let fetcher = HttpFetcher::with_config(FetchConfig {
            max_document_size: 16,
            ..FetchConfig::default()
        })
        .unwrap();
        let err = fetcher.fetch(&url).unwrap_err();
        assert!(matches!(err, GadgetError::DocumentTooLarge { size: 64, .. }));
    }

    #[test]
    fn test_unsupported_scheme() {
        let url = Url::parse("ftp://example.org/g.xml").unwrap();
        let err = HttpFetcher::new().unwrap().fetch(&url).unwrap_err();
        assert!(matches!(err, GadgetError::InvalidUrl { .. }));
    }
}
