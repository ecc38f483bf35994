//! Spec factory: fetch, parse and cache gadget documents.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Instant;

use url::Url;

use crate::config::FactoryConfig;
use crate::error::Result;
use crate::fetch::DocumentFetcher;
use crate::model::GadgetSpec;
use crate::parser::{checksum, GadgetSpecParser};

struct CacheEntry {
    spec: Arc<GadgetSpec>,
    fetched_at: Instant,
}

/// Loads gadget specs through a [`DocumentFetcher`] and caches the parsed
/// trees.
///
/// Cached specs are shared as `Arc<GadgetSpec>`; they are immutable, so any
/// number of renders may substitute against the same tree concurrently.
pub struct SpecFactory<F> {
    fetcher: F,
    parser: GadgetSpecParser,
    config: FactoryConfig,
    cache: RwLock<HashMap<Url, CacheEntry>>,
}

impl<F: DocumentFetcher> SpecFactory<F> {
    /// Create a factory with the standard parser and default cache TTL.
    pub fn new(fetcher: F) -> Self {
        Self::with_config(fetcher, GadgetSpecParser::new(), FactoryConfig::default())
    }

    pub fn with_config(fetcher: F, parser: GadgetSpecParser, config: FactoryConfig) -> Self {
        Self {
            fetcher,
            parser,
            config,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Return the spec at `url`, from cache while it is fresh.
    ///
    /// With `ignore_cache` the document is always refetched. When fetching
    /// or parsing fails and an older copy younger than the stale limit is
    /// cached, the older copy is returned instead of the error.
    ///
    /// # Errors
    /// Returns the fetch or parse error when no cached copy exists.
    pub fn get_spec(&self, url: &Url, ignore_cache: bool) -> Result<Arc<GadgetSpec>> {
        let cached = self.cached(url);

        if !ignore_cache {
            if let Some((spec, fetched_at)) = &cached {
                if fetched_at.elapsed() < self.config.ttl {
                    tracing::debug!(url = %url, "Serving cached gadget spec");
                    return Ok(Arc::clone(spec));
                }
            }
        }

        let previous = cached.as_ref().map(|(spec, _)| spec);
        match self.load(url, previous) {
            Ok(spec) => {
                self.store(url, Arc::clone(&spec));
                Ok(spec)
            }
            Err(err) => match cached {
                Some((stale, fetched_at)) if fetched_at.elapsed() < self.config.stale_ttl => {
                    tracing::warn!(
                        url = %url,
                        error = %err,
                        "Refreshing gadget spec failed, serving cached copy"
                    );
                    Ok(stale)
                }
                _ => Err(err),
            },
        }
    }

    /// Drop the cached copy of `url`.
    pub fn invalidate(&self, url: &Url) {
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(url);
    }

    /// Fetch and parse, reusing `previous` when the bytes are unchanged.
    fn load(&self, url: &Url, previous: Option<&Arc<GadgetSpec>>) -> Result<Arc<GadgetSpec>> {
        let document = self.fetcher.fetch(url)?;
        let digest = checksum(&document.bytes);

        if let Some(previous) = previous {
            if previous.checksum() == digest && previous.url() == &document.source {
                tracing::debug!(url = %url, "Gadget document unchanged, reusing parsed spec");
                return Ok(Arc::clone(previous));
            }
        }

        let spec = self.parser.parse(&document.bytes, &document.source)?;
        tracing::info!(url = %url, checksum = %digest, "Loaded gadget spec");
        Ok(Arc::new(spec))
    }

    fn cached(&self, url: &Url) -> Option<(Arc<GadgetSpec>, Instant)> {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(url)
            .map(|entry| (Arc::clone(&entry.spec), entry.fetched_at))
    }

    /// Insert a fresh entry, dropping entries past the stale limit and the
    /// oldest ones beyond the size cap.
    fn store(&self, url: &Url, spec: Arc<GadgetSpec>) {
        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        let stale_ttl = self.config.stale_ttl;
        cache.retain(|_, entry| entry.fetched_at.elapsed() < stale_ttl);
        cache.insert(
            url.clone(),
            CacheEntry {
                spec,
                fetched_at: Instant::now(),
            },
        );

        while cache.len() > self.config.max_entries.max(1) {
            let oldest = cache
                .iter()
                .min_by_key(|(_, entry)| entry.fetched_at)
                .map(|(key, _)| key.clone());
            match oldest {
                Some(key) => {
                    tracing::debug!(url = %key, "Evicting cached gadget spec");
                    cache.remove(&key);
                }
                None => break,
            }
        }
    }
}
