//! Asynchronous byte sources.
//!
//! A [`Fetcher`] turns a URL into bytes. Fetchers are used from a single
//! thread, so their futures are not `Send`.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

use futures_util::future::LocalBoxFuture;
use futures_util::FutureExt;
use tracing::{debug, trace, warn};

use crate::util::{Error, Result};

/// Source of raw bytes by URL.
pub trait Fetcher {
    fn fetch<'a>(&'a self, url: &'a str) -> LocalBoxFuture<'a, Result<Vec<u8>>>;
}

impl<T: Fetcher + ?Sized> Fetcher for Rc<T> {
    fn fetch<'a>(&'a self, url: &'a str) -> LocalBoxFuture<'a, Result<Vec<u8>>> {
        (**self).fetch(url)
    }
}

/// Join a relative reference onto a base URL.
///
/// Absolute references (with a scheme or a leading `/`) are returned as is.
pub fn join_url(base: &str, reference: &str) -> String {
    if reference.contains("://") || reference.starts_with('/') || base.is_empty() {
        return reference.to_string();
    }
    let reference = reference.trim_start_matches("./");
    format!("{}/{}", base.trim_end_matches('/'), reference)
}

/// Everything before the last `/` of a URL, or an empty string.
pub fn parent_url(url: &str) -> &str {
    url.rfind('/').map(|i| &url[..i]).unwrap_or("")
}

/// Reads local paths and `file://` URLs.
#[derive(Clone, Debug, Default)]
pub struct FileFetcher {
    root: Option<PathBuf>,
}

impl FileFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative paths against `root`.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: Some(root.into()) }
    }

    fn resolve(&self, url: &str) -> PathBuf {
        let path = Path::new(url.strip_prefix("file://").unwrap_or(url));
        match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl Fetcher for FileFetcher {
    fn fetch<'a>(&'a self, url: &'a str) -> LocalBoxFuture<'a, Result<Vec<u8>>> {
        async move {
            if url.contains("://") && !url.starts_with("file://") {
                return Err(Error::fetch(url, "unsupported scheme"));
            }
            let path = self.resolve(url);
            trace!(path = %path.display(), "Reading file");
            tokio::fs::read(&path).await.map_err(|e| Error::fetch(url, e))
        }
        .boxed_local()
    }
}

/// Serves pre-bundled assets from memory.
///
/// Unknown URLs fail like a missing remote resource.
#[derive(Debug, Default)]
pub struct MemoryFetcher {
    entries: RefCell<HashMap<String, Vec<u8>>>,
    requests: RefCell<Vec<String>>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, url: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.entries.borrow_mut().insert(url.into(), bytes.into());
    }

    pub fn with(self, url: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(url, bytes);
        self
    }

    /// URLs requested so far, in request order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

impl Fetcher for MemoryFetcher {
    fn fetch<'a>(&'a self, url: &'a str) -> LocalBoxFuture<'a, Result<Vec<u8>>> {
        self.requests.borrow_mut().push(url.to_string());
        let found = self.entries.borrow().get(url).cloned();
        async move { found.ok_or_else(|| Error::fetch(url, "404 Not Found")) }.boxed_local()
    }
}

/// Timeout and retry settings for fetches.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FetchPolicy {
    /// Per-attempt timeout
    pub timeout: Option<Duration>,
    /// Extra attempts after the first failure
    pub retries: u32,
    pub retry_delay: Duration,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            timeout: None,
            retries: 0,
            retry_delay: Duration::from_millis(200),
        }
    }
}

/// Applies a [`FetchPolicy`] to another fetcher.
///
/// Only transient failures are retried. The final error is returned as is,
/// so a load still fails as a whole.
pub struct PolicyFetcher<F> {
    inner: F,
    policy: FetchPolicy,
}

impl<F: Fetcher> PolicyFetcher<F> {
    pub fn new(inner: F, policy: FetchPolicy) -> Self {
        Self { inner, policy }
    }

    async fn attempt(&self, url: &str) -> Result<Vec<u8>> {
        match self.policy.timeout {
            Some(limit) => tokio::time::timeout(limit, self.inner.fetch(url))
                .await
                .map_err(|_| Error::Timeout {
                    url: url.to_string(),
                    ms: limit.as_millis() as u64,
                })?,
            None => self.inner.fetch(url).await,
        }
    }
}

impl<F: Fetcher> Fetcher for PolicyFetcher<F> {
    fn fetch<'a>(&'a self, url: &'a str) -> LocalBoxFuture<'a, Result<Vec<u8>>> {
        async move {
            let mut attempt = 0;
            loop {
                match self.attempt(url).await {
                    Ok(bytes) => return Ok(bytes),
                    Err(e) if e.is_transient() && attempt < self.policy.retries => {
                        attempt += 1;
                        warn!(url, attempt, error = %e, "Fetch failed, retrying");
                        tokio::time::sleep(self.policy.retry_delay).await;
                    }
                    Err(e) => {
                        debug!(url, attempts = attempt + 1, error = %e, "Fetch failed");
                        return Err(e);
                    }
                }
            }
        }
        .boxed_local()
    }
}
