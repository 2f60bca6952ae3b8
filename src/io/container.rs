//! Zip containers of scene bundles.
//!
//! Local scene files are zip archives holding `index.json` and the data
//! directories it references, optionally nested under one root directory.

use std::collections::HashMap;
use std::io::{Cursor, Read};

use futures_util::future::LocalBoxFuture;
use futures_util::FutureExt;
use tracing::debug;
use zip::ZipArchive;

use super::fetch::Fetcher;
use crate::util::{Error, Result};

/// Upper bound on the buffer reserved up front from an entry's declared size.
const MAX_PREALLOC: u64 = 1 << 20;

/// Serves the entries of an unpacked zip container.
#[derive(Debug, Default)]
pub struct ZipFetcher {
    entries: HashMap<String, Vec<u8>>,
    /// Directory every entry lives under, if there is exactly one.
    root: Option<String>,
}

fn normalize(path: &str) -> &str {
    let mut path = path;
    loop {
        if let Some(rest) = path.strip_prefix("./") {
            path = rest;
        } else if let Some(rest) = path.strip_prefix('/') {
            path = rest;
        } else {
            return path;
        }
    }
}

impl ZipFetcher {
    /// Unpack every file entry of a zip archive.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;
        let mut entries = HashMap::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            if file.is_dir() {
                continue;
            }
            let name = normalize(file.name()).to_string();
            let mut data = Vec::with_capacity(file.size().min(MAX_PREALLOC) as usize);
            file.read_to_end(&mut data)
                .map_err(|e| Error::ContainerUnpack(format!("{}: {}", name, e)))?;
            entries.insert(name, data);
        }
        if entries.is_empty() {
            return Err(Error::ContainerUnpack("archive has no files".into()));
        }

        let root = common_root(entries.keys().map(String::as_str));
        debug!(entries = entries.len(), root = ?root, "Unpacked container");
        Ok(Self { entries, root })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.lookup(path).is_some()
    }

    fn lookup(&self, path: &str) -> Option<&Vec<u8>> {
        let path = normalize(path);
        self.entries.get(path).or_else(|| {
            let root = self.root.as_deref()?;
            self.entries.get(&format!("{}/{}", root, path))
        })
    }
}

fn common_root<'a>(mut names: impl Iterator<Item = &'a str>) -> Option<String> {
    let first = names.next()?;
    let (root, _) = first.split_once('/')?;
    names
        .all(|n| n.split_once('/').is_some_and(|(r, _)| r == root))
        .then(|| root.to_string())
}

impl Fetcher for ZipFetcher {
    fn fetch<'a>(&'a self, url: &'a str) -> LocalBoxFuture<'a, Result<Vec<u8>>> {
        let found = self.lookup(url).cloned();
        async move { found.ok_or_else(|| Error::fetch(url, "no such entry in container")) }
            .boxed_local()
    }
}
