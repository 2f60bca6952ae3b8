//! Readers for compressed dataset bundles and timestep series.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use serde::Deserialize;
use tracing::{debug, info};

use super::description::DataSetDescription;
use super::fetch::{join_url, parent_url, Fetcher};
use crate::data::Dataset;
use crate::util::{Error, Result};

/// Split a bundle URL into its index URL and the base for relative refs.
///
/// A URL naming a `.json` file is used as is; anything else is treated as a
/// directory holding `index.json`.
pub fn index_location(url: &str) -> (String, String) {
    if url.ends_with(".json") {
        (url.to_string(), parent_url(url).to_string())
    } else {
        let base = url.trim_end_matches('/');
        (join_url(base, "index.json"), base.to_string())
    }
}

/// Loads one dataset from a description bundle.
pub struct HttpDataSetReader<'a> {
    fetcher: &'a dyn Fetcher,
    fetch_gzip: bool,
}

impl<'a> HttpDataSetReader<'a> {
    pub fn new(fetcher: &'a dyn Fetcher, fetch_gzip: bool) -> Self {
        Self { fetcher, fetch_gzip }
    }

    /// Fetch the index, then every referenced array, and assemble.
    pub async fn load(&self, url: &str) -> Result<Dataset> {
        let (index_url, base) = index_location(url);
        debug!(url = %index_url, gzip = self.fetch_gzip, "Loading dataset description");
        let bytes = self.fetcher.fetch(&index_url).await?;
        let desc = DataSetDescription::from_slice(&index_url, &bytes)?;
        let pd = desc.to_polydata(&index_url, self.fetcher, &base, self.fetch_gzip).await?;
        Ok(Dataset::new(url, pd))
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeriesEntry {
    url: String,
    time_step: f64,
}

#[derive(Debug, Deserialize)]
struct SeriesIndex {
    series: Vec<SeriesEntry>,
}

/// Reader for a bundle of timesteps, each a dataset description bundle.
///
/// Datasets are fetched on first use and cached per timestep index.
pub struct SeriesReader {
    fetcher: Rc<dyn Fetcher>,
    fetch_gzip: bool,
    base: String,
    entries: Vec<SeriesEntry>,
    cache: RefCell<HashMap<usize, Dataset>>,
    current: Cell<Option<usize>>,
}

impl SeriesReader {
    /// Fetch and parse the series index. Entries are sorted by time step.
    pub async fn open(fetcher: Rc<dyn Fetcher>, url: &str, fetch_gzip: bool) -> Result<Self> {
        let (index_url, base) = index_location(url);
        let bytes = fetcher.fetch(&index_url).await?;
        let index: SeriesIndex =
            serde_json::from_slice(&bytes).map_err(|e| Error::parse(index_url.as_str(), e))?;
        let mut entries = index.series;
        entries.sort_by(|a, b| a.time_step.total_cmp(&b.time_step));
        info!(url = %index_url, steps = entries.len(), "Series index loaded");
        Ok(Self {
            fetcher,
            fetch_gzip,
            base,
            entries,
            cache: RefCell::new(HashMap::new()),
            current: Cell::new(None),
        })
    }

    pub fn time_steps(&self) -> Vec<f64> {
        self.entries.iter().map(|e| e.time_step).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Index of the timestep last bound with [`Self::update_time_step`].
    pub fn current_index(&self) -> Option<usize> {
        self.current.get()
    }

    /// Time value of the current timestep.
    pub fn current_time_step(&self) -> Option<f64> {
        self.current.get().map(|i| self.entries[i].time_step)
    }

    /// Dataset for timestep `index`, fetched once then cached.
    pub async fn dataset_at(&self, index: usize) -> Result<Dataset> {
        let entry = self.entries.get(index).ok_or_else(|| {
            Error::other(format!("timestep {} out of range ({} steps)", index, self.entries.len()))
        })?;
        if let Some(cached) = self.cache.borrow().get(&index) {
            return Ok(cached.clone());
        }
        let url = join_url(&self.base, &entry.url);
        let dataset = HttpDataSetReader::new(self.fetcher.as_ref(), self.fetch_gzip)
            .load(&url)
            .await?;
        self.cache.borrow_mut().insert(index, dataset.clone());
        Ok(dataset)
    }

    /// Re-bind the reader output to timestep `index`.
    pub async fn update_time_step(&self, index: usize) -> Result<Dataset> {
        let dataset = self.dataset_at(index).await?;
        self.current.set(Some(index));
        Ok(dataset)
    }
}
