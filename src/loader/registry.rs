//! Loader trait and the dispatch table keyed by [`SourceKind`].

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use futures_util::future::LocalBoxFuture;
use tracing::debug;

use super::compressed::{CompressedDatasetLoader, CompressedSeriesLoader};
use super::mesh::{MeshSeriesLoader, SingleMeshLoader};
use super::scene::SceneLoader;
use super::source::{SourceDescriptor, SourceKind};
use crate::color::ScalarResolver;
use crate::data::DatasetSequence;
use crate::io::{Fetcher, ReaderSet, SeriesReader};
use crate::scene::{UnitRef, ViewRef};
use crate::util::{Error, Result};

/// Everything a loader may use.
pub struct LoadContext {
    pub fetcher: Rc<dyn Fetcher>,
    pub readers: ReaderSet,
    /// Target view; only scene bundles populate it directly.
    pub view: ViewRef,
    pub resolver: ScalarResolver,
    pub fetch_gzip: bool,
}

/// Animation frames produced alongside a unit.
pub enum Frames {
    /// Nothing to animate
    Unsequenced,
    /// Pre-materialized datasets ordered by time value
    Sequence(Rc<DatasetSequence>),
    /// A reader able to re-bind to any timestep by index
    TimeSteps { reader: Rc<SeriesReader>, time_steps: Vec<f64> },
}

impl Frames {
    pub fn len(&self) -> usize {
        match self {
            Self::Unsequenced => 0,
            Self::Sequence(seq) => seq.len(),
            Self::TimeSteps { time_steps, .. } => time_steps.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for Frames {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsequenced => write!(f, "Unsequenced"),
            Self::Sequence(seq) => write!(f, "Sequence({} frames)", seq.len()),
            Self::TimeSteps { time_steps, .. } => write!(f, "TimeSteps({:?})", time_steps),
        }
    }
}

/// Units a scene bundle placed in the view.
#[derive(Clone, Debug)]
pub struct SceneSummary {
    pub units: Vec<UnitRef>,
    pub background: Option<[f64; 3]>,
}

/// Result of one loader run.
#[derive(Debug)]
pub enum LoadOutcome {
    /// One unit, not yet in the view
    Unit { unit: UnitRef, frames: Frames },
    /// A scene already placed in the view
    Scene(SceneSummary),
}

/// Turns one kind of source into renderable units.
pub trait SourceLoader {
    fn kind(&self) -> SourceKind;

    fn load<'a>(
        &'a self,
        cx: &'a LoadContext,
        source: &'a SourceDescriptor,
    ) -> LocalBoxFuture<'a, Result<LoadOutcome>>;
}

/// One loader per [`SourceKind`].
pub struct LoaderRegistry {
    loaders: HashMap<SourceKind, Box<dyn SourceLoader>>,
}

impl LoaderRegistry {
    /// Registry with no loaders.
    pub fn empty() -> Self {
        Self { loaders: HashMap::new() }
    }

    /// Registry with the built-in loader for every kind.
    pub fn new() -> Self {
        Self::empty()
            .with(SingleMeshLoader::legacy())
            .with(SingleMeshLoader::xml())
            .with(MeshSeriesLoader)
            .with(CompressedDatasetLoader)
            .with(CompressedSeriesLoader)
            .with(SceneLoader::new())
    }

    /// Install a loader, replacing any loader of the same kind.
    pub fn register(&mut self, loader: impl SourceLoader + 'static) {
        self.loaders.insert(loader.kind(), Box::new(loader));
    }

    pub fn with(mut self, loader: impl SourceLoader + 'static) -> Self {
        self.register(loader);
        self
    }

    pub fn get(&self, kind: SourceKind) -> Option<&dyn SourceLoader> {
        self.loaders.get(&kind).map(|l| l.as_ref())
    }

    /// Validate a descriptor and run the loader for its kind.
    pub async fn load(&self, cx: &LoadContext, source: &SourceDescriptor) -> Result<LoadOutcome> {
        source.validate()?;
        let loader = self
            .get(source.kind)
            .ok_or_else(|| {
                Error::InvalidSource(format!("no loader registered for {}", source.kind))
            })?;
        debug!(kind = %source.kind, urls = source.location.urls().len(), "Dispatching load");
        loader.load(cx, source).await
    }
}

impl Default for LoaderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
