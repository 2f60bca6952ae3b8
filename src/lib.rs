//! # sciview
//!
//! Dataset loading and playback orchestration for scientific 3D viewers.
//!
//! A source (single mesh file, mesh time series, dataset-description bundle,
//! timestep series or scene bundle) is described by a
//! [`SourceDescriptor`](loader::SourceDescriptor), fetched and decoded into
//! renderable units, colored by their scalar fields and placed in a view.
//! Time series are animated by a periodic playback task.
//!
//! ## Modules
//!
//! - [`util`] - Errors and bounds
//! - [`data`] - Datasets, scalar arrays and time-ordered sequences
//! - [`io`] - Fetchers, dataset descriptions, series and zip containers
//! - [`scene`] - Renderable units, scalar bars and views
//! - [`color`] - Scalar field resolution and lookup tables
//! - [`loader`] - One loader per source kind and the dispatch registry
//! - [`playback`] - Frame sources and the playback driver
//! - [`orchestrator`] - Load, mount and teardown
//!
//! ## Example
//!
//! ```ignore
//! use sciview::prelude::*;
//!
//! let view = HeadlessView::attach(&host, "render")?.into_ref();
//! let orchestrator = Orchestrator::new(view, Rc::new(FileFetcher::new()), &Settings::load());
//! let source = SourceDescriptor::single(SourceKind::RemoteCompressedSeries, "data/wave");
//!
//! // Inside a tokio LocalSet
//! let mounted = orchestrator.load(&source, |frame| println!("frame {}", frame)).await?;
//! ```

pub mod util;
pub mod data;
pub mod io;
pub mod scene;
pub mod color;
pub mod loader;
pub mod playback;
pub mod orchestrator;
pub mod settings;

// Re-export commonly used types
pub use util::{Error, Result};
pub use orchestrator::{Mounted, Orchestrator};
pub use settings::Settings;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::util::{Bounds, Error, Result};
    pub use crate::data::{DataArray, Dataset, DatasetSequence, PolyData};
    pub use crate::io::{Fetcher, FileFetcher, GeometryReader, MemoryFetcher, MeshFormat};
    pub use crate::scene::{HeadlessView, Host, SceneView, StaticHost, ViewRef};
    pub use crate::color::{Coloring, ScalarResolver};
    pub use crate::loader::{Location, SourceDescriptor, SourceKind};
    pub use crate::playback::{Playback, PlaybackState};
    pub use crate::orchestrator::{Mounted, Orchestrator};
    pub use crate::settings::Settings;
}
