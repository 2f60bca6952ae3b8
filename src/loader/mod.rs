//! Source loaders.
//!
//! Each [`SourceKind`] has one [`SourceLoader`]; the [`LoaderRegistry`]
//! dispatches a [`SourceDescriptor`] to it. Loaders run a linear pipeline
//! (fetch, decode, bind) and hand back units that are not yet in a view,
//! except scene bundles, which populate the view themselves.

mod compressed;
mod mesh;
mod registry;
mod scene;
mod source;

pub use compressed::{CompressedDatasetLoader, CompressedSeriesLoader};
pub use mesh::{MeshSeriesLoader, SingleMeshLoader};
pub use registry::{Frames, LoadContext, LoadOutcome, LoaderRegistry, SceneSummary, SourceLoader};
pub use scene::SceneLoader;
pub use source::{Location, SourceDescriptor, SourceKind};
