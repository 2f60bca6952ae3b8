//! Loaders for toolkit-parsed mesh files.

use std::rc::Rc;

use futures_util::future::{try_join_all, LocalBoxFuture};
use futures_util::FutureExt;
use tracing::{debug, info, warn};

use super::registry::{Frames, LoadContext, LoadOutcome, SourceLoader};
use super::source::{SourceDescriptor, SourceKind};
use crate::data::{Dataset, DatasetSequence};
use crate::io::MeshFormat;
use crate::scene::RenderableUnit;
use crate::util::Result;

/// Display name for a unit loaded from `url`.
pub(crate) fn unit_name(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    trimmed.rsplit('/').next().unwrap_or(trimmed).to_string()
}

async fn fetch_and_parse(cx: &LoadContext, format: MeshFormat, url: &str) -> Result<Dataset> {
    let reader = cx.readers.get(format)?;
    let bytes = cx.fetcher.fetch(url).await?;
    let data = reader.parse(url, &bytes)?;
    Ok(Dataset::new(url, data))
}

/// Loads one mesh file with the reader registered for its format.
#[derive(Clone, Copy, Debug)]
pub struct SingleMeshLoader {
    kind: SourceKind,
    format: MeshFormat,
}

impl SingleMeshLoader {
    pub fn legacy() -> Self {
        Self { kind: SourceKind::SingleLegacyMesh, format: MeshFormat::Legacy }
    }

    pub fn xml() -> Self {
        Self { kind: SourceKind::SingleXmlMesh, format: MeshFormat::Xml }
    }
}

impl SourceLoader for SingleMeshLoader {
    fn kind(&self) -> SourceKind {
        self.kind
    }

    fn load<'a>(
        &'a self,
        cx: &'a LoadContext,
        source: &'a SourceDescriptor,
    ) -> LocalBoxFuture<'a, Result<LoadOutcome>> {
        async move {
            let url = source.url()?;
            let dataset = fetch_and_parse(cx, self.format, url).await?;
            info!(url, points = dataset.data().number_of_points(), "Mesh loaded");
            let unit = RenderableUnit::with_dataset(unit_name(url), dataset).into_ref();
            Ok(LoadOutcome::Unit { unit, frames: Frames::Unsequenced })
        }
        .boxed_local()
    }
}

/// Loads XML mesh files as a time series.
///
/// Every file is fetched concurrently; one failure aborts the whole series.
#[derive(Clone, Copy, Debug, Default)]
pub struct MeshSeriesLoader;

impl SourceLoader for MeshSeriesLoader {
    fn kind(&self) -> SourceKind {
        SourceKind::XmlMeshSeries
    }

    fn load<'a>(
        &'a self,
        cx: &'a LoadContext,
        source: &'a SourceDescriptor,
    ) -> LocalBoxFuture<'a, Result<LoadOutcome>> {
        async move {
            let urls = source.location.urls();
            let datasets = try_join_all(
                urls.iter()
                    .map(|url| fetch_and_parse(cx, MeshFormat::Xml, url)),
            )
            .await?;

            let fetched = datasets.len();
            let sequence = DatasetSequence::from_datasets(datasets);
            if sequence.len() < fetched {
                debug!(dropped = fetched - sequence.len(), "Datasets without a time value dropped");
            }

            let name = urls.first().map(|u| unit_name(u)).unwrap_or_default();
            let unit = match sequence.first() {
                Some(first) => RenderableUnit::with_dataset(name, first.clone()),
                None => {
                    warn!(files = fetched, "No dataset carries a time value, nothing to animate");
                    RenderableUnit::new(name)
                }
            };
            info!(files = fetched, frames = sequence.len(), "Mesh series loaded");
            Ok(LoadOutcome::Unit {
                unit: unit.into_ref(),
                frames: Frames::Sequence(Rc::new(sequence)),
            })
        }
        .boxed_local()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_name() {
        assert_eq!(unit_name("http://h/data/cow.vtp"), "cow.vtp");
        assert_eq!(unit_name("http://h/data/cow/"), "cow");
        assert_eq!(unit_name("mesh.vtk"), "mesh.vtk");
    }
}
