//! Loaders for dataset-description bundles.

use std::rc::Rc;

use futures_util::future::LocalBoxFuture;
use futures_util::FutureExt;
use tracing::{info, warn};

use super::mesh::unit_name;
use super::registry::{Frames, LoadContext, LoadOutcome, SourceLoader};
use super::source::{SourceDescriptor, SourceKind};
use crate::io::{HttpDataSetReader, SeriesReader};
use crate::scene::RenderableUnit;
use crate::util::Result;

/// Loads one dataset bundle.
#[derive(Clone, Copy, Debug, Default)]
pub struct CompressedDatasetLoader;

impl SourceLoader for CompressedDatasetLoader {
    fn kind(&self) -> SourceKind {
        SourceKind::RemoteCompressedDataset
    }

    fn load<'a>(
        &'a self,
        cx: &'a LoadContext,
        source: &'a SourceDescriptor,
    ) -> LocalBoxFuture<'a, Result<LoadOutcome>> {
        async move {
            let url = source.url()?;
            let dataset = HttpDataSetReader::new(cx.fetcher.as_ref(), cx.fetch_gzip)
                .load(url)
                .await?;
            info!(url, points = dataset.data().number_of_points(), "Dataset loaded");
            let unit = RenderableUnit::with_dataset(unit_name(url), dataset).into_ref();
            Ok(LoadOutcome::Unit { unit, frames: Frames::Unsequenced })
        }
        .boxed_local()
    }
}

/// Loads a series of dataset bundles and binds the earliest timestep.
#[derive(Clone, Copy, Debug, Default)]
pub struct CompressedSeriesLoader;

impl SourceLoader for CompressedSeriesLoader {
    fn kind(&self) -> SourceKind {
        SourceKind::RemoteCompressedSeries
    }

    fn load<'a>(
        &'a self,
        cx: &'a LoadContext,
        source: &'a SourceDescriptor,
    ) -> LocalBoxFuture<'a, Result<LoadOutcome>> {
        async move {
            let url = source.url()?;
            let reader = SeriesReader::open(cx.fetcher.clone(), url, cx.fetch_gzip).await?;
            let time_steps = reader.time_steps();

            let mut unit = RenderableUnit::new(unit_name(url));
            if reader.is_empty() {
                warn!(url, "Series has no timesteps, nothing to animate");
            } else {
                unit.mapper.set_input(reader.update_time_step(0).await?);
            }
            info!(url, steps = time_steps.len(), "Series loaded");
            Ok(LoadOutcome::Unit {
                unit: unit.into_ref(),
                frames: Frames::TimeSteps { reader: Rc::new(reader), time_steps },
            })
        }
        .boxed_local()
    }
}
