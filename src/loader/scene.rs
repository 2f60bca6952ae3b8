//! Declarative multi-object scenes.
//!
//! A scene bundle is an `index.json` listing dataset bundles with optional
//! per-object coloring:
//!
//! ```json
//! {
//!   "background": [0.1, 0.1, 0.1],
//!   "scene": [
//!     { "name": "hull", "type": "httpDataSetReader",
//!       "httpDataSetReader": { "url": "data/hull" },
//!       "mapper": { "colorByArrayName": "Pressure", "colorMode": 1, "scalarMode": 3 },
//!       "lookupTable": { "preset": "Blue to Red Rainbow" } }
//!   ]
//! }
//! ```

use std::rc::Rc;

use colormaps::{default_preset, ColorTransferFunction};
use futures_util::future::{try_join_all, LocalBoxFuture};
use futures_util::FutureExt;
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::registry::{LoadContext, LoadOutcome, SceneSummary, SourceLoader};
use super::source::{SourceDescriptor, SourceKind};
use crate::color::ScalarResolver;
use crate::data::PolyData;
use crate::io::{index_location, join_url, Fetcher, HttpDataSetReader, ZipFetcher};
use crate::scene::{ColorMode, RenderableUnit, ScalarMode};
use crate::util::{Error, Result};

const READER_ITEM: &str = "httpDataSetReader";

#[derive(Debug, Deserialize)]
struct SceneIndex {
    #[serde(default)]
    background: Option<[f64; 3]>,
    #[serde(default)]
    scene: Vec<SceneItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SceneItem {
    #[serde(default)]
    name: Option<String>,
    #[serde(rename = "type", default)]
    item_type: Option<String>,
    #[serde(default)]
    http_data_set_reader: Option<ReaderSettings>,
    #[serde(default)]
    mapper: Option<MapperSettings>,
    #[serde(default)]
    lookup_table: Option<LookupTableSettings>,
}

#[derive(Debug, Deserialize)]
struct ReaderSettings {
    url: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MapperSettings {
    #[serde(default)]
    color_by_array_name: Option<String>,
    #[serde(default)]
    color_mode: Option<ColorMode>,
    #[serde(default)]
    scalar_mode: Option<ScalarMode>,
    #[serde(default)]
    scalar_visibility: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct LookupTableSettings {
    #[serde(default)]
    preset: Option<String>,
    #[serde(default)]
    range: Option<[f64; 2]>,
}

impl SceneItem {
    fn reader_url(&self) -> Option<&str> {
        let is_reader = self.item_type.as_deref().map_or(true, |t| t == READER_ITEM);
        self.http_data_set_reader
            .as_ref()
            .filter(|_| is_reader)
            .map(|r| r.url.as_str())
    }

    /// Color a unit from the item's own settings, or resolve when it has none.
    fn color(&self, unit: &mut RenderableUnit, resolver: &ScalarResolver) {
        let Some(settings) = &self.mapper else {
            resolver.apply(unit);
            return;
        };
        let lut = self.lookup_table.as_ref();
        let mapper = &mut unit.mapper;
        mapper.color_mode = settings.color_mode.unwrap_or_default();
        mapper.scalar_mode = settings.scalar_mode.unwrap_or_default();
        mapper.color_by_array_name = settings.color_by_array_name.clone();
        mapper.scalar_visibility = settings.scalar_visibility.unwrap_or(true);
        if !mapper.scalar_visibility {
            return;
        }

        let preset = lut
            .and_then(|l| l.preset.as_deref())
            .unwrap_or(resolver.preset_name());
        let mut table = ColorTransferFunction::from_preset_name(preset).unwrap_or_else(|| {
            warn!(preset, "Unknown color preset in scene");
            ColorTransferFunction::from_preset(default_preset())
        });
        let range = lut
            .and_then(|l| l.range)
            .or_else(|| {
                let data = mapper.input()?.data();
                scalar_range(data, settings.color_by_array_name.as_deref())
            })
            .unwrap_or([0.0, 1.0]);
        table.set_mapping_range(range[0], range[1]);
        mapper.lookup_table = Some(table);
        mapper.use_lookup_table_scalar_range = true;
    }
}

fn scalar_range(data: &PolyData, array_name: Option<&str>) -> Option<[f64; 2]> {
    let array = match array_name {
        Some(name) => data
            .point_data
            .array_by_name(name)
            .or_else(|| data.cell_data.array_by_name(name)),
        None => data.point_data.scalars().or_else(|| data.cell_data.scalars()),
    };
    array?.range()
}

type ReadyHook = Box<dyn Fn(&SceneSummary)>;

/// Loads a scene bundle and places its objects in the view.
///
/// Every object is loaded before any is added. The optional ready hook runs
/// once the scene is in the view.
#[derive(Default)]
pub struct SceneLoader {
    on_ready: Option<ReadyHook>,
}

impl SceneLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_ready(mut self, hook: impl Fn(&SceneSummary) + 'static) -> Self {
        self.on_ready = Some(Box::new(hook));
        self
    }

    async fn load_scene(
        &self,
        cx: &LoadContext,
        source: &SourceDescriptor,
    ) -> Result<SceneSummary> {
        let url = source.url()?;

        // Local scene files are zip containers resolved from their own index.
        let (fetcher, index_url, base): (Rc<dyn Fetcher>, String, String) =
            if source.origin_is_local_file {
                let bytes = cx.fetcher.fetch(url).await?;
                let container = ZipFetcher::from_bytes(&bytes)?;
                (Rc::new(container), "index.json".to_string(), String::new())
            } else {
                let (index_url, base) = index_location(url);
                (cx.fetcher.clone(), index_url, base)
            };

        let bytes = fetcher.fetch(&index_url).await?;
        let index: SceneIndex =
            serde_json::from_slice(&bytes).map_err(|e| Error::parse(index_url.as_str(), e))?;

        let items: Vec<(&SceneItem, &str)> = index
            .scene
            .iter()
            .filter_map(|item| match item.reader_url() {
                Some(url) => Some((item, url)),
                None => {
                    warn!(
                        item = ?item.name,
                        kind = ?item.item_type,
                        "Skipping unsupported scene item"
                    );
                    None
                }
            })
            .collect();

        let reader = HttpDataSetReader::new(fetcher.as_ref(), cx.fetch_gzip);
        let datasets = try_join_all(
            items
                .iter()
                .map(|(_, item_url)| {
                    let item_url = join_url(&base, item_url);
                    let reader = &reader;
                    async move { reader.load(&item_url).await }
                }),
        )
        .await?;

        let units: Vec<_> = items
            .iter()
            .zip(datasets)
            .map(|((item, item_url), dataset)| {
                let name = item.name.clone().unwrap_or_else(|| item_url.to_string());
                let mut unit = RenderableUnit::with_dataset(name, dataset);
                item.color(&mut unit, &cx.resolver);
                unit.into_ref()
            })
            .collect();

        {
            let mut view = cx.view.borrow_mut();
            for unit in &units {
                view.add_unit(unit.clone());
            }
            if let Some(rgb) = index.background {
                view.set_background(rgb);
            }
        }
        debug!(objects = units.len(), "Scene placed in view");
        Ok(SceneSummary { units, background: index.background })
    }
}

impl SourceLoader for SceneLoader {
    fn kind(&self) -> SourceKind {
        SourceKind::SceneBundle
    }

    fn load<'a>(
        &'a self,
        cx: &'a LoadContext,
        source: &'a SourceDescriptor,
    ) -> LocalBoxFuture<'a, Result<LoadOutcome>> {
        async move {
            let summary = self.load_scene(cx, source).await?;
            info!(
                objects = summary.units.len(),
                local = source.origin_is_local_file,
                "Scene ready"
            );
            if let Some(hook) = &self.on_ready {
                hook(&summary);
            }
            Ok(LoadOutcome::Scene(summary))
        }
        .boxed_local()
    }
}
