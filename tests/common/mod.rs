//! Shared fixtures: in-memory datasets, bundles and a headless view.

#![allow(dead_code)]

use std::cell::RefCell;
use std::future::Future;
use std::io::{Cursor, Write};
use std::rc::Rc;

use sciview::io::{gzip, Fetcher, JsonPolyDataReader, MemoryFetcher, MeshFormat};
use sciview::scene::{HeadlessView, StaticHost};
use sciview::{Orchestrator, Settings};
use serde_json::{json, Value};
use tokio::task::LocalSet;

pub const SURFACE: &str = "render";

/// Inline description of one triangle with optional time value and field.
pub fn triangle(time: Option<f64>, field: Option<(&str, &[f64])>, active: bool) -> Value {
    let mut desc = json!({
        "vtkClass": "vtkPolyData",
        "points": { "numberOfComponents": 3, "values": [0, 0, 0, 1, 0, 0, 0, 1, 0] },
        "polys": { "dataType": "Uint32Array", "values": [3, 0, 1, 2] },
    });
    if let Some((name, values)) = field {
        desc["pointData"] = json!({
            "activeScalars": if active { 0 } else { -1 },
            "arrays": [ { "data": { "name": name, "values": values } } ],
        });
    }
    if let Some(t) = time {
        desc["fieldData"] = json!({
            "arrays": [ { "data": { "name": "TimeValue", "values": [t] } } ],
        });
    }
    desc
}

pub fn triangle_bytes(time: Option<f64>, field: Option<(&str, &[f64])>, active: bool) -> Vec<u8> {
    serde_json::to_vec(&triangle(time, field, active)).unwrap()
}

fn f32_le(values: &[f64]) -> Vec<u8> {
    values.iter().flat_map(|&v| (v as f32).to_le_bytes()).collect()
}

/// Files of a dataset bundle under `base`: `index.json` plus gzipped arrays.
pub fn bundle_files(base: &str, time: f64, scalars: &[f64]) -> Vec<(String, Vec<u8>)> {
    let points = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
    let index = json!({
        "vtkClass": "vtkPolyData",
        "points": {
            "numberOfComponents": 3, "dataType": "Float32Array", "size": 9,
            "ref": { "encode": "LittleEndian", "basepath": "data", "id": "points" }
        },
        "polys": { "dataType": "Uint32Array", "values": [3, 0, 1, 2] },
        "pointData": {
            "activeScalars": 0,
            "arrays": [ { "data": {
                "name": "Temperature", "dataType": "Float32Array", "size": scalars.len(),
                "ref": { "encode": "LittleEndian", "basepath": "data", "id": "temperature" }
            } } ]
        },
        "fieldData": {
            "arrays": [ { "data": { "name": "TimeValue", "dataType": "Float64Array", "values": [time] } } ]
        }
    });
    let path = |name: &str| if base.is_empty() { name.to_string() } else { format!("{}/{}", base, name) };
    vec![
        (path("index.json"), serde_json::to_vec(&index).unwrap()),
        (path("data/points.gz"), gzip(&f32_le(&points), 6).unwrap()),
        (path("data/temperature.gz"), gzip(&f32_le(scalars), 6).unwrap()),
    ]
}

/// Serve a dataset bundle under `base`.
pub fn add_bundle(fetcher: &MemoryFetcher, base: &str, time: f64, scalars: &[f64]) {
    for (url, bytes) in bundle_files(base, time, scalars) {
        fetcher.insert(url, bytes);
    }
}

/// Serve a timestep series under `base` with one bundle per step.
pub fn add_series(fetcher: &MemoryFetcher, base: &str, steps: &[f64]) {
    let series: Vec<Value> = steps
        .iter()
        .enumerate()
        .map(|(i, t)| json!({ "url": format!("step{}", i), "timeStep": t }))
        .collect();
    fetcher.insert(format!("{}/index.json", base), serde_json::to_vec(&json!({ "series": series })).unwrap());
    for (i, &t) in steps.iter().enumerate() {
        add_bundle(fetcher, &format!("{}/step{}", base, i), t, &[t, t + 1.0, t + 2.0]);
    }
}

/// Zip archive from `(name, bytes)` entries.
pub fn zip_archive(files: &[(String, Vec<u8>)]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, data) in files {
        writer
            .start_file(name.as_str(), zip::write::SimpleFileOptions::default())
            .unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// Run a future on a `LocalSet`, as playback requires.
pub async fn local<F: Future>(future: F) -> F::Output {
    LocalSet::new().run_until(future).await
}

/// A headless view backed by in-memory assets.
pub struct Fixture {
    pub view: Rc<RefCell<HeadlessView>>,
    pub fetcher: Rc<MemoryFetcher>,
}

impl Fixture {
    pub fn new() -> Self {
        let host = StaticHost::new().with_surface(SURFACE, 640, 480);
        Self {
            view: HeadlessView::attach(&host, SURFACE).unwrap().into_ref(),
            fetcher: Rc::new(MemoryFetcher::new()),
        }
    }

    pub fn orchestrator(&self) -> Orchestrator {
        self.orchestrator_with(&Settings::default())
    }

    /// Orchestrator with inline-description readers standing in for the
    /// toolkit mesh parsers.
    pub fn orchestrator_with(&self, settings: &Settings) -> Orchestrator {
        let fetcher: Rc<dyn Fetcher> = self.fetcher.clone();
        Orchestrator::new(self.view.clone(), fetcher, settings)
            .with_reader(MeshFormat::Legacy, Rc::new(JsonPolyDataReader))
            .with_reader(MeshFormat::Xml, Rc::new(JsonPolyDataReader))
    }

    pub fn unit_count(&self) -> usize {
        self.view.borrow().units().len()
    }
}
