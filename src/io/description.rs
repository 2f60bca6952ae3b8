//! JSON dataset descriptions.
//!
//! A description lists the arrays of one polygonal dataset. Each array
//! either carries inline `values` or a `ref` to a binary little-endian blob
//! stored next to the description:
//!
//! ```json
//! {
//!   "vtkClass": "vtkPolyData",
//!   "points": { "numberOfComponents": 3, "dataType": "Float32Array",
//!               "ref": { "encode": "LittleEndian", "basepath": "data", "id": "5f1c..." } },
//!   "pointData": { "activeScalars": 0,
//!                  "arrays": [ { "data": { "name": "Temp", "values": [1, 2, 3] } } ] }
//! }
//! ```

use futures_util::future::try_join_all;
use glam::Vec3;
use serde::Deserialize;
use tracing::trace;

use super::compression::gunzip;
use super::fetch::{join_url, Fetcher};
use crate::data::{DataArray, DataSetAttributes, DataType, PolyData};
use crate::util::{Error, Result};

/// Reference to an external binary array.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ArrayRef {
    pub id: String,
    #[serde(default)]
    pub basepath: String,
    #[serde(default)]
    pub encode: Option<String>,
}

fn one() -> usize {
    1
}

/// One array of a description.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ArrayDescription {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "one")]
    pub number_of_components: usize,
    #[serde(default)]
    pub data_type: DataType,
    /// Expected element count, checked when present.
    #[serde(default)]
    pub size: Option<usize>,
    #[serde(default)]
    pub values: Option<Vec<f64>>,
    #[serde(default, rename = "ref")]
    pub reference: Option<ArrayRef>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ArrayEntry {
    pub data: ArrayDescription,
}

/// Arrays attached to points, cells or the dataset.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AttributesDescription {
    #[serde(default)]
    pub arrays: Vec<ArrayEntry>,
    /// Index of the active scalars; negative means none.
    #[serde(default)]
    pub active_scalars: Option<i64>,
}

/// Top-level description of a polygonal dataset.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DataSetDescription {
    #[serde(default)]
    pub vtk_class: Option<String>,
    #[serde(default)]
    pub points: Option<ArrayDescription>,
    #[serde(default)]
    pub polys: Option<ArrayDescription>,
    #[serde(default)]
    pub point_data: AttributesDescription,
    #[serde(default)]
    pub cell_data: AttributesDescription,
    #[serde(default)]
    pub field_data: AttributesDescription,
}

impl DataSetDescription {
    pub fn from_slice(source_name: &str, bytes: &[u8]) -> Result<Self> {
        let desc: Self = serde_json::from_slice(bytes).map_err(|e| Error::parse(source_name, e))?;
        if let Some(class) = desc.vtk_class.as_deref() {
            if class != "vtkPolyData" {
                return Err(Error::parse(
                    source_name,
                    format!("unsupported dataset class {}", class),
                ));
            }
        }
        Ok(desc)
    }

    /// Every array in assembly order: points, polys, point, cell, field data.
    fn arrays(&self) -> impl Iterator<Item = &ArrayDescription> {
        self.points
            .iter()
            .chain(self.polys.iter())
            .chain(self.point_data.arrays.iter().map(|e| &e.data))
            .chain(self.cell_data.arrays.iter().map(|e| &e.data))
            .chain(self.field_data.arrays.iter().map(|e| &e.data))
    }

    /// Build geometry when every array is inline.
    pub fn to_polydata_inline(&self, source_name: &str) -> Result<PolyData> {
        let arrays = self
            .arrays()
            .map(|desc| match &desc.values {
                Some(values) => finish_array(source_name, desc, values.clone()),
                None => Err(Error::parse(source_name, "array has no inline values")),
            })
            .collect::<Result<Vec<_>>>()?;
        self.assemble(source_name, arrays)
    }

    /// Build geometry, fetching referenced arrays relative to `base_url`.
    ///
    /// All arrays are fetched concurrently; the first failure aborts.
    pub async fn to_polydata(
        &self,
        source_name: &str,
        fetcher: &dyn Fetcher,
        base_url: &str,
        fetch_gzip: bool,
    ) -> Result<PolyData> {
        let arrays = try_join_all(
            self.arrays()
                .map(|desc| resolve_array(source_name, fetcher, base_url, fetch_gzip, desc)),
        )
        .await?;
        self.assemble(source_name, arrays)
    }

    fn assemble(&self, source_name: &str, arrays: Vec<DataArray>) -> Result<PolyData> {
        let mut arrays = arrays.into_iter();
        let mut pd = PolyData::new();

        if self.points.is_some() {
            let points = arrays.next().ok_or_else(|| Error::parse(source_name, "missing points"))?;
            if points.number_of_components != 3 {
                return Err(Error::parse(
                    source_name,
                    format!("points have {} components, expected 3", points.number_of_components),
                ));
            }
            pd.points = points
                .values
                .chunks_exact(3)
                .map(|p| Vec3::new(p[0] as f32, p[1] as f32, p[2] as f32))
                .collect();
        }

        if self.polys.is_some() {
            let polys = arrays.next().ok_or_else(|| Error::parse(source_name, "missing polys"))?;
            pd.polys = polys.values.iter().map(|&v| v as u32).collect();
            validate_cells(source_name, &pd.polys, pd.points.len())?;
        }

        pd.point_data = collect_attributes(&self.point_data, &mut arrays);
        pd.cell_data = collect_attributes(&self.cell_data, &mut arrays);
        pd.field_data = collect_attributes(&self.field_data, &mut arrays);
        Ok(pd)
    }
}

fn collect_attributes(
    desc: &AttributesDescription,
    arrays: &mut impl Iterator<Item = DataArray>,
) -> DataSetAttributes {
    let mut attrs = DataSetAttributes::new();
    for array in arrays.take(desc.arrays.len()) {
        attrs.add_array(array);
    }
    let active = desc
        .active_scalars
        .and_then(|i| usize::try_from(i).ok());
    attrs.set_active_scalars(active);
    attrs
}

fn validate_cells(source_name: &str, polys: &[u32], num_points: usize) -> Result<()> {
    let mut i = 0;
    while i < polys.len() {
        let n = polys[i] as usize;
        let end = i + 1 + n;
        if end > polys.len() {
            return Err(Error::parse(
                source_name,
                format!("cell at offset {} runs past the cell array", i),
            ));
        }
        if let Some(&bad) = polys[i + 1..end].iter().find(|&&p| p as usize >= num_points) {
            return Err(Error::parse(
                source_name,
                format!("cell references point {} of {}", bad, num_points),
            ));
        }
        i = end;
    }
    Ok(())
}

fn finish_array(source_name: &str, desc: &ArrayDescription, values: Vec<f64>) -> Result<DataArray> {
    if let Some(size) = desc.size {
        if size != values.len() {
            return Err(Error::parse(
                source_name,
                format!("array {:?} has {} values, expected {}", desc.name, values.len(), size),
            ));
        }
    }
    let mut array =
        DataArray::new(desc.name.clone().unwrap_or_default(), desc.number_of_components, values);
    array.data_type = desc.data_type;
    Ok(array)
}

async fn resolve_array(
    source_name: &str,
    fetcher: &dyn Fetcher,
    base_url: &str,
    fetch_gzip: bool,
    desc: &ArrayDescription,
) -> Result<DataArray> {
    if let Some(values) = &desc.values {
        return finish_array(source_name, desc, values.clone());
    }
    let Some(reference) = &desc.reference else {
        return Err(Error::parse(source_name, "array has neither values nor ref"));
    };
    match reference.encode.as_deref() {
        None | Some("LittleEndian") => {}
        Some(other) => {
            return Err(Error::parse(source_name, format!("unsupported array encoding {}", other)));
        }
    }

    let dir = if reference.basepath.is_empty() {
        base_url.to_string()
    } else {
        join_url(base_url, &reference.basepath)
    };
    let mut url = join_url(&dir, &reference.id);
    if fetch_gzip {
        url.push_str(".gz");
    }
    trace!(url = %url, "Fetching array");

    let bytes = fetcher.fetch(&url).await?;
    let bytes = if fetch_gzip { gunzip(&bytes)? } else { bytes };
    let values = desc.data_type.decode_le(&bytes).map_err(|e| match e {
        Error::Parse { reason, .. } => Error::parse(url.as_str(), reason),
        other => other,
    })?;
    finish_array(source_name, desc, values)
}
