//! Polygonal geometry and time-tagged datasets.

use std::rc::Rc;

use glam::Vec3;

use super::array::DataSetAttributes;
use crate::util::Bounds;

/// Field-data array holding the simulation time of a dataset.
pub const TIME_VALUE_ARRAY: &str = "TimeValue";

/// Polygonal geometry with attached attributes.
///
/// `polys` uses the flat cell-array layout `[n, i0, .., i(n-1), n, ...]`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PolyData {
    pub points: Vec<Vec3>,
    pub polys: Vec<u32>,
    pub point_data: DataSetAttributes,
    pub cell_data: DataSetAttributes,
    pub field_data: DataSetAttributes,
}

impl PolyData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn number_of_points(&self) -> usize {
        self.points.len()
    }

    /// Count polygons by walking the cell array.
    pub fn number_of_cells(&self) -> usize {
        let mut count = 0;
        let mut i = 0;
        while i < self.polys.len() {
            i += self.polys[i] as usize + 1;
            count += 1;
        }
        count
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::from_points(&self.points)
    }

    /// First value of the `TimeValue` field-data array, if present and finite.
    pub fn time_value(&self) -> Option<f64> {
        self.field_data
            .array_by_name(TIME_VALUE_ARRAY)
            .and_then(|a| a.values.first().copied())
            .filter(|t| t.is_finite())
    }
}

/// One loaded geometry payload plus extracted metadata.
///
/// Cheap to clone; the geometry is shared.
#[derive(Clone, Debug)]
pub struct Dataset {
    source: String,
    data: Rc<PolyData>,
    time_value: Option<f64>,
}

impl Dataset {
    /// Wrap geometry loaded from `source`, extracting its time value.
    pub fn new(source: impl Into<String>, data: PolyData) -> Self {
        let time_value = data.time_value();
        Self {
            source: source.into(),
            data: Rc::new(data),
            time_value,
        }
    }

    /// URL or path this dataset was loaded from.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn data(&self) -> &PolyData {
        &self.data
    }

    pub fn time_value(&self) -> Option<f64> {
        self.time_value
    }

    /// Whether both handles share the same geometry.
    pub fn same_data(&self, other: &Dataset) -> bool {
        Rc::ptr_eq(&self.data, &other.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DataArray;

    #[test]
    fn test_cell_count() {
        let mut pd = PolyData::new();
        pd.points = vec![Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::Z];
        pd.polys = vec![3, 0, 1, 2, 4, 0, 1, 2, 3];
        assert_eq!(pd.number_of_cells(), 2);
    }

    #[test]
    fn test_time_value_extraction() {
        let mut pd = PolyData::new();
        pd.field_data.add_array(DataArray::scalars(TIME_VALUE_ARRAY, vec![12.5]));
        let ds = Dataset::new("t.vtp", pd);
        assert_eq!(ds.time_value(), Some(12.5));
    }

    #[test]
    fn test_nan_time_value_is_absent() {
        let mut pd = PolyData::new();
        pd.field_data.add_array(DataArray::scalars(TIME_VALUE_ARRAY, vec![f64::NAN]));
        assert_eq!(Dataset::new("n", pd).time_value(), None);
    }

    #[test]
    fn test_missing_time_value() {
        let ds = Dataset::new("static.vtp", PolyData::new());
        assert_eq!(ds.time_value(), None);
        assert!(ds.same_data(&ds.clone()));
    }
}
