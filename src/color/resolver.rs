//! Scalar field selection and lookup table construction.

use colormaps::{default_preset, preset_by_name, ColorTransferFunction, Preset};
use tracing::{debug, warn};

use crate::data::PolyData;
use crate::scene::{ColorMode, Mapper, RenderableUnit, ScalarMode};
use crate::util::Error;

/// Range used when an array has no finite value.
const FALLBACK_RANGE: [f64; 2] = [0.0, 1.0];

/// Color parameters derived from a dataset's scalar fields.
#[derive(Clone, Debug, PartialEq)]
pub struct ColorMapping {
    /// Array colored by name; `None` means the active scalars.
    pub scalar_array_name: Option<String>,
    pub color_mode: ColorMode,
    pub scalar_mode: ScalarMode,
    pub lookup_table: ColorTransferFunction,
    pub range: [f64; 2],
}

impl ColorMapping {
    /// Zero-width range: valid but maps everything to one color.
    pub fn is_degenerate(&self) -> bool {
        self.range[0] == self.range[1]
    }

    /// Write the table and mode flags into a mapper.
    pub fn apply(&self, mapper: &mut Mapper) {
        mapper.color_mode = self.color_mode;
        mapper.scalar_mode = self.scalar_mode;
        mapper.color_by_array_name = self.scalar_array_name.clone();
        mapper.lookup_table = Some(self.lookup_table.clone());
        mapper.interpolate_scalars_before_mapping = false;
        mapper.use_lookup_table_scalar_range = true;
        mapper.scalar_visibility = true;
    }
}

/// Outcome of scalar resolution.
#[derive(Debug)]
pub enum Coloring {
    Colored(ColorMapping),
    /// Nothing to color by; the unit renders uncolored.
    Uncolored(Error),
}

impl Coloring {
    pub fn is_colored(&self) -> bool {
        matches!(self, Self::Colored(_))
    }

    pub fn mapping(&self) -> Option<&ColorMapping> {
        match self {
            Self::Colored(m) => Some(m),
            Self::Uncolored(_) => None,
        }
    }
}

/// Chooses what colors a unit and builds its lookup table.
#[derive(Clone, Debug)]
pub struct ScalarResolver {
    preset: &'static Preset,
}

impl ScalarResolver {
    /// Resolver using the named preset, falling back to the default preset.
    pub fn new(preset_name: &str) -> Self {
        let preset = preset_by_name(preset_name).unwrap_or_else(|| {
            warn!(preset = preset_name, fallback = default_preset().name, "Unknown color preset");
            default_preset()
        });
        Self { preset }
    }

    pub fn preset_name(&self) -> &'static str {
        self.preset.name
    }

    /// Pick the scalar field of `data` and build its mapping.
    pub fn resolve(&self, data: &PolyData) -> Coloring {
        let point_data = &data.point_data;

        let (array, scalar_array_name, color_mode, scalar_mode) = match point_data.scalars() {
            Some(active) => (active, None, ColorMode::Default, ScalarMode::Default),
            None => {
                debug!("No active scalars, falling back to first point-data array");
                let Some(first) = point_data.array(0) else {
                    let reason = Error::MissingScalarData;
                    warn!(error = %reason, "Unit left uncolored");
                    return Coloring::Uncolored(reason);
                };
                (
                    first,
                    Some(first.name.clone()),
                    ColorMode::MapScalars,
                    ScalarMode::UsePointFieldData,
                )
            }
        };

        let range = array.range().unwrap_or(FALLBACK_RANGE);
        if range[0] == range[1] {
            let reason = Error::DegenerateRange { value: range[0] };
            warn!(array = %array.name, error = %reason, "Flat color mapping");
        }

        let mut lookup_table = ColorTransferFunction::from_preset(self.preset);
        lookup_table.set_mapping_range(range[0], range[1]);

        Coloring::Colored(ColorMapping {
            scalar_array_name,
            color_mode,
            scalar_mode,
            lookup_table,
            range,
        })
    }

    /// Resolve against the unit's bound dataset and apply the result.
    pub fn apply(&self, unit: &mut RenderableUnit) -> Coloring {
        let coloring = match unit.mapper.input() {
            Some(dataset) => self.resolve(dataset.data()),
            None => {
                let reason = Error::MissingScalarData;
                warn!(unit = unit.name(), error = %reason, "Unit has no bound dataset");
                Coloring::Uncolored(reason)
            }
        };
        if let Coloring::Colored(mapping) = &coloring {
            mapping.apply(&mut unit.mapper);
        }
        coloring
    }
}

impl Default for ScalarResolver {
    fn default() -> Self {
        Self { preset: default_preset() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{DataArray, Dataset};

    fn with_arrays(arrays: Vec<DataArray>, active: Option<usize>) -> PolyData {
        let mut pd = PolyData::new();
        for a in arrays {
            pd.point_data.add_array(a);
        }
        pd.point_data.set_active_scalars(active);
        pd
    }

    #[test]
    fn test_active_scalars_use_own_range() {
        let pd = with_arrays(
            vec![
                DataArray::scalars("other", vec![-100.0, 100.0]),
                DataArray::scalars("temp", vec![2.0, 9.0, 4.0]),
            ],
            Some(1),
        );
        let mapping = ScalarResolver::default().resolve(&pd);
        let mapping = mapping.mapping().unwrap();
        assert_eq!(mapping.range, [2.0, 9.0]);
        assert_eq!(mapping.scalar_array_name, None);
        assert_eq!(mapping.color_mode, ColorMode::Default);
        assert_eq!(mapping.scalar_mode, ScalarMode::Default);
        assert_eq!(mapping.lookup_table.range(), [2.0, 9.0]);
    }

    #[test]
    fn test_fallback_to_first_array() {
        let pd = with_arrays(
            vec![
                DataArray::scalars("pressure", vec![1.0, 3.0]),
                DataArray::scalars("temp", vec![5.0]),
            ],
            None,
        );
        let coloring = ScalarResolver::default().resolve(&pd);
        let mapping = coloring.mapping().unwrap();
        assert_eq!(mapping.scalar_array_name.as_deref(), Some("pressure"));
        assert_eq!(mapping.color_mode, ColorMode::MapScalars);
        assert_eq!(mapping.scalar_mode, ScalarMode::UsePointFieldData);
        assert_eq!(mapping.range, [1.0, 3.0]);
    }

    #[test]
    fn test_no_arrays_is_uncolored() {
        let coloring = ScalarResolver::default().resolve(&PolyData::new());
        assert!(matches!(coloring, Coloring::Uncolored(Error::MissingScalarData)));
    }

    #[test]
    fn test_degenerate_range_still_colors() {
        let pd = with_arrays(vec![DataArray::scalars("c", vec![4.0, 4.0])], Some(0));
        let coloring = ScalarResolver::default().resolve(&pd);
        let mapping = coloring.mapping().unwrap();
        assert!(mapping.is_degenerate());
        assert_eq!(mapping.range, [4.0, 4.0]);
    }

    #[test]
    fn test_apply_sets_mapper_flags() {
        let pd = with_arrays(vec![DataArray::scalars("p", vec![0.0, 1.0])], None);
        let mut unit = RenderableUnit::with_dataset("u", Dataset::new("u", pd));
        let coloring = ScalarResolver::default().apply(&mut unit);
        assert!(coloring.is_colored());
        assert!(unit.mapper.lookup_table.is_some());
        assert!(unit.mapper.use_lookup_table_scalar_range);
        assert!(!unit.mapper.interpolate_scalars_before_mapping);
        assert_eq!(unit.mapper.color_by_array_name.as_deref(), Some("p"));
    }

    #[test]
    fn test_apply_without_input() {
        let mut unit = RenderableUnit::new("empty");
        let coloring = ScalarResolver::default().apply(&mut unit);
        assert!(!coloring.is_colored());
        assert!(unit.mapper.lookup_table.is_none());
    }

    #[test]
    fn test_unknown_preset_falls_back() {
        assert_eq!(ScalarResolver::new("Nope").preset_name(), "Cool to Warm");
        assert_eq!(ScalarResolver::new("Grayscale").preset_name(), "Grayscale");
    }
}
