//! Scalar bar legends.

use colormaps::ColorTransferFunction;
use tracing::warn;

use super::unit::{RenderableUnit, UnitId};

/// Legend showing the lookup table of a colored unit.
#[derive(Clone, Debug)]
pub struct ScalarBar {
    id: UnitId,
    /// Unit this legend describes.
    pub target: UnitId,
    pub title: String,
    pub lookup_table: ColorTransferFunction,
}

impl ScalarBar {
    /// Build a legend from a unit's lookup table.
    ///
    /// Returns `None` (and warns) when the unit has no lookup table.
    pub fn for_unit(unit: &RenderableUnit) -> Option<Self> {
        let Some(lookup_table) = unit.mapper.lookup_table.clone() else {
            warn!(unit = unit.name(), "No lookup table when creating scalar bar");
            return None;
        };
        let title = unit
            .mapper
            .color_by_array_name
            .clone()
            .or_else(|| {
                unit.mapper
                    .input()
                    .and_then(|d| d.data().point_data.scalars())
                    .map(|a| a.name.clone())
            })
            .unwrap_or_default();
        Some(Self {
            id: UnitId::next(),
            target: unit.id(),
            title,
            lookup_table,
        })
    }

    pub fn id(&self) -> UnitId {
        self.id
    }
}
