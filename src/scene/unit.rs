//! Renderable units and their geometry mapping.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use colormaps::ColorTransferFunction;
use serde::Deserialize;

use crate::data::Dataset;

static NEXT_UNIT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier of a unit or legend in a scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(u64);

impl UnitId {
    pub(crate) fn next() -> Self {
        Self(NEXT_UNIT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

/// How scalar values become colors.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "u8")]
pub enum ColorMode {
    /// Use unsigned-char scalars as colors, map everything else.
    #[default]
    Default,
    /// Always map scalars through the lookup table.
    MapScalars,
    /// Treat scalars as colors directly.
    DirectScalars,
}

impl TryFrom<u8> for ColorMode {
    type Error = String;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(Self::Default),
            1 => Ok(Self::MapScalars),
            2 => Ok(Self::DirectScalars),
            _ => Err(format!("unknown color mode {}", v)),
        }
    }
}

/// Where the mapper looks for the scalars to color by.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "u8")]
pub enum ScalarMode {
    /// Active point scalars, then active cell scalars.
    #[default]
    Default,
    UsePointData,
    UseCellData,
    /// Point array selected by name.
    UsePointFieldData,
    /// Cell array selected by name.
    UseCellFieldData,
    UseFieldData,
}

impl TryFrom<u8> for ScalarMode {
    type Error = String;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(Self::Default),
            1 => Ok(Self::UsePointData),
            2 => Ok(Self::UseCellData),
            3 => Ok(Self::UsePointFieldData),
            4 => Ok(Self::UseCellFieldData),
            5 => Ok(Self::UseFieldData),
            _ => Err(format!("unknown scalar mode {}", v)),
        }
    }
}

/// Binding between one dataset and its presentation parameters.
#[derive(Clone, Debug)]
pub struct Mapper {
    input: Option<Dataset>,
    pub color_mode: ColorMode,
    pub scalar_mode: ScalarMode,
    /// Array to color by; `None` means the active scalars.
    pub color_by_array_name: Option<String>,
    pub lookup_table: Option<ColorTransferFunction>,
    pub scalar_visibility: bool,
    pub use_lookup_table_scalar_range: bool,
    pub interpolate_scalars_before_mapping: bool,
}

impl Mapper {
    pub fn new() -> Self {
        Self {
            input: None,
            color_mode: ColorMode::Default,
            scalar_mode: ScalarMode::Default,
            color_by_array_name: None,
            lookup_table: None,
            scalar_visibility: true,
            use_lookup_table_scalar_range: false,
            interpolate_scalars_before_mapping: false,
        }
    }

    /// Bind a dataset as the visible geometry.
    pub fn set_input(&mut self, dataset: Dataset) {
        self.input = Some(dataset);
    }

    pub fn input(&self) -> Option<&Dataset> {
        self.input.as_ref()
    }

    pub fn has_input(&self) -> bool {
        self.input.is_some()
    }
}

impl Default for Mapper {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared handle to a unit; the scene holds clones of it.
pub type UnitRef = Rc<RefCell<RenderableUnit>>;

/// The atomic thing handed to a scene: exactly one mapper.
#[derive(Debug)]
pub struct RenderableUnit {
    id: UnitId,
    name: String,
    pub mapper: Mapper,
    pub visible: bool,
}

impl RenderableUnit {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: UnitId::next(),
            name: name.into(),
            mapper: Mapper::new(),
            visible: true,
        }
    }

    /// Create a unit already bound to a dataset.
    pub fn with_dataset(name: impl Into<String>, dataset: Dataset) -> Self {
        let mut unit = Self::new(name);
        unit.mapper.set_input(dataset);
        unit
    }

    pub fn into_ref(self) -> UnitRef {
        Rc::new(RefCell::new(self))
    }

    pub fn id(&self) -> UnitId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Swap the visible dataset.
    pub fn set_visible_dataset(&mut self, dataset: Dataset) {
        self.mapper.set_input(dataset);
    }
}
