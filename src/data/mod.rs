//! Dataset model.
//!
//! This module provides:
//! - [`DataArray`] / [`DataSetAttributes`] - Named scalar fields
//! - [`PolyData`] - Polygonal geometry
//! - [`Dataset`] - Geometry tagged with an optional time value
//! - [`DatasetSequence`] - Time-ordered datasets driving animation

mod array;
mod dataset;
mod sequence;

pub use array::{DataArray, DataSetAttributes, DataType};
pub use dataset::{Dataset, PolyData, TIME_VALUE_ARRAY};
pub use sequence::DatasetSequence;
