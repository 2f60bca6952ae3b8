//! Scalar coloring.
//!
//! [`ScalarResolver`] picks the field a unit is colored by and builds a
//! lookup table from a [`colormaps`] preset over the field's range.

mod resolver;

pub use resolver::{ColorMapping, Coloring, ScalarResolver};
