//! Utility types shared across the crate.
//!
//! - [`Error`] / [`Result`] - Error handling
//! - [`Bounds`] - Axis-aligned bounding boxes for camera framing

mod bounds;
mod error;

pub use bounds::*;
pub use error::*;
