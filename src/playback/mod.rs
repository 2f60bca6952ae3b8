//! Animation playback.
//!
//! A [`Playback`] cycles a [`FrameSource`] on a fixed period. Two sources
//! exist: [`SequenceFrames`] swaps pre-loaded datasets, [`TimeStepFrames`]
//! re-binds a series reader to a timestep.

mod driver;
mod frames;

pub use driver::{Playback, PlaybackState, MIN_INTERVAL};
pub use frames::{FrameSource, SequenceFrames, TimeStepFrames};
