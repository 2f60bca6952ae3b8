//! Frame sources driven by playback.

use std::rc::Rc;

use futures_util::future::{self, LocalBoxFuture};
use futures_util::FutureExt;

use crate::data::DatasetSequence;
use crate::io::SeriesReader;
use crate::scene::UnitRef;
use crate::util::{Error, Result};

/// Something that can swap a unit to frame `index`.
pub trait FrameSource {
    fn frame_count(&self) -> usize;

    fn show_frame(&self, index: usize) -> LocalBoxFuture<'_, Result<()>>;
}

/// Frames from a pre-materialized dataset sequence.
pub struct SequenceFrames {
    unit: UnitRef,
    sequence: Rc<DatasetSequence>,
}

impl SequenceFrames {
    pub fn new(unit: UnitRef, sequence: Rc<DatasetSequence>) -> Self {
        Self { unit, sequence }
    }
}

impl FrameSource for SequenceFrames {
    fn frame_count(&self) -> usize {
        self.sequence.len()
    }

    fn show_frame(&self, index: usize) -> LocalBoxFuture<'_, Result<()>> {
        let result = match self.sequence.get(index) {
            Some(dataset) => {
                self.unit.borrow_mut().set_visible_dataset(dataset.clone());
                Ok(())
            }
            None => Err(Error::other(format!("frame {} out of range", index))),
        };
        future::ready(result).boxed_local()
    }
}

/// Frames re-bound through a timestep reader.
pub struct TimeStepFrames {
    unit: UnitRef,
    reader: Rc<SeriesReader>,
}

impl TimeStepFrames {
    pub fn new(unit: UnitRef, reader: Rc<SeriesReader>) -> Self {
        Self { unit, reader }
    }
}

impl FrameSource for TimeStepFrames {
    fn frame_count(&self) -> usize {
        self.reader.len()
    }

    fn show_frame(&self, index: usize) -> LocalBoxFuture<'_, Result<()>> {
        async move {
            let dataset = self.reader.update_time_step(index).await?;
            self.unit.borrow_mut().set_visible_dataset(dataset);
            Ok(())
        }
        .boxed_local()
    }
}
