//! Load orchestration: descriptor in, mounted units out.
//!
//! [`Orchestrator::load`] runs the loader for a descriptor, colors the
//! resulting unit, places it in the view with its legend and starts
//! playback when the source has frames. The returned [`Mounted`] handle owns
//! the playback and is the only way to take the units back out.

use std::rc::Rc;
use std::time::Duration;

use tracing::{debug, error, info, info_span, Instrument};

use crate::color::ScalarResolver;
use crate::io::{Fetcher, GeometryReader, MeshFormat, PolicyFetcher, ReaderSet};
use crate::loader::{
    Frames, LoadContext, LoadOutcome, LoaderRegistry, SourceDescriptor, SourceLoader,
};
use crate::playback::{FrameSource, Playback, SequenceFrames, TimeStepFrames};
use crate::scene::{ScalarBar, UnitId, UnitRef, ViewRef};
use crate::settings::Settings;
use crate::util::Result;

/// Units placed in a view by one load, plus their playback.
#[derive(Debug, Default)]
pub struct Mounted {
    units: Vec<UnitRef>,
    scalar_bars: Vec<UnitId>,
    playback: Option<Playback>,
}

impl Mounted {
    pub fn units(&self) -> &[UnitRef] {
        &self.units
    }

    /// The single unit of a non-scene load.
    pub fn unit(&self) -> Option<&UnitRef> {
        self.units.first()
    }

    pub fn scalar_bars(&self) -> &[UnitId] {
        &self.scalar_bars
    }

    pub fn playback(&self) -> Option<&Playback> {
        self.playback.as_ref()
    }

    pub fn playback_mut(&mut self) -> Option<&mut Playback> {
        self.playback.as_mut()
    }
}

/// Drives loads against one view.
pub struct Orchestrator {
    cx: LoadContext,
    registry: LoaderRegistry,
    interval: Duration,
}

impl Orchestrator {
    /// Orchestrator for `view`, fetching through `fetcher` with the
    /// settings' fetch policy.
    pub fn new(view: ViewRef, fetcher: Rc<dyn Fetcher>, settings: &Settings) -> Self {
        let fetcher: Rc<dyn Fetcher> =
            Rc::new(PolicyFetcher::new(fetcher, settings.fetch_policy()));
        Self {
            cx: LoadContext {
                fetcher,
                readers: ReaderSet::new(),
                view,
                resolver: ScalarResolver::new(&settings.color_preset),
                fetch_gzip: settings.fetch_gzip,
            },
            registry: LoaderRegistry::new(),
            interval: settings.playback_interval(),
        }
    }

    /// Register the toolkit reader for a mesh format.
    pub fn with_reader(mut self, format: MeshFormat, reader: Rc<dyn GeometryReader>) -> Self {
        self.cx.readers.register(format, reader);
        self
    }

    pub fn with_registry(mut self, registry: LoaderRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Replace the loader for one kind.
    pub fn with_loader(mut self, loader: impl SourceLoader + 'static) -> Self {
        self.registry.register(loader);
        self
    }

    pub fn view(&self) -> &ViewRef {
        &self.cx.view
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Load a source into the view.
    ///
    /// `on_frame` runs after each playback frame is shown and redrawn. On
    /// error nothing is added to the view.
    pub async fn load(
        &self,
        source: &SourceDescriptor,
        on_frame: impl FnMut(usize) + 'static,
    ) -> Result<Mounted> {
        let span = info_span!("load", kind = %source.kind);
        let result = self.load_inner(source, on_frame).instrument(span).await;
        if let Err(e) = &result {
            error!(kind = %source.kind, urls = ?source.location.urls(), error = %e, "Load failed");
        }
        result
    }

    /// [`Self::load`] with the error logged and dropped.
    pub async fn mount(
        &self,
        source: &SourceDescriptor,
        on_frame: impl FnMut(usize) + 'static,
    ) -> Option<Mounted> {
        self.load(source, on_frame).await.ok()
    }

    async fn load_inner(
        &self,
        source: &SourceDescriptor,
        on_frame: impl FnMut(usize) + 'static,
    ) -> Result<Mounted> {
        let outcome = self.registry.load(&self.cx, source).await?;

        let mounted = match outcome {
            LoadOutcome::Scene(summary) => Mounted {
                units: summary.units,
                ..Mounted::default()
            },
            LoadOutcome::Unit { unit, frames } => {
                let coloring = self.cx.resolver.apply(&mut unit.borrow_mut());
                let bar = if coloring.is_colored() {
                    ScalarBar::for_unit(&unit.borrow())
                } else {
                    None
                };

                let mut scalar_bars = Vec::new();
                {
                    let mut view = self.cx.view.borrow_mut();
                    view.add_unit(unit.clone());
                    if let Some(bar) = bar {
                        scalar_bars.push(bar.id());
                        view.add_scalar_bar(bar);
                    }
                }

                let playback = self.start_playback(&unit, frames, on_frame);
                Mounted { units: vec![unit], scalar_bars, playback }
            }
        };

        {
            let mut view = self.cx.view.borrow_mut();
            view.reset_camera();
            view.render();
        }
        info!(units = mounted.units.len(), animated = mounted.playback.is_some(), "Load complete");
        Ok(mounted)
    }

    fn start_playback(
        &self,
        unit: &UnitRef,
        frames: Frames,
        mut on_frame: impl FnMut(usize) + 'static,
    ) -> Option<Playback> {
        if frames.is_empty() {
            return None;
        }
        let source: Rc<dyn FrameSource> = match frames {
            Frames::Unsequenced => return None,
            Frames::Sequence(sequence) => Rc::new(SequenceFrames::new(unit.clone(), sequence)),
            Frames::TimeSteps { reader, .. } => Rc::new(TimeStepFrames::new(unit.clone(), reader)),
        };

        let view = self.cx.view.clone();
        let mut playback = Playback::new(source, self.interval);
        let started = playback.start(move |cursor| {
            {
                let mut view = view.borrow_mut();
                view.reset_camera();
                view.render();
            }
            on_frame(cursor);
        });
        started.then_some(playback)
    }

    /// Stop playback and take the mounted units and legends out of the view.
    pub fn teardown(&self, mut mounted: Mounted) {
        if let Some(playback) = mounted.playback.as_mut() {
            playback.stop();
        }
        let mut view = self.cx.view.borrow_mut();
        for unit in &mounted.units {
            view.remove_unit(unit.borrow().id());
        }
        for id in &mounted.scalar_bars {
            view.remove_scalar_bar(*id);
        }
        view.render();
        debug!(units = mounted.units.len(), "Unmounted");
    }
}
