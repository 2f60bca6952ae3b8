//! Periodic frame advance.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info_span, warn, Instrument};

use super::frames::FrameSource;

static NEXT_PLAYBACK_ID: AtomicU64 = AtomicU64::new(1);

/// Shortest period a timer will run at; the tick interval must be non-zero.
pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Lifecycle of a [`Playback`]. `Stopped` is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Running,
    Stopped,
}

/// Cycles a frame source on a fixed period.
///
/// The timer runs as a local task on the current thread's `LocalSet`.
/// Stopping (or dropping) the handle aborts it.
pub struct Playback {
    id: u64,
    interval: Duration,
    state: PlaybackState,
    source: Rc<dyn FrameSource>,
    cursor: Rc<Cell<usize>>,
    task: Option<JoinHandle<()>>,
}

impl Playback {
    /// Idle handle over `source`. Periods below [`MIN_INTERVAL`] are raised to it.
    pub fn new(source: Rc<dyn FrameSource>, interval: Duration) -> Self {
        Self {
            id: NEXT_PLAYBACK_ID.fetch_add(1, Ordering::Relaxed),
            interval: interval.max(MIN_INTERVAL),
            state: PlaybackState::Idle,
            source,
            cursor: Rc::new(Cell::new(0)),
            task: None,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Index of the frame currently shown.
    pub fn cursor(&self) -> usize {
        self.cursor.get()
    }

    pub fn frame_count(&self) -> usize {
        self.source.frame_count()
    }

    /// Start advancing one frame per period, first tick one period from now.
    ///
    /// `on_frame` runs after each successful swap. Returns `false` when the
    /// handle is not idle or the source has no frames. Must be called within
    /// a `LocalSet`.
    pub fn start(&mut self, on_frame: impl FnMut(usize) + 'static) -> bool {
        if self.state != PlaybackState::Idle {
            warn!(playback = self.id, state = ?self.state, "Playback already started");
            return false;
        }
        let len = self.source.frame_count();
        if len == 0 {
            debug!(playback = self.id, "Nothing to play");
            return false;
        }

        let source = self.source.clone();
        let cursor = self.cursor.clone();
        let period = self.interval;
        let mut on_frame = on_frame;
        let span = info_span!("playback", id = self.id, frames = len);
        let task = tokio::task::spawn_local(
            async move {
                let mut ticker = interval_at(Instant::now() + period, period);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
                loop {
                    ticker.tick().await;
                    let next = (cursor.get() + 1) % len;
                    cursor.set(next);
                    match source.show_frame(next).await {
                        Ok(()) => on_frame(next),
                        Err(e) => warn!(cursor = next, error = %e, "Frame swap failed"),
                    }
                }
            }
            .instrument(span),
        );

        debug!(
            playback = self.id,
            frames = len,
            interval_ms = period.as_millis() as u64,
            "Playback started"
        );
        self.task = Some(task);
        self.state = PlaybackState::Running;
        true
    }

    /// Stop the timer. Idempotent, also valid before `start`.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            debug!(playback = self.id, cursor = self.cursor.get(), "Playback stopped");
        }
        self.state = PlaybackState::Stopped;
    }
}

impl Drop for Playback {
    fn drop(&mut self) {
        self.stop();
    }
}

impl fmt::Debug for Playback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Playback")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("interval", &self.interval)
            .field("cursor", &self.cursor.get())
            .field("frames", &self.source.frame_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::Result;
    use futures_util::future::{self, LocalBoxFuture};
    use futures_util::FutureExt;
    use std::cell::RefCell;
    use tokio::task::LocalSet;

    struct Counter {
        frames: usize,
        shown: RefCell<Vec<usize>>,
    }

    impl FrameSource for Counter {
        fn frame_count(&self) -> usize {
            self.frames
        }

        fn show_frame(&self, index: usize) -> LocalBoxFuture<'_, Result<()>> {
            self.shown.borrow_mut().push(index);
            future::ready(Ok(())).boxed_local()
        }
    }

    fn counter(frames: usize) -> Rc<Counter> {
        Rc::new(Counter { frames, shown: RefCell::new(Vec::new()) })
    }

    #[tokio::test(start_paused = true)]
    async fn test_cycles_back_to_start() {
        LocalSet::new()
            .run_until(async {
                let source = counter(4);
                let mut playback = Playback::new(source.clone(), Duration::from_millis(100));
                assert!(playback.start(|_| {}));
                assert_eq!(playback.state(), PlaybackState::Running);

                tokio::time::sleep(Duration::from_millis(410)).await;
                assert_eq!(*source.shown.borrow(), vec![1, 2, 3, 0]);
                assert_eq!(playback.cursor(), 0);
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_interval_clamped() {
        LocalSet::new()
            .run_until(async {
                let source = counter(2);
                let mut playback = Playback::new(source.clone(), Duration::ZERO);
                assert_eq!(playback.interval(), MIN_INTERVAL);
                assert!(playback.start(|_| {}));
                tokio::time::sleep(Duration::from_millis(10)).await;
                let shown = source.shown.borrow();
                assert!(shown.len() >= 2);
                assert_eq!(shown[..2], [1, 0]);
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_tick_after_one_period() {
        LocalSet::new()
            .run_until(async {
                let source = counter(3);
                let mut playback = Playback::new(source.clone(), Duration::from_millis(300));
                playback.start(|_| {});
                tokio::time::sleep(Duration::from_millis(290)).await;
                assert!(source.shown.borrow().is_empty());
                tokio::time::sleep(Duration::from_millis(20)).await;
                assert_eq!(*source.shown.borrow(), vec![1]);
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_is_idempotent() {
        LocalSet::new()
            .run_until(async {
                let source = counter(2);
                let mut playback = Playback::new(source.clone(), Duration::from_millis(50));
                playback.start(|_| {});
                playback.stop();
                playback.stop();
                assert_eq!(playback.state(), PlaybackState::Stopped);
                assert!(!playback.start(|_| {}));

                tokio::time::sleep(Duration::from_millis(200)).await;
                assert!(source.shown.borrow().is_empty());
            })
            .await;
    }

    #[test]
    fn test_stop_before_start() {
        let mut playback = Playback::new(counter(2), Duration::from_millis(50));
        playback.stop();
        assert_eq!(playback.state(), PlaybackState::Stopped);
    }

    #[test]
    fn test_empty_source_never_starts() {
        let mut playback = Playback::new(counter(0), Duration::from_millis(50));
        assert!(!playback.start(|_| {}));
        assert_eq!(playback.state(), PlaybackState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_handles_are_isolated() {
        LocalSet::new()
            .run_until(async {
                let a = counter(5);
                let b = counter(5);
                let mut pa = Playback::new(a.clone(), Duration::from_millis(100));
                let mut pb = Playback::new(b.clone(), Duration::from_millis(100));
                assert_ne!(pa.id(), pb.id());
                pa.start(|_| {});
                pb.start(|_| {});

                tokio::time::sleep(Duration::from_millis(150)).await;
                pa.stop();
                tokio::time::sleep(Duration::from_millis(200)).await;

                assert_eq!(pa.cursor(), 1);
                assert_eq!(pb.cursor(), 3);
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_on_frame_sees_cursor() {
        LocalSet::new()
            .run_until(async {
                let seen = Rc::new(RefCell::new(Vec::new()));
                let sink = seen.clone();
                let mut playback = Playback::new(counter(2), Duration::from_millis(100));
                playback.start(move |i| sink.borrow_mut().push(i));
                tokio::time::sleep(Duration::from_millis(250)).await;
                assert_eq!(*seen.borrow(), vec![1, 0]);
            })
            .await;
    }
}
