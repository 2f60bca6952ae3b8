//! Timed playback of loaded series on a paused clock.

mod common;

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use common::{add_series, local, Fixture};
use sciview::loader::{SourceDescriptor, SourceKind};
use sciview::playback::PlaybackState;
use sciview::Settings;

fn frame_log() -> (Rc<RefCell<Vec<usize>>>, impl FnMut(usize) + 'static) {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = log.clone();
    (log, move |cursor| sink.borrow_mut().push(cursor))
}

/// Let local tasks woken at the current instant run without moving the clock.
async fn settle() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test(start_paused = true)]
async fn test_compressed_series_cycles_back_to_start() {
    let fx = Fixture::new();
    add_series(&fx.fetcher, "http://h/wave", &[0.1, 0.0, 0.2]);

    local(async {
        let (log, on_frame) = frame_log();
        let source = SourceDescriptor::single(SourceKind::RemoteCompressedSeries, "http://h/wave");
        let mounted = fx.orchestrator().load(&source, on_frame).await.unwrap();

        let playback = mounted.playback().unwrap();
        assert_eq!(playback.frame_count(), 3);
        assert_eq!(playback.interval(), Duration::from_millis(300));
        let unit = mounted.unit().unwrap().clone();
        assert_eq!(unit.borrow().mapper.input().unwrap().time_value(), Some(0.0));

        // Third tick is due in the same instant; let it run
        tokio::time::sleep(Duration::from_millis(900)).await;
        settle().await;

        assert_eq!(*log.borrow(), vec![1, 2, 0]);
        assert_eq!(mounted.playback().unwrap().cursor(), 0);
        assert_eq!(unit.borrow().mapper.input().unwrap().time_value(), Some(0.0));
    })
    .await;
}

#[tokio::test(start_paused = true)]
async fn test_timesteps_fetched_once() {
    let fx = Fixture::new();
    add_series(&fx.fetcher, "http://h/wave", &[0.0, 0.1]);

    local(async {
        let source = SourceDescriptor::single(SourceKind::RemoteCompressedSeries, "http://h/wave");
        let _mounted = fx.orchestrator().load(&source, |_| {}).await.unwrap();

        // Two full cycles
        tokio::time::sleep(Duration::from_millis(1250)).await;
        let index_fetches = fx
            .fetcher
            .requests()
            .iter()
            .filter(|u| u.ends_with("step1/index.json"))
            .count();
        assert_eq!(index_fetches, 1);
    })
    .await;
}

#[tokio::test(start_paused = true)]
async fn test_each_frame_redraws() {
    let fx = Fixture::new();
    add_series(&fx.fetcher, "http://h/wave", &[0.0, 0.1, 0.2, 0.3]);
    let settings = Settings { playback_interval_ms: 100, ..Settings::default() };

    local(async {
        let source = SourceDescriptor::single(SourceKind::RemoteCompressedSeries, "http://h/wave");
        let _mounted = fx.orchestrator_with(&settings).load(&source, |_| {}).await.unwrap();
        let rendered = fx.view.borrow().frames_rendered();
        let resets = fx.view.borrow().camera_resets();

        tokio::time::sleep(Duration::from_millis(350)).await;
        assert_eq!(fx.view.borrow().frames_rendered(), rendered + 3);
        assert_eq!(fx.view.borrow().camera_resets(), resets + 3);
    })
    .await;
}

#[tokio::test(start_paused = true)]
async fn test_teardown_stops_playback() {
    let fx = Fixture::new();
    add_series(&fx.fetcher, "http://h/wave", &[0.0, 0.1, 0.2]);
    let orchestrator = fx.orchestrator();

    local(async {
        let (log, on_frame) = frame_log();
        let source = SourceDescriptor::single(SourceKind::RemoteCompressedSeries, "http://h/wave");
        let mounted = orchestrator.load(&source, on_frame).await.unwrap();

        tokio::time::sleep(Duration::from_millis(350)).await;
        assert_eq!(log.borrow().len(), 1);
        orchestrator.teardown(mounted);
        assert_eq!(fx.unit_count(), 0);

        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(log.borrow().len(), 1);
    })
    .await;
}

#[tokio::test(start_paused = true)]
async fn test_mounts_play_independently() {
    let fx = Fixture::new();
    add_series(&fx.fetcher, "http://h/a", &[0.0, 1.0, 2.0, 3.0]);
    add_series(&fx.fetcher, "http://h/b", &[0.0, 1.0, 2.0, 3.0]);
    let orchestrator = fx.orchestrator();

    local(async {
        let (log_a, on_a) = frame_log();
        let (log_b, on_b) = frame_log();
        let mut a = orchestrator
            .load(&SourceDescriptor::single(SourceKind::RemoteCompressedSeries, "http://h/a"), on_a)
            .await
            .unwrap();
        let b = orchestrator
            .load(&SourceDescriptor::single(SourceKind::RemoteCompressedSeries, "http://h/b"), on_b)
            .await
            .unwrap();
        assert_ne!(a.playback().unwrap().id(), b.playback().unwrap().id());

        tokio::time::sleep(Duration::from_millis(350)).await;
        let stopped = a.playback_mut().unwrap();
        stopped.stop();
        stopped.stop();
        assert_eq!(stopped.state(), PlaybackState::Stopped);

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(*log_a.borrow(), vec![1]);
        assert_eq!(*log_b.borrow(), vec![1, 2, 3]);
        assert_eq!(b.playback().unwrap().state(), PlaybackState::Running);
    })
    .await;
}

#[tokio::test(start_paused = true)]
async fn test_missing_timestep_keeps_playing() {
    let fx = Fixture::new();
    add_series(&fx.fetcher, "http://h/wave", &[0.0, 0.1, 0.2]);
    // Second timestep has a corrupt description
    fx.fetcher.insert("http://h/wave/step1/index.json", b"{ broken".to_vec());

    local(async {
        let (log, on_frame) = frame_log();
        let source = SourceDescriptor::single(SourceKind::RemoteCompressedSeries, "http://h/wave");
        let mounted = fx.orchestrator().load(&source, on_frame).await.unwrap();

        tokio::time::sleep(Duration::from_millis(910)).await;
        assert_eq!(*log.borrow(), vec![2, 0]);
        assert_eq!(mounted.playback().unwrap().cursor(), 0);
    })
    .await;
}
