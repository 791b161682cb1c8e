//! Frame-driven recomputation through a clock.

mod common;

use std::time::{Duration, Instant};

use common::fixtures::{gradient, incoming};
use common::TestPipeline;
use dither_live::models::ParamField;
use dither_live::services::{ChangeKind, ImmediateClock, IntervalClock};
use pretty_assertions::assert_eq;

#[tokio::test]
async fn test_changes_between_ticks_coalesce() {
    let mut app = TestPipeline::new();
    let mut clock = ImmediateClock;
    app.session.load_image(incoming(gradient(6, 6))).await.unwrap();

    for contrast in ["120", "140", "160"] {
        app.session
            .set_param(ParamField::Contrast, contrast, ChangeKind::Input);
    }
    app.session.rotate_right();

    assert!(app.session.next_frame(&mut clock).await.unwrap());
    assert!(!app.session.next_frame(&mut clock).await.unwrap());

    let scheduler = app.session.scheduler();
    assert_eq!(scheduler.requests(), 5);
    assert_eq!(scheduler.runs(), 1);
    assert_eq!(app.transform.call_count(), 1);
    assert_eq!(app.transform.calls()[0].args.contrast, 160.0);
}

#[tokio::test]
async fn test_idle_ticks_do_not_recompute() {
    let mut app = TestPipeline::new();
    let mut clock = IntervalClock::from_millis(2);
    app.session.load_image(incoming(gradient(4, 4))).await.unwrap();
    app.session.next_frame(&mut clock).await.unwrap();

    for _ in 0..3 {
        assert!(!app.session.next_frame(&mut clock).await.unwrap());
    }
    app.session.view_mut().zoom_in();
    assert!(!app.session.next_frame(&mut clock).await.unwrap());
    assert_eq!(app.transform.call_count(), 1);
}

#[tokio::test]
async fn test_interval_clock_paces_frames() {
    let mut app = TestPipeline::new();
    app.session.load_image(incoming(gradient(4, 4))).await.unwrap();

    // first tick of a tokio interval completes immediately
    let start = Instant::now();
    let mut clock = IntervalClock::from_millis(5);
    let mut ran = 0;
    for threshold in ["10", "20", "30"] {
        app.session
            .set_param(ParamField::Threshold, threshold, ChangeKind::Commit);
        if app.session.next_frame(&mut clock).await.unwrap() {
            ran += 1;
        }
    }
    assert!(start.elapsed() >= Duration::from_millis(9));
    assert_eq!(ran, 3);
    assert_eq!(app.transform.calls().last().unwrap().args.threshold, 30);
}

#[tokio::test]
async fn test_failed_frame_does_not_stick() {
    let mut app = TestPipeline::new();
    let mut clock = ImmediateClock;

    // nothing loaded yet: the frame errors but the request is consumed
    app.session
        .set_param(ParamField::Blur, "4", ChangeKind::Commit);
    assert!(app.session.next_frame(&mut clock).await.is_err());
    assert!(!app.session.scheduler().is_scheduled());

    app.session.load_image(incoming(gradient(3, 3))).await.unwrap();
    assert!(app.session.next_frame(&mut clock).await.unwrap());
    assert_eq!(app.transform.calls()[0].args.blur, 4);
}
