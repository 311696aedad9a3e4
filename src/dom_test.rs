use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::*;
use crate::layout::ScalePolicy;
use crate::test_support::{FixedLayout, ManualFrames};

type TestStage = ScaleCoordinator<ManualFrames, FixedLayout>;
type Published = Rc<RefCell<Vec<f64>>>;

fn phone_stage(frames: &ManualFrames, published: &Published) -> TestStage {
    let sink = Rc::clone(published);
    ScaleCoordinator::new(
        ScalePolicy::default(),
        frames.clone(),
        FixedLayout::phone(),
        1.0,
        move |scale| sink.borrow_mut().push(scale),
    )
}

/// A `locate` that counts its calls.
fn locator(calls: &Cell<u32>, found: Option<u32>) -> impl FnOnce() -> Option<u32> + '_ {
    move || {
        calls.set(calls.get() + 1);
        found
    }
}

// --- px parsing ---

#[test]
fn parse_px_reads_computed_lengths() {
    assert_eq!(parse_px("12px"), 12.0);
    assert_eq!(parse_px(" 4.5px "), 4.5);
    assert_eq!(parse_px("0px"), 0.0);
}

#[test]
fn parse_px_rejects_garbage() {
    assert_eq!(parse_px(""), 0.0);
    assert_eq!(parse_px("auto"), 0.0);
    assert_eq!(parse_px("1em"), 0.0);
    assert_eq!(parse_px("infpx"), 0.0);
}

// --- observed box ---

#[test]
fn border_box_wins_for_the_placeholder() {
    use super::ObservedBox::{Border, Content};

    let border = Size::new(320.0, 62.0);
    let content = Size::new(300.0, 50.0);
    assert_eq!(entry_size(Border, Some(border), content), border);
    assert_eq!(entry_size(Border, None, content), content);
    assert_eq!(entry_size(Content, Some(border), content), content);
}

// --- appearance watch ---

#[test]
fn batches_without_insertions_skip_locate() {
    let calls = Cell::new(0);
    let fired = Cell::new(0);
    let mut on_found = Some(|_: u32| fired.set(fired.get() + 1));

    let step = appearance_step(false, locator(&calls, Some(7)), &mut on_found);
    assert_eq!(step, WatchStep::Ignored);
    assert!(!step.is_done());
    assert_eq!(calls.get(), 0);
    assert_eq!(fired.get(), 0);
}

#[test]
fn insertions_elsewhere_keep_waiting() {
    let calls = Cell::new(0);
    let fired = Cell::new(0);
    let mut on_found = Some(|_: u32| fired.set(fired.get() + 1));

    for _ in 0..3 {
        let step = appearance_step(true, locator(&calls, None), &mut on_found);
        assert_eq!(step, WatchStep::Waiting);
        assert!(!step.is_done());
    }
    assert_eq!(calls.get(), 3);
    assert_eq!(fired.get(), 0);
    assert!(on_found.is_some());
}

#[test]
fn first_match_fires_once_then_spent() {
    let calls = Cell::new(0);
    let seen = RefCell::new(Vec::new());
    let mut on_found = Some(|value: u32| seen.borrow_mut().push(value));

    let step = appearance_step(true, locator(&calls, Some(7)), &mut on_found);
    assert_eq!(step, WatchStep::Fired);
    assert!(step.is_done());

    let step = appearance_step(true, locator(&calls, Some(8)), &mut on_found);
    assert_eq!(step, WatchStep::Spent);
    assert!(step.is_done());
    let step = appearance_step(false, locator(&calls, Some(9)), &mut on_found);
    assert_eq!(step, WatchStep::Spent);

    assert_eq!(*seen.borrow(), vec![7]);
    assert_eq!(calls.get(), 1);
}

// --- placeholder plan ---

#[test]
fn placeholder_plan_covers_every_mount_state() {
    use super::PlaceholderPlan::{AwaitMount, Observe, Unavailable};

    assert_eq!(PlaceholderPlan::choose(true, true), Observe);
    assert_eq!(PlaceholderPlan::choose(true, false), Observe);
    assert_eq!(PlaceholderPlan::choose(false, true), AwaitMount);
    assert_eq!(PlaceholderPlan::choose(false, false), Unavailable);
}

#[test]
fn mount_after_teardown_is_ignored() {
    let frames = ManualFrames::default();
    let published = Published::default();
    let stage = phone_stage(&frames, &published);
    stage.content_resized(Size::new(360.0, 640.0));
    stage.teardown();

    let attached = Cell::new(false);
    let adopted = adopt_placeholder(&stage, || attached.set(true));
    assert!(adopted.is_none());
    assert!(!attached.get());
    assert!(!stage.readiness().placeholder);
    frames.run_frames(5);
    assert!(published.borrow().is_empty());
}

#[test]
fn late_mount_recomputes_exactly_once() {
    let frames = ManualFrames::default();
    let published = Published::default();
    let stage = phone_stage(&frames, &published);
    stage.content_resized(Size::new(360.0, 640.0));

    let mounted = Cell::new(false);
    let locate = || mounted.get().then_some(50.0);
    let mut on_found = Some(|height: f64| {
        adopt_placeholder(&stage, || stage.placeholder_resized(height));
    });

    // Other nodes land under the container before the ad slot does.
    for _ in 0..3 {
        let step = appearance_step(true, locate, &mut on_found);
        assert_eq!(step, WatchStep::Waiting);
        frames.run_frames(10);
    }
    assert!(!stage.readiness().placeholder);
    assert!(published.borrow().is_empty());

    mounted.set(true);
    let step = appearance_step(true, locate, &mut on_found);
    assert_eq!(step, WatchStep::Fired);
    assert!(stage.readiness().both());
    frames.run_frames(10);
    assert_eq!(published.borrow().len(), 1);

    let step = appearance_step(true, locate, &mut on_found);
    assert_eq!(step, WatchStep::Spent);
    frames.run_frames(10);
    assert_eq!(published.borrow().len(), 1);
}
