//! Stage scale coordination.
//!
//! Two measurement sources (the content wrapper and the ad placeholder) must
//! each report once before the scale may be computed. Until then every
//! recompute request is dropped; afterwards requests are debounced onto the
//! next animation frame, so a burst of resize/scroll events collapses into a
//! single computation against the latest measurements.
//!
//! The coordinator never touches the DOM. Frames come from a
//! [`FrameScheduler`], layout reads from a [`LayoutProbe`], and observer
//! wiring lives in [`crate::dom`].

#[cfg(test)]
#[path = "coordinator_test.rs"]
mod coordinator_test;

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::layout::{compute_scale, ContainerBox, ScaleInputs, ScalePolicy, Size, Viewport};

/// Defers work to the next rendering frame.
///
/// Dropping the returned handle cancels the request if it has not run yet.
pub trait FrameScheduler {
    type Handle;

    fn next_frame(&self, callback: Box<dyn FnOnce()>) -> Self::Handle;
}

/// Reads layout that is only meaningful at flush time.
pub trait LayoutProbe {
    fn viewport(&self) -> Viewport;
    fn container(&self) -> Option<ContainerBox>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Readiness {
    pub content: bool,
    pub placeholder: bool,
}

impl Readiness {
    #[must_use]
    pub fn both(self) -> bool {
        self.content && self.placeholder
    }
}

#[derive(Debug)]
struct State {
    content: Size,
    reserved_height: f64,
    zoom: f64,
    readiness: Readiness,
    scale: f64,
    torn_down: bool,
}

struct Inner<S: FrameScheduler, P> {
    policy: ScalePolicy,
    scheduler: S,
    probe: P,
    on_scale: Box<dyn Fn(f64)>,
    state: RefCell<State>,
    /// The single outstanding recompute; replacing it cancels the old one.
    pending: RefCell<Option<S::Handle>>,
    /// Two-frame settle chain after a placeholder measurement.
    settle: RefCell<Option<S::Handle>>,
}

/// Shared handle to one stage's scale state. Clones refer to the same
/// coordinator.
pub struct ScaleCoordinator<S: FrameScheduler, P: LayoutProbe> {
    inner: Rc<Inner<S, P>>,
}

impl<S: FrameScheduler, P: LayoutProbe> Clone for ScaleCoordinator<S, P> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<S, P> ScaleCoordinator<S, P>
where
    S: FrameScheduler + 'static,
    S::Handle: 'static,
    P: LayoutProbe + 'static,
{
    pub fn new(
        policy: ScalePolicy,
        scheduler: S,
        probe: P,
        zoom: f64,
        on_scale: impl Fn(f64) + 'static,
    ) -> Self {
        let state = State {
            content: policy.design_size,
            reserved_height: 0.0,
            zoom,
            readiness: Readiness::default(),
            scale: 1.0,
            torn_down: false,
        };
        Self {
            inner: Rc::new(Inner {
                policy,
                scheduler,
                probe,
                on_scale: Box::new(on_scale),
                state: RefCell::new(state),
                pending: RefCell::new(None),
                settle: RefCell::new(None),
            }),
        }
    }

    /// The content wrapper reported a new size.
    pub fn content_resized(&self, size: Size) {
        if size.is_degenerate() {
            log::debug!("ignoring degenerate content size {size:?}");
            return;
        }
        {
            let mut state = self.inner.state.borrow_mut();
            if state.torn_down {
                return;
            }
            state.content = size;
            state.readiness.content = true;
        }
        Inner::schedule(&self.inner);
    }

    /// The placeholder reported a new height.
    ///
    /// The recompute is held back two frames so the placeholder's layout has
    /// settled before anything else reads it.
    pub fn placeholder_resized(&self, height: f64) {
        if !height.is_finite() || height < 0.0 {
            log::debug!("ignoring placeholder height {height}");
            return;
        }
        {
            let mut state = self.inner.state.borrow_mut();
            if state.torn_down {
                return;
            }
            state.reserved_height = height;
            state.readiness.placeholder = true;
        }
        Inner::settle_then_schedule(&self.inner);
    }

    /// There is nothing that could ever host a placeholder; stop waiting for one.
    pub fn placeholder_unavailable(&self) {
        {
            let mut state = self.inner.state.borrow_mut();
            if state.torn_down {
                return;
            }
            log::warn!("stage container missing, scaling without a reserved strip");
            state.readiness.placeholder = true;
        }
        Inner::schedule(&self.inner);
    }

    /// Window or visual viewport resized or scrolled.
    ///
    /// Replaces any pending recompute with one on the next frame; dropped
    /// without effect unless both sources have reported.
    pub fn viewport_changed(&self) {
        Inner::schedule(&self.inner);
    }

    pub fn set_zoom(&self, zoom: f64) {
        {
            let mut state = self.inner.state.borrow_mut();
            if state.torn_down {
                return;
            }
            state.zoom = zoom;
        }
        Inner::schedule(&self.inner);
    }

    /// Cancel pending frames and refuse all further input. Idempotent.
    pub fn teardown(&self) {
        {
            let mut state = self.inner.state.borrow_mut();
            if state.torn_down {
                return;
            }
            state.torn_down = true;
        }
        let pending = self.inner.pending.borrow_mut().take();
        let settle = self.inner.settle.borrow_mut().take();
        drop((pending, settle));
        log::debug!("stage scale coordinator torn down");
    }

    #[must_use]
    pub fn is_torn_down(&self) -> bool {
        self.inner.state.borrow().torn_down
    }

    #[must_use]
    pub fn scale(&self) -> f64 {
        self.inner.state.borrow().scale
    }

    #[must_use]
    pub fn readiness(&self) -> Readiness {
        self.inner.state.borrow().readiness
    }
}

impl<S, P> Inner<S, P>
where
    S: FrameScheduler + 'static,
    S::Handle: 'static,
    P: LayoutProbe + 'static,
{
    fn schedule(this: &Rc<Self>) {
        let previous = this.pending.borrow_mut().take();
        drop(previous);

        {
            let state = this.state.borrow();
            if state.torn_down {
                return;
            }
            if !state.readiness.both() {
                log::debug!("recompute dropped, readiness {:?}", state.readiness);
                return;
            }
        }

        let weak: Weak<Self> = Rc::downgrade(this);
        let handle = this.scheduler.next_frame(Box::new(move || {
            let Some(inner) = weak.upgrade() else { return };
            let fired = inner.pending.borrow_mut().take();
            drop(fired);
            inner.recompute();
        }));
        *this.pending.borrow_mut() = Some(handle);
    }

    fn settle_then_schedule(this: &Rc<Self>) {
        let weak = Rc::downgrade(this);
        let first = this.scheduler.next_frame(Box::new(move || {
            let Some(inner) = weak.upgrade() else { return };
            if inner.state.borrow().torn_down {
                return;
            }
            let weak = Rc::downgrade(&inner);
            let second = inner.scheduler.next_frame(Box::new(move || {
                let Some(inner) = weak.upgrade() else { return };
                let fired = inner.settle.borrow_mut().take();
                drop(fired);
                Self::schedule(&inner);
            }));
            let fired = inner.settle.borrow_mut().replace(second);
            drop(fired);
        }));
        let previous = this.settle.borrow_mut().replace(first);
        drop(previous);
    }

    fn recompute(&self) {
        let inputs = {
            let state = self.state.borrow();
            if state.torn_down || !state.readiness.both() {
                return;
            }
            ScaleInputs {
                viewport: self.probe.viewport(),
                container: self.probe.container(),
                content: state.content,
                reserved_height: state.reserved_height,
                zoom: state.zoom,
            }
        };
        let scale = compute_scale(&self.policy, &inputs);
        log::debug!("stage scale {scale:.4} from {inputs:?}");
        self.state.borrow_mut().scale = scale;
        (self.on_scale)(scale);
    }
}
