//! Hand-driven frames and fixed layout for native coordinator tests.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::coordinator::{FrameScheduler, LayoutProbe};
use crate::layout::{ContainerBox, Size, Viewport};

type FrameQueue = RefCell<Vec<(u64, Box<dyn FnOnce()>)>>;

/// Frame scheduler driven by hand. Callbacks requested while a frame runs
/// land in the following frame, as in a browser.
#[derive(Clone, Default)]
pub(crate) struct ManualFrames {
    queue: Rc<FrameQueue>,
    next_id: Rc<Cell<u64>>,
}

pub(crate) struct ManualHandle {
    id: u64,
    queue: Weak<FrameQueue>,
}

impl Drop for ManualHandle {
    fn drop(&mut self) {
        if let Some(queue) = self.queue.upgrade() {
            queue.borrow_mut().retain(|(id, _)| *id != self.id);
        }
    }
}

impl FrameScheduler for ManualFrames {
    type Handle = ManualHandle;

    fn next_frame(&self, callback: Box<dyn FnOnce()>) -> ManualHandle {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.queue.borrow_mut().push((id, callback));
        ManualHandle {
            id,
            queue: Rc::downgrade(&self.queue),
        }
    }
}

impl ManualFrames {
    pub(crate) fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Run everything queued before this frame began; returns how many ran.
    pub(crate) fn run_frame(&self) -> usize {
        let ids: Vec<u64> = self.queue.borrow().iter().map(|(id, _)| *id).collect();
        let mut ran = 0;
        for id in ids {
            let callback = {
                let mut queue = self.queue.borrow_mut();
                queue
                    .iter()
                    .position(|(i, _)| *i == id)
                    .map(|pos| queue.remove(pos).1)
            };
            if let Some(callback) = callback {
                callback();
                ran += 1;
            }
        }
        ran
    }

    pub(crate) fn run_frames(&self, n: usize) {
        for _ in 0..n {
            self.run_frame();
        }
    }
}

#[derive(Clone)]
pub(crate) struct FixedLayout {
    pub(crate) viewport: Rc<Cell<Viewport>>,
    pub(crate) container: Rc<Cell<Option<ContainerBox>>>,
}

impl FixedLayout {
    /// 375×667 viewport filled by an unpadded container.
    pub(crate) fn phone() -> Self {
        Self {
            viewport: Rc::new(Cell::new(Size::new(375.0, 667.0))),
            container: Rc::new(Cell::new(Some(ContainerBox {
                client_height: 667.0,
                padding_top: 0.0,
                padding_bottom: 0.0,
            }))),
        }
    }
}

impl LayoutProbe for FixedLayout {
    fn viewport(&self) -> Viewport {
        self.viewport.get()
    }

    fn container(&self) -> Option<ContainerBox> {
        self.container.get()
    }
}
