//! Browser side of stage scaling: observers, listeners, frames and layout
//! reads, all feeding a [`StageCoordinator`].

#[cfg(test)]
#[path = "dom_test.rs"]
mod dom_test;

use std::cell::RefCell;
use std::rc::Rc;

use gloo_events::EventListener;
use gloo_render::{request_animation_frame, AnimationFrame};
use js_sys::Array;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{
    CssStyleDeclaration, Element, MutationObserver, MutationObserverInit, MutationRecord,
    ResizeObserver, ResizeObserverBoxOptions, ResizeObserverEntry, ResizeObserverOptions,
    ResizeObserverSize, Window,
};

use crate::coordinator::{FrameScheduler, LayoutProbe, ScaleCoordinator};
use crate::error::StageError;
use crate::layout::{ContainerBox, Size, Viewport};

pub type StageCoordinator = ScaleCoordinator<BrowserFrames, DomProbe>;

/// `requestAnimationFrame`; dropping the handle cancels.
pub struct BrowserFrames;

impl FrameScheduler for BrowserFrames {
    type Handle = AnimationFrame;

    fn next_frame(&self, callback: Box<dyn FnOnce()>) -> AnimationFrame {
        request_animation_frame(move |_timestamp| callback())
    }
}

pub struct DomProbe {
    window: Window,
    container: Option<Element>,
}

impl DomProbe {
    pub fn new(window: Window, container: Option<Element>) -> Self {
        Self { window, container }
    }
}

impl LayoutProbe for DomProbe {
    fn viewport(&self) -> Viewport {
        if let Some(visual) = self.window.visual_viewport() {
            return Size::new(visual.width(), visual.height());
        }
        let width = self
            .window
            .inner_width()
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0);
        let height = self
            .window
            .inner_height()
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0);
        Size::new(width, height)
    }

    fn container(&self) -> Option<ContainerBox> {
        let container = self.container.as_ref()?;
        let style = self.window.get_computed_style(container).ok().flatten();
        let padding = |name: &str| style.as_ref().map_or(0.0, |s| css_px(s, name));
        Some(ContainerBox {
            client_height: f64::from(container.client_height()),
            padding_top: padding("padding-top"),
            padding_bottom: padding("padding-bottom"),
        })
    }
}

fn css_px(style: &CssStyleDeclaration, name: &str) -> f64 {
    style
        .get_property_value(name)
        .map_or(0.0, |value| parse_px(&value))
}

/// Computed style lengths come back as `"12px"`; anything else reads as 0.
fn parse_px(value: &str) -> f64 {
    value
        .trim()
        .trim_end_matches("px")
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Which CSS box a [`SizeWatch`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ObservedBox {
    Content,
    /// Includes padding and border, so a styled ad slot is fully reserved.
    Border,
}

/// Pick the reported size, falling back to the content rect when the
/// browser gives no border-box size.
fn entry_size(observed: ObservedBox, border: Option<Size>, content: Size) -> Size {
    match (observed, border) {
        (ObservedBox::Border, Some(border)) => border,
        _ => content,
    }
}

fn first_box_size(sizes: &Array) -> Option<Size> {
    let first = sizes.get(0);
    if first.is_undefined() {
        return None;
    }
    let size = first.unchecked_into::<ResizeObserverSize>();
    Some(Size::new(size.inline_size(), size.block_size()))
}

/// A `ResizeObserver` on one element, disconnected on drop.
struct SizeWatch {
    observer: ResizeObserver,
    _callback: Closure<dyn FnMut(Array, ResizeObserver)>,
}

impl SizeWatch {
    fn new(
        target: &Element,
        label: &'static str,
        observed: ObservedBox,
        mut on_size: impl FnMut(Size) + 'static,
    ) -> Result<Self, StageError> {
        let callback = Closure::<dyn FnMut(Array, ResizeObserver)>::new(
            move |entries: Array, _observer: ResizeObserver| {
                let Some(entry) = entries.iter().last() else {
                    return;
                };
                let entry = entry.unchecked_into::<ResizeObserverEntry>();
                let rect = entry.content_rect();
                let content = Size::new(rect.width(), rect.height());
                let border = match observed {
                    ObservedBox::Border => first_box_size(&entry.border_box_size()),
                    ObservedBox::Content => None,
                };
                on_size(entry_size(observed, border, content));
            },
        );
        let observer = ResizeObserver::new(callback.as_ref().unchecked_ref())
            .map_err(|err| StageError::setup("ResizeObserver", &err))?;
        match observed {
            ObservedBox::Content => observer.observe(target),
            ObservedBox::Border => {
                let options = ResizeObserverOptions::new();
                options.set_box(ResizeObserverBoxOptions::BorderBox);
                observer.observe_with_options(target, &options);
            }
        }
        log::debug!("observing {label} size");
        Ok(Self {
            observer,
            _callback: callback,
        })
    }
}

impl Drop for SizeWatch {
    fn drop(&mut self) {
        self.observer.disconnect();
    }
}

/// Outcome of one batch of mutation records for an [`AppearanceWatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WatchStep {
    /// Nothing was inserted; `locate` was not consulted.
    Ignored,
    /// Something was inserted but not the element we wait for.
    Waiting,
    Fired,
    /// Already fired once; later batches do nothing.
    Spent,
}

impl WatchStep {
    fn is_done(self) -> bool {
        matches!(self, Self::Fired | Self::Spent)
    }
}

/// One-shot decision: fire `on_found` the first time an insertion batch
/// makes `locate` succeed.
fn appearance_step<T, F: FnOnce(T)>(
    inserted: bool,
    locate: impl FnOnce() -> Option<T>,
    on_found: &mut Option<F>,
) -> WatchStep {
    if on_found.is_none() {
        return WatchStep::Spent;
    }
    if !inserted {
        return WatchStep::Ignored;
    }
    let Some(found) = locate() else {
        return WatchStep::Waiting;
    };
    if let Some(on_found) = on_found.take() {
        on_found(found);
    }
    WatchStep::Fired
}

/// One-shot `MutationObserver`: fires `on_found` the first time `locate`
/// yields an element after a child insertion under `root`.
struct AppearanceWatch {
    observer: MutationObserver,
    _callback: Closure<dyn FnMut(Array, MutationObserver)>,
}

impl AppearanceWatch {
    fn new(
        root: &Element,
        locate: impl Fn() -> Option<Element> + 'static,
        on_found: impl FnOnce(Element) + 'static,
    ) -> Result<Self, StageError> {
        let mut on_found = Some(on_found);
        let callback = Closure::<dyn FnMut(Array, MutationObserver)>::new(
            move |records: Array, observer: MutationObserver| {
                let inserted = records.iter().any(|record| {
                    let record = record.unchecked_into::<MutationRecord>();
                    record.added_nodes().length() > 0
                });
                if appearance_step(inserted, &locate, &mut on_found).is_done() {
                    observer.disconnect();
                }
            },
        );
        let observer = MutationObserver::new(callback.as_ref().unchecked_ref())
            .map_err(|err| StageError::setup("MutationObserver", &err))?;
        let init = MutationObserverInit::new();
        init.set_child_list(true);
        init.set_subtree(true);
        observer
            .observe_with_options(root, &init)
            .map_err(|err| StageError::observe("stage container", &err))?;
        Ok(Self {
            observer,
            _callback: callback,
        })
    }
}

impl Drop for AppearanceWatch {
    fn drop(&mut self) {
        self.observer.disconnect();
    }
}

/// How the reserved strip gets measured, from what is mounted at attach time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlaceholderPlan {
    Observe,
    AwaitMount,
    /// No container to mount into; waiting would never end.
    Unavailable,
}

impl PlaceholderPlan {
    fn choose(has_placeholder: bool, has_container: bool) -> Self {
        match (has_placeholder, has_container) {
            (true, _) => Self::Observe,
            (false, true) => Self::AwaitMount,
            (false, false) => Self::Unavailable,
        }
    }
}

/// Run `attach` for a freshly mounted placeholder unless the stage is gone.
fn adopt_placeholder<S, P, T>(
    coordinator: &ScaleCoordinator<S, P>,
    attach: impl FnOnce() -> T,
) -> Option<T>
where
    S: FrameScheduler + 'static,
    S::Handle: 'static,
    P: LayoutProbe + 'static,
{
    if coordinator.is_torn_down() {
        log::debug!("ad placeholder mounted after teardown");
        return None;
    }
    log::debug!("ad placeholder mounted");
    Some(attach())
}

/// Element handles resolved by the caller; the binding never queries the
/// document for them.
#[derive(Debug, Clone, Default)]
pub struct StageElements {
    pub container: Option<Element>,
    pub content: Option<Element>,
    pub placeholder: Option<Element>,
}

/// Live wiring between the page and a [`StageCoordinator`].
///
/// Dropping the binding tears everything down.
pub struct StageBinding {
    coordinator: StageCoordinator,
    content: Option<SizeWatch>,
    placeholder: Rc<RefCell<Option<SizeWatch>>>,
    appearance: Option<AppearanceWatch>,
    listeners: Vec<EventListener>,
    detached: bool,
}

impl StageBinding {
    /// Start observing. `locate_placeholder` is polled after DOM insertions
    /// when the placeholder is not mounted yet.
    pub fn attach(
        elements: StageElements,
        locate_placeholder: impl Fn() -> Option<Element> + 'static,
        coordinator: StageCoordinator,
    ) -> Result<Self, StageError> {
        let window = web_sys::window().ok_or(StageError::MissingWindow)?;
        let mut binding = Self {
            coordinator,
            content: None,
            placeholder: Rc::new(RefCell::new(None)),
            appearance: None,
            listeners: Vec::new(),
            detached: false,
        };

        match elements.content.as_ref() {
            Some(content) => binding.watch_content(content),
            None => log::warn!("stage content not mounted, scale stays at 1"),
        }

        let plan = PlaceholderPlan::choose(
            elements.placeholder.is_some(),
            elements.container.is_some(),
        );
        match (plan, &elements.placeholder, &elements.container) {
            (PlaceholderPlan::Observe, Some(placeholder), _) => {
                binding.watch_placeholder(placeholder);
            }
            (PlaceholderPlan::AwaitMount, _, Some(container)) => {
                binding.await_placeholder(container, locate_placeholder);
            }
            _ => binding.coordinator.placeholder_unavailable(),
        }

        binding.listen(&window);
        log::debug!(
            "stage attached, readiness {:?}",
            binding.coordinator.readiness()
        );
        Ok(binding)
    }

    fn watch_content(&mut self, content: &Element) {
        let coordinator = self.coordinator.clone();
        let on_size = move |size| coordinator.content_resized(size);
        match SizeWatch::new(content, "content", ObservedBox::Content, on_size) {
            Ok(watch) => self.content = Some(watch),
            Err(err) => log::warn!("stage content not observed: {err}"),
        }
    }

    fn watch_placeholder(&mut self, placeholder: &Element) {
        *self.placeholder.borrow_mut() = placeholder_watch(placeholder, &self.coordinator);
    }

    fn await_placeholder(
        &mut self,
        container: &Element,
        locate_placeholder: impl Fn() -> Option<Element> + 'static,
    ) {
        let coordinator = self.coordinator.clone();
        let slot = Rc::clone(&self.placeholder);
        let found = move |placeholder: Element| {
            let watch = adopt_placeholder(&coordinator, || {
                placeholder_watch(&placeholder, &coordinator)
            });
            if let Some(watch) = watch {
                *slot.borrow_mut() = watch;
            }
        };
        match AppearanceWatch::new(container, locate_placeholder, found) {
            Ok(watch) => self.appearance = Some(watch),
            Err(err) => {
                log::warn!("cannot wait for ad placeholder: {err}");
                self.coordinator.placeholder_unavailable();
            }
        }
    }

    fn listen(&mut self, window: &Window) {
        for event in ["resize", "scroll"] {
            let coordinator = self.coordinator.clone();
            self.listeners.push(EventListener::new(window, event, move |_| {
                coordinator.viewport_changed();
            }));
        }
        if let Some(visual) = window.visual_viewport() {
            for event in ["resize", "scroll"] {
                let coordinator = self.coordinator.clone();
                self.listeners.push(EventListener::new(&visual, event, move |_| {
                    coordinator.viewport_changed();
                }));
            }
        }
    }

    /// Stop the coordinator, then disconnect every observer and listener.
    pub fn detach(&mut self) {
        if self.detached {
            return;
        }
        self.detached = true;
        self.coordinator.teardown();
        log::debug!("stage detached at scale {:.4}", self.coordinator.scale());
        self.content = None;
        self.placeholder.borrow_mut().take();
        self.appearance = None;
        self.listeners.clear();
    }
}

impl Drop for StageBinding {
    fn drop(&mut self) {
        self.detach();
    }
}

/// Observe the placeholder, or stop waiting for it if that is impossible.
fn placeholder_watch(placeholder: &Element, coordinator: &StageCoordinator) -> Option<SizeWatch> {
    let sink = coordinator.clone();
    let on_size = move |size: Size| sink.placeholder_resized(size.height);
    match SizeWatch::new(placeholder, "ad placeholder", ObservedBox::Border, on_size) {
        Ok(watch) => Some(watch),
        Err(err) => {
            log::warn!("ad placeholder not observed: {err}");
            coordinator.placeholder_unavailable();
            None
        }
    }
}
