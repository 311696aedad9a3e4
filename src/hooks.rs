use std::cell::RefCell;
use std::rc::Rc;

use web_sys::Element;
use yew::{hook, use_effect_with, use_mut_ref, use_state_eq, NodeRef, UseStateSetter};

use crate::coordinator::ScaleCoordinator;
use crate::dom::{BrowserFrames, DomProbe, StageBinding, StageCoordinator, StageElements};
use crate::error::StageError;
use crate::layout::ScalePolicy;

/// The three elements the stage scale depends on.
#[derive(Clone, PartialEq, Default)]
pub struct StageTargets {
    pub container: NodeRef,
    pub content: NodeRef,
    pub placeholder: NodeRef,
}

/// Scale factor for the stage content, recomputed as the page lays out.
///
/// Starts at 1 and only changes once both the content wrapper and the ad
/// placeholder have been measured.
#[hook]
pub fn use_stage_scale(targets: &StageTargets, policy: &ScalePolicy, zoom: f64) -> f64 {
    let scale = use_state_eq(|| 1.0_f64);
    let live = use_mut_ref(|| None::<StageCoordinator>);

    {
        let setter = scale.setter();
        let live = live.clone();
        use_effect_with((targets.clone(), policy.clone()), move |(targets, policy)| {
            let binding = match bind(targets, policy.clone(), zoom, setter, &live) {
                Ok(binding) => Some(binding),
                Err(err) => {
                    log::warn!("stage scaling disabled: {err}");
                    None
                }
            };
            move || {
                live.borrow_mut().take();
                drop(binding);
            }
        });
    }

    {
        let live = live.clone();
        use_effect_with(zoom, move |zoom| {
            if let Some(coordinator) = live.borrow().as_ref() {
                coordinator.set_zoom(*zoom);
            }
        });
    }

    *scale
}

fn bind(
    targets: &StageTargets,
    policy: ScalePolicy,
    zoom: f64,
    setter: UseStateSetter<f64>,
    live: &Rc<RefCell<Option<StageCoordinator>>>,
) -> Result<StageBinding, StageError> {
    let window = web_sys::window().ok_or(StageError::MissingWindow)?;
    let elements = StageElements {
        container: targets.container.cast::<Element>(),
        content: targets.content.cast::<Element>(),
        placeholder: targets.placeholder.cast::<Element>(),
    };
    let probe = DomProbe::new(window, elements.container.clone());
    let coordinator = ScaleCoordinator::new(policy, BrowserFrames, probe, zoom, move |scale| {
        setter.set(scale);
    });
    *live.borrow_mut() = Some(coordinator.clone());

    let placeholder = targets.placeholder.clone();
    StageBinding::attach(
        elements,
        move || placeholder.cast::<Element>(),
        coordinator,
    )
}
