use gloo_timers::callback::Timeout;
use yew::{
    function_component, html, use_context, use_effect_with, use_node_ref, use_state,
    Children, Html, Properties,
};

use crate::hooks::{use_stage_scale, StageTargets};
use crate::layout::ScalePolicy;
use crate::zoom::ZoomContext;

/// Ad SDKs usually mount their slot a little after first paint.
pub const AD_MOUNT_DELAY_MS: u32 = 500;

#[derive(Properties, PartialEq)]
pub struct Props {
    #[prop_or_default]
    pub policy: ScalePolicy,
    /// Delay before the ad placeholder mounts.
    #[prop_or(AD_MOUNT_DELAY_MS)]
    pub ad_delay_ms: u32,
    #[prop_or_default]
    pub children: Children,
}

/// Fixed-aspect game content scaled into whatever space is left above the
/// ad strip.
#[function_component(GameStage)]
pub fn game_stage(props: &Props) -> Html {
    let zoom = use_context::<ZoomContext>()
        .map_or(1.0, |zoom| zoom.value());

    let targets = StageTargets {
        container: use_node_ref(),
        content: use_node_ref(),
        placeholder: use_node_ref(),
    };
    let scale = use_stage_scale(&targets, &props.policy, zoom);

    let ad_mounted = use_state(|| false);
    {
        let ad_mounted = ad_mounted.clone();
        use_effect_with(props.ad_delay_ms, move |delay| {
            let timeout = Timeout::new(*delay, move || ad_mounted.set(true));
            move || drop(timeout)
        });
    }

    let content_style = format!("transform: scale({scale:.4}); transform-origin: top;");

    html! {
        <div class="stage-container" ref={targets.container.clone()}>
            <div class="stage-content" ref={targets.content.clone()} style={content_style}>
                { props.children.clone() }
            </div>
            if *ad_mounted {
                <div class="ad-placeholder" ref={targets.placeholder.clone()} />
            }
        </div>
    }
}
