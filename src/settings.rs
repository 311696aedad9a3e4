use web_sys::{HtmlInputElement, InputEvent, MouseEvent};
use yew::{function_component, html, use_state, Callback, Html, Properties, TargetCast};

use crate::zoom::{ZoomLevel, MAX_ZOOM, MIN_ZOOM, ZOOM_STEP};

#[derive(Properties, PartialEq)]
pub struct Props {
    pub zoom: ZoomLevel,
    pub zoom_onchange: Callback<ZoomLevel>,
}

#[function_component(Settings)]
pub fn settings(props: &Props) -> Html {
    let show_setting = use_state(|| false);

    let zoom_oninput = props.zoom_onchange.reform(move |event: InputEvent| {
        let input: HtmlInputElement = event.target_unchecked_into();
        ZoomLevel::new(input.value_as_number())
    });

    let reset_cb = props
        .zoom_onchange
        .reform(|_: MouseEvent| ZoomLevel::default());

    let toggle_cb = {
        let show_setting = show_setting.clone();
        Callback::from(move |_: MouseEvent| {
            show_setting.set(!*show_setting);
        })
    };

    let zoom = props.zoom.value();
    html! {
        <div class="settings">
            <button class="toggle-btn" onclick={toggle_cb}>
                { "⚙️" }
            </button>
            if *show_setting {
                <div class="inputs">
                    <div class="zoom-setting">
                        <label for="zoomInput">{ "zoom" }</label>
                        <input
                            type="range"
                            value={zoom.to_string()}
                            id="zoomInput"
                            min={MIN_ZOOM.to_string()}
                            max={MAX_ZOOM.to_string()}
                            step={ZOOM_STEP.to_string()}
                            oninput={zoom_oninput}
                        />
                        <span class="zoom-value">{ format!("{:.0}%", zoom * 100.0) }</span>
                        <button
                            class="reset-btn"
                            disabled={props.zoom.is_default()}
                            onclick={reset_cb}
                        >
                            { "↺" }
                        </button>
                    </div>
                </div>
            }
        </div>
    }
}
