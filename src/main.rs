use settings::Settings;
use stage::GameStage;
use yew::{function_component, html, use_state, Callback, ContextProvider, Html, Renderer};
use zoom::{ZoomContext, ZoomLevel};

mod coordinator;
mod dom;
mod error;
mod hooks;
mod layout;
mod settings;
mod stage;
mod zoom;

#[cfg(test)]
mod test_support;

#[function_component(App)]
fn app() -> Html {
    let zoom = use_state(ZoomLevel::default);
    let zoom_onchange = {
        let zoom = zoom.clone();
        Callback::from(move |level: ZoomLevel| {
            log::info!("zoom set to {:.2}", level.value());
            zoom.set(level);
        })
    };

    let design = layout::ScalePolicy::default().design_size;
    let surface_style = format!("width: {}px; height: {}px;", design.width, design.height);

    html! {
        <ContextProvider<ZoomContext> context={zoom.clone()}>
            <div class="game-shell">
                <GameStage>
                    <div class="game-surface" style={surface_style} />
                </GameStage>
                <Settings zoom={*zoom} {zoom_onchange} />
            </div>
        </ContextProvider<ZoomContext>>
    }
}

fn main() {
    console_error_panic_hook::set_once();
    let level = if cfg!(debug_assertions) {
        log::Level::Debug
    } else {
        log::Level::Info
    };
    console_log::init_with_level(level).expect("logger init failed");
    Renderer::<App>::new().render();
}
