use thiserror::Error;
use wasm_bindgen::JsValue;

/// Failures while wiring the stage to the browser.
///
/// None of these are fatal: the stage falls back to an unscaled or
/// banner-less layout and logs the cause.
#[derive(Debug, Error)]
pub enum StageError {
    #[error("no global window")]
    MissingWindow,

    #[error("could not create {kind}: {message}")]
    ObserverSetup {
        kind: &'static str,
        message: String,
    },

    #[error("could not observe {target}: {message}")]
    Observe {
        target: &'static str,
        message: String,
    },
}

impl StageError {
    pub(crate) fn setup(kind: &'static str, err: &JsValue) -> Self {
        Self::ObserverSetup {
            kind,
            message: describe(err),
        }
    }

    pub(crate) fn observe(target: &'static str, err: &JsValue) -> Self {
        Self::Observe {
            target,
            message: describe(err),
        }
    }
}

fn describe(err: &JsValue) -> String {
    err.as_string().unwrap_or_else(|| format!("{err:?}"))
}
