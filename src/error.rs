use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("duplicate project slug `{0}`")]
    DuplicateSlug(String),

    #[error("project `{0}` not found")]
    ProjectNotFound(String),

    #[error("no route for path `{0}`")]
    UnknownRoute(String),

    #[error("fetching `{url}` failed with status {status}")]
    FetchStatus { url: String, status: u16 },

    #[error("content container `#{0}` missing from response")]
    MissingFragment(String),

    #[error("navigation superseded by a newer one")]
    Superseded,

    #[error("element `{0}` not found")]
    MissingElement(String),

    #[error("project snapshot is malformed: {0}")]
    Snapshot(String),

    #[error("javascript error: {0}")]
    Js(String),
}

impl From<JsValue> for Error {
    fn from(value: JsValue) -> Self {
        let text = value
            .as_string()
            .or_else(|| {
                value
                    .dyn_ref::<js_sys::Error>()
                    .map(|err| String::from(err.message()))
            })
            .unwrap_or_else(|| format!("{value:?}"));
        Error::Js(text)
    }
}

impl From<serde_wasm_bindgen::Error> for Error {
    fn from(err: serde_wasm_bindgen::Error) -> Self {
        Error::Snapshot(err.to_string())
    }
}

impl From<Error> for JsValue {
    fn from(err: Error) -> Self {
        JsValue::from_str(&err.to_string())
    }
}
