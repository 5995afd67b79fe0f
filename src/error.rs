use wasm_bindgen::{JsCast, JsValue};


pub type Result<A, E = Error> = std::result::Result<A, E>;


#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no `window` is available in this environment")]
    NoWindow,

    #[error("localStorage is unavailable: {0}")]
    StorageUnavailable(String),

    #[error("failed to read `{key}` from storage: {message}")]
    StorageRead { key: String, message: String },

    #[error("failed to write `{key}` to storage: {message}")]
    StorageWrite { key: String, message: String },

    #[error("stored state under `{key}` could not be read")]
    MalformedState {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode state as JSON")]
    Encode(#[source] serde_json::Error),

    #[error("mount node `#{0}` was not found in the document")]
    MissingMountNode(String),

    #[error("application has no port named `{0}`")]
    MissingPort(String),

    #[error("a port subscriber sent on the port it is subscribed to")]
    ReentrantSend,
}

impl From<Error> for JsValue {
    fn from(error: Error) -> Self {
        js_sys::Error::new(&error.to_string()).into()
    }
}


/// Extracts a readable message from a thrown JS value.
pub(crate) fn js_message(value: &JsValue) -> String {
    match value.dyn_ref::<js_sys::Error>() {
        Some(error) => error.message().into(),
        None => format!("{:?}", value),
    }
}
