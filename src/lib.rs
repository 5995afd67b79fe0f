use std::rc::Rc;

use wasm_bindgen::prelude::*;

mod application;
mod bootstrap;
mod config;
mod error;
mod mount;
mod ports;
mod storage;

mod app;
mod state;
mod todo;
mod util;

pub mod logging;

pub use application::{Application, Init};
pub use bootstrap::{Bootstrap, Running};
pub use config::{Config, MalformedPolicy, STORAGE_KEY, MOUNT_ID, SET_STORAGE};
pub use error::{Error, Result};
pub use mount::MountResolver;
pub use ports::{Port, Ports, Subscription};
pub use storage::{Store, LocalStorage, MemoryStore};

pub use app::App;
pub use state::{State, TodoItem};


#[wasm_bindgen(start)]
pub fn main_js() -> Result<(), JsValue> {
    #[cfg(debug_assertions)]
    console_error_panic_hook::set_once();

    logging::init();

    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or(Error::NoWindow)?;

    let bootstrap = Bootstrap::new(Config::default(), LocalStorage::new()?);

    // Persists until the page goes away
    let _app = bootstrap.run::<Rc<App>, _>(&document)?.leak();

    Ok(())
}
