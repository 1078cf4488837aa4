pub mod api;
pub mod app;
#[cfg(feature = "hydrate")]
pub mod browser;
pub mod config;
pub mod controller;
pub mod error;
pub mod model;
pub mod notice;
pub mod session;
pub mod ui;

#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    use crate::app::*;
    console_error_panic_hook::set_once();
    leptos::mount::hydrate_body(App);
}
