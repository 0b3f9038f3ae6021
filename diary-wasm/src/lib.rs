mod api;
mod app;
mod pages;
mod route;
mod storage;

use app::App;
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    // Обработчик паники
    console_error_panic_hook::set_once();

    #[cfg(debug_assertions)]
    if let Err(e) = console_log::init_with_level(log::Level::Debug) {
        web_sys::console::log_1(&format!("Failed to init logger: {}", e).into());
    }

    yew::Renderer::<App>::new().render();

    Ok(())
}
