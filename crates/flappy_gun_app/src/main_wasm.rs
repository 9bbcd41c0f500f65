use wasm_bindgen::prelude::*;
use web_sys::console;

pub(crate) fn main_wasm() -> Result<(), JsValue> {
    console::log_1(&"Starting flappy_gun".into());
    flappy_gun::run();
    Ok(())
}
