pub mod ui;
pub mod visit;

#[cfg(not(target_arch = "wasm32"))]
pub mod backend;

#[cfg(target_arch = "wasm32")]
pub mod frontend;
