//! Pixelith Engine - cellular simulation and document core
//!
//! Architecture:
//! - materials.rs  - material table and per-material parameters
//! - cell.rs       - packed 16-bit cell (material + flags)
//! - grid.rs       - row-major cell storage with chunk activation
//! - chunks.rs     - active/dirty chunk bitsets (32x32 chunks)
//! - scheduler.rs  - bottom-up traversal of active chunks
//! - behaviors/    - material rules (one file per movement family)
//! - world.rs      - simulation facade (owns grid, RNG, palette, surface)
//! - render/       - palette, surface, depth shading, isometric composer
//! - document/     - layers, commands, history, floating selection, .vxf

pub mod cell;
pub mod materials;
pub mod grid;
pub mod chunks;
pub mod scheduler;
pub mod behaviors;
pub mod world;
pub mod render;
pub mod document;
pub mod error;

use wasm_bindgen::prelude::*;

// Better error messages in debug mode
#[cfg(feature = "console_error_panic_hook")]
pub fn set_panic_hook() {
    console_error_panic_hook::set_once();
}

/// Initialize the engine
#[wasm_bindgen]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    set_panic_hook();

    #[cfg(target_arch = "wasm32")]
    web_sys::console::log_1(&"Pixelith engine initialized".into());
}

/// Get engine version
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

// Re-export main types
pub use cell::{flags_of, make_cell, material_of, Cell};
pub use document::{EditorDocument, History};
pub use error::EngineError;
pub use grid::Grid;
pub use world::World;

// Export material constants for JS
#[wasm_bindgen]
pub fn mat_empty() -> u8 { materials::MAT_EMPTY }
#[wasm_bindgen]
pub fn mat_sand() -> u8 { materials::MAT_SAND }
#[wasm_bindgen]
pub fn mat_dirt() -> u8 { materials::MAT_DIRT }
#[wasm_bindgen]
pub fn mat_rock() -> u8 { materials::MAT_ROCK }
#[wasm_bindgen]
pub fn mat_wood() -> u8 { materials::MAT_WOOD }
#[wasm_bindgen]
pub fn mat_leaf() -> u8 { materials::MAT_LEAF }
#[wasm_bindgen]
pub fn mat_grass() -> u8 { materials::MAT_GRASS }
#[wasm_bindgen]
pub fn mat_ice() -> u8 { materials::MAT_ICE }
#[wasm_bindgen]
pub fn mat_water() -> u8 { materials::MAT_WATER }
#[wasm_bindgen]
pub fn mat_oil() -> u8 { materials::MAT_OIL }
#[wasm_bindgen]
pub fn mat_lava() -> u8 { materials::MAT_LAVA }
#[wasm_bindgen]
pub fn mat_acid() -> u8 { materials::MAT_ACID }
#[wasm_bindgen]
pub fn mat_fire() -> u8 { materials::MAT_FIRE }
#[wasm_bindgen]
pub fn mat_smoke() -> u8 { materials::MAT_SMOKE }
#[wasm_bindgen]
pub fn mat_steam() -> u8 { materials::MAT_STEAM }
#[wasm_bindgen]
pub fn mat_snow() -> u8 { materials::MAT_SNOW }
#[wasm_bindgen]
pub fn mat_player() -> u8 { materials::MAT_PLAYER }
#[wasm_bindgen]
pub fn mat_arrow() -> u8 { materials::MAT_ARROW }
