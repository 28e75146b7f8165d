//! World - the simulation facade
//!
//! One World owns the grid, the chunk scheduler state, the RNG, the palette
//! and the presentation surface; it is instantiated once per world and torn
//! down explicitly. The driver loop calls `step()` for one blocking tick,
//! then `render()` and reads the surface pointer for zero-copy present.

use wasm_bindgen::prelude::*;

use crate::behaviors::{BehaviorRegistry, SupportCache, UpdateContext};
use crate::cell::{make_cell, material_of, Cell};
use crate::grid::Grid;
use crate::materials::{is_live, is_valid_material, rgba, MaterialId, MAT_EMPTY};
use crate::render::{HeightCache, Palette, Surface};
use crate::scheduler::{step_active_chunks, ScanOrder};

const DEFAULT_SEED: u32 = 12345;
const BACKGROUND: u32 = rgba(10, 10, 10, 255);

/// The simulation world.
#[wasm_bindgen]
pub struct World {
    grid: Grid,
    behaviors: BehaviorRegistry,
    support: SupportCache,

    palette: Palette,
    surface: Surface,
    heights: HeightCache,
    depth_shading: bool,

    frame: u64,
    rng_state: u32,
}

#[wasm_bindgen]
impl World {
    /// Create a new world with given dimensions.
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_seed(width, height, DEFAULT_SEED)
    }

    /// Create a world with an explicit RNG seed. Identical seeds and
    /// identical grids step identically.
    #[wasm_bindgen(js_name = withSeed)]
    pub fn with_seed(width: u32, height: u32, seed: u32) -> Self {
        let grid = Grid::new(width, height);
        Self {
            support: SupportCache::new(grid.size()),
            grid,
            behaviors: BehaviorRegistry::new(),
            palette: Palette::new(BACKGROUND),
            surface: Surface::new(width, height),
            heights: HeightCache::new(width),
            depth_shading: false,
            frame: 0,
            rng_state: if seed == 0 { DEFAULT_SEED } else { seed },
        }
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.grid.width()
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.grid.height()
    }

    #[wasm_bindgen(getter)]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Advance the simulation one blocking tick: walk active chunks
    /// bottom-up and run each live cell's material rule once.
    pub fn step(&mut self) {
        self.grid.reset_updated();
        self.support.reset(self.grid.size());

        let frame = self.frame;
        let behaviors = &self.behaviors;
        let rng = &mut self.rng_state;
        let support = &mut self.support;

        step_active_chunks(&mut self.grid, ScanOrder::BottomUp, frame, |grid, _idx, x, y| {
            if grid.is_updated(x, y) {
                return;
            }
            // SAFETY: the scheduler only yields in-bounds coordinates.
            let material = material_of(unsafe { grid.get_unchecked(x, y) });
            if !is_live(material) {
                return;
            }
            let mut ctx = UpdateContext {
                grid,
                x,
                y,
                frame,
                rng: &mut *rng,
                support: &mut *support,
            };
            behaviors.update(material, &mut ctx);
        });

        self.frame = self.frame.wrapping_add(1);
    }

    // === Painting API ===

    /// Fill a disc with a material (brush stroke).
    #[wasm_bindgen(js_name = paintCircle)]
    pub fn paint_circle(&mut self, cx: i32, cy: i32, radius: i32, material: u8) {
        if !is_valid_material(material) {
            return;
        }
        self.grid.paint_circle(cx, cy, radius, make_cell(material, 0));
    }

    /// Fill a rectangle with a material.
    #[wasm_bindgen(js_name = paintRect)]
    pub fn paint_rect(&mut self, x: i32, y: i32, w: u32, h: u32, material: u8) {
        if !is_valid_material(material) {
            return;
        }
        self.grid.paint_rect(x, y, w, h, make_cell(material, 0));
    }

    /// Erase a disc back to empty.
    #[wasm_bindgen(js_name = eraseCircle)]
    pub fn erase_circle(&mut self, cx: i32, cy: i32, radius: i32) {
        self.grid.paint_circle(cx, cy, radius, make_cell(MAT_EMPTY, 0));
        // Erasure can undermine what sits above: keep the region visited.
        self.grid.mark_chunk_active_at(cx.max(0) as u32, cy.max(0) as u32);
    }

    /// Write one cell (bounds-checked, no-op outside).
    #[wasm_bindgen(js_name = setCell)]
    pub fn set_cell(&mut self, x: i32, y: i32, material: u8, flags: u8) {
        if !is_valid_material(material) {
            return;
        }
        self.grid.set(x, y, make_cell(material, flags));
    }

    /// Material id at (x, y); Rock outside the grid.
    #[wasm_bindgen(js_name = materialAt)]
    pub fn material_at(&self, x: i32, y: i32) -> u8 {
        self.grid.material_at(x, y)
    }

    /// Clear all cells and reset chunk state.
    pub fn clear(&mut self) {
        self.grid.clear();
        self.frame = 0;
    }

    // === Rendering ===

    /// Blit the grid through the palette, then apply depth shading when
    /// enabled. On a dimension mismatch the frame is rejected, the surface
    /// recreated, and the blit retried.
    pub fn render(&mut self) {
        if self.surface.blit_grid(&self.grid, &self.palette).is_err() {
            self.surface = Surface::new(self.grid.width(), self.grid.height());
            let _ = self.surface.blit_grid(&self.grid, &self.palette);
        }
        if self.depth_shading {
            self.heights.tick(&self.grid);
            self.heights.shade(&self.grid, &mut self.surface);
        }
    }

    #[wasm_bindgen(js_name = setDepthShading)]
    pub fn set_depth_shading(&mut self, enabled: bool) {
        self.depth_shading = enabled;
    }

    /// Override one palette entry.
    #[wasm_bindgen(js_name = setPaletteColor)]
    pub fn set_palette_color(&mut self, material: u8, color: u32) {
        self.palette.set_color(material, color);
    }

    // === Zero-copy buffer access for the presenter ===

    /// Raw pointer to the packed cell array.
    #[wasm_bindgen(js_name = cellsPtr)]
    pub fn cells_ptr(&self) -> *const Cell {
        self.grid.cells_ptr()
    }

    /// Raw pointer to the rendered pixel surface.
    #[wasm_bindgen(js_name = surfacePtr)]
    pub fn surface_ptr(&self) -> *const u32 {
        self.surface.pixels_ptr()
    }

    // === Scheduler statistics ===

    #[wasm_bindgen(js_name = activeChunks)]
    pub fn active_chunks(&self) -> u32 {
        self.grid.chunks.active_chunk_count() as u32
    }

    #[wasm_bindgen(js_name = dirtyChunks)]
    pub fn dirty_chunks(&self) -> u32 {
        self.grid.chunks.dirty_chunk_count() as u32
    }
}

impl World {
    /// Direct grid access for native embedding and tests.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// Count cells of one material (test and stats helper).
    pub fn count_material(&self, material: MaterialId) -> usize {
        self.grid
            .cells()
            .iter()
            .filter(|&&c| material_of(c) == material)
            .count()
    }
}
