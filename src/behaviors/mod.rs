//! Behaviors - per-material update rules
//!
//! One behavior per movement family; the registry dispatches on material id.
//! All motion is swap or displacement directly on the grid, so simulation
//! state never leaves the cell array.

mod powder;
mod liquid;
mod gas;
mod fire;
mod solids;

pub use fire::FireBehavior;
pub use gas::GasBehavior;
pub use liquid::LiquidBehavior;
pub use powder::PowderBehavior;
pub use solids::{SolidsBehavior, SupportCache};

use crate::cell::{make_cell, material_of};
use crate::grid::Grid;
use crate::materials::{
    density_of, is_gas, is_solid, viscosity_of, MaterialId, MAT_ACID, MAT_DIRT, MAT_FIRE,
    MAT_GRASS, MAT_ICE, MAT_LAVA, MAT_LEAF, MAT_OIL, MAT_ROCK, MAT_SAND, MAT_SMOKE, MAT_SNOW,
    MAT_STEAM, MAT_WATER, MAT_WOOD,
};

/// Update context passed to behaviors.
pub struct UpdateContext<'a> {
    pub grid: &'a mut Grid,
    pub x: u32,
    pub y: u32,
    pub frame: u64,
    pub rng: &'a mut u32,
    pub support: &'a mut SupportCache,
}

/// Behavior trait - each movement family implements this.
pub trait Behavior {
    fn update(&self, ctx: &mut UpdateContext);
}

/// Xorshift32 random number generator. Process-scoped state, consumed in
/// traversal order so a fixed seed replays a run exactly.
#[inline]
pub fn xorshift32(state: &mut u32) -> u32 {
    let mut x = *state;
    x ^= x << 13;
    x ^= x >> 17;
    x ^= x << 5;
    *state = x;
    x
}

/// Roll a percentage chance.
#[inline]
pub fn chance(rng: &mut u32, percent: u32) -> bool {
    xorshift32(rng) % 100 < percent
}

/// Roll a per-mille chance (for sub-percent rates).
#[inline]
pub fn chance_permille(rng: &mut u32, permille: u32) -> bool {
    xorshift32(rng) % 1000 < permille
}

/// Uniform coin for symmetric left/right candidates: first direction and its
/// mirror.
#[inline]
pub fn random_dirs(rng: &mut u32) -> (i32, i32) {
    if xorshift32(rng) & 1 == 0 { (-1, 1) } else { (1, -1) }
}

/// Lateral jitter in {-1, 0, 1}.
#[inline]
pub fn random_jitter(rng: &mut u32) -> i32 {
    (xorshift32(rng) % 3) as i32 - 1
}

/// The 8-neighborhood offsets.
pub const NEIGHBORS_8: [(i32, i32); 8] = [
    (-1, -1), (0, -1), (1, -1),
    (-1, 0), (1, 0),
    (-1, 1), (0, 1), (1, 1),
];

/// The 4 cardinal offsets.
pub const NEIGHBORS_4: [(i32, i32); 4] = [(0, -1), (-1, 0), (1, 0), (0, 1)];

// === Movement helpers ===

/// Swap into the target if it is empty or gas. Marks both chunks
/// active+dirty via the grid swap.
#[inline]
pub fn try_move(grid: &mut Grid, sx: u32, sy: u32, tx: i32, ty: i32) -> bool {
    if !grid.in_bounds(tx, ty) {
        return false;
    }
    let target = grid.material_at(tx, ty);
    if target == 0 || is_gas(target) {
        grid.swap(sx, sy, tx as u32, ty as u32);
        return true;
    }
    false
}

/// Like [`try_move`], but also succeeds when the source is denser than a
/// non-solid target (powder sinking through fluid, heavy fluid through
/// light).
#[inline]
pub fn try_move_by_density(grid: &mut Grid, sx: u32, sy: u32, tx: i32, ty: i32) -> bool {
    if !grid.in_bounds(tx, ty) {
        return false;
    }
    let source = grid.material_at(sx as i32, sy as i32);
    let target = grid.material_at(tx, ty);
    if target == 0 || is_gas(target) {
        grid.swap(sx, sy, tx as u32, ty as u32);
        return true;
    }
    if !is_solid(target) && density_of(source) > density_of(target) {
        grid.swap(sx, sy, tx as u32, ty as u32);
        return true;
    }
    false
}

/// Viscosity-gated spread into an empty/gas target. Success probability is
/// 1/(2 * viscosity) per attempt.
#[inline]
pub fn try_liquid_spread(
    grid: &mut Grid,
    rng: &mut u32,
    sx: u32,
    sy: u32,
    tx: i32,
    ty: i32,
    self_mat: MaterialId,
) -> bool {
    if !grid.in_bounds(tx, ty) {
        return false;
    }
    let target = grid.material_at(tx, ty);
    if target != 0 && !is_gas(target) {
        return false;
    }
    let gate = 2 * viscosity_of(self_mat) as u32;
    if xorshift32(rng) % gate != 0 {
        return false;
    }
    grid.swap(sx, sy, tx as u32, ty as u32);
    true
}

/// Convert a cell in place (reaction product). Bounds-checked by `set`.
#[inline]
pub fn convert(grid: &mut Grid, x: i32, y: i32, material: MaterialId) {
    grid.set(x, y, make_cell(material, 0));
}

/// Re-arm the chunk for a cell whose rule did nothing this tick but must
/// keep being visited (failed a probability roll, or is inherently
/// transient like fire and gases). Without this the scheduler would put a
/// chunk to sleep mid-roll.
#[inline]
pub fn keep_active(grid: &mut Grid, x: u32, y: u32) {
    grid.mark_chunk_active_at(x, y);
}

/// Material of the cell under the cursor, straight from the context.
#[inline]
pub fn self_material(ctx: &UpdateContext) -> MaterialId {
    material_of(ctx.grid.get(ctx.x as i32, ctx.y as i32))
}

/// Behavior registry - dispatch by material id.
pub struct BehaviorRegistry {
    powder: PowderBehavior,
    liquid: LiquidBehavior,
    gas: GasBehavior,
    fire: FireBehavior,
    solids: SolidsBehavior,
}

impl BehaviorRegistry {
    pub fn new() -> Self {
        Self {
            powder: PowderBehavior,
            liquid: LiquidBehavior,
            gas: GasBehavior,
            fire: FireBehavior,
            solids: SolidsBehavior,
        }
    }

    /// Run the rule for the given material. Empty, player and arrow cells
    /// have no rule; grass is static and only reacts to aggressors.
    pub fn update(&self, material: MaterialId, ctx: &mut UpdateContext) {
        match material {
            MAT_SAND | MAT_DIRT | MAT_SNOW => self.powder.update(ctx),
            MAT_WATER | MAT_OIL | MAT_LAVA | MAT_ACID => self.liquid.update(ctx),
            MAT_SMOKE | MAT_STEAM => self.gas.update(ctx),
            MAT_FIRE => self.fire.update(ctx),
            MAT_ROCK | MAT_WOOD | MAT_LEAF | MAT_ICE | MAT_GRASS => self.solids.update(ctx),
            _ => {}
        }
    }
}

impl Default for BehaviorRegistry {
    fn default() -> Self {
        Self::new()
    }
}
