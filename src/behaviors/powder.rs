//! PowderBehavior - falling granular materials (sand, dirt, snow)
//!
//! Straight down first, then a random down-diagonal, then its mirror. A
//! lighter fluid below is displaced by the density rule. Snow is the odd one
//! out: it hangs as a cloud at high altitude and drifts down lazily below
//! the cloud line.

use super::{
    chance, random_dirs, random_jitter, self_material, try_move, try_move_by_density, Behavior,
    UpdateContext, NEIGHBORS_8,
};
use crate::materials::{MAT_FIRE, MAT_ICE, MAT_LAVA, MAT_SNOW, MAT_WATER};

/// Altitude above which snow behaves as a static cloud.
const SNOW_CLOUD_LINE: u32 = 90;
/// Contiguous snow column needed before compaction can fire.
const SNOW_COMPACT_DEPTH: u32 = 6;

pub struct PowderBehavior;

impl PowderBehavior {
    fn update_grain(&self, ctx: &mut UpdateContext) {
        let x = ctx.x;
        let y = ctx.y;
        let xi = x as i32;
        let yi = y as i32;

        if try_move_by_density(ctx.grid, x, y, xi, yi + 1) {
            return;
        }

        let (dx1, dx2) = random_dirs(ctx.rng);
        if try_move(ctx.grid, x, y, xi + dx1, yi + 1) {
            return;
        }
        let _ = try_move(ctx.grid, x, y, xi + dx2, yi + 1);
    }

    fn update_snow(&self, ctx: &mut UpdateContext) {
        let x = ctx.x;
        let y = ctx.y;
        let xi = x as i32;
        let yi = y as i32;

        // Heat melts snow at any altitude.
        for (dx, dy) in NEIGHBORS_8 {
            let n = ctx.grid.material_at(xi + dx, yi + dy);
            if n == MAT_FIRE || n == MAT_LAVA {
                super::convert(ctx.grid, xi, yi, MAT_WATER);
                return;
            }
        }

        if y < SNOW_CLOUD_LINE {
            return;
        }

        // Below the cloud line snow keeps rolling for drift and compaction.
        super::keep_active(ctx.grid, x, y);

        if chance(ctx.rng, 30) {
            let dx = random_jitter(ctx.rng);
            if try_move(ctx.grid, x, y, xi + dx, yi + 1) {
                return;
            }
            if dx != 0 && try_move(ctx.grid, x, y, xi, yi + 1) {
                return;
            }
        }

        // Compaction: a deep enough snow column squeezes the bottom to ice.
        let mut above = 0;
        while above < SNOW_COMPACT_DEPTH && ctx.grid.material_at(xi, yi - 1 - above as i32) == MAT_SNOW {
            above += 1;
        }
        if above >= SNOW_COMPACT_DEPTH && chance(ctx.rng, 5) {
            super::convert(ctx.grid, xi, yi, MAT_ICE);
        }
    }
}

impl Behavior for PowderBehavior {
    fn update(&self, ctx: &mut UpdateContext) {
        if self_material(ctx) == MAT_SNOW {
            self.update_snow(ctx);
        } else {
            self.update_grain(ctx);
        }
    }
}
