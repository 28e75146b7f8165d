//! GasBehavior - rising gases (smoke, steam)
//!
//! Gases rise with lateral turbulence and thin out with altitude. Steam has
//! a quirk: above the cloud line it hangs as a near-static nucleus, only
//! dissipating or condensing once it drops below.

use super::{
    chance, convert, random_dirs, random_jitter, self_material, try_move, Behavior, UpdateContext,
    NEIGHBORS_8,
};
use crate::materials::{MAT_EMPTY, MAT_ICE, MAT_SNOW, MAT_STEAM, MAT_WATER};

/// Altitude above which steam condenses into stable clouds.
const STEAM_CLOUD_LINE: u32 = 60;

pub struct GasBehavior;

impl GasBehavior {
    /// Rise one cell with lateral jitter; fall back to the diagonals.
    fn rise(ctx: &mut UpdateContext) {
        let x = ctx.x;
        let y = ctx.y;
        let xi = x as i32;
        let yi = y as i32;

        let dx = random_jitter(ctx.rng);
        if try_move(ctx.grid, x, y, xi + dx, yi - 1) {
            return;
        }
        if dx != 0 && try_move(ctx.grid, x, y, xi, yi - 1) {
            return;
        }
        let (d1, d2) = random_dirs(ctx.rng);
        if try_move(ctx.grid, x, y, xi + d1, yi - 1) {
            return;
        }
        let _ = try_move(ctx.grid, x, y, xi + d2, yi - 1);
    }

    fn update_smoke(&self, ctx: &mut UpdateContext) {
        let xi = ctx.x as i32;
        let yi = ctx.y as i32;

        // Smoke is transient: keep its chunk ticking until it is gone.
        super::keep_active(ctx.grid, ctx.x, ctx.y);

        // Thinner air higher up: dissipation accelerates toward the top.
        let altitude_bonus = if ctx.y < 50 { (50 - ctx.y) / 8 } else { 0 };
        if chance(ctx.rng, 1 + altitude_bonus) || chance(ctx.rng, 2) {
            convert(ctx.grid, xi, yi, MAT_EMPTY);
            return;
        }

        Self::rise(ctx);
    }

    fn update_steam(&self, ctx: &mut UpdateContext) {
        let xi = ctx.x as i32;
        let yi = ctx.y as i32;

        super::keep_active(ctx.grid, ctx.x, ctx.y);

        if ctx.y < STEAM_CLOUD_LINE {
            // Stable cloud: only rare lateral drift.
            if chance(ctx.rng, 2) {
                let dx = random_jitter(ctx.rng);
                if dx != 0 {
                    let _ = try_move(ctx.grid, ctx.x, ctx.y, xi + dx, yi);
                }
            }
            return;
        }

        if chance(ctx.rng, 8) {
            convert(ctx.grid, xi, yi, MAT_EMPTY);
            return;
        }

        let mut cold_neighbors = 0u32;
        for (dx, dy) in NEIGHBORS_8 {
            let n = ctx.grid.material_at(xi + dx, yi + dy);
            if n == MAT_ICE || n == MAT_SNOW {
                cold_neighbors += 1;
            }
        }
        if chance(ctx.rng, 2 + 15 * cold_neighbors) {
            convert(ctx.grid, xi, yi, MAT_WATER);
            return;
        }

        Self::rise(ctx);
    }
}

impl Behavior for GasBehavior {
    fn update(&self, ctx: &mut UpdateContext) {
        if self_material(ctx) == MAT_STEAM {
            self.update_steam(ctx);
        } else {
            self.update_smoke(ctx);
        }
    }
}
