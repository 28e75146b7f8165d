//! FireBehavior - combustion
//!
//! Fire lives or dies by what surrounds it: empty neighbors are oxygen,
//! flammable neighbors are fuel. Starved fire dies fast; fed fire ignites
//! its fuel, boils adjacent water and melts ice, then licks upward with
//! lateral jitter.

use super::{
    chance, convert, random_dirs, random_jitter, try_move, Behavior, UpdateContext, NEIGHBORS_8,
};
use crate::materials::{props, MAT_EMPTY, MAT_FIRE, MAT_ICE, MAT_SMOKE, MAT_SNOW, MAT_STEAM, MAT_WATER};

pub struct FireBehavior;

impl Behavior for FireBehavior {
    fn update(&self, ctx: &mut UpdateContext) {
        let x = ctx.x;
        let y = ctx.y;
        let xi = x as i32;
        let yi = y as i32;

        // Fire burns down even when nothing around it changes.
        super::keep_active(ctx.grid, x, y);

        let mut fuel = 0u32;
        let mut oxygen = 0u32;
        for (dx, dy) in NEIGHBORS_8 {
            let n = ctx.grid.material_at(xi + dx, yi + dy);
            if n == MAT_EMPTY {
                oxygen += 1;
            } else if props(n).flammability > 0 {
                fuel += 1;
            }
        }

        // Starvation first; flames also thin toward the top of the grid.
        let mut death = if oxygen < 2 {
            40
        } else if fuel == 0 {
            15
        } else {
            5
        };
        if y < 40 {
            death += (40 - y) / 8;
        }
        if chance(ctx.rng, death) {
            let product = if chance(ctx.rng, 70) { MAT_SMOKE } else { MAT_EMPTY };
            convert(ctx.grid, xi, yi, product);
            return;
        }

        for (dx, dy) in NEIGHBORS_8 {
            let (nx, ny) = (xi + dx, yi + dy);
            let n = ctx.grid.material_at(nx, ny);
            match n {
                MAT_WATER => {
                    // Quenched: the flame flashes to steam and the tick ends.
                    convert(ctx.grid, xi, yi, MAT_STEAM);
                    if chance(ctx.rng, 50) {
                        convert(ctx.grid, nx, ny, MAT_STEAM);
                    }
                    return;
                }
                MAT_ICE | MAT_SNOW => convert(ctx.grid, nx, ny, MAT_WATER),
                _ => {
                    let flam = props(n).flammability;
                    if flam > 0 && n != MAT_FIRE && chance(ctx.rng, flam as u32) {
                        convert(ctx.grid, nx, ny, MAT_FIRE);
                    }
                }
            }
        }

        if chance(ctx.rng, 70) {
            let dx = random_jitter(ctx.rng);
            if try_move(ctx.grid, x, y, xi + dx, yi - 1) {
                return;
            }
            if dx != 0 {
                let _ = try_move(ctx.grid, x, y, xi, yi - 1);
            }
        } else {
            let (d1, d2) = random_dirs(ctx.rng);
            if try_move(ctx.grid, x, y, xi + d1, yi - 1) {
                return;
            }
            let _ = try_move(ctx.grid, x, y, xi + d2, yi - 1);
        }
    }
}
