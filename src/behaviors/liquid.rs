//! LiquidBehavior - pressured fluids (water, oil, lava, acid)
//!
//! Fluids fall, slide down diagonals, then spread horizontally. Spread is
//! driven by *pressure*: the count of contiguous same-fluid cells directly
//! above. More pressure means a higher spread chance, a longer search
//! distance, and (for deep columns) a chance to squeeze up through a clear
//! side path.

use super::{
    chance, chance_permille, convert, random_dirs, self_material, try_liquid_spread, try_move,
    Behavior, UpdateContext, NEIGHBORS_4, NEIGHBORS_8,
};
use crate::materials::{
    is_gas, is_solid, props, MaterialId, MAT_ACID, MAT_EMPTY, MAT_FIRE, MAT_ICE, MAT_LAVA,
    MAT_OIL, MAT_ROCK, MAT_SNOW, MAT_STEAM, MAT_WATER,
};

/// Per-fluid spread tuning.
struct FluidParams {
    pressure_cap: u32,
    spread_base: u32,
    spread_coeff: u32,
    spread_max: u32,
    dist_base: u32,
    rise_under_pressure: bool,
}

const WATER_PARAMS: FluidParams = FluidParams {
    pressure_cap: 10,
    spread_base: 30,
    spread_coeff: 10,
    spread_max: 90,
    dist_base: 2,
    rise_under_pressure: true,
};

const OIL_PARAMS: FluidParams = FluidParams {
    pressure_cap: 8,
    spread_base: 15,
    spread_coeff: 8,
    spread_max: 70,
    dist_base: 1,
    rise_under_pressure: true,
};

const ACID_PARAMS: FluidParams = FluidParams {
    pressure_cap: 10,
    spread_base: 25,
    spread_coeff: 10,
    spread_max: 85,
    dist_base: 2,
    rise_under_pressure: true,
};

pub struct LiquidBehavior;

impl LiquidBehavior {
    /// Contiguous same-fluid cells directly above, capped.
    fn pressure_above(ctx: &UpdateContext, mat: MaterialId, cap: u32) -> u32 {
        let xi = ctx.x as i32;
        let yi = ctx.y as i32;
        let mut p = 0;
        while p < cap && ctx.grid.material_at(xi, yi - 1 - p as i32) == mat {
            p += 1;
        }
        p
    }

    /// Scan horizontally for the first empty/gas cell. Solids block the
    /// scan; other fluids are scanned past.
    fn scan_spread(ctx: &UpdateContext, dir: i32, max_dist: u32) -> Option<i32> {
        let xi = ctx.x as i32;
        let yi = ctx.y as i32;
        for i in 1..=max_dist as i32 {
            let tx = xi + dir * i;
            let target = ctx.grid.material_at(tx, yi);
            if target == MAT_EMPTY || is_gas(target) {
                return Some(tx);
            }
            if is_solid(target) {
                return None;
            }
        }
        None
    }

    /// Shared fall-then-spread flow for every fluid.
    fn flow(&self, ctx: &mut UpdateContext, mat: MaterialId, params: &FluidParams) {
        let x = ctx.x;
        let y = ctx.y;
        let xi = x as i32;
        let yi = y as i32;

        if try_move(ctx.grid, x, y, xi, yi + 1) {
            return;
        }
        let (dx1, dx2) = random_dirs(ctx.rng);
        if try_move(ctx.grid, x, y, xi + dx1, yi + 1) {
            return;
        }
        if try_move(ctx.grid, x, y, xi + dx2, yi + 1) {
            return;
        }

        let pressure = Self::pressure_above(ctx, mat, params.pressure_cap);
        let spread_chance = (params.spread_base + params.spread_coeff * pressure).min(params.spread_max);
        if chance(ctx.rng, spread_chance) {
            let max_dist = params.dist_base + pressure / 2;
            let (d1, d2) = random_dirs(ctx.rng);
            let target = Self::scan_spread(ctx, d1, max_dist)
                .or_else(|| Self::scan_spread(ctx, d2, max_dist));
            if let Some(tx) = target {
                ctx.grid.swap(x, y, tx as u32, y);
                return;
            }
        } else {
            // The roll failed, not the scan: stay scheduled.
            super::keep_active(ctx.grid, x, y);
        }

        // Deep columns can force fluid up through a clear side path.
        if params.rise_under_pressure && pressure > 5 && chance(ctx.rng, 10) {
            let (d1, d2) = random_dirs(ctx.rng);
            for dx in [d1, d2] {
                let side = ctx.grid.material_at(xi + dx, yi);
                let upper = ctx.grid.material_at(xi + dx, yi - 1);
                let side_clear = side == MAT_EMPTY || is_gas(side);
                let upper_clear = upper == MAT_EMPTY || is_gas(upper);
                if side_clear && upper_clear {
                    ctx.grid.swap(x, y, (xi + dx) as u32, (yi - 1) as u32);
                    return;
                }
            }
        }
    }

    fn update_water(&self, ctx: &mut UpdateContext) {
        let xi = ctx.x as i32;
        let yi = ctx.y as i32;

        // Quench adjacent fire on the cardinals. The quenching water itself
        // boils away half the time.
        for (dx, dy) in NEIGHBORS_4 {
            if ctx.grid.material_at(xi + dx, yi + dy) == MAT_FIRE {
                convert(ctx.grid, xi + dx, yi + dy, MAT_STEAM);
                if chance(ctx.rng, 50) {
                    convert(ctx.grid, xi, yi, MAT_STEAM);
                    return;
                }
            }
        }

        self.flow(ctx, MAT_WATER, &WATER_PARAMS);
    }

    fn update_oil(&self, ctx: &mut UpdateContext) {
        let x = ctx.x;
        let y = ctx.y;
        let xi = x as i32;
        let yi = y as i32;

        // Oil floats: submerged oil bubbles up through water.
        if ctx.grid.material_at(xi, yi - 1) == MAT_WATER {
            ctx.grid.swap(x, y, x, (yi - 1) as u32);
            return;
        }

        self.flow(ctx, MAT_OIL, &OIL_PARAMS);
    }

    fn update_lava(&self, ctx: &mut UpdateContext) {
        let xi = ctx.x as i32;
        let yi = ctx.y as i32;

        // Interaction sweep runs every tick even when movement is gated.
        for (dx, dy) in NEIGHBORS_8 {
            let (nx, ny) = (xi + dx, yi + dy);
            let n = ctx.grid.material_at(nx, ny);
            match n {
                MAT_WATER => {
                    convert(ctx.grid, nx, ny, MAT_STEAM);
                    if chance(ctx.rng, 40) {
                        convert(ctx.grid, xi, yi, MAT_ROCK);
                        return;
                    }
                }
                MAT_ICE | MAT_SNOW => convert(ctx.grid, nx, ny, MAT_WATER),
                _ => {
                    let lava_flam = props(n).lava_flammability;
                    if lava_flam > 0 && chance(ctx.rng, lava_flam as u32) {
                        convert(ctx.grid, nx, ny, MAT_FIRE);
                    }
                }
            }
        }

        // Ooze: every attempt runs through the viscosity gate, so lava
        // skips movement on most ticks.
        let x = ctx.x;
        let y = ctx.y;
        if try_liquid_spread(ctx.grid, ctx.rng, x, y, xi, yi + 1, MAT_LAVA) {
            return;
        }
        let (d1, d2) = random_dirs(ctx.rng);
        for dx in [d1, d2] {
            if try_liquid_spread(ctx.grid, ctx.rng, x, y, xi + dx, yi + 1, MAT_LAVA) {
                return;
            }
        }
        for dx in [d1, d2] {
            if try_liquid_spread(ctx.grid, ctx.rng, x, y, xi + dx, yi, MAT_LAVA) {
                return;
            }
        }
        super::keep_active(ctx.grid, x, y);
    }

    fn update_acid(&self, ctx: &mut UpdateContext) {
        let xi = ctx.x as i32;
        let yi = ctx.y as i32;

        // Acid is never settled: corrosion and decay keep rolling.
        super::keep_active(ctx.grid, ctx.x, ctx.y);

        // Corrosion: below converts at 60% (consuming the acid), sides at
        // 35%. Resistant materials and other acid are untouched.
        let below = ctx.grid.material_at(xi, yi + 1);
        if below != MAT_EMPTY && below != MAT_ACID && !props(below).acid_resistant && chance(ctx.rng, 60) {
            convert(ctx.grid, xi, yi + 1, MAT_ACID);
            convert(ctx.grid, xi, yi, MAT_EMPTY);
            return;
        }
        for dx in [-1i32, 1] {
            let n = ctx.grid.material_at(xi + dx, yi);
            if n != MAT_EMPTY && n != MAT_ACID && !props(n).acid_resistant && chance(ctx.rng, 35) {
                convert(ctx.grid, xi + dx, yi, MAT_ACID);
            }
        }

        // Background decay.
        if chance_permille(ctx.rng, 2) {
            convert(ctx.grid, xi, yi, MAT_EMPTY);
            return;
        }

        self.flow(ctx, MAT_ACID, &ACID_PARAMS);
    }
}

impl Behavior for LiquidBehavior {
    fn update(&self, ctx: &mut UpdateContext) {
        match self_material(ctx) {
            MAT_WATER => self.update_water(ctx),
            MAT_OIL => self.update_oil(ctx),
            MAT_LAVA => self.update_lava(ctx),
            MAT_ACID => self.update_acid(ctx),
            _ => {}
        }
    }
}
