//! SolidsBehavior - reactive solids (rock, wood, leaf, ice, grass)
//!
//! Mostly static, but not inert: rock tumbles when undermined, wood falls
//! when its structure loses contact with the ground, leaves drop when their
//! tree is gone, ice melts near heat. Ignition of flammable solids is the
//! aggressor's job (fire and lava rules), not handled here.

use super::{
    chance, convert, random_dirs, random_jitter, self_material, try_move, try_move_by_density,
    Behavior, UpdateContext, NEIGHBORS_8,
};
use crate::grid::Grid;
use crate::materials::{
    is_solid, MAT_FIRE, MAT_ICE, MAT_LAVA, MAT_LEAF, MAT_ROCK, MAT_WATER, MAT_WOOD,
};

/// Flood-fill budget for the groundedness test. Structures bigger than this
/// are treated as grounded.
const SUPPORT_FLOOD_CAP: usize = 200;

/// Per-frame groundedness cache: 0 = unknown, 1 = grounded, 2 = floating,
/// 3 = visit in progress.
pub struct SupportCache {
    state: Vec<u8>,
}

impl SupportCache {
    pub fn new(size: usize) -> Self {
        Self { state: vec![0; size] }
    }

    /// Invalidate at the start of every tick.
    pub fn reset(&mut self, size: usize) {
        if self.state.len() != size {
            self.state = vec![0; size];
        } else {
            self.state.fill(0);
        }
    }

    /// Is the wood/solid structure containing (x, y) connected to the world
    /// floor? Flood fill over wood and solid cells, capped, memoized for the
    /// rest of the frame.
    pub fn is_grounded(&mut self, grid: &Grid, x: u32, y: u32) -> bool {
        let start = grid.index(x, y);
        match self.state[start] {
            1 => return true,
            2 => return false,
            _ => {}
        }

        let floor_y = grid.height() as i32 - 1;
        let mut stack: Vec<(i32, i32)> = vec![(x as i32, y as i32)];
        let mut visited: Vec<usize> = Vec::new();
        let mut grounded = false;

        while let Some((cx, cy)) = stack.pop() {
            if !grid.in_bounds(cx, cy) {
                continue;
            }
            let idx = grid.index(cx as u32, cy as u32);
            match self.state[idx] {
                1 => {
                    grounded = true;
                    break;
                }
                2 | 3 => continue,
                _ => {}
            }
            self.state[idx] = 3;
            visited.push(idx);

            if cy == floor_y {
                grounded = true;
                break;
            }
            if visited.len() >= SUPPORT_FLOOD_CAP {
                grounded = true;
                break;
            }

            for (dx, dy) in [(0, 1), (-1, 0), (1, 0), (0, -1)] {
                let (nx, ny) = (cx + dx, cy + dy);
                let n = grid.material_at(nx, ny);
                if grid.in_bounds(nx, ny) && (n == MAT_WOOD || is_solid(n)) {
                    stack.push((nx, ny));
                }
            }
        }

        let mark = if grounded { 1 } else { 2 };
        for idx in visited {
            self.state[idx] = mark;
        }
        grounded
    }
}

pub struct SolidsBehavior;

impl SolidsBehavior {
    fn update_rock(&self, ctx: &mut UpdateContext) {
        let x = ctx.x;
        let y = ctx.y;
        let xi = x as i32;
        let yi = y as i32;

        let below = ctx.grid.material_at(xi, yi + 1);
        if is_solid(below) || below == MAT_LAVA {
            return;
        }
        if !chance(ctx.rng, 40) {
            super::keep_active(ctx.grid, x, y);
            return;
        }
        if try_move_by_density(ctx.grid, x, y, xi, yi + 1) {
            return;
        }
        let (d1, d2) = random_dirs(ctx.rng);
        if try_move(ctx.grid, x, y, xi + d1, yi + 1) {
            return;
        }
        let _ = try_move(ctx.grid, x, y, xi + d2, yi + 1);
    }

    fn update_wood(&self, ctx: &mut UpdateContext) {
        let x = ctx.x;
        let y = ctx.y;
        if ctx.support.is_grounded(ctx.grid, x, y) {
            return;
        }
        if chance(ctx.rng, 60) {
            let _ = try_move_by_density(ctx.grid, x, y, x as i32, y as i32 + 1);
        } else {
            super::keep_active(ctx.grid, x, y);
        }
    }

    fn update_leaf(&self, ctx: &mut UpdateContext) {
        let x = ctx.x;
        let y = ctx.y;
        let xi = x as i32;
        let yi = y as i32;

        // A leaf holds on while its tree does: wood nearby, or anything
        // solid directly underneath.
        let mut supported = is_solid(ctx.grid.material_at(xi, yi + 1));
        if !supported {
            for (dx, dy) in NEIGHBORS_8 {
                if ctx.grid.material_at(xi + dx, yi + dy) == MAT_WOOD {
                    supported = true;
                    break;
                }
            }
        }
        if supported {
            return;
        }

        if chance(ctx.rng, 40) {
            let dx = random_jitter(ctx.rng);
            if try_move(ctx.grid, x, y, xi + dx, yi + 1) {
                return;
            }
            if dx != 0 {
                let _ = try_move(ctx.grid, x, y, xi, yi + 1);
            }
        } else {
            super::keep_active(ctx.grid, x, y);
        }
    }

    fn update_ice(&self, ctx: &mut UpdateContext) {
        let xi = ctx.x as i32;
        let yi = ctx.y as i32;
        for (dx, dy) in NEIGHBORS_8 {
            let n = ctx.grid.material_at(xi + dx, yi + dy);
            if n == MAT_FIRE || n == MAT_LAVA {
                convert(ctx.grid, xi, yi, MAT_WATER);
                return;
            }
        }
    }
}

impl Behavior for SolidsBehavior {
    fn update(&self, ctx: &mut UpdateContext) {
        match self_material(ctx) {
            MAT_ROCK => self.update_rock(ctx),
            MAT_WOOD => self.update_wood(ctx),
            MAT_LEAF => self.update_leaf(ctx),
            MAT_ICE => self.update_ice(ctx),
            // Grass is static; fire and lava act on it from their side.
            _ => {}
        }
    }
}
