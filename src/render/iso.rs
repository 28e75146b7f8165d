//! Isometric composer
//!
//! Projects cells and voxels onto the surface with the parametric iso
//! projection `sx = (x-y)*tileW/2`, `sy = (x+y)*tileH/2 - z*zStep` and
//! paints up to three faces per cell: a top diamond and two descending
//! walls, each shaded against the light direction. Layers compose by
//! z-index ascending; within a layer the diagonal sweep runs back-to-front,
//! so plain overwrites give correct occlusion.

use crate::cell::material_of;
use crate::document::{EditorDocument, LayerContent};
use crate::error::EngineError;
use crate::materials::{density_of, MaterialId};

use super::{Palette, Surface};

/// Per-material extrusion mode.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum HeightMode {
    /// Everything flat on the layer plane.
    Flat,
    /// Every material one default height unit.
    #[default]
    Uniform,
    /// Height proportional to density.
    Density,
    /// Per-material override table; unset entries fall back to density.
    Custom,
}

/// Projection and lighting parameters.
pub struct IsoParams {
    pub tile_w: i32,
    pub tile_h: i32,
    /// Screen pixels per world z unit.
    pub z_step: i32,
    /// World z units per layer z-index step; also the uniform height.
    pub default_height: i32,
    pub origin_x: i32,
    pub origin_y: i32,
    pub light: [f32; 3],
    pub height_mode: HeightMode,
    /// Custom mode: height per material id, -1 = use density.
    pub custom_heights: [i16; 256],
}

impl Default for IsoParams {
    fn default() -> Self {
        Self {
            tile_w: 16,
            tile_h: 8,
            z_step: 4,
            default_height: 1,
            origin_x: 0,
            origin_y: 0,
            light: [0.5, 0.5, 1.0],
            height_mode: HeightMode::Uniform,
            custom_heights: [-1; 256],
        }
    }
}

impl IsoParams {
    fn material_height(&self, id: MaterialId) -> i32 {
        match self.height_mode {
            HeightMode::Flat => 0,
            HeightMode::Uniform => self.default_height,
            HeightMode::Density => density_of(id) as i32 * self.default_height / 100,
            HeightMode::Custom => {
                let h = self.custom_heights[id as usize];
                if h >= 0 {
                    h as i32
                } else {
                    density_of(id) as i32 * self.default_height / 100
                }
            }
        }
    }
}

#[inline]
fn shade(color: u32, factor: f32) -> u32 {
    let f = factor.clamp(0.0, 1.5);
    let r = (((color & 0xFF) as f32 * f) as u32).min(255);
    let g = ((((color >> 8) & 0xFF) as f32 * f) as u32).min(255);
    let b = ((((color >> 16) & 0xFF) as f32 * f) as u32).min(255);
    (color & 0xFF00_0000) | r | (g << 8) | (b << 16)
}

/// Fill the top diamond whose top vertex sits at (cx, cy).
fn fill_diamond(surface: &mut Surface, cx: i32, cy: i32, tw: i32, th: i32, color: u32) {
    for dy in 0..th.max(1) {
        let half = if 2 * dy < th {
            tw * dy / th
        } else {
            tw * (th - dy) / th
        };
        for dx in -half..=half {
            surface.put(cx + dx, cy + dy, color);
        }
    }
}

/// Left wall: parallelogram under the diamond's lower-left edge, descending
/// `depth` pixels.
fn fill_left_wall(surface: &mut Surface, cx: i32, cy: i32, tw: i32, th: i32, depth: i32, color: u32) {
    for dx in 0..=tw / 2 {
        let x = cx - tw / 2 + dx;
        let top = cy + th / 2 + dx * th / tw;
        for dy in 0..depth {
            surface.put(x, top + dy, color);
        }
    }
}

/// Right wall, mirrored.
fn fill_right_wall(surface: &mut Surface, cx: i32, cy: i32, tw: i32, th: i32, depth: i32, color: u32) {
    for dx in 0..=tw / 2 {
        let x = cx + dx;
        let top = cy + th - dx * th / tw;
        for dy in 0..depth {
            surface.put(x, top + dy, color);
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn draw_cell(
    surface: &mut Surface,
    params: &IsoParams,
    palette: &Palette,
    x: i32,
    y: i32,
    total_z: i32,
    material: MaterialId,
) {
    let base = palette.color_of(material);
    let sx = (x - y) * params.tile_w / 2 + params.origin_x;
    let sy = (x + y) * params.tile_h / 2 - total_z * params.z_step + params.origin_y;

    let depth = params.material_height(material) * params.z_step;
    if depth > 0 {
        let left = shade(base, 0.6 + 0.2 * params.light[0]);
        let right = shade(base, 0.7 + 0.2 * params.light[1]);
        fill_left_wall(surface, sx, sy, params.tile_w, params.tile_h, depth, left);
        fill_right_wall(surface, sx, sy, params.tile_w, params.tile_h, depth, right);
    }
    let top = shade(base, 0.9 + 0.1 * params.light[2]);
    fill_diamond(surface, sx, sy, params.tile_w, params.tile_h, top);
}

/// Render every visible layer of the document isometrically. The surface is
/// cleared to transparent; empty cells leave the background showing.
pub fn render_document_iso(
    doc: &EditorDocument,
    palette: &Palette,
    surface: &mut Surface,
    params: &IsoParams,
) -> Result<(), EngineError> {
    if surface.width() == 0 || surface.height() == 0 {
        return Err(EngineError::Rendering("empty iso surface".into()));
    }
    surface.clear(0);

    let mut order: Vec<usize> = (0..doc.layers.len()).collect();
    order.sort_by_key(|&i| doc.layers[i].z_index);

    for i in order {
        let layer = &doc.layers[i];
        if !layer.visible {
            continue;
        }
        let baseline = layer.iso_height + layer.z_index * params.default_height;

        match &layer.content {
            LayerContent::Grid2d { width, height, cells } => {
                // Back-to-front diagonal sweep.
                for s in 0..(width + height - 1) {
                    let x0 = s.saturating_sub(height - 1);
                    let x1 = s.min(width - 1);
                    for x in x0..=x1 {
                        let y = s - x;
                        let cell = cells[(y * width + x) as usize];
                        let material = material_of(cell);
                        if material == 0 {
                            continue;
                        }
                        let total_z = baseline + params.material_height(material);
                        draw_cell(surface, params, palette, x as i32, y as i32, total_z, material);
                    }
                }
            }
            LayerContent::Voxel3d { width, height, depth, cells } => {
                let visible = visible_voxels(*width, *height, *depth, cells);
                for (x, y, z, material) in visible {
                    let total_z = baseline + z as i32;
                    draw_cell(surface, params, palette, x as i32, y as i32, total_z, material);
                }
            }
            LayerContent::Reference { .. } => {}
        }
    }
    Ok(())
}

/// Cull voxels fully hidden by their +X/+Y/+Z neighbors, then sort the rest
/// back-to-front: z ascending, x+y ascending, x ascending.
fn visible_voxels(w: u32, h: u32, d: u32, cells: &[u16]) -> Vec<(u32, u32, u32, MaterialId)> {
    let idx = |x: u32, y: u32, z: u32| (x + y * w + z * w * h) as usize;
    let filled = |x: u32, y: u32, z: u32| -> bool {
        x < w && y < h && z < d && material_of(cells[idx(x, y, z)]) != 0
    };

    let mut out = Vec::new();
    for z in 0..d {
        for y in 0..h {
            for x in 0..w {
                let material = material_of(cells[idx(x, y, z)]);
                if material == 0 {
                    continue;
                }
                let hidden = filled(x + 1, y, z) && filled(x, y + 1, z) && filled(x, y, z + 1);
                if !hidden {
                    out.push((x, y, z, material));
                }
            }
        }
    }
    out.sort_by_key(|&(x, y, z, _)| (z, x + y, x));
    out
}
