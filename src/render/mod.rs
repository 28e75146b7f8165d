//! Renderer - palette, surface buffer and composition
//!
//! Turns cell state into a 32-bit pixel surface. The direct path is a
//! palette lookup per cell; document composition layers multiple grids with
//! Porter-Duff source-over plus multiply/screen/overlay in 8-bit fixed
//! point. The surface buffer is reused across frames and overwritten fully.

mod depth;
mod iso;

pub use depth::HeightCache;
pub use iso::{render_document_iso, HeightMode, IsoParams};

use crate::cell::material_of;
use crate::document::{EditorDocument, LayerContent};
use crate::error::EngineError;
use crate::grid::Grid;
use crate::materials::{MATERIAL_DATA, MATERIAL_COUNT};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Layer blend modes supported by the compositor.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlendMode {
    #[default]
    Normal,
    Multiply,
    Screen,
    Overlay,
}

/// Dense material-id -> packed color table. Lookups past the populated
/// range return the background color.
pub struct Palette {
    colors: [u32; 256],
    background: u32,
}

impl Palette {
    /// Build the default palette from the material table.
    pub fn new(background: u32) -> Self {
        let mut colors = [background; 256];
        for (i, m) in MATERIAL_DATA.iter().enumerate() {
            colors[i] = m.color;
        }
        Self { colors, background }
    }

    /// Build from explicit (id, color) entries; ids not listed fall back to
    /// the background.
    pub fn from_entries(entries: &[(u8, u32)], background: u32) -> Self {
        let mut colors = [background; 256];
        for &(id, color) in entries {
            colors[id as usize] = color;
        }
        Self { colors, background }
    }

    #[inline]
    pub fn color_of(&self, id: u8) -> u32 {
        self.colors[id as usize]
    }

    #[inline]
    pub fn background(&self) -> u32 {
        self.background
    }

    pub fn set_color(&mut self, id: u8, color: u32) {
        self.colors[id as usize] = color;
    }

    /// (id, color) pairs for every material the engine defines.
    pub fn entries(&self) -> Vec<(u8, u32)> {
        (0..MATERIAL_COUNT as u8).map(|id| (id, self.colors[id as usize])).collect()
    }
}

/// The render target: W x H packed 32-bit pixels.
pub struct Surface {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

impl Surface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; (width * height) as usize],
        }
    }

    #[inline]
    pub fn width(&self) -> u32 { self.width }

    #[inline]
    pub fn height(&self) -> u32 { self.height }

    #[inline]
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [u32] {
        &mut self.pixels
    }

    /// Raw pointer for zero-copy presentation from JS.
    pub fn pixels_ptr(&self) -> *const u32 {
        self.pixels.as_ptr()
    }

    pub fn clear(&mut self, color: u32) {
        self.pixels.fill(color);
    }

    #[inline]
    pub fn put(&mut self, x: i32, y: i32, color: u32) {
        if x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height {
            self.pixels[(y as u32 * self.width + x as u32) as usize] = color;
        }
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> u32 {
        self.pixels[(y * self.width + x) as usize]
    }

    /// Direct grid -> surface blit: one palette lookup per cell. Rejects the
    /// frame on dimension mismatch; the driver recreates the surface.
    pub fn blit_grid(&mut self, grid: &Grid, palette: &Palette) -> Result<(), EngineError> {
        if grid.width() != self.width || grid.height() != self.height {
            return Err(EngineError::Rendering(format!(
                "surface {}x{} does not match grid {}x{}",
                self.width, self.height,
                grid.width(), grid.height()
            )));
        }

        let cells = grid.cells();
        #[cfg(feature = "parallel")]
        {
            let width = self.width as usize;
            self.pixels
                .par_chunks_mut(width)
                .zip(cells.par_chunks(width))
                .for_each(|(row, src)| {
                    for (px, &cell) in row.iter_mut().zip(src) {
                        *px = palette.color_of(material_of(cell));
                    }
                });
        }
        #[cfg(not(feature = "parallel"))]
        for (px, &cell) in self.pixels.iter_mut().zip(cells) {
            *px = palette.color_of(material_of(cell));
        }
        Ok(())
    }
}

// === Blend math (8-bit fixed point, R low byte) ===

#[inline]
fn channels(c: u32) -> [u32; 4] {
    [c & 0xFF, (c >> 8) & 0xFF, (c >> 16) & 0xFF, (c >> 24) & 0xFF]
}

#[inline]
fn pack(ch: [u32; 4]) -> u32 {
    (ch[0] & 0xFF) | ((ch[1] & 0xFF) << 8) | ((ch[2] & 0xFF) << 16) | ((ch[3] & 0xFF) << 24)
}

#[inline]
fn blend_channel(mode: BlendMode, s: u32, d: u32) -> u32 {
    match mode {
        BlendMode::Normal => s,
        BlendMode::Multiply => s * d / 255,
        BlendMode::Screen => 255 - (255 - s) * (255 - d) / 255,
        BlendMode::Overlay => {
            if d < 128 {
                2 * s * d / 255
            } else {
                255 - 2 * (255 - s) * (255 - d) / 255
            }
        }
    }
}

/// Composite `src` over `dst` with the given mode and layer opacity.
/// Source-over: out = blended * a + dst * (1 - a), a = src_alpha * opacity.
pub fn composite_pixel(dst: u32, src: u32, mode: BlendMode, opacity: f32) -> u32 {
    let s = channels(src);
    let d = channels(dst);
    let a = (s[3] as f32 / 255.0 * opacity.clamp(0.0, 1.0) * 255.0) as u32;
    if a == 0 {
        return dst;
    }

    let mut out = [0u32; 4];
    for i in 0..3 {
        let b = blend_channel(mode, s[i], d[i]);
        out[i] = (b * a + d[i] * (255 - a)) / 255;
    }
    out[3] = (d[3] + a).min(255);
    pack(out)
}

/// Composite every visible grid layer of the document onto the surface,
/// z-index ascending. Voxel layers contribute their active-z slice;
/// reference layers own no pixels and are skipped.
pub fn render_document_to_surface(
    doc: &EditorDocument,
    palette: &Palette,
    surface: &mut Surface,
) -> Result<(), EngineError> {
    if doc.width != surface.width || doc.height != surface.height {
        return Err(EngineError::Rendering(format!(
            "surface {}x{} does not match document {}x{}",
            surface.width, surface.height, doc.width, doc.height
        )));
    }

    surface.clear(palette.background());

    let mut order: Vec<usize> = (0..doc.layers.len()).collect();
    order.sort_by_key(|&i| doc.layers[i].z_index);

    for i in order {
        let layer = &doc.layers[i];
        if !layer.visible {
            continue;
        }
        let (w, h, cells): (u32, u32, &[u16]) = match &layer.content {
            LayerContent::Grid2d { width, height, cells } => (*width, *height, cells),
            LayerContent::Voxel3d { width, height, depth, cells } => {
                let z = doc.active_z.min(depth.saturating_sub(1));
                let slice = (z * width * height) as usize;
                (*width, *height, &cells[slice..slice + (width * height) as usize])
            }
            LayerContent::Reference { .. } => continue,
        };
        if w != surface.width || h != surface.height {
            continue;
        }

        for y in 0..h {
            for x in 0..w {
                let cell = cells[(y * w + x) as usize];
                let material = material_of(cell);
                if material == 0 {
                    continue;
                }
                let src = palette.color_of(material);
                let idx = (y * surface.width + x) as usize;
                let dst = surface.pixels[idx];
                surface.pixels[idx] = composite_pixel(dst, src, layer.blend_mode, layer.opacity);
            }
        }
    }
    Ok(())
}
