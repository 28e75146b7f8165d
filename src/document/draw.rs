//! Drawing primitives for the editor tools
//!
//! Pure geometry: these functions produce point lists or index regions; the
//! tool layer turns them into PaintData against a layer. Flood fill uses an
//! explicit stack with an optional tolerance on the material byte.

use crate::cell::material_of;
use crate::cell::Cell;

use super::selection::Selection;

/// Brush footprint shapes.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum BrushShape {
    #[default]
    Square,
    Circle,
    Diamond,
}

/// Brush sizes are clamped to this range.
pub const BRUSH_MIN: i32 = 1;
pub const BRUSH_MAX: i32 = 64;

/// Bresenham line, endpoints inclusive.
pub fn line_points(x0: i32, y0: i32, x1: i32, y1: i32) -> Vec<(i32, i32)> {
    let mut points = Vec::new();
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    let (mut x, mut y) = (x0, y0);
    loop {
        points.push((x, y));
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
    points
}

/// Rectangle outline or fill.
pub fn rect_points(x: i32, y: i32, w: u32, h: u32, filled: bool) -> Vec<(i32, i32)> {
    let mut points = Vec::new();
    if w == 0 || h == 0 {
        return points;
    }
    let x1 = x + w as i32 - 1;
    let y1 = y + h as i32 - 1;
    for py in y..=y1 {
        for px in x..=x1 {
            if filled || py == y || py == y1 || px == x || px == x1 {
                points.push((px, py));
            }
        }
    }
    points
}

/// Midpoint ellipse, outline or fill.
pub fn ellipse_points(cx: i32, cy: i32, rx: i32, ry: i32, filled: bool) -> Vec<(i32, i32)> {
    let rx = rx.max(0);
    let ry = ry.max(0);
    let mut points = Vec::new();
    if rx == 0 || ry == 0 {
        // Degenerate: a line through the center.
        for d in -rx.max(ry)..=rx.max(ry) {
            points.push(if rx == 0 { (cx, cy + d) } else { (cx + d, cy) });
        }
        return points;
    }

    // Collect one quadrant's outline, mirror into all four.
    let mut outline: Vec<(i32, i32)> = Vec::new();
    let (rx2, ry2) = ((rx * rx) as i64, (ry * ry) as i64);
    let mut x = 0i64;
    let mut y = ry as i64;
    let mut d1 = ry2 - rx2 * ry as i64 + rx2 / 4;
    while ry2 * x < rx2 * y {
        outline.push((x as i32, y as i32));
        if d1 < 0 {
            d1 += ry2 * (2 * x + 3);
        } else {
            d1 += ry2 * (2 * x + 3) + rx2 * (-2 * y + 2);
            y -= 1;
        }
        x += 1;
    }
    let mut d2 = ry2 * (x * x + x) + ry2 / 4 + rx2 * (y - 1) * (y - 1) - rx2 * ry2;
    while y >= 0 {
        outline.push((x as i32, y as i32));
        if d2 > 0 {
            d2 += rx2 * (-2 * y + 3);
        } else {
            d2 += ry2 * (2 * x + 2) + rx2 * (-2 * y + 3);
            x += 1;
        }
        y -= 1;
    }

    if filled {
        // Horizontal spans between mirrored outline points.
        let mut max_x_at = vec![0i32; ry as usize + 1];
        for &(ox, oy) in &outline {
            let row = oy as usize;
            if row < max_x_at.len() {
                max_x_at[row] = max_x_at[row].max(ox);
            }
        }
        for (row, &mx) in max_x_at.iter().enumerate() {
            for px in -mx..=mx {
                points.push((cx + px, cy + row as i32));
                if row != 0 {
                    points.push((cx + px, cy - row as i32));
                }
            }
        }
    } else {
        for &(ox, oy) in &outline {
            points.push((cx + ox, cy + oy));
            if ox != 0 {
                points.push((cx - ox, cy + oy));
            }
            if oy != 0 {
                points.push((cx + ox, cy - oy));
            }
            if ox != 0 && oy != 0 {
                points.push((cx - ox, cy - oy));
            }
        }
    }
    points
}

/// Flood fill over the material byte with an explicit stack. Returns the
/// indices of the filled region; `tolerance` widens the match around the
/// start cell's material.
pub fn flood_fill(
    cells: &[Cell],
    width: u32,
    height: u32,
    start_x: i32,
    start_y: i32,
    tolerance: u8,
) -> Vec<usize> {
    let mut region = Vec::new();
    if start_x < 0 || start_y < 0 || start_x as u32 >= width || start_y as u32 >= height {
        return region;
    }
    let start_idx = (start_y as u32 * width + start_x as u32) as usize;
    let target = material_of(cells[start_idx]);
    let matches = |cell: Cell| -> bool {
        let m = material_of(cell);
        (m as i16 - target as i16).unsigned_abs() as u8 <= tolerance
    };

    let mut visited = vec![false; cells.len()];
    let mut stack = vec![(start_x, start_y)];
    while let Some((x, y)) = stack.pop() {
        if x < 0 || y < 0 || x as u32 >= width || y as u32 >= height {
            continue;
        }
        let idx = (y as u32 * width + x as u32) as usize;
        if visited[idx] || !matches(cells[idx]) {
            continue;
        }
        visited[idx] = true;
        region.push(idx);
        stack.push((x + 1, y));
        stack.push((x - 1, y));
        stack.push((x, y + 1));
        stack.push((x, y - 1));
    }
    region
}

/// Magic wand: flood from the start cell, collapse the region into a
/// bbox-plus-mask selection.
pub fn magic_wand(
    cells: &[Cell],
    width: u32,
    height: u32,
    start_x: i32,
    start_y: i32,
    tolerance: u8,
) -> Selection {
    let region = flood_fill(cells, width, height, start_x, start_y, tolerance);
    if region.is_empty() {
        return Selection::none();
    }
    let mut min_x = u32::MAX;
    let mut min_y = u32::MAX;
    let mut max_x = 0u32;
    let mut max_y = 0u32;
    for &idx in &region {
        let x = idx as u32 % width;
        let y = idx as u32 / width;
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    }
    let w = max_x - min_x + 1;
    let h = max_y - min_y + 1;
    let mut mask = vec![0u8; (w * h) as usize];
    for &idx in &region {
        let x = idx as u32 % width - min_x;
        let y = idx as u32 / width - min_y;
        mask[(y * w + x) as usize] = 1;
    }
    if mask.iter().all(|&b| b == 1) {
        Selection::rect(min_x as i32, min_y as i32, w, h)
    } else {
        Selection::with_mask(min_x as i32, min_y as i32, w, h, mask)
    }
}

/// Brush footprint centered on (cx, cy). Size is clamped to [1, 64].
pub fn brush_points(shape: BrushShape, cx: i32, cy: i32, size: i32) -> Vec<(i32, i32)> {
    let size = size.clamp(BRUSH_MIN, BRUSH_MAX);
    let r = size / 2;
    let mut points = Vec::new();
    for dy in -r..=r {
        for dx in -r..=r {
            let inside = match shape {
                BrushShape::Square => true,
                BrushShape::Circle => dx * dx + dy * dy <= r * r,
                BrushShape::Diamond => dx.abs() + dy.abs() <= r,
            };
            if inside {
                points.push((cx + dx, cy + dy));
            }
        }
    }
    points
}
