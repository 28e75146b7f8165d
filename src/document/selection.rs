//! Selection - rectangle plus optional pixel mask
//!
//! When a mask is present it overrides the rectangle interior. Combining
//! selections works at the mask level over the canvas, then collapses back
//! to the minimum bounding rectangle (dropping the mask when the result is
//! a plain rectangle).

use serde::{Deserialize, Serialize};

/// How a new selection combines with the current one.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SelectionOp {
    Replace,
    Union,
    Intersect,
    Subtract,
    Invert,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub active: bool,
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    /// Row-major 0/1 bytes over the rectangle; overrides the interior.
    pub mask: Option<Vec<u8>>,
}

impl Selection {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn rect(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { active: width > 0 && height > 0, x, y, width, height, mask: None }
    }

    pub fn with_mask(x: i32, y: i32, width: u32, height: u32, mask: Vec<u8>) -> Self {
        Self { active: width > 0 && height > 0, x, y, width, height, mask: Some(mask) }
    }

    /// Is the canvas pixel inside the selection?
    pub fn contains(&self, px: i32, py: i32) -> bool {
        if !self.active {
            return false;
        }
        let lx = px - self.x;
        let ly = py - self.y;
        if lx < 0 || ly < 0 || lx as u32 >= self.width || ly as u32 >= self.height {
            return false;
        }
        match &self.mask {
            Some(mask) => mask[(ly as u32 * self.width + lx as u32) as usize] != 0,
            None => true,
        }
    }

    /// Rasterize onto a canvas-sized bitmap.
    fn rasterize(&self, canvas_w: u32, canvas_h: u32, out: &mut [u8]) {
        if !self.active {
            return;
        }
        for ly in 0..self.height {
            let py = self.y + ly as i32;
            if py < 0 || py as u32 >= canvas_h {
                continue;
            }
            for lx in 0..self.width {
                let px = self.x + lx as i32;
                if px < 0 || px as u32 >= canvas_w {
                    continue;
                }
                let inside = match &self.mask {
                    Some(mask) => mask[(ly * self.width + lx) as usize] != 0,
                    None => true,
                };
                if inside {
                    out[(py as u32 * canvas_w + px as u32) as usize] = 1;
                }
            }
        }
    }

    /// Collapse a canvas bitmap to the minimum bounding rectangle plus a
    /// packed mask (or no mask when the region is a full rectangle).
    fn from_bitmap(canvas_w: u32, canvas_h: u32, bits: &[u8]) -> Self {
        let mut min_x = canvas_w;
        let mut min_y = canvas_h;
        let mut max_x = 0u32;
        let mut max_y = 0u32;
        let mut any = false;
        for y in 0..canvas_h {
            for x in 0..canvas_w {
                if bits[(y * canvas_w + x) as usize] != 0 {
                    any = true;
                    min_x = min_x.min(x);
                    min_y = min_y.min(y);
                    max_x = max_x.max(x);
                    max_y = max_y.max(y);
                }
            }
        }
        if !any {
            return Selection::none();
        }
        let w = max_x - min_x + 1;
        let h = max_y - min_y + 1;
        let mut mask = vec![0u8; (w * h) as usize];
        let mut full = true;
        for y in 0..h {
            for x in 0..w {
                let bit = bits[((min_y + y) * canvas_w + (min_x + x)) as usize];
                mask[(y * w + x) as usize] = bit;
                if bit == 0 {
                    full = false;
                }
            }
        }
        Selection {
            active: true,
            x: min_x as i32,
            y: min_y as i32,
            width: w,
            height: h,
            mask: if full { None } else { Some(mask) },
        }
    }

    /// Combine with another selection under the given operation, clipped to
    /// the canvas.
    pub fn combine(&self, other: &Selection, op: SelectionOp, canvas_w: u32, canvas_h: u32) -> Selection {
        if op == SelectionOp::Replace {
            return other.clone();
        }
        let size = (canvas_w * canvas_h) as usize;
        let mut a = vec![0u8; size];
        let mut b = vec![0u8; size];
        self.rasterize(canvas_w, canvas_h, &mut a);
        other.rasterize(canvas_w, canvas_h, &mut b);

        let mut out = vec![0u8; size];
        for i in 0..size {
            out[i] = match op {
                SelectionOp::Replace => unreachable!(),
                SelectionOp::Union => (a[i] | b[i]) & 1,
                SelectionOp::Intersect => a[i] & b[i],
                SelectionOp::Subtract => a[i] & (1 - b[i]),
                SelectionOp::Invert => 1 - a[i],
            };
        }
        Selection::from_bitmap(canvas_w, canvas_h, &out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_contains_its_interior() {
        let s = Selection::rect(2, 2, 3, 3);
        assert!(s.contains(2, 2));
        assert!(s.contains(4, 4));
        assert!(!s.contains(5, 5));
        assert!(!s.contains(1, 2));
    }

    #[test]
    fn mask_overrides_rect_interior() {
        let s = Selection::with_mask(0, 0, 2, 1, vec![1, 0]);
        assert!(s.contains(0, 0));
        assert!(!s.contains(1, 0));
    }

    #[test]
    fn union_of_disjoint_rects_keeps_holes_in_mask() {
        let a = Selection::rect(0, 0, 1, 1);
        let b = Selection::rect(2, 0, 1, 1);
        let u = a.combine(&b, SelectionOp::Union, 4, 4);
        assert_eq!((u.x, u.y, u.width, u.height), (0, 0, 3, 1));
        assert_eq!(u.mask, Some(vec![1, 0, 1]));
    }

    #[test]
    fn intersect_collapses_to_overlap() {
        let a = Selection::rect(0, 0, 3, 3);
        let b = Selection::rect(2, 2, 3, 3);
        let i = a.combine(&b, SelectionOp::Intersect, 8, 8);
        assert_eq!((i.x, i.y, i.width, i.height), (2, 2, 1, 1));
        assert_eq!(i.mask, None);
    }

    #[test]
    fn subtract_carves_a_hole() {
        let a = Selection::rect(0, 0, 3, 1);
        let b = Selection::rect(1, 0, 1, 1);
        let s = a.combine(&b, SelectionOp::Subtract, 4, 4);
        assert_eq!((s.x, s.width), (0, 3));
        assert_eq!(s.mask, Some(vec![1, 0, 1]));
    }

    #[test]
    fn invert_over_canvas() {
        let a = Selection::rect(0, 0, 4, 4);
        let inv = a.combine(&Selection::none(), SelectionOp::Invert, 4, 4);
        assert!(!inv.active);

        let b = Selection::rect(0, 0, 1, 1);
        let inv2 = b.combine(&Selection::none(), SelectionOp::Invert, 2, 1);
        assert_eq!((inv2.x, inv2.width), (1, 1));
    }

    #[test]
    fn full_rect_result_drops_mask() {
        let a = Selection::rect(0, 0, 2, 2);
        let b = Selection::rect(0, 0, 2, 2);
        let u = a.combine(&b, SelectionOp::Union, 4, 4);
        assert_eq!(u.mask, None);
        assert_eq!((u.width, u.height), (2, 2));
    }
}
