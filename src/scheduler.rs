//! Scheduler - per-frame traversal of active chunks
//!
//! Walks every chunk whose active bit is set, in a stable interior order:
//! chunk rows bottom-up, rows inside a chunk bottom-up, horizontal direction
//! alternating with frame parity so powders do not drift sideways. The
//! active bit is cleared *before* the chunk is visited, so rules that mutate
//! cells re-arm it for the next tick.
//!
//! Single-threaded, blocking: one call is one tick, no suspension points.

use crate::chunks::CHUNK_SIZE;
use crate::grid::Grid;

/// Vertical scan direction. Bottom-up is the default (gravity settles into
/// already-visited rows).
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum ScanOrder {
    #[default]
    BottomUp,
    TopDown,
}

/// Visit every interior cell of every active chunk.
///
/// `per_cell(grid, idx, x, y)` may mutate the grid; any `set`/`swap`
/// reactivates the touched chunk (and edge neighbors) for the next tick.
pub fn step_active_chunks<F>(grid: &mut Grid, order: ScanOrder, frame: u64, mut per_cell: F)
where
    F: FnMut(&mut Grid, usize, u32, u32),
{
    let (chunks_x, chunks_y) = grid.chunks.dimensions();
    let width = grid.width();
    let height = grid.height();
    let go_right = (frame & 1) == 0;

    let chunk_rows: Vec<u32> = match order {
        ScanOrder::BottomUp => (0..chunks_y).rev().collect(),
        ScanOrder::TopDown => (0..chunks_y).collect(),
    };

    for cy in chunk_rows {
        for cx in 0..chunks_x {
            if !grid.chunks.is_active(cx, cy) {
                continue;
            }
            grid.chunks.clear_active(cx, cy);

            let x0 = cx * CHUNK_SIZE;
            let y0 = cy * CHUNK_SIZE;
            let x1 = (x0 + CHUNK_SIZE).min(width);
            let y1 = (y0 + CHUNK_SIZE).min(height);

            let rows: Vec<u32> = match order {
                ScanOrder::BottomUp => (y0..y1).rev().collect(),
                ScanOrder::TopDown => (y0..y1).collect(),
            };

            for y in rows {
                if go_right {
                    for x in x0..x1 {
                        let idx = (y * width + x) as usize;
                        per_cell(grid, idx, x, y);
                    }
                } else {
                    for x in (x0..x1).rev() {
                        let idx = (y * width + x) as usize;
                        per_cell(grid, idx, x, y);
                    }
                }
            }
        }
    }
}
