//! Floating selection - a lifted payload living outside the layer
//!
//! Lifting copies the selected cells into a detached buffer; the layer
//! keeps its pixels until commit. Commit folds the session back in as a
//! single Transform command (clear sources, write payload, destination
//! wins on overlap), so a whole float-move-drop round is one history entry.
//! Cancel restores the pre-float selection and touches nothing else.

use log::{debug, warn};

use crate::cell::{material_of, Cell};
use crate::error::EngineError;

use super::command::{Command, PaintData, PaintPixel};
use super::history::History;
use super::selection::Selection;
use super::{ClipboardPayload, EditorDocument, Layer, LayerContent};

/// Why the document forced a commit before proceeding.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CommitReason {
    Enter,
    ToolSwitch,
    OutsideClick,
    Save,
    Export,
    ViewChange,
    LayerChange,
}

impl CommitReason {
    fn as_str(self) -> &'static str {
        match self {
            CommitReason::Enter => "enter",
            CommitReason::ToolSwitch => "tool-switch",
            CommitReason::OutsideClick => "outside-click",
            CommitReason::Save => "save",
            CommitReason::Export => "export",
            CommitReason::ViewChange => "view-change",
            CommitReason::LayerChange => "layer-change",
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FlipAxis {
    Horizontal,
    Vertical,
}

/// The detached payload. At most one session per document.
#[derive(Clone, Debug)]
pub struct FloatingSession {
    pub width: u32,
    pub height: u32,
    pub cells: Vec<Cell>,
    pub mask: Vec<u8>,
    /// Origin in layer coordinates.
    pub x: i32,
    pub y: i32,
    /// Absolute indices the payload was lifted from; empty for clipboard
    /// sessions.
    pub source_indices: Vec<usize>,
    pub pre_float_selection: Selection,
    pub layer_id: String,
    pub active_z: u32,
}

impl FloatingSession {
    fn tracking_selection(&self) -> Selection {
        Selection {
            active: true,
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
            mask: Some(self.mask.clone()),
        }
    }
}

/// Raster dimensions and slice offset of a paintable layer. Voxel layers
/// expose only the active-z slice.
fn layer_slice(layer: &Layer, active_z: u32) -> Option<(u32, u32, usize)> {
    match &layer.content {
        LayerContent::Grid2d { width, height, .. } => Some((*width, *height, 0)),
        LayerContent::Voxel3d { width, height, depth, .. } => {
            let z = active_z.min(depth.saturating_sub(1));
            Some((*width, *height, (z * width * height) as usize))
        }
        LayerContent::Reference { .. } => None,
    }
}

fn paintable_target(doc: &EditorDocument) -> Result<(u32, u32, usize), EngineError> {
    let layer = doc
        .active_layer()
        .ok_or_else(|| EngineError::StateViolation("no active layer".into()))?;
    if layer.locked {
        return Err(EngineError::StateViolation("active layer is locked".into()));
    }
    layer_slice(layer, doc.active_z)
        .ok_or_else(|| EngineError::StateViolation("active layer is not paintable".into()))
}

/// Lift the current selection off the active layer into a new session.
pub fn begin_from_selection(doc: &mut EditorDocument) -> Result<(), EngineError> {
    if doc.floating.is_some() {
        return Err(EngineError::StateViolation("a floating session is already live".into()));
    }
    if !doc.selection.active {
        return Err(EngineError::StateViolation("nothing selected".into()));
    }
    let (lw, lh, base) = paintable_target(doc)?;
    let sel = doc.selection.clone();

    let layer = doc.active_layer().expect("target checked above");
    let cells = layer.cells().expect("paintable checked above");

    let mut payload = vec![0 as Cell; (sel.width * sel.height) as usize];
    let mut mask = vec![0u8; (sel.width * sel.height) as usize];
    let mut source_indices = Vec::new();
    for ly in 0..sel.height {
        for lx in 0..sel.width {
            let px = sel.x + lx as i32;
            let py = sel.y + ly as i32;
            if !sel.contains(px, py) {
                continue;
            }
            if px < 0 || py < 0 || px as u32 >= lw || py as u32 >= lh {
                continue;
            }
            let idx = base + (py as u32 * lw + px as u32) as usize;
            let cell = cells[idx];
            if material_of(cell) == 0 {
                continue;
            }
            let local = (ly * sel.width + lx) as usize;
            payload[local] = cell;
            mask[local] = 1;
            source_indices.push(idx);
        }
    }
    if source_indices.is_empty() {
        return Err(EngineError::StateViolation("selection covers no cells".into()));
    }

    let session = FloatingSession {
        width: sel.width,
        height: sel.height,
        cells: payload,
        mask,
        x: sel.x,
        y: sel.y,
        source_indices,
        pre_float_selection: sel,
        layer_id: doc.active_layer_id.clone(),
        active_z: doc.active_z,
    };
    doc.selection = session.tracking_selection();
    doc.floating = Some(session);
    Ok(())
}

/// Start a session from the clipboard at (x, y). No source indices: commit
/// only writes.
pub fn begin_from_clipboard(doc: &mut EditorDocument, x: i32, y: i32) -> Result<(), EngineError> {
    if doc.floating.is_some() {
        return Err(EngineError::StateViolation("a floating session is already live".into()));
    }
    paintable_target(doc)?;
    let clip = doc
        .clipboard
        .as_ref()
        .ok_or_else(|| EngineError::StateViolation("clipboard is empty".into()))?;

    let session = FloatingSession {
        width: clip.width,
        height: clip.height,
        cells: clip.data.clone(),
        mask: clip.mask.clone(),
        x,
        y,
        source_indices: Vec::new(),
        pre_float_selection: doc.selection.clone(),
        layer_id: doc.active_layer_id.clone(),
        active_z: doc.active_z,
    };
    doc.selection = session.tracking_selection();
    doc.floating = Some(session);
    Ok(())
}

/// Copy the selected cells of the active layer into the clipboard.
pub fn copy_selection(doc: &mut EditorDocument) -> Result<(), EngineError> {
    if !doc.selection.active {
        return Err(EngineError::StateViolation("nothing selected".into()));
    }
    let (lw, lh, base) = paintable_target(doc)?;
    let sel = doc.selection.clone();
    let layer = doc.active_layer().expect("target checked above");
    let cells = layer.cells().expect("paintable checked above");

    let mut data = vec![0 as Cell; (sel.width * sel.height) as usize];
    let mut mask = vec![0u8; (sel.width * sel.height) as usize];
    for ly in 0..sel.height {
        for lx in 0..sel.width {
            let px = sel.x + lx as i32;
            let py = sel.y + ly as i32;
            if !sel.contains(px, py) || px < 0 || py < 0 || px as u32 >= lw || py as u32 >= lh {
                continue;
            }
            let local = (ly * sel.width + lx) as usize;
            data[local] = cells[base + (py as u32 * lw + px as u32) as usize];
            mask[local] = 1;
        }
    }
    doc.clipboard = Some(ClipboardPayload { width: sel.width, height: sel.height, data, mask });
    Ok(())
}

/// Cut = copy + begin-from-selection (no immediate commit).
pub fn cut_selection(doc: &mut EditorDocument) -> Result<(), EngineError> {
    copy_selection(doc)?;
    begin_from_selection(doc)
}

/// Translate the live session. Mutates only the session (and the tracking
/// selection).
pub fn move_by(doc: &mut EditorDocument, dx: i32, dy: i32) -> bool {
    let Some(session) = doc.floating.as_mut() else {
        return false;
    };
    session.x += dx;
    session.y += dy;
    doc.selection = doc.floating.as_ref().unwrap().tracking_selection();
    true
}

/// Rotate the payload by 90, 180 or 270 degrees clockwise, re-rastering
/// cells and mask and recentering the bounding box.
pub fn rotate(doc: &mut EditorDocument, degrees: u32) -> bool {
    let quarters = match degrees {
        90 => 1,
        180 => 2,
        270 => 3,
        _ => return false,
    };
    let Some(session) = doc.floating.as_mut() else {
        return false;
    };
    for _ in 0..quarters {
        let (w, h) = (session.width, session.height);
        let (nw, nh) = (h, w);
        let mut cells = vec![0 as Cell; (nw * nh) as usize];
        let mut mask = vec![0u8; (nw * nh) as usize];
        for y in 0..h {
            for x in 0..w {
                let src = (y * w + x) as usize;
                let nx = h - 1 - y;
                let ny = x;
                let dst = (ny * nw + nx) as usize;
                cells[dst] = session.cells[src];
                mask[dst] = session.mask[src];
            }
        }
        // Keep the bounding box centered on the same spot.
        session.x += (w as i32 - nw as i32) / 2;
        session.y += (h as i32 - nh as i32) / 2;
        session.width = nw;
        session.height = nh;
        session.cells = cells;
        session.mask = mask;
    }
    doc.selection = doc.floating.as_ref().unwrap().tracking_selection();
    true
}

/// Mirror the payload in place.
pub fn flip(doc: &mut EditorDocument, axis: FlipAxis) -> bool {
    let Some(session) = doc.floating.as_mut() else {
        return false;
    };
    let (w, h) = (session.width, session.height);
    let mut cells = session.cells.clone();
    let mut mask = session.mask.clone();
    for y in 0..h {
        for x in 0..w {
            let (sx, sy) = match axis {
                FlipAxis::Horizontal => (w - 1 - x, y),
                FlipAxis::Vertical => (x, h - 1 - y),
            };
            cells[(y * w + x) as usize] = session.cells[(sy * w + sx) as usize];
            mask[(y * w + x) as usize] = session.mask[(sy * w + sx) as usize];
        }
    }
    session.cells = cells;
    session.mask = mask;
    doc.selection = doc.floating.as_ref().unwrap().tracking_selection();
    true
}

/// Fold the live session back into its layer as one Transform command.
/// Destination overrides source-clear, so a zero-offset commit leaves the
/// layer data untouched. Returns false when no session is live or the owner
/// layer vanished (session dropped, selection restored, nothing recorded).
pub fn commit(doc: &mut EditorDocument, history: &mut History) -> bool {
    let Some(session) = doc.floating.take() else {
        return false;
    };

    let slice = doc
        .layer(&session.layer_id)
        .and_then(|layer| layer_slice(layer, session.active_z));
    let Some((lw, lh, base)) = slice else {
        warn!("floating commit: layer {} vanished; dropping session", session.layer_id);
        doc.selection = session.pre_float_selection.clone();
        return false;
    };
    let cells = doc
        .layer(&session.layer_id)
        .and_then(|l| l.cells())
        .expect("slice implies cells");

    // index -> (old, new); sources clear first, payload writes win.
    let mut edits: std::collections::BTreeMap<usize, (u16, u16)> = std::collections::BTreeMap::new();
    for &idx in &session.source_indices {
        if idx < cells.len() {
            edits.insert(idx, (cells[idx], 0));
        }
    }
    for ly in 0..session.height {
        for lx in 0..session.width {
            let local = (ly * session.width + lx) as usize;
            if session.mask[local] == 0 {
                continue;
            }
            let px = session.x + lx as i32;
            let py = session.y + ly as i32;
            if px < 0 || py < 0 || px as u32 >= lw || py as u32 >= lh {
                continue;
            }
            let idx = base + (py as u32 * lw + px as u32) as usize;
            let old = edits.get(&idx).map(|&(old, _)| old).unwrap_or(cells[idx]);
            edits.insert(idx, (old, session.cells[local]));
        }
    }

    let data = PaintData {
        layer_id: session.layer_id.clone(),
        pixels: edits
            .into_iter()
            .map(|(index, (old_value, new_value))| PaintPixel { index, old_value, new_value })
            .collect(),
    };
    let cmd = Command::Transform {
        data,
        selection_before: Some(session.pre_float_selection.clone()),
        selection_after: Some(session.tracking_selection()),
    };
    history.execute(doc, cmd)
}

/// Commit triggered by a document event (enter, tool switch, save, ...).
pub fn auto_commit(doc: &mut EditorDocument, history: &mut History, reason: CommitReason) -> bool {
    if doc.floating.is_some() {
        debug!("auto-committing floating session: {}", reason.as_str());
        commit(doc, history)
    } else {
        false
    }
}

/// Drop the session and restore the pre-float selection.
pub fn cancel(doc: &mut EditorDocument) -> bool {
    match doc.floating.take() {
        Some(session) => {
            doc.selection = session.pre_float_selection;
            true
        }
        None => false,
    }
}
