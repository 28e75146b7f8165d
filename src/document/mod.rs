//! Document model - layers, selection, history, floating selection
//!
//! The editor side of the engine: an ordered set of layers over a shared
//! canvas, mutated exclusively through data commands so every change is
//! reversible. Layers are a tagged variant; reference layers share the
//! variant machinery without owning pixels.

mod command;
mod draw;
mod floating;
mod format;
mod history;
mod selection;
mod voxel;

pub use command::{Command, PaintData, PaintPixel};
pub use draw::{
    brush_points, ellipse_points, flood_fill, line_points, magic_wand, rect_points, BrushShape,
};
pub use floating::{
    auto_commit, begin_from_clipboard, begin_from_selection, cancel as cancel_floating,
    commit as commit_floating, copy_selection, cut_selection, flip, move_by, rotate, CommitReason,
    FlipAxis, FloatingSession,
};
pub use format::{load_document, save_document, VXF_MAX_SUPPORTED};
pub use history::{History, HISTORY_DEFAULT_MAX};
pub use selection::{Selection, SelectionOp};
pub use voxel::VoxelGrid;

use serde::{Deserialize, Serialize};

use crate::cell::Cell;
use crate::render::BlendMode;

/// Which projection the editor is presenting.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub enum ViewMode {
    #[default]
    #[serde(rename = "2d")]
    TwoD,
    #[serde(rename = "iso")]
    Iso,
    #[serde(rename = "3d")]
    ThreeD,
}

/// Layer payload: paintable cell rasters or an external reference image.
#[derive(Clone, Debug, PartialEq)]
pub enum LayerContent {
    Grid2d { width: u32, height: u32, cells: Vec<Cell> },
    Voxel3d { width: u32, height: u32, depth: u32, cells: Vec<Cell> },
    Reference { image_url: String },
}

impl LayerContent {
    pub fn is_paintable(&self) -> bool {
        !matches!(self, LayerContent::Reference { .. })
    }
}

/// One document layer: content plus draw attributes. Insertion order is
/// preserved in `EditorDocument::layers`; z-index governs draw order.
#[derive(Clone, Debug, PartialEq)]
pub struct Layer {
    pub id: String,
    pub name: String,
    pub visible: bool,
    pub locked: bool,
    pub opacity: f32,
    pub blend_mode: BlendMode,
    pub z_index: i32,
    pub iso_height: i32,
    pub content: LayerContent,
}

impl Layer {
    pub fn grid(id: String, name: String, width: u32, height: u32) -> Self {
        Self::with_content(id, name, LayerContent::Grid2d {
            width,
            height,
            cells: vec![0; (width * height) as usize],
        })
    }

    pub fn voxel(id: String, name: String, width: u32, height: u32, depth: u32) -> Self {
        Self::with_content(id, name, LayerContent::Voxel3d {
            width,
            height,
            depth,
            cells: VoxelGrid::new(width, height, depth).into_cells(),
        })
    }

    /// Wrap an externally produced voxel array (e.g. a generated terrain
    /// block) as a layer. Rejects mismatched lengths.
    pub fn voxel_with_data(
        id: String,
        name: String,
        width: u32,
        height: u32,
        depth: u32,
        cells: Vec<Cell>,
    ) -> Option<Self> {
        if cells.len() != (width * height * depth) as usize {
            return None;
        }
        Some(Self::with_content(id, name, LayerContent::Voxel3d { width, height, depth, cells }))
    }

    pub fn reference(id: String, name: String, image_url: String) -> Self {
        Self::with_content(id, name, LayerContent::Reference { image_url })
    }

    pub fn with_content(id: String, name: String, content: LayerContent) -> Self {
        Self {
            id,
            name,
            visible: true,
            locked: false,
            opacity: 1.0,
            blend_mode: BlendMode::Normal,
            z_index: 0,
            iso_height: 0,
            content,
        }
    }

    /// Mutable cell access for paintable layers.
    pub fn cells_mut(&mut self) -> Option<&mut Vec<Cell>> {
        match &mut self.content {
            LayerContent::Grid2d { cells, .. } | LayerContent::Voxel3d { cells, .. } => Some(cells),
            LayerContent::Reference { .. } => None,
        }
    }

    pub fn cells(&self) -> Option<&[Cell]> {
        match &self.content {
            LayerContent::Grid2d { cells, .. } | LayerContent::Voxel3d { cells, .. } => Some(cells),
            LayerContent::Reference { .. } => None,
        }
    }
}

/// Named palette entry saved with the document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PaletteEntry {
    pub id: u8,
    pub name: String,
    pub color_u32: u32,
    pub flags_u32: u32,
}

/// In-process clipboard payload.
#[derive(Clone, Debug, PartialEq)]
pub struct ClipboardPayload {
    pub width: u32,
    pub height: u32,
    pub data: Vec<Cell>,
    pub mask: Vec<u8>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentMeta {
    pub name: String,
    pub created_ms: u64,
    pub modified_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

/// The editor document: ordered layers, active layer, selection, palette.
pub struct EditorDocument {
    pub meta: DocumentMeta,
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    pub view_mode: ViewMode,
    pub layers: Vec<Layer>,
    pub active_layer_id: String,
    /// Voxel painting slice; independent of the simulator's scan state.
    pub active_z: u32,
    pub selection: Selection,
    pub palette: Vec<PaletteEntry>,
    pub clipboard: Option<ClipboardPayload>,
    pub floating: Option<FloatingSession>,
    next_layer_serial: u64,
}

impl EditorDocument {
    pub fn new(width: u32, height: u32, depth: u32) -> Self {
        let mut doc = Self {
            meta: DocumentMeta { name: "untitled".into(), ..Default::default() },
            width,
            height,
            depth,
            view_mode: ViewMode::TwoD,
            layers: Vec::new(),
            active_layer_id: String::new(),
            active_z: 0,
            selection: Selection::none(),
            palette: Vec::new(),
            clipboard: None,
            floating: None,
            next_layer_serial: 0,
        };
        let id = doc.alloc_layer_id();
        doc.layers.push(Layer::grid(id.clone(), "Layer 1".into(), width, height));
        doc.active_layer_id = id;
        doc
    }

    pub fn alloc_layer_id(&mut self) -> String {
        self.next_layer_serial += 1;
        format!("layer-{}", self.next_layer_serial)
    }

    pub fn layer_index(&self, id: &str) -> Option<usize> {
        self.layers.iter().position(|l| l.id == id)
    }

    pub fn layer(&self, id: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }

    pub fn layer_mut(&mut self, id: &str) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| l.id == id)
    }

    pub fn active_layer(&self) -> Option<&Layer> {
        self.layer(&self.active_layer_id)
    }

    /// Bump the serial counter past loaded layer ids so new ids stay unique.
    pub(crate) fn note_loaded_serial(&mut self, id: &str) {
        if let Some(n) = id.strip_prefix("layer-").and_then(|s| s.parse::<u64>().ok()) {
            self.next_layer_serial = self.next_layer_serial.max(n);
        }
    }
}

/// Serialize after folding in any live floating session, so the file never
/// captures a half-floating state.
pub fn save_with_commit(
    doc: &mut EditorDocument,
    history: &mut History,
) -> Result<String, crate::error::EngineError> {
    floating::auto_commit(doc, history, CommitReason::Save);
    format::save_document(doc)
}

/// Undo with floating auto-commit: the stack never holds a half-floating
/// state.
pub fn undo(doc: &mut EditorDocument, history: &mut History) -> bool {
    floating::commit(doc, history);
    history.undo(doc)
}

/// Redo with floating auto-commit.
pub fn redo(doc: &mut EditorDocument, history: &mut History) -> bool {
    floating::commit(doc, history);
    history.redo(doc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_document_has_one_active_grid_layer() {
        let doc = EditorDocument::new(32, 32, 8);
        assert_eq!(doc.layers.len(), 1);
        assert_eq!(doc.active_layer_id, doc.layers[0].id);
        assert!(doc.layers[0].content.is_paintable());
    }

    #[test]
    fn layer_ids_are_unique() {
        let mut doc = EditorDocument::new(8, 8, 1);
        let a = doc.alloc_layer_id();
        let b = doc.alloc_layer_id();
        assert_ne!(a, b);
    }

    #[test]
    fn reference_layers_are_not_paintable() {
        let l = Layer::reference("r".into(), "ref".into(), "https://example/img.png".into());
        assert!(!l.content.is_paintable());
        assert!(l.cells().is_none());
    }
}
