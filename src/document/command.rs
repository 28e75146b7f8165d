//! Commands - reversible document mutations
//!
//! Every command carries its full payload (old and new values), so execute
//! and undo are pure functions over document + payload and the history is
//! trivially serializable. Painted layers get a fresh cell array on every
//! apply so downstream change detection can compare by identity.

use crate::cell::material_of;
use crate::render::BlendMode;

use super::{EditorDocument, Layer, LayerContent, Selection};

/// One cell edit inside a layer's cell array.
#[derive(Clone, Debug, PartialEq)]
pub struct PaintPixel {
    pub index: usize,
    pub old_value: u16,
    pub new_value: u16,
}

/// A batch of cell edits against one layer.
#[derive(Clone, Debug, PartialEq)]
pub struct PaintData {
    pub layer_id: String,
    pub pixels: Vec<PaintPixel>,
}

impl PaintData {
    /// Apply new (or old) values onto the target layer. Returns false when
    /// the layer is missing or owns no cells.
    fn apply(&self, doc: &mut EditorDocument, use_new: bool) -> bool {
        let Some(layer) = doc.layer_mut(&self.layer_id) else {
            return false;
        };
        let Some(cells) = layer.cells_mut() else {
            return false;
        };
        let mut fresh = cells.clone();
        for px in &self.pixels {
            if px.index < fresh.len() {
                fresh[px.index] = if use_new { px.new_value } else { px.old_value };
            }
        }
        *cells = fresh;
        true
    }
}

/// Did a command change the document?
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CommandOutcome {
    Applied,
    Rejected,
}

/// Canonical editor commands. Captured state (`previous_*`) is filled in by
/// `execute` so undo can restore it.
#[derive(Clone, Debug)]
pub enum Command {
    Paint { data: PaintData },
    Erase { data: PaintData },
    Fill { data: PaintData },
    Paste { data: PaintData },
    SetSelection {
        before: Selection,
        after: Selection,
    },
    Transform {
        data: PaintData,
        selection_before: Option<Selection>,
        selection_after: Option<Selection>,
    },
    AddLayer {
        layer: Layer,
        index: Option<usize>,
        previous_active: Option<String>,
    },
    DeleteLayer {
        layer_id: String,
        removed: Option<(Box<Layer>, usize)>,
        previous_active: Option<String>,
    },
    ToggleVisibility { layer_id: String },
    ToggleLock { layer_id: String },
    SetOpacity { layer_id: String, opacity: f32, previous: Option<f32> },
    SetBlendMode { layer_id: String, mode: BlendMode, previous: Option<BlendMode> },
    SetZIndex { layer_id: String, z_index: i32, previous: Option<i32> },
    SetIsoHeight { layer_id: String, iso_height: i32, previous: Option<i32> },
    RenameLayer { layer_id: String, name: String, previous: Option<String> },
    ReorderLayers {
        /// Layer ids top-first.
        order: Vec<String>,
        previous: Option<Vec<(String, i32)>>,
    },
    MergeDown {
        upper_id: String,
        lower_id: String,
        previous: Option<(Vec<Layer>, String)>,
    },
    FlattenGridLayers {
        flattened_id: Option<String>,
        previous: Option<(Vec<Layer>, String)>,
    },
}

impl Command {
    pub fn id(&self) -> &'static str {
        match self {
            Command::Paint { .. } => "paint",
            Command::Erase { .. } => "erase",
            Command::Fill { .. } => "fill",
            Command::Paste { .. } => "paste",
            Command::SetSelection { .. } => "set-selection",
            Command::Transform { .. } => "transform",
            Command::AddLayer { .. } => "add-layer",
            Command::DeleteLayer { .. } => "delete-layer",
            Command::ToggleVisibility { .. } => "toggle-visibility",
            Command::ToggleLock { .. } => "toggle-lock",
            Command::SetOpacity { .. } => "set-opacity",
            Command::SetBlendMode { .. } => "set-blend-mode",
            Command::SetZIndex { .. } => "set-z-index",
            Command::SetIsoHeight { .. } => "set-iso-height",
            Command::RenameLayer { .. } => "rename-layer",
            Command::ReorderLayers { .. } => "reorder-layers",
            Command::MergeDown { .. } => "merge-down",
            Command::FlattenGridLayers { .. } => "flatten-grid-layers",
        }
    }

    /// Commands that can veto execution up front.
    pub fn can_execute(&self, doc: &EditorDocument) -> bool {
        match self {
            Command::DeleteLayer { layer_id, .. } => {
                doc.layers.len() > 1 && doc.layer(layer_id).is_some()
            }
            _ => true,
        }
    }

    pub fn execute(&mut self, doc: &mut EditorDocument) -> CommandOutcome {
        match self {
            Command::Paint { data }
            | Command::Erase { data }
            | Command::Fill { data }
            | Command::Paste { data } => {
                if data.apply(doc, true) {
                    CommandOutcome::Applied
                } else {
                    CommandOutcome::Rejected
                }
            }

            Command::SetSelection { after, .. } => {
                doc.selection = after.clone();
                CommandOutcome::Applied
            }

            Command::Transform { data, selection_after, .. } => {
                if !data.apply(doc, true) {
                    return CommandOutcome::Rejected;
                }
                if let Some(after) = selection_after {
                    doc.selection = after.clone();
                }
                CommandOutcome::Applied
            }

            Command::AddLayer { layer, index, previous_active } => {
                *previous_active = Some(doc.active_layer_id.clone());
                let at = index.unwrap_or(doc.layers.len()).min(doc.layers.len());
                doc.layers.insert(at, layer.clone());
                doc.active_layer_id = layer.id.clone();
                CommandOutcome::Applied
            }

            Command::DeleteLayer { layer_id, removed, previous_active } => {
                if doc.layers.len() <= 1 {
                    return CommandOutcome::Rejected;
                }
                let Some(at) = doc.layer_index(layer_id) else {
                    return CommandOutcome::Rejected;
                };
                *previous_active = Some(doc.active_layer_id.clone());
                let layer = doc.layers.remove(at);
                *removed = Some((Box::new(layer), at));
                if doc.active_layer_id == *layer_id {
                    let fallback = at.min(doc.layers.len().saturating_sub(1));
                    doc.active_layer_id = doc.layers[fallback].id.clone();
                }
                CommandOutcome::Applied
            }

            Command::ToggleVisibility { layer_id } => match doc.layer_mut(layer_id) {
                Some(layer) => {
                    layer.visible = !layer.visible;
                    CommandOutcome::Applied
                }
                None => CommandOutcome::Rejected,
            },

            Command::ToggleLock { layer_id } => match doc.layer_mut(layer_id) {
                Some(layer) => {
                    layer.locked = !layer.locked;
                    CommandOutcome::Applied
                }
                None => CommandOutcome::Rejected,
            },

            Command::SetOpacity { layer_id, opacity, previous } => {
                match doc.layer_mut(layer_id) {
                    Some(layer) => {
                        *previous = Some(layer.opacity);
                        layer.opacity = opacity.clamp(0.0, 1.0);
                        CommandOutcome::Applied
                    }
                    None => CommandOutcome::Rejected,
                }
            }

            Command::SetBlendMode { layer_id, mode, previous } => {
                match doc.layer_mut(layer_id) {
                    Some(layer) => {
                        *previous = Some(layer.blend_mode);
                        layer.blend_mode = *mode;
                        CommandOutcome::Applied
                    }
                    None => CommandOutcome::Rejected,
                }
            }

            Command::SetZIndex { layer_id, z_index, previous } => {
                match doc.layer_mut(layer_id) {
                    Some(layer) => {
                        *previous = Some(layer.z_index);
                        layer.z_index = *z_index;
                        CommandOutcome::Applied
                    }
                    None => CommandOutcome::Rejected,
                }
            }

            Command::SetIsoHeight { layer_id, iso_height, previous } => {
                match doc.layer_mut(layer_id) {
                    Some(layer) => {
                        *previous = Some(layer.iso_height);
                        layer.iso_height = *iso_height;
                        CommandOutcome::Applied
                    }
                    None => CommandOutcome::Rejected,
                }
            }

            Command::RenameLayer { layer_id, name, previous } => {
                match doc.layer_mut(layer_id) {
                    Some(layer) => {
                        *previous = Some(layer.name.clone());
                        layer.name = name.clone();
                        CommandOutcome::Applied
                    }
                    None => CommandOutcome::Rejected,
                }
            }

            Command::ReorderLayers { order, previous } => {
                if !order.iter().any(|id| doc.layer(id).is_some()) {
                    return CommandOutcome::Rejected;
                }
                *previous = Some(
                    doc.layers.iter().map(|l| (l.id.clone(), l.z_index)).collect(),
                );
                // First id in the input order is the top layer.
                let n = order.len() as i32;
                for (i, id) in order.iter().enumerate() {
                    if let Some(layer) = doc.layer_mut(id) {
                        layer.z_index = n - i as i32;
                    }
                }
                CommandOutcome::Applied
            }

            Command::MergeDown { upper_id, lower_id, previous } => {
                let (Some(upper), Some(lower)) = (doc.layer(upper_id), doc.layer(lower_id)) else {
                    return CommandOutcome::Rejected;
                };
                let (LayerContent::Grid2d { width: uw, height: uh, cells: upper_cells },
                     LayerContent::Grid2d { width: lw, height: lh, cells: lower_cells }) =
                    (&upper.content, &lower.content)
                else {
                    return CommandOutcome::Rejected;
                };
                if (uw, uh) != (lw, lh) {
                    return CommandOutcome::Rejected;
                }

                let mut merged = lower_cells.clone();
                for (i, &cell) in upper_cells.iter().enumerate() {
                    if material_of(cell) != 0 {
                        merged[i] = cell;
                    }
                }

                *previous = Some((doc.layers.clone(), doc.active_layer_id.clone()));

                let lower_id = lower_id.clone();
                let upper_id = upper_id.clone();
                if let Some(layer) = doc.layer_mut(&lower_id) {
                    if let Some(cells) = layer.cells_mut() {
                        *cells = merged;
                    }
                }
                if let Some(at) = doc.layer_index(&upper_id) {
                    doc.layers.remove(at);
                }
                doc.active_layer_id = lower_id;
                CommandOutcome::Applied
            }

            Command::FlattenGridLayers { flattened_id, previous } => {
                let doc_w = doc.width;
                let doc_h = doc.height;
                let mut grid_indices: Vec<usize> = doc
                    .layers
                    .iter()
                    .enumerate()
                    .filter(|(_, l)| {
                        matches!(&l.content, LayerContent::Grid2d { width, height, .. }
                            if (*width, *height) == (doc_w, doc_h))
                    })
                    .map(|(i, _)| i)
                    .collect();
                if grid_indices.is_empty() {
                    return CommandOutcome::Rejected;
                }

                *previous = Some((doc.layers.clone(), doc.active_layer_id.clone()));

                // Fold visible grid layers bottom-to-top by z-index.
                let mut fold_order = grid_indices.clone();
                fold_order.sort_by_key(|&i| doc.layers[i].z_index);
                let mut cells = vec![0u16; (doc_w * doc_h) as usize];
                for &i in &fold_order {
                    let layer = &doc.layers[i];
                    if !layer.visible {
                        continue;
                    }
                    if let Some(src) = layer.cells() {
                        for (j, &cell) in src.iter().enumerate() {
                            if material_of(cell) != 0 {
                                cells[j] = cell;
                            }
                        }
                    }
                }

                if flattened_id.is_none() {
                    *flattened_id = Some(doc.alloc_layer_id());
                }
                let id = flattened_id.clone().expect("assigned above");
                let z_index = fold_order.iter().map(|&i| doc.layers[i].z_index).min().unwrap_or(0);
                let mut flattened = Layer::with_content(
                    id.clone(),
                    "Flattened".into(),
                    LayerContent::Grid2d { width: doc_w, height: doc_h, cells },
                );
                flattened.z_index = z_index;

                // Replace all grid layers with the flattened one, in place of
                // the first.
                let insert_at = grid_indices[0];
                grid_indices.reverse();
                for i in grid_indices {
                    doc.layers.remove(i);
                }
                let at = insert_at.min(doc.layers.len());
                doc.layers.insert(at, flattened);
                doc.active_layer_id = id;
                CommandOutcome::Applied
            }
        }
    }

    pub fn undo(&self, doc: &mut EditorDocument) {
        match self {
            Command::Paint { data }
            | Command::Erase { data }
            | Command::Fill { data }
            | Command::Paste { data } => {
                data.apply(doc, false);
            }

            Command::SetSelection { before, .. } => {
                doc.selection = before.clone();
            }

            Command::Transform { data, selection_before, .. } => {
                data.apply(doc, false);
                if let Some(before) = selection_before {
                    doc.selection = before.clone();
                }
            }

            Command::AddLayer { layer, previous_active, .. } => {
                if let Some(at) = doc.layer_index(&layer.id) {
                    doc.layers.remove(at);
                }
                if let Some(prev) = previous_active {
                    doc.active_layer_id = prev.clone();
                }
            }

            Command::DeleteLayer { removed, previous_active, .. } => {
                if let Some((layer, at)) = removed {
                    let at = (*at).min(doc.layers.len());
                    doc.layers.insert(at, (**layer).clone());
                }
                if let Some(prev) = previous_active {
                    doc.active_layer_id = prev.clone();
                }
            }

            Command::ToggleVisibility { layer_id } => {
                if let Some(layer) = doc.layer_mut(layer_id) {
                    layer.visible = !layer.visible;
                }
            }

            Command::ToggleLock { layer_id } => {
                if let Some(layer) = doc.layer_mut(layer_id) {
                    layer.locked = !layer.locked;
                }
            }

            Command::SetOpacity { layer_id, previous, .. } => {
                if let (Some(layer), Some(prev)) = (doc.layer_mut(layer_id), previous) {
                    layer.opacity = *prev;
                }
            }

            Command::SetBlendMode { layer_id, previous, .. } => {
                if let (Some(layer), Some(prev)) = (doc.layer_mut(layer_id), previous) {
                    layer.blend_mode = *prev;
                }
            }

            Command::SetZIndex { layer_id, previous, .. } => {
                if let (Some(layer), Some(prev)) = (doc.layer_mut(layer_id), previous) {
                    layer.z_index = *prev;
                }
            }

            Command::SetIsoHeight { layer_id, previous, .. } => {
                if let (Some(layer), Some(prev)) = (doc.layer_mut(layer_id), previous) {
                    layer.iso_height = *prev;
                }
            }

            Command::RenameLayer { layer_id, previous, .. } => {
                if let (Some(layer), Some(prev)) = (doc.layer_mut(layer_id), previous) {
                    layer.name = prev.clone();
                }
            }

            Command::ReorderLayers { previous, .. } => {
                if let Some(prev) = previous {
                    for (id, z) in prev {
                        if let Some(layer) = doc.layer_mut(id) {
                            layer.z_index = *z;
                        }
                    }
                }
            }

            Command::MergeDown { previous, .. } | Command::FlattenGridLayers { previous, .. } => {
                if let Some((layers, active)) = previous {
                    doc.layers = layers.clone();
                    doc.active_layer_id = active.clone();
                }
            }
        }
    }
}
