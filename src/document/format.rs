//! Document file format (.vxf)
//!
//! UTF-8 JSON. Cell arrays are little-endian u16, base64-encoded. Loading
//! validates the version and every layer's data length; a failed load
//! leaves the caller's current document untouched (errors are values).
//! Unknown layer types are skipped with a warning.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::cell::Cell;
use crate::error::EngineError;
use crate::render::BlendMode;

use super::{DocumentMeta, EditorDocument, Layer, LayerContent, PaletteEntry, Selection, ViewMode};

/// Highest file version this reader understands.
pub const VXF_MAX_SUPPORTED: u8 = 1;

#[derive(Serialize, Deserialize)]
struct VxfDocument {
    version: u8,
    meta: DocumentMeta,
    width: u32,
    height: u32,
    depth: u32,
    #[serde(rename = "viewMode")]
    view_mode: ViewMode,
    palette: Vec<PaletteEntry>,
    layers: Vec<VxfLayer>,
    #[serde(rename = "activeLayerId")]
    active_layer_id: String,
}

#[derive(Serialize, Deserialize)]
struct VxfLayer {
    id: String,
    name: String,
    #[serde(rename = "type")]
    kind: String,
    visible: bool,
    locked: bool,
    opacity: f32,
    #[serde(rename = "blendMode")]
    blend_mode: BlendMode,
    #[serde(rename = "zIndex")]
    z_index: i32,
    #[serde(rename = "isoHeight")]
    iso_height: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    depth: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<String>,
    #[serde(rename = "imageUrl", skip_serializing_if = "Option::is_none")]
    image_url: Option<String>,
}

fn encode_cells(cells: &[Cell]) -> String {
    let mut bytes = Vec::with_capacity(cells.len() * 2);
    for &c in cells {
        bytes.extend_from_slice(&c.to_le_bytes());
    }
    STANDARD.encode(bytes)
}

fn decode_cells(data: &str, expected_len: usize) -> Result<Vec<Cell>, EngineError> {
    let bytes = STANDARD.decode(data)?;
    if bytes.len() % 2 != 0 {
        return Err(EngineError::Serialization("cell data has odd byte length".into()));
    }
    let cells: Vec<Cell> = bytes
        .chunks_exact(2)
        .map(|b| u16::from_le_bytes([b[0], b[1]]))
        .collect();
    if cells.len() != expected_len {
        return Err(EngineError::Serialization(format!(
            "cell data length {} does not match {}",
            cells.len(),
            expected_len
        )));
    }
    Ok(cells)
}

/// Serialize a document to the .vxf JSON text.
pub fn save_document(doc: &EditorDocument) -> Result<String, EngineError> {
    let layers = doc
        .layers
        .iter()
        .map(|layer| {
            let (kind, width, height, depth, data, image_url) = match &layer.content {
                LayerContent::Grid2d { width, height, cells } => (
                    "grid2d",
                    Some(*width),
                    Some(*height),
                    None,
                    Some(encode_cells(cells)),
                    None,
                ),
                LayerContent::Voxel3d { width, height, depth, cells } => (
                    "voxel3d",
                    Some(*width),
                    Some(*height),
                    Some(*depth),
                    Some(encode_cells(cells)),
                    None,
                ),
                LayerContent::Reference { image_url } => {
                    ("reference", None, None, None, None, Some(image_url.clone()))
                }
            };
            VxfLayer {
                id: layer.id.clone(),
                name: layer.name.clone(),
                kind: kind.into(),
                visible: layer.visible,
                locked: layer.locked,
                opacity: layer.opacity,
                blend_mode: layer.blend_mode,
                z_index: layer.z_index,
                iso_height: layer.iso_height,
                width,
                height,
                depth,
                data,
                image_url,
            }
        })
        .collect();

    let file = VxfDocument {
        version: VXF_MAX_SUPPORTED,
        meta: doc.meta.clone(),
        width: doc.width,
        height: doc.height,
        depth: doc.depth,
        view_mode: doc.view_mode,
        palette: doc.palette.clone(),
        layers,
        active_layer_id: doc.active_layer_id.clone(),
    };
    Ok(serde_json::to_string(&file)?)
}

/// Parse a .vxf JSON text into a fresh document. On any error the caller
/// keeps its prior document; this function owns nothing of theirs.
pub fn load_document(json: &str) -> Result<EditorDocument, EngineError> {
    let file: VxfDocument = serde_json::from_str(json)?;
    if file.version > VXF_MAX_SUPPORTED {
        return Err(EngineError::Serialization(format!(
            "file version {} is newer than supported {}",
            file.version, VXF_MAX_SUPPORTED
        )));
    }

    let mut layers = Vec::new();
    for vl in file.layers {
        let content = match vl.kind.as_str() {
            "grid2d" => {
                let (w, h) = match (vl.width, vl.height) {
                    (Some(w), Some(h)) => (w, h),
                    _ => {
                        return Err(EngineError::Serialization(format!(
                            "grid layer {} missing dimensions",
                            vl.id
                        )))
                    }
                };
                let data = vl.data.as_deref().unwrap_or("");
                let cells = decode_cells(data, (w * h) as usize)?;
                LayerContent::Grid2d { width: w, height: h, cells }
            }
            "voxel3d" => {
                let (w, h, d) = match (vl.width, vl.height, vl.depth) {
                    (Some(w), Some(h), Some(d)) => (w, h, d),
                    _ => {
                        return Err(EngineError::Serialization(format!(
                            "voxel layer {} missing dimensions",
                            vl.id
                        )))
                    }
                };
                let data = vl.data.as_deref().unwrap_or("");
                let cells = decode_cells(data, (w * h * d) as usize)?;
                LayerContent::Voxel3d { width: w, height: h, depth: d, cells }
            }
            "reference" => LayerContent::Reference {
                image_url: vl.image_url.unwrap_or_default(),
            },
            other => {
                warn!("skipping layer {} with unknown type {:?}", vl.id, other);
                continue;
            }
        };
        let mut layer = Layer::with_content(vl.id, vl.name, content);
        layer.visible = vl.visible;
        layer.locked = vl.locked;
        layer.opacity = vl.opacity.clamp(0.0, 1.0);
        layer.blend_mode = vl.blend_mode;
        layer.z_index = vl.z_index;
        layer.iso_height = vl.iso_height;
        layers.push(layer);
    }
    if layers.is_empty() {
        return Err(EngineError::Serialization("document has no usable layers".into()));
    }

    let active_layer_id = if layers.iter().any(|l| l.id == file.active_layer_id) {
        file.active_layer_id
    } else {
        layers[0].id.clone()
    };

    let mut doc = EditorDocument::new(file.width, file.height, file.depth);
    doc.meta = file.meta;
    doc.view_mode = file.view_mode;
    doc.layers = layers;
    doc.active_layer_id = active_layer_id;
    doc.palette = file.palette;
    doc.selection = Selection::none();
    for id in doc.layers.iter().map(|l| l.id.clone()).collect::<Vec<_>>() {
        doc.note_loaded_serial(&id);
    }
    Ok(doc)
}
