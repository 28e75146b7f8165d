//! Renderer integration: document compositing, depth shading, iso output.

use pixelith_engine::cell::make_cell;
use pixelith_engine::document::{EditorDocument, Layer};
use pixelith_engine::materials::{rgba, MAT_ROCK, MAT_SAND, MAT_WATER};
use pixelith_engine::render::{
    render_document_iso, render_document_to_surface, BlendMode, HeightMode, IsoParams, Palette,
    Surface,
};

/// With one visible normal layer at opacity 1, the surface holds exactly
/// the palette color for every non-empty cell.
#[test]
fn palette_blit_identity() {
    let mut doc = EditorDocument::new(8, 8, 1);
    let id = doc.active_layer_id.clone();
    if let Some(cells) = doc.layer_mut(&id).unwrap().cells_mut() {
        cells[0] = make_cell(MAT_SAND, 0);
        cells[9] = make_cell(MAT_WATER, 0);
        cells[63] = make_cell(MAT_ROCK, 0);
    }

    let palette = Palette::new(rgba(0, 0, 0, 0));
    let mut surface = Surface::new(8, 8);
    render_document_to_surface(&doc, &palette, &mut surface).unwrap();

    assert_eq!(surface.get(0, 0), palette.color_of(MAT_SAND));
    assert_eq!(surface.get(1, 1), palette.color_of(MAT_WATER));
    assert_eq!(surface.get(7, 7), palette.color_of(MAT_ROCK));
    assert_eq!(surface.get(4, 4), palette.background());
}

/// Hidden layers contribute nothing.
#[test]
fn hidden_layers_are_skipped() {
    let mut doc = EditorDocument::new(4, 4, 1);
    let id = doc.active_layer_id.clone();
    if let Some(cells) = doc.layer_mut(&id).unwrap().cells_mut() {
        cells[0] = make_cell(MAT_SAND, 0);
    }
    doc.layer_mut(&id).unwrap().visible = false;

    let palette = Palette::new(0);
    let mut surface = Surface::new(4, 4);
    render_document_to_surface(&doc, &palette, &mut surface).unwrap();
    assert_eq!(surface.get(0, 0), palette.background());
}

/// Higher z-index draws over lower, regardless of insertion order.
#[test]
fn z_index_governs_draw_order() {
    let mut doc = EditorDocument::new(4, 4, 1);
    let bottom = doc.active_layer_id.clone();
    let top = doc.alloc_layer_id();
    let mut top_layer = Layer::grid(top.clone(), "Top".into(), 4, 4);
    top_layer.z_index = 5;
    doc.layers.insert(0, top_layer);

    if let Some(cells) = doc.layer_mut(&bottom).unwrap().cells_mut() {
        cells[0] = make_cell(MAT_SAND, 0);
    }
    if let Some(cells) = doc.layer_mut(&top).unwrap().cells_mut() {
        cells[0] = make_cell(MAT_WATER, 0);
    }

    let palette = Palette::new(0);
    let mut surface = Surface::new(4, 4);
    render_document_to_surface(&doc, &palette, &mut surface).unwrap();
    assert_eq!(surface.get(0, 0), palette.color_of(MAT_WATER));
}

/// Dimension mismatch rejects the frame instead of clipping silently.
#[test]
fn mismatched_surface_rejected() {
    let doc = EditorDocument::new(8, 8, 1);
    let palette = Palette::new(0);
    let mut surface = Surface::new(4, 4);
    assert!(render_document_to_surface(&doc, &palette, &mut surface).is_err());
}

/// Iso output puts pixels on the surface for a single cell and leaves the
/// background transparent.
#[test]
fn iso_renders_a_cell_with_transparent_background() {
    let mut doc = EditorDocument::new(4, 4, 1);
    let id = doc.active_layer_id.clone();
    if let Some(cells) = doc.layer_mut(&id).unwrap().cells_mut() {
        cells[0] = make_cell(MAT_ROCK, 0);
    }

    let palette = Palette::new(0);
    let mut surface = Surface::new(64, 64);
    let params = IsoParams { origin_x: 32, origin_y: 16, ..Default::default() };
    render_document_iso(&doc, &palette, &mut surface, &params).unwrap();

    let drawn = surface.pixels().iter().filter(|&&p| p != 0).count();
    assert!(drawn > 0, "the cell must produce visible pixels");
    // Every drawn pixel derives from the rock color with full alpha.
    for &p in surface.pixels() {
        if p != 0 {
            assert_eq!(p >> 24, 0xFF);
        }
    }
}

/// Flat height mode draws strictly fewer pixels than uniform (no walls).
#[test]
fn flat_mode_draws_no_walls() {
    let mut doc = EditorDocument::new(2, 2, 1);
    let id = doc.active_layer_id.clone();
    if let Some(cells) = doc.layer_mut(&id).unwrap().cells_mut() {
        cells[0] = make_cell(MAT_ROCK, 0);
    }
    let palette = Palette::new(0);
    let count = |mode: HeightMode| {
        let mut surface = Surface::new(64, 64);
        let params = IsoParams {
            origin_x: 32,
            origin_y: 24,
            height_mode: mode,
            ..Default::default()
        };
        render_document_iso(&doc, &palette, &mut surface, &params).unwrap();
        surface.pixels().iter().filter(|&&p| p != 0).count()
    };
    assert!(count(HeightMode::Flat) < count(HeightMode::Uniform));
}

/// A voxel layer renders through culling and sorting without panicking,
/// and taller stacks paint more than flat ones.
#[test]
fn voxel_layer_renders() {
    let mut doc = EditorDocument::new(2, 2, 4);
    let vid = doc.alloc_layer_id();
    let mut layer = Layer::voxel(vid.clone(), "Vox".into(), 2, 2, 4);
    if let Some(cells) = layer.cells_mut() {
        // A 1x1 column of four voxels at (0,0).
        for z in 0..4 {
            cells[z * 4] = make_cell(MAT_ROCK, 0);
        }
    }
    doc.layers.push(layer);

    let palette = Palette::new(0);
    let mut surface = Surface::new(64, 64);
    let params = IsoParams { origin_x: 32, origin_y: 40, ..Default::default() };
    render_document_iso(&doc, &palette, &mut surface, &params).unwrap();
    assert!(surface.pixels().iter().any(|&p| p != 0));
}
