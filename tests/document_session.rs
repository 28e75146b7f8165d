//! Document, history and floating-selection integration tests.

use pixelith_engine::cell::make_cell;
use pixelith_engine::document::{
    self, begin_from_clipboard, begin_from_selection, cancel_floating, commit_floating,
    copy_selection, cut_selection, flip, move_by, rotate, Command, EditorDocument, FlipAxis,
    History, Layer, PaintData, PaintPixel, Selection,
};
use pixelith_engine::materials::{MAT_SAND, MAT_WATER};
use pixelith_engine::render::BlendMode;

fn grid_cells(doc: &EditorDocument, id: &str) -> Vec<u16> {
    doc.layer(id).unwrap().cells().unwrap().to_vec()
}

fn doc_snapshot(doc: &EditorDocument) -> (Vec<Layer>, String, Selection) {
    (doc.layers.clone(), doc.active_layer_id.clone(), doc.selection.clone())
}

/// Paint command round-trip with the documented history counts.
#[test]
fn paint_round_trip() {
    let mut doc = EditorDocument::new(128, 128, 1);
    let mut history = History::new();
    let id = doc.active_layer_id.clone();

    let cmd = Command::Paint {
        data: PaintData {
            layer_id: id.clone(),
            pixels: vec![PaintPixel { index: 0, old_value: 0, new_value: 5 }],
        },
    };
    assert!(history.execute(&mut doc, cmd));
    assert_eq!(grid_cells(&doc, &id)[0], 5);
    assert_eq!(history.past_len(), 1);

    assert!(history.undo(&mut doc));
    assert_eq!(grid_cells(&doc, &id)[0], 0);
    assert_eq!(history.past_len(), 0);
    assert_eq!(history.future_len(), 1);
}

/// Every documented command undoes to an identical document.
#[test]
fn commands_are_reversible() {
    let mut doc = EditorDocument::new(8, 8, 1);
    let id0 = doc.active_layer_id.clone();
    // Seed a second layer so layer commands have something to chew on.
    let id1 = doc.alloc_layer_id();
    let mut second = Layer::grid(id1.clone(), "Layer 2".into(), 8, 8);
    second.z_index = 1;
    doc.layers.push(second);
    if let Some(cells) = doc.layer_mut(&id0).unwrap().cells_mut() {
        cells[3] = make_cell(MAT_SAND, 0);
    }
    if let Some(cells) = doc.layer_mut(&id1).unwrap().cells_mut() {
        cells[3] = make_cell(MAT_WATER, 0);
        cells[9] = make_cell(MAT_WATER, 0);
    }

    let commands: Vec<Command> = vec![
        Command::Paint {
            data: PaintData {
                layer_id: id0.clone(),
                pixels: vec![PaintPixel { index: 7, old_value: 0, new_value: 12 }],
            },
        },
        Command::SetSelection {
            before: Selection::none(),
            after: Selection::rect(1, 1, 3, 3),
        },
        Command::AddLayer {
            layer: Layer::grid("layer-99".into(), "Added".into(), 8, 8),
            index: None,
            previous_active: None,
        },
        Command::DeleteLayer { layer_id: id1.clone(), removed: None, previous_active: None },
        Command::ToggleVisibility { layer_id: id0.clone() },
        Command::ToggleLock { layer_id: id0.clone() },
        Command::SetOpacity { layer_id: id0.clone(), opacity: 0.25, previous: None },
        Command::SetBlendMode { layer_id: id0.clone(), mode: BlendMode::Screen, previous: None },
        Command::SetZIndex { layer_id: id0.clone(), z_index: -3, previous: None },
        Command::SetIsoHeight { layer_id: id0.clone(), iso_height: 9, previous: None },
        Command::RenameLayer { layer_id: id0.clone(), name: "Renamed".into(), previous: None },
        Command::ReorderLayers { order: vec![id0.clone(), id1.clone()], previous: None },
        Command::MergeDown { upper_id: id1.clone(), lower_id: id0.clone(), previous: None },
        Command::FlattenGridLayers { flattened_id: None, previous: None },
    ];

    for cmd in commands {
        let name = cmd.id();
        let before = doc_snapshot(&doc);
        let mut history = History::new();
        assert!(history.execute(&mut doc, cmd), "{name} should apply");
        assert!(history.undo(&mut doc), "{name} should undo");
        assert_eq!(doc_snapshot(&doc), before, "{name} did not round-trip");
    }
}

/// redo . undo == identity, and a new command clears the future stack.
#[test]
fn undo_redo_stack_laws() {
    let mut doc = EditorDocument::new(8, 8, 1);
    let id = doc.active_layer_id.clone();
    let mut history = History::new();

    let paint = |index: usize, value: u16| Command::Paint {
        data: PaintData {
            layer_id: id.clone(),
            pixels: vec![PaintPixel { index, old_value: 0, new_value: value }],
        },
    };

    history.execute(&mut doc, paint(0, 1));
    history.execute(&mut doc, paint(1, 2));
    let full = grid_cells(&doc, &id);

    history.undo(&mut doc);
    history.redo(&mut doc);
    assert_eq!(grid_cells(&doc, &id), full);

    history.undo(&mut doc);
    assert_eq!(history.future_len(), 1);
    history.execute(&mut doc, paint(2, 3));
    assert_eq!(history.future_len(), 0, "new command clears the future");
}

/// Delete-last-layer is refused and leaves everything untouched.
#[test]
fn delete_last_layer_refused() {
    let mut doc = EditorDocument::new(8, 8, 1);
    let mut history = History::new();
    let id = doc.active_layer_id.clone();
    let before = doc_snapshot(&doc);

    let cmd = Command::DeleteLayer { layer_id: id, removed: None, previous_active: None };
    assert!(!history.execute(&mut doc, cmd));
    assert_eq!(doc_snapshot(&doc), before);
    assert_eq!(history.past_len(), 0);
}

/// Merge across mismatched dimensions is blocked.
#[test]
fn merge_mismatched_dimensions_blocked() {
    let mut doc = EditorDocument::new(8, 8, 1);
    let id0 = doc.active_layer_id.clone();
    let small = doc.alloc_layer_id();
    doc.layers.push(Layer::grid(small.clone(), "Small".into(), 4, 4));
    let mut history = History::new();

    let cmd = Command::MergeDown { upper_id: small, lower_id: id0, previous: None };
    assert!(!history.execute(&mut doc, cmd));
    assert_eq!(doc.layers.len(), 2);
}

/// Floating move-and-commit: lift one cell, shift right, fold back in.
#[test]
fn floating_move_and_commit() {
    let mut doc = EditorDocument::new(4, 4, 1);
    let mut history = History::new();
    let id = doc.active_layer_id.clone();
    if let Some(cells) = doc.layer_mut(&id).unwrap().cells_mut() {
        cells[1 * 4 + 1] = 10;
    }
    doc.selection = Selection::rect(1, 1, 1, 1);

    begin_from_selection(&mut doc).unwrap();
    {
        let s = doc.floating.as_ref().unwrap();
        assert_eq!((s.x, s.y), (1, 1));
        assert_eq!(s.cells, vec![10]);
        assert_eq!(s.mask, vec![1]);
    }

    assert!(move_by(&mut doc, 1, 0));
    assert_eq!(doc.floating.as_ref().unwrap().x, 2);
    assert_eq!(doc.selection.x, 2, "marching ants follow the session");

    assert!(commit_floating(&mut doc, &mut history));
    let cells = grid_cells(&doc, &id);
    assert_eq!(cells[1 * 4 + 1], 0, "source cleared");
    assert_eq!(cells[1 * 4 + 2], 10, "payload written at destination");
    assert_eq!(history.past_len(), 1);
    assert!(doc.floating.is_none());
}

/// Commit at zero offset leaves the layer bytes untouched.
#[test]
fn floating_zero_offset_commit_is_noop_on_data() {
    let mut doc = EditorDocument::new(4, 4, 1);
    let mut history = History::new();
    let id = doc.active_layer_id.clone();
    if let Some(cells) = doc.layer_mut(&id).unwrap().cells_mut() {
        cells[5] = 7;
        cells[6] = 8;
    }
    doc.selection = Selection::rect(1, 1, 2, 1);
    let before = grid_cells(&doc, &id);

    begin_from_selection(&mut doc).unwrap();
    assert!(commit_floating(&mut doc, &mut history));
    assert_eq!(grid_cells(&doc, &id), before);
    assert_eq!(history.past_len(), 1, "the selection-tracking command is recorded");
}

/// Four quarter-turns, two half-turns and double flips are identities.
#[test]
fn floating_rotation_round_trips() {
    let mut doc = EditorDocument::new(8, 8, 1);
    let id = doc.active_layer_id.clone();
    if let Some(cells) = doc.layer_mut(&id).unwrap().cells_mut() {
        cells[2 * 8 + 2] = 1;
        cells[2 * 8 + 3] = 2;
        cells[2 * 8 + 4] = 3;
    }
    doc.selection = Selection::rect(2, 2, 3, 1);
    begin_from_selection(&mut doc).unwrap();

    let snapshot = |doc: &EditorDocument| {
        let s = doc.floating.as_ref().unwrap();
        (s.x, s.y, s.width, s.height, s.cells.clone(), s.mask.clone())
    };
    let start = snapshot(&doc);

    for _ in 0..4 {
        assert!(rotate(&mut doc, 90));
    }
    assert_eq!(snapshot(&doc), start);

    assert!(rotate(&mut doc, 180));
    assert!(rotate(&mut doc, 180));
    assert_eq!(snapshot(&doc), start);

    assert!(flip(&mut doc, FlipAxis::Horizontal));
    assert!(flip(&mut doc, FlipAxis::Horizontal));
    assert_eq!(snapshot(&doc), start);

    assert!(flip(&mut doc, FlipAxis::Vertical));
    assert!(flip(&mut doc, FlipAxis::Vertical));
    assert_eq!(snapshot(&doc), start);
}

/// A quarter turn actually transposes the payload.
#[test]
fn floating_rotate_transposes() {
    let mut doc = EditorDocument::new(8, 8, 1);
    let id = doc.active_layer_id.clone();
    if let Some(cells) = doc.layer_mut(&id).unwrap().cells_mut() {
        cells[0] = 1;
        cells[1] = 2;
    }
    doc.selection = Selection::rect(0, 0, 2, 1);
    begin_from_selection(&mut doc).unwrap();

    assert!(rotate(&mut doc, 90));
    let s = doc.floating.as_ref().unwrap();
    assert_eq!((s.width, s.height), (1, 2));
    assert_eq!(s.cells, vec![1, 2]);
}

/// Cancel restores the pre-float selection and leaves the layer alone.
#[test]
fn floating_cancel_restores_selection() {
    let mut doc = EditorDocument::new(4, 4, 1);
    let id = doc.active_layer_id.clone();
    if let Some(cells) = doc.layer_mut(&id).unwrap().cells_mut() {
        cells[5] = 9;
    }
    let pre = Selection::rect(1, 1, 1, 1);
    doc.selection = pre.clone();
    let before = grid_cells(&doc, &id);

    begin_from_selection(&mut doc).unwrap();
    move_by(&mut doc, 2, 2);
    assert!(cancel_floating(&mut doc));

    assert_eq!(doc.selection, pre);
    assert_eq!(grid_cells(&doc, &id), before);
    assert!(doc.floating.is_none());
}

/// Lifting an empty region is rejected.
#[test]
fn floating_requires_live_cells() {
    let mut doc = EditorDocument::new(4, 4, 1);
    doc.selection = Selection::rect(0, 0, 2, 2);
    assert!(begin_from_selection(&mut doc).is_err());
    assert!(doc.floating.is_none());
}

/// Copy + paste: clipboard sessions write without clearing any source.
#[test]
fn clipboard_paste_writes_without_clearing() {
    let mut doc = EditorDocument::new(6, 6, 1);
    let mut history = History::new();
    let id = doc.active_layer_id.clone();
    if let Some(cells) = doc.layer_mut(&id).unwrap().cells_mut() {
        cells[0] = 4;
    }
    doc.selection = Selection::rect(0, 0, 1, 1);
    copy_selection(&mut doc).unwrap();

    begin_from_clipboard(&mut doc, 3, 3).unwrap();
    assert!(commit_floating(&mut doc, &mut history));

    let cells = grid_cells(&doc, &id);
    assert_eq!(cells[0], 4, "source untouched");
    assert_eq!(cells[3 * 6 + 3], 4, "pasted at target");
}

/// Cut lifts the cells without committing anything yet.
#[test]
fn cut_is_copy_plus_float() {
    let mut doc = EditorDocument::new(4, 4, 1);
    let id = doc.active_layer_id.clone();
    if let Some(cells) = doc.layer_mut(&id).unwrap().cells_mut() {
        cells[5] = 3;
    }
    doc.selection = Selection::rect(1, 1, 1, 1);
    cut_selection(&mut doc).unwrap();
    assert!(doc.clipboard.is_some());
    assert!(doc.floating.is_some());
    // The layer keeps its pixels until the session commits.
    assert_eq!(grid_cells(&doc, &id)[5], 3);
}

/// A session whose layer vanished is dropped silently on commit.
#[test]
fn floating_commit_with_vanished_layer_drops_session() {
    let mut doc = EditorDocument::new(4, 4, 1);
    let mut history = History::new();
    let id0 = doc.active_layer_id.clone();
    let id1 = doc.alloc_layer_id();
    doc.layers.push(Layer::grid(id1.clone(), "Other".into(), 4, 4));

    if let Some(cells) = doc.layer_mut(&id0).unwrap().cells_mut() {
        cells[0] = 2;
    }
    let pre = Selection::rect(0, 0, 1, 1);
    doc.selection = pre.clone();
    begin_from_selection(&mut doc).unwrap();

    // The owning layer disappears out from under the session.
    let at = doc.layer_index(&id0).unwrap();
    doc.layers.remove(at);
    doc.active_layer_id = id1;

    assert!(!commit_floating(&mut doc, &mut history));
    assert!(doc.floating.is_none());
    assert_eq!(doc.selection, pre);
    assert_eq!(history.past_len(), 0);
}

/// Undo auto-commits a live session first.
#[test]
fn undo_commits_floating_first() {
    let mut doc = EditorDocument::new(4, 4, 1);
    let mut history = History::new();
    let id = doc.active_layer_id.clone();
    if let Some(cells) = doc.layer_mut(&id).unwrap().cells_mut() {
        cells[0] = 6;
    }
    doc.selection = Selection::rect(0, 0, 1, 1);
    begin_from_selection(&mut doc).unwrap();
    move_by(&mut doc, 1, 1);

    assert!(document::undo(&mut doc, &mut history));
    assert!(doc.floating.is_none(), "undo never sees a half-floating state");
    // The committed Transform was undone: the cell is back home.
    assert_eq!(grid_cells(&doc, &id)[0], 6);
    assert_eq!(grid_cells(&doc, &id)[1 * 4 + 1], 0);
}
