//! History - past/future command stacks
//!
//! New executions clear the future stack; the past stack is capped and the
//! oldest entry drops silently when the cap is exceeded.

use log::trace;

use super::command::{Command, CommandOutcome};
use super::EditorDocument;

/// Default cap on retained commands.
pub const HISTORY_DEFAULT_MAX: usize = 100;

pub struct History {
    past: Vec<Command>,
    future: Vec<Command>,
    max_size: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    pub fn new() -> Self {
        Self::with_max_size(HISTORY_DEFAULT_MAX)
    }

    pub fn with_max_size(max_size: usize) -> Self {
        Self {
            past: Vec::new(),
            future: Vec::new(),
            max_size: max_size.max(1),
        }
    }

    pub fn past_len(&self) -> usize {
        self.past.len()
    }

    pub fn future_len(&self) -> usize {
        self.future.len()
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Run a command through the execution protocol. Returns true when the
    /// document changed and the command was recorded.
    pub fn execute(&mut self, doc: &mut EditorDocument, mut cmd: Command) -> bool {
        if !cmd.can_execute(doc) {
            trace!("command {} vetoed by can_execute", cmd.id());
            return false;
        }
        match cmd.execute(doc) {
            CommandOutcome::Rejected => {
                trace!("command {} rejected itself", cmd.id());
                false
            }
            CommandOutcome::Applied => {
                self.past.push(cmd);
                if self.past.len() > self.max_size {
                    self.past.remove(0);
                    trace!("history trimmed to {}", self.max_size);
                }
                self.future.clear();
                true
            }
        }
    }

    /// Undo the most recent command. Returns false on an empty past stack.
    pub fn undo(&mut self, doc: &mut EditorDocument) -> bool {
        match self.past.pop() {
            Some(cmd) => {
                cmd.undo(doc);
                self.future.push(cmd);
                true
            }
            None => false,
        }
    }

    /// Redo the most recently undone command.
    pub fn redo(&mut self, doc: &mut EditorDocument) -> bool {
        match self.future.pop() {
            Some(mut cmd) => {
                cmd.execute(doc);
                self.past.push(cmd);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::super::{Command, EditorDocument, PaintData, PaintPixel};
    use super::*;

    fn paint_cmd(doc: &EditorDocument, index: usize, value: u16) -> Command {
        Command::Paint {
            data: PaintData {
                layer_id: doc.active_layer_id.clone(),
                pixels: vec![PaintPixel { index, old_value: 0, new_value: value }],
            },
        }
    }

    #[test]
    fn execute_clears_future() {
        let mut doc = EditorDocument::new(8, 8, 1);
        let mut h = History::new();
        let cmd = paint_cmd(&doc, 0, 5);
        assert!(h.execute(&mut doc, cmd));
        assert!(h.undo(&mut doc));
        assert_eq!(h.future_len(), 1);
        let cmd = paint_cmd(&doc, 1, 6);
        assert!(h.execute(&mut doc, cmd));
        assert_eq!(h.future_len(), 0);
    }

    #[test]
    fn cap_drops_oldest_silently() {
        let mut doc = EditorDocument::new(8, 8, 1);
        let mut h = History::with_max_size(3);
        for i in 0..5 {
            let cmd = paint_cmd(&doc, i, 9);
            assert!(h.execute(&mut doc, cmd));
        }
        assert_eq!(h.past_len(), 3);
        // Undo past the cap bottoms out at false.
        assert!(h.undo(&mut doc));
        assert!(h.undo(&mut doc));
        assert!(h.undo(&mut doc));
        assert!(!h.undo(&mut doc));
    }

    #[test]
    fn redo_after_undo_is_identity() {
        let mut doc = EditorDocument::new(8, 8, 1);
        let mut h = History::new();
        let cmd = paint_cmd(&doc, 3, 7);
        h.execute(&mut doc, cmd);
        let after = doc.layers[0].cells().unwrap().to_vec();
        h.undo(&mut doc);
        assert_eq!(doc.layers[0].cells().unwrap()[3], 0);
        h.redo(&mut doc);
        assert_eq!(doc.layers[0].cells().unwrap(), &after[..]);
    }

    #[test]
    fn rejected_command_records_nothing() {
        let mut doc = EditorDocument::new(8, 8, 1);
        let mut h = History::new();
        let cmd = Command::Paint {
            data: PaintData { layer_id: "no-such-layer".into(), pixels: vec![] },
        };
        assert!(!h.execute(&mut doc, cmd));
        assert_eq!(h.past_len(), 0);
    }
}
