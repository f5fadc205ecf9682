//! Undo/redo stacks fed by the scene's recorded actions.

use crate::action::UndoableAction;
use crate::scene::Scene;

/// Maximum number of undo states to keep.
pub const MAX_UNDO_HISTORY: usize = 50;

/// Linear undo history.
#[derive(Debug, Default)]
pub struct History {
    undo_stack: Vec<UndoableAction>,
    redo_stack: Vec<UndoableAction>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a new action. Clears the redo stack.
    pub fn push(&mut self, action: UndoableAction) {
        self.undo_stack.push(action);
        self.redo_stack.clear();

        if self.undo_stack.len() > MAX_UNDO_HISTORY {
            self.undo_stack.remove(0);
        }
    }

    /// Move every action the scene recorded since the last call onto the stack.
    ///
    /// Returns the number of actions collected.
    pub fn collect(&mut self, scene: &mut Scene) -> usize {
        let actions = scene.take_actions();
        let count = actions.len();
        for action in actions {
            self.push(action);
        }
        count
    }

    /// Undo the last action.
    /// Returns true if undo was performed, false if nothing to undo.
    pub fn undo(&mut self, scene: &mut Scene) -> bool {
        // Anything still pending belongs on the stack before we rewind.
        self.collect(scene);
        let Some(action) = self.undo_stack.pop() else {
            return false;
        };
        {
            let _quiet = scene.suppression().suppress();
            action.undo(scene);
        }
        log::debug!("Undo: {}", action.description());
        self.redo_stack.push(action);
        true
    }

    /// Redo the last undone action.
    /// Returns true if redo was performed, false if nothing to redo.
    pub fn redo(&mut self, scene: &mut Scene) -> bool {
        // A pending edit invalidates the redo stack.
        self.collect(scene);
        let Some(action) = self.redo_stack.pop() else {
            return false;
        };
        {
            let _quiet = scene.suppression().suppress();
            action.redo(scene);
        }
        log::debug!("Redo: {}", action.description());
        self.undo_stack.push(action);
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Description of the action `undo` would revert.
    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack.last().map(UndoableAction::description)
    }

    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack.last().map(UndoableAction::description)
    }
}
