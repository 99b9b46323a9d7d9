use serde::{Deserialize, Serialize};

use crate::{CanvasState, Pixel};

/// One accepted mutation of a room's canvas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum EditAction {
    Pixel { x: u16, y: u16, color: String },
    Clear,
}

impl From<&Pixel> for EditAction {
    fn from(p: &Pixel) -> Self {
        EditAction::Pixel {
            x: p.x,
            y: p.y,
            color: p.color.clone(),
        }
    }
}

/// Append-only log of the mutations applied to one room, shared by every
/// member. Replaying it from an empty canvas is the authority for undo:
/// the log only ever grows at the tail or loses its last entry.
///
/// There is no redo log. Once `undo` has truncated an action the server
/// has forgotten it; re-applying is a client concern.
#[derive(Debug, Clone, Default)]
pub struct EditHistory {
    actions: Vec<EditAction>,
}

impl EditHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, action: EditAction) {
        self.actions.push(action);
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Removes the most recent action. Returns `false` on an empty history.
    pub fn undo(&mut self) -> bool {
        self.actions.pop().is_some()
    }

    /// Rebuilds the canvas by replaying every action from an empty state.
    /// Costs O(history length); undo pays that price in exchange for never
    /// having to maintain inverse actions.
    pub fn materialize(&self, width: u16, height: u16) -> CanvasState {
        let mut canvas = CanvasState::new(width, height);
        for action in &self.actions {
            match action {
                EditAction::Pixel { x, y, color } => {
                    canvas.set_pixel(*x, *y, color.clone());
                }
                EditAction::Clear => canvas.clear(),
            }
        }
        canvas
    }
}
