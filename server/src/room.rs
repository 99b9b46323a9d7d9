use system::{CanvasState, EditAction, EditHistory, Pixel, PresenceTable};

/// Eviction bookkeeping for a memberless room. The epoch distinguishes
/// the timer that is allowed to destroy the room from stale ones: any
/// join bumps it, so an in-flight expiry message no longer matches.
#[derive(Debug, Default)]
pub struct EvictionState {
    pub armed: bool,
    pub epoch: u64,
}

/// One isolated collaborative session: the authoritative canvas, the
/// shared edit history, and the member table. All access is funneled
/// through the single server task, so no interior locking is needed.
pub struct Room {
    pub canvas: CanvasState,
    pub history: EditHistory,
    pub presence: PresenceTable,
    pub eviction: EvictionState,
}

impl Room {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            canvas: CanvasState::new(width, height),
            history: EditHistory::new(),
            presence: PresenceTable::new(),
            eviction: EvictionState::default(),
        }
    }

    /// Applies one pixel write; accepted writes are recorded in the
    /// history, dropped ones leave no trace.
    pub fn draw_pixel(&mut self, x: u16, y: u16, color: String) -> bool {
        if !self.canvas.set_pixel(x, y, color.clone()) {
            return false;
        }
        self.history.record(EditAction::Pixel { x, y, color });
        true
    }

    /// Applies a batch in order (last write wins per coordinate) and
    /// records each accepted entry individually. Returns the accepted
    /// entries for broadcast.
    pub fn draw_pixels(&mut self, pixels: Vec<Pixel>) -> Vec<Pixel> {
        let accepted = self.canvas.set_pixels(pixels);
        for pixel in &accepted {
            self.history.record(EditAction::from(pixel));
        }
        accepted
    }

    pub fn clear(&mut self) {
        self.canvas.clear();
        self.history.record(EditAction::Clear);
    }

    /// Truncates the last action and recomputes the canvas by replay.
    /// `None` on an empty history; otherwise the full recomputed pixel
    /// set for broadcast.
    pub fn undo(&mut self) -> Option<Vec<Pixel>> {
        if !self.history.undo() {
            return None;
        }
        self.canvas = self
            .history
            .materialize(self.canvas.width(), self.canvas.height());
        Some(self.canvas.snapshot())
    }
}
