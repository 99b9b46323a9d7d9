use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single colored cell, as carried by snapshots and batched writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pixel {
    pub x: u16,
    pub y: u16,
    pub color: String,
}

/// The authoritative grid of cell colors for one room.
///
/// Absent coordinates mean the default background color. Coordinates are
/// bounds-checked on every write so the map can never grow past
/// `width * height` entries, regardless of what clients send.
#[derive(Debug, Clone)]
pub struct CanvasState {
    width: u16,
    height: u16,
    // Keyed (y, x) so snapshots iterate in row-major order.
    pixels: BTreeMap<(u16, u16), String>,
}

impl CanvasState {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            pixels: BTreeMap::new(),
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn contains(&self, x: u16, y: u16) -> bool {
        x < self.width && y < self.height
    }

    /// Stores `color` at `(x, y)`. Out-of-bounds writes are dropped and
    /// reported as `false`.
    pub fn set_pixel(&mut self, x: u16, y: u16, color: String) -> bool {
        if !self.contains(x, y) {
            log::warn!("Dropping out-of-bounds pixel write at ({}, {})", x, y);
            return false;
        }
        self.pixels.insert((y, x), color);
        true
    }

    /// Applies a batch in order; a later entry for the same coordinate wins.
    /// Returns the entries that were actually stored.
    pub fn set_pixels(&mut self, pixels: Vec<Pixel>) -> Vec<Pixel> {
        pixels
            .into_iter()
            .filter(|p| self.set_pixel(p.x, p.y, p.color.clone()))
            .collect()
    }

    pub fn clear(&mut self) {
        self.pixels.clear();
    }

    pub fn get(&self, x: u16, y: u16) -> Option<&str> {
        self.pixels.get(&(y, x)).map(|c| c.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Full pixel list in row-major order, for `room-state` and
    /// `canvas-updated` payloads.
    pub fn snapshot(&self) -> Vec<Pixel> {
        self.pixels
            .iter()
            .map(|(&(y, x), color)| Pixel {
                x,
                y,
                color: color.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel(x: u16, y: u16, color: &str) -> Pixel {
        Pixel {
            x,
            y,
            color: color.into(),
        }
    }

    #[test]
    fn it_stores_and_overwrites_pixels() {
        let mut canvas = CanvasState::new(4, 4);
        assert!(canvas.set_pixel(1, 2, "#ff0000".into()));
        assert!(canvas.set_pixel(1, 2, "#00ff00".into()));
        assert_eq!(canvas.get(1, 2), Some("#00ff00"));
        assert_eq!(canvas.snapshot().len(), 1);
    }

    #[test]
    fn it_drops_out_of_bounds_writes() {
        let mut canvas = CanvasState::new(4, 4);
        assert!(!canvas.set_pixel(4, 0, "#ff0000".into()));
        assert!(!canvas.set_pixel(0, 4, "#ff0000".into()));
        assert!(canvas.is_empty());
    }

    #[test]
    fn it_applies_batches_last_write_wins() {
        let mut canvas = CanvasState::new(4, 4);
        let accepted = canvas.set_pixels(vec![
            pixel(0, 0, "#ff0000"),
            pixel(0, 0, "#0000ff"),
            pixel(9, 9, "#ff0000"),
        ]);
        assert_eq!(accepted.len(), 2);
        assert_eq!(canvas.get(0, 0), Some("#0000ff"));
        assert_eq!(canvas.snapshot().len(), 1);
    }

    #[test]
    fn it_snapshots_in_row_major_order() {
        let mut canvas = CanvasState::new(4, 4);
        canvas.set_pixel(3, 0, "#111111".into());
        canvas.set_pixel(0, 1, "#222222".into());
        canvas.set_pixel(0, 0, "#333333".into());
        let coords: Vec<(u16, u16)> = canvas.snapshot().iter().map(|p| (p.x, p.y)).collect();
        assert_eq!(coords, vec![(0, 0), (3, 0), (0, 1)]);
    }

    #[test]
    fn it_clears_everything() {
        let mut canvas = CanvasState::new(4, 4);
        canvas.set_pixel(0, 0, "#ff0000".into());
        canvas.set_pixel(1, 1, "#ff0000".into());
        canvas.clear();
        assert!(canvas.is_empty());
        assert_eq!(canvas.snapshot(), Vec::new());
    }

    #[test]
    fn it_matches_a_reference_model() {
        use std::collections::HashMap;

        let mut canvas = CanvasState::new(8, 8);
        let mut reference: HashMap<(u16, u16), String> = HashMap::new();

        let script: Vec<(u16, u16, &str)> = vec![
            (0, 0, "#000001"),
            (7, 7, "#000002"),
            (3, 4, "#000003"),
            (0, 0, "#000004"),
            (5, 2, "#000005"),
            (3, 4, "#000006"),
        ];
        for &(x, y, color) in &script {
            canvas.set_pixel(x, y, color.into());
            reference.insert((x, y), color.into());
        }
        canvas.set_pixels(vec![
            pixel(5, 2, "#000007"),
            pixel(5, 2, "#000008"),
            pixel(6, 6, "#000009"),
        ]);
        reference.insert((5, 2), "#000008".into());
        reference.insert((6, 6), "#000009".into());

        let from_canvas: HashMap<(u16, u16), String> = canvas
            .snapshot()
            .into_iter()
            .map(|p| ((p.x, p.y), p.color))
            .collect();
        assert_eq!(from_canvas, reference);
    }
}
