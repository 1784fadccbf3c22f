//! Change tracking
//!
//! Records which cells were modified since the renderer last looked, so a
//! heat map or 3-D view can refresh only what changed.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::engine::TableOperation;
use crate::history::CellEdit;
use crate::selection::{Bounds, CellPos};

/// Notification sent to change listeners after every commit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableChange {
    /// Operation that caused the change; `None` for undo/redo, resize or import
    pub operation: Option<TableOperation>,
    /// Smallest rectangle covering every touched cell; `None` means the whole table
    pub region: Option<Bounds>,
    /// Table revision after the change
    pub revision: u64,
}

/// Set of modified cells
#[derive(Debug, Clone, Default)]
pub struct DirtyCells {
    dirty: HashSet<(usize, usize)>,
    all: bool,
}

impl DirtyCells {
    /// Nothing marked
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark one cell
    pub fn mark(&mut self, x: usize, y: usize) {
        self.dirty.insert((x, y));
    }

    /// Mark every cell touched by a batch
    pub fn mark_edits(&mut self, edits: &[CellEdit]) {
        for e in edits {
            self.dirty.insert((e.x, e.y));
        }
    }

    /// Mark the whole table (resize, import)
    pub fn mark_all(&mut self) {
        self.all = true;
        self.dirty.clear();
    }

    /// Whether the whole table must be redrawn
    pub fn is_all(&self) -> bool {
        self.all
    }

    /// Whether `(x, y)` needs redrawing
    pub fn is_dirty(&self, x: usize, y: usize) -> bool {
        self.all || self.dirty.contains(&(x, y))
    }

    /// Whether anything is marked
    pub fn has_changes(&self) -> bool {
        self.all || !self.dirty.is_empty()
    }

    /// Count of individually marked cells
    pub fn dirty_count(&self) -> usize {
        self.dirty.len()
    }

    /// Marked cells in row-major order
    pub fn cells(&self) -> Vec<CellPos> {
        let mut cells: Vec<CellPos> = self.dirty.iter().map(|&(x, y)| CellPos::new(x, y)).collect();
        cells.sort_by_key(|c| (c.y, c.x));
        cells
    }

    /// Return the marked cells and reset. When the whole table was marked,
    /// every cell of a `width`x`height` table is returned.
    pub fn take(&mut self, width: usize, height: usize) -> Vec<CellPos> {
        let cells = if self.all {
            (0..height)
                .flat_map(|y| (0..width).map(move |x| CellPos::new(x, y)))
                .collect()
        } else {
            self.cells()
        };
        self.clear();
        cells
    }

    /// Forget all marks
    pub fn clear(&mut self) {
        self.dirty.clear();
        self.all = false;
    }
}

/// Smallest rectangle covering all edits
pub fn edit_region(edits: &[CellEdit]) -> Option<Bounds> {
    let first = edits.first()?;
    let mut bounds = Bounds::single(CellPos::new(first.x, first.y));
    for e in &edits[1..] {
        bounds.min_x = bounds.min_x.min(e.x);
        bounds.min_y = bounds.min_y.min(e.y);
        bounds.max_x = bounds.max_x.max(e.x);
        bounds.max_y = bounds.max_y.max(e.y);
    }
    Some(bounds)
}
