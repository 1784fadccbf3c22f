//! Table Clipboard
//!
//! Single-slot store for one rectangular block of cell values. Copy always
//! replaces the previous block; paste is non-destructive and may be repeated.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::selection::{Bounds, CellPos};
use crate::table::Table;

/// Largest block (in either direction) the clipboard will hold
pub const CLIPBOARD_MAX: usize = 32;

/// Errors from clipboard operations
#[allow(missing_docs)]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClipboardError {
    #[error("Clipboard is empty")]
    Empty,

    #[error("Block {width}x{height} exceeds clipboard limit of {max}x{max}")]
    TooLarge {
        width: usize,
        height: usize,
        max: usize,
    },

    #[error("Copy region [{min_x},{min_y}]..[{max_x},{max_y}] is outside the table")]
    OutOfBounds {
        min_x: usize,
        min_y: usize,
        max_x: usize,
        max_y: usize,
    },
}

/// How pasted values combine with the cells underneath
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PasteMode {
    /// Overwrite with the clipboard value
    #[default]
    Replace,
    /// `cell * clip / 100`
    MultiplyPercent,
    /// `cell * clip`
    MultiplyRaw,
    /// `cell + clip`
    Add,
    /// `cell - clip`
    Subtract,
}

impl PasteMode {
    /// Combine an existing cell value with a clipboard value (unclamped)
    pub fn combine(&self, current: f64, clip: f64) -> f64 {
        match self {
            PasteMode::Replace => clip,
            PasteMode::MultiplyPercent => current * (clip / 100.0),
            PasteMode::MultiplyRaw => current * clip,
            PasteMode::Add => current + clip,
            PasteMode::Subtract => current - clip,
        }
    }

    /// Label shown in the paste-special menu
    pub fn name(&self) -> &'static str {
        match self {
            PasteMode::Replace => "Replace",
            PasteMode::MultiplyPercent => "Multiply %",
            PasteMode::MultiplyRaw => "Multiply Raw",
            PasteMode::Add => "Add",
            PasteMode::Subtract => "Subtract",
        }
    }
}

/// One copied block of values
#[derive(Debug, Clone, PartialEq)]
pub struct Clipboard {
    values: Vec<f64>,
    width: usize,
    height: usize,
    max: usize,
}

impl Default for Clipboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Clipboard {
    /// Empty clipboard with the default size limit
    pub fn new() -> Self {
        Self::with_max(CLIPBOARD_MAX)
    }

    /// Empty clipboard holding blocks up to `max`x`max`
    pub fn with_max(max: usize) -> Self {
        Self {
            values: Vec::new(),
            width: 0,
            height: 0,
            max: max.max(1),
        }
    }

    /// Whether a block has been copied
    pub fn has_data(&self) -> bool {
        !self.values.is_empty()
    }

    /// Block width (0 when empty)
    pub fn width(&self) -> usize {
        self.width
    }

    /// Block height (0 when empty)
    pub fn height(&self) -> usize {
        self.height
    }

    /// Value at block-relative `(x, y)`
    pub fn value(&self, x: usize, y: usize) -> Option<f64> {
        if x < self.width && y < self.height {
            Some(self.values[y * self.width + x])
        } else {
            None
        }
    }

    /// Block as nested rows
    pub fn rows(&self) -> Vec<Vec<f64>> {
        if self.width == 0 {
            return Vec::new();
        }
        self.values.chunks(self.width).map(|r| r.to_vec()).collect()
    }

    /// Drop the copied block
    pub fn clear(&mut self) {
        self.values.clear();
        self.width = 0;
        self.height = 0;
    }

    /// Snapshot `bounds` of `table`, replacing any previous block
    pub fn copy(&mut self, table: &Table, bounds: Bounds) -> Result<(), ClipboardError> {
        if !bounds.fits(table.width(), table.height()) {
            return Err(ClipboardError::OutOfBounds {
                min_x: bounds.min_x,
                min_y: bounds.min_y,
                max_x: bounds.max_x,
                max_y: bounds.max_y,
            });
        }
        if bounds.width() > self.max || bounds.height() > self.max {
            return Err(ClipboardError::TooLarge {
                width: bounds.width(),
                height: bounds.height(),
                max: self.max,
            });
        }

        self.values = bounds
            .cells()
            .map(|(x, y)| table.get_or(x, y, 0.0))
            .collect();
        self.width = bounds.width();
        self.height = bounds.height();

        tracing::debug!(
            "Copied [{},{}]..[{},{}] ({}x{}) to clipboard",
            bounds.min_x,
            bounds.min_y,
            bounds.max_x,
            bounds.max_y,
            self.width,
            self.height
        );
        Ok(())
    }

    /// Compute the writes a paste at `origin` would make.
    ///
    /// Cells that would land outside the table are skipped. Values are not
    /// yet clamped; [`Table`] clamps on commit.
    pub fn paste_writes(
        &self,
        table: &Table,
        origin: CellPos,
        mode: PasteMode,
    ) -> Result<Vec<(usize, usize, f64)>, ClipboardError> {
        if !self.has_data() {
            return Err(ClipboardError::Empty);
        }

        let mut writes = Vec::with_capacity(self.values.len());
        for dy in 0..self.height {
            for dx in 0..self.width {
                let (x, y) = (origin.x + dx, origin.y + dy);
                let Some(current) = table.value(x, y) else {
                    continue;
                };
                let clip = self.values[dy * self.width + dx];
                writes.push((x, y, mode.combine(current, clip)));
            }
        }
        Ok(writes)
    }
}
