//! Undo / redo history
//!
//! Each committed operation is one [`EditBatch`]. The undo stack is a ring
//! of fixed capacity: when full, the oldest batch is dropped. Any new batch
//! clears the redo stack.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::TableOperation;
use crate::table::Table;

/// Default number of undo steps kept
pub const DEFAULT_UNDO_CAPACITY: usize = 100;

/// One cell changed by an operation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellEdit {
    /// Column
    pub x: usize,
    /// Row
    pub y: usize,
    /// Value before the edit
    pub old_value: f64,
    /// Value stored by the edit
    pub new_value: f64,
}

impl CellEdit {
    /// Whether the stored value differs from the old one
    pub fn changed(&self) -> bool {
        self.old_value != self.new_value
    }
}

/// All cells changed by one operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditBatch {
    /// Operation that produced the batch
    pub operation: TableOperation,
    /// Cells written, in write order
    pub edits: Vec<CellEdit>,
    /// When the batch was committed
    pub timestamp: DateTime<Utc>,
}

impl EditBatch {
    /// Batch stamped with the current time
    pub fn new(operation: TableOperation, edits: Vec<CellEdit>) -> Self {
        Self {
            operation,
            edits,
            timestamp: Utc::now(),
        }
    }
}

/// Bounded undo stack with redo
#[derive(Debug, Clone)]
pub struct UndoHistory {
    undo: VecDeque<EditBatch>,
    redo: Vec<EditBatch>,
    capacity: usize,
}

impl Default for UndoHistory {
    fn default() -> Self {
        Self::new(DEFAULT_UNDO_CAPACITY)
    }
}

impl UndoHistory {
    /// Empty history keeping at most `capacity` batches
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            undo: VecDeque::with_capacity(capacity),
            redo: Vec::new(),
            capacity,
        }
    }

    /// Maximum number of undo steps
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Change capacity, dropping the oldest batches if needed
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
        while self.undo.len() > self.capacity {
            self.undo.pop_front();
        }
    }

    /// Record a committed batch. Batches with no actual change are ignored.
    pub fn push(&mut self, batch: EditBatch) {
        if !batch.edits.iter().any(CellEdit::changed) {
            return;
        }
        if self.undo.len() == self.capacity {
            self.undo.pop_front();
        }
        self.undo.push_back(batch);
        self.redo.clear();
    }

    /// Whether there is a batch to undo
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    /// Whether there is a batch to redo
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Number of undo steps held
    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    /// Number of redo steps held
    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    /// Label of the operation the next undo would revert
    pub fn peek_undo(&self) -> Option<TableOperation> {
        self.undo.back().map(|b| b.operation)
    }

    /// Forget all undo and redo steps
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    /// Revert the most recent batch. Returns the restored edits.
    pub fn undo(&mut self, table: &mut Table) -> Option<Vec<CellEdit>> {
        let batch = self.undo.pop_back()?;
        let writes: Vec<(usize, usize, f64)> = batch
            .edits
            .iter()
            .filter(|e| table.in_bounds(e.x, e.y))
            .map(|e| (e.x, e.y, e.old_value))
            .collect();
        table.commit(&writes);
        tracing::debug!("Undo {} ({} cells)", batch.operation.name(), writes.len());

        let edits = batch.edits.clone();
        self.redo.push(batch);
        Some(edits)
    }

    /// Re-apply the most recently undone batch. Returns the re-applied edits.
    pub fn redo(&mut self, table: &mut Table) -> Option<Vec<CellEdit>> {
        let batch = self.redo.pop()?;
        let writes: Vec<(usize, usize, f64)> = batch
            .edits
            .iter()
            .filter(|e| table.in_bounds(e.x, e.y))
            .map(|e| (e.x, e.y, e.new_value))
            .collect();
        table.commit(&writes);
        tracing::debug!("Redo {} ({} cells)", batch.operation.name(), writes.len());

        let edits = batch.edits.clone();
        if self.undo.len() == self.capacity {
            self.undo.pop_front();
        }
        self.undo.push_back(batch);
        Some(edits)
    }
}
