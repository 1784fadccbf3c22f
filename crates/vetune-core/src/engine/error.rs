//! Edit error types

use thiserror::Error;

use super::TableOperation;
use crate::clipboard::ClipboardError;
use crate::table::TableError;

/// Why an operation was not applied. The table is untouched in every case.
#[allow(missing_docs)]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditError {
    #[error("No active cell or selection")]
    NoTarget,

    #[error("Cell [{x},{y}] is outside the {width}x{height} table")]
    OutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },

    #[error("{} needs a multi-cell selection", .0.name())]
    NoSelection(TableOperation),

    #[error("{} needs a larger region than {width}x{height}", .operation.name())]
    RegionTooSmall {
        operation: TableOperation,
        width: usize,
        height: usize,
    },

    #[error("{} needs a value", .0.name())]
    MissingArgument(TableOperation),

    #[error("Clipboard error: {0}")]
    Clipboard(#[from] ClipboardError),

    #[error("Table error: {0}")]
    Table(#[from] TableError),
}
