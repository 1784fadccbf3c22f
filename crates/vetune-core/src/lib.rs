//! # VeTune Core Library
//!
//! Table-editing engine for the VeTune ECU tuning software.

#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//!
//! This library provides:
//! - 2-D tuning tables (VE, ignition, boost) with clamped cell storage and axes
//! - Single-cell and rectangular selection with keyboard and mouse flows
//! - Key-chord to operation mapping with focus gating and repeat debounce
//! - Editing operations: arithmetic, interpolation, smoothing, fill, copy/paste
//! - Undo/redo, change tracking and a single-writer command queue
//!
//! ## Example
//!
//! ```rust,ignore
//! use vetune_core::prelude::*;
//!
//! let table = Table::new(TableKind::Ve, 16, 16)?;
//! let mut session = EditorSession::new(table);
//! session.set_table_focused(true);
//!
//! session.select(CellPos::new(0, 0), CellPos::new(3, 3));
//! session.apply(TableOperation::ScaleBy, OperationArgs::value(10.0))?;
//!
//! // Ctrl+C copies the selection
//! session.handle_key(Key::Char('c'), Modifiers::CTRL);
//! ```

pub mod clipboard;
pub mod engine;
pub mod export;
pub mod history;
pub mod keymap;
pub mod selection;
pub mod session;
pub mod settings;
pub mod table;
pub mod table_ops;
pub mod tracking;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::clipboard::{Clipboard, ClipboardError, PasteMode};
    pub use crate::engine::{
        apply_operation, EditError, EditTarget, OperationArgs, OperationParams, TableOperation,
    };
    pub use crate::history::{CellEdit, EditBatch, UndoHistory};
    pub use crate::keymap::{Key, KeyBindingState, Modifiers};
    pub use crate::selection::{Bounds, CellPos, CellRange, Direction, Selection};
    pub use crate::session::{CommandSender, EditorSession, KeyOutcome, TableCommand};
    pub use crate::settings::EditorSettings;
    pub use crate::table::{Table, TableError, TableKind};
    pub use crate::tracking::{DirtyCells, TableChange};
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
