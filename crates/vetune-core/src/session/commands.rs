//! Cross-thread edit commands
//!
//! Background producers (an ECU poller, a plugin) never touch the table
//! directly. They hold a [`CommandSender`] and queue [`TableCommand`]s,
//! which the owning [`EditorSession`](super::EditorSession) applies in
//! arrival order when it drains its queue.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::engine::{EditTarget, OperationArgs, TableOperation};

/// A queued request to change the table
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TableCommand {
    /// Write one cell (clamped), recorded for undo like Set To
    SetCell { x: usize, y: usize, value: f64 },
    /// Run an operation against an explicit target
    Apply {
        operation: TableOperation,
        target: EditTarget,
        args: OperationArgs,
    },
    /// New dimensions negotiated with the device
    Resize { width: usize, height: usize },
    /// New evenly spread axis spans
    SetAxisRanges {
        x_min: f64,
        x_max: f64,
        y_min: f64,
        y_max: f64,
    },
    /// Breakpoints supplied by the device
    SetAxisBins { x_bins: Vec<f64>, y_bins: Vec<f64> },
    /// Replace the cells with the kind's demo surface
    LoadDemoData,
}

/// Error sending a command
#[allow(missing_docs)]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommandError {
    #[error("Editor session has been dropped")]
    Closed,
}

/// Cloneable handle for queueing commands from other tasks or threads
#[derive(Debug, Clone)]
pub struct CommandSender {
    tx: UnboundedSender<TableCommand>,
}

impl CommandSender {
    /// Queue a command
    pub fn send(&self, command: TableCommand) -> Result<(), CommandError> {
        self.tx.send(command).map_err(|_| CommandError::Closed)
    }

    /// Queue a single-cell write
    pub fn set_cell(&self, x: usize, y: usize, value: f64) -> Result<(), CommandError> {
        self.send(TableCommand::SetCell { x, y, value })
    }

    /// Queue an operation on an explicit target
    pub fn apply(
        &self,
        operation: TableOperation,
        target: EditTarget,
        args: OperationArgs,
    ) -> Result<(), CommandError> {
        self.send(TableCommand::Apply {
            operation,
            target,
            args,
        })
    }

    /// Queue a resize
    pub fn resize(&self, width: usize, height: usize) -> Result<(), CommandError> {
        self.send(TableCommand::Resize { width, height })
    }

    /// Whether the receiving session is gone
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

pub(crate) fn channel() -> (CommandSender, UnboundedReceiver<TableCommand>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (CommandSender { tx }, rx)
}
