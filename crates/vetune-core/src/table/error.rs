//! Error types for table storage

use thiserror::Error;

/// Errors that can occur while creating, resizing or addressing a table
#[allow(missing_docs)]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TableError {
    #[error("Invalid table dimensions {width}x{height} (allowed 1..={max})")]
    InvalidDimensions {
        width: usize,
        height: usize,
        max: usize,
    },

    #[error("Failed to allocate storage for {cells} cells")]
    AllocationFailed { cells: usize },

    #[error("Cell [{x},{y}] is outside a {width}x{height} table")]
    OutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },

    #[error("Invalid value range: min {min} must be below max {max}")]
    InvalidValueRange { min: f64, max: f64 },

    #[error("Invalid {axis} axis: {message}")]
    InvalidAxis { axis: char, message: String },
}
