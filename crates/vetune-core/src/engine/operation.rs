//! Symbolic table operations and their parameters

use serde::{Deserialize, Serialize};

use crate::clipboard::PasteMode;
use crate::selection::{CellPos, CellRange, Selection};

/// One editing action, resolved from a key chord or a menu entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableOperation {
    /// Write the given value
    SetTo,
    /// Add the configured increment
    Increment,
    /// Subtract the configured increment
    Decrement,
    /// Add a value (default: the increment)
    IncreaseBy,
    /// Subtract a value (default: the increment)
    DecreaseBy,
    /// Scale by a percentage (default: the percent increment)
    ScaleBy,
    /// Two-point diagonal blend between corners
    Interpolate,
    /// Blend each row between its end cells
    InterpolateHorizontal,
    /// Blend each column between its end cells
    InterpolateVertical,
    /// 3×3 Gaussian blur
    SmoothCells,
    /// Edge-preserving Gaussian smoothing
    GaussianSmooth,
    /// Unweighted windowed mean
    MovingAverageSmooth,
    /// Spatial × value-difference weighted smoothing
    BilateralSmooth,
    /// Copy the source cell over the rectangle
    FillUpRight,
    /// Write the table kind's default
    Reset,
    /// Write zero
    ClearCell,
    /// Snapshot the target into the clipboard
    Copy,
    /// Overwrite with the clipboard block
    Paste,
    /// Combine the clipboard block with the cells underneath
    PasteSpecial(PasteMode),
}

impl TableOperation {
    /// Human-readable label for menus and tooltips
    pub fn name(&self) -> &'static str {
        match self {
            TableOperation::SetTo => "Set to",
            TableOperation::Increment => "Increment",
            TableOperation::Decrement => "Decrement",
            TableOperation::IncreaseBy => "Increase by",
            TableOperation::DecreaseBy => "Decrease by",
            TableOperation::ScaleBy => "Scale by",
            TableOperation::Interpolate => "Interpolate",
            TableOperation::InterpolateHorizontal => "Interpolate Horizontal",
            TableOperation::InterpolateVertical => "Interpolate Vertical",
            TableOperation::SmoothCells => "Smooth Cells",
            TableOperation::GaussianSmooth => "Gaussian Smooth",
            TableOperation::MovingAverageSmooth => "Moving Average Smooth",
            TableOperation::BilateralSmooth => "Bilateral Smooth",
            TableOperation::FillUpRight => "Fill Up+Right",
            TableOperation::Reset => "Reset",
            TableOperation::ClearCell => "Clear Cell",
            TableOperation::Copy => "Copy",
            TableOperation::Paste => "Paste",
            TableOperation::PasteSpecial(PasteMode::Replace) => "Paste Special",
            TableOperation::PasteSpecial(PasteMode::MultiplyPercent) => "Paste Multiply %",
            TableOperation::PasteSpecial(PasteMode::MultiplyRaw) => "Paste Multiply Raw",
            TableOperation::PasteSpecial(PasteMode::Add) => "Paste Add",
            TableOperation::PasteSpecial(PasteMode::Subtract) => "Paste Subtract",
        }
    }

    /// Whether the operation writes cell values
    pub fn is_mutating(&self) -> bool {
        !matches!(self, TableOperation::Copy)
    }

    /// Whether the operation cannot run without an explicit value from the user
    pub fn requires_value(&self) -> bool {
        matches!(self, TableOperation::SetTo)
    }

    /// Whether the operation takes an optional value (prompted by the UI)
    pub fn accepts_value(&self) -> bool {
        matches!(
            self,
            TableOperation::SetTo
                | TableOperation::IncreaseBy
                | TableOperation::DecreaseBy
                | TableOperation::ScaleBy
        )
    }
}

/// Step sizes used by the arithmetic operations
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OperationParams {
    /// Absolute step for Increment / Decrement
    pub increment_amount: f64,
    /// Percentage for Scale By when no value is given
    pub percent_increment: f64,
}

impl Default for OperationParams {
    fn default() -> Self {
        Self {
            increment_amount: 1.0,
            percent_increment: 5.0,
        }
    }
}

/// Per-invocation argument (the number typed into a prompt)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationArgs {
    /// Explicit number typed by the user
    pub value: Option<f64>,
}

impl OperationArgs {
    /// No argument
    pub fn none() -> Self {
        Self::default()
    }

    /// Explicit numeric argument
    pub fn value(value: f64) -> Self {
        Self { value: Some(value) }
    }
}

/// What an operation acts on: the active cell and/or a rectangle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditTarget {
    /// Active single cell
    pub cursor: Option<CellPos>,
    /// Rectangle as drawn
    pub range: Option<CellRange>,
}

impl EditTarget {
    /// Target one cell
    pub fn cell(x: usize, y: usize) -> Self {
        Self {
            cursor: Some(CellPos::new(x, y)),
            range: None,
        }
    }

    /// Target a rectangle with no active cell
    pub fn range(start: CellPos, end: CellPos) -> Self {
        Self {
            cursor: None,
            range: Some(CellRange::new(start, end)),
        }
    }

    /// Set the active cell as well
    pub fn with_cursor(mut self, cursor: CellPos) -> Self {
        self.cursor = Some(cursor);
        self
    }

    /// Target whatever `selection` currently holds
    pub fn from_selection(selection: &Selection) -> Self {
        Self {
            cursor: selection.cursor(),
            range: selection.range(),
        }
    }

    /// Whether there is neither a cell nor a rectangle
    pub fn is_empty(&self) -> bool {
        self.cursor.is_none() && self.range.is_none()
    }
}
