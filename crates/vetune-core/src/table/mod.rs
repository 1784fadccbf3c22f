//! Table Model
//!
//! The 2-D numeric grid edited by the tuning session. Cells are stored
//! row-major in one contiguous buffer, axis breakpoints run along X (columns,
//! usually RPM) and Y (rows, usually MAP). Every stored value is kept inside
//! the table's `[min_value, max_value]` bounds.

mod demo;
mod error;
mod kind;
mod lookup;

pub use error::TableError;
pub use kind::TableKind;

use serde::{Deserialize, Serialize};

/// Largest supported width or height
pub const MAX_DIMENSION: usize = 256;

/// Default X axis span (RPM)
pub const DEFAULT_X_RANGE: (f64, f64) = (500.0, 8000.0);

/// Default Y axis span (MAP, kPa)
pub const DEFAULT_Y_RANGE: (f64, f64) = (20.0, 400.0);

/// Display metadata; never touches cell data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableMetadata {
    /// Internal name
    pub name: String,
    /// Title
    pub display_name: String,
    /// Units of the cell values
    pub units: String,
    /// Label of the cell values
    pub value_label: String,
    /// X axis label
    pub x_axis_label: String,
    /// Y axis label
    pub y_axis_label: String,
    /// X axis units
    pub x_units: String,
    /// Y axis units
    pub y_units: String,
}

impl TableMetadata {
    fn for_kind(kind: TableKind) -> Self {
        Self {
            name: kind.name().to_string(),
            display_name: kind.display_name().to_string(),
            units: kind.units().to_string(),
            value_label: kind.value_label().to_string(),
            x_axis_label: "RPM".to_string(),
            y_axis_label: "MAP".to_string(),
            x_units: "RPM".to_string(),
            y_units: "kPa".to_string(),
        }
    }
}

/// Serializable copy of a table, handed to renderers and IPC layers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSnapshot {
    /// Internal table name
    pub table_name: String,
    /// X axis breakpoints
    pub x_bins: Vec<f64>,
    /// Y axis breakpoints
    pub y_bins: Vec<f64>,
    /// Cell values, one row per Y breakpoint
    pub z_values: Vec<Vec<f64>>,
    /// Lower clamping bound
    pub min_value: f64,
    /// Upper clamping bound
    pub max_value: f64,
}

/// A 2-D tuning table
#[derive(Debug, Clone)]
pub struct Table {
    kind: TableKind,
    width: usize,
    height: usize,
    cells: Vec<f64>,
    x_axis: Vec<f64>,
    y_axis: Vec<f64>,
    min_value: f64,
    max_value: f64,
    /// Labels and units
    pub metadata: TableMetadata,
    revision: u64,
}

impl Table {
    /// Create a table filled with the kind's reset value and default axes
    pub fn new(kind: TableKind, width: usize, height: usize) -> Result<Self, TableError> {
        let (min_value, max_value) = kind.default_bounds();
        let cells = allocate(width, height, kind.reset_value())?;

        Ok(Self {
            kind,
            width,
            height,
            cells,
            x_axis: even_axis(width, DEFAULT_X_RANGE.0, DEFAULT_X_RANGE.1),
            y_axis: even_axis(height, DEFAULT_Y_RANGE.0, DEFAULT_Y_RANGE.1),
            min_value,
            max_value,
            metadata: TableMetadata::for_kind(kind),
            revision: 0,
        })
    }

    /// Create a table and fill it with the kind's demo surface
    pub fn with_demo_data(kind: TableKind, width: usize, height: usize) -> Result<Self, TableError> {
        let mut table = Self::new(kind, width, height)?;
        table.load_demo_data();
        Ok(table)
    }

    /// Kind of map this table holds
    pub fn kind(&self) -> TableKind {
        self.kind
    }

    /// Number of columns
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows
    pub fn height(&self) -> usize {
        self.height
    }

    /// `(width, height)`
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Lower clamping bound
    pub fn min_value(&self) -> f64 {
        self.min_value
    }

    /// Upper clamping bound
    pub fn max_value(&self) -> f64 {
        self.max_value
    }

    /// Mutation counter, bumped on every change to cell data or axes.
    ///
    /// Renderers compare it against the revision they last drew to decide
    /// whether cached textures and min/max need refreshing.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// X axis breakpoints (one per column)
    pub fn x_axis(&self) -> &[f64] {
        &self.x_axis
    }

    /// Y axis breakpoints (one per row)
    pub fn y_axis(&self) -> &[f64] {
        &self.y_axis
    }

    /// Check whether `(x, y)` addresses a cell
    pub fn in_bounds(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    /// Clamp a value into the table's bounds. NaN collapses to the lower bound.
    pub fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() {
            return self.min_value;
        }
        value.clamp(self.min_value, self.max_value)
    }

    /// Read a cell
    pub fn value(&self, x: usize, y: usize) -> Option<f64> {
        if self.in_bounds(x, y) {
            Some(self.cells[y * self.width + x])
        } else {
            None
        }
    }

    /// Read a cell, falling back to `default` when `(x, y)` is out of range
    pub fn get_or(&self, x: usize, y: usize, default: f64) -> f64 {
        match self.value(x, y) {
            Some(v) => v,
            None => {
                tracing::warn!(
                    "Read of cell [{x},{y}] outside {}x{} table, using {default}",
                    self.width,
                    self.height
                );
                default
            }
        }
    }

    /// Write a cell, clamping into bounds. Returns the value actually stored.
    pub fn set(&mut self, x: usize, y: usize, value: f64) -> Result<f64, TableError> {
        if !self.in_bounds(x, y) {
            tracing::warn!(
                "Write of {value} to cell [{x},{y}] outside {}x{} table ignored",
                self.width,
                self.height
            );
            return Err(self.out_of_bounds(x, y));
        }

        let stored = self.clamp(value);
        self.cells[y * self.width + x] = stored;
        self.revision += 1;
        Ok(stored)
    }

    /// Overwrite every cell with `value` (clamped)
    pub fn fill(&mut self, value: f64) {
        let stored = self.clamp(value);
        self.cells.iter_mut().for_each(|c| *c = stored);
        self.revision += 1;
    }

    /// Change the clamping bounds. Existing cells are pulled into the new range.
    pub fn set_value_range(&mut self, min_value: f64, max_value: f64) -> Result<(), TableError> {
        if !(min_value.is_finite() && max_value.is_finite()) || min_value >= max_value {
            return Err(TableError::InvalidValueRange {
                min: min_value,
                max: max_value,
            });
        }

        self.min_value = min_value;
        self.max_value = max_value;
        for cell in self.cells.iter_mut() {
            *cell = cell.clamp(min_value, max_value);
        }
        self.revision += 1;
        Ok(())
    }

    /// Reallocate storage for new dimensions.
    ///
    /// The overlapping top-left region keeps its values, new cells receive the
    /// kind's reset value and both axes are re-spread over their previous span.
    /// On failure the table is left untouched.
    pub fn resize(&mut self, new_width: usize, new_height: usize) -> Result<(), TableError> {
        let fill = self.clamp(self.kind.reset_value());
        let mut cells = allocate(new_width, new_height, fill)?;

        let keep_w = self.width.min(new_width);
        for y in 0..self.height.min(new_height) {
            let src = &self.cells[y * self.width..y * self.width + keep_w];
            cells[y * new_width..y * new_width + keep_w].copy_from_slice(src);
        }

        let (x_min, x_max) = axis_span(&self.x_axis, DEFAULT_X_RANGE);
        let (y_min, y_max) = axis_span(&self.y_axis, DEFAULT_Y_RANGE);

        self.cells = cells;
        self.width = new_width;
        self.height = new_height;
        self.x_axis = even_axis(new_width, x_min, x_max);
        self.y_axis = even_axis(new_height, y_min, y_max);
        self.revision += 1;

        tracing::debug!("Resized {} to {}x{}", self.metadata.name, new_width, new_height);
        Ok(())
    }

    /// Spread both axes evenly over the given spans
    pub fn set_axis_ranges(
        &mut self,
        x_min: f64,
        x_max: f64,
        y_min: f64,
        y_max: f64,
    ) -> Result<(), TableError> {
        check_span('X', self.width, x_min, x_max)?;
        check_span('Y', self.height, y_min, y_max)?;

        self.x_axis = even_axis(self.width, x_min, x_max);
        self.y_axis = even_axis(self.height, y_min, y_max);
        self.revision += 1;
        Ok(())
    }

    /// Replace both axes with explicit breakpoints (e.g. read from the ECU)
    pub fn set_axis_bins(&mut self, x_bins: Vec<f64>, y_bins: Vec<f64>) -> Result<(), TableError> {
        check_bins('X', self.width, &x_bins)?;
        check_bins('Y', self.height, &y_bins)?;

        self.x_axis = x_bins;
        self.y_axis = y_bins;
        self.revision += 1;
        Ok(())
    }

    /// Update axis labels and units
    pub fn set_axis_names(&mut self, x_label: &str, y_label: &str, x_units: &str, y_units: &str) {
        self.metadata.x_axis_label = x_label.to_string();
        self.metadata.y_axis_label = y_label.to_string();
        self.metadata.x_units = x_units.to_string();
        self.metadata.y_units = y_units.to_string();
    }

    /// Smallest and largest stored value, for heat-map normalisation
    pub fn data_range(&self) -> (f64, f64) {
        self.cells
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            })
    }

    /// Borrow one row
    pub fn row(&self, y: usize) -> Option<&[f64]> {
        if y < self.height {
            Some(&self.cells[y * self.width..(y + 1) * self.width])
        } else {
            None
        }
    }

    /// Iterate over rows, top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.cells.chunks(self.width)
    }

    /// Copy cell data into nested rows
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.rows().map(|r| r.to_vec()).collect()
    }

    /// Serializable copy of the table
    pub fn snapshot(&self) -> TableSnapshot {
        TableSnapshot {
            table_name: self.metadata.name.clone(),
            x_bins: self.x_axis.clone(),
            y_bins: self.y_axis.clone(),
            z_values: self.to_rows(),
            min_value: self.min_value,
            max_value: self.max_value,
        }
    }

    /// Write a batch of pre-validated cells in one revision.
    ///
    /// Callers must have checked every coordinate; values are still clamped.
    pub(crate) fn commit(&mut self, writes: &[(usize, usize, f64)]) {
        debug_assert!(writes.iter().all(|&(x, y, _)| self.in_bounds(x, y)));
        for &(x, y, value) in writes {
            let stored = self.clamp(value);
            self.cells[y * self.width + x] = stored;
        }
        if !writes.is_empty() {
            self.revision += 1;
        }
    }

    pub(crate) fn out_of_bounds(&self, x: usize, y: usize) -> TableError {
        TableError::OutOfBounds {
            x,
            y,
            width: self.width,
            height: self.height,
        }
    }
}

fn allocate(width: usize, height: usize, fill: f64) -> Result<Vec<f64>, TableError> {
    if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(TableError::InvalidDimensions {
            width,
            height,
            max: MAX_DIMENSION,
        });
    }

    let count = width * height;
    let mut cells = Vec::new();
    cells
        .try_reserve_exact(count)
        .map_err(|_| TableError::AllocationFailed { cells: count })?;
    cells.resize(count, fill);
    Ok(cells)
}

/// Evenly spaced breakpoints from `min` to `max` inclusive
fn even_axis(len: usize, min: f64, max: f64) -> Vec<f64> {
    if len == 1 {
        return vec![min];
    }
    let step = (max - min) / (len - 1) as f64;
    (0..len).map(|i| min + step * i as f64).collect()
}

fn axis_span(axis: &[f64], fallback: (f64, f64)) -> (f64, f64) {
    match (axis.first(), axis.last()) {
        (Some(&first), Some(&last)) if first < last => (first, last),
        _ => fallback,
    }
}

fn check_span(axis: char, len: usize, min: f64, max: f64) -> Result<(), TableError> {
    if !(min.is_finite() && max.is_finite()) {
        return Err(TableError::InvalidAxis {
            axis,
            message: "range must be finite".to_string(),
        });
    }
    if len > 1 && min >= max {
        return Err(TableError::InvalidAxis {
            axis,
            message: format!("range {min}..{max} is not increasing"),
        });
    }
    Ok(())
}

fn check_bins(axis: char, len: usize, bins: &[f64]) -> Result<(), TableError> {
    if bins.len() != len {
        return Err(TableError::InvalidAxis {
            axis,
            message: format!("expected {len} breakpoints, got {}", bins.len()),
        });
    }
    if bins.iter().any(|b| !b.is_finite()) {
        return Err(TableError::InvalidAxis {
            axis,
            message: "breakpoints must be finite".to_string(),
        });
    }
    if bins.windows(2).any(|w| w[0] >= w[1]) {
        return Err(TableError::InvalidAxis {
            axis,
            message: "breakpoints must be strictly increasing".to_string(),
        });
    }
    Ok(())
}
