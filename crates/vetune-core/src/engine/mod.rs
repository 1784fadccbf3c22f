//! Table Operation Engine
//!
//! Applies one [`TableOperation`] to a [`Table`]. The target is validated,
//! the kernel computes every write for the region, the writes are checked,
//! and only then is the table touched, in a single commit. An operation
//! either updates every targeted cell or none.
//!
//! Which cells are affected:
//! - With a rectangle, its normalised bounds.
//! - Otherwise the active cell alone, except where the operation has its own
//!   implicit window (Gaussian smoothing widens a lone cell to 5×5).

mod error;
mod operation;

pub use error::EditError;
pub use operation::{EditTarget, OperationArgs, OperationParams, TableOperation};

use crate::clipboard::{Clipboard, PasteMode};
use crate::history::CellEdit;
use crate::selection::{Bounds, CellPos};
use crate::table::Table;
use crate::table_ops::{self, CellWrite, GAUSSIAN_SIGMA, SMOOTH_SIGMA};

/// Half-width of the window Gaussian smoothing uses around a lone cell
const GAUSSIAN_CELL_RADIUS: usize = 2;

/// Moving-average window for a lone cell / a selection
const MOVING_AVERAGE_CELL_WINDOW: usize = 3;
const MOVING_AVERAGE_SELECTION_WINDOW: usize = 5;

/// Bilateral sigmas `(spatial, value)` for a lone cell / a selection
const BILATERAL_CELL_SIGMAS: (f64, f64) = (1.0, 15.0);
const BILATERAL_SELECTION_SIGMAS: (f64, f64) = (1.5, 20.0);

/// Apply `operation` to `table`.
///
/// Returns the cells written, with before and after values. `Copy` writes
/// nothing and returns an empty list. On error the table is unchanged and a
/// warning is logged.
pub fn apply_operation(
    operation: TableOperation,
    table: &mut Table,
    target: &EditTarget,
    clipboard: &mut Clipboard,
    params: &OperationParams,
    args: &OperationArgs,
) -> Result<Vec<CellEdit>, EditError> {
    let result = plan(operation, table, target, clipboard, params, args)
        .and_then(|writes| commit_writes(table, operation, &writes));

    if let Err(e) = &result {
        tracing::warn!("{} not applied: {}", operation.name(), e);
    }
    result
}

/// Validate a batch of writes and commit it as one change.
///
/// If any coordinate is outside the table nothing is written.
pub fn commit_writes(
    table: &mut Table,
    operation: TableOperation,
    writes: &[CellWrite],
) -> Result<Vec<CellEdit>, EditError> {
    if let Some(&(x, y, _)) = writes.iter().find(|&&(x, y, _)| !table.in_bounds(x, y)) {
        return Err(out_of_bounds(table, x, y));
    }

    let mut edits = Vec::with_capacity(writes.len());
    for &(x, y, value) in writes {
        edits.push(CellEdit {
            x,
            y,
            old_value: table.get_or(x, y, 0.0),
            new_value: table.clamp(value),
        });
    }
    table.commit(writes);

    if !edits.is_empty() {
        tracing::debug!(
            "{} applied to {} cell(s) of {}",
            operation.name(),
            edits.len(),
            table.metadata.name
        );
    }
    Ok(edits)
}

/// Compute the writes for `operation` without touching the table
fn plan(
    operation: TableOperation,
    table: &Table,
    target: &EditTarget,
    clipboard: &mut Clipboard,
    params: &OperationParams,
    args: &OperationArgs,
) -> Result<Vec<CellWrite>, EditError> {
    let region = resolve_region(table, target)?;

    let writes = match operation {
        TableOperation::SetTo => {
            let value = args
                .value
                .ok_or(EditError::MissingArgument(operation))?;
            table_ops::fill(region, value)
        }
        TableOperation::Increment => {
            let step = params.increment_amount;
            table_ops::map_cells(table, region, |v| v + step)
        }
        TableOperation::Decrement => {
            let step = params.increment_amount;
            table_ops::map_cells(table, region, |v| v - step)
        }
        TableOperation::IncreaseBy => {
            let step = args.value.unwrap_or(params.increment_amount);
            table_ops::map_cells(table, region, |v| v + step)
        }
        TableOperation::DecreaseBy => {
            let step = args.value.unwrap_or(params.increment_amount);
            table_ops::map_cells(table, region, |v| v - step)
        }
        TableOperation::ScaleBy => {
            // v * (1 + p/100)
            let fraction = args.value.unwrap_or(params.percent_increment) / 100.0;
            table_ops::map_cells(table, region, |v| v + v * fraction)
        }
        TableOperation::Interpolate => {
            let range = target.range.ok_or(EditError::NoSelection(operation))?;
            require_size(operation, region, region.cell_count() > 1)?;
            table_ops::interpolate_diagonal(table, range.start, range.end)
        }
        TableOperation::InterpolateHorizontal => {
            require_size(operation, region, region.width() > 1)?;
            table_ops::interpolate_horizontal(table, region)
        }
        TableOperation::InterpolateVertical => {
            require_size(operation, region, region.height() > 1)?;
            table_ops::interpolate_vertical(table, region)
        }
        TableOperation::SmoothCells => table_ops::smooth_cells(table, region, SMOOTH_SIGMA),
        TableOperation::GaussianSmooth => {
            let window = match (target.range, target.cursor) {
                (None, Some(cell)) => {
                    Bounds::around(cell, GAUSSIAN_CELL_RADIUS, table.width(), table.height())
                }
                _ => region,
            };
            table_ops::gaussian_smooth(table, window, GAUSSIAN_SIGMA, true)
        }
        TableOperation::MovingAverageSmooth => {
            let window = if target.range.is_some() {
                MOVING_AVERAGE_SELECTION_WINDOW
            } else {
                MOVING_AVERAGE_CELL_WINDOW
            };
            table_ops::moving_average(table, region, window)
        }
        TableOperation::BilateralSmooth => match (target.range, target.cursor) {
            (None, Some(cell)) => {
                let (spatial, value) = BILATERAL_CELL_SIGMAS;
                let domain = Bounds::around(cell, 1, table.width(), table.height());
                table_ops::bilateral_smooth(table, region, domain, 1, spatial, value)
            }
            _ => {
                let (spatial, value) = BILATERAL_SELECTION_SIGMAS;
                let radius = table_ops::kernel_radius(spatial);
                table_ops::bilateral_smooth(table, region, region, radius, spatial, value)
            }
        },
        TableOperation::FillUpRight => {
            let range = target.range.ok_or(EditError::NoSelection(operation))?;
            let source = target.cursor.unwrap_or(range.start);
            let value = table
                .value(source.x, source.y)
                .ok_or_else(|| out_of_bounds(table, source.x, source.y))?;
            table_ops::fill(region, value)
        }
        TableOperation::Reset => table_ops::fill(region, table.kind().reset_value()),
        TableOperation::ClearCell => table_ops::fill(region, 0.0),
        TableOperation::Copy => {
            clipboard.copy(table, region)?;
            Vec::new()
        }
        TableOperation::Paste => {
            clipboard.paste_writes(table, paste_origin(target, region), PasteMode::Replace)?
        }
        TableOperation::PasteSpecial(mode) => {
            clipboard.paste_writes(table, paste_origin(target, region), mode)?
        }
    };

    Ok(writes)
}

/// Cells the operation targets: the rectangle if any, else the active cell
fn resolve_region(table: &Table, target: &EditTarget) -> Result<Bounds, EditError> {
    if let Some(cursor) = target.cursor {
        check_cell(table, cursor)?;
    }
    match (target.range, target.cursor) {
        (Some(range), _) => {
            check_cell(table, range.start)?;
            check_cell(table, range.end)?;
            Ok(range.bounds())
        }
        (None, Some(cursor)) => Ok(Bounds::single(cursor)),
        (None, None) => Err(EditError::NoTarget),
    }
}

/// Paste lands at the active cell, else at the rectangle's anchor
fn paste_origin(target: &EditTarget, region: Bounds) -> CellPos {
    target
        .cursor
        .or(target.range.map(|r| r.start))
        .unwrap_or(CellPos::new(region.min_x, region.min_y))
}

fn check_cell(table: &Table, cell: CellPos) -> Result<(), EditError> {
    if table.in_bounds(cell.x, cell.y) {
        Ok(())
    } else {
        Err(out_of_bounds(table, cell.x, cell.y))
    }
}

fn require_size(operation: TableOperation, region: Bounds, ok: bool) -> Result<(), EditError> {
    if ok {
        Ok(())
    } else {
        Err(EditError::RegionTooSmall {
            operation,
            width: region.width(),
            height: region.height(),
        })
    }
}

fn out_of_bounds(table: &Table, x: usize, y: usize) -> EditError {
    EditError::OutOfBounds {
        x,
        y,
        width: table.width(),
        height: table.height(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::TableKind;

    fn apply(
        op: TableOperation,
        table: &mut Table,
        target: EditTarget,
        args: OperationArgs,
    ) -> Result<Vec<CellEdit>, EditError> {
        let mut clipboard = Clipboard::new();
        apply_operation(
            op,
            table,
            &target,
            &mut clipboard,
            &OperationParams::default(),
            &args,
        )
    }

    #[test]
    fn test_no_target_is_reported() {
        let mut table = Table::new(TableKind::Ve, 4, 4).unwrap();
        let err = apply(
            TableOperation::Increment,
            &mut table,
            EditTarget::default(),
            OperationArgs::none(),
        )
        .unwrap_err();
        assert_eq!(err, EditError::NoTarget);
        assert_eq!(table.revision(), 0);
    }

    #[test]
    fn test_set_to_clamps() {
        let mut table = Table::new(TableKind::Ve, 2, 2).unwrap();
        apply(
            TableOperation::SetTo,
            &mut table,
            EditTarget::cell(0, 0),
            OperationArgs::value(-50.0),
        )
        .unwrap();
        apply(
            TableOperation::SetTo,
            &mut table,
            EditTarget::cell(1, 1),
            OperationArgs::value(9999.0),
        )
        .unwrap();
        assert_eq!(table.value(0, 0), Some(0.0));
        assert_eq!(table.value(1, 1), Some(200.0));
    }

    #[test]
    fn test_set_to_needs_value() {
        let mut table = Table::new(TableKind::Ve, 2, 2).unwrap();
        let err = apply(
            TableOperation::SetTo,
            &mut table,
            EditTarget::cell(0, 0),
            OperationArgs::none(),
        )
        .unwrap_err();
        assert_eq!(err, EditError::MissingArgument(TableOperation::SetTo));
    }

    #[test]
    fn test_increment_uses_params() {
        let mut table = Table::new(TableKind::Generic, 2, 2).unwrap();
        let edits = apply(
            TableOperation::Increment,
            &mut table,
            EditTarget::cell(1, 0),
            OperationArgs::none(),
        )
        .unwrap();
        assert_eq!(edits.len(), 1);
        assert_eq!(table.value(1, 0), Some(51.0));
        assert_eq!(table.value(0, 0), Some(50.0));
    }

    #[test]
    fn test_scale_by_default_percent() {
        let mut table = Table::new(TableKind::Generic, 1, 1).unwrap();
        table.set(0, 0, 40.0).unwrap();
        apply(
            TableOperation::ScaleBy,
            &mut table,
            EditTarget::cell(0, 0),
            OperationArgs::none(),
        )
        .unwrap();
        assert!((table.value(0, 0).unwrap() - 42.0).abs() < 1e-9);
    }

    #[test]
    fn test_fill_requires_selection() {
        let mut table = Table::new(TableKind::Generic, 3, 3).unwrap();
        let err = apply(
            TableOperation::FillUpRight,
            &mut table,
            EditTarget::cell(1, 1),
            OperationArgs::none(),
        )
        .unwrap_err();
        assert_eq!(err, EditError::NoSelection(TableOperation::FillUpRight));
    }

    #[test]
    fn test_fill_uses_cursor_value() {
        let mut table = Table::new(TableKind::Generic, 3, 3).unwrap();
        table.set(2, 2, 7.0).unwrap();
        let target = EditTarget::range(CellPos::new(0, 0), CellPos::new(1, 1))
            .with_cursor(CellPos::new(2, 2));
        apply(
            TableOperation::FillUpRight,
            &mut table,
            target,
            OperationArgs::none(),
        )
        .unwrap();
        assert_eq!(table.to_rows()[0], vec![7.0, 7.0, 50.0]);
        assert_eq!(table.to_rows()[1], vec![7.0, 7.0, 50.0]);
    }

    #[test]
    fn test_reset_is_kind_specific() {
        let mut table = Table::new(TableKind::Ignition, 2, 1).unwrap();
        table.set(0, 0, 30.0).unwrap();
        apply(
            TableOperation::Reset,
            &mut table,
            EditTarget::cell(0, 0),
            OperationArgs::none(),
        )
        .unwrap();
        assert_eq!(table.value(0, 0), Some(TableKind::Ignition.reset_value()));
    }

    #[test]
    fn test_clear_cell_clamps_to_min() {
        let mut table = Table::new(TableKind::Generic, 1, 1).unwrap();
        table.set_value_range(10.0, 90.0).unwrap();
        apply(
            TableOperation::ClearCell,
            &mut table,
            EditTarget::cell(0, 0),
            OperationArgs::none(),
        )
        .unwrap();
        assert_eq!(table.value(0, 0), Some(10.0));
    }

    #[test]
    fn test_out_of_bounds_target_rejected() {
        let mut table = Table::new(TableKind::Generic, 2, 2).unwrap();
        let err = apply(
            TableOperation::Increment,
            &mut table,
            EditTarget::range(CellPos::new(0, 0), CellPos::new(5, 1)),
            OperationArgs::none(),
        )
        .unwrap_err();
        assert!(matches!(err, EditError::OutOfBounds { x: 5, .. }));
        assert_eq!(table.revision(), 0);
    }

    #[test]
    fn test_commit_is_all_or_nothing() {
        let mut table = Table::new(TableKind::Generic, 2, 2).unwrap();
        let writes = vec![(0, 0, 10.0), (1, 0, 10.0), (2, 0, 10.0)];
        let err = commit_writes(&mut table, TableOperation::SetTo, &writes).unwrap_err();
        assert!(matches!(err, EditError::OutOfBounds { x: 2, y: 0, .. }));
        assert_eq!(table.to_rows(), vec![vec![50.0, 50.0], vec![50.0, 50.0]]);
    }

    #[test]
    fn test_horizontal_needs_width() {
        let mut table = Table::new(TableKind::Generic, 3, 3).unwrap();
        let err = apply(
            TableOperation::InterpolateHorizontal,
            &mut table,
            EditTarget::range(CellPos::new(1, 0), CellPos::new(1, 2)),
            OperationArgs::none(),
        )
        .unwrap_err();
        assert!(matches!(err, EditError::RegionTooSmall { width: 1, .. }));
    }

    #[test]
    fn test_gaussian_single_cell_uses_window() {
        let mut table = Table::new(TableKind::Generic, 8, 8).unwrap();
        let edits = apply(
            TableOperation::GaussianSmooth,
            &mut table,
            EditTarget::cell(4, 4),
            OperationArgs::none(),
        )
        .unwrap();
        assert_eq!(edits.len(), 25);
    }

    /// 5x5 table: outer ring `ring`, inner 3x3 `inner`, centre `center`
    fn ringed_table(ring: f64, inner: f64, center: f64) -> Table {
        let mut table = Table::new(TableKind::Generic, 5, 5).unwrap();
        for y in 0..5 {
            for x in 0..5 {
                let on_ring = x == 0 || y == 0 || x == 4 || y == 4;
                table.set(x, y, if on_ring { ring } else { inner }).unwrap();
            }
        }
        table.set(2, 2, center).unwrap();
        table
    }

    fn edit_at(edits: &[CellEdit], x: usize, y: usize) -> f64 {
        edits
            .iter()
            .find(|e| e.x == x && e.y == y)
            .map(|e| e.new_value)
            .unwrap()
    }

    #[test]
    fn test_moving_average_window_depends_on_target() {
        // lone cell: 3x3 window sees only the inner block
        let mut table = ringed_table(50.0, 10.0, 10.0);
        let edits = apply(
            TableOperation::MovingAverageSmooth,
            &mut table,
            EditTarget::cell(2, 2),
            OperationArgs::none(),
        )
        .unwrap();
        assert_eq!(edits.len(), 1);
        assert_eq!(edits[0].new_value, 10.0);

        // selection: 5x5 window reaches the ring
        let mut table = ringed_table(50.0, 10.0, 10.0);
        let edits = apply(
            TableOperation::MovingAverageSmooth,
            &mut table,
            EditTarget::range(CellPos::new(1, 1), CellPos::new(3, 3)),
            OperationArgs::none(),
        )
        .unwrap();
        assert_eq!(edits.len(), 9);
        assert!((edit_at(&edits, 2, 2) - 890.0 / 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_bilateral_single_cell_uses_tight_sigmas() {
        let mut table = ringed_table(0.0, 50.0, 40.0);
        let edits = apply(
            TableOperation::BilateralSmooth,
            &mut table,
            EditTarget::cell(2, 2),
            OperationArgs::none(),
        )
        .unwrap();
        assert_eq!(edits.len(), 1);

        // σ = (1.0, 15.0) over the 3x3 neighbourhood; the ring is out of reach
        let range_w = (-(10.0_f64 * 10.0) / (2.0 * 15.0 * 15.0)).exp();
        let w = (4.0 * (-0.5_f64).exp() + 4.0 * (-1.0_f64).exp()) * range_w;
        let expected = (40.0 + 50.0 * w) / (1.0 + w);
        assert!((edits[0].new_value - expected).abs() < 1e-9);
        assert!((edits[0].new_value - 47.5734).abs() < 1e-3);
    }

    #[test]
    fn test_bilateral_selection_uses_wide_sigmas() {
        let mut table = ringed_table(0.0, 50.0, 40.0);
        let edits = apply(
            TableOperation::BilateralSmooth,
            &mut table,
            EditTarget::range(CellPos::new(0, 0), CellPos::new(4, 4)),
            OperationArgs::none(),
        )
        .unwrap();
        assert_eq!(edits.len(), 25);

        // σ = (1.5, 20.0) with radius 4 pulls the centre toward the zero ring
        assert!((edit_at(&edits, 2, 2) - 43.5621).abs() < 1e-3);
    }

    #[test]
    fn test_copy_writes_nothing() {
        let mut table = Table::new(TableKind::Generic, 3, 3).unwrap();
        let mut clipboard = Clipboard::new();
        let edits = apply_operation(
            TableOperation::Copy,
            &mut table,
            &EditTarget::cell(1, 1),
            &mut clipboard,
            &OperationParams::default(),
            &OperationArgs::none(),
        )
        .unwrap();
        assert!(edits.is_empty());
        assert!(clipboard.has_data());
        assert_eq!(table.revision(), 0);
    }
}
