//! Tests for table operation kernels

use vetune_core::selection::{Bounds, CellPos};
use vetune_core::table::{Table, TableKind};
use vetune_core::table_ops::{
    gaussian_smooth, interpolate_diagonal, interpolate_horizontal, map_cells, moving_average,
    smooth_cells, GAUSSIAN_SIGMA, SMOOTH_SIGMA,
};

fn table_from(rows: &[Vec<f64>]) -> Table {
    let mut table = Table::new(TableKind::Ve, rows[0].len(), rows.len()).unwrap();
    for (y, row) in rows.iter().enumerate() {
        for (x, &v) in row.iter().enumerate() {
            table.set(x, y, v).unwrap();
        }
    }
    table
}

fn region(x0: usize, y0: usize, x1: usize, y1: usize) -> Bounds {
    Bounds::from_corners(CellPos::new(x0, y0), CellPos::new(x1, y1))
}

#[test]
fn test_smooth_cells_outlier() {
    let table = table_from(&[
        vec![10.0, 10.0, 10.0],
        vec![10.0, 50.0, 10.0], // Center cell is an outlier
        vec![10.0, 10.0, 10.0],
    ]);

    let writes = smooth_cells(&table, Bounds::single(CellPos::new(1, 1)), SMOOTH_SIGMA);

    // Center pulled toward its neighbours but still above them
    let (_, _, center) = writes[0];
    assert!(center < 50.0, "Center should be reduced, got {}", center);
    assert!(center > 10.0, "Center should stay above neighbours, got {}", center);
}

#[test]
fn test_smooth_cells_only_selected() {
    let table = table_from(&[
        vec![10.0, 10.0, 10.0],
        vec![10.0, 50.0, 10.0],
        vec![10.0, 10.0, 10.0],
    ]);

    let writes = smooth_cells(&table, region(0, 0, 0, 0), SMOOTH_SIGMA);

    // Only (0,0) is written
    assert_eq!(writes.len(), 1);
    assert_eq!((writes[0].0, writes[0].1), (0, 0));
}

#[test]
fn test_scale_cells() {
    let table = table_from(&[vec![10.0, 20.0], vec![30.0, 40.0]]);

    let writes = map_cells(&table, region(0, 0, 1, 0), |v| v * 1.5);

    assert_eq!(writes, vec![(0, 0, 15.0), (1, 0, 30.0)]);
}

#[test]
fn test_interpolate_diagonal_gradient() {
    let table = table_from(&[
        vec![10.0, 0.0, 0.0],
        vec![0.0, 0.0, 0.0],
        vec![0.0, 0.0, 30.0],
    ]);

    let writes = interpolate_diagonal(&table, CellPos::new(0, 0), CellPos::new(2, 2));
    let rows: Vec<Vec<f64>> = writes.chunks(3).map(|c| c.iter().map(|w| w.2).collect()).collect();

    // t = (fx + fy) / 2, so anti-diagonals are constant
    assert_eq!(rows[0], vec![10.0, 15.0, 20.0]);
    assert_eq!(rows[1], vec![15.0, 20.0, 25.0]);
    assert_eq!(rows[2], vec![20.0, 25.0, 30.0]);
}

#[test]
fn test_interpolate_horizontal_monotonic() {
    let table = table_from(&[vec![20.0, 0.0, 0.0, 0.0, 0.0, 0.0, 80.0]]);

    let writes = interpolate_horizontal(&table, region(0, 0, 6, 0));
    let values: Vec<f64> = writes.iter().map(|w| w.2).collect();

    assert_eq!(values[0], 20.0);
    assert_eq!(values[6], 80.0);
    for pair in values.windows(2) {
        assert!(pair[1] >= pair[0], "Not monotonic: {:?}", values);
    }
}

#[test]
fn test_moving_average_border_cells() {
    let table = table_from(&[
        vec![10.0, 20.0, 30.0, 40.0],
        vec![50.0, 60.0, 70.0, 80.0],
        vec![90.0, 100.0, 110.0, 120.0],
    ]);

    // Whole table with a 5x5 window: every neighbourhood is clipped
    let writes = moving_average(&table, region(0, 0, 3, 2), 5);
    assert_eq!(writes.len(), 12);

    // Corner (0,0) sees columns 0..=2 and rows 0..=2
    let expected = (10.0 + 20.0 + 30.0 + 50.0 + 60.0 + 70.0 + 90.0 + 100.0 + 110.0) / 9.0;
    assert!((writes[0].2 - expected).abs() < 1e-9);
}

#[test]
fn test_gaussian_stays_within_region() {
    let table = table_from(&[
        vec![10.0, 10.0, 190.0],
        vec![10.0, 10.0, 190.0],
        vec![10.0, 10.0, 190.0],
    ]);

    // Region excludes column 2, so its high values never leak in
    let writes = gaussian_smooth(&table, region(0, 0, 1, 2), GAUSSIAN_SIGMA, true);
    for (_, _, v) in writes {
        assert!((v - 10.0).abs() < 1e-9);
    }
}
