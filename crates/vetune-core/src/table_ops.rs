//! Table Operations Module
//!
//! Numeric kernels behind the editing operations: interpolation, smoothing,
//! filling and per-cell arithmetic. Every kernel reads the table as it was
//! before the operation and returns the writes it wants to make; nothing
//! here mutates the table, so the engine can validate and commit the whole
//! region at once.

use crate::selection::{Bounds, CellPos};
use crate::table::Table;

/// A pending write: `(x, y, new_value)`, not yet clamped
pub type CellWrite = (usize, usize, f64);

/// Sigma of the plain 3×3 "Smooth Cells" kernel
pub const SMOOTH_SIGMA: f64 = 1.0;

/// Sigma used for Gaussian smoothing
pub const GAUSSIAN_SIGMA: f64 = 1.5;

/// Neighbour weight multiplier across a sharp transition
const EDGE_WEIGHT: f64 = 0.3;

/// A neighbour differing from the centre by more than this share of the
/// table's value span counts as across an edge
const EDGE_THRESHOLD: f64 = 0.1;

/// Kernel radius from sigma using the 3σ rule, limited to 3..=9 wide
pub fn kernel_radius(sigma: f64) -> usize {
    let size = ((3.0 * sigma).min(4.0) as usize) * 2 + 1;
    size.clamp(3, 9) / 2
}

fn at(table: &Table, x: usize, y: usize) -> f64 {
    table.value(x, y).unwrap_or(0.0)
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a * (1.0 - t) + b * t
}

/// Weighted mean of the `radius` window around `(x, y)`, looking only at
/// neighbours inside `domain`. `weight` gets `(dx, dy, center, neighbour)`.
fn windowed_mean<F>(
    table: &Table,
    x: usize,
    y: usize,
    radius: usize,
    domain: Bounds,
    mut weight: F,
) -> Option<f64>
where
    F: FnMut(i64, i64, f64, f64) -> f64,
{
    let center = at(table, x, y);
    let r = radius as i64;
    let mut sum = 0.0;
    let mut weight_sum = 0.0;

    for dy in -r..=r {
        for dx in -r..=r {
            let nx = x as i64 + dx;
            let ny = y as i64 + dy;
            if nx < domain.min_x as i64
                || ny < domain.min_y as i64
                || nx > domain.max_x as i64
                || ny > domain.max_y as i64
            {
                continue;
            }
            let neighbour = at(table, nx as usize, ny as usize);
            let w = weight(dx, dy, center, neighbour);
            sum += neighbour * w;
            weight_sum += w;
        }
    }

    if weight_sum > 0.0 {
        Some(sum / weight_sum)
    } else {
        None
    }
}

fn table_bounds(table: &Table) -> Bounds {
    Bounds::from_corners(
        CellPos::new(0, 0),
        CellPos::new(
            table.width().saturating_sub(1),
            table.height().saturating_sub(1),
        ),
    )
}

fn spatial_weight(dx: i64, dy: i64, sigma: f64) -> f64 {
    let dist_sq = (dx * dx + dy * dy) as f64;
    (-dist_sq / (2.0 * sigma * sigma)).exp()
}

/// Apply `f` to every cell in `region`
pub fn map_cells<F>(table: &Table, region: Bounds, f: F) -> Vec<CellWrite>
where
    F: Fn(f64) -> f64,
{
    region
        .cells()
        .map(|(x, y)| (x, y, f(at(table, x, y))))
        .collect()
}

/// Set every cell in `region` to `value`
pub fn fill(region: Bounds, value: f64) -> Vec<CellWrite> {
    region.cells().map(|(x, y)| (x, y, value)).collect()
}

/// Smooth cells with a 3×3 Gaussian weighted average
///
/// Each cell in `region` is replaced with a weighted average of itself and
/// its 8 neighbours. Weights are `exp(-distance² / (2 × σ²))`. Neighbours
/// outside the table are left out of the average.
pub fn smooth_cells(table: &Table, region: Bounds, sigma: f64) -> Vec<CellWrite> {
    if sigma <= 0.0 {
        return Vec::new();
    }
    let domain = table_bounds(table);
    region
        .cells()
        .filter_map(|(x, y)| {
            windowed_mean(table, x, y, 1, domain, |dx, dy, _, _| {
                spatial_weight(dx, dy, sigma)
            })
            .map(|v| (x, y, v))
        })
        .collect()
}

/// Gaussian smoothing over `region`
///
/// Kernel radius follows the 3σ rule. Only neighbours inside `region`
/// contribute. With `preserve_edges`, a neighbour whose value differs from
/// the centre by more than 10% of the table's value span has its weight cut
/// to 30%, so sharp transitions survive.
pub fn gaussian_smooth(
    table: &Table,
    region: Bounds,
    sigma: f64,
    preserve_edges: bool,
) -> Vec<CellWrite> {
    if sigma <= 0.0 {
        return Vec::new();
    }
    let radius = kernel_radius(sigma);
    let edge = (table.max_value() - table.min_value()) * EDGE_THRESHOLD;

    region
        .cells()
        .filter_map(|(x, y)| {
            windowed_mean(table, x, y, radius, region, |dx, dy, center, neighbour| {
                let w = spatial_weight(dx, dy, sigma);
                if preserve_edges && (center - neighbour).abs() > edge {
                    w * EDGE_WEIGHT
                } else {
                    w
                }
            })
            .map(|v| (x, y, v))
        })
        .collect()
}

/// Unweighted mean over a `window`×`window` neighbourhood clipped to the table
pub fn moving_average(table: &Table, region: Bounds, window: usize) -> Vec<CellWrite> {
    let radius = window.max(1) / 2;
    let domain = table_bounds(table);
    region
        .cells()
        .filter_map(|(x, y)| {
            windowed_mean(table, x, y, radius, domain, |_, _, _, _| 1.0).map(|v| (x, y, v))
        })
        .collect()
}

/// Bilateral smoothing: spatial Gaussian × value-difference Gaussian
///
/// Only neighbours inside `domain` within `radius` contribute. Cells whose
/// neighbours sit across a large step in value get almost no pull from the
/// far side.
pub fn bilateral_smooth(
    table: &Table,
    region: Bounds,
    domain: Bounds,
    radius: usize,
    spatial_sigma: f64,
    value_sigma: f64,
) -> Vec<CellWrite> {
    if spatial_sigma <= 0.0 || value_sigma <= 0.0 {
        return Vec::new();
    }
    let two_value_sq = 2.0 * value_sigma * value_sigma;

    region
        .cells()
        .filter_map(|(x, y)| {
            windowed_mean(table, x, y, radius, domain, |dx, dy, center, neighbour| {
                let diff = center - neighbour;
                spatial_weight(dx, dy, spatial_sigma) * (-(diff * diff) / two_value_sq).exp()
            })
            .map(|v| (x, y, v))
        })
        .collect()
}

/// Two-point diagonal interpolation from `start` to `end`
///
/// Each cell gets `v0..v1` blended by the average of its x and y fractions
/// measured from the `start` corner. An axis one cell wide does not take
/// part in the average. Returns nothing when both corners are the same cell.
pub fn interpolate_diagonal(table: &Table, start: CellPos, end: CellPos) -> Vec<CellWrite> {
    let region = Bounds::from_corners(start, end);
    let span_x = region.width() - 1;
    let span_y = region.height() - 1;
    if span_x == 0 && span_y == 0 {
        return Vec::new();
    }

    let v0 = at(table, start.x, start.y);
    let v1 = at(table, end.x, end.y);

    region
        .cells()
        .map(|(x, y)| {
            let mut fractions = Vec::with_capacity(2);
            if span_x > 0 {
                fractions.push(x.abs_diff(start.x) as f64 / span_x as f64);
            }
            if span_y > 0 {
                fractions.push(y.abs_diff(start.y) as f64 / span_y as f64);
            }
            let t = fractions.iter().sum::<f64>() / fractions.len() as f64;
            (x, y, lerp(v0, v1, t))
        })
        .collect()
}

/// Per row, blend each cell between the row's leftmost and rightmost values
pub fn interpolate_horizontal(table: &Table, region: Bounds) -> Vec<CellWrite> {
    let span = region.width() - 1;
    if span == 0 {
        return Vec::new();
    }

    let mut writes = Vec::with_capacity(region.cell_count());
    for y in region.min_y..=region.max_y {
        let left = at(table, region.min_x, y);
        let right = at(table, region.max_x, y);
        for x in region.min_x..=region.max_x {
            let t = (x - region.min_x) as f64 / span as f64;
            writes.push((x, y, lerp(left, right, t)));
        }
    }
    writes
}

/// Per column, blend each cell between the column's top and bottom values
pub fn interpolate_vertical(table: &Table, region: Bounds) -> Vec<CellWrite> {
    let span = region.height() - 1;
    if span == 0 {
        return Vec::new();
    }

    let mut writes = Vec::with_capacity(region.cell_count());
    for y in region.min_y..=region.max_y {
        let t = (y - region.min_y) as f64 / span as f64;
        for x in region.min_x..=region.max_x {
            let top = at(table, x, region.min_y);
            let bottom = at(table, x, region.max_y);
            writes.push((x, y, lerp(top, bottom, t)));
        }
    }
    writes
}
