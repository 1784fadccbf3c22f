//! Operating-point lookup
//!
//! Maps live axis values (RPM, MAP) onto the table, either as a bilinear
//! interpolated value or as the nearest cell for highlighting.

use super::Table;

impl Table {
    /// Bilinear interpolation of the table at an axis-space point.
    ///
    /// Points outside the axis span are clamped to the edge breakpoints.
    pub fn lookup(&self, x_value: f64, y_value: f64) -> f64 {
        let (x0, x1, tx) = axis_position(x_value, &self.x_axis);
        let (y0, y1, ty) = axis_position(y_value, &self.y_axis);

        let v00 = self.get_or(x0, y0, 0.0);
        let v10 = self.get_or(x1, y0, 0.0);
        let v01 = self.get_or(x0, y1, 0.0);
        let v11 = self.get_or(x1, y1, 0.0);

        let top = v00 + (v10 - v00) * tx;
        let bottom = v01 + (v11 - v01) * tx;

        top + (bottom - top) * ty
    }

    /// Cell whose breakpoints are closest to an axis-space point
    pub fn nearest_cell(&self, x_value: f64, y_value: f64) -> (usize, usize) {
        (
            nearest_index(x_value, &self.x_axis),
            nearest_index(y_value, &self.y_axis),
        )
    }
}

/// Locate `value` on an axis: `(lower, upper, fraction)` between the two
/// bracketing breakpoints. Outside the axis (or NaN) it sticks to the edge.
///
/// Table axes are strictly increasing, which `set_axis_bins` enforces.
fn axis_position(value: f64, axis: &[f64]) -> (usize, usize, f64) {
    let (Some(&first), Some(&last)) = (axis.first(), axis.last()) else {
        return (0, 0, 0.0);
    };
    if value.is_nan() || value <= first {
        return (0, 0, 0.0);
    }
    let last_idx = axis.len() - 1;
    if value >= last {
        return (last_idx, last_idx, 0.0);
    }

    // value is strictly inside the axis, so upper is in 1..=last_idx
    let upper = axis.partition_point(|&b| b <= value);
    let lower = upper - 1;
    let fraction = (value - axis[lower]) / (axis[upper] - axis[lower]);
    (lower, upper, fraction)
}

fn nearest_index(value: f64, bins: &[f64]) -> usize {
    let (lo, hi, ratio) = axis_position(value, bins);
    if ratio >= 0.5 {
        hi
    } else {
        lo
    }
}
