//! Demo table data
//!
//! Deterministic synthetic surfaces for offline editing and tests. A small
//! ripple is drawn from an RNG seeded by the table dimensions, so a given
//! kind and size always produces the same surface.

use std::f64::consts::PI;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{Table, TableKind};

/// Peak-to-peak size of the pseudo-random ripple
const RIPPLE: f64 = 1.0;

impl Table {
    /// Fill the table with the kind's demo surface
    pub fn load_demo_data(&mut self) {
        let seed = ((self.width as u64) << 32) | self.height as u64;
        let mut rng = StdRng::seed_from_u64(seed);
        let kind = self.kind;
        let (width, height) = (self.width, self.height);

        let mut writes = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                let xn = normalized(x, width);
                let yn = normalized(y, height);
                let ripple = rng.gen_range(-RIPPLE / 2.0..RIPPLE / 2.0);
                writes.push((x, y, demo_value(kind, xn, yn) + ripple));
            }
        }
        self.commit(&writes);

        tracing::debug!("Loaded demo data into {}x{} {}", width, height, self.metadata.name);
    }
}

fn normalized(i: usize, len: usize) -> f64 {
    if len > 1 {
        i as f64 / (len - 1) as f64
    } else {
        0.0
    }
}

/// Demo value at normalised position (`rpm`, `map` in 0..=1)
fn demo_value(kind: TableKind, rpm: f64, map: f64) -> f64 {
    match kind {
        TableKind::Ve => {
            // Rises with RPM, drops off under boost
            let base = 60.0 + rpm * 40.0;
            let map_correction = 1.0 - map * 0.2;
            let rpm_correction = 1.0 + rpm * 0.1;
            let ve = base * map_correction * rpm_correction
                + (rpm * PI * 2.0).sin() * 3.0
                + (map * PI * 2.0).cos() * 2.0;
            ve.clamp(30.0, 120.0)
        }
        TableKind::Ignition => {
            let timing = 10.0 + rpm * 25.0 - map * 10.0
                + (rpm * PI).sin() * 2.0
                + (map * PI).cos() * 1.5;
            timing.clamp(-10.0, 35.0)
        }
        TableKind::Boost => {
            let boost = (100.0 + rpm * 150.0) * (1.0 - map * 0.3) + (rpm * PI).sin() * 10.0;
            boost.clamp(100.0, 300.0)
        }
        TableKind::Generic => {
            50.0 + rpm * 30.0
                + map * 20.0
                + (rpm * PI * 2.0).sin() * 5.0
                + (map * PI * 2.0).cos() * 3.0
        }
    }
}
