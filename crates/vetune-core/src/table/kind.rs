//! Table kinds
//!
//! The kinds differ only in their default bounds, labels and reset value.

use serde::{Deserialize, Serialize};

/// Kind of tuning map held by a [`Table`](super::Table)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    /// Volumetric efficiency (fuel) map
    #[default]
    Ve,
    /// Ignition advance map
    Ignition,
    /// Boost target map
    Boost,
    /// Anything else
    Generic,
}

impl TableKind {
    /// Internal table name, as used by ECU definitions
    pub fn name(&self) -> &'static str {
        match self {
            TableKind::Ve => "veTable",
            TableKind::Ignition => "ignitionTable",
            TableKind::Boost => "boostTable",
            TableKind::Generic => "table",
        }
    }

    /// Human readable title
    pub fn display_name(&self) -> &'static str {
        match self {
            TableKind::Ve => "VE Table",
            TableKind::Ignition => "Ignition Table",
            TableKind::Boost => "Boost Table",
            TableKind::Generic => "Table",
        }
    }

    /// Units of the cell values
    pub fn units(&self) -> &'static str {
        match self {
            TableKind::Ve => "%",
            TableKind::Ignition => "deg",
            TableKind::Boost => "kPa",
            TableKind::Generic => "",
        }
    }

    /// Label of the cell values
    pub fn value_label(&self) -> &'static str {
        match self {
            TableKind::Ve => "VE",
            TableKind::Ignition => "Advance",
            TableKind::Boost => "Target Boost",
            TableKind::Generic => "Value",
        }
    }

    /// Default clamping bounds `(min, max)`
    pub fn default_bounds(&self) -> (f64, f64) {
        match self {
            TableKind::Ve => (0.0, 200.0),
            TableKind::Ignition => (-50.0, 50.0),
            TableKind::Boost => (0.0, 300.0),
            TableKind::Generic => (0.0, 100.0),
        }
    }

    /// Value written by the Reset operation and used to fill new storage
    pub fn reset_value(&self) -> f64 {
        match self {
            TableKind::Ve => 75.0,
            TableKind::Ignition => 10.0,
            TableKind::Boost => 100.0,
            TableKind::Generic => 50.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_value_within_bounds() {
        for kind in [
            TableKind::Ve,
            TableKind::Ignition,
            TableKind::Boost,
            TableKind::Generic,
        ] {
            let (min, max) = kind.default_bounds();
            let reset = kind.reset_value();
            assert!(min < max);
            assert!(reset >= min && reset <= max, "{:?} reset out of range", kind);
        }
    }
}
