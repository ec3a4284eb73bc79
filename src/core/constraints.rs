//! Named geometric predicates over numeric feature matrices.
//!
//! Predicates are a closed set. Lookup by name is infallible: any name
//! outside the set resolves to [`Constraint::Default`], which accepts
//! everything. Shape problems never panic, they reject.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Golden-ratio falloff between consecutive rows of a `recursive` matrix.
pub const GOLDEN_FALLOFF: f64 = 0.618;
/// Absolute tolerance for the zero tests of `orthogonal` and `hyperbolic`.
pub const ZERO_TOLERANCE: f64 = 1e-6;
const FALLOFF_TOLERANCE: f64 = 1e-9;

/// Row-major numeric input for a [`Constraint`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureMatrix {
    rows: Vec<Vec<f64>>,
}

impl FeatureMatrix {
    pub fn new(rows: Vec<Vec<f64>>) -> Self {
        Self { rows }
    }

    /// An `n x 1` column, one row per value.
    pub fn column(values: &[f64]) -> Self {
        Self {
            rows: values.iter().map(|v| vec![*v]).collect(),
        }
    }

    /// Character codes of `path` as a column.
    pub fn from_path(path: &str) -> Self {
        Self::column(&char_codes(path))
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Column count when every row has the same width, `None` for ragged or
    /// empty matrices.
    pub fn width(&self) -> Option<usize> {
        let first = self.rows.first()?.len();
        self.rows
            .iter()
            .all(|row| row.len() == first)
            .then_some(first)
    }
}

/// Unicode scalar values of `s` as `f64`.
pub fn char_codes(s: &str) -> Vec<f64> {
    s.chars().map(|c| f64::from(u32::from(c))).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Constraint {
    Recursive,
    Orthogonal,
    Hyperbolic,
    Default,
}

impl Constraint {
    pub const ALL: [Constraint; 4] = [
        Constraint::Recursive,
        Constraint::Orthogonal,
        Constraint::Hyperbolic,
        Constraint::Default,
    ];

    /// Resolve a predicate by name. Unknown names fall back to `Default`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "recursive" => Self::Recursive,
            "orthogonal" => Self::Orthogonal,
            "hyperbolic" => Self::Hyperbolic,
            _ => Self::Default,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Recursive => "recursive",
            Self::Orthogonal => "orthogonal",
            Self::Hyperbolic => "hyperbolic",
            Self::Default => "default",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Recursive => "each row equals the previous row scaled by 0.618",
            Self::Orthogonal => "two columns whose dot product is zero",
            Self::Hyperbolic => "every column sums to zero",
            Self::Default => "always accepts",
        }
    }

    pub fn check(self, matrix: &FeatureMatrix) -> bool {
        match self {
            Self::Recursive => recursive(matrix),
            Self::Orthogonal => orthogonal(matrix),
            Self::Hyperbolic => hyperbolic(matrix),
            Self::Default => true,
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// `validate(name, matrix)`: resolve then check.
pub fn validate(name: &str, matrix: &FeatureMatrix) -> bool {
    Constraint::from_name(name).check(matrix)
}

fn recursive(matrix: &FeatureMatrix) -> bool {
    if matrix.row_count() < 2 || matrix.width().is_none() {
        return false;
    }
    matrix.rows().windows(2).all(|pair| {
        pair[1].iter().zip(&pair[0]).all(|(cur, prev)| {
            let expected = prev * GOLDEN_FALLOFF;
            (cur - expected).abs() <= FALLOFF_TOLERANCE * expected.abs().max(1.0)
        })
    })
}

fn orthogonal(matrix: &FeatureMatrix) -> bool {
    if matrix.width() != Some(2) {
        return false;
    }
    let dot: f64 = matrix.rows().iter().map(|row| row[0] * row[1]).sum();
    dot.abs() <= ZERO_TOLERANCE
}

fn hyperbolic(matrix: &FeatureMatrix) -> bool {
    let Some(width) = matrix.width() else {
        return false;
    };
    (0..width).all(|col| {
        let sum: f64 = matrix.rows().iter().map(|row| row[col]).sum();
        sum.abs() < ZERO_TOLERANCE
    })
}
