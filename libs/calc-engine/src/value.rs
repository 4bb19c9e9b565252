//! Evaluation result model

use serde::{Deserialize, Serialize};

/// Result of evaluating an expression.
///
/// Evaluators return loosely typed results (numbers, complex numbers, strings);
/// they are narrowed to this closed set at the point where they are first consumed
/// so that formatting is exhaustive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Value {
    /// Real number
    Real(f64),
    /// Complex number as (real, imaginary)
    Complex(f64, f64),
    /// Non-numeric result rendered verbatim
    Text(String),
}

impl Value {
    /// Real part for numeric values, `None` for text
    pub fn as_real(&self) -> Option<f64> {
        match self {
            Self::Real(n) => Some(*n),
            Self::Complex(re, _) => Some(*re),
            Self::Text(_) => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        !matches!(self, Self::Text(_))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}
