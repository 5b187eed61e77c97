//! Message and identity types for hub routing
//!
//! A [`Message`] is built once per publish and handed to every subscriber behind an
//! `Arc`, so fan-out never copies the payload.

use serde::ser::{Error as _, SerializeSeq};
use serde::{Deserialize, Serialize, Serializer};

/// Process-unique subscriber identity, assigned in increasing order and never reused
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriberId(u64);

impl SubscriberId {
    /// Wrap a raw identity value
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw identity value
    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Row-major matrix of floating point values
///
/// Rows may differ in length. Integral values serialize without a fractional part
/// (`1` rather than `1.0`) and non-finite values refuse to serialize.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct Matrix(Vec<Vec<f64>>);

impl Matrix {
    /// Create a matrix from its rows
    pub fn new(rows: Vec<Vec<f64>>) -> Self {
        Self(rows)
    }

    /// Borrow the rows
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.0
    }

    /// Number of rows
    pub fn row_count(&self) -> usize {
        self.0.len()
    }

    /// Whether the matrix has no rows
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Vec<f64>>> for Matrix {
    fn from(rows: Vec<Vec<f64>>) -> Self {
        Self(rows)
    }
}

// Largest magnitude at which every integer is exactly representable as f64.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

struct Cell(f64);

impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let value = self.0;
        if !value.is_finite() {
            return Err(S::Error::custom(format!("unsupported value: {value}")));
        }
        if value.fract() == 0.0 && value.abs() <= MAX_EXACT_INTEGER {
            serializer.serialize_i64(value as i64)
        } else {
            serializer.serialize_f64(value)
        }
    }
}

struct Row<'a>(&'a [f64]);

impl Serialize for Row<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for value in self.0 {
            seq.serialize_element(&Cell(*value))?;
        }
        seq.end()
    }
}

impl Serialize for Matrix {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for row in &self.0 {
            seq.serialize_element(&Row(row))?;
        }
        seq.end()
    }
}

/// Payload carried by a message
///
/// Matrices are the common case. Any other JSON shape travels as [`Payload::Json`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Payload {
    /// Numeric matrix
    Matrix(Matrix),
    /// Arbitrary JSON value
    Json(serde_json::Value),
}

impl From<Matrix> for Payload {
    fn from(matrix: Matrix) -> Self {
        Payload::Matrix(matrix)
    }
}

impl From<Vec<Vec<f64>>> for Payload {
    fn from(rows: Vec<Vec<f64>>) -> Self {
        Payload::Matrix(Matrix::new(rows))
    }
}

impl From<serde_json::Value> for Payload {
    fn from(value: serde_json::Value) -> Self {
        Payload::Json(value)
    }
}

/// A published message: payload plus a short text label
///
/// Field names on the wire are `matrix` and `label`, in that order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "matrix")]
    payload: Payload,
    label: String,
}

impl Message {
    /// Create a message
    pub fn new(payload: impl Into<Payload>, label: impl Into<String>) -> Self {
        Self {
            payload: payload.into(),
            label: label.into(),
        }
    }

    /// The payload
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// The label
    pub fn label(&self) -> &str {
        &self.label
    }
}
