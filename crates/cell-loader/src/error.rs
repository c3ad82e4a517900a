//! Error types for cell decoding.

use cell_math::DecomposeError;
use thiserror::Error;

use crate::registry::CellType;
use crate::tokenizer::Position;
use crate::warning::Warning;

/// Broad classification of a [`CellError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The input is not a cell stream at all ("incorrect format").
    MalformedStream,
    /// The input looks like a cell stream but holds invalid values ("parsing error").
    Semantic,
    /// The caller cancelled the decode.
    Cancelled,
}

/// Errors that can occur while decoding a cell stream.
#[derive(Error, Debug)]
pub enum CellError {
    /// I/O failure while acquiring the stream.
    #[error("stream failure: {0}")]
    StreamFailure(#[from] std::io::Error),

    /// The stream ended while a field was still expected.
    #[error("unexpected end of stream at {position} while reading {field}")]
    UnexpectedEnd {
        /// Where the stream ended.
        position: Position,
        /// Field being read.
        field: &'static str,
    },

    /// A token could not be converted to the requested scalar type.
    #[error("invalid {field} at {position}: expected {expected}, found {token:?}")]
    InvalidFieldValue {
        /// Token position.
        position: Position,
        /// Field being read.
        field: &'static str,
        /// Description of the accepted values.
        expected: &'static str,
        /// Offending token.
        token: String,
    },

    /// The type code does not name any known cell kind.
    #[error("unrecognized cell type code {code} at {position}")]
    UnrecognizedTypeCode {
        /// Token position.
        position: Position,
        /// Code read.
        code: i16,
    },

    /// A numeric field is outside its permitted range.
    #[error("{field} at {position} is {value}, {}", describe_bounds(.min, .max))]
    OutOfRange {
        /// Token position.
        position: Position,
        /// Field name.
        field: &'static str,
        /// Value read.
        value: f64,
        /// Inclusive lower bound, if any.
        min: Option<f64>,
        /// Inclusive upper bound, if any.
        max: Option<f64>,
    },

    /// A minimum/maximum pair is reversed.
    #[error("{field} at {position}: minimum {min} exceeds maximum {max}")]
    InvertedRange {
        /// Position of the maximum.
        position: Position,
        /// Range name.
        field: &'static str,
        /// Minimum read.
        min: f64,
        /// Maximum read.
        max: f64,
    },

    /// An enumeration code has no matching value.
    #[error("unknown {field} code {code} at {position}")]
    UnknownEnumCode {
        /// Token position.
        position: Position,
        /// Enumeration name.
        field: &'static str,
        /// Code read.
        code: i64,
    },

    /// A cell name is empty or contains characters outside `[A-Za-z0-9_]`.
    #[error("invalid cell name {name:?} at {position}")]
    InvalidName {
        /// Token position.
        position: Position,
        /// Name read.
        name: String,
    },

    /// Joint data on a cell kind that does not accept it.
    #[error("{cell_type:?} cell at {position} cannot carry joint data")]
    JointNotAccepted {
        /// Position of the cell.
        position: Position,
        /// Kind of the cell.
        cell_type: CellType,
    },

    /// A terminal-control-frame-only joint without TCF data.
    #[error("TCF-only joint at {position} has no TCF data")]
    TcfDataMissing {
        /// Position of the TCF flag.
        position: Position,
    },

    /// A field that must hold a fixed literal holds something else.
    #[error("{field} at {position}: expected {expected:?}, found {found:?}")]
    UnexpectedFieldValue {
        /// Token position.
        position: Position,
        /// Field name.
        field: &'static str,
        /// Required literal.
        expected: &'static str,
        /// Token read.
        found: String,
    },

    /// A definition name is already bound to a different cell.
    #[error("definition name {name:?} at {position} is already bound to another cell")]
    NamingCollision {
        /// Position of the colliding cell.
        position: Position,
        /// Contested name.
        name: String,
    },

    /// An instance of an unknown name is followed by a cell that cannot be a definition.
    #[error("instance of {name:?} at {position} is followed by a {cell_type:?} cell, which is not a definition")]
    NotADefinition {
        /// Position of the following cell.
        position: Position,
        /// Referenced name.
        name: String,
        /// Kind of the following cell.
        cell_type: CellType,
    },

    /// A polyhedron face references a vertex that does not exist.
    #[error("face {face} at {position} references vertex {index}, but only {vertex_count} vertices exist")]
    FaceIndexOutOfRange {
        /// Token position.
        position: Position,
        /// Zero-based face number.
        face: usize,
        /// One-based vertex index read.
        index: i32,
        /// Vertices in the polyhedron.
        vertex_count: usize,
    },

    /// A matrix-form geometry has no translate/rotate/scale form.
    #[error("invalid geometry matrix at {position}: {source}")]
    InvalidGeometry {
        /// Position of the first matrix value.
        position: Position,
        /// Why the matrix was rejected.
        #[source]
        source: DecomposeError,
    },

    /// Cells are nested deeper than the configured limit.
    #[error("cell at {position} is nested deeper than the limit of {limit}")]
    NestingTooDeep {
        /// Position of the cell.
        position: Position,
        /// Configured limit.
        limit: usize,
    },

    /// A warning raised while warnings are treated as errors.
    #[error("{0}")]
    Warning(#[from] Warning),

    /// The decode was cancelled through its [`CancelToken`](crate::CancelToken).
    #[error("decode cancelled at {position}")]
    Cancelled {
        /// Cursor position when cancellation was noticed.
        position: Position,
    },
}

impl CellError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CellError::UnexpectedEnd { .. }
            | CellError::InvalidFieldValue { .. }
            | CellError::UnrecognizedTypeCode { .. } => ErrorKind::MalformedStream,
            CellError::Cancelled { .. } => ErrorKind::Cancelled,
            _ => ErrorKind::Semantic,
        }
    }

    /// Position in the stream the error refers to, if any.
    pub fn position(&self) -> Option<Position> {
        match self {
            CellError::StreamFailure(_) => None,
            CellError::Warning(warning) => Some(warning.position()),
            CellError::UnexpectedEnd { position, .. }
            | CellError::InvalidFieldValue { position, .. }
            | CellError::UnrecognizedTypeCode { position, .. }
            | CellError::OutOfRange { position, .. }
            | CellError::InvertedRange { position, .. }
            | CellError::UnknownEnumCode { position, .. }
            | CellError::InvalidName { position, .. }
            | CellError::JointNotAccepted { position, .. }
            | CellError::TcfDataMissing { position }
            | CellError::UnexpectedFieldValue { position, .. }
            | CellError::NamingCollision { position, .. }
            | CellError::NotADefinition { position, .. }
            | CellError::FaceIndexOutOfRange { position, .. }
            | CellError::InvalidGeometry { position, .. }
            | CellError::NestingTooDeep { position, .. }
            | CellError::Cancelled { position } => Some(*position),
        }
    }

    /// Create an out-of-range error.
    pub fn out_of_range(
        position: Position,
        field: &'static str,
        value: f64,
        min: Option<f64>,
        max: Option<f64>,
    ) -> Self {
        Self::OutOfRange {
            position,
            field,
            value,
            min,
            max,
        }
    }

    /// Create an unknown-enumeration-code error.
    pub fn unknown_code(position: Position, field: &'static str, code: impl Into<i64>) -> Self {
        Self::UnknownEnumCode {
            position,
            field,
            code: code.into(),
        }
    }
}

fn describe_bounds(min: &Option<f64>, max: &Option<f64>) -> String {
    match (min, max) {
        (Some(min), Some(max)) => format!("outside [{min}, {max}]"),
        (Some(min), None) => format!("below minimum {min}"),
        (None, Some(max)) => format!("above maximum {max}"),
        (None, None) => "out of range".to_string(),
    }
}

/// Result type for cell decoding.
pub type Result<T> = std::result::Result<T, CellError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        let at = Position { line: 3, col: 7 };
        assert_eq!(
            CellError::UnexpectedEnd { position: at, field: "radius" }.kind(),
            ErrorKind::MalformedStream
        );
        assert_eq!(
            CellError::UnrecognizedTypeCode { position: at, code: 42 }.kind(),
            ErrorKind::MalformedStream
        );
        assert_eq!(
            CellError::out_of_range(at, "line width", 9.0, Some(1.0), Some(8.0)).kind(),
            ErrorKind::Semantic
        );
        assert_eq!(
            CellError::from(std::io::Error::other("disk on fire")).kind(),
            ErrorKind::Semantic
        );
        assert_eq!(CellError::Cancelled { position: at }.kind(), ErrorKind::Cancelled);
    }

    #[test]
    fn test_messages_carry_structured_data() {
        let at = Position { line: 2, col: 5 };
        let err = CellError::out_of_range(at, "line width", 9.0, Some(1.0), Some(8.0));
        assert_eq!(err.to_string(), "line width at line 2, column 5 is 9, outside [1, 8]");
        assert_eq!(err.position(), Some(at));

        let err = CellError::out_of_range(at, "radius", -1.0, Some(0.0), None);
        assert_eq!(err.to_string(), "radius at line 2, column 5 is -1, below minimum 0");
    }
}
