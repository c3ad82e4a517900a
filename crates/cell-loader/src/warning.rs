//! Non-fatal diagnostics raised while decoding.

use serde::Serialize;
use thiserror::Error;

use crate::registry::CellType;
use crate::tokenizer::Position;

/// A suspicious but accepted value. Decoding continues with the value as read.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "warning", rename_all = "snake_case")]
pub enum Warning {
    /// Name longer than AutoMod officially supports.
    #[error("cell name {name:?} at {position} is {length} characters long, more than {limit}")]
    NameTooLong {
        /// Position of the name.
        position: Position,
        /// Name read.
        name: String,
        /// Its length in characters.
        length: usize,
        /// Supported maximum.
        limit: usize,
    },

    /// Name that does not start with a letter.
    #[error("cell name {name:?} at {position} does not start with a letter")]
    InvalidNameStart {
        /// Position of the name.
        position: Position,
        /// Name read.
        name: String,
    },

    /// Offset that the cell kind ignores is not zero.
    #[error("{cell_type:?} cell at {position} has a non-zero offset ({x}, {y}), which is ignored")]
    IgnoredOffset {
        /// Position of the offset.
        position: Position,
        /// Kind of the cell.
        cell_type: CellType,
        /// X offset read.
        x: f64,
        /// Y offset read.
        y: f64,
    },
}

impl Warning {
    /// Position in the stream the warning refers to.
    pub fn position(&self) -> Position {
        match self {
            Warning::NameTooLong { position, .. }
            | Warning::InvalidNameStart { position, .. }
            | Warning::IgnoredOffset { position, .. } => *position,
        }
    }
}
