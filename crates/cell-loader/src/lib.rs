#![warn(missing_docs)]

//! Decoder for AutoMod cell files.
//!
//! A cell file is a whitespace-delimited stream of type-coded records
//! describing a 3D layout: primitives, sets of child records, and named
//! definitions reused through instances. This crate turns one stream into an
//! immutable [`Scene`] tree, reporting malformed input and invalid values as
//! [`CellError`]s and suspicious values as [`Warning`]s.
//!
//! # Example
//!
//! ```no_run
//! use cell_loader::{read_cell, CellLoader, DecodeOptions};
//!
//! // Read a cell file with default options
//! let scene = read_cell("layout.cell").unwrap();
//! println!("{} nodes", scene.node_count());
//!
//! // Fail on the first warning
//! let strict = CellLoader::new().with_options(DecodeOptions {
//!     warnings_as_errors: true,
//!     ..DecodeOptions::default()
//! });
//! let scene = strict.load_path("layout.cell").unwrap();
//! ```

mod cells;
mod decoder;
mod definitions;
mod error;
mod options;
mod reader;
mod registry;
mod scene;
mod tokenizer;
mod warning;

pub use cells::geometry::{Geometry, MATRIX_ROTATION_ORDER};
pub use cells::header::{
    validate_name, BoundingBox, CellColor, CellFlags, DisplayStyle, Joint, JointType, LineStyle,
    NodeHeader, DEFAULT_NAME, MAX_NAME_LENGTH,
};
pub use cells::primitives::EMBEDDED_FILE_TERMINATOR;
pub use decoder::Decoder;
pub use definitions::DefinitionRegistry;
pub use error::{CellError, ErrorKind, Result};
pub use options::{CancelToken, DecodeOptions, DEFAULT_MAX_DEPTH};
pub use reader::{read_cell, read_cell_from_buffer, read_cell_from_reader, CellLoader};
pub use registry::{entries, lookup, CellType, CellTypeEntry, DecodeFn, Resolution, TextMode};
pub use scene::{Instance, Node, Polyhedron, Scene, Shape, TextItem};
pub use tokenizer::{Field, Position, Tokenizer};
pub use warning::Warning;
