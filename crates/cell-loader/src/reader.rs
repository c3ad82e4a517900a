//! Cell file reader: acquires a stream and decodes it into a [`Scene`].

use std::io::Read;
use std::path::Path;

use crate::decoder::Decoder;
use crate::error::Result;
use crate::options::{CancelToken, DecodeOptions};
use crate::scene::Scene;

/// Read a cell file from a path.
///
/// # Arguments
///
/// * `path` - Path to the cell file
///
/// # Returns
///
/// The decoded scene.
pub fn read_cell(path: impl AsRef<Path>) -> Result<Scene> {
    CellLoader::new().load_path(path)
}

/// Read cell data from a byte buffer.
///
/// # Arguments
///
/// * `data` - Raw cell file contents
///
/// # Returns
///
/// The decoded scene.
pub fn read_cell_from_buffer(data: &[u8]) -> Result<Scene> {
    CellLoader::new().load_buffer(data)
}

/// Read cell data from any byte source.
pub fn read_cell_from_reader(reader: impl Read) -> Result<Scene> {
    CellLoader::new().load_reader(reader)
}

/// Configurable cell loader.
#[derive(Debug, Clone, Default)]
pub struct CellLoader {
    options: DecodeOptions,
    cancel: CancelToken,
}

impl CellLoader {
    /// Loader with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the decode options.
    pub fn with_options(mut self, options: DecodeOptions) -> Self {
        self.options = options;
        self
    }

    /// Observe `cancel` while decoding.
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Decode the file at `path`.
    #[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load_path(&self, path: impl AsRef<Path>) -> Result<Scene> {
        let data = std::fs::read(path.as_ref())?;
        self.load_buffer(&data)
    }

    /// Decode everything `reader` yields.
    pub fn load_reader(&self, mut reader: impl Read) -> Result<Scene> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        self.load_buffer(&data)
    }

    /// Decode an in-memory buffer.
    #[tracing::instrument(skip_all, fields(bytes = data.len()))]
    pub fn load_buffer(&self, data: &[u8]) -> Result<Scene> {
        let scene = Decoder::new(data, self.options.clone())
            .with_cancel_token(self.cancel.clone())
            .decode_scene()?;
        tracing::debug!(
            root = ?scene.root.cell_type,
            nodes = scene.node_count(),
            definitions = scene.definitions.len(),
            warnings = scene.warnings.len(),
            "decoded cell scene"
        );
        Ok(scene)
    }
}
