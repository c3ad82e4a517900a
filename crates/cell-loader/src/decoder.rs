//! Recursive-descent driver over the type table.

use std::sync::Arc;

use crate::cells::header::decode_header;
use crate::definitions::DefinitionRegistry;
use crate::error::{CellError, Result};
use crate::options::{CancelToken, DecodeOptions};
use crate::registry;
use crate::scene::{Node, Scene};
use crate::tokenizer::Tokenizer;
use crate::warning::Warning;

/// Decoding state for one cell stream.
pub struct Decoder<'a> {
    tokens: Tokenizer<'a>,
    definitions: DefinitionRegistry,
    warnings: Vec<Warning>,
    options: DecodeOptions,
    cancel: CancelToken,
    depth: usize,
}

impl<'a> Decoder<'a> {
    /// Create a decoder over `input`.
    pub fn new(input: &'a [u8], options: DecodeOptions) -> Self {
        Self {
            tokens: Tokenizer::new(input),
            definitions: DefinitionRegistry::new(),
            warnings: Vec::new(),
            options,
            cancel: CancelToken::new(),
            depth: 0,
        }
    }

    /// Use `cancel` to stop the decode from elsewhere.
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Decode the root node and everything below it.
    ///
    /// Anything after the root record is ignored.
    pub fn decode_scene(mut self) -> Result<Scene> {
        let root = self.decode_node()?;
        Ok(Scene {
            root,
            definitions: self.definitions,
            warnings: self.warnings,
        })
    }

    /// Decode one node: type code, header, then the kind-specific body.
    pub fn decode_node(&mut self) -> Result<Arc<Node>> {
        let position = self.tokens.next_position();
        if self.cancel.is_cancelled() {
            return Err(CellError::Cancelled { position });
        }
        if let Some(limit) = self.options.max_depth {
            if self.depth > limit {
                return Err(CellError::NestingTooDeep { position, limit });
            }
        }

        let code = self.tokens.read_short("type code")?;
        let entry = registry::lookup(code)
            .ok_or(CellError::UnrecognizedTypeCode { position, code })?;
        let cell_type = entry.cell_type;
        let header = decode_header(self, cell_type)?;

        self.depth += 1;
        let shape = (entry.decode)(self, cell_type);
        self.depth -= 1;

        let node = Arc::new(Node {
            cell_type,
            position,
            header,
            shape: shape?,
        });
        tracing::trace!(
            cell_type = ?cell_type,
            name = node.name(),
            line = position.line,
            "decoded cell"
        );

        if cell_type.is_definition() {
            if let Some(name) = &node.header.name {
                self.definitions.register(name, &node, position)?;
            }
        }
        Ok(node)
    }

    /// Record a warning, or fail with it when warnings are errors.
    pub(crate) fn warn(&mut self, warning: Warning) -> Result<()> {
        tracing::warn!("{warning}");
        if self.options.warnings_as_errors {
            return Err(CellError::Warning(warning));
        }
        self.warnings.push(warning);
        Ok(())
    }

    pub(crate) fn tokens(&mut self) -> &mut Tokenizer<'a> {
        &mut self.tokens
    }

    pub(crate) fn definitions(&mut self) -> &mut DefinitionRegistry {
        &mut self.definitions
    }

    #[cfg(test)]
    pub(crate) fn into_warnings(self) -> Vec<Warning> {
        self.warnings
    }
}
