//! Containers and instances.

use std::sync::Arc;

use crate::cells::{read_count, with_count_capacity};
use crate::decoder::Decoder;
use crate::error::{CellError, Result};
use crate::registry::CellType;
use crate::scene::{Instance, Shape};

/// Child count, then exactly that many child nodes.
pub(crate) fn decode_set(decoder: &mut Decoder<'_>, _cell_type: CellType) -> Result<Shape> {
    let count = read_count(decoder.tokens(), "child count")?;
    let mut children = with_count_capacity(count);
    for _ in 0..count {
        children.push(decoder.decode_node()?);
    }
    Ok(Shape::Container { children })
}

/// Referenced name. When the name is not yet bound, the definition follows
/// inline and is bound to it here.
pub(crate) fn decode_instance(decoder: &mut Decoder<'_>, _cell_type: CellType) -> Result<Shape> {
    let reference = decoder.tokens().read_string("definition name")?;
    if let Some(definition) = decoder.definitions().get(&reference) {
        return Ok(Shape::Instance(Instance {
            definition: Arc::clone(definition),
            reference,
        }));
    }

    let definition = decoder.decode_node()?;
    if !definition.cell_type.is_definition() {
        return Err(CellError::NotADefinition {
            position: definition.position,
            name: reference,
            cell_type: definition.cell_type,
        });
    }
    decoder
        .definitions()
        .register(&reference, &definition, definition.position)?;
    Ok(Shape::Instance(Instance {
        reference,
        definition,
    }))
}
