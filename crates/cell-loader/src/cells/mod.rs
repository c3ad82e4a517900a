//! Record grammars: the common header and the per-kind bodies.
//!
//! Field helpers here enforce the numeric invariants shared by many kinds,
//! reporting the position of the offending token.

pub mod geometry;
pub mod header;
pub mod primitives;
pub mod sets;

use crate::error::{CellError, Result};
use crate::tokenizer::Tokenizer;

/// Read a double that must be at least `min`.
pub(crate) fn read_min(tokens: &mut Tokenizer<'_>, field: &'static str, min: f64) -> Result<f64> {
    let value = tokens.read_double(field)?;
    if value < min {
        return Err(CellError::out_of_range(
            tokens.last_position(),
            field,
            value,
            Some(min),
            None,
        ));
    }
    Ok(value)
}

/// Read a double that must not be negative.
pub(crate) fn read_non_negative(tokens: &mut Tokenizer<'_>, field: &'static str) -> Result<f64> {
    read_min(tokens, field, 0.0)
}

/// Read an element count.
pub(crate) fn read_count(tokens: &mut Tokenizer<'_>, field: &'static str) -> Result<usize> {
    let count = tokens.read_int(field)?;
    usize::try_from(count).map_err(|_| {
        CellError::out_of_range(tokens.last_position(), field, f64::from(count), Some(0.0), None)
    })
}

/// Upper bound on capacity reserved from a count read off the stream.
const MAX_PREALLOCATION: usize = 1024;

/// Vector sized for `count` elements, capped so a bogus count cannot reserve
/// unbounded memory before the elements themselves fail to decode.
pub(crate) fn with_count_capacity<T>(count: usize) -> Vec<T> {
    Vec::with_capacity(count.min(MAX_PREALLOCATION))
}

/// Read an x y z triple.
pub(crate) fn read_point(tokens: &mut Tokenizer<'_>, field: &'static str) -> Result<[f64; 3]> {
    Ok([
        tokens.read_double(field)?,
        tokens.read_double(field)?,
        tokens.read_double(field)?,
    ])
}

/// Read a byte-sized enumeration code.
pub(crate) fn read_code<T>(
    tokens: &mut Tokenizer<'_>,
    field: &'static str,
    from_code: impl FnOnce(i8) -> Option<T>,
) -> Result<T> {
    let code = tokens.read_byte(field)?;
    from_code(code).ok_or_else(|| CellError::unknown_code(tokens.last_position(), field, code))
}
