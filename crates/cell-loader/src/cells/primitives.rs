//! Bodies of the leaf record kinds.

use crate::cells::{read_count, read_non_negative, read_point, with_count_capacity};
use crate::decoder::Decoder;
use crate::error::{CellError, Result};
use crate::registry::{CellType, Resolution, TextMode};
use crate::scene::{Polyhedron, Shape, TextItem};
use crate::warning::Warning;

/// Line that ends an embedded Open Inventor file.
pub const EMBEDDED_FILE_TERMINATOR: &str = "#Inventor END";

pub(crate) fn decode_triad(_decoder: &mut Decoder<'_>, _cell_type: CellType) -> Result<Shape> {
    Ok(Shape::Triad)
}

pub(crate) fn decode_vector_list(decoder: &mut Decoder<'_>, _cell_type: CellType) -> Result<Shape> {
    let tokens = decoder.tokens();
    let count = read_count(tokens, "point count")?;
    let points = (0..count)
        .map(|_| read_point(tokens, "point"))
        .collect::<Result<Vec<_>>>()?;
    Ok(Shape::VectorList { points })
}

/// Vertex triples, then faces of one-based vertex indices.
pub(crate) fn decode_polyhedron(decoder: &mut Decoder<'_>, _cell_type: CellType) -> Result<Shape> {
    let tokens = decoder.tokens();
    let vertex_count = read_count(tokens, "vertex count")?;
    let vertices = (0..vertex_count)
        .map(|_| read_point(tokens, "vertex"))
        .collect::<Result<Vec<_>>>()?;

    let face_count = read_count(tokens, "face count")?;
    let mut faces = with_count_capacity(face_count);
    for face in 0..face_count {
        let index_count = read_count(tokens, "face index count")?;
        if index_count < 3 {
            return Err(CellError::out_of_range(
                tokens.last_position(),
                "face index count",
                index_count as f64,
                Some(3.0),
                None,
            ));
        }
        let mut indices = with_count_capacity(index_count);
        for _ in 0..index_count {
            let index = tokens.read_int("face index")?;
            match usize::try_from(index) {
                Ok(one_based @ 1..) if one_based <= vertex_count => indices.push(one_based - 1),
                _ => {
                    return Err(CellError::FaceIndexOutOfRange {
                        position: tokens.last_position(),
                        face,
                        index,
                        vertex_count,
                    })
                }
            }
        }
        faces.push(indices);
    }

    Ok(Shape::Polyhedron(Polyhedron { vertices, faces }))
}

pub(crate) fn decode_arc(decoder: &mut Decoder<'_>, cell_type: CellType) -> Result<Shape> {
    let tokens = decoder.tokens();
    Ok(Shape::Arc {
        resolution: resolution(cell_type),
        radius: read_non_negative(tokens, "radius")?,
        start_angle: tokens.read_double("start angle")?,
        end_angle: tokens.read_double("end angle")?,
    })
}

pub(crate) fn decode_text(decoder: &mut Decoder<'_>, cell_type: CellType) -> Result<Shape> {
    Ok(Shape::Text {
        mode: text_mode(cell_type),
        text: decoder.tokens().read_line("text")?,
    })
}

pub(crate) fn decode_text_list(decoder: &mut Decoder<'_>, cell_type: CellType) -> Result<Shape> {
    let tokens = decoder.tokens();
    let count = read_count(tokens, "text count")?;
    let mut items = with_count_capacity(count);
    for _ in 0..count {
        let offset = read_point(tokens, "text offset")?;
        let text = tokens.read_line("text")?;
        items.push(TextItem { offset, text });
    }
    Ok(Shape::TextList {
        mode: text_mode(cell_type),
        items,
    })
}

pub(crate) fn decode_trapezoid(decoder: &mut Decoder<'_>, _cell_type: CellType) -> Result<Shape> {
    let tokens = decoder.tokens();
    Ok(Shape::Trapezoid {
        x_bottom: read_non_negative(tokens, "x bottom")?,
        x_top: read_non_negative(tokens, "x top")?,
        y_bottom: read_non_negative(tokens, "y bottom")?,
        y_top: read_non_negative(tokens, "y top")?,
        height: read_non_negative(tokens, "height")?,
        x_offset: tokens.read_double("x offset")?,
    })
}

pub(crate) fn decode_tetrahedron(decoder: &mut Decoder<'_>, _cell_type: CellType) -> Result<Shape> {
    let tokens = decoder.tokens();
    Ok(Shape::Tetrahedron {
        x_base: read_non_negative(tokens, "x base")?,
        y_base: read_non_negative(tokens, "y base")?,
        height: read_non_negative(tokens, "height")?,
        apex_x_offset: tokens.read_double("apex x offset")?,
        apex_y_offset: tokens.read_double("apex y offset")?,
    })
}

/// Rectangles carry an offset pair that AutoMod ignores; a non-zero pair is
/// kept as read but flagged.
pub(crate) fn decode_rectangle(decoder: &mut Decoder<'_>, cell_type: CellType) -> Result<Shape> {
    let tokens = decoder.tokens();
    let width = read_non_negative(tokens, "width")?;
    let length = read_non_negative(tokens, "length")?;
    let position = tokens.next_position();
    let x_offset = tokens.read_double("x offset")?;
    let y_offset = tokens.read_double("y offset")?;
    if x_offset != 0.0 || y_offset != 0.0 {
        decoder.warn(Warning::IgnoredOffset {
            position,
            cell_type,
            x: x_offset,
            y: y_offset,
        })?;
    }
    Ok(Shape::Rectangle {
        width,
        length,
        x_offset,
        y_offset,
    })
}

pub(crate) fn decode_hemisphere(decoder: &mut Decoder<'_>, cell_type: CellType) -> Result<Shape> {
    Ok(Shape::Hemisphere {
        resolution: resolution(cell_type),
        radius: read_non_negative(decoder.tokens(), "radius")?,
    })
}

pub(crate) fn decode_cone(decoder: &mut Decoder<'_>, cell_type: CellType) -> Result<Shape> {
    let tokens = decoder.tokens();
    Ok(Shape::Cone {
        resolution: resolution(cell_type),
        radius: read_non_negative(tokens, "radius")?,
        height: read_non_negative(tokens, "height")?,
        x_offset: tokens.read_double("x offset")?,
        y_offset: tokens.read_double("y offset")?,
    })
}

pub(crate) fn decode_cylinder(decoder: &mut Decoder<'_>, cell_type: CellType) -> Result<Shape> {
    let tokens = decoder.tokens();
    Ok(Shape::Cylinder {
        resolution: resolution(cell_type),
        radius: read_non_negative(tokens, "radius")?,
        height: read_non_negative(tokens, "height")?,
        x_offset: tokens.read_double("x offset")?,
        y_offset: tokens.read_double("y offset")?,
    })
}

pub(crate) fn decode_frustum(decoder: &mut Decoder<'_>, cell_type: CellType) -> Result<Shape> {
    let tokens = decoder.tokens();
    Ok(Shape::Frustum {
        resolution: resolution(cell_type),
        base_radius: read_non_negative(tokens, "base radius")?,
        top_radius: read_non_negative(tokens, "top radius")?,
        height: read_non_negative(tokens, "height")?,
        x_offset: tokens.read_double("x offset")?,
        y_offset: tokens.read_double("y offset")?,
    })
}

pub(crate) fn decode_file_reference(decoder: &mut Decoder<'_>, _cell_type: CellType) -> Result<Shape> {
    Ok(Shape::FileReference {
        path: decoder.tokens().read_line("file path")?,
    })
}

pub(crate) fn decode_compiled_picture(decoder: &mut Decoder<'_>, _cell_type: CellType) -> Result<Shape> {
    Ok(Shape::CompiledPicture {
        path: decoder.tokens().read_line("picture path")?,
    })
}

pub(crate) fn decode_embedded_file(decoder: &mut Decoder<'_>, _cell_type: CellType) -> Result<Shape> {
    let lines = decoder
        .tokens()
        .read_until_sentinel("embedded file", EMBEDDED_FILE_TERMINATOR)?;
    Ok(Shape::EmbeddedFile { lines })
}

fn resolution(cell_type: CellType) -> Resolution {
    cell_type.resolution().unwrap_or(Resolution::Coarse)
}

fn text_mode(cell_type: CellType) -> TextMode {
    cell_type.text_mode().unwrap_or(TextMode::World)
}
