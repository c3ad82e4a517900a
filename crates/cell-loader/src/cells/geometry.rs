//! Local transformation of a node.

use cell_math::{RotationOrder, Transform, Trs, Vec3, MIN_SCALE};
use serde::Serialize;

use crate::cells::{read_code, read_min, read_point};
use crate::error::{CellError, Result};
use crate::tokenizer::Tokenizer;

/// Rotation order used when decomposing matrix-form geometry.
pub const MATRIX_ROTATION_ORDER: RotationOrder = RotationOrder::Zxy;

/// Translation, rotation and scale of a node relative to its parent.
///
/// Both wire encodings normalize to this form. Angles are in degrees, as
/// they appear on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Geometry {
    /// Translation along x, y and z.
    pub translation: [f64; 3],
    /// Order in which the three rotations are applied.
    pub order: RotationOrder,
    /// Rotation about x, y and z, in degrees.
    pub rotation: [f64; 3],
    /// Scale along x, y and z; each at least [`MIN_SCALE`].
    pub scale: [f64; 3],
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            translation: [0.0; 3],
            order: RotationOrder::default(),
            rotation: [0.0; 3],
            scale: [1.0; 3],
        }
    }
}

impl Geometry {
    /// Whether this is the identity transformation.
    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }

    /// Convert to a translate/rotate/scale triple in radians.
    pub fn to_trs(&self) -> Trs {
        Trs {
            translation: Vec3::from(self.translation),
            order: self.order,
            rotation: Vec3::from(self.rotation.map(f64::to_radians)),
            scale: Vec3::from(self.scale),
        }
    }

    /// Build from a translate/rotate/scale triple in radians.
    pub fn from_trs(trs: &Trs) -> Self {
        Self {
            translation: trs.translation.into(),
            order: trs.order,
            rotation: trs.rotation.map(f64::to_degrees).into(),
            scale: trs.scale.into(),
        }
    }

    /// Affine matrix of this geometry.
    pub fn transform(&self) -> Transform {
        Transform::from_trs(&self.to_trs())
    }

    /// Decode a geometry record in either wire encoding.
    pub(crate) fn decode(tokens: &mut Tokenizer<'_>, matrix_form: bool) -> Result<Self> {
        if matrix_form {
            Self::decode_matrix(tokens)
        } else {
            Self::decode_explicit(tokens)
        }
    }

    fn decode_explicit(tokens: &mut Tokenizer<'_>) -> Result<Self> {
        let translation = read_point(tokens, "translation")?;
        let order = read_code(tokens, "rotation order", |code| {
            RotationOrder::from_code(i64::from(code))
        })?;
        let rotation = read_point(tokens, "rotation")?;
        let scale = [
            read_min(tokens, "scale", MIN_SCALE)?,
            read_min(tokens, "scale", MIN_SCALE)?,
            read_min(tokens, "scale", MIN_SCALE)?,
        ];
        Ok(Self {
            translation,
            order,
            rotation,
            scale,
        })
    }

    /// Sixteen values, four rows of four, with translation in the last row.
    fn decode_matrix(tokens: &mut Tokenizer<'_>) -> Result<Self> {
        let position = tokens.next_position();
        let mut values = [0.0; 16];
        for value in &mut values {
            *value = tokens.read_double("geometry matrix")?;
        }
        let trs = Transform::from_row_vector_rows(values)
            .decompose(MATRIX_ROTATION_ORDER)
            .map_err(|source| CellError::InvalidGeometry { position, source })?;
        Ok(Self::from_trs(&trs))
    }
}
