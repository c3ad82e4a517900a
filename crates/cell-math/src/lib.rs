#![warn(missing_docs)]

//! Math types for AutoMod cell scenes.
//!
//! Thin wrappers around nalgebra: points, vectors, 4x4 affine transforms,
//! the six Euler rotation orders used by cell geometry records, and the
//! translate/rotate/scale decomposition of an affine matrix.

use nalgebra::{Matrix3, Matrix4, Vector3, Vector4};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// Smallest scale factor a cell geometry may carry along any axis.
pub const MIN_SCALE: f64 = 1.0e-20;

/// Below this, the middle rotation of an Euler triple is treated as ±90°.
const GIMBAL_EPSILON: f64 = 1.0e-12;

/// A coordinate axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    /// The X axis.
    X,
    /// The Y axis.
    Y,
    /// The Z axis.
    Z,
}

impl Axis {
    /// Index of this axis into a 3-vector.
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// Order in which the three axis rotations of a geometry are applied.
///
/// `Xyz` rotates about X first, then Y, then Z (all about fixed axes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RotationOrder {
    /// X, then Y, then Z.
    #[default]
    Xyz,
    /// X, then Z, then Y.
    Xzy,
    /// Y, then X, then Z.
    Yxz,
    /// Y, then Z, then X.
    Yzx,
    /// Z, then X, then Y.
    Zxy,
    /// Z, then Y, then X.
    Zyx,
}

impl RotationOrder {
    /// All orders, indexed by their wire code.
    pub const ALL: [RotationOrder; 6] = [
        RotationOrder::Xyz,
        RotationOrder::Xzy,
        RotationOrder::Yxz,
        RotationOrder::Yzx,
        RotationOrder::Zxy,
        RotationOrder::Zyx,
    ];

    /// Look up an order from its wire code (0..=5).
    pub fn from_code(code: i64) -> Option<Self> {
        usize::try_from(code)
            .ok()
            .and_then(|idx| Self::ALL.get(idx).copied())
    }

    /// Wire code of this order.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Axes in application order.
    pub fn axes(self) -> [Axis; 3] {
        match self {
            RotationOrder::Xyz => [Axis::X, Axis::Y, Axis::Z],
            RotationOrder::Xzy => [Axis::X, Axis::Z, Axis::Y],
            RotationOrder::Yxz => [Axis::Y, Axis::X, Axis::Z],
            RotationOrder::Yzx => [Axis::Y, Axis::Z, Axis::X],
            RotationOrder::Zxy => [Axis::Z, Axis::X, Axis::Y],
            RotationOrder::Zyx => [Axis::Z, Axis::Y, Axis::X],
        }
    }

    /// +1 for cyclic (even) axis sequences, -1 otherwise.
    fn parity(self) -> f64 {
        match self {
            RotationOrder::Xyz | RotationOrder::Yzx | RotationOrder::Zxy => 1.0,
            RotationOrder::Xzy | RotationOrder::Yxz | RotationOrder::Zyx => -1.0,
        }
    }
}

/// Translation, rotation and scale components of an affine transform.
///
/// `rotation` holds the angle about X, Y and Z respectively, in radians;
/// `order` says which of them is applied first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trs {
    /// Translation applied last.
    pub translation: Vec3,
    /// Rotation application order.
    pub order: RotationOrder,
    /// Rotation about each axis in radians.
    pub rotation: Vec3,
    /// Scale factor along each axis, applied first.
    pub scale: Vec3,
}

impl Default for Trs {
    fn default() -> Self {
        Self {
            translation: Vec3::zeros(),
            order: RotationOrder::default(),
            rotation: Vec3::zeros(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

/// Reasons an affine matrix has no translate/rotate/scale form.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecomposeError {
    /// The projective row is not `(0, 0, 0, 1)`.
    #[error("matrix is not affine")]
    NotAffine,

    /// An axis collapses to (near) zero length.
    #[error("degenerate scale along {0:?}")]
    Degenerate(Axis),

    /// The linear part mirrors space; scale factors must stay positive.
    #[error("matrix contains a reflection")]
    Reflection,

    /// The linear part is not a rotation times an axis scale.
    #[error("matrix contains shear")]
    Shear,
}

/// A 4x4 affine transformation matrix (column-vector convention).
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// The underlying 4x4 matrix.
    pub matrix: Matrix4<f64>,
}

impl Transform {
    /// Identity transform.
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    /// Translation by `(dx, dy, dz)`.
    pub fn translation(dx: f64, dy: f64, dz: f64) -> Self {
        let mut m = Matrix4::identity();
        m[(0, 3)] = dx;
        m[(1, 3)] = dy;
        m[(2, 3)] = dz;
        Self { matrix: m }
    }

    /// Non-uniform scale by `(sx, sy, sz)`.
    pub fn scale(sx: f64, sy: f64, sz: f64) -> Self {
        let mut m = Matrix4::identity();
        m[(0, 0)] = sx;
        m[(1, 1)] = sy;
        m[(2, 2)] = sz;
        Self { matrix: m }
    }

    /// Counter-clockwise rotation about `axis` by `angle` radians.
    pub fn rotation(axis: Axis, angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        let mut m = Matrix4::identity();
        let (a, b) = match axis {
            Axis::X => (1, 2),
            Axis::Y => (2, 0),
            Axis::Z => (0, 1),
        };
        m[(a, a)] = c;
        m[(a, b)] = -s;
        m[(b, a)] = s;
        m[(b, b)] = c;
        Self { matrix: m }
    }

    /// Build from a row-major matrix written for row vectors
    /// (`p' = p * M`, translation in the fourth row).
    pub fn from_row_vector_rows(values: [f64; 16]) -> Self {
        // Row-major data for row vectors is column-major data for column vectors.
        Self {
            matrix: Matrix4::from_column_slice(&values),
        }
    }

    /// Compose scale, then rotations in `trs.order`, then translation.
    pub fn from_trs(trs: &Trs) -> Self {
        let t = &trs.translation;
        let s = &trs.scale;
        let mut rotation = Self::identity();
        for axis in trs.order.axes() {
            rotation = Self::rotation(axis, trs.rotation[axis.index()]).then(&rotation);
        }
        Self::translation(t.x, t.y, t.z)
            .then(&rotation)
            .then(&Self::scale(s.x, s.y, s.z))
    }

    /// Compose: `self` then `other` (self * other).
    pub fn then(&self, other: &Transform) -> Self {
        Self {
            matrix: self.matrix * other.matrix,
        }
    }

    /// Transform a point.
    pub fn apply_point(&self, p: &Point3) -> Point3 {
        let v = self.matrix * Vector4::new(p.x, p.y, p.z, 1.0);
        Point3::new(v.x, v.y, v.z)
    }

    /// Split into translation, rotation (about fixed axes, applied in
    /// `order`) and strictly positive scale.
    pub fn decompose(&self, order: RotationOrder) -> Result<Trs, DecomposeError> {
        let m = &self.matrix;
        let tol = Tolerance::DEFAULT;
        if !(tol.is_zero(m[(3, 0)])
            && tol.is_zero(m[(3, 1)])
            && tol.is_zero(m[(3, 2)])
            && tol.is_zero(m[(3, 3)] - 1.0))
        {
            return Err(DecomposeError::NotAffine);
        }

        let translation = Vec3::new(m[(0, 3)], m[(1, 3)], m[(2, 3)]);
        let linear: Matrix3<f64> = m.fixed_view::<3, 3>(0, 0).into_owned();

        let mut scale = Vec3::zeros();
        let mut rotation = linear;
        for axis in [Axis::X, Axis::Y, Axis::Z] {
            let c = axis.index();
            let length = linear.column(c).norm();
            if length < MIN_SCALE {
                return Err(DecomposeError::Degenerate(axis));
            }
            scale[c] = length;
            rotation.set_column(c, &(linear.column(c) / length));
        }

        if rotation.determinant() < 0.0 {
            return Err(DecomposeError::Reflection);
        }
        if !tol.is_zero((rotation.transpose() * rotation - Matrix3::identity()).amax()) {
            return Err(DecomposeError::Shear);
        }

        Ok(Trs {
            translation,
            order,
            rotation: euler_angles(&rotation, order),
            scale,
        })
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Extract per-axis angles from a pure rotation `r = R_k * R_j * R_i`,
/// where `i, j, k` are the axes of `order` in application order.
fn euler_angles(r: &Matrix3<f64>, order: RotationOrder) -> Vec3 {
    let [i, j, k] = order.axes().map(Axis::index);
    let e = order.parity();

    let cos_middle = r[(i, i)].hypot(r[(j, i)]);
    let middle = (-e * r[(k, i)]).atan2(cos_middle);
    let (first, last) = if cos_middle > GIMBAL_EPSILON {
        (
            (e * r[(k, j)]).atan2(r[(k, k)]),
            (e * r[(j, i)]).atan2(r[(i, i)]),
        )
    } else {
        // Gimbal lock: only first +/- last is observable, fold it all into first.
        ((-e * r[(j, k)]).atan2(r[(j, j)]), 0.0)
    };

    let mut angles = Vec3::zeros();
    angles[i] = first;
    angles[j] = middle;
    angles[k] = last;
    angles
}

/// Tolerance constants for geometric comparisons.
#[derive(Debug, Clone, Copy)]
pub struct Tolerance {
    /// Linear tolerance.
    pub linear: f64,
}

impl Tolerance {
    /// Default tolerance (1e-6).
    pub const DEFAULT: Self = Self { linear: 1e-6 };

    /// Check if a scalar is effectively zero.
    pub fn is_zero(&self, d: f64) -> bool {
        d.abs() < self.linear
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}
