//! Common node header: flag word and the optional sub-records it gates.

use std::ops::BitOr;

use serde::Serialize;

use crate::cells::geometry::Geometry;
use crate::cells::{read_code, read_non_negative};
use crate::decoder::Decoder;
use crate::error::{CellError, Result};
use crate::registry::CellType;
use crate::tokenizer::{Position, Tokenizer};
use crate::warning::Warning;

/// Longest name AutoMod officially supports.
pub const MAX_NAME_LENGTH: usize = 22;

/// Name shown for nodes without an explicit name.
pub const DEFAULT_NAME: &str = "none";

/// Bits of the per-node flag word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CellFlags(u16);

impl CellFlags {
    /// Attribute record present.
    pub const ATTRIBUTES: Self = Self(1 << 0);
    /// Joint record present.
    pub const JOINT: Self = Self(1 << 1);
    /// Geometry record present.
    pub const GEOMETRY: Self = Self(1 << 2);
    /// Geometry record is a 4x4 matrix.
    pub const MATRIX_FORM: Self = Self(1 << 3);
    /// Colours are inherited from the parent.
    pub const INHERIT_COLOR: Self = Self(1 << 4);
    /// Bounding box record present.
    pub const BOUNDING_BOX: Self = Self(1 << 6);

    /// Flags from a raw word. Unknown bits are kept but never consulted.
    pub fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    /// Raw word.
    pub fn bits(self) -> u16 {
        self.0
    }

    /// Whether every bit of `other` is set.
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for CellFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// AutoMod palette colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum CellColor {
    Black,
    #[default]
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    LightGray,
    DarkGray,
    Brown,
    LightBlue,
    Purple,
    Orange,
    LightGreen,
    LightYellow,
}

impl CellColor {
    const ALL: [CellColor; 16] = [
        CellColor::Black,
        CellColor::Red,
        CellColor::Green,
        CellColor::Yellow,
        CellColor::Blue,
        CellColor::Magenta,
        CellColor::Cyan,
        CellColor::White,
        CellColor::LightGray,
        CellColor::DarkGray,
        CellColor::Brown,
        CellColor::LightBlue,
        CellColor::Purple,
        CellColor::Orange,
        CellColor::LightGreen,
        CellColor::LightYellow,
    ];

    /// Look up a colour by wire code (0..=15).
    pub fn from_code(code: i8) -> Option<Self> {
        usize::try_from(code)
            .ok()
            .and_then(|idx| Self::ALL.get(idx).copied())
    }
}

/// Edge line pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
    Halftone,
}

impl LineStyle {
    /// Look up a line style by wire code (0..=3).
    pub fn from_code(code: i8) -> Option<Self> {
        match code {
            0 => Some(LineStyle::Solid),
            1 => Some(LineStyle::Dashed),
            2 => Some(LineStyle::Dotted),
            3 => Some(LineStyle::Halftone),
            _ => None,
        }
    }
}

/// How faces are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayStyle {
    /// Edges only.
    Wireframe,
    /// Opaque faces.
    #[default]
    Solid,
    /// Translucent faces, level 1 (least) to 15 (most).
    Transparent(u8),
}

impl DisplayStyle {
    /// Look up a display style by wire code (0..=16).
    pub fn from_code(code: i8) -> Option<Self> {
        match code {
            0 => Some(DisplayStyle::Wireframe),
            1 => Some(DisplayStyle::Solid),
            2..=16 => u8::try_from(code - 1).ok().map(DisplayStyle::Transparent),
            _ => None,
        }
    }
}

/// Kind of motion a joint permits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JointType {
    /// Only a terminal control frame, no motion.
    TcfOnly,
    /// Rotation about the joint axis.
    #[default]
    Rotational,
    /// Translation along the joint axis.
    Translational,
}

impl JointType {
    /// Look up a joint type by wire code (0..=2).
    pub fn from_code(code: i8) -> Option<Self> {
        match code {
            0 => Some(JointType::TcfOnly),
            1 => Some(JointType::Rotational),
            2 => Some(JointType::Translational),
            _ => None,
        }
    }
}

/// Axis-aligned box enclosing a node and its children, in local coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    min: [f64; 3],
    max: [f64; 3],
}

impl BoundingBox {
    /// Create a box; `None` unless `min <= max` on every axis.
    pub fn new(min: [f64; 3], max: [f64; 3]) -> Option<Self> {
        min.iter()
            .zip(&max)
            .all(|(lo, hi)| lo <= hi)
            .then_some(Self { min, max })
    }

    /// Minimum corner.
    pub fn min(&self) -> [f64; 3] {
        self.min
    }

    /// Maximum corner.
    pub fn max(&self) -> [f64; 3] {
        self.max
    }

    /// Extent along each axis.
    pub fn size(&self) -> [f64; 3] {
        [0, 1, 2].map(|i| self.max[i] - self.min[i])
    }

    /// Minimum then maximum for x, then y, then z.
    fn decode(tokens: &mut Tokenizer<'_>) -> Result<Self> {
        const FIELDS: [&str; 3] = ["bounding box x", "bounding box y", "bounding box z"];
        let mut min = [0.0; 3];
        let mut max = [0.0; 3];
        for (axis, field) in FIELDS.into_iter().enumerate() {
            min[axis] = tokens.read_double(field)?;
            max[axis] = tokens.read_double(field)?;
            if min[axis] > max[axis] {
                return Err(CellError::InvertedRange {
                    position: tokens.last_position(),
                    field,
                    min: min[axis],
                    max: max[axis],
                });
            }
        }
        Ok(Self { min, max })
    }
}

/// Articulation data carried by sets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Joint {
    /// Kind of motion.
    pub joint_type: JointType,
    /// Speed; never negative.
    pub velocity: f64,
    /// Lower limit of travel.
    pub minimum: f64,
    /// Upper limit of travel.
    pub maximum: f64,
    /// Current value, within `[minimum, maximum]`.
    pub current: f64,
    /// Whether a terminal control frame follows.
    pub tcf_data_present: bool,
    /// Transformation driven by the joint value.
    pub dynamic_geometry: Geometry,
    /// Terminal control frame, when present.
    pub tcf_geometry: Option<Geometry>,
}

impl Joint {
    fn decode(tokens: &mut Tokenizer<'_>) -> Result<Self> {
        let joint_type = read_code(tokens, "joint type", JointType::from_code)?;
        let velocity = read_non_negative(tokens, "joint velocity")?;
        let minimum = tokens.read_double("joint minimum")?;
        let maximum = tokens.read_double("joint maximum")?;
        if minimum > maximum {
            return Err(CellError::InvertedRange {
                position: tokens.last_position(),
                field: "joint range",
                min: minimum,
                max: maximum,
            });
        }
        let current = tokens.read_double("joint current value")?;
        if current < minimum || current > maximum {
            return Err(CellError::out_of_range(
                tokens.last_position(),
                "joint current value",
                current,
                Some(minimum),
                Some(maximum),
            ));
        }

        let tcf_data_present = tokens.read_bool("TCF flag")?;
        if !tcf_data_present && joint_type == JointType::TcfOnly {
            return Err(CellError::TcfDataMissing {
                position: tokens.last_position(),
            });
        }

        let dynamic_geometry = Geometry::decode(tokens, false)?;
        let marker = tokens.read_field("joint terminator")?;
        if marker.text != "0" {
            return Err(CellError::UnexpectedFieldValue {
                position: marker.position,
                field: "joint terminator",
                expected: "0",
                found: marker.text.into_owned(),
            });
        }

        let tcf_geometry = if tcf_data_present {
            Some(Geometry::decode(tokens, false)?)
        } else {
            None
        };

        Ok(Self {
            joint_type,
            velocity,
            minimum,
            maximum,
            current,
            tcf_data_present,
            dynamic_geometry,
            tcf_geometry,
        })
    }
}

/// Attributes shared by every node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeHeader {
    /// Explicit name, if any.
    pub name: Option<String>,
    /// Face colour.
    pub face_color: CellColor,
    /// Edge colour.
    pub edge_color: CellColor,
    /// Edge line pattern.
    pub line_style: LineStyle,
    /// Edge line width in pixels, 1 to 8.
    pub line_width: u8,
    /// Face rendering.
    pub display_style: DisplayStyle,
    /// Whether colours come from the parent.
    pub color_inherited: bool,
    /// Enclosing box, if recorded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBox>,
    /// Articulation, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub joint: Option<Joint>,
    /// Local transformation; identity when absent.
    pub geometry: Geometry,
}

impl Default for NodeHeader {
    fn default() -> Self {
        Self {
            name: None,
            face_color: CellColor::default(),
            edge_color: CellColor::default(),
            line_style: LineStyle::default(),
            line_width: 1,
            display_style: DisplayStyle::default(),
            color_inherited: false,
            bounding_box: None,
            joint: None,
            geometry: Geometry::default(),
        }
    }
}

impl NodeHeader {
    /// Explicit name, or `"none"`.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(DEFAULT_NAME)
    }
}

/// Decode the flag word and the sub-records it announces.
pub(crate) fn decode_header(decoder: &mut Decoder<'_>, cell_type: CellType) -> Result<NodeHeader> {
    let tokens = decoder.tokens();
    let flags = CellFlags::from_bits(tokens.read_short("flags")? as u16);
    let mut header = NodeHeader {
        color_inherited: flags.contains(CellFlags::INHERIT_COLOR),
        ..NodeHeader::default()
    };

    if flags.contains(CellFlags::BOUNDING_BOX) {
        header.bounding_box = Some(BoundingBox::decode(tokens)?);
    }

    if flags.contains(CellFlags::ATTRIBUTES) {
        header.face_color = read_code(tokens, "face colour", CellColor::from_code)?;
        header.edge_color = read_code(tokens, "edge colour", CellColor::from_code)?;
        header.line_style = read_code(tokens, "line style", LineStyle::from_code)?;
        let width = tokens.read_byte("line width")?;
        header.line_width = match u8::try_from(width) {
            Ok(width @ 1..=8) => width,
            _ => {
                return Err(CellError::out_of_range(
                    tokens.last_position(),
                    "line width",
                    f64::from(width),
                    Some(1.0),
                    Some(8.0),
                ))
            }
        };
        header.display_style = read_code(tokens, "display style", DisplayStyle::from_code)?;
        let name = tokens.read_field("name")?;
        for warning in validate_name(&name.text, name.position)? {
            decoder.warn(warning)?;
        }
        header.name = Some(name.text.into_owned());
    }

    let tokens = decoder.tokens();
    if flags.contains(CellFlags::JOINT) {
        if !cell_type.accepts_joint_data() {
            return Err(CellError::JointNotAccepted {
                position: tokens.next_position(),
                cell_type,
            });
        }
        header.joint = Some(Joint::decode(tokens)?);
    }

    if flags.contains(CellFlags::GEOMETRY) {
        header.geometry = Geometry::decode(tokens, flags.contains(CellFlags::MATRIX_FORM))?;
    }

    Ok(header)
}

/// Check a cell name.
///
/// Names must be non-empty and use only ASCII letters, digits and
/// underscores. A name that does not start with a letter, or that is longer
/// than [`MAX_NAME_LENGTH`], is accepted with a warning.
pub fn validate_name(name: &str, position: Position) -> Result<Vec<Warning>> {
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(CellError::InvalidName {
            position,
            name: name.to_string(),
        });
    }

    let mut warnings = Vec::new();
    if !name.starts_with(|c: char| c.is_ascii_alphabetic()) {
        warnings.push(Warning::InvalidNameStart {
            position,
            name: name.to_string(),
        });
    }
    if name.len() > MAX_NAME_LENGTH {
        warnings.push(Warning::NameTooLong {
            position,
            name: name.to_string(),
            length: name.len(),
            limit: MAX_NAME_LENGTH,
        });
    }
    Ok(warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::options::DecodeOptions;

    fn header(input: &str, cell_type: CellType) -> (Result<NodeHeader>, Vec<Warning>) {
        let mut decoder = Decoder::new(input.as_bytes(), DecodeOptions::default());
        let result = decode_header(&mut decoder, cell_type);
        (result, decoder.into_warnings())
    }

    const AT: Position = Position { line: 1, col: 1 };

    #[test]
    fn test_flags() {
        let flags = CellFlags::from_bits(0b100_0101);
        assert!(flags.contains(CellFlags::ATTRIBUTES));
        assert!(flags.contains(CellFlags::GEOMETRY));
        assert!(flags.contains(CellFlags::BOUNDING_BOX));
        assert!(!flags.contains(CellFlags::JOINT));
        assert!(flags.contains(CellFlags::ATTRIBUTES | CellFlags::GEOMETRY));
        assert_eq!((CellFlags::JOINT | CellFlags::MATRIX_FORM).bits(), 0b1010);
    }

    #[test]
    fn test_defaults_without_attributes() {
        let (result, warnings) = header("0", CellType::Triad);
        let header = result.unwrap();
        assert_eq!(header, NodeHeader::default());
        assert_eq!(header.display_name(), "none");
        assert_eq!(header.face_color, CellColor::Red);
        assert_eq!(header.display_style, DisplayStyle::Solid);
        assert!(header.geometry.is_identity());
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_attributes() {
        let (result, warnings) = header("17 4 7 1 3 5 Conveyor_1", CellType::Triad);
        let header = result.unwrap();
        assert_eq!(header.face_color, CellColor::Blue);
        assert_eq!(header.edge_color, CellColor::White);
        assert_eq!(header.line_style, LineStyle::Dashed);
        assert_eq!(header.line_width, 3);
        assert_eq!(header.display_style, DisplayStyle::Transparent(4));
        assert_eq!(header.display_name(), "Conveyor_1");
        assert!(header.color_inherited);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_line_width_bounds() {
        for width in [1, 8] {
            let input = format!("1 0 0 0 {width} 1 part");
            let (result, _) = header(&input, CellType::Triad);
            assert_eq!(result.unwrap().line_width, width);
        }
        for width in [0, 9, -1] {
            let input = format!("1 0 0 0 {width} 1 part");
            let (result, _) = header(&input, CellType::Triad);
            let err = result.unwrap_err();
            assert!(matches!(err, CellError::OutOfRange { field: "line width", .. }));
            assert_eq!(err.kind(), ErrorKind::Semantic);
        }
    }

    #[test]
    fn test_unknown_attribute_codes() {
        let (result, _) = header("1 16 0 0 1 1 part", CellType::Triad);
        assert!(matches!(
            result.unwrap_err(),
            CellError::UnknownEnumCode { field: "face colour", code: 16, .. }
        ));
        let (result, _) = header("1 0 0 4 1 1 part", CellType::Triad);
        assert!(matches!(
            result.unwrap_err(),
            CellError::UnknownEnumCode { field: "line style", .. }
        ));
        let (result, _) = header("1 0 0 0 1 17 part", CellType::Triad);
        assert!(matches!(
            result.unwrap_err(),
            CellError::UnknownEnumCode { field: "display style", .. }
        ));
    }

    #[test]
    fn test_bounding_box() {
        let (result, _) = header("64 -1 1 -2 2 0 3", CellType::Triad);
        let bbox = result.unwrap().bounding_box.unwrap();
        assert_eq!(bbox.min(), [-1.0, -2.0, 0.0]);
        assert_eq!(bbox.max(), [1.0, 2.0, 3.0]);
        assert_eq!(bbox.size(), [2.0, 4.0, 3.0]);

        let (result, _) = header("64 0 1 5 4 0 1", CellType::Triad);
        let err = result.unwrap_err();
        assert!(matches!(err, CellError::InvertedRange { field: "bounding box y", .. }));
        assert_eq!(err.kind(), ErrorKind::Semantic);

        assert!(BoundingBox::new([0.0; 3], [0.0; 3]).is_some());
        assert!(BoundingBox::new([0.0, 0.0, 1.0], [1.0, 1.0, 0.0]).is_none());
    }

    #[test]
    fn test_names() {
        assert!(validate_name("Conveyor_1", AT).unwrap().is_empty());
        assert!(matches!(validate_name("", AT), Err(CellError::InvalidName { .. })));
        assert!(matches!(validate_name("bad-name", AT), Err(CellError::InvalidName { .. })));

        let warnings = validate_name("_private", AT).unwrap();
        assert!(matches!(warnings.as_slice(), [Warning::InvalidNameStart { .. }]));

        let long = "a".repeat(MAX_NAME_LENGTH + 1);
        let warnings = validate_name(&long, AT).unwrap();
        assert!(matches!(
            warnings.as_slice(),
            [Warning::NameTooLong { length: 23, limit: 22, .. }]
        ));
        assert!(validate_name(&"a".repeat(MAX_NAME_LENGTH), AT).unwrap().is_empty());
    }

    #[test]
    fn test_name_warnings_are_collected() {
        let (result, warnings) = header("1 0 0 0 1 1 9lives", CellType::Triad);
        assert_eq!(result.unwrap().display_name(), "9lives");
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].position(), Position { line: 1, col: 13 });
    }

    #[test]
    fn test_joint() {
        // type, velocity, min, max, current, tcf, dynamic geometry, 0, tcf geometry
        let input = "2 1 10 -90 90 45 1  0 0 0 0 0 0 0 1 1 1  0  0 0 1 0 0 0 0 1 1 1";
        let (result, _) = header(input, CellType::Set);
        let joint = result.unwrap().joint.unwrap();
        assert_eq!(joint.joint_type, JointType::Rotational);
        assert_eq!(joint.velocity, 10.0);
        assert_eq!((joint.minimum, joint.maximum, joint.current), (-90.0, 90.0, 45.0));
        assert!(joint.dynamic_geometry.is_identity());
        assert_eq!(joint.tcf_geometry.unwrap().translation, [0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_joint_without_tcf() {
        let input = "2 2 1 0 5 5 0  0 0 0 0 0 0 0 1 1 1  0";
        let (result, _) = header(input, CellType::MainSet);
        let joint = result.unwrap().joint.unwrap();
        assert_eq!(joint.joint_type, JointType::Translational);
        assert!(joint.tcf_geometry.is_none());
    }

    #[test]
    fn test_joint_invariants() {
        let geometry = "0 0 0 0 0 0 0 1 1 1";
        let cases: [(&str, fn(&CellError) -> bool); 5] = [
            ("1 -1 0 1 0 0", |e| {
                matches!(e, CellError::OutOfRange { field: "joint velocity", .. })
            }),
            ("1 1 5 1 3 0", |e| matches!(e, CellError::InvertedRange { .. })),
            ("1 1 0 1 2 0", |e| {
                matches!(e, CellError::OutOfRange { field: "joint current value", .. })
            }),
            ("0 1 0 1 0 0", |e| matches!(e, CellError::TcfDataMissing { .. })),
            ("1 1 0 1 0 0 GEOMETRY 1", |e| {
                matches!(e, CellError::UnexpectedFieldValue { expected: "0", .. })
            }),
        ];
        for (joint, check) in cases {
            let input = format!("2 {}", joint.replace("GEOMETRY", geometry));
            let (result, _) = header(&input, CellType::Set);
            let err = result.unwrap_err();
            assert!(check(&err), "{input}: {err:?}");
            assert_eq!(err.kind(), ErrorKind::Semantic);
        }
    }

    #[test]
    fn test_joint_not_accepted() {
        let (result, _) = header("2 1 1 0 1 0 0", CellType::RootSet);
        assert!(matches!(
            result.unwrap_err(),
            CellError::JointNotAccepted { cell_type: CellType::RootSet, .. }
        ));
    }

    #[test]
    fn test_geometry_flag() {
        let (result, _) = header("4 1 2 3 0 0 0 0 1 1 1", CellType::Triad);
        assert_eq!(result.unwrap().geometry.translation, [1.0, 2.0, 3.0]);
        let (result, _) = header("12 1 0 0 0 0 1 0 0 0 0 1 0 7 8 9 1", CellType::Triad);
        assert_eq!(result.unwrap().geometry.translation, [7.0, 8.0, 9.0]);
    }
}
