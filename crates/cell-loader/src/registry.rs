//! Cell type codes and the static decoder table.
//!
//! Every record in a cell stream starts with a 16-bit type code. The table
//! below maps each known code to its [`CellType`] and the function that
//! decodes the record body once the common header has been read.

use std::collections::HashMap;
use std::sync::LazyLock;

use serde::Serialize;

use crate::cells::{primitives, sets};
use crate::decoder::Decoder;
use crate::error::Result;
use crate::scene::Shape;

/// Kind of a cell record, keyed by its wire type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
#[repr(i16)]
#[allow(missing_docs)]
pub enum CellType {
    Triad = 100,
    VectorList = 115,
    Polyhedron = 125,
    ArcCoarse = 130,
    ArcFine = 131,
    TextWorld = 140,
    TextScreenFast = 141,
    TextScreenNormal = 142,
    TextUnrotatedFast = 143,
    TextUnrotatedNormal = 144,
    TextListWorld = 150,
    TextListScreenFast = 151,
    TextListScreenNormal = 152,
    TextListUnrotatedFast = 153,
    TextListUnrotatedNormal = 154,
    BlockDefinition = 308,
    Trapezoid = 310,
    Tetrahedron = 311,
    Rectangle = 315,
    HemisphereCoarse = 330,
    HemisphereFine = 331,
    ConeCoarse = 340,
    ConeFine = 341,
    CylinderCoarse = 350,
    CylinderFine = 351,
    FrustumCoarse = 360,
    FrustumFine = 361,
    FileReference = 388,
    Instance = 408,
    CompiledPicture = 555,
    EmbeddedFile = 599,
    Set = 700,
    MainSet = 7000,
    RootSet = 10000,
}

/// Tessellation hint carried by curved primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    /// Few facets.
    Coarse,
    /// Many facets.
    Fine,
}

/// How text is oriented and rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextMode {
    /// Text lies in world space and rotates with the model.
    World,
    /// Screen-aligned, fast font.
    ScreenFast,
    /// Screen-aligned, normal font.
    ScreenNormal,
    /// Unrotated, fast font.
    UnrotatedFast,
    /// Unrotated, normal font.
    UnrotatedNormal,
}

impl CellType {
    /// Wire type code.
    pub fn code(self) -> i16 {
        self as i16
    }

    /// Look up a cell type by code.
    pub fn from_code(code: i16) -> Option<Self> {
        lookup(code).map(|entry| entry.cell_type)
    }

    /// Whether joint data may follow this kind's header.
    pub fn accepts_joint_data(self) -> bool {
        matches!(self, CellType::Set | CellType::MainSet)
    }

    /// Whether nodes of this kind may be bound by name to instances.
    pub fn is_definition(self) -> bool {
        matches!(
            self,
            CellType::BlockDefinition
                | CellType::FileReference
                | CellType::CompiledPicture
                | CellType::EmbeddedFile
        )
    }

    /// Whether nodes of this kind hold child nodes.
    pub fn is_container(self) -> bool {
        matches!(
            self,
            CellType::BlockDefinition | CellType::Set | CellType::MainSet | CellType::RootSet
        )
    }

    /// Tessellation hint, for kinds that come in coarse and fine variants.
    pub fn resolution(self) -> Option<Resolution> {
        match self {
            CellType::ArcCoarse
            | CellType::HemisphereCoarse
            | CellType::ConeCoarse
            | CellType::CylinderCoarse
            | CellType::FrustumCoarse => Some(Resolution::Coarse),
            CellType::ArcFine
            | CellType::HemisphereFine
            | CellType::ConeFine
            | CellType::CylinderFine
            | CellType::FrustumFine => Some(Resolution::Fine),
            _ => None,
        }
    }

    /// Text mode, for text and text list kinds.
    pub fn text_mode(self) -> Option<TextMode> {
        match self {
            CellType::TextWorld | CellType::TextListWorld => Some(TextMode::World),
            CellType::TextScreenFast | CellType::TextListScreenFast => Some(TextMode::ScreenFast),
            CellType::TextScreenNormal | CellType::TextListScreenNormal => {
                Some(TextMode::ScreenNormal)
            }
            CellType::TextUnrotatedFast | CellType::TextListUnrotatedFast => {
                Some(TextMode::UnrotatedFast)
            }
            CellType::TextUnrotatedNormal | CellType::TextListUnrotatedNormal => {
                Some(TextMode::UnrotatedNormal)
            }
            _ => None,
        }
    }
}

/// Decodes the body of a record, after its header.
pub type DecodeFn = fn(&mut Decoder<'_>, CellType) -> Result<Shape>;

/// One row of the type table.
pub struct CellTypeEntry {
    /// Wire type code.
    pub code: i16,
    /// Kind the code selects.
    pub cell_type: CellType,
    /// Body decoder.
    pub decode: DecodeFn,
}

macro_rules! entry {
    ($cell_type:ident, $decode:path) => {
        CellTypeEntry {
            code: CellType::$cell_type as i16,
            cell_type: CellType::$cell_type,
            decode: $decode,
        }
    };
}

static ENTRIES: [CellTypeEntry; 34] = [
    entry!(Triad, primitives::decode_triad),
    entry!(VectorList, primitives::decode_vector_list),
    entry!(Polyhedron, primitives::decode_polyhedron),
    entry!(ArcCoarse, primitives::decode_arc),
    entry!(ArcFine, primitives::decode_arc),
    entry!(TextWorld, primitives::decode_text),
    entry!(TextScreenFast, primitives::decode_text),
    entry!(TextScreenNormal, primitives::decode_text),
    entry!(TextUnrotatedFast, primitives::decode_text),
    entry!(TextUnrotatedNormal, primitives::decode_text),
    entry!(TextListWorld, primitives::decode_text_list),
    entry!(TextListScreenFast, primitives::decode_text_list),
    entry!(TextListScreenNormal, primitives::decode_text_list),
    entry!(TextListUnrotatedFast, primitives::decode_text_list),
    entry!(TextListUnrotatedNormal, primitives::decode_text_list),
    entry!(BlockDefinition, sets::decode_set),
    entry!(Trapezoid, primitives::decode_trapezoid),
    entry!(Tetrahedron, primitives::decode_tetrahedron),
    entry!(Rectangle, primitives::decode_rectangle),
    entry!(HemisphereCoarse, primitives::decode_hemisphere),
    entry!(HemisphereFine, primitives::decode_hemisphere),
    entry!(ConeCoarse, primitives::decode_cone),
    entry!(ConeFine, primitives::decode_cone),
    entry!(CylinderCoarse, primitives::decode_cylinder),
    entry!(CylinderFine, primitives::decode_cylinder),
    entry!(FrustumCoarse, primitives::decode_frustum),
    entry!(FrustumFine, primitives::decode_frustum),
    entry!(FileReference, primitives::decode_file_reference),
    entry!(Instance, sets::decode_instance),
    entry!(CompiledPicture, primitives::decode_compiled_picture),
    entry!(EmbeddedFile, primitives::decode_embedded_file),
    entry!(Set, sets::decode_set),
    entry!(MainSet, sets::decode_set),
    entry!(RootSet, sets::decode_set),
];

static BY_CODE: LazyLock<HashMap<i16, &'static CellTypeEntry>> =
    LazyLock::new(|| ENTRIES.iter().map(|entry| (entry.code, entry)).collect());

/// Look up the table entry for a type code.
pub fn lookup(code: i16) -> Option<&'static CellTypeEntry> {
    BY_CODE.get(&code).copied()
}

/// All known cell types, in code order.
pub fn entries() -> &'static [CellTypeEntry] {
    &ENTRIES
}
