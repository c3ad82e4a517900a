//! Decoded scene tree.

use std::sync::Arc;

use serde::Serialize;

use crate::cells::header::NodeHeader;
use crate::definitions::DefinitionRegistry;
use crate::registry::{CellType, Resolution, TextMode};
use crate::tokenizer::Position;
use crate::warning::Warning;

/// One decoded record.
#[derive(Debug, Clone, Serialize)]
pub struct Node {
    /// Kind of record.
    pub cell_type: CellType,
    /// Position of the record's type code.
    pub position: Position,
    /// Attributes shared by every kind.
    pub header: NodeHeader,
    /// Kind-specific payload.
    pub shape: Shape,
}

impl Node {
    /// Explicit name, or `"none"`.
    pub fn name(&self) -> &str {
        self.header.display_name()
    }

    /// Child nodes; empty for anything but containers.
    pub fn children(&self) -> &[Arc<Node>] {
        match &self.shape {
            Shape::Container { children } => children,
            _ => &[],
        }
    }

    /// Number of nodes in this subtree, counting this one. Instances count
    /// as one node; the definitions they point to are not walked.
    pub fn node_count(&self) -> usize {
        1 + self
            .children()
            .iter()
            .map(|child| child.node_count())
            .sum::<usize>()
    }

    /// Visit this subtree depth-first with each node's depth.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Node, usize)) {
        self.walk_at(0, visit);
    }

    fn walk_at<'a>(&'a self, depth: usize, visit: &mut impl FnMut(&'a Node, usize)) {
        visit(self, depth);
        for child in self.children() {
            child.walk_at(depth + 1, visit);
        }
    }
}

/// Kind-specific payload of a node.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Shape {
    /// Coordinate axes marker.
    Triad,
    /// Connected line segments.
    VectorList {
        /// Vertices in drawing order.
        points: Vec<[f64; 3]>,
    },
    /// Arbitrary faceted solid.
    Polyhedron(Polyhedron),
    /// Circular arc in the xy plane.
    Arc {
        /// Tessellation hint.
        resolution: Resolution,
        /// Arc radius.
        radius: f64,
        /// Start angle in degrees.
        start_angle: f64,
        /// End angle in degrees.
        end_angle: f64,
    },
    /// Single line of text.
    Text {
        /// Orientation and font.
        mode: TextMode,
        /// Text content.
        text: String,
    },
    /// Several positioned lines of text.
    TextList {
        /// Orientation and font.
        mode: TextMode,
        /// Entries in stream order.
        items: Vec<TextItem>,
    },
    /// Box whose top face may be smaller and shifted along x.
    Trapezoid {
        /// Bottom face extent along x.
        x_bottom: f64,
        /// Top face extent along x.
        x_top: f64,
        /// Bottom face extent along y.
        y_bottom: f64,
        /// Top face extent along y.
        y_top: f64,
        /// Height along z.
        height: f64,
        /// Top face shift along x.
        x_offset: f64,
    },
    /// Rectangular base rising to a single apex.
    Tetrahedron {
        /// Base extent along x.
        x_base: f64,
        /// Base extent along y.
        y_base: f64,
        /// Height along z.
        height: f64,
        /// Apex shift along x.
        apex_x_offset: f64,
        /// Apex shift along y.
        apex_y_offset: f64,
    },
    /// Flat rectangle in the xy plane.
    Rectangle {
        /// Extent along x.
        width: f64,
        /// Extent along y.
        length: f64,
        /// Offset along x; expected to be zero.
        x_offset: f64,
        /// Offset along y; expected to be zero.
        y_offset: f64,
    },
    /// Half sphere above the xy plane.
    Hemisphere {
        /// Tessellation hint.
        resolution: Resolution,
        /// Sphere radius.
        radius: f64,
    },
    /// Cone standing on the xy plane.
    Cone {
        /// Tessellation hint.
        resolution: Resolution,
        /// Base radius.
        radius: f64,
        /// Height along z.
        height: f64,
        /// Apex shift along x.
        x_offset: f64,
        /// Apex shift along y.
        y_offset: f64,
    },
    /// Cylinder standing on the xy plane.
    Cylinder {
        /// Tessellation hint.
        resolution: Resolution,
        /// Radius.
        radius: f64,
        /// Height along z.
        height: f64,
        /// Top face shift along x.
        x_offset: f64,
        /// Top face shift along y.
        y_offset: f64,
    },
    /// Truncated cone standing on the xy plane.
    Frustum {
        /// Tessellation hint.
        resolution: Resolution,
        /// Bottom radius.
        base_radius: f64,
        /// Top radius.
        top_radius: f64,
        /// Height along z.
        height: f64,
        /// Top face shift along x.
        x_offset: f64,
        /// Top face shift along y.
        y_offset: f64,
    },
    /// External cell file, by path.
    FileReference {
        /// Path as written in the stream.
        path: String,
    },
    /// Precompiled picture file, by path.
    CompiledPicture {
        /// Path as written in the stream.
        path: String,
    },
    /// Inline Open Inventor scene.
    EmbeddedFile {
        /// Captured lines, without the terminator.
        lines: Vec<String>,
    },
    /// Use of a named definition.
    Instance(Instance),
    /// Set, block definition or root.
    Container {
        /// Children in stream order.
        children: Vec<Arc<Node>>,
    },
}

/// Vertices and faces of a polyhedron.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Polyhedron {
    /// Vertex coordinates.
    pub vertices: Vec<[f64; 3]>,
    /// Faces as zero-based vertex indices, at least three each.
    pub faces: Vec<Vec<usize>>,
}

/// One entry of a text list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextItem {
    /// Position of the text relative to the node.
    pub offset: [f64; 3],
    /// Text content.
    pub text: String,
}

/// A node standing for a named definition.
#[derive(Debug, Clone, Serialize)]
pub struct Instance {
    /// Name the instance refers to.
    pub reference: String,
    /// The definition bound to `reference`.
    #[serde(skip)]
    pub definition: Arc<Node>,
}

/// Result of decoding one cell stream.
#[derive(Debug, Clone, Serialize)]
pub struct Scene {
    /// Root node.
    pub root: Arc<Node>,
    /// Definitions registered during the decode.
    pub definitions: DefinitionRegistry,
    /// Warnings raised, in stream order.
    pub warnings: Vec<Warning>,
}

impl Scene {
    /// Number of nodes reachable from the root.
    pub fn node_count(&self) -> usize {
        self.root.node_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(cell_type: CellType, shape: Shape) -> Arc<Node> {
        Arc::new(Node {
            cell_type,
            position: Position::default(),
            header: NodeHeader::default(),
            shape,
        })
    }

    #[test]
    fn test_counts_and_walk() {
        let leaf = node(CellType::Triad, Shape::Triad);
        let set = node(
            CellType::Set,
            Shape::Container {
                children: vec![leaf.clone(), leaf.clone()],
            },
        );
        let root = node(
            CellType::RootSet,
            Shape::Container {
                children: vec![set, leaf],
            },
        );
        assert_eq!(root.node_count(), 5);
        assert_eq!(root.children().len(), 2);

        let mut depths = Vec::new();
        root.walk(&mut |node, depth| depths.push((node.cell_type, depth)));
        assert_eq!(
            depths,
            vec![
                (CellType::RootSet, 0),
                (CellType::Set, 1),
                (CellType::Triad, 2),
                (CellType::Triad, 2),
                (CellType::Triad, 1),
            ]
        );
    }

    #[test]
    fn test_instance_serializes_reference_only() {
        let definition = node(
            CellType::FileReference,
            Shape::FileReference {
                path: "partA.cell".to_string(),
            },
        );
        let instance = node(
            CellType::Instance,
            Shape::Instance(Instance {
                reference: "partA".to_string(),
                definition,
            }),
        );
        let json = serde_json::to_value(&instance.shape).unwrap();
        assert_eq!(json, serde_json::json!({ "kind": "instance", "reference": "partA" }));
    }
}
