use crate::joint::Gender;
use crate::math::{Axis, Point2, Point3, Vector3};

use super::{AssemblyId, PanelId, VoidId};

use super::assembly::Face;

/// The four edges of a panel's base rectangle, in the fixed CCW walk order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    Bottom,
    Right,
    Top,
    Left,
}

impl Edge {
    /// All edges in walk order.
    pub const ALL: [Edge; 4] = [Edge::Bottom, Edge::Right, Edge::Top, Edge::Left];

    /// Index into per-edge arrays, following the walk order.
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Edge::Bottom => 0,
            Edge::Right => 1,
            Edge::Top => 2,
            Edge::Left => 3,
        }
    }

    /// The edge sharing the walk-start corner of this edge.
    #[must_use]
    pub fn prev(self) -> Edge {
        Edge::ALL[(self.index() + 3) % 4]
    }

    /// The edge sharing the walk-end corner of this edge.
    #[must_use]
    pub fn next(self) -> Edge {
        Edge::ALL[(self.index() + 1) % 4]
    }

    /// Corner points of this edge for a `width × height` base rectangle,
    /// `(walk_start, walk_end)` in the CCW order.
    #[must_use]
    pub fn corners(self, width: f64, height: f64) -> (Point2, Point2) {
        let c = [
            Point2::new(0.0, 0.0),
            Point2::new(width, 0.0),
            Point2::new(width, height),
            Point2::new(0.0, height),
        ];
        let i = self.index();
        (c[i], c[(i + 1) % 4])
    }
}

/// What kind of panel a node is, with the kind-specific structure colocated.
///
/// Kind-specific geometry (dimensions, edge configs, transform, holes) is
/// dispatched over this variant with exhaustive matching.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelKind {
    /// One of the six faces of an assembly.
    Face { assembly: AssemblyId, face: Face },
    /// An internal divider created by subdividing a void.
    Divider {
        assembly: AssemblyId,
        void_id: VoidId,
        axis: Axis,
        /// Absolute split position along `axis`.
        position: f64,
    },
    /// A face of a nested sub-assembly.
    SubAssemblyFace { assembly: AssemblyId, face: Face },
}

impl PanelKind {
    /// The assembly that owns this panel.
    #[must_use]
    pub fn assembly(&self) -> AssemblyId {
        match *self {
            PanelKind::Face { assembly, .. }
            | PanelKind::Divider { assembly, .. }
            | PanelKind::SubAssemblyFace { assembly, .. } => assembly,
        }
    }
}

/// A user cutout or derived opening in a panel, in panel-local coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum Hole {
    Rect { x: f64, y: f64, w: f64, h: f64 },
    Circle { cx: f64, cy: f64, radius: f64 },
}

/// Placement of a panel in world space.
///
/// Orthonormal frame: `world = origin + u·x + v·y + normal·z`, with the
/// panel material occupying local `z ∈ [0, thickness]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelTransform {
    pub origin: Point3,
    pub u: Vector3,
    pub v: Vector3,
    pub normal: Vector3,
}

impl PanelTransform {
    /// Maps a panel-local point to world coordinates.
    #[must_use]
    pub fn to_world(&self, local: &Point3) -> Point3 {
        self.origin + self.u * local.x + self.v * local.y + self.normal * local.z
    }

    /// Maps a world point to panel-local coordinates.
    #[must_use]
    pub fn to_local(&self, world: &Point3) -> Point3 {
        let d = world - self.origin;
        Point3::new(d.dot(&self.u), d.dot(&self.v), d.dot(&self.normal))
    }
}

/// Joint configuration of one panel edge, resolved during derivation.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeConfig {
    pub joint: Gender,
    /// World axis the edge runs along.
    pub axis: Axis,
    /// Covered range on that axis, in walk order (reversed when the walk
    /// runs against the axis).
    pub range: (f64, f64),
    /// The panel this edge meets, when jointed.
    pub meets: Option<PanelId>,
}

/// A panel node: structural state only, derived geometry lives in the
/// snapshot cache.
#[derive(Debug, Clone)]
pub struct PanelData {
    pub kind: PanelKind,
    /// Signed edge extensions, indexed by [`Edge::index`]; zero by default.
    pub extensions: [f64; 4],
    /// Corner fillet radii, indexed by base corner (walk-start corner of
    /// each edge); zero means no fillet.
    pub fillets: [f64; 4],
    /// User cutouts.
    pub cutouts: Vec<Hole>,
    /// Custom edge path overrides, panel-local, replacing the generated
    /// edge geometry when set.
    pub custom_edges: [Option<Vec<Point2>>; 4],
    pub stamp: u64,
}

impl PanelData {
    #[must_use]
    pub fn new(kind: PanelKind) -> Self {
        Self {
            kind,
            extensions: [0.0; 4],
            fillets: [0.0; 4],
            cutouts: Vec::new(),
            custom_edges: [None, None, None, None],
            stamp: 0,
        }
    }
}
