use crate::math::Axis;

use super::void_node::Bounds3;
use super::{PanelId, VoidId};

/// Material parameters shared by every panel of an assembly (millimetres).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialConfig {
    pub thickness: f64,
    pub finger_width: f64,
    pub finger_gap: f64,
}

impl Default for MaterialConfig {
    fn default() -> Self {
        Self {
            thickness: 3.0,
            finger_width: 10.0,
            finger_gap: 10.0,
        }
    }
}

/// The six faces of a box assembly.
///
/// The declaration order doubles as the joint-gender precedence: where two
/// solid faces meet, the one declared earlier takes the male (tabbed) edge.
/// Any deterministic total order satisfies the mating invariant; this one
/// gives lids tabs into walls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Face {
    Bottom,
    Top,
    Left,
    Right,
    Front,
    Back,
}

impl Face {
    /// All faces in precedence order.
    pub const ALL: [Face; 6] = [
        Face::Bottom,
        Face::Top,
        Face::Left,
        Face::Right,
        Face::Front,
        Face::Back,
    ];

    /// The world axis this face is normal to.
    #[must_use]
    pub fn axis(self) -> Axis {
        match self {
            Face::Left | Face::Right => Axis::X,
            Face::Bottom | Face::Top => Axis::Y,
            Face::Front | Face::Back => Axis::Z,
        }
    }

    /// Whether the face sits at the maximum bound of its axis.
    #[must_use]
    pub fn is_max(self) -> bool {
        matches!(self, Face::Right | Face::Top | Face::Back)
    }

    /// The face at the given axis bound.
    #[must_use]
    pub fn at(axis: Axis, max: bool) -> Face {
        match (axis, max) {
            (Axis::X, false) => Face::Left,
            (Axis::X, true) => Face::Right,
            (Axis::Y, false) => Face::Bottom,
            (Axis::Y, true) => Face::Top,
            (Axis::Z, false) => Face::Front,
            (Axis::Z, true) => Face::Back,
        }
    }

    /// Index into per-face arrays, following [`Face::ALL`].
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Face::Bottom => 0,
            Face::Top => 1,
            Face::Left => 2,
            Face::Right => 3,
            Face::Front => 4,
            Face::Back => 5,
        }
    }
}

/// Tab treatment for a lid (a face normal to the assembly axis).
///
/// `Tabs` joints the lid into the walls like any other face; `Open` leaves
/// the lid rim and the wall rims plain, for a lift-off lid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LidTabs {
    #[default]
    Tabs,
    Open,
}

/// Per-lid configuration.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LidConfig {
    pub tabs: LidTabs,
    /// Shifts the lid plane inward from the outer bound.
    pub inset: f64,
}

/// A box assembly: material, lid setup, face solidity, and a root void.
///
/// The two lids are the faces normal to `axis`; `lids[0]` configures the
/// minimum-bound lid, `lids[1]` the maximum-bound one.
#[derive(Debug, Clone)]
pub struct AssemblyData {
    /// Outer bounds of the assembly in world coordinates.
    pub bounds: Bounds3,
    pub material: MaterialConfig,
    pub axis: Axis,
    pub lids: [LidConfig; 2],
    pub solid: [bool; 6],
    pub root_void: VoidId,
    /// Face panel nodes, indexed by [`Face::index`]; `None` when not solid.
    pub face_panels: [Option<PanelId>; 6],
    /// Parent void when this assembly is nested, `None` for the root.
    pub parent_void: Option<VoidId>,
    /// Bumped (along with all ancestors) on every structural mutation.
    pub stamp: u64,
}

impl AssemblyData {
    /// The lid config slot for a face, or `None` if the face is a wall.
    #[must_use]
    pub fn lid_of(&self, face: Face) -> Option<LidConfig> {
        if face.axis() == self.axis {
            Some(self.lids[usize::from(face.is_max())])
        } else {
            None
        }
    }

    /// Whether the face is present and solid.
    #[must_use]
    pub fn is_solid(&self, face: Face) -> bool {
        self.solid[face.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn face_axis_and_bound() {
        assert_eq!(Face::Left.axis(), Axis::X);
        assert!(!Face::Left.is_max());
        assert!(Face::Back.is_max());
        for face in Face::ALL {
            assert_eq!(Face::at(face.axis(), face.is_max()), face);
        }
    }

    #[test]
    fn precedence_gives_lids_tabs() {
        // Bottom and Top precede every wall, so lids are male into walls.
        assert!(Face::Bottom < Face::Left);
        assert!(Face::Top < Face::Back);
        assert!(Face::Left < Face::Front);
    }
}
