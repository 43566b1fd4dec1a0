use crate::math::Axis;

use super::assembly::{Face, LidConfig};
use super::panel::Edge;
use super::{AssemblyId, PanelId, VoidId};

/// The single mutation entrypoint's input.
///
/// Every structural change to the scene graph goes through
/// [`SceneGraph::dispatch`](super::SceneGraph::dispatch) with one of these;
/// readers only ever see the resulting snapshot.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Split a leaf void in two at one absolute position.
    AddSubdivision {
        void_id: VoidId,
        axis: Axis,
        position: f64,
    },
    /// Split a leaf void into N+1 children at N ascending positions.
    AddSubdivisions {
        void_id: VoidId,
        axis: Axis,
        positions: Vec<f64>,
    },
    /// Split a leaf void along two axes at once, with crossing dividers.
    AddGridSubdivision {
        void_id: VoidId,
        primary_axis: Axis,
        primary_positions: Vec<f64>,
        secondary_axis: Axis,
        secondary_positions: Vec<f64>,
    },
    /// Remove a void's subdivision, restoring it to a leaf.
    RemoveSubdivision { void_id: VoidId },
    /// Flip the solidity of one assembly face.
    ToggleFace { assembly: AssemblyId, face: Face },
    /// Configure one lid (a face normal to the assembly axis).
    SetLid {
        assembly: AssemblyId,
        /// `false` selects the minimum-bound lid, `true` the maximum-bound
        /// one.
        max_side: bool,
        config: LidConfig,
    },
    /// Nest a new assembly inside a leaf void, shrunk by `clearance` on
    /// all sides.
    CreateSubAssembly { void_id: VoidId, clearance: f64 },
    /// Set the signed extension of one panel edge.
    SetEdgeExtension {
        panel: PanelId,
        edge: Edge,
        value: f64,
    },
    /// Set several corner fillet radii on one panel atomically.
    SetCornerFilletsBatch {
        panel: PanelId,
        /// `(corner index, radius)` pairs; radius 0 clears the fillet.
        fillets: Vec<(usize, f64)>,
    },
}
