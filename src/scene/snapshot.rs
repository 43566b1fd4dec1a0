//! Read-only derived view of the scene graph.
//!
//! Derived geometry is never persisted on the nodes: the graph recomputes
//! stale entries when a snapshot is taken, keyed by the owning assembly's
//! version stamp, and the snapshot hands out shared references after that.

use crate::corner::CornerReport;
use crate::error::{Result, SceneError};
use crate::joint::{EdgeStatus, FingerPoints};
use crate::outline::{EdgeNotch, Outline};

use super::assembly::{AssemblyData, MaterialConfig};
use super::panel::{EdgeConfig, Hole, PanelData, PanelTransform};
use super::void_node::VoidData;
use super::{AssemblyId, PanelId, SceneGraph, VoidId};
use crate::math::Axis;

/// Everything recomputed for a panel on snapshot read.
#[derive(Debug, Clone)]
pub struct DerivedPanel {
    pub width: f64,
    pub height: f64,
    pub edges: [EdgeConfig; 4],
    pub statuses: [EdgeStatus; 4],
    /// Whether each edge carries no joint at all.
    pub fully_open: [bool; 4],
    pub transform: PanelTransform,
    /// Resolved holes: user cutouts plus derived sub-assembly openings.
    pub holes: Vec<Hole>,
    /// Cross-lap notches cut into this panel.
    pub notches: Vec<EdgeNotch>,
    pub outline: Outline,
    pub corners: CornerReport,
}

/// A panel together with its derived geometry.
#[derive(Debug, Clone, Copy)]
pub struct PanelView<'a> {
    pub id: PanelId,
    pub data: &'a PanelData,
    pub derived: &'a DerivedPanel,
}

/// A read-only view over the whole scene.
///
/// Safe to hand to any number of readers; nothing here mutates.
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    pub(super) graph: &'a SceneGraph,
}

impl<'a> Snapshot<'a> {
    /// The root assembly id.
    #[must_use]
    pub fn root(&self) -> AssemblyId {
        self.graph.root
    }

    /// Iterates every panel with its derived geometry.
    ///
    /// Order follows the arena; it is stable between reads that do not
    /// mutate the graph.
    pub fn panels(&self) -> impl Iterator<Item = PanelView<'a>> + '_ {
        self.graph.panels.iter().filter_map(|(id, data)| {
            self.graph
                .derived
                .get(&id)
                .map(|cached| PanelView {
                    id,
                    data,
                    derived: &cached.value,
                })
        })
    }

    /// Number of panels in the scene.
    #[must_use]
    pub fn panel_count(&self) -> usize {
        self.graph.panels.len()
    }

    /// One panel with its derived geometry.
    ///
    /// # Errors
    ///
    /// Returns an error if the panel does not exist or its derived entry is
    /// missing (which would be a kernel bug).
    pub fn panel(&self, id: PanelId) -> Result<PanelView<'a>> {
        let data = self.graph.panel(id)?;
        let cached = self
            .graph
            .derived
            .get(&id)
            .ok_or_else(|| SceneError::Corrupt("panel missing derived entry".to_owned()))?;
        Ok(PanelView {
            id,
            data,
            derived: &cached.value,
        })
    }

    /// Assembly lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if the assembly is not found.
    pub fn assembly(&self, id: AssemblyId) -> Result<&'a AssemblyData> {
        Ok(self.graph.assembly(id)?)
    }

    /// Void lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if the void is not found.
    pub fn void_node(&self, id: VoidId) -> Result<&'a VoidData> {
        Ok(self.graph.void_node(id)?)
    }

    /// Material of the assembly owning a panel.
    ///
    /// # Errors
    ///
    /// Returns an error if the panel or its assembly is not found.
    pub fn material_of(&self, id: PanelId) -> Result<MaterialConfig> {
        let data = self.graph.panel(id)?;
        Ok(self.graph.assembly(data.kind.assembly())?.material)
    }

    /// The shared finger layout of one assembly axis.
    ///
    /// # Errors
    ///
    /// Returns an error if the assembly is not found.
    pub fn finger_points(&self, assembly: AssemblyId, axis: Axis) -> Result<FingerPoints> {
        let data = self.graph.assembly(assembly)?;
        let (lo, hi) = data.bounds.range(axis);
        Ok(FingerPoints::for_span(
            lo,
            hi,
            data.material.finger_width,
            data.material.finger_gap,
            data.material.thickness,
        ))
    }
}
