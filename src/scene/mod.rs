//! The scene graph: assemblies, voids, and panels.
//!
//! Structural state lives in slotmap arenas; derived geometry (outlines,
//! transforms, corner reports) is cached per panel and recomputed lazily
//! when a snapshot is taken. All mutation funnels through
//! [`SceneGraph::dispatch`], which validates before touching anything, so a
//! returned error always leaves the graph as it was.

pub mod action;
pub mod assembly;
mod derive;
pub mod panel;
mod snapshot;
pub mod void_node;

use std::collections::HashMap;

use slotmap::{new_key_type, SlotMap};
use tracing::{debug, trace};

use crate::error::{DispatchError, GeometryError, Result, SceneError};
use crate::joint::EdgeStatus;
use crate::math::{Axis, Point2, FAB_TOLERANCE};

pub use action::Action;
pub use assembly::{AssemblyData, Face, LidConfig, LidTabs, MaterialConfig};
pub use panel::{Edge, EdgeConfig, Hole, PanelData, PanelKind, PanelTransform};
pub use snapshot::{DerivedPanel, PanelView, Snapshot};
pub use void_node::{Bounds3, GridInfo, SplitInfo, VoidData};

new_key_type! {
    pub struct AssemblyId;
    pub struct VoidId;
    pub struct PanelId;
}

/// One cached derivation, valid while the owning assembly keeps its stamp.
#[derive(Debug, Clone)]
struct CachedDerived {
    stamp: u64,
    value: DerivedPanel,
}

/// The mutable scene: box assemblies, their void trees, and their panels.
#[derive(Debug)]
pub struct SceneGraph {
    assemblies: SlotMap<AssemblyId, AssemblyData>,
    voids: SlotMap<VoidId, VoidData>,
    panels: SlotMap<PanelId, PanelData>,
    root: AssemblyId,
    /// Monotonic mutation counter feeding the node stamps.
    generation: u64,
    derived: HashMap<PanelId, CachedDerived>,
}

impl SceneGraph {
    /// Creates a box of the given outer dimensions with all six faces solid.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::Degenerate` when the box is too small to
    /// leave a positive interior at the given material thickness.
    pub fn new(width: f64, height: f64, depth: f64, material: MaterialConfig) -> Result<Self> {
        let bounds = Bounds3::new(0.0, 0.0, 0.0, width, height, depth);
        if !bounds.is_positive() || !bounds.shrunk(material.thickness).is_positive() {
            return Err(GeometryError::Degenerate(format!(
                "box {width}x{height}x{depth} leaves no interior at thickness {}",
                material.thickness
            ))
            .into());
        }
        let mut graph = Self {
            assemblies: SlotMap::with_key(),
            voids: SlotMap::with_key(),
            panels: SlotMap::with_key(),
            root: AssemblyId::default(),
            generation: 0,
            derived: HashMap::new(),
        };
        graph.root = graph.create_assembly(bounds, material, Axis::Y, None);
        Ok(graph)
    }

    /// The root assembly id.
    #[must_use]
    pub fn root(&self) -> AssemblyId {
        self.root
    }

    /// Assembly lookup.
    ///
    /// # Errors
    ///
    /// Returns `SceneError::NodeNotFound` for a stale or foreign id.
    pub fn assembly(&self, id: AssemblyId) -> std::result::Result<&AssemblyData, SceneError> {
        self.assemblies
            .get(id)
            .ok_or(SceneError::NodeNotFound("assembly"))
    }

    /// Void lookup.
    ///
    /// # Errors
    ///
    /// Returns `SceneError::NodeNotFound` for a stale or foreign id.
    pub fn void_node(&self, id: VoidId) -> std::result::Result<&VoidData, SceneError> {
        self.voids.get(id).ok_or(SceneError::NodeNotFound("void"))
    }

    /// Panel lookup.
    ///
    /// # Errors
    ///
    /// Returns `SceneError::NodeNotFound` for a stale or foreign id.
    pub fn panel(&self, id: PanelId) -> std::result::Result<&PanelData, SceneError> {
        self.panels.get(id).ok_or(SceneError::NodeNotFound("panel"))
    }

    /// Applies one action and returns a fresh snapshot.
    ///
    /// Validation happens before mutation: on `Err` the graph is unchanged.
    ///
    /// # Errors
    ///
    /// Returns `DispatchError` for invalid input, or the error of a failed
    /// re-derivation.
    pub fn dispatch(&mut self, action: Action) -> Result<Snapshot<'_>> {
        debug!(?action, "dispatch");
        match action {
            Action::AddSubdivision {
                void_id,
                axis,
                position,
            } => self.add_subdivisions(void_id, axis, vec![position])?,
            Action::AddSubdivisions {
                void_id,
                axis,
                positions,
            } => self.add_subdivisions(void_id, axis, positions)?,
            Action::AddGridSubdivision {
                void_id,
                primary_axis,
                primary_positions,
                secondary_axis,
                secondary_positions,
            } => self.add_grid_subdivision(
                void_id,
                primary_axis,
                primary_positions,
                secondary_axis,
                secondary_positions,
            )?,
            Action::RemoveSubdivision { void_id } => self.remove_subdivision(void_id)?,
            Action::ToggleFace { assembly, face } => self.toggle_face(assembly, face)?,
            Action::SetLid {
                assembly,
                max_side,
                config,
            } => self.set_lid(assembly, max_side, config)?,
            Action::CreateSubAssembly { void_id, clearance } => {
                self.create_sub_assembly(void_id, clearance)?;
            }
            Action::SetEdgeExtension { panel, edge, value } => {
                self.set_edge_extension(panel, edge, value)?;
            }
            Action::SetCornerFilletsBatch { panel, fillets } => {
                self.set_corner_fillets(panel, &fillets)?;
            }
        }
        self.snapshot()
    }

    /// Takes a read-only snapshot, recomputing stale derived geometry.
    ///
    /// # Errors
    ///
    /// Returns the error of a failed panel derivation.
    pub fn snapshot(&mut self) -> Result<Snapshot<'_>> {
        let panels = &self.panels;
        self.derived.retain(|id, _| panels.contains_key(*id));

        let ids: Vec<PanelId> = self.panels.keys().collect();
        let mut refreshed = 0usize;
        for id in ids {
            let Some(owner) = self.panels.get(id).map(|p| p.kind.assembly()) else {
                continue;
            };
            let stamp = self.assembly(owner)?.stamp;
            if self.derived.get(&id).is_some_and(|c| c.stamp == stamp) {
                continue;
            }
            let value = derive::derive_panel(self, id)?;
            self.derived.insert(id, CachedDerived { stamp, value });
            refreshed += 1;
        }
        if refreshed > 0 {
            trace!(refreshed, "derived geometry refreshed");
        }
        Ok(Snapshot { graph: self })
    }

    /// Replaces the user cutouts of a panel.
    ///
    /// # Errors
    ///
    /// Returns `SceneError::NodeNotFound` for a stale panel id.
    pub fn set_cutout(&mut self, panel: PanelId, cutouts: Vec<Hole>) -> Result<()> {
        self.panel(panel)?;
        if let Some(p) = self.panels.get_mut(panel) {
            p.cutouts = cutouts;
        }
        self.touch_panel(panel);
        Ok(())
    }

    /// Overrides one edge path of a panel, or clears the override.
    ///
    /// The path is panel-local and replaces the generated geometry verbatim;
    /// callers are responsible for keeping its endpoints on the base-corner
    /// positions.
    ///
    /// # Errors
    ///
    /// Returns an error for a stale panel id or a path with fewer than two
    /// points.
    pub fn set_custom_edge(
        &mut self,
        panel: PanelId,
        edge: Edge,
        path: Option<Vec<Point2>>,
    ) -> Result<()> {
        self.panel(panel)?;
        if let Some(points) = &path {
            if points.len() < 2 {
                return Err(GeometryError::Degenerate(
                    "custom edge path needs at least two points".to_owned(),
                )
                .into());
            }
        }
        if let Some(p) = self.panels.get_mut(panel) {
            p.custom_edges[edge.index()] = path;
        }
        self.touch_panel(panel);
        Ok(())
    }

    // ---- construction helpers ----

    fn create_assembly(
        &mut self,
        bounds: Bounds3,
        material: MaterialConfig,
        axis: Axis,
        parent_void: Option<VoidId>,
    ) -> AssemblyId {
        let nested = parent_void.is_some();
        let id = self.assemblies.insert(AssemblyData {
            bounds,
            material,
            axis,
            lids: [LidConfig::default(); 2],
            solid: [true; 6],
            root_void: VoidId::default(),
            face_panels: [None; 6],
            parent_void,
            stamp: self.generation,
        });
        let root_void = self
            .voids
            .insert(VoidData::leaf(bounds.shrunk(material.thickness), id, None));
        let mut face_panels = [None; 6];
        for face in Face::ALL {
            let kind = if nested {
                PanelKind::SubAssemblyFace { assembly: id, face }
            } else {
                PanelKind::Face { assembly: id, face }
            };
            face_panels[face.index()] = Some(self.panels.insert(PanelData::new(kind)));
        }
        if let Some(asm) = self.assemblies.get_mut(id) {
            asm.root_void = root_void;
            asm.face_panels = face_panels;
        }
        id
    }

    // ---- actions ----

    fn add_subdivisions(
        &mut self,
        void_id: VoidId,
        axis: Axis,
        positions: Vec<f64>,
    ) -> Result<()> {
        let void = self.void_node(void_id)?;
        if !void.is_leaf() {
            return Err(DispatchError::NotALeaf.into());
        }
        let assembly = void.assembly;
        let bounds = void.bounds;
        let thickness = self.assembly(assembly)?.material.thickness;
        validate_positions(&bounds, axis, &positions, thickness)?;

        let mut dividers = Vec::with_capacity(positions.len());
        for &position in &positions {
            dividers.push(self.panels.insert(PanelData::new(PanelKind::Divider {
                assembly,
                void_id,
                axis,
                position,
            })));
        }
        let (lo, hi) = bounds.range(axis);
        let mut children = Vec::with_capacity(positions.len() + 1);
        for (a, b) in cell_ranges(lo, hi, &positions, thickness) {
            children.push(self.voids.insert(VoidData::leaf(
                bounds.with_range(axis, a, b),
                assembly,
                Some(void_id),
            )));
        }
        if let Some(v) = self.voids.get_mut(void_id) {
            v.split = Some(SplitInfo { axis, positions });
            v.dividers = dividers;
            v.children = children;
        }
        self.touch_void(void_id);
        Ok(())
    }

    fn add_grid_subdivision(
        &mut self,
        void_id: VoidId,
        primary_axis: Axis,
        primary_positions: Vec<f64>,
        secondary_axis: Axis,
        secondary_positions: Vec<f64>,
    ) -> Result<()> {
        if primary_axis == secondary_axis {
            return Err(DispatchError::InvalidPosition {
                axis: secondary_axis,
                position: secondary_positions.first().copied().unwrap_or(0.0),
                reason: "grid axes must differ",
            }
            .into());
        }
        let void = self.void_node(void_id)?;
        if !void.is_leaf() {
            return Err(DispatchError::NotALeaf.into());
        }
        let assembly = void.assembly;
        let bounds = void.bounds;
        let thickness = self.assembly(assembly)?.material.thickness;
        validate_positions(&bounds, primary_axis, &primary_positions, thickness)?;
        validate_positions(&bounds, secondary_axis, &secondary_positions, thickness)?;

        let mut dividers = Vec::new();
        for (axis, positions) in [
            (primary_axis, &primary_positions),
            (secondary_axis, &secondary_positions),
        ] {
            for &position in positions.iter() {
                dividers.push(self.panels.insert(PanelData::new(PanelKind::Divider {
                    assembly,
                    void_id,
                    axis,
                    position,
                })));
            }
        }

        let (p_lo, p_hi) = bounds.range(primary_axis);
        let (s_lo, s_hi) = bounds.range(secondary_axis);
        let mut children = Vec::new();
        for (pa, pb) in cell_ranges(p_lo, p_hi, &primary_positions, thickness) {
            for (sa, sb) in cell_ranges(s_lo, s_hi, &secondary_positions, thickness) {
                children.push(self.voids.insert(VoidData::leaf(
                    bounds
                        .with_range(primary_axis, pa, pb)
                        .with_range(secondary_axis, sa, sb),
                    assembly,
                    Some(void_id),
                )));
            }
        }
        if let Some(v) = self.voids.get_mut(void_id) {
            v.grid = Some(GridInfo {
                primary: SplitInfo {
                    axis: primary_axis,
                    positions: primary_positions,
                },
                secondary: SplitInfo {
                    axis: secondary_axis,
                    positions: secondary_positions,
                },
            });
            v.dividers = dividers;
            v.children = children;
        }
        self.touch_void(void_id);
        Ok(())
    }

    fn remove_subdivision(&mut self, void_id: VoidId) -> Result<()> {
        let void = self.void_node(void_id)?;
        if void.is_leaf() {
            return Err(DispatchError::NoSubdivision.into());
        }
        self.clear_void(void_id);
        self.touch_void(void_id);
        Ok(())
    }

    /// Removes a void's subdivision, dividers, and nested sub-assembly,
    /// recursively through its children.
    fn clear_void(&mut self, void_id: VoidId) {
        let Some(v) = self.voids.get_mut(void_id) else {
            return;
        };
        let children = std::mem::take(&mut v.children);
        let dividers = std::mem::take(&mut v.dividers);
        let sub = v.sub_assembly.take();
        v.split = None;
        v.grid = None;

        for panel in dividers {
            self.panels.remove(panel);
            self.derived.remove(&panel);
        }
        for child in children {
            self.clear_void(child);
            self.voids.remove(child);
        }
        if let Some(assembly) = sub {
            self.remove_assembly(assembly);
        }
    }

    fn remove_assembly(&mut self, id: AssemblyId) {
        let Some(asm) = self.assemblies.remove(id) else {
            return;
        };
        for panel in asm.face_panels.into_iter().flatten() {
            self.panels.remove(panel);
            self.derived.remove(&panel);
        }
        self.clear_void(asm.root_void);
        self.voids.remove(asm.root_void);
    }

    fn toggle_face(&mut self, assembly: AssemblyId, face: Face) -> Result<()> {
        let asm = self.assembly(assembly)?;
        let idx = face.index();
        if asm.solid[idx] {
            let panel = asm.face_panels[idx];
            if let Some(a) = self.assemblies.get_mut(assembly) {
                a.solid[idx] = false;
                a.face_panels[idx] = None;
            }
            if let Some(id) = panel {
                self.panels.remove(id);
                self.derived.remove(&id);
            }
        } else {
            let kind = if asm.parent_void.is_some() {
                PanelKind::SubAssemblyFace { assembly, face }
            } else {
                PanelKind::Face { assembly, face }
            };
            let id = self.panels.insert(PanelData::new(kind));
            if let Some(a) = self.assemblies.get_mut(assembly) {
                a.solid[idx] = true;
                a.face_panels[idx] = Some(id);
            }
        }
        self.touch_assembly(assembly);
        Ok(())
    }

    fn set_lid(&mut self, assembly: AssemblyId, max_side: bool, config: LidConfig) -> Result<()> {
        let asm = self.assembly(assembly)?;
        let axis = asm.axis;
        let (lo, hi) = asm.bounds.range(axis);
        let other = asm.lids[usize::from(!max_side)].inset;
        let t = asm.material.thickness;
        if config.inset < 0.0
            || config.inset.is_nan()
            || hi - lo - config.inset - other - 2.0 * t <= FAB_TOLERANCE
        {
            return Err(DispatchError::InvalidPosition {
                axis,
                position: config.inset,
                reason: "lid inset leaves no interior",
            }
            .into());
        }
        if let Some(a) = self.assemblies.get_mut(assembly) {
            a.lids[usize::from(max_side)] = config;
        }
        self.touch_assembly(assembly);
        Ok(())
    }

    fn create_sub_assembly(&mut self, void_id: VoidId, clearance: f64) -> Result<()> {
        let void = self.void_node(void_id)?;
        if !void.is_leaf() {
            return Err(DispatchError::NotALeaf.into());
        }
        let parent = self.assembly(void.assembly)?;
        let material = parent.material;
        let axis = parent.axis;
        let inner = void.bounds.shrunk(clearance);
        if clearance < 0.0
            || !inner.is_positive()
            || !inner.shrunk(material.thickness).is_positive()
        {
            return Err(DispatchError::ClearanceTooLarge { clearance }.into());
        }
        let sub = self.create_assembly(inner, material, axis, Some(void_id));
        if let Some(v) = self.voids.get_mut(void_id) {
            v.sub_assembly = Some(sub);
        }
        self.touch_void(void_id);
        Ok(())
    }

    fn set_edge_extension(&mut self, panel: PanelId, edge: Edge, value: f64) -> Result<()> {
        let derived = derive::derive_panel(self, panel)?;
        let idx = edge.index();
        match derived.statuses[idx] {
            EdgeStatus::Locked => {
                return Err(
                    DispatchError::EdgeNotExtendable("edge is locked by male tabs").into(),
                );
            }
            EdgeStatus::OutwardOnly if value < -FAB_TOLERANCE => {
                return Err(DispatchError::EdgeNotExtendable(
                    "female edge extends outward only",
                )
                .into());
            }
            _ => {}
        }
        let inward_limit = match edge {
            Edge::Bottom | Edge::Top => derived.height,
            Edge::Right | Edge::Left => derived.width,
        };
        if value <= -(inward_limit - FAB_TOLERANCE) {
            return Err(
                DispatchError::EdgeNotExtendable("extension would collapse the panel").into(),
            );
        }
        if let Some(p) = self.panels.get_mut(panel) {
            p.extensions[idx] = value;
        }
        self.touch_panel(panel);
        Ok(())
    }

    fn set_corner_fillets(&mut self, panel: PanelId, fillets: &[(usize, f64)]) -> Result<()> {
        // Eligibility is judged on the unfilleted outline, so an existing
        // fillet can be resized or cleared.
        let saved = self.panel(panel)?.fillets;
        if let Some(p) = self.panels.get_mut(panel) {
            p.fillets = [0.0; 4];
        }
        let derived = derive::derive_panel(self, panel);
        if let Some(p) = self.panels.get_mut(panel) {
            p.fillets = saved;
        }
        let derived = derived?;

        for &(corner, radius) in fillets {
            if corner >= 4 {
                return Err(DispatchError::CornerNotEligible { corner }.into());
            }
            if radius <= FAB_TOLERANCE {
                continue;
            }
            let info = &derived.corners.corners[corner];
            if !info.eligible {
                return Err(DispatchError::CornerNotEligible { corner }.into());
            }
            if radius > info.max_radius + FAB_TOLERANCE {
                return Err(DispatchError::FilletRadiusTooLarge {
                    corner,
                    radius,
                    max: info.max_radius,
                }
                .into());
            }
        }
        if let Some(p) = self.panels.get_mut(panel) {
            for &(corner, radius) in fillets {
                p.fillets[corner] = radius.max(0.0);
            }
        }
        self.touch_panel(panel);
        Ok(())
    }

    // ---- stamp propagation ----

    fn touch_assembly(&mut self, id: AssemblyId) {
        self.generation += 1;
        self.stamp_assembly_chain(id);
    }

    fn touch_void(&mut self, id: VoidId) {
        self.generation += 1;
        let generation = self.generation;
        let mut cursor = Some(id);
        let mut owner = None;
        while let Some(void_id) = cursor {
            let Some(v) = self.voids.get_mut(void_id) else {
                break;
            };
            v.stamp = generation;
            owner = Some(v.assembly);
            cursor = v.parent;
        }
        if let Some(assembly) = owner {
            self.stamp_assembly_chain(assembly);
        }
    }

    fn touch_panel(&mut self, id: PanelId) {
        self.generation += 1;
        let generation = self.generation;
        let Some(p) = self.panels.get_mut(id) else {
            return;
        };
        p.stamp = generation;
        let owner = p.kind.assembly();
        self.stamp_assembly_chain(owner);
    }

    /// Stamps an assembly and every ancestor up through nested parents.
    ///
    /// A nested assembly's geometry feeds openings in its parent's faces,
    /// so invalidation always climbs the whole chain.
    fn stamp_assembly_chain(&mut self, id: AssemblyId) {
        let generation = self.generation;
        let mut current = id;
        loop {
            let Some(asm) = self.assemblies.get_mut(current) else {
                return;
            };
            asm.stamp = generation;
            let Some(parent_void) = asm.parent_void else {
                return;
            };
            let mut cursor = Some(parent_void);
            let mut owner = None;
            while let Some(void_id) = cursor {
                let Some(v) = self.voids.get_mut(void_id) else {
                    break;
                };
                v.stamp = generation;
                owner = Some(v.assembly);
                cursor = v.parent;
            }
            match owner {
                Some(assembly) => current = assembly,
                None => return,
            }
        }
    }
}

/// Child cell ranges along one axis for cuts at the given positions, each
/// cut consuming one material thickness centered on its position.
fn cell_ranges(lo: f64, hi: f64, positions: &[f64], thickness: f64) -> Vec<(f64, f64)> {
    let mut out = Vec::with_capacity(positions.len() + 1);
    let mut start = lo;
    for &p in positions {
        out.push((start, p - thickness / 2.0));
        start = p + thickness / 2.0;
    }
    out.push((start, hi));
    out
}

/// Rejects split positions that are not strictly increasing or that would
/// leave a non-positive cell. Positions are taken in the caller's order,
/// never reordered.
fn validate_positions(
    bounds: &Bounds3,
    axis: Axis,
    positions: &[f64],
    thickness: f64,
) -> std::result::Result<(), DispatchError> {
    if positions.is_empty() {
        return Err(DispatchError::InvalidPosition {
            axis,
            position: 0.0,
            reason: "no split positions given",
        });
    }
    for w in positions.windows(2) {
        if w[0].partial_cmp(&w[1]) != Some(std::cmp::Ordering::Less) {
            return Err(DispatchError::InvalidPosition {
                axis,
                position: w[1],
                reason: "positions must be strictly increasing",
            });
        }
    }
    let (lo, hi) = bounds.range(axis);
    let mut start = lo;
    for &p in positions {
        if p.is_nan() || p - thickness / 2.0 <= start + FAB_TOLERANCE {
            return Err(DispatchError::InvalidPosition {
                axis,
                position: p,
                reason: "cut leaves a non-positive cell",
            });
        }
        start = p + thickness / 2.0;
    }
    if start + FAB_TOLERANCE >= hi {
        return Err(DispatchError::InvalidPosition {
            axis,
            position: positions[positions.len() - 1],
            reason: "cut leaves a non-positive cell",
        });
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::joint::Gender;

    fn box_graph() -> SceneGraph {
        SceneGraph::new(100.0, 80.0, 60.0, MaterialConfig::default()).unwrap()
    }

    fn root_void(graph: &SceneGraph) -> VoidId {
        graph.assembly(graph.root()).unwrap().root_void
    }

    fn face_panel(graph: &SceneGraph, face: Face) -> PanelId {
        graph.assembly(graph.root()).unwrap().face_panels[face.index()].unwrap()
    }

    #[test]
    fn new_box_has_six_face_panels() {
        let mut graph = box_graph();
        let snapshot = graph.snapshot().unwrap();
        assert_eq!(snapshot.panel_count(), 6);
        for view in snapshot.panels() {
            assert!(matches!(view.data.kind, PanelKind::Face { .. }));
            assert!(view.derived.outline.outer.len() >= 4);
        }
    }

    #[test]
    fn bottom_face_is_male_everywhere_and_inset() {
        let mut graph = box_graph();
        let id = face_panel(&graph, Face::Bottom);
        let snapshot = graph.snapshot().unwrap();
        let view = snapshot.panel(id).unwrap();
        // Bottom precedes every wall, so all four edges take tabs and the
        // base rectangle is inset one thickness on each side.
        assert!((view.derived.width - 94.0).abs() < 1e-9);
        assert!((view.derived.height - 54.0).abs() < 1e-9);
        for edge in &view.derived.edges {
            assert_eq!(edge.joint, Gender::Male);
            assert!(edge.meets.is_some());
        }
        assert_eq!(view.derived.statuses, [EdgeStatus::Locked; 4]);
    }

    #[test]
    fn toggle_face_removes_panel_and_opens_edges() {
        let mut graph = box_graph();
        let bottom = face_panel(&graph, Face::Bottom);
        let snapshot = graph
            .dispatch(Action::ToggleFace {
                assembly: graph.root(),
                face: Face::Front,
            })
            .unwrap();
        assert_eq!(snapshot.panel_count(), 5);
        let view = snapshot.panel(bottom).unwrap();
        // Bottom's front side loses its joint and runs to the outer bound.
        assert_eq!(view.derived.edges[Edge::Bottom.index()].joint, Gender::Plain);
        assert!((view.derived.height - 57.0).abs() < 1e-9);
    }

    #[test]
    fn subdivision_round_trip() {
        let mut graph = box_graph();
        let void_id = root_void(&graph);
        let snapshot = graph
            .dispatch(Action::AddSubdivision {
                void_id,
                axis: Axis::X,
                position: 50.0,
            })
            .unwrap();
        assert_eq!(snapshot.panel_count(), 7);
        let void = snapshot.void_node(void_id).unwrap();
        assert_eq!(void.children.len(), 2);
        assert_eq!(void.dividers.len(), 1);

        let left = snapshot.void_node(void.children[0]).unwrap();
        let right = snapshot.void_node(void.children[1]).unwrap();
        assert_eq!(left.bounds.range(Axis::X), (3.0, 48.5));
        assert_eq!(right.bounds.range(Axis::X), (51.5, 97.0));

        let snapshot = graph
            .dispatch(Action::RemoveSubdivision { void_id })
            .unwrap();
        assert_eq!(snapshot.panel_count(), 6);
        assert!(snapshot.void_node(void_id).unwrap().is_leaf());
    }

    #[test]
    fn divider_joints_into_all_four_walls() {
        let mut graph = box_graph();
        let void_id = root_void(&graph);
        let snapshot = graph
            .dispatch(Action::AddSubdivision {
                void_id,
                axis: Axis::X,
                position: 50.0,
            })
            .unwrap();
        let divider = snapshot.void_node(void_id).unwrap().dividers[0];
        let view = snapshot.panel(divider).unwrap();
        // Root void touches the interior on all sides, and all walls are
        // solid, so every divider edge tabs into a face.
        assert!((view.derived.width - 74.0).abs() < 1e-9);
        assert!((view.derived.height - 54.0).abs() < 1e-9);
        for edge in &view.derived.edges {
            assert_eq!(edge.joint, Gender::Male);
        }
        assert!(view.derived.outline.outer.len() > 4);
    }

    #[test]
    fn divider_tabs_get_matching_wall_slots() {
        let mut graph = box_graph();
        let void_id = root_void(&graph);
        let bottom = face_panel(&graph, Face::Bottom);
        let left = face_panel(&graph, Face::Left);
        let snapshot = graph
            .dispatch(Action::AddSubdivision {
                void_id,
                axis: Axis::X,
                position: 50.0,
            })
            .unwrap();
        // The divider tabs into bottom, top, front, and back; the bottom
        // wall gets one through-slot per finger of the Z layout within the
        // void, clipped to the interior.
        let view = snapshot.panel(bottom).unwrap();
        assert_eq!(view.derived.holes.len(), 3);
        let Hole::Rect { x, y, w, h } = view.derived.holes[0] else {
            panic!("expected a rectangular slot");
        };
        assert!((x - 45.5).abs() < 1e-9, "x={x}");
        assert!((y - 0.0).abs() < 1e-9, "y={y}");
        assert!((w - 3.0).abs() < 1e-9);
        assert!((h - 12.0).abs() < 1e-9);
        // The divider runs parallel to the left wall: no slots there.
        let view = snapshot.panel(left).unwrap();
        assert!(view.derived.holes.is_empty());
    }

    #[test]
    fn grid_subdivision_produces_crossing_notches() {
        let mut graph = box_graph();
        let void_id = root_void(&graph);
        let snapshot = graph
            .dispatch(Action::AddGridSubdivision {
                void_id,
                primary_axis: Axis::X,
                primary_positions: vec![50.0],
                secondary_axis: Axis::Z,
                secondary_positions: vec![30.0],
            })
            .unwrap();
        assert_eq!(snapshot.panel_count(), 8);
        let void = snapshot.void_node(void_id).unwrap();
        assert_eq!(void.children.len(), 4);
        assert_eq!(void.dividers.len(), 2);

        let x_div = snapshot.panel(void.dividers[0]).unwrap();
        let z_div = snapshot.panel(void.dividers[1]).unwrap();
        assert_eq!(x_div.derived.notches.len(), 1);
        assert_eq!(z_div.derived.notches.len(), 1);
        // X before Z: the X divider is notched from the shared axis
        // maximum, the Z divider from the minimum, half the overlap each.
        assert_eq!(x_div.derived.notches[0].edge, Edge::Right);
        assert_eq!(z_div.derived.notches[0].edge, Edge::Bottom);
        assert!((x_div.derived.notches[0].depth - 37.0).abs() < 1e-9);
        assert!((z_div.derived.notches[0].depth - 37.0).abs() < 1e-9);
        // Notch widths equal one material thickness.
        let n = &x_div.derived.notches[0];
        assert!((n.end - n.start - 3.0).abs() < 1e-9);
    }

    #[test]
    fn invalid_position_leaves_graph_untouched() {
        let mut graph = box_graph();
        let void_id = root_void(&graph);
        let err = graph
            .dispatch(Action::AddSubdivision {
                void_id,
                axis: Axis::X,
                position: 1.0,
            })
            .unwrap_err();
        assert!(matches!(
            err,
            crate::KerfboxError::Dispatch(DispatchError::InvalidPosition { .. })
        ));
        let snapshot = graph.snapshot().unwrap();
        assert_eq!(snapshot.panel_count(), 6);
        assert!(snapshot.void_node(void_id).unwrap().is_leaf());
    }

    #[test]
    fn unordered_split_positions_are_rejected() {
        let mut graph = box_graph();
        let void_id = root_void(&graph);
        for positions in [vec![70.0, 30.0], vec![30.0, 30.0]] {
            let err = graph
                .dispatch(Action::AddSubdivisions {
                    void_id,
                    axis: Axis::X,
                    positions,
                })
                .unwrap_err();
            assert!(matches!(
                err,
                crate::KerfboxError::Dispatch(DispatchError::InvalidPosition {
                    reason: "positions must be strictly increasing",
                    ..
                })
            ));
        }
        let snapshot = graph.snapshot().unwrap();
        assert!(snapshot.void_node(void_id).unwrap().is_leaf());
    }

    #[test]
    fn open_lid_slips_inside_plain_rims() {
        let mut graph = box_graph();
        let top = face_panel(&graph, Face::Top);
        let front = face_panel(&graph, Face::Front);
        let snapshot = graph
            .dispatch(Action::SetLid {
                assembly: graph.root(),
                max_side: true,
                config: LidConfig {
                    tabs: LidTabs::Open,
                    inset: 0.0,
                },
            })
            .unwrap();
        let lid = snapshot.panel(top).unwrap();
        assert!(lid
            .derived
            .statuses
            .iter()
            .all(|s| *s == EdgeStatus::Unlocked));
        // The lid drops inside the walls: one thickness off each side.
        assert!((lid.derived.width - 94.0).abs() < 1e-9);
        assert!((lid.derived.height - 54.0).abs() < 1e-9);
        // Wall rims facing the open lid go plain.
        let wall = snapshot.panel(front).unwrap();
        assert_eq!(wall.derived.edges[Edge::Top.index()].joint, Gender::Plain);
    }

    #[test]
    fn lid_inset_shifts_the_lid_plane() {
        let mut graph = box_graph();
        let top = face_panel(&graph, Face::Top);
        let snapshot = graph
            .dispatch(Action::SetLid {
                assembly: graph.root(),
                max_side: true,
                config: LidConfig {
                    tabs: LidTabs::Tabs,
                    inset: 5.0,
                },
            })
            .unwrap();
        let view = snapshot.panel(top).unwrap();
        // Slab shifts from y = 77 down to y = 72; the joints stay.
        assert!((view.derived.transform.origin.y - 72.0).abs() < 1e-9);
        assert_eq!(view.derived.edges[Edge::Bottom.index()].joint, Gender::Male);
    }

    #[test]
    fn oversized_lid_inset_is_rejected() {
        let mut graph = box_graph();
        let root = graph.root();
        let err = graph
            .dispatch(Action::SetLid {
                assembly: root,
                max_side: false,
                config: LidConfig {
                    tabs: LidTabs::Tabs,
                    inset: 80.0,
                },
            })
            .unwrap_err();
        assert!(matches!(
            err,
            crate::KerfboxError::Dispatch(DispatchError::InvalidPosition { .. })
        ));
        assert!((graph.assembly(root).unwrap().lids[0].inset).abs() < 1e-9);
    }

    #[test]
    fn non_leaf_void_rejects_second_split() {
        let mut graph = box_graph();
        let void_id = root_void(&graph);
        graph
            .dispatch(Action::AddSubdivision {
                void_id,
                axis: Axis::X,
                position: 50.0,
            })
            .unwrap();
        let err = graph
            .dispatch(Action::AddSubdivision {
                void_id,
                axis: Axis::Z,
                position: 30.0,
            })
            .unwrap_err();
        assert!(matches!(
            err,
            crate::KerfboxError::Dispatch(DispatchError::NotALeaf)
        ));
    }

    #[test]
    fn sub_assembly_punches_lid_openings() {
        let mut graph = box_graph();
        let void_id = root_void(&graph);
        let bottom = face_panel(&graph, Face::Bottom);
        let snapshot = graph
            .dispatch(Action::CreateSubAssembly {
                void_id,
                clearance: 2.0,
            })
            .unwrap();
        // Six outer faces plus six sub-assembly faces.
        assert_eq!(snapshot.panel_count(), 12);
        let sub = snapshot.void_node(void_id).unwrap().sub_assembly.unwrap();
        let sub_asm = snapshot.assembly(sub).unwrap();
        assert_eq!(sub_asm.bounds.range(Axis::X), (5.0, 95.0));

        // The drawer slides along Y; both Y faces get a rectangular opening.
        let view = snapshot.panel(bottom).unwrap();
        assert_eq!(view.derived.holes.len(), 1);
        let Hole::Rect { x, y, w, h } = view.derived.holes[0] else {
            panic!("expected a rectangular opening");
        };
        assert!((x - 2.0).abs() < 1e-9, "x={x}");
        assert!((y - 2.0).abs() < 1e-9, "y={y}");
        assert!((w - 90.0).abs() < 1e-9);
        assert!((h - 50.0).abs() < 1e-9);
    }

    #[test]
    fn clearance_too_large_is_rejected() {
        let mut graph = box_graph();
        let void_id = root_void(&graph);
        let err = graph
            .dispatch(Action::CreateSubAssembly {
                void_id,
                clearance: 40.0,
            })
            .unwrap_err();
        assert!(matches!(
            err,
            crate::KerfboxError::Dispatch(DispatchError::ClearanceTooLarge { .. })
        ));
    }

    #[test]
    fn extension_respects_edge_status() {
        let mut graph = box_graph();
        let bottom = face_panel(&graph, Face::Bottom);
        // All bottom edges are male: locked.
        let err = graph
            .dispatch(Action::SetEdgeExtension {
                panel: bottom,
                edge: Edge::Bottom,
                value: 5.0,
            })
            .unwrap_err();
        assert!(matches!(
            err,
            crate::KerfboxError::Dispatch(DispatchError::EdgeNotExtendable(_))
        ));

        // Removing the front wall opens the bottom panel's front edge.
        graph
            .dispatch(Action::ToggleFace {
                assembly: graph.root(),
                face: Face::Front,
            })
            .unwrap();
        let snapshot = graph
            .dispatch(Action::SetEdgeExtension {
                panel: bottom,
                edge: Edge::Bottom,
                value: 5.0,
            })
            .unwrap();
        let view = snapshot.panel(bottom).unwrap();
        assert!(view
            .derived
            .outline
            .outer
            .iter()
            .any(|p| (p.y + 5.0).abs() < 1e-9));
    }

    #[test]
    fn fillet_requires_eligible_corner() {
        let mut graph = box_graph();
        let bottom = face_panel(&graph, Face::Bottom);
        let err = graph
            .dispatch(Action::SetCornerFilletsBatch {
                panel: bottom,
                fillets: vec![(0, 5.0)],
            })
            .unwrap_err();
        assert!(matches!(
            err,
            crate::KerfboxError::Dispatch(DispatchError::CornerNotEligible { corner: 0 })
        ));

        // Strip all four walls: the bottom panel becomes a loose plate.
        for face in [Face::Left, Face::Right, Face::Front, Face::Back] {
            graph
                .dispatch(Action::ToggleFace {
                    assembly: graph.root(),
                    face,
                })
                .unwrap();
        }
        let err = graph
            .dispatch(Action::SetCornerFilletsBatch {
                panel: bottom,
                fillets: vec![(1, 1000.0)],
            })
            .unwrap_err();
        assert!(matches!(
            err,
            crate::KerfboxError::Dispatch(DispatchError::FilletRadiusTooLarge { corner: 1, .. })
        ));
        let snapshot = graph
            .dispatch(Action::SetCornerFilletsBatch {
                panel: bottom,
                fillets: vec![(1, 10.0), (2, 4.0)],
            })
            .unwrap();
        let view = snapshot.panel(bottom).unwrap();
        assert_eq!(view.derived.outline.arcs.len(), 2);
        // Resizing an existing fillet stays legal.
        let snapshot = graph
            .dispatch(Action::SetCornerFilletsBatch {
                panel: bottom,
                fillets: vec![(1, 6.0)],
            })
            .unwrap();
        assert_eq!(snapshot.panel(bottom).unwrap().data.fillets[1], 6.0);
    }

    #[test]
    fn snapshot_reuses_fresh_derivations() {
        let mut graph = box_graph();
        graph.snapshot().unwrap();
        let before = graph.generation;
        graph.snapshot().unwrap();
        assert_eq!(graph.generation, before, "read must not mutate");

        graph
            .dispatch(Action::ToggleFace {
                assembly: graph.root(),
                face: Face::Front,
            })
            .unwrap();
        assert!(graph.generation > before);
    }

    #[test]
    fn cutouts_flow_into_derived_holes() {
        let mut graph = box_graph();
        let bottom = face_panel(&graph, Face::Bottom);
        graph
            .set_cutout(
                bottom,
                vec![Hole::Circle {
                    cx: 40.0,
                    cy: 20.0,
                    radius: 5.0,
                }],
            )
            .unwrap();
        let snapshot = graph.snapshot().unwrap();
        let view = snapshot.panel(bottom).unwrap();
        assert_eq!(view.derived.holes.len(), 1);
        assert_eq!(view.derived.outline.holes.len(), 1);
    }

    #[test]
    fn degenerate_box_is_rejected() {
        let err = SceneGraph::new(5.0, 5.0, 5.0, MaterialConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            crate::KerfboxError::Geometry(GeometryError::Degenerate(_))
        ));
    }
}
