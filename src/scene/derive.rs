//! Derivation of panel geometry from structural state.
//!
//! Everything in here is a pure read of the graph: base rectangles, edge
//! joint resolution, world transforms, sub-assembly openings, cross-lap
//! notches, and finally the outline and corner analysis.

use crate::corner::CornerEligibility;
use crate::error::Result;
use crate::joint::{FingerPoints, Gender};
use crate::math::{Axis, Point3};
use crate::outline::{EdgeNotch, OutlineBuilder, OutlineEdge};

use super::assembly::{AssemblyData, Face, LidTabs};
use super::panel::{Edge, EdgeConfig, Hole, PanelKind, PanelTransform};
use super::snapshot::DerivedPanel;
use super::{PanelId, SceneGraph};

/// Positional tolerance for "touches the assembly interior" tests.
const TOUCH_EPS: f64 = 1e-6;

/// The two panel-plane axes for a given normal axis, in `Axis` order.
fn other_axes(normal: Axis) -> (Axis, Axis) {
    match normal {
        Axis::X => (Axis::Y, Axis::Z),
        Axis::Y => (Axis::X, Axis::Z),
        Axis::Z => (Axis::X, Axis::Y),
    }
}

/// The axis that is neither `a` nor `b`.
fn third_axis(a: Axis, b: Axis) -> Axis {
    match (a, b) {
        (Axis::X, Axis::Y) | (Axis::Y, Axis::X) => Axis::Z,
        (Axis::X, Axis::Z) | (Axis::Z, Axis::X) => Axis::Y,
        _ => Axis::X,
    }
}

/// Builds a world point from per-axis components.
fn world_point(axes: [(Axis, f64); 3]) -> Point3 {
    let mut p = Point3::new(0.0, 0.0, 0.0);
    for (axis, value) in axes {
        match axis {
            Axis::X => p.x = value,
            Axis::Y => p.y = value,
            Axis::Z => p.z = value,
        }
    }
    p
}

/// The shared per-axis finger layouts of an assembly.
fn axis_finger_points(asm: &AssemblyData) -> [FingerPoints; 3] {
    Axis::ALL.map(|axis| {
        let (lo, hi) = asm.bounds.range(axis);
        FingerPoints::for_span(
            lo,
            hi,
            asm.material.finger_width,
            asm.material.finger_gap,
            asm.material.thickness,
        )
    })
}

/// Joint gender of a face panel edge where face `f` meets face `g`.
///
/// Missing neighbours and open lids leave the edge plain; otherwise the
/// face earlier in the precedence order takes the tabs.
fn edge_gender(asm: &AssemblyData, f: Face, g: Face) -> Gender {
    if !asm.is_solid(g) {
        return Gender::Plain;
    }
    for face in [f, g] {
        if let Some(lid) = asm.lid_of(face) {
            if lid.tabs == LidTabs::Open {
                return Gender::Plain;
            }
        }
    }
    if f < g {
        Gender::Male
    } else {
        Gender::Female
    }
}

/// One resolved side of a face panel's base rectangle.
struct SideInfo {
    gender: Gender,
    /// Base-rectangle coordinate on the side's axis.
    coord: f64,
    meets: Option<PanelId>,
}

fn face_side(asm: &AssemblyData, face: Face, s_axis: Axis, s_max: bool) -> SideInfo {
    let t = asm.material.thickness;
    let g = Face::at(s_axis, s_max);
    let gender = edge_gender(asm, face, g);
    let (lo, hi) = asm.bounds.range(s_axis);
    let bound = if s_max { hi } else { lo };

    // Male edges are inset one thickness, with tabs reaching back to the
    // bound. Open lids are also inset so a lift-off lid slips inside the
    // walls instead of resting on their rims.
    let open_lid_inside = asm
        .lid_of(face)
        .is_some_and(|l| l.tabs == LidTabs::Open)
        && asm.is_solid(g)
        && asm.lid_of(g).is_none();
    let inset = gender == Gender::Male || open_lid_inside;
    let coord = match (inset, s_max) {
        (true, true) => bound - t,
        (true, false) => bound + t,
        (false, _) => bound,
    };

    let meets = if gender == Gender::Plain {
        None
    } else {
        asm.face_panels[g.index()]
    };
    SideInfo {
        gender,
        coord,
        meets,
    }
}

/// Derives the full geometry of one panel.
pub(super) fn derive_panel(graph: &SceneGraph, id: PanelId) -> Result<DerivedPanel> {
    let panel = graph.panel(id)?;
    match panel.kind {
        PanelKind::Face { assembly, face } | PanelKind::SubAssemblyFace { assembly, face } => {
            derive_face_panel(graph, id, assembly, face)
        }
        PanelKind::Divider {
            assembly,
            void_id,
            axis,
            position,
        } => derive_divider_panel(graph, id, assembly, void_id, axis, position),
    }
}

fn derive_face_panel(
    graph: &SceneGraph,
    id: PanelId,
    assembly: super::AssemblyId,
    face: Face,
) -> Result<DerivedPanel> {
    let asm = graph.assembly(assembly)?;
    let t = asm.material.thickness;
    let n_axis = face.axis();
    let (u_axis, v_axis) = other_axes(n_axis);
    let (n_lo, n_hi) = asm.bounds.range(n_axis);
    let lid_inset = asm.lid_of(face).map_or(0.0, |l| l.inset);
    let slab_lo = if face.is_max() {
        n_hi - lid_inset - t
    } else {
        n_lo + lid_inset
    };

    let left = face_side(asm, face, u_axis, false);
    let right = face_side(asm, face, u_axis, true);
    let bottom = face_side(asm, face, v_axis, false);
    let top = face_side(asm, face, v_axis, true);

    let (u0, u1) = (left.coord, right.coord);
    let (v0, v1) = (bottom.coord, top.coord);

    let edges = [
        EdgeConfig {
            joint: bottom.gender,
            axis: u_axis,
            range: (u0, u1),
            meets: bottom.meets,
        },
        EdgeConfig {
            joint: right.gender,
            axis: v_axis,
            range: (v0, v1),
            meets: right.meets,
        },
        EdgeConfig {
            joint: top.gender,
            axis: u_axis,
            range: (u1, u0),
            meets: top.meets,
        },
        EdgeConfig {
            joint: left.gender,
            axis: v_axis,
            range: (v1, v0),
            meets: left.meets,
        },
    ];

    let transform = PanelTransform {
        origin: world_point([(u_axis, u0), (v_axis, v0), (n_axis, slab_lo)]),
        u: u_axis.unit(),
        v: v_axis.unit(),
        normal: n_axis.unit(),
    };

    // Sub-assembly openings: a nested assembly sliding out along this
    // face's axis punches its cross-section through the face.
    let panel = graph.panel(id)?;
    let mut holes = panel.cutouts.clone();
    for (_, void) in graph.voids.iter() {
        if void.assembly != assembly {
            continue;
        }
        let Some(sub) = void.sub_assembly else {
            continue;
        };
        let sub_asm = graph.assembly(sub)?;
        if sub_asm.axis != n_axis {
            continue;
        }
        let (void_lo, void_hi) = void.bounds.range(n_axis);
        let touches = if face.is_max() {
            (void_hi - (n_hi - t)).abs() < TOUCH_EPS
        } else {
            (void_lo - (n_lo + t)).abs() < TOUCH_EPS
        };
        if !touches {
            continue;
        }
        let (su0, su1) = sub_asm.bounds.range(u_axis);
        let (sv0, sv1) = sub_asm.bounds.range(v_axis);
        holes.push(Hole::Rect {
            x: su0 - u0,
            y: sv0 - v0,
            w: su1 - su0,
            h: sv1 - sv0,
        });
    }

    // Divider slots: every divider tabbing into this face needs a strip of
    // through-holes at the finger sections its tabs occupy.
    let open_lid = asm.lid_of(face).is_some_and(|l| l.tabs == LidTabs::Open);
    if !open_lid {
        for (_, other) in graph.panels.iter() {
            let PanelKind::Divider {
                assembly: divider_asm,
                void_id,
                axis: d_axis,
                position,
            } = other.kind
            else {
                continue;
            };
            if divider_asm != assembly || d_axis == n_axis {
                continue;
            }
            let void_bounds = graph.void_node(void_id)?.bounds;
            let (d_lo, d_hi) = void_bounds.range(n_axis);
            let touches = if face.is_max() {
                (d_hi - (n_hi - t)).abs() < TOUCH_EPS
            } else {
                (d_lo - (n_lo + t)).abs() < TOUCH_EPS
            };
            if !touches {
                continue;
            }

            // Tabs run along the axis that is neither the face normal nor
            // the divider plane normal; finger sections come from the
            // shared per-axis layout.
            let c_axis = third_axis(n_axis, d_axis);
            let (span_lo, span_hi) = asm.bounds.range(c_axis);
            let fp = FingerPoints::for_span(
                span_lo,
                span_hi,
                asm.material.finger_width,
                asm.material.finger_gap,
                t,
            );
            if fp.points.is_empty() {
                continue;
            }
            let (c0, c1) = void_bounds.range(c_axis);
            let mut bounds_along = Vec::with_capacity(fp.points.len() + 2);
            bounds_along.push(span_lo);
            bounds_along.extend_from_slice(&fp.points);
            bounds_along.push(span_hi);
            for (section, pair) in bounds_along.windows(2).enumerate() {
                if section % 2 != 0 {
                    continue;
                }
                let s = pair[0].max(c0);
                let e = pair[1].min(c1);
                if e - s < TOUCH_EPS {
                    continue;
                }
                let (strip_lo, strip_hi) = (position - t / 2.0, position + t / 2.0);
                let rect = if d_axis == u_axis {
                    Hole::Rect {
                        x: strip_lo - u0,
                        y: s - v0,
                        w: strip_hi - strip_lo,
                        h: e - s,
                    }
                } else {
                    Hole::Rect {
                        x: s - u0,
                        y: strip_lo - v0,
                        w: e - s,
                        h: strip_hi - strip_lo,
                    }
                };
                holes.push(rect);
            }
        }
    }

    finish(graph, id, u1 - u0, v1 - v0, edges, transform, holes, Vec::new())
}

/// Joint resolution for one divider side: tabs into the assembly face it
/// reaches, plain everywhere else.
fn divider_side(
    asm: &AssemblyData,
    void_bounds: &super::void_node::Bounds3,
    s_axis: Axis,
    s_max: bool,
) -> (Gender, Option<PanelId>) {
    let t = asm.material.thickness;
    let g = Face::at(s_axis, s_max);
    let (a_lo, a_hi) = asm.bounds.range(s_axis);
    let (lo, hi) = void_bounds.range(s_axis);
    let touches = if s_max {
        (hi - (a_hi - t)).abs() < TOUCH_EPS
    } else {
        (lo - (a_lo + t)).abs() < TOUCH_EPS
    };
    let open_lid = asm.lid_of(g).is_some_and(|l| l.tabs == LidTabs::Open);
    if touches && asm.is_solid(g) && !open_lid {
        (Gender::Male, asm.face_panels[g.index()])
    } else {
        (Gender::Plain, None)
    }
}

#[allow(clippy::too_many_lines)]
fn derive_divider_panel(
    graph: &SceneGraph,
    id: PanelId,
    assembly: super::AssemblyId,
    void_id: super::VoidId,
    axis: Axis,
    position: f64,
) -> Result<DerivedPanel> {
    let asm = graph.assembly(assembly)?;
    let t = asm.material.thickness;
    let void = graph.void_node(void_id)?;
    let (u_axis, v_axis) = other_axes(axis);
    let (u0, u1) = void.bounds.range(u_axis);
    let (v0, v1) = void.bounds.range(v_axis);
    let (width, height) = (u1 - u0, v1 - v0);

    let (bottom_g, bottom_m) = divider_side(asm, &void.bounds, v_axis, false);
    let (right_g, right_m) = divider_side(asm, &void.bounds, u_axis, true);
    let (top_g, top_m) = divider_side(asm, &void.bounds, v_axis, true);
    let (left_g, left_m) = divider_side(asm, &void.bounds, u_axis, false);

    let edges = [
        EdgeConfig {
            joint: bottom_g,
            axis: u_axis,
            range: (u0, u1),
            meets: bottom_m,
        },
        EdgeConfig {
            joint: right_g,
            axis: v_axis,
            range: (v0, v1),
            meets: right_m,
        },
        EdgeConfig {
            joint: top_g,
            axis: u_axis,
            range: (u1, u0),
            meets: top_m,
        },
        EdgeConfig {
            joint: left_g,
            axis: v_axis,
            range: (v1, v0),
            meets: left_m,
        },
    ];

    let transform = PanelTransform {
        origin: world_point([(u_axis, u0), (v_axis, v0), (axis, position - t / 2.0)]),
        u: u_axis.unit(),
        v: v_axis.unit(),
        normal: axis.unit(),
    };

    // Cross-lap notches against every divider along a different axis that
    // this one physically crosses. The divider whose axis letter is earlier
    // owns the notch from the "top" (third-axis maximum) side.
    let mut notches = Vec::new();
    for (other_id, other) in graph.panels.iter() {
        if other_id == id {
            continue;
        }
        let PanelKind::Divider {
            assembly: other_asm,
            void_id: other_void,
            axis: b,
            position: p2,
        } = other.kind
        else {
            continue;
        };
        if other_asm != assembly || b == axis {
            continue;
        }
        let other_bounds = graph.void_node(other_void)?.bounds;

        let (b_lo, b_hi) = void.bounds.range(b);
        if p2 <= b_lo + TOUCH_EPS || p2 >= b_hi - TOUCH_EPS {
            continue;
        }
        let (a2_lo, a2_hi) = other_bounds.range(axis);
        if position <= a2_lo + TOUCH_EPS || position >= a2_hi - TOUCH_EPS {
            continue;
        }

        let c = third_axis(axis, b);
        let (c_lo, c_hi) = void.bounds.range(c);
        let (c2_lo, c2_hi) = other_bounds.range(c);
        let (ov_lo, ov_hi) = (c_lo.max(c2_lo), c_hi.min(c2_hi));
        if ov_hi - ov_lo < TOUCH_EPS {
            continue;
        }
        let mid = 0.5 * (ov_lo + ov_hi);
        let owns_top = axis < b;

        if b == u_axis {
            // Notch interval along local x; the cut comes from a horizontal edge.
            let (x0, x1) = (p2 - t / 2.0 - u0, p2 + t / 2.0 - u0);
            if owns_top {
                notches.push(EdgeNotch {
                    edge: Edge::Top,
                    start: width - x1,
                    end: width - x0,
                    depth: v1 - mid,
                });
            } else {
                notches.push(EdgeNotch {
                    edge: Edge::Bottom,
                    start: x0,
                    end: x1,
                    depth: mid - v0,
                });
            }
        } else {
            // Notch interval along local y; the cut comes from a vertical edge.
            let (y0, y1) = (p2 - t / 2.0 - v0, p2 + t / 2.0 - v0);
            if owns_top {
                notches.push(EdgeNotch {
                    edge: Edge::Right,
                    start: y0,
                    end: y1,
                    depth: u1 - mid,
                });
            } else {
                notches.push(EdgeNotch {
                    edge: Edge::Left,
                    start: height - y1,
                    end: height - y0,
                    depth: mid - u0,
                });
            }
        }
    }

    let panel = graph.panel(id)?;
    let holes = panel.cutouts.clone();
    finish(graph, id, width, height, edges, transform, holes, notches)
}

/// Shared tail of panel derivation: outline build and corner analysis.
#[allow(clippy::too_many_arguments)]
fn finish(
    graph: &SceneGraph,
    id: PanelId,
    width: f64,
    height: f64,
    edges: [EdgeConfig; 4],
    transform: PanelTransform,
    holes: Vec<Hole>,
    notches: Vec<EdgeNotch>,
) -> Result<DerivedPanel> {
    let panel = graph.panel(id)?;
    let asm = graph.assembly(panel.kind.assembly())?;
    let fps = axis_finger_points(asm);

    let statuses = [0, 1, 2, 3].map(|i| edges[i].joint.status());
    let fully_open = [0, 1, 2, 3]
        .map(|i| edges[i].joint == Gender::Plain && panel.custom_edges[i].is_none());

    let outline_edges = [0, 1, 2, 3].map(|i| OutlineEdge {
        joint: edges[i].joint,
        finger_points: &fps[match edges[i].axis {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }],
        range: edges[i].range,
        extension: panel.extensions[i],
        custom: panel.custom_edges[i].as_deref(),
    });

    let outline = OutlineBuilder::new(
        width,
        height,
        asm.material.thickness,
        outline_edges,
        panel.fillets,
        &notches,
        &holes,
    )
    .execute()?;

    let corners =
        CornerEligibility::new().analyze(&outline, width, height, &statuses, &fully_open);

    Ok(DerivedPanel {
        width,
        height,
        edges,
        statuses,
        fully_open,
        transform,
        holes,
        notches,
        outline,
        corners,
    })
}
