//! Edge-extension validator.
//!
//! Extensions are stored per edge and rendered into the outline at
//! derivation time; structural mutations (a wall appearing next to an
//! extended edge, say) can leave a stored extension that no longer makes
//! sense. This validator re-judges every nonzero extension against the
//! current derived state.

use tracing::debug;

use crate::joint::{EdgeStatus, Gender};
use crate::math::polygon_2d::right_normal;
use crate::math::{Point2, FAB_TOLERANCE};
use crate::scene::{Edge, PanelView, Snapshot};

use super::{panel_label, CheckReport, Diagnostic};

/// Extensions smaller than this are treated as unset.
const EXTENSION_EPS: f64 = 0.001;

/// Validates every nonzero edge extension in the scene.
#[must_use]
pub fn check_extensions(snapshot: &Snapshot<'_>) -> CheckReport {
    let mut diagnostics = Vec::new();
    let mut checked = 0;
    for view in snapshot.panels() {
        for edge in Edge::ALL {
            let value = view.data.extensions[edge.index()];
            if value.abs() <= EXTENSION_EPS {
                continue;
            }
            checked += 1;
            check_edge(snapshot, &view, edge, value, &mut diagnostics);
        }
    }
    debug!(checked, findings = diagnostics.len(), "extension check");
    CheckReport::from_diagnostics(diagnostics, checked)
}

fn check_edge(
    snapshot: &Snapshot<'_>,
    view: &PanelView<'_>,
    edge: Edge,
    value: f64,
    out: &mut Vec<Diagnostic>,
) {
    let label = panel_label(view);
    let derived = view.derived;
    let idx = edge.index();

    // A male-jointed edge must never carry an extension; the tabs are part
    // of a mating pair and cannot move.
    if derived.statuses[idx] == EdgeStatus::Locked {
        out.push(Diagnostic::error(
            "extension-eligibility",
            format!("{label}: edge {edge:?} is locked by male tabs but carries an extension"),
        ));
        return;
    }

    let Ok(material) = snapshot.material_of(view.id) else {
        return;
    };

    // The rendered cap must be a straight full-width segment, inset one
    // thickness per male-jointed adjacent edge.
    let (a, b) = edge.corners(derived.width, derived.height);
    let dir = (b - a).normalize();
    let outward = right_normal(dir);
    let (s0, s1) = derived.outline.edge_spans[idx];
    let last = derived.outline.outer.len().saturating_sub(1);
    let span_points = &derived.outline.outer[s0.min(last)..=s1.min(last)];
    let cap: Vec<Point2> = span_points
        .iter()
        .copied()
        .filter(|p| ((p - a).dot(&outward) - value).abs() < FAB_TOLERANCE)
        .collect();

    let mut expected = (b - a).norm();
    for adjacent in [edge.prev(), edge.next()] {
        if derived.edges[adjacent.index()].joint == Gender::Male {
            expected -= material.thickness;
        }
    }
    let along = |p: &Point2| (p - a).dot(&dir);
    let cap_span = match cap.len() {
        0 | 1 => 0.0,
        _ => {
            let lo = cap.iter().map(|p| along(p)).fold(f64::INFINITY, f64::min);
            let hi = cap
                .iter()
                .map(|p| along(p))
                .fold(f64::NEG_INFINITY, f64::max);
            hi - lo
        }
    };
    if (cap_span - expected).abs() > FAB_TOLERANCE {
        out.push(Diagnostic::error(
            "extension-full-width",
            format!(
                "{label}: edge {edge:?} extension cap spans {cap_span:.3}, expected {expected:.3}"
            ),
        ));
    }

    // The far edge of an extension is always a plain cut; more than two
    // points at the cap offset means joint geometry survived out there.
    if cap.len() > 2 {
        out.push(Diagnostic::warning(
            "extension-far-edge",
            format!("{label}: edge {edge:?} extension still carries geometry at its far edge"),
        ));
    }

    // Two panels both extending toward a shared corner will claim the same
    // material; flag the pair from whichever side runs first.
    for adjacent in [edge.prev(), edge.next()] {
        let Some(other_id) = derived.edges[adjacent.index()].meets else {
            continue;
        };
        let Ok(other) = snapshot.panel(other_id) else {
            continue;
        };
        if other
            .data
            .extensions
            .iter()
            .any(|v| v.abs() > EXTENSION_EPS)
        {
            out.push(Diagnostic::warning(
                "extension-corner-ownership",
                format!(
                    "{label}: edge {edge:?} and {} both extend near a shared corner",
                    panel_label(&other)
                ),
            ));
        }
    }

    // An extension reaching past the adjacent joint's first finger leaves a
    // thin blade of material alongside the mating panel.
    for adjacent in [edge.prev(), edge.next()] {
        let config = &derived.edges[adjacent.index()];
        if config.joint == Gender::Plain {
            continue;
        }
        let Ok(fp) = snapshot.finger_points(view.data.kind.assembly(), config.axis) else {
            continue;
        };
        if fp.points.is_empty() {
            continue;
        }
        let limit = fp.inner_offset + material.finger_width + material.thickness;
        if value.abs() > limit {
            out.push(Diagnostic::warning(
                "extension-long-fingers",
                format!(
                    "{label}: edge {edge:?} extension {value:.1} reaches past the first finger \
                     of its {adjacent:?} joint (limit {limit:.1})"
                ),
            ));
            break;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::scene::{Action, Face, MaterialConfig, SceneGraph};

    fn box_graph() -> SceneGraph {
        SceneGraph::new(100.0, 80.0, 60.0, MaterialConfig::default()).unwrap()
    }

    #[test]
    fn no_extensions_means_nothing_checked() {
        let mut graph = box_graph();
        let snapshot = graph.snapshot().unwrap();
        let report = check_extensions(&snapshot);
        assert!(report.valid);
        assert_eq!(report.checked, 0);
    }

    #[test]
    fn legal_extension_passes() {
        let mut graph = box_graph();
        let root = graph.root();
        let bottom = graph.assembly(root).unwrap().face_panels[Face::Bottom.index()].unwrap();
        graph
            .dispatch(Action::ToggleFace {
                assembly: root,
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
        let report = check_extensions(&snapshot);
        assert!(report.valid, "{:?}", report.errors);
        assert_eq!(report.checked, 1);
        assert!(report.warnings.is_empty(), "{:?}", report.warnings);
    }

    #[test]
    fn extension_locked_by_returning_wall_is_an_error() {
        let mut graph = box_graph();
        let root = graph.root();
        let bottom = graph.assembly(root).unwrap().face_panels[Face::Bottom.index()].unwrap();
        // Extend while the edge is open, then bring the wall back: the
        // stored extension now sits on a male edge.
        graph
            .dispatch(Action::ToggleFace {
                assembly: root,
                face: Face::Front,
            })
            .unwrap();
        graph
            .dispatch(Action::SetEdgeExtension {
                panel: bottom,
                edge: Edge::Bottom,
                value: 5.0,
            })
            .unwrap();
        let snapshot = graph
            .dispatch(Action::ToggleFace {
                assembly: root,
                face: Face::Front,
            })
            .unwrap();
        let report = check_extensions(&snapshot);
        assert!(!report.valid);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].rule, "extension-eligibility");
    }

    #[test]
    fn long_extension_past_first_finger_warns() {
        let mut graph = box_graph();
        let root = graph.root();
        let bottom = graph.assembly(root).unwrap().face_panels[Face::Bottom.index()].unwrap();
        graph
            .dispatch(Action::ToggleFace {
                assembly: root,
                face: Face::Front,
            })
            .unwrap();
        // Adjacent joints run on the Z layout: margin 5, so the first
        // finger ends 5 + 10 + 3 = 18mm out. 25mm reaches past it.
        let snapshot = graph
            .dispatch(Action::SetEdgeExtension {
                panel: bottom,
                edge: Edge::Bottom,
                value: 25.0,
            })
            .unwrap();
        let report = check_extensions(&snapshot);
        assert!(report.valid, "{:?}", report.errors);
        assert_eq!(report.warnings.len(), 1, "{:?}", report.warnings);
        assert_eq!(report.warnings[0].rule, "extension-long-fingers");
    }

    #[test]
    fn both_sides_extending_warns_on_ownership() {
        let mut graph = box_graph();
        let root = graph.root();
        let asm = graph.assembly(root).unwrap();
        let bottom = asm.face_panels[Face::Bottom.index()].unwrap();
        let left = asm.face_panels[Face::Left.index()].unwrap();
        graph
            .dispatch(Action::ToggleFace {
                assembly: root,
                face: Face::Front,
            })
            .unwrap();
        graph
            .dispatch(Action::SetEdgeExtension {
                panel: bottom,
                edge: Edge::Bottom,
                value: 5.0,
            })
            .unwrap();
        // The left wall's front edge opens too once Front is gone.
        let snapshot = graph
            .dispatch(Action::SetEdgeExtension {
                panel: left,
                edge: Edge::Bottom,
                value: 5.0,
            })
            .unwrap();
        let report = check_extensions(&snapshot);
        assert!(report.valid, "{:?}", report.errors);
        assert!(report
            .warnings
            .iter()
            .any(|d| d.rule == "extension-corner-ownership"));
    }
}
