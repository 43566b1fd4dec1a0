//! Panel-overlap validator.
//!
//! Two panels may touch (mating joints do, everywhere) but must never share
//! material volume. Candidate pairs are found with world-space bounding
//! boxes; a candidate is confirmed by sampling the shared box and testing
//! each sample against both panels' outlines and material slabs. Samples
//! keep a fabrication-tolerance margin from every surface, so touching
//! geometry never reports.

use tracing::debug;

use crate::math::polygon_2d::{point_in_polygon_2d, point_loop_distance_2d};
use crate::math::{Point2, Point3, FAB_TOLERANCE};
use crate::scene::{PanelView, Snapshot};

use super::{panel_label, CheckReport, Diagnostic};

/// Sample grid resolution per axis of a candidate box.
const SAMPLES_PER_AXIS: usize = 8;

struct PanelSolid<'a> {
    view: PanelView<'a>,
    thickness: f64,
    aabb: (Point3, Point3),
}

/// Checks every panel pair in the scene for volumetric overlap.
#[must_use]
pub fn check_overlaps(snapshot: &Snapshot<'_>) -> CheckReport {
    let mut solids = Vec::new();
    for view in snapshot.panels() {
        let Ok(material) = snapshot.material_of(view.id) else {
            continue;
        };
        solids.push(PanelSolid {
            aabb: world_aabb(&view, material.thickness),
            view,
            thickness: material.thickness,
        });
    }

    let mut diagnostics = Vec::new();
    let mut checked = 0;
    for i in 0..solids.len() {
        for j in i + 1..solids.len() {
            checked += 1;
            let a = &solids[i];
            let b = &solids[j];
            let Some(shared) = aabb_intersection(&a.aabb, &b.aabb) else {
                continue;
            };
            if let Some(point) = find_shared_material(a, b, &shared) {
                diagnostics.push(Diagnostic::error(
                    "overlap-volume",
                    format!(
                        "{} and {} share material near ({:.2}, {:.2}, {:.2})",
                        panel_label(&a.view),
                        panel_label(&b.view),
                        point.x,
                        point.y,
                        point.z
                    ),
                ));
            }
        }
    }
    debug!(checked, findings = diagnostics.len(), "overlap check");
    CheckReport::from_diagnostics(diagnostics, checked)
}

/// World bounding box over the outline at both slab surfaces.
fn world_aabb(view: &PanelView<'_>, thickness: f64) -> (Point3, Point3) {
    let mut lo = Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY);
    let mut hi = Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY);
    for p in &view.derived.outline.outer {
        for z in [0.0, thickness] {
            let w = view.derived.transform.to_world(&Point3::new(p.x, p.y, z));
            lo = Point3::new(lo.x.min(w.x), lo.y.min(w.y), lo.z.min(w.z));
            hi = Point3::new(hi.x.max(w.x), hi.y.max(w.y), hi.z.max(w.z));
        }
    }
    (lo, hi)
}

/// Intersection box, `None` when the boxes only touch or miss entirely.
fn aabb_intersection(a: &(Point3, Point3), b: &(Point3, Point3)) -> Option<(Point3, Point3)> {
    let lo = Point3::new(a.0.x.max(b.0.x), a.0.y.max(b.0.y), a.0.z.max(b.0.z));
    let hi = Point3::new(a.1.x.min(b.1.x), a.1.y.min(b.1.y), a.1.z.min(b.1.z));
    if hi.x - lo.x > FAB_TOLERANCE && hi.y - lo.y > FAB_TOLERANCE && hi.z - lo.z > FAB_TOLERANCE {
        Some((lo, hi))
    } else {
        None
    }
}

/// Samples the candidate box for a point inside both panels' material.
#[allow(clippy::cast_precision_loss)]
fn find_shared_material(
    a: &PanelSolid<'_>,
    b: &PanelSolid<'_>,
    shared: &(Point3, Point3),
) -> Option<Point3> {
    let (lo, hi) = shared;
    let step = |axis_lo: f64, axis_hi: f64, k: usize| {
        axis_lo + (k as f64 + 0.5) / SAMPLES_PER_AXIS as f64 * (axis_hi - axis_lo)
    };
    for kx in 0..SAMPLES_PER_AXIS {
        for ky in 0..SAMPLES_PER_AXIS {
            for kz in 0..SAMPLES_PER_AXIS {
                let point = Point3::new(
                    step(lo.x, hi.x, kx),
                    step(lo.y, hi.y, ky),
                    step(lo.z, hi.z, kz),
                );
                if contains_material(a, &point) && contains_material(b, &point) {
                    return Some(point);
                }
            }
        }
    }
    None
}

/// Whether a world point lies strictly inside a panel's material, keeping a
/// fabrication-tolerance margin from every surface.
fn contains_material(solid: &PanelSolid<'_>, world: &Point3) -> bool {
    let local = solid.view.derived.transform.to_local(world);
    if local.z < FAB_TOLERANCE || local.z > solid.thickness - FAB_TOLERANCE {
        return false;
    }
    let p = Point2::new(local.x, local.y);
    let outline = &solid.view.derived.outline;
    if !point_in_polygon_2d(&p, &outline.outer) {
        return false;
    }
    if point_loop_distance_2d(&p, &outline.outer) < FAB_TOLERANCE {
        return false;
    }
    for hole in &outline.holes {
        if point_in_polygon_2d(&p, hole) || point_loop_distance_2d(&p, hole) < FAB_TOLERANCE {
            return false;
        }
    }
    true
}
