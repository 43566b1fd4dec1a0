//! Cut-path validator.
//!
//! Confirms that every panel outline is machine-ready: positive-area CCW
//! outer loop, CW holes, no zero-length segments, and nothing diagonal
//! outside fillet arcs. Every generated segment is axis-aligned or on a
//! declared arc, so anything else is an error.

use tracing::debug;

use crate::math::polygon_2d::signed_area_2d;
use crate::math::{Point2, TOLERANCE};
use crate::scene::Snapshot;

use super::{panel_label, CheckReport, Diagnostic};

/// Segments shorter than this are degenerate.
const MIN_SEGMENT: f64 = 1e-9;

/// Validates the cut paths of every panel in the scene.
#[must_use]
pub fn check_paths(snapshot: &Snapshot<'_>) -> CheckReport {
    let mut diagnostics = Vec::new();
    let mut checked = 0;
    for view in snapshot.panels() {
        let label = panel_label(&view);
        let outline = &view.derived.outline;

        if signed_area_2d(&outline.outer) <= TOLERANCE {
            diagnostics.push(Diagnostic::error(
                "path-winding",
                format!("{label}: outer boundary is not a positive-area CCW loop"),
            ));
        }
        for (h, hole) in outline.holes.iter().enumerate() {
            if signed_area_2d(hole) >= -TOLERANCE {
                diagnostics.push(Diagnostic::error(
                    "path-winding",
                    format!("{label}: hole {h} is not a negative-area CW loop"),
                ));
            }
        }

        let n = outline.outer.len();
        for i in 0..n {
            checked += 1;
            let a = outline.outer[i];
            let b = outline.outer[(i + 1) % n];
            if (b - a).norm() < MIN_SEGMENT {
                diagnostics.push(Diagnostic::error(
                    "path-degenerate",
                    format!("{label}: zero-length segment at point {i}"),
                ));
                continue;
            }
            if !axis_aligned(&a, &b) && !outline.segment_on_arc(i) {
                diagnostics.push(Diagnostic::error(
                    "path-diagonal",
                    format!(
                        "{label}: diagonal segment ({:.2}, {:.2}) -> ({:.2}, {:.2}) outside any arc",
                        a.x, a.y, b.x, b.y
                    ),
                ));
            }
        }
        for hole in &outline.holes {
            let m = hole.len();
            for i in 0..m {
                checked += 1;
                let a = hole[i];
                let b = hole[(i + 1) % m];
                if (b - a).norm() < MIN_SEGMENT {
                    diagnostics.push(Diagnostic::error(
                        "path-degenerate",
                        format!("{label}: zero-length hole segment at point {i}"),
                    ));
                }
            }
        }
    }
    debug!(checked, findings = diagnostics.len(), "path check");
    CheckReport::from_diagnostics(diagnostics, checked)
}

fn axis_aligned(a: &Point2, b: &Point2) -> bool {
    (b.x - a.x).abs() < TOLERANCE || (b.y - a.y).abs() < TOLERANCE
}
