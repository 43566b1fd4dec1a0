//! The finger-joint path generator.
//!
//! Produces the tab/slot polyline for a single edge segment. The generator
//! is a pure function: every edge along one world axis feeds it the same
//! shared [`FingerPoints`] record, which pins the transition coordinates and
//! makes mating tab/slot patterns interlock.

use super::{FingerPoints, Gender};
use crate::math::{polygon_2d::right_normal, Point2, TOLERANCE};

/// Clip margin for transitions near the covered-range boundary.
const CLIP_EPS: f64 = 1e-9;

/// Generates the finger-joint polyline for one edge.
///
/// `start` and `end` are the edge endpoints in panel-local coordinates;
/// callers walk the outer boundary counter-clockwise, so the right-hand
/// normal of `start → end` points outward. `edge_start_pos` / `edge_end_pos`
/// give the range of the shared axis this edge covers; the range may be
/// reversed (`edge_end_pos < edge_start_pos`) and may be a sub-range of the
/// full finger layout.
///
/// Guarantees:
/// - empty `points` or a `Plain` gender yields exactly `[start, end]`;
/// - otherwise the polyline starts at `start`, ends at `end`, and steps
///   perpendicular by `material_thickness` at each transition inside the
///   covered range. Both genders offset the finger sections — male outward,
///   female inward — so a male tab fills exactly the material a female edge
///   gives up;
/// - transition coordinates along the axis depend only on the shared record,
///   never on gender, so opposite genders align exactly.
#[must_use]
pub fn finger_joint_path(
    start: Point2,
    end: Point2,
    finger_points: &FingerPoints,
    gender: Gender,
    material_thickness: f64,
    edge_start_pos: f64,
    edge_end_pos: f64,
) -> Vec<Point2> {
    let span = edge_end_pos - edge_start_pos;
    if finger_points.points.is_empty()
        || gender == Gender::Plain
        || span.abs() < TOLERANCE
        || material_thickness.abs() < TOLERANCE
    {
        return vec![start, end];
    }

    let dir = end - start;
    let len = dir.norm();
    if len < TOLERANCE {
        return vec![start, end];
    }
    let normal = right_normal(dir / len);

    let reversed = span < 0.0;
    let lo = edge_start_pos.min(edge_end_pos);
    let hi = edge_start_pos.max(edge_end_pos);

    // Transitions strictly inside the covered range, in walk order.
    let mut transitions: Vec<f64> = finger_points
        .points
        .iter()
        .copied()
        .filter(|&p| p > lo + CLIP_EPS && p < hi - CLIP_EPS)
        .collect();
    if reversed {
        transitions.reverse();
    }
    if transitions.is_empty() {
        return vec![start, end];
    }

    // Even axis-section indices are fingers. Male tabs rise there, female
    // slots sink there; gap sections stay on the base line for both.
    let offset_of = |section: usize| -> f64 {
        if section % 2 != 0 {
            return 0.0;
        }
        match gender {
            Gender::Male => material_thickness,
            Gender::Female => -material_thickness,
            Gender::Plain => 0.0,
        }
    };

    let point_at = |axis_pos: f64, offset: f64| -> Point2 {
        let t = (axis_pos - edge_start_pos) / span;
        start + dir * t + normal * offset
    };

    let mut section = finger_points.section_at(edge_start_pos, !reversed);
    let mut out = Vec::with_capacity(2 * transitions.len() + 4);
    out.push(start);

    let start_offset = offset_of(section);
    if start_offset.abs() > TOLERANCE {
        out.push(start + normal * start_offset);
    }

    for &p in &transitions {
        let next_section = if reversed { section - 1 } else { section + 1 };
        let before = offset_of(section);
        let after = offset_of(next_section);
        out.push(point_at(p, before));
        if (before - after).abs() > TOLERANCE {
            out.push(point_at(p, after));
        }
        section = next_section;
    }

    let end_offset = offset_of(section);
    if end_offset.abs() > TOLERANCE {
        out.push(end + normal * end_offset);
    }
    out.push(end);
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-9;

    fn fp_100() -> FingerPoints {
        FingerPoints::for_span(0.0, 100.0, 10.0, 10.0, 3.0)
    }

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    #[test]
    fn empty_points_yields_straight_edge() {
        let path = finger_joint_path(
            p(0.0, 0.0),
            p(100.0, 0.0),
            &FingerPoints::empty(),
            Gender::Male,
            3.0,
            0.0,
            100.0,
        );
        assert_eq!(path, vec![p(0.0, 0.0), p(100.0, 0.0)]);
    }

    #[test]
    fn plain_gender_yields_straight_edge() {
        let path = finger_joint_path(
            p(0.0, 0.0),
            p(100.0, 0.0),
            &fp_100(),
            Gender::Plain,
            3.0,
            0.0,
            100.0,
        );
        assert_eq!(path, vec![p(0.0, 0.0), p(100.0, 0.0)]);
    }

    #[test]
    fn jointed_edge_has_exact_endpoints() {
        let start = p(0.0, 0.0);
        let end = p(100.0, 0.0);
        let path = finger_joint_path(start, end, &fp_100(), Gender::Male, 3.0, 0.0, 100.0);
        assert!(path.len() > 2, "expected steps, got {} points", path.len());
        assert_eq!(path[0], start);
        assert_eq!(*path.last().unwrap(), end);
    }

    #[test]
    fn male_fingers_protrude_outward() {
        // CCW bottom edge of a panel: walk +x, outward normal is -y.
        let path = finger_joint_path(
            p(0.0, 0.0),
            p(100.0, 0.0),
            &fp_100(),
            Gender::Male,
            3.0,
            0.0,
            100.0,
        );
        let min_y = path.iter().map(|q| q.y).fold(f64::INFINITY, f64::min);
        let max_y = path.iter().map(|q| q.y).fold(f64::NEG_INFINITY, f64::max);
        assert!((min_y + 3.0).abs() < TOL, "min_y={min_y}");
        assert!(max_y.abs() < TOL, "max_y={max_y}");
    }

    #[test]
    fn female_slots_indent_inward() {
        let path = finger_joint_path(
            p(0.0, 0.0),
            p(100.0, 0.0),
            &fp_100(),
            Gender::Female,
            3.0,
            0.0,
            100.0,
        );
        let min_y = path.iter().map(|q| q.y).fold(f64::INFINITY, f64::min);
        let max_y = path.iter().map(|q| q.y).fold(f64::NEG_INFINITY, f64::max);
        assert!(min_y.abs() < TOL, "min_y={min_y}");
        assert!((max_y - 3.0).abs() < TOL, "max_y={max_y}");
    }

    #[test]
    fn mating_edges_share_transition_coordinates() {
        // Same record and thickness, opposite gender: the x-coordinates of
        // all perpendicular steps must match exactly. This is the invariant
        // that makes tabs and slots interlock.
        let fp = fp_100();
        let male = finger_joint_path(p(0.0, 0.0), p(100.0, 0.0), &fp, Gender::Male, 3.0, 0.0, 100.0);
        let female =
            finger_joint_path(p(0.0, 0.0), p(100.0, 0.0), &fp, Gender::Female, 3.0, 0.0, 100.0);

        let steps = |path: &[Point2]| -> Vec<f64> {
            path.windows(2)
                .filter(|w| (w[0].x - w[1].x).abs() < TOL && (w[0].y - w[1].y).abs() > TOL)
                .map(|w| w[0].x)
                .collect()
        };
        let male_steps = steps(&male);
        let female_steps = steps(&female);
        // Male steps at the endpoints too (corner tabs); interior transition
        // steps must coincide.
        for fx in &female_steps {
            assert!(
                male_steps.iter().any(|mx| (mx - fx).abs() < TOL),
                "female step at x={fx} has no male counterpart"
            );
        }
    }

    #[test]
    fn reversed_range_mirrors_without_moving_transitions() {
        let fp = fp_100();
        let forward =
            finger_joint_path(p(0.0, 0.0), p(100.0, 0.0), &fp, Gender::Male, 3.0, 0.0, 100.0);
        // Same physical edge walked the other way: start at x=100 covering
        // the range reversed.
        let backward =
            finger_joint_path(p(100.0, 0.0), p(0.0, 0.0), &fp, Gender::Male, 3.0, 100.0, 0.0);

        let mut fwd_x: Vec<f64> = forward.iter().map(|q| q.x).collect();
        let mut bwd_x: Vec<f64> = backward.iter().map(|q| q.x).collect();
        fwd_x.sort_by(f64::total_cmp);
        bwd_x.sort_by(f64::total_cmp);
        assert_eq!(fwd_x.len(), bwd_x.len());
        for (a, b) in fwd_x.iter().zip(&bwd_x) {
            assert!((a - b).abs() < TOL, "transition drift: {a} vs {b}");
        }
    }

    #[test]
    fn sub_range_clips_to_exact_endpoints() {
        // Cover only [30, 70] of the 100mm layout.
        let fp = fp_100();
        let start = p(30.0, 0.0);
        let end = p(70.0, 0.0);
        let path = finger_joint_path(start, end, &fp, Gender::Female, 3.0, 30.0, 70.0);
        assert_eq!(path[0], start);
        assert_eq!(*path.last().unwrap(), end);
        for q in &path {
            assert!(q.x >= 30.0 - TOL && q.x <= 70.0 + TOL, "out of range: {}", q.x);
        }
        // Transitions at 35, 45, 55, 65 fall inside; 15, 25, 75, 85 are
        // clipped. Both range endpoints land mid-finger, so the path also
        // steps perpendicular at x=30 and x=70.
        let step_count = path
            .windows(2)
            .filter(|w| (w[0].x - w[1].x).abs() < TOL)
            .count();
        assert_eq!(step_count, 6, "path: {path:?}");
    }

    #[test]
    fn vertical_edge_offsets_along_x() {
        // CCW right edge: walk +y, outward normal is +x.
        let fp = fp_100();
        let path = finger_joint_path(
            p(50.0, 0.0),
            p(50.0, 100.0),
            &fp,
            Gender::Male,
            3.0,
            0.0,
            100.0,
        );
        let max_x = path.iter().map(|q| q.x).fold(f64::NEG_INFINITY, f64::max);
        assert!((max_x - 53.0).abs() < TOL, "max_x={max_x}");
    }
}
