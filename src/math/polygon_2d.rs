use super::{Point2, Vector2, TOLERANCE};

/// Computes the signed area of a 2D polygon (shoelace formula).
///
/// Positive for counter-clockwise, negative for clockwise.
#[must_use]
pub fn signed_area_2d(points: &[Point2]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        sum += points[i].x * points[j].y - points[j].x * points[i].y;
    }
    sum * 0.5
}

/// Reverses the loop in place if its winding does not match `ccw`.
///
/// Returns `true` if the loop was reversed.
pub fn enforce_winding(points: &mut [Point2], ccw: bool) -> bool {
    let area = signed_area_2d(points);
    if (ccw && area < 0.0) || (!ccw && area > 0.0) {
        points.reverse();
        return true;
    }
    false
}

/// Even-odd point-in-polygon test.
///
/// Casts a ray in +x and counts edge crossings; odd count means inside.
/// Points on the boundary may classify either way — callers that care use
/// their own tolerance band around edges.
#[must_use]
pub fn point_in_polygon_2d(point: &Point2, polygon: &[Point2]) -> bool {
    let n = polygon.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let pi = &polygon[i];
        let pj = &polygon[j];
        if (pi.y > point.y) != (pj.y > point.y) {
            let x_cross = pj.x + (point.y - pj.y) / (pi.y - pj.y) * (pi.x - pj.x);
            if point.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Returns the right-pointing normal of a direction vector.
///
/// For a CCW outer boundary walk this points away from the polygon
/// interior, which is the "outward" direction of a panel edge.
#[must_use]
pub fn right_normal(dir: Vector2) -> Vector2 {
    Vector2::new(dir.y, -dir.x)
}

/// Minimum distance from `p` to the segment `a → b`.
#[must_use]
pub fn point_segment_distance_2d(p: &Point2, a: &Point2, b: &Point2) -> f64 {
    let d = b - a;
    let len_sq = d.norm_squared();
    if len_sq < TOLERANCE * TOLERANCE {
        return (p - a).norm();
    }
    let t = ((p - a).dot(&d) / len_sq).clamp(0.0, 1.0);
    (p - (a + d * t)).norm()
}

/// Minimum distance from `p` to the boundary of a closed loop.
#[must_use]
pub fn point_loop_distance_2d(p: &Point2, polygon: &[Point2]) -> f64 {
    let n = polygon.len();
    let mut best = f64::INFINITY;
    for i in 0..n {
        let d = point_segment_distance_2d(p, &polygon[i], &polygon[(i + 1) % n]);
        best = best.min(d);
    }
    best
}

/// Interior angle at `corner` between the rays toward `prev` and `next`.
///
/// `arccos` of the dot product of the two normalized rays, in `[0, π]`.
/// Degenerate rays (zero length) yield 0.
#[must_use]
pub fn interior_angle(prev: &Point2, corner: &Point2, next: &Point2) -> f64 {
    let u = prev - corner;
    let v = next - corner;
    let lu = u.norm();
    let lv = v.norm();
    if lu < TOLERANCE || lv < TOLERANCE {
        return 0.0;
    }
    (u.dot(&v) / (lu * lv)).clamp(-1.0, 1.0).acos()
}
