//! 2D arc math for corner fillets and circular cutouts.
//!
//! Bulge convention: `bulge = tan(sweep_angle / 4)`.
//! - `bulge = 0`: straight line
//! - `bulge > 0`: counter-clockwise arc
//! - `bulge < 0`: clockwise arc
//! - `|bulge| = 1`: semicircle
use std::f64::consts::PI;

use super::Point2;

/// Converts a bulge-defined arc segment to center-radius-angle form.
///
/// Returns `(cx, cy, radius, start_angle, sweep_angle)`. Degenerate
/// (zero-length) chords yield a zero-radius result.
#[must_use]
pub fn arc_from_bulge(x0: f64, y0: f64, x1: f64, y1: f64, bulge: f64) -> (f64, f64, f64, f64, f64) {
    let dx = x1 - x0;
    let dy = y1 - y0;
    let chord_len = (dx * dx + dy * dy).sqrt();

    if chord_len < 1e-12 || bulge.abs() < 1e-12 {
        return (x0, y0, 0.0, 0.0, 0.0);
    }

    // Distance from chord midpoint to center.
    let sagitta_ratio = (1.0 - bulge * bulge) / (2.0 * bulge);
    let mx = (x0 + x1) * 0.5;
    let my = (y0 + y1) * 0.5;

    // Normal to chord pointing toward center (for positive bulge, center is left of chord).
    let nx = -dy / chord_len;
    let ny = dx / chord_len;

    let cx = mx + sagitta_ratio * (chord_len * 0.5) * nx;
    let cy = my + sagitta_ratio * (chord_len * 0.5) * ny;

    // r = d*(1+b²)/(4*|b|) derived from r = d/(2*sin(θ/2)) with θ=4*atan(b)
    let radius = (chord_len * 0.5) * (1.0 + bulge * bulge) / (2.0 * bulge.abs());

    let start_angle = (y0 - cy).atan2(x0 - cx);
    let sweep = 4.0 * bulge.atan();

    // Normalize sweep to [-2π, 2π] range.
    let sweep = if sweep > 2.0 * PI {
        sweep - 2.0 * PI
    } else if sweep < -2.0 * PI {
        sweep + 2.0 * PI
    } else {
        sweep
    };

    (cx, cy, radius, start_angle, sweep)
}

/// Evaluates a point on an arc at parameter `t` in `[0, 1]`.
#[must_use]
pub fn arc_point_at(
    cx: f64,
    cy: f64,
    radius: f64,
    start_angle: f64,
    sweep: f64,
    t: f64,
) -> (f64, f64) {
    let angle = start_angle + sweep * t;
    (cx + radius * angle.cos(), cy + radius * angle.sin())
}

/// Computes the number of line segments needed to approximate an arc
/// within the given chord tolerance.
#[must_use]
pub fn arc_subdivision_count(radius: f64, abs_sweep: f64, tolerance: f64) -> u32 {
    if radius < 1e-12 || abs_sweep < 1e-12 || tolerance <= 0.0 {
        return 1;
    }
    // From the sagitta formula: sagitta = r * (1 - cos(θ/2))
    // For a given tolerance: θ = 2 * acos(1 - tolerance/r)
    let max_angle = if tolerance >= radius {
        PI
    } else {
        2.0 * (1.0 - tolerance / radius).acos()
    };
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let n = (abs_sweep / max_angle).ceil() as u32;
    n.max(1)
}

/// Tessellates a bulge-defined arc from `(x0, y0)` to `(x1, y1)` into
/// intermediate points, excluding both endpoints.
///
/// `tolerance` controls the maximum deviation between the arc and its
/// chord approximation.
#[must_use]
pub fn tessellate_bulge_arc(
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
    bulge: f64,
    tolerance: f64,
) -> Vec<Point2> {
    let (cx, cy, radius, start_angle, sweep) = arc_from_bulge(x0, y0, x1, y1, bulge);
    if radius < 1e-12 {
        return Vec::new();
    }
    let n_sub = arc_subdivision_count(radius, sweep.abs(), tolerance);
    let mut points = Vec::with_capacity(n_sub as usize);
    for j in 1..n_sub {
        let t = f64::from(j) / f64::from(n_sub);
        let (px, py) = arc_point_at(cx, cy, radius, start_angle, sweep, t);
        points.push(Point2::new(px, py));
    }
    points
}

/// Tessellates a full circle centered at `(cx, cy)` into a closed point loop.
///
/// `ccw` selects the winding; hole loops want clockwise. The first point sits
/// at angle 0 and the loop is left open (the last point is not a repeat of
/// the first).
#[must_use]
pub fn tessellate_circle(cx: f64, cy: f64, radius: f64, tolerance: f64, ccw: bool) -> Vec<Point2> {
    if radius < 1e-12 {
        return Vec::new();
    }
    let n = arc_subdivision_count(radius, 2.0 * PI, tolerance).max(8);
    let sign = if ccw { 1.0 } else { -1.0 };
    let mut points = Vec::with_capacity(n as usize);
    for j in 0..n {
        let angle = sign * 2.0 * PI * f64::from(j) / f64::from(n);
        points.push(Point2::new(
            cx + radius * angle.cos(),
            cy + radius * angle.sin(),
        ));
    }
    points
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-10;

    #[test]
    fn semicircle_ccw() {
        // CCW semicircle from (0,0) to (2,0), bulge=1.
        // Center at (1,0), radius=1, sweep=+π, through the bottom.
        let (cx, cy, r, sa, sw) = arc_from_bulge(0.0, 0.0, 2.0, 0.0, 1.0);
        assert!((cx - 1.0).abs() < TOL, "cx={cx}");
        assert!(cy.abs() < TOL, "cy={cy}");
        assert!((r - 1.0).abs() < TOL, "r={r}");
        assert!((sw - PI).abs() < TOL, "sweep={sw}");

        let pm = arc_point_at(cx, cy, r, sa, sw, 0.5);
        assert!((pm.0 - 1.0).abs() < TOL, "pm.x={}", pm.0);
        assert!((pm.1 + 1.0).abs() < TOL, "pm.y={}", pm.1);
    }

    #[test]
    fn quarter_arc_tessellation_stays_on_circle() {
        // Quarter circle from (1,0) to (0,1), center origin, bulge=tan(π/8).
        let bulge = (PI / 8.0).tan();
        let pts = tessellate_bulge_arc(1.0, 0.0, 0.0, 1.0, bulge, 1e-4);
        assert!(pts.len() >= 2, "expected intermediate points, got {}", pts.len());
        for p in &pts {
            let r = (p.x * p.x + p.y * p.y).sqrt();
            assert!((r - 1.0).abs() < 1e-9, "off-circle point at r={r}");
        }
    }

    #[test]
    fn degenerate_chord_yields_no_points() {
        let pts = tessellate_bulge_arc(1.0, 1.0, 1.0, 1.0, 0.5, 1e-3);
        assert!(pts.is_empty());
    }

    #[test]
    fn circle_winding() {
        let ccw = tessellate_circle(0.0, 0.0, 2.0, 1e-3, true);
        let cw = tessellate_circle(0.0, 0.0, 2.0, 1e-3, false);
        assert_eq!(ccw.len(), cw.len());
        // Second CCW point has positive y, second CW point negative y.
        assert!(ccw[1].y > 0.0);
        assert!(cw[1].y < 0.0);
    }
}
