//! The panel outline builder.
//!
//! Composes the four edge paths (finger-jointed, extended, or custom),
//! corner fillet arcs, cross-lap notches, and hole loops into one closed
//! polygon per panel. Output winding is fixed: counter-clockwise outer
//! boundary, clockwise holes, so downstream consumers never re-derive it.

use crate::error::{GeometryError, Result};
use crate::joint::{finger_joint_path, FingerPoints, Gender};
use crate::math::arc_2d::tessellate_bulge_arc;
use crate::math::polygon_2d::{enforce_winding, signed_area_2d};
use crate::math::{arc_2d::tessellate_circle, Point2, Vector2, TOLERANCE};
use crate::scene::panel::{Edge, Hole};

/// Chord tolerance for tessellated fillet arcs and circles.
const ARC_TOLERANCE: f64 = 0.01;

/// Extensions and notch spans smaller than this are ignored.
const GEOM_EPS: f64 = 1e-6;

/// A run of outer-boundary points lying on a fillet arc.
///
/// Segments between `points[start]` and `points[end]` are arc chords; an
/// `end` equal to the point count denotes the wrap back to `points[0]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArcSpan {
    pub start: usize,
    pub end: usize,
}

impl ArcSpan {
    /// Whether the segment starting at point index `i` lies on this arc.
    #[must_use]
    pub fn covers_segment(&self, i: usize) -> bool {
        i >= self.start && i + 1 <= self.end
    }
}

/// A cross-lap notch cut into one edge of the base rectangle.
///
/// `start`/`end` are measured along the edge's walk direction from its
/// walk-start corner; `depth` is measured inward from the base edge line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeNotch {
    pub edge: Edge,
    pub start: f64,
    pub end: f64,
    pub depth: f64,
}

/// A finished panel outline.
#[derive(Debug, Clone, PartialEq)]
pub struct Outline {
    /// Closed outer boundary, counter-clockwise, last point not repeated.
    pub outer: Vec<Point2>,
    /// Hole loops, clockwise.
    pub holes: Vec<Vec<Point2>>,
    /// Outer-boundary runs that belong to fillet arcs.
    pub arcs: Vec<ArcSpan>,
    /// Outer point index range `(first, last)` contributed by each edge,
    /// indexed by [`Edge::index`].
    pub edge_spans: [(usize, usize); 4],
}

impl Outline {
    /// Whether the outer segment starting at point `i` is part of a fillet.
    #[must_use]
    pub fn segment_on_arc(&self, i: usize) -> bool {
        self.arcs.iter().any(|a| a.covers_segment(i))
    }
}

/// Joint resolution for one edge, as consumed by the builder.
#[derive(Debug, Clone)]
pub struct OutlineEdge<'a> {
    pub joint: Gender,
    pub finger_points: &'a FingerPoints,
    /// Covered world-axis range, in walk order.
    pub range: (f64, f64),
    pub extension: f64,
    pub custom: Option<&'a [Point2]>,
}

/// Builds one closed, non-self-intersecting polygon (plus holes) for a panel.
///
/// # Algorithm
///
/// 1. **Phase A**: generate each edge path in the fixed CCW walk order —
///    custom override, extension (plain cap, side segments inset by one
///    thickness per male-jointed adjacent edge), or finger-joint path
/// 2. **Phase B**: splice cross-lap notches into their edges
/// 3. **Phase C**: replace filleted corners with tessellated tangent arcs
///    and assemble the outer loop, recording edge and arc spans
/// 4. **Phase D**: emit hole loops (cutouts, openings) clockwise
#[derive(Debug)]
pub struct OutlineBuilder<'a> {
    width: f64,
    height: f64,
    thickness: f64,
    edges: [OutlineEdge<'a>; 4],
    fillets: [f64; 4],
    notches: &'a [EdgeNotch],
    holes: &'a [Hole],
}

impl<'a> OutlineBuilder<'a> {
    /// Creates a new outline builder for a `width × height` base rectangle.
    #[must_use]
    pub fn new(
        width: f64,
        height: f64,
        thickness: f64,
        edges: [OutlineEdge<'a>; 4],
        fillets: [f64; 4],
        notches: &'a [EdgeNotch],
        holes: &'a [Hole],
    ) -> Self {
        Self {
            width,
            height,
            thickness,
            edges,
            fillets,
            notches,
            holes,
        }
    }

    /// Executes the build.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::Degenerate` if the base rectangle has a
    /// non-positive dimension or the assembled boundary collapses.
    pub fn execute(&self) -> Result<Outline> {
        if self.width <= TOLERANCE || self.height <= TOLERANCE {
            return Err(GeometryError::Degenerate(format!(
                "panel rectangle {}x{} is not positive",
                self.width, self.height
            ))
            .into());
        }

        // Phase A: edge paths.
        let mut paths: [Vec<Point2>; 4] = [const { Vec::new() }; 4];
        for edge in Edge::ALL {
            paths[edge.index()] = self.edge_path(edge);
        }

        // Phase B: notches.
        for notch in self.notches {
            if notch.end - notch.start > GEOM_EPS && notch.depth > GEOM_EPS {
                self.splice_notch(&mut paths[notch.edge.index()], notch);
            }
        }

        // Phase C: fillets + assembly.
        let mut corner_arcs: [Option<Vec<Point2>>; 4] = [const { None }; 4];
        for k in 0..4 {
            if self.fillets[k] > GEOM_EPS {
                corner_arcs[k] = fillet_corner(&mut paths, k, self.fillets[k]);
            }
        }
        let (outer, arcs, edge_spans) = assemble(paths, corner_arcs)?;

        if outer.len() < 3 || signed_area_2d(&outer) <= TOLERANCE {
            return Err(GeometryError::Degenerate(
                "outline collapsed to a non-positive area".to_owned(),
            )
            .into());
        }

        // Phase D: holes, clockwise.
        let mut holes = Vec::with_capacity(self.holes.len());
        for hole in self.holes {
            let mut loop_pts = match *hole {
                Hole::Rect { x, y, w, h } => vec![
                    Point2::new(x, y),
                    Point2::new(x, y + h),
                    Point2::new(x + w, y + h),
                    Point2::new(x + w, y),
                ],
                Hole::Circle { cx, cy, radius } => {
                    tessellate_circle(cx, cy, radius, ARC_TOLERANCE, false)
                }
            };
            if loop_pts.len() >= 3 {
                enforce_winding(&mut loop_pts, false);
                holes.push(loop_pts);
            }
        }

        Ok(Outline {
            outer,
            holes,
            arcs,
            edge_spans,
        })
    }

    /// Generates the path for one edge, walk-start corner to walk-end corner.
    fn edge_path(&self, edge: Edge) -> Vec<Point2> {
        let cfg = &self.edges[edge.index()];
        let (a, b) = edge.corners(self.width, self.height);

        if let Some(custom) = cfg.custom {
            return custom.to_vec();
        }

        if cfg.extension.abs() > GEOM_EPS {
            return self.extension_path(edge, a, b);
        }

        finger_joint_path(
            a,
            b,
            cfg.finger_points,
            cfg.joint,
            self.thickness,
            cfg.range.0,
            cfg.range.1,
        )
    }

    /// An extended edge: perpendicular side segments and a plain straight
    /// cap, never finger-jointed (the far-edge-open rule). Side segments are
    /// inset by one material thickness at each male-jointed adjacent edge,
    /// since that neighbour's tabs protrude past the corner.
    fn extension_path(&self, edge: Edge, a: Point2, b: Point2) -> Vec<Point2> {
        let cfg = &self.edges[edge.index()];
        let d = (b - a).normalize();
        let outward = Vector2::new(d.y, -d.x);
        let e = cfg.extension;

        let inset_a = if self.edges[edge.prev().index()].joint == Gender::Male {
            self.thickness
        } else {
            0.0
        };
        let inset_b = if self.edges[edge.next().index()].joint == Gender::Male {
            self.thickness
        } else {
            0.0
        };

        let mut path = vec![a];
        if inset_a > GEOM_EPS {
            path.push(a + d * inset_a);
        }
        path.push(a + d * inset_a + outward * e);
        path.push(b - d * inset_b + outward * e);
        if inset_b > GEOM_EPS {
            path.push(b - d * inset_b);
        }
        path.push(b);
        path
    }

    /// Splices one notch into an edge path.
    ///
    /// The path's along-edge coordinate is monotonic (perpendicular finger
    /// steps hold it constant), so the notch walls are found by linear
    /// interpolation and everything strictly between them is dropped.
    fn splice_notch(&self, path: &mut Vec<Point2>, notch: &EdgeNotch) {
        let (a, b) = notch.edge.corners(self.width, self.height);
        let d = (b - a).normalize();
        let inward = Vector2::new(-d.y, d.x);

        let along = |p: &Point2| (p - a).dot(&d);
        let entry = interpolate_at(path, &along, notch.start);
        let exit = interpolate_at(path, &along, notch.end);
        let (Some(entry), Some(exit)) = (entry, exit) else {
            return;
        };

        let deep_entry = a + d * notch.start + inward * notch.depth;
        let deep_exit = a + d * notch.end + inward * notch.depth;

        let mut out = Vec::with_capacity(path.len() + 4);
        for p in path.iter() {
            if along(p) < notch.start - GEOM_EPS {
                out.push(*p);
            }
        }
        out.push(entry);
        out.push(deep_entry);
        out.push(deep_exit);
        out.push(exit);
        for p in path.iter() {
            if along(p) > notch.end + GEOM_EPS {
                out.push(*p);
            }
        }
        *path = out;
    }
}

/// Evaluates the path point at a given along-edge coordinate.
fn interpolate_at(
    path: &[Point2],
    along: &impl Fn(&Point2) -> f64,
    target: f64,
) -> Option<Point2> {
    for w in path.windows(2) {
        let s0 = along(&w[0]);
        let s1 = along(&w[1]);
        if s1 - s0 > TOLERANCE && s0 <= target + GEOM_EPS && target <= s1 + GEOM_EPS {
            let t = ((target - s0) / (s1 - s0)).clamp(0.0, 1.0);
            return Some(w[0] + (w[1] - w[0]) * t);
        }
    }
    None
}

/// Trims the two paths meeting at base corner `k` and returns the
/// tessellated fillet arc between the trimmed endpoints.
///
/// Tangent points sit at `radius · tan(θ/2)` from the vertex along each
/// adjacent edge, where θ is the interior angle.
fn fillet_corner(paths: &mut [Vec<Point2>; 4], k: usize, radius: f64) -> Option<Vec<Point2>> {
    let in_idx = (k + 3) % 4;
    let out_idx = k;

    let corner = *paths[out_idx].first()?;
    let before = paths[in_idx].iter().rev().nth(1).copied()?;
    let after = paths[out_idx].get(1).copied()?;

    let d_in = corner - before;
    let d_out = after - corner;
    let (l_in, l_out) = (d_in.norm(), d_out.norm());
    if l_in < TOLERANCE || l_out < TOLERANCE {
        return None;
    }
    let d_in = d_in / l_in;
    let d_out = d_out / l_out;

    let theta = (-d_in).dot(&d_out).clamp(-1.0, 1.0).acos();
    if theta < 0.01 || theta > std::f64::consts::PI - 0.01 {
        return None;
    }
    let setback = radius * (theta / 2.0).tan();
    if setback >= l_in - TOLERANCE || setback >= l_out - TOLERANCE {
        return None;
    }

    let p1 = corner - d_in * setback;
    let p2 = corner + d_out * setback;

    // Turn direction fixes the arc winding; sweep is the exterior angle.
    let cross = d_in.x * d_out.y - d_in.y * d_out.x;
    let sweep = (std::f64::consts::PI - theta) * cross.signum();
    let bulge = (sweep / 4.0).tan();

    if let Some(last) = paths[in_idx].last_mut() {
        *last = p1;
    }
    if let Some(first) = paths[out_idx].first_mut() {
        *first = p2;
    }
    Some(tessellate_bulge_arc(p1.x, p1.y, p2.x, p2.y, bulge, ARC_TOLERANCE))
}

/// Concatenates the four edge paths and corner arcs into the outer loop.
#[allow(clippy::type_complexity)]
fn assemble(
    paths: [Vec<Point2>; 4],
    corner_arcs: [Option<Vec<Point2>>; 4],
) -> Result<(Vec<Point2>, Vec<ArcSpan>, [(usize, usize); 4])> {
    let mut outer: Vec<Point2> = Vec::new();
    let mut arcs = Vec::new();
    let mut edge_spans = [(0usize, 0usize); 4];

    for k in 0..4 {
        if k > 0 {
            if let Some(arc_pts) = &corner_arcs[k] {
                let span_start = outer.len().saturating_sub(1);
                outer.extend_from_slice(arc_pts);
                arcs.push(ArcSpan {
                    start: span_start,
                    end: outer.len(),
                });
            }
        }

        let path = &paths[k];
        if path.is_empty() {
            return Err(GeometryError::Degenerate(format!("edge {k} produced no path")).into());
        }

        // Skip the shared corner point unless a fillet broke the contact.
        let skip_first = k > 0
            && corner_arcs[k].is_none()
            && outer
                .last()
                .is_some_and(|p| (p - path[0]).norm() < TOLERANCE);
        let first = outer.len() - usize::from(skip_first);
        let from = usize::from(skip_first);

        let take = if k == 3 && corner_arcs[0].is_none() {
            // The last edge's end point closes back onto the loop start.
            path.len() - 1
        } else {
            path.len()
        };
        outer.extend_from_slice(&path[from..take]);
        edge_spans[k] = (first, outer.len().saturating_sub(1));
    }

    // A fillet at corner 0 wraps around the loop end.
    if let Some(arc_pts) = &corner_arcs[0] {
        let span_start = outer.len().saturating_sub(1);
        outer.extend_from_slice(arc_pts);
        arcs.push(ArcSpan {
            start: span_start,
            end: outer.len(),
        });
    }

    Ok((outer, arcs, edge_spans))
}
