//! The corner eligibility engine.
//!
//! Decides, for each of a panel's four base-rectangle corners, whether an
//! independent fillet may be applied and how large its radius may safely be.
//! Micro-corners introduced by finger joints are detected and counted but
//! never eligible.

use crate::joint::EdgeStatus;
use crate::math::polygon_2d::interior_angle;
use crate::math::{Point2, TOLERANCE};
use crate::outline::Outline;

/// Angular slack below which a vertex counts as degenerate (radians).
const DEGENERATE_ANGLE: f64 = 0.01;

/// Positional tolerance for matching outline vertices to base corners.
const CORNER_MATCH_TOL: f64 = 1e-6;

/// Eligibility result for one base-rectangle corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CornerInfo {
    /// Base corner index (walk-start corner of the same-indexed edge).
    pub corner: usize,
    pub position: Point2,
    pub eligible: bool,
    /// Maximum safe fillet radius; 0 when ineligible or degenerate.
    pub max_radius: f64,
}

/// Full analysis of one panel's corners.
#[derive(Debug, Clone)]
pub struct CornerReport {
    pub corners: [CornerInfo; 4],
    /// Every detected outline corner, micro-corners included.
    pub total_corners: usize,
}

impl CornerReport {
    /// The eligible base corners.
    pub fn eligible(&self) -> impl Iterator<Item = &CornerInfo> {
        self.corners.iter().filter(|c| c.eligible)
    }
}

/// Computes fillet eligibility and maximum safe radii from an outline and
/// the panel's edge state.
///
/// A corner is eligible only if **both** adjacent edges are fully open: a
/// single open edge is insufficient, because the corner still touches the
/// other jointed edge.
#[derive(Debug, Clone, Copy)]
pub struct CornerEligibility {
    safety_factor: f64,
}

impl Default for CornerEligibility {
    fn default() -> Self {
        Self::new()
    }
}

impl CornerEligibility {
    /// Engine with no safety margin.
    #[must_use]
    pub fn new() -> Self {
        Self { safety_factor: 1.0 }
    }

    /// Engine shrinking every maximum radius by `factor` (clamped to ≤ 1).
    #[must_use]
    pub fn with_safety_factor(factor: f64) -> Self {
        Self {
            safety_factor: factor.clamp(0.0, 1.0),
        }
    }

    /// Analyzes the four base corners of a `width × height` panel.
    ///
    /// `fully_open[i]` states whether edge `i` carries no joint at all;
    /// `statuses[i]` is its derived status. Both adjacent edges must be
    /// open and unlocked for a corner to qualify.
    #[must_use]
    pub fn analyze(
        &self,
        outline: &Outline,
        width: f64,
        height: f64,
        statuses: &[EdgeStatus; 4],
        fully_open: &[bool; 4],
    ) -> CornerReport {
        let base = base_corners(width, height);
        let total_corners = count_corners(&outline.outer);

        let mut corners = [CornerInfo {
            corner: 0,
            position: Point2::new(0.0, 0.0),
            eligible: false,
            max_radius: 0.0,
        }; 4];

        for (k, corner) in corners.iter_mut().enumerate() {
            corner.corner = k;
            corner.position = base[k];

            let edge_in = (k + 3) % 4;
            let edge_out = k;
            let open = fully_open[edge_in]
                && fully_open[edge_out]
                && statuses[edge_in] != EdgeStatus::Locked
                && statuses[edge_out] != EdgeStatus::Locked;
            if !open {
                continue;
            }

            let Some(idx) = find_vertex(&outline.outer, &base[k]) else {
                continue;
            };
            let n = outline.outer.len();
            let prev = outline.outer[(idx + n - 1) % n];
            let next = outline.outer[(idx + 1) % n];
            let here = outline.outer[idx];

            let theta = interior_angle(&prev, &here, &next);
            if theta <= DEGENERATE_ANGLE || theta >= std::f64::consts::PI - DEGENERATE_ANGLE {
                continue;
            }

            let len_in = (here - prev).norm();
            let len_out = (next - here).norm();
            let max_radius = len_in.min(len_out) / (theta / 2.0).tan() * self.safety_factor;
            if max_radius <= TOLERANCE {
                continue;
            }

            corner.eligible = true;
            corner.max_radius = max_radius;
        }

        CornerReport {
            corners,
            total_corners,
        }
    }

    /// Batch variant: every detected outline corner, with base-corner
    /// eligibility further restricted by forbidden margins.
    ///
    /// Corners inside a joint zone — within one `margin` of a jointed
    /// edge's base line — are excluded even when both local edges look
    /// open, since a fillet there would eat into slot interiors.
    #[must_use]
    pub fn analyze_all(
        &self,
        outline: &Outline,
        width: f64,
        height: f64,
        statuses: &[EdgeStatus; 4],
        fully_open: &[bool; 4],
        margin: f64,
    ) -> Vec<CornerInfo> {
        let report = self.analyze(outline, width, height, statuses, fully_open);
        let base = base_corners(width, height);

        let mut out = Vec::new();
        let n = outline.outer.len();
        for idx in 0..n {
            let prev = outline.outer[(idx + n - 1) % n];
            let here = outline.outer[idx];
            let next = outline.outer[(idx + 1) % n];
            let theta = interior_angle(&prev, &here, &next);
            if (std::f64::consts::PI - theta).abs() <= DEGENERATE_ANGLE {
                continue;
            }

            let base_idx = base
                .iter()
                .position(|b| (here - b).norm() < CORNER_MATCH_TOL);
            let info = match base_idx {
                Some(k) => {
                    let mut info = report.corners[k];
                    if info.eligible && in_joint_zone(&here, width, height, fully_open, margin) {
                        info.eligible = false;
                        info.max_radius = 0.0;
                    }
                    info
                }
                None => CornerInfo {
                    corner: usize::MAX,
                    position: here,
                    eligible: false,
                    max_radius: 0.0,
                },
            };
            out.push(info);
        }
        out
    }
}

/// Base corner positions, walk order.
fn base_corners(width: f64, height: f64) -> [Point2; 4] {
    [
        Point2::new(0.0, 0.0),
        Point2::new(width, 0.0),
        Point2::new(width, height),
        Point2::new(0.0, height),
    ]
}

/// Counts outline vertices that actually turn.
fn count_corners(outer: &[Point2]) -> usize {
    let n = outer.len();
    if n < 3 {
        return 0;
    }
    (0..n)
        .filter(|&i| {
            let theta = interior_angle(&outer[(i + n - 1) % n], &outer[i], &outer[(i + 1) % n]);
            (std::f64::consts::PI - theta).abs() > DEGENERATE_ANGLE
        })
        .count()
}

fn find_vertex(outer: &[Point2], target: &Point2) -> Option<usize> {
    outer
        .iter()
        .position(|p| (p - target).norm() < CORNER_MATCH_TOL)
}

/// Whether a point lies within `margin` of any jointed edge's base line.
fn in_joint_zone(
    p: &Point2,
    width: f64,
    height: f64,
    fully_open: &[bool; 4],
    margin: f64,
) -> bool {
    // Edge order: Bottom (y=0), Right (x=width), Top (y=height), Left (x=0).
    let distances = [p.y, width - p.x, height - p.y, p.x];
    distances
        .iter()
        .zip(fully_open.iter())
        .any(|(&dist, &open)| !open && dist.abs() <= margin)
}
