use crate::math::{Axis, Point3};

use super::{AssemblyId, PanelId, VoidId};

/// Axis-aligned bounds of a void region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
    pub h: f64,
    pub d: f64,
}

impl Bounds3 {
    #[must_use]
    pub fn new(x: f64, y: f64, z: f64, w: f64, h: f64, d: f64) -> Self {
        Self { x, y, z, w, h, d }
    }

    /// Minimum corner.
    #[must_use]
    pub fn min(&self) -> Point3 {
        Point3::new(self.x, self.y, self.z)
    }

    /// Maximum corner.
    #[must_use]
    pub fn max(&self) -> Point3 {
        Point3::new(self.x + self.w, self.y + self.h, self.z + self.d)
    }

    /// `(min, max)` range along one axis.
    #[must_use]
    pub fn range(&self, axis: Axis) -> (f64, f64) {
        match axis {
            Axis::X => (self.x, self.x + self.w),
            Axis::Y => (self.y, self.y + self.h),
            Axis::Z => (self.z, self.z + self.d),
        }
    }

    /// Extent along one axis.
    #[must_use]
    pub fn extent(&self, axis: Axis) -> f64 {
        let (lo, hi) = self.range(axis);
        hi - lo
    }

    /// Returns a copy with the range along `axis` replaced.
    #[must_use]
    pub fn with_range(&self, axis: Axis, lo: f64, hi: f64) -> Self {
        let mut out = *self;
        match axis {
            Axis::X => {
                out.x = lo;
                out.w = hi - lo;
            }
            Axis::Y => {
                out.y = lo;
                out.h = hi - lo;
            }
            Axis::Z => {
                out.z = lo;
                out.d = hi - lo;
            }
        }
        out
    }

    /// Returns a copy shrunk by `amount` on all six sides.
    #[must_use]
    pub fn shrunk(&self, amount: f64) -> Self {
        Self {
            x: self.x + amount,
            y: self.y + amount,
            z: self.z + amount,
            w: self.w - 2.0 * amount,
            h: self.h - 2.0 * amount,
            d: self.d - 2.0 * amount,
        }
    }

    /// Whether all three extents are strictly positive.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.w > 0.0 && self.h > 0.0 && self.d > 0.0
    }
}

/// Subdivision record of a split void.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitInfo {
    pub axis: Axis,
    /// Ascending absolute split positions, strictly inside the void bounds.
    pub positions: Vec<f64>,
}

/// Grid subdivision record: two crossing split axes.
#[derive(Debug, Clone, PartialEq)]
pub struct GridInfo {
    pub primary: SplitInfo,
    pub secondary: SplitInfo,
}

/// A void: an empty region of the box, possibly subdivided by dividers or
/// hosting a nested sub-assembly.
///
/// Invariant: `children` bounds exactly partition this void's bounds along
/// the split axis, with half a divider thickness removed on each side of
/// every cut.
#[derive(Debug, Clone)]
pub struct VoidData {
    pub bounds: Bounds3,
    pub assembly: AssemblyId,
    pub parent: Option<VoidId>,
    pub children: Vec<VoidId>,
    pub split: Option<SplitInfo>,
    pub grid: Option<GridInfo>,
    /// Divider panels created by this void's subdivision.
    pub dividers: Vec<PanelId>,
    pub sub_assembly: Option<AssemblyId>,
    pub stamp: u64,
}

impl VoidData {
    /// A fresh leaf void.
    #[must_use]
    pub fn leaf(bounds: Bounds3, assembly: AssemblyId, parent: Option<VoidId>) -> Self {
        Self {
            bounds,
            assembly,
            parent,
            children: Vec::new(),
            split: None,
            grid: None,
            dividers: Vec::new(),
            sub_assembly: None,
            stamp: 0,
        }
    }

    /// Whether this void has no subdivision and no sub-assembly.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty() && self.sub_assembly.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_and_extent() {
        let b = Bounds3::new(1.0, 2.0, 3.0, 10.0, 20.0, 30.0);
        assert_eq!(b.range(Axis::X), (1.0, 11.0));
        assert_eq!(b.range(Axis::Z), (3.0, 33.0));
        assert!((b.extent(Axis::Y) - 20.0).abs() < 1e-12);
    }

    #[test]
    fn shrunk_can_go_degenerate() {
        let b = Bounds3::new(0.0, 0.0, 0.0, 10.0, 10.0, 10.0);
        assert!(b.shrunk(4.0).is_positive());
        assert!(!b.shrunk(5.0).is_positive());
    }

    #[test]
    fn with_range_replaces_one_axis() {
        let b = Bounds3::new(0.0, 0.0, 0.0, 10.0, 10.0, 10.0);
        let c = b.with_range(Axis::Y, 2.0, 6.0);
        assert_eq!(c.range(Axis::Y), (2.0, 6.0));
        assert_eq!(c.range(Axis::X), (0.0, 10.0));
    }
}
