pub mod arc_2d;
pub mod polygon_2d;

/// 2D point type.
pub type Point2 = nalgebra::Point2<f64>;

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 2D vector type.
pub type Vector2 = nalgebra::Vector2<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Tolerance for fabrication-level comparisons (millimetres).
///
/// Validator rules compare physical dimensions at this resolution rather
/// than at [`TOLERANCE`], since laser kerf makes anything finer meaningless.
pub const FAB_TOLERANCE: f64 = 0.01;

/// The three world axes of a box assembly.
///
/// Ordering is alphabetical (`X < Y < Z`); tie-break conventions such as
/// cross-lap notch ownership rely on this derived `Ord`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// All axes in order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Returns the component of a 3D point along this axis.
    #[must_use]
    pub fn of_point(self, p: &Point3) -> f64 {
        match self {
            Axis::X => p.x,
            Axis::Y => p.y,
            Axis::Z => p.z,
        }
    }

    /// Returns the unit vector along this axis.
    #[must_use]
    pub fn unit(self) -> Vector3 {
        match self {
            Axis::X => Vector3::new(1.0, 0.0, 0.0),
            Axis::Y => Vector3::new(0.0, 1.0, 0.0),
            Axis::Z => Vector3::new(0.0, 0.0, 1.0),
        }
    }
}
