use thiserror::Error;

use crate::math::Axis;

/// Top-level error type for the kerfbox geometry kernel.
#[derive(Debug, Error)]
pub enum KerfboxError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Scene(#[from] SceneError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

/// Errors related to geometric computations.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("degenerate geometry: {0}")]
    Degenerate(String),
}

/// Errors related to the scene graph structure.
///
/// `Corrupt` signals an internal invariant violation (a kernel bug,
/// not bad input) and is logged at error level where it is raised.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("node not found: {0}")]
    NodeNotFound(&'static str),

    #[error("scene graph corrupt: {0}")]
    Corrupt(String),
}

/// Errors returned by `dispatch` for invalid action input.
///
/// The scene graph is left unmodified whenever one of these is returned.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("subdivision position {position} is invalid on axis {axis:?}: {reason}")]
    InvalidPosition {
        axis: Axis,
        position: f64,
        reason: &'static str,
    },

    #[error("void is not a leaf and cannot be subdivided")]
    NotALeaf,

    #[error("void has no subdivision to remove")]
    NoSubdivision,

    #[error("sub-assembly clearance {clearance} leaves non-positive interior")]
    ClearanceTooLarge { clearance: f64 },

    #[error("fillet radius {radius} exceeds maximum {max} at corner {corner}")]
    FilletRadiusTooLarge { corner: usize, radius: f64, max: f64 },

    #[error("corner {corner} is not eligible for a fillet")]
    CornerNotEligible { corner: usize },

    #[error("edge cannot be extended: {0}")]
    EdgeNotExtendable(&'static str),

    #[error(transparent)]
    Scene(#[from] SceneError),
}

/// Convenience type alias for results using [`KerfboxError`].
pub type Result<T> = std::result::Result<T, KerfboxError>;
