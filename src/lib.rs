pub mod check;
pub mod corner;
pub mod error;
pub mod joint;
pub mod math;
pub mod outline;
pub mod scene;

pub use error::{KerfboxError, Result};
