//! ht-core: shared numeric primitives, units, and the base error taxonomy
//! for the hydraulic digital-twin workspace.

pub mod error;
pub mod numeric;
pub mod units;

pub use error::{CoreError, CoreResult};
pub use numeric::{Real, Tolerances, ensure_finite, nearly_equal};
