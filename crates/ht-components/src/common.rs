//! Common constants and helpers for component calculations.

use crate::error::{ComponentError, ComponentResult};
use ht_core::numeric::ensure_finite;

/// Floor for the gas volume in the polytropic relation (m^3).
pub const MIN_GAS_VOLUME_M3: f64 = 1e-12;

/// Ensure a value is finite, mapping to a component error.
pub fn check_finite(value: f64, what: &'static str) -> ComponentResult<()> {
    ensure_finite(value, what).map_err(|_| ComponentError::NonPhysical { what })?;
    Ok(())
}

/// Flow direction from a signed pressure differential: +1 forward, -1
/// reverse, exactly 0 at zero differential.
pub fn flow_direction(dp_pa: f64) -> f64 {
    if dp_pa > 0.0 {
        1.0
    } else if dp_pa < 0.0 {
        -1.0
    } else {
        0.0
    }
}
