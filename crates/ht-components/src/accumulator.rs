//! Gas-over-fluid accumulator with a polytropic gas spring.
//!
//! Pressure is an algebraic function of the remaining fluid volume, never an
//! integrated state of its own: integrating both would double-count the gas
//! compressibility and let the two states drift apart numerically. Only the
//! fluid volume evolves in time.

use crate::common::MIN_GAS_VOLUME_M3;
use crate::error::{ComponentError, ComponentResult};
use serde::{Deserialize, Serialize};

/// Accumulator parameters.
///
/// The gas follows `P * Vg^n = const` anchored at the precharge point
/// `(precharge_pa, gas_volume_m3)`. Draining fluid expands the gas:
/// `Vg = Vg0 + (Vf0 - Vf)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccumulatorParams {
    pub name: String,
    /// Gas precharge pressure P0 (Pa), > 0
    pub precharge_pa: f64,
    /// Gas volume at precharge Vg0 (m^3), > 0
    pub gas_volume_m3: f64,
    /// Polytropic exponent n, > 0
    pub polytropic_n: f64,
    /// Usable fluid volume at full charge Vf0 (m^3), >= 0
    pub fluid_volume_m3: f64,
    /// Numerical safety clamps on the reported pressure
    pub min_pressure_pa: f64,
    pub max_pressure_pa: f64,
}

impl AccumulatorParams {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

impl Default for AccumulatorParams {
    fn default() -> Self {
        Self {
            name: String::new(),
            precharge_pa: 1e7,
            gas_volume_m3: 0.04,
            polytropic_n: 1.2,
            fluid_volume_m3: 0.0,
            min_pressure_pa: 1e5,
            max_pressure_pa: 1e9,
        }
    }
}

/// Accumulator state advanced by the caller: pressure plus remaining fluid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccumulatorState {
    pub p_pa: f64,
    pub vf_m3: f64,
}

/// Accumulator component.
#[derive(Debug, Clone)]
pub struct Accumulator {
    p: AccumulatorParams,
}

impl Accumulator {
    /// Validate parameters and build the accumulator.
    pub fn new(params: AccumulatorParams) -> ComponentResult<Self> {
        if params.precharge_pa <= 0.0 {
            return Err(ComponentError::NonPhysical {
                what: "precharge_pa must be positive",
            });
        }
        if params.gas_volume_m3 <= 0.0 {
            return Err(ComponentError::NonPhysical {
                what: "gas_volume_m3 must be positive",
            });
        }
        if params.polytropic_n <= 0.0 {
            return Err(ComponentError::NonPhysical {
                what: "polytropic_n must be positive",
            });
        }
        if params.fluid_volume_m3 < 0.0 {
            return Err(ComponentError::NonPhysical {
                what: "fluid_volume_m3 must be non-negative",
            });
        }
        if params.min_pressure_pa <= 0.0 || params.max_pressure_pa <= params.min_pressure_pa {
            return Err(ComponentError::InvalidArg {
                what: "pressure clamps must satisfy 0 < min < max",
            });
        }
        Ok(Self { p: params })
    }

    pub fn params(&self) -> &AccumulatorParams {
        &self.p
    }

    /// Initial state: precharge pressure (worst case) unless a measured
    /// pressure is supplied, full usable fluid volume.
    pub fn initial_state(&self, pressure_pa: Option<f64>) -> AccumulatorState {
        AccumulatorState {
            p_pa: pressure_pa.unwrap_or(self.p.precharge_pa),
            vf_m3: self.p.fluid_volume_m3,
        }
    }

    /// `P = P0 * (Vg0 / Vg)^n`, with Vg floored to avoid the singularity.
    pub fn gas_pressure_from_volume(&self, vg_m3: f64) -> f64 {
        let vg = vg_m3.max(MIN_GAS_VOLUME_M3);
        self.p.precharge_pa * (self.p.gas_volume_m3 / vg).powf(self.p.polytropic_n)
    }

    /// Pressure at a given remaining fluid volume, clamped to the safety
    /// bounds. `Vg = Vg0 + (Vf0 - Vf)`.
    pub fn pressure_from_fluid_volume(&self, vf_m3: f64) -> f64 {
        let vg = self.p.gas_volume_m3 + (self.p.fluid_volume_m3 - vf_m3);
        self.gas_pressure_from_volume(vg)
            .clamp(self.p.min_pressure_pa, self.p.max_pressure_pa)
    }

    /// Fluid-volume derivative and the algebraic node pressure.
    ///
    /// `dVf/dt = q_in - q_out`; the pressure is recomputed from the current
    /// fluid volume rather than integrated.
    pub fn rhs(&self, q_in_m3s: f64, q_out_m3s: f64, state: &AccumulatorState) -> (f64, f64) {
        let dvf_dt = q_in_m3s - q_out_m3s;
        let p = self.pressure_from_fluid_volume(state.vf_m3);
        (dvf_dt, p)
    }
}
