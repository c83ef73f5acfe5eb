//! Controllable orifice valve with yield-stress blocking and attenuation.
//!
//! The flow law is the incompressible orifice equation applied to the part
//! of the pressure differential that survives a Bingham-like yield
//! threshold: below `4*L*tau0/D` (or the configured minimum differential)
//! the valve conducts exactly no flow. Water-based control fluids with
//! gelling additives show this dead-band on long umbilical runs, and the
//! same mechanism doubles as a mechanical cracking-pressure model.

use crate::common::{check_finite, flow_direction};
use crate::error::{ComponentError, ComponentResult};
use serde::{Deserialize, Serialize};

/// Orifice valve parameters.
///
/// Geometric and stress parameters must be non-negative; the opening is
/// clamped to `[min_opening, max_opening]` before use.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrificeValveParams {
    pub name: String,
    /// Discharge coefficient (dimensionless, typically 0.6-0.9)
    pub cd: f64,
    /// Reference orifice area (m^2), scaled by the normalized opening
    pub area_m2: f64,
    pub min_opening: f64,
    pub max_opening: f64,
    /// Minimum pressure differential before any flow (Pa)
    pub min_delta_p_pa: f64,
    /// Fluid yield stress tau0 (Pa); 0 disables the yield threshold
    pub yield_stress_pa: f64,
    /// Hydraulic diameter of the flow path (m)
    pub hydraulic_diameter_m: f64,
    /// Equivalent length of the flow path (m)
    pub equivalent_length_m: f64,
    /// Fraction of the ideal orifice flow actually transmitted, in [0, 1]
    pub transmission_gain: f64,
    /// Inertia/dissipation ratio lambda in the attenuation exponent, > 0
    pub inertia_dissipation_ratio: f64,
    /// Attenuation coefficient alpha; 0 disables attenuation
    pub attenuation_alpha: f64,
    pub allow_reverse_flow: bool,
    /// Extra gain applied to reverse flow when permitted
    pub reverse_flow_gain: f64,
}

impl OrificeValveParams {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

impl Default for OrificeValveParams {
    fn default() -> Self {
        Self {
            name: String::new(),
            cd: 0.62,
            area_m2: 1e-4,
            min_opening: 0.0,
            max_opening: 1.0,
            min_delta_p_pa: 0.0,
            yield_stress_pa: 0.0,
            hydraulic_diameter_m: 0.01,
            equivalent_length_m: 1.0,
            transmission_gain: 1.0,
            inertia_dissipation_ratio: 1.0,
            attenuation_alpha: 0.0,
            allow_reverse_flow: false,
            reverse_flow_gain: 1.0,
        }
    }
}

/// Controllable orifice valve.
#[derive(Debug, Clone)]
pub struct OrificeValve {
    p: OrificeValveParams,
}

impl OrificeValve {
    /// Validate parameters and build the valve.
    pub fn new(params: OrificeValveParams) -> ComponentResult<Self> {
        for (value, what) in [
            (params.cd, "cd"),
            (params.area_m2, "area_m2"),
            (params.yield_stress_pa, "yield_stress_pa"),
            (params.min_delta_p_pa, "min_delta_p_pa"),
            (params.hydraulic_diameter_m, "hydraulic_diameter_m"),
            (params.equivalent_length_m, "equivalent_length_m"),
        ] {
            check_finite(value, what)?;
        }
        if params.cd <= 0.0 {
            return Err(ComponentError::NonPhysical {
                what: "cd must be positive",
            });
        }
        if params.area_m2 < 0.0 {
            return Err(ComponentError::NonPhysical {
                what: "area_m2 must be non-negative",
            });
        }
        if !(0.0..=1.0).contains(&params.min_opening)
            || !(0.0..=1.0).contains(&params.max_opening)
            || params.min_opening > params.max_opening
        {
            return Err(ComponentError::InvalidArg {
                what: "opening bounds must satisfy 0 <= min <= max <= 1",
            });
        }
        if params.min_delta_p_pa < 0.0
            || params.yield_stress_pa < 0.0
            || params.hydraulic_diameter_m < 0.0
            || params.equivalent_length_m < 0.0
        {
            return Err(ComponentError::NonPhysical {
                what: "geometric and stress parameters must be non-negative",
            });
        }
        if !(0.0..=1.0).contains(&params.transmission_gain) {
            return Err(ComponentError::InvalidArg {
                what: "transmission_gain must lie in [0, 1]",
            });
        }
        if params.inertia_dissipation_ratio <= 0.0 {
            return Err(ComponentError::NonPhysical {
                what: "inertia_dissipation_ratio must be positive",
            });
        }
        if params.reverse_flow_gain < 0.0 {
            return Err(ComponentError::NonPhysical {
                what: "reverse_flow_gain must be non-negative",
            });
        }
        Ok(Self { p: params })
    }

    pub fn params(&self) -> &OrificeValveParams {
        &self.p
    }

    pub fn name(&self) -> &str {
        &self.p.name
    }

    /// Yield-threshold differential `4 * L * tau0 / D`.
    ///
    /// Infinite when the yield stress is set but the path has no hydraulic
    /// diameter: such a valve never conducts.
    fn yield_threshold_pa(&self) -> f64 {
        if self.p.yield_stress_pa <= 0.0 {
            return 0.0;
        }
        if self.p.hydraulic_diameter_m <= 0.0 {
            return f64::INFINITY;
        }
        4.0 * self.p.equivalent_length_m * self.p.yield_stress_pa / self.p.hydraulic_diameter_m
    }

    /// Exponential attenuation factor `exp(-alpha * (tau0/tau_wall) / lambda)`.
    ///
    /// `tau_wall` is evaluated at the unthresholded differential magnitude.
    fn attenuation(&self, dp_mag_pa: f64) -> f64 {
        if self.p.attenuation_alpha <= 0.0 || self.p.yield_stress_pa <= 0.0 {
            return 1.0;
        }
        let tau_wall =
            self.p.hydraulic_diameter_m * dp_mag_pa / (4.0 * self.p.equivalent_length_m);
        if tau_wall <= 0.0 {
            return 0.0;
        }
        (-self.p.attenuation_alpha * (self.p.yield_stress_pa / tau_wall)
            / self.p.inertia_dissipation_ratio)
            .exp()
    }

    /// Signed volumetric flow (m^3/s) through the valve.
    ///
    /// Positive flow runs upstream -> downstream. Zero differential, zero
    /// effective area, or a differential below the yield threshold all give
    /// exactly zero; the function is total (no NaN or division-by-zero
    /// paths), which the integrator's repeated-call contract relies on.
    pub fn flow_m3s(&self, p_up_pa: f64, p_dn_pa: f64, rho: f64, opening: f64) -> f64 {
        if rho <= 0.0 {
            return 0.0;
        }
        let opening = opening.clamp(self.p.min_opening, self.p.max_opening);

        let mut dp_raw = p_up_pa - p_dn_pa;
        if !self.p.allow_reverse_flow {
            dp_raw = dp_raw.max(0.0);
        }
        let direction = flow_direction(dp_raw);
        if direction == 0.0 {
            return 0.0;
        }
        let dp_mag = dp_raw.abs();

        let threshold = self.yield_threshold_pa().max(self.p.min_delta_p_pa);
        let dp_eff = (dp_mag - threshold).max(0.0);
        let a_eff = self.p.area_m2 * opening;
        if dp_eff <= 0.0 || a_eff <= 0.0 {
            return 0.0;
        }

        let base = self.p.cd * a_eff * (2.0 * dp_eff / rho).sqrt();

        let mut gain = self.p.transmission_gain;
        if direction < 0.0 {
            gain *= self.p.reverse_flow_gain;
        }

        direction * gain * self.attenuation(dp_mag) * base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const RHO: f64 = 1000.0;

    fn plain_valve() -> OrificeValve {
        OrificeValve::new(OrificeValveParams::named("test")).unwrap()
    }

    #[test]
    fn zero_flow_equal_pressure_and_closed() {
        let v = plain_valve();
        assert_eq!(v.flow_m3s(2e7, 2e7, RHO, 1.0), 0.0);
        assert_eq!(v.flow_m3s(2e7, 1e5, RHO, 0.0), 0.0);
    }

    #[test]
    fn zero_flow_zero_area() {
        let v = OrificeValve::new(OrificeValveParams {
            area_m2: 0.0,
            ..OrificeValveParams::named("no-area")
        })
        .unwrap();
        assert_eq!(v.flow_m3s(2e7, 1e5, RHO, 1.0), 0.0);
    }

    #[test]
    fn forward_flow_positive() {
        let v = plain_valve();
        let q = v.flow_m3s(2e7, 1e5, RHO, 1.0);
        assert!(q > 0.0);
        assert!(q.is_finite());
    }

    #[test]
    fn reverse_flow_blocked_by_default() {
        let v = plain_valve();
        assert_eq!(v.flow_m3s(1e5, 2e7, RHO, 1.0), 0.0);
    }

    #[test]
    fn reverse_flow_when_allowed_with_gain() {
        let v = OrificeValve::new(OrificeValveParams {
            allow_reverse_flow: true,
            reverse_flow_gain: 0.5,
            ..OrificeValveParams::named("rev")
        })
        .unwrap();
        let fwd = v.flow_m3s(2e7, 1e5, RHO, 1.0);
        let rev = v.flow_m3s(1e5, 2e7, RHO, 1.0);
        assert!(rev < 0.0);
        assert!((rev.abs() - 0.5 * fwd).abs() < 1e-12);
    }

    #[test]
    fn yield_threshold_blocks_small_differentials() {
        // 4*L*tau0/D = 4 * 1.0 * 50.0 / 0.01 = 20 kPa
        let v = OrificeValve::new(OrificeValveParams {
            yield_stress_pa: 50.0,
            ..OrificeValveParams::named("gel")
        })
        .unwrap();
        assert_eq!(v.flow_m3s(1e5 + 19_999.0, 1e5, RHO, 1.0), 0.0);
        assert!(v.flow_m3s(1e5 + 21_000.0, 1e5, RHO, 1.0) > 0.0);
    }

    #[test]
    fn min_delta_p_acts_as_threshold_floor() {
        let v = OrificeValve::new(OrificeValveParams {
            min_delta_p_pa: 5_000.0,
            ..OrificeValveParams::named("deadband")
        })
        .unwrap();
        assert_eq!(v.flow_m3s(1e5 + 4_000.0, 1e5, RHO, 1.0), 0.0);
        assert!(v.flow_m3s(1e5 + 6_000.0, 1e5, RHO, 1.0) > 0.0);
    }

    #[test]
    fn attenuation_reduces_flow() {
        let base = OrificeValveParams {
            yield_stress_pa: 10.0,
            ..OrificeValveParams::named("att")
        };
        let plain = OrificeValve::new(base.clone()).unwrap();
        let attenuated = OrificeValve::new(OrificeValveParams {
            attenuation_alpha: 2.0,
            ..base
        })
        .unwrap();
        let q0 = plain.flow_m3s(2e7, 1e5, RHO, 1.0);
        let q1 = attenuated.flow_m3s(2e7, 1e5, RHO, 1.0);
        assert!(q1 > 0.0);
        assert!(q1 < q0);
    }

    #[test]
    fn transmission_gain_scales_flow() {
        let full = plain_valve();
        let half = OrificeValve::new(OrificeValveParams {
            transmission_gain: 0.5,
            ..OrificeValveParams::named("half")
        })
        .unwrap();
        let q_full = full.flow_m3s(2e7, 1e5, RHO, 1.0);
        let q_half = half.flow_m3s(2e7, 1e5, RHO, 1.0);
        assert!((q_half - 0.5 * q_full).abs() < 1e-12);
    }

    #[test]
    fn invalid_parameters_rejected() {
        assert!(
            OrificeValve::new(OrificeValveParams {
                cd: 0.0,
                ..OrificeValveParams::named("bad")
            })
            .is_err()
        );
        assert!(
            OrificeValve::new(OrificeValveParams {
                area_m2: -1.0,
                ..OrificeValveParams::named("bad")
            })
            .is_err()
        );
        assert!(
            OrificeValve::new(OrificeValveParams {
                min_opening: 0.8,
                max_opening: 0.2,
                ..OrificeValveParams::named("bad")
            })
            .is_err()
        );
        assert!(
            OrificeValve::new(OrificeValveParams {
                inertia_dissipation_ratio: 0.0,
                ..OrificeValveParams::named("bad")
            })
            .is_err()
        );
    }

    proptest! {
        #[test]
        fn flow_monotone_in_opening(
            o1 in 0.0f64..1.0,
            o2 in 0.0f64..1.0,
            dp in 1.0f64..5e7,
        ) {
            let v = plain_valve();
            let (lo, hi) = if o1 <= o2 { (o1, o2) } else { (o2, o1) };
            let q_lo = v.flow_m3s(1e5 + dp, 1e5, RHO, lo);
            let q_hi = v.flow_m3s(1e5 + dp, 1e5, RHO, hi);
            prop_assert!(q_hi >= q_lo);
        }

        #[test]
        fn flow_monotone_in_differential(
            dp1 in 0.0f64..5e7,
            dp2 in 0.0f64..5e7,
        ) {
            let v = OrificeValve::new(OrificeValveParams {
                yield_stress_pa: 50.0,
                attenuation_alpha: 1.0,
                ..OrificeValveParams::named("prop")
            })
            .unwrap();
            let (lo, hi) = if dp1 <= dp2 { (dp1, dp2) } else { (dp2, dp1) };
            let q_lo = v.flow_m3s(1e5 + lo, 1e5, RHO, 1.0);
            let q_hi = v.flow_m3s(1e5 + hi, 1e5, RHO, 1.0);
            prop_assert!(q_hi >= q_lo);
        }

        #[test]
        fn no_reverse_flow_when_disallowed(
            p_up in 0.0f64..5e7,
            p_dn in 0.0f64..5e7,
            opening in 0.0f64..1.0,
        ) {
            let v = plain_valve();
            prop_assert!(v.flow_m3s(p_up, p_dn, RHO, opening) >= 0.0);
        }
    }
}
