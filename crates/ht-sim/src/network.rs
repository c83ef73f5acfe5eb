//! Two-node lumped hydraulic network: accumulator node -> valve -> actuator
//! node, with optional leak, free-gas-corrected capacitance, and a
//! line-resistance flow limit.

use crate::error::{SimError, SimResult};
use crate::model::TransientModel;
use ht_components::OrificeValve;
use ht_controls::ControlSignal;
use ht_core::numeric::floored;

/// Floor for the liquid bulk modulus (Pa).
const MIN_BULK_MODULUS_PA: f64 = 1e3;
/// Floor for the absolute node pressure in the gas-mixture term (Pa).
const MIN_ABS_PRESSURE_PA: f64 = 1e4;
/// Floor for a node volume (m^3).
const MIN_NODE_VOLUME_M3: f64 = 1e-9;
/// Floor for a node capacitance (m^3/Pa).
const MIN_CAPACITANCE: f64 = 1e-15;

/// Lumped parameters of the two-node model.
#[derive(Debug, Clone)]
pub struct LumpedHydraulicParams {
    /// Fluid density (kg/m^3)
    pub rho: f64,
    /// Liquid bulk modulus (Pa)
    pub bulk_modulus: f64,
    /// Equivalent compressible volume of the accumulator node (m^3)
    pub v_acc_eff_m3: f64,
    /// Actuator node volume (m^3)
    pub v_act_m3: f64,
    pub p_atm_pa: f64,
    /// Leak discharge area at the actuator node (m^2); 0 disables
    pub cda_leak_m2: f64,
    /// Entrained free-gas volume fraction, [0, 0.95)
    pub gas_volume_fraction: f64,
    /// Extra line volume lumped into each node (m^3)
    pub v_acc_line_m3: f64,
    pub v_act_line_m3: f64,
    /// Structural compliance added to each node (m^3/Pa)
    pub acc_structure_compliance_m3_per_pa: f64,
    pub act_structure_compliance_m3_per_pa: f64,
    /// Viscous line resistance saturating the valve flow (Pa.s/m^3); 0 disables
    pub line_resistance_pa_s_per_m3: f64,
}

impl LumpedHydraulicParams {
    /// Parameters with the optional terms zeroed.
    pub fn new(rho: f64, bulk_modulus: f64, v_acc_eff_m3: f64, v_act_m3: f64) -> Self {
        Self {
            rho,
            bulk_modulus,
            v_acc_eff_m3,
            v_act_m3,
            p_atm_pa: 1e5,
            cda_leak_m2: 0.0,
            gas_volume_fraction: 0.0,
            v_acc_line_m3: 0.0,
            v_act_line_m3: 0.0,
            acc_structure_compliance_m3_per_pa: 0.0,
            act_structure_compliance_m3_per_pa: 0.0,
            line_resistance_pa_s_per_m3: 0.0,
        }
    }

    pub fn validate(&self) -> SimResult<()> {
        if self.rho <= 0.0 {
            return Err(SimError::NonPhysical {
                what: "rho must be positive",
            });
        }
        if self.bulk_modulus <= 0.0 {
            return Err(SimError::NonPhysical {
                what: "bulk_modulus must be positive",
            });
        }
        if self.v_acc_eff_m3 <= 0.0 || self.v_act_m3 <= 0.0 {
            return Err(SimError::NonPhysical {
                what: "node volumes must be positive",
            });
        }
        if self.p_atm_pa <= 0.0 {
            return Err(SimError::NonPhysical {
                what: "p_atm_pa must be positive",
            });
        }
        if self.cda_leak_m2 < 0.0
            || self.v_acc_line_m3 < 0.0
            || self.v_act_line_m3 < 0.0
            || self.acc_structure_compliance_m3_per_pa < 0.0
            || self.act_structure_compliance_m3_per_pa < 0.0
            || self.line_resistance_pa_s_per_m3 < 0.0
        {
            return Err(SimError::NonPhysical {
                what: "optional line/leak/compliance terms must be non-negative",
            });
        }
        if !(0.0..0.95).contains(&self.gas_volume_fraction) {
            return Err(SimError::NonPhysical {
                what: "gas_volume_fraction must lie in [0, 0.95)",
            });
        }
        Ok(())
    }
}

/// ODE state: the two node pressures.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HydraulicState {
    pub p_acc_pa: f64,
    pub p_act_pa: f64,
}

impl HydraulicState {
    pub fn new(p_acc_pa: f64, p_act_pa: f64) -> Self {
        Self { p_acc_pa, p_act_pa }
    }

    /// Pressure differential across the valve, accumulator minus actuator.
    pub fn delta_p_pa(&self) -> f64 {
        self.p_acc_pa - self.p_act_pa
    }
}

/// The two-node network. Holds only immutable parameters, the valve, and
/// the opening command; evaluating the derivative mutates nothing.
#[derive(Debug, Clone)]
pub struct HydraulicNetwork<S: ControlSignal> {
    params: LumpedHydraulicParams,
    valve: OrificeValve,
    command: S,
    initial: HydraulicState,
}

impl<S: ControlSignal> HydraulicNetwork<S> {
    pub fn new(params: LumpedHydraulicParams, valve: OrificeValve, command: S) -> SimResult<Self> {
        params.validate()?;
        let initial = HydraulicState::new(params.p_atm_pa, params.p_atm_pa);
        Ok(Self {
            params,
            valve,
            command,
            initial,
        })
    }

    /// Replace the state used by [`TransientModel::initial_state`].
    pub fn with_initial_state(mut self, state: HydraulicState) -> Self {
        self.initial = state;
        self
    }

    pub fn params(&self) -> &LumpedHydraulicParams {
        &self.params
    }

    pub fn valve(&self) -> &OrificeValve {
        &self.valve
    }

    /// Leak flow out of the actuator node (m^3/s); zero with no leak area
    /// or with the node at or below atmospheric.
    pub fn leak_flow_m3s(&self, p_act_pa: f64) -> f64 {
        if self.params.cda_leak_m2 <= 0.0 {
            return 0.0;
        }
        let dp = (p_act_pa - self.params.p_atm_pa).max(0.0);
        if dp <= 0.0 {
            return 0.0;
        }
        self.params.cda_leak_m2 * (2.0 * dp / self.params.rho).sqrt()
    }

    /// Effective bulk modulus with the free-gas mixture correction
    /// `1/beta_eff = (1-phi)/beta_liq + phi/P_abs`.
    ///
    /// Entrained gas softens the fluid dramatically near atmospheric
    /// pressure; at phi = 0 this is the liquid modulus unchanged.
    pub fn effective_bulk_modulus_pa(&self, p_node_pa: f64) -> f64 {
        let beta_liq = self.params.bulk_modulus.max(MIN_BULK_MODULUS_PA);
        let phi = self.params.gas_volume_fraction.clamp(0.0, 0.95);
        if phi <= 0.0 {
            return beta_liq;
        }
        let p_abs = p_node_pa.max(MIN_ABS_PRESSURE_PA);
        let inv = (1.0 - phi) / beta_liq + phi / p_abs;
        1.0 / inv.max(1e-18)
    }

    /// Node fluid capacitance `V/beta_eff + C_structural` (m^3/Pa), floored
    /// to keep the derivatives finite.
    pub fn node_capacitance_m3_per_pa(
        &self,
        node_volume_m3: f64,
        p_node_pa: f64,
        structural_compliance_m3_per_pa: f64,
    ) -> f64 {
        let beta_eff = self.effective_bulk_modulus_pa(p_node_pa);
        let fluid_cap =
            floored(node_volume_m3, MIN_NODE_VOLUME_M3) / floored(beta_eff, MIN_BULK_MODULUS_PA);
        let struct_cap = structural_compliance_m3_per_pa.max(0.0);
        floored(fluid_cap + struct_cap, MIN_CAPACITANCE)
    }

    /// Clip a valve flow to the viscous line limit `|Q| <= |dP| / R_line`.
    pub fn apply_line_resistance_limit(&self, q_m3s: f64, dp_pa: f64) -> f64 {
        let r_line = self.params.line_resistance_pa_s_per_m3;
        if r_line <= 0.0 {
            return q_m3s;
        }
        let q_limit = dp_pa.abs() / r_line;
        q_m3s.signum() * q_m3s.abs().min(q_limit)
    }

    /// Capacitances of both nodes at the given state.
    pub fn capacitances(&self, state: &HydraulicState) -> (f64, f64) {
        let c_acc = self.node_capacitance_m3_per_pa(
            self.params.v_acc_eff_m3 + self.params.v_acc_line_m3,
            state.p_acc_pa,
            self.params.acc_structure_compliance_m3_per_pa,
        );
        let c_act = self.node_capacitance_m3_per_pa(
            self.params.v_act_m3 + self.params.v_act_line_m3,
            state.p_act_pa,
            self.params.act_structure_compliance_m3_per_pa,
        );
        (c_acc, c_act)
    }

    /// Node-pressure derivatives at time t.
    pub fn derivative(&self, t: f64, state: &HydraulicState) -> HydraulicState {
        let opening = self.command.opening(t);
        let dp = state.delta_p_pa();

        let q = self
            .valve
            .flow_m3s(state.p_acc_pa, state.p_act_pa, self.params.rho, opening);
        let q = self.apply_line_resistance_limit(q, dp);
        let q_leak = self.leak_flow_m3s(state.p_act_pa);

        let (c_acc, c_act) = self.capacitances(state);

        HydraulicState {
            p_acc_pa: -q / c_acc,
            p_act_pa: (q - q_leak) / c_act,
        }
    }
}

impl<S: ControlSignal> TransientModel for HydraulicNetwork<S> {
    type State = HydraulicState;

    fn initial_state(&self) -> HydraulicState {
        self.initial
    }

    fn rhs(&self, t: f64, x: &HydraulicState) -> SimResult<HydraulicState> {
        Ok(self.derivative(t, x))
    }

    fn add(&self, a: &HydraulicState, b: &HydraulicState) -> HydraulicState {
        HydraulicState {
            p_acc_pa: a.p_acc_pa + b.p_acc_pa,
            p_act_pa: a.p_act_pa + b.p_act_pa,
        }
    }

    fn scale(&self, a: &HydraulicState, k: f64) -> HydraulicState {
        HydraulicState {
            p_acc_pa: a.p_acc_pa * k,
            p_act_pa: a.p_act_pa * k,
        }
    }

    fn norm_inf(&self, a: &HydraulicState) -> f64 {
        a.p_acc_pa.abs().max(a.p_act_pa.abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ht_components::{OrificeValve, OrificeValveParams};
    use ht_controls::CommandProfile;

    fn network(params: LumpedHydraulicParams) -> HydraulicNetwork<CommandProfile> {
        let valve = OrificeValve::new(OrificeValveParams::named("main")).unwrap();
        HydraulicNetwork::new(params, valve, CommandProfile::full_open()).unwrap()
    }

    #[test]
    fn capacitance_positive_even_at_vacuum() {
        let mut params = LumpedHydraulicParams::new(1000.0, 1.4e9, 0.02, 0.005);
        params.gas_volume_fraction = 0.3;
        let net = network(params);
        for p in [0.0, 1.0, 1e5, 2e7] {
            let c = net.node_capacitance_m3_per_pa(0.02, p, 0.0);
            assert!(c > 0.0, "capacitance must stay positive at P = {p}");
        }
    }

    #[test]
    fn no_gas_means_liquid_modulus() {
        let net = network(LumpedHydraulicParams::new(1000.0, 1.4e9, 0.02, 0.005));
        assert_eq!(net.effective_bulk_modulus_pa(2e7), 1.4e9);
    }

    #[test]
    fn free_gas_softens_fluid_near_atmospheric() {
        let mut params = LumpedHydraulicParams::new(1000.0, 1.4e9, 0.02, 0.005);
        params.gas_volume_fraction = 0.05;
        let net = network(params);
        let beta_low = net.effective_bulk_modulus_pa(2e5);
        let beta_high = net.effective_bulk_modulus_pa(2e7);
        assert!(beta_low < beta_high);
        assert!(beta_high < 1.4e9);
    }

    #[test]
    fn leak_zero_below_atmospheric() {
        let mut params = LumpedHydraulicParams::new(1000.0, 1.4e9, 0.02, 0.005);
        params.cda_leak_m2 = 1e-7;
        let net = network(params);
        assert_eq!(net.leak_flow_m3s(0.5e5), 0.0);
        assert_eq!(net.leak_flow_m3s(1e5), 0.0);
        assert!(net.leak_flow_m3s(2e7) > 0.0);
    }

    #[test]
    fn line_resistance_caps_flow() {
        let mut params = LumpedHydraulicParams::new(1000.0, 1.4e9, 0.02, 0.005);
        params.line_resistance_pa_s_per_m3 = 1e9;
        let net = network(params);
        // limit = |dP|/R = 2e7/1e9 = 0.02 m^3/s
        assert_eq!(net.apply_line_resistance_limit(1.0, 2e7), 0.02);
        assert_eq!(net.apply_line_resistance_limit(-1.0, 2e7), -0.02);
        assert_eq!(net.apply_line_resistance_limit(0.01, 2e7), 0.01);
    }

    #[test]
    fn derivative_moves_pressures_toward_each_other() {
        let net = network(LumpedHydraulicParams::new(1000.0, 1.4e9, 0.02, 0.005));
        let state = HydraulicState::new(207e5, 1e5);
        let dxdt = net.derivative(0.0, &state);
        assert!(dxdt.p_acc_pa < 0.0);
        assert!(dxdt.p_act_pa > 0.0);
    }

    #[test]
    fn derivative_is_repeatable() {
        let net = network(LumpedHydraulicParams::new(1000.0, 1.4e9, 0.02, 0.005));
        let state = HydraulicState::new(207e5, 1e5);
        let first = net.derivative(3.0, &state);
        for _ in 0..5 {
            assert_eq!(net.derivative(3.0, &state), first);
        }
    }

    #[test]
    fn invalid_params_rejected() {
        let mut params = LumpedHydraulicParams::new(0.0, 1.4e9, 0.02, 0.005);
        assert!(params.validate().is_err());
        params = LumpedHydraulicParams::new(1000.0, 1.4e9, 0.02, 0.005);
        params.cda_leak_m2 = -1.0;
        assert!(params.validate().is_err());
        params = LumpedHydraulicParams::new(1000.0, 1.4e9, 0.02, 0.005);
        params.gas_volume_fraction = 0.95;
        assert!(params.validate().is_err());
    }
}
