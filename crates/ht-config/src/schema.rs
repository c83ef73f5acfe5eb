//! Scenario configuration schema.
//!
//! Field names follow the survey/commissioning JSON files these configs are
//! transcribed from: pressures in psi, volumes in gallons/liters, bores in
//! inches. Conversion to SI happens when a network is built, not here, so a
//! config round-trips byte-stable through serde.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SystemConfig {
    pub meta: Meta,
    pub fluid: FluidDef,
    pub accumulators: BTreeMap<String, AccumulatorDef>,
    pub valves: BTreeMap<String, ValveDef>,
    pub actuators: BTreeMap<String, ActuatorDef>,
    #[serde(default)]
    pub hydraulics: HydraulicsDef,
    #[serde(default)]
    pub fault_runtime: FaultRuntime,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Meta {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FluidDef {
    /// Density (kg/m^3)
    pub rho: f64,
    /// Liquid bulk modulus (Pa)
    pub bulk_modulus: f64,
    /// Entrained free-gas volume fraction, [0, 0.95)
    #[serde(default)]
    pub gas_volume_fraction: f64,
    /// Yield stress of the control fluid (Pa); valves inherit this unless
    /// they carry their own value
    #[serde(default)]
    pub yield_stress_pa: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AccumulatorDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_precharge_psi: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_volume_l: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fluid_volume_l: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polytropic_n: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ValveDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cd: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area_m2: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_delta_p_pa: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yield_stress_pa: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hydraulic_diameter_m: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equivalent_length_m: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transmission_gain: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inertia_dissipation_ratio: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attenuation_alpha: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_reverse_flow: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reverse_flow_gain: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ActuatorDef {
    /// Coulomb seal friction (N); seal-degradation faults add to it
    #[serde(default)]
    pub friction_coulomb_n: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closing_volume_gal: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bore_in: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
}

/// Lumped node volumes, compliances, and supply pressures.
///
/// Everything optional: un-surveyed rigs fall back to the calibratable
/// defaults below at network-build time.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HydraulicsDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub v_acc_eff_m3: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub v_act_m3: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub v_acc_line_m3: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub v_act_line_m3: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acc_structure_compliance_m3_per_pa: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub act_structure_compliance_m3_per_pa: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_resistance_pa_s_per_m3: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hp_supply_pressure_psi: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lp_supply_pressure_psi: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_pressure_psi: Option<f64>,
}

/// Default equivalent compressible volume of the accumulator node (m^3).
pub const DEFAULT_V_ACC_EFF_M3: f64 = 0.02;
/// Default actuator node volume (m^3).
pub const DEFAULT_V_ACT_M3: f64 = 0.005;
/// Default supply pressures (psi).
pub const DEFAULT_HP_SUPPLY_PSI: f64 = 3500.0;
pub const DEFAULT_LP_SUPPLY_PSI: f64 = 1500.0;
pub const DEFAULT_RETURN_PSI: f64 = 14.7;

/// Runtime fault overlay, written by fault injection rather than surveys.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FaultRuntime {
    /// Effective leak discharge area at the actuator node (m^2)
    #[serde(default)]
    pub cda_leak_m2: f64,
}

impl SystemConfig {
    /// First valve in name order, the conventional directional-valve slot.
    pub fn first_valve(&self) -> Option<(&str, &ValveDef)> {
        self.valves.iter().next().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hydraulics_section_defaults_to_empty() {
        let json = r#"{
            "meta": {"name": "x"},
            "fluid": {"rho": 1000.0, "bulk_modulus": 1.4e9},
            "accumulators": {"a": {}},
            "valves": {"v": {}},
            "actuators": {"act": {}}
        }"#;
        let cfg: SystemConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.hydraulics, HydraulicsDef::default());
        assert!(cfg.hydraulics.v_acc_eff_m3.is_none());
    }

    #[test]
    fn first_valve_is_name_ordered() {
        let json = r#"{
            "meta": {"name": "x"},
            "fluid": {"rho": 1000.0, "bulk_modulus": 1.4e9},
            "accumulators": {"a": {}},
            "valves": {"zeta": {}, "alpha": {"cd": 0.7}},
            "actuators": {"act": {}}
        }"#;
        let cfg: SystemConfig = serde_json::from_str(json).unwrap();
        let (name, def) = cfg.first_valve().unwrap();
        assert_eq!(name, "alpha");
        assert_eq!(def.cd, Some(0.7));
    }
}
