//! Fault variants and their configuration transforms.

use ht_config::SystemConfig;
use serde::{Deserialize, Serialize};

/// A single injectable equipment fault.
///
/// Variants that name a target (valve, actuator) are no-ops when the target
/// is absent from the configuration: a fault campaign generated against one
/// rig layout must not panic against another.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Fault {
    /// External leak at the actuator node, as an effective discharge area.
    Leakage { cda_leak_m2: f64 },
    /// Partial blockage of a named valve: its area is scaled down.
    Clogging { valve: String, area_factor: f64 },
    /// Aerated or degraded fluid: bulk modulus scaled down.
    BulkModulusDrop { factor: f64 },
    /// Nitrogen loss across all accumulator bottles: precharge scaled down.
    PrechargeLoss { factor: f64 },
    /// Seal wear on a named actuator: Coulomb friction increased.
    SealFrictionIncrease {
        actuator: String,
        delta_coulomb_n: f64,
    },
}

impl Fault {
    /// Apply this fault, returning the mutated configuration copy.
    pub fn apply(&self, config: &SystemConfig) -> SystemConfig {
        let mut cfg = config.clone();
        match self {
            Fault::Leakage { cda_leak_m2 } => {
                cfg.fault_runtime.cda_leak_m2 = *cda_leak_m2;
            }
            Fault::Clogging { valve, area_factor } => {
                if let Some(v) = cfg.valves.get_mut(valve) {
                    if let Some(area) = v.area_m2 {
                        v.area_m2 = Some(area * area_factor);
                    }
                }
            }
            Fault::BulkModulusDrop { factor } => {
                cfg.fluid.bulk_modulus *= factor;
            }
            Fault::PrechargeLoss { factor } => {
                for acc in cfg.accumulators.values_mut() {
                    if let Some(p0) = acc.gas_precharge_psi {
                        acc.gas_precharge_psi = Some(p0 * factor);
                    }
                }
            }
            Fault::SealFrictionIncrease {
                actuator,
                delta_coulomb_n,
            } => {
                if let Some(a) = cfg.actuators.get_mut(actuator) {
                    a.friction_coulomb_n += delta_coulomb_n;
                }
            }
        }
        cfg
    }
}

/// Apply a sequence of faults left to right.
pub fn apply_all(config: &SystemConfig, faults: &[Fault]) -> SystemConfig {
    faults
        .iter()
        .fold(config.clone(), |cfg, fault| fault.apply(&cfg))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ht_config::{AccumulatorDef, ActuatorDef, FluidDef, Meta, ValveDef};
    use std::collections::BTreeMap;

    fn healthy() -> SystemConfig {
        let mut accumulators = BTreeMap::new();
        accumulators.insert(
            "bank1".to_string(),
            AccumulatorDef {
                gas_precharge_psi: Some(3000.0),
                ..AccumulatorDef::default()
            },
        );
        let mut valves = BTreeMap::new();
        valves.insert(
            "main".to_string(),
            ValveDef {
                area_m2: Some(1e-4),
                ..ValveDef::default()
            },
        );
        let mut actuators = BTreeMap::new();
        actuators.insert("UA".to_string(), ActuatorDef::default());
        SystemConfig {
            meta: Meta {
                name: "healthy".to_string(),
            },
            fluid: FluidDef {
                rho: 1000.0,
                bulk_modulus: 1.4e9,
                gas_volume_fraction: 0.0,
                yield_stress_pa: 0.0,
            },
            accumulators,
            valves,
            actuators,
            hydraulics: Default::default(),
            fault_runtime: Default::default(),
        }
    }

    #[test]
    fn leakage_sets_runtime_leak_only() {
        let base = healthy();
        let faulted = Fault::Leakage { cda_leak_m2: 1e-7 }.apply(&base);
        assert_eq!(faulted.fault_runtime.cda_leak_m2, 1e-7);
        assert_eq!(base.fault_runtime.cda_leak_m2, 0.0, "input untouched");
    }

    #[test]
    fn clogging_scales_named_valve_area() {
        let faulted = Fault::Clogging {
            valve: "main".to_string(),
            area_factor: 0.5,
        }
        .apply(&healthy());
        assert_eq!(faulted.valves["main"].area_m2, Some(5e-5));
    }

    #[test]
    fn clogging_unknown_valve_is_noop() {
        let base = healthy();
        let faulted = Fault::Clogging {
            valve: "ghost".to_string(),
            area_factor: 0.5,
        }
        .apply(&base);
        assert_eq!(faulted, base);
    }

    #[test]
    fn bulk_modulus_drop_scales_fluid() {
        let faulted = Fault::BulkModulusDrop { factor: 0.8 }.apply(&healthy());
        assert!((faulted.fluid.bulk_modulus - 1.12e9).abs() < 1.0);
    }

    #[test]
    fn precharge_loss_hits_every_bottle_with_a_value() {
        let mut base = healthy();
        base.accumulators
            .insert("bank2".to_string(), AccumulatorDef::default());
        let faulted = Fault::PrechargeLoss { factor: 0.9 }.apply(&base);
        assert_eq!(faulted.accumulators["bank1"].gas_precharge_psi, Some(2700.0));
        assert_eq!(faulted.accumulators["bank2"].gas_precharge_psi, None);
    }

    #[test]
    fn seal_friction_adds() {
        let faulted = Fault::SealFrictionIncrease {
            actuator: "UA".to_string(),
            delta_coulomb_n: 150.0,
        }
        .apply(&healthy());
        assert_eq!(faulted.actuators["UA"].friction_coulomb_n, 150.0);
    }

    #[test]
    fn sequential_application_last_writer_wins() {
        let faulted = apply_all(
            &healthy(),
            &[
                Fault::Leakage { cda_leak_m2: 1e-7 },
                Fault::BulkModulusDrop { factor: 0.8 },
                Fault::Leakage { cda_leak_m2: 5e-7 },
            ],
        );
        assert_eq!(faulted.fault_runtime.cda_leak_m2, 5e-7);
        assert!((faulted.fluid.bulk_modulus - 1.12e9).abs() < 1.0);
    }

    #[test]
    fn faults_round_trip_through_serde() {
        let fault = Fault::Clogging {
            valve: "main".to_string(),
            area_factor: 0.5,
        };
        let json = serde_json::to_string(&fault).unwrap();
        assert!(json.contains(r#""type":"clogging""#));
        let back: Fault = serde_json::from_str(&json).unwrap();
        assert_eq!(back, fault);
    }
}
