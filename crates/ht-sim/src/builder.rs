//! Assemble networks and accumulator banks from a scenario configuration.

use crate::error::{SimError, SimResult};
use crate::network::{HydraulicNetwork, LumpedHydraulicParams};
use ht_components::{Accumulator, AccumulatorParams, OrificeValve, OrificeValveParams};
use ht_config::{
    DEFAULT_HP_SUPPLY_PSI, DEFAULT_LP_SUPPLY_PSI, DEFAULT_RETURN_PSI, DEFAULT_V_ACC_EFF_M3,
    DEFAULT_V_ACT_M3, FluidDef, FunctionSpec, SystemConfig, ValveDef,
};
use ht_controls::ControlSignal;
use ht_core::units::{liter_to_m3, psi_to_pa};

/// Supply-header pressures resolved from the hydraulics section.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SupplyPressures {
    pub hp_pa: f64,
    pub lp_pa: f64,
    pub return_pa: f64,
}

/// HP/LP/return pressures in Pa, falling back to the catalog defaults.
pub fn supply_pressures_pa(config: &SystemConfig) -> SupplyPressures {
    let hyd = &config.hydraulics;
    SupplyPressures {
        hp_pa: psi_to_pa(hyd.hp_supply_pressure_psi.unwrap_or(DEFAULT_HP_SUPPLY_PSI)),
        lp_pa: psi_to_pa(hyd.lp_supply_pressure_psi.unwrap_or(DEFAULT_LP_SUPPLY_PSI)),
        return_pa: psi_to_pa(hyd.return_pressure_psi.unwrap_or(DEFAULT_RETURN_PSI)),
    }
}

/// Valve parameters from a config entry, with the fluid yield stress as
/// fallback for valves that do not carry their own.
fn valve_params(name: &str, def: &ValveDef, fluid: &FluidDef) -> OrificeValveParams {
    OrificeValveParams {
        name: name.to_string(),
        cd: def.cd.unwrap_or(0.62),
        area_m2: def.area_m2.unwrap_or(1e-4),
        min_delta_p_pa: def.min_delta_p_pa.unwrap_or(0.0),
        yield_stress_pa: def.yield_stress_pa.unwrap_or(fluid.yield_stress_pa),
        hydraulic_diameter_m: def.hydraulic_diameter_m.unwrap_or(0.01),
        equivalent_length_m: def.equivalent_length_m.unwrap_or(1.0),
        transmission_gain: def.transmission_gain.unwrap_or(1.0),
        inertia_dissipation_ratio: def.inertia_dissipation_ratio.unwrap_or(1.0),
        attenuation_alpha: def.attenuation_alpha.unwrap_or(0.0),
        allow_reverse_flow: def.allow_reverse_flow.unwrap_or(false),
        reverse_flow_gain: def.reverse_flow_gain.unwrap_or(1.0),
        ..OrificeValveParams::default()
    }
}

/// Lumped node parameters from the config's fluid/hydraulics/fault sections.
fn lumped_params(config: &SystemConfig) -> LumpedHydraulicParams {
    let hyd = &config.hydraulics;
    let mut params = LumpedHydraulicParams::new(
        config.fluid.rho,
        config.fluid.bulk_modulus,
        hyd.v_acc_eff_m3.unwrap_or(DEFAULT_V_ACC_EFF_M3),
        hyd.v_act_m3.unwrap_or(DEFAULT_V_ACT_M3),
    );
    params.gas_volume_fraction = config.fluid.gas_volume_fraction;
    params.cda_leak_m2 = config.fault_runtime.cda_leak_m2;
    params.v_acc_line_m3 = hyd.v_acc_line_m3.unwrap_or(0.0);
    params.v_act_line_m3 = hyd.v_act_line_m3.unwrap_or(0.0);
    params.acc_structure_compliance_m3_per_pa =
        hyd.acc_structure_compliance_m3_per_pa.unwrap_or(0.0);
    params.act_structure_compliance_m3_per_pa =
        hyd.act_structure_compliance_m3_per_pa.unwrap_or(0.0);
    params.line_resistance_pa_s_per_m3 = hyd.line_resistance_pa_s_per_m3.unwrap_or(0.0);
    params
}

/// Build a network from the configuration's own valve table.
///
/// `valve_name = None` picks the first valve in name order, the
/// conventional directional-valve slot.
pub fn network_from_config<S: ControlSignal>(
    config: &SystemConfig,
    valve_name: Option<&str>,
    command: S,
) -> SimResult<HydraulicNetwork<S>> {
    let (name, def) = match valve_name {
        Some(requested) => {
            let def = config.valves.get(requested).ok_or_else(|| SimError::Missing {
                what: format!("valve '{requested}'"),
            })?;
            (requested, def)
        }
        None => config.first_valve().ok_or_else(|| SimError::Missing {
            what: "a valve entry".to_string(),
        })?,
    };
    let valve = OrificeValve::new(valve_params(name, def, &config.fluid))?;
    HydraulicNetwork::new(lumped_params(config), valve, command)
}

/// Build a network for one catalog function: its actuator volume and
/// effective flow-path area override the survey values.
pub fn network_for_function<S: ControlSignal>(
    config: &SystemConfig,
    function: &FunctionSpec,
    command: S,
) -> SimResult<HydraulicNetwork<S>> {
    let mut params = lumped_params(config);
    params.v_act_m3 = function.v_act_m3;

    let (name, def) = config.first_valve().ok_or_else(|| SimError::Missing {
        what: "a valve entry".to_string(),
    })?;
    let mut vp = valve_params(name, def, &config.fluid);
    vp.name = format!("{}_equivalent", function.name);
    vp.area_m2 = function.valve_area_m2;
    let valve = OrificeValve::new(vp)?;

    HydraulicNetwork::new(params, valve, command)
}

/// Accumulators from the config bank, skipping entries without gas data.
pub fn accumulator_bank(config: &SystemConfig) -> SimResult<Vec<Accumulator>> {
    let mut bank = Vec::new();
    for (name, def) in &config.accumulators {
        let (Some(p0_psi), Some(vg_l)) = (def.gas_precharge_psi, def.gas_volume_l) else {
            continue;
        };
        let params = AccumulatorParams {
            precharge_pa: psi_to_pa(p0_psi),
            gas_volume_m3: liter_to_m3(vg_l),
            polytropic_n: def.polytropic_n.unwrap_or(1.2),
            fluid_volume_m3: def.fluid_volume_l.map(liter_to_m3).unwrap_or(0.0),
            ..AccumulatorParams::named(name.clone())
        };
        bank.push(Accumulator::new(params)?);
    }
    Ok(bank)
}
