//! Configuration validation logic.

use crate::schema::SystemConfig;

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Section must not be empty: {section}")]
    EmptySection { section: &'static str },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: f64,
        reason: &'static str,
    },
}

fn require_positive(field: &str, value: f64) -> Result<(), ValidationError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::InvalidValue {
            field: field.to_string(),
            value,
            reason: "must be positive and finite",
        })
    }
}

fn require_non_negative(field: &str, value: f64) -> Result<(), ValidationError> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::InvalidValue {
            field: field.to_string(),
            value,
            reason: "must be non-negative and finite",
        })
    }
}

pub fn validate_config(config: &SystemConfig) -> Result<(), ValidationError> {
    require_positive("fluid.rho", config.fluid.rho)?;
    require_positive("fluid.bulk_modulus", config.fluid.bulk_modulus)?;
    require_non_negative("fluid.yield_stress_pa", config.fluid.yield_stress_pa)?;
    if !(0.0..0.95).contains(&config.fluid.gas_volume_fraction) {
        return Err(ValidationError::InvalidValue {
            field: "fluid.gas_volume_fraction".to_string(),
            value: config.fluid.gas_volume_fraction,
            reason: "must lie in [0, 0.95)",
        });
    }

    if config.accumulators.is_empty() {
        return Err(ValidationError::EmptySection {
            section: "accumulators",
        });
    }
    if config.valves.is_empty() {
        return Err(ValidationError::EmptySection { section: "valves" });
    }
    if config.actuators.is_empty() {
        return Err(ValidationError::EmptySection {
            section: "actuators",
        });
    }

    for (name, acc) in &config.accumulators {
        if let Some(p0) = acc.gas_precharge_psi {
            require_positive(&format!("accumulators.{name}.gas_precharge_psi"), p0)?;
        }
        if let Some(vg) = acc.gas_volume_l {
            require_positive(&format!("accumulators.{name}.gas_volume_l"), vg)?;
        }
        if let Some(vf) = acc.fluid_volume_l {
            require_non_negative(&format!("accumulators.{name}.fluid_volume_l"), vf)?;
        }
        if let Some(n) = acc.polytropic_n {
            require_positive(&format!("accumulators.{name}.polytropic_n"), n)?;
        }
    }

    for (name, valve) in &config.valves {
        if let Some(cd) = valve.cd {
            require_positive(&format!("valves.{name}.cd"), cd)?;
        }
        if let Some(area) = valve.area_m2 {
            require_non_negative(&format!("valves.{name}.area_m2"), area)?;
        }
        if let Some(tau0) = valve.yield_stress_pa {
            require_non_negative(&format!("valves.{name}.yield_stress_pa"), tau0)?;
        }
    }

    for (name, act) in &config.actuators {
        require_non_negative(
            &format!("actuators.{name}.friction_coulomb_n"),
            act.friction_coulomb_n,
        )?;
        if let Some(bore) = act.bore_in {
            require_positive(&format!("actuators.{name}.bore_in"), bore)?;
        }
    }

    require_non_negative("fault_runtime.cda_leak_m2", config.fault_runtime.cda_leak_m2)?;

    Ok(())
}
