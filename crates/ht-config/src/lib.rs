//! ht-config: canonical scenario configuration format, validation, and the
//! per-function default catalog.

pub mod catalog;
pub mod schema;
pub mod validate;

pub use catalog::{FunctionSpec, Supply, default_function_catalog};
pub use schema::*;
pub use validate::{ValidationError, validate_config};

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Load a scenario configuration from a JSON file and validate it.
pub fn load_json(path: &std::path::Path) -> ConfigResult<SystemConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: SystemConfig = serde_json::from_str(&content)?;
    validate_config(&config)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_parses_and_validates() {
        let json = r#"{
            "meta": {"name": "rig-a"},
            "fluid": {"rho": 1000.0, "bulk_modulus": 1.4e9},
            "accumulators": {"bank1": {"gas_precharge_psi": 3000.0, "gas_volume_l": 40.0}},
            "valves": {"directional_main": {"cd": 0.62, "area_m2": 1e-4}},
            "actuators": {"UA": {"closing_volume_gal": 17.98}}
        }"#;
        let cfg: SystemConfig = serde_json::from_str(json).unwrap();
        validate_config(&cfg).unwrap();
        assert_eq!(cfg.meta.name, "rig-a");
        assert_eq!(cfg.fluid.gas_volume_fraction, 0.0);
        assert_eq!(cfg.fault_runtime.cda_leak_m2, 0.0);
    }

    #[test]
    fn missing_sections_rejected() {
        let json = r#"{
            "meta": {"name": "rig-a"},
            "fluid": {"rho": 1000.0, "bulk_modulus": 1.4e9},
            "accumulators": {},
            "valves": {"v": {}},
            "actuators": {"a": {}}
        }"#;
        let cfg: SystemConfig = serde_json::from_str(json).unwrap();
        assert!(validate_config(&cfg).is_err());
    }
}
