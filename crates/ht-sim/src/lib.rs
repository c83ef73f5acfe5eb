//! Transient simulation of the accumulator -> control valve -> actuator
//! hydraulic path.
//!
//! The network is a two-node lumped-parameter model whose derivative
//! function is total, stateless, and side-effect-free: the integrator may
//! evaluate it at arbitrary times, repeatedly, and across rejected trial
//! steps without corrupting a run. Scenario-level entry points (hold test,
//! config-driven builders) live here too.

pub mod builder;
pub mod error;
pub mod hold;
pub mod integrate;
pub mod integrator;
pub mod model;
pub mod network;
pub mod sim;

pub use builder::{
    SupplyPressures, accumulator_bank, network_for_function, network_from_config,
    supply_pressures_pa,
};
pub use error::{SimError, SimResult};
pub use hold::{HoldTestOptions, HoldTestResult, VesselLeakdown, run_hold_test};
pub use integrate::{IntegrateOptions, IntegrationOutput, OdeMethod, integrate};
pub use integrator::{ForwardEuler, Integrator, Rk4};
pub use model::TransientModel;
pub use network::{HydraulicNetwork, HydraulicState, LumpedHydraulicParams};
pub use sim::{IntegratorType, SimOptions, SimRecord, run_sim};
