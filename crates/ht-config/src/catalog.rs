//! Immutable per-function default catalog.
//!
//! Each BOP function (annulars, rams, subsea valves) gets an equivalent
//! actuator-node volume and an effective flow-path area. Values are
//! calibratable placeholders until a rig survey provides real diameters and
//! volumes; the split small/medium/large tiers are what matters for the
//! shapes of the generated curves.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Which supply header drives the function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Supply {
    Hp,
    Lp,
}

/// Per-function defaults used to assemble a single-path network.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunctionSpec {
    pub name: String,
    pub supply: Supply,
    pub v_act_m3: f64,
    pub valve_area_m2: f64,
}

impl FunctionSpec {
    fn new(name: &str, supply: Supply, v_act_m3: f64, valve_area_m2: f64) -> Self {
        Self {
            name: name.to_string(),
            supply,
            v_act_m3,
            valve_area_m2,
        }
    }
}

/// Build the default function catalog. Constructed once per scenario or
/// test setup and treated as read-only afterwards.
pub fn default_function_catalog() -> BTreeMap<String, FunctionSpec> {
    const V_SMALL: f64 = 0.002; // 2 L, subsea valve circuits
    const V_MED: f64 = 0.005; // 5 L, ram actuators
    const V_BIG: f64 = 0.010; // 10 L, annulars

    const A_SMALL: f64 = 2e-5;
    const A_MED: f64 = 1e-4;
    const A_BIG: f64 = 2e-4;

    let mut cat = BTreeMap::new();
    let mut add = |name: &str, supply: Supply, v: f64, a: f64| {
        cat.insert(name.to_string(), FunctionSpec::new(name, supply, v, a));
    };

    // Annulars
    add("UA", Supply::Hp, V_BIG, A_BIG);
    add("LA", Supply::Hp, V_BIG, A_BIG);

    // Shear rams
    add("UBSR", Supply::Hp, V_MED, A_MED);
    add("LBSR", Supply::Hp, V_MED, A_MED);

    // Pipe rams
    add("UPR", Supply::Hp, V_MED, A_MED);
    add("MPR", Supply::Hp, V_MED, A_MED);
    add("LPR", Supply::Hp, V_MED, A_MED);

    // Subsea bore valves
    for name in ["UIBV", "UOBV", "LIBV", "LOBV"] {
        add(name, Supply::Lp, V_SMALL, A_SMALL);
    }

    // Kill and choke line valves, upper/middle/lower
    for name in [
        "UIC", "UOC", "UIK", "UOK", "MIC", "MOC", "MIK", "MOK", "LIC", "LOC", "LIK", "LOK",
    ] {
        add(name, Supply::Lp, V_SMALL, A_SMALL);
    }

    cat
}
