//! Integration test: 5-minute hold on a stack-wide test volume, judged by
//! the percentage-drop acceptance rule.

use ht_acceptance::hold::acceptance_hold_drop;
use ht_components::{OrificeValve, OrificeValveParams};
use ht_controls::CommandProfile;
use ht_sim::{
    HoldTestOptions, HydraulicNetwork, HydraulicState, LumpedHydraulicParams, run_hold_test,
};

/// Stack-wide hold plumbing: the full accumulator bank plus surface lines
/// on one side, the wellbore test volume on the other, with a long
/// umbilical run modelled as a viscous line resistance.
fn hold_network(cda_leak_m2: f64) -> HydraulicNetwork<CommandProfile> {
    let mut params = LumpedHydraulicParams::new(1000.0, 1.4e9, 4.0, 2.0);
    params.cda_leak_m2 = cda_leak_m2;
    params.line_resistance_pa_s_per_m3 = 1e9;
    let valve = OrificeValve::new(OrificeValveParams::named("test_manifold")).unwrap();
    HydraulicNetwork::new(params, valve, CommandProfile::full_open()).unwrap()
}

#[test]
fn healthy_ish_leak_passes_five_minute_hold() {
    let network = hold_network(1e-8);
    let y0 = HydraulicState::new(207e5, 207e5);
    let result = run_hold_test(&network, y0, |s| s.p_act_pa, &HoldTestOptions::default()).unwrap();

    assert!(result.success, "{}", result.message);
    assert!(
        result.delta_p_percent < 1.0,
        "drop was {:.3} %",
        result.delta_p_percent
    );
    assert!(result.delta_p_percent > 0.0, "a real leak must show some drop");
    assert!(result.pass);

    // The same trace satisfies the generic hold-drop acceptance rule
    let check = acceptance_hold_drop(&result.t_s, &result.p_pa, 300.0, 1.0).unwrap();
    assert!(check.pass);
    assert!((check.delta_p_percent - result.delta_p_percent).abs() < 0.05);
}

#[test]
fn gross_leak_fails_five_minute_hold() {
    let network = hold_network(5e-7);
    let y0 = HydraulicState::new(207e5, 207e5);
    let result = run_hold_test(&network, y0, |s| s.p_act_pa, &HoldTestOptions::default()).unwrap();

    assert!(result.success, "{}", result.message);
    assert!(!result.pass);
    assert!(
        result.delta_p_percent > 5.0,
        "drop was only {:.3} %",
        result.delta_p_percent
    );
}
