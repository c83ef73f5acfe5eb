//! Legacy percentage-drop hold rule.
//!
//! Predates the full regulatory engine in [`crate::pressure`] and remains
//! callable: simulation hold runs and quick-look trace checks still report
//! through it. The windowing is raw-endpoint based, not robust.

use crate::error::{AcceptanceError, AcceptanceResult};
use serde::{Deserialize, Serialize};

/// Percentage drop between two pressures, relative to the first.
pub fn drop_percent(p0: f64, p_end: f64) -> f64 {
    (p0 - p_end) / p0 * 100.0
}

/// Outcome of the generic hold-drop check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HoldDropCheck {
    pub delta_p_percent: f64,
    pub pass: bool,
}

/// In the trailing `window_s` of a hold, the percentage drop must not
/// exceed `max_drop_percent`. The comparison is inclusive: a drop of
/// exactly the threshold passes.
pub fn acceptance_hold_drop(
    t: &[f64],
    p: &[f64],
    window_s: f64,
    max_drop_percent: f64,
) -> AcceptanceResult<HoldDropCheck> {
    if t.len() != p.len() {
        return Err(AcceptanceError::InputShape {
            what: "time and pressure series must have the same length",
        });
    }
    if t.is_empty() {
        return Err(AcceptanceError::InputShape {
            what: "hold-drop check requires a non-empty series",
        });
    }

    let t_end = *t.last().expect("non-empty");
    let window: Vec<f64> = t
        .iter()
        .zip(p)
        .filter(|(&ts, _)| ts >= t_end - window_s)
        .map(|(_, &ps)| ps)
        .collect();
    // An over-wide window degenerates to the whole series
    let window = if window.is_empty() { p.to_vec() } else { window };

    let p0 = window[0];
    let p_end = *window.last().expect("non-empty window");
    let delta_p_percent = drop_percent(p0, p_end);
    Ok(HoldDropCheck {
        delta_p_percent,
        pass: delta_p_percent <= max_drop_percent,
    })
}
