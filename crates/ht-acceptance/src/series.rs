//! Robust time-series helpers shared by the evaluators.

use ht_core::units::{bar_to_psi, pa_to_psi};
use serde::{Deserialize, Serialize};

/// Units a recorded pressure series may arrive in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PressureUnit {
    #[default]
    Psi,
    Pa,
    Bar,
}

/// Convert a pressure series to psi, the unit the written criteria quote.
pub fn to_psi(pressure: &[f64], unit: PressureUnit) -> Vec<f64> {
    match unit {
        PressureUnit::Psi => pressure.to_vec(),
        PressureUnit::Pa => pressure.iter().map(|&v| pa_to_psi(v)).collect(),
        PressureUnit::Bar => pressure.iter().map(|&v| bar_to_psi(v)).collect(),
    }
}

pub fn is_time_sorted(t: &[f64]) -> bool {
    t.windows(2).all(|w| w[0] <= w[1])
}

/// Sort the pair of series by time when the recorder delivered samples out
/// of order. Stable, so duplicate timestamps keep their relative order.
pub fn sort_by_time(t: &[f64], p: &[f64]) -> (Vec<f64>, Vec<f64>) {
    if is_time_sorted(t) {
        return (t.to_vec(), p.to_vec());
    }
    let mut order: Vec<usize> = (0..t.len()).collect();
    order.sort_by(|&a, &b| t[a].partial_cmp(&t[b]).expect("finite times"));
    (
        order.iter().map(|&i| t[i]).collect(),
        order.iter().map(|&i| p[i]).collect(),
    )
}

/// Centered rolling median with edge padding. Even windows are widened to
/// the next odd size. Medians suppress the valley/spike transients that a
/// moving mean would smear into the window.
pub fn rolling_median(x: &[f64], window: usize) -> Vec<f64> {
    if window <= 1 || x.is_empty() {
        return x.to_vec();
    }
    let w = if window % 2 == 0 { window + 1 } else { window };
    let pad = w / 2;
    let n = x.len();

    let mut out = Vec::with_capacity(n);
    let mut buf: Vec<f64> = Vec::with_capacity(w);
    for i in 0..n {
        buf.clear();
        for k in 0..w {
            // Edge-padded index: clamp into [0, n)
            let idx = (i + k).saturating_sub(pad).min(n - 1);
            buf.push(x[idx]);
        }
        buf.sort_by(|a, b| a.partial_cmp(b).expect("finite pressures"));
        out.push(buf[w / 2]);
    }
    out
}

/// Indices of samples inside the trailing window `[t_end - duration, t_end]`.
pub fn window_indices(t: &[f64], t_end: f64, duration_s: f64) -> Vec<usize> {
    let t0 = t_end - duration_s;
    t.iter()
        .enumerate()
        .filter(|(_, &ts)| ts >= t0 && ts <= t_end)
        .map(|(i, _)| i)
        .collect()
}

/// Robust start/end pressures of a window: means of the first and last
/// 20 % of samples (at least 3), instead of the raw endpoints, to resist
/// endpoint noise. Caller guarantees at least 3 samples.
pub fn robust_start_end_mean(p_window: &[f64]) -> (f64, f64) {
    let n = p_window.len();
    let k = ((0.2 * n as f64) as usize).max(3).min(n);
    let start = p_window[..k].iter().sum::<f64>() / k as f64;
    let end = p_window[n - k..].iter().sum::<f64>() / k as f64;
    (start, end)
}

/// Central-difference derivative (one-sided at the edges).
pub fn gradient(t: &[f64], x: &[f64]) -> Vec<f64> {
    let n = x.len();
    if n < 2 {
        return vec![0.0; n];
    }
    let mut out = Vec::with_capacity(n);
    out.push((x[1] - x[0]) / (t[1] - t[0]));
    for i in 1..n - 1 {
        out.push((x[i + 1] - x[i - 1]) / (t[i + 1] - t[i - 1]));
    }
    out.push((x[n - 1] - x[n - 2]) / (t[n - 1] - t[n - 2]));
    out
}

/// Range features of a pressure trace and its first two derivatives, used
/// for quick trace triage and curve labelling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesFeatures {
    pub p_min: f64,
    pub p_max: f64,
    pub dp_min: f64,
    pub dp_max: f64,
    pub d2p_min: f64,
    pub d2p_max: f64,
}

pub fn basic_features(t: &[f64], p: &[f64]) -> SeriesFeatures {
    let dp = gradient(t, p);
    let d2p = gradient(t, &dp);
    let range = |v: &[f64]| {
        v.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| {
            (lo.min(x), hi.max(x))
        })
    };
    let (p_min, p_max) = range(p);
    let (dp_min, dp_max) = range(&dp);
    let (d2p_min, d2p_max) = range(&d2p);
    SeriesFeatures {
        p_min,
        p_max,
        dp_min,
        dp_max,
        d2p_min,
        d2p_max,
    }
}
