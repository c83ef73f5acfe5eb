//! CSV and manifest export for generated curves.

use ht_sim::HydraulicState;
use serde::Serialize;
use std::path::Path;

/// Render a sampled two-node trajectory as CSV.
pub fn curves_csv(t: &[f64], y: &[HydraulicState]) -> String {
    let mut csv = String::from("time_s,p_acc_pa,p_act_pa\n");
    for (ts, state) in t.iter().zip(y) {
        csv.push_str(&format!("{},{},{}\n", ts, state.p_acc_pa, state.p_act_pa));
    }
    csv
}

/// One generated scenario in the batch manifest.
#[derive(Debug, Clone, Serialize)]
pub struct ManifestEntry {
    pub function: String,
    pub supply: String,
    pub file: String,
    pub samples: usize,
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
struct Manifest<'a> {
    generated_at: String,
    config_name: &'a str,
    scenarios: &'a [ManifestEntry],
}

/// Write `manifest.json` next to the generated curves.
pub fn write_manifest(
    dir: &Path,
    config_name: &str,
    scenarios: &[ManifestEntry],
) -> std::io::Result<()> {
    let manifest = Manifest {
        generated_at: chrono::Utc::now().to_rfc3339(),
        config_name,
        scenarios,
    };
    let json = serde_json::to_string_pretty(&manifest).expect("manifest serializes");
    std::fs::write(dir.join("manifest.json"), json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_layout() {
        let t = vec![0.0, 0.5];
        let y = vec![
            HydraulicState::new(2e7, 1e5),
            HydraulicState::new(1.9e7, 2e6),
        ];
        let csv = curves_csv(&t, &y);
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("time_s,p_acc_pa,p_act_pa"));
        assert_eq!(lines.next(), Some("0,20000000,100000"));
    }
}
