//! ht-cli: drive the hydraulic twin from scenario configs.

mod export;

use clap::{Parser, Subcommand};
use ht_acceptance::hold::acceptance_hold_drop;
use ht_config::{FunctionSpec, Supply, SystemConfig, default_function_catalog};
use ht_controls::CommandProfile;
use ht_faults::{Fault, apply_all};
use ht_sim::{
    HoldTestOptions, HydraulicState, IntegrateOptions, TransientModel, VesselLeakdown, integrate,
    network_for_function, network_from_config, run_hold_test, supply_pressures_pa,
};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "ht-cli")]
#[command(about = "Hydraulic digital twin - simulate and judge well-control tests", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a scenario configuration file
    Validate {
        /// Path to the scenario JSON file
        config_path: PathBuf,
    },
    /// Simulate one function and export the pressure curves as CSV
    Simulate {
        config_path: PathBuf,
        /// Catalog function ID (e.g. UA, UBSR); omit to use the config valve
        #[arg(long)]
        function: Option<String>,
        /// Simulation end time (seconds)
        #[arg(long, default_value_t = 30.0)]
        t_end: f64,
        /// Output sample spacing (seconds)
        #[arg(long, default_value_t = 0.05)]
        dt: f64,
        /// Valve-opening step time (seconds)
        #[arg(long, default_value_t = 2.0)]
        step_at: f64,
        /// Spool opening lag time constant (seconds); 0 for an ideal step
        #[arg(long, default_value_t = 0.0)]
        tau: f64,
        /// Fault to inject, as JSON (repeatable)
        #[arg(long = "fault")]
        faults: Vec<String>,
        /// Output CSV path; stdout when omitted
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Generate charge/hold curves for catalog functions in parallel
    Generate {
        config_path: PathBuf,
        /// Output directory
        #[arg(long)]
        out: PathBuf,
        /// Function IDs to generate; default: the whole catalog
        #[arg(long)]
        functions: Vec<String>,
        /// Pressurization phase duration (seconds)
        #[arg(long, default_value_t = 30.0)]
        t_press: f64,
        /// Hold phase duration (seconds)
        #[arg(long, default_value_t = 300.0)]
        t_hold: f64,
        /// Sample spacing during pressurization (seconds)
        #[arg(long, default_value_t = 0.05)]
        dt_fast: f64,
        /// Sample spacing during hold (seconds)
        #[arg(long, default_value_t = 0.5)]
        dt_hold: f64,
        /// Fault to inject, as JSON (repeatable)
        #[arg(long = "fault")]
        faults: Vec<String>,
    },
    /// Run a leakdown hold test and judge the pressure drop
    HoldTest {
        config_path: PathBuf,
        /// Starting pressure (psi)
        #[arg(long, default_value_t = 3000.0)]
        p0_psi: f64,
        /// Hold duration (minutes)
        #[arg(long, default_value_t = 5.0)]
        minutes: f64,
        /// Leak discharge area (m^2)
        #[arg(long, default_value_t = 1e-8)]
        leak: f64,
        /// Held volume (m^3)
        #[arg(long, default_value_t = 6.0)]
        volume: f64,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let cli = Cli::parse();
    let code = match run(cli) {
        Ok(()) => 0,
        Err(message) => {
            eprintln!("error: {message}");
            1
        }
    };
    std::process::exit(code);
}

fn run(cli: Cli) -> Result<(), String> {
    match cli.command {
        Commands::Validate { config_path } => cmd_validate(&config_path),
        Commands::Simulate {
            config_path,
            function,
            t_end,
            dt,
            step_at,
            tau,
            faults,
            out,
        } => cmd_simulate(
            &config_path,
            function.as_deref(),
            t_end,
            dt,
            step_at,
            tau,
            &faults,
            out,
        ),
        Commands::Generate {
            config_path,
            out,
            functions,
            t_press,
            t_hold,
            dt_fast,
            dt_hold,
            faults,
        } => cmd_generate(&config_path, &out, &functions, t_press, t_hold, dt_fast, dt_hold, &faults),
        Commands::HoldTest {
            config_path,
            p0_psi,
            minutes,
            leak,
            volume,
        } => cmd_hold_test(&config_path, p0_psi, minutes, leak, volume),
    }
}

fn load_config(path: &Path) -> Result<SystemConfig, String> {
    ht_config::load_json(path).map_err(|e| format!("{}: {e}", path.display()))
}

fn parse_faults(raw: &[String]) -> Result<Vec<Fault>, String> {
    raw.iter()
        .map(|s| serde_json::from_str::<Fault>(s).map_err(|e| format!("invalid --fault '{s}': {e}")))
        .collect()
}

fn cmd_validate(config_path: &Path) -> Result<(), String> {
    let config = load_config(config_path)?;
    println!(
        "{}: valid ({} accumulators, {} valves, {} actuators)",
        config.meta.name,
        config.accumulators.len(),
        config.valves.len(),
        config.actuators.len()
    );
    Ok(())
}

fn sample_grid(t_end: f64, dt: f64) -> Vec<f64> {
    let n = (t_end / dt).floor() as usize;
    let mut grid: Vec<f64> = (0..=n).map(|i| i as f64 * dt).collect();
    if *grid.last().unwrap_or(&0.0) < t_end {
        grid.push(t_end);
    }
    grid
}

#[allow(clippy::too_many_arguments)]
fn cmd_simulate(
    config_path: &Path,
    function: Option<&str>,
    t_end: f64,
    dt: f64,
    step_at: f64,
    tau: f64,
    faults: &[String],
    out: Option<PathBuf>,
) -> Result<(), String> {
    let config = load_config(config_path)?;
    let config = apply_all(&config, &parse_faults(faults)?);
    let supplies = supply_pressures_pa(&config);

    let command = CommandProfile::Step {
        t_step_s: step_at,
        level: 1.0,
    }
    .with_lag(tau);

    let (network, supply_pa) = match function {
        Some(id) => {
            let catalog = default_function_catalog();
            let spec = catalog
                .get(id)
                .ok_or_else(|| format!("unknown function '{id}'"))?;
            let supply_pa = match spec.supply {
                Supply::Hp => supplies.hp_pa,
                Supply::Lp => supplies.lp_pa,
            };
            let network = network_for_function(&config, spec, command)
                .map_err(|e| e.to_string())?;
            (network, supply_pa)
        }
        None => {
            let network =
                network_from_config(&config, None, command).map_err(|e| e.to_string())?;
            (network, supplies.hp_pa)
        }
    };

    let y0 = HydraulicState::new(supply_pa, supplies.return_pa);
    let t_eval = sample_grid(t_end, dt);
    let result = integrate(&network, y0, (0.0, t_end), &t_eval, &IntegrateOptions::default());
    if !result.success {
        info!(message = %result.message, "integration ended early");
    }

    let csv = export::curves_csv(&result.t, &result.y);
    match out {
        Some(path) => {
            std::fs::write(&path, csv).map_err(|e| e.to_string())?;
            println!("wrote {} samples to {}", result.t.len(), path.display());
        }
        None => print!("{csv}"),
    }
    Ok(())
}

fn generate_one(
    config: &SystemConfig,
    spec: &FunctionSpec,
    supply_pa: f64,
    return_pa: f64,
    t_press: f64,
    t_hold: f64,
    dt_fast: f64,
    dt_hold: f64,
    out_dir: &Path,
) -> Result<export::ManifestEntry, String> {
    // Charge while the command is up, then hold with the valve shut
    let command = CommandProfile::Pulse {
        t_on_s: 0.0,
        t_off_s: t_press,
        level: 1.0,
    };
    let network = network_for_function(config, spec, command).map_err(|e| e.to_string())?;

    let t_end = t_press + t_hold;
    let mut t_eval = sample_grid(t_press, dt_fast);
    for ts in sample_grid(t_hold, dt_hold) {
        let shifted = t_press + ts;
        if shifted > t_press {
            t_eval.push(shifted);
        }
    }

    let y0 = HydraulicState::new(supply_pa, return_pa);
    let result = integrate(&network, y0, (0.0, t_end), &t_eval, &IntegrateOptions::default());

    let file = format!("{}.csv", spec.name);
    let csv = export::curves_csv(&result.t, &result.y);
    std::fs::write(out_dir.join(&file), csv).map_err(|e| e.to_string())?;

    Ok(export::ManifestEntry {
        function: spec.name.clone(),
        supply: match spec.supply {
            Supply::Hp => "HP".to_string(),
            Supply::Lp => "LP".to_string(),
        },
        file,
        samples: result.t.len(),
        success: result.success,
        message: result.message,
    })
}

#[allow(clippy::too_many_arguments)]
fn cmd_generate(
    config_path: &Path,
    out: &Path,
    functions: &[String],
    t_press: f64,
    t_hold: f64,
    dt_fast: f64,
    dt_hold: f64,
    faults: &[String],
) -> Result<(), String> {
    let config = load_config(config_path)?;
    let config = apply_all(&config, &parse_faults(faults)?);
    let supplies = supply_pressures_pa(&config);
    let catalog = default_function_catalog();

    let selected: Vec<&FunctionSpec> = if functions.is_empty() {
        catalog.values().collect()
    } else {
        functions
            .iter()
            .map(|id| {
                catalog
                    .get(id)
                    .ok_or_else(|| format!("unknown function '{id}'"))
            })
            .collect::<Result<_, _>>()?
    };

    std::fs::create_dir_all(out).map_err(|e| e.to_string())?;

    // Scenarios are independent: no state is shared between networks, so
    // the batch fans out across worker threads.
    let entries: Vec<export::ManifestEntry> = selected
        .par_iter()
        .map(|spec| {
            let supply_pa = match spec.supply {
                Supply::Hp => supplies.hp_pa,
                Supply::Lp => supplies.lp_pa,
            };
            generate_one(
                &config,
                spec,
                supply_pa,
                supplies.return_pa,
                t_press,
                t_hold,
                dt_fast,
                dt_hold,
                out,
            )
        })
        .collect::<Result<_, _>>()?;

    export::write_manifest(out, &config.meta.name, &entries).map_err(|e| e.to_string())?;
    println!(
        "generated {} curve sets under {}",
        entries.len(),
        out.display()
    );
    Ok(())
}

fn cmd_hold_test(
    config_path: &Path,
    p0_psi: f64,
    minutes: f64,
    leak: f64,
    volume: f64,
) -> Result<(), String> {
    let config = load_config(config_path)?;
    let p0_pa = ht_core::units::psi_to_pa(p0_psi);
    let vessel = VesselLeakdown::new(
        config.fluid.bulk_modulus,
        volume,
        leak,
        config.fluid.rho,
        p0_pa,
    )
    .map_err(|e| e.to_string())?;

    let opts = HoldTestOptions {
        t_hold_min: minutes,
        ..HoldTestOptions::default()
    };
    let result =
        run_hold_test(&vessel, vessel.initial_state(), |p| *p, &opts).map_err(|e| e.to_string())?;

    let check = acceptance_hold_drop(&result.t_s, &result.p_pa, minutes * 60.0, 1.0)
        .map_err(|e| e.to_string())?;

    println!(
        "hold {minutes:.1} min at {p0_psi:.0} psi, leak CdA {leak:.2e} m^2 over {volume:.2} m^3"
    );
    println!(
        "  drop: {:.3} % -> {}",
        result.delta_p_percent,
        if check.pass { "PASS" } else { "FAIL" }
    );
    if !result.success {
        println!("  warning: {}", result.message);
    }
    Ok(())
}
