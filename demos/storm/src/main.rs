//! storm — one-hour storm event over a six-unit drainage network.
//!
//! Two pollutants are traced: suspended solids washed off the roof and the
//! yard, and a measured spill entering manhole B.  Particles are routed
//! downstream with a velocity-driven hop probability and leave the network
//! at the outfall.
//!
//! ```text
//! storm [config.json] [output-dir]
//! ```
//!
//! Without a config file the embedded default below is used.

mod network;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};

use pt_core::{MaterialId, ParticleId, ParticleRng, ScenarioConfig, Timestamp, UnitId};
use pt_inject::{AreaRecord, InjectionSource, ReleaseInterval, WashoffArea};
use pt_output::{CsvWriter, ScenarioOutputObserver};
use pt_sim::{ParticleModel, ScenarioBuilder, StepContext, StepOutcome};
use pt_store::Quantity;

use network::{DOWNSTREAM, LENGTH_M, NAMES, UNIT_COUNT};

// ── Constants ─────────────────────────────────────────────────────────────────

const SOLIDS: MaterialId = MaterialId(0);
const SPILL:  MaterialId = MaterialId(1);

const RAIN_MM:           f64 = 18.0;
const WASHOFF_CONSTANT:  f64 = 0.08; // 1/mm
const SPILL_KG:          f64 = 0.75;

const DEFAULT_CONFIG: &str = r#"{
    "particle_budget":       20000,
    "substeps_per_interval": 6,
    "discipline":            "Synchronized",
    "sampling":              "Continuous",
    "policy":                "LinearInterpolate",
    "material_count":        2,
    "seed":                  42,
    "output_interval":       3
}"#;

// ── Logging ───────────────────────────────────────────────────────────────────

struct StderrLogger;

impl log::Log for StderrLogger {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        metadata.level() <= log::Level::Info
    }

    fn log(&self, record: &log::Record<'_>) {
        if self.enabled(record.metadata()) {
            eprintln!("[{:<5} {}] {}", record.level(), record.target(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

// ── Particle model ────────────────────────────────────────────────────────────

/// Hops one unit downstream with probability `velocity * dt / length`.
struct RoutingModel;

impl ParticleModel for RoutingModel {
    fn step(&self, particle: ParticleId, ctx: &StepContext<'_>, rng: &mut ParticleRng) -> StepOutcome {
        let unit = ctx.particles.unit[particle.index()];
        let velocity = ctx.value(Quantity::Velocity, unit).max(0.0);
        let p = velocity * ctx.dt_secs() / LENGTH_M[unit.index()];
        if !rng.gen_bool(p) {
            return StepOutcome::Stay;
        }
        let share_before = rng.share();
        match DOWNSTREAM[unit.index()] {
            Some(next) => StepOutcome::MoveTo { unit: next, share_before },
            None => StepOutcome::Exit { share_before },
        }
    }
}

// ── Sources ───────────────────────────────────────────────────────────────────

fn sources(time: &pt_core::TimeIndex) -> Vec<InjectionSource> {
    let roof = AreaRecord { unit: UnitId(0), area_m2: 450.0, load: 0.004, label: "roof".into() };
    let yard = AreaRecord { unit: UnitId(1), area_m2: 1_200.0, load: 0.009, label: "yard".into() };

    let spill_start = Timestamp::from_secs(10 * 60);
    let spill_end = Timestamp::from_secs(25 * 60);

    vec![
        InjectionSource::Washoff {
            material:         SOLIDS,
            washoff_constant: WASHOFF_CONSTANT,
            areas:            vec![
                WashoffArea { runoff: network::runoff(time, roof.area_m2, RAIN_MM), area: roof },
                WashoffArea { runoff: network::runoff(time, yard.area_m2, RAIN_MM), area: yard },
            ],
        },
        InjectionSource::Measured {
            material:  SPILL,
            unit:      UnitId(3),
            intervals: vec![ReleaseInterval::new(spill_start, spill_end, SPILL_KG)],
        },
    ]
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    log::set_logger(&LOGGER).map_err(|e| anyhow::anyhow!("{e}"))?;
    log::set_max_level(log::LevelFilter::Info);

    let mut args = std::env::args().skip(1);
    let config: ScenarioConfig = match args.next() {
        Some(path) => {
            let text = std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
            serde_json::from_str(&text).with_context(|| format!("parsing {path}"))?
        }
        None => serde_json::from_str(DEFAULT_CONFIG)?,
    };
    let out_dir = args.next().map_or_else(|| PathBuf::from("output/storm"), PathBuf::from);

    println!("=== storm — particle tracing through a drainage network ===");
    println!(
        "Units: {UNIT_COUNT}  |  Budget: {}  |  Sub-steps: {}  |  Seed: {}",
        config.particle_budget, config.substeps_per_interval, config.seed
    );
    println!();

    // 1. Solver output and injection sources.
    let time = network::time_index()?;
    let hydraulics = network::hydraulics(time.clone())?;
    let sources = sources(&time);

    // 2. Build scenario.
    let mut scenario = ScenarioBuilder::new(config, hydraulics, RoutingModel)
        .sources(sources)
        .build()?;
    println!(
        "Scheduled {} particles of {:.6} kg ({:.3} kg total)",
        scenario.schedule().len(),
        scenario.mass_per_particle(),
        scenario.summary().scheduled_mass,
    );

    // 3. Output.
    std::fs::create_dir_all(&out_dir)?;
    let writer = CsvWriter::new(&out_dir)?;
    let mut obs = ScenarioOutputObserver::new(writer).skip_empty_units(true);

    // 4. Run.
    let t0 = Instant::now();
    let summary = scenario.run(&mut obs)?;
    let elapsed = t0.elapsed();

    if let Some(e) = obs.take_error() {
        eprintln!("output error: {e}");
    }

    // 5. Summary.
    println!("Simulation complete in {:.3} s", elapsed.as_secs_f64());
    println!("  released  : {}", summary.released);
    println!("  exited    : {} ({:.3} kg)", summary.exited, summary.exited_mass);
    println!("  in network: {:.3} kg", summary.active_mass);
    println!(
        "  mass balance error: {:.2e}",
        summary.mass_balance_error(scenario.particles.created_mass())
    );
    println!("  peak concentration: {:.6} kg/m³", summary.max_concentration);
    println!("  output    : {}", out_dir.display());
    println!();

    // 6. Peak concentration per unit.
    let m = &scenario.measurements;
    println!("{:<12} {:>14} {:>10}", "Unit", "Peak kg/m³", "At (min)");
    println!("{}", "-".repeat(38));
    for (u, name) in NAMES.iter().enumerate() {
        let unit = UnitId(u as u32);
        let (t, c) = (1..m.time_len())
            .map(|t| (t, m.concentration(unit, t)))
            .fold((0, 0.0), |best, cur| if cur.1 > best.1 { cur } else { best });
        println!("{:<12} {:>14.6} {:>10}", name, c, m.time().stamp(t).as_millis() / 60_000);
    }

    Ok(())
}
