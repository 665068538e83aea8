use anyhow::{Context, Result};
use clap::Parser;
use evolarium_lib::{engine, io};
use evolarium_lib::runner::{self, RunReport};
use evolarium_lib::{SimConfig, Simulation, WorldSettings};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless evolution simulator", long_about = None)]
struct Args {
    /// TOML file with simulation tunables
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Ticks to run
    #[arg(short, long, default_value_t = 1000)]
    ticks: u64,

    /// RNG seed; overrides the config file
    #[arg(short, long)]
    seed: Option<u64>,

    /// Independent runs with consecutive seeds, executed in parallel
    #[arg(short, long, default_value_t = 1)]
    runs: usize,

    /// Edge length of the toroidal world
    #[arg(long, default_value_t = 3000.0)]
    world_size: f64,

    /// Behavior sub-steps per tick
    #[arg(long, default_value_t = 1)]
    sim_speed: u32,

    /// Disable predation
    #[arg(long)]
    no_predation: bool,

    /// Disable hazard zones
    #[arg(long)]
    no_zones: bool,

    /// Snapshot to start from (.json or .json.gz)
    #[arg(long)]
    load: Option<PathBuf>,

    /// Where to write the final snapshot (.json or .json.gz)
    #[arg(long)]
    save: Option<PathBuf>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn load_config(args: &Args) -> Result<SimConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            SimConfig::from_toml(&content)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => SimConfig::default(),
    };
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    Ok(config)
}

fn print_reports(reports: &[RunReport]) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(reports)?);
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    engine::init_logging(&args.log_level);

    let config = load_config(&args)?;
    let mut world = WorldSettings {
        size: args.world_size,
        sim_speed: args.sim_speed,
        ..Default::default()
    };
    world.flags.predation = !args.no_predation;
    world.flags.zones = !args.no_zones;

    if args.runs > 1 {
        anyhow::ensure!(
            args.load.is_none() && args.save.is_none(),
            "--load and --save apply to single runs only"
        );
        let base_seed = config.seed.unwrap_or(0);
        let reports = runner::run_batch(&config, &world, args.ticks, args.runs, base_seed)?;
        return print_reports(&reports);
    }

    let mut sim = Simulation::new(config, world)?;
    if let Some(path) = &args.load {
        let summary = io::load_from_file(&mut sim, path)
            .with_context(|| format!("loading snapshot {}", path.display()))?;
        tracing::info!(?summary, "Loaded snapshot");
    }

    let report = runner::run_headless(&mut sim, args.ticks);

    if let Some(path) = &args.save {
        io::save_to_file(&sim, path)
            .with_context(|| format!("saving snapshot {}", path.display()))?;
        tracing::info!(path = %path.display(), "Saved snapshot");
    }

    print_reports(&[report])
}
