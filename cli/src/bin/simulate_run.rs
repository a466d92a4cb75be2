use clap::Parser;
use engine::api::{simulate_run, simulate_run_many, SimConfig};
use engine::{ClassKind, Difficulty};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "simulate-run")]
#[command(about = "Monte Carlo sim: an auto-player runs dungeons from a fresh character")]
struct Args {
    /// warrior | mage | rogue
    #[arg(long, default_value = "warrior")]
    class: String,

    /// easy | normal | hard
    #[arg(long, default_value = "normal")]
    difficulty: String,

    /// Dungeon attempts per trial
    #[arg(long, default_value_t = 10)]
    runs: u32,

    /// Number of trials (1 prints the run log)
    #[arg(long, default_value_t = 100)]
    trials: u32,

    /// Turns per floor before the auto-player escapes
    #[arg(long, default_value_t = 200)]
    max_turns: u32,

    /// RNG base seed (trial i uses seed+i)
    #[arg(long, default_value_t = 12345)]
    seed: u64,

    /// Optional YAML rules file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print every combat line (single trial only)
    #[arg(long, default_value_t = false)]
    full_log: bool,

    /// Emit JSON instead of a table
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn to_class(s: &str) -> anyhow::Result<ClassKind> {
    match s.to_lowercase().as_str() {
        "warrior" => Ok(ClassKind::Warrior),
        "mage" => Ok(ClassKind::Mage),
        "rogue" => Ok(ClassKind::Rogue),
        other => anyhow::bail!("unknown class '{}'", other),
    }
}

fn to_difficulty(s: &str) -> anyhow::Result<Difficulty> {
    match s.to_lowercase().as_str() {
        "easy" => Ok(Difficulty::Easy),
        "normal" => Ok(Difficulty::Normal),
        "hard" => Ok(Difficulty::Hard),
        other => anyhow::bail!("unknown difficulty '{}'", other),
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    engine::telemetry::init(0);

    let cfg = SimConfig {
        class: to_class(&args.class)?,
        difficulty: to_difficulty(&args.difficulty)?,
        name: "Hero".to_string(),
        runs: args.runs,
        seed: args.seed,
        max_turns: args.max_turns,
        config_path: args.config.as_ref().map(|p| p.to_string_lossy().into_owned()),
        full_log: args.full_log,
    };

    if args.trials <= 1 {
        let res = simulate_run(cfg)?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&res)?);
        } else {
            for line in &res.log {
                println!("{}", line);
            }
        }
        return Ok(());
    }

    let class = cfg.class;
    let difficulty = cfg.difficulty;
    let stats = simulate_run_many(cfg, args.trials)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("simulate-run results");
    println!("--------------------");
    println!("trials:             {}", stats.samples);
    println!("class:              {} ({})", class, difficulty);
    println!("runs per trial:     {}", args.runs);
    println!();
    println!("clear rate:         {:.1}%", stats.clear_rate * 100.0);
    println!("clears:             {}", stats.clears);
    println!("defeats:            {}", stats.defeats);
    println!("stalls:             {}", stats.stalls);
    println!("mean final level:   {:.2}", stats.mean_final_level);
    println!("mean dungeon level: {:.2}", stats.mean_dungeon_level);
    println!("best dungeon level: {}", stats.best_dungeon_level);

    Ok(())
}
