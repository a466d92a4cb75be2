use engine::api::{RunOutcome, SimConfig, simulate_run, simulate_run_many};
use engine::{ClassKind, Difficulty};

fn config(class: ClassKind) -> SimConfig {
    let manifest = std::path::Path::new(env!("CARGO_MANIFEST_DIR"));
    let config_path = manifest.join("content/config.yaml").to_string_lossy().into_owned();
    SimConfig {
        class,
        difficulty: Difficulty::Normal,
        name: "Tester".to_string(),
        runs: 4,
        seed: 2025,
        max_turns: 200,
        config_path: Some(config_path),
        full_log: true,
    }
}

#[test]
fn run_api_smoke() {
    let res = simulate_run(config(ClassKind::Rogue)).expect("run simulated");
    assert_eq!(res.runs.len(), 4);
    assert!(res.final_dungeon_level >= 1);
    assert!(res.log.first().is_some_and(|l| l.starts_with("[START] Tester the rogue")));
    assert!(res.log.iter().any(|l| l.starts_with("[DUNGEON]")));
    let cleared = res.runs.iter().filter(|r| r.outcome == RunOutcome::Cleared).count() as u32;
    assert_eq!(res.final_dungeon_level, 1 + cleared);
}

#[test]
fn many_api_rates_are_consistent() {
    let stats = simulate_run_many(config(ClassKind::Mage), 5).expect("runs simulated");
    assert_eq!(stats.samples, 5);
    assert_eq!(stats.runs, 20);
    assert!((0.0..=1.0).contains(&stats.clear_rate));
    assert_eq!(stats.clear_rate, f64::from(stats.clears) / 20.0);
    assert!(stats.mean_final_level >= 1.0);
}

#[test]
fn missing_rules_file_is_reported() {
    let mut cfg = config(ClassKind::Warrior);
    cfg.config_path = Some("does/not/exist.yaml".to_string());
    let err = simulate_run(cfg).unwrap_err();
    assert!(format!("{:#}", err).contains("failed to load rules config"));
}
