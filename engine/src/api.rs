use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::skills::{NodeState, SkillKind};
use crate::town::TrainingStat;
use crate::{ClassKind, Dice, Difficulty, Game, GameConfig, Outcome, Rules, Slot};

const DEFAULT_RUNS: u32 = 10;
const DEFAULT_MAX_TURNS: u32 = 200;
const POTION_THRESHOLD: f64 = 0.35;
const POTIONS_TO_CARRY: u32 = 3;
const SIM_DATE: &str = "simulation";

fn default_runs() -> u32 {
    DEFAULT_RUNS
}

fn default_max_turns() -> u32 {
    DEFAULT_MAX_TURNS
}

fn default_name() -> String {
    "Hero".to_string()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SimConfig {
    pub class: ClassKind,
    pub difficulty: Difficulty,
    #[serde(default = "default_name")]
    pub name: String,
    /// Dungeon attempts, each from town to clear, defeat or stall.
    #[serde(default = "default_runs")]
    pub runs: u32,
    #[serde(default)]
    pub seed: u64,
    /// Turns per floor before the auto-player gives up and escapes.
    #[serde(default = "default_max_turns")]
    pub max_turns: u32,
    /// Optional YAML rules file replacing the built-in config.
    #[serde(default)]
    pub config_path: Option<String>,
    /// Keep every combat line, not just the per-run summary.
    #[serde(default)]
    pub full_log: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    Cleared,
    Defeated,
    /// Hit the turn cap and escaped.
    Stalled,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct RunSummary {
    pub dungeon_level: u32,
    pub floors_cleared: u32,
    pub outcome: RunOutcome,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SimResult {
    pub runs: Vec<RunSummary>,
    pub final_level: u32,
    pub final_dungeon_level: u32,
    pub gold: u32,
    pub log: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SimStats {
    pub samples: u32,
    pub runs: u32,
    pub clears: u32,
    pub defeats: u32,
    pub stalls: u32,
    pub clear_rate: f64,
    pub mean_final_level: f64,
    pub mean_dungeon_level: f64,
    pub best_dungeon_level: u32,
}

pub fn load_rules(config_path: Option<&str>) -> Result<Rules> {
    match config_path {
        Some(path) => {
            let cfg = GameConfig::from_path(path)
                .with_context(|| format!("failed to load rules config: {}", path))?;
            Rules::with_config(cfg).context("failed to load built-in content")
        }
        None => Rules::builtin().context("failed to load built-in rules"),
    }
}

pub fn simulate_run(cfg: SimConfig) -> Result<SimResult> {
    let rules = load_rules(cfg.config_path.as_deref())?;
    simulate_with_rules(&rules, &cfg)
}

/// Repeats `simulate_run` with seeds `seed, seed + 1, ...`.
pub fn simulate_run_many(cfg: SimConfig, samples: u32) -> Result<SimStats> {
    let rules = load_rules(cfg.config_path.as_deref())?;
    let mut stats = SimStats {
        samples,
        runs: 0,
        clears: 0,
        defeats: 0,
        stalls: 0,
        clear_rate: 0.0,
        mean_final_level: 0.0,
        mean_dungeon_level: 0.0,
        best_dungeon_level: 0,
    };
    let mut level_sum = 0u64;
    let mut dungeon_sum = 0u64;
    for i in 0..samples {
        let sample = SimConfig {
            seed: cfg.seed.wrapping_add(u64::from(i)),
            full_log: false,
            ..cfg.clone()
        };
        let result = simulate_with_rules(&rules, &sample)
            .with_context(|| format!("sample {} (seed {}) failed", i, sample.seed))?;
        for run in &result.runs {
            stats.runs += 1;
            match run.outcome {
                RunOutcome::Cleared => stats.clears += 1,
                RunOutcome::Defeated => stats.defeats += 1,
                RunOutcome::Stalled => stats.stalls += 1,
            }
        }
        level_sum += u64::from(result.final_level);
        dungeon_sum += u64::from(result.final_dungeon_level);
        stats.best_dungeon_level = stats.best_dungeon_level.max(result.final_dungeon_level);
    }
    if stats.runs > 0 {
        stats.clear_rate = f64::from(stats.clears) / f64::from(stats.runs);
    }
    if samples > 0 {
        stats.mean_final_level = level_sum as f64 / f64::from(samples);
        stats.mean_dungeon_level = dungeon_sum as f64 / f64::from(samples);
    }
    Ok(stats)
}

fn simulate_with_rules(rules: &Rules, cfg: &SimConfig) -> Result<SimResult> {
    let mut dice = Dice::from_seed(cfg.seed);
    let mut game = Game::new(rules, &cfg.name, cfg.class, cfg.difficulty).context("failed to create game")?;
    game.refresh_daily_quests(SIM_DATE, rules, &mut dice);
    let mut logs = Vec::new();
    let mut runs = Vec::new();

    logs.push(format!(
        "[START] {} the {} on {} (seed {})",
        cfg.name, cfg.class, cfg.difficulty, cfg.seed
    ));

    for run_no in 1..=cfg.runs {
        prepare_in_town(&mut game, rules, &mut dice, &mut logs)?;
        let summary = play_dungeon(&mut game, rules, &mut dice, cfg, &mut logs)?;
        logs.push(format!(
            "[RUN] {} dungeon {}: {:?} after {} floor(s); level {}, {} gold",
            run_no,
            summary.dungeon_level,
            summary.outcome,
            summary.floors_cleared,
            game.player.level,
            game.player.gold
        ));
        runs.push(summary);
    }

    logs.push(format!(
        "[END] level={} dungeon={} gold={}",
        game.player.level, game.dungeon_level, game.player.gold
    ));

    Ok(SimResult {
        runs,
        final_level: game.player.level,
        final_dungeon_level: game.dungeon_level,
        gold: game.player.gold,
        log: logs,
    })
}

/// Town routine between runs: quests, skills, gear, potions, training,
/// then a safe weapon enhancement.
fn prepare_in_town(game: &mut Game, rules: &Rules, dice: &mut Dice, logs: &mut Vec<String>) -> Result<()> {
    for index in 0..game.quests.quests.len() {
        let quest = &game.quests.quests[index];
        if quest.is_complete() && !quest.claimed {
            let report = game.claim_quest(index, rules)?;
            logs.extend(report.log);
        }
    }

    loop {
        let tree = game.skill_tree(rules)?;
        let Some(node) = tree.iter().find(|n| n.state == NodeState::Learnable) else {
            break;
        };
        let level = game.learn_skill(&node.id, rules)?;
        logs.push(format!("[TOWN] learned {} (level {})", node.name, level));
    }

    equip_best(game, rules, logs)?;

    while game.player.potions < POTIONS_TO_CARRY && game.player.gold >= rules.config.potion_cost {
        game.buy_potion(rules)?;
    }

    loop {
        let stat = [TrainingStat::AttackPower, TrainingStat::Defense, TrainingStat::MaxHp]
            .into_iter()
            .min_by_key(|s| game.training.get(*s));
        let Some(stat) = stat else { break };
        if game.player.gold < game.training.get(stat) {
            break;
        }
        let cost = game.train(stat, rules)?;
        logs.push(format!("[TOWN] trained {:?} for {} gold", stat, cost));
    }

    let threshold = rules.config.enhancement.downgrade_threshold;
    if let Some(weapon) = game.player.equipment.get(Slot::Weapon) {
        let cost = crate::enhance::enhance_cost(weapon, &rules.config.enhancement);
        if weapon.enhancement < threshold && game.player.gold >= cost {
            let (_, lines) = game.enhance(Slot::Weapon, rules, dice)?;
            logs.extend(lines);
        }
    }
    Ok(())
}

fn equip_best(game: &mut Game, rules: &Rules, logs: &mut Vec<String>) -> Result<()> {
    let cfg = &rules.config.enhancement;
    loop {
        let upgrade = game.player.inventory.iter().enumerate().find(|(_, item)| {
            let current = game.player.equipment.get(item.slot).map(|e| e.score(cfg)).unwrap_or(0.0);
            item.score(cfg) > current
        });
        let Some((index, item)) = upgrade else {
            return Ok(());
        };
        logs.push(format!("[TOWN] equipped {}", item.display_name()));
        game.equip(index, rules)?;
    }
}

fn play_dungeon(
    game: &mut Game,
    rules: &Rules,
    dice: &mut Dice,
    cfg: &SimConfig,
    logs: &mut Vec<String>,
) -> Result<RunSummary> {
    let dungeon_level = game.dungeon_level;
    let report = game.enter_dungeon(rules, dice)?;
    if cfg.full_log {
        logs.extend(report.log);
    }
    let mut floors_cleared = 0;

    loop {
        let mut turns = 0;
        let outcome = loop {
            if turns >= cfg.max_turns {
                let report = game.escape(rules)?;
                if cfg.full_log {
                    logs.extend(report.log);
                }
                return Ok(RunSummary { dungeon_level, floors_cleared, outcome: RunOutcome::Stalled });
            }
            turns += 1;

            let p = &game.player;
            if p.potions > 0 && f64::from(p.health.hp) < f64::from(p.health.max_hp) * POTION_THRESHOLD {
                let report = game.use_potion(rules)?;
                if cfg.full_log {
                    logs.extend(report.log);
                }
            }

            let report = match choose_skill(game, rules) {
                Some(id) => game.use_skill(&id, rules, dice)?,
                None => game.attack(rules, dice)?,
            };
            let outcome = report.outcome;
            if cfg.full_log {
                logs.extend(report.log);
            }
            if outcome != Outcome::Ongoing {
                break outcome;
            }
        };

        match outcome {
            Outcome::Victory { .. } => {
                floors_cleared += 1;
                let report = game.continue_dungeon(rules, dice)?;
                if cfg.full_log {
                    logs.extend(report.log);
                }
            }
            Outcome::DungeonCleared { .. } => {
                return Ok(RunSummary { dungeon_level, floors_cleared: floors_cleared + 1, outcome: RunOutcome::Cleared });
            }
            Outcome::Defeat { .. } | Outcome::Escaped | Outcome::Ongoing => {
                return Ok(RunSummary { dungeon_level, floors_cleared, outcome: RunOutcome::Defeated });
            }
        }
    }
}

/// Strongest ready damage skill; otherwise a ready buff that is not already
/// running.
fn choose_skill(game: &Game, rules: &Rules) -> Option<String> {
    let player = &game.player;
    let class = rules.content.class(player.class).ok()?;
    let ready = class.skills.iter().filter(|s| {
        s.kind == SkillKind::Active && player.skill_level(&s.id) > 0 && player.cooldown(&s.id) == 0
    });

    let mut best: Option<(&str, f64)> = None;
    let mut buff: Option<&str> = None;
    for skill in ready {
        let level = player.skill_level(&skill.id);
        if let Some(damage) = &skill.effect.damage {
            let mult = damage.multiplier.at(level);
            if best.is_none_or(|(_, m)| mult > m) {
                best = Some((&skill.id, mult));
            }
        } else if skill.effect.buff.is_some()
            && buff.is_none()
            && !player.buffs.iter().any(|b| b.skill_id == skill.id)
        {
            buff = Some(&skill.id);
        }
    }
    best.map(|(id, _)| id).or(buff).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(seed: u64) -> SimConfig {
        SimConfig {
            class: ClassKind::Warrior,
            difficulty: Difficulty::Easy,
            name: default_name(),
            runs: 3,
            seed,
            max_turns: DEFAULT_MAX_TURNS,
            config_path: None,
            full_log: false,
        }
    }

    #[test]
    fn same_seed_same_story() {
        let a = simulate_run(config(7)).unwrap();
        let b = simulate_run(config(7)).unwrap();
        assert_eq!(a.log, b.log);
        assert_eq!(a.runs.len(), 3);
    }

    #[test]
    fn many_counts_every_run() {
        let stats = simulate_run_many(config(1), 4).unwrap();
        assert_eq!(stats.runs, 12);
        assert_eq!(stats.clears + stats.defeats + stats.stalls, 12);
        assert!(stats.best_dungeon_level >= 1);
    }
}
