use std::{collections::BTreeMap, fs, path::PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use encoding_rs::Encoding;
use engine::api::load_rules;
use engine::save::{load_game, save_game, SaveStore};
use engine::skills::NodeState;
use engine::town::TrainingStat;
use engine::{ActionReport, ClassKind, Dice, Difficulty, Game, GameError, Outcome, Rules, Slot};

#[derive(Copy, Clone, ValueEnum)]
enum ClassArg {
    Warrior,
    Mage,
    Rogue,
}

#[derive(Copy, Clone, ValueEnum)]
enum DifficultyArg {
    Easy,
    Normal,
    Hard,
}

#[derive(Copy, Clone, ValueEnum)]
enum SlotArg {
    Weapon,
    Armor,
}

#[derive(Copy, Clone, ValueEnum)]
enum StatArg {
    Hp,
    Atk,
    Def,
}

impl From<ClassArg> for ClassKind {
    fn from(c: ClassArg) -> Self {
        match c {
            ClassArg::Warrior => ClassKind::Warrior,
            ClassArg::Mage => ClassKind::Mage,
            ClassArg::Rogue => ClassKind::Rogue,
        }
    }
}

impl From<DifficultyArg> for Difficulty {
    fn from(d: DifficultyArg) -> Self {
        match d {
            DifficultyArg::Easy => Difficulty::Easy,
            DifficultyArg::Normal => Difficulty::Normal,
            DifficultyArg::Hard => Difficulty::Hard,
        }
    }
}

impl From<SlotArg> for Slot {
    fn from(s: SlotArg) -> Self {
        match s {
            SlotArg::Weapon => Slot::Weapon,
            SlotArg::Armor => Slot::Armor,
        }
    }
}

impl From<StatArg> for TrainingStat {
    fn from(s: StatArg) -> Self {
        match s {
            StatArg::Hp => TrainingStat::MaxHp,
            StatArg::Atk => TrainingStat::AttackPower,
            StatArg::Def => TrainingStat::Defense,
        }
    }
}

#[derive(Subcommand)]
enum Cmd {
    /// Start a new character, replacing any existing save
    New {
        /// Character name
        #[arg(long, default_value = "Hero")]
        name: String,
        #[arg(long, value_enum, default_value_t = ClassArg::Warrior)]
        class: ClassArg,
        #[arg(long, value_enum, default_value_t = DifficultyArg::Normal)]
        difficulty: DifficultyArg,
    },
    /// Show the character sheet and location
    Status,
    /// Enter the next dungeon from town
    Enter,
    /// Basic attack
    Attack,
    /// Use an active skill by id
    Skill { id: String },
    /// Drink a potion (free action)
    Potion,
    /// Flee back to town
    Escape,
    /// Go down to the next floor after a victory
    Continue,
    /// List the shop's stock
    Shop,
    /// Buy an item from the shop by id
    Buy { item_id: u32 },
    /// Buy one potion
    BuyPotion,
    /// Pay for a training session
    Train {
        #[arg(value_enum)]
        stat: StatArg,
    },
    /// Show the skill tree
    Skills,
    /// Spend a skill point
    Learn { id: String },
    /// Equip an inventory item by index
    Equip { index: usize },
    /// Move an equipped item back to the inventory
    Unequip {
        #[arg(value_enum)]
        slot: SlotArg,
    },
    /// Attempt to enhance an equipped item
    Enhance {
        #[arg(value_enum)]
        slot: SlotArg,
    },
    /// Show today's quests
    Quests,
    /// Claim a completed quest by index
    Claim { index: usize },
    /// Print the raw save document
    Dump {
        /// Single-line JSON
        #[arg(long)]
        compact: bool,
    },
}

#[derive(Parser)]
#[command(name = "dungeon-cli")]
#[command(about = "Play a saved dungeon RPG one command at a time")]
struct Cli {
    /// Save file (JSON)
    #[arg(long, global = true, default_value = "dungeon-save.json")]
    save: PathBuf,
    /// RNG seed for this command (defaults to the clock)
    #[arg(long, global = true)]
    seed: Option<u64>,
    /// YAML rules file replacing the built-in config
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// More diagnostics on stderr (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    cmd: Cmd,
}

fn read_text_auto(path: &std::path::Path) -> anyhow::Result<String> {
    let bytes = fs::read(path)?;
    if let Some((enc, bom_len)) = Encoding::for_bom(&bytes) {
        let (cow, _, _) = enc.decode(&bytes[bom_len..]);
        Ok(cow.into_owned())
    } else {
        Ok(String::from_utf8(bytes)?)
    }
}

/// A JSON object on disk mapping storage keys to saved documents.
struct FileStore {
    path: PathBuf,
}

impl FileStore {
    fn entries(&self) -> engine::error::Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let text = read_text_auto(&self.path)
            .map_err(|e| GameError::Save(format!("{}: {}", self.path.display(), e)))?;
        serde_json::from_str(&text).map_err(|e| GameError::Save(format!("{}: {}", self.path.display(), e)))
    }
}

impl SaveStore for FileStore {
    fn load(&self, key: &str) -> engine::error::Result<Option<String>> {
        Ok(self.entries()?.remove(key))
    }

    fn store(&mut self, key: &str, value: String) -> engine::error::Result<()> {
        let mut entries = self.entries()?;
        entries.insert(key.to_string(), value);
        let text = serde_json::to_string_pretty(&entries).map_err(|e| GameError::Save(e.to_string()))?;
        fs::write(&self.path, text).map_err(|e| GameError::Save(format!("{}: {}", self.path.display(), e)))
    }
}

fn clock_seed() -> u64 {
    chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default() as u64
}

fn today() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}

fn print_report(report: &ActionReport) {
    for line in &report.log {
        println!("{}", line);
    }
    match &report.outcome {
        Outcome::Ongoing => {}
        Outcome::Victory { rewards } => {
            println!("Victory! +{} XP, +{} gold. Run `continue` for the next floor.", rewards.xp, rewards.gold)
        }
        Outcome::DungeonCleared { next_level, .. } => {
            println!("Dungeon cleared! Dungeon {} is now open.", next_level)
        }
        Outcome::Defeat { gold_lost } => println!("Defeated. Lost {} gold.", gold_lost),
        Outcome::Escaped => println!("Escaped to town."),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    engine::telemetry::init(cli.verbose);

    let config_path = cli.config.as_ref().map(|p| p.to_string_lossy().into_owned());
    let rules: Rules = load_rules(config_path.as_deref())?;
    let mut dice = Dice::from_seed(cli.seed.unwrap_or_else(clock_seed));
    let mut store = FileStore { path: cli.save.clone() };

    let mut game = match &cli.cmd {
        Cmd::New { name, class, difficulty } => {
            Game::new(&rules, name, (*class).into(), (*difficulty).into())?
        }
        _ => match load_game(&store).with_context(|| format!("failed to read {}", cli.save.display()))? {
            Some(game) => game,
            None => bail!("no saved game in {}; start one with `new`", cli.save.display()),
        },
    };
    game.refresh_daily_quests(&today(), &rules, &mut dice);

    match cli.cmd {
        Cmd::New { .. } | Cmd::Status => println!("{}", game.status()),
        Cmd::Enter => print_report(&game.enter_dungeon(&rules, &mut dice)?),
        Cmd::Attack => print_report(&game.attack(&rules, &mut dice)?),
        Cmd::Skill { id } => print_report(&game.use_skill(&id, &rules, &mut dice)?),
        Cmd::Potion => print_report(&game.use_potion(&rules)?),
        Cmd::Escape => print_report(&game.escape(&rules)?),
        Cmd::Continue => print_report(&game.continue_dungeon(&rules, &mut dice)?),
        Cmd::Shop => {
            println!("Potion: {} G (you have {})", rules.config.potion_cost, game.player.potions);
            for item in game.shop_stock(&rules) {
                println!("{:>4}  {} [{}] {}  {} G", item.id, item.name, item.slot, item.stats.summary(), item.cost);
            }
        }
        Cmd::Buy { item_id } => {
            let item = game.buy_item(item_id, &rules)?;
            println!("Bought {} ({} gold left)", item.name, game.player.gold);
        }
        Cmd::BuyPotion => {
            let potions = game.buy_potion(&rules)?;
            println!("Bought a potion ({} held, {} gold left)", potions, game.player.gold);
        }
        Cmd::Train { stat } => {
            let stat: TrainingStat = stat.into();
            let cost = game.train(stat, &rules)?;
            println!("Trained {:?} for {} gold; next session costs {}", stat, cost, game.training.get(stat));
        }
        Cmd::Skills => {
            println!("Skill points: {}", game.player.skill_points);
            for node in game.skill_tree(&rules)? {
                let mark = match node.state {
                    NodeState::Maxed => "max",
                    NodeState::Learnable => "can learn",
                    NodeState::Learned => "learned",
                    NodeState::Locked => "locked",
                };
                println!(
                    "{:<16} {} {}/{} (lvl {}) [{}]",
                    node.id, node.name, node.level, node.max_level, node.required_level, mark
                );
                println!("{:<16} {}", "", node.description);
            }
        }
        Cmd::Learn { id } => {
            let level = game.learn_skill(&id, &rules)?;
            println!("Learned {} (level {})", id, level);
        }
        Cmd::Equip { index } => {
            let previous = game.equip(index, &rules)?;
            if let Some(prev) = previous {
                println!("Unequipped {}", prev.display_name());
            }
            println!("{}", game.status());
        }
        Cmd::Unequip { slot } => {
            let item = game.unequip(slot.into(), &rules)?;
            println!("Unequipped {}", item.display_name());
        }
        Cmd::Enhance { slot } => {
            let (_, log) = game.enhance(slot.into(), &rules, &mut dice)?;
            for line in log {
                println!("{}", line);
            }
        }
        Cmd::Quests => {
            for (i, q) in game.quests.quests.iter().enumerate() {
                let state = if q.claimed {
                    "claimed"
                } else if q.is_complete() {
                    "complete"
                } else {
                    "open"
                };
                println!(
                    "{}. {} {}/{} ({} G, {} XP) [{}]",
                    i, q.description, q.progress, q.target, q.reward_gold, q.reward_xp, state
                );
            }
        }
        Cmd::Claim { index } => print_report(&game.claim_quest(index, &rules)?),
        Cmd::Dump { compact } => {
            let doc = engine::save::to_json(&game)?;
            if compact {
                println!("{}", doc);
            } else {
                let value: serde_json::Value = serde_json::from_str(&doc)?;
                println!("{}", serde_json::to_string_pretty(&value)?);
            }
        }
    }

    save_game(&mut store, &game).context("failed to write save")?;
    Ok(())
}
