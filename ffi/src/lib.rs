use anyhow::{Context, Result};
use engine::api::{load_rules, simulate_run, simulate_run_many, SimConfig};
use engine::town::TrainingStat;
use engine::{ClassKind, Dice, Difficulty, Game, Slot};
use jni::objects::{JClass, JString};
use jni::sys::jstring;
use jni::JNIEnv;
use serde::Deserialize;
use serde_json::{json, Value};

const VERSION: &str = concat!("dungeon-ffi ", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct NewGameRequest {
    #[serde(default = "default_name")]
    name: String,
    class: ClassKind,
    difficulty: Difficulty,
    #[serde(default)]
    seed: u64,
    /// Calendar key for the first quest board.
    #[serde(default)]
    date: Option<String>,
}

fn default_name() -> String {
    "Hero".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Action {
    Enter,
    Continue,
    Attack,
    Skill { id: String },
    Potion,
    Escape,
    BuyPotion,
    Buy { item_id: u32 },
    Train { stat: TrainingStat },
    Learn { id: String },
    Equip { index: usize },
    Unequip { slot: Slot },
    Enhance { slot: Slot },
    RefreshQuests { date: String },
    Claim { index: usize },
}

#[derive(Debug, Deserialize)]
struct ActRequest {
    /// A save document as produced by `newGameJson` / `actJson`.
    save: Value,
    action: Action,
    #[serde(default)]
    seed: u64,
}

fn envelope(result: Result<Value>) -> String {
    let payload = match result {
        Ok(value) => json!({ "ok": true, "result": value }),
        Err(e) => json!({ "ok": false, "error": format!("{:#}", e) }),
    };
    payload.to_string()
}

fn save_value(game: &Game) -> Result<Value> {
    let text = engine::save::to_json(game)?;
    Ok(serde_json::from_str(&text)?)
}

pub fn new_game_internal(input: &str) -> Result<Value> {
    let req: NewGameRequest = serde_json::from_str(input).context("invalid_config")?;
    let rules = load_rules(None)?;
    let mut dice = Dice::from_seed(req.seed);
    let mut game = Game::new(&rules, &req.name, req.class, req.difficulty)?;
    if let Some(date) = &req.date {
        game.refresh_daily_quests(date, &rules, &mut dice);
    }
    Ok(json!({ "save": save_value(&game)?, "status": game.status() }))
}

/// Applies one action to a save document and returns the new document with
/// what happened.
pub fn act_internal(input: &str) -> Result<Value> {
    let req: ActRequest = serde_json::from_str(input).context("invalid_request")?;
    let rules = load_rules(None)?;
    let mut game = engine::save::from_json(&req.save.to_string())?;
    let mut dice = Dice::from_seed(req.seed);

    let report = match req.action {
        Action::Enter => serde_json::to_value(game.enter_dungeon(&rules, &mut dice)?)?,
        Action::Continue => serde_json::to_value(game.continue_dungeon(&rules, &mut dice)?)?,
        Action::Attack => serde_json::to_value(game.attack(&rules, &mut dice)?)?,
        Action::Skill { id } => serde_json::to_value(game.use_skill(&id, &rules, &mut dice)?)?,
        Action::Potion => serde_json::to_value(game.use_potion(&rules)?)?,
        Action::Escape => serde_json::to_value(game.escape(&rules)?)?,
        Action::Claim { index } => serde_json::to_value(game.claim_quest(index, &rules)?)?,
        Action::BuyPotion => json!({ "potions": game.buy_potion(&rules)? }),
        Action::Buy { item_id } => json!({ "item": game.buy_item(item_id, &rules)? }),
        Action::Train { stat } => json!({ "cost": game.train(stat, &rules)? }),
        Action::Learn { id } => json!({ "level": game.learn_skill(&id, &rules)? }),
        Action::Equip { index } => json!({ "unequipped": game.equip(index, &rules)? }),
        Action::Unequip { slot } => json!({ "item": game.unequip(slot, &rules)? }),
        Action::Enhance { slot } => {
            let (outcome, log) = game.enhance(slot, &rules, &mut dice)?;
            json!({ "enhance": outcome, "log": log })
        }
        Action::RefreshQuests { date } => {
            json!({ "rerolled": game.refresh_daily_quests(&date, &rules, &mut dice) })
        }
    };

    Ok(json!({ "save": save_value(&game)?, "report": report, "status": game.status() }))
}

pub fn simulate_run_internal(input: &str) -> Result<Value> {
    let cfg: SimConfig = serde_json::from_str(input).context("invalid_config")?;
    Ok(serde_json::to_value(simulate_run(cfg)?)?)
}

pub fn simulate_run_many_internal(input: &str) -> Result<Value> {
    let mut root: Value = serde_json::from_str(input).context("invalid_config")?;
    let samples = root.get("samples").and_then(|v| v.as_u64()).unwrap_or(100) as u32;
    if let Some(obj) = root.as_object_mut() {
        obj.remove("samples");
    }
    let cfg: SimConfig = serde_json::from_value(root).context("invalid_config")?;
    Ok(serde_json::to_value(simulate_run_many(cfg, samples)?)?)
}

fn respond(env: &mut JNIEnv, json: &JString, f: fn(&str) -> Result<Value>) -> jstring {
    engine::telemetry::init(0);
    let body = match env.get_string(json) {
        Ok(s) => {
            let input: String = s.into();
            envelope(f(&input))
        }
        Err(e) => envelope(Err(anyhow::anyhow!("bad input string: {}", e))),
    };
    match env.new_string(body) {
        Ok(s) => s.into_raw(),
        Err(_) => std::ptr::null_mut(),
    }
}

#[no_mangle]
pub extern "system" fn Java_com_dungeonrpg_Ffi_version(env: JNIEnv, _class: JClass) -> jstring {
    match env.new_string(VERSION) {
        Ok(s) => s.into_raw(),
        Err(_) => std::ptr::null_mut(),
    }
}

#[no_mangle]
pub extern "system" fn Java_com_dungeonrpg_Ffi_newGameJson(
    mut env: JNIEnv,
    _class: JClass,
    json: JString,
) -> jstring {
    respond(&mut env, &json, new_game_internal)
}

#[no_mangle]
pub extern "system" fn Java_com_dungeonrpg_Ffi_actJson(
    mut env: JNIEnv,
    _class: JClass,
    json: JString,
) -> jstring {
    respond(&mut env, &json, act_internal)
}

#[no_mangle]
pub extern "system" fn Java_com_dungeonrpg_Ffi_simulateRunJson(
    mut env: JNIEnv,
    _class: JClass,
    json: JString,
) -> jstring {
    respond(&mut env, &json, simulate_run_internal)
}

#[no_mangle]
pub extern "system" fn Java_com_dungeonrpg_Ffi_simulateRunManyJson(
    mut env: JNIEnv,
    _class: JClass,
    json: JString,
) -> jstring {
    respond(&mut env, &json, simulate_run_many_internal)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_save() -> Value {
        let out = new_game_internal(r#"{"class":"warrior","difficulty":"normal","date":"2024-05-01"}"#).unwrap();
        out["save"].clone()
    }

    #[test]
    fn new_game_is_versioned_and_in_town() {
        let save = new_save();
        assert_eq!(save["version"], 1);
        assert_eq!(save["state"]["location"]["kind"], "town");
        assert_eq!(save["state"]["quests"]["quests"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn act_threads_the_save_through() {
        let req = json!({ "save": new_save(), "action": { "type": "enter" }, "seed": 3 });
        let out = act_internal(&req.to_string()).unwrap();
        assert_eq!(out["save"]["state"]["location"]["kind"], "dungeon");
        assert_eq!(out["report"]["outcome"]["outcome"], "ongoing");
    }

    #[test]
    fn rule_errors_come_back_in_the_envelope() {
        let req = json!({ "save": new_save(), "action": { "type": "attack" } });
        let body: Value = serde_json::from_str(&envelope(act_internal(&req.to_string()))).unwrap();
        assert_eq!(body["ok"], false);
        assert!(body["error"].as_str().unwrap().contains("no fight"));
    }
}
