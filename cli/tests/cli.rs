use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn cli(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("cli").unwrap();
    cmd.arg("--save").arg(dir.path().join("save.json"));
    cmd
}

fn new_game(dir: &TempDir) {
    cli(dir)
        .args(["new", "--name", "Ayla", "--class", "mage"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Ayla the mage (level 1, 0/100 XP, 0 SP)"));
}

#[test]
fn new_game_is_saved_and_reloaded() {
    let dir = TempDir::new().unwrap();
    new_game(&dir);
    cli(&dir)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("HP 110/110  ATK 16  DEF 0"))
        .stdout(predicate::str::contains("In town, next dungeon 1 (normal)"));

    let saved = std::fs::read_to_string(dir.path().join("save.json")).unwrap();
    assert!(saved.contains("dungeon-rpg-save"));
}

#[test]
fn missing_save_asks_for_a_new_game() {
    let dir = TempDir::new().unwrap();
    cli(&dir)
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("start one with `new`"));
}

#[test]
fn rule_errors_fail_the_command() {
    let dir = TempDir::new().unwrap();
    new_game(&dir);
    cli(&dir)
        .arg("attack")
        .assert()
        .failure()
        .stderr(predicate::str::contains("there is no fight in progress"));
}

#[test]
fn entering_spawns_the_first_floor() {
    let dir = TempDir::new().unwrap();
    new_game(&dir);
    cli(&dir)
        .args(["--seed", "5", "enter"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[DUNGEON] entered dungeon 1 floor 1/3"));
    cli(&dir)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Dungeon 1 floor 1/3"));
    cli(&dir)
        .arg("shop")
        .assert()
        .success();
    cli(&dir)
        .arg("buy-potion")
        .assert()
        .failure()
        .stderr(predicate::str::contains("only be done in town"));
}

#[test]
fn quests_and_dump() {
    let dir = TempDir::new().unwrap();
    new_game(&dir);
    cli(&dir)
        .arg("quests")
        .assert()
        .success()
        .stdout(predicate::str::contains("0. "))
        .stdout(predicate::str::contains("[open]"));
    cli(&dir)
        .args(["dump"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"version\": 1"));
}

#[test]
fn simulate_run_prints_a_table() {
    Command::cargo_bin("simulate-run")
        .unwrap()
        .args(["--trials", "3", "--runs", "2", "--class", "rogue"])
        .assert()
        .success()
        .stdout(predicate::str::contains("clear rate:"))
        .stdout(predicate::str::contains("rogue (normal)"));
}

#[test]
fn simulate_run_rejects_unknown_classes() {
    Command::cargo_bin("simulate-run")
        .unwrap()
        .args(["--class", "bard"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown class 'bard'"));
}

#[test]
fn skill_tree_lists_effects() {
    let dir = TempDir::new().unwrap();
    cli(&dir)
        .args(["new", "--class", "warrior"])
        .assert()
        .success();
    cli(&dir)
        .arg("skills")
        .assert()
        .success()
        .stdout(predicate::str::contains("Power Strike 0/5 (lvl 3) [locked]"))
        .stdout(predicate::str::contains("deals 170% of attack power; 25% chance to inflict Stun for 1 turns"));
}
