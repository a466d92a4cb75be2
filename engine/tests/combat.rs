use engine::conditions::{ActiveStatus, StatusKind};
use engine::dungeon::Monster;
use engine::error::GameError;
use engine::life::Health;
use engine::{ClassKind, Dice, Difficulty, Game, Location, Outcome, Rules};

fn rules() -> Rules {
    Rules::builtin().unwrap()
}

/// New normal-difficulty game, already fighting the slime on floor 1.
fn fighting(rules: &Rules, class: ClassKind) -> Game {
    let mut game = Game::new(rules, "Hero", class, Difficulty::Normal).unwrap();
    game.enter_dungeon(rules, &mut Dice::from_scripted(vec![0.0])).unwrap();
    assert_eq!(game.monster().unwrap().template, "slime");
    game
}

fn monster_mut(game: &mut Game) -> &mut Monster {
    match &mut game.location {
        Location::Dungeon(run) => run.monster.as_mut().unwrap(),
        Location::Town => panic!("not in a dungeon"),
    }
}

#[test]
fn attack_then_monster_reply() {
    let rules = rules();
    let mut game = fighting(&rules, ClassKind::Warrior);
    // spread, crit | evade, spread, crit, on-hit
    let mut dice = Dice::from_scripted(vec![0.5, 0.5, 0.5, 0.5, 0.5, 0.5]);
    let report = game.attack(&rules, &mut dice).unwrap();

    assert_eq!(report.outcome, Outcome::Ongoing);
    assert_eq!(game.monster().unwrap().health.hp, 8);
    // slime 5 ATK against 3 DEF
    assert_eq!(game.player.hp(), 148);
    assert!(game.player.statuses.is_empty());
    assert!(report.log.iter().any(|l| l.starts_with("[ATK][Hero]")));
}

#[test]
fn crit_kill_pays_out_and_waits_for_continue() {
    let rules = rules();
    let mut game = fighting(&rules, ClassKind::Warrior);
    // spread 0.99 -> 14, crit -> 21 | gold roll, drop roll, loot pick
    let mut dice = Dice::from_scripted(vec![0.99, 0.05, 0.0, 0.0, 0.0]);
    let report = game.attack(&rules, &mut dice).unwrap();

    let Outcome::Victory { rewards } = report.outcome else {
        panic!("expected a victory, got {:?}", report.outcome);
    };
    assert_eq!((rewards.xp, rewards.gold), (25, 5));
    assert_eq!(rewards.loot.as_ref().map(|i| i.id), Some(102));
    assert_eq!(game.player.gold, 25);
    assert_eq!(game.player.xp, 25);
    assert_eq!(game.player.inventory.len(), 1);
    assert!(game.monster().is_none());

    assert!(matches!(game.attack(&rules, &mut dice), Err(GameError::NotInCombat)));
    game.continue_dungeon(&rules, &mut Dice::from_scripted(vec![0.0])).unwrap();
    assert_eq!(game.run().unwrap().floor, 2);
    assert!(game.monster().is_some());
}

#[test]
fn continue_requires_a_cleared_floor() {
    let rules = rules();
    let mut game = fighting(&rules, ClassKind::Warrior);
    let err = game.continue_dungeon(&rules, &mut Dice::from_scripted(vec![0.0])).unwrap_err();
    assert!(matches!(err, GameError::FloorNotCleared));
}

#[test]
fn evaded_attack_deals_nothing() {
    let rules = rules();
    let mut game = fighting(&rules, ClassKind::Warrior);
    let mut dice = Dice::from_scripted(vec![0.5, 0.5, 0.01]);
    game.attack(&rules, &mut dice).unwrap();
    assert_eq!(game.player.hp(), 150);
}

#[test]
fn stunned_player_loses_the_action() {
    let rules = rules();
    let mut game = fighting(&rules, ClassKind::Warrior);
    game.player.statuses.push(ActiveStatus { kind: StatusKind::Stun, turns_left: 1, potency: 0.0 });
    // only the monster's draws are consumed
    let mut dice = Dice::from_scripted(vec![0.5, 0.5, 0.5, 0.5]);
    game.attack(&rules, &mut dice).unwrap();

    assert_eq!(game.monster().unwrap().health.hp, 20);
    assert_eq!(game.player.hp(), 148);
    assert!(game.player.statuses.is_empty());
}

#[test]
fn damage_over_time_can_end_the_run() {
    let rules = rules();
    let mut game = fighting(&rules, ClassKind::Warrior);
    game.player.health.hp = 1;
    game.player.statuses.push(ActiveStatus { kind: StatusKind::Poison, turns_left: 3, potency: 0.03 });
    let report = game.attack(&rules, &mut Dice::from_scripted(vec![0.5])).unwrap();

    assert_eq!(report.outcome, Outcome::Defeat { gold_lost: 2 });
    assert!(game.in_town());
    assert_eq!(game.player.gold, 18);
    assert_eq!(game.player.hp(), 150);
    assert!(game.player.statuses.is_empty());
}

#[test]
fn monster_hit_can_defeat_the_player() {
    let rules = rules();
    let mut game = fighting(&rules, ClassKind::Warrior);
    game.player.health.hp = 2;
    let report = game.attack(&rules, &mut Dice::from_scripted(vec![0.5])).unwrap();
    assert!(matches!(report.outcome, Outcome::Defeat { .. }));
    assert_eq!(game.dungeon_level, 1);
}

#[test]
fn potion_heals_without_taking_a_turn() {
    let rules = rules();
    let mut game = fighting(&rules, ClassKind::Warrior);
    game.player.health.hp = 50;
    game.use_potion(&rules).unwrap();
    assert_eq!(game.player.hp(), 140);
    assert_eq!(game.player.potions, 1);
    assert_eq!(game.monster().unwrap().health.hp, 20);

    game.use_potion(&rules).unwrap();
    assert_eq!(game.player.hp(), 150);
    assert!(matches!(game.use_potion(&rules), Err(GameError::NoPotions)));
}

#[test]
fn skill_checks_happen_before_the_turn() {
    let rules = rules();
    let mut game = fighting(&rules, ClassKind::Warrior);
    let mut dice = Dice::from_scripted(vec![0.5]);

    let err = game.use_skill("w_power_strike", &rules, &mut dice).unwrap_err();
    assert!(matches!(err, GameError::SkillNotLearned(_)));

    game.player.learned_skills.insert("w_toughness".into(), 1);
    let err = game.use_skill("w_toughness", &rules, &mut dice).unwrap_err();
    assert!(matches!(err, GameError::NotActiveSkill(_)));

    game.player.learned_skills.insert("w_power_strike".into(), 1);
    game.player.cooldowns.insert("w_power_strike".into(), 2);
    let err = game.use_skill("w_power_strike", &rules, &mut dice).unwrap_err();
    assert!(matches!(err, GameError::SkillOnCooldown { remaining: 2, .. }));

    assert!(matches!(game.use_skill("m_fireball", &rules, &mut dice), Err(GameError::UnknownSkill(_))));
    assert_eq!(game.monster().unwrap().health.hp, 20);
}

#[test]
fn power_strike_can_stun_the_monster() {
    let rules = rules();
    let mut game = fighting(&rules, ClassKind::Warrior);
    game.player.learned_skills.insert("w_power_strike".into(), 1);
    monster_mut(&mut game).health = Health::new(30);
    // crit miss, stun roll 0.1 < 0.25; the stunned monster draws nothing
    let mut dice = Dice::from_scripted(vec![0.5, 0.1]);
    game.use_skill("w_power_strike", &rules, &mut dice).unwrap();

    let monster = game.monster().unwrap();
    assert_eq!(monster.health.hp, 9);
    assert!(monster.statuses.is_empty());
    assert_eq!(game.player.hp(), 150);
    assert_eq!(game.player.cooldown("w_power_strike"), 3);

    game.attack(&rules, &mut Dice::from_scripted(vec![0.5, 0.5, 0.9])).unwrap();
    assert_eq!(game.player.cooldown("w_power_strike"), 2);
}

#[test]
fn fireball_burns_on_the_monster_turn() {
    let rules = rules();
    let mut game = fighting(&rules, ClassKind::Mage);
    game.player.learned_skills.insert("m_fireball".into(), 1);
    monster_mut(&mut game).health = Health::new(100);
    // crit | evade, spread, crit, on-hit
    let mut dice = Dice::from_scripted(vec![0.5, 0.5, 0.5, 0.5, 0.5]);
    game.use_skill("m_fireball", &rules, &mut dice).unwrap();

    let monster = game.monster().unwrap();
    // 32 from the blast, 4 from the first burn tick
    assert_eq!(monster.health.hp, 64);
    assert_eq!(monster.statuses[0].kind, StatusKind::Burn);
    assert_eq!(monster.statuses[0].turns_left, 2);
    assert_eq!(game.player.hp(), 105);
}

#[test]
fn iron_will_buff_raises_defense_for_its_duration() {
    let rules = rules();
    let mut game = fighting(&rules, ClassKind::Warrior);
    game.player.learned_skills.insert("w_iron_will".into(), 1);
    let mut dice = Dice::from_scripted(vec![0.5, 0.5, 0.5, 0.9]);
    game.use_skill("w_iron_will", &rules, &mut dice).unwrap();

    assert_eq!(game.player.stats.defense, 4);
    assert_eq!(game.player.hp(), 149);
    assert_eq!(game.player.cooldown("w_iron_will"), 5);

    monster_mut(&mut game).health = Health::new(1000);
    for _ in 0..3 {
        game.attack(&rules, &mut Dice::from_scripted(vec![0.5, 0.5, 0.9])).unwrap();
        assert_eq!(game.player.stats.defense, 4);
    }
    game.attack(&rules, &mut Dice::from_scripted(vec![0.5, 0.5, 0.9])).unwrap();
    assert!(game.player.buffs.is_empty());
    assert_eq!(game.player.stats.defense, 3);
}

#[test]
fn escape_returns_to_town_without_penalty() {
    let rules = rules();
    let mut game = fighting(&rules, ClassKind::Warrior);
    game.player.health.hp = 10;
    game.player.statuses.push(ActiveStatus { kind: StatusKind::Weaken, turns_left: 2, potency: 0.25 });
    game.player.recalculate(&rules);
    assert_eq!(game.player.stats.attack_power, 9);
    let report = game.escape(&rules).unwrap();

    assert_eq!(report.outcome, Outcome::Escaped);
    assert!(game.in_town());
    assert_eq!(game.player.gold, 20);
    assert_eq!(game.player.hp(), 150);
    assert_eq!(game.player.stats.attack_power, 12);
    assert!(matches!(game.escape(&rules), Err(GameError::NotInCombat)));
}

#[test]
fn boss_kill_opens_the_next_dungeon() {
    let rules = rules();
    let mut game = fighting(&rules, ClassKind::Warrior);
    if let Location::Dungeon(run) = &mut game.location {
        run.floor = 2;
        run.monster = None;
    }
    game.continue_dungeon(&rules, &mut Dice::from_scripted(vec![0.0])).unwrap();
    assert!(game.monster().unwrap().boss);
    monster_mut(&mut game).health.hp = 1;

    // spread, crit | gold roll, drop roll (0.9 misses)
    let report = game.attack(&rules, &mut Dice::from_scripted(vec![0.5, 0.5, 0.0, 0.9])).unwrap();
    let Outcome::DungeonCleared { rewards, next_level } = report.outcome else {
        panic!("expected a clear, got {:?}", report.outcome);
    };
    assert_eq!(next_level, 2);
    assert_eq!((rewards.xp, rewards.gold), (200, 100));
    assert!(rewards.loot.is_none());
    assert!(game.in_town());
    assert_eq!(game.dungeon_level, 2);
    // 200 XP: one level at 100, next threshold 150
    assert_eq!((game.player.level, game.player.xp, game.player.xp_to_next_level), (2, 100, 150));
}

#[test]
fn message_log_is_bounded_and_newest_first() {
    let rules = rules();
    let mut game = fighting(&rules, ClassKind::Warrior);
    monster_mut(&mut game).health = Health::new(1000);
    let mut dice = Dice::from_scripted(vec![0.5]);
    let mut last = None;
    for _ in 0..3 {
        last = Some(game.attack(&rules, &mut dice).unwrap());
    }
    let last = last.unwrap();

    assert_eq!(game.messages.len(), rules.config.message_log_len);
    assert_eq!(game.messages.front(), last.log.last());
    assert_eq!(game.messages[0], "[HP][Hero] 146 → 144 (−2)");
    assert_eq!(game.messages[1], last.log[last.log.len() - 2]);
    assert_eq!(game.player.hp(), 144);
}

#[test]
fn burn_can_finish_the_monster_before_it_acts() {
    let rules = rules();
    let mut game = fighting(&rules, ClassKind::Warrior);
    let monster = monster_mut(&mut game);
    monster.health = Health::new(30);
    monster.statuses.push(ActiveStatus { kind: StatusKind::Burn, turns_left: 2, potency: 50.0 });
    // spread, crit | gold roll, drop roll
    let report = game.attack(&rules, &mut Dice::from_scripted(vec![0.5, 0.5, 0.0, 0.9])).unwrap();

    let Outcome::Victory { rewards } = report.outcome else {
        panic!("expected a victory, got {:?}", report.outcome);
    };
    assert_eq!((rewards.xp, rewards.gold), (25, 5));
    assert!(rewards.loot.is_none());
    assert_eq!(game.player.hp(), 150);
    assert!(report.log.iter().any(|l| l == "[STATUS][Slime] Burn deals 50"));
}

#[test]
fn shadow_strike_bonus_crit_and_poison() {
    let rules = rules();
    let mut game = fighting(&rules, ClassKind::Rogue);
    game.player.learned_skills.insert("r_shadow_strike".into(), 1);
    monster_mut(&mut game).health = Health::new(100);
    // 0.5 only crits thanks to the +30% bonus on top of 25%
    let mut dice = Dice::from_scripted(vec![0.5]);
    game.use_skill("r_shadow_strike", &rules, &mut dice).unwrap();

    let monster = game.monster().unwrap();
    // 12 * 1.5 = 18, crit 27, then 5 poison on its own turn
    assert_eq!(monster.health.hp, 68);
    assert_eq!(monster.statuses, vec![ActiveStatus { kind: StatusKind::Poison, turns_left: 2, potency: 0.05 }]);
    assert_eq!(game.player.hp(), 111);
    assert_eq!(game.player.cooldown("r_shadow_strike"), 4);
}

#[test]
fn weakened_monster_hits_softer() {
    let rules = rules();
    let mut game = fighting(&rules, ClassKind::Warrior);
    let monster = monster_mut(&mut game);
    monster.health = Health::new(1000);
    monster.attack_power = 20;
    monster.statuses.push(ActiveStatus { kind: StatusKind::Weaken, turns_left: 3, potency: 0.5 });
    game.attack(&rules, &mut Dice::from_scripted(vec![0.5])).unwrap();
    // floor(20 * 0.5) = 10 against 3 DEF
    assert_eq!(game.player.hp(), 143);

    monster_mut(&mut game).statuses.clear();
    game.attack(&rules, &mut Dice::from_scripted(vec![0.5])).unwrap();
    assert_eq!(game.player.hp(), 126);
}

#[test]
fn ice_lance_leaves_the_monster_vulnerable() {
    let rules = rules();
    let mut game = fighting(&rules, ClassKind::Mage);
    game.player.learned_skills.insert("m_ice_lance".into(), 1);
    monster_mut(&mut game).health = Health::new(100);
    let mut dice = Dice::from_scripted(vec![0.5]);
    game.use_skill("m_ice_lance", &rules, &mut dice).unwrap();

    let monster = game.monster().unwrap();
    // 16 * 2.5
    assert_eq!(monster.health.hp, 60);
    assert_eq!(monster.statuses, vec![ActiveStatus { kind: StatusKind::Vulnerable, turns_left: 1, potency: 0.25 }]);

    game.attack(&rules, &mut dice).unwrap();
    // floor(16 * 1.25) = 20
    let monster = game.monster().unwrap();
    assert_eq!(monster.health.hp, 40);
    assert!(monster.statuses.is_empty());
    assert_eq!(game.player.hp(), 100);
}
