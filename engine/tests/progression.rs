use engine::conditions::{ActiveStatus, StatusKind};
use engine::error::GameError;
use engine::skills::{ActiveBuff, NodeState};
use engine::{ClassKind, Difficulty, Game, Player, Rules, StatKind};
use proptest::prelude::*;

fn rules() -> Rules {
    Rules::builtin().unwrap()
}

fn warrior(rules: &Rules) -> Player {
    Player::new(rules, "Hero", ClassKind::Warrior, Difficulty::Normal).unwrap()
}

fn noop_log(_: String) {}

#[test]
fn class_templates_and_difficulty_purse() {
    let rules = rules();
    let mage = Player::new(&rules, "Mira", ClassKind::Mage, Difficulty::Easy).unwrap();
    assert_eq!((mage.stats.max_hp, mage.stats.attack_power, mage.stats.defense), (110, 16, 0));
    assert_eq!((mage.gold, mage.potions), (50, 5));

    let rogue = Player::new(&rules, "Rin", ClassKind::Rogue, Difficulty::Hard).unwrap();
    assert_eq!(rogue.stats.evade_chance, 0.18);
    assert_eq!((rogue.gold, rogue.potions), (0, 1));
    assert_eq!(rogue.hp(), 115);
}

#[test]
fn xp_overflow_carries_across_several_levels() {
    let rules = rules();
    let mut p = warrior(&rules);
    let gained = p.gain_xp(400, &rules, noop_log);
    assert_eq!(gained, 2);
    assert_eq!((p.level, p.xp, p.xp_to_next_level, p.skill_points), (3, 150, 225, 2));
}

#[test]
fn learning_rules_are_checked_in_order() {
    let rules = rules();
    let mut p = warrior(&rules);

    let err = engine::skills::learn_skill(&mut p, &rules, "w_toughness").unwrap_err();
    assert!(matches!(err, GameError::NoSkillPoints));

    p.skill_points = 1;
    let err = engine::skills::learn_skill(&mut p, &rules, "w_toughness").unwrap_err();
    assert!(matches!(err, GameError::LevelTooLow { required: 2 }));

    p.level = 4;
    let err = engine::skills::learn_skill(&mut p, &rules, "w_armor_up").unwrap_err();
    assert!(matches!(err, GameError::DependenciesUnmet(_)));

    p.learned_skills.insert("w_toughness".into(), 5);
    let err = engine::skills::learn_skill(&mut p, &rules, "w_toughness").unwrap_err();
    assert!(matches!(err, GameError::SkillMaxed(_)));
    assert_eq!(p.skill_points, 1);

    let err = engine::skills::learn_skill(&mut p, &rules, "nope").unwrap_err();
    assert!(matches!(err, GameError::UnknownSkill(_)));
}

#[test]
fn passive_hp_is_granted_immediately() {
    let rules = rules();
    let mut p = warrior(&rules);
    p.level = 2;
    p.skill_points = 1;
    p.health.hp = 100;
    let level = engine::skills::learn_skill(&mut p, &rules, "w_toughness").unwrap();
    assert_eq!(level, 1);
    assert_eq!(p.stats.max_hp, 175);
    assert_eq!(p.hp(), 125);
    assert_eq!(p.skill_points, 0);
}

#[test]
fn percent_passive_is_floored() {
    let rules = rules();
    let mut p = Player::new(&rules, "Mira", ClassKind::Mage, Difficulty::Normal).unwrap();
    p.learned_skills.insert("m_knowledge".into(), 1);
    p.recalculate(&rules);
    assert_eq!(p.stats.attack_power, 17);
}

#[test]
fn buffs_and_weaken_apply_after_gear() {
    let rules = rules();
    let mut p = warrior(&rules);
    p.equipment.replace(rules.content.item(101).unwrap().clone());
    p.buffs.push(ActiveBuff {
        skill_id: "test".into(),
        name: "Test".into(),
        turns_left: 2,
        stat: StatKind::AttackPower,
        value: 0.5,
        percent: true,
    });
    p.recalculate(&rules);
    // (12 + 2) * 1.5
    assert_eq!(p.stats.attack_power, 21);

    p.statuses.push(ActiveStatus { kind: StatusKind::Weaken, turns_left: 2, potency: 0.25 });
    p.recalculate(&rules);
    assert_eq!(p.stats.attack_power, 15);
}

#[test]
fn skill_tree_reports_node_states() {
    let rules = rules();
    let mut p = warrior(&rules);
    p.level = 3;
    p.skill_points = 1;
    p.learned_skills.insert("w_toughness".into(), 5);
    let tree = engine::skills::skill_tree(&p, &rules).unwrap();
    let states: Vec<NodeState> = tree.iter().map(|n| n.state).collect();
    assert_eq!(
        states,
        vec![NodeState::Maxed, NodeState::Learnable, NodeState::Locked, NodeState::Locked]
    );
    assert_eq!(tree[0].description, "MaxHp +125");
    assert_eq!(tree[3].description, "Defense +40% for 3 turns");
}

#[test]
fn status_sheet_for_a_new_warrior() {
    let rules = rules();
    let game = Game::new(&rules, "Hero", ClassKind::Warrior, Difficulty::Normal).unwrap();
    insta::assert_snapshot!(game.status(), @r"
    Hero the warrior (level 1, 0/100 XP, 0 SP)
    HP 150/150  ATK 12  DEF 3  CRIT 10%  EVADE 5%
    Gold 20  Potions 2
    weapon: -
    armor: -
    In town, next dungeon 1 (normal)
    ");
}

proptest! {
    #[test]
    fn hp_stays_within_bounds(
        hp in -50i32..400,
        toughness in 0u32..=5,
        armor in prop::option::of(prop::sample::select(vec![102u32, 103, 202, 203, 302, 303])),
        enhancement in 0u8..=10,
        with_gain in any::<bool>(),
    ) {
        let rules = rules();
        let mut p = warrior(&rules);
        p.health.hp = hp.clamp(0, p.health.max_hp);
        if toughness > 0 {
            p.learned_skills.insert("w_toughness".into(), toughness);
        }
        if let Some(id) = armor {
            let mut item = rules.content.item(id).unwrap().clone();
            item.enhancement = enhancement;
            p.equipment.replace(item);
        }
        if with_gain {
            p.recalculate_with_gain(&rules);
        } else {
            p.recalculate(&rules);
        }
        prop_assert!(p.hp() >= 0);
        prop_assert!(p.hp() <= p.stats.max_hp);
        prop_assert_eq!(p.health.max_hp, p.stats.max_hp);
        prop_assert!(p.stats.max_hp >= 150);
    }
}
