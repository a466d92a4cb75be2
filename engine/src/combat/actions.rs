use crate::Dice;
use crate::conditions::{StatusSpec, apply_status, outgoing_factor};
use crate::content::Rules;
use crate::dungeon::Monster;
use crate::error::{GameError, Result};
use crate::life::{apply_damage, heal};
use crate::player::Player;
use crate::skills::{ActiveBuff, SkillDef};

use super::{MonsterTurn, crit, landed_damage};

/// Basic attack. Draws: spread, crit.
pub fn player_attack(
    player: &Player,
    monster: &mut Monster,
    rules: &Rules,
    dice: &mut Dice,
    mut log: impl FnMut(String),
) -> i32 {
    let cfg = &rules.config;
    let spread = cfg.player_spread;
    let mut raw = (f64::from(player.stats.attack_power) + dice.spread(spread.low, spread.width)).floor();
    let is_crit = dice.chance(player.stats.crit_chance);
    if is_crit {
        raw = crit(raw, cfg.crit_multiplier);
    }
    let dealt = landed_damage(raw as i32, monster.defense, &monster.statuses);
    let target = monster.to_string();
    log(format!(
        "[ATK][{}] {}{} deals {} to {}",
        player.name,
        if is_crit { "CRIT! " } else { "" },
        player.weapon_name,
        dealt,
        target
    ));
    apply_damage(&target, &mut monster.health, dealt, &mut log);
    dealt
}

/// Resolves an active skill that has already passed its checks. Draws:
/// crit (damage skills), inflict (when the chance is below 1).
pub fn player_skill(
    player: &mut Player,
    monster: &mut Monster,
    skill: &SkillDef,
    rules: &Rules,
    dice: &mut Dice,
    mut log: impl FnMut(String),
) -> i32 {
    let cfg = &rules.config;
    let level = player.skill_level(&skill.id);
    let effect = &skill.effect;
    log(format!("[SKILL][{}] {}", player.name, effect.message));
    player.cooldowns.insert(skill.id.clone(), skill.cooldown.unwrap_or(0));

    let target = monster.to_string();
    let mut dealt = 0;
    if let Some(damage) = &effect.damage {
        let mut raw = f64::from(player.stats.attack_power) * damage.multiplier.at(level);
        if dice.chance(player.stats.crit_chance + damage.crit_bonus) {
            raw = crit(raw, cfg.crit_multiplier);
            log(format!("[CRIT][{}] critical hit!", player.name));
        }
        dealt = landed_damage(raw.floor() as i32, monster.defense, &monster.statuses);
        log(format!("[DMG][{}] {} deals {} to {}", player.name, skill.name, dealt, target));
        apply_damage(&target, &mut monster.health, dealt, &mut log);
    }

    if let Some(buff) = &effect.buff {
        // One extra turn: the next turn start counts down before the buff is felt.
        player.buffs.push(ActiveBuff {
            skill_id: skill.id.clone(),
            name: skill.name.clone(),
            turns_left: buff.duration + 1,
            stat: buff.stat,
            value: buff.value.at(level),
            percent: buff.percent,
        });
        log(format!("[BUFF][{}] {} for {} turns", player.name, skill.name, buff.duration));
        player.recalculate(rules);
    }

    if let Some(spec) = &effect.inflict {
        if !monster.health.is_down() && rolls_status(spec, dice) {
            apply_status(
                &target,
                &mut monster.statuses,
                spec.kind,
                spec.duration,
                spec.potency_at(level),
                &mut log,
            );
        }
    }
    dealt
}

fn rolls_status(spec: &StatusSpec, dice: &mut Dice) -> bool {
    spec.chance >= 1.0 || dice.chance(spec.chance)
}

/// Monster strike on the player. Draws: evade, spread, crit, then on-hit
/// status when the monster has one and the chance is below 1.
pub fn monster_attack(
    player: &mut Player,
    monster: &Monster,
    rules: &Rules,
    dice: &mut Dice,
    mut log: impl FnMut(String),
) -> MonsterTurn {
    let cfg = &rules.config;
    let attacker = monster.to_string();
    if dice.chance(player.stats.evade_chance) {
        log(format!("[EVADE][{}] dodges {}'s attack", player.name, attacker));
        return MonsterTurn::Evaded;
    }

    let attack = (f64::from(monster.attack_power) * outgoing_factor(&monster.statuses)).floor();
    let spread = cfg.monster_spread;
    let mut raw = (attack + dice.spread(spread.low, spread.width)).floor();
    if dice.chance(cfg.monster_crit_chance) {
        raw = crit(raw, cfg.crit_multiplier);
        log(format!("[CRIT][{}] critical hit!", attacker));
    }
    let damage = landed_damage(raw as i32, player.stats.defense, &player.statuses);
    log(format!("[ATK][{}] hits {} for {}", attacker, player.name, damage));
    let name = player.name.clone();
    apply_damage(&name, &mut player.health, damage, &mut log);

    if !player.health.is_down() {
        let on_hit = rules
            .content
            .monster(&monster.template)
            .and_then(|t| t.on_hit.as_ref());
        if let Some(spec) = on_hit {
            if rolls_status(spec, dice) {
                apply_status(&name, &mut player.statuses, spec.kind, spec.duration, spec.potency_at(0), &mut log);
                player.recalculate(rules);
            }
        }
    }
    MonsterTurn::Hit { damage }
}

/// Drinks a potion. Does not use up the turn.
pub fn use_potion(player: &mut Player, rules: &Rules, mut log: impl FnMut(String)) -> Result<i32> {
    if player.potions == 0 {
        return Err(GameError::NoPotions);
    }
    player.potions -= 1;
    let amount = (f64::from(player.stats.max_hp) * rules.config.potion_heal_percent).floor() as i32;
    let name = player.name.clone();
    let healed = heal(&name, &mut player.health, amount, &mut log);
    log(format!("[POTION][{}] {} potion(s) left", name, player.potions));
    Ok(healed)
}
