use serde::{Deserialize, Serialize};

use crate::conditions::StatusSpec;
use crate::content::Rules;
use crate::error::{GameError, Result};
use crate::player::Player;
use crate::stats::StatKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillKind {
    Active,
    Passive,
}

/// `base + per_level * level`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Scaling {
    pub base: f64,
    pub per_level: f64,
}

impl Scaling {
    pub fn at(&self, level: u32) -> f64 {
        self.base + self.per_level * f64::from(level)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassiveBonus {
    pub stat: StatKind,
    pub value: Scaling,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageEffect {
    pub multiplier: Scaling,
    /// Added to the caster's crit chance for this hit only.
    #[serde(default)]
    pub crit_bonus: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuffEffect {
    pub stat: StatKind,
    pub value: Scaling,
    pub duration: u32,
    #[serde(default)]
    pub percent: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillEffect {
    #[serde(default)]
    pub passive: Option<PassiveBonus>,
    #[serde(default)]
    pub damage: Option<DamageEffect>,
    #[serde(default)]
    pub buff: Option<BuffEffect>,
    #[serde(default)]
    pub inflict: Option<StatusSpec>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillDef {
    pub id: String,
    pub name: String,
    pub kind: SkillKind,
    pub required_level: u32,
    #[serde(default)]
    pub dependencies: Vec<String>,
    pub max_level: u32,
    #[serde(default)]
    pub cooldown: Option<u32>,
    pub effect: SkillEffect,
}

impl SkillDef {
    pub fn describe(&self, level: u32) -> String {
        let e = &self.effect;
        let mut parts = Vec::new();
        if let Some(p) = &e.passive {
            parts.push(format!("{:?} +{}", p.stat, format_value(p.stat, p.value.at(level))));
        }
        if let Some(d) = &e.damage {
            parts.push(format!("deals {:.0}% of attack power", d.multiplier.at(level) * 100.0));
            if d.crit_bonus > 0.0 {
                parts.push(format!("+{:.0}% crit chance", d.crit_bonus * 100.0));
            }
        }
        if let Some(b) = &e.buff {
            let value = if b.percent {
                format!("{:.0}%", b.value.at(level) * 100.0)
            } else {
                format_value(b.stat, b.value.at(level))
            };
            parts.push(format!("{:?} +{} for {} turns", b.stat, value, b.duration));
        }
        if let Some(s) = &e.inflict {
            parts.push(format!(
                "{:.0}% chance to inflict {:?} for {} turns",
                s.chance.min(1.0) * 100.0,
                s.kind,
                s.duration
            ));
        }
        parts.join("; ")
    }
}

fn format_value(stat: StatKind, value: f64) -> String {
    match stat {
        StatKind::MaxHp | StatKind::AttackPower | StatKind::Defense => format!("{:.0}", value),
        _ => format!("{:.0}%", value * 100.0),
    }
}

/// A timed stat modifier granted by an active skill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveBuff {
    pub skill_id: String,
    pub name: String,
    pub turns_left: u32,
    pub stat: StatKind,
    pub value: f64,
    pub percent: bool,
}

/// Where a skill stands for the player, as a skill tree UI shows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeState {
    Locked,
    Learned,
    Learnable,
    Maxed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillNode {
    pub id: String,
    pub name: String,
    pub kind: SkillKind,
    pub required_level: u32,
    pub level: u32,
    pub max_level: u32,
    pub state: NodeState,
    /// Effect text at the current level.
    pub description: String,
}

fn dependencies_met(player: &Player, skill: &SkillDef) -> bool {
    skill.dependencies.iter().all(|dep| player.skill_level(dep) > 0)
}

/// Checks every learning rule in the order the player hears about them.
pub fn check_learnable(player: &Player, skill: &SkillDef) -> Result<()> {
    if player.skill_level(&skill.id) >= skill.max_level {
        return Err(GameError::SkillMaxed(skill.id.clone()));
    }
    if player.skill_points == 0 {
        return Err(GameError::NoSkillPoints);
    }
    if !dependencies_met(player, skill) {
        return Err(GameError::DependenciesUnmet(skill.id.clone()));
    }
    if player.level < skill.required_level {
        return Err(GameError::LevelTooLow { required: skill.required_level });
    }
    Ok(())
}

/// Spends one skill point on `id`. Passive skills take effect immediately
/// and any max HP they add is granted as current HP.
pub fn learn_skill(player: &mut Player, rules: &Rules, id: &str) -> Result<u32> {
    let skill = rules
        .content
        .skill(player.class, id)
        .ok_or_else(|| GameError::UnknownSkill(id.to_string()))?;
    check_learnable(player, skill)?;

    player.skill_points -= 1;
    let level = player.skill_level(id) + 1;
    player.learned_skills.insert(id.to_string(), level);
    if skill.kind == SkillKind::Passive {
        player.recalculate_with_gain(rules);
    }
    tracing::debug!(skill = id, level, "skill learned");
    Ok(level)
}

/// The class tree with each node's state, in content order.
pub fn skill_tree(player: &Player, rules: &Rules) -> Result<Vec<SkillNode>> {
    let class = rules.content.class(player.class)?;
    Ok(class
        .skills
        .iter()
        .map(|skill| {
            let level = player.skill_level(&skill.id);
            let state = if level >= skill.max_level {
                NodeState::Maxed
            } else if check_learnable(player, skill).is_ok() {
                NodeState::Learnable
            } else if level > 0 {
                NodeState::Learned
            } else {
                NodeState::Locked
            };
            SkillNode {
                id: skill.id.clone(),
                name: skill.name.clone(),
                kind: skill.kind,
                required_level: skill.required_level,
                level,
                max_level: skill.max_level,
                state,
                description: skill.describe(level),
            }
        })
        .collect())
}
