use serde::{Deserialize, Serialize};

use crate::config::{TrainingConfig, TrainingRule};
use crate::content::Rules;
use crate::error::{GameError, Result};
use crate::items::{Item, Rarity, Slot};
use crate::player::Player;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingStat {
    MaxHp,
    AttackPower,
    Defense,
}

/// Current price of each training option. Grows after every purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingCosts {
    pub max_hp: u32,
    pub attack_power: u32,
    pub defense: u32,
}

impl TrainingCosts {
    pub fn new(cfg: &TrainingConfig) -> Self {
        Self {
            max_hp: cfg.start_cost,
            attack_power: cfg.start_cost,
            defense: cfg.start_cost,
        }
    }

    pub fn get(&self, stat: TrainingStat) -> u32 {
        match stat {
            TrainingStat::MaxHp => self.max_hp,
            TrainingStat::AttackPower => self.attack_power,
            TrainingStat::Defense => self.defense,
        }
    }

    fn get_mut(&mut self, stat: TrainingStat) -> &mut u32 {
        match stat {
            TrainingStat::MaxHp => &mut self.max_hp,
            TrainingStat::AttackPower => &mut self.attack_power,
            TrainingStat::Defense => &mut self.defense,
        }
    }
}

fn rule(cfg: &TrainingConfig, stat: TrainingStat) -> &TrainingRule {
    match stat {
        TrainingStat::MaxHp => &cfg.max_hp,
        TrainingStat::AttackPower => &cfg.attack_power,
        TrainingStat::Defense => &cfg.defense,
    }
}

/// Items for sale at `dungeon_level`: cheap commons, then the first
/// uncommons and rares once their level is reached, cut to the stock size.
pub fn shop_stock(rules: &Rules, dungeon_level: u32) -> Vec<Item> {
    let shop = &rules.config.shop;
    let items = &rules.content.items;
    let mut stock: Vec<Item> = items
        .iter()
        .filter(|i| i.rarity == Rarity::Common && i.cost < shop.common_max_cost)
        .cloned()
        .collect();
    if dungeon_level >= shop.uncommon_min_level {
        stock.extend(
            items
                .iter()
                .filter(|i| i.rarity == Rarity::Uncommon)
                .take(shop.uncommon_count)
                .cloned(),
        );
    }
    if dungeon_level >= shop.rare_min_level {
        stock.extend(
            items
                .iter()
                .filter(|i| i.rarity == Rarity::Rare)
                .take(shop.rare_count)
                .cloned(),
        );
    }
    stock.truncate(shop.max_stock);
    stock
}

fn spend(player: &mut Player, cost: u32) -> Result<()> {
    if player.gold < cost {
        return Err(GameError::InsufficientGold { needed: cost, available: player.gold });
    }
    player.gold -= cost;
    Ok(())
}

pub fn buy_potion(player: &mut Player, rules: &Rules) -> Result<u32> {
    spend(player, rules.config.potion_cost)?;
    player.potions += 1;
    Ok(player.potions)
}

/// Buys a fresh copy of a stocked item into the inventory.
pub fn buy_item(player: &mut Player, rules: &Rules, dungeon_level: u32, item_id: u32) -> Result<Item> {
    let item = shop_stock(rules, dungeon_level)
        .into_iter()
        .find(|i| i.id == item_id)
        .ok_or(GameError::UnknownItem(item_id))?;
    spend(player, item.cost)?;
    player.inventory.push(item.clone());
    tracing::debug!(item = item.id, cost = item.cost, "item bought");
    Ok(item)
}

/// Pays for one training session. HP training also refills HP.
pub fn train(
    player: &mut Player,
    costs: &mut TrainingCosts,
    stat: TrainingStat,
    rules: &Rules,
) -> Result<u32> {
    let cfg = &rules.config.training;
    let cost = costs.get(stat);
    spend(player, cost)?;

    let rule = rule(cfg, stat);
    match stat {
        TrainingStat::MaxHp => player.base.max_hp += rule.gain,
        TrainingStat::AttackPower => player.base.attack_power += rule.gain,
        TrainingStat::Defense => player.base.defense += rule.gain,
    }
    *costs.get_mut(stat) = (f64::from(cost) * rule.cost_growth).floor() as u32;

    player.recalculate(rules);
    if stat == TrainingStat::MaxHp {
        player.health.restore();
    }
    Ok(cost)
}

/// Moves the inventory item at `index` into its slot. Whatever was equipped
/// goes to the end of the inventory.
pub fn equip(player: &mut Player, rules: &Rules, index: usize) -> Result<Option<Item>> {
    if index >= player.inventory.len() {
        return Err(GameError::InventoryIndex(index));
    }
    let item = player.inventory.remove(index);
    let previous = player.equipment.replace(item);
    if let Some(prev) = &previous {
        player.inventory.push(prev.clone());
    }
    player.recalculate_with_gain(rules);
    Ok(previous)
}

pub fn unequip(player: &mut Player, rules: &Rules, slot: Slot) -> Result<Item> {
    let item = player.equipment.take(slot).ok_or(GameError::EmptySlot(slot))?;
    player.inventory.push(item.clone());
    player.recalculate(rules);
    Ok(item)
}
