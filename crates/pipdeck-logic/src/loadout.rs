//! Loadout state and its transition rules.
//!
//! The shell owns one mutable [`Loadout`] plus the list of active
//! [`TemporaryEffect`] instances; every change goes through the transition
//! functions here so the exclusion rules live in one testable place
//! instead of being re-derived at each call site:
//!
//! * Weapons: at most one equipped — equipping a weapon unequips every
//!   other weapon in the same transition.
//! * Apparel: at most one equipped per body-part slot — equipping unequips
//!   only prior occupants of the same slot.
//! * Aid: never "equipped"; activation consumes one unit of quantity and
//!   replaces (never stacks) any live instance of the same item.
//!
//! Each transition is a single atomic state change; the aggregator never
//! observes a half-applied toggle.

use std::collections::HashMap;

use crate::catalog::{Inventory, ItemCategory};
use crate::effects::TemporaryEffect;

/// Equipped flags, keyed by (section, catalog index).
#[derive(Debug, Clone, Default)]
pub struct Loadout {
    equipped: HashMap<(ItemCategory, usize), bool>,
}

/// What a [`Loadout::toggle`] call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EquipChange {
    /// Item is now equipped; listed keys were unequipped to make room.
    Equipped { displaced: Vec<(ItemCategory, usize)> },
    /// Item was equipped and is no longer.
    Unequipped,
    /// Index out of range for the section.
    NoSuchItem,
    /// Section does not support equipping (AID, MISC, ...).
    NotEquippable,
}

/// Result of an AID activation attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum AidOutcome {
    /// New instance activated; a previous instance of the same item may
    /// have been replaced.
    Activated { effect: TemporaryEffect, replaced: bool },
    /// Quantity exhausted — deliberately a silent no-op for the shell.
    OutOfStock,
    /// Item carries no duration, so it cannot spawn a timed instance.
    NotConsumable,
    /// Index out of range.
    NoSuchItem,
}

impl Loadout {
    pub fn is_equipped(&self, category: ItemCategory, index: usize) -> bool {
        self.equipped
            .get(&(category, index))
            .copied()
            .unwrap_or(false)
    }

    /// Currently equipped (section, index) pairs, in section/index order.
    pub fn equipped_keys(&self) -> Vec<(ItemCategory, usize)> {
        let mut keys: Vec<(ItemCategory, usize)> = self
            .equipped
            .iter()
            .filter(|(_, on)| **on)
            .map(|(key, _)| *key)
            .collect();
        keys.sort_by_key(|(cat, idx)| {
            (
                ItemCategory::ALL.iter().position(|c| c == cat).unwrap_or(0),
                *idx,
            )
        });
        keys
    }

    /// Toggle one item's equipped flag, applying the exclusion rules in
    /// the same transition.
    pub fn toggle(
        &mut self,
        inventory: &Inventory,
        category: ItemCategory,
        index: usize,
    ) -> EquipChange {
        if !category.is_equippable() {
            return EquipChange::NotEquippable;
        }
        let section = inventory.section(category);
        let Some(item) = section.get(index) else {
            return EquipChange::NoSuchItem;
        };

        if self.is_equipped(category, index) {
            self.equipped.insert((category, index), false);
            return EquipChange::Unequipped;
        }

        let mut displaced = Vec::new();
        match category {
            ItemCategory::Weapons => {
                for other in 0..section.len() {
                    if other != index && self.is_equipped(category, other) {
                        self.equipped.insert((category, other), false);
                        displaced.push((category, other));
                    }
                }
            }
            ItemCategory::Apparel => {
                if let Some(slot) = &item.body_part {
                    for (other, other_item) in section.iter().enumerate() {
                        if other != index
                            && self.is_equipped(category, other)
                            && other_item.body_part.as_deref() == Some(slot.as_str())
                        {
                            self.equipped.insert((category, other), false);
                            displaced.push((category, other));
                        }
                    }
                }
            }
            _ => unreachable!("guarded by is_equippable"),
        }

        self.equipped.insert((category, index), true);
        EquipChange::Equipped { displaced }
    }
}

/// Activate an AID item: consume one unit and (re)spawn its instance.
///
/// `active` is the shell-owned instance list; an existing instance of the
/// same item is removed first so activation replaces rather than stacks.
pub fn activate_aid(
    inventory: &mut Inventory,
    index: usize,
    active: &mut Vec<TemporaryEffect>,
) -> AidOutcome {
    let Some(item) = inventory.aid.get_mut(index) else {
        return AidOutcome::NoSuchItem;
    };
    if item.qty == 0 {
        return AidOutcome::OutOfStock;
    }
    let Some(duration) = item.duration_secs else {
        return AidOutcome::NotConsumable;
    };

    item.qty -= 1;

    let before = active.len();
    active.retain(|instance| instance.source_name != item.name);
    let replaced = active.len() < before;

    let effect = TemporaryEffect::from_item(item, duration);
    active.push(effect.clone());

    AidOutcome::Activated { effect, replaced }
}
