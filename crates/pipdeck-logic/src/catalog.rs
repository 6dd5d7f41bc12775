//! Modifier-source catalog — the inventory data model.
//!
//! Items belong to one of seven sections. Only `WEAPONS`, `APPAREL`, and
//! `AID` carry effects that aggregate; the rest exist for the shell's
//! inventory tabs and carry flavor entries at most.

use serde::{Deserialize, Serialize};

/// Inventory section an item belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemCategory {
    Weapons,
    Apparel,
    Aid,
    Misc,
    Junk,
    Mods,
    Ammo,
}

impl ItemCategory {
    /// All sections in display order.
    pub const ALL: [ItemCategory; 7] = [
        ItemCategory::Weapons,
        ItemCategory::Apparel,
        ItemCategory::Aid,
        ItemCategory::Misc,
        ItemCategory::Junk,
        ItemCategory::Mods,
        ItemCategory::Ammo,
    ];

    /// Section label as the shell and the equip-flag keys spell it.
    pub fn label(self) -> &'static str {
        match self {
            ItemCategory::Weapons => "WEAPONS",
            ItemCategory::Apparel => "APPAREL",
            ItemCategory::Aid => "AID",
            ItemCategory::Misc => "MISC",
            ItemCategory::Junk => "JUNK",
            ItemCategory::Mods => "MODS",
            ItemCategory::Ammo => "AMMO",
        }
    }

    /// Caller-facing flag key, e.g. `"WEAPONS-2"`.
    pub fn key(self, index: usize) -> String {
        format!("{}-{}", self.label(), index)
    }

    /// Whether items in this section can be toggled equipped.
    pub fn is_equippable(self) -> bool {
        matches!(self, ItemCategory::Weapons | ItemCategory::Apparel)
    }
}

/// One named effect line on an item.
///
/// Quantified entries (`name` + `value` present) feed aggregation; entries
/// with neither are flavor text and only ever display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemEffect {
    pub name: Option<String>,
    pub value: Option<f64>,
    pub display_name: String,
}

impl ItemEffect {
    /// The `(name, value)` pair if this entry aggregates.
    pub fn quantified(&self) -> Option<(&str, f64)> {
        match (&self.name, self.value) {
            (Some(name), Some(value)) => Some((name.as_str(), value)),
            _ => None,
        }
    }
}

/// One inventory entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub qty: u32,
    pub weight: f64,
    pub value: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub effects: Vec<ItemEffect>,
    /// Effect lifetime in seconds, for AID items.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<u32>,
    /// Slot occupied by apparel (`head`, `torso`, `hands`, `feet`, `eyes`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_part: Option<String>,
}

impl Item {
    /// Quantified effects only, in declaration order.
    pub fn quantified_effects(&self) -> impl Iterator<Item = (&str, f64)> {
        self.effects.iter().filter_map(|e| e.quantified())
    }
}

/// The full seven-section catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Inventory {
    #[serde(rename = "WEAPONS")]
    pub weapons: Vec<Item>,
    #[serde(rename = "APPAREL")]
    pub apparel: Vec<Item>,
    #[serde(rename = "AID")]
    pub aid: Vec<Item>,
    #[serde(default, rename = "MISC")]
    pub misc: Vec<Item>,
    #[serde(default, rename = "JUNK")]
    pub junk: Vec<Item>,
    #[serde(default, rename = "MODS")]
    pub mods: Vec<Item>,
    #[serde(default, rename = "AMMO")]
    pub ammo: Vec<Item>,
}

impl Inventory {
    pub fn section(&self, category: ItemCategory) -> &[Item] {
        match category {
            ItemCategory::Weapons => &self.weapons,
            ItemCategory::Apparel => &self.apparel,
            ItemCategory::Aid => &self.aid,
            ItemCategory::Misc => &self.misc,
            ItemCategory::Junk => &self.junk,
            ItemCategory::Mods => &self.mods,
            ItemCategory::Ammo => &self.ammo,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flavor(text: &str) -> ItemEffect {
        ItemEffect {
            name: None,
            value: None,
            display_name: text.to_string(),
        }
    }

    fn quantified(name: &str, value: f64) -> ItemEffect {
        ItemEffect {
            name: Some(name.to_string()),
            value: Some(value),
            display_name: format!("+{value}% {name}"),
        }
    }

    #[test]
    fn test_category_keys() {
        assert_eq!(ItemCategory::Weapons.key(0), "WEAPONS-0");
        assert_eq!(ItemCategory::Apparel.key(3), "APPAREL-3");
    }

    #[test]
    fn test_only_weapons_and_apparel_equippable() {
        for cat in ItemCategory::ALL {
            let expected = matches!(cat, ItemCategory::Weapons | ItemCategory::Apparel);
            assert_eq!(cat.is_equippable(), expected, "{}", cat.label());
        }
    }

    #[test]
    fn test_flavor_effects_not_quantified() {
        assert!(flavor("Satisfying Click Sound").quantified().is_none());
        assert_eq!(quantified("focus", 20.0).quantified(), Some(("focus", 20.0)));
    }

    #[test]
    fn test_quantified_effects_skip_flavor() {
        let item = Item {
            name: "Keyboard of Fury".to_string(),
            qty: 1,
            weight: 2.5,
            value: 150.0,
            description: String::new(),
            effects: vec![
                quantified("typing_speed", 50.0),
                flavor("Satisfying Click Sound"),
                quantified("code_quality", 25.0),
            ],
            duration_secs: None,
            body_part: None,
        };
        let names: Vec<&str> = item.quantified_effects().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["typing_speed", "code_quality"]);
    }

    #[test]
    fn test_inventory_deserializes_from_section_names() {
        let json = r#"{
            "WEAPONS": [],
            "APPAREL": [],
            "AID": [{
                "name": "Coffee (Black)",
                "qty": 99,
                "weight": 0.5,
                "value": 5,
                "effects": [
                    { "name": "alertness", "value": 50, "display_name": "+50% Alertness" }
                ],
                "duration_secs": 300
            }]
        }"#;
        let inv: Inventory = serde_json::from_str(json).unwrap();
        assert_eq!(inv.aid.len(), 1);
        assert_eq!(inv.aid[0].duration_secs, Some(300));
        assert!(inv.misc.is_empty(), "absent sections default to empty");
    }
}
