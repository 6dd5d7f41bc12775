//! Effects aggregation — equipped items and live consumables to per-stat totals.
//!
//! Every aggregation call regenerates the contribution map from scratch:
//! equipped weapons, then equipped apparel, in catalog order, then active
//! temporary instances in insertion order. Totaling drops expired temporary
//! contributions defensively (the decay driver should already have removed
//! them, but the aggregator does not trust caller state) and drops any
//! effect whose total is not strictly positive.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::catalog::{Inventory, Item, ItemCategory, ItemEffect};
use crate::loadout::Loadout;

/// A live activation of an AID item. Replace-not-stack: at most one
/// instance per source name exists at a time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporaryEffect {
    pub source_name: String,
    pub effects: Vec<ItemEffect>,
    /// Seconds left; the decay driver counts this down.
    pub remaining_secs: u32,
    /// Full duration at activation, for gauge rendering.
    pub initial_secs: u32,
}

impl TemporaryEffect {
    pub fn from_item(item: &Item, duration_secs: u32) -> Self {
        Self {
            source_name: item.name.clone(),
            effects: item.effects.clone(),
            remaining_secs: duration_secs,
            initial_secs: duration_secs,
        }
    }
}

/// One (source, value) pairing feeding a stat total. Ephemeral — rebuilt
/// on every aggregation call, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    pub source_name: String,
    pub category: ItemCategory,
    pub value: f64,
    pub is_temporary: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Effect-name → contributions, preserving first-encounter order so the
/// shell renders a stable breakdown. The catalog is small and curated, so
/// an ordered association list beats a hash map here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EffectsMap {
    entries: Vec<(String, Vec<Contribution>)>,
}

impl EffectsMap {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, effect_name: &str) -> Option<&[Contribution]> {
        self.entries
            .iter()
            .find(|(name, _)| name == effect_name)
            .map(|(_, contribs)| contribs.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Contribution])> {
        self.entries
            .iter()
            .map(|(name, contribs)| (name.as_str(), contribs.as_slice()))
    }

    fn push(&mut self, effect_name: &str, contribution: Contribution) {
        match self.entries.iter_mut().find(|(name, _)| name == effect_name) {
            Some((_, contribs)) => contribs.push(contribution),
            None => self
                .entries
                .push((effect_name.to_string(), vec![contribution])),
        }
    }
}

/// Aggregated total and contributor breakdown for one named effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedEffect {
    pub name: String,
    pub total: f64,
    pub contributions: Vec<Contribution>,
}

/// Build the contribution map for the current state at instant `now`.
pub fn compute_contributions(
    inventory: &Inventory,
    loadout: &Loadout,
    temporary: &[TemporaryEffect],
    now: DateTime<Utc>,
) -> EffectsMap {
    let mut map = EffectsMap::default();

    for category in [ItemCategory::Weapons, ItemCategory::Apparel] {
        for (index, item) in inventory.section(category).iter().enumerate() {
            if !loadout.is_equipped(category, index) {
                continue;
            }
            for (name, value) in item.quantified_effects() {
                map.push(
                    name,
                    Contribution {
                        source_name: item.name.clone(),
                        category,
                        value,
                        is_temporary: false,
                        expires_at: None,
                    },
                );
            }
        }
    }

    for instance in temporary {
        let expires_at = now + Duration::seconds(i64::from(instance.remaining_secs));
        for effect in &instance.effects {
            if let Some((name, value)) = effect.quantified() {
                map.push(
                    name,
                    Contribution {
                        source_name: instance.source_name.clone(),
                        category: ItemCategory::Aid,
                        value,
                        is_temporary: true,
                        expires_at: Some(expires_at),
                    },
                );
            }
        }
    }

    map
}

/// Reduce a contribution map to display totals.
///
/// Temporary contributions whose expiry is at or before `now` are dropped,
/// then each effect's remaining values sum; effects that do not end up
/// strictly positive are omitted entirely.
pub fn process_effects(map: &EffectsMap, now: DateTime<Utc>) -> Vec<ProcessedEffect> {
    map.iter()
        .filter_map(|(name, contributions)| {
            let active: Vec<Contribution> = contributions
                .iter()
                .filter(|c| match (c.is_temporary, c.expires_at) {
                    (true, Some(expiry)) => expiry > now,
                    _ => true,
                })
                .cloned()
                .collect();

            let total: f64 = active.iter().map(|c| c.value).sum();
            if total > 0.0 {
                Some(ProcessedEffect {
                    name: name.to_string(),
                    total,
                    contributions: active,
                })
            } else {
                None
            }
        })
        .collect()
}

/// The fixed stat block the status tab renders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LegacyStats {
    pub hp: f64,
    pub ap: f64,
    pub typing_speed: f64,
    pub code_quality: f64,
    pub bug_detection: f64,
    pub focus: f64,
    pub comfort: f64,
    pub alertness: f64,
    pub productivity: f64,
    pub energy: f64,
    pub error_resolution: f64,
    pub bug_fix_success: f64,
    pub typing_comfort: f64,
    pub eye_comfort: f64,
}

/// Map processed effects onto the fixed stat block.
///
/// An effect name outside the block still aggregates under its own name in
/// the processed list; only this secondary mapping misses it, so the
/// mismatch is logged and skipped rather than treated as an error.
pub fn legacy_stats(effects: &[ProcessedEffect]) -> LegacyStats {
    let mut stats = LegacyStats::default();
    for effect in effects {
        let slot = match effect.name.as_str() {
            "hp" => &mut stats.hp,
            "ap" => &mut stats.ap,
            "typing_speed" => &mut stats.typing_speed,
            "code_quality" => &mut stats.code_quality,
            "bug_detection" => &mut stats.bug_detection,
            "focus" => &mut stats.focus,
            "comfort" => &mut stats.comfort,
            "alertness" => &mut stats.alertness,
            "productivity" => &mut stats.productivity,
            "energy" => &mut stats.energy,
            "error_resolution" => &mut stats.error_resolution,
            "bug_fix_success" => &mut stats.bug_fix_success,
            "typing_comfort" => &mut stats.typing_comfort,
            "eye_comfort" => &mut stats.eye_comfort,
            other => {
                warn!(effect = other, "effect name has no legacy stat slot");
                continue;
            }
        };
        *slot = effect.total;
    }
    stats
}

/// Human-readable label for an effect name.
pub fn effect_display_name(effect_name: &str) -> String {
    match effect_name {
        "hp" => "Health Points".to_string(),
        "ap" => "Action Points".to_string(),
        "typing_speed" => "Typing Speed".to_string(),
        "code_quality" => "Code Quality".to_string(),
        "bug_detection" => "Bug Detection".to_string(),
        "error_resolution" => "Error Resolution".to_string(),
        "bug_fix_success" => "Bug Fix Success".to_string(),
        "focus" => "Focus".to_string(),
        "comfort" => "Comfort".to_string(),
        "eye_comfort" => "Eye Comfort".to_string(),
        "typing_comfort" => "Typing Comfort".to_string(),
        "alertness" => "Alertness".to_string(),
        "productivity" => "Productivity".to_string(),
        "energy" => "Energy".to_string(),
        other => title_case_words(other),
    }
}

fn title_case_words(name: &str) -> String {
    name.split('_')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
