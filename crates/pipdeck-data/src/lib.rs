//! Curated dossier for PipDeck.
//!
//! The dossier is the single static input the shell feeds the aggregators:
//! the candidate profile, SPECIAL attributes, perks, skill ratings, the
//! engagement history ("quests"), and the seven-section inventory catalog.
//! It is embedded as JSON and validated fail-fast at load — a record that
//! fails validation is a content bug, so the whole dataset is rejected
//! rather than partially loaded.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use pipdeck_logic::catalog::Inventory;
use pipdeck_logic::period::{parse_period, PeriodError};
use pipdeck_logic::tenure::{Engagement, EngagementStatus};

const DOSSIER_JSON: &str = include_str!("../../../data/dossier.json");

/// Failure to load or validate the embedded dossier.
#[derive(Error, Debug)]
pub enum DossierError {
    #[error("dossier JSON is invalid: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Period(#[from] PeriodError),

    #[error("aid item `{0}` carries quantified effects but no duration")]
    AidMissingDuration(String),
}

/// Static candidate profile. Level and XP are derived from the quests at
/// evaluation time, never stored here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub name: String,
    pub age: u32,
    pub gender: String,
    pub occupation: String,
    pub education: String,
    pub hp: u32,
    pub ap: u32,
}

/// One SPECIAL attribute row for the stats tab.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecialAttribute {
    pub name: String,
    pub level: u32,
    pub desc: String,
}

/// A perk card: name, icon key, blurb, and detail line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Perk {
    pub name: String,
    pub icon_name: String,
    pub desc: String,
    pub details: String,
}

/// Skill bar entry for the skills sub-tab.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillRating {
    pub name: String,
    pub level: u32,
    pub years: u32,
}

/// The complete static dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dossier {
    pub candidate: Candidate,
    pub special: Vec<SpecialAttribute>,
    pub perks: Vec<Perk>,
    pub skills: Vec<SkillRating>,
    pub quests: Vec<Engagement>,
    pub inventory: Inventory,
}

impl Dossier {
    /// Parse and validate the embedded dossier.
    pub fn load() -> Result<Self, DossierError> {
        let dossier: Dossier = serde_json::from_str(DOSSIER_JSON)?;
        dossier.validate()?;
        Ok(dossier)
    }

    /// Validate the dataset's parse contract:
    /// every period parses, `Present` appears only on in-progress quests,
    /// and aid items that aggregate carry a duration. More than one
    /// in-progress quest is tolerated with a warning (the tenure logic
    /// defines which one drives the readout).
    pub fn validate(&self) -> Result<(), DossierError> {
        let mut open_count = 0usize;
        for quest in &self.quests {
            let parsed = parse_period(&quest.period)?;
            match quest.status {
                EngagementStatus::Completed if parsed.is_open() => {
                    return Err(PeriodError::PresentNotAllowed(quest.period.clone()).into());
                }
                EngagementStatus::InProgress => open_count += 1,
                EngagementStatus::Completed => {}
            }
        }
        if open_count > 1 {
            warn!(count = open_count, "dossier lists multiple in-progress quests");
        }

        for item in &self.inventory.aid {
            if item.quantified_effects().next().is_some() && item.duration_secs.is_none() {
                return Err(DossierError::AidMissingDuration(item.name.clone()));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime, Utc};
    use pipdeck_logic::tenure::compute_tenure;

    fn utc(y: i32, m: u32, d: u32) -> chrono::DateTime<Utc> {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_time(NaiveTime::MIN)
            .and_utc()
    }

    #[test]
    fn test_dossier_loads_and_validates() {
        let dossier = Dossier::load().unwrap();
        assert_eq!(dossier.candidate.name, "John Wanderer");
        assert_eq!(dossier.quests.len(), 6);
        assert_eq!(dossier.special.len(), 7);
        assert_eq!(dossier.inventory.weapons.len(), 3);
        assert_eq!(dossier.inventory.apparel.len(), 6);
        assert_eq!(dossier.inventory.aid.len(), 5);
    }

    #[test]
    fn test_exactly_one_in_progress_quest() {
        let dossier = Dossier::load().unwrap();
        let open = dossier
            .quests
            .iter()
            .filter(|q| q.status == EngagementStatus::InProgress)
            .count();
        assert_eq!(open, 1);
    }

    #[test]
    fn test_tenure_computes_over_dossier() {
        let dossier = Dossier::load().unwrap();
        // Completed history: 183d + 184d + 731d + the merged 2021-04..2024-03
        // run (1065d) = 2163 days, plus ~503 live days from 2024-01-15.
        let t = compute_tenure(&dossier.quests, utc(2025, 6, 1)).unwrap();
        assert!(t.live);
        assert!(t.level >= 7, "roughly 7.3 years by mid-2025, got {}", t.level);
        assert!(t.progress_secs > 0);
    }

    #[test]
    fn test_all_aid_items_have_durations() {
        let dossier = Dossier::load().unwrap();
        for item in &dossier.inventory.aid {
            assert!(item.duration_secs.is_some(), "{} needs a duration", item.name);
        }
    }

    #[test]
    fn test_every_aggregating_section_has_quantified_effects() {
        let dossier = Dossier::load().unwrap();
        for item in dossier
            .inventory
            .weapons
            .iter()
            .chain(&dossier.inventory.apparel)
            .chain(&dossier.inventory.aid)
        {
            assert!(
                item.quantified_effects().next().is_some(),
                "{} should carry at least one quantified effect",
                item.name
            );
        }
    }

    #[test]
    fn test_junk_and_ammo_are_flavor_only() {
        let dossier = Dossier::load().unwrap();
        for item in dossier.inventory.junk.iter().chain(&dossier.inventory.ammo) {
            assert!(item.quantified_effects().next().is_none(), "{}", item.name);
        }
    }

    #[test]
    fn test_validation_rejects_present_on_completed() {
        let mut dossier = Dossier::load().unwrap();
        dossier.quests[1].period = "2017-06 to Present".to_string();
        let err = dossier.validate().unwrap_err();
        assert!(matches!(
            err,
            DossierError::Period(PeriodError::PresentNotAllowed(_))
        ));
    }

    #[test]
    fn test_validation_rejects_malformed_period() {
        let mut dossier = Dossier::load().unwrap();
        dossier.quests[2].period = "2018-03 until 2018-09".to_string();
        assert!(dossier.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_aid_without_duration() {
        let mut dossier = Dossier::load().unwrap();
        dossier.inventory.aid[0].duration_secs = None;
        let err = dossier.validate().unwrap_err();
        assert!(matches!(err, DossierError::AidMissingDuration(name) if name == "Coffee (Black)"));
    }
}
