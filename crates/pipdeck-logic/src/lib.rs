//! Pure aggregation logic for PipDeck.
//!
//! This crate contains the core of the terminal-resume system, independent
//! of any rendering shell, timer, or data source. Functions take plain data
//! plus an explicit evaluation instant and return results, making them
//! unit-testable and safe to re-invoke on every tick.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`catalog`] | Inventory sections, items, and their effect entries |
//! | [`decay`] | Pure per-tick countdown step with just-expired reporting |
//! | [`effects`] | Contribution fan-out, expiry filtering, stat totals |
//! | [`loadout`] | Equip/unequip/activate transition rules |
//! | [`period`] | Work-history period grammar and date-range parsing |
//! | [`tenure`] | Interval merging and the level/progress readout |

pub mod catalog;
pub mod decay;
pub mod effects;
pub mod loadout;
pub mod period;
pub mod tenure;
