//! PipDeck Headless Validation Harness
//!
//! Exercises the dossier and the aggregation logic end to end without any
//! shell, timer, or rendering — the decay loop is driven synchronously.
//!
//! Usage:
//!   cargo run -p pipdeck-simtest
//!   cargo run -p pipdeck-simtest -- --verbose

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};

use pipdeck_data::Dossier;
use pipdeck_logic::catalog::ItemCategory;
use pipdeck_logic::decay;
use pipdeck_logic::effects::{compute_contributions, legacy_stats, process_effects, TemporaryEffect};
use pipdeck_logic::loadout::{activate_aid, AidOutcome, EquipChange, Loadout};
use pipdeck_logic::tenure::{compute_tenure, merge_ranges, CALENDAR_YEAR_SECS};
use pipdeck_logic::period::parse_period;

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn check(name: &str, passed: bool, detail: String) -> TestResult {
    TestResult {
        name: name.to_string(),
        passed,
        detail,
    }
}

fn utc(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap_or_default()
        .and_time(NaiveTime::MIN)
        .and_utc()
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let verbose = std::env::args().any(|a| a == "--verbose");
    println!("=== PipDeck Validation Harness ===\n");

    let mut results = Vec::new();

    // 1. Dossier load and parse contract
    results.extend(validate_dossier(verbose));

    // 2. Tenure math: merging, level, progress
    results.extend(validate_tenure(verbose));

    // 3. Loadout exclusivity sweep
    results.extend(validate_loadout(verbose));

    // 4. Aid activation and decay loop
    results.extend(validate_decay(verbose));

    // 5. Effects totals over the real catalog
    results.extend(validate_effects(verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── 1. Dossier ──────────────────────────────────────────────────────────

fn validate_dossier(_verbose: bool) -> Vec<TestResult> {
    println!("--- Dossier ---");
    let mut results = Vec::new();

    let dossier = match Dossier::load() {
        Ok(d) => d,
        Err(e) => {
            results.push(check("dossier_load", false, format!("load error: {e}")));
            return results;
        }
    };
    results.push(check(
        "dossier_load",
        true,
        format!(
            "{} quests, {} weapons, {} apparel, {} aid",
            dossier.quests.len(),
            dossier.inventory.weapons.len(),
            dossier.inventory.apparel.len(),
            dossier.inventory.aid.len()
        ),
    ));

    let all_parse = dossier
        .quests
        .iter()
        .all(|q| parse_period(&q.period).is_ok());
    results.push(check(
        "periods_parse",
        all_parse,
        "every quest period satisfies the grammar".into(),
    ));

    let apparel_slots = dossier
        .inventory
        .apparel
        .iter()
        .filter(|i| i.body_part.is_some())
        .count();
    results.push(check(
        "apparel_slots_declared",
        apparel_slots == dossier.inventory.apparel.len(),
        format!(
            "{}/{} apparel items declare a body part",
            apparel_slots,
            dossier.inventory.apparel.len()
        ),
    ));

    results
}

// ── 2. Tenure ───────────────────────────────────────────────────────────

fn validate_tenure(verbose: bool) -> Vec<TestResult> {
    println!("--- Tenure ---");
    let mut results = Vec::new();

    // Overlap case: merged duration equals the union, not the sum.
    let a = parse_period("2022-06 to 2024-03").map(|p| p.resolve(utc(2025, 1, 1)));
    let b = parse_period("2021-04 to 2023-08").map(|p| p.resolve(utc(2025, 1, 1)));
    match (a, b) {
        (Ok(a), Ok(b)) => {
            let merged = merge_ranges(vec![a, b]);
            let union_days = merged
                .iter()
                .map(|r| r.duration().num_days())
                .sum::<i64>();
            results.push(check(
                "merge_overlap_union",
                merged.len() == 1 && union_days == 1065,
                format!("{} run(s), {} days covered", merged.len(), union_days),
            ));
        }
        _ => results.push(check("merge_overlap_union", false, "parse failed".into())),
    }

    let dossier = match Dossier::load() {
        Ok(d) => d,
        Err(e) => {
            results.push(check("tenure_dossier", false, format!("{e}")));
            return results;
        }
    };

    let now = utc(2025, 6, 1);
    match compute_tenure(&dossier.quests, now) {
        Ok(t) => {
            results.push(check(
                "tenure_level_plausible",
                t.live && t.level >= 7 && t.level <= 9,
                format!("level {} live={} xp={}", t.level, t.live, t.xp_display()),
            ));

            // Level must be monotonic as evaluation time advances.
            let mut monotonic = true;
            let mut last = 0;
            for day in 0..730 {
                let t = match compute_tenure(&dossier.quests, now + Duration::days(day)) {
                    Ok(t) => t,
                    Err(_) => {
                        monotonic = false;
                        break;
                    }
                };
                if t.level < last {
                    monotonic = false;
                    break;
                }
                last = t.level;
            }
            results.push(check(
                "tenure_level_monotonic",
                monotonic,
                format!("level reaches {last} two years out"),
            ));

            // One fixed-length year of additional live time = one more level.
            let later = now + Duration::seconds(CALENDAR_YEAR_SECS as i64);
            match compute_tenure(&dossier.quests, later) {
                Ok(t2) => results.push(check(
                    "tenure_year_boundary",
                    t2.level == t.level + 1,
                    format!("{} -> {}", t.level, t2.level),
                )),
                Err(e) => results.push(check("tenure_year_boundary", false, format!("{e}"))),
            }

            if verbose {
                println!("  tenure at {now}: level {} ({})", t.level, t.xp_display());
            }
        }
        Err(e) => results.push(check("tenure_compute", false, format!("{e}"))),
    }

    results
}

// ── 3. Loadout ──────────────────────────────────────────────────────────

fn validate_loadout(_verbose: bool) -> Vec<TestResult> {
    println!("--- Loadout ---");
    let mut results = Vec::new();

    let dossier = match Dossier::load() {
        Ok(d) => d,
        Err(e) => {
            results.push(check("loadout_dossier", false, format!("{e}")));
            return results;
        }
    };
    let inv = &dossier.inventory;
    let mut loadout = Loadout::default();

    // Sweep every weapon; exactly one may remain equipped at each step.
    let mut weapon_exclusive = true;
    for index in 0..inv.weapons.len() {
        loadout.toggle(inv, ItemCategory::Weapons, index);
        let equipped_weapons = loadout
            .equipped_keys()
            .iter()
            .filter(|(c, _)| *c == ItemCategory::Weapons)
            .count();
        if equipped_weapons != 1 {
            weapon_exclusive = false;
        }
    }
    results.push(check(
        "weapon_exclusivity",
        weapon_exclusive,
        format!("swept {} weapons", inv.weapons.len()),
    ));

    // Sweep all apparel; per-slot exclusivity must hold throughout.
    let mut slot_exclusive = true;
    for index in 0..inv.apparel.len() {
        loadout.toggle(inv, ItemCategory::Apparel, index);
        let mut seen = Vec::new();
        for (cat, idx) in loadout.equipped_keys() {
            if cat != ItemCategory::Apparel {
                continue;
            }
            if let Some(slot) = inv.apparel[idx].body_part.as_deref() {
                if seen.contains(&slot) {
                    slot_exclusive = false;
                }
                seen.push(slot);
            }
        }
    }
    results.push(check(
        "apparel_slot_exclusivity",
        slot_exclusive,
        format!("swept {} apparel items", inv.apparel.len()),
    ));

    let rejected = matches!(
        loadout.toggle(inv, ItemCategory::Aid, 0),
        EquipChange::NotEquippable
    );
    results.push(check(
        "aid_not_equippable",
        rejected,
        "aid items cannot be toggled".into(),
    ));

    results
}

// ── 4. Decay ────────────────────────────────────────────────────────────

fn validate_decay(verbose: bool) -> Vec<TestResult> {
    println!("--- Decay ---");
    let mut results = Vec::new();

    let mut dossier = match Dossier::load() {
        Ok(d) => d,
        Err(e) => {
            results.push(check("decay_dossier", false, format!("{e}")));
            return results;
        }
    };

    // Activate the shortest-lived aid item (10s) and run the tick loop.
    let shot_index = dossier
        .inventory
        .aid
        .iter()
        .position(|i| i.name == "Quick Caffeine Shot")
        .unwrap_or(0);
    let qty_before = dossier.inventory.aid[shot_index].qty;

    let mut active: Vec<TemporaryEffect> = Vec::new();
    let outcome = activate_aid(&mut dossier.inventory, shot_index, &mut active);
    let activated = matches!(outcome, AidOutcome::Activated { .. });
    results.push(check(
        "aid_activation",
        activated && dossier.inventory.aid[shot_index].qty == qty_before - 1,
        format!("qty {} -> {}", qty_before, dossier.inventory.aid[shot_index].qty),
    ));

    // Replace-not-stack on double activation.
    activate_aid(&mut dossier.inventory, shot_index, &mut active);
    results.push(check(
        "aid_replace_not_stack",
        active.len() == 1,
        format!("{} active instance(s) after double activation", active.len()),
    ));

    // Tick to expiry; the instance must be reported exactly once.
    let initial = active[0].initial_secs;
    let mut expiries = 0;
    let mut ticks = 0;
    for _ in 0..initial + 5 {
        let step = decay::advance(std::mem::take(&mut active), 1);
        expiries += step.expired.len();
        active = step.active;
        ticks += 1;
        if verbose && !active.is_empty() && ticks % 5 == 0 {
            println!("  t+{}s remaining={}s", ticks, active[0].remaining_secs);
        }
    }
    results.push(check(
        "decay_single_expiry",
        expiries == 1 && active.is_empty(),
        format!("{expiries} expiry cue(s) over {ticks} ticks"),
    ));

    results
}

// ── 5. Effects ──────────────────────────────────────────────────────────

fn validate_effects(verbose: bool) -> Vec<TestResult> {
    println!("--- Effects ---");
    let mut results = Vec::new();

    let mut dossier = match Dossier::load() {
        Ok(d) => d,
        Err(e) => {
            results.push(check("effects_dossier", false, format!("{e}")));
            return results;
        }
    };
    let now = utc(2025, 6, 1);

    let mut loadout = Loadout::default();
    loadout.toggle(&dossier.inventory, ItemCategory::Weapons, 0); // Keyboard of Fury
    loadout.toggle(&dossier.inventory, ItemCategory::Apparel, 0); // Developer Hoodie

    let mut active = Vec::new();
    let pills_index = dossier
        .inventory
        .aid
        .iter()
        .position(|i| i.name == "Focus Pills")
        .unwrap_or(0);
    activate_aid(&mut dossier.inventory, pills_index, &mut active);

    let map = compute_contributions(&dossier.inventory, &loadout, &active, now);
    let processed = process_effects(&map, now);

    // focus = 20 (hoodie) + 100 (pills); every total is the sum of its parts.
    let focus = processed.iter().find(|e| e.name == "focus");
    results.push(check(
        "focus_total",
        focus.map(|e| e.total) == Some(120.0),
        format!("focus = {:?}", focus.map(|e| e.total)),
    ));

    let sums_consistent = processed.iter().all(|e| {
        let sum: f64 = e.contributions.iter().map(|c| c.value).sum();
        (e.total - sum).abs() < f64::EPSILON
    });
    results.push(check(
        "totals_are_sums",
        sums_consistent,
        format!("{} effects checked", processed.len()),
    ));

    let all_positive = processed.iter().all(|e| e.total > 0.0);
    results.push(check(
        "totals_strictly_positive",
        all_positive,
        "non-positive totals never surface".into(),
    ));

    let stats = legacy_stats(&processed);
    results.push(check(
        "legacy_stats_mapping",
        stats.focus == 120.0 && stats.typing_speed == 50.0,
        format!("focus={} typing_speed={}", stats.focus, stats.typing_speed),
    ));

    // After expiry the temporary contribution must vanish from totals.
    let after = now + Duration::seconds(i64::from(active[0].remaining_secs) + 1);
    let processed_after = process_effects(
        &compute_contributions(&dossier.inventory, &loadout, &active, now),
        after,
    );
    let focus_after = processed_after.iter().find(|e| e.name == "focus");
    results.push(check(
        "expired_excluded",
        focus_after.map(|e| e.total) == Some(20.0),
        format!("focus after expiry = {:?}", focus_after.map(|e| e.total)),
    ));

    if verbose {
        for effect in &processed {
            println!(
                "  {} = {} ({} contributor(s))",
                effect.name,
                effect.total,
                effect.contributions.len()
            );
        }
    }

    results
}
