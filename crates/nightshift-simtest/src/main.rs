//! Nightshift Headless Scenario Harness
//!
//! Validates the pure game rules and the shipped content data without
//! SpacetimeDB. Runs entirely in-process — no DB, no networking.
//!
//! Usage:
//!   cargo run -p nightshift-simtest
//!   cargo run -p nightshift-simtest -- --verbose

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use nightshift_logic::combat::{
    first_attacker, resolve_round, retreating_side, RoundInput, RoundOutcome, Side,
};
use nightshift_logic::constants::{branches, MAX_AI_LEVEL};
use nightshift_logic::error::ActionError;
use nightshift_logic::loot;
use nightshift_logic::map::{check_move, MoveContext, WorldLayout};
use nightshift_logic::night::{derive_phase, NightConfig, ScheduleFile};
use nightshift_logic::stamina::{all_exhausted, refill_value};

// ── Shared content (same JSON the server seeds from) ────────────────────
const WORLD_LAYOUT_JSON: &str = include_str!("../../../data/world_layout.json");
const NIGHT_SCHEDULE_JSON: &str = include_str!("../../../data/night_schedule.json");

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn result(name: &str, passed: bool, detail: impl Into<String>) -> TestResult {
    TestResult {
        name: name.to_string(),
        passed,
        detail: detail.into(),
    }
}

fn main() {
    let verbose = std::env::args().any(|a| a == "--verbose");
    println!("=== Nightshift Scenario Harness ===\n");

    let mut results = Vec::new();

    results.extend(validate_world_layout(verbose));
    results.extend(validate_night_schedule(verbose));
    results.extend(validate_movement_rules(verbose));
    results.extend(validate_night_derivation(verbose));
    results.extend(validate_turn_barrier(verbose));
    results.extend(validate_scripted_duel(verbose));
    results.extend(validate_random_duels(verbose));
    results.extend(validate_loot_tiers(verbose));

    let passed = results.iter().filter(|r| r.passed).count();
    println!("\n=== {} / {} checks passed ===", passed, results.len());
    for r in results.iter().filter(|r| !r.passed) {
        println!("FAIL {} — {}", r.name, r.detail);
    }
    if passed != results.len() {
        std::process::exit(1);
    }
}

fn layout() -> WorldLayout {
    serde_json::from_str(WORLD_LAYOUT_JSON).expect("world layout parses")
}

fn schedule() -> ScheduleFile {
    serde_json::from_str(NIGHT_SCHEDULE_JSON).expect("night schedule parses")
}

// ── 1. World layout ─────────────────────────────────────────────────────

fn validate_world_layout(verbose: bool) -> Vec<TestResult> {
    let mut out = Vec::new();
    let layout = layout();

    out.push(result(
        "layout.validates",
        layout.validate().is_ok(),
        format!("{:?}", layout.validate()),
    ));

    // Every node must be reachable from the home base.
    let graph = layout.graph();
    let mut seen = HashSet::new();
    let mut queue = vec![layout.home_base];
    seen.insert(layout.home_base);
    while let Some(node) = queue.pop() {
        for &n in graph.neighbors(node) {
            if seen.insert(n) {
                queue.push(n);
            }
        }
    }
    out.push(result(
        "layout.connected",
        seen.len() == graph.node_count(),
        format!("{} of {} nodes reachable", seen.len(), graph.node_count()),
    ));

    // The fork must actually fork into both branches.
    let rules = layout.rules();
    let fork_branches: HashSet<u8> = graph
        .neighbors(layout.fork_node)
        .iter()
        .map(|&n| rules.branch_of(n))
        .filter(|&b| b != branches::NONE)
        .collect();
    out.push(result(
        "layout.fork_reaches_both_branches",
        fork_branches.len() == 2,
        format!("branches at fork: {fork_branches:?}"),
    ));

    if verbose {
        for r in &out {
            println!("  {} {}", if r.passed { "ok" } else { "!!" }, r.name);
        }
    }
    out
}

// ── 2. Night schedule data ──────────────────────────────────────────────

fn validate_night_schedule(verbose: bool) -> Vec<TestResult> {
    let mut out = Vec::new();
    let file = schedule();
    let layout = layout();

    let kinds: HashSet<u8> = file.kinds.iter().map(|k| k.kind).collect();
    let roster_kinds: HashSet<u8> = layout.animatronics.iter().map(|a| a.kind).collect();
    out.push(result(
        "schedule.covers_roster",
        roster_kinds.is_subset(&kinds),
        format!("roster {roster_kinds:?} vs schedule {kinds:?}"),
    ));

    let mut complete = true;
    let mut bounded = true;
    for kind in &file.kinds {
        let nights: HashSet<u8> = kind.nights.iter().map(|n| n.night).collect();
        if nights != (1..=5).collect() {
            complete = false;
        }
        for night in &kind.nights {
            if night.levels.len() != 6 {
                complete = false;
            }
            if night.levels.iter().any(|&l| l > MAX_AI_LEVEL) {
                bounded = false;
            }
        }
    }
    out.push(result("schedule.complete_grid", complete, "5 nights x 6 hours per kind"));
    out.push(result("schedule.levels_bounded", bounded, "levels within 0..=20"));

    // Aggression should never be lower on night 5 than night 1 at any hour.
    let mut ramps = true;
    for kind in &file.kinds {
        for hour in 1..=6u8 {
            if file.level(kind.kind, 5, hour) < file.level(kind.kind, 1, hour) {
                ramps = false;
            }
        }
    }
    out.push(result("schedule.ramps_up", ramps, "night 5 >= night 1"));

    if verbose {
        for r in &out {
            println!("  {} {}", if r.passed { "ok" } else { "!!" }, r.name);
        }
    }
    out
}

// ── 3. Movement legality ────────────────────────────────────────────────

fn validate_movement_rules(verbose: bool) -> Vec<TestResult> {
    let mut out = Vec::new();
    let layout = layout();
    let graph = layout.graph();
    let rules = layout.rules();

    let fresh = |node: u32| MoveContext {
        current_node: node,
        previous_node: None,
        chosen_branch: branches::NONE,
        reached_checkpoint: false,
        left_home_base: false,
        holds_base_key: false,
    };

    // Non-neighbor moves are always rejected, from every node.
    let mut always_rejected = true;
    for node in layout.nodes.iter().map(|n| n.id) {
        for target in layout.nodes.iter().map(|n| n.id) {
            if graph.neighbors(node).contains(&target) {
                continue;
            }
            if check_move(&graph, &rules, &fresh(node), target)
                != Err(ActionError::NoDirectPath)
            {
                always_rejected = false;
            }
        }
    }
    out.push(result("move.non_neighbor_rejected", always_rejected, "full sweep"));

    // Walk the east branch from home: every hop legal, flags accumulate.
    let path = [2u32, 3, 4, 6, 8, 10];
    let mut ctx = fresh(1);
    let mut ok = true;
    for &target in &path {
        match check_move(&graph, &rules, &ctx, target) {
            Ok(outcome) => {
                ctx.previous_node = Some(ctx.current_node);
                ctx.current_node = target;
                if outcome.chooses_branch != branches::NONE {
                    ctx.chosen_branch = outcome.chooses_branch;
                }
                ctx.reached_checkpoint |= outcome.reaches_checkpoint;
                ctx.left_home_base |= outcome.leaves_home_base;
            }
            Err(e) => {
                ok = false;
                if verbose {
                    println!("  walk blocked at {target}: {e}");
                }
                break;
            }
        }
    }
    out.push(result(
        "move.branch_walk_to_checkpoint",
        ok && ctx.chosen_branch == branches::A && ctx.reached_checkpoint && ctx.left_home_base,
        format!(
            "branch={} checkpoint={} left_home={}",
            ctx.chosen_branch, ctx.reached_checkpoint, ctx.left_home_base
        ),
    ));

    // Past the checkpoint, backtracking is free.
    out.push(result(
        "move.backtrack_free_after_checkpoint",
        check_move(&graph, &rules, &ctx, 8).is_ok(),
        "checkpoint unlocks backtracking",
    ));

    // The sibling branch stays sealed forever.
    let mut at_fork = ctx;
    at_fork.current_node = 3;
    at_fork.previous_node = Some(4);
    out.push(result(
        "move.sibling_branch_sealed",
        check_move(&graph, &rules, &at_fork, 5) == Err(ActionError::BranchCommitted),
        "west branch after committing east",
    ));

    // Home base locked without the key, open with it.
    let mut at_door = ctx;
    at_door.current_node = 2;
    at_door.previous_node = Some(3);
    let locked = check_move(&graph, &rules, &at_door, 1) == Err(ActionError::HomeBaseLocked);
    at_door.holds_base_key = true;
    let open = check_move(&graph, &rules, &at_door, 1).is_ok();
    out.push(result("move.home_base_gate", locked && open, "key controls re-entry"));

    if verbose {
        for r in &out {
            println!("  {} {}", if r.passed { "ok" } else { "!!" }, r.name);
        }
    }
    out
}

// ── 4. Night derivation ─────────────────────────────────────────────────

fn validate_night_derivation(verbose: bool) -> Vec<TestResult> {
    let mut out = Vec::new();
    let cfg = NightConfig {
        total_nights: 5,
        hours_per_night: 6,
        hour_secs: 90,
    };

    let mut monotonic = true;
    let mut in_range = true;
    let mut prev = (0u8, 0u8);
    for elapsed in (0..cfg.total_secs() + 600).step_by(30) {
        let p = derive_phase(elapsed, &cfg);
        if !(1..=cfg.total_nights).contains(&p.night) || !(1..=cfg.hours_per_night).contains(&p.hour)
        {
            in_range = false;
        }
        if (p.night, p.hour) < prev {
            monotonic = false;
        }
        prev = (p.night, p.hour);
    }
    out.push(result("night.in_range", in_range, "sweep over full cycle"));
    out.push(result("night.monotonic", monotonic, "phase never goes backwards"));

    let one_bucket = derive_phase(cfg.hour_secs, &cfg);
    out.push(result(
        "night.one_bucket_one_hour",
        one_bucket.night == 1 && one_bucket.hour == 2,
        format!("{one_bucket:?}"),
    ));

    let pinned = derive_phase(cfg.total_secs() * 10, &cfg);
    out.push(result(
        "night.terminal_pinned",
        pinned.completed && pinned.night == 5 && pinned.hour == 6,
        format!("{pinned:?}"),
    ));

    if verbose {
        for r in &out {
            println!("  {} {}", if r.passed { "ok" } else { "!!" }, r.name);
        }
    }
    out
}

// ── 5. Turn barrier ─────────────────────────────────────────────────────

fn validate_turn_barrier(verbose: bool) -> Vec<TestResult> {
    let mut out = Vec::new();

    out.push(result(
        "barrier.needs_full_exhaustion",
        !all_exhausted([(true, 0), (true, 1)]) && all_exhausted([(true, 0), (false, 5)]),
        "one energetic player blocks; the dead never do",
    ));

    let mut refills_ok = true;
    for roll in 1..=6u8 {
        let v = refill_value(roll, 6);
        if !(2..=6).contains(&v) {
            refills_ok = false;
        }
    }
    out.push(result("barrier.refill_range", refills_ok, "min 2, capped at max"));

    if verbose {
        for r in &out {
            println!("  {} {}", if r.passed { "ok" } else { "!!" }, r.name);
        }
    }
    out
}

// ── 6. Scripted duel (the worked example) ───────────────────────────────

fn validate_scripted_duel(verbose: bool) -> Vec<TestResult> {
    let mut out = Vec::new();

    // A: life 100, attack 5, initiative 15. B: defense 3, initiative 10.
    out.push(result(
        "duel.initiative",
        first_attacker(15, 10) == Side::Initiator,
        "A strikes first",
    ));

    let r1 = resolve_round(&RoundInput {
        attacker_attack: 5,
        defender_defense: 3,
        defender_life: 100,
        round: 1,
        max_rounds: 3,
        life_floor: 10,
    });
    out.push(result(
        "duel.first_blood",
        r1 == RoundOutcome::Continues { defender_life: 98 },
        format!("{r1:?}"),
    ));

    let r3 = resolve_round(&RoundInput {
        attacker_attack: 5,
        defender_defense: 3,
        defender_life: 98,
        round: 3,
        max_rounds: 3,
        life_floor: 10,
    });
    let retreat = matches!(r3, RoundOutcome::RetreatCap { defender_life: 96 });
    out.push(result("duel.cap_forces_retreat", retreat, format!("{r3:?}")));
    out.push(result(
        "duel.lower_life_retreats",
        retreating_side(100, 96) == Side::Target,
        "B falls back",
    ));

    if verbose {
        for r in &out {
            println!("  {} {}", if r.passed { "ok" } else { "!!" }, r.name);
        }
    }
    out
}

// ── 7. Randomized duel sweep ────────────────────────────────────────────

fn validate_random_duels(verbose: bool) -> Vec<TestResult> {
    let mut rng = StdRng::seed_from_u64(0x4e49474854); // "NIGHT"
    let max_rounds = 3u8;
    let life_floor = 10u32;

    let mut violations = Vec::new();
    for trial in 0..500 {
        let mut lives = [rng.gen_range(20..=120u32), rng.gen_range(20..=120u32)];
        let attacks = [rng.gen_range(0..=40u32), rng.gen_range(0..=40u32)];
        let defenses = [rng.gen_range(0..=20u32), rng.gen_range(0..=20u32)];
        let mut attacker = match first_attacker(rng.gen_range(1..=20), rng.gen_range(1..=20)) {
            Side::Initiator => 0usize,
            Side::Target => 1usize,
        };

        let mut round = 1u8;
        let loser = loop {
            let defender = 1 - attacker;
            let outcome = resolve_round(&RoundInput {
                attacker_attack: attacks[attacker],
                defender_defense: defenses[defender],
                defender_life: lives[defender],
                round,
                max_rounds,
                life_floor,
            });
            match outcome {
                RoundOutcome::Continues { defender_life } => {
                    lives[defender] = defender_life;
                    round += 1;
                    attacker = defender;
                }
                RoundOutcome::AttackerWins { defender_life } => {
                    lives[defender] = defender_life;
                    break Some(defender);
                }
                RoundOutcome::RetreatCap { defender_life } => {
                    lives[defender] = defender_life;
                    break None;
                }
            }
        };

        if round > max_rounds {
            violations.push(format!("trial {trial}: round {round} exceeded cap"));
        }
        if let Some(loser) = loser {
            if lives[loser] != life_floor {
                violations.push(format!("trial {trial}: loser not at floor: {lives:?}"));
            }
        }
        if lives.iter().any(|&l| l == 0) {
            violations.push(format!("trial {trial}: a duel killed someone"));
        }
    }

    if verbose {
        println!("  random duels: {} violations", violations.len());
    }
    vec![result(
        "duel.random_sweep_invariants",
        violations.is_empty(),
        violations.first().cloned().unwrap_or_default(),
    )]
}

// ── 8. Loot tiers ───────────────────────────────────────────────────────

fn validate_loot_tiers(verbose: bool) -> Vec<TestResult> {
    let mut out = Vec::new();

    let mut sane = true;
    for n in 0..200 {
        if loot::loot_count(n) > n {
            sane = false;
        }
    }
    out.push(result("loot.count_bounded", sane, "never exceeds remaining"));
    out.push(result(
        "loot.fraction_tiers",
        loot::loot_fraction(0) == 0.0 && loot::loot_fraction(100) == 0.5,
        "extremes",
    ));

    if verbose {
        for r in &out {
            println!("  {} {}", if r.passed { "ok" } else { "!!" }, r.name);
        }
    }
    out
}
