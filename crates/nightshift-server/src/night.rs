//! Night-cycle coordinator: start and the idempotent advance-to-truth sync.
//!
//! Nothing here ticks. Clients poll `sync_night_cycle` (~every 30 s); any
//! caller, any number of times. The derived (night, hour) comes from
//! `now - started_at` alone, so a late sync fast-forwards and a redundant
//! sync is a no-op.

use nightshift_logic::constants::actions;
use nightshift_logic::error::ActionError;
use nightshift_logic::night::{derive_phase, level_at, parse_levels, NightConfig, Phase};
use serde_json::json;
use spacetimedb::{reducer, ReducerContext, Table};

use crate::results::{fail, record};
use crate::session::caller_player;
use crate::tables::*;
use crate::world;

fn night_config(cfg: &GameConfig) -> NightConfig {
    NightConfig {
        total_nights: cfg.total_nights,
        hours_per_night: cfg.hours_per_night,
        hour_secs: cfg.hour_secs,
    }
}

/// Begin the cycle: record the start instant and tune every animatronic
/// for (night 1, hour 1).
#[reducer]
pub fn start_night_cycle(ctx: &ReducerContext, session_id: u64) -> Result<(), String> {
    let mut cycle = ctx
        .db
        .night_cycle()
        .session_id()
        .find(session_id)
        .ok_or_else(|| fail(ActionError::Unseeded))?;
    // Already running, or already run to completion and pinned: the cycle
    // never restarts.
    if cycle.active || cycle.started_at_micros.is_some() {
        return Err(fail(ActionError::StaleState));
    }

    let now = ctx.timestamp.to_micros_since_unix_epoch();
    cycle.active = true;
    cycle.started_at_micros = Some(now);
    cycle.night = 1;
    cycle.hour = 1;
    cycle.last_synced_micros = now;
    ctx.db.night_cycle().session_id().update(cycle);

    push_ai_levels(ctx, session_id, 1, 1);
    log::info!("night cycle started for session {session_id}");
    Ok(())
}

/// Advance the stored cycle to the truth derived from wall-clock time.
/// Safe to call concurrently, redundantly, or late.
#[reducer]
pub fn sync_night_cycle(ctx: &ReducerContext, session_id: u64) -> Result<(), String> {
    let mut cycle = ctx
        .db
        .night_cycle()
        .session_id()
        .find(session_id)
        .ok_or_else(|| fail(ActionError::Unseeded))?;
    if !cycle.active {
        return Ok(()); // not started, or already pinned terminal
    }
    let config = world::load_config(ctx).map_err(fail)?;
    let now = ctx.timestamp.to_micros_since_unix_epoch();

    // Self-heal: active with no recorded start means the flag was toggled
    // directly; treat it as a fresh start at now.
    let healed = cycle.started_at_micros.is_none();
    let started = *cycle.started_at_micros.get_or_insert(now);

    let elapsed_secs = now.saturating_sub(started).max(0) as u64 / 1_000_000;
    let phase = derive_phase(elapsed_secs, &night_config(&config));

    let changed = healed || phase.night != cycle.night || phase.hour != cycle.hour || phase.completed;
    if !changed {
        return Ok(()); // already at the truth
    }

    cycle.night = phase.night;
    cycle.hour = phase.hour;
    cycle.last_synced_micros = now;
    if phase.completed {
        cycle.active = false;
    }
    ctx.db.night_cycle().session_id().update(cycle);

    push_ai_levels(ctx, session_id, phase.night, phase.hour);

    let player_id = caller_player(ctx).map(|p| p.id).unwrap_or(0);
    record(
        ctx,
        session_id,
        player_id,
        actions::NIGHT_SYNC,
        describe(&phase),
        json!({
            "night": phase.night,
            "hour": phase.hour,
            "completed": phase.completed,
        }),
    );
    Ok(())
}

fn describe(phase: &Phase) -> String {
    if phase.completed {
        format!("The final night is over (night {}).", phase.night)
    } else {
        format!("Night {}, hour {}.", phase.night, phase.hour)
    }
}

/// Evaluate the schedule for (night, hour) and retune every animatronic in
/// the session.
fn push_ai_levels(ctx: &ReducerContext, session_id: u64, night: u8, hour: u8) {
    let npcs: Vec<Animatronic> = ctx
        .db
        .animatronic()
        .iter()
        .filter(|a| a.session_id == session_id)
        .collect();
    for mut npc in npcs {
        let level = ctx
            .db
            .ai_schedule()
            .iter()
            .find(|row| row.kind == npc.kind && row.night == night)
            .map(|row| level_at(&parse_levels(&row.hour_levels), hour))
            .unwrap_or(0);
        if npc.ai_level != level {
            npc.ai_level = level;
            ctx.db.animatronic().id().update(npc);
        }
    }
}
