//! The shared-stamina turn barrier.
//!
//! Checked inside whichever transaction last touched stamina, so the
//! exhaustion test and the refill commit together and a racing duplicate
//! trigger sees a non-exhausted session and does nothing.

use nightshift_logic::stamina::{all_exhausted, refill_value};
use spacetimedb::{ReducerContext, Table};

use crate::rng::Lcg;
use crate::tables::*;

/// If every living player in the session is at exactly 0 stamina, refill
/// them all (independent d6 rolls) and return true.
pub fn maybe_refill(ctx: &ReducerContext, session_id: u64, rng: &mut Lcg) -> bool {
    let players: Vec<Player> = ctx
        .db
        .player()
        .iter()
        .filter(|p| p.session_id == session_id)
        .collect();

    if !all_exhausted(players.iter().map(|p| (p.is_alive, p.stamina))) {
        return false;
    }

    for mut p in players {
        if !p.is_alive {
            continue;
        }
        p.stamina = refill_value(rng.d6(), p.max_stamina);
        ctx.db.player().id().update(p);
    }
    log::info!("turn barrier fired for session {session_id}");
    true
}
