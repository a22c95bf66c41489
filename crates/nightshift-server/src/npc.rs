//! Animatronic movement AI.
//!
//! Runs once after every successful player move — one NPC action
//! opportunity per player action, never on a timer. Each animatronic
//! independently rolls a d20 against its AI level; on a pass it steps to a
//! uniformly random graph neighbor inside its allowed zone.

use nightshift_logic::map::MapGraph;
use spacetimedb::{ReducerContext, Table};

use crate::rng::Lcg;
use crate::tables::*;

/// One committed NPC step, for the move result payload.
pub struct NpcMove {
    pub npc_id: u64,
    pub name: String,
    pub to_node: u32,
}

/// Roll every animatronic in the session and commit the steps that pass.
pub fn advance_all(
    ctx: &ReducerContext,
    session_id: u64,
    graph: &MapGraph,
    rng: &mut Lcg,
) -> Vec<NpcMove> {
    let mut moves = Vec::new();
    let npcs: Vec<Animatronic> = ctx
        .db
        .animatronic()
        .iter()
        .filter(|a| a.session_id == session_id)
        .collect();

    for mut npc in npcs {
        if rng.d20() > npc.ai_level {
            continue;
        }
        let zone = npc.zone_nodes();
        let candidates: Vec<u32> = graph
            .neighbors(npc.current_node)
            .iter()
            .copied()
            .filter(|n| zone.contains(n))
            .collect();
        let Some(&dest) = rng.pick(&candidates) else {
            continue;
        };
        npc.current_node = dest;
        moves.push(NpcMove {
            npc_id: npc.id,
            name: npc.name.clone(),
            to_node: dest,
        });
        ctx.db.animatronic().id().update(npc);
    }
    moves
}

/// Relocate a repelled animatronic to a random zone node away from the
/// contact point. Falls back to staying put when the zone has nowhere else.
pub fn repel(ctx: &ReducerContext, npc: &Animatronic, rng: &mut Lcg) -> u32 {
    let away: Vec<u32> = npc
        .zone_nodes()
        .into_iter()
        .filter(|&n| n != npc.current_node)
        .collect();
    let Some(&dest) = rng.pick(&away) else {
        return npc.current_node;
    };
    let mut updated = npc.clone();
    updated.current_node = dest;
    ctx.db.animatronic().id().update(updated);
    dest
}
