//! Client-facing reducers: movement, PvE exchanges, the PvP duel protocol,
//! and the explicit turn-barrier trigger.
//!
//! Each reducer is one transaction. Preconditions are checked against rows
//! read inside it, and any `Err` return aborts every write, so partial
//! application of a multi-row change cannot happen.

use nightshift_logic::combat::{
    first_attacker, resolve_exchange, resolve_round, retreating_side, ExchangeInput,
    ExchangeOutcome, RoundInput, RoundOutcome, Side,
};
use nightshift_logic::constants::{actions, branches, encounter_status, outcomes};
use nightshift_logic::error::ActionError;
use nightshift_logic::loot::loot_count;
use nightshift_logic::map::{check_move, MoveContext};
use serde_json::json;
use spacetimedb::{reducer, ReducerContext, Table};

use crate::barrier;
use crate::npc;
use crate::results::{fail, record, record_with};
use crate::rng::Lcg;
use crate::session::{caller_player, holds_base_key};
use crate::tables::*;
use crate::world;

// ============================================================================
// MOVEMENT CONTROLLER
// ============================================================================

/// Orchestrates one move: legality, commit, NPC reaction, collision
/// detection, turn barrier — in that order, in one transaction.
#[reducer]
pub fn move_player(ctx: &ReducerContext, target_node: u32) -> Result<(), String> {
    let mut player = caller_player(ctx).map_err(fail)?;
    if !player.is_alive {
        return Err(fail(ActionError::NotAlive));
    }
    if player.engaged() {
        return Err(fail(ActionError::Engaged));
    }
    if player.stamina == 0 {
        return Err(fail(ActionError::OutOfStamina));
    }

    let graph = world::load_graph(ctx);
    if !graph.contains(target_node) {
        return Err(fail(ActionError::UnknownNode));
    }
    let rules = world::load_rules(ctx).map_err(fail)?;

    let move_ctx = MoveContext {
        current_node: player.current_node,
        previous_node: player.previous_node,
        chosen_branch: player.chosen_branch,
        reached_checkpoint: player.reached_checkpoint,
        left_home_base: player.left_home_base,
        holds_base_key: holds_base_key(ctx, player.id),
    };
    let outcome = check_move(&graph, &rules, &move_ctx, target_node).map_err(fail)?;

    // Commit the move.
    let departed = player.current_node;
    player.previous_node = Some(departed);
    player.push_visited(departed);
    player.current_node = target_node;
    player.stamina -= 1;
    if outcome.chooses_branch != branches::NONE {
        player.chosen_branch = outcome.chooses_branch;
    }
    if outcome.reaches_checkpoint {
        player.reached_checkpoint = true;
    }
    if outcome.leaves_home_base {
        player.left_home_base = true;
    }

    // NPC reaction: one opportunity per animatronic, after the move.
    let mut rng = Lcg::new(
        ctx.timestamp.to_micros_since_unix_epoch(),
        player.id ^ ((target_node as u64) << 24),
    );
    let npc_moves = npc::advance_all(ctx, player.session_id, &graph, &mut rng);

    // Collision at the destination: an animatronic opens an engagement;
    // another player is reported for an explicit challenge.
    let npc_here = ctx
        .db
        .animatronic()
        .iter()
        .find(|a| a.session_id == player.session_id && a.current_node == target_node);
    let player_here = ctx
        .db
        .player()
        .iter()
        .find(|p| {
            p.id != player.id
                && p.session_id == player.session_id
                && p.current_node == target_node
                && p.is_alive
        })
        .map(|p| p.id);

    let mut message = format!("{} moves to node {}.", player.name, target_node);
    if let Some(npc) = &npc_here {
        player.engaged_npc = Some(npc.id);
        message = format!("{} walks into {}!", player.name, npc.name);
    } else if player_here.is_some() {
        message = format!("{} finds another player here.", player.name);
    }

    let (player_id, session_id) = (player.id, player.session_id);
    ctx.db.player().id().update(player);

    let refilled = barrier::maybe_refill(ctx, session_id, &mut rng);

    record(
        ctx,
        session_id,
        player_id,
        actions::MOVE,
        message,
        json!({
            "node": target_node,
            "engaged_npc": npc_here.as_ref().map(|n| n.id),
            "player_contact": player_here,
            "npc_moves": npc_moves
                .iter()
                .map(|m| json!({"id": m.npc_id, "name": m.name, "to": m.to_node}))
                .collect::<Vec<_>>(),
            "turn_refilled": refilled,
        }),
    );
    Ok(())
}

// ============================================================================
// PVE COMBAT
// ============================================================================

/// One PvE exchange against the engaged animatronic. The hit/miss verdict
/// is decided upstream (skill check in the presentation flow) and passed
/// in; animatronics are immortal, so a hit repels instead of wounding.
#[reducer]
pub fn fight_animatronic(ctx: &ReducerContext, npc_id: u64, hit: bool) -> Result<(), String> {
    let mut player = caller_player(ctx).map_err(fail)?;
    if !player.is_alive {
        return Err(fail(ActionError::NotAlive));
    }
    if player.engaged_npc != Some(npc_id) {
        return Err(fail(ActionError::NotEngaged));
    }
    let npc = ctx
        .db
        .animatronic()
        .id()
        .find(npc_id)
        .ok_or_else(|| fail(ActionError::UnknownAnimatronic))?;
    let config = world::load_config(ctx).map_err(fail)?;
    let mut rng = Lcg::new(ctx.timestamp.to_micros_since_unix_epoch(), player.id ^ npc_id);

    // Re-validated inside the transaction: another player's move may have
    // already drawn the animatronic elsewhere. The stale engagement just
    // dissolves.
    if npc.current_node != player.current_node {
        player.engaged_npc = None;
        let (pid, sid) = (player.id, player.session_id);
        ctx.db.player().id().update(player);
        record_with(
            ctx,
            sid,
            pid,
            actions::PVE_EXCHANGE,
            false,
            format!("{} has already slipped away.", npc.name),
            json!({ "npc": npc_id, "stale": true }),
        );
        return Ok(());
    }

    let outcome = resolve_exchange(&ExchangeInput {
        hit,
        player_life: player.life,
        counter_damage: config.pve_counter_damage,
    });

    let (message, payload) = match outcome {
        ExchangeOutcome::Repelled => {
            let dest = npc::repel(ctx, &npc, &mut rng);
            player.engaged_npc = None;
            (
                format!("{} drives {} away!", player.name, npc.name),
                json!({ "npc": npc_id, "repelled_to": dest }),
            )
        }
        ExchangeOutcome::Countered { player_life, fatal } => {
            player.life = player_life;
            if fatal {
                player.is_alive = false;
                player.engaged_npc = None;
            }
            (
                if fatal {
                    format!("{} is torn down by {}.", player.name, npc.name)
                } else {
                    format!(
                        "{} counters {} for {} damage.",
                        npc.name, player.name, config.pve_counter_damage
                    )
                },
                json!({ "npc": npc_id, "life": player_life, "fatal": fatal }),
            )
        }
    };

    let (pid, sid) = (player.id, player.session_id);
    ctx.db.player().id().update(player);

    // A death can complete the exhaustion condition for everyone else.
    barrier::maybe_refill(ctx, sid, &mut rng);

    record(ctx, sid, pid, actions::PVE_EXCHANGE, message, payload);
    Ok(())
}

// ============================================================================
// PVP DUELS
// ============================================================================

/// Challenge another player on the same node. Rolls initiative for both,
/// seeds the encounter log, and links both participants in one transaction.
#[reducer]
pub fn pvp_initiate(ctx: &ReducerContext, target_player_id: u64) -> Result<(), String> {
    let mut initiator = caller_player(ctx).map_err(fail)?;
    if !initiator.is_alive {
        return Err(fail(ActionError::NotAlive));
    }
    if initiator.id == target_player_id {
        return Err(fail(ActionError::SelfTarget));
    }
    if initiator.engaged() {
        return Err(fail(ActionError::Engaged));
    }
    let mut target = ctx
        .db
        .player()
        .id()
        .find(target_player_id)
        .ok_or_else(|| fail(ActionError::UnknownPlayer))?;
    if target.session_id != initiator.session_id {
        return Err(fail(ActionError::UnknownPlayer));
    }
    // Re-validated here, inside the transaction: the target may have died
    // or been engaged by someone else since the client aimed.
    if !target.is_alive || target.engaged() {
        return Err(fail(ActionError::StaleState));
    }
    if target.current_node != initiator.current_node {
        return Err(fail(ActionError::NotOnSameNode));
    }

    let mut rng = Lcg::new(
        ctx.timestamp.to_micros_since_unix_epoch(),
        initiator.id ^ target_player_id.rotate_left(32),
    );
    let initiator_roll = rng.d20();
    let target_roll = rng.d20();
    let first = first_attacker(initiator_roll, target_roll);
    let attacker_id = match first {
        Side::Initiator => initiator.id,
        Side::Target => target.id,
    };
    let attacker_name = if attacker_id == initiator.id {
        &initiator.name
    } else {
        &target.name
    };

    let mut encounter = PvpEncounter {
        id: 0,
        session_id: initiator.session_id,
        initiator_id: initiator.id,
        target_id: target.id,
        initiator_roll,
        target_roll,
        attacker_id,
        round: 1,
        status: encounter_status::PENDING,
        outcome: outcomes::NONE,
        log: String::new(),
        loot_claimed: false,
    };
    encounter.append_log(&format!("{} challenges {}.", initiator.name, target.name));
    encounter.append_log(&format!(
        "Initiative: {} rolls {}, {} rolls {}.",
        initiator.name, initiator_roll, target.name, target_roll
    ));
    encounter.append_log(&format!("{attacker_name} will strike first."));
    let encounter = ctx.db.pvp_encounter().insert(encounter);

    initiator.pvp_encounter_id = Some(encounter.id);
    target.pvp_encounter_id = Some(encounter.id);
    let (iid, sid) = (initiator.id, initiator.session_id);
    ctx.db.player().id().update(initiator);
    ctx.db.player().id().update(target);

    record(
        ctx,
        sid,
        iid,
        actions::PVP_INITIATE,
        format!("Duel challenge issued to player {target_player_id}."),
        json!({
            "encounter": encounter.id,
            "initiator_roll": initiator_roll,
            "target_roll": target_roll,
            "first_attacker": attacker_id,
        }),
    );
    Ok(())
}

/// Accept or decline a pending challenge. Declining completes the
/// encounter peacefully and frees both participants at once.
#[reducer]
pub fn pvp_respond(ctx: &ReducerContext, accept: bool) -> Result<(), String> {
    let player = caller_player(ctx).map_err(fail)?;
    let encounter_id = player
        .pvp_encounter_id
        .ok_or_else(|| fail(ActionError::NotEngaged))?;
    let mut encounter = ctx
        .db
        .pvp_encounter()
        .id()
        .find(encounter_id)
        .ok_or_else(|| fail(ActionError::UnknownEncounter))?;
    if encounter.target_id != player.id {
        return Err(fail(ActionError::NotYourTurn));
    }
    if encounter.status != encounter_status::PENDING {
        return Err(fail(ActionError::BadEncounterState));
    }

    let (pid, sid) = (player.id, player.session_id);
    if accept {
        encounter.status = encounter_status::IN_PROGRESS;
        encounter.append_log(&format!("{} accepts the duel.", player.name));
        ctx.db.pvp_encounter().id().update(encounter);
    } else {
        encounter.status = encounter_status::COMPLETED;
        encounter.outcome = outcomes::PEACEFUL;
        encounter.append_log(&format!("{} declines; no blood tonight.", player.name));
        clear_encounter_refs(ctx, &encounter);
        ctx.db.pvp_encounter().id().update(encounter);
    }

    record(
        ctx,
        sid,
        pid,
        actions::PVP_RESPOND,
        if accept {
            "Challenge accepted.".to_string()
        } else {
            "Challenge declined.".to_string()
        },
        json!({ "encounter": encounter_id, "accept": accept }),
    );
    Ok(())
}

/// Resolve one duel round from the current attacker. Handles the win
/// clamp, the retreat cap (with forced relocation), and the role swap.
#[reducer]
pub fn pvp_round(ctx: &ReducerContext) -> Result<(), String> {
    let player = caller_player(ctx).map_err(fail)?;
    let encounter_id = player
        .pvp_encounter_id
        .ok_or_else(|| fail(ActionError::NotEngaged))?;
    let mut encounter = ctx
        .db
        .pvp_encounter()
        .id()
        .find(encounter_id)
        .ok_or_else(|| fail(ActionError::UnknownEncounter))?;
    if encounter.status != encounter_status::IN_PROGRESS {
        return Err(fail(ActionError::BadEncounterState));
    }
    if encounter.attacker_id != player.id {
        return Err(fail(ActionError::NotYourTurn));
    }

    let attacker = player;
    let mut defender = ctx
        .db
        .player()
        .id()
        .find(encounter.other_participant(attacker.id))
        .ok_or_else(|| fail(ActionError::UnknownPlayer))?;
    let config = world::load_config(ctx).map_err(fail)?;

    let outcome = resolve_round(&RoundInput {
        attacker_attack: attacker.attack,
        defender_defense: defender.defense,
        defender_life: defender.life,
        round: encounter.round,
        max_rounds: config.max_pvp_rounds,
        life_floor: config.life_floor,
    });

    let (pid, sid) = (attacker.id, attacker.session_id);
    let round_no = encounter.round;
    let (message, payload) = match outcome {
        RoundOutcome::Continues { defender_life } => {
            let dealt = defender.life - defender_life;
            defender.life = defender_life;
            encounter.round += 1;
            encounter.attacker_id = defender.id;
            encounter.append_log(&format!(
                "Round {}: {} hits {} for {} ({} life left).",
                round_no, attacker.name, defender.name, dealt, defender_life
            ));
            ctx.db.player().id().update(defender);
            ctx.db.pvp_encounter().id().update(encounter);
            (
                format!("Round {round_no} resolved; roles swap."),
                json!({ "encounter": encounter_id, "round": round_no, "damage": dealt }),
            )
        }
        RoundOutcome::AttackerWins { defender_life } => {
            defender.life = defender_life;
            encounter.status = encounter_status::COMPLETED;
            encounter.outcome = if attacker.id == encounter.initiator_id {
                outcomes::INITIATOR_WIN
            } else {
                outcomes::TARGET_WIN
            };
            encounter.append_log(&format!(
                "Round {}: {} overwhelms {}; the duel is decided.",
                round_no, attacker.name, defender.name
            ));
            ctx.db.player().id().update(defender);
            ctx.db.pvp_encounter().id().update(encounter.clone());
            (
                format!("{} wins the duel.", attacker.name),
                json!({ "encounter": encounter_id, "outcome": encounter.outcome }),
            )
        }
        RoundOutcome::RetreatCap { defender_life } => {
            defender.life = defender_life;
            encounter.status = encounter_status::COMPLETED;
            encounter.outcome = outcomes::RETREAT;

            // The lower-life participant flees; ties send the initiator.
            let (initiator_life, target_life) = if attacker.id == encounter.initiator_id {
                (attacker.life, defender.life)
            } else {
                (defender.life, attacker.life)
            };
            let retreater_id = match retreating_side(initiator_life, target_life) {
                Side::Initiator => encounter.initiator_id,
                Side::Target => encounter.target_id,
            };

            let mut attacker = attacker.clone();
            let retreater = if retreater_id == attacker.id {
                &mut attacker
            } else {
                &mut defender
            };
            let graph = world::load_graph(ctx);
            let mut rng = Lcg::new(
                ctx.timestamp.to_micros_since_unix_epoch(),
                encounter_id ^ retreater_id,
            );
            let from = retreater.current_node;
            if let Some(&dest) = rng.pick(graph.neighbors(from)) {
                retreater.previous_node = Some(from);
                retreater.current_node = dest;
            }
            let retreater_name = retreater.name.clone();
            let retreat_dest = retreater.current_node;

            encounter.append_log(&format!(
                "Round {round_no}: the cap is reached; {retreater_name} retreats."
            ));
            attacker.pvp_encounter_id = None;
            defender.pvp_encounter_id = None;
            ctx.db.player().id().update(attacker);
            ctx.db.player().id().update(defender);
            ctx.db.pvp_encounter().id().update(encounter);
            (
                format!("Duel ends in retreat: {retreater_name} falls back."),
                json!({
                    "encounter": encounter_id,
                    "outcome": outcomes::RETREAT,
                    "retreater": retreater_id,
                    "retreated_to": retreat_dest,
                }),
            )
        }
    };

    record(ctx, sid, pid, actions::PVP_ROUND, message, payload);
    Ok(())
}

/// Claim the spoils after a decisive duel: the chosen item plus a
/// size-tiered random cut of the loser's remaining inventory. Frees both
/// participants. The loser stays alive — defeat is never lethal.
#[reducer]
pub fn pvp_claim_loot(ctx: &ReducerContext, item_id: u64) -> Result<(), String> {
    let winner = caller_player(ctx).map_err(fail)?;
    let encounter_id = winner
        .pvp_encounter_id
        .ok_or_else(|| fail(ActionError::NotEngaged))?;
    let mut encounter = ctx
        .db
        .pvp_encounter()
        .id()
        .find(encounter_id)
        .ok_or_else(|| fail(ActionError::UnknownEncounter))?;
    if encounter.status != encounter_status::COMPLETED || encounter.loot_claimed {
        return Err(fail(ActionError::BadEncounterState));
    }
    let winner_won = (encounter.outcome == outcomes::INITIATOR_WIN
        && winner.id == encounter.initiator_id)
        || (encounter.outcome == outcomes::TARGET_WIN && winner.id == encounter.target_id);
    if !winner_won {
        return Err(fail(ActionError::NotYourTurn));
    }
    let loser_id = encounter.other_participant(winner.id);

    let mut chosen = ctx
        .db
        .item()
        .id()
        .find(item_id)
        .ok_or_else(|| fail(ActionError::UnknownItem))?;
    if chosen.owner_player_id != loser_id {
        return Err(fail(ActionError::ItemNotLootable));
    }
    chosen.owner_player_id = winner.id;
    chosen.equipped_slot = None;
    ctx.db.item().id().update(chosen);

    // A tiered cut of whatever the loser still carries.
    let mut remaining: Vec<Item> = ctx
        .db
        .item()
        .iter()
        .filter(|i| i.owner_player_id == loser_id)
        .collect();
    let mut rng = Lcg::new(
        ctx.timestamp.to_micros_since_unix_epoch(),
        encounter_id ^ winner.id.rotate_left(16),
    );
    let mut taken = vec![item_id];
    for _ in 0..loot_count(remaining.len()) {
        if remaining.is_empty() {
            break;
        }
        let mut extra = remaining.swap_remove(rng.index(remaining.len()));
        extra.owner_player_id = winner.id;
        extra.equipped_slot = None;
        taken.push(extra.id);
        ctx.db.item().id().update(extra);
    }

    encounter.loot_claimed = true;
    encounter.append_log(&format!(
        "{} strips {} item(s) from the loser.",
        winner.name,
        taken.len()
    ));
    clear_encounter_refs(ctx, &encounter);
    ctx.db.pvp_encounter().id().update(encounter);

    let (wid, sid) = (winner.id, winner.session_id);
    record(
        ctx,
        sid,
        wid,
        actions::PVP_LOOT,
        format!("Loot claimed: {} item(s).", taken.len()),
        json!({ "encounter": encounter_id, "items": taken, "from": loser_id }),
    );
    Ok(())
}

/// Clear both participants' encounter references in the same transaction.
fn clear_encounter_refs(ctx: &ReducerContext, encounter: &PvpEncounter) {
    for pid in [encounter.initiator_id, encounter.target_id] {
        if let Some(mut p) = ctx.db.player().id().find(pid) {
            if p.pvp_encounter_id == Some(encounter.id) {
                p.pvp_encounter_id = None;
                ctx.db.player().id().update(p);
            }
        }
    }
}

// ============================================================================
// TURN BARRIER
// ============================================================================

/// Explicit barrier trigger: any client that observes the all-exhausted
/// condition may call this. The condition is re-checked inside this
/// transaction, so a duplicate trigger is a typed no-op, never a double
/// refill.
#[reducer]
pub fn refill_turn(ctx: &ReducerContext, session_id: u64) -> Result<(), String> {
    let player = caller_player(ctx).map_err(fail)?;
    if player.session_id != session_id {
        return Err(fail(ActionError::UnknownPlayer));
    }
    let mut rng = Lcg::new(ctx.timestamp.to_micros_since_unix_epoch(), session_id);
    if !barrier::maybe_refill(ctx, session_id, &mut rng) {
        return Err(fail(ActionError::NotExhausted));
    }
    record(
        ctx,
        session_id,
        player.id,
        actions::TURN_REFILL,
        "A new turn begins.".to_string(),
        json!({ "session": session_id }),
    );
    Ok(())
}
