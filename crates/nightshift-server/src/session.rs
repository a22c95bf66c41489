//! Connection lifecycle and session/player creation.

use nightshift_logic::constants::{item_kinds, slots};
use nightshift_logic::error::ActionError;
use spacetimedb::{reducer, ReducerContext, Table};

use crate::results::fail;
use crate::seed;
use crate::tables::*;
use crate::world;

#[reducer(client_connected)]
pub fn client_connected(ctx: &ReducerContext) {
    log::info!("client connected: {:?}", ctx.sender);
    ctx.db.connected_client().insert(ConnectedClient {
        identity: ctx.sender,
        player_id: None,
        connected_at: ctx.timestamp,
    });
}

#[reducer(client_disconnected)]
pub fn client_disconnected(ctx: &ReducerContext) {
    log::info!("client disconnected: {:?}", ctx.sender);
    if let Some(client) = ctx.db.connected_client().identity().find(ctx.sender) {
        ctx.db.connected_client().identity().delete(client.identity);
    }
}

/// Resolve the calling connection to its player record.
pub fn caller_player(ctx: &ReducerContext) -> Result<Player, ActionError> {
    let client = ctx
        .db
        .connected_client()
        .identity()
        .find(ctx.sender)
        .ok_or(ActionError::UnknownPlayer)?;
    let player_id = client.player_id.ok_or(ActionError::UnknownPlayer)?;
    ctx.db
        .player()
        .id()
        .find(player_id)
        .ok_or(ActionError::UnknownPlayer)
}

/// Create a new game: a session row, an inactive night cycle, and the
/// animatronic roster. The roster insert is guarded so a duplicate call
/// against an existing session never doubles the cast.
#[reducer]
pub fn create_session(ctx: &ReducerContext, name: String) -> Result<(), String> {
    let session = ctx.db.game_session().insert(GameSession {
        id: 0,
        name,
        created_at: ctx.timestamp,
    });

    ctx.db.night_cycle().insert(NightCycle {
        session_id: session.id,
        active: false,
        started_at_micros: None,
        night: 1,
        hour: 1,
        last_synced_micros: 0,
    });

    seed_animatronics(ctx, session.id);

    log::info!("created session {} ({})", session.id, session.name);
    Ok(())
}

/// Populate the session's animatronics from the layout roster, only if the
/// session has none yet.
fn seed_animatronics(ctx: &ReducerContext, session_id: u64) {
    let existing = ctx
        .db
        .animatronic()
        .iter()
        .any(|a| a.session_id == session_id);
    if existing {
        return;
    }
    for spec in seed::layout_roster() {
        ctx.db.animatronic().insert(Animatronic {
            id: 0,
            session_id,
            kind: spec.kind,
            name: spec.name,
            current_node: spec.start_node,
            ai_level: 0,
            zone: format_id_list(&spec.zone),
        });
    }
}

/// Join a session: creates the caller's player at the home base with the
/// configured defaults and a starter kit, and links the connection.
#[reducer]
pub fn join_session(ctx: &ReducerContext, session_id: u64, name: String) -> Result<(), String> {
    let mut client = ctx
        .db
        .connected_client()
        .identity()
        .find(ctx.sender)
        .ok_or_else(|| fail(ActionError::UnknownPlayer))?;
    if client.player_id.is_some() {
        return Err(fail(ActionError::AlreadyJoined));
    }
    if ctx.db.game_session().id().find(session_id).is_none() {
        return Err(fail(ActionError::UnknownPlayer));
    }
    let config = world::load_config(ctx).map_err(fail)?;
    let map = ctx
        .db
        .map_config()
        .id()
        .find(0)
        .ok_or_else(|| fail(ActionError::Unseeded))?;

    let player = ctx.db.player().insert(Player {
        id: 0,
        session_id,
        owner_identity: Some(ctx.sender),
        name,
        current_node: map.home_base,
        previous_node: None,
        visited: String::new(),
        life: config.starting_life,
        max_life: config.starting_life,
        attack: config.starting_attack,
        defense: config.starting_defense,
        stamina: config.max_stamina,
        max_stamina: config.max_stamina,
        chosen_branch: nightshift_logic::constants::branches::NONE,
        reached_checkpoint: false,
        left_home_base: false,
        is_alive: true,
        engaged_npc: None,
        pvp_encounter_id: None,
    });

    // Starter kit: every player begins holding their own base key.
    for (kind, slot) in [
        (item_kinds::BASE_KEY, Some(slots::KEYRING)),
        (item_kinds::FLASHLIGHT, Some(slots::HAND)),
        (item_kinds::MEDKIT, Some(slots::PACK)),
    ] {
        ctx.db.item().insert(Item {
            id: 0,
            owner_player_id: player.id,
            kind,
            equipped_slot: slot,
        });
    }

    client.player_id = Some(player.id);
    ctx.db.connected_client().identity().update(client);

    log::info!("player {} joined session {}", player.id, session_id);
    Ok(())
}

/// Move an item between equipment slots (or unequip it).
#[reducer]
pub fn equip_item(ctx: &ReducerContext, item_id: u64, slot: Option<u8>) -> Result<(), String> {
    let player = caller_player(ctx).map_err(fail)?;
    let mut item = ctx
        .db
        .item()
        .id()
        .find(item_id)
        .ok_or_else(|| fail(ActionError::UnknownItem))?;
    if item.owner_player_id != player.id {
        return Err(fail(ActionError::UnknownItem));
    }
    item.equipped_slot = slot;
    ctx.db.item().id().update(item);
    Ok(())
}

/// Whether the player holds the base key in their keyring slot.
pub fn holds_base_key(ctx: &ReducerContext, player_id: u64) -> bool {
    ctx.db.item().iter().any(|i| {
        i.owner_player_id == player_id
            && i.kind == item_kinds::BASE_KEY
            && i.equipped_slot == Some(slots::KEYRING)
    })
}
