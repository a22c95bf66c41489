//! SpacetimeDB table definitions for the game-state engine.
//!
//! Lists (visited history, animatronic zones, hourly levels, combat logs)
//! are stored as delimiter-separated strings; the accessors below own the
//! encoding so reducers never touch raw columns.

use spacetimedb::{table, Identity, Timestamp};

// ============================================================================
// SESSIONS & CONNECTIONS
// ============================================================================

/// One running game.
#[table(name = game_session, public)]
#[derive(Clone)]
pub struct GameSession {
    #[primary_key]
    #[auto_inc]
    pub id: u64,
    pub name: String,
    pub created_at: Timestamp,
}

/// Connected client session.
#[table(name = connected_client, public)]
pub struct ConnectedClient {
    #[primary_key]
    pub identity: Identity,
    pub player_id: Option<u64>,
    pub connected_at: Timestamp,
}

/// Engine tunables singleton (id always 0), seeded at module init.
#[table(name = game_config, public)]
#[derive(Clone)]
pub struct GameConfig {
    #[primary_key]
    pub id: u32,
    pub starting_life: u32,
    pub starting_attack: u32,
    pub starting_defense: u32,
    pub max_stamina: u32,
    /// Life a defeated PvP participant is clamped to; defeat never kills.
    pub life_floor: u32,
    pub max_pvp_rounds: u8,
    pub pve_counter_damage: u32,
    pub total_nights: u8,
    pub hours_per_night: u8,
    pub hour_secs: u64,
}

// ============================================================================
// MAP
// ============================================================================

/// A location in the fixed movement graph.
#[table(name = map_node, public)]
pub struct MapNode {
    #[primary_key]
    pub id: u32,
    pub name: String,
    pub is_dead_end: bool,
}

/// Undirected adjacency between two nodes.
#[table(name = map_edge, public)]
pub struct MapEdge {
    #[primary_key]
    #[auto_inc]
    pub id: u64,
    pub node_a: u32,
    pub node_b: u32,
}

/// Rule nodes singleton (id always 0): home base, fork, checkpoint and the
/// two mutually exclusive branch sets.
#[table(name = map_config, public)]
#[derive(Clone)]
pub struct MapConfig {
    #[primary_key]
    pub id: u32,
    pub home_base: u32,
    pub fork_node: u32,
    pub checkpoint: u32,
    pub branch_a: String,
    pub branch_b: String,
}

// ============================================================================
// ACTORS
// ============================================================================

/// A player character. Never deleted; death flips `is_alive`.
#[table(name = player, public)]
#[derive(Clone)]
pub struct Player {
    #[primary_key]
    #[auto_inc]
    pub id: u64,
    pub session_id: u64,
    pub owner_identity: Option<Identity>,
    pub name: String,
    pub current_node: u32,
    /// Node most recently departed (the no-backtrack reference).
    pub previous_node: Option<u32>,
    /// Visit history as comma-separated node ids, oldest first.
    pub visited: String,
    pub life: u32,
    pub max_life: u32,
    pub attack: u32,
    pub defense: u32,
    pub stamina: u32,
    pub max_stamina: u32,
    pub chosen_branch: u8,
    pub reached_checkpoint: bool,
    pub left_home_base: bool,
    pub is_alive: bool,
    /// Open PvE engagement, if any.
    pub engaged_npc: Option<u64>,
    /// Open PvP encounter, if any. Both participants carry the same id and
    /// both references are always written in one transaction.
    pub pvp_encounter_id: Option<u64>,
}

impl Player {
    pub fn visited_nodes(&self) -> Vec<u32> {
        parse_id_list(&self.visited)
    }

    pub fn push_visited(&mut self, node: u32) {
        if self.visited.is_empty() {
            self.visited = node.to_string();
        } else {
            self.visited.push(',');
            self.visited.push_str(&node.to_string());
        }
    }

    pub fn engaged(&self) -> bool {
        self.engaged_npc.is_some() || self.pvp_encounter_id.is_some()
    }
}

/// An inventory item. The catalog is external content; the engine only
/// tracks ownership and the equipped slot.
#[table(name = item, public)]
#[derive(Clone)]
pub struct Item {
    #[primary_key]
    #[auto_inc]
    pub id: u64,
    pub owner_player_id: u64,
    pub kind: u8,
    pub equipped_slot: Option<u8>,
}

/// An autonomous stalker. Immortal: no health, never removed.
#[table(name = animatronic, public)]
#[derive(Clone)]
pub struct Animatronic {
    #[primary_key]
    #[auto_inc]
    pub id: u64,
    pub session_id: u64,
    pub kind: u8,
    pub name: String,
    pub current_node: u32,
    /// Aggression in [0, 20]; a d20 roll at or below it permits a move.
    pub ai_level: u8,
    /// Allowed nodes as comma-separated ids; `current_node` stays inside.
    pub zone: String,
}

impl Animatronic {
    pub fn zone_nodes(&self) -> Vec<u32> {
        parse_id_list(&self.zone)
    }
}

// ============================================================================
// NIGHT CYCLE
// ============================================================================

/// Night-cycle singleton per session. Stored (night, hour) is a cache of
/// the pure derivation from `now - started_at`; never authoritative.
#[table(name = night_cycle, public)]
#[derive(Clone)]
pub struct NightCycle {
    #[primary_key]
    pub session_id: u64,
    pub active: bool,
    pub started_at_micros: Option<i64>,
    pub night: u8,
    pub hour: u8,
    pub last_synced_micros: i64,
}

/// Static per-actor aggression schedule, one row per (kind, night), the
/// hourly levels comma-separated. Seeded from `data/night_schedule.json`.
#[table(name = ai_schedule, public)]
#[derive(Clone)]
pub struct AiSchedule {
    #[primary_key]
    #[auto_inc]
    pub id: u64,
    pub kind: u8,
    pub night: u8,
    pub hour_levels: String,
}

// ============================================================================
// PVP ENCOUNTERS
// ============================================================================

/// A duel between two players. Cleared from both participants on
/// completion; the row itself is kept as history.
#[table(name = pvp_encounter, public)]
#[derive(Clone)]
pub struct PvpEncounter {
    #[primary_key]
    #[auto_inc]
    pub id: u64,
    pub session_id: u64,
    pub initiator_id: u64,
    pub target_id: u64,
    pub initiator_roll: u8,
    pub target_roll: u8,
    /// Whoever attacks next; swaps each resolved round.
    pub attacker_id: u64,
    pub round: u8,
    pub status: u8,
    pub outcome: u8,
    /// Newline-separated combat log.
    pub log: String,
    pub loot_claimed: bool,
}

impl PvpEncounter {
    pub fn append_log(&mut self, line: &str) {
        if !self.log.is_empty() {
            self.log.push('\n');
        }
        self.log.push_str(line);
    }

    /// The participant opposite the given one.
    pub fn other_participant(&self, player_id: u64) -> u64 {
        if player_id == self.initiator_id {
            self.target_id
        } else {
            self.initiator_id
        }
    }
}

// ============================================================================
// ACTION RESULTS
// ============================================================================

/// Append-only result rows for the presentation layer: what happened, as a
/// human message plus an action-specific JSON payload. Rejected actions
/// never reach this table (their transaction aborts); `success: false`
/// marks a committed action that resolved against the caller's intent,
/// such as an engagement dissolving because the target already left.
#[table(name = action_log, public)]
pub struct ActionLog {
    #[primary_key]
    #[auto_inc]
    pub id: u64,
    pub session_id: u64,
    pub player_id: u64,
    pub action: u8,
    pub success: bool,
    pub message: String,
    pub payload: String,
    pub at: Timestamp,
}

/// Parse a comma-separated id column; malformed entries are dropped.
pub fn parse_id_list(s: &str) -> Vec<u32> {
    s.split(',')
        .filter_map(|p| p.trim().parse::<u32>().ok())
        .collect()
}

/// Format ids for storage in a comma-separated column.
pub fn format_id_list(ids: &[u32]) -> String {
    ids.iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(",")
}
