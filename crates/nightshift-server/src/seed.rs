//! Module-init seeding of static content: map topology, rule nodes, engine
//! tunables, and the AI-level schedule.
//!
//! Idempotent: every block is skipped when its table already has rows, so
//! republishing the module never duplicates content. The layout and
//! schedule JSON are the same files the headless harness validates.

use nightshift_logic::map::WorldLayout;
use nightshift_logic::night::{format_levels, ScheduleFile};
use spacetimedb::{reducer, ReducerContext, Table};

use crate::tables::*;

const WORLD_LAYOUT_JSON: &str = include_str!("../../../data/world_layout.json");
const NIGHT_SCHEDULE_JSON: &str = include_str!("../../../data/night_schedule.json");

#[reducer(init)]
pub fn init(ctx: &ReducerContext) {
    seed_map(ctx);
    seed_config(ctx);
    seed_schedule(ctx);
}

fn seed_map(ctx: &ReducerContext) {
    if ctx.db.map_node().iter().next().is_some() {
        return;
    }
    let layout: WorldLayout = match serde_json::from_str(WORLD_LAYOUT_JSON) {
        Ok(l) => l,
        Err(e) => {
            log::error!("world layout JSON is malformed: {e}");
            return;
        }
    };
    if let Err(e) = layout.validate() {
        log::error!("world layout rejected: {e}");
        return;
    }

    for node in &layout.nodes {
        ctx.db.map_node().insert(MapNode {
            id: node.id,
            name: node.name.clone(),
            is_dead_end: node.dead_end,
        });
    }
    for &(a, b) in &layout.edges {
        ctx.db.map_edge().insert(MapEdge {
            id: 0,
            node_a: a,
            node_b: b,
        });
    }
    ctx.db.map_config().insert(MapConfig {
        id: 0,
        home_base: layout.home_base,
        fork_node: layout.fork_node,
        checkpoint: layout.checkpoint,
        branch_a: format_id_list(&layout.branch_a),
        branch_b: format_id_list(&layout.branch_b),
    });
    log::info!(
        "seeded map: {} nodes, {} edges",
        layout.nodes.len(),
        layout.edges.len()
    );
}

fn seed_config(ctx: &ReducerContext) {
    if ctx.db.game_config().id().find(0).is_some() {
        return;
    }
    ctx.db.game_config().insert(GameConfig {
        id: 0,
        starting_life: 100,
        starting_attack: 5,
        starting_defense: 3,
        max_stamina: 6,
        life_floor: 10,
        max_pvp_rounds: 3,
        pve_counter_damage: 15,
        total_nights: 5,
        hours_per_night: 6,
        hour_secs: 90,
    });
    log::info!("seeded game config");
}

fn seed_schedule(ctx: &ReducerContext) {
    if ctx.db.ai_schedule().iter().next().is_some() {
        return;
    }
    let file: ScheduleFile = match serde_json::from_str(NIGHT_SCHEDULE_JSON) {
        Ok(f) => f,
        Err(e) => {
            log::error!("night schedule JSON is malformed: {e}");
            return;
        }
    };
    let mut rows = 0;
    for kind in &file.kinds {
        for night in &kind.nights {
            ctx.db.ai_schedule().insert(AiSchedule {
                id: 0,
                kind: kind.kind,
                night: night.night,
                hour_levels: format_levels(&night.levels),
            });
            rows += 1;
        }
    }
    log::info!("seeded AI schedule: {rows} rows");
}

/// The parsed roster from the layout file, used at session creation.
pub fn layout_roster() -> Vec<nightshift_logic::map::AnimatronicSpec> {
    serde_json::from_str::<WorldLayout>(WORLD_LAYOUT_JSON)
        .map(|l| l.animatronics)
        .unwrap_or_default()
}
