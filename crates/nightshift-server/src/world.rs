//! Table-backed views of the static world: the movement graph and the
//! legality rule set, rebuilt per reducer call from the seeded rows.

use nightshift_logic::error::ActionError;
use nightshift_logic::map::{MapGraph, MapRules};
use spacetimedb::{ReducerContext, Table};

use crate::tables::*;

pub fn load_graph(ctx: &ReducerContext) -> MapGraph {
    let edges: Vec<(u32, u32)> = ctx
        .db
        .map_edge()
        .iter()
        .map(|e| (e.node_a, e.node_b))
        .collect();
    let dead_ends: Vec<u32> = ctx
        .db
        .map_node()
        .iter()
        .filter(|n| n.is_dead_end)
        .map(|n| n.id)
        .collect();
    MapGraph::from_edges(&edges, &dead_ends)
}

pub fn load_rules(ctx: &ReducerContext) -> Result<MapRules, ActionError> {
    let cfg = ctx
        .db
        .map_config()
        .id()
        .find(0)
        .ok_or(ActionError::Unseeded)?;
    Ok(MapRules::new(
        cfg.home_base,
        cfg.fork_node,
        cfg.checkpoint,
        &parse_id_list(&cfg.branch_a),
        &parse_id_list(&cfg.branch_b),
    ))
}

pub fn load_config(ctx: &ReducerContext) -> Result<GameConfig, ActionError> {
    ctx.db
        .game_config()
        .id()
        .find(0)
        .ok_or(ActionError::Unseeded)
}
