//! The action-result surface exposed to the presentation layer.
//!
//! Committed actions append an `ActionLog` row (message + JSON payload);
//! rejected actions abort the whole transaction, so their typed reason
//! reaches the caller through the reducer error string instead and no row
//! (or any other write) survives.

use nightshift_logic::error::ActionError;
use spacetimedb::{ReducerContext, Table};

use crate::tables::*;

/// Format a rejection for the reducer error channel: stable code first,
/// human message after.
pub fn fail(err: ActionError) -> String {
    format!("[{}] {}", err.code(), err)
}

/// Append one result row for a committed action.
pub fn record(
    ctx: &ReducerContext,
    session_id: u64,
    player_id: u64,
    action: u8,
    message: String,
    payload: serde_json::Value,
) {
    record_with(ctx, session_id, player_id, action, true, message, payload);
}

/// As [`record`], with an explicit success flag for committed actions that
/// resolved against the caller's intent.
pub fn record_with(
    ctx: &ReducerContext,
    session_id: u64,
    player_id: u64,
    action: u8,
    success: bool,
    message: String,
    payload: serde_json::Value,
) {
    ctx.db.action_log().insert(ActionLog {
        id: 0,
        session_id,
        player_id,
        action,
        success,
        message,
        payload: payload.to_string(),
        at: ctx.timestamp,
    });
}
