//! Nightshift Server - SpacetimeDB Module
//!
//! Shared game-state engine for the multiplayer survival game, running as
//! a SpacetimeDB module. Every client action is a reducer — one atomic
//! transaction over the tables it touches — and clients are thin renderers
//! fed by table subscriptions. There is no server-owned tick: the night
//! cycle is re-derived from wall-clock time by whichever client syncs next.

mod barrier;
mod night;
mod npc;
mod reducers;
mod results;
mod rng;
mod seed;
mod session;
mod tables;
mod world;

pub use reducers::*;
pub use tables::*;
