//! Shared u8 id namespaces used by both the rules and the server tables.

/// Mutually exclusive branch commitment from the fork node.
pub mod branches {
    pub const NONE: u8 = 0;
    pub const A: u8 = 1;
    pub const B: u8 = 2;
}

/// PvP encounter lifecycle.
pub mod encounter_status {
    pub const PENDING: u8 = 0;
    pub const IN_PROGRESS: u8 = 1;
    pub const COMPLETED: u8 = 2;
}

/// Terminal PvP outcomes. Exactly one of the non-NONE values holds on a
/// completed encounter.
pub mod outcomes {
    pub const NONE: u8 = 0;
    pub const INITIATOR_WIN: u8 = 1;
    pub const TARGET_WIN: u8 = 2;
    pub const RETREAT: u8 = 3;
    pub const PEACEFUL: u8 = 4;
}

/// Item kinds. The catalog itself is external content; the engine only
/// cares that BASE_KEY opens the home-base door.
pub mod item_kinds {
    pub const BASE_KEY: u8 = 0;
    pub const FLASHLIGHT: u8 = 1;
    pub const MEDKIT: u8 = 2;
    pub const SCRAP: u8 = 3;
    pub const BATTERY: u8 = 4;
}

/// Equipment slots. The home-base gate checks KEYRING specifically.
pub mod slots {
    pub const KEYRING: u8 = 0;
    pub const HAND: u8 = 1;
    pub const PACK: u8 = 2;
}

/// Animatronic kinds, matching `data/night_schedule.json`.
pub mod animatronic_kinds {
    pub const PROWLER: u8 = 0;
    pub const WATCHER: u8 = 1;
    pub const SHAMBLER: u8 = 2;
    pub const WARDEN: u8 = 3;
}

/// Action ids for the presentation-facing result log.
pub mod actions {
    pub const MOVE: u8 = 0;
    pub const PVE_EXCHANGE: u8 = 1;
    pub const PVP_INITIATE: u8 = 2;
    pub const PVP_RESPOND: u8 = 3;
    pub const PVP_ROUND: u8 = 4;
    pub const PVP_LOOT: u8 = 5;
    pub const TURN_REFILL: u8 = 6;
    pub const NIGHT_SYNC: u8 = 7;
}

/// Highest AI level an animatronic can hold; a d20 roll at or below the
/// level lets it advance, so 20 means "moves every opportunity".
pub const MAX_AI_LEVEL: u8 = 20;
