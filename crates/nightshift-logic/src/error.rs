//! Closed rejection taxonomy for every player-facing action.
//!
//! Three classes, per the concurrency model:
//! - `Validation`: the request was illegal as stated; nothing was mutated.
//! - `Conflict`: a precondition re-checked inside the transaction no longer
//!   held (another actor got there first); nothing was mutated, retry is safe.
//! - `Infrastructure`: required singleton state is missing (unseeded module).

use thiserror::Error;

/// How a failed action should be treated by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Conflict,
    Infrastructure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ActionError {
    // -- movement legality --
    #[error("there is no direct path to that node")]
    NoDirectPath,
    #[error("the home base door is locked; the base key must be on your keyring")]
    HomeBaseLocked,
    #[error("the other branch is sealed once a branch has been chosen")]
    BranchCommitted,
    #[error("cannot immediately return to the node just departed")]
    NoBacktrack,

    // -- actor state --
    #[error("not enough stamina for that action")]
    OutOfStamina,
    #[error("dead players cannot act")]
    NotAlive,
    #[error("already engaged in an encounter")]
    Engaged,
    #[error("not engaged in that encounter")]
    NotEngaged,
    #[error("cannot target yourself")]
    SelfTarget,
    #[error("both players must be on the same node")]
    NotOnSameNode,
    #[error("only the current attacker may act this round")]
    NotYourTurn,
    #[error("the encounter does not allow that action in its current state")]
    BadEncounterState,

    // -- unknown entities --
    #[error("unknown player")]
    UnknownPlayer,
    #[error("unknown node")]
    UnknownNode,
    #[error("unknown animatronic")]
    UnknownAnimatronic,
    #[error("unknown encounter")]
    UnknownEncounter,
    #[error("no such item in that inventory")]
    UnknownItem,
    #[error("that item cannot be looted")]
    ItemNotLootable,
    #[error("this connection already controls a player")]
    AlreadyJoined,

    // -- transactional re-validation --
    #[error("players are not all exhausted; the turn cannot refill yet")]
    NotExhausted,
    #[error("state changed underneath this action; retry")]
    StaleState,

    // -- infrastructure --
    #[error("game content has not been seeded")]
    Unseeded,
}

impl ActionError {
    /// Stable machine-readable reason code. The presentation layer keys
    /// special-case handling (e.g. the locked home-base door) off these.
    pub fn code(self) -> &'static str {
        match self {
            Self::NoDirectPath => "no_direct_path",
            Self::HomeBaseLocked => "home_base_locked",
            Self::BranchCommitted => "branch_committed",
            Self::NoBacktrack => "no_backtrack",
            Self::OutOfStamina => "out_of_stamina",
            Self::NotAlive => "not_alive",
            Self::Engaged => "engaged",
            Self::NotEngaged => "not_engaged",
            Self::SelfTarget => "self_target",
            Self::NotOnSameNode => "not_on_same_node",
            Self::NotYourTurn => "not_your_turn",
            Self::BadEncounterState => "bad_encounter_state",
            Self::UnknownPlayer => "unknown_player",
            Self::UnknownNode => "unknown_node",
            Self::UnknownAnimatronic => "unknown_animatronic",
            Self::UnknownEncounter => "unknown_encounter",
            Self::UnknownItem => "unknown_item",
            Self::ItemNotLootable => "item_not_lootable",
            Self::AlreadyJoined => "already_joined",
            Self::NotExhausted => "not_exhausted",
            Self::StaleState => "stale_state",
            Self::Unseeded => "unseeded",
        }
    }

    pub fn kind(self) -> ErrorKind {
        match self {
            Self::NotExhausted | Self::StaleState => ErrorKind::Conflict,
            Self::Unseeded => ErrorKind::Infrastructure,
            _ => ErrorKind::Validation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable_and_distinct() {
        let all = [
            ActionError::NoDirectPath,
            ActionError::HomeBaseLocked,
            ActionError::BranchCommitted,
            ActionError::NoBacktrack,
            ActionError::OutOfStamina,
            ActionError::NotAlive,
            ActionError::Engaged,
            ActionError::NotEngaged,
            ActionError::SelfTarget,
            ActionError::NotOnSameNode,
            ActionError::NotYourTurn,
            ActionError::BadEncounterState,
            ActionError::UnknownPlayer,
            ActionError::UnknownNode,
            ActionError::UnknownAnimatronic,
            ActionError::UnknownEncounter,
            ActionError::UnknownItem,
            ActionError::ItemNotLootable,
            ActionError::AlreadyJoined,
            ActionError::NotExhausted,
            ActionError::StaleState,
            ActionError::Unseeded,
        ];
        let mut codes: Vec<&str> = all.iter().map(|e| e.code()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), all.len());
    }

    #[test]
    fn test_kind_classification() {
        assert_eq!(ActionError::NoDirectPath.kind(), ErrorKind::Validation);
        assert_eq!(ActionError::HomeBaseLocked.kind(), ErrorKind::Validation);
        assert_eq!(ActionError::NotExhausted.kind(), ErrorKind::Conflict);
        assert_eq!(ActionError::StaleState.kind(), ErrorKind::Conflict);
        assert_eq!(ActionError::Unseeded.kind(), ErrorKind::Infrastructure);
    }

    #[test]
    fn test_display_is_human_readable() {
        let msg = ActionError::HomeBaseLocked.to_string();
        assert!(msg.contains("locked"));
    }
}
