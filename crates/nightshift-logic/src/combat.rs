//! Turn-based combat resolution: PvP rounds and the PvE exchange.
//!
//! Damage is deterministic: defense at or above attack blocks entirely;
//! otherwise the difference lands. Randomness (initiative, repel targets,
//! retreat destinations) is drawn by the caller and passed in.

use serde::{Deserialize, Serialize};

/// A participant role in a PvP encounter. Roles swap every round; outcomes
/// are reported in terms of the fixed initiator/target pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Initiator,
    Target,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::Initiator => Side::Target,
            Side::Target => Side::Initiator,
        }
    }
}

/// Who attacks first: the higher initiative roll; ties favor the initiator.
pub fn first_attacker(initiator_roll: u8, target_roll: u8) -> Side {
    if target_roll > initiator_roll {
        Side::Target
    } else {
        Side::Initiator
    }
}

/// Deterministic block rule: defense >= attack blocks the hit entirely.
pub fn block_damage(attack: u32, defense: u32) -> u32 {
    if attack > defense {
        attack - defense
    } else {
        0
    }
}

/// One PvP round as seen from the current attacker.
#[derive(Debug, Clone, Copy)]
pub struct RoundInput {
    pub attacker_attack: u32,
    pub defender_defense: u32,
    pub defender_life: u32,
    /// Round being resolved, 1-based.
    pub round: u8,
    pub max_rounds: u8,
    /// Life value a defeated player is clamped to; defeat is never lethal.
    pub life_floor: u32,
}

/// What a resolved round means for the encounter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundOutcome {
    /// Encounter continues; roles swap, round increments.
    Continues { defender_life: u32 },
    /// The hit would have dropped the defender to 0: clamped to the floor,
    /// attacker wins.
    AttackerWins { defender_life: u32 },
    /// Round cap reached without a decisive hit; the lower-life participant
    /// must retreat.
    RetreatCap { defender_life: u32 },
}

/// Resolve one attack within a PvP encounter.
pub fn resolve_round(input: &RoundInput) -> RoundOutcome {
    let damage = block_damage(input.attacker_attack, input.defender_defense);
    if damage >= input.defender_life {
        return RoundOutcome::AttackerWins {
            defender_life: input.life_floor,
        };
    }
    let defender_life = input.defender_life - damage;
    if input.round >= input.max_rounds {
        RoundOutcome::RetreatCap { defender_life }
    } else {
        RoundOutcome::Continues { defender_life }
    }
}

/// Which participant retreats when the round cap fires: strictly lower life
/// retreats; at equal life the initiator retreats (they started it).
pub fn retreating_side(initiator_life: u32, target_life: u32) -> Side {
    if target_life < initiator_life {
        Side::Target
    } else {
        Side::Initiator
    }
}

// ── PvE ─────────────────────────────────────────────────────────────────

/// One PvE exchange. Hit/miss is decided upstream; animatronics are
/// immortal, so a hit repels rather than damages.
#[derive(Debug, Clone, Copy)]
pub struct ExchangeInput {
    pub hit: bool,
    pub player_life: u32,
    pub counter_damage: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeOutcome {
    /// The animatronic is driven off; the engagement ends.
    Repelled,
    /// The animatronic counter-attacked. `fatal` means life reached 0.
    Countered { player_life: u32, fatal: bool },
}

pub fn resolve_exchange(input: &ExchangeInput) -> ExchangeOutcome {
    if input.hit {
        return ExchangeOutcome::Repelled;
    }
    let player_life = input.player_life.saturating_sub(input.counter_damage);
    ExchangeOutcome::Countered {
        player_life,
        fatal: player_life == 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round(attack: u32, defense: u32, life: u32, round: u8) -> RoundInput {
        RoundInput {
            attacker_attack: attack,
            defender_defense: defense,
            defender_life: life,
            round,
            max_rounds: 3,
            life_floor: 10,
        }
    }

    #[test]
    fn test_initiative_higher_roll_wins() {
        assert_eq!(first_attacker(15, 10), Side::Initiator);
        assert_eq!(first_attacker(3, 18), Side::Target);
    }

    #[test]
    fn test_initiative_tie_favors_initiator() {
        assert_eq!(first_attacker(11, 11), Side::Initiator);
    }

    #[test]
    fn test_block_is_strictly_greater_than() {
        assert_eq!(block_damage(5, 3), 2);
        assert_eq!(block_damage(5, 5), 0);
        assert_eq!(block_damage(3, 5), 0);
    }

    #[test]
    fn test_round_continues_and_damages() {
        let out = resolve_round(&round(5, 3, 100, 1));
        assert_eq!(out, RoundOutcome::Continues { defender_life: 98 });
    }

    #[test]
    fn test_blocked_round_still_advances() {
        let out = resolve_round(&round(4, 9, 100, 2));
        assert_eq!(out, RoundOutcome::Continues { defender_life: 100 });
    }

    #[test]
    fn test_lethal_hit_clamps_to_floor() {
        // 40 damage against 12 life: no kill, clamp to the floor.
        let out = resolve_round(&round(45, 5, 12, 1));
        assert_eq!(out, RoundOutcome::AttackerWins { defender_life: 10 });
    }

    #[test]
    fn test_exact_kill_also_clamps() {
        let out = resolve_round(&round(13, 1, 12, 2));
        assert_eq!(out, RoundOutcome::AttackerWins { defender_life: 10 });
    }

    #[test]
    fn test_round_cap_forces_retreat() {
        let out = resolve_round(&round(5, 3, 100, 3));
        assert_eq!(out, RoundOutcome::RetreatCap { defender_life: 98 });
    }

    #[test]
    fn test_retreat_side_lower_life() {
        assert_eq!(retreating_side(90, 80), Side::Target);
        assert_eq!(retreating_side(40, 70), Side::Initiator);
    }

    #[test]
    fn test_retreat_tie_is_initiator() {
        assert_eq!(retreating_side(55, 55), Side::Initiator);
    }

    #[test]
    fn test_exchange_hit_repels() {
        let out = resolve_exchange(&ExchangeInput {
            hit: true,
            player_life: 50,
            counter_damage: 15,
        });
        assert_eq!(out, ExchangeOutcome::Repelled);
    }

    #[test]
    fn test_exchange_miss_counters() {
        let out = resolve_exchange(&ExchangeInput {
            hit: false,
            player_life: 50,
            counter_damage: 15,
        });
        assert_eq!(
            out,
            ExchangeOutcome::Countered {
                player_life: 35,
                fatal: false
            }
        );
    }

    #[test]
    fn test_exchange_counter_is_lethal_at_zero() {
        let out = resolve_exchange(&ExchangeInput {
            hit: false,
            player_life: 12,
            counter_damage: 15,
        });
        assert_eq!(
            out,
            ExchangeOutcome::Countered {
                player_life: 0,
                fatal: true
            }
        );
    }
}
