//! Turn-barrier math: the shared stamina rendezvous.
//!
//! A session-wide new turn begins only when every living player's stamina
//! is exactly 0 (the dead count as exhausted). The refill is per-player:
//! `min(max, 1 + d6)`, so a living player always comes back with at least 2.

/// True when the barrier condition holds: at least one living player, and
/// every living player fully exhausted.
pub fn all_exhausted<I>(players: I) -> bool
where
    I: IntoIterator<Item = (bool, u32)>,
{
    let mut any_living = false;
    for (alive, stamina) in players {
        if alive {
            any_living = true;
            if stamina > 0 {
                return false;
            }
        }
    }
    any_living
}

/// Refill value for one player given their d6 roll.
pub fn refill_value(d6: u8, max_stamina: u32) -> u32 {
    (1 + d6 as u32).min(max_stamina)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_barrier_holds_only_at_full_exhaustion() {
        assert!(all_exhausted([(true, 0), (true, 0)]));
        assert!(!all_exhausted([(true, 0), (true, 1)]));
        assert!(!all_exhausted([(true, 3), (true, 2)]));
    }

    #[test]
    fn test_dead_players_count_as_exhausted() {
        assert!(all_exhausted([(true, 0), (false, 4)]));
    }

    #[test]
    fn test_no_living_players_no_barrier() {
        assert!(!all_exhausted([(false, 0), (false, 2)]));
        assert!(!all_exhausted(std::iter::empty()));
    }

    #[test]
    fn test_refill_range() {
        for roll in 1..=6u8 {
            let v = refill_value(roll, 6);
            assert!((2..=6).contains(&v), "roll {roll} gave {v}");
        }
    }

    #[test]
    fn test_refill_capped_at_max() {
        assert_eq!(refill_value(6, 4), 4);
        assert_eq!(refill_value(1, 6), 2);
    }
}
