//! Wall-clock night/hour derivation and per-actor AI-level schedules.
//!
//! The night cycle is never ticked: `(night, hour)` is a pure function of
//! elapsed time since the recorded start, so any caller can advance the
//! stored state to the truth at any moment and calling late merely
//! fast-forwards. Hours are fixed-size buckets; once the full cycle has
//! elapsed the phase pins at the final (night, hour) and the cycle is done.

use serde::{Deserialize, Serialize};

use crate::constants::MAX_AI_LEVEL;

/// Cycle shape: how many nights, hours per night, seconds per hour.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct NightConfig {
    pub total_nights: u8,
    pub hours_per_night: u8,
    pub hour_secs: u64,
}

impl NightConfig {
    pub fn total_secs(&self) -> u64 {
        self.total_nights as u64 * self.hours_per_night as u64 * self.hour_secs
    }
}

/// A derived point in the cycle. Both indices are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phase {
    pub night: u8,
    pub hour: u8,
    /// True once the full cycle duration has elapsed; the phase is pinned.
    pub completed: bool,
}

/// Derive the phase from elapsed seconds alone.
pub fn derive_phase(elapsed_secs: u64, cfg: &NightConfig) -> Phase {
    if elapsed_secs >= cfg.total_secs() {
        return Phase {
            night: cfg.total_nights,
            hour: cfg.hours_per_night,
            completed: true,
        };
    }
    let bucket = elapsed_secs / cfg.hour_secs;
    let hours = cfg.hours_per_night as u64;
    Phase {
        night: (bucket / hours) as u8 + 1,
        hour: (bucket % hours) as u8 + 1,
        completed: false,
    }
}

// ── AI-level schedule ───────────────────────────────────────────────────

/// Per-hour levels for one (kind, night) pair.
#[derive(Debug, Clone, Deserialize)]
pub struct NightRow {
    pub night: u8,
    pub levels: Vec<u8>,
}

/// One actor kind's full schedule.
#[derive(Debug, Clone, Deserialize)]
pub struct KindSchedule {
    pub kind: u8,
    pub name: String,
    pub nights: Vec<NightRow>,
}

/// The static schedule table, deserialized from `data/night_schedule.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleFile {
    pub kinds: Vec<KindSchedule>,
}

impl ScheduleFile {
    /// Pure lookup `level(kind, night, hour)`. Unknown kinds or nights
    /// yield 0 (a dormant actor); levels are capped at [`MAX_AI_LEVEL`].
    pub fn level(&self, kind: u8, night: u8, hour: u8) -> u8 {
        let Some(ks) = self.kinds.iter().find(|k| k.kind == kind) else {
            return 0;
        };
        let Some(row) = ks.nights.iter().find(|n| n.night == night) else {
            return 0;
        };
        level_at(&row.levels, hour)
    }
}

/// Hour lookup within one night's level list, 1-based and clamped to the
/// last entry so a short row holds its final level.
pub fn level_at(levels: &[u8], hour: u8) -> u8 {
    if levels.is_empty() {
        return 0;
    }
    let idx = (hour.max(1) as usize - 1).min(levels.len() - 1);
    levels[idx].min(MAX_AI_LEVEL)
}

/// Serialize one night's levels for storage as a comma-separated column.
pub fn format_levels(levels: &[u8]) -> String {
    levels
        .iter()
        .map(|l| l.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Parse a stored comma-separated level column. Malformed entries are
/// dropped rather than trusted.
pub fn parse_levels(s: &str) -> Vec<u8> {
    s.split(',')
        .filter_map(|p| p.trim().parse::<u8>().ok())
        .map(|l| l.min(MAX_AI_LEVEL))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> NightConfig {
        NightConfig {
            total_nights: 5,
            hours_per_night: 6,
            hour_secs: 90,
        }
    }

    #[test]
    fn test_phase_starts_at_one_one() {
        assert_eq!(
            derive_phase(0, &cfg()),
            Phase {
                night: 1,
                hour: 1,
                completed: false
            }
        );
    }

    #[test]
    fn test_one_bucket_is_one_hour() {
        let before = derive_phase(89, &cfg());
        let after = derive_phase(90, &cfg());
        assert_eq!(before.hour, 1);
        assert_eq!(after.hour, 2);
        assert_eq!(after.night, 1);
    }

    #[test]
    fn test_night_rolls_over_after_last_hour() {
        // 6 hours * 90s = 540s per night.
        let p = derive_phase(540, &cfg());
        assert_eq!(p, Phase { night: 2, hour: 1, completed: false });
        let p = derive_phase(539, &cfg());
        assert_eq!(p, Phase { night: 1, hour: 6, completed: false });
    }

    #[test]
    fn test_derivation_is_idempotent() {
        for elapsed in [0, 89, 90, 539, 540, 2699] {
            assert_eq!(derive_phase(elapsed, &cfg()), derive_phase(elapsed, &cfg()));
        }
    }

    #[test]
    fn test_terminal_pinning() {
        // Full cycle: 5 * 540 = 2700s.
        let p = derive_phase(2700, &cfg());
        assert_eq!(p, Phase { night: 5, hour: 6, completed: true });
        // Long after the end: still pinned, never out of range.
        let p = derive_phase(1_000_000, &cfg());
        assert_eq!(p, Phase { night: 5, hour: 6, completed: true });
    }

    #[test]
    fn test_phase_always_in_range() {
        let c = cfg();
        for elapsed in (0..3000).step_by(7) {
            let p = derive_phase(elapsed, &c);
            assert!((1..=c.total_nights).contains(&p.night));
            assert!((1..=c.hours_per_night).contains(&p.hour));
        }
    }

    #[test]
    fn test_schedule_lookup() {
        let file = ScheduleFile {
            kinds: vec![KindSchedule {
                kind: 2,
                name: "Shambler".into(),
                nights: vec![NightRow {
                    night: 1,
                    levels: vec![0, 1, 2, 3, 4, 5],
                }],
            }],
        };
        assert_eq!(file.level(2, 1, 1), 0);
        assert_eq!(file.level(2, 1, 6), 5);
        // Unknown kind or night: dormant.
        assert_eq!(file.level(9, 1, 1), 0);
        assert_eq!(file.level(2, 3, 1), 0);
    }

    #[test]
    fn test_level_at_clamps_hour_and_value() {
        assert_eq!(level_at(&[1, 2, 3], 9), 3);
        assert_eq!(level_at(&[1, 2, 3], 0), 1);
        assert_eq!(level_at(&[99], 1), MAX_AI_LEVEL);
        assert_eq!(level_at(&[], 1), 0);
    }

    #[test]
    fn test_levels_roundtrip_through_storage() {
        let levels = vec![0, 4, 8, 12, 16, 20];
        assert_eq!(parse_levels(&format_levels(&levels)), levels);
        assert_eq!(parse_levels("3, 5,bogus,21"), vec![3, 5, 20]);
    }
}
