//! Desirability score of a single candidate slot.

const BASE: i64 = 100;
const CONFLICT_PENALTY: i64 = 30;
const AVAILABILITY_REWARD: f64 = 20.0;
const OUTSIDE_WORKING_HOURS_PENALTY: i64 = 40;
const NOON_DISTANCE_PENALTY: i64 = 2;

/// Score before clamping, may be negative.
///
/// Conflicts weigh the most, working outside working hours is a strong penalty, fully
/// available attendees add up to 20 points and every hour away from noon costs 2.
pub fn raw_score(
    conflicts: usize,
    availability_ratio: f64,
    within_working_hours: bool,
    hour_of_day: u8,
) -> i64 {
    let conflicts = i64::try_from(conflicts).unwrap_or(i64::MAX);
    // ratio is in [0, 1] so the reward is a small integer
    let availability = (availability_ratio.clamp(0.0, 1.0) * AVAILABILITY_REWARD).round() as i64;
    let working_hours = if within_working_hours {
        0
    } else {
        OUTSIDE_WORKING_HOURS_PENALTY
    };
    let noon_distance = (12 - i64::from(hour_of_day)).abs();

    BASE.saturating_sub(conflicts.saturating_mul(CONFLICT_PENALTY))
        .saturating_add(availability)
        .saturating_sub(working_hours)
        .saturating_sub(noon_distance * NOON_DISTANCE_PENALTY)
}

/// Score clamped at zero. There is no upper clamp, a conflict-free noon slot with every
/// attendee free scores 120.
pub fn score(
    conflicts: usize,
    availability_ratio: f64,
    within_working_hours: bool,
    hour_of_day: u8,
) -> u32 {
    let raw = raw_score(
        conflicts,
        availability_ratio,
        within_working_hours,
        hour_of_day,
    );
    u32::try_from(raw.max(0)).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::{raw_score, score};

    #[test]
    fn each_conflict_costs_thirty() {
        for conflicts in 0..6 {
            for hour in [0, 9, 12, 23] {
                assert_eq!(
                    raw_score(conflicts, 0.5, false, hour) - raw_score(conflicts + 1, 0.5, false, hour),
                    30
                );
            }
        }
    }

    #[test]
    fn weights() {
        assert_eq!(score(0, 1.0, true, 12), 120);
        assert_eq!(score(0, 0.0, true, 12), 100);
        assert_eq!(score(0, 0.5, true, 9), 104);
        assert_eq!(score(0, 1.0, false, 12), 80);
        assert_eq!(score(1, 1.0, true, 14), 86);
    }

    #[test]
    fn clamps_at_zero() {
        assert_eq!(raw_score(4, 0.0, false, 0), -84);
        assert_eq!(score(4, 0.0, false, 0), 0);
    }
}
