use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Days after which the audio-nudge counter window resets. Rolling window:
/// the window starts at the first nudge and resets once 7 full days have
/// elapsed since that instant, not at a fixed weekday boundary.
pub const NUDGE_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreakDecision {
    /// Already checked in today (or the clock moved backwards); leave the
    /// streak untouched.
    SameDay,
    /// Last check-in was exactly yesterday.
    Extend,
    /// No prior check-in, or the gap exceeds one day.
    Reset,
}

pub fn decide_check_in(last_check_in_date: Option<NaiveDate>, today: NaiveDate) -> StreakDecision {
    let Some(last) = last_check_in_date else {
        return StreakDecision::Reset;
    };

    let gap_days = (today - last).num_days();
    if gap_days <= 0 {
        StreakDecision::SameDay
    } else if gap_days == 1 {
        StreakDecision::Extend
    } else {
        StreakDecision::Reset
    }
}

pub fn nudge_window_expired(
    window_started_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> bool {
    match window_started_at {
        Some(started_at) => now - started_at >= Duration::days(NUDGE_WINDOW_DAYS),
        None => true,
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CheckInResult {
    pub streak: i32,
    pub longest_streak: i32,
    pub is_first_check_in_today: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn first_ever_check_in_resets_to_one() {
        assert_eq!(
            decide_check_in(None, date(2025, 6, 1)),
            StreakDecision::Reset
        );
    }

    #[test]
    fn same_day_check_in_is_idempotent() {
        assert_eq!(
            decide_check_in(Some(date(2025, 6, 1)), date(2025, 6, 1)),
            StreakDecision::SameDay
        );
    }

    #[test]
    fn next_day_check_in_extends() {
        assert_eq!(
            decide_check_in(Some(date(2025, 6, 1)), date(2025, 6, 2)),
            StreakDecision::Extend
        );
    }

    #[test]
    fn gap_of_three_days_resets() {
        assert_eq!(
            decide_check_in(Some(date(2025, 6, 2)), date(2025, 6, 5)),
            StreakDecision::Reset
        );
    }

    #[test]
    fn month_boundary_counts_as_one_day() {
        assert_eq!(
            decide_check_in(Some(date(2025, 5, 31)), date(2025, 6, 1)),
            StreakDecision::Extend
        );
    }

    #[test]
    fn backwards_clock_is_treated_as_same_day() {
        assert_eq!(
            decide_check_in(Some(date(2025, 6, 5)), date(2025, 6, 4)),
            StreakDecision::SameDay
        );
    }

    #[test]
    fn nudge_window_expires_after_seven_days() {
        let started_at = Utc::now();
        assert!(!nudge_window_expired(
            Some(started_at),
            started_at + Duration::days(6)
        ));
        assert!(nudge_window_expired(
            Some(started_at),
            started_at + Duration::days(7)
        ));
    }

    #[test]
    fn missing_nudge_window_counts_as_expired() {
        assert!(nudge_window_expired(None, Utc::now()));
    }
}
