use chrono::{DateTime, Duration, Utc};

/// Lowest review grade that affects scheduling.
pub const MIN_GRADE: i32 = 1;
/// Highest review grade that affects scheduling.
pub const MAX_GRADE: i32 = 7;

/// Interval cycle applied to freshly generated batches, in days.
const STAGGER_PERIOD: i64 = 3;

/// Naive spaced-repetition policy: the clamped grade is the next interval in
/// days. Stands in for a real SM-2/FSRS implementation; callers only depend
/// on the two methods below, so the policy can be swapped without touching
/// them.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReviewScheduler;

impl ReviewScheduler {
    pub fn new() -> Self {
        ReviewScheduler
    }

    /// Next due timestamp after a review graded `grade` at `now`.
    ///
    /// Total over all integer grades: values outside [1, 7] are clamped.
    pub fn next_due_at(&self, grade: i32, now: DateTime<Utc>) -> DateTime<Utc> {
        let days = grade.clamp(MIN_GRADE, MAX_GRADE);
        now + Duration::days(i64::from(days))
    }

    /// Initial due timestamp for the card at 0-based `index` in a generated
    /// batch: intervals cycle 1, 2, 3 days so a batch never comes due all at
    /// once.
    pub fn initial_due_at(&self, index: usize, now: DateTime<Utc>) -> DateTime<Utc> {
        let days = (index as i64 % STAGGER_PERIOD) + 1;
        now + Duration::days(days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_next_due_within_range() {
        let scheduler = ReviewScheduler::new();
        let now = fixed_now();
        for grade in 1..=7 {
            assert_eq!(
                scheduler.next_due_at(grade, now),
                now + Duration::days(grade as i64)
            );
        }
    }

    #[test]
    fn test_next_due_clamps_low_grades() {
        let scheduler = ReviewScheduler::new();
        let now = fixed_now();
        assert_eq!(scheduler.next_due_at(0, now), scheduler.next_due_at(1, now));
        assert_eq!(scheduler.next_due_at(-3, now), now + Duration::days(1));
        assert_eq!(scheduler.next_due_at(i32::MIN, now), now + Duration::days(1));
    }

    #[test]
    fn test_next_due_clamps_high_grades() {
        let scheduler = ReviewScheduler::new();
        let now = fixed_now();
        assert_eq!(scheduler.next_due_at(99, now), scheduler.next_due_at(7, now));
        assert_eq!(scheduler.next_due_at(10, now), now + Duration::days(7));
        assert_eq!(scheduler.next_due_at(i32::MAX, now), now + Duration::days(7));
    }

    #[test]
    fn test_next_due_never_before_now() {
        let scheduler = ReviewScheduler::new();
        let now = fixed_now();
        for grade in [-100, -1, 0, 1, 4, 7, 8, 1000] {
            assert!(scheduler.next_due_at(grade, now) >= now);
        }
    }

    #[test]
    fn test_initial_due_cycles_with_period_three() {
        let scheduler = ReviewScheduler::new();
        let now = fixed_now();
        assert_eq!(scheduler.initial_due_at(0, now), now + Duration::days(1));
        assert_eq!(scheduler.initial_due_at(1, now), now + Duration::days(2));
        assert_eq!(scheduler.initial_due_at(2, now), now + Duration::days(3));
        assert_eq!(scheduler.initial_due_at(3, now), scheduler.initial_due_at(0, now));
        assert_eq!(scheduler.initial_due_at(7, now), scheduler.initial_due_at(1, now));
    }
}
