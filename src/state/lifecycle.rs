//! Pure classification of a question's lifecycle from its publish date.

use time::Date;

/// Number of whole civil days a question stays answerable after publication.
/// Once this window closes the aggregated results become visible.
pub const VOTING_WINDOW_DAYS: i64 = 1;

/// Lifecycle phase of a question, derived from dates and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionPhase {
    /// Published today (or in the future): votes are accepted.
    Answerable,
    /// Voting window closed but results are not yet visible. With the current
    /// one-day horizon this phase is only reachable if the results horizon is
    /// ever moved past the voting window.
    LockedPending,
    /// Results are visible; votes are rejected.
    ResultsAvailable,
}

/// Outcome of classifying one question against one "today" snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    /// Derived lifecycle phase.
    pub phase: QuestionPhase,
    /// Whether a vote submitted right now would be accepted.
    pub can_answer: bool,
    /// Whether aggregated results may be shown.
    pub can_view_results: bool,
    /// Whole civil days elapsed since publication (negative for future dates).
    pub days_since_publication: i64,
    /// Whole civil days until results unlock (0 once unlocked).
    pub days_until_results: i64,
}

/// Classify a question by its publish date and the current civil date.
///
/// Pure function of the two dates; callers must re-derive it for every
/// request because the phase flips silently at the midnight boundary of the
/// reference timezone.
pub fn classify(published_at: Date, today: Date) -> Classification {
    let days_since = (today - published_at).whole_days();
    let can_answer = days_since < VOTING_WINDOW_DAYS;
    let can_view_results = days_since >= VOTING_WINDOW_DAYS;

    let phase = if can_answer {
        QuestionPhase::Answerable
    } else if !can_view_results {
        QuestionPhase::LockedPending
    } else {
        QuestionPhase::ResultsAvailable
    };

    Classification {
        phase,
        can_answer,
        can_view_results,
        days_since_publication: days_since,
        days_until_results: (VOTING_WINDOW_DAYS - days_since).max(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::{Duration, macros::date};

    const PUBLISHED: Date = date!(2026 - 03 - 10);

    fn at_age(days: i64) -> Classification {
        classify(PUBLISHED, PUBLISHED + Duration::days(days))
    }

    #[test]
    fn answerable_on_publication_day() {
        let c = at_age(0);
        assert_eq!(c.phase, QuestionPhase::Answerable);
        assert!(c.can_answer);
        assert!(!c.can_view_results);
        assert_eq!(c.days_since_publication, 0);
        assert_eq!(c.days_until_results, 1);
    }

    #[test]
    fn results_available_the_day_after() {
        let c = at_age(1);
        assert_eq!(c.phase, QuestionPhase::ResultsAvailable);
        assert!(!c.can_answer);
        assert!(c.can_view_results);
        assert_eq!(c.days_until_results, 0);
    }

    #[test]
    fn future_dated_question_is_still_answerable() {
        let c = at_age(-1);
        assert_eq!(c.phase, QuestionPhase::Answerable);
        assert!(c.can_answer);
        assert!(!c.can_view_results);
        assert_eq!(c.days_since_publication, -1);
        assert_eq!(c.days_until_results, 2);
    }

    #[test]
    fn answer_and_results_flags_are_complementary_over_a_wide_range() {
        for age in -5..=10 {
            let c = at_age(age);
            assert_eq!(c.can_answer, age < 1, "age {age}");
            assert_eq!(c.can_view_results, !c.can_answer, "age {age}");
            assert_eq!(c.days_until_results, (1 - age).max(0), "age {age}");
        }
    }

    #[test]
    fn phases_never_regress_as_time_advances() {
        let mut previous = at_age(-5).phase;
        for age in -4..=10 {
            let current = at_age(age).phase;
            let rank = |phase: QuestionPhase| match phase {
                QuestionPhase::Answerable => 0,
                QuestionPhase::LockedPending => 1,
                QuestionPhase::ResultsAvailable => 2,
            };
            assert!(rank(current) >= rank(previous), "regressed at age {age}");
            previous = current;
        }
    }
}
