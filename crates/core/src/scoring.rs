//! Percentage arithmetic for quiz scores and in-session progress.

/// Percentage of correct answers, floored to a whole percent.
///
/// Returns 0 when `total` is 0. A `correct` count above `total` clamps to
/// 100 rather than reporting an impossible score.
#[must_use]
pub fn percentage_score(correct: u32, total: u32) -> u8 {
    ratio_percent(correct, total)
}

/// Percentage of the quiz walked through so far, floored to a whole percent.
///
/// `current` is the 1-indexed position of the question being shown.
#[must_use]
pub fn quiz_progress(current: u32, total: u32) -> u8 {
    ratio_percent(current, total)
}

fn ratio_percent(part: u32, whole: u32) -> u8 {
    if whole == 0 {
        return 0;
    }
    let percent = u64::from(part) * 100 / u64::from(whole);

    // The division caps at 100 for part <= whole; the min() covers callers
    // that hand in a larger numerator.
    u8::try_from(percent.min(100)).unwrap_or(100)
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_on_empty_quiz_is_zero() {
        assert_eq!(percentage_score(0, 0), 0);
    }

    #[test]
    fn score_floors_to_whole_percent() {
        assert_eq!(percentage_score(3, 4), 75);
        assert_eq!(percentage_score(2, 3), 66);
        assert_eq!(percentage_score(1, 8), 12);
    }

    #[test]
    fn perfect_score_is_one_hundred() {
        assert_eq!(percentage_score(4, 4), 100);
    }

    #[test]
    fn score_clamps_when_correct_exceeds_total() {
        assert_eq!(percentage_score(7, 4), 100);
    }

    #[test]
    fn progress_on_empty_quiz_is_zero() {
        assert_eq!(quiz_progress(0, 0), 0);
        assert_eq!(quiz_progress(3, 0), 0);
    }

    #[test]
    fn progress_tracks_position() {
        assert_eq!(quiz_progress(1, 4), 25);
        assert_eq!(quiz_progress(4, 4), 100);
    }

    #[test]
    fn large_counts_do_not_overflow() {
        assert_eq!(percentage_score(u32::MAX, u32::MAX), 100);
        assert_eq!(percentage_score(u32::MAX / 2, u32::MAX), 49);
    }
}
