//! Derived course and enrollment figures.

/// Mean rating rounded to one decimal place, 0 when there are no ratings.
pub fn average_rating(ratings: &[i32]) -> f64 {
    if ratings.is_empty() {
        return 0.0;
    }
    let sum: i64 = ratings.iter().map(|r| *r as i64).sum();
    let mean = sum as f64 / ratings.len() as f64;
    (mean * 10.0).round() / 10.0
}

/// Total minutes across lessons; lessons without a duration count as 0.
pub fn total_duration<I>(durations: I) -> i64
where
    I: IntoIterator<Item = Option<i32>>,
{
    durations.into_iter().map(|d| d.unwrap_or(0) as i64).sum()
}

/// Whole-number completion percentage in 0..=100.
pub fn progress_percentage(completed: i64, total: i64) -> i32 {
    if total <= 0 {
        return 0;
    }
    let pct = (completed.max(0) as f64 / total as f64 * 100.0).round();
    pct.min(100.0) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn average_rating_rounds_to_one_decimal() {
        assert_eq!(average_rating(&[]), 0.0);
        assert_eq!(average_rating(&[5]), 5.0);
        assert_eq!(average_rating(&[4, 5]), 4.5);
        assert_eq!(average_rating(&[5, 4, 4]), 4.3);
        assert_eq!(average_rating(&[1, 2, 2]), 1.7);
    }

    #[test]
    fn total_duration_skips_missing() {
        assert_eq!(total_duration(vec![Some(10), None, Some(25)]), 35);
        assert_eq!(total_duration(Vec::<Option<i32>>::new()), 0);
    }

    #[test]
    fn progress_percentage_edges() {
        assert_eq!(progress_percentage(0, 0), 0);
        assert_eq!(progress_percentage(3, 0), 0);
        assert_eq!(progress_percentage(1, 3), 33);
        assert_eq!(progress_percentage(2, 3), 67);
        assert_eq!(progress_percentage(3, 3), 100);
        assert_eq!(progress_percentage(4, 3), 100);
    }
}
