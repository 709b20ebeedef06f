//! Grade formula engine.
//!
//! Grades live on a 1.0 to 6.0 scale with 4.0 as the passing threshold.
//! A grade's bonus points are its distance from 4.0 after rounding to the
//! nearest half point; below the threshold the distance counts double.
//!
//! All rounding here is half away from zero. `Decimal::round` is banker's
//! rounding, so every call site names the strategy explicitly.
//!
//! Arithmetic is checked: a figure that does not fit a `Decimal` becomes an
//! error instead of a panic.

use crate::domain::model::{
    BonusMode, GradeEntry, Metric, PassStatus, SemesterAggregate, SubjectAggregate,
};
use crate::utils::error::{GradeError, Result};
use rust_decimal::{Decimal, RoundingStrategy};

pub const PASS_THRESHOLD: Decimal = Decimal::from_parts(4, 0, 0, false, 0);
pub const PENALTY_FACTOR: Decimal = Decimal::TWO;

const DISPLAY_DP: u32 = 2;

fn round_display(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DISPLAY_DP, RoundingStrategy::MidpointAwayFromZero)
}

fn checked_sum(values: impl IntoIterator<Item = Decimal>) -> Option<Decimal> {
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(v))
}

fn out_of_range(what: &str, count: usize) -> GradeError {
    GradeError::ValidationError {
        message: format!("{} over {} values exceeds the decimal range", what, count),
    }
}

/// Converts a floating point input, rejecting NaN, infinities and values
/// beyond the decimal range.
pub fn to_decimal(field: &str, value: f64) -> Result<Decimal> {
    if !value.is_finite() {
        return Err(GradeError::invalid_input(
            field,
            format!("{} is not a finite number", value),
        ));
    }

    Decimal::try_from(value)
        .map(|d| d.normalize())
        .map_err(|e| GradeError::invalid_input(field, format!("{}: {}", value, e)))
}

/// Rounds to the nearest 0.5, ties away from zero (5.25 -> 5.5, 5.24 -> 5.0).
pub fn round_to_half(value: Decimal) -> Decimal {
    let half_steps = (value.fract() * Decimal::TWO)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    // a non-zero fraction means scale > 0, which leaves room for one more unit
    value.trunc() + half_steps / Decimal::TWO
}

/// Bonus points of a single raw value.
///
/// Fails with `InvalidInput` only when the result does not fit a `Decimal`,
/// i.e. for raw values near `Decimal::MIN`.
pub fn compute_bonus_points(raw_value: Decimal) -> Result<Decimal> {
    let rounded = round_to_half(raw_value);
    let penalty_overflow = || {
        GradeError::invalid_input(
            "raw_value",
            format!("bonus points of {} exceed the decimal range", raw_value),
        )
    };

    let distance = rounded
        .checked_sub(PASS_THRESHOLD)
        .ok_or_else(penalty_overflow)?;

    if rounded >= PASS_THRESHOLD {
        Ok(distance)
    } else {
        PENALTY_FACTOR
            .checked_mul(distance)
            .ok_or_else(penalty_overflow)
    }
}

/// Float entry point for [`compute_bonus_points`]; fails with `InvalidInput`
/// on NaN, infinity or a value outside the decimal range.
pub fn compute_bonus_points_f64(raw_value: f64) -> Result<Decimal> {
    compute_bonus_points(to_decimal("raw_value", raw_value)?)
}

/// Weighted mean of the raw (unrounded) values, rounded to 2 decimal places.
pub fn compute_weighted_average(entries: &[GradeEntry]) -> Result<Metric> {
    if entries.is_empty() {
        return Ok(Metric::NoData);
    }

    let total_weight = checked_sum(entries.iter().map(|e| e.weight))
        .ok_or_else(|| out_of_range("total weight", entries.len()))?;
    if total_weight <= Decimal::ZERO {
        return Ok(Metric::NoData);
    }

    let weighted_sum = entries
        .iter()
        .try_fold(Decimal::ZERO, |acc, e| {
            e.raw_value
                .checked_mul(e.weight)
                .and_then(|product| acc.checked_add(product))
        })
        .ok_or_else(|| out_of_range("weighted sum", entries.len()))?;

    weighted_sum
        .checked_div(total_weight)
        .map(|average| Metric::Value(round_display(average)))
        .ok_or_else(|| out_of_range("weighted average", entries.len()))
}

/// Bonus points for one subject under the requested mode.
///
/// The two modes can disagree when weights are not uniform; neither is
/// treated as the correct one.
pub fn compute_subject_bonus_points(entries: &[GradeEntry], mode: BonusMode) -> Result<Metric> {
    if entries.is_empty() {
        return Ok(Metric::NoData);
    }

    match mode {
        BonusMode::PerEntry => {
            let points = entries
                .iter()
                .map(|e| compute_bonus_points(e.raw_value))
                .collect::<Result<Vec<_>>>()?;
            let total =
                checked_sum(points).ok_or_else(|| out_of_range("bonus points", entries.len()))?;
            Ok(Metric::Value(round_display(total)))
        }
        BonusMode::Pooled => match compute_weighted_average(entries)? {
            Metric::Value(average) => Ok(Metric::Value(round_display(compute_bonus_points(
                average,
            )?))),
            Metric::NoData => Ok(Metric::NoData),
        },
    }
}

pub fn compute_subject_aggregate(
    entries: &[GradeEntry],
    mode: BonusMode,
) -> Result<SubjectAggregate> {
    Ok(SubjectAggregate {
        weighted_average: compute_weighted_average(entries)?,
        bonus_points: compute_subject_bonus_points(entries, mode)?,
    })
}

pub fn pass_status_for(total_bonus_points: Decimal) -> PassStatus {
    if total_bonus_points >= Decimal::ZERO {
        PassStatus::Passed
    } else {
        PassStatus::Failed
    }
}

/// Rolls subject figures up into a semester result.
///
/// Subjects without data add nothing to the bonus total and are left out
/// of the average's denominator.
pub fn compute_semester_aggregate(subjects: &[SubjectAggregate]) -> Result<SemesterAggregate> {
    let total_bonus_points = checked_sum(subjects.iter().map(|s| s.bonus_points.value_or_zero()))
        .map(round_display)
        .ok_or_else(|| out_of_range("semester bonus points", subjects.len()))?;

    let averages: Vec<Decimal> = subjects
        .iter()
        .filter_map(|s| s.weighted_average.value())
        .collect();

    let average_across_subjects = if averages.is_empty() {
        Metric::NoData
    } else {
        let count = averages.len();
        checked_sum(averages)
            .and_then(|sum| sum.checked_div(Decimal::from(count)))
            .map(|mean| Metric::Value(round_display(mean)))
            .ok_or_else(|| out_of_range("semester average", count))?
    };

    Ok(SemesterAggregate {
        average_across_subjects,
        total_bonus_points,
        pass_status: pass_status_for(total_bonus_points),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn entry(raw_value: Decimal, weight: Decimal) -> GradeEntry {
        GradeEntry::new(
            raw_value,
            weight,
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        )
    }

    fn subject(average: Metric, bonus: Metric) -> SubjectAggregate {
        SubjectAggregate {
            weighted_average: average,
            bonus_points: bonus,
        }
    }

    fn bonus(raw_value: Decimal) -> Decimal {
        compute_bonus_points(raw_value).unwrap()
    }

    #[test]
    fn test_bonus_points_anchor_values() {
        assert_eq!(bonus(dec!(4.0)), dec!(0));
        assert_eq!(bonus(dec!(6.0)), dec!(2));
        assert_eq!(bonus(dec!(1.0)), dec!(-6));
    }

    #[test]
    fn test_bonus_points_round_to_half_first() {
        assert_eq!(bonus(dec!(5.24)), dec!(1.0));
        assert_eq!(bonus(dec!(5.26)), dec!(1.5));
        assert_eq!(bonus(dec!(3.9)), dec!(0));
    }

    #[test]
    fn test_half_point_ties_round_away_from_zero() {
        assert_eq!(round_to_half(dec!(4.25)), dec!(4.5));
        assert_eq!(round_to_half(dec!(4.75)), dec!(5.0));
        assert_eq!(round_to_half(dec!(3.25)), dec!(3.5));
        assert_eq!(round_to_half(dec!(-3.25)), dec!(-3.5));
        assert_eq!(round_to_half(dec!(5)), dec!(5));
        assert_eq!(bonus(dec!(4.25)), dec!(0.5));
        assert_eq!(bonus(dec!(3.25)), dec!(-1.0));
    }

    #[test]
    fn test_penalty_is_double_below_threshold() {
        let mut distance = dec!(0.5);
        while distance <= dec!(3.0) {
            let above = bonus(PASS_THRESHOLD + distance);
            let below = bonus(PASS_THRESHOLD - distance);
            assert_eq!(above, distance);
            assert!(below < Decimal::ZERO);
            assert_eq!(below.abs(), dec!(2) * above, "distance {}", distance);
            distance += dec!(0.5);
        }
    }

    #[test]
    fn test_bonus_points_rejects_non_finite_floats() {
        assert!(matches!(
            compute_bonus_points_f64(f64::NAN),
            Err(GradeError::InvalidInput { .. })
        ));
        assert!(compute_bonus_points_f64(f64::INFINITY).is_err());
        assert_eq!(compute_bonus_points_f64(5.26).unwrap(), dec!(1.5));
    }

    #[test]
    fn test_huge_floats_do_not_panic() {
        // above the threshold nothing is doubled, so the distance still fits
        let high = compute_bonus_points_f64(5e28).unwrap();
        assert!(high > Decimal::from(u64::MAX));

        assert!(matches!(
            compute_bonus_points_f64(-5e28),
            Err(GradeError::InvalidInput { .. })
        ));
        assert!(matches!(
            compute_bonus_points_f64(1e29),
            Err(GradeError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_bonus_points_at_decimal_limits() {
        assert_eq!(round_to_half(Decimal::MAX), Decimal::MAX);
        assert_eq!(
            compute_bonus_points(Decimal::MAX).unwrap(),
            Decimal::MAX - PASS_THRESHOLD
        );
        assert!(matches!(
            compute_bonus_points(Decimal::MIN),
            Err(GradeError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_weighted_average_no_data() {
        assert_eq!(compute_weighted_average(&[]).unwrap(), Metric::NoData);
        assert_eq!(
            compute_weighted_average(&[entry(dec!(5.0), dec!(0))]).unwrap(),
            Metric::NoData
        );
    }

    #[test]
    fn test_weighted_average_values() {
        assert_eq!(
            compute_weighted_average(&[entry(dec!(4.0), dec!(1)), entry(dec!(6.0), dec!(1))])
                .unwrap(),
            Metric::Value(dec!(5.0))
        );
        assert_eq!(
            compute_weighted_average(&[entry(dec!(6.0), dec!(1)), entry(dec!(2.0), dec!(3))])
                .unwrap(),
            Metric::Value(dec!(3.0))
        );
        assert_eq!(
            compute_weighted_average(&[
                entry(dec!(4.0), dec!(1)),
                entry(dec!(4.0), dec!(1)),
                entry(dec!(5.0), dec!(1)),
            ])
            .unwrap(),
            Metric::Value(dec!(4.33))
        );
    }

    #[test]
    fn test_weighted_average_uses_unrounded_values() {
        // 5.24 and 5.26 would round to 5.0 and 5.5 individually
        assert_eq!(
            compute_weighted_average(&[entry(dec!(5.24), dec!(1)), entry(dec!(5.26), dec!(1))])
                .unwrap(),
            Metric::Value(dec!(5.25))
        );
        // 4.005 is a two-decimal midpoint
        assert_eq!(
            compute_weighted_average(&[entry(dec!(4.00), dec!(1)), entry(dec!(4.01), dec!(1))])
                .unwrap(),
            Metric::Value(dec!(4.01))
        );
    }

    #[test]
    fn test_weighted_average_reports_overflow() {
        let product = compute_weighted_average(&[entry(Decimal::MAX, dec!(2))]);
        assert!(matches!(product, Err(GradeError::ValidationError { .. })));

        let weights =
            compute_weighted_average(&[entry(dec!(4), Decimal::MAX), entry(dec!(4), Decimal::MAX)]);
        assert!(matches!(weights, Err(GradeError::ValidationError { .. })));

        let pooled = compute_subject_bonus_points(&[entry(Decimal::MAX, dec!(2))], BonusMode::Pooled);
        assert!(pooled.is_err());
    }

    #[test]
    fn test_per_entry_sum_reports_overflow() {
        let entries = [entry(Decimal::MAX, dec!(1)), entry(Decimal::MAX, dec!(1))];
        assert!(matches!(
            compute_subject_bonus_points(&entries, BonusMode::PerEntry),
            Err(GradeError::ValidationError { .. })
        ));
    }

    #[test]
    fn test_modes_coincide_on_some_weights() {
        let entries = [entry(dec!(6.0), dec!(1)), entry(dec!(2.0), dec!(3))];
        assert_eq!(
            compute_subject_bonus_points(&entries, BonusMode::PerEntry).unwrap(),
            Metric::Value(dec!(-2.0))
        );
        assert_eq!(
            compute_subject_bonus_points(&entries, BonusMode::Pooled).unwrap(),
            Metric::Value(dec!(-2.0))
        );
    }

    #[test]
    fn test_modes_diverge_on_uneven_weights() {
        let entries = [entry(dec!(5.0), dec!(1)), entry(dec!(3.0), dec!(9))];

        let per_entry = compute_subject_bonus_points(&entries, BonusMode::PerEntry).unwrap();
        let pooled = compute_subject_bonus_points(&entries, BonusMode::Pooled).unwrap();

        assert_eq!(per_entry, Metric::Value(dec!(-1.0)));
        // pooled average 3.2 rounds to 3.0
        assert_eq!(pooled, Metric::Value(dec!(-2.0)));
        assert_ne!(per_entry, pooled);
    }

    #[test]
    fn test_subject_bonus_without_entries_is_no_data() {
        assert_eq!(
            compute_subject_bonus_points(&[], BonusMode::PerEntry).unwrap(),
            Metric::NoData
        );
        assert_eq!(
            compute_subject_bonus_points(&[], BonusMode::Pooled).unwrap(),
            Metric::NoData
        );
    }

    #[test]
    fn test_subject_aggregate_pairs_average_and_bonus() {
        let entries = [entry(dec!(4.5), dec!(2)), entry(dec!(5.5), dec!(1))];
        let aggregate = compute_subject_aggregate(&entries, BonusMode::PerEntry).unwrap();

        assert_eq!(aggregate.weighted_average, Metric::Value(dec!(4.83)));
        assert_eq!(aggregate.bonus_points, Metric::Value(dec!(2.0)));
    }

    #[test]
    fn test_semester_aggregate_passes_on_positive_total() {
        let subjects = [
            subject(Metric::Value(dec!(5.0)), Metric::Value(dec!(2.0))),
            subject(Metric::Value(dec!(3.5)), Metric::Value(dec!(-1.0))),
            subject(Metric::Value(dec!(4.0)), Metric::Value(dec!(0.0))),
        ];
        let aggregate = compute_semester_aggregate(&subjects).unwrap();

        assert_eq!(aggregate.total_bonus_points, dec!(1.0));
        assert_eq!(aggregate.pass_status, PassStatus::Passed);
        assert_eq!(aggregate.average_across_subjects, Metric::Value(dec!(4.17)));
    }

    #[test]
    fn test_semester_aggregate_fails_on_negative_total() {
        let aggregate = compute_semester_aggregate(&[subject(
            Metric::Value(dec!(3.8)),
            Metric::Value(dec!(-0.5)),
        )])
        .unwrap();
        assert_eq!(aggregate.pass_status, PassStatus::Failed);
    }

    #[test]
    fn test_semester_aggregate_zero_total_passes() {
        assert_eq!(pass_status_for(Decimal::ZERO), PassStatus::Passed);
    }

    #[test]
    fn test_semester_aggregate_skips_no_data_subjects() {
        let aggregate = compute_semester_aggregate(&[
            subject(Metric::NoData, Metric::NoData),
            subject(Metric::Value(dec!(4.5)), Metric::Value(dec!(0.5))),
        ])
        .unwrap();
        assert_eq!(aggregate.total_bonus_points, dec!(0.5));
        assert_eq!(aggregate.average_across_subjects, Metric::Value(dec!(4.5)));

        let empty = compute_semester_aggregate(&[subject(Metric::NoData, Metric::NoData)]).unwrap();
        assert_eq!(empty.average_across_subjects, Metric::NoData);
        assert_eq!(empty.total_bonus_points, Decimal::ZERO);
        assert_eq!(empty.pass_status, PassStatus::Passed);
    }

    #[test]
    fn test_semester_aggregate_reports_overflow() {
        let huge = subject(Metric::Value(Decimal::MAX), Metric::Value(Decimal::MAX));
        assert!(matches!(
            compute_semester_aggregate(&[huge, huge]),
            Err(GradeError::ValidationError { .. })
        ));
    }
}
