use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::utils::error::GradeError;

pub type UserId = u64;
pub type SemesterId = u64;
pub type SubjectId = u64;
pub type GradeEntryId = u64;

/// One assessment result as the formula engine consumes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeEntry {
    pub id: GradeEntryId,
    pub title: String,
    pub raw_value: Decimal,
    pub weight: Decimal,
    pub recorded_date: NaiveDate,
}

impl GradeEntry {
    /// Builds an unsaved entry (id 0) from a raw value and weight.
    pub fn new(raw_value: Decimal, weight: Decimal, recorded_date: NaiveDate) -> Self {
        Self {
            id: 0,
            title: String::new(),
            raw_value,
            weight,
            recorded_date,
        }
    }
}

/// Grade data submitted for storage, before it has an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewGradeEntry {
    pub subject_id: SubjectId,
    pub title: String,
    pub raw_value: Decimal,
    pub weight: Decimal,
    pub recorded_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Semester {
    pub id: SemesterId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: SubjectId,
    pub semester_id: SemesterId,
    pub name: String,
}

/// A computed figure, or an explicit marker that there was nothing to compute from.
///
/// `NoData` is not the same as `Value(0)`: a zero bonus is a real result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<Decimal>", into = "Option<Decimal>")]
pub enum Metric {
    Value(Decimal),
    NoData,
}

impl Metric {
    pub fn value(&self) -> Option<Decimal> {
        match self {
            Metric::Value(v) => Some(*v),
            Metric::NoData => None,
        }
    }

    pub fn value_or_zero(&self) -> Decimal {
        self.value().unwrap_or(Decimal::ZERO)
    }
}

impl From<Option<Decimal>> for Metric {
    fn from(value: Option<Decimal>) -> Self {
        value.map_or(Metric::NoData, Metric::Value)
    }
}

impl From<Metric> for Option<Decimal> {
    fn from(metric: Metric) -> Self {
        metric.value()
    }
}

/// Two decimal places, half away from zero. `{:.2}` alone truncates a `Decimal`.
pub fn two_places(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    // -0.004 rounds to a negative zero
    let rounded = if rounded.is_zero() { Decimal::ZERO } else { rounded };
    format!("{:.2}", rounded)
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Value(v) => f.write_str(&two_places(*v)),
            Metric::NoData => write!(f, "-"),
        }
    }
}

/// How a subject's bonus points are derived from its entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BonusMode {
    /// Bonus points per entry, summed; weights are ignored.
    PerEntry,
    /// Bonus points of the weighted average, computed once.
    Pooled,
}

impl FromStr for BonusMode {
    type Err = GradeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "per-entry" | "per_entry" | "perentry" => Ok(BonusMode::PerEntry),
            "pooled" => Ok(BonusMode::Pooled),
            other => Err(GradeError::invalid_input(
                "mode",
                format!("unknown bonus mode '{}', expected per-entry or pooled", other),
            )),
        }
    }
}

impl fmt::Display for BonusMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BonusMode::PerEntry => write!(f, "per-entry"),
            BonusMode::Pooled => write!(f, "pooled"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectAggregate {
    pub weighted_average: Metric,
    pub bonus_points: Metric,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PassStatus {
    Passed,
    Failed,
}

impl fmt::Display for PassStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PassStatus::Passed => write!(f, "Passed"),
            PassStatus::Failed => write!(f, "Failed"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemesterAggregate {
    pub average_across_subjects: Metric,
    pub total_bonus_points: Decimal,
    pub pass_status: PassStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_metric_serializes_as_number_or_null() {
        let json = serde_json::to_string(&vec![Metric::Value(dec!(4.5)), Metric::NoData]).unwrap();
        assert_eq!(json, "[4.5,null]");
    }

    #[test]
    fn test_bonus_mode_parsing() {
        assert_eq!("per-entry".parse::<BonusMode>().unwrap(), BonusMode::PerEntry);
        assert_eq!("Pooled".parse::<BonusMode>().unwrap(), BonusMode::Pooled);
        assert!("average".parse::<BonusMode>().is_err());
    }

    #[test]
    fn test_metric_display() {
        assert_eq!(Metric::Value(dec!(5)).to_string(), "5.00");
        assert_eq!(Metric::NoData.to_string(), "-");
    }

    #[test]
    fn test_metric_display_rounds_half_away_from_zero() {
        assert_eq!(Metric::Value(dec!(5.255)).to_string(), "5.26");
        assert_eq!(Metric::Value(dec!(4.2475)).to_string(), "4.25");
        assert_eq!(Metric::Value(dec!(-2.125)).to_string(), "-2.13");
        assert_eq!(Metric::Value(dec!(-0.004)).to_string(), "0.00");
    }
}
