use crate::domain::model::NewGradeEntry;
use crate::utils::error::{GradeError, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;

pub const MIN_GRADE: Decimal = Decimal::ONE;
pub const MAX_GRADE: Decimal = Decimal::from_parts(6, 0, 0, false, 0);

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(GradeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(GradeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| GradeError::MissingConfigError {
        field: field_name.to_string(),
    })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(GradeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(GradeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

pub fn validate_positive(field_name: &str, value: Decimal) -> Result<()> {
    if value <= Decimal::ZERO {
        return Err(GradeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value must be greater than zero".to_string(),
        });
    }
    Ok(())
}

pub fn parse_date(field_name: &str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|e| {
        GradeError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Expected a YYYY-MM-DD date: {}", e),
        }
    })
}

/// Checks a grade before it is stored: value on the 1.0 to 6.0 scale,
/// positive weight, non-empty title.
pub fn validate_grade_entry(entry: &NewGradeEntry) -> Result<()> {
    let to_invalid_input = |e: GradeError| match e {
        GradeError::InvalidConfigValueError { field, reason, .. } => {
            GradeError::InvalidInput { field, reason }
        }
        other => other,
    };

    validate_non_empty_string("title", &entry.title).map_err(to_invalid_input)?;
    validate_range("raw_value", entry.raw_value, MIN_GRADE, MAX_GRADE).map_err(to_invalid_input)?;
    validate_positive("weight", entry.weight).map_err(to_invalid_input)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn grade(raw_value: Decimal, weight: Decimal) -> NewGradeEntry {
        NewGradeEntry {
            subject_id: 1,
            title: "Prüfung 1".to_string(),
            raw_value,
            weight,
            recorded_date: NaiveDate::from_ymd_opt(2024, 9, 12).unwrap(),
        }
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("raw_value", dec!(4.5), MIN_GRADE, MAX_GRADE).is_ok());
        assert!(validate_range("raw_value", dec!(6.0), MIN_GRADE, MAX_GRADE).is_ok());
        assert!(validate_range("raw_value", dec!(0.9), MIN_GRADE, MAX_GRADE).is_err());
        assert!(validate_range("raw_value", dec!(6.1), MIN_GRADE, MAX_GRADE).is_err());
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("date", "2024-02-29").unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
        assert!(parse_date("date", "29.02.2024").is_err());
        assert!(parse_date("date", "2023-02-29").is_err());
    }

    #[test]
    fn test_validate_grade_entry() {
        assert!(validate_grade_entry(&grade(dec!(5.5), dec!(1))).is_ok());
        assert!(matches!(
            validate_grade_entry(&grade(dec!(7.0), dec!(1))),
            Err(GradeError::InvalidInput { ref field, .. }) if field == "raw_value"
        ));
        assert!(matches!(
            validate_grade_entry(&grade(dec!(5.0), dec!(0))),
            Err(GradeError::InvalidInput { ref field, .. }) if field == "weight"
        ));

        let mut untitled = grade(dec!(5.0), dec!(1));
        untitled.title = "  ".to_string();
        assert!(validate_grade_entry(&untitled).is_err());
    }

    #[test]
    fn test_validate_path() {
        assert!(validate_path("output", "./report.csv").is_ok());
        assert!(validate_path("output", "").is_err());
    }
}
