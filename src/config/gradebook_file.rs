use crate::core::formula::to_decimal;
use crate::domain::model::{BonusMode, NewGradeEntry, UserId};
use crate::domain::ports::GradeRepository;
use crate::utils::error::{GradeError, Result};
use crate::utils::validation::{
    parse_date, validate_grade_entry, validate_non_empty_string, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_OWNER: UserId = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradebookFile {
    pub gradebook: Option<GradebookSettings>,
    #[serde(default)]
    pub semesters: Vec<SemesterSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradebookSettings {
    pub owner_id: Option<UserId>,
    pub default_mode: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SemesterSection {
    pub name: String,
    #[serde(default)]
    pub subjects: Vec<SubjectSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubjectSection {
    pub name: String,
    #[serde(default)]
    pub grades: Vec<GradeSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeSection {
    pub title: String,
    pub value: f64,
    pub weight: Option<f64>,
    pub date: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadSummary {
    pub semesters: usize,
    pub subjects: usize,
    pub grades: usize,
}

/// Path of a grade inside the file, used as the prefix of field errors.
fn grade_field(semester: usize, subject: usize, grade: usize) -> String {
    format!(
        "semesters[{}].subjects[{}].grades[{}]",
        semester, subject, grade
    )
}

impl GradeSection {
    fn to_new_entry(&self, subject_id: u64, field: &str) -> Result<NewGradeEntry> {
        Ok(NewGradeEntry {
            subject_id,
            title: self.title.clone(),
            raw_value: to_decimal(&format!("{}.value", field), self.value)?,
            weight: to_decimal(&format!("{}.weight", field), self.weight.unwrap_or(1.0))?,
            recorded_date: parse_date(&format!("{}.date", field), &self.date)?,
        })
    }
}

impl GradebookFile {
    /// Loads a gradebook from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(GradeError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// Parses a gradebook from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| GradeError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR_NAME}` with the environment value; unknown names are left as written
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| GradeError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn owner_id(&self) -> UserId {
        self.gradebook
            .as_ref()
            .and_then(|g| g.owner_id)
            .unwrap_or(DEFAULT_OWNER)
    }

    /// Bonus mode named in the file, per-entry when absent
    pub fn default_mode(&self) -> Result<BonusMode> {
        match self.gradebook.as_ref().and_then(|g| g.default_mode.as_deref()) {
            Some(mode) => mode.parse().map_err(|_| GradeError::InvalidConfigValueError {
                field: "gradebook.default_mode".to_string(),
                value: mode.to_string(),
                reason: "Expected per-entry or pooled".to_string(),
            }),
            None => Ok(BonusMode::PerEntry),
        }
    }

    pub fn validate_config(&self) -> Result<()> {
        self.default_mode()?;

        for (s, semester) in self.semesters.iter().enumerate() {
            let semester_field = format!("semesters[{}]", s);
            validate_non_empty_string(&format!("{}.name", semester_field), &semester.name)?;

            for (j, subject) in semester.subjects.iter().enumerate() {
                let subject_field = format!("{}.subjects[{}]", semester_field, j);
                validate_non_empty_string(&format!("{}.name", subject_field), &subject.name)?;

                for (g, grade) in subject.grades.iter().enumerate() {
                    let grade_field = grade_field(s, j, g);
                    let entry = grade.to_new_entry(0, &grade_field)?;
                    validate_grade_entry(&entry).map_err(|e| match e {
                        GradeError::InvalidInput { field, reason } => GradeError::InvalidInput {
                            field: format!("{}.{}", grade_field, field),
                            reason,
                        },
                        other => other,
                    })?;
                }
            }
        }

        Ok(())
    }

    /// Writes every semester, subject and grade into the repository for `owner`.
    pub async fn load_into<R: GradeRepository + ?Sized>(
        &self,
        repository: &R,
        owner: UserId,
    ) -> Result<LoadSummary> {
        self.validate_config()?;

        let mut summary = LoadSummary {
            semesters: 0,
            subjects: 0,
            grades: 0,
        };

        for (s, semester) in self.semesters.iter().enumerate() {
            let semester_id = repository.create_semester(owner, &semester.name).await?;
            summary.semesters += 1;

            for (j, subject) in semester.subjects.iter().enumerate() {
                let subject_id = repository
                    .create_subject(owner, semester_id, &subject.name)
                    .await?;
                summary.subjects += 1;

                for (g, grade) in subject.grades.iter().enumerate() {
                    let entry = grade.to_new_entry(subject_id, &grade_field(s, j, g))?;
                    repository.insert_grade_entry(owner, entry).await?;
                    summary.grades += 1;
                }
            }
        }

        tracing::debug!(
            "Loaded {} semesters, {} subjects, {} grades",
            summary.semesters,
            summary.subjects,
            summary.grades
        );
        Ok(summary)
    }
}

impl Validate for GradebookFile {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
