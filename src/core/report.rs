use crate::core::formula;
use crate::domain::model::{
    BonusMode, GradeEntry, GradeEntryId, Metric, NewGradeEntry, Semester, SemesterAggregate,
    Subject, SubjectAggregate, SubjectId, UserId,
};
use crate::domain::ports::{GradeRepository, SessionGate};
use crate::utils::error::Result;
use crate::utils::validation::validate_grade_entry;
use rust_decimal::Decimal;
use serde::Serialize;

/// One line of the subject overview.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverviewRow {
    pub subject_id: SubjectId,
    pub semester: String,
    pub subject: String,
    pub weighted_average: Metric,
    pub bonus_points: Metric,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredEntry {
    #[serde(flatten)]
    pub entry: GradeEntry,
    pub rounded_value: Decimal,
    pub bonus_points: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectReport {
    pub subject: Subject,
    pub mode: BonusMode,
    pub entries: Vec<ScoredEntry>,
    pub aggregate: SubjectAggregate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SemesterReport {
    pub semester: Semester,
    pub mode: BonusMode,
    pub subjects: Vec<OverviewRow>,
    pub aggregate: SemesterAggregate,
}

/// Read and write operations of the gradebook, gated by the session.
///
/// Nothing is cached: every report fetches fresh rows and recomputes.
pub struct GradeReporter<R: GradeRepository> {
    repository: R,
}

impl<R: GradeRepository> GradeReporter<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Every subject of the signed-in user, ordered by semester then name.
    pub async fn overview(
        &self,
        session: &dyn SessionGate,
        mode: BonusMode,
    ) -> Result<Vec<OverviewRow>> {
        let owner = session.require_identity()?;
        let mut rows = Vec::new();

        for semester in self.repository.fetch_semesters(owner).await? {
            rows.extend(self.semester_rows(owner, &semester, mode).await?);
        }

        tracing::debug!("Overview for user {} has {} subjects", owner, rows.len());
        Ok(rows)
    }

    pub async fn subject_report(
        &self,
        session: &dyn SessionGate,
        subject_id: SubjectId,
        mode: BonusMode,
    ) -> Result<SubjectReport> {
        let owner = session.require_identity()?;
        let subject = self.repository.fetch_subject(owner, subject_id).await?;
        let entries = self
            .repository
            .fetch_grade_entries(owner, subject_id)
            .await?;

        let aggregate = formula::compute_subject_aggregate(&entries, mode)?;
        let entries = entries
            .into_iter()
            .map(|entry| -> Result<ScoredEntry> {
                Ok(ScoredEntry {
                    rounded_value: formula::round_to_half(entry.raw_value),
                    bonus_points: formula::compute_bonus_points(entry.raw_value)?,
                    entry,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(SubjectReport {
            subject,
            mode,
            entries,
            aggregate,
        })
    }

    pub async fn semester_reports(
        &self,
        session: &dyn SessionGate,
        mode: BonusMode,
    ) -> Result<Vec<SemesterReport>> {
        let owner = session.require_identity()?;
        let mut reports = Vec::new();

        for semester in self.repository.fetch_semesters(owner).await? {
            let subjects = self.semester_rows(owner, &semester, mode).await?;
            let aggregates: Vec<SubjectAggregate> = subjects
                .iter()
                .map(|row| SubjectAggregate {
                    weighted_average: row.weighted_average,
                    bonus_points: row.bonus_points,
                })
                .collect();
            let aggregate = formula::compute_semester_aggregate(&aggregates)?;

            tracing::debug!(
                "Semester '{}': {} bonus points, {}",
                semester.name,
                aggregate.total_bonus_points,
                aggregate.pass_status
            );

            reports.push(SemesterReport {
                semester,
                mode,
                subjects,
                aggregate,
            });
        }

        Ok(reports)
    }

    pub async fn record_grade(
        &self,
        session: &dyn SessionGate,
        entry: NewGradeEntry,
    ) -> Result<GradeEntryId> {
        let owner = session.require_identity()?;
        validate_grade_entry(&entry)?;

        let subject_id = entry.subject_id;
        let id = self.repository.insert_grade_entry(owner, entry).await?;
        tracing::info!("📝 Recorded grade {} in subject {}", id, subject_id);
        Ok(id)
    }

    pub async fn remove_grade(&self, session: &dyn SessionGate, id: GradeEntryId) -> Result<()> {
        let owner = session.require_identity()?;
        self.repository.delete_grade_entry(owner, id).await?;
        tracing::info!("🗑️ Removed grade {}", id);
        Ok(())
    }

    async fn semester_rows(
        &self,
        owner: UserId,
        semester: &Semester,
        mode: BonusMode,
    ) -> Result<Vec<OverviewRow>> {
        let mut rows = Vec::new();

        for subject in self.repository.fetch_subjects(owner, semester.id).await? {
            let entries = self
                .repository
                .fetch_grade_entries(owner, subject.id)
                .await?;
            let aggregate = formula::compute_subject_aggregate(&entries, mode)?;

            rows.push(OverviewRow {
                subject_id: subject.id,
                semester: semester.name.clone(),
                subject: subject.name,
                weighted_average: aggregate.weighted_average,
                bonus_points: aggregate.bonus_points,
            });
        }

        Ok(rows)
    }
}
