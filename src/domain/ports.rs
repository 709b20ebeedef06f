use crate::domain::model::{
    GradeEntry, GradeEntryId, NewGradeEntry, Semester, SemesterId, Subject, SubjectId, UserId,
};
use crate::utils::error::{GradeError, Result};
use async_trait::async_trait;

/// Owner-scoped access to stored semesters, subjects and grades.
///
/// Every call takes the owning user; rows belonging to anyone else are
/// invisible and reported as `NotFound`.
#[async_trait]
pub trait GradeRepository: Send + Sync {
    async fn fetch_semesters(&self, owner: UserId) -> Result<Vec<Semester>>;

    async fn fetch_subjects(&self, owner: UserId, semester_id: SemesterId) -> Result<Vec<Subject>>;

    async fn fetch_subject(&self, owner: UserId, subject_id: SubjectId) -> Result<Subject>;

    /// Entries ordered by recorded date, then by id.
    async fn fetch_grade_entries(
        &self,
        owner: UserId,
        subject_id: SubjectId,
    ) -> Result<Vec<GradeEntry>>;

    async fn insert_grade_entry(&self, owner: UserId, entry: NewGradeEntry)
        -> Result<GradeEntryId>;

    async fn delete_grade_entry(&self, owner: UserId, id: GradeEntryId) -> Result<()>;

    async fn create_semester(&self, owner: UserId, name: &str) -> Result<SemesterId>;

    async fn create_subject(
        &self,
        owner: UserId,
        semester_id: SemesterId,
        name: &str,
    ) -> Result<SubjectId>;
}

pub trait SessionGate: Send + Sync {
    fn current_identity(&self) -> Option<UserId>;

    fn is_authenticated(&self) -> bool {
        self.current_identity().is_some()
    }

    fn require_identity(&self) -> Result<UserId> {
        self.current_identity().ok_or(GradeError::Unauthorized)
    }
}
