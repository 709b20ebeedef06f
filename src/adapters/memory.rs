use crate::domain::model::{
    GradeEntry, GradeEntryId, NewGradeEntry, Semester, SemesterId, Subject, SubjectId, UserId,
};
use crate::domain::ports::GradeRepository;
use crate::utils::error::{GradeError, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct SemesterRow {
    owner: UserId,
    name: String,
}

#[derive(Debug, Clone)]
struct SubjectRow {
    owner: UserId,
    semester_id: SemesterId,
    name: String,
}

#[derive(Debug, Clone)]
struct GradeRow {
    subject_id: SubjectId,
    entry: GradeEntry,
}

#[derive(Debug, Default)]
struct Tables {
    next_id: u64,
    semesters: BTreeMap<SemesterId, SemesterRow>,
    subjects: BTreeMap<SubjectId, SubjectRow>,
    grades: BTreeMap<GradeEntryId, GradeRow>,
}

impl Tables {
    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn owned_subject(&self, owner: UserId, subject_id: SubjectId) -> Result<&SubjectRow> {
        self.subjects
            .get(&subject_id)
            .filter(|row| row.owner == owner)
            .ok_or(GradeError::NotFound {
                entity: "subject",
                id: subject_id,
            })
    }
}

/// Gradebook store kept in process memory.
///
/// Cloning shares the same tables.
#[derive(Debug, Clone, Default)]
pub struct InMemoryGradeRepository {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryGradeRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GradeRepository for InMemoryGradeRepository {
    async fn fetch_semesters(&self, owner: UserId) -> Result<Vec<Semester>> {
        let tables = self.tables.read().await;
        Ok(tables
            .semesters
            .iter()
            .filter(|(_, row)| row.owner == owner)
            .map(|(id, row)| Semester {
                id: *id,
                name: row.name.clone(),
            })
            .collect())
    }

    async fn fetch_subjects(&self, owner: UserId, semester_id: SemesterId) -> Result<Vec<Subject>> {
        let tables = self.tables.read().await;
        let mut subjects: Vec<Subject> = tables
            .subjects
            .iter()
            .filter(|(_, row)| row.owner == owner && row.semester_id == semester_id)
            .map(|(id, row)| Subject {
                id: *id,
                semester_id: row.semester_id,
                name: row.name.clone(),
            })
            .collect();
        subjects.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(subjects)
    }

    async fn fetch_subject(&self, owner: UserId, subject_id: SubjectId) -> Result<Subject> {
        let tables = self.tables.read().await;
        let row = tables.owned_subject(owner, subject_id)?;
        Ok(Subject {
            id: subject_id,
            semester_id: row.semester_id,
            name: row.name.clone(),
        })
    }

    async fn fetch_grade_entries(
        &self,
        owner: UserId,
        subject_id: SubjectId,
    ) -> Result<Vec<GradeEntry>> {
        let tables = self.tables.read().await;
        tables.owned_subject(owner, subject_id)?;

        let mut entries: Vec<GradeEntry> = tables
            .grades
            .values()
            .filter(|row| row.subject_id == subject_id)
            .map(|row| row.entry.clone())
            .collect();
        entries.sort_by(|a, b| {
            a.recorded_date
                .cmp(&b.recorded_date)
                .then(a.id.cmp(&b.id))
        });
        Ok(entries)
    }

    async fn insert_grade_entry(
        &self,
        owner: UserId,
        entry: NewGradeEntry,
    ) -> Result<GradeEntryId> {
        let mut tables = self.tables.write().await;
        tables.owned_subject(owner, entry.subject_id)?;

        let id = tables.allocate_id();
        tables.grades.insert(
            id,
            GradeRow {
                subject_id: entry.subject_id,
                entry: GradeEntry {
                    id,
                    title: entry.title,
                    raw_value: entry.raw_value,
                    weight: entry.weight,
                    recorded_date: entry.recorded_date,
                },
            },
        );

        tracing::debug!("Stored grade entry {} for subject {}", id, entry.subject_id);
        Ok(id)
    }

    async fn delete_grade_entry(&self, owner: UserId, id: GradeEntryId) -> Result<()> {
        let mut tables = self.tables.write().await;

        let subject_id = tables
            .grades
            .get(&id)
            .map(|row| row.subject_id)
            .ok_or(GradeError::NotFound {
                entity: "grade entry",
                id,
            })?;

        // foreign rows look exactly like missing ones
        if tables.owned_subject(owner, subject_id).is_err() {
            return Err(GradeError::NotFound {
                entity: "grade entry",
                id,
            });
        }

        tables.grades.remove(&id);
        tracing::debug!("Deleted grade entry {}", id);
        Ok(())
    }

    async fn create_semester(&self, owner: UserId, name: &str) -> Result<SemesterId> {
        let mut tables = self.tables.write().await;
        let id = tables.allocate_id();
        tables.semesters.insert(
            id,
            SemesterRow {
                owner,
                name: name.to_string(),
            },
        );
        Ok(id)
    }

    async fn create_subject(
        &self,
        owner: UserId,
        semester_id: SemesterId,
        name: &str,
    ) -> Result<SubjectId> {
        let mut tables = self.tables.write().await;

        let owns_semester = tables
            .semesters
            .get(&semester_id)
            .is_some_and(|row| row.owner == owner);
        if !owns_semester {
            return Err(GradeError::NotFound {
                entity: "semester",
                id: semester_id,
            });
        }

        let id = tables.allocate_id();
        tables.subjects.insert(
            id,
            SubjectRow {
                owner,
                semester_id,
                name: name.to_string(),
            },
        );
        Ok(id)
    }
}
