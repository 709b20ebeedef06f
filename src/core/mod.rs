pub mod export;
pub mod formula;
pub mod report;

pub use crate::domain::model::{
    BonusMode, GradeEntry, Metric, PassStatus, SemesterAggregate, SubjectAggregate,
};
pub use crate::domain::ports::{GradeRepository, SessionGate};
pub use crate::utils::error::Result;
