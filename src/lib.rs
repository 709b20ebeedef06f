pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{InMemoryGradeRepository, StaticSession};
pub use config::GradebookFile;
pub use crate::core::{
    export::{render_report, ReportFormat, ReportRequest, ReportView},
    report::GradeReporter,
};
pub use domain::model::{BonusMode, GradeEntry, Metric, PassStatus};
pub use utils::error::{GradeError, Result};
