use crate::core::export::{ReportFormat, ReportRequest, ReportView};
use crate::domain::model::{BonusMode, SubjectId};
use crate::utils::error::Result;
use crate::utils::validation::{validate_path, validate_required_field, Validate};
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "gradebook")]
#[command(about = "Grade averages and bonus points for a semester gradebook")]
pub struct CliConfig {
    /// Path to the TOML gradebook
    #[arg(short, long, default_value = "gradebook.toml")]
    pub gradebook: String,

    /// Bonus point mode: per-entry or pooled (defaults to the gradebook's setting)
    #[arg(long)]
    pub mode: Option<String>,

    #[arg(long, value_enum, default_value = "semesters")]
    pub view: ReportView,

    /// Subject id for the subject view, as listed by the overview
    #[arg(long)]
    pub subject: Option<SubjectId>,

    /// Output format: table, csv, tsv or json
    #[arg(short, long, default_value = "table")]
    pub format: String,

    /// Write the report to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log as JSON lines")]
    pub log_json: bool,
}

impl CliConfig {
    pub fn report_format(&self) -> Result<ReportFormat> {
        self.format.parse()
    }

    /// Mode given on the command line, if any
    pub fn mode_override(&self) -> Result<Option<BonusMode>> {
        self.mode.as_deref().map(str::parse::<BonusMode>).transpose()
    }

    pub fn subject_id(&self) -> Result<SubjectId> {
        validate_required_field("subject", &self.subject).copied()
    }

    /// Combines the flags with the gradebook's default mode.
    pub fn report_request(&self, default_mode: BonusMode) -> Result<ReportRequest> {
        Ok(ReportRequest {
            view: self.view,
            mode: self.mode_override()?.unwrap_or(default_mode),
            format: self.report_format()?,
            subject: self.subject,
        })
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("gradebook", &self.gradebook)?;
        if let Some(output) = &self.output {
            validate_path("output", output)?;
        }
        self.report_format()?;
        self.mode_override()?;
        if self.view == ReportView::Subject {
            self.subject_id()?;
        }
        Ok(())
    }
}
