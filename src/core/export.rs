use crate::core::report::{GradeReporter, OverviewRow, SemesterReport, SubjectReport};
use crate::domain::model::{two_places, BonusMode, Metric, SubjectId};
use crate::domain::ports::{GradeRepository, SessionGate};
use crate::utils::error::{GradeError, Result};
use crate::utils::validation::validate_required_field;
use rust_decimal::Decimal;
use serde::Serialize;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Table,
    Csv,
    Tsv,
    Json,
}

impl FromStr for ReportFormat {
    type Err = GradeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "table" | "text" => Ok(ReportFormat::Table),
            "csv" => Ok(ReportFormat::Csv),
            "tsv" => Ok(ReportFormat::Tsv),
            "json" => Ok(ReportFormat::Json),
            other => Err(GradeError::InvalidConfigValueError {
                field: "format".to_string(),
                value: other.to_string(),
                reason: "Valid formats: table, csv, tsv, json".to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, serde::Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "kebab-case")]
pub enum ReportView {
    /// One line per semester with its pass status
    Semesters,
    /// One line per subject
    Overview,
    /// Every grade of one subject (needs a subject id)
    Subject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportRequest {
    pub view: ReportView,
    pub mode: BonusMode,
    pub format: ReportFormat,
    pub subject: Option<SubjectId>,
}

/// Builds the requested view for the signed-in user and renders it.
pub async fn render_report<R: GradeRepository>(
    reporter: &GradeReporter<R>,
    session: &dyn SessionGate,
    request: ReportRequest,
) -> Result<String> {
    tracing::debug!(
        "Rendering {:?} view as {:?} in {} mode",
        request.view,
        request.format,
        request.mode
    );

    match request.view {
        ReportView::Semesters => {
            let reports = reporter.semester_reports(session, request.mode).await?;
            render_semesters(&reports, request.format)
        }
        ReportView::Overview => {
            let rows = reporter.overview(session, request.mode).await?;
            render_overview(&rows, request.format)
        }
        ReportView::Subject => {
            let subject_id = *validate_required_field("subject", &request.subject)?;
            let report = reporter
                .subject_report(session, subject_id, request.mode)
                .await?;
            render_subject(&report, request.format)
        }
    }
}

fn decimal_cell(value: Decimal) -> String {
    two_places(value)
}

fn metric_cell(metric: Metric) -> String {
    metric.value().map(decimal_cell).unwrap_or_default()
}

fn delimited(header: &[&str], rows: Vec<Vec<String>>, delimiter: u8) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());

    writer.write_record(header)?;
    for row in rows {
        writer.write_record(&row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| GradeError::IoError(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn table(header: &[&str], rows: Vec<Vec<String>>) -> String {
    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let format_line = |cells: Vec<String>| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = vec![format_line(header.iter().map(|h| h.to_string()).collect())];
    lines.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  "),
    );
    for row in rows {
        // NoData shows as a dash in tables
        let row = row
            .into_iter()
            .map(|cell| if cell.is_empty() { "-".to_string() } else { cell })
            .collect();
        lines.push(format_line(row));
    }

    lines.join("\n") + "\n"
}

fn render<T: Serialize + ?Sized>(
    value: &T,
    header: &[&str],
    rows: Vec<Vec<String>>,
    format: ReportFormat,
) -> Result<String> {
    match format {
        ReportFormat::Table => Ok(table(header, rows)),
        ReportFormat::Csv => delimited(header, rows, b','),
        ReportFormat::Tsv => delimited(header, rows, b'\t'),
        ReportFormat::Json => Ok(serde_json::to_string_pretty(value)? + "\n"),
    }
}

pub fn render_semesters(reports: &[SemesterReport], format: ReportFormat) -> Result<String> {
    let header = ["semester", "average", "bonus_points", "status"];
    let rows = reports
        .iter()
        .map(|r| {
            vec![
                r.semester.name.clone(),
                metric_cell(r.aggregate.average_across_subjects),
                decimal_cell(r.aggregate.total_bonus_points),
                r.aggregate.pass_status.to_string(),
            ]
        })
        .collect();

    render(reports, &header, rows, format)
}

pub fn render_overview(rows: &[OverviewRow], format: ReportFormat) -> Result<String> {
    let header = ["id", "semester", "subject", "average", "bonus_points"];
    let cells = rows
        .iter()
        .map(|r| {
            vec![
                r.subject_id.to_string(),
                r.semester.clone(),
                r.subject.clone(),
                metric_cell(r.weighted_average),
                metric_cell(r.bonus_points),
            ]
        })
        .collect();

    render(rows, &header, cells, format)
}

pub fn render_subject(report: &SubjectReport, format: ReportFormat) -> Result<String> {
    let header = ["date", "title", "grade", "weight", "rounded", "bonus_points"];
    let mut rows: Vec<Vec<String>> = report
        .entries
        .iter()
        .map(|e| {
            vec![
                e.entry.recorded_date.format("%Y-%m-%d").to_string(),
                e.entry.title.clone(),
                decimal_cell(e.entry.raw_value),
                e.entry.weight.normalize().to_string(),
                decimal_cell(e.rounded_value),
                decimal_cell(e.bonus_points),
            ]
        })
        .collect();

    if format == ReportFormat::Table {
        rows.push(vec![
            String::new(),
            format!("{} ({})", report.subject.name, report.mode),
            metric_cell(report.aggregate.weighted_average),
            String::new(),
            String::new(),
            metric_cell(report.aggregate.bonus_points),
        ]);
    }

    render(report, &header, rows, format)
}
