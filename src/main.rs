use clap::Parser;
use gradebook::utils::error::ErrorSeverity;
use gradebook::utils::{logger, validation::Validate};
use gradebook::{
    render_report, CliConfig, GradeError, GradeReporter, GradebookFile, InMemoryGradeRepository,
    StaticSession,
};

async fn run(config: &CliConfig) -> gradebook::Result<String> {
    tracing::info!("📁 Loading gradebook from: {}", config.gradebook);
    let file = GradebookFile::from_file(&config.gradebook)?;

    let owner = file.owner_id();
    let repository = InMemoryGradeRepository::new();
    let summary = file.load_into(&repository, owner).await?;
    tracing::info!(
        "✅ Loaded {} semesters, {} subjects, {} grades",
        summary.semesters,
        summary.subjects,
        summary.grades
    );

    let request = config.report_request(file.default_mode()?)?;
    let reporter = GradeReporter::new(repository);
    let session = StaticSession::signed_in(owner);

    render_report(&reporter, &session, request).await
}

fn exit_code(e: &GradeError) -> i32 {
    match e.severity() {
        ErrorSeverity::Low => 4,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}

#[tokio::main]
async fn main() {
    let config = CliConfig::parse();

    if config.log_json {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting gradebook CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let result = match run(&config).await {
        Ok(output) => match &config.output {
            Some(path) => std::fs::write(path, &output)
                .map(|_| tracing::info!("📁 Report saved to: {}", path))
                .map_err(GradeError::IoError),
            None => {
                print!("{}", output);
                Ok(())
            }
        },
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        tracing::error!("❌ Report failed: {} (Severity: {:?})", e, e.severity());
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(exit_code(&e));
    }
}
