use clap::Parser;
use img_ocr_validator::error::ValidatorError;
use img_ocr_validator::severity::Severity;
use img_ocr_validator::{Validator, report, validate_seeds};
use std::process::ExitCode;

mod args;
use args::Args;

/// Exit status for an unrecognised `--severity`
const EXIT_INVALID_SEVERITY: u8 = 100;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging; timestamps come from env_logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let severity = match args.min_severity() {
        Ok(severity) => severity,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_INVALID_SEVERITY);
        }
    };

    match run(&args, severity).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            ::log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: &Args, severity: Option<Severity>) -> Result<(), ValidatorError> {
    let config = args.base_config()?;

    // Report-only regeneration never touches the network
    if args.parse_only {
        let stored = report::load_report(&config.report_path)?;
        let min_severity = severity.or(config.min_severity);
        report::generate_reports(&stored, &config.reports_dir, min_severity)?;
        return Ok(());
    }

    validate_seeds(&args.urls)?;

    let mut validator = Validator::new(config)
        .with_min_severity(severity)
        .with_exclusions(args.exclusions());
    if args.allow_duplicates {
        validator = validator.with_allow_duplicates(true);
    }
    if let Some(webdriver_url) = &args.webdriver {
        ::log::info!("Fetching pages through WebDriver at {}", webdriver_url);
        validator = validator.with_webdriver(webdriver_url.clone());
    }

    let config = validator.config().clone();
    let pipeline = validator.build()?;

    let start_time = std::time::Instant::now();
    let outcome = pipeline.run(&args.urls).await;
    ::log::info!(
        "Validation complete - processed {} pages in {:.2} seconds",
        outcome.report.len(),
        start_time.elapsed().as_secs_f64()
    );

    // The report is written even when the run stopped early
    report::save_report(&outcome.report, &config.report_path)?;

    if args.generate_report {
        report::generate_reports(&outcome.report, &config.reports_dir, config.min_severity)?;
    }

    match outcome.error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
