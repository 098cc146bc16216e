use clap::{ArgAction, Parser, Subcommand};
use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use survey_host::{render_section, resolve_visibility, validate_survey};
use survey_spec::{SurveySpec, survey_schema};
use tracing::debug;

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Survey section tooling",
    long_about = "Lists, validates and converts sectioned surveys with conditional questions"
)]
struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the sections that are converted into pages.
    Sections {
        /// Path to the survey JSON document.
        #[arg(long, value_name = "SURVEY")]
        survey: PathBuf,
    },
    /// Check show-conditions for circular and missing references.
    Validate {
        /// Path to the survey JSON document.
        #[arg(long, value_name = "SURVEY")]
        survey: PathBuf,
        /// Exit with an error when any finding is reported.
        #[arg(long)]
        strict: bool,
    },
    /// Convert one section into the render model.
    Convert {
        /// Path to the survey JSON document.
        #[arg(long, value_name = "SURVEY")]
        survey: PathBuf,
        /// Section identifier (slug of the section title).
        #[arg(long, value_name = "SECTION")]
        section: String,
        /// Write the model to this file instead of stdout.
        #[arg(long, value_name = "OUT")]
        out: Option<PathBuf>,
        /// Refuse to convert sections with dependency findings.
        #[arg(long)]
        strict: bool,
    },
    /// Show which questions of a section are visible for a set of answers.
    Visibility {
        /// Path to the survey JSON document.
        #[arg(long, value_name = "SURVEY")]
        survey: PathBuf,
        /// Section identifier (slug of the section title).
        #[arg(long, value_name = "SECTION")]
        section: String,
        /// JSON file with answers keyed by `q_<id>`.
        #[arg(long, value_name = "ANSWERS")]
        answers: PathBuf,
    },
    /// Print the JSON Schema of survey documents.
    Schema,
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);
    match cli.command {
        Command::Sections { survey } => run_sections(&survey),
        Command::Validate { survey, strict } => run_validate(&survey, strict),
        Command::Convert {
            survey,
            section,
            out,
            strict,
        } => run_convert(&survey, &section, out, strict),
        Command::Visibility {
            survey,
            section,
            answers,
        } => run_visibility(&survey, &section, &answers),
        Command::Schema => {
            println!("{}", serde_json::to_string_pretty(&survey_schema())?);
            Ok(())
        }
    }
}

fn setup_logging(verbosity: u8) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let level = match verbosity {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

fn host_config(survey: &Path, strict: bool) -> CliResult<String> {
    let contents = fs::read_to_string(survey)?;
    debug!(path = %survey.display(), bytes = contents.len(), "loaded survey document");
    Ok(json!({ "survey_json": contents, "strict_validation": strict }).to_string())
}

fn parse_host_result(response: &str) -> CliResult<Value> {
    let value: Value = serde_json::from_str(response)?;
    if let Some(error) = value.get("error").and_then(Value::as_str) {
        Err(error.into())
    } else {
        Ok(value)
    }
}

fn run_sections(survey: &Path) -> CliResult<()> {
    let spec = SurveySpec::from_json(&fs::read_to_string(survey)?)?;
    println!("Survey: {}", spec.title);
    for section in spec.sections() {
        println!(
            "  {} - {} ({} questions)",
            section.id(),
            section.title,
            section.questions.len()
        );
    }
    Ok(())
}

fn run_validate(survey: &Path, strict: bool) -> CliResult<()> {
    let report = parse_host_result(&validate_survey(&host_config(survey, false)?))?;
    let findings = report["errors"].as_array().cloned().unwrap_or_default();
    if findings.is_empty() {
        println!("Validation result: valid");
        return Ok(());
    }

    println!("Validation result: {} finding(s)", findings.len());
    for finding in &findings {
        println!(
            "  [{}] {}",
            finding["section"].as_str().unwrap_or("<unknown>"),
            finding["message"].as_str().unwrap_or_default()
        );
    }
    if strict {
        Err("dependency validation failed".into())
    } else {
        Ok(())
    }
}

fn run_convert(
    survey: &Path,
    section: &str,
    out: Option<PathBuf>,
    strict: bool,
) -> CliResult<()> {
    let model = parse_host_result(&render_section(section, &host_config(survey, strict)?))?;
    let rendered = serde_json::to_string_pretty(&model)?;
    match out {
        Some(path) => {
            fs::write(&path, rendered)?;
            println!("Wrote render model to {}", path.display());
        }
        None => println!("{}", rendered),
    }
    Ok(())
}

fn run_visibility(survey: &Path, section: &str, answers: &Path) -> CliResult<()> {
    let spec = SurveySpec::from_json(&fs::read_to_string(survey)?)?;
    let (_, target) = spec
        .find_section(section)
        .ok_or_else(|| format!("section '{}' is not available", section))?;
    let answers_json = fs::read_to_string(answers)?;
    let visibility = parse_host_result(&resolve_visibility(
        section,
        &host_config(survey, false)?,
        &answers_json,
    ))?;

    for question in &target.questions {
        let visible = visibility[question.id.as_str()].as_bool().unwrap_or(false);
        println!(
            "  {} {} - {}",
            if visible { "[shown] " } else { "[hidden]" },
            question.id,
            question.text
        );
    }
    Ok(())
}
