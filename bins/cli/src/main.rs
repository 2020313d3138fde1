//! Fundline command-line driver.
//!
//! Usage:
//!   fundline template <facility-name> <fiscal-year>  - Print an empty statement
//!   fundline compute <statement.json>                 - Recompute all derived figures
//!   fundline summary <statement.json>                 - Print the headline figures
//!   fundline table <statement.json>                   - Print fully expanded table rows
//!   fundline apply <statement.json> <updates.json>    - Apply row edits and recompute
//!   fundline batch <statement.json>...                - Recompute many statements in parallel
//!
//! Statement files hold either a full statement object or a bare array of rows.

use std::ffi::OsStr;
use std::fs;
use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fundline_core::statement::{
    BudgetRow, ExpansionState, RowUpdate, Statement, StatementService, apply_updates, flatten,
    validate_forest,
};
use fundline_shared::config::{AppConfig, LogFormat};
use fundline_shared::types::{FacilityId, StatementId};
use fundline_shared::{AppError, AppResult};

const USAGE: &str = "usage: fundline <template|compute|summary|table|apply|batch> [args...]";

enum Command {
    Template { facility: String, fiscal_year: String },
    Compute(PathBuf),
    Summary(PathBuf),
    Table(PathBuf),
    Apply { statement: PathBuf, updates: PathBuf },
    Batch(Vec<PathBuf>),
}

impl Command {
    fn parse(args: &[String]) -> AppResult<Self> {
        let arg = |i: usize| {
            args.get(i)
                .cloned()
                .ok_or_else(|| AppError::Validation(USAGE.to_string()))
        };

        match args.first().map(String::as_str) {
            Some("template") => Ok(Self::Template {
                facility: arg(1)?,
                fiscal_year: arg(2)?,
            }),
            Some("compute") => Ok(Self::Compute(arg(1)?.into())),
            Some("summary") => Ok(Self::Summary(arg(1)?.into())),
            Some("table") => Ok(Self::Table(arg(1)?.into())),
            Some("apply") => Ok(Self::Apply {
                statement: arg(1)?.into(),
                updates: arg(2)?.into(),
            }),
            Some("batch") if args.len() > 1 => {
                Ok(Self::Batch(args[1..].iter().map(PathBuf::from).collect()))
            }
            _ => Err(AppError::Validation(USAGE.to_string())),
        }
    }
}

/// A statement file: a full statement, or just its rows.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum StatementFile {
    Statement(Statement),
    Rows(Vec<BudgetRow>),
}

impl StatementFile {
    fn rows(&self) -> &[BudgetRow] {
        match self {
            Self::Statement(statement) => &statement.rows,
            Self::Rows(rows) => rows,
        }
    }

    /// Bare rows get a fresh identity so they can go through the service.
    fn to_statement(&self) -> Statement {
        match self {
            Self::Statement(statement) => statement.clone(),
            Self::Rows(rows) => Statement {
                id: StatementId::new(),
                facility_id: FacilityId::new(),
                facility_name: String::new(),
                fiscal_year: String::new(),
                rows: rows.clone(),
            },
        }
    }

    fn with_rows(self, rows: Vec<BudgetRow>) -> Self {
        match self {
            Self::Statement(statement) => Self::Statement(Statement { rows, ..statement }),
            Self::Rows(_) => Self::Rows(rows),
        }
    }
}

fn main() -> ExitCode {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("fundline: {}", AppError::from(err));
            return ExitCode::from(78);
        }
    };

    init_tracing(&config);

    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&config, &args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %format!("{err:#}"), "Command failed");
            eprintln!("fundline: {err:#}");
            ExitCode::from(exit_code(&err))
        }
    }
}

/// Errors that are not an `AppError` are reported as internal failures.
fn exit_code(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<AppError>().map_or_else(
        || AppError::Internal(err.to_string()).exit_code(),
        AppError::exit_code,
    )
}

fn ansi_enabled(stderr_is_terminal: bool, no_color: Option<&OsStr>) -> bool {
    stderr_is_terminal && no_color.is_none_or(OsStr::is_empty)
}

fn init_tracing(config: &AppConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.log.filter.as_str().into());
    let registry = tracing_subscriber::registry().with(filter);
    let ansi = ansi_enabled(
        io::stderr().is_terminal(),
        std::env::var_os("NO_COLOR").as_deref(),
    );

    match config.log.format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_writer(io::stderr),
            )
            .init(),
        LogFormat::Pretty => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(ansi)
                    .with_writer(io::stderr),
            )
            .init(),
    }
}

fn run(config: &AppConfig, args: &[String]) -> anyhow::Result<()> {
    match Command::parse(args)? {
        Command::Template {
            facility,
            fiscal_year,
        } => {
            let statement = StatementService::create(FacilityId::new(), facility, fiscal_year);
            info!(statement = %statement.id, "Created empty statement");
            write_json(config, &statement)
        }
        Command::Compute(path) => {
            let file: StatementFile = read_json(&path)?;
            let statement = recompute(config, &file.to_statement())
                .with_context(|| format!("validating {}", path.display()))?;
            info!(path = %path.display(), "Recomputed statement");
            write_json(config, &file.with_rows(statement.rows))
        }
        Command::Summary(path) => {
            let file: StatementFile = read_json(&path)?;
            let statement = file.to_statement();
            check(config, &statement.rows)
                .with_context(|| format!("validating {}", path.display()))?;
            write_json(config, &StatementService::summarize(&statement))
        }
        Command::Table(path) => {
            let file: StatementFile = read_json(&path)?;
            let statement = recompute(config, &file.to_statement())
                .with_context(|| format!("validating {}", path.display()))?;
            let rows = statement.rows;
            let table = flatten(&rows, &ExpansionState::expand_all(&rows));
            write_json(config, &table)
        }
        Command::Apply {
            statement: path,
            updates,
        } => {
            let file: StatementFile = read_json(&path)?;
            check(config, file.rows())
                .with_context(|| format!("validating {}", path.display()))?;
            let updates: Vec<RowUpdate> = read_json(&updates)?;
            let rows = apply_updates(file.rows(), &updates).map_err(AppError::from)?;
            info!(updates = updates.len(), "Applied row updates");
            write_json(config, &file.with_rows(rows))
        }
        Command::Batch(paths) => {
            let mut files = Vec::with_capacity(paths.len());
            for path in &paths {
                let file: StatementFile = read_json(path)?;
                check(config, file.rows())
                    .with_context(|| format!("validating {}", path.display()))?;
                files.push(file);
            }
            let statements: Vec<Statement> =
                files.iter().map(StatementFile::to_statement).collect();
            let computed = StatementService::recompute_all(&statements);
            let out: Vec<StatementFile> = files
                .into_iter()
                .zip(computed)
                .map(|(file, statement)| file.with_rows(statement.rows))
                .collect();
            write_json(config, &out)
        }
    }
}

/// Recomputes through the service, validating the layout first when configured.
fn recompute(config: &AppConfig, statement: &Statement) -> AppResult<Statement> {
    if config.output.validate {
        Ok(StatementService::recompute_checked(statement)?)
    } else {
        Ok(StatementService::recompute(statement))
    }
}

fn check(config: &AppConfig, rows: &[BudgetRow]) -> AppResult<()> {
    if config.output.validate {
        validate_forest(rows)?;
    }
    Ok(())
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> anyhow::Result<T> {
    let text = fs::read_to_string(path)
        .map_err(AppError::from)
        .with_context(|| format!("reading {}", path.display()))?;
    let value = serde_json::from_str(&text)
        .map_err(AppError::from)
        .with_context(|| format!("decoding {}", path.display()))?;
    Ok(value)
}

fn write_json<T: Serialize>(config: &AppConfig, value: &T) -> anyhow::Result<()> {
    let mut out = io::stdout().lock();
    if config.output.pretty {
        serde_json::to_writer_pretty(&mut out, value).map_err(AppError::from)?;
    } else {
        serde_json::to_writer(&mut out, value).map_err(AppError::from)?;
    }
    writeln!(out).map_err(AppError::from)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_parse_commands() {
        assert!(matches!(
            Command::parse(&args(&["compute", "s.json"])),
            Ok(Command::Compute(path)) if path == Path::new("s.json")
        ));
        assert!(matches!(
            Command::parse(&args(&["apply", "s.json", "u.json"])),
            Ok(Command::Apply { .. })
        ));
        assert!(matches!(
            Command::parse(&args(&["template", "Kigali HC", "2025/2026"])),
            Ok(Command::Template { facility, .. }) if facility == "Kigali HC"
        ));
    }

    #[test]
    fn test_parse_rejects_missing_arguments() {
        assert!(matches!(
            Command::parse(&args(&["apply", "s.json"])),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(Command::parse(&args(&[])), Err(AppError::Validation(_))));
        assert!(matches!(
            Command::parse(&args(&["export"])),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_parse_batch() {
        assert!(matches!(
            Command::parse(&args(&["batch", "a.json", "b.json"])),
            Ok(Command::Batch(paths)) if paths.len() == 2
        ));
        assert!(matches!(
            Command::parse(&args(&["batch"])),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_exit_code_falls_back_to_internal() {
        assert_eq!(exit_code(&anyhow::anyhow!("boom")), 70);
        assert_eq!(
            exit_code(&anyhow::Error::from(AppError::NotFound("s.json".into()))),
            66
        );
        let wrapped = Err::<(), _>(AppError::Validation("dup".into()))
            .context("validating s.json")
            .unwrap_err();
        assert_eq!(exit_code(&wrapped), 65);
    }

    #[test]
    fn test_ansi_only_on_terminal() {
        assert!(ansi_enabled(true, None));
        assert!(ansi_enabled(true, Some(OsStr::new(""))));
        assert!(!ansi_enabled(false, None));
        assert!(!ansi_enabled(true, Some(OsStr::new("1"))));
    }

    #[test]
    fn test_recompute_validates_when_configured() {
        let config = AppConfig::default();
        let mut statement = StatementService::create(FacilityId::new(), "Kigali HC", "2025/2026");
        statement.rows[0].children[1].id = "a1".to_string();

        assert!(matches!(
            recompute(&config, &statement),
            Err(AppError::Validation(_))
        ));

        let lenient = AppConfig {
            output: fundline_shared::config::OutputConfig {
                validate: false,
                ..config.output.clone()
            },
            ..config.clone()
        };
        assert!(recompute(&lenient, &statement).is_ok());
    }

    #[test]
    fn test_bare_rows_go_through_service() {
        let file: StatementFile = serde_json::from_str(
            r#"[{"id":"a","title":"Receipts","isCategory":true,"children":[{"id":"a1","title":"Other Incomes","q1":10}]}]"#,
        )
        .unwrap();

        let statement = recompute(&AppConfig::default(), &file.to_statement()).unwrap();
        let summary = StatementService::summarize(&statement);

        assert_eq!(summary.receipts.to_string(), "10");
        assert!(matches!(file.with_rows(statement.rows), StatementFile::Rows(_)));
    }

    #[test]
    fn test_statement_file_accepts_bare_rows() {
        let file: StatementFile =
            serde_json::from_str(r#"[{"id":"a1","title":"Other Incomes","q1":10}]"#).unwrap();
        assert!(matches!(file, StatementFile::Rows(_)));
        assert_eq!(file.rows().len(), 1);
    }

    #[test]
    fn test_statement_file_accepts_statement() {
        let statement = StatementService::create(FacilityId::new(), "Kigali HC", "2025/2026");
        let json = serde_json::to_string(&statement).unwrap();

        let file: StatementFile = serde_json::from_str(&json).unwrap();

        assert!(matches!(file, StatementFile::Statement(_)));
        assert_eq!(file.rows().len(), 7);
    }
}
