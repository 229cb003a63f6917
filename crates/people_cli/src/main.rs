//! CLI entry point for the people directory core.
//!
//! # Responsibility
//! - Open a volatile store and run a single read or validation command.
//! - Print results as JSON so output stays scriptable.

use clap::{Parser, Subcommand};
use people_core::{
    default_log_level, init_logging, ErrorKind, PersonDraft, PersonService, ServiceError,
};
use serde::Serialize;
use std::process::ExitCode;

#[derive(Parser)]
#[command(version, about = "Query the seeded people directory")]
struct Args {
    /// Log level: trace|debug|info|warn|error.
    #[arg(long, env = "PEOPLE_LOG_LEVEL")]
    log_level: Option<String>,
    /// Absolute directory for rotating log files. Logging is off when unset.
    #[arg(long, env = "PEOPLE_LOG_DIR")]
    log_dir: Option<String>,
    /// Start from an empty store instead of the four seed records.
    #[arg(long)]
    empty: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print core linkage info
    Ping,
    /// List people, optionally by first/last name prefix
    List {
        #[arg(long)]
        name: Option<String>,
    },
    /// Show one person
    Get { id: String },
    /// Show a person's age in completed years
    Age { id: String },
    /// Validate a record without storing it
    Validate {
        #[arg(long)]
        id: Option<String>,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        birthday: Option<String>,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Some(notice) = start_logging(args.log_level.as_deref(), args.log_dir.as_deref()) {
        eprintln!("{notice}");
    }

    match run(args.command, args.empty) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprint!("{err}");
            if !matches!(err, ServiceError::Invalid(_)) {
                eprintln!();
            }
            ExitCode::from(exit_code(err.kind()))
        }
    }
}

fn run(command: Command, empty: bool) -> Result<String, ServiceError> {
    match command {
        Command::Ping => Ok(format!(
            "people_core ping={} version={}",
            people_core::ping(),
            people_core::core_version()
        )),
        Command::Validate {
            id,
            first_name,
            last_name,
            email,
            birthday,
        } => {
            let draft = PersonDraft {
                id,
                first_name,
                last_name,
                email,
                birthday,
            };
            Ok(to_json(&draft.into_person()?))
        }
        Command::List { name } => Ok(to_json(&open_service(empty)?.list(name.as_deref())?)),
        Command::Get { id } => open_service(empty)?
            .get(&id)?
            .map(|person| to_json(&person))
            .ok_or(ServiceError::NotFound(id)),
        Command::Age { id } => open_service(empty)?
            .age(&id)?
            .map(|age| age.to_string())
            .ok_or(ServiceError::NotFound(id)),
    }
}

/// Starts file logging when a directory is configured.
///
/// Returns a notice for stderr when logging stays off.
fn start_logging(log_level: Option<&str>, log_dir: Option<&str>) -> Option<String> {
    let Some(log_dir) = log_dir else {
        return log_level.map(|level| {
            format!("log level `{level}` ignored: set --log-dir or PEOPLE_LOG_DIR to enable logging")
        });
    };
    let level = log_level.unwrap_or(default_log_level());
    init_logging(level, log_dir)
        .err()
        .map(|err| format!("logging disabled: {err}"))
}

fn open_service(empty: bool) -> Result<PersonService, ServiceError> {
    if empty {
        PersonService::open_empty()
    } else {
        PersonService::open_seeded()
    }
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value)
        .unwrap_or_else(|err| format!("\"serialization failed: {err}\""))
}

fn exit_code(kind: ErrorKind) -> u8 {
    match kind {
        ErrorKind::Invalid => 2,
        ErrorKind::Conflict => 3,
        ErrorKind::NotFound => 4,
        ErrorKind::Internal => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::{exit_code, start_logging, Args, Command};
    use clap::Parser;
    use people_core::ErrorKind;

    #[test]
    fn log_level_without_dir_yields_notice() {
        let notice = start_logging(Some("debug"), None).expect("notice");
        assert!(notice.contains("`debug` ignored"));
        assert!(notice.contains("--log-dir"));
    }

    #[test]
    fn no_logging_flags_is_silent() {
        assert_eq!(start_logging(None, None), None);
    }

    #[test]
    fn relative_log_dir_is_reported() {
        let notice = start_logging(Some("info"), Some("relative/logs")).expect("notice");
        assert!(notice.starts_with("logging disabled: "));
    }

    #[test]
    fn parses_validate_flags() {
        let args = Args::try_parse_from([
            "people",
            "--empty",
            "validate",
            "--id",
            "bf552a1c-fd73-4bd0-b64a-d3f69a9ff9de",
            "--first-name",
            "John",
        ])
        .expect("parse args");

        assert!(args.empty);
        match args.command {
            Command::Validate { id, first_name, last_name, .. } => {
                assert_eq!(id.as_deref(), Some("bf552a1c-fd73-4bd0-b64a-d3f69a9ff9de"));
                assert_eq!(first_name.as_deref(), Some("John"));
                assert_eq!(last_name, None);
            }
            _ => panic!("expected validate"),
        }
    }

    #[test]
    fn exit_codes_are_distinct_per_kind() {
        assert_eq!(exit_code(ErrorKind::Internal), 1);
        assert_eq!(exit_code(ErrorKind::Invalid), 2);
        assert_eq!(exit_code(ErrorKind::Conflict), 3);
        assert_eq!(exit_code(ErrorKind::NotFound), 4);
    }
}
