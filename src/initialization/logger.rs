//! Logger initialization.
//!
//! Records mirrored from the activity log carry their level tag in the log
//! target (see [`ActivityLevel::log_target`]). Both formats print that tag in
//! place of the target, so console output reads like the activity log.

use std::io::Write;

use colored::*;
use log::{Level, LevelFilter};

use crate::activity_log::ActivityLevel;
use crate::config::LogFormat;
use crate::error_handling::InitializationError;

/// Initializes `env_logger` with the given level and format.
///
/// `RUST_LOG` is read first and `level` then overrides it for this crate, so
/// per-module filters such as `RUST_LOG=reqwest=debug` still work:
///
/// ```bash
/// RUST_LOG=reqwest=debug library_versioning --log-level info run
/// ```
///
/// # Errors
///
/// Returns `InitializationError::LoggerError` if a logger is already installed.
pub fn init_logger_with(level: LevelFilter, format: LogFormat) -> Result<(), InitializationError> {
    colored::control::set_override(true);

    let mut builder = env_logger::Builder::from_default_env();
    builder.filter_level(level);
    builder.filter_module("sqlx", LevelFilter::Warn);
    builder.filter_module("reqwest", LevelFilter::Info);
    builder.filter_module("hyper", LevelFilter::Info);
    builder.filter_module("hyper_util", LevelFilter::Info);
    builder.filter_module("rustls", LevelFilter::Warn);
    builder.filter_module("library_versioning", level);

    match format {
        LogFormat::Json => builder.format(|buf, record| {
            writeln!(
                buf,
                "{}",
                render_json(
                    chrono::Utc::now().timestamp_millis(),
                    record.level(),
                    record.target(),
                    &record.args().to_string(),
                )
            )
        }),
        LogFormat::Plain => builder.format(|buf, record| {
            writeln!(
                buf,
                "{}",
                render_plain(record.level(), record.target(), &record.args().to_string())
            )
        }),
    };

    builder.try_init().map_err(InitializationError::from)
}

/// One JSON object per record. Activity records gain an `activity` field.
fn render_json(ts: i64, level: Level, target: &str, msg: &str) -> String {
    let mut line = serde_json::json!({
        "ts": ts,
        "level": level.as_str(),
        "target": target,
        "msg": msg,
    });
    if let Some(tag) = ActivityLevel::from_log_target(target) {
        line["activity"] = serde_json::Value::from(tag.as_ref());
    }
    line.to_string()
}

fn render_plain(level: Level, target: &str, msg: &str) -> String {
    match ActivityLevel::from_log_target(target) {
        Some(tag) => {
            let (emoji, label) = match tag {
                ActivityLevel::Info => ("ℹ️", tag.as_ref().normal()),
                ActivityLevel::Success => ("✅", tag.as_ref().green()),
                ActivityLevel::Warning => ("⚠️", tag.as_ref().yellow()),
                ActivityLevel::Error => ("❌", tag.as_ref().red()),
            };
            format!("{emoji} [{label}] {msg}")
        }
        None => {
            let (emoji, label) = match level {
                Level::Error => ("❌", level.as_str().red()),
                Level::Warn => ("⚠️", level.as_str().yellow()),
                Level::Info => ("✔️", level.as_str().green()),
                Level::Debug => ("🔍", level.as_str().blue()),
                Level::Trace => ("🔬", level.as_str().purple()),
            };
            format!("{emoji} {} [{label}] {msg}", target.cyan())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_line_carries_activity_tag() {
        let line = render_json(
            1,
            Level::Info,
            ActivityLevel::Success.log_target(),
            "Library \"Documents\" configured",
        );
        let parsed: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed["level"], "INFO");
        assert_eq!(parsed["activity"], "SUCCESS");
        assert_eq!(parsed["msg"], "Library \"Documents\" configured");
    }

    #[test]
    fn test_json_line_without_activity_tag() {
        let line = render_json(1, Level::Debug, "library_versioning::credential", "renewing");
        let parsed: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed["target"], "library_versioning::credential");
        assert!(parsed.get("activity").is_none());
    }

    #[test]
    fn test_plain_line_shows_tag_instead_of_target() {
        let activity = render_plain(Level::Warn, ActivityLevel::Warning.log_target(), "slow site");
        assert!(activity.contains("WARNING"));
        assert!(activity.ends_with("slow site"));
        assert!(!activity.contains("library_versioning::activity"));

        let other = render_plain(Level::Warn, "sqlx::query", "slow statement");
        assert!(other.contains("sqlx::query"));
        assert!(other.contains("WARN"));
        assert!(!other.contains("WARNING"));
    }

    #[test]
    fn test_second_init_reports_error() {
        let first = init_logger_with(LevelFilter::Info, LogFormat::Plain);
        let second = init_logger_with(LevelFilter::Debug, LogFormat::Json);
        assert!(first.is_err() || second.is_err());
    }
}
