use std::path::{Path, PathBuf};

use once_cell::sync::OnceCell;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;

static INIT: OnceCell<()> = OnceCell::new();

const DEFAULT_LOG_FILE: &str = "dossier.logs.jsonl";

/// Where log events go.
#[derive(Debug, Clone, PartialEq, Eq)]
enum LogSink {
    Disabled,
    /// Compact lines on stderr, so stdout stays free for rendered panels.
    Console,
    JsonFile { dir: PathBuf, file_name: String },
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" | "enabled" => Some(true),
        "0" | "false" | "no" | "off" | "disabled" => Some(false),
        _ => None,
    }
}

fn resolve_sink(lookup: impl Fn(&str) -> Option<String>) -> LogSink {
    let enabled = ["DOSSIER_OBSERVABILITY_ENABLED", "DOSSIER_OBSERVABILITY"]
        .into_iter()
        .find_map(&lookup)
        .map(|value| parse_flag(&value).unwrap_or(true))
        .unwrap_or(true);
    if !enabled {
        return LogSink::Disabled;
    }

    match lookup("DOSSIER_JSON_LOG_PATH").filter(|p| !p.trim().is_empty()) {
        None => LogSink::Console,
        Some(raw) => {
            let path = PathBuf::from(raw);
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."));
            let file_name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or(DEFAULT_LOG_FILE)
                .to_string();
            LogSink::JsonFile { dir, file_name }
        }
    }
}

fn env_filter() -> EnvFilter {
    std::env::var("DOSSIER_LOG_LEVEL")
        .ok()
        .and_then(|level| EnvFilter::try_new(level).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

/// Initialize logging once per process.
///
/// Environment variables:
/// - `DOSSIER_OBSERVABILITY_ENABLED` / `DOSSIER_OBSERVABILITY`: enable/disable flag (default enabled).
/// - `DOSSIER_LOG_LEVEL`: level/filter override (`info`, `debug`, `dossier_core=trace`, ...).
/// - `DOSSIER_JSON_LOG_PATH`: write JSONL to this file instead of the stderr console.
/// - `RUST_LOG`: fallback filter when `DOSSIER_LOG_LEVEL` is unset.
pub fn init_observability() {
    INIT.get_or_init(|| match resolve_sink(|key| std::env::var(key).ok()) {
        LogSink::Disabled => {}
        LogSink::Console => {
            let console = tracing_subscriber::fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(std::io::stderr);
            let _ = tracing_subscriber::registry()
                .with(env_filter())
                .with(console)
                .try_init();
        }
        LogSink::JsonFile { dir, file_name } => {
            let _ = std::fs::create_dir_all(&dir);
            let json = tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(true)
                .with_target(false)
                .with_writer(tracing_appender::rolling::never(dir, file_name));
            let _ = tracing_subscriber::registry()
                .with(env_filter())
                .with(json)
                .try_init();
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |key: &str| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn flag_accepts_common_spellings() {
        assert_eq!(parse_flag(" Yes "), Some(true));
        assert_eq!(parse_flag("off"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn console_is_the_default_sink() {
        assert_eq!(resolve_sink(env(&[])), LogSink::Console);
        assert_eq!(
            resolve_sink(env(&[("DOSSIER_OBSERVABILITY", "garbage")])),
            LogSink::Console
        );
    }

    #[test]
    fn disabled_flag_wins_over_log_path() {
        let sink = resolve_sink(env(&[
            ("DOSSIER_OBSERVABILITY_ENABLED", "false"),
            ("DOSSIER_JSON_LOG_PATH", "logs/run.jsonl"),
        ]));
        assert_eq!(sink, LogSink::Disabled);
    }

    #[test]
    fn json_path_splits_into_dir_and_file() {
        assert_eq!(
            resolve_sink(env(&[("DOSSIER_JSON_LOG_PATH", "logs/run.jsonl")])),
            LogSink::JsonFile {
                dir: PathBuf::from("logs"),
                file_name: "run.jsonl".to_string(),
            }
        );
        assert_eq!(
            resolve_sink(env(&[("DOSSIER_JSON_LOG_PATH", "run.jsonl")])),
            LogSink::JsonFile {
                dir: PathBuf::from("."),
                file_name: "run.jsonl".to_string(),
            }
        );
    }

    #[test]
    fn init_is_idempotent() {
        init_observability();
        init_observability();
        tracing::info!(event = "observability.test", "second init is a no-op");
    }
}
