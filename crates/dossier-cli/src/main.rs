//! Stream a multi-topic briefing for one company or person.
//!
//! Progress lines go to stderr as each panel changes phase; the finished
//! panels are printed to stdout once every topic settles. Ctrl-C stops all
//! topics and prints whatever has arrived.

mod render;

use clap::{Parser, ValueEnum};
use dossier_core::{DashboardConfig, SessionController, SubjectKind, build_session};
use tokio::task::JoinHandle;

#[derive(Parser, Debug)]
#[command(name = "dossier", version, about = "Stream a multi-topic briefing", long_about = None)]
struct Cli {
    /// Company or person to research.
    #[arg(short, long)]
    query: String,
    #[arg(long, value_enum, default_value_t = Kind::Company)]
    kind: Kind,
    /// Topic ids to run (repeatable). Defaults to all standard topics.
    #[arg(long = "topic")]
    topics: Vec<String>,
    /// Completion model override.
    #[arg(long)]
    model: Option<String>,
    /// Print the final snapshot as JSON instead of text panels.
    #[arg(long)]
    json: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Kind {
    Company,
    Person,
}

impl From<Kind> for SubjectKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Company => SubjectKind::Company,
            Kind::Person => SubjectKind::Person,
        }
    }
}

/// Load .env from the crate dir or the current dir.
fn load_env() {
    if let Ok(canon) = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join(".env")
        .canonicalize()
    {
        let _ = dotenvy::from_path(canon);
    }
    let _ = dotenvy::dotenv();
}

fn config_from(cli: &Cli) -> Result<DashboardConfig, Box<dyn std::error::Error>> {
    let mut config = DashboardConfig::from_env()?
        .subject(cli.kind.into())
        .topics(cli.topics.clone());
    if let Some(model) = &cli.model {
        config = config.model(model.clone())?;
    }
    Ok(config)
}

/// One watcher per topic printing a status line on every phase change.
fn spawn_progress(session: &SessionController) -> Vec<JoinHandle<()>> {
    session
        .topics()
        .iter()
        .map(|topic| {
            let title = topic.title().to_string();
            let mut rx = topic.subscribe();
            tokio::spawn(async move {
                let mut last = None;
                while rx.changed().await.is_ok() {
                    let state = rx.borrow_and_update().clone();
                    if last != Some(state.phase) {
                        last = Some(state.phase);
                        eprintln!("{}", render::status_line(&title, &state));
                    }
                }
            })
        })
        .collect()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    load_env();
    dossier_core::init_observability();

    let cli = Cli::parse();
    let config = config_from(&cli)?;
    tracing::debug!(event = "cli.config", config = ?config);

    let mut session = build_session(&config)?;
    let watchers = spawn_progress(&session);
    session.submit(&cli.query)?;

    let interrupted = tokio::select! {
        _ = session.wait_idle() => false,
        _ = tokio::signal::ctrl_c() => true,
    };
    if interrupted {
        eprintln!("interrupted, stopping all topics");
        session.stop();
    }
    for watcher in watchers {
        watcher.abort();
    }

    let snapshot = session.snapshot();
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        for topic in &snapshot.topics {
            println!("{}", render::render_panel(&topic.title, &topic.state));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_repeated_topics_and_kind() {
        let cli = Cli::try_parse_from([
            "dossier", "--query", "Ada Lovelace", "--kind", "person", "--topic", "overview",
            "--topic", "news",
        ])
        .expect("valid args");
        assert_eq!(cli.kind, Kind::Person);
        assert_eq!(cli.topics, vec!["overview", "news"]);
        assert!(cli.model.is_none());
    }

    #[test]
    fn query_is_required() {
        assert!(Cli::try_parse_from(["dossier"]).is_err());
    }
}
