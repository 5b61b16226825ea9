use dossier_core::{Phase, StreamState};

/// One-line progress summary, printed whenever a topic changes phase.
pub fn status_line(title: &str, state: &StreamState) -> String {
    let mut line = format!("[{title}] {}", state.phase);
    match state.phase {
        Phase::Streaming | Phase::Done | Phase::Stopped => {
            line.push_str(&format!(
                " ({} sources, {} chars)",
                state.source_items.len(),
                state.buffer.chars().count()
            ));
        }
        Phase::Failed => {
            if let Some(error) = &state.error {
                line.push_str(&format!(": {error}"));
            }
        }
        Phase::Idle | Phase::Fetching => {}
    }
    if let Some(warning) = &state.warning {
        line.push_str(&format!(" [warning: {warning}]"));
    }
    line
}

/// Full panel text for the final report.
pub fn render_panel(title: &str, state: &StreamState) -> String {
    let mut out = format!("== {title} ==\n");
    if let Some(warning) = &state.warning {
        out.push_str(&format!("(source unavailable: {warning})\n"));
    }
    match (&state.error, state.buffer.is_empty()) {
        (Some(error), _) => out.push_str(&format!("error: {error}\n")),
        (None, true) => out.push_str(&format!("({})\n", state.phase)),
        (None, false) => {
            out.push_str(state.buffer.trim_end());
            out.push('\n');
            if state.phase == Phase::Stopped {
                out.push_str("(stopped)\n");
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_status_includes_error() {
        let state = StreamState {
            phase: Phase::Failed,
            error: Some("credential not configured".to_string()),
            ..StreamState::default()
        };
        assert_eq!(
            status_line("News", &state),
            "[News] failed: credential not configured"
        );
    }

    #[test]
    fn streaming_status_counts_chars() {
        let state = StreamState {
            phase: Phase::Streaming,
            buffer: "Acme is".to_string(),
            warning: Some("source timed out after 15000 ms".to_string()),
            ..StreamState::default()
        };
        assert_eq!(
            status_line("About", &state),
            "[About] streaming (0 sources, 7 chars) [warning: source timed out after 15000 ms]"
        );
    }

    #[test]
    fn stopped_panel_keeps_partial_text() {
        let state = StreamState {
            phase: Phase::Stopped,
            buffer: "Acme is ".to_string(),
            ..StreamState::default()
        };
        assert_eq!(render_panel("About", &state), "== About ==\nAcme is\n(stopped)\n");
    }

    #[test]
    fn empty_panel_shows_phase() {
        assert_eq!(
            render_panel("News", &StreamState::default()),
            "== News ==\n(idle)\n"
        );
    }
}
