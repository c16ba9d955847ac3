use {
    super::layout::{render_layout, DashboardView},
    crate::{
        pipeline::{engine::PlaybackPipeline, pacing::PacingState},
        state::DashboardState,
    },
    crossterm::event::{self, Event, KeyCode},
    ratatui::{backend::CrosstermBackend, Terminal},
    std::{io::Stdout, sync::Arc, time::Duration},
    tokio::sync::{watch, RwLock},
};

const MIN_REFRESH: Duration = Duration::from_millis(50);
const MAX_REFRESH: Duration = Duration::from_millis(500);

/// Redraw at the release rate, bounded to [50ms, 500ms]
pub fn refresh_interval(pacing: &PacingState) -> Duration {
    if !pacing.is_processing || pacing.last_delay_ms == 0 {
        return MAX_REFRESH;
    }
    Duration::from_millis(pacing.last_delay_ms).clamp(MIN_REFRESH, MAX_REFRESH)
}

/// True once the user asked to quit or shutdown was signalled
pub fn quit_requested(key: Option<KeyCode>, shutdown: &watch::Receiver<bool>) -> bool {
    matches!(key, Some(KeyCode::Char('q') | KeyCode::Esc)) || *shutdown.borrow()
}

/// Run the TUI event loop
///
/// Returns when the user presses `q` or `Esc`, or when `shutdown` flips to
/// true. The terminal is restored even if drawing fails.
pub async fn run_ui(
    pipeline: PlaybackPipeline,
    state: Arc<RwLock<DashboardState>>,
    shutdown: watch::Receiver<bool>,
) -> Result<(), Box<dyn std::error::Error>> {
    let backend = CrosstermBackend::new(std::io::stdout());
    let mut terminal = Terminal::new(backend)?;

    // Alternate screen keeps stderr logs out of the dashboard
    crossterm::terminal::enable_raw_mode()?;
    crossterm::execute!(
        std::io::stdout(),
        crossterm::terminal::EnterAlternateScreen,
        crossterm::cursor::Hide
    )?;
    terminal.clear()?;

    let result = ui_loop(&mut terminal, &pipeline, &state, &shutdown).await;

    crossterm::execute!(
        std::io::stdout(),
        crossterm::terminal::LeaveAlternateScreen,
        crossterm::cursor::Show
    )?;
    crossterm::terminal::disable_raw_mode()?;
    result
}

async fn ui_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    pipeline: &PlaybackPipeline,
    state: &RwLock<DashboardState>,
    shutdown: &watch::Receiver<bool>,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        let records = pipeline.snapshot();
        let pacing = pipeline.pacing_state();

        {
            let state = state.read().await;
            let view = DashboardView {
                records: &records,
                pacing,
                state: &state,
            };
            terminal.draw(|f| {
                let area = f.area();
                render_layout(f, area, &view);
            })?;
        }

        let mut key = None;
        if event::poll(refresh_interval(&pacing))? {
            if let Event::Key(pressed) = event::read()? {
                key = Some(pressed.code);
            }
        }
        if quit_requested(key, shutdown) {
            break;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quit_on_key_or_shutdown() {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        assert!(!quit_requested(None, &shutdown_rx));
        assert!(!quit_requested(Some(KeyCode::Char('x')), &shutdown_rx));
        assert!(quit_requested(Some(KeyCode::Char('q')), &shutdown_rx));
        assert!(quit_requested(Some(KeyCode::Esc), &shutdown_rx));

        shutdown_tx.send_replace(true);
        assert!(quit_requested(None, &shutdown_rx));
    }

    #[test]
    fn test_refresh_follows_release_rate() {
        let idle = PacingState::default();
        assert_eq!(refresh_interval(&idle), MAX_REFRESH);

        let busy = PacingState {
            queue_length: 30,
            last_delay_ms: 50,
            is_processing: true,
        };
        assert_eq!(refresh_interval(&busy), Duration::from_millis(50));

        let slow = PacingState {
            queue_length: 0,
            last_delay_ms: 2000,
            is_processing: true,
        };
        assert_eq!(refresh_interval(&slow), MAX_REFRESH);

        let steady = PacingState {
            queue_length: 2,
            last_delay_ms: 240,
            is_processing: true,
        };
        assert_eq!(refresh_interval(&steady), Duration::from_millis(240));
    }
}
