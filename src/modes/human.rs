use anyhow::{Context, Result};
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{Stderr, stderr};
use std::time::Duration;
use tokio::time::{Instant, interval, sleep};

use crate::game::{Difficulty, Mode, Session};
use crate::input::{InputHandler, KeyAction};
use crate::metrics::GameMetrics;
use crate::render::Renderer;

/// Wake-up period while no round timer is armed (paused or over)
const IDLE_WAIT: Duration = Duration::from_millis(250);

/// Why the event loop woke up
enum Wake {
    Input(Event),
    Timer,
    Render,
    Quit,
}

pub struct HumanMode {
    session: Session,
    metrics: GameMetrics,
    renderer: Renderer,
    input_handler: InputHandler,
    should_quit: bool,
}

impl HumanMode {
    /// Wrap a session and start its first round
    pub fn new(mut session: Session, mode: Mode, difficulty: Difficulty) -> Result<Self> {
        session
            .start_round(mode, difficulty)
            .context("Failed to start the first round")?;

        let mut metrics = GameMetrics::new();
        metrics.on_round_start();

        Ok(Self {
            session,
            metrics,
            renderer: Renderer::new(),
            input_handler: InputHandler::new(),
            should_quit: false,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stderr = stderr();
        execute!(stderr, EnterAlternateScreen).context("Failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stderr);
        let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
        terminal.hide_cursor().context("Failed to hide cursor")?;
        terminal.clear().context("Failed to clear terminal")?;

        // Run game loop with cleanup
        let result = self.run_game_loop(&mut terminal).await;

        // Cleanup terminal
        self.cleanup_terminal(&mut terminal)?;

        result
    }

    async fn run_game_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        let mut event_stream = EventStream::new();

        // Render at 30 FPS (33ms per frame)
        let render_interval = Duration::from_millis(33);
        let mut render_timer = interval(render_interval);

        let mut last = Instant::now();

        loop {
            // Sleep until the next round task is due; the session decides
            // what fires once the clock has been moved forward
            let wait = self.session.time_until_next().unwrap_or(IDLE_WAIT);

            let wake = tokio::select! {
                // Handle terminal events
                maybe_event = event_stream.next() => match maybe_event {
                    Some(Ok(event)) => Wake::Input(event),
                    Some(Err(_)) => Wake::Timer,
                    None => Wake::Quit,
                },

                _ = sleep(wait) => Wake::Timer,

                _ = render_timer.tick() => Wake::Render,

                // Handle Ctrl+C
                _ = tokio::signal::ctrl_c() => Wake::Quit,
            };

            // Bring the round up to date before acting on what woke us
            let now = Instant::now();
            self.advance(now.duration_since(last));
            last = now;

            match wake {
                Wake::Input(event) => self.handle_event(event)?,
                Wake::Timer => {}
                Wake::Render => {
                    self.metrics.update(self.session.clock_ms());
                    let high_score = self.session.engine().high_score();
                    terminal
                        .draw(|frame| {
                            self.renderer.render(
                                frame,
                                self.session.state(),
                                self.session.engine().effects(),
                                &self.metrics,
                                high_score,
                            );
                        })
                        .context("Failed to draw frame")?;
                }
                Wake::Quit => self.should_quit = true,
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    /// Feed elapsed wall time into the session and record a finished round
    fn advance(&mut self, elapsed: Duration) {
        let round_ended = match self.session.advance(elapsed) {
            Ok(report) => report.round_ended,
            // The engine has already closed the round and logged the cause
            Err(_) => true,
        };

        if round_ended {
            self.metrics.on_round_over(self.session.state());
        }
    }

    fn handle_event(&mut self, event: Event) -> Result<()> {
        if let Event::Key(key) = event {
            // Only process key press events, not release
            if key.kind != KeyEventKind::Press {
                return Ok(());
            }

            let action = self.input_handler.handle_key_event(key);
            self.apply(action)?;
        }

        Ok(())
    }

    fn apply(&mut self, action: KeyAction) -> Result<()> {
        let state = self.session.state();
        let (mode, difficulty) = (state.mode, state.difficulty);

        match action {
            KeyAction::Steer { agent, direction } => {
                // Both key sets drive the only agent outside two-player rounds
                let agent = if mode.agent_count() == 1 { 0 } else { agent };
                self.session.set_direction(agent, direction);
            }
            KeyAction::TogglePause => {
                self.session.toggle_pause();
            }
            KeyAction::Restart => self.start_round(mode, difficulty)?,
            KeyAction::SelectMode(selected) => self.start_round(selected, difficulty)?,
            KeyAction::CycleDifficulty => self.start_round(mode, difficulty.next())?,
            KeyAction::Quit => {
                self.should_quit = true;
            }
            KeyAction::None => {}
        }

        Ok(())
    }

    fn start_round(&mut self, mode: Mode, difficulty: Difficulty) -> Result<()> {
        self.session
            .start_round(mode, difficulty)
            .context("Failed to start round")?;
        self.metrics.on_round_start();
        Ok(())
    }

    fn cleanup_terminal(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)
            .context("Failed to leave alternate screen")?;
        terminal.show_cursor().context("Failed to show cursor")?;
        Ok(())
    }
}
