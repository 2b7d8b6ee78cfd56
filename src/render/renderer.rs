use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};

use crate::game::{EffectKind, EffectRegistry, Mode, OverReason, Phase, Position, RoundState};
use crate::metrics::GameMetrics;

/// What occupies a cell, as far as drawing is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellView {
    Empty,
    Head(usize),
    Body(usize),
    Food,
    PowerUp(EffectKind),
    Obstacle,
}

/// Classify a cell of the round; heads win over everything else so a
/// collision frame still shows where each agent ended up
pub fn cell_view(state: &RoundState, pos: Position) -> CellView {
    for (agent, snake) in state.snakes.iter().enumerate() {
        if snake.head() == pos {
            return CellView::Head(agent);
        }
    }
    for (agent, snake) in state.snakes.iter().enumerate() {
        if snake.body_segments().contains(&pos) {
            return CellView::Body(agent);
        }
    }
    if state.obstacles.contains(&pos) {
        return CellView::Obstacle;
    }
    if let Some(power_up) = state.power_up.filter(|p| p.position == pos) {
        return CellView::PowerUp(power_up.kind);
    }
    if pos == state.food {
        return CellView::Food;
    }
    CellView::Empty
}

/// Active effects with their whole seconds left, rounded up
pub fn effect_badges(effects: &EffectRegistry) -> Vec<String> {
    EffectKind::ALL
        .iter()
        .filter_map(|&kind| {
            let left = effects.remaining(kind)?;
            let secs = left.as_millis().div_ceil(1000);
            Some(format!("{} {}s", kind.label(), secs))
        })
        .collect()
}

fn agent_colors(agent: usize) -> (Color, Color) {
    match agent {
        0 => (Color::Cyan, Color::Green),
        _ => (Color::Magenta, Color::Yellow),
    }
}

fn power_up_glyph(kind: EffectKind) -> (&'static str, Color) {
    match kind {
        EffectKind::DoublePoints => ("$ ", Color::LightYellow),
        EffectKind::SlowMotion => ("~ ", Color::LightBlue),
        EffectKind::Invulnerable => ("+ ", Color::LightGreen),
        EffectKind::Phase => ("? ", Color::LightMagenta),
    }
}

pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render(
        &self,
        frame: &mut Frame,
        state: &RoundState,
        effects: &EffectRegistry,
        metrics: &GameMetrics,
        high_score: u32,
    ) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(0),    // Game area
                Constraint::Length(3), // Footer
            ])
            .split(frame.area());

        // Render header with basic stats
        let stats = self.render_stats(chunks[0], state, effects, metrics, high_score);
        frame.render_widget(stats, chunks[0]);

        // Center the game grid horizontally
        let game_area = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(10),
                Constraint::Percentage(80),
                Constraint::Percentage(10),
            ])
            .split(chunks[1])[1];

        // Render game grid or game over screen
        if state.phase == Phase::Over {
            let game_over = self.render_game_over(game_area, state, metrics);
            frame.render_widget(game_over, game_area);
        } else {
            let grid = self.render_grid(game_area, state);
            frame.render_widget(grid, game_area);
        }

        // Render footer with controls
        let controls = self.render_controls(chunks[2], state);
        frame.render_widget(controls, chunks[2]);
    }

    fn render_grid(&self, _area: Rect, state: &RoundState) -> Paragraph<'_> {
        let size = state.grid.size() as i32;
        let mut lines = Vec::new();

        for y in 0..size {
            let mut spans = Vec::new();

            for x in 0..size {
                let cell = match cell_view(state, Position::new(x, y)) {
                    CellView::Head(agent) => Span::styled(
                        "■ ",
                        Style::default()
                            .fg(agent_colors(agent).0)
                            .add_modifier(Modifier::BOLD),
                    ),
                    CellView::Body(agent) => {
                        Span::styled("□ ", Style::default().fg(agent_colors(agent).1))
                    }
                    CellView::Food => Span::styled(
                        "O ",
                        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                    ),
                    CellView::PowerUp(kind) => {
                        let (glyph, color) = power_up_glyph(kind);
                        Span::styled(
                            glyph,
                            Style::default().fg(color).add_modifier(Modifier::BOLD),
                        )
                    }
                    CellView::Obstacle => Span::styled("█ ", Style::default().fg(Color::Gray)),
                    CellView::Empty => Span::styled(". ", Style::default().fg(Color::DarkGray)),
                };

                spans.push(cell);
            }

            lines.push(Line::from(spans));
        }

        let title = match state.phase {
            Phase::Paused => format!(" {} - PAUSED ", state.mode.label()),
            Phase::NotStarted => format!(" {} - press R to start ", state.mode.label()),
            _ => format!(" {} ", state.mode.label()),
        };

        Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Double)
                    .border_style(Style::default().fg(Color::White))
                    .title(title),
            )
            .alignment(Alignment::Center)
    }

    fn render_stats(
        &self,
        _area: Rect,
        state: &RoundState,
        effects: &EffectRegistry,
        metrics: &GameMetrics,
        high_score: u32,
    ) -> Paragraph<'_> {
        let label = Style::default().fg(Color::Yellow);
        let value = Style::default().fg(Color::White);
        let bold = value.add_modifier(Modifier::BOLD);

        let mut spans = Vec::new();
        if state.mode == Mode::Multiplayer {
            for (agent, score) in state.scores.iter().enumerate() {
                spans.push(Span::styled(format!("P{}: ", agent + 1), label));
                spans.push(Span::styled(score.to_string(), bold));
                spans.push(Span::raw("    "));
            }
        } else {
            spans.push(Span::styled("Score: ", label));
            spans.push(Span::styled(state.top_score().to_string(), bold));
            spans.push(Span::raw("    "));
            spans.push(Span::styled("Best: ", label));
            spans.push(Span::styled(high_score.to_string(), value));
            spans.push(Span::raw("    "));
        }

        spans.push(Span::styled(state.difficulty.label(), value));
        spans.push(Span::raw("    "));

        match state.time_left {
            Some(left) => {
                spans.push(Span::styled("Left: ", label));
                spans.push(Span::styled(format!("{}s", left), bold));
            }
            None => {
                spans.push(Span::styled("Time: ", label));
                spans.push(Span::styled(metrics.format_time(), value));
            }
        }

        let badges = effect_badges(effects);
        if !badges.is_empty() {
            spans.push(Span::raw("    "));
            spans.push(Span::styled(
                badges.join(" | "),
                Style::default().fg(Color::LightMagenta),
            ));
        }

        Paragraph::new(vec![Line::from(spans)]).alignment(Alignment::Center)
    }

    fn render_game_over(
        &self,
        _area: Rect,
        state: &RoundState,
        metrics: &GameMetrics,
    ) -> Paragraph<'_> {
        let headline = match (state.mode, state.winner, state.over_reason) {
            (Mode::Multiplayer, Some(agent), _) => format!("PLAYER {} WINS", agent + 1),
            (Mode::Multiplayer, None, _) => "DRAW".to_string(),
            (_, _, Some(OverReason::TimeUp)) => "TIME UP".to_string(),
            _ => "GAME OVER".to_string(),
        };

        let mut text = vec![
            Line::from(""),
            Line::from(vec![Span::styled(
                headline,
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )]),
            Line::from(""),
        ];

        if state.mode == Mode::Multiplayer {
            text.push(Line::from(vec![
                Span::styled("Wins: ", Style::default().fg(Color::Yellow)),
                Span::styled(
                    format!(
                        "P1 {} - P2 {} ({} drawn)",
                        metrics.wins[0], metrics.wins[1], metrics.draws
                    ),
                    Style::default().fg(Color::White),
                ),
            ]));
        } else {
            text.push(Line::from(vec![
                Span::styled("Final Score: ", Style::default().fg(Color::Yellow)),
                Span::styled(
                    state.top_score().to_string(),
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                ),
            ]));
        }

        text.push(Line::from(""));
        text.push(Line::from(vec![
            Span::styled("Press ", Style::default().fg(Color::Gray)),
            Span::styled(
                "R",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(" to restart or ", Style::default().fg(Color::Gray)),
            Span::styled(
                "Q",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            Span::styled(" to quit", Style::default().fg(Color::Gray)),
        ]));

        Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        )
    }

    fn render_controls(&self, _area: Rect, state: &RoundState) -> Paragraph<'_> {
        let mut spans = vec![Span::styled("↑↓←→", Style::default().fg(Color::Cyan))];
        if state.mode == Mode::Multiplayer {
            spans.push(Span::raw(" P1, "));
            spans.push(Span::styled("WASD", Style::default().fg(Color::Magenta)));
            spans.push(Span::raw(" P2 | "));
        } else {
            spans.push(Span::raw(" or "));
            spans.push(Span::styled("WASD", Style::default().fg(Color::Cyan)));
            spans.push(Span::raw(" to move | "));
        }
        spans.extend([
            Span::styled("Space", Style::default().fg(Color::Yellow)),
            Span::raw(" pause | "),
            Span::styled("1-5", Style::default().fg(Color::Yellow)),
            Span::raw(" mode | "),
            Span::styled("Tab", Style::default().fg(Color::Yellow)),
            Span::raw(" speed | "),
            Span::styled("Q", Style::default().fg(Color::Red)),
            Span::raw(" to quit"),
        ]);

        Paragraph::new(vec![Line::from(spans)]).alignment(Alignment::Center)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}
