use std::time::Duration;

use crate::game::{Mode, RoundState};

/// Counters kept across rounds for the header of the terminal view
pub struct GameMetrics {
    pub elapsed_time: Duration,
    pub session_best: u32,
    pub rounds_played: u32,
    /// Two-player wins, indexed by agent
    pub wins: [u32; 2],
    pub draws: u32,
}

impl GameMetrics {
    pub fn new() -> Self {
        Self {
            elapsed_time: Duration::ZERO,
            session_best: 0,
            rounds_played: 0,
            wins: [0; 2],
            draws: 0,
        }
    }

    /// Track time spent running, as measured by the round clock
    pub fn update(&mut self, round_clock_ms: u64) {
        self.elapsed_time = Duration::from_millis(round_clock_ms);
    }

    pub fn on_round_start(&mut self) {
        self.elapsed_time = Duration::ZERO;
    }

    pub fn on_round_over(&mut self, state: &RoundState) {
        self.rounds_played += 1;
        if state.mode == Mode::Multiplayer {
            match state.winner {
                Some(agent) if agent < self.wins.len() => self.wins[agent] += 1,
                _ => self.draws += 1,
            }
            return;
        }
        self.session_best = self.session_best.max(state.top_score());
    }

    pub fn format_time(&self) -> String {
        let total_secs = self.elapsed_time.as_secs();
        let minutes = total_secs / 60;
        let seconds = total_secs % 60;
        format!("{:02}:{:02}", minutes, seconds)
    }
}

impl Default for GameMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Difficulty, GameConfig, GameEngine};
    use crate::persistence::MemoryStore;

    fn finished(mode: Mode, scores: Vec<u32>, winner: Option<usize>) -> RoundState {
        let engine = GameEngine::new(GameConfig::default(), Box::new(MemoryStore::new())).unwrap();
        let mut state = engine.state().clone();
        state.mode = mode;
        state.difficulty = Difficulty::Normal;
        state.scores = scores;
        state.winner = winner;
        state
    }

    #[test]
    fn test_time_formatting() {
        let mut metrics = GameMetrics::new();
        metrics.update(125_000);
        assert_eq!(metrics.format_time(), "02:05");

        metrics.on_round_start();
        assert_eq!(metrics.format_time(), "00:00");

        metrics.update(3_661_000);
        assert_eq!(metrics.format_time(), "61:01");
    }

    #[test]
    fn test_session_best_tracking() {
        let mut metrics = GameMetrics::new();

        metrics.on_round_over(&finished(Mode::Classic, vec![10], None));
        assert_eq!(metrics.session_best, 10);
        assert_eq!(metrics.rounds_played, 1);

        metrics.on_round_over(&finished(Mode::Timed, vec![5], None));
        assert_eq!(metrics.session_best, 10); // Should not decrease
        assert_eq!(metrics.rounds_played, 2);

        metrics.on_round_over(&finished(Mode::Maze, vec![15], None));
        assert_eq!(metrics.session_best, 15); // Should update
    }

    #[test]
    fn test_two_player_tally() {
        let mut metrics = GameMetrics::new();

        metrics.on_round_over(&finished(Mode::Multiplayer, vec![30, 10], Some(0)));
        metrics.on_round_over(&finished(Mode::Multiplayer, vec![0, 0], None));
        metrics.on_round_over(&finished(Mode::Multiplayer, vec![0, 20], Some(1)));

        assert_eq!(metrics.wins, [1, 1]);
        assert_eq!(metrics.draws, 1);
        assert_eq!(metrics.session_best, 0);
        assert_eq!(metrics.rounds_played, 3);
    }
}
