use std::collections::HashMap;
use std::time::Duration;

use crate::game::GameEvent;
use crate::game::game::Game;

#[derive(Debug, Default, Clone)]
pub struct GameStats {
    pub wins: HashMap<usize, u32>,
    pub false_accusations: HashMap<usize, u32>,
    pub games: u32,
    pub abandoned: u32,
    pub unfinished: u32,
    pub total_ticks: u64,
    pub total_suggestions: u64,
    pub total_duration: Duration,
}

impl GameStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_game(&mut self, game: &Game, duration: Duration) {
        self.games += 1;
        self.total_duration += duration;
        self.total_ticks += u64::from(game.ticks);

        for event in game.state.event_log() {
            match event {
                GameEvent::SuggestionMade { .. } => self.total_suggestions += 1,
                GameEvent::FalseAccusation { player, .. } => {
                    *self.false_accusations.entry(*player).or_insert(0) += 1;
                }
                GameEvent::GameAbandoned => self.abandoned += 1,
                _ => {}
            }
        }

        match game.winner() {
            Some(winner) => *self.wins.entry(winner).or_insert(0) += 1,
            None if !game.state.game_over() => self.unfinished += 1,
            None => {}
        }
    }

    pub fn get_avg_ticks(&self) -> f64 {
        if self.games == 0 {
            return 0.0;
        }
        self.total_ticks as f64 / self.games as f64
    }

    pub fn get_avg_suggestions(&self) -> f64 {
        if self.games == 0 {
            return 0.0;
        }
        self.total_suggestions as f64 / self.games as f64
    }

    pub fn get_avg_duration(&self) -> Duration {
        if self.games == 0 {
            return Duration::ZERO;
        }
        self.total_duration / self.games
    }
}

#[derive(Default)]
pub struct StatisticsAccumulator {
    pub stats: GameStats,
}

impl StatisticsAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn after(&mut self, game: &Game, duration: Duration) {
        self.stats.record_game(game, duration);
    }
}
