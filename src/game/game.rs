use uuid::Uuid;

use crate::game::action::GameAction;
use crate::game::{GameConfig, GameError, GameState, StepOutcome};
use crate::players::BasePlayer;

const TICKS_LIMIT: u32 = 10_000;

pub struct Game {
    pub seed: u64,
    pub id: Uuid,
    pub ticks: u32,
    pub state: GameState,
}

impl Game {
    pub fn new(config: GameConfig) -> Result<Self, GameError> {
        Ok(Self {
            seed: config.seed,
            id: Uuid::new_v4(),
            ticks: 0,
            state: GameState::new(config)?,
        })
    }

    /// Same as `new`, but seats a random subset of players.
    pub fn with_random_seating(config: GameConfig) -> Result<Self, GameError> {
        let mut game = Self::new(config)?;
        let players = game.state.pick_players();
        game.state.new_game(&players)?;
        Ok(game)
    }

    /// Plays until someone wins, everyone is out, or the tick limit is hit. `players[i]`
    /// acts for the i-th seated player, in the order of `state.players()`.
    pub fn play<P: BasePlayer>(&mut self, players: &[P]) -> Result<Option<usize>, GameError> {
        while !self.state.game_over() && self.ticks < TICKS_LIMIT {
            if self.play_tick(players)?.is_none() {
                break;
            }
        }
        Ok(self.state.winner())
    }

    pub fn play_tick<P: BasePlayer>(
        &mut self,
        players: &[P],
    ) -> Result<Option<GameAction>, GameError> {
        let current = self.state.current_player();
        let player = self
            .state
            .players()
            .iter()
            .position(|&slot| slot == current)
            .and_then(|seat| players.get(seat))
            .ok_or(GameError::InvalidPlayer(current))?;

        let legal_actions = self.state.legal_actions().actions();
        if legal_actions.is_empty() {
            return Ok(None);
        }

        match player.decide(self, &legal_actions) {
            Some(action) => {
                self.execute(action)?;
                Ok(Some(action))
            }
            None => Ok(None),
        }
    }

    pub fn execute(&mut self, action: GameAction) -> Result<StepOutcome, GameError> {
        let outcome = self.state.step(action)?;
        self.ticks += 1;
        Ok(outcome)
    }

    pub fn winner(&self) -> Option<usize> {
        self.state.winner()
    }

    pub fn copy(&self) -> Self {
        Self {
            seed: self.seed,
            id: self.id,
            ticks: self.ticks,
            state: self.state.clone(),
        }
    }
}
