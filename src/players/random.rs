use std::cell::RefCell;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::game::action::GameAction;
use crate::game::game::Game;
use crate::players::BasePlayer;

/// Picks uniformly among the legal actions.
#[derive(Clone)]
pub struct RandomPlayer {
    rng: RefCell<StdRng>,
}

impl RandomPlayer {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: RefCell::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for RandomPlayer {
    fn default() -> Self {
        Self {
            rng: RefCell::new(StdRng::from_entropy()),
        }
    }
}

impl BasePlayer for RandomPlayer {
    fn decide(&self, _game: &Game, actions: &[GameAction]) -> Option<GameAction> {
        actions.choose(&mut *self.rng.borrow_mut()).copied()
    }
}
