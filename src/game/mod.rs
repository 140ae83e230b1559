pub mod action;
pub mod game;
pub mod history;
pub mod knowledge;
pub mod state;

pub use action::{Accusation, FLAT_ACTION_SPACE, GameAction, LegalActions, SuggestionMask};
pub use game::Game;
pub use history::{PlayerSet, SUGGESTION_RECORD_WIDTH, SuggestionHistory, SuggestionRecord};
pub use knowledge::{CardKnowledge, PlayerKnowledge};
pub use state::{
    AccusationPolicy, Disproof, GameConfig, GameError, GameEvent, GameState, StepOutcome,
};
