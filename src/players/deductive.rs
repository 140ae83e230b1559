use std::cell::RefCell;

use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};

use crate::cards::{Card, CardSet, Suggestion};
use crate::game::action::{Accusation, GameAction};
use crate::game::game::Game;
use crate::game::state::GameState;
use crate::players::BasePlayer;
use crate::types::{NUM_ROOMS, Person, Room, StepKind, Weapon};

/// Heads for rooms it has not ruled out, suggests cards it knows nothing about and only
/// accuses once the envelope is certain.
#[derive(Clone)]
pub struct DeductivePlayer {
    pub epsilon: Option<f64>,
    rng: RefCell<StdRng>,
}

impl DeductivePlayer {
    pub fn new(epsilon: Option<f64>, seed: u64) -> Self {
        Self {
            epsilon,
            rng: RefCell::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for DeductivePlayer {
    fn default() -> Self {
        Self {
            epsilon: None,
            rng: RefCell::new(StdRng::from_entropy()),
        }
    }
}

/// What one player has worked out about the deck.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Deductions {
    /// Cards located in some hand.
    pub located: CardSet,
    /// Cards proven to be in the envelope.
    pub envelope: CardSet,
}

impl Deductions {
    /// Located cards come from the player's card knowledge. A suggestion of their own that
    /// nobody could disprove puts every card of it outside their hand in the envelope.
    pub fn gather(state: &GameState, player: usize) -> Self {
        let located = state.card_knowledge().located_cards(player);
        let mut envelope = CardSet::empty();
        for record in state.suggestion_history().iter() {
            if record.suggestor == player && record.disprover.is_none() {
                for card in record.suggestion.cards().iter() {
                    if !located.contains(card) {
                        envelope.insert(card);
                    }
                }
            }
        }
        Self { located, envelope }
    }

    pub fn is_unknown(&self, card: Card) -> bool {
        !self.located.contains(card) && !self.envelope.contains(card)
    }

    /// Cards worth naming in a suggestion: unknown ones, or ones already pinned to the
    /// envelope, which nobody can show.
    fn is_safe(&self, card: Card) -> bool {
        !self.located.contains(card)
    }

    /// The envelope, once each kind is pinned down or has a single candidate left.
    pub fn solution(&self) -> Option<Suggestion> {
        Some(Suggestion::new(
            self.resolve(Person::ALL)?,
            self.resolve(Weapon::ALL)?,
            self.resolve(Room::ALL)?,
        ))
    }

    fn resolve<T: Copy + Into<Card>, const N: usize>(&self, all: [T; N]) -> Option<T> {
        if let Some(known) = all.into_iter().find(|item| self.envelope.contains((*item).into())) {
            return Some(known);
        }
        single(all.into_iter().filter(|item| !self.located.contains((*item).into())))
    }
}

impl BasePlayer for DeductivePlayer {
    fn decide(&self, game: &Game, actions: &[GameAction]) -> Option<GameAction> {
        if actions.len() == 1 {
            return actions.first().copied();
        }

        if let Some(epsilon) = self.epsilon {
            let mut rng = self.rng.borrow_mut();
            if rng.gen_bool(epsilon.clamp(0.0, 1.0)) {
                return actions.choose(&mut *rng).copied();
            }
        }

        let state = &game.state;
        let me = state.current_player();
        let deductions = Deductions::gather(state, me);

        let choice = match state.current_step_kind() {
            StepKind::Move => {
                let distances = state.board.room_distances(me);
                actions
                    .iter()
                    .filter_map(|action| match action {
                        GameAction::MoveTowards { room } => Some((*room, *action)),
                        _ => None,
                    })
                    .min_by_key(|(room, _)| {
                        (
                            !deductions.is_safe(Card::from(*room)),
                            distances[NUM_ROOMS + room.index()],
                        )
                    })
                    .map(|(_, action)| action)
            }
            StepKind::Suggestion => actions
                .iter()
                .copied()
                .filter_map(|action| match action {
                    GameAction::Suggest(triple) => Some((triple, action)),
                    _ => None,
                })
                .max_by_key(|(triple, _)| suggestion_score(triple, &deductions))
                .map(|(_, action)| action),
            StepKind::DisproveSuggestion => actions.first().copied(),
            StepKind::Accusation => {
                let accuse = deductions
                    .solution()
                    .map(|solution| GameAction::Accuse(Accusation::Accuse(solution)));
                match accuse {
                    Some(action) if actions.contains(&action) => Some(action),
                    _ => Some(GameAction::Accuse(Accusation::Decline)),
                }
            }
        };

        choice.or_else(|| actions.first().copied())
    }
}

/// Prefers triples whose person and weapon cannot be shown, then the most unknown cards.
fn suggestion_score(triple: &Suggestion, deductions: &Deductions) -> (usize, usize) {
    let safe = [Card::from(triple.person), Card::from(triple.weapon)]
        .into_iter()
        .filter(|card| deductions.is_safe(*card))
        .count();
    let unknown = triple
        .cards()
        .iter()
        .filter(|card| deductions.is_unknown(*card))
        .count();
    (safe, unknown)
}

fn single<T>(mut candidates: impl Iterator<Item = T>) -> Option<T> {
    let first = candidates.next()?;
    candidates.next().is_none().then_some(first)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::DECK;
    use crate::game::GameConfig;

    fn located_all_but(answer: Suggestion) -> CardSet {
        DECK.into_iter()
            .filter(|card| !answer.cards().contains(*card))
            .collect()
    }

    #[test]
    fn solves_once_every_other_card_is_located() {
        let answer = Suggestion::new(Person::MrGreen, Weapon::Knife, Room::Library);
        let deductions = Deductions {
            located: located_all_but(answer),
            envelope: CardSet::empty(),
        };
        assert_eq!(deductions.solution(), Some(answer));
    }

    #[test]
    fn two_candidates_are_not_a_solution() {
        let answer = Suggestion::new(Person::MrGreen, Weapon::Knife, Room::Library);
        let located: CardSet = located_all_but(answer)
            .iter()
            .filter(|card| *card != Card::from(Room::Hall))
            .collect();
        let deductions = Deductions {
            located,
            envelope: CardSet::empty(),
        };
        assert_eq!(deductions.solution(), None);

        let pinned = Deductions {
            envelope: [Card::from(Room::Library)].into_iter().collect(),
            ..deductions
        };
        assert_eq!(pinned.solution(), Some(answer));
    }

    #[test]
    fn prefers_cards_nobody_can_show() {
        let deductions = Deductions {
            located: [Card::from(Person::MrsWhite)].into_iter().collect(),
            envelope: CardSet::empty(),
        };
        let shown = Suggestion::new(Person::MrsWhite, Weapon::Rope, Room::Hall);
        let fresh = Suggestion::new(Person::MrGreen, Weapon::Rope, Room::Hall);
        assert!(suggestion_score(&fresh, &deductions) > suggestion_score(&shown, &deductions));
    }

    #[test]
    fn exploration_replays_from_its_seed() {
        let game = Game::new(GameConfig::default()).unwrap();
        let actions = game.state.legal_actions().actions();
        assert!(actions.len() > 1);

        let picks = |player: &DeductivePlayer| -> Vec<Option<GameAction>> {
            (0..20).map(|_| player.decide(&game, &actions)).collect()
        };
        let first = picks(&DeductivePlayer::new(Some(1.0), 9));
        let second = picks(&DeductivePlayer::new(Some(1.0), 9));
        assert_eq!(first, second);
    }
}
