use serde::{Deserialize, Serialize};

use crate::board::CellId;
use crate::cards::{Card, CardSet, DECK_SIZE, SUGGESTION_SPACE, Suggestion};
use crate::types::{NUM_ROOMS, Room, StepKind};

/// Flat action layout: move towards a room, a suggestion or accusation triple, decline
/// to accuse, show a card.
pub const MOVE_ACTIONS_OFFSET: usize = 0;
pub const TRIPLE_ACTIONS_OFFSET: usize = MOVE_ACTIONS_OFFSET + NUM_ROOMS;
pub const DECLINE_ACCUSATION_INDEX: usize = TRIPLE_ACTIONS_OFFSET + SUGGESTION_SPACE;
pub const SHOW_CARD_OFFSET: usize = DECLINE_ACCUSATION_INDEX + 1;
pub const FLAT_ACTION_SPACE: usize = SHOW_CARD_OFFSET + DECK_SIZE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Accusation {
    Decline,
    Accuse(Suggestion),
}

impl Accusation {
    // Triple indices accuse; `SUGGESTION_SPACE` itself is the decline sentinel.
    pub fn from_index(index: usize) -> Option<Accusation> {
        if index == SUGGESTION_SPACE {
            Some(Accusation::Decline)
        } else {
            Suggestion::from_one_hot_index(index).map(Accusation::Accuse)
        }
    }

    pub fn to_index(&self) -> usize {
        match self {
            Accusation::Decline => SUGGESTION_SPACE,
            Accusation::Accuse(triple) => triple.one_hot_index(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameAction {
    Move { cell: CellId },
    MoveTowards { room: Room },
    Suggest(Suggestion),
    ShowCard { card: Card },
    Accuse(Accusation),
}

impl GameAction {
    /// Decodes a flat action index. The triple block means a suggestion or an accusation
    /// depending on the step being played.
    pub fn from_index(index: usize, step_kind: StepKind) -> Option<GameAction> {
        match index {
            i if i < TRIPLE_ACTIONS_OFFSET => {
                Room::from_index(i - MOVE_ACTIONS_OFFSET).map(|room| GameAction::MoveTowards { room })
            }
            i if i < DECLINE_ACCUSATION_INDEX => {
                let triple = Suggestion::from_one_hot_index(i - TRIPLE_ACTIONS_OFFSET)?;
                match step_kind {
                    StepKind::Suggestion => Some(GameAction::Suggest(triple)),
                    _ => Some(GameAction::Accuse(Accusation::Accuse(triple))),
                }
            }
            DECLINE_ACCUSATION_INDEX => Some(GameAction::Accuse(Accusation::Decline)),
            i if i < FLAT_ACTION_SPACE => {
                Card::from_index(i - SHOW_CARD_OFFSET).map(|card| GameAction::ShowCard { card })
            }
            _ => None,
        }
    }

    pub fn to_index(&self) -> Option<usize> {
        match self {
            GameAction::Move { .. } => None,
            GameAction::MoveTowards { room } => Some(MOVE_ACTIONS_OFFSET + room.index()),
            GameAction::Suggest(triple) => Some(TRIPLE_ACTIONS_OFFSET + triple.one_hot_index()),
            GameAction::Accuse(accusation) => Some(TRIPLE_ACTIONS_OFFSET + accusation.to_index()),
            GameAction::ShowCard { card } => Some(SHOW_CARD_OFFSET + card.index()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SuggestionMask {
    words: [u64; SUGGESTION_SPACE.div_ceil(64)],
}

impl SuggestionMask {
    pub fn insert(&mut self, triple: Suggestion) {
        let idx = triple.one_hot_index();
        self.words[idx / 64] |= 1 << (idx % 64);
    }

    pub fn contains(&self, triple: Suggestion) -> bool {
        let idx = triple.one_hot_index();
        self.words[idx / 64] & (1 << (idx % 64)) != 0
    }

    pub fn len(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|w| *w == 0)
    }

    pub fn iter(&self) -> impl Iterator<Item = Suggestion> + '_ {
        (0..SUGGESTION_SPACE)
            .filter_map(Suggestion::from_one_hot_index)
            .filter(|triple| self.contains(*triple))
    }

    pub fn to_vector(&self) -> Vec<u8> {
        (0..SUGGESTION_SPACE)
            .filter_map(Suggestion::from_one_hot_index)
            .map(|triple| u8::from(self.contains(triple)))
            .collect()
    }
}

impl FromIterator<Suggestion> for SuggestionMask {
    fn from_iter<I: IntoIterator<Item = Suggestion>>(iter: I) -> Self {
        let mut mask = SuggestionMask::default();
        for triple in iter {
            mask.insert(triple);
        }
        mask
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegalActions {
    pub step_kind: StepKind,
    pub moves: Vec<bool>,
    pub rooms: [bool; NUM_ROOMS],
    pub triples: SuggestionMask,
    pub decline_accusation: bool,
    pub disprove: CardSet,
}

impl LegalActions {
    pub(crate) fn none(step_kind: StepKind, num_cells: usize) -> Self {
        Self {
            step_kind,
            moves: vec![false; num_cells],
            rooms: [false; NUM_ROOMS],
            triples: SuggestionMask::default(),
            decline_accusation: false,
            disprove: CardSet::empty(),
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.moves.contains(&true)
            && !self.rooms.contains(&true)
            && self.triples.is_empty()
            && !self.decline_accusation
            && self.disprove.is_empty()
    }

    pub fn contains(&self, action: &GameAction) -> bool {
        match action {
            GameAction::Move { cell } => self.moves.get(*cell).copied().unwrap_or(false),
            GameAction::MoveTowards { room } => self.rooms[room.index()],
            GameAction::Suggest(triple) => {
                self.step_kind == StepKind::Suggestion && self.triples.contains(*triple)
            }
            GameAction::Accuse(Accusation::Decline) => self.decline_accusation,
            GameAction::Accuse(Accusation::Accuse(triple)) => {
                self.step_kind == StepKind::Accusation && self.triples.contains(*triple)
            }
            GameAction::ShowCard { card } => self.disprove.contains(*card),
        }
    }

    pub fn actions(&self) -> Vec<GameAction> {
        let mut actions: Vec<GameAction> = self
            .moves
            .iter()
            .enumerate()
            .filter(|(_, legal)| **legal)
            .map(|(cell, _)| GameAction::Move { cell })
            .collect();
        actions.extend(
            Room::ALL
                .into_iter()
                .filter(|room| self.rooms[room.index()])
                .map(|room| GameAction::MoveTowards { room }),
        );
        actions.extend(self.triples.iter().map(|triple| match self.step_kind {
            StepKind::Suggestion => GameAction::Suggest(triple),
            _ => GameAction::Accuse(Accusation::Accuse(triple)),
        }));
        if self.decline_accusation {
            actions.push(GameAction::Accuse(Accusation::Decline));
        }
        actions.extend(self.disprove.iter().map(|card| GameAction::ShowCard { card }));
        actions
    }

    pub fn to_vec(&self) -> Vec<u8> {
        let mut mask: Vec<u8> = self.moves.iter().map(|legal| u8::from(*legal)).collect();
        mask.extend(self.triples.to_vector());
        mask.push(u8::from(self.decline_accusation));
        mask.extend(self.disprove.to_vector());
        mask
    }

    pub fn to_flat_mask(&self) -> Vec<u8> {
        let mut mask: Vec<u8> = self.rooms.iter().map(|legal| u8::from(*legal)).collect();
        mask.extend(self.triples.to_vector());
        mask.push(u8::from(self.decline_accusation));
        mask.extend(self.disprove.to_vector());
        debug_assert_eq!(mask.len(), FLAT_ACTION_SPACE);
        mask
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Person, Weapon};

    #[test]
    fn flat_layout_has_expected_size() {
        assert_eq!(FLAT_ACTION_SPACE, 9 + 324 + 1 + 21);
        assert_eq!(DECLINE_ACCUSATION_INDEX, 333);
    }

    #[test]
    fn flat_indices_decode_by_step() {
        let triple = Suggestion::new(Person::MrsWhite, Weapon::Wrench, Room::Kitchen);
        let index = TRIPLE_ACTIONS_OFFSET + triple.one_hot_index();
        assert_eq!(
            GameAction::from_index(index, StepKind::Suggestion),
            Some(GameAction::Suggest(triple))
        );
        assert_eq!(
            GameAction::from_index(index, StepKind::Accusation),
            Some(GameAction::Accuse(Accusation::Accuse(triple)))
        );
        assert_eq!(
            GameAction::from_index(DECLINE_ACCUSATION_INDEX, StepKind::Accusation),
            Some(GameAction::Accuse(Accusation::Decline))
        );
        assert_eq!(
            GameAction::from_index(2, StepKind::Move),
            Some(GameAction::MoveTowards {
                room: Room::DiningRoom
            })
        );
        assert_eq!(GameAction::from_index(FLAT_ACTION_SPACE, StepKind::Move), None);
    }

    #[test]
    fn flat_indices_round_trip() {
        for index in 0..FLAT_ACTION_SPACE {
            let action = GameAction::from_index(index, StepKind::Accusation).unwrap();
            assert_eq!(action.to_index(), Some(index));
        }
        assert_eq!(GameAction::Move { cell: 3 }.to_index(), None);
    }

    #[test]
    fn decline_sentinel_follows_triples() {
        assert_eq!(Accusation::from_index(SUGGESTION_SPACE), Some(Accusation::Decline));
        assert_eq!(Accusation::from_index(SUGGESTION_SPACE + 1), None);
        assert_eq!(Accusation::Decline.to_index(), SUGGESTION_SPACE);
    }

    #[test]
    fn mask_counts_triples() {
        let mask: SuggestionMask = Person::ALL
            .into_iter()
            .map(|person| Suggestion::new(person, Weapon::Rope, Room::Hall))
            .collect();
        assert_eq!(mask.len(), 6);
        assert!(mask.contains(Suggestion::new(Person::MrGreen, Weapon::Rope, Room::Hall)));
        assert!(!mask.contains(Suggestion::new(Person::MrGreen, Weapon::Knife, Room::Hall)));
        assert_eq!(mask.to_vector().iter().filter(|v| **v == 1).count(), 6);
    }
}
