use serde::{Deserialize, Serialize};

use crate::board::{CellId, ROOM_DISTANCE_WIDTH};
use crate::cards::{Card, CardSet};
use crate::game::history::SuggestionRecord;
use crate::types::{MAX_PLAYERS, StepKind};

/// Slot of `slot` as seen from `viewer`, who is always slot 0 of their own frame.
pub fn relative_slot(viewer: usize, slot: usize) -> usize {
    (slot + MAX_PLAYERS - viewer % MAX_PLAYERS) % MAX_PLAYERS
}

/// Rotates a per-slot array so `viewer`'s entry comes first.
pub fn rotate_to_viewer<T: Copy>(viewer: usize, values: &[T; MAX_PLAYERS]) -> [T; MAX_PLAYERS] {
    let mut rotated = *values;
    for (slot, value) in values.iter().enumerate() {
        rotated[relative_slot(viewer, slot)] = *value;
    }
    rotated
}

/// `known[viewer][source]` holds the cards `viewer` knows `source` to hold.
///
/// A player's own row is exactly the hand dealt to them. Rows for other sources only
/// grow, via cards shown while disproving.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardKnowledge {
    known: [[CardSet; MAX_PLAYERS]; MAX_PLAYERS],
}

impl CardKnowledge {
    pub fn clear(&mut self) {
        self.known = Default::default();
    }

    pub(crate) fn deal(&mut self, player: usize, card: Card) {
        self.known[player][player].insert(card);
    }

    /// Records that `viewer` has seen `source` holding `card`. Returns false if already known.
    pub(crate) fn reveal(&mut self, viewer: usize, source: usize, card: Card) -> bool {
        self.known[viewer][source].insert(card)
    }

    pub fn hand(&self, player: usize) -> CardSet {
        self.known[player][player]
    }

    pub fn knows(&self, viewer: usize, source: usize, card: Card) -> bool {
        self.known[viewer][source].contains(card)
    }

    pub fn row(&self, viewer: usize) -> &[CardSet; MAX_PLAYERS] {
        &self.known[viewer]
    }

    /// Every card `viewer` has located, in any hand.
    pub fn located_cards(&self, viewer: usize) -> CardSet {
        self.known[viewer]
            .iter()
            .fold(CardSet::empty(), |acc, set| acc.union(*set))
    }
}

/// Everything one player may see, indexed relative to that player.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerKnowledge {
    pub step_kind: StepKind,
    /// Whether the viewer is the one who has to act.
    pub to_act: bool,
    pub die_roll: u8,
    pub active_players: [bool; MAX_PLAYERS],
    pub false_accusers: [bool; MAX_PLAYERS],
    pub positions: [CellId; MAX_PLAYERS],
    pub room_distances: [[u16; ROOM_DISTANCE_WIDTH]; MAX_PLAYERS],
    /// Most recent first.
    pub suggestions: Vec<SuggestionRecord>,
    pub card_locations: [CardSet; MAX_PLAYERS],
}

impl PlayerKnowledge {
    pub fn hand(&self) -> CardSet {
        self.card_locations[0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Room, Weapon};

    #[test]
    fn relative_slot_puts_viewer_first() {
        for viewer in 0..MAX_PLAYERS {
            assert_eq!(relative_slot(viewer, viewer), 0);
            assert_eq!(relative_slot(viewer, (viewer + 1) % MAX_PLAYERS), 1);
        }
        assert_eq!(relative_slot(3, 1), 4);
    }

    #[test]
    fn rotation_is_a_permutation() {
        let values = [10, 11, 12, 13, 14, 15];
        assert_eq!(rotate_to_viewer(2, &values), [12, 13, 14, 15, 10, 11]);
        assert_eq!(rotate_to_viewer(0, &values), values);
    }

    #[test]
    fn reveals_accumulate() {
        let mut knowledge = CardKnowledge::default();
        knowledge.deal(1, Card::from(Room::Hall));
        assert!(knowledge.reveal(0, 1, Card::from(Room::Hall)));
        assert!(!knowledge.reveal(0, 1, Card::from(Room::Hall)));
        knowledge.reveal(0, 2, Card::from(Weapon::Knife));
        assert_eq!(knowledge.located_cards(0).len(), 2);
        assert!(knowledge.hand(0).is_empty());
        assert!(knowledge.knows(0, 1, Card::from(Room::Hall)));
    }
}
