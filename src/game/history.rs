use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::cards::{DECK_SIZE, Suggestion};
use crate::game::knowledge::relative_slot;
use crate::types::MAX_PLAYERS;

/// Encoded record layout: deck vector, suggestor one-hot, could-not-disprove mask,
/// disprover one-hot.
pub const SUGGESTION_RECORD_WIDTH: usize = DECK_SIZE + 3 * MAX_PLAYERS;
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

const SUGGESTOR_OFFSET: usize = DECK_SIZE;
const CANT_DISPROVE_OFFSET: usize = SUGGESTOR_OFFSET + MAX_PLAYERS;
const DISPROVER_OFFSET: usize = CANT_DISPROVE_OFFSET + MAX_PLAYERS;

/// Set of player slots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerSet(u8);

impl PlayerSet {
    pub const fn empty() -> Self {
        PlayerSet(0)
    }

    pub fn insert(&mut self, slot: usize) {
        debug_assert!(slot < MAX_PLAYERS);
        self.0 |= 1 << slot;
    }

    pub fn contains(&self, slot: usize) -> bool {
        slot < MAX_PLAYERS && self.0 & (1 << slot) != 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = usize> {
        (0..MAX_PLAYERS).filter(move |slot| self.contains(*slot))
    }

    pub fn to_vector(self) -> [u8; MAX_PLAYERS] {
        let mut vector = [0; MAX_PLAYERS];
        for slot in self.iter() {
            vector[slot] = 1;
        }
        vector
    }

    pub fn from_vector(vector: &[u8]) -> Self {
        vector
            .iter()
            .take(MAX_PLAYERS)
            .enumerate()
            .filter(|(_, v)| **v != 0)
            .map(|(slot, _)| slot)
            .collect()
    }

    /// Re-expresses every slot relative to `viewer`.
    pub fn relative_to(self, viewer: usize) -> Self {
        self.iter().map(|slot| relative_slot(viewer, slot)).collect()
    }
}

impl FromIterator<usize> for PlayerSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let mut set = PlayerSet::empty();
        for slot in iter {
            set.insert(slot);
        }
        set
    }
}

/// Public outcome of one suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionRecord {
    pub suggestion: Suggestion,
    pub suggestor: usize,
    /// Players, in turn order after the suggestor, who held none of the cards.
    pub cant_disprove: PlayerSet,
    pub disprover: Option<usize>,
}

impl SuggestionRecord {
    pub fn encode(&self) -> [u8; SUGGESTION_RECORD_WIDTH] {
        let mut record = [0; SUGGESTION_RECORD_WIDTH];
        record[..DECK_SIZE].copy_from_slice(&self.suggestion.to_deck_vector());
        record[SUGGESTOR_OFFSET + self.suggestor] = 1;
        record[CANT_DISPROVE_OFFSET..DISPROVER_OFFSET]
            .copy_from_slice(&self.cant_disprove.to_vector());
        if let Some(disprover) = self.disprover {
            record[DISPROVER_OFFSET + disprover] = 1;
        }
        record
    }

    pub fn decode(record: &[u8]) -> Option<Self> {
        if record.len() != SUGGESTION_RECORD_WIDTH {
            return None;
        }
        let suggestion = Suggestion::from_deck_vector(&record[..DECK_SIZE])?;
        let suggestors = PlayerSet::from_vector(&record[SUGGESTOR_OFFSET..CANT_DISPROVE_OFFSET]);
        if suggestors.len() != 1 {
            return None;
        }
        let disprovers = PlayerSet::from_vector(&record[DISPROVER_OFFSET..]);
        if disprovers.len() > 1 {
            return None;
        }
        Some(Self {
            suggestion,
            suggestor: suggestors.iter().next()?,
            cant_disprove: PlayerSet::from_vector(&record[CANT_DISPROVE_OFFSET..DISPROVER_OFFSET]),
            disprover: disprovers.iter().next(),
        })
    }

    pub fn relative_to(&self, viewer: usize) -> Self {
        Self {
            suggestion: self.suggestion,
            suggestor: relative_slot(viewer, self.suggestor),
            cant_disprove: self.cant_disprove.relative_to(viewer),
            disprover: self.disprover.map(|slot| relative_slot(viewer, slot)),
        }
    }
}

/// Fixed-capacity history, most recent first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestionHistory {
    records: VecDeque<SuggestionRecord>,
    capacity: usize,
}

impl SuggestionHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, record: SuggestionRecord) {
        if self.capacity == 0 {
            return;
        }
        if self.records.len() == self.capacity {
            self.records.pop_back();
        }
        self.records.push_front(record);
    }

    pub fn latest(&self) -> Option<&SuggestionRecord> {
        self.records.front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SuggestionRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// `capacity` encoded rows, most recent first, zero rows for unused slots.
    pub fn encode(&self) -> Vec<[u8; SUGGESTION_RECORD_WIDTH]> {
        let mut rows: Vec<_> = self.records.iter().map(SuggestionRecord::encode).collect();
        rows.resize(self.capacity, [0; SUGGESTION_RECORD_WIDTH]);
        rows
    }
}
