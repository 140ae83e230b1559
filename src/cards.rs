use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{CardKind, NUM_PEOPLE, NUM_ROOMS, NUM_WEAPONS, Person, Room, Weapon};

pub const DECK_SIZE: usize = NUM_PEOPLE + NUM_WEAPONS + NUM_ROOMS;
/// Number of distinct (person, weapon, room) triples.
pub const SUGGESTION_SPACE: usize = NUM_PEOPLE * NUM_WEAPONS * NUM_ROOMS;

const WEAPON_OFFSET: usize = NUM_PEOPLE;
const ROOM_OFFSET: usize = NUM_PEOPLE + NUM_WEAPONS;

/// A card identified by its position in the deck: people, then weapons, then rooms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Card(u8);

impl Card {
    pub fn from_index(index: usize) -> Option<Card> {
        (index < DECK_SIZE).then_some(Card(index as u8))
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn kind(self) -> CardKind {
        match self.index() {
            i if i < WEAPON_OFFSET => CardKind::Person,
            i if i < ROOM_OFFSET => CardKind::Weapon,
            _ => CardKind::Room,
        }
    }

    pub fn as_person(self) -> Option<Person> {
        Person::from_index(self.index())
    }

    pub fn as_weapon(self) -> Option<Weapon> {
        self.index()
            .checked_sub(WEAPON_OFFSET)
            .and_then(Weapon::from_index)
    }

    pub fn as_room(self) -> Option<Room> {
        self.index().checked_sub(ROOM_OFFSET).and_then(Room::from_index)
    }
}

impl From<Person> for Card {
    fn from(person: Person) -> Self {
        Card(person.index() as u8)
    }
}

impl From<Weapon> for Card {
    fn from(weapon: Weapon) -> Self {
        Card((WEAPON_OFFSET + weapon.index()) as u8)
    }
}

impl From<Room> for Card {
    fn from(room: Room) -> Self {
        Card((ROOM_OFFSET + room.index()) as u8)
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(person) = self.as_person() {
            write!(f, "{person}")
        } else if let Some(weapon) = self.as_weapon() {
            write!(f, "{weapon}")
        } else if let Some(room) = self.as_room() {
            write!(f, "{room}")
        } else {
            write!(f, "CARD_{}", self.0)
        }
    }
}

pub const DECK: [Card; DECK_SIZE] = {
    let mut deck = [Card(0); DECK_SIZE];
    let mut i = 0;
    while i < DECK_SIZE {
        deck[i] = Card(i as u8);
        i += 1;
    }
    deck
};

/// Set of cards as a bitset over deck indices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardSet(u32);

impl CardSet {
    pub const fn empty() -> Self {
        CardSet(0)
    }

    pub fn insert(&mut self, card: Card) -> bool {
        let was_present = self.contains(card);
        self.0 |= 1 << card.index();
        !was_present
    }

    pub fn contains(&self, card: Card) -> bool {
        self.0 & (1 << card.index()) != 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn union(self, other: CardSet) -> CardSet {
        CardSet(self.0 | other.0)
    }

    pub fn intersection(self, other: CardSet) -> CardSet {
        CardSet(self.0 & other.0)
    }

    pub fn iter(self) -> impl Iterator<Item = Card> {
        DECK.into_iter().filter(move |card| self.contains(*card))
    }

    /// Dense 0/1 view indexed by deck position.
    pub fn to_vector(self) -> [u8; DECK_SIZE] {
        let mut vector = [0; DECK_SIZE];
        for card in self.iter() {
            vector[card.index()] = 1;
        }
        vector
    }
}

impl FromIterator<Card> for CardSet {
    fn from_iter<I: IntoIterator<Item = Card>>(iter: I) -> Self {
        let mut set = CardSet::empty();
        for card in iter {
            set.insert(card);
        }
        set
    }
}

/// A (person, weapon, room) triple, used for suggestions, accusations and the envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Suggestion {
    pub person: Person,
    pub weapon: Weapon,
    pub room: Room,
}

impl Suggestion {
    pub fn new(person: Person, weapon: Weapon, room: Room) -> Self {
        Self {
            person,
            weapon,
            room,
        }
    }

    pub fn cards(&self) -> CardSet {
        [
            Card::from(self.person),
            Card::from(self.weapon),
            Card::from(self.room),
        ]
        .into_iter()
        .collect()
    }

    /// Position of this triple in the flattened person x weapon x room space.
    pub fn one_hot_index(&self) -> usize {
        (self.person.index() * NUM_WEAPONS + self.weapon.index()) * NUM_ROOMS + self.room.index()
    }

    pub fn from_one_hot_index(index: usize) -> Option<Suggestion> {
        if index >= SUGGESTION_SPACE {
            return None;
        }
        let room = Room::from_index(index % NUM_ROOMS)?;
        let weapon = Weapon::from_index((index / NUM_ROOMS) % NUM_WEAPONS)?;
        let person = Person::from_index(index / (NUM_ROOMS * NUM_WEAPONS))?;
        Some(Suggestion::new(person, weapon, room))
    }

    pub fn to_one_hot(&self) -> Vec<u8> {
        let mut one_hot = vec![0; SUGGESTION_SPACE];
        one_hot[self.one_hot_index()] = 1;
        one_hot
    }

    /// Decodes a one-hot vector; exactly one entry must be set.
    pub fn from_one_hot(one_hot: &[u8]) -> Option<Suggestion> {
        if one_hot.len() != SUGGESTION_SPACE {
            return None;
        }
        let mut set = one_hot.iter().enumerate().filter(|(_, v)| **v != 0);
        let (index, _) = set.next()?;
        if set.next().is_some() {
            return None;
        }
        Suggestion::from_one_hot_index(index)
    }

    pub fn to_deck_vector(&self) -> [u8; DECK_SIZE] {
        self.cards().to_vector()
    }

    /// Decodes a deck vector holding exactly one person, one weapon and one room.
    pub fn from_deck_vector(vector: &[u8]) -> Option<Suggestion> {
        if vector.len() != DECK_SIZE {
            return None;
        }
        let single = |range: std::ops::Range<usize>| -> Option<usize> {
            let mut hits = range.clone().filter(|i| vector[*i] != 0);
            let first = hits.next()?;
            hits.next().is_none().then_some(first - range.start)
        };
        Some(Suggestion::new(
            Person::from_index(single(0..WEAPON_OFFSET)?)?,
            Weapon::from_index(single(WEAPON_OFFSET..ROOM_OFFSET)?)?,
            Room::from_index(single(ROOM_OFFSET..DECK_SIZE)?)?,
        ))
    }
}

impl fmt::Display for Suggestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} with the {} in the {}", self.person, self.weapon, self.room)
    }
}

/// The hidden solution of a game.
pub type Envelope = Suggestion;
