use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

pub const NUM_PEOPLE: usize = 6;
pub const NUM_WEAPONS: usize = 6;
pub const NUM_ROOMS: usize = 9;
pub const MAX_PLAYERS: usize = NUM_PEOPLE;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    EnumIter,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Person {
    MissScarlet,
    ColonelMustard,
    MrsWhite,
    MrGreen,
    MrsPeacock,
    ProfessorPlum,
}

impl Person {
    pub const ALL: [Person; NUM_PEOPLE] = [
        Person::MissScarlet,
        Person::ColonelMustard,
        Person::MrsWhite,
        Person::MrGreen,
        Person::MrsPeacock,
        Person::ProfessorPlum,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Person> {
        Person::ALL.get(index).copied()
    }

    /// Player slot whose token represents this person.
    pub fn slot(self) -> usize {
        self.index()
    }

    /// Start-square code suffix used by the board layout (`s` + short id).
    pub fn short_id(self) -> &'static str {
        match self {
            Person::MissScarlet => "s",
            Person::ColonelMustard => "m",
            Person::MrsWhite => "w",
            Person::MrGreen => "g",
            Person::MrsPeacock => "mp",
            Person::ProfessorPlum => "pp",
        }
    }

    pub fn from_short_id(short_id: &str) -> Option<Person> {
        Person::ALL.into_iter().find(|p| p.short_id() == short_id)
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    EnumIter,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Weapon {
    Rope,
    LeadPipe,
    Knife,
    Wrench,
    Candlestick,
    Pistol,
}

impl Weapon {
    pub const ALL: [Weapon; NUM_WEAPONS] = [
        Weapon::Rope,
        Weapon::LeadPipe,
        Weapon::Knife,
        Weapon::Wrench,
        Weapon::Candlestick,
        Weapon::Pistol,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Weapon> {
        Weapon::ALL.get(index).copied()
    }
}

/// Rooms in deck order. Board layouts refer to them by their snake_case name.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    EnumIter,
)]
#[strum(serialize_all = "snake_case")]
pub enum Room {
    Hall,
    Lounge,
    DiningRoom,
    Kitchen,
    Ballroom,
    Conservatory,
    BilliardRoom,
    Library,
    Study,
}

impl Room {
    pub const ALL: [Room; NUM_ROOMS] = [
        Room::Hall,
        Room::Lounge,
        Room::DiningRoom,
        Room::Kitchen,
        Room::Ballroom,
        Room::Conservatory,
        Room::BilliardRoom,
        Room::Library,
        Room::Study,
    ];

    /// Corner rooms joined by secret passages.
    pub const SECRET_PASSAGES: [(Room, Room); 2] = [
        (Room::Lounge, Room::Conservatory),
        (Room::Study, Room::Kitchen),
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Room> {
        Room::ALL.get(index).copied()
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display, EnumIter,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum CardKind {
    Person,
    Weapon,
    Room,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display, EnumIter,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum StepKind {
    /// Choosing where to place your token.
    Move,
    /// Choosing a suggestion to make.
    Suggestion,
    /// Choosing which card disproves the last suggestion.
    DisproveSuggestion,
    /// Deciding whether to make an accusation.
    Accusation,
}

impl StepKind {
    pub const ALL: [StepKind; 4] = [
        StepKind::Move,
        StepKind::Suggestion,
        StepKind::DisproveSuggestion,
        StepKind::Accusation,
    ];
}
