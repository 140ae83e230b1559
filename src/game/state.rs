use itertools::iproduct;
use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};
use serde::{Deserialize, Serialize};

use crate::{
    board::{Board, BoardError, CellId, ROOM_DISTANCE_WIDTH, UNREACHABLE},
    cards::{Card, CardSet, DECK, Envelope, Suggestion},
    types::{MAX_PLAYERS, NUM_PEOPLE, NUM_ROOMS, NUM_WEAPONS, Person, Room, StepKind, Weapon},
};

use super::{
    action::{Accusation, GameAction, LegalActions, SuggestionMask},
    history::{DEFAULT_HISTORY_CAPACITY, PlayerSet, SuggestionHistory, SuggestionRecord},
    knowledge::{CardKnowledge, PlayerKnowledge, rotate_to_viewer},
};

pub const MIN_PLAYERS: usize = 3;

/// Who may accuse. `RequireKnownCards` is a house rule: every seat but the first must
/// have located at least `min_known` cards before any accusation becomes legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccusationPolicy {
    Open,
    RequireKnownCards { min_known: usize },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    pub max_players: usize,
    pub seed: u64,
    pub history_capacity: usize,
    pub accusation_policy: AccusationPolicy,
    pub log_actions: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            max_players: MAX_PLAYERS,
            seed: 42,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            accusation_policy: AccusationPolicy::Open,
            log_actions: true,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), GameError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&self.max_players) {
            return Err(GameError::InvalidPlayerCount(self.max_players));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("player count {0} must be between 3 and 6")]
    InvalidPlayerCount(usize),
    #[error("seat 0 must be present and seated first")]
    MissingFirstSeat,
    #[error("seat {0} listed more than once")]
    DuplicateSeat(usize),
    #[error("invalid player index {0}")]
    InvalidPlayer(usize),
    #[error("game already completed")]
    GameFinished,
    #[error("expected a {expected} step but the game is at {actual}")]
    WrongStep { expected: StepKind, actual: StepKind },
    #[error("action by player {actual} but expected {expected}")]
    ActionOutOfTurn { expected: usize, actual: usize },
    #[error("cell {0} is not a legal destination")]
    IllegalMove(CellId),
    #[error("room index {0} out of range")]
    InvalidRoom(usize),
    #[error("cannot head towards {0}")]
    UnreachableRoom(Room),
    #[error("suggestion must name the room the suggestor is in")]
    IllegalSuggestion,
    #[error("accusation {0} is not allowed")]
    IllegalAccusation(Suggestion),
    #[error("no suggestion is waiting to be disproved")]
    NoPendingSuggestion,
    #[error("player {player} cannot show {card}")]
    CardNotHeld { player: usize, card: Card },
    #[error("no player is eligible to take a turn")]
    NoEligiblePlayer,
    #[error(transparent)]
    Board(#[from] BoardError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    GameStarted {
        players: Vec<usize>,
        first_roll: u8,
    },
    Moved {
        player: usize,
        from: CellId,
        to: CellId,
    },
    EnteredRoom {
        player: usize,
        room: Room,
    },
    SuggestionMade {
        suggestor: usize,
        suggestion: Suggestion,
    },
    TokenSummoned {
        person: Person,
        room: Room,
    },
    CouldNotDisprove {
        player: usize,
    },
    DisproverFound {
        player: usize,
    },
    CardShown {
        disprover: usize,
        suggestor: usize,
    },
    AccusationDeclined {
        player: usize,
    },
    FalseAccusation {
        player: usize,
        accusation: Suggestion,
    },
    GameWon {
        winner: usize,
        losers: Vec<usize>,
    },
    GameAbandoned,
    TurnAdvanced {
        next_player: usize,
        die_roll: u8,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepOutcome {
    pub events: Vec<GameEvent>,
    pub done: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Disproof {
    pub cant_disprove: PlayerSet,
    pub disprover: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct GameState {
    pub config: GameConfig,
    pub board: Board,
    players: Vec<usize>,
    active: [bool; MAX_PLAYERS],
    false_accusers: [bool; MAX_PLAYERS],
    envelope: Envelope,
    knowledge: CardKnowledge,
    history: SuggestionHistory,
    last_suggestion: Option<SuggestionRecord>,
    current_player: usize,
    step_kind: StepKind,
    die_roll: u8,
    game_over: bool,
    winner: Option<usize>,
    losers: PlayerSet,
    events: Vec<GameEvent>,
    pending_events: Vec<GameEvent>,
    rng: StdRng,
}

impl GameState {
    pub fn new(config: GameConfig) -> Result<Self, GameError> {
        Self::with_board(config, Board::classic())
    }

    pub fn with_board(config: GameConfig, board: Board) -> Result<Self, GameError> {
        config.validate()?;
        let seats: Vec<usize> = (0..config.max_players).collect();
        let mut state = Self {
            rng: StdRng::seed_from_u64(config.seed),
            history: SuggestionHistory::new(config.history_capacity),
            config,
            board,
            players: Vec::new(),
            active: [false; MAX_PLAYERS],
            false_accusers: [false; MAX_PLAYERS],
            envelope: Suggestion::new(Person::MissScarlet, Weapon::Rope, Room::Hall),
            knowledge: CardKnowledge::default(),
            last_suggestion: None,
            current_player: 0,
            step_kind: StepKind::Move,
            die_roll: 1,
            game_over: false,
            winner: None,
            losers: PlayerSet::empty(),
            events: Vec::new(),
            pending_events: Vec::new(),
        };
        state.new_game(&seats)?;
        Ok(state)
    }

    pub fn reseed(&mut self, seed: u64) {
        self.config.seed = seed;
        self.rng = StdRng::seed_from_u64(seed);
    }

    pub fn reset(&mut self) -> Result<(), GameError> {
        let players = self.players.clone();
        self.new_game(&players)
    }

    pub fn pick_players(&mut self) -> Vec<usize> {
        let count = self.rng.gen_range(MIN_PLAYERS..=self.config.max_players);
        let mut others: Vec<usize> = (1..self.config.max_players).collect();
        others.shuffle(&mut self.rng);
        others.truncate(count - 1);
        others.sort_unstable();
        let mut players = vec![0];
        players.extend(others);
        players
    }

    pub fn new_game(&mut self, players: &[usize]) -> Result<(), GameError> {
        self.validate_seating(players)?;
        self.pending_events.clear();

        self.players = players.to_vec();
        self.active = [false; MAX_PLAYERS];
        for &slot in players {
            self.active[slot] = true;
        }
        self.false_accusers = [false; MAX_PLAYERS];

        self.envelope = Suggestion::new(
            Person::ALL[self.rng.gen_range(0..NUM_PEOPLE)],
            Weapon::ALL[self.rng.gen_range(0..NUM_WEAPONS)],
            Room::ALL[self.rng.gen_range(0..NUM_ROOMS)],
        );

        let solution = self.envelope.cards();
        let mut remaining: Vec<Card> = DECK
            .into_iter()
            .filter(|card| !solution.contains(*card))
            .collect();
        remaining.shuffle(&mut self.rng);

        self.knowledge.clear();
        for (i, card) in remaining.into_iter().enumerate() {
            let player = self.players[i % self.players.len()];
            self.knowledge.deal(player, card);
        }

        self.history = SuggestionHistory::new(self.config.history_capacity);
        self.last_suggestion = None;
        self.board.reset_positions();

        self.game_over = false;
        self.winner = None;
        self.losers = PlayerSet::empty();
        self.events.clear();

        self.current_player = 0;
        self.step_kind = StepKind::Move;
        self.die_roll = self.roll_die();
        self.record(GameEvent::GameStarted {
            players: self.players.clone(),
            first_roll: self.die_roll,
        });
        Ok(())
    }

    fn validate_seating(&self, players: &[usize]) -> Result<(), GameError> {
        if !(MIN_PLAYERS..=self.config.max_players).contains(&players.len()) {
            return Err(GameError::InvalidPlayerCount(players.len()));
        }
        if players.first() != Some(&0) {
            return Err(GameError::MissingFirstSeat);
        }
        let mut seen = PlayerSet::empty();
        for &slot in players {
            if slot >= self.config.max_players {
                return Err(GameError::InvalidPlayer(slot));
            }
            if seen.contains(slot) {
                return Err(GameError::DuplicateSeat(slot));
            }
            seen.insert(slot);
        }
        Ok(())
    }

    fn roll_die(&mut self) -> u8 {
        self.rng.gen_range(1..=6)
    }

    fn record(&mut self, event: GameEvent) {
        if self.config.log_actions {
            self.events.push(event.clone());
        }
        self.pending_events.push(event);
    }

    fn expect_step(&self, expected: StepKind) -> Result<(), GameError> {
        if self.game_over {
            return Err(GameError::GameFinished);
        }
        if self.step_kind != expected {
            return Err(GameError::WrongStep {
                expected,
                actual: self.step_kind,
            });
        }
        Ok(())
    }

    pub fn step(&mut self, action: GameAction) -> Result<StepOutcome, GameError> {
        match action {
            GameAction::Move { cell } => self.move_player(cell, false).map(|_| ())?,
            GameAction::MoveTowards { room } => self.move_player(room.index(), true).map(|_| ())?,
            GameAction::Suggest(suggestion) => self.make_suggestion(suggestion).map(|_| ())?,
            GameAction::ShowCard { card } => self.show_player_card(self.current_player, card)?,
            GameAction::Accuse(accusation) => self.make_accusation(accusation).map(|_| ())?,
        }
        Ok(StepOutcome {
            events: self.pending_events.clone(),
            done: self.game_over,
        })
    }

    /// Moves the current player to `target`: a cell index, or with `towards_room` a room
    /// index to head for with the current die roll.
    pub fn move_player(&mut self, target: usize, towards_room: bool) -> Result<CellId, GameError> {
        self.expect_step(StepKind::Move)?;
        let player = self.current_player;

        let legal = self.legal_actions();
        let to = if towards_room {
            let room = Room::from_index(target).ok_or(GameError::InvalidRoom(target))?;
            if !legal.rooms[room.index()] {
                return Err(GameError::UnreachableRoom(room));
            }
            self.board.best_cell_towards(player, self.die_roll, room)
        } else {
            if target >= legal.moves.len() {
                return Err(BoardError::PositionOutOfRange {
                    index: target,
                    len: legal.moves.len(),
                }
                .into());
            }
            if !legal.moves[target] {
                return Err(GameError::IllegalMove(target));
            }
            target
        };

        self.pending_events.clear();
        let from = self.board.position(player);
        self.board.set_location(player, to)?;
        self.record(GameEvent::Moved { player, from, to });

        match self.board.room_of_cell(to) {
            Some(room) => {
                self.record(GameEvent::EnteredRoom { player, room });
                self.step_kind = StepKind::Suggestion;
            }
            None => self.advance_turn()?,
        }
        Ok(to)
    }

    pub fn make_suggestion(&mut self, suggestion: Suggestion) -> Result<Disproof, GameError> {
        self.expect_step(StepKind::Suggestion)?;
        let suggestor = self.current_player;
        if self.board.which_room(suggestor) != Some(suggestion.room) {
            return Err(GameError::IllegalSuggestion);
        }

        self.pending_events.clear();
        self.record(GameEvent::SuggestionMade {
            suggestor,
            suggestion,
        });
        let summoned = suggestion.person.slot();
        if self.board.which_room(summoned) != Some(suggestion.room) {
            self.board.move_to_room(summoned, suggestion.room);
            self.record(GameEvent::TokenSummoned {
                person: suggestion.person,
                room: suggestion.room,
            });
        }

        let cards = suggestion.cards();
        let mut cant_disprove = PlayerSet::empty();
        let mut disprover = None;
        for other in self.seating_after(suggestor) {
            if !self.knowledge.hand(other).intersection(cards).is_empty() {
                disprover = Some(other);
                break;
            }
            cant_disprove.insert(other);
            self.record(GameEvent::CouldNotDisprove { player: other });
        }

        let record = SuggestionRecord {
            suggestion,
            suggestor,
            cant_disprove,
            disprover,
        };
        self.history.push(record);
        self.last_suggestion = Some(record);

        match disprover {
            Some(player) => {
                self.record(GameEvent::DisproverFound { player });
                self.current_player = player;
                self.step_kind = StepKind::DisproveSuggestion;
            }
            None => self.step_kind = StepKind::Accusation,
        }

        Ok(Disproof {
            cant_disprove,
            disprover,
        })
    }

    pub fn show_player_card(&mut self, disprover: usize, card: Card) -> Result<(), GameError> {
        self.expect_step(StepKind::DisproveSuggestion)?;
        if disprover != self.current_player {
            return Err(GameError::ActionOutOfTurn {
                expected: self.current_player,
                actual: disprover,
            });
        }
        let record = self.last_suggestion.ok_or(GameError::NoPendingSuggestion)?;
        if !self.legal_disprove().contains(card) {
            return Err(GameError::CardNotHeld {
                player: disprover,
                card,
            });
        }

        self.pending_events.clear();
        self.knowledge.reveal(record.suggestor, disprover, card);
        self.record(GameEvent::CardShown {
            disprover,
            suggestor: record.suggestor,
        });
        self.current_player = record.suggestor;
        self.step_kind = StepKind::Accusation;
        Ok(())
    }

    /// `Some(true)` for a correct accusation, `Some(false)` for a wrong one, `None` when
    /// the player declined.
    pub fn make_accusation(&mut self, accusation: Accusation) -> Result<Option<bool>, GameError> {
        self.expect_step(StepKind::Accusation)?;
        let player = self.current_player;

        let triple = match accusation {
            Accusation::Decline => {
                self.pending_events.clear();
                self.record(GameEvent::AccusationDeclined { player });
                self.advance_turn()?;
                return Ok(None);
            }
            Accusation::Accuse(triple) => triple,
        };

        if !self.legal_accusations().contains(triple) {
            return Err(GameError::IllegalAccusation(triple));
        }

        self.pending_events.clear();
        if triple == self.envelope {
            let losers: PlayerSet = self
                .players
                .iter()
                .copied()
                .filter(|&other| other != player && !self.false_accusers[other])
                .collect();
            self.game_over = true;
            self.winner = Some(player);
            self.losers = losers;
            self.record(GameEvent::GameWon {
                winner: player,
                losers: losers.iter().collect(),
            });
            return Ok(Some(true));
        }

        self.false_accusers[player] = true;
        self.record(GameEvent::FalseAccusation {
            player,
            accusation: triple,
        });
        if self.eligible_players().is_empty() {
            self.game_over = true;
            self.record(GameEvent::GameAbandoned);
        } else {
            self.advance_turn()?;
        }
        Ok(Some(false))
    }

    fn advance_turn(&mut self) -> Result<(), GameError> {
        self.current_player = self.next_player()?;
        self.step_kind = StepKind::Move;
        self.die_roll = self.roll_die();
        self.record(GameEvent::TurnAdvanced {
            next_player: self.current_player,
            die_roll: self.die_roll,
        });
        Ok(())
    }

    pub fn next_player(&self) -> Result<usize, GameError> {
        let seat = self
            .seat_of(self.current_player)
            .ok_or(GameError::InvalidPlayer(self.current_player))?;
        let count = self.players.len();
        (1..=count)
            .map(|offset| self.players[(seat + offset) % count])
            .find(|&slot| !self.false_accusers[slot])
            .ok_or(GameError::NoEligiblePlayer)
    }

    fn seat_of(&self, slot: usize) -> Option<usize> {
        self.players.iter().position(|&p| p == slot)
    }

    fn seating_after(&self, slot: usize) -> Vec<usize> {
        let count = self.players.len();
        let seat = self.seat_of(slot).unwrap_or(0);
        (1..count)
            .map(|offset| self.players[(seat + offset) % count])
            .collect()
    }

    fn eligible_players(&self) -> Vec<usize> {
        self.players
            .iter()
            .copied()
            .filter(|&slot| !self.false_accusers[slot])
            .collect()
    }
}

impl GameState {
    pub fn legal_actions(&self) -> LegalActions {
        let mut legal = LegalActions::none(self.step_kind, self.board.num_cells());
        if self.game_over {
            return legal;
        }
        match self.step_kind {
            StepKind::Move => {
                legal.moves = self
                    .board
                    .legal_positions(self.current_player, self.die_roll);
                legal.rooms = self.legal_room_targets();
            }
            StepKind::Suggestion => legal.triples = self.legal_suggestions(),
            StepKind::DisproveSuggestion => legal.disprove = self.legal_disprove(),
            StepKind::Accusation => {
                legal.triples = self.legal_accusations();
                legal.decline_accusation = true;
            }
        }
        legal
    }

    fn legal_room_targets(&self) -> [bool; NUM_ROOMS] {
        let player = self.current_player;
        let here = self.board.which_room(player);
        let distances = self.board.room_distances(player);
        let mut rooms = [false; NUM_ROOMS];
        for room in Room::ALL {
            rooms[room.index()] =
                here != Some(room) && distances[NUM_ROOMS + room.index()] != UNREACHABLE;
        }
        rooms
    }

    fn legal_suggestions(&self) -> SuggestionMask {
        let Some(room) = self.board.which_room(self.current_player) else {
            return SuggestionMask::default();
        };
        iproduct!(Person::ALL, Weapon::ALL)
            .map(|(person, weapon)| Suggestion::new(person, weapon, room))
            .collect()
    }

    fn accusation_suppressed(&self, player: usize) -> bool {
        match self.config.accusation_policy {
            AccusationPolicy::Open => false,
            AccusationPolicy::RequireKnownCards { min_known } => {
                player != 0 && self.knowledge_score(player) < min_known
            }
        }
    }

    fn legal_accusations(&self) -> SuggestionMask {
        let player = self.current_player;
        if self.accusation_suppressed(player) {
            return SuggestionMask::default();
        }
        let seen = self.knowledge.located_cards(player);
        iproduct!(Person::ALL, Weapon::ALL, Room::ALL)
            .map(|(person, weapon, room)| Suggestion::new(person, weapon, room))
            .filter(|triple| triple.cards().intersection(seen).is_empty())
            .collect()
    }

    fn legal_disprove(&self) -> CardSet {
        self.last_suggestion
            .map(|record| {
                record
                    .suggestion
                    .cards()
                    .intersection(self.knowledge.hand(self.current_player))
            })
            .unwrap_or_default()
    }
}

impl GameState {
    pub fn current_player(&self) -> usize {
        self.current_player
    }

    pub fn current_step_kind(&self) -> StepKind {
        self.step_kind
    }

    pub fn die_roll(&self) -> u8 {
        self.die_roll
    }

    pub fn game_over(&self) -> bool {
        self.game_over
    }

    pub fn winner(&self) -> Option<usize> {
        self.winner
    }

    pub fn losers(&self) -> Vec<usize> {
        self.losers.iter().collect()
    }

    pub fn players(&self) -> &[usize] {
        &self.players
    }

    pub fn is_active(&self, slot: usize) -> bool {
        slot < MAX_PLAYERS && self.active[slot]
    }

    pub fn is_false_accuser(&self, slot: usize) -> bool {
        slot < MAX_PLAYERS && self.false_accusers[slot]
    }

    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    pub fn hand(&self, slot: usize) -> CardSet {
        self.knowledge.hand(slot)
    }

    pub fn card_knowledge(&self) -> &CardKnowledge {
        &self.knowledge
    }

    pub fn suggestion_history(&self) -> &SuggestionHistory {
        &self.history
    }

    pub fn last_suggestion(&self) -> Option<&SuggestionRecord> {
        self.last_suggestion.as_ref()
    }

    pub fn last_suggestor(&self) -> Option<usize> {
        self.last_suggestion.map(|record| record.suggestor)
    }

    pub fn knowledge_score(&self, player: usize) -> usize {
        self.knowledge.located_cards(player).len()
    }

    pub fn event_log(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn last_events(&self) -> &[GameEvent] {
        &self.pending_events
    }

    pub fn get_player_knowledge(&self, viewer: usize) -> Result<PlayerKnowledge, GameError> {
        if viewer >= MAX_PLAYERS {
            return Err(GameError::InvalidPlayer(viewer));
        }
        let mut distances = [[UNREACHABLE; ROOM_DISTANCE_WIDTH]; MAX_PLAYERS];
        for (slot, row) in distances.iter_mut().enumerate() {
            *row = self.board.room_distances(slot);
        }
        Ok(PlayerKnowledge {
            step_kind: self.step_kind,
            to_act: self.current_player == viewer && !self.game_over,
            die_roll: self.die_roll,
            active_players: rotate_to_viewer(viewer, &self.active),
            false_accusers: rotate_to_viewer(viewer, &self.false_accusers),
            positions: rotate_to_viewer(viewer, self.board.positions()),
            room_distances: rotate_to_viewer(viewer, &distances),
            suggestions: self
                .history
                .iter()
                .map(|record| record.relative_to(viewer))
                .collect(),
            card_locations: rotate_to_viewer(viewer, self.knowledge.row(viewer)),
        })
    }
}
