//! Turn flow through move, suggestion, disproof and accusation.

use clue_engine::board::{Board, BoardError, CellId};
use clue_engine::cards::{Card, Suggestion};
use clue_engine::game::action::TRIPLE_ACTIONS_OFFSET;
use clue_engine::game::knowledge::relative_slot;
use clue_engine::game::{Accusation, GameAction, GameConfig, GameError, GameEvent, GameState};
use clue_engine::types::{Room, StepKind, Weapon};

fn new_state(seed: u64) -> GameState {
    GameState::new(GameConfig {
        seed,
        ..GameConfig::default()
    })
    .unwrap()
}

fn corridor_door(board: &Board, room: Room) -> (CellId, CellId) {
    board
        .doors_of(room)
        .iter()
        .find_map(|&door| {
            board
                .neighbours(door)
                .iter()
                .copied()
                .find(|&n| !board.is_door(n))
                .map(|outside| (door, outside))
        })
        .unwrap()
}

/// Puts the current player next to a door of `room` and walks in.
fn enter_room(state: &mut GameState, room: Room) -> CellId {
    let player = state.current_player();
    let (door, outside) = corridor_door(&state.board, room);
    state.board.set_location(player, outside).unwrap();
    assert_eq!(state.move_player(door, false).unwrap(), door);
    door
}

/// An accusation the current player is allowed to make that is certainly wrong.
fn wrong_accusation(state: &GameState) -> Suggestion {
    let envelope = *state.envelope();
    let seen = state
        .card_knowledge()
        .located_cards(state.current_player());
    let room = Room::ALL
        .into_iter()
        .find(|room| *room != envelope.room && !seen.contains(Card::from(*room)))
        .unwrap();
    Suggestion::new(envelope.person, envelope.weapon, room)
}

#[test]
fn test_new_game_starts_with_seat_zero_moving() {
    let state = new_state(42);
    assert_eq!(state.players(), &[0, 1, 2, 3, 4, 5]);
    assert_eq!(state.current_player(), 0);
    assert_eq!(state.current_step_kind(), StepKind::Move);
    assert!((1..=6).contains(&state.die_roll()));
    assert!(!state.game_over());
    assert_eq!(state.winner(), None);
    assert!(matches!(
        state.event_log().first(),
        Some(GameEvent::GameStarted { .. })
    ));
}

#[test]
fn test_legal_actions_are_idempotent() {
    let mut state = new_state(3);
    assert_eq!(state.legal_actions(), state.legal_actions());
    enter_room(&mut state, Room::Library);
    assert_eq!(state.legal_actions(), state.legal_actions());
    let legal = state.legal_actions();
    assert_eq!(legal.triples.len(), 36);
    assert!(legal.triples.iter().all(|triple| triple.room == Room::Library));
    assert!(!legal.moves.contains(&true));
    assert!(legal.disprove.is_empty());
}

#[test]
fn test_corridor_move_passes_the_turn() {
    let mut state = new_state(8);
    let legal = state.legal_actions();
    let target = legal
        .moves
        .iter()
        .enumerate()
        .find(|(idx, legal)| **legal && !state.board.is_door(*idx))
        .map(|(idx, _)| idx)
        .unwrap();
    state.move_player(target, false).unwrap();
    assert_eq!(state.board.position(0), target);
    assert_eq!(state.current_player(), 1);
    assert_eq!(state.current_step_kind(), StepKind::Move);
}

#[test]
fn test_illegal_moves_are_rejected() {
    let mut state = new_state(8);
    let cells = state.board.num_cells();
    assert!(matches!(
        state.move_player(cells, false),
        Err(GameError::Board(BoardError::PositionOutOfRange { .. }))
    ));
    let far = state.board.position(5);
    assert!(matches!(
        state.move_player(far, false),
        Err(GameError::IllegalMove(cell)) if cell == far
    ));
    assert!(matches!(
        state.move_player(9, true),
        Err(GameError::InvalidRoom(9))
    ));
    assert_eq!(state.current_player(), 0);
}

#[test]
fn test_move_towards_room_follows_the_die() {
    let mut state = new_state(12);
    let legal = state.legal_actions();
    let room = Room::ALL
        .into_iter()
        .find(|room| legal.rooms[room.index()])
        .unwrap();
    let cell = state.move_player(room.index(), true).unwrap();
    assert!(legal.moves[cell]);
}

#[test]
fn test_undisproved_suggestion_then_correct_accusation_wins() {
    let mut state = new_state(42);
    let envelope = *state.envelope();
    enter_room(&mut state, envelope.room);
    assert_eq!(state.current_step_kind(), StepKind::Suggestion);

    let disproof = state.make_suggestion(envelope).unwrap();
    assert_eq!(disproof.disprover, None);
    assert_eq!(disproof.cant_disprove.iter().collect::<Vec<_>>(), vec![1, 2, 3, 4, 5]);
    assert_eq!(state.current_player(), 0);
    assert_eq!(state.current_step_kind(), StepKind::Accusation);
    assert_eq!(state.board.which_room(envelope.person.slot()), Some(envelope.room));

    assert_eq!(
        state.make_accusation(Accusation::Accuse(envelope)).unwrap(),
        Some(true)
    );
    assert!(state.game_over());
    assert_eq!(state.winner(), Some(0));
    assert_eq!(state.losers(), vec![1, 2, 3, 4, 5]);
    assert!(state.legal_actions().is_empty());
    assert!(matches!(
        state.make_accusation(Accusation::Decline),
        Err(GameError::GameFinished)
    ));
}

#[test]
fn test_false_accusation_removes_the_player() {
    let mut state = new_state(42);
    let envelope = *state.envelope();
    enter_room(&mut state, envelope.room);
    state.make_suggestion(envelope).unwrap();

    let accusation = wrong_accusation(&state);
    assert_eq!(
        state.make_accusation(Accusation::Accuse(accusation)).unwrap(),
        Some(false)
    );
    assert!(state.is_false_accuser(0));
    assert!(!state.game_over());
    assert_eq!(state.current_player(), 1);
    assert_eq!(state.current_step_kind(), StepKind::Move);
}

#[test]
fn test_declining_passes_the_turn() {
    let mut state = new_state(5);
    let envelope = *state.envelope();
    enter_room(&mut state, envelope.room);
    state.make_suggestion(envelope).unwrap();
    assert_eq!(state.make_accusation(Accusation::Decline).unwrap(), None);
    assert!(!state.is_false_accuser(0));
    assert_eq!(state.current_player(), 1);
}

#[test]
fn test_disprover_shows_a_matching_card() {
    let mut state = new_state(21);
    let envelope = *state.envelope();
    let (weapon, holder) = Weapon::ALL
        .into_iter()
        .filter(|weapon| *weapon != envelope.weapon)
        .find_map(|weapon| {
            (1..6)
                .find(|&slot| state.hand(slot).contains(Card::from(weapon)))
                .map(|slot| (weapon, slot))
        })
        .unwrap();

    enter_room(&mut state, envelope.room);
    let suggestion = Suggestion::new(envelope.person, weapon, envelope.room);
    let disproof = state.make_suggestion(suggestion).unwrap();
    assert_eq!(disproof.disprover, Some(holder));
    assert_eq!(
        disproof.cant_disprove.iter().collect::<Vec<_>>(),
        (1..holder).collect::<Vec<_>>()
    );
    assert_eq!(state.current_player(), holder);
    assert_eq!(state.current_step_kind(), StepKind::DisproveSuggestion);
    assert_eq!(state.last_suggestor(), Some(0));

    let legal = state.legal_actions();
    assert_eq!(legal.disprove.iter().collect::<Vec<_>>(), vec![Card::from(weapon)]);

    let other = Card::from(envelope.room);
    assert!(matches!(
        state.show_player_card(holder, other),
        Err(GameError::CardNotHeld { .. })
    ));
    assert!(matches!(
        state.show_player_card(0, Card::from(weapon)),
        Err(GameError::ActionOutOfTurn { .. })
    ));

    let before = state.knowledge_score(0);
    state.show_player_card(holder, Card::from(weapon)).unwrap();
    assert_eq!(state.current_player(), 0);
    assert_eq!(state.current_step_kind(), StepKind::Accusation);
    assert_eq!(state.knowledge_score(0), before + 1);
    assert!(state.card_knowledge().knows(0, holder, Card::from(weapon)));

    let view = state.get_player_knowledge(0).unwrap();
    assert!(view.card_locations[holder].contains(Card::from(weapon)));
    assert!(view.to_act);

    // Other players only learn that a card changed hands.
    let bystander = (1..6).find(|&slot| slot != holder).unwrap();
    assert!(!state.card_knowledge().knows(bystander, holder, Card::from(weapon)));
    assert!(matches!(
        state.last_events(),
        [GameEvent::CardShown { disprover, suggestor: 0 }] if *disprover == holder
    ));
}

#[test]
fn test_knowledge_is_relative_to_the_viewer() {
    let mut state = new_state(42);
    let envelope = *state.envelope();
    enter_room(&mut state, envelope.room);
    state.make_suggestion(envelope).unwrap();

    for viewer in 0..6 {
        let view = state.get_player_knowledge(viewer).unwrap();
        assert_eq!(view.to_act, viewer == 0);
        assert_eq!(view.hand(), state.hand(viewer));
        assert_eq!(view.positions[0], state.board.position(viewer));
        assert_eq!(view.suggestions.len(), 1);
        assert_eq!(view.suggestions[0].suggestor, relative_slot(viewer, 0));
        assert_eq!(view.suggestions[0].suggestion, envelope);
    }
    assert!(matches!(
        state.get_player_knowledge(6),
        Err(GameError::InvalidPlayer(6))
    ));
}

#[test]
fn test_suggestion_must_name_the_current_room() {
    let mut state = new_state(4);
    let envelope = *state.envelope();
    enter_room(&mut state, envelope.room);
    let elsewhere = Room::ALL
        .into_iter()
        .find(|room| *room != envelope.room)
        .unwrap();
    let suggestion = Suggestion::new(envelope.person, envelope.weapon, elsewhere);
    assert!(matches!(
        state.make_suggestion(suggestion),
        Err(GameError::IllegalSuggestion)
    ));
    assert_eq!(state.current_step_kind(), StepKind::Suggestion);
}

#[test]
fn test_accusing_a_known_card_is_illegal() {
    let mut state = new_state(6);
    let envelope = *state.envelope();
    enter_room(&mut state, envelope.room);
    state.make_suggestion(envelope).unwrap();

    let held = state.hand(0).iter().next().unwrap();
    let mut accusation = envelope;
    if let Some(room) = held.as_room() {
        accusation.room = room;
    } else if let Some(person) = held.as_person() {
        accusation.person = person;
    } else if let Some(weapon) = held.as_weapon() {
        accusation.weapon = weapon;
    }
    assert!(matches!(
        state.make_accusation(Accusation::Accuse(accusation)),
        Err(GameError::IllegalAccusation(_))
    ));
    assert!(!state.is_false_accuser(0));
}

#[test]
fn test_everyone_accusing_wrongly_abandons_the_game() {
    let mut state = new_state(17);
    state.new_game(&[0, 2, 4]).unwrap();
    let envelope = *state.envelope();

    for expected in [0, 2, 4] {
        assert_eq!(state.current_player(), expected);
        enter_room(&mut state, envelope.room);
        state.make_suggestion(envelope).unwrap();
        let accusation = wrong_accusation(&state);
        state.make_accusation(Accusation::Accuse(accusation)).unwrap();
    }

    assert!(state.game_over());
    assert_eq!(state.winner(), None);
    assert!(state.losers().is_empty());
    assert!(matches!(state.event_log().last(), Some(GameEvent::GameAbandoned)));
}

#[test]
fn test_step_accepts_flat_actions() {
    let mut state = new_state(42);
    let envelope = *state.envelope();
    let (door, outside) = corridor_door(&state.board, envelope.room);
    state.board.set_location(0, outside).unwrap();

    let outcome = state.step(GameAction::Move { cell: door }).unwrap();
    assert!(!outcome.done);
    assert!(matches!(
        outcome.events.as_slice(),
        [GameEvent::Moved { player: 0, .. }, GameEvent::EnteredRoom { player: 0, room }]
            if *room == envelope.room
    ));

    let index = TRIPLE_ACTIONS_OFFSET + envelope.one_hot_index();
    let suggest = GameAction::from_index(index, state.current_step_kind()).unwrap();
    assert_eq!(suggest, GameAction::Suggest(envelope));
    assert!(state.legal_actions().contains(&suggest));
    state.step(suggest).unwrap();

    let accuse = GameAction::from_index(index, state.current_step_kind()).unwrap();
    let outcome = state.step(accuse).unwrap();
    assert!(outcome.done);
    assert!(matches!(
        outcome.events.last(),
        Some(GameEvent::GameWon { winner: 0, .. })
    ));
}

#[test]
fn test_event_log_can_be_switched_off() {
    let mut state = GameState::new(GameConfig {
        log_actions: false,
        ..GameConfig::default()
    })
    .unwrap();
    let envelope = *state.envelope();
    let (door, outside) = corridor_door(&state.board, envelope.room);
    state.board.set_location(0, outside).unwrap();

    let outcome = state.step(GameAction::Move { cell: door }).unwrap();
    assert!(!outcome.events.is_empty());
    assert!(state.event_log().is_empty());
}

#[test]
fn test_reset_keeps_the_seating() {
    let mut state = new_state(99);
    state.new_game(&[0, 1, 3, 5]).unwrap();
    enter_room(&mut state, Room::Study);
    state.reset().unwrap();
    assert_eq!(state.players(), &[0, 1, 3, 5]);
    assert_eq!(state.current_step_kind(), StepKind::Move);
    assert_eq!(state.board.position(0), state.board.start_position(0));
    assert!(state.suggestion_history().is_empty());
}

#[test]
fn test_history_is_most_recent_first() {
    let mut state = GameState::new(GameConfig {
        history_capacity: 2,
        ..GameConfig::default()
    })
    .unwrap();
    let envelope = *state.envelope();

    for _ in 0..3 {
        enter_room(&mut state, envelope.room);
        state.make_suggestion(envelope).unwrap();
        state.make_accusation(Accusation::Decline).unwrap();
    }

    let history = state.suggestion_history();
    assert_eq!(history.len(), 2);
    let suggestors: Vec<usize> = history.iter().map(|r| r.suggestor).collect();
    assert_eq!(suggestors, vec![2, 1]);
    assert_eq!(state.last_suggestor(), Some(2));
}
