use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::coords::{Direction, GridCoord};
use crate::types::{MAX_PLAYERS, NUM_ROOMS, Person, Room};

mod distances;
pub mod grid;

pub use distances::{DistanceTable, UNREACHABLE};
pub use grid::{CLASSIC_LAYOUT, CellCode, decode_grid, parse_grid};

/// Index into the board's cell list. Doors occupy `0..num_doors`.
pub type CellId = usize;

pub const ROOM_DISTANCE_WIDTH: usize = 2 * NUM_ROOMS;

#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error("board layout is empty")]
    EmptyGrid,
    #[error("row {row} has {found} cells but expected {expected}")]
    RaggedGrid {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("unknown cell code {code:?} at ({row}, {col})")]
    UnknownCellCode { row: usize, col: usize, code: String },
    #[error("unknown room {0:?}")]
    UnknownRoom(String),
    #[error("unknown start square {0:?}")]
    UnknownStart(String),
    #[error("start square for {0} appears more than once")]
    DuplicateStart(Person),
    #[error("no start square for {0}")]
    MissingStart(Person),
    #[error("room {0} has no doors")]
    RoomWithoutDoors(Room),
    #[error("position {index} out of range for a board with {len} cells")]
    PositionOutOfRange { index: usize, len: usize },
    #[error("invalid player slot {0}")]
    InvalidPlayer(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Door {
    pub room: Room,
    pub direction: Direction,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cell {
    pub coord: GridCoord,
    pub door: Option<Door>,
    pub neighbours: SmallVec<[CellId; 4]>,
}

impl Cell {
    fn new(coord: GridCoord, door: Option<Door>) -> Self {
        Self {
            coord,
            door,
            neighbours: SmallVec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Board {
    cells: Vec<Cell>,
    num_doors: usize,
    location_map: HashMap<GridCoord, CellId>,
    room_doors: Vec<Vec<CellId>>,
    secret_passages: HashMap<CellId, CellId>,
    start_positions: [CellId; MAX_PLAYERS],
    positions: [CellId; MAX_PLAYERS],
    distances: DistanceTable,
}

static CLASSIC_BOARD: Lazy<Board> =
    Lazy::new(|| Board::from_layout(CLASSIC_LAYOUT).expect("bundled layout is valid"));

impl Board {
    pub fn classic() -> Self {
        CLASSIC_BOARD.clone()
    }

    pub fn from_layout(text: &str) -> Result<Self, BoardError> {
        Self::from_grid(&parse_grid(text))
    }

    pub fn from_grid<S: AsRef<str>>(grid: &[Vec<S>]) -> Result<Self, BoardError> {
        let codes = decode_grid(grid)?;

        let mut doors: Vec<Cell> = Vec::new();
        let mut squares: Vec<Cell> = Vec::new();
        let mut starts: [Option<GridCoord>; MAX_PLAYERS] = [None; MAX_PLAYERS];

        for (row, line) in codes.iter().enumerate() {
            for (col, code) in line.iter().enumerate() {
                let coord = GridCoord::new(row, col);
                match *code {
                    CellCode::Door { direction, room } => {
                        doors.push(Cell::new(coord, Some(Door { room, direction })));
                    }
                    CellCode::Start(person) => {
                        let slot = &mut starts[person.slot()];
                        if slot.is_some() {
                            return Err(BoardError::DuplicateStart(person));
                        }
                        *slot = Some(coord);
                        squares.push(Cell::new(coord, None));
                    }
                    CellCode::Square => squares.push(Cell::new(coord, None)),
                    CellCode::Empty | CellCode::Wall => {}
                }
            }
        }

        let num_doors = doors.len();
        let mut cells = doors;
        cells.extend(squares);

        let location_map: HashMap<GridCoord, CellId> = cells
            .iter()
            .enumerate()
            .map(|(idx, cell)| (cell.coord, idx))
            .collect();

        let mut room_doors = vec![Vec::new(); NUM_ROOMS];
        for (idx, cell) in cells.iter().enumerate().take(num_doors) {
            if let Some(door) = cell.door {
                room_doors[door.room.index()].push(idx);
            }
        }
        if let Some(room) = Room::ALL
            .into_iter()
            .find(|room| room_doors[room.index()].is_empty())
        {
            return Err(BoardError::RoomWithoutDoors(room));
        }

        let mut start_positions = [0; MAX_PLAYERS];
        for person in Person::ALL {
            let coord = starts[person.slot()].ok_or(BoardError::MissingStart(person))?;
            start_positions[person.slot()] = location_map[&coord];
        }

        let mut board = Self {
            cells,
            num_doors,
            location_map,
            room_doors,
            secret_passages: HashMap::new(),
            start_positions,
            positions: start_positions,
            distances: DistanceTable::default(),
        };
        board.connect_squares();
        board.connect_doors();
        board.secret_passages = board.build_secret_passages();
        board.distances = DistanceTable::build(&board);
        Ok(board)
    }

    fn connect(&mut self, a: CellId, b: CellId) {
        self.cells[a].neighbours.push(b);
        self.cells[b].neighbours.push(a);
    }

    fn square_at(&self, coord: Option<GridCoord>) -> Option<CellId> {
        coord
            .and_then(|c| self.location_map.get(&c).copied())
            .filter(|&idx| !self.is_door(idx))
    }

    fn connect_squares(&mut self) {
        for idx in self.num_doors..self.cells.len() {
            let coord = self.cells[idx].coord;
            for direction in [Direction::West, Direction::North] {
                if let Some(other) = self.square_at(coord.step(direction)) {
                    self.connect(idx, other);
                }
            }
        }
    }

    // Joins each door to the square it faces. Doors facing nothing are left for
    // secret passages.
    fn connect_doors(&mut self) {
        for idx in 0..self.num_doors {
            let cell = &self.cells[idx];
            let Some(door) = cell.door else { continue };
            if let Some(outside) = self.square_at(cell.coord.step(door.direction)) {
                self.connect(idx, outside);
            }
        }
    }

    fn passage_door(&self, room: Room) -> CellId {
        let doors = self.doors_of(room);
        doors
            .iter()
            .copied()
            .find(|&door| self.cells[door].neighbours.is_empty())
            .unwrap_or(doors[doors.len() - 1])
    }

    fn build_secret_passages(&self) -> HashMap<CellId, CellId> {
        let mut passages = HashMap::new();
        for (a, b) in Room::SECRET_PASSAGES {
            let door_a = self.passage_door(a);
            let door_b = self.passage_door(b);
            passages.insert(door_a, door_b);
            passages.insert(door_b, door_a);
        }
        passages
    }

    pub fn num_cells(&self) -> usize {
        self.cells.len()
    }

    pub fn num_doors(&self) -> usize {
        self.num_doors
    }

    pub fn cell(&self, idx: CellId) -> Option<&Cell> {
        self.cells.get(idx)
    }

    pub fn cell_at(&self, coord: GridCoord) -> Option<CellId> {
        self.location_map.get(&coord).copied()
    }

    pub fn neighbours(&self, idx: CellId) -> &[CellId] {
        &self.cells[idx].neighbours
    }

    pub fn is_door(&self, idx: CellId) -> bool {
        idx < self.num_doors
    }

    pub fn room_of_cell(&self, idx: CellId) -> Option<Room> {
        if self.is_door(idx) {
            self.cells[idx].door.map(|door| door.room)
        } else {
            None
        }
    }

    pub fn doors_of(&self, room: Room) -> &[CellId] {
        &self.room_doors[room.index()]
    }

    pub fn secret_passage(&self, door: CellId) -> Option<CellId> {
        self.secret_passages.get(&door).copied()
    }

    pub fn distances(&self) -> &DistanceTable {
        &self.distances
    }

    pub fn start_position(&self, player: usize) -> CellId {
        self.start_positions[player]
    }

    pub fn positions(&self) -> &[CellId; MAX_PLAYERS] {
        &self.positions
    }

    /// Per-slot accessors expect `player < MAX_PLAYERS` and panic otherwise. Slots coming
    /// from outside the game go through `set_location`, which checks.
    pub fn position(&self, player: usize) -> CellId {
        self.positions[player]
    }

    pub fn reset_positions(&mut self) {
        self.positions = self.start_positions;
    }

    pub fn position_matrix(&self) -> Vec<Vec<u8>> {
        self.positions
            .iter()
            .map(|&pos| {
                let mut row = vec![0; self.num_cells()];
                row[pos] = 1;
                row
            })
            .collect()
    }

    pub fn is_in_room(&self, player: usize) -> bool {
        self.is_door(self.positions[player])
    }

    pub fn which_room(&self, player: usize) -> Option<Room> {
        self.room_of_cell(self.positions[player])
    }

    pub fn set_location(&mut self, player: usize, idx: CellId) -> Result<(), BoardError> {
        if player >= MAX_PLAYERS {
            return Err(BoardError::InvalidPlayer(player));
        }
        if idx >= self.num_cells() {
            return Err(BoardError::PositionOutOfRange {
                index: idx,
                len: self.num_cells(),
            });
        }
        self.positions[player] = idx;
        Ok(())
    }

    pub fn move_to_room(&mut self, player: usize, room: Room) -> CellId {
        let door = self.doors_of(room)[0];
        self.positions[player] = door;
        door
    }

    /// Cells the player may finish on after moving exactly `throw` squares, or fewer when
    /// the walk ends in a room. A boxed-in player may only stay put.
    pub fn legal_positions(&self, player: usize, throw: u8) -> Vec<bool> {
        let mut legal = vec![false; self.num_cells()];
        let initial = self.positions[player];

        // Leaving a room: any door is a start, and none may be re-entered this turn.
        let (starts, exiting): (&[CellId], &[CellId]) = match self.room_of_cell(initial) {
            Some(room) => (self.doors_of(room), self.doors_of(room)),
            None => (std::slice::from_ref(&self.positions[player]), &[]),
        };

        for &door in exiting {
            if let Some(far_side) = self.secret_passage(door) {
                legal[far_side] = true;
            }
        }

        let mut visited = vec![false; self.num_cells()];
        for &start in starts {
            visited.fill(false);
            for &door in exiting {
                visited[door] = true;
            }
            for (other, &pos) in self.positions.iter().enumerate() {
                if other != player && !self.is_door(pos) {
                    visited[pos] = true;
                }
            }
            self.follow_path(start, start, throw, &mut visited, &mut legal);
        }

        if !legal.contains(&true) {
            legal[initial] = true;
        }
        legal
    }

    fn follow_path(
        &self,
        start: CellId,
        current: CellId,
        remaining: u8,
        visited: &mut [bool],
        legal: &mut [bool],
    ) {
        // Out of steps, or stepped into a room.
        if remaining == 0 || (current != start && self.is_door(current)) {
            legal[current] = true;
            return;
        }

        visited[current] = true;
        for &next in self.neighbours(current) {
            if !visited[next] {
                self.follow_path(start, next, remaining - 1, visited, legal);
            }
        }
        visited[current] = false;
    }

    fn reachable_cells(&self, player: usize, throw: u8) -> Vec<CellId> {
        self.legal_positions(player, throw)
            .into_iter()
            .enumerate()
            .filter_map(|(idx, legal)| legal.then_some(idx))
            .collect()
    }

    pub fn best_cell_towards(&self, player: usize, throw: u8, room: Room) -> CellId {
        let reachable = self.reachable_cells(player, throw);
        let nearest = reachable
            .iter()
            .copied()
            .min_by_key(|&idx| self.distances.direct(idx, room));
        match nearest {
            Some(idx) if self.distances.direct(idx, room) == 0 => idx,
            _ => reachable
                .iter()
                .copied()
                .min_by_key(|&idx| self.distances.via(idx, room))
                .unwrap_or(self.positions[player]),
        }
    }

    pub fn move_towards_room(&mut self, player: usize, throw: u8, room: Room) -> CellId {
        let target = self.best_cell_towards(player, throw, room);
        self.positions[player] = target;
        target
    }

    pub fn distances_after_throw(&self, player: usize, throw: u8) -> [u16; NUM_ROOMS] {
        let reachable = self.reachable_cells(player, throw);
        let mut best = [UNREACHABLE; NUM_ROOMS];
        for room in Room::ALL {
            best[room.index()] = reachable
                .iter()
                .map(|&idx| self.distances.direct(idx, room))
                .min()
                .unwrap_or(UNREACHABLE);
        }
        best
    }

    /// Direct then via-room distance from the player's location to every room. A player
    /// inside a room measures from whichever of its doors is closest.
    pub fn room_distances(&self, player: usize) -> [u16; ROOM_DISTANCE_WIDTH] {
        let pos = self.positions[player];
        let origins: &[CellId] = match self.room_of_cell(pos) {
            Some(room) => self.doors_of(room),
            None => std::slice::from_ref(&self.positions[player]),
        };
        let mut row = [UNREACHABLE; ROOM_DISTANCE_WIDTH];
        for room in Room::ALL {
            let direct = origins.iter().map(|&o| self.distances.direct(o, room)).min();
            let via = origins.iter().map(|&o| self.distances.via(o, room)).min();
            row[room.index()] = direct.unwrap_or(UNREACHABLE);
            row[NUM_ROOMS + room.index()] = via.unwrap_or(UNREACHABLE);
        }
        row
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doors_come_first() {
        let board = Board::classic();
        assert_eq!(board.num_doors(), 20);
        for idx in 0..board.num_cells() {
            assert_eq!(board.is_door(idx), board.cell(idx).unwrap().door.is_some());
        }
    }

    #[test]
    fn adjacency_is_symmetric() {
        let board = Board::classic();
        for idx in 0..board.num_cells() {
            for &next in board.neighbours(idx) {
                assert!(board.neighbours(next).contains(&idx));
            }
        }
    }

    #[test]
    fn corner_rooms_share_passages() {
        let board = Board::classic();
        for (a, b) in Room::SECRET_PASSAGES {
            let door_a = board.passage_door(a);
            let door_b = board.passage_door(b);
            assert_eq!(board.secret_passage(door_a), Some(door_b));
            assert_eq!(board.secret_passage(door_b), Some(door_a));
            assert!(board.neighbours(door_a).is_empty());
        }
        assert_eq!(board.secret_passage(board.doors_of(Room::Hall)[0]), None);
    }

    #[test]
    fn starts_are_squares() {
        let board = Board::classic();
        for person in Person::ALL {
            let start = board.start_position(person.slot());
            assert!(!board.is_door(start));
            assert_eq!(board.position(person.slot()), start);
        }
    }

    #[test]
    fn set_location_checks_range() {
        let mut board = Board::classic();
        let len = board.num_cells();
        assert!(matches!(
            board.set_location(0, len),
            Err(BoardError::PositionOutOfRange { index, .. }) if index == len
        ));
        assert!(matches!(
            board.set_location(MAX_PLAYERS, 0),
            Err(BoardError::InvalidPlayer(_))
        ));
        board.set_location(0, 3).unwrap();
        assert_eq!(board.position(0), 3);
    }

    #[test]
    #[should_panic]
    fn slot_past_the_last_seat_is_a_caller_bug() {
        let board = Board::classic();
        let _ = board.position(MAX_PLAYERS);
    }

    #[test]
    fn missing_rooms_are_reported() {
        let layout = ",,,\n,ss,sm,\n,sw,sg,\n,smp,spp,\n,,,\n";
        assert!(matches!(
            Board::from_layout(layout),
            Err(BoardError::RoomWithoutDoors(Room::Hall))
        ));
    }
}
