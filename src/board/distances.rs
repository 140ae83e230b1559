use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::board::{Board, CellId};
use crate::types::{NUM_ROOMS, Room};

/// Distance recorded for cells that cannot reach a room.
pub const UNREACHABLE: u16 = u16::MAX;

/// Shortest step counts from every cell to every room.
///
/// `direct` only walks corridors: entering any other room ends the walk. `via` treats
/// each room as a single node, so a path may enter a room through one door, leave through
/// another (or through a secret passage) and carry on.
#[derive(Debug, Clone, Default)]
pub struct DistanceTable {
    direct: Vec<[u16; NUM_ROOMS]>,
    via: Vec<[u16; NUM_ROOMS]>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Routing {
    Direct,
    ViaRooms,
}

impl DistanceTable {
    pub(crate) fn build(board: &Board) -> Self {
        let num_cells = board.num_cells();
        let mut direct = vec![[UNREACHABLE; NUM_ROOMS]; num_cells];
        let mut via = vec![[UNREACHABLE; NUM_ROOMS]; num_cells];

        for room in Room::ALL {
            let direct_pass = shortest_paths(board, room, Routing::Direct);
            let via_pass = shortest_paths(board, room, Routing::ViaRooms);
            for cell in 0..num_cells {
                direct[cell][room.index()] = direct_pass[cell];
                via[cell][room.index()] = via_pass[cell].min(direct_pass[cell]);
            }
        }

        Self { direct, via }
    }

    pub fn direct(&self, cell: CellId, room: Room) -> u16 {
        self.direct[cell][room.index()]
    }

    pub fn via(&self, cell: CellId, room: Room) -> u16 {
        self.via[cell][room.index()]
    }
}

/// Multi-source Dijkstra from every door of `target` over the cell graph.
fn shortest_paths(board: &Board, target: Room, routing: Routing) -> Vec<u16> {
    let mut dist = vec![UNREACHABLE; board.num_cells()];
    let mut heap = BinaryHeap::new();

    for &door in board.doors_of(target) {
        dist[door] = 0;
        heap.push(Reverse((0u16, door)));
    }

    while let Some(Reverse((d, cell))) = heap.pop() {
        if d > dist[cell] {
            continue;
        }

        let room_here = board.room_of_cell(cell);
        let mut relax = |next: CellId, cost: u16, heap: &mut BinaryHeap<Reverse<(u16, CellId)>>| {
            let candidate = d.saturating_add(cost);
            if candidate < dist[next] {
                dist[next] = candidate;
                heap.push(Reverse((candidate, next)));
            }
        };

        match (room_here, routing) {
            // Arriving at another room's door ends a direct walk.
            (Some(room), Routing::Direct) if room != target => continue,
            (Some(room), Routing::ViaRooms) => {
                for &door in board.doors_of(room) {
                    relax(door, 0, &mut heap);
                }
                if let Some(far_side) = board.secret_passage(cell) {
                    relax(far_side, 1, &mut heap);
                }
            }
            _ => {}
        }

        for &next in board.neighbours(cell) {
            relax(next, 1, &mut heap);
        }
    }

    dist
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doors_are_at_distance_zero_from_their_room() {
        let board = Board::classic();
        let table = board.distances();
        for room in Room::ALL {
            for &door in board.doors_of(room) {
                assert_eq!(table.direct(door, room), 0);
                assert_eq!(table.via(door, room), 0);
            }
        }
    }

    #[test]
    fn via_rooms_never_exceeds_direct() {
        let board = Board::classic();
        let table = board.distances();
        for cell in 0..board.num_cells() {
            for room in Room::ALL {
                assert!(table.via(cell, room) <= table.direct(cell, room));
            }
        }
    }

    #[test]
    fn every_walkable_square_reaches_every_room() {
        let board = Board::classic();
        let table = board.distances();
        for cell in board.num_doors()..board.num_cells() {
            for room in Room::ALL {
                assert_ne!(table.direct(cell, room), UNREACHABLE);
            }
        }
    }
}
