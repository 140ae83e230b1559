use clue_engine::board::{Board, BoardError};
use serde::Serialize;

#[derive(Serialize)]
struct ExportedCell {
    id: usize,
    row: usize,
    col: usize,
    room: Option<String>,
    door: Option<char>,
    neighbours: Vec<usize>,
    secret_passage: Option<usize>,
}

/// Dumps the cell graph as JSON. Reads a layout CSV when given a path, the bundled
/// board otherwise.
fn main() {
    let board = match std::env::args().nth(1) {
        Some(path) => std::fs::read_to_string(&path)
            .map_err(|err| err.to_string())
            .and_then(|text| Board::from_layout(&text).map_err(|err: BoardError| err.to_string())),
        None => Ok(Board::classic()),
    };
    let board = board.unwrap_or_else(|err| {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    });

    let cells: Vec<ExportedCell> = (0..board.num_cells())
        .filter_map(|id| {
            let cell = board.cell(id)?;
            Some(ExportedCell {
                id,
                row: cell.coord.row,
                col: cell.coord.col,
                room: cell.door.map(|door| door.room.to_string()),
                door: cell.door.map(|door| door.direction.code()),
                neighbours: cell.neighbours.to_vec(),
                secret_passage: board.secret_passage(id),
            })
        })
        .collect();

    match serde_json::to_string_pretty(&cells) {
        Ok(json) => println!("{}", json),
        Err(err) => {
            eprintln!("Error: {}", err);
            std::process::exit(1);
        }
    }
}
