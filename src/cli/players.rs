use crate::game::action::GameAction;
use crate::game::game::Game;
use crate::players::{BasePlayer, DeductivePlayer, RandomPlayer};
use crate::types::MAX_PLAYERS;

pub struct CliPlayer {
    pub code: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

pub const CLI_PLAYERS: &[CliPlayer] = &[
    CliPlayer {
        code: "R",
        name: "RandomPlayer",
        description: "Chooses actions at random.",
    },
    CliPlayer {
        code: "D",
        name: "DeductivePlayer",
        description: "Chases unseen cards and accuses once the envelope is certain. First param is EPSILON.",
    },
];

#[derive(Clone)]
pub enum PlayerInstance {
    Random(RandomPlayer),
    Deductive(DeductivePlayer),
}

impl PlayerInstance {
    pub fn name(&self) -> &'static str {
        match self {
            PlayerInstance::Random(_) => "Random",
            PlayerInstance::Deductive(_) => "Deductive",
        }
    }
}

impl BasePlayer for PlayerInstance {
    fn decide(&self, game: &Game, actions: &[GameAction]) -> Option<GameAction> {
        match self {
            PlayerInstance::Random(p) => p.decide(game, actions),
            PlayerInstance::Deductive(p) => p.decide(game, actions),
        }
    }
}

pub fn create_player(code: &str, seed: u64, params: &[&str]) -> Option<PlayerInstance> {
    match code {
        "R" => Some(PlayerInstance::Random(RandomPlayer::new(seed))),
        "D" => {
            let epsilon = params.first().and_then(|s| s.parse::<f64>().ok());
            Some(PlayerInstance::Deductive(DeductivePlayer::new(epsilon, seed)))
        }
        _ => None,
    }
}

/// One player per `CODE[:PARAM...]` key. Seeds derive from `game_seed` and the seat
/// alone. Returns the first unknown code on failure.
pub fn create_players<S: AsRef<str>>(
    keys: &[S],
    game_seed: u64,
) -> Result<Vec<PlayerInstance>, String> {
    keys.iter()
        .enumerate()
        .map(|(seat, key)| {
            let parts: Vec<&str> = key.as_ref().split(':').collect();
            let seed = game_seed
                .wrapping_mul(MAX_PLAYERS as u64)
                .wrapping_add(seat as u64);
            create_player(parts[0], seed, &parts[1..]).ok_or_else(|| parts[0].to_string())
        })
        .collect()
}

pub fn print_player_help() {
    println!("Player Legend:");
    println!("{:<5} {:<25} DESCRIPTION", "CODE", "PLAYER");
    println!("{}", "-".repeat(80));
    for player in CLI_PLAYERS {
        println!("{:<5} {:<25} {}", player.code, player.name, player.description);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Game, GameConfig};

    #[test]
    fn every_listed_code_builds_a_player() {
        for player in CLI_PLAYERS {
            assert!(create_player(player.code, 0, &[]).is_some());
        }
        assert!(create_player("X", 0, &[]).is_none());
    }

    #[test]
    fn unknown_key_is_reported() {
        assert_eq!(create_players(&["R", "Q:1", "R"], 0).err(), Some("Q".to_string()));
    }

    #[test]
    fn players_depend_only_on_the_game_seed() {
        let game = Game::new(GameConfig::default()).unwrap();
        let actions = game.state.legal_actions().actions();
        let keys = ["R", "D:1.0", "R"];

        let picks = |players: Vec<PlayerInstance>| -> Vec<Option<GameAction>> {
            players
                .iter()
                .flat_map(|player| (0..10).map(|_| player.decide(&game, &actions)))
                .collect()
        };

        // Building other games' players first must not shift this game's choices.
        let fresh = picks(create_players(&keys, 7).unwrap());
        let _ = create_players(&keys, 3).unwrap();
        let again = picks(create_players(&keys, 7).unwrap());
        assert_eq!(fresh, again);
    }
}
