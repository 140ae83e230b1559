use std::io::Write;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use clap::Parser;
use clue_engine::cli::{PlayerInstance, StatisticsAccumulator, create_players, print_player_help};
use clue_engine::game::{AccusationPolicy, Game, GameConfig};

#[derive(Debug, Parser, Clone)]
#[command(name = "clue-sim")]
#[command(about = "Clue Simulator - Play out games between different player strategies")]
struct Args {
    /// Number of games to play
    #[arg(short = 'n', long, default_value_t = 5)]
    num: u32,

    /// Comma-separated player codes, one per seat (e.g., D,R,R or D:0.1,D,R,R)
    /// Use ':' to set player-specific params
    #[arg(long, default_value = "D,R,R,R")]
    players: String,

    /// Random seed for reproducibility
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Only the first seat may accuse before locating this many cards
    #[arg(long)]
    min_known: Option<usize>,

    /// Print each game's event log as a JSON line
    #[arg(long)]
    json: bool,

    /// Show player codes and exit
    #[arg(long)]
    help_players: bool,

    /// Silence console output
    #[arg(long)]
    quiet: bool,

    /// Number of worker threads for parallel execution
    #[arg(long, default_value_t = 1)]
    workers: usize,
}

fn main() {
    let args = Args::parse();

    if args.help_players {
        print_player_help();
        return;
    }

    let player_keys: Vec<String> = args.players.split(',').map(str::to_string).collect();
    if !(3..=6).contains(&player_keys.len()) {
        eprintln!("Error: Must specify 3-6 players");
        std::process::exit(1);
    }
    let players = create_players(&player_keys, 0).unwrap_or_else(|code| {
        eprintln!("Error: Unknown player code '{}'", code);
        eprintln!("Use --help-players to see available codes");
        std::process::exit(1);
    });

    let mut stats = StatisticsAccumulator::new();
    if args.workers > 1 {
        run_parallel_simulations(&args, &player_keys, &mut stats);
    } else {
        run_sequential_simulations(&args, &player_keys, &mut stats);
    }

    if !args.quiet {
        print_summary(&stats, &players);
    }
}

fn config_for(args: &Args, num_players: usize, game_idx: u64) -> GameConfig {
    GameConfig {
        max_players: num_players,
        seed: game_seed(args, game_idx),
        accusation_policy: match args.min_known {
            Some(min_known) => AccusationPolicy::RequireKnownCards { min_known },
            None => AccusationPolicy::Open,
        },
        log_actions: true,
        ..GameConfig::default()
    }
}

fn game_seed(args: &Args, game_idx: u64) -> u64 {
    args.seed.wrapping_add(game_idx)
}

fn play_one(args: &Args, keys: &[String], game_idx: u64) -> Option<(Game, std::time::Duration)> {
    let players = match create_players(keys, game_seed(args, game_idx)) {
        Ok(players) => players,
        Err(code) => {
            eprintln!("Error: Unknown player code '{}'", code);
            return None;
        }
    };
    let start = Instant::now();
    let mut game = match Game::new(config_for(args, players.len(), game_idx)) {
        Ok(game) => game,
        Err(err) => {
            eprintln!("Error: {}", err);
            return None;
        }
    };
    if let Err(err) = game.play(&players) {
        eprintln!("Game {} stopped: {}", game_idx + 1, err);
    }
    Some((game, start.elapsed()))
}

fn run_sequential_simulations(
    args: &Args,
    keys: &[String],
    stats: &mut StatisticsAccumulator,
) {
    for game_idx in 0..args.num {
        let Some((game, duration)) = play_one(args, keys, u64::from(game_idx)) else {
            return;
        };
        stats.after(&game, duration);

        if args.json {
            match serde_json::to_string(game.state.event_log()) {
                Ok(line) => println!("{}", line),
                Err(err) => eprintln!("Error: {}", err),
            }
            continue;
        }

        if !args.quiet {
            let last_n = 10;
            if game_idx < last_n || game_idx >= args.num.saturating_sub(last_n) {
                let winner_str = game
                    .winner()
                    .map(|seat| format!("seat {}", seat))
                    .unwrap_or_else(|| "None".to_string());
                println!(
                    "Game {:>4}: Envelope={}, Winner={:>7}, Ticks={:>4}, Duration={:?}",
                    game_idx + 1,
                    game.state.envelope(),
                    winner_str,
                    game.ticks,
                    duration
                );
            } else if (game_idx + 1) % 100 == 0 {
                print!(".");
                let _ = std::io::stdout().flush();
            }
        }
    }
}

fn run_parallel_simulations(args: &Args, keys: &[String], stats: &mut StatisticsAccumulator) {
    let args = Arc::new(args.clone());
    let keys = Arc::new(keys.to_vec());

    let mut handles = Vec::new();
    let games_per_worker = args.num as usize / args.workers;
    let remainder = args.num as usize % args.workers;

    for worker_id in 0..args.workers {
        let args_clone = Arc::clone(&args);
        let keys_clone = Arc::clone(&keys);

        let num_games = if worker_id < remainder {
            games_per_worker + 1
        } else {
            games_per_worker
        };

        let handle = thread::spawn(move || {
            let mut local_stats = StatisticsAccumulator::new();
            let start_idx = worker_id * games_per_worker + worker_id.min(remainder);

            for local_idx in 0..num_games {
                let game_idx = (start_idx + local_idx) as u64;
                if let Some((game, duration)) = play_one(&args_clone, &keys_clone, game_idx) {
                    local_stats.after(&game, duration);
                }
            }
            local_stats
        });

        handles.push(handle);
    }

    for handle in handles {
        let Ok(worker_stats) = handle.join() else {
            eprintln!("Error: worker panicked");
            continue;
        };
        let worker = worker_stats.stats;
        for (seat, wins) in worker.wins {
            *stats.stats.wins.entry(seat).or_insert(0) += wins;
        }
        for (seat, count) in worker.false_accusations {
            *stats.stats.false_accusations.entry(seat).or_insert(0) += count;
        }
        stats.stats.games += worker.games;
        stats.stats.abandoned += worker.abandoned;
        stats.stats.unfinished += worker.unfinished;
        stats.stats.total_ticks += worker.total_ticks;
        stats.stats.total_suggestions += worker.total_suggestions;
        stats.stats.total_duration += worker.total_duration;
    }
}

fn print_summary(stats: &StatisticsAccumulator, players: &[PlayerInstance]) {
    println!("\n{}", "=".repeat(80));
    println!("SIMULATION SUMMARY");
    println!("{}", "=".repeat(80));

    println!("\nPlayer Summary:");
    println!(
        "{:<18} {:<10} {:<12} {:<12}",
        "Player", "Wins", "Win Rate", "False Acc."
    );
    println!("{}", "-".repeat(54));

    for (seat, player) in players.iter().enumerate() {
        let wins = stats.stats.wins.get(&seat).copied().unwrap_or(0);
        let win_rate = if stats.stats.games > 0 {
            (wins as f64 / stats.stats.games as f64) * 100.0
        } else {
            0.0
        };
        let false_accusations = stats
            .stats
            .false_accusations
            .get(&seat)
            .copied()
            .unwrap_or(0);

        println!(
            "{:<18} {:<10} {:<11.1}% {:<12}",
            format!("{} (seat {})", player.name(), seat),
            wins,
            win_rate,
            false_accusations
        );
    }

    println!("\nGame Summary:");
    println!("  Total Games: {}", stats.stats.games);
    println!("  Abandoned: {}", stats.stats.abandoned);
    println!("  Unfinished: {}", stats.stats.unfinished);
    println!("  Avg Ticks: {:.2}", stats.stats.get_avg_ticks());
    println!("  Avg Suggestions: {:.2}", stats.stats.get_avg_suggestions());
    println!("  Avg Duration: {:.2?}", stats.stats.get_avg_duration());
}
