// Standalone replay tool for analyzing recorded snake games
//
// Usage:
//   cargo run --bin replay -- <record_file> [options]
//
// Options:
//   --all                  Replay all ticks
//   --ticks <t1,t2>        Replay specific ticks (comma-separated)
//   --validate <t:m,...>   Check the recorded moves against expected ones
//   --game <seed>          Only use the entries of one game
//   --seed <n>             Seed for replayed MCTS decisions (default: 0)
//   --verbose              Show detailed output for each tick
//   --config <path>        Path to Solver.toml (default: Solver.toml)

use std::env;
use std::process;

use snake_solver::config::Config;
use snake_solver::replay::ReplayEngine;
use snake_solver::types::Direction;

enum Mode {
    All,
    Ticks(String),
    Validate(String),
}

fn print_usage() {
    eprintln!("Snake Solver Replay Tool");
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("  replay <record_file> [OPTIONS]");
    eprintln!();
    eprintln!("OPTIONS:");
    eprintln!("  --all                   Replay all ticks in the record");
    eprintln!("  --ticks <T1,T2,...>     Replay specific ticks (comma-separated)");
    eprintln!("  --validate <T:M,...>    Validate expected moves (format: tick:move,...)");
    eprintln!("  --game <SEED>           Only use entries of this game (needed when ticks repeat)");
    eprintln!("  --seed <N>              Seed for replayed MCTS decisions (default: 0)");
    eprintln!("  --verbose               Show detailed output for each tick");
    eprintln!("  --config <path>         Path to Solver.toml (default: Solver.toml)");
    eprintln!("  --help                  Show this help message");
    eprintln!();
    eprintln!("EXAMPLES:");
    eprintln!("  # Replay all ticks");
    eprintln!("  replay snake_solver_debug.jsonl --all");
    eprintln!();
    eprintln!("  # Replay specific ticks");
    eprintln!("  replay snake_solver_debug.jsonl --ticks 5,10,15");
    eprintln!();
    eprintln!("  # Replay ticks of one game from a multi-game record");
    eprintln!("  replay snake_solver_debug.jsonl --game 3 --ticks 5,10");
    eprintln!();
    eprintln!("  # Validate expected moves, '|' separates acceptable alternatives");
    eprintln!("  replay snake_solver_debug.jsonl --validate 5:north,10:east|south");
}

fn parse_ticks(s: &str) -> Result<Vec<u32>, String> {
    s.split(',')
        .map(|t| {
            t.trim()
                .parse::<u32>()
                .map_err(|e| format!("Invalid tick number '{}': {}", t, e))
        })
        .collect()
}

fn parse_expected_moves(s: &str) -> Result<Vec<(u32, Vec<Direction>)>, String> {
    s.split(',')
        .map(|pair| {
            let (tick, moves) = pair
                .trim()
                .split_once(':')
                .ok_or_else(|| format!("Invalid format '{}'. Expected 'tick:move'", pair))?;

            let tick = tick
                .parse::<u32>()
                .map_err(|e| format!("Invalid tick number '{}': {}", tick, e))?;

            let moves: Result<Vec<Direction>, String> =
                moves.split('|').map(|m| Direction::parse(m.trim())).collect();

            Ok((tick, moves?))
        })
        .collect()
}

fn option_value(args: &[String], i: usize, flag: &str) -> String {
    match args.get(i + 1) {
        Some(value) => value.clone(),
        None => {
            eprintln!("Error: {} requires an argument", flag);
            process::exit(1);
        }
    }
}

fn main() {
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 || args.contains(&"--help".to_string()) {
        print_usage();
        process::exit(if args.contains(&"--help".to_string()) {
            0
        } else {
            1
        });
    }

    let record_file = &args[1];
    let mut config_path = "Solver.toml".to_string();
    let mut verbose = false;
    let mut seed = 0u64;
    let mut game = None;
    let mut mode = None;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--all" => {
                mode = Some(Mode::All);
            }
            "--ticks" => {
                mode = Some(Mode::Ticks(option_value(&args, i, "--ticks")));
                i += 1;
            }
            "--validate" => {
                mode = Some(Mode::Validate(option_value(&args, i, "--validate")));
                i += 1;
            }
            "--seed" => {
                let value = option_value(&args, i, "--seed");
                seed = value.parse().unwrap_or_else(|e| {
                    eprintln!("Error: Invalid seed '{}': {}", value, e);
                    process::exit(1);
                });
                i += 1;
            }
            "--game" => {
                let value = option_value(&args, i, "--game");
                game = Some(value.parse::<u64>().unwrap_or_else(|e| {
                    eprintln!("Error: Invalid game '{}': {}", value, e);
                    process::exit(1);
                }));
                i += 1;
            }
            "--config" => {
                config_path = option_value(&args, i, "--config");
                i += 1;
            }
            "--verbose" => {
                verbose = true;
            }
            _ => {
                eprintln!("Error: Unknown option '{}'", args[i]);
                print_usage();
                process::exit(1);
            }
        }
        i += 1;
    }

    let Some(mode) = mode else {
        eprintln!("Error: Must specify --all, --ticks, or --validate");
        print_usage();
        process::exit(1);
    };

    let config = Config::from_file(&config_path).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config from '{}': {}", config_path, e);
        eprintln!("Using default configuration");
        Config::default_hardcoded()
    });

    println!("Loaded configuration from: {}", config_path);
    println!("Replay record file: {}", record_file);
    println!();

    let engine = ReplayEngine::new(config, verbose).with_seed(seed);

    let entries = match engine.load_record_file(record_file) {
        Ok(entries) => match game {
            Some(g) => entries.into_iter().filter(|e| e.game == g).collect(),
            None => entries,
        },
        Err(e) => {
            eprintln!("Error loading record file: {}", e);
            process::exit(1);
        }
    };

    if entries.is_empty() {
        match game {
            Some(g) => eprintln!("Error: No entries for game {} in record file", g),
            None => eprintln!("Error: Record file is empty"),
        }
        process::exit(1);
    }

    println!("Loaded {} record entries\n", entries.len());

    match mode {
        Mode::All => {
            println!("Replaying all {} ticks...\n", entries.len());
            let results = engine.replay_all(&entries);
            engine.print_report(&results);
        }
        Mode::Ticks(arg) => {
            let ticks = match parse_ticks(&arg) {
                Ok(t) => t,
                Err(e) => {
                    eprintln!("Error parsing ticks: {}", e);
                    process::exit(1);
                }
            };

            println!("Replaying {} specific tick(s)...\n", ticks.len());
            match engine.replay_ticks(&entries, game, &ticks) {
                Ok(results) => {
                    engine.print_report(&results);
                }
                Err(e) => {
                    eprintln!("Error during replay: {}", e);
                    process::exit(1);
                }
            }
        }
        Mode::Validate(arg) => {
            let expected_moves = match parse_expected_moves(&arg) {
                Ok(m) => m,
                Err(e) => {
                    eprintln!("Error parsing expected moves: {}", e);
                    process::exit(1);
                }
            };

            println!("Validating {} expected move(s)...\n", expected_moves.len());
            match engine.validate_expected_moves(&entries, game, &expected_moves) {
                Ok(()) => {
                    println!("✓ All expected moves validated successfully!");
                }
                Err(e) => {
                    eprintln!("✗ Validation failed: {}", e);
                    process::exit(1);
                }
            }
        }
    }
}
