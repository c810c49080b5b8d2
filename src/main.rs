// Headless snake runner
//
// Usage:
//   snake-solver [--mode astar|ida|mcts] [--games N] [--seed S] [--sequential]
//                [--record <path>] [--config <path>]
//
// Plays N games seeded S, S+1, ... and prints a summary. Games run in
// parallel unless --sequential is given.

use log::info;
use rayon::prelude::*;
use std::env;
use std::process;
use std::time::Instant;

use snake_solver::config::Config;
use snake_solver::recorder::GameRecorder;
use snake_solver::runner::{GameRunner, GameSummary, RunSummary};
use snake_solver::simple_profiler;
use snake_solver::solver::{Algorithm, Solver};

struct Options {
    algorithm: Algorithm,
    games: u64,
    seed: u64,
    sequential: bool,
    record: Option<String>,
    config_path: String,
}

fn print_usage() {
    eprintln!("Snake Solver");
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("  snake-solver [OPTIONS]");
    eprintln!();
    eprintln!("OPTIONS:");
    eprintln!("  --mode <astar|ida|mcts>  Decision algorithm (default: astar)");
    eprintln!("  --games <N>              Number of games to play (default: 1)");
    eprintln!("  --seed <S>               Seed of the first game (default: 0)");
    eprintln!("  --sequential             Play games one after another");
    eprintln!("  --record <path>          Record every decision as JSONL");
    eprintln!("  --config <path>          Path to Solver.toml (default: Solver.toml)");
    eprintln!("  --help                   Show this help message");
}

fn parse_args(args: &[String]) -> Result<Options, String> {
    let mut options = Options {
        algorithm: Algorithm::AStar,
        games: 1,
        seed: 0,
        sequential: false,
        record: None,
        config_path: "Solver.toml".to_string(),
    };

    let mut i = 1;
    while i < args.len() {
        let flag = args[i].as_str();
        let mut value = || {
            i += 1;
            args.get(i)
                .cloned()
                .ok_or_else(|| format!("{} requires an argument", flag))
        };
        match flag {
            "--mode" => options.algorithm = Algorithm::parse(&value()?)?,
            "--games" => {
                options.games = value()?
                    .parse()
                    .map_err(|e| format!("Invalid game count: {}", e))?
            }
            "--seed" => {
                options.seed = value()?
                    .parse()
                    .map_err(|e| format!("Invalid seed: {}", e))?
            }
            "--record" => options.record = Some(value()?),
            "--config" => options.config_path = value()?,
            "--sequential" => options.sequential = true,
            other => return Err(format!("Unknown option '{}'", other)),
        }
        i += 1;
    }

    Ok(options)
}

fn main() {
    // We default to 'info' level logging. But if the `RUST_LOG` environment variable is set,
    // we keep that value instead.
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }

    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.contains(&"--help".to_string()) {
        print_usage();
        process::exit(0);
    }

    let options = match parse_args(&args) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("Error: {}", e);
            print_usage();
            process::exit(1);
        }
    };

    let config = Config::from_file(&options.config_path).unwrap_or_else(|e| {
        log::warn!(
            "Could not load config from '{}' ({}), using hardcoded defaults",
            options.config_path,
            e
        );
        Config::default_hardcoded()
    });

    let recorder = match (&options.record, config.debug.enabled) {
        (Some(path), _) => GameRecorder::new(true, path),
        (None, true) => GameRecorder::new(true, &config.debug.log_file_path),
        (None, false) => GameRecorder::disabled(),
    };

    info!(
        "Playing {} {} game(s) on a {}x{} board",
        options.games, options.algorithm, config.board.cols, config.board.rows
    );

    let solver = Solver::new(config);
    let runner = GameRunner::new(&solver, &recorder);
    let seeds: Vec<u64> = (0..options.games)
        .map(|n| options.seed.wrapping_add(n))
        .collect();

    let start = Instant::now();
    let games: Vec<GameSummary> = if options.sequential {
        seeds
            .iter()
            .map(|&seed| runner.play(options.algorithm, seed))
            .collect()
    } else {
        seeds
            .par_iter()
            .map(|&seed| {
                let summary = runner.play(options.algorithm, seed);
                simple_profiler::merge_thread_local();
                summary
            })
            .collect()
    };
    let elapsed_ms = start.elapsed().as_millis();
    recorder.flush();

    for game in &games {
        println!(
            "seed {:>6}  ticks {:>5}  fruits {:>4}  score {:>6}  length {:>4}  {:?}",
            game.seed, game.ticks, game.fruits_eaten, game.score, game.length, game.outcome
        );
    }

    let summary = RunSummary::from_games(&games);
    println!();
    println!("Games:          {}", summary.games);
    println!("Total fruits:   {}", summary.total_fruits);
    println!("Total score:    {}", summary.total_score);
    println!("Best score:     {}", summary.best_score);
    println!("Crashes:        {}", summary.crashes);
    println!("Tick limits:    {}", summary.tick_limits);
    println!("Average ticks:  {:.1}", summary.average_ticks);
    println!("Elapsed:        {}ms", elapsed_ms);

    simple_profiler::merge_thread_local();
    simple_profiler::print_report(elapsed_ms as u64);
}
