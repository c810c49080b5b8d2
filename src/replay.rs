// Replay module for re-running the solver on recorded positions
//
// This module provides functionality to:
// 1. Parse JSONL game records
// 2. Re-run the recorded algorithm on each snapshot
// 3. Compare recorded vs replayed moves
// 4. Generate analysis reports

use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Instant;

use crate::board::GridBoard;
use crate::config::Config;
use crate::recorder::RecordEntry;
use crate::solver::{Algorithm, Solver};
use crate::types::{Agent, Direction};

/// Result of replaying a single recorded decision
#[derive(Debug, Clone)]
pub struct ReplayResult {
    pub game: u64,
    pub tick: u32,
    pub algorithm: Algorithm,
    pub original_move: Direction,
    pub replayed_move: Direction,
    pub matches: bool,
    /// Route length for the planners, root visits of the chosen child for MCTS
    pub effort: usize,
    pub computation_time_ms: u128,
}

/// Statistics for a complete replay session
#[derive(Debug, Default)]
pub struct ReplayStats {
    pub total_ticks: usize,
    pub matches: usize,
    pub mismatches: usize,
    pub match_rate: f64,
}

/// Replay engine for analyzing game records
pub struct ReplayEngine {
    solver: Solver,
    verbose: bool,
    seed: u64,
}

impl ReplayEngine {
    /// Creates a new replay engine with the given configuration.
    /// MCTS decisions are replayed with seed 0 unless changed with `with_seed`.
    pub fn new(config: Config, verbose: bool) -> Self {
        ReplayEngine {
            solver: Solver::new(config),
            verbose,
            seed: 0,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Loads all entries from a JSONL record file
    pub fn load_record_file<P: AsRef<Path>>(&self, path: P) -> Result<Vec<RecordEntry>, String> {
        let file = File::open(path.as_ref())
            .map_err(|e| format!("Failed to open record file: {}", e))?;

        let reader = BufReader::new(file);
        let mut entries = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| format!("Failed to read line {}: {}", line_num + 1, e))?;

            if line.trim().is_empty() {
                continue;
            }

            let entry: RecordEntry = serde_json::from_str(&line)
                .map_err(|e| format!("Failed to parse JSON on line {}: {}", line_num + 1, e))?;

            entries.push(entry);
        }

        info!("Loaded {} record entries", entries.len());
        Ok(entries)
    }

    /// Re-runs the recorded algorithm on one snapshot.
    /// Returns the move it picks now, the effort measure and the time taken.
    pub fn replay_decision(&self, entry: &RecordEntry) -> Result<(Direction, usize, u128), String> {
        let snapshot = &entry.snapshot;
        snapshot
            .validate()
            .map_err(|e| format!("Game {} tick {}: {}", entry.game, entry.tick, e))?;
        let board = GridBoard::from_snapshot(snapshot);
        let ai = snapshot
            .snakes
            .first()
            .ok_or("No snakes found in snapshot")?;

        let start_time = Instant::now();
        let (dir, effort) = match entry.algorithm {
            Algorithm::AStar | Algorithm::IdaStar => {
                let plan = self
                    .solver
                    .plan_path(&board, ai, snapshot.fruit, entry.algorithm)
                    .map_err(|e| e.to_string())?;
                let dir = plan
                    .first_move()
                    .ok_or("Snapshot head already sits on the fruit")?;
                (dir, plan.len())
            }
            Algorithm::Mcts => {
                let opponent = snapshot
                    .snakes
                    .get(Agent::Opponent.index())
                    .ok_or("MCTS record without an opponent snake")?;
                let mut rng = StdRng::seed_from_u64(self.seed);
                let (dir, tree) = self
                    .solver
                    .decide_move(&board, ai, opponent, snapshot.mover, None, &mut rng)
                    .map_err(|e| e.to_string())?;
                (dir, tree.root_node().visit_count as usize)
            }
        };

        Ok((dir, effort, start_time.elapsed().as_millis()))
    }

    /// Replays a single entry and compares the result
    pub fn replay_entry(&self, entry: &RecordEntry) -> Result<ReplayResult, String> {
        if self.verbose {
            info!("Replaying game {} tick {}...", entry.game, entry.tick);
        }

        let (replayed_move, effort, computation_time) = self.replay_decision(entry)?;
        let matches = entry.chosen_move == replayed_move;

        let result = ReplayResult {
            game: entry.game,
            tick: entry.tick,
            algorithm: entry.algorithm,
            original_move: entry.chosen_move,
            replayed_move,
            matches,
            effort,
            computation_time_ms: computation_time,
        };

        if self.verbose {
            if matches {
                info!(
                    "Tick {}: MATCH - {} ({}, effort: {}, time: {}ms)",
                    entry.tick, replayed_move, entry.algorithm, effort, computation_time
                );
            } else {
                warn!(
                    "Tick {}: MISMATCH - Recorded: {}, Replayed: {} ({}, effort: {}, time: {}ms)",
                    entry.tick,
                    entry.chosen_move,
                    replayed_move,
                    entry.algorithm,
                    effort,
                    computation_time
                );
            }
        }

        Ok(result)
    }

    /// Replays every entry, skipping the ones that fail
    pub fn replay_all(&self, entries: &[RecordEntry]) -> Vec<ReplayResult> {
        let mut results = Vec::new();

        for entry in entries {
            match self.replay_entry(entry) {
                Ok(result) => results.push(result),
                Err(e) => {
                    warn!("Failed to replay tick {}: {}", entry.tick, e);
                }
            }
        }

        results
    }

    /// Finds the entry recorded at `tick`, restricted to one game when
    /// `game` is given. Without a game filter the tick must belong to a
    /// single game in the record.
    pub fn find_entry<'e>(
        &self,
        entries: &'e [RecordEntry],
        game: Option<u64>,
        tick: u32,
    ) -> Result<&'e RecordEntry, String> {
        let mut matching = entries
            .iter()
            .filter(|e| e.tick == tick && game.map_or(true, |g| e.game == g));

        let entry = matching.next().ok_or_else(|| match game {
            Some(g) => format!("Tick {} not found for game {} in record", tick, g),
            None => format!("Tick {} not found in record", tick),
        })?;

        let mut games: Vec<u64> = matching.map(|e| e.game).filter(|g| *g != entry.game).collect();
        if !games.is_empty() {
            games.push(entry.game);
            games.sort_unstable();
            games.dedup();
            return Err(format!(
                "Tick {} is ambiguous: recorded for games {:?}, select one with a game filter",
                tick, games
            ));
        }

        Ok(entry)
    }

    /// Replays specific ticks of one game. A tick missing from the record,
    /// or shared by several games when `game` is None, is an error.
    pub fn replay_ticks(
        &self,
        entries: &[RecordEntry],
        game: Option<u64>,
        ticks: &[u32],
    ) -> Result<Vec<ReplayResult>, String> {
        let mut results = Vec::new();

        for tick in ticks {
            let entry = self.find_entry(entries, game, *tick)?;

            match self.replay_entry(entry) {
                Ok(result) => results.push(result),
                Err(e) => {
                    warn!("Failed to replay tick {}: {}", tick, e);
                }
            }
        }

        Ok(results)
    }

    /// Generates statistics from replay results
    pub fn generate_stats(&self, results: &[ReplayResult]) -> ReplayStats {
        let total_ticks = results.len();
        let matches = results.iter().filter(|r| r.matches).count();
        let mismatches = total_ticks - matches;
        let match_rate = if total_ticks > 0 {
            (matches as f64 / total_ticks as f64) * 100.0
        } else {
            0.0
        };

        ReplayStats {
            total_ticks,
            matches,
            mismatches,
            match_rate,
        }
    }

    /// Prints a detailed report of replay results
    pub fn print_report(&self, results: &[ReplayResult]) {
        let stats = self.generate_stats(results);

        println!("\n═══════════════════════════════════════════════════════════");
        println!("                    REPLAY REPORT");
        println!("═══════════════════════════════════════════════════════════");
        println!("Total Ticks:    {}", stats.total_ticks);
        println!("Matches:        {} ({:.1}%)", stats.matches, stats.match_rate);
        println!("Mismatches:     {}", stats.mismatches);
        println!("═══════════════════════════════════════════════════════════\n");

        if !results.is_empty() {
            let avg_time: f64 = results
                .iter()
                .map(|r| r.computation_time_ms as f64)
                .sum::<f64>()
                / results.len() as f64;
            let avg_effort: f64 =
                results.iter().map(|r| r.effort as f64).sum::<f64>() / results.len() as f64;

            println!("Average Effort:             {:.1}", avg_effort);
            println!("Average Computation Time:   {:.1}ms\n", avg_time);
        }

        let mismatches: Vec<_> = results.iter().filter(|r| !r.matches).collect();
        if !mismatches.is_empty() {
            println!("═══════════════════════════════════════════════════════════");
            println!("                  DETAILED MISMATCHES");
            println!("═══════════════════════════════════════════════════════════");

            for result in mismatches {
                println!(
                    "Game {} tick {}: {} → {} ({}, effort: {}, time: {}ms)",
                    result.game,
                    result.tick,
                    result.original_move,
                    result.replayed_move,
                    result.algorithm,
                    result.effort,
                    result.computation_time_ms
                );
            }
            println!();
        }
    }

    /// Validates that specific expected moves were recorded, ticks resolved
    /// as in `find_entry`
    pub fn validate_expected_moves(
        &self,
        entries: &[RecordEntry],
        game: Option<u64>,
        expected_moves: &[(u32, Vec<Direction>)], // (tick, acceptable_moves)
    ) -> Result<(), String> {
        for (tick, acceptable) in expected_moves {
            let entry = self.find_entry(entries, game, *tick)?;

            if !acceptable.contains(&entry.chosen_move) {
                return Err(format!(
                    "Tick {}: Expected one of {:?}, but got {}",
                    tick,
                    acceptable.iter().map(|d| d.as_str()).collect::<Vec<_>>(),
                    entry.chosen_move
                ));
            }
        }

        Ok(())
    }
}
