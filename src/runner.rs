// Plays whole headless games with the solver in charge of the snakes.
//
// Solo games (A*, IDA*) plan once per fruit and follow the plan reactively:
// after every move the driver looks up the direction stored for the head's
// current cell. Versus games let MCTS decide every AI move while the opponent
// replans with A* each tick.

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::config::Config;
use crate::game::{GameOutcome, SnakeGame};
use crate::mcts::GameTree;
use crate::recorder::GameRecorder;
use crate::search::Plan;
use crate::solver::{Algorithm, Solver};
use crate::types::{Agent, Coord, Direction};

/// Result of one finished game
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameSummary {
    pub seed: u64,
    pub algorithm: Algorithm,
    pub ticks: u32,
    pub score: u32,
    pub fruits_eaten: u32,
    pub opponent_fruits: u32,
    pub length: usize,
    pub outcome: GameOutcome,
    pub planning_failures: u32,
}

pub struct GameRunner<'a> {
    solver: &'a Solver,
    recorder: &'a GameRecorder,
}

impl<'a> GameRunner<'a> {
    pub fn new(solver: &'a Solver, recorder: &'a GameRecorder) -> Self {
        GameRunner { solver, recorder }
    }

    /// Plays one game to completion (or to the tick limit)
    pub fn play(&self, algorithm: Algorithm, seed: u64) -> GameSummary {
        let config = self.solver.config();
        let versus = algorithm == Algorithm::Mcts;
        let mut game = SnakeGame::new(&config.board, &config.game, versus, seed);
        // Separate stream from the fruit spawner so decisions do not shift fruit
        let mut rng = StdRng::seed_from_u64(seed.wrapping_add(0x9E37_79B9_7F4A_7C15));

        let planning_failures = match algorithm {
            Algorithm::AStar | Algorithm::IdaStar => {
                self.play_solo(&mut game, algorithm, seed, config, &mut rng)
            }
            Algorithm::Mcts => self.play_versus(&mut game, seed, config, &mut rng),
        };

        let summary = GameSummary {
            seed,
            algorithm,
            ticks: game.ticks(),
            score: game.score(),
            fruits_eaten: game.fruits_eaten(),
            opponent_fruits: game.opponent_fruits(),
            length: game.snake(Agent::Ai).len(),
            outcome: game.outcome().unwrap_or(GameOutcome::TickLimit),
            planning_failures,
        };
        info!(
            "Game {} ({}) finished after {} ticks: {:?}, {} fruits, score {}",
            seed, algorithm, summary.ticks, summary.outcome, summary.fruits_eaten, summary.score
        );
        summary
    }

    fn play_solo(
        &self,
        game: &mut SnakeGame,
        algorithm: Algorithm,
        seed: u64,
        config: &Config,
        rng: &mut StdRng,
    ) -> u32 {
        let mut plan: Option<Plan> = None;
        let mut planned_for: Option<Coord> = None;
        let mut failures = 0;

        while !game.is_over() {
            if game.ticks() >= config.game.max_ticks {
                game.stop(GameOutcome::TickLimit);
                break;
            }
            let Some(fruit) = game.fruit() else {
                break;
            };

            if planned_for != Some(fruit) {
                planned_for = Some(fruit);
                let snake = game.snake(Agent::Ai);
                plan = match self.solver.plan_path(game.board(), snake, fruit, algorithm) {
                    Ok(p) => Some(p),
                    Err(e) => {
                        warn!("Tick {}: {} failed ({}), moving randomly", game.ticks(), algorithm, e);
                        failures += 1;
                        None
                    }
                };
            }

            let head = game.snake(Agent::Ai).head();
            let planned = plan.as_mut().and_then(|p| p.take_direction_at(&head));
            let dir = match planned {
                Some(dir) => dir,
                None => random_move(game, Agent::Ai, rng),
            };

            if let Some(snapshot) = game.snapshot(Agent::Ai) {
                self.recorder
                    .record(seed, game.ticks(), algorithm, dir, snapshot);
            }
            game.steer(dir);
            game.tick(None);
        }
        failures
    }

    fn play_versus(
        &self,
        game: &mut SnakeGame,
        seed: u64,
        config: &Config,
        rng: &mut StdRng,
    ) -> u32 {
        let mut tree: Option<GameTree> = None;
        let mut failures = 0;

        while !game.is_over() {
            if game.ticks() >= config.game.max_ticks {
                game.stop(GameOutcome::TickLimit);
                break;
            }
            let Some(fruit) = game.fruit() else {
                break;
            };

            let ai = game.snake(Agent::Ai).clone();
            let opponent = game.snake(Agent::Opponent).clone();
            let dir = match self.solver.decide_move(
                game.board(),
                &ai,
                &opponent,
                Agent::Ai,
                tree.take(),
                rng,
            ) {
                Ok((dir, next)) => {
                    tree = Some(next);
                    dir
                }
                Err(e) => {
                    debug!("Tick {}: MCTS gave no move ({})", game.ticks(), e);
                    failures += 1;
                    random_move(game, Agent::Ai, rng)
                }
            };

            let opponent_dir = match self
                .solver
                .plan_path(game.board(), &opponent, fruit, Algorithm::AStar)
            {
                Ok(plan) => plan.first_move(),
                Err(_) => None,
            }
            .unwrap_or_else(|| random_move(game, Agent::Opponent, rng));

            if let Some(snapshot) = game.snapshot(Agent::Ai) {
                self.recorder
                    .record(seed, game.ticks(), Algorithm::Mcts, dir, snapshot);
            }
            game.steer(dir);
            game.tick(Some(opponent_dir));
        }
        failures
    }
}

/// Uniformly random move among the ones that survive the next tick, or any
/// direction at all when the snake is boxed in
fn random_move(game: &SnakeGame, agent: Agent, rng: &mut StdRng) -> Direction {
    let safe = game.safe_moves(agent);
    if safe.is_empty() {
        let all = Direction::all();
        return all[rng.random_range(0..all.len())];
    }
    safe[rng.random_range(0..safe.len())]
}

/// Aggregate over many games
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    pub games: usize,
    pub total_fruits: u32,
    pub total_score: u64,
    pub best_score: u32,
    pub crashes: usize,
    pub tick_limits: usize,
    pub average_ticks: f64,
}

impl RunSummary {
    pub fn from_games(games: &[GameSummary]) -> Self {
        if games.is_empty() {
            return RunSummary::default();
        }
        let total_ticks: u64 = games.iter().map(|g| g.ticks as u64).sum();
        RunSummary {
            games: games.len(),
            total_fruits: games.iter().map(|g| g.fruits_eaten).sum(),
            total_score: games.iter().map(|g| g.score as u64).sum(),
            best_score: games.iter().map(|g| g.score).max().unwrap_or(0),
            crashes: games
                .iter()
                .filter(|g| matches!(g.outcome, GameOutcome::Crashed(_)))
                .count(),
            tick_limits: games
                .iter()
                .filter(|g| g.outcome == GameOutcome::TickLimit)
                .count(),
            average_ticks: total_ticks as f64 / games.len() as f64,
        }
    }
}
