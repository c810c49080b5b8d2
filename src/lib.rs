// Library exports for the snake solver
// The headless runner, the replay tool and the integration tests all use the
// planners and the tree search through this crate.

pub mod board;
pub mod config;
pub mod error;
pub mod game;
pub mod mcts;
pub mod recorder;
pub mod replay;
pub mod runner;
pub mod search;
pub mod simple_profiler;
pub mod solver;
pub mod state;
pub mod types;

pub use error::SolverError;
pub use solver::{Algorithm, Solver};
