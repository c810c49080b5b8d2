// Configuration module for reading Solver.toml
// All tunable constants of the planners, the tree search and the headless game

use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Main configuration structure containing all tunable parameters
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Config {
    pub board: BoardConfig,
    pub search: SearchConfig,
    pub mcts: MctsConfig,
    pub rewards: RewardsConfig,
    pub game: GameConfig,
    pub debug: DebugConfig,
}

/// Board dimensions and snake rules
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct BoardConfig {
    pub cols: i32,
    pub rows: i32,
    /// The snake grows every move until it reaches this length
    pub min_snake_length: usize,
}

/// Path planning constants
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SearchConfig {
    /// IDA* stops deepening at `ida_bound_factor * (cols + rows)`
    pub ida_bound_factor: usize,
}

impl SearchConfig {
    /// Largest limit IDA* tries on a board of the given size
    pub fn ida_max_limit(&self, cols: i32, rows: i32) -> usize {
        self.ida_bound_factor * (cols + rows).max(0) as usize
    }
}

/// Monte Carlo tree search constants
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct MctsConfig {
    /// Select/expand/simulate/backpropagate rounds per decision
    pub iterations: u32,
    pub exploration_constant: f64,
    /// Wall-clock ceiling per decision in milliseconds; 0 disables it
    pub time_budget_ms: u64,
    /// Playouts longer than this end in a neutral result
    pub max_playout_plies: u32,
}

/// Terminal rewards, all from the AI snake's point of view.
///
/// The values are deliberately lopsided: an opponent crash is worth 0 while
/// an AI crash costs 10, and hitting one's own body costs the same no matter
/// which snake did it.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct RewardsConfig {
    pub ai_fruit: f64,
    pub opponent_fruit: f64,
    pub ai_crash: f64,
    pub opponent_crash: f64,
    pub self_kill: f64,
    pub ai_hits_opponent: f64,
    pub opponent_hits_ai: f64,
}

/// Headless game rules
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct GameConfig {
    /// Points the next fruit is worth right after it spawns
    pub initial_fruit_score: u32,
    /// The fruit value stops decaying here
    pub min_fruit_score: u32,
    /// Length of the queued-direction buffer
    pub max_directions: usize,
    /// Games are cut off after this many ticks
    pub max_ticks: u32,
}

/// Debug configuration
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct DebugConfig {
    pub enabled: bool,
    pub log_file_path: String,
}

impl Config {
    /// Loads configuration from a TOML file
    ///
    /// # Arguments
    /// * `path` - Path to the Solver.toml configuration file
    ///
    /// # Returns
    /// * `Result<Config, String>` - Parsed configuration or error message
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let contents = fs::read_to_string(path.as_ref())
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        Self::from_toml_str(&contents)
    }

    /// Parses configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self, String> {
        let config: Config =
            toml::from_str(contents).map_err(|e| format!("Failed to parse config file: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads default configuration from Solver.toml in the project root
    pub fn load_default() -> Result<Self, String> {
        Self::from_file("Solver.toml")
    }

    /// Creates a configuration with hardcoded default values as fallback
    /// This should match the constants defined in Solver.toml
    pub fn default_hardcoded() -> Self {
        Config {
            board: BoardConfig {
                cols: 25,
                rows: 25,
                min_snake_length: 5,
            },
            search: SearchConfig {
                ida_bound_factor: 2,
            },
            mcts: MctsConfig {
                iterations: 1000,
                exploration_constant: 1.41,
                time_budget_ms: 0,
                max_playout_plies: 200,
            },
            rewards: RewardsConfig {
                ai_fruit: 10.0,
                opponent_fruit: -10.0,
                ai_crash: -10.0,
                opponent_crash: 0.0,
                self_kill: -5.0,
                ai_hits_opponent: -8.0,
                opponent_hits_ai: 8.0,
            },
            game: GameConfig {
                initial_fruit_score: 100,
                min_fruit_score: 10,
                max_directions: 3,
                max_ticks: 5000,
            },
            debug: DebugConfig {
                enabled: false,
                log_file_path: "snake_solver_debug.jsonl".to_string(),
            },
        }
    }

    /// Attempts to load from file, falls back to hardcoded defaults on error
    pub fn load_or_default() -> Self {
        Self::load_default().unwrap_or_else(|e| {
            log::warn!("Could not load Solver.toml ({}), using hardcoded defaults", e);
            Self::default_hardcoded()
        })
    }

    /// Rejects values the planners cannot work with
    pub fn validate(&self) -> Result<(), String> {
        if self.board.cols < 2 || self.board.rows < 2 {
            return Err(format!(
                "Board must be at least 2x2, got {}x{}",
                self.board.cols, self.board.rows
            ));
        }
        if self.board.min_snake_length == 0 {
            return Err("min_snake_length must be at least 1".to_string());
        }
        if self.mcts.iterations == 0 {
            return Err("mcts.iterations must be positive".to_string());
        }
        if self.game.min_fruit_score > self.game.initial_fruit_score {
            return Err("game.min_fruit_score exceeds game.initial_fruit_score".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ida_limit_calculation() {
        let config = Config::default_hardcoded();
        assert_eq!(config.search.ida_max_limit(25, 25), 100);
        assert_eq!(config.search.ida_max_limit(10, 10), 40);
    }

    #[test]
    fn test_config_can_be_created() {
        let config = Config::default_hardcoded();
        assert_eq!(config.mcts.iterations, 1000);
        assert_eq!(config.mcts.exploration_constant, 1.41);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_solver_toml_can_be_parsed() {
        let result = Config::from_file("Solver.toml");
        assert!(
            result.is_ok(),
            "Failed to parse Solver.toml: {:?}",
            result.err()
        );
    }

    #[test]
    fn test_all_config_values_match_hardcoded_defaults() {
        let file_config = Config::from_file("Solver.toml").expect("Solver.toml should be parseable");
        let hardcoded_config = Config::default_hardcoded();

        assert_eq!(file_config.board, hardcoded_config.board);
        assert_eq!(file_config.search, hardcoded_config.search);
        assert_eq!(file_config.mcts, hardcoded_config.mcts);
        assert_eq!(file_config.rewards, hardcoded_config.rewards);
        assert_eq!(file_config.game, hardcoded_config.game);
        assert_eq!(file_config.debug, hardcoded_config.debug);
    }

    #[test]
    fn test_reward_asymmetry_is_preserved() {
        let rewards = Config::default_hardcoded().rewards;
        assert_eq!(rewards.ai_crash, -10.0);
        assert_eq!(rewards.opponent_crash, 0.0);
        assert_ne!(rewards.ai_crash, -rewards.opponent_crash);
        assert!(rewards.self_kill < 0.0);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let mut config = Config::default_hardcoded();
        config.board.cols = 1;
        assert!(config.validate().is_err());

        let mut config = Config::default_hardcoded();
        config.mcts.iterations = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let result = Config::from_file("nonexistent.toml");
        assert!(result.is_err());
        assert!(Config::from_toml_str("[board]\ncols = 3").is_err());
    }
}
