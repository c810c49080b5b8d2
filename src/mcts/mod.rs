// Adversarial Monte Carlo tree search for the two-snake game

pub mod engine;
pub mod reward;
pub mod tree;
pub mod ucb;

pub use engine::{MctsEngine, SearchSummary};
pub use reward::terminal_reward;
pub use tree::{GameNode, GameTree, NodeId, TreeStats};
pub use ucb::{ucb_value, ucb_value_with};
