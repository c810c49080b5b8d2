// Mapping from terminal status to playout result

use crate::config::RewardsConfig;
use crate::state::GameStatus;
use crate::types::Agent;

/// Reward of a finished playout, from the AI snake's point of view.
/// In-progress states are worth nothing.
pub fn terminal_reward(status: GameStatus, rewards: &RewardsConfig) -> f64 {
    match status {
        GameStatus::InProgress => 0.0,
        GameStatus::ReachedFruit(Agent::Ai) => rewards.ai_fruit,
        GameStatus::ReachedFruit(Agent::Opponent) => rewards.opponent_fruit,
        GameStatus::Crashed(Agent::Ai) => rewards.ai_crash,
        GameStatus::Crashed(Agent::Opponent) => rewards.opponent_crash,
        // Charged the same whichever snake bit itself
        GameStatus::SelfCollision(_) => rewards.self_kill,
        GameStatus::HitOpponent(Agent::Ai) => rewards.ai_hits_opponent,
        GameStatus::HitOpponent(Agent::Opponent) => rewards.opponent_hits_ai,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_fruit_rewards_are_mirrored() {
        let rewards = Config::default_hardcoded().rewards;
        assert_eq!(terminal_reward(GameStatus::ReachedFruit(Agent::Ai), &rewards), 10.0);
        assert_eq!(terminal_reward(GameStatus::ReachedFruit(Agent::Opponent), &rewards), -10.0);
    }

    #[test]
    fn test_crash_rewards_are_lopsided() {
        let rewards = Config::default_hardcoded().rewards;
        assert_eq!(terminal_reward(GameStatus::Crashed(Agent::Ai), &rewards), -10.0);
        // An opponent crash is not rewarded at all
        assert_eq!(terminal_reward(GameStatus::Crashed(Agent::Opponent), &rewards), 0.0);
    }

    #[test]
    fn test_self_kill_ignores_which_snake() {
        let rewards = Config::default_hardcoded().rewards;
        assert_eq!(
            terminal_reward(GameStatus::SelfCollision(Agent::Ai), &rewards),
            terminal_reward(GameStatus::SelfCollision(Agent::Opponent), &rewards)
        );
        assert_eq!(terminal_reward(GameStatus::SelfCollision(Agent::Opponent), &rewards), -5.0);
    }

    #[test]
    fn test_body_hits_and_in_progress() {
        let rewards = Config::default_hardcoded().rewards;
        assert_eq!(terminal_reward(GameStatus::HitOpponent(Agent::Ai), &rewards), -8.0);
        assert_eq!(terminal_reward(GameStatus::HitOpponent(Agent::Opponent), &rewards), 8.0);
        assert_eq!(terminal_reward(GameStatus::InProgress, &rewards), 0.0);
    }
}
