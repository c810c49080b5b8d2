// UCB1 scoring used during tree descent

/// Standard UCB1 exploration constant (about sqrt(2))
pub const EXPLORATION_CONSTANT: f64 = 1.41;

/// Score given to a child that has never been visited. Every such child is
/// therefore tried before any sibling is revisited.
pub const UNVISITED_SCORE: f64 = f64::MAX;

/// UCB1 with the default exploration constant.
///
/// # Arguments
/// * `total_visits` - visit count of the parent at scoring time
/// * `win_score` - accumulated score of the child
/// * `visits` - visit count of the child
pub fn ucb_value(total_visits: u32, win_score: f64, visits: u32) -> f64 {
    ucb_value_with(EXPLORATION_CONSTANT, total_visits, win_score, visits)
}

/// UCB1 with an explicit exploration constant
pub fn ucb_value_with(exploration: f64, total_visits: u32, win_score: f64, visits: u32) -> f64 {
    if visits == 0 {
        return UNVISITED_SCORE;
    }
    let n = visits as f64;
    win_score / n + exploration * ((total_visits as f64).ln() / n).sqrt()
}
