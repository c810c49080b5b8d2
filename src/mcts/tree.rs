//! Game tree with arena allocation.
//!
//! Nodes live in a contiguous Vec and refer to each other by [`NodeId`].
//! Children are owned by the arena and listed by their parent; the parent
//! link is a plain index used only to walk back up during backpropagation.

use std::collections::VecDeque;

use super::ucb::ucb_value_with;
use crate::state::AgentState;
use crate::types::{Agent, Direction};

/// Index of a node in the tree arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

impl NodeId {
    #[inline]
    pub fn index(&self) -> usize {
        self.0
    }
}

/// One position in the adversarial search
#[derive(Debug, Clone)]
pub struct GameNode {
    pub state: AgentState,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Move of the parent's mover that led here (None for the root)
    pub action: Option<Direction>,
    pub visit_count: u32,
    pub win_score: f64,
}

impl GameNode {
    fn new(state: AgentState, parent: Option<NodeId>, action: Option<Direction>) -> Self {
        GameNode {
            state,
            parent,
            children: Vec::new(),
            action,
            visit_count: 0,
            win_score: 0.0,
        }
    }

    /// Agent to move in this node's state
    pub fn mover(&self) -> Agent {
        self.state.mover()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn mean_score(&self) -> f64 {
        if self.visit_count == 0 {
            0.0
        } else {
            self.win_score / self.visit_count as f64
        }
    }
}

/// Arena-backed game tree
#[derive(Debug, Clone)]
pub struct GameTree {
    nodes: Vec<GameNode>,
    root: NodeId,
}

impl GameTree {
    /// Creates a tree holding only the root
    pub fn new(root_state: AgentState) -> Self {
        GameTree {
            nodes: vec![GameNode::new(root_state, None, None)],
            root: NodeId(0),
        }
    }

    /// Reuses `previous` when its root, or one of the root's children, is the
    /// position in `state`. Otherwise starts a fresh tree.
    pub fn reuse_or_new(previous: Option<GameTree>, state: AgentState) -> Self {
        if let Some(tree) = previous {
            if tree.root_node().state.same_position(&state) {
                return tree;
            }
            let matching = tree
                .root_node()
                .children
                .iter()
                .copied()
                .find(|id| tree.get(*id).state.same_position(&state));
            if let Some(child) = matching {
                return tree.reroot(child);
            }
        }
        GameTree::new(state)
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    #[inline]
    pub fn root_node(&self) -> &GameNode {
        self.get(self.root)
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> &GameNode {
        &self.nodes[id.index()]
    }

    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut GameNode {
        &mut self.nodes[id.index()]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.get(id).children
    }

    /// Allocates a child of `parent` and returns its id
    pub fn add_child(&mut self, parent: NodeId, action: Direction, state: AgentState) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(GameNode::new(state, Some(parent), Some(action)));
        self.get_mut(parent).children.push(id);
        id
    }

    /// Child with the highest UCB1 score, scored against the parent's visit
    /// count. The first child wins ties. None for a leaf.
    pub fn select_child(&self, id: NodeId, exploration: f64) -> Option<NodeId> {
        let parent_visits = self.get(id).visit_count;
        let mut best: Option<(NodeId, f64)> = None;
        for &child_id in self.children(id) {
            let child = self.get(child_id);
            let score = ucb_value_with(exploration, parent_visits, child.win_score, child.visit_count);
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((child_id, score)),
            }
        }
        best.map(|(child_id, _)| child_id)
    }

    /// Adds one visit and the playout result to every node from `leaf` up to
    /// the root. Nodes whose mover differs from the leaf's mover receive the
    /// negated result.
    pub fn backpropagate(&mut self, leaf: NodeId, result: f64) {
        let leaf_mover = self.get(leaf).mover();
        let mut current = Some(leaf);

        while let Some(id) = current {
            let node = self.get_mut(id);
            node.visit_count += 1;
            if node.mover() == leaf_mover {
                node.win_score += result;
            } else {
                node.win_score -= result;
            }
            current = node.parent;
        }
    }

    /// Final decision among the root's children: most visits when the AI is
    /// to move at the root, fewest otherwise. First child wins ties.
    pub fn best_child(&self) -> Option<NodeId> {
        let root = self.root_node();
        let prefer_max = root.mover() == Agent::Ai;
        let mut best: Option<(NodeId, u32)> = None;
        for &child_id in &root.children {
            let visits = self.get(child_id).visit_count;
            let better = match best {
                None => true,
                Some((_, best_visits)) if prefer_max => visits > best_visits,
                Some((_, best_visits)) => visits < best_visits,
            };
            if better {
                best = Some((child_id, visits));
            }
        }
        best.map(|(child_id, _)| child_id)
    }

    /// Keeps only the subtree under `id`, which becomes the root with no
    /// parent. Siblings and ancestors are dropped.
    pub fn reroot(self, id: NodeId) -> GameTree {
        let mut old: Vec<Option<GameNode>> = self.nodes.into_iter().map(Some).collect();
        let mut nodes: Vec<GameNode> = Vec::new();
        let mut queue = VecDeque::from([(id, None::<NodeId>)]);

        while let Some((old_id, new_parent)) = queue.pop_front() {
            let Some(mut node) = old.get_mut(old_id.index()).and_then(Option::take) else {
                continue;
            };
            let new_id = NodeId(nodes.len());
            let old_children = std::mem::take(&mut node.children);
            node.parent = new_parent;
            if new_parent.is_none() {
                node.action = None;
            }
            nodes.push(node);
            if let Some(parent) = new_parent {
                nodes[parent.index()].children.push(new_id);
            }
            queue.extend(old_children.into_iter().map(|child| (child, Some(new_id))));
        }

        GameTree {
            nodes,
            root: NodeId(0),
        }
    }

    /// Depth of the deepest node below the root
    pub fn max_depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self.root, 0usize)];
        while let Some((id, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            stack.extend(self.children(id).iter().map(|c| (*c, depth + 1)));
        }
        deepest
    }

    /// Statistics about the tree for logging
    pub fn stats(&self) -> TreeStats {
        let root = self.root_node();
        TreeStats {
            total_nodes: self.nodes.len(),
            root_visits: root.visit_count,
            root_score: root.mean_score(),
            max_depth: self.max_depth(),
        }
    }
}

/// Statistics about a game tree
#[derive(Debug, Clone, PartialEq)]
pub struct TreeStats {
    pub total_nodes: usize,
    pub root_visits: u32,
    pub root_score: f64,
    pub max_depth: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::GridBoard;
    use crate::types::{Coord, Snake};
    use std::sync::Arc;

    fn state(mover: Agent) -> AgentState {
        let ai = Snake::straight(Coord::new(2, 2), Direction::East, 3);
        let opp = Snake::straight(Coord::new(7, 7), Direction::West, 3);
        let board = GridBoard::from_snakes(10, 10, &[&ai, &opp], Some(Coord::new(5, 5)));
        AgentState::versus(Arc::new(board), ai, opp, Coord::new(5, 5), mover)
    }

    #[test]
    fn test_add_child_links_both_ways() {
        let root_state = state(Agent::Ai);
        let mut tree = GameTree::new(root_state.clone());
        let child = tree.add_child(tree.root(), Direction::North, root_state.apply(Direction::North));

        assert_eq!(tree.len(), 2);
        assert_eq!(tree.children(tree.root()), &[child]);
        assert_eq!(tree.get(child).parent, Some(tree.root()));
        assert_eq!(tree.get(child).mover(), Agent::Opponent);
    }

    #[test]
    fn test_backpropagate_flips_sign_by_mover() {
        let s = state(Agent::Ai);
        let mut tree = GameTree::new(s.clone());
        let a = tree.add_child(tree.root(), Direction::North, s.apply(Direction::North));
        let a_state = tree.get(a).state.clone();
        let b = tree.add_child(a, Direction::East, a_state.apply(Direction::East));

        // b: Ai to move, a: Opponent to move, root: Ai to move
        tree.backpropagate(a, 10.0);
        assert_eq!(tree.get(a).win_score, 10.0);
        assert_eq!(tree.root_node().win_score, -10.0);

        tree.backpropagate(b, 4.0);
        assert_eq!(tree.get(b).win_score, 4.0);
        assert_eq!(tree.get(a).win_score, 6.0);
        assert_eq!(tree.root_node().win_score, -6.0);
        assert_eq!(tree.root_node().visit_count, 2);
        assert_eq!(tree.get(b).visit_count, 1);
    }

    #[test]
    fn test_select_child_prefers_first_unvisited() {
        let s = state(Agent::Ai);
        let mut tree = GameTree::new(s.clone());
        let first = tree.add_child(tree.root(), Direction::North, s.apply(Direction::North));
        let second = tree.add_child(tree.root(), Direction::South, s.apply(Direction::South));
        tree.backpropagate(first, 1.0);

        assert_eq!(tree.select_child(tree.root(), 1.41), Some(second));
        tree.backpropagate(second, 1.0);
        assert_eq!(tree.select_child(tree.root(), 1.41), Some(first));
    }

    #[test]
    fn test_best_child_uses_visits_min_for_opponent_root() {
        for (mover, expect_most_visited) in [(Agent::Ai, true), (Agent::Opponent, false)] {
            let s = state(mover);
            let mut tree = GameTree::new(s.clone());
            let busy = tree.add_child(tree.root(), Direction::North, s.apply(Direction::North));
            let quiet = tree.add_child(tree.root(), Direction::South, s.apply(Direction::South));
            for _ in 0..3 {
                tree.backpropagate(busy, -1.0);
            }
            tree.backpropagate(quiet, 5.0);

            let expected = if expect_most_visited { busy } else { quiet };
            assert_eq!(tree.best_child(), Some(expected));
        }
    }

    #[test]
    fn test_reroot_keeps_only_subtree() {
        let s = state(Agent::Ai);
        let mut tree = GameTree::new(s.clone());
        let keep = tree.add_child(tree.root(), Direction::North, s.apply(Direction::North));
        let drop = tree.add_child(tree.root(), Direction::South, s.apply(Direction::South));
        let keep_state = tree.get(keep).state.clone();
        let grandchild = tree.add_child(keep, Direction::West, keep_state.apply(Direction::West));
        let drop_state = tree.get(drop).state.clone();
        tree.add_child(drop, Direction::West, drop_state.apply(Direction::West));
        tree.backpropagate(grandchild, 2.0);

        let rerooted = tree.reroot(keep);
        assert_eq!(rerooted.len(), 2);
        let root = rerooted.root_node();
        assert!(root.parent.is_none());
        assert!(root.action.is_none());
        assert_eq!(root.visit_count, 1);
        let only_child = rerooted.children(rerooted.root())[0];
        assert_eq!(rerooted.get(only_child).parent, Some(rerooted.root()));
        assert_eq!(rerooted.get(only_child).action, Some(Direction::West));
        assert_eq!(rerooted.max_depth(), 1);
    }

    #[test]
    fn test_reuse_or_new_matches_child_position() {
        let s = state(Agent::Ai);
        let mut tree = GameTree::new(s.clone());
        let child_state = s.apply(Direction::North);
        let child = tree.add_child(tree.root(), Direction::North, child_state.clone());
        tree.backpropagate(child, 1.0);

        let reused = GameTree::reuse_or_new(Some(tree.clone()), child_state);
        assert_eq!(reused.len(), 1);
        assert_eq!(reused.root_node().visit_count, 1);

        let same = GameTree::reuse_or_new(Some(tree.clone()), s.clone());
        assert_eq!(same.len(), 2);

        let unrelated = GameTree::reuse_or_new(Some(tree), s.apply(Direction::South));
        assert_eq!(unrelated.len(), 1);
        assert_eq!(unrelated.root_node().visit_count, 0);
    }
}
