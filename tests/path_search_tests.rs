// Integration tests for A*, IDA* and plan extraction
//
// Scenarios:
// - Straight, obstacle-free routes have exactly the expected length
// - A long snake at the centre of a 10x10 board reaches the corner fruit
// - Fully enclosed fruit is reported as unreachable / planning failure
// - Closed-set and pruning bounds hold on boards that force detours

use snake_solver::board::GridBoard;
use snake_solver::config::Config;
use snake_solver::search::{astar, extract_plan, ida_star};
use snake_solver::types::{Coord, Direction, Snake, TileKind};
use snake_solver::{Algorithm, Solver, SolverError};

fn wall_board(snake: &Snake, fruit: Coord) -> GridBoard {
    // Horizontal wall on row 4 from x = 0 to x = 7, gap at x = 8 and 9
    let mut board = GridBoard::from_snakes(10, 10, &[snake], Some(fruit));
    for x in 0..8 {
        board.set_tile(&Coord::new(x, 4), TileKind::SnakeBody);
    }
    board
}

fn enclosed_fruit_board(snake: &Snake) -> (GridBoard, Coord) {
    let fruit = Coord::new(6, 6);
    let mut board = GridBoard::from_snakes(10, 10, &[snake], Some(fruit));
    for dir in Direction::all() {
        board.set_tile(&dir.apply(&fruit), TileKind::SnakeBody);
    }
    (board, fruit)
}

fn assert_route_is_connected(cells: &[Coord]) {
    for pair in cells.windows(2) {
        assert_eq!(
            pair[0].manhattan(&pair[1]),
            1,
            "{} and {} are not neighbours",
            pair[0],
            pair[1]
        );
    }
}

#[test]
fn test_straight_routes_have_exact_length() {
    let solver = Solver::new(Config::default_hardcoded());
    for length in 1..=9 {
        let snake = Snake::straight(Coord::new(0, 1), Direction::East, 1);
        let fruit = Coord::new(length, 1);
        let board = GridBoard::from_snakes(12, 3, &[&snake], Some(fruit));

        let plan = solver
            .plan_path(&board, &snake, fruit, Algorithm::AStar)
            .expect("open row must be plannable");
        assert_eq!(plan.len(), length as usize);
        assert!(plan.moves().iter().all(|d| *d == Direction::East));
    }
}

#[test]
fn test_centre_snake_reaches_corner_fruit() {
    let solver = Solver::new(Config::default_hardcoded());
    // Head at the centre facing West, so the body trails away from the fruit
    let snake = Snake::straight(Coord::new(5, 5), Direction::West, 5);
    let fruit = Coord::new(0, 0);
    let board = GridBoard::from_snakes(10, 10, &[&snake], Some(fruit));

    let plan = solver
        .plan_path(&board, &snake, fruit, Algorithm::AStar)
        .expect("corner is reachable");
    assert_eq!(plan.len(), snake.head().manhattan(&fruit) as usize);
    assert_eq!(plan.start(), Coord::new(5, 5));
    assert_eq!(plan.cells().last(), Some(&fruit));
    assert_route_is_connected(&plan.cells());
}

#[test]
fn test_plan_lookup_table_follows_route() {
    let solver = Solver::new(Config::default_hardcoded());
    let snake = Snake::straight(Coord::new(1, 1), Direction::South, 1);
    let fruit = Coord::new(1, 8);
    let board = wall_board(&snake, fruit);

    let plan = solver
        .plan_path(&board, &snake, fruit, Algorithm::AStar)
        .expect("gap in the wall");
    let cells = plan.cells();
    for (cell, dir) in cells.iter().zip(plan.moves()) {
        assert_eq!(plan.direction_at(cell), Some(*dir));
    }
    assert_eq!(plan.direction_at(&fruit), None);
    assert_eq!(plan.first_move(), plan.direction_at(&plan.start()));
}

#[test]
fn test_enclosed_fruit_is_unreachable() {
    let snake = Snake::straight(Coord::new(1, 1), Direction::East, 1);
    let (board, fruit) = enclosed_fruit_board(&snake);

    let result = astar(&board, &snake, fruit);
    assert_eq!(result.err(), Some(SolverError::Unreachable));
}

#[test]
fn test_enclosed_fruit_exhausts_ida_bound() {
    let config = Config::default_hardcoded();
    let solver = Solver::new(config.clone());
    let snake = Snake::straight(Coord::new(1, 1), Direction::East, 1);
    let (board, fruit) = enclosed_fruit_board(&snake);

    let result = solver.plan_path(&board, &snake, fruit, Algorithm::IdaStar);
    assert_eq!(
        result.err(),
        Some(SolverError::PlanningFailed {
            limit: config.search.ida_max_limit(10, 10)
        })
    );
}

#[test]
fn test_astar_closed_set_is_bounded_by_board() {
    let snake = Snake::straight(Coord::new(1, 1), Direction::East, 2);
    let (board, fruit) = enclosed_fruit_board(&snake);

    // Exhaustive search: every reachable cell is expanded exactly once
    let Err(_) = astar(&board, &snake, fruit) else {
        panic!("fruit should be unreachable");
    };

    let fruit = Coord::new(9, 9);
    let board = wall_board(&snake, fruit);
    let result = astar(&board, &snake, fruit).expect("reachable through the gap");
    assert!(result.stats.closed <= board.area());
    assert!(result.stats.expanded <= board.area());
    assert!(result.stats.enqueued >= result.stats.expanded);
}

#[test]
fn test_ida_never_expands_past_its_limit() {
    let snake = Snake::straight(Coord::new(1, 1), Direction::South, 1);
    let fruit = Coord::new(1, 8);
    let board = wall_board(&snake, fruit);

    let result = ida_star(&board, &snake, fruit, 40).expect("gap in the wall");
    assert!(result.stats.iterations.len() > 1);

    let mut expected_limit = snake.head().manhattan(&fruit) as usize;
    for pass in &result.stats.iterations {
        assert_eq!(pass.limit, expected_limit);
        if let Some(h) = pass.max_expanded_heuristic {
            assert!(h + 1 < pass.limit, "pass {:?} expanded past its limit", pass);
        } else {
            assert_eq!(pass.expanded, 0);
        }
        expected_limit += 1;
    }

    let plan = extract_plan(&result.nodes, result.goal).expect("well-formed chain");
    assert_eq!(plan.cells().last(), Some(&fruit));
    assert_route_is_connected(&plan.cells());
}

#[test]
fn test_astar_is_no_longer_than_ida() {
    let snake = Snake::straight(Coord::new(2, 2), Direction::North, 3);
    let fruit = Coord::new(3, 7);
    let board = wall_board(&snake, fruit);

    let a = astar(&board, &snake, fruit).expect("A* path");
    let i = ida_star(&board, &snake, fruit, 40).expect("IDA* path");
    assert!(a.goal_node().moves <= i.goal_node().moves);
}

#[test]
fn test_start_on_fruit_gives_empty_plan() {
    let solver = Solver::new(Config::default_hardcoded());
    let snake = Snake::straight(Coord::new(4, 4), Direction::East, 3);
    let board = GridBoard::from_snakes(10, 10, &[&snake], None);

    for algorithm in [Algorithm::AStar, Algorithm::IdaStar] {
        let plan = solver
            .plan_path(&board, &snake, Coord::new(4, 4), algorithm)
            .expect("already there");
        assert!(plan.is_empty());
        assert_eq!(plan.first_move(), None);
    }
}
