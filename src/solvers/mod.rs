pub mod engine;
pub mod scheduler;

use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::time::{Duration, Instant};

use log::{debug, info};
use rand::prelude::*;

use crate::error::TraversalError;
use crate::grids::{CellKind, Coordinate, Direction, Grid};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[allow(clippy::upper_case_acronyms)]
pub enum SolverKind {
    BFS,
    DFS,
}

impl SolverKind {
    pub fn label(self) -> &'static str {
        match self {
            SolverKind::BFS => "BFS",
            SolverKind::DFS => "DFS",
        }
    }
}

impl fmt::Display for SolverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Terminal event of a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    pub solver: SolverKind,
    pub elapsed: Duration,
    /// Whether an `end` cell was popped, as opposed to the frontier running dry.
    pub found: bool,
}

impl Completion {
    pub fn label(&self) -> &'static str {
        self.solver.label()
    }

    pub fn elapsed_ms(&self) -> u128 {
        self.elapsed.as_millis()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// One cell was popped. `update` holds a snapshot when it turned `visited`.
    Explored {
        cell: Coordinate,
        update: Option<Grid>,
    },
    Finished(Completion),
}

enum Frontier {
    Queue(VecDeque<Coordinate>),
    Stack(Vec<Coordinate>),
}

impl Frontier {
    fn for_solver(kind: SolverKind) -> Self {
        match kind {
            SolverKind::BFS => Frontier::Queue(VecDeque::new()),
            SolverKind::DFS => Frontier::Stack(Vec::new()),
        }
    }

    fn push(&mut self, coords: Coordinate) {
        match self {
            Frontier::Queue(queue) => queue.push_back(coords),
            Frontier::Stack(stack) => stack.push(coords),
        }
    }

    fn pop(&mut self) -> Option<Coordinate> {
        match self {
            Frontier::Queue(queue) => queue.pop_front(),
            Frontier::Stack(stack) => stack.pop(),
        }
    }

    fn len(&self) -> usize {
        match self {
            Frontier::Queue(queue) => queue.len(),
            Frontier::Stack(stack) => stack.len(),
        }
    }
}

/// One traversal over a private copy of a grid, advanced a cell at a time.
///
/// The frontier is a queue for BFS and a stack for DFS. DFS reshuffles its
/// expansion order on every step using the injected `rng`, BFS always expands
/// in `Direction::ALL` order.
pub struct Search<R> {
    solver: SolverKind,
    frontier: Frontier,
    visited: HashSet<Coordinate>,
    grid: Grid,
    rng: R,
    started: Instant,
    found: bool,
    finished: bool,
}

impl<R: Rng> Search<R> {
    pub fn new(
        solver: SolverKind,
        start: Coordinate,
        grid: &Grid,
        rng: R,
    ) -> Result<Self, TraversalError> {
        if !grid.in_bounds(start) {
            return Err(TraversalError::StartOutOfBounds {
                start,
                dims: grid.dims,
            });
        }

        let mut frontier = Frontier::for_solver(solver);
        frontier.push(start);

        let mut visited = HashSet::new();
        visited.insert(start);

        Ok(Self {
            solver,
            frontier,
            visited,
            grid: grid.clone(),
            rng,
            started: Instant::now(),
            found: false,
            finished: false,
        })
    }

    pub fn solver(&self) -> SolverKind {
        self.solver
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn complete(&mut self) -> Step {
        self.finished = true;
        let completion = Completion {
            solver: self.solver,
            elapsed: self.started.elapsed(),
            found: self.found,
        };
        info!(
            "{} finished in {}ms, end {}",
            self.solver,
            completion.elapsed_ms(),
            if self.found { "found" } else { "unreachable" }
        );

        Step::Finished(completion)
    }

    pub fn step(&mut self) -> Step {
        if self.finished {
            return self.complete();
        }

        let Some(current) = self.frontier.pop() else {
            return self.complete();
        };
        debug!("{} visiting {}", self.solver, current);

        let mut update = None;
        match self.grid.get(current) {
            Some(CellKind::End) => {
                self.found = true;
                return self.complete();
            }
            Some(CellKind::Path) => {
                self.grid.set_cell(current.x, current.y, CellKind::Visited);
                update = Some(self.grid.clone());
            }
            _ => {}
        }

        let mut directions = Direction::ALL;
        if self.solver == SolverKind::DFS {
            directions.shuffle(&mut self.rng);
        }

        for direction in directions {
            let Some(next) = self.grid.neighbor_of(current, direction, 1) else {
                continue;
            };
            let open = matches!(
                self.grid.get_cell(next.x, next.y),
                CellKind::Path | CellKind::End
            );
            if open && self.visited.insert(next) {
                self.frontier.push(next);
            }
        }
        debug!("{} frontier holds {}", self.solver, self.frontier.len());

        Step::Explored {
            cell: current,
            update,
        }
    }

    /// Steps until the search ends, without any pacing.
    pub fn run_to_end(&mut self) -> Completion {
        loop {
            if let Step::Finished(completion) = self.step() {
                return completion;
            }
        }
    }
}

/// Synchronous reachability check from `start` to any `end` cell.
pub fn solve<R: Rng>(
    solver: SolverKind,
    grid: &Grid,
    start: Coordinate,
    rng: R,
) -> Result<bool, TraversalError> {
    let mut search = Search::new(solver, start, grid, rng)?;

    Ok(search.run_to_end().found)
}
