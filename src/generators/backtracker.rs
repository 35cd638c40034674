use log::{info, trace};
use rand::prelude::*;

use crate::error::MazeError;
use crate::generators::{normalize, Generator};
use crate::grids::{CellKind, Coordinate, Direction, Grid};

const ORIGIN: Coordinate = Coordinate::new(1, 1);

// one pending carve call: the cell and the directions it has left to try
struct Frame {
    cell: Coordinate,
    directions: [Direction; 4],
    next: usize,
}

/// Randomized depth-first carving on a 2-step lattice, driven by an explicit
/// stack instead of recursion.
pub struct RecursiveBacktracker<R: Rng> {
    grid: Grid,
    stack: Vec<Frame>,
    rng: R,
    pub done: bool,
}

impl<R: Rng> RecursiveBacktracker<R> {
    pub fn new(width: usize, height: usize, rng: R) -> Result<Self, MazeError> {
        if width == 0 || height == 0 {
            return Err(MazeError::EmptyDimensions { width, height });
        }

        let mut generator = Self {
            grid: Grid::with_dims(normalize(height), normalize(width)),
            stack: Vec::new(),
            rng,
            done: false,
        };

        if generator.grid.in_bounds(ORIGIN) {
            generator.carve(ORIGIN);
        }

        Ok(generator)
    }

    pub fn into_grid(self) -> Grid {
        self.grid
    }

    fn carve(&mut self, cell: Coordinate) {
        trace!("carving {}", cell);
        self.grid.set_cell(cell.x, cell.y, CellKind::Path);

        let mut directions = Direction::ALL;
        directions.shuffle(&mut self.rng);

        self.stack.push(Frame {
            cell,
            directions,
            next: 0,
        });
    }

    fn is_cell_valid(&self, coords: Coordinate) -> bool {
        self.grid.get(coords) == Some(CellKind::Wall)
    }

    fn finish(&mut self) {
        let (width, height) = (self.grid.width(), self.grid.height());

        self.grid.try_set(Coordinate::new(0, 1), CellKind::Start);
        if let (Some(x), Some(y)) = (width.checked_sub(2), height.checked_sub(2)) {
            self.grid.try_set(Coordinate::new(x, y), CellKind::End);
        }

        self.done = true;
        info!("generated {}x{} maze", width, height);
    }
}

impl<R: Rng> Generator for RecursiveBacktracker<R> {
    fn step_generation(&mut self) {
        if self.done {
            return;
        }

        loop {
            let Some(frame) = self.stack.last_mut() else {
                self.finish();
                return;
            };

            if frame.next == frame.directions.len() {
                self.stack.pop();
                continue;
            }

            let direction = frame.directions[frame.next];
            frame.next += 1;
            let cell = frame.cell;

            let target = self
                .grid
                .neighbor_of(cell, direction, 2)
                .filter(|n| self.is_cell_valid(*n));

            if let (Some(target), Some(between)) = (target, cell.offset(direction, 1)) {
                self.grid.set_cell(between.x, between.y, CellKind::Path);
                self.carve(target);
                return;
            }
        }
    }

    fn next_step(&mut self) -> &Grid {
        self.step_generation();
        &self.grid
    }

    fn generate_maze(&mut self) -> &Grid {
        while !self.done {
            self.step_generation();
        }

        &self.grid
    }

    fn is_done(&self) -> bool {
        self.done
    }
}

/// Builds a complete maze. Even dimensions shrink by one.
pub fn generate<R: Rng>(width: usize, height: usize, rng: R) -> Result<Grid, MazeError> {
    let mut generator = RecursiveBacktracker::new(width, height, rng)?;
    generator.generate_maze();

    Ok(generator.into_grid())
}
