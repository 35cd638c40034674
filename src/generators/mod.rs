pub mod backtracker;

pub use backtracker::{generate, RecursiveBacktracker};

use crate::grids::Grid;

pub trait Generator {
    /// Carves until one more cell has been opened, or finishes the maze.
    fn step_generation(&mut self);
    fn next_step(&mut self) -> &Grid;
    fn generate_maze(&mut self) -> &Grid;
    fn is_done(&self) -> bool;
}

/// Drops even dimensions by one so carving lands on odd lattice coordinates.
#[inline]
pub fn normalize(dimension: usize) -> usize {
    if dimension % 2 == 0 {
        dimension.saturating_sub(1)
    } else {
        dimension
    }
}
