use crate::grids::{Coordinate, Dimensions};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum MazeError {
    #[error("maze dimensions must be at least 1x1, got {width}x{height}")]
    EmptyDimensions { width: usize, height: usize },

    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRows {
        row: usize,
        expected: usize,
        found: usize,
    },
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TraversalError {
    #[error("start {start} lies outside the {}x{} grid", .dims.columns, .dims.rows)]
    StartOutOfBounds { start: Coordinate, dims: Dimensions },
}
