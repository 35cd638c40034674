use crate::error::MazeError;
use crate::grids::{CellKind, Coordinate, Dimensions, Direction};

/// Row-major block maze, indexed `[row][col]` through `get_cell(x, y)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    pub dims: Dimensions,

    cells: Vec<CellKind>,
}

impl Grid {
    pub fn with_dims(rows: usize, columns: usize) -> Self {
        Self {
            cells: vec![CellKind::Wall; rows * columns],
            dims: Dimensions { rows, columns },
        }
    }

    /// Builds a grid from explicit rows. Every row must be as long as the first.
    pub fn from_rows<R>(rows: R) -> Result<Self, MazeError>
    where
        R: IntoIterator,
        R::Item: AsRef<[CellKind]>,
    {
        let mut cells = Vec::new();
        let mut columns = None;
        let mut row_count = 0;

        for (row, kinds) in rows.into_iter().enumerate() {
            let kinds = kinds.as_ref();
            let expected = *columns.get_or_insert(kinds.len());
            if kinds.len() != expected {
                return Err(MazeError::RaggedRows {
                    row,
                    expected,
                    found: kinds.len(),
                });
            }
            cells.extend_from_slice(kinds);
            row_count += 1;
        }

        let columns = columns.unwrap_or(0);
        if row_count == 0 || columns == 0 {
            return Err(MazeError::EmptyDimensions {
                width: columns,
                height: row_count,
            });
        }

        Ok(Self {
            cells,
            dims: Dimensions {
                rows: row_count,
                columns,
            },
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.dims.columns
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.dims.rows
    }

    #[inline]
    fn index_of(&self, x: usize, y: usize) -> usize {
        (self.dims.columns * y) + x
    }

    #[inline]
    pub fn in_bounds(&self, coords: Coordinate) -> bool {
        coords.x < self.dims.columns && coords.y < self.dims.rows
    }

    /// Panics on out of bounds access, same as slice indexing.
    #[inline]
    pub fn get_cell(&self, x: usize, y: usize) -> CellKind {
        self.cells[self.index_of(x, y)]
    }

    #[inline]
    pub fn get(&self, coords: Coordinate) -> Option<CellKind> {
        if self.in_bounds(coords) {
            Some(self.get_cell(coords.x, coords.y))
        } else {
            None
        }
    }

    // returns the previous kind
    pub fn set_cell(&mut self, x: usize, y: usize, kind: CellKind) -> CellKind {
        let index = self.index_of(x, y);
        let prev_kind = self.cells[index];
        self.cells[index] = kind;

        prev_kind
    }

    /// Sets the cell only when it exists, reporting whether it did.
    pub fn try_set(&mut self, coords: Coordinate, kind: CellKind) -> bool {
        if self.in_bounds(coords) {
            self.set_cell(coords.x, coords.y, kind);
            true
        } else {
            false
        }
    }

    // returns coords of neighbor, if it is on the grid
    pub fn neighbor_of(
        &self,
        coords: Coordinate,
        direction: Direction,
        distance: usize,
    ) -> Option<Coordinate> {
        coords
            .offset(direction, distance)
            .filter(|n| self.in_bounds(*n))
    }

    pub fn rows(&self) -> impl Iterator<Item = &[CellKind]> {
        // chunks panics on zero, and a zero-width grid has no rows anyway
        self.cells
            .chunks(self.dims.columns.max(1))
            .take(self.dims.rows)
    }

    pub fn to_rows(&self) -> Vec<Vec<CellKind>> {
        self.rows().map(<[CellKind]>::to_vec).collect()
    }

    pub fn find(&self, kind: CellKind) -> Option<Coordinate> {
        self.cells.iter().position(|k| *k == kind).map(|index| Coordinate {
            x: index % self.dims.columns,
            y: index / self.dims.columns,
        })
    }

    pub fn start(&self) -> Option<Coordinate> {
        self.find(CellKind::Start)
    }

    pub fn end(&self) -> Option<Coordinate> {
        self.find(CellKind::End)
    }

    pub fn count(&self, kind: CellKind) -> usize {
        self.cells.iter().filter(|k| **k == kind).count()
    }

    /// Turns explored cells back into plain path so another search can run.
    pub fn clear_visited(&mut self) {
        for cell in self.cells.iter_mut() {
            if *cell == CellKind::Visited {
                *cell = CellKind::Path;
            }
        }
    }
}
