pub mod block_grid;

pub use block_grid::Grid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub rows: usize,
    pub columns: usize,
}

/// Column/row pair. `x` indexes columns, `y` indexes rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Coordinate {
    pub x: usize,
    pub y: usize,
}

impl Coordinate {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Moves `distance` cells along `direction`, `None` if that leaves the
    /// non-negative quadrant. Upper bounds are the grid's business.
    pub fn offset(self, direction: Direction, distance: usize) -> Option<Coordinate> {
        let (dx, dy) = direction.delta();
        let x = step(self.x, dx, distance)?;
        let y = step(self.y, dy, distance)?;

        Some(Coordinate { x, y })
    }
}

#[inline]
fn step(value: usize, delta: isize, distance: usize) -> Option<usize> {
    match delta {
        0 => Some(value),
        d if d > 0 => value.checked_add(distance),
        _ => value.checked_sub(distance),
    }
}

impl From<(usize, usize)> for Coordinate {
    fn from((x, y): (usize, usize)) -> Self {
        Self { x, y }
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// north grows the row index, same as the old bottom-up renderer did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    North = 0,
    East = 1,
    South = 2,
    West = 3,
}

impl Direction {
    /// Canonical expansion order: (0,1), (1,0), (0,-1), (-1,0).
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    pub fn delta(self) -> (isize, isize) {
        match self {
            Direction::North => (0, 1),
            Direction::East => (1, 0),
            Direction::South => (0, -1),
            Direction::West => (-1, 0),
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum CellKind {
    Wall = 0,
    Path = 1,
    Start = 2,
    End = 3,
    Visited = 4,
}

impl From<CellKind> for char {
    fn from(kind: CellKind) -> Self {
        match kind {
            CellKind::Wall => '#',
            CellKind::Path => ' ',
            CellKind::Start => 'S',
            CellKind::End => 'E',
            CellKind::Visited => '.',
        }
    }
}
