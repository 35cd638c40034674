use crate::grids::Grid;
use crate::records::format_time;
use crate::solvers::SolverKind;

/// Clears the terminal and homes the cursor.
pub const CLEAR: &str = "\x1b[2J\x1b[H";

// each cell is drawn two columns wide so the maze keeps a square-ish aspect
pub fn render(grid: &Grid) -> String {
    let mut out = String::with_capacity((grid.width() * 2 + 1) * grid.height());

    for row in grid.rows() {
        for kind in row {
            let glyph: char = (*kind).into();
            out.push(glyph);
            out.push(glyph);
        }
        out.push('\n');
    }

    out
}

pub fn stopwatch(elapsed_ms: u128, running: Option<SolverKind>) -> String {
    match running {
        Some(solver) => format!(
            "Current Timer: {} (Running: {})",
            format_time(elapsed_ms),
            solver
        ),
        None => format!("Current Timer: {}", format_time(elapsed_ms)),
    }
}

/// One full redraw: stopwatch line on top, maze below.
pub fn frame(grid: &Grid, elapsed_ms: u128, running: Option<SolverKind>) -> String {
    format!("{}{}\n\n{}", CLEAR, stopwatch(elapsed_ms, running), render(grid))
}

#[cfg(test)]
mod test_renderer {
    use super::*;
    use crate::grids::CellKind::*;

    #[test]
    fn draws_each_cell_twice() {
        let grid = Grid::from_rows(vec![
            vec![Wall, Wall, Wall],
            vec![Start, Visited, End],
        ])
        .unwrap();

        assert_eq!(render(&grid), "######\nSS..EE\n");
    }

    #[test]
    fn stopwatch_names_the_running_solver() {
        assert_eq!(
            stopwatch(2050, Some(SolverKind::DFS)),
            "Current Timer: 2.050s (Running: DFS)"
        );
        assert_eq!(stopwatch(0, None), "Current Timer: 0.000s");
    }

    #[test]
    fn frame_starts_with_clear() {
        let grid = Grid::from_rows(vec![vec![Path]]).unwrap();
        let drawn = frame(&grid, 10, None);

        assert!(drawn.starts_with(CLEAR));
        assert!(drawn.ends_with("  \n"));
    }
}
