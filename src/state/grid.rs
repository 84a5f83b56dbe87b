use crate::error::{Error, Result};
use crate::infra::{Action, Position};
use crate::state::MazeProvider;
use tracing::debug;

/// What occupies a cell. Fixed once the grid is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellKind {
    Free,
    Wall,
    Start,
    Goal,
}

impl CellKind {
    pub const FREE_CODE: i32 = 0;
    pub const WALL_CODE: i32 = 1;
    pub const START_CODE: i32 = 2;
    pub const GOAL_CODE: i32 = 3;

    pub fn from_code(code: i32) -> Option<CellKind> {
        match code {
            Self::FREE_CODE => Some(CellKind::Free),
            Self::WALL_CODE => Some(CellKind::Wall),
            Self::START_CODE => Some(CellKind::Start),
            Self::GOAL_CODE => Some(CellKind::Goal),
            _ => None,
        }
    }

    pub fn code(self) -> i32 {
        match self {
            CellKind::Free => Self::FREE_CODE,
            CellKind::Wall => Self::WALL_CODE,
            CellKind::Start => Self::START_CODE,
            CellKind::Goal => Self::GOAL_CODE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
    pub kind: CellKind,
}

impl Cell {
    pub fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }

    pub fn is_wall(&self) -> bool {
        self.kind == CellKind::Wall
    }

    pub fn is_goal(&self) -> bool {
        self.kind == CellKind::Goal
    }

    pub fn is_start(&self) -> bool {
        self.kind == CellKind::Start
    }
}

/// Rectangular maze with exactly one goal.
///
/// `length` counts rows and `width` counts columns. Cells are stored row-major, so the
/// value-table address of a cell is `y * width + x`.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    length: usize,
    width: usize,
    cells: Vec<Cell>,
    goal: Position,
    starts: Vec<Position>,
}

impl Grid {
    /// Builds a grid from rows of raw cell codes (`0` free, `1` wall, `2` start, `3` goal).
    pub fn from_codes(rows: &[Vec<i32>]) -> Result<Self> {
        let length = rows.len();
        let width = rows.first().map(|row| row.len()).unwrap_or(0);
        if length == 0 || width == 0 {
            return Err(Error::EmptyMaze);
        }

        let mut cells = Vec::with_capacity(length * width);
        let mut goals = Vec::new();
        let mut starts = Vec::new();

        for (y, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(Error::RaggedMaze {
                    row: y,
                    expected: width,
                    got: row.len(),
                });
            }
            for (x, &code) in row.iter().enumerate() {
                let kind = CellKind::from_code(code).ok_or(Error::UnknownCellCode { code, x, y })?;
                let cell = Cell {
                    x: x as i32,
                    y: y as i32,
                    kind,
                };
                match kind {
                    CellKind::Goal => goals.push(cell.position()),
                    CellKind::Start => starts.push(cell.position()),
                    _ => {}
                }
                cells.push(cell);
            }
        }

        let goal = match goals.as_slice() {
            [] => return Err(Error::MissingGoal),
            [goal] => *goal,
            _ => return Err(Error::MultipleGoals { count: goals.len() }),
        };

        let grid = Self {
            length,
            width,
            cells,
            goal,
            starts,
        };
        debug!(
            "Built {}x{} grid with {} start cells, goal at ({}, {})\n{}",
            length,
            width,
            grid.starts.len(),
            goal.x,
            goal.y,
            grid.draw_ascii()
        );
        Ok(grid)
    }

    pub fn from_provider(provider: &dyn MazeProvider) -> Result<Self> {
        Self::from_codes(&provider.layout()?)
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn goal(&self) -> Position {
        self.goal
    }

    /// Start cells in row-major order. Agent `i` starts on `starts()[i]`.
    pub fn starts(&self) -> &[Position] {
        &self.starts
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.width && (pos.y as usize) < self.length
    }

    /// Value-table address of `pos`. Callers must only pass positions inside the grid.
    pub fn index(&self, pos: Position) -> usize {
        debug_assert!(self.contains(pos), "position {:?} outside grid", pos);
        pos.y as usize * self.width + pos.x as usize
    }

    pub fn get(&self, pos: Position) -> Option<&Cell> {
        if self.contains(pos) {
            self.cells.get(self.index(pos))
        } else {
            None
        }
    }

    /// The cell at `pos`. Panics outside the grid.
    pub fn cell(&self, pos: Position) -> &Cell {
        &self.cells[self.index(pos)]
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// Transition function. A move off the board or into a wall leaves the agent where it is.
    pub fn step(&self, pos: Position, action: Action) -> Position {
        let target = pos.moved(action);
        match self.get(target) {
            Some(cell) if !cell.is_wall() => target,
            _ => pos,
        }
    }

    /// The layout as rows of codes, one row per line.
    pub fn draw_ascii(&self) -> String {
        let mut output = String::new();
        for row in self.cells.chunks(self.width) {
            let line: Vec<String> = row.iter().map(|cell| cell.kind.code().to_string()).collect();
            output.push_str(&line.join(" "));
            output.push('\n');
        }
        output
    }
}
