use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::state::CellKind;

/// Supplies a maze as rows of raw cell codes (`0` free, `1` wall, `2` start, `3` goal).
pub trait MazeProvider {
    fn layout(&self) -> Result<Vec<Vec<i32>>>;
}

impl MazeProvider for Vec<Vec<i32>> {
    fn layout(&self) -> Result<Vec<Vec<i32>>> {
        Ok(self.clone())
    }
}

/// The five 10x10 mazes bundled with the program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinMaze {
    Maze1,
    Maze2,
    Maze3,
    Maze4,
    Maze5,
}

const MAZE1: [[i32; 10]; 10] = [
    [1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
    [1, 2, 0, 2, 0, 0, 0, 0, 0, 1],
    [1, 0, 1, 1, 1, 1, 1, 1, 0, 1],
    [1, 0, 0, 0, 0, 0, 2, 1, 0, 1],
    [1, 1, 1, 1, 1, 1, 1, 1, 0, 1],
    [1, 2, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 1, 1, 0, 1, 1, 1, 1, 1],
    [1, 0, 0, 0, 0, 1, 0, 0, 0, 1],
    [1, 1, 1, 1, 0, 0, 0, 1, 3, 1],
    [1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
];

const MAZE2: [[i32; 10]; 10] = [
    [1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
    [1, 2, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 1, 1, 1, 1, 1, 1, 0, 1],
    [1, 0, 1, 0, 0, 0, 0, 1, 0, 1],
    [1, 0, 1, 0, 1, 1, 0, 1, 0, 1],
    [1, 0, 1, 0, 3, 1, 0, 1, 0, 1],
    [1, 0, 1, 0, 0, 1, 0, 1, 0, 1],
    [1, 0, 1, 1, 1, 1, 0, 1, 0, 1],
    [1, 0, 0, 0, 0, 0, 0, 1, 2, 1],
    [1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
];

const MAZE3: [[i32; 10]; 10] = [
    [1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
    [1, 0, 0, 0, 1, 0, 0, 0, 0, 1],
    [1, 0, 1, 0, 1, 0, 1, 1, 0, 1],
    [1, 0, 1, 0, 0, 0, 1, 0, 0, 1],
    [1, 0, 1, 1, 1, 1, 1, 0, 1, 1],
    [1, 0, 0, 0, 0, 0, 1, 0, 0, 1],
    [1, 1, 1, 0, 1, 0, 1, 1, 0, 1],
    [1, 0, 0, 0, 1, 0, 2, 1, 0, 1],
    [1, 3, 1, 1, 1, 0, 1, 0, 2, 1],
    [1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
];

const MAZE4: [[i32; 10]; 10] = [
    [1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 1, 1, 1, 1, 1, 1, 0, 1],
    [1, 0, 1, 0, 0, 0, 0, 1, 0, 1],
    [1, 0, 1, 0, 1, 1, 0, 1, 0, 1],
    [1, 0, 1, 0, 2, 1, 0, 1, 0, 1],
    [1, 0, 1, 1, 1, 1, 0, 1, 0, 1],
    [1, 0, 0, 0, 0, 0, 0, 1, 0, 1],
    [1, 2, 1, 1, 1, 1, 1, 1, 3, 1],
    [1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
];

const MAZE5: [[i32; 10]; 10] = [
    [1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
    [1, 0, 0, 0, 0, 2, 0, 0, 0, 1],
    [1, 0, 1, 1, 1, 1, 1, 1, 0, 1],
    [1, 0, 1, 0, 0, 0, 0, 1, 0, 1],
    [1, 0, 1, 0, 1, 1, 0, 1, 0, 1],
    [1, 0, 1, 0, 1, 2, 0, 0, 0, 1],
    [1, 0, 1, 0, 1, 1, 1, 1, 1, 1],
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 1, 1, 1, 1, 1, 1, 3, 1],
    [1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
];

impl BuiltinMaze {
    pub const ALL: [BuiltinMaze; 5] = [
        BuiltinMaze::Maze1,
        BuiltinMaze::Maze2,
        BuiltinMaze::Maze3,
        BuiltinMaze::Maze4,
        BuiltinMaze::Maze5,
    ];

    fn rows(self) -> &'static [[i32; 10]; 10] {
        match self {
            BuiltinMaze::Maze1 => &MAZE1,
            BuiltinMaze::Maze2 => &MAZE2,
            BuiltinMaze::Maze3 => &MAZE3,
            BuiltinMaze::Maze4 => &MAZE4,
            BuiltinMaze::Maze5 => &MAZE5,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            BuiltinMaze::Maze1 => "maze1",
            BuiltinMaze::Maze2 => "maze2",
            BuiltinMaze::Maze3 => "maze3",
            BuiltinMaze::Maze4 => "maze4",
            BuiltinMaze::Maze5 => "maze5",
        }
    }
}

impl MazeProvider for BuiltinMaze {
    fn layout(&self) -> Result<Vec<Vec<i32>>> {
        Ok(self.rows().iter().map(|row| row.to_vec()).collect())
    }
}

impl fmt::Display for BuiltinMaze {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "{}", self.name())
    }
}

impl FromStr for BuiltinMaze {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase();
        let number = normalized.strip_prefix("maze").unwrap_or(&normalized);
        match number {
            "1" => Ok(BuiltinMaze::Maze1),
            "2" => Ok(BuiltinMaze::Maze2),
            "3" => Ok(BuiltinMaze::Maze3),
            "4" => Ok(BuiltinMaze::Maze4),
            "5" => Ok(BuiltinMaze::Maze5),
            _ => Err(Error::UnknownMaze {
                name: s.to_string(),
            }),
        }
    }
}

/// A maze drawn as text: `#` wall, `.` or space free, `S` start, `G` goal.
/// Digits `0`-`3` are accepted as raw codes. Blank lines are skipped.
#[derive(Debug, Clone)]
pub struct TextMaze {
    text: String,
}

impl TextMaze {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    fn symbol_code(symbol: char) -> Option<i32> {
        match symbol {
            '#' => Some(CellKind::WALL_CODE),
            '.' | ' ' => Some(CellKind::FREE_CODE),
            'S' | 's' => Some(CellKind::START_CODE),
            'G' | 'g' => Some(CellKind::GOAL_CODE),
            '0'..='3' => symbol.to_digit(10).map(|d| d as i32),
            _ => None,
        }
    }
}

impl MazeProvider for TextMaze {
    fn layout(&self) -> Result<Vec<Vec<i32>>> {
        self.text
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .filter(|line| !line.trim().is_empty())
            .enumerate()
            .map(|(y, line)| {
                line.chars()
                    .enumerate()
                    .map(|(x, symbol)| {
                        Self::symbol_code(symbol).ok_or(Error::UnknownCellSymbol { symbol, x, y })
                    })
                    .collect()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::Position;
    use crate::state::Grid;

    #[test]
    fn test_all_builtin_mazes_build() {
        for maze in BuiltinMaze::ALL {
            let grid = Grid::from_provider(&maze).unwrap();
            assert_eq!(grid.length(), 10);
            assert_eq!(grid.width(), 10);
            assert!(!grid.starts().is_empty(), "{} has no starts", maze);
        }
    }

    #[test]
    fn test_builtin_start_order_is_row_major() {
        let grid = Grid::from_provider(&BuiltinMaze::Maze1).unwrap();
        assert_eq!(
            grid.starts(),
            &[
                Position::new(1, 1),
                Position::new(3, 1),
                Position::new(6, 3),
                Position::new(1, 5),
            ]
        );
        assert_eq!(grid.goal(), Position::new(8, 8));
    }

    #[test]
    fn test_builtin_maze_from_str() {
        assert_eq!("maze3".parse::<BuiltinMaze>().unwrap(), BuiltinMaze::Maze3);
        assert_eq!("MAZE5".parse::<BuiltinMaze>().unwrap(), BuiltinMaze::Maze5);
        assert_eq!("2".parse::<BuiltinMaze>().unwrap(), BuiltinMaze::Maze2);
        assert!(matches!(
            "maze9".parse::<BuiltinMaze>(),
            Err(Error::UnknownMaze { .. })
        ));
    }

    #[test]
    fn test_text_maze_layout() {
        let text = "####\n#S.#\n\n#.G#\n####\n";
        let layout = TextMaze::new(text).layout().unwrap();
        assert_eq!(
            layout,
            vec![
                vec![1, 1, 1, 1],
                vec![1, 2, 0, 1],
                vec![1, 0, 3, 1],
                vec![1, 1, 1, 1],
            ]
        );
    }

    #[test]
    fn test_text_maze_rejects_unknown_symbol() {
        let result = TextMaze::new("#S?G#").layout();
        assert!(matches!(
            result,
            Err(Error::UnknownCellSymbol { symbol: '?', x: 2, y: 0 })
        ));
    }
}
