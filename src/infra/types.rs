#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The position one cell away in the direction of `action`. May lie outside any grid.
    pub fn moved(&self, action: Action) -> Position {
        let (dx, dy) = action.delta();
        Position::new(self.x + dx, self.y + dy)
    }
}

/// The four moves an agent can make. The discriminant is the column in the value table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Up = 0,
    Down = 1,
    Left = 2,
    Right = 3,
}

pub const NUM_ACTIONS: usize = 4;

impl Action {
    /// Scan order used for tie breaking.
    pub const ALL: [Action; NUM_ACTIONS] = [Action::Up, Action::Down, Action::Left, Action::Right];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Action> {
        Self::ALL.get(index).copied()
    }

    pub fn delta(self) -> (i32, i32) {
        match self {
            Action::Up => (0, -1),
            Action::Down => (0, 1),
            Action::Left => (-1, 0),
            Action::Right => (1, 0),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Action::Up => "up",
            Action::Down => "down",
            Action::Left => "left",
            Action::Right => "right",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_index_round_trip() {
        for (i, action) in Action::ALL.iter().enumerate() {
            assert_eq!(action.index(), i);
            assert_eq!(Action::from_index(i), Some(*action));
        }
        assert_eq!(Action::from_index(4), None);
    }

    #[test]
    fn test_moved_follows_screen_coordinates() {
        let pos = Position::new(3, 3);
        assert_eq!(pos.moved(Action::Up), Position::new(3, 2));
        assert_eq!(pos.moved(Action::Down), Position::new(3, 4));
        assert_eq!(pos.moved(Action::Left), Position::new(2, 3));
        assert_eq!(pos.moved(Action::Right), Position::new(4, 3));
    }
}
