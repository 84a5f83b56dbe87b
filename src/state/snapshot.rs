use crate::config::TrainingConfig;
use crate::infra::Position;
use crate::state::{CellKind, Grid};

/// Renderer-side copy of the board at one instant. Holds no references into the core.
#[derive(Debug, Clone, PartialEq)]
pub struct GridSnapshot {
    pub length: usize,
    pub width: usize,
    pub kinds: Vec<CellKind>,
    /// Every agent currently on the board, as `(agent_id, position)`.
    pub agents: Vec<(usize, Position)>,
    /// The agent whose move produced this snapshot, if any.
    pub mover: Option<usize>,
    pub steps_taken: usize,
    pub discount_factor: f64,
    pub learning_rate: f64,
    pub num_episodes: usize,
}

impl GridSnapshot {
    pub fn capture(
        grid: &Grid,
        agents: &[(usize, Position)],
        mover: Option<usize>,
        steps_taken: usize,
        config: &TrainingConfig,
    ) -> Self {
        Self {
            length: grid.length(),
            width: grid.width(),
            kinds: grid.cells().map(|cell| cell.kind).collect(),
            agents: agents.to_vec(),
            mover,
            steps_taken,
            discount_factor: config.discount_factor,
            learning_rate: config.learning_rate,
            num_episodes: config.num_episodes,
        }
    }

    /// The board before anything has moved: no agents, all counters zero.
    pub fn empty(grid: &Grid) -> Self {
        Self {
            length: grid.length(),
            width: grid.width(),
            kinds: grid.cells().map(|cell| cell.kind).collect(),
            agents: Vec::new(),
            mover: None,
            steps_taken: 0,
            discount_factor: 0.0,
            learning_rate: 0.0,
            num_episodes: 0,
        }
    }

    pub fn kind_at(&self, pos: Position) -> Option<CellKind> {
        if pos.x < 0 || pos.y < 0 || pos.x as usize >= self.width || pos.y as usize >= self.length {
            return None;
        }
        self.kinds.get(pos.y as usize * self.width + pos.x as usize).copied()
    }

    pub fn agent_at(&self, pos: Position) -> Option<usize> {
        self.agents
            .iter()
            .find(|(_, agent_pos)| *agent_pos == pos)
            .map(|(id, _)| *id)
    }

    pub fn draw_ascii_map(&self) -> String {
        let mut output = String::new();

        const RESET: &str = "\x1b[0m";
        const AGENT: &str = "\x1b[1;33m"; // Bright yellow
        const MOVER: &str = "\x1b[1;36m"; // Bright cyan
        const WALL: &str = "\x1b[90m"; // Dark gray
        const GOAL: &str = "\x1b[1;32m"; // Bright green
        const START: &str = "\x1b[2m"; // Dim

        for y in 0..self.length as i32 {
            for x in 0..self.width as i32 {
                let pos = Position::new(x, y);
                if let Some(id) = self.agent_at(pos) {
                    let color = if Some(id) == self.mover { MOVER } else { AGENT };
                    output.push_str(&format!("{}{}{}", color, agent_glyph(id), RESET));
                    continue;
                }
                let tile = match self.kind_at(pos) {
                    Some(CellKind::Wall) => format!("{}█{}", WALL, RESET),
                    Some(CellKind::Goal) => format!("{}G{}", GOAL, RESET),
                    Some(CellKind::Start) => format!("{}s{}", START, RESET),
                    Some(CellKind::Free) => " ".to_string(),
                    None => "?".to_string(),
                };
                output.push_str(&tile);
            }
            output.push('\n');
        }

        output.push_str(&format!(
            "Steps Taken: {} | Discount Factor: {} | Learning Rate: {} | Number of Episodes: {}\n",
            self.steps_taken, self.discount_factor, self.learning_rate, self.num_episodes
        ));
        output
    }
}

fn agent_glyph(id: usize) -> char {
    char::from_digit((id % 10) as u32, 10).unwrap_or('@')
}
