mod agent_state;
mod grid;
mod maze;
mod snapshot;

pub use agent_state::{AgentPhase, AgentState};
pub use grid::{Cell, CellKind, Grid};
pub use maze::{BuiltinMaze, MazeProvider, TextMaze};
pub use snapshot::GridSnapshot;
