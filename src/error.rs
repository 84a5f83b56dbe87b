use thiserror::Error;

/// Errors raised while building a maze or running a training session.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("maze layout is empty")]
    EmptyMaze,

    #[error("maze row {row} has {got} cells, expected {expected}")]
    RaggedMaze {
        row: usize,
        expected: usize,
        got: usize,
    },

    #[error("unknown cell code {code} at ({x}, {y})")]
    UnknownCellCode { code: i32, x: usize, y: usize },

    #[error("unknown cell symbol '{symbol}' at ({x}, {y})")]
    UnknownCellSymbol { symbol: char, x: usize, y: usize },

    #[error("maze has no goal cell")]
    MissingGoal,

    #[error("maze has {count} goal cells, expected exactly one")]
    MultipleGoals { count: usize },

    #[error("maze has no start cells")]
    NoStartCells,

    #[error("requested {requested} agents but the maze only has {available} start cells")]
    TooManyAgents { requested: usize, available: usize },

    #[error("value table has {got} rows but the grid has {expected} cells")]
    TableSizeMismatch { expected: usize, got: usize },

    #[error("at least one agent is required")]
    NoAgents,

    #[error("unknown maze '{name}' (expected maze1..maze5)")]
    UnknownMaze { name: String },

    #[error("invalid configuration for {key}: {message}")]
    InvalidConfig { key: String, message: String },

    #[error("training worker for agent {agent_id} panicked")]
    WorkerPanicked { agent_id: usize },

    #[error("no async runtime available: {message}")]
    NoRuntime { message: String },

    #[error("worker could not be joined: {message}")]
    WorkerJoin { message: String },
}

pub type Result<T> = std::result::Result<T, Error>;
