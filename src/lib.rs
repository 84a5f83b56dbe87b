pub mod config;
pub mod error;
pub mod infra;
pub mod learning;
pub mod state;

// Re-export commonly used types for convenience
pub use config::TrainingConfig;
pub use error::{Error, Result};
pub use infra::{Action, Position, Renderer};
pub use learning::{TrainedRun, TrainingHandle, start_training};
pub use state::{BuiltinMaze, Grid, MazeProvider, TextMaze};
