use std::env;
use std::sync::Arc;

use dotenv::dotenv;
use qmaze::infra::DefaultRenderer;
use qmaze::learning::{RolloutOutcome, join_rollouts};
use qmaze::{BuiltinMaze, Error, Grid, TextMaze, TrainingConfig, start_training};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn get_env_var_usize(key: &str) -> Result<Option<usize>, Error> {
    match env::var(key) {
        Ok(val) => val
            .trim()
            .parse::<usize>()
            .map(Some)
            .map_err(|e| Error::InvalidConfig {
                key: key.to_string(),
                message: e.to_string(),
            }),
        Err(_) => Ok(None),
    }
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("qmaze=debug,info"));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
}

fn load_grid() -> Result<Grid, Box<dyn std::error::Error>> {
    if let Ok(path) = env::var("QMAZE_MAZE_FILE") {
        tracing::info!("Loading maze from {}", path);
        let text = std::fs::read_to_string(&path)?;
        return Ok(Grid::from_provider(&TextMaze::new(text))?);
    }

    let maze = match env::var("QMAZE_MAZE") {
        Ok(name) => name.parse::<BuiltinMaze>()?,
        Err(_) => BuiltinMaze::Maze1,
    };
    tracing::info!("Using built-in maze {}", maze);
    Ok(Grid::from_provider(&maze)?)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    init_logging();

    let grid = load_grid()?;
    let num_agents = get_env_var_usize("QMAZE_AGENTS")?.unwrap_or(grid.starts().len());
    let draw_board = match env::var("QMAZE_RENDER").as_deref() {
        Ok("ascii") | Err(_) => true,
        Ok("log") => false,
        Ok(other) => {
            return Err(Error::InvalidConfig {
                key: "QMAZE_RENDER".to_string(),
                message: format!("expected `ascii` or `log`, got `{}`", other),
            }
            .into());
        }
    };
    let config = TrainingConfig::from_env()?;

    tracing::info!("Board rendering enabled: {}", draw_board);

    let handle = start_training(
        grid,
        num_agents,
        config,
        Arc::new(DefaultRenderer::new(draw_board)),
    )?;
    let run = handle.trained().await?;

    let abort_handles: Vec<_> = run.rollouts.iter().map(|r| r.abort_handle()).collect();
    let mut joined = tokio::spawn(join_rollouts(run.rollouts));

    let reports = tokio::select! {
        reports = &mut joined => reports?,
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("Interrupted, stopping {} rollouts", abort_handles.len());
            for abort in &abort_handles {
                abort.abort();
            }
            joined.await?
        }
    }?;

    let completed = reports
        .iter()
        .filter(|r| r.outcome == RolloutOutcome::ReachedGoal)
        .count();
    tracing::info!(
        "{} of {} agents reached the goal (seed {})",
        completed,
        reports.len(),
        run.summary.base_seed
    );

    Ok(())
}
