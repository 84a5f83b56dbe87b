mod channel_renderer;
mod composite_renderer;
mod default_renderer;
mod renderer;
mod types;

pub use channel_renderer::{ChannelRenderer, LogColor, LogMessage};
pub use composite_renderer::CompositeRenderer;
pub use default_renderer::DefaultRenderer;
pub use renderer::Renderer;
pub use types::{Action, NUM_ACTIONS, Position};
