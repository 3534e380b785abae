pub mod batch_manager;
pub mod config;
pub mod headless;
pub mod instancing;
pub mod renderer;

pub use batch_manager::{BatchManager, BatchReport, DrawFailure, DrawItem};
pub use config::RenderConfig;
pub use headless::{HeadlessRenderer, RenderCommand, RenderStats};
pub use renderer::{Renderable, RenderableRef, Renderer};
