//! Scene graph and per-frame render orchestration.
//!
//! A [`SceneManager`] owns one or more [`Scene`]s, each a forest of
//! [`SceneNode`]s with local transforms. Every frame it runs node update
//! hooks, propagates world matrices, checks registered colliders, culls
//! renderable nodes against the camera frustum and hands the survivors to a
//! [`Renderer`], batched by material.

pub mod assets;
pub mod camera;
pub mod collision;
pub mod error;
pub mod math;
pub mod rendering;
pub mod scene_graph;
pub mod scene_manager;
pub mod scheduler;
pub mod time;

pub use assets::{AssetLibrary, AssetProvider, GeometryHandle, MaterialHandle};
pub use camera::Camera;
pub use collision::{ColliderId, CollisionManager, CollisionPair};
pub use error::SceneError;
pub use rendering::{HeadlessRenderer, RenderConfig, Renderable, Renderer};
pub use scene_graph::{NodeId, Scene, SceneNode, Transform};
pub use scene_manager::{FrameStats, LoopState, SceneId, SceneManager};
pub use scheduler::{FrameScheduler, ManualScheduler};
pub use time::{FrameClock, FrameTime};
