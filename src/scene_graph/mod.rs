pub mod scene;
pub mod scene_node;
pub mod transform;

pub use scene::{InstanceGroupId, NodeArena, Scene};
pub use scene_node::{NodeId, SceneNode, UpdateHook};
pub use transform::Transform;
