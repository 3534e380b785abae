use glam::{Mat4, Vec3};
use slotmap::new_key_type;

use crate::math::Bounds;
use crate::rendering::Renderable;
use crate::scene_graph::transform::Transform;
use crate::time::FrameTime;

new_key_type! {
    /// Generational handle to a node. Handles to destroyed nodes never
    /// resolve again, even after the slot is reused.
    pub struct NodeId;
}

/// Per-node behaviour run once per tick, before world matrices are propagated.
pub type UpdateHook = Box<dyn FnMut(&mut Transform, FrameTime)>;

pub struct SceneNode {
    pub name: String,
    pub transform: Transform,
    /// Hidden nodes are still updated but neither they nor their descendants
    /// are drawn.
    pub visible: bool,
    pub(crate) parent_id: Option<NodeId>,
    pub(crate) child_ids: Vec<NodeId>,
    pub(crate) world_matrix: Mat4,
    renderable: Option<Renderable>,
    bounds: Option<Bounds>,
    update_hook: Option<UpdateHook>,
}

impl SceneNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.transform.set_position(position);
        self
    }

    pub fn with_bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = Some(bounds);
        self
    }

    pub fn with_renderable(mut self, renderable: Renderable, bounds: Bounds) -> Self {
        self.set_renderable(renderable, bounds);
        self
    }

    pub fn with_update_hook<F>(mut self, hook: F) -> Self
    where
        F: FnMut(&mut Transform, FrameTime) + 'static,
    {
        self.update_hook = Some(Box::new(hook));
        self
    }

    pub fn parent_id(&self) -> Option<NodeId> {
        self.parent_id
    }

    pub fn child_ids(&self) -> &[NodeId] {
        &self.child_ids
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    pub fn local_matrix(&self) -> Mat4 {
        self.transform.local_matrix()
    }

    /// Only meaningful after the scene's world-matrix pass has run since the
    /// last transform change anywhere above this node.
    pub fn world_matrix(&self) -> Mat4 {
        self.world_matrix
    }

    pub fn world_position(&self) -> Vec3 {
        self.world_matrix.w_axis.truncate()
    }

    pub fn renderable(&self) -> Option<&Renderable> {
        self.renderable.as_ref()
    }

    /// Object-space bounds; they do not change once set from geometry.
    pub fn bounds(&self) -> Option<&Bounds> {
        self.bounds.as_ref()
    }

    pub fn set_renderable(&mut self, renderable: Renderable, bounds: Bounds) {
        self.renderable = Some(renderable);
        self.bounds = Some(bounds);
    }

    pub fn set_bounds(&mut self, bounds: Bounds) {
        self.bounds = Some(bounds);
    }

    pub fn take_renderable(&mut self) -> Option<Renderable> {
        self.renderable.take()
    }

    pub fn set_update_hook<F>(&mut self, hook: F)
    where
        F: FnMut(&mut Transform, FrameTime) + 'static,
    {
        self.update_hook = Some(Box::new(hook));
    }

    pub fn clear_update_hook(&mut self) {
        self.update_hook = None;
    }

    pub fn has_update_hook(&self) -> bool {
        self.update_hook.is_some()
    }

    pub(crate) fn run_update_hook(&mut self, time: FrameTime) {
        if let Some(hook) = self.update_hook.as_mut() {
            hook(&mut self.transform, time);
        }
    }
}

impl Default for SceneNode {
    fn default() -> Self {
        Self {
            name: String::new(),
            transform: Transform::default(),
            visible: true,
            parent_id: None,
            child_ids: Vec::new(),
            world_matrix: Mat4::IDENTITY,
            renderable: None,
            bounds: None,
            update_hook: None,
        }
    }
}

impl std::fmt::Debug for SceneNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneNode")
            .field("name", &self.name)
            .field("visible", &self.visible)
            .field("parent_id", &self.parent_id)
            .field("child_ids", &self.child_ids)
            .field("renderable", &self.renderable)
            .field("has_update_hook", &self.update_hook.is_some())
            .finish()
    }
}
