use glam::{Mat4, Vec3};
use id_arena::{Arena, Id};
use slotmap::SlotMap;

use crate::camera::Camera;
use crate::collision::{CollisionManager, CollisionPair};
use crate::error::SceneError;
use crate::rendering::instancing::InstanceGroup;
use crate::scene_graph::scene_node::{NodeId, SceneNode};
use crate::time::FrameTime;

pub type NodeArena = SlotMap<NodeId, SceneNode>;
pub type InstanceGroupId = Id<InstanceGroup>;

/// A scene graph plus the camera that views it and the colliders and
/// instance groups that live alongside it.
///
/// Every node without a parent is a root. Detaching a node with
/// [`Scene::remove_child`] therefore leaves it in the scene as a root of its
/// own subtree; [`Scene::destroy_node`] is what frees it.
pub struct Scene {
    pub name: String,
    pub camera: Camera,
    nodes: NodeArena,
    collisions: CollisionManager,
    instance_groups: Arena<InstanceGroup>,
}

impl Scene {
    pub fn new(name: impl Into<String>, camera: Camera) -> Self {
        Self {
            name: name.into(),
            camera,
            nodes: SlotMap::with_key(),
            collisions: CollisionManager::new(),
            instance_groups: Arena::new(),
        }
    }

    /// Inserts a detached node, which makes it a root.
    pub fn add_node(&mut self, mut node: SceneNode) -> NodeId {
        node.parent_id = None;
        node.child_ids.clear();
        self.nodes.insert(node)
    }

    pub fn spawn_child(&mut self, parent: NodeId, node: SceneNode) -> Result<NodeId, SceneError> {
        if !self.nodes.contains_key(parent) {
            return Err(SceneError::NodeNotFound(parent));
        }

        let id = self.add_node(node);
        self.add_child(parent, id)?;
        Ok(id)
    }

    pub fn get_node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id)
    }

    pub fn get_node_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .find(|(_, node)| node.name == name)
            .map(|(id, _)| id)
    }

    pub fn nodes(&self) -> &NodeArena {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn roots(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .filter(|(_, node)| node.parent_id.is_none())
            .map(|(id, _)| id)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|node| node.parent_id)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id)
            .map(|node| node.child_ids.as_slice())
            .unwrap_or_default()
    }

    /// True if `ancestor` is `node` itself or lies on its parent chain.
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);

        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }

        false
    }

    /// Attaches `child` as the last child of `parent`. A child that already
    /// has a parent is detached from it first, so attaching to the same
    /// parent again moves it to the end of the sibling list.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), SceneError> {
        if !self.nodes.contains_key(parent) {
            return Err(SceneError::NodeNotFound(parent));
        }
        if !self.nodes.contains_key(child) {
            return Err(SceneError::NodeNotFound(child));
        }
        if parent == child {
            return Err(SceneError::SelfParenting(child));
        }
        if self.is_ancestor(child, parent) {
            return Err(SceneError::CycleDetected { parent, child });
        }

        if let Some(old_parent) = self.parent(child) {
            self.remove_child(old_parent, child)?;
            log::trace!("Re-parenting {:?} from {:?} to {:?}", child, old_parent, parent);
        }

        self.nodes[child].parent_id = Some(parent);
        self.nodes[parent].child_ids.push(child);

        Ok(())
    }

    /// Detaches `child` from `parent`. The child keeps its subtree and
    /// becomes a root. Sibling order is preserved.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), SceneError> {
        let parent_node = self
            .nodes
            .get_mut(parent)
            .ok_or(SceneError::NodeNotFound(parent))?;

        let Some(position) = parent_node.child_ids.iter().position(|&id| id == child) else {
            return Err(SceneError::NotAChild { parent, child });
        };

        parent_node.child_ids.remove(position);

        if let Some(child_node) = self.nodes.get_mut(child) {
            child_node.parent_id = None;
        }

        Ok(())
    }

    /// Frees a node and its whole subtree. Returns the number of nodes freed.
    ///
    /// Colliders registered for these nodes are not removed; they stop
    /// resolving and are skipped by the broad phase.
    pub fn destroy_node(&mut self, id: NodeId) -> Result<usize, SceneError> {
        if let Some(parent) = self.parent(id) {
            self.remove_child(parent, id)?;
        } else if !self.nodes.contains_key(id) {
            return Err(SceneError::NodeNotFound(id));
        }

        let subtree = self.collect_pre_order(id);
        for node_id in &subtree {
            self.nodes.remove(*node_id);
        }

        log::debug!("Destroyed {} node(s) under {:?}", subtree.len(), id);

        Ok(subtree.len())
    }

    /// Pre-order depth-first walk over every root's subtree. `enter` returns
    /// whether to descend into the node's children.
    ///
    /// The visitor only gets shared access, so the tree cannot be changed
    /// while it is being walked.
    pub fn traverse_filtered<F>(&self, mut enter: F)
    where
        F: FnMut(NodeId, &SceneNode) -> bool,
    {
        let mut stack: Vec<NodeId> = self.roots().collect();
        stack.reverse();
        self.walk(stack, &mut enter);
    }

    pub fn traverse<F>(&self, mut visitor: F)
    where
        F: FnMut(NodeId, &SceneNode),
    {
        self.traverse_filtered(|id, node| {
            visitor(id, node);
            true
        });
    }

    pub fn traverse_from<F>(&self, start: NodeId, mut visitor: F)
    where
        F: FnMut(NodeId, &SceneNode),
    {
        self.walk(vec![start], &mut |id: NodeId, node: &SceneNode| {
            visitor(id, node);
            true
        });
    }

    fn walk<F>(&self, mut stack: Vec<NodeId>, enter: &mut F)
    where
        F: FnMut(NodeId, &SceneNode) -> bool,
    {
        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes.get(id) else {
                continue;
            };

            if enter(id, node) {
                stack.extend(node.child_ids.iter().rev());
            }
        }
    }

    fn collect_pre_order(&self, start: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        self.traverse_from(start, |id, _| order.push(id));
        order
    }

    pub fn pre_order(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        self.traverse(|id, _| order.push(id));
        order
    }

    /// Runs every node's update hook once, in pre-order.
    pub fn run_update_hooks(&mut self, time: FrameTime) {
        for id in self.pre_order() {
            if let Some(node) = self.nodes.get_mut(id) {
                node.run_update_hook(time);
            }
        }
    }

    /// Recomputes world matrices top-down from every root.
    pub fn update_world_matrices(&mut self) {
        let roots: Vec<NodeId> = self.roots().collect();

        for root in roots {
            self.update_world_matrix(root, None);
        }
    }

    /// Sets `world = parent_world * local` (or `local` without a parent
    /// matrix) for `id`, then recurses into its children with the new world.
    pub fn update_world_matrix(&mut self, id: NodeId, parent_world: Option<Mat4>) {
        let mut stack = vec![(id, parent_world)];

        while let Some((id, parent_world)) = stack.pop() {
            let Some(node) = self.nodes.get_mut(id) else {
                continue;
            };

            let local = node.transform.local_matrix();
            let world = match parent_world {
                Some(parent_world) => parent_world * local,
                None => local,
            };
            node.world_matrix = world;

            stack.extend(node.child_ids.iter().rev().map(|&child| (child, Some(world))));
        }
    }

    pub fn world_position(&self, id: NodeId) -> Option<Vec3> {
        self.nodes.get(id).map(SceneNode::world_position)
    }

    pub fn collisions(&self) -> &CollisionManager {
        &self.collisions
    }

    pub fn collisions_mut(&mut self) -> &mut CollisionManager {
        &mut self.collisions
    }

    /// Broad phase over this scene's colliders using the current world
    /// matrices.
    pub fn check_collisions(&mut self) -> Vec<CollisionPair> {
        self.collisions.check_collisions(&self.nodes)
    }

    pub fn add_instance_group(&mut self, group: InstanceGroup) -> InstanceGroupId {
        self.instance_groups.alloc(group)
    }

    pub fn instance_group(&self, id: InstanceGroupId) -> Option<&InstanceGroup> {
        self.instance_groups.get(id)
    }

    pub fn instance_group_mut(&mut self, id: InstanceGroupId) -> Option<&mut InstanceGroup> {
        self.instance_groups.get_mut(id)
    }

    pub fn instance_groups(&self) -> impl Iterator<Item = (InstanceGroupId, &InstanceGroup)> + '_ {
        self.instance_groups.iter()
    }

    pub fn instance_groups_mut(
        &mut self,
    ) -> impl Iterator<Item = (InstanceGroupId, &mut InstanceGroup)> + '_ {
        self.instance_groups.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene() -> Scene {
        Scene::new("test", Camera::default())
    }

    #[test]
    fn chain_propagates_translation() {
        let mut scene = scene();
        let root = scene.add_node(SceneNode::new("root").with_position(Vec3::new(1.0, 0.0, 0.0)));
        let a = scene
            .spawn_child(root, SceneNode::new("a").with_position(Vec3::new(2.0, 0.0, 0.0)))
            .unwrap();
        let b = scene
            .spawn_child(a, SceneNode::new("b").with_position(Vec3::new(3.0, 0.0, 0.0)))
            .unwrap();

        scene.update_world_matrices();

        assert_eq!(scene.world_position(b), Some(Vec3::new(6.0, 0.0, 0.0)));
    }

    #[test]
    fn self_parenting_is_rejected() {
        let mut scene = scene();
        let a = scene.add_node(SceneNode::new("a"));

        assert_eq!(scene.add_child(a, a), Err(SceneError::SelfParenting(a)));
    }

    #[test]
    fn cycles_are_rejected_and_tree_is_unchanged() {
        let mut scene = scene();
        let a = scene.add_node(SceneNode::new("a"));
        let b = scene.spawn_child(a, SceneNode::new("b")).unwrap();
        let c = scene.spawn_child(b, SceneNode::new("c")).unwrap();

        assert_eq!(
            scene.add_child(c, a),
            Err(SceneError::CycleDetected { parent: c, child: a })
        );
        assert_eq!(scene.parent(a), None);
        assert_eq!(scene.children(c), &[] as &[NodeId]);
    }

    #[test]
    fn pre_order_visits_parent_before_children() {
        let mut scene = scene();
        let root = scene.add_node(SceneNode::new("root"));
        let a = scene.spawn_child(root, SceneNode::new("a")).unwrap();
        let a1 = scene.spawn_child(a, SceneNode::new("a1")).unwrap();
        let b = scene.spawn_child(root, SceneNode::new("b")).unwrap();

        assert_eq!(scene.pre_order(), vec![root, a, a1, b]);
    }

    #[test]
    fn destroy_frees_subtree() {
        let mut scene = scene();
        let root = scene.add_node(SceneNode::new("root"));
        let a = scene.spawn_child(root, SceneNode::new("a")).unwrap();
        let a1 = scene.spawn_child(a, SceneNode::new("a1")).unwrap();

        assert_eq!(scene.destroy_node(a), Ok(2));
        assert!(!scene.contains(a));
        assert!(!scene.contains(a1));
        assert!(scene.children(root).is_empty());
        assert_eq!(scene.destroy_node(a), Err(SceneError::NodeNotFound(a)));
    }

    #[test]
    fn find_by_name() {
        let mut scene = scene();
        let can = scene.add_node(SceneNode::new("can"));

        assert_eq!(scene.find_by_name("can"), Some(can));
        assert_eq!(scene.find_by_name("missing"), None);
    }
}
