//! Broad-phase collision detection between registered scene nodes.
//!
//! Every registered pair is tested, so a check is O(n²) in the number of
//! colliders. That is fine for tens to a few hundred objects; larger scenes
//! need a spatial index in front of this.

use itertools::Itertools;
use slotmap::{new_key_type, SlotMap};

use crate::math::{BoundingVolume, VolumeKind};
use crate::scene_graph::{NodeArena, NodeId};

new_key_type! {
    pub struct ColliderId;
}

/// Called with the node on the other side of a detected pair.
pub type CollisionCallback = Box<dyn FnMut(NodeId)>;

struct Collider {
    node: NodeId,
    kind: VolumeKind,
    callback: Option<CollisionCallback>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionPair {
    pub a: NodeId,
    pub b: NodeId,
}

impl CollisionPair {
    pub fn involves(&self, node: NodeId) -> bool {
        self.a == node || self.b == node
    }
}

/// Registry of nodes taking part in collision checks.
///
/// Registrations are not tied to node lifetime. A collider whose node has
/// been destroyed (or has no bounds) simply fails to resolve and is skipped,
/// but it stays registered until [`CollisionManager::remove_collider`].
#[derive(Default)]
pub struct CollisionManager {
    colliders: SlotMap<ColliderId, Collider>,
}

impl CollisionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `node`. A node has at most one collider: registering it
    /// again replaces the volume kind and callback and keeps the same id.
    pub fn add_collider(
        &mut self,
        node: NodeId,
        kind: VolumeKind,
        callback: Option<CollisionCallback>,
    ) -> ColliderId {
        if let Some((id, existing)) = self
            .colliders
            .iter_mut()
            .find(|(_, collider)| collider.node == node)
        {
            log::debug!("Replacing collider {:?} for node {:?}", id, node);
            existing.kind = kind;
            existing.callback = callback;
            return id;
        }

        self.colliders.insert(Collider {
            node,
            kind,
            callback,
        })
    }

    pub fn collider_for(&self, node: NodeId) -> Option<ColliderId> {
        self.colliders
            .iter()
            .find(|(_, collider)| collider.node == node)
            .map(|(id, _)| id)
    }

    pub fn remove_collider(&mut self, id: ColliderId) -> bool {
        self.colliders.remove(id).is_some()
    }

    /// Drops the collider registered for `node`, if any.
    pub fn remove_node(&mut self, node: NodeId) -> bool {
        match self.collider_for(node) {
            Some(id) => self.remove_collider(id),
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }

    /// Tests every unordered pair of resolvable colliders once against their
    /// world-space volumes. For each intersecting pair both callbacks run and
    /// the pair is returned.
    pub fn check_collisions(&mut self, nodes: &NodeArena) -> Vec<CollisionPair> {
        let resolved: Vec<(ColliderId, NodeId, BoundingVolume)> = self
            .colliders
            .iter()
            .filter_map(|(id, collider)| {
                let Some(node) = nodes.get(collider.node) else {
                    log::debug!("Skipping collider {:?}: node {:?} is gone", id, collider.node);
                    return None;
                };
                let bounds = node.bounds()?;
                let volume = bounds.world_volume(collider.kind, &node.world_matrix());
                Some((id, collider.node, volume))
            })
            .collect();

        let hits: Vec<(ColliderId, ColliderId, CollisionPair)> = resolved
            .iter()
            .tuple_combinations()
            .filter(|((_, _, volume_a), (_, _, volume_b))| volume_a.intersects(volume_b))
            .map(|((collider_a, node_a, _), (collider_b, node_b, _))| {
                (
                    *collider_a,
                    *collider_b,
                    CollisionPair {
                        a: *node_a,
                        b: *node_b,
                    },
                )
            })
            .collect();

        for (collider_a, collider_b, pair) in &hits {
            self.notify(*collider_a, pair.b);
            self.notify(*collider_b, pair.a);
        }

        if !hits.is_empty() {
            log::trace!("{} collision pair(s) this frame", hits.len());
        }

        hits.into_iter().map(|(_, _, pair)| pair).collect()
    }

    fn notify(&mut self, collider: ColliderId, other: NodeId) {
        if let Some(callback) = self
            .colliders
            .get_mut(collider)
            .and_then(|collider| collider.callback.as_mut())
        {
            callback(other);
        }
    }
}
