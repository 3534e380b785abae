use thiserror::Error;

use crate::scene_graph::NodeId;

/// Structural errors reported by the mutating scene operations.
///
/// The tree is left unchanged whenever one of these is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    #[error("Node not found: {0:?}")]
    NodeNotFound(NodeId),

    #[error("Node {0:?} cannot be attached to itself")]
    SelfParenting(NodeId),

    #[error("Attaching {child:?} under {parent:?} would make it its own ancestor")]
    CycleDetected { parent: NodeId, child: NodeId },

    #[error("Node {child:?} is not a child of {parent:?}")]
    NotAChild { parent: NodeId, child: NodeId },

    #[error("Expected {expected} instances, got {actual}")]
    InstanceCountMismatch { expected: usize, actual: usize },

    #[error("Instance range {start}..{end} is outside the {count} allocated instances")]
    InstanceRange { start: usize, end: usize, count: usize },

    #[error("Scene not found: {0}")]
    SceneNotFound(usize),

    #[error("No active scene")]
    NoActiveScene,
}
