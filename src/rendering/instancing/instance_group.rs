use glam::Mat4;

use crate::error::SceneError;
use crate::rendering::{instancing::InstanceData, Renderable, Renderer};
use crate::scene_graph::{NodeId, Scene};

/// Many copies of one renderable drawn with a single submission.
///
/// The per-instance buffer is contiguous and its length is fixed when the
/// group is created. Updates must fit inside it; changing the count is an
/// explicit [`InstanceGroup::reallocate`].
#[derive(Debug)]
pub struct InstanceGroup {
    pub name: String,
    pub visible: bool,
    renderable: Renderable,
    instances: Vec<InstanceData>,
    needs_upload: bool,
}

impl InstanceGroup {
    pub fn new(name: impl Into<String>, renderable: Renderable, instance_count: usize) -> Self {
        Self {
            name: name.into(),
            visible: true,
            renderable,
            instances: vec![InstanceData::default(); instance_count],
            needs_upload: true,
        }
    }

    pub fn renderable(&self) -> &Renderable {
        &self.renderable
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    pub fn instances(&self) -> &[InstanceData] {
        &self.instances
    }

    /// True when the buffer changed since it was last submitted.
    pub fn needs_upload(&self) -> bool {
        self.needs_upload
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.instances)
    }

    /// Rewrites the whole buffer. `transforms` must hold exactly
    /// `instance_count` matrices.
    pub fn update_instance_data(&mut self, transforms: &[Mat4]) -> Result<(), SceneError> {
        if transforms.len() != self.instances.len() {
            return Err(SceneError::InstanceCountMismatch {
                expected: self.instances.len(),
                actual: transforms.len(),
            });
        }

        self.update_instance_range(0, transforms)
    }

    /// Rewrites `start..start + transforms.len()`, leaving the rest intact.
    pub fn update_instance_range(
        &mut self,
        start: usize,
        transforms: &[Mat4],
    ) -> Result<(), SceneError> {
        let count = self.instances.len();
        let range = start
            .checked_add(transforms.len())
            .and_then(|end| self.instances.get_mut(start..end));

        let Some(range) = range else {
            return Err(SceneError::InstanceRange {
                start,
                end: start.saturating_add(transforms.len()),
                count,
            });
        };

        for (instance, transform) in range.iter_mut().zip(transforms) {
            instance.model_matrix = *transform;
        }

        self.needs_upload = true;
        Ok(())
    }

    /// Copies the current world matrices of `nodes`, in order, into the
    /// buffer. The world-matrix pass must already have run this frame.
    pub fn update_from_nodes(&mut self, scene: &Scene, nodes: &[NodeId]) -> Result<(), SceneError> {
        let transforms = nodes
            .iter()
            .map(|&id| {
                scene
                    .get_node(id)
                    .map(|node| node.world_matrix())
                    .ok_or(SceneError::NodeNotFound(id))
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.update_instance_data(&transforms)
    }

    /// Replaces the buffer with `instance_count` identity instances. Existing
    /// data is dropped.
    pub fn reallocate(&mut self, instance_count: usize) {
        log::debug!(
            "Reallocating instance group '{}': {} -> {} instances",
            self.name,
            self.instances.len(),
            instance_count
        );

        self.instances = vec![InstanceData::default(); instance_count];
        self.needs_upload = true;
    }

    /// Binds the material and submits every instance in one call. The
    /// renderer is told whether the buffer changed since the last submission.
    pub fn render(
        &mut self,
        renderer: &mut dyn Renderer,
        view: &Mat4,
        projection: &Mat4,
    ) -> anyhow::Result<()> {
        if self.instances.is_empty() {
            return Ok(());
        }

        renderer.bind_material(self.renderable.material)?;
        renderer.submit_instanced(
            self.renderable.handle,
            &self.instances,
            self.needs_upload,
            view,
            projection,
        )?;

        self.needs_upload = false;
        Ok(())
    }
}
