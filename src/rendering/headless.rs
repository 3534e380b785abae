use std::collections::{HashMap, HashSet};

use anyhow::{bail, Context};
use glam::Mat4;

use crate::assets::{GeometryHandle, MaterialHandle};
use crate::rendering::{instancing::InstanceData, RenderableRef, Renderer};

#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    BindMaterial(MaterialHandle),
    Draw {
        renderable: RenderableRef,
        model: Mat4,
    },
    DrawInstanced {
        renderable: RenderableRef,
        instance_count: usize,
        uploaded: bool,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub material_binds: usize,
    pub draws: usize,
    pub instanced_draws: usize,
    pub instances: usize,
    pub instance_uploads: usize,
}

/// A [`Renderer`] with no GPU behind it. It validates handles, records every
/// command and logs at trace level, and can be told to fail specific
/// renderables or materials.
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    renderables: HashMap<RenderableRef, (GeometryHandle, MaterialHandle)>,
    next_renderable: u64,
    commands: Vec<RenderCommand>,
    stats: RenderStats,
    failing_renderables: HashSet<RenderableRef>,
    failing_materials: HashSet<MaterialHandle>,
}

impl HeadlessRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[RenderCommand] {
        &self.commands
    }

    pub fn stats(&self) -> RenderStats {
        self.stats
    }

    /// Clears recorded commands and counters, typically between frames.
    pub fn reset(&mut self) {
        self.commands.clear();
        self.stats = RenderStats::default();
    }

    pub fn renderable_count(&self) -> usize {
        self.renderables.len()
    }

    pub fn fail_draws_for(&mut self, renderable: RenderableRef) {
        self.failing_renderables.insert(renderable);
    }

    pub fn fail_material(&mut self, material: MaterialHandle) {
        self.failing_materials.insert(material);
    }

    fn check_renderable(&self, renderable: RenderableRef) -> anyhow::Result<()> {
        self.renderables
            .get(&renderable)
            .with_context(|| format!("Unknown renderable {:?}", renderable))?;

        if self.failing_renderables.contains(&renderable) {
            bail!("Draw rejected for {:?}", renderable);
        }

        Ok(())
    }
}

impl Renderer for HeadlessRenderer {
    fn create_renderable(
        &mut self,
        geometry: GeometryHandle,
        material: MaterialHandle,
    ) -> anyhow::Result<RenderableRef> {
        let handle = RenderableRef(self.next_renderable);
        self.next_renderable += 1;
        self.renderables.insert(handle, (geometry, material));

        log::trace!("Created renderable {:?}", handle);
        Ok(handle)
    }

    fn bind_material(&mut self, material: MaterialHandle) -> anyhow::Result<()> {
        if self.failing_materials.contains(&material) {
            bail!("Material {:?} failed to bind", material);
        }

        self.commands.push(RenderCommand::BindMaterial(material));
        self.stats.material_binds += 1;
        Ok(())
    }

    fn submit_draw(
        &mut self,
        renderable: RenderableRef,
        model: &Mat4,
        _view: &Mat4,
        _projection: &Mat4,
    ) -> anyhow::Result<()> {
        self.check_renderable(renderable)?;

        log::trace!("Draw {:?}", renderable);
        self.commands.push(RenderCommand::Draw {
            renderable,
            model: *model,
        });
        self.stats.draws += 1;
        Ok(())
    }

    fn submit_instanced(
        &mut self,
        renderable: RenderableRef,
        instances: &[InstanceData],
        changed: bool,
        _view: &Mat4,
        _projection: &Mat4,
    ) -> anyhow::Result<()> {
        self.check_renderable(renderable)?;

        log::trace!("Draw {:?} x{}", renderable, instances.len());
        self.commands.push(RenderCommand::DrawInstanced {
            renderable,
            instance_count: instances.len(),
            uploaded: changed,
        });
        self.stats.instanced_draws += 1;
        self.stats.instances += instances.len();
        if changed {
            self.stats.instance_uploads += 1;
        }
        Ok(())
    }
}
