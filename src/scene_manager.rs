//! Owns the scenes and drives the per-frame update/render cycle.
//!
//! A frame is: update hooks, world-matrix pass, collision broad phase, then
//! culling and draw submission. Update always finishes before render reads
//! any world matrix, and everything runs on the thread calling
//! [`SceneManager::frame`].

use std::time::Duration;

use glam::Mat4;
use id_arena::{Arena, Id};

use crate::assets::{AssetProvider, GeometryHandle, MaterialHandle};
use crate::collision::CollisionPair;
use crate::error::SceneError;
use crate::math::{Bounds, Frustum};
use crate::rendering::{BatchManager, DrawFailure, DrawItem, RenderConfig, Renderable, Renderer};
use crate::scene_graph::{NodeId, Scene};
use crate::scheduler::{FrameRequestId, FrameScheduler, ManualScheduler};
use crate::time::{FrameClock, FrameTime};

pub type SceneId = Id<Scene>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopState {
    #[default]
    Stopped,
    Running,
}

/// What happened during one render (and, from `frame`, the update before it).
#[derive(Debug, Default)]
pub struct FrameStats {
    pub time: FrameTime,
    pub nodes_visited: usize,
    pub culled: usize,
    pub draws: usize,
    pub instanced_draws: usize,
    pub material_binds: usize,
    pub collisions: Vec<CollisionPair>,
    /// Objects that failed to draw. The rest of the frame still went out.
    pub failures: Vec<DrawFailure>,
}

impl FrameStats {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

pub struct SceneManager<R, A, S = ManualScheduler> {
    renderer: R,
    assets: A,
    scheduler: S,
    config: RenderConfig,
    scenes: Arena<Scene>,
    active_scene: Option<SceneId>,
    batches: BatchManager,
    state: LoopState,
    pending_frame: Option<FrameRequestId>,
    clock: FrameClock,
}

impl<R, A, S> SceneManager<R, A, S>
where
    R: Renderer,
    A: AssetProvider,
    S: FrameScheduler,
{
    pub fn new(renderer: R, assets: A, scheduler: S) -> Self {
        Self::with_config(renderer, assets, scheduler, RenderConfig::default())
    }

    pub fn with_config(renderer: R, assets: A, scheduler: S, config: RenderConfig) -> Self {
        Self {
            renderer,
            assets,
            scheduler,
            config,
            scenes: Arena::new(),
            active_scene: None,
            batches: BatchManager::new(),
            state: LoopState::Stopped,
            pending_frame: None,
            clock: FrameClock::new(),
        }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut RenderConfig {
        &mut self.config
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn assets(&self) -> &A {
        &self.assets
    }

    pub fn assets_mut(&mut self) -> &mut A {
        &mut self.assets
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// The first scene added becomes the active one.
    pub fn add_scene(&mut self, scene: Scene) -> SceneId {
        let id = self.scenes.alloc(scene);
        if self.active_scene.is_none() {
            self.active_scene = Some(id);
        }
        id
    }

    pub fn set_active_scene(&mut self, id: SceneId) -> Result<(), SceneError> {
        if self.scenes.get(id).is_none() {
            return Err(SceneError::SceneNotFound(id.index()));
        }

        self.active_scene = Some(id);
        Ok(())
    }

    pub fn active_scene_id(&self) -> Option<SceneId> {
        self.active_scene
    }

    pub fn scene(&self, id: SceneId) -> Option<&Scene> {
        self.scenes.get(id)
    }

    pub fn scene_mut(&mut self, id: SceneId) -> Option<&mut Scene> {
        self.scenes.get_mut(id)
    }

    pub fn active_scene(&self) -> Option<&Scene> {
        self.active_scene.and_then(|id| self.scenes.get(id))
    }

    pub fn active_scene_mut(&mut self) -> Option<&mut Scene> {
        self.active_scene.and_then(|id| self.scenes.get_mut(id))
    }

    /// Creates the renderer-side object for a geometry/material pair and
    /// computes the geometry's object-space bounds.
    pub fn create_renderable(
        &mut self,
        geometry: GeometryHandle,
        material: MaterialHandle,
    ) -> anyhow::Result<(Renderable, Bounds)> {
        let bounds = self
            .assets
            .geometry(geometry)
            .map(|geometry| geometry.bounds())
            .ok_or_else(|| anyhow::anyhow!("Unknown geometry {:?}", geometry))?;

        let handle = self.renderer.create_renderable(geometry, material)?;

        Ok((
            Renderable {
                handle,
                geometry,
                material,
            },
            bounds,
        ))
    }

    /// Gives `node` a drawable payload. Its bounds are computed here, once.
    pub fn attach_renderable(
        &mut self,
        scene: SceneId,
        node: NodeId,
        geometry: GeometryHandle,
        material: MaterialHandle,
    ) -> anyhow::Result<Renderable> {
        let exists = self
            .scenes
            .get(scene)
            .ok_or(SceneError::SceneNotFound(scene.index()))?
            .contains(node);
        if !exists {
            return Err(SceneError::NodeNotFound(node).into());
        }

        let (renderable, bounds) = self.create_renderable(geometry, material)?;

        if let Some(node) = self.scenes.get_mut(scene).and_then(|scene| scene.get_node_mut(node)) {
            node.set_renderable(renderable, bounds);
        }

        Ok(renderable)
    }

    /// Loads both assets through the provider, then attaches them.
    pub fn load_renderable(
        &mut self,
        scene: SceneId,
        node: NodeId,
        geometry_source: &str,
        material_source: &str,
    ) -> anyhow::Result<Renderable> {
        let geometry = self.assets.load_geometry(geometry_source)?;
        let material = self.assets.load_material(material_source)?;
        self.attach_renderable(scene, node, geometry, material)
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    /// Schedules the first frame. Does nothing if already running.
    pub fn start(&mut self) {
        if self.state == LoopState::Running {
            log::debug!("Scene manager already running");
            return;
        }

        self.state = LoopState::Running;
        self.clock.reset();
        self.pending_frame = Some(self.scheduler.request_frame());
        log::debug!("Scene manager started");
    }

    /// Cancels any pending frame. Safe to call repeatedly.
    pub fn stop(&mut self) {
        if let Some(request) = self.pending_frame.take() {
            self.scheduler.cancel_frame(request);
        }

        if self.state == LoopState::Running {
            log::debug!("Scene manager stopped");
        }
        self.state = LoopState::Stopped;
    }

    /// Host frame callback. Returns `None` when stopped or when there is no
    /// active scene; otherwise updates and renders the active scene and
    /// requests the next frame.
    pub fn frame(&mut self, timestamp: Duration) -> Option<FrameStats> {
        if self.state != LoopState::Running {
            return None;
        }

        self.pending_frame = None;
        let time = self.clock.tick(timestamp);

        let result = self
            .active_scene
            .ok_or(SceneError::NoActiveScene)
            .and_then(|scene| self.run_frame(scene, time));

        let stats = match result {
            Ok(stats) => Some(stats),
            Err(error) => {
                log::debug!("Skipping frame {}: {}", time.frame_index, error);
                None
            }
        };

        self.pending_frame = Some(self.scheduler.request_frame());
        stats
    }

    fn run_frame(&mut self, scene: SceneId, time: FrameTime) -> Result<FrameStats, SceneError> {
        let collisions = self.update(scene, time)?;
        let mut stats = self.render(scene)?;
        stats.time = time;
        stats.collisions = collisions;
        Ok(stats)
    }

    /// Update phase: hooks in pre-order, one world-matrix pass from every
    /// root, then the collision broad phase on the fresh matrices.
    pub fn update(&mut self, scene: SceneId, time: FrameTime) -> Result<Vec<CollisionPair>, SceneError> {
        let check_collisions = self.config.check_collisions;
        let scene = self
            .scenes
            .get_mut(scene)
            .ok_or(SceneError::SceneNotFound(scene.index()))?;

        scene.run_update_hooks(time);
        scene.update_world_matrices();

        if check_collisions {
            Ok(scene.check_collisions())
        } else {
            Ok(Vec::new())
        }
    }

    /// Render phase: derive the frustum from the camera, walk visible nodes,
    /// cull by world-space bounds and submit the rest, then draw instance
    /// groups. Per-object failures are collected, not propagated.
    pub fn render(&mut self, scene: SceneId) -> Result<FrameStats, SceneError> {
        let scene = self
            .scenes
            .get_mut(scene)
            .ok_or(SceneError::SceneNotFound(scene.index()))?;

        let view = scene.camera.view_matrix();
        let projection = scene.camera.projection_matrix();
        let frustum = Frustum::from_view_projection(projection * view);

        let config = &self.config;
        let renderer = &mut self.renderer;
        let batches = &mut self.batches;
        batches.clear();

        let mut stats = FrameStats::default();

        scene.traverse_filtered(|id, node| {
            if !node.visible {
                return false;
            }
            stats.nodes_visited += 1;

            let Some(renderable) = node.renderable() else {
                return true;
            };

            let world_matrix = node.world_matrix();

            if config.frustum_culling {
                if let Some(bounds) = node.bounds() {
                    let volume = bounds.world_volume(config.cull_volume, &world_matrix);
                    if !volume.intersects_frustum(&frustum) {
                        stats.culled += 1;
                        return true;
                    }
                }
            }

            let item = DrawItem {
                node: Some(id),
                renderable: *renderable,
                model_matrix: world_matrix,
            };

            if config.use_batching {
                batches.add_object(item);
            } else {
                submit_direct(renderer, &item, &view, &projection, &mut stats);
            }

            true
        });

        if config.use_batching {
            let report = batches.render(renderer, &view, &projection);
            stats.draws += report.draws;
            stats.material_binds += report.material_binds;
            stats.failures.extend(report.failures);
        }

        for (_, group) in scene.instance_groups_mut() {
            if !group.visible || group.instance_count() == 0 {
                continue;
            }

            match group.render(renderer, &view, &projection) {
                Ok(()) => {
                    stats.instanced_draws += 1;
                    stats.material_binds += 1;
                }
                Err(error) => {
                    log::warn!("Instance group '{}' failed to draw: {:#}", group.name, error);
                    stats.failures.push(DrawFailure {
                        node: None,
                        renderable: group.renderable().handle,
                        error,
                    });
                }
            }
        }

        log::trace!(
            "Rendered '{}': {} drawn, {} culled, {} instanced, {} failed",
            scene.name,
            stats.draws,
            stats.culled,
            stats.instanced_draws,
            stats.failures.len()
        );

        Ok(stats)
    }
}

fn submit_direct<R: Renderer>(
    renderer: &mut R,
    item: &DrawItem,
    view: &Mat4,
    projection: &Mat4,
    stats: &mut FrameStats,
) {
    match renderer.submit_draw(item.renderable.handle, &item.model_matrix, view, projection) {
        Ok(()) => stats.draws += 1,
        Err(error) => {
            log::warn!(
                "Draw failed for {:?} (node {:?}): {:#}",
                item.renderable.handle,
                item.node,
                error
            );
            stats.failures.push(DrawFailure {
                node: item.node,
                renderable: item.renderable.handle,
                error,
            });
        }
    }
}
