use std::f32::consts::TAU;
use std::time::Duration;

use glam::{Mat4, Quat, Vec3};
use rand::{rngs::StdRng, Rng, SeedableRng};

use scenecore::math::VolumeKind;
use scenecore::rendering::instancing::InstanceGroup;
use scenecore::scene_graph::InstanceGroupId;
use scenecore::{
    AssetLibrary, AssetProvider, Camera, FrameTime, HeadlessRenderer, ManualScheduler, NodeId,
    Scene, SceneId, SceneManager, SceneNode, Transform,
};

const FRAME_INTERVAL: Duration = Duration::from_micros(16_667);
const CRATE_COUNT: usize = 40;
const GRASS_COUNT: usize = 256;
const ASTEROID_TRACK: f32 = 6.0;

#[derive(Debug, Default)]
pub struct DemoSummary {
    pub frames: u64,
    pub draws: usize,
    pub culled: usize,
    pub instanced_draws: usize,
    pub collisions: usize,
    pub failures: usize,
}

pub struct DemoState {
    manager: SceneManager<HeadlessRenderer, AssetLibrary>,
    scene: SceneId,
    grass: InstanceGroupId,
    grass_roots: Vec<(Vec3, f32)>,
}

impl DemoState {
    pub fn new(seed: u64) -> anyhow::Result<Self> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut manager = SceneManager::new(
            HeadlessRenderer::new(),
            AssetLibrary::new(),
            ManualScheduler::new(),
        );

        let camera = Camera::look_at(Vec3::new(0.0, 6.0, 18.0), Vec3::ZERO, Vec3::Y);
        let scene = manager.add_scene(Scene::new("demo", camera));

        let (carousel, asteroids) = {
            let scene = manager
                .scene_mut(scene)
                .ok_or_else(|| anyhow::anyhow!("Demo scene vanished"))?;

            let carousel = scene.add_node(SceneNode::new("carousel").with_update_hook(
                |transform: &mut Transform, time: FrameTime| {
                    transform.rotate_by(Vec3::new(0.0, 0.4 * time.delta, 0.0));
                },
            ));

            let asteroids = [
                spawn_asteroid(scene, "asteroid-a", -ASTEROID_TRACK, 3.0),
                spawn_asteroid(scene, "asteroid-b", ASTEROID_TRACK, -2.0),
            ];

            (carousel, asteroids)
        };

        // Crates scattered around the carousel; a ring wide enough that some
        // of them leave the frustum as it turns.
        for index in 0..CRATE_COUNT {
            let angle = rng.gen_range(0.0..TAU);
            let distance = rng.gen_range(2.0..30.0);
            let height = rng.gen_range(-1.0..3.0);
            let position = Vec3::new(angle.cos() * distance, height, angle.sin() * distance);

            let node = manager
                .scene_mut(scene)
                .ok_or_else(|| anyhow::anyhow!("Demo scene vanished"))?
                .spawn_child(
                    carousel,
                    SceneNode::new(format!("crate-{}", index)).with_position(position),
                )?;

            let material = if index % 2 == 0 { "wood:lit" } else { "metal:lit" };
            manager.load_renderable(scene, node, "builtin:cube:0.8", material)?;
        }

        for asteroid in asteroids {
            manager.load_renderable(scene, asteroid, "builtin:sphere:1", "rock:lit")?;
        }

        let grass_geometry = manager.assets_mut().load_geometry("builtin:plane:0.2")?;
        let grass_material = manager.assets_mut().load_material("grass:foliage")?;
        let (grass_renderable, _) = manager.create_renderable(grass_geometry, grass_material)?;

        let grass_roots: Vec<(Vec3, f32)> = (0..GRASS_COUNT)
            .map(|_| {
                let x = rng.gen_range(-10.0..10.0);
                let z = rng.gen_range(-10.0..10.0);
                (Vec3::new(x, -1.0, z), rng.gen_range(0.0..TAU))
            })
            .collect();

        let grass = manager
            .scene_mut(scene)
            .ok_or_else(|| anyhow::anyhow!("Demo scene vanished"))?
            .add_instance_group(InstanceGroup::new("grass", grass_renderable, GRASS_COUNT));

        Ok(Self {
            manager,
            scene,
            grass,
            grass_roots,
        })
    }

    pub fn run(&mut self, frames: u64) -> anyhow::Result<DemoSummary> {
        let mut summary = DemoSummary::default();

        self.manager.start();

        for frame in 0..frames {
            let timestamp = FRAME_INTERVAL * frame as u32;
            self.sway_grass(timestamp.as_secs_f32())?;

            let Some(stats) = self.manager.frame(timestamp) else {
                continue;
            };

            log::debug!(
                "Frame {}: {} drawn, {} culled, {} binds",
                stats.time.frame_index,
                stats.draws,
                stats.culled,
                stats.material_binds
            );

            summary.frames += 1;
            summary.draws += stats.draws;
            summary.culled += stats.culled;
            summary.instanced_draws += stats.instanced_draws;
            summary.collisions += stats.collisions.len();
            summary.failures += stats.failures.len();
        }

        self.manager.stop();

        let render_stats = self.manager.renderer().stats();
        log::info!(
            "Renderer saw {} binds and {} instances",
            render_stats.material_binds,
            render_stats.instances
        );

        Ok(summary)
    }

    fn sway_grass(&mut self, seconds: f32) -> anyhow::Result<()> {
        let transforms: Vec<Mat4> = self
            .grass_roots
            .iter()
            .map(|&(position, phase)| {
                let sway = (seconds * 2.0 + phase).sin() * 0.15;
                Mat4::from_rotation_translation(Quat::from_rotation_z(sway), position)
            })
            .collect();

        let group = self
            .manager
            .scene_mut(self.scene)
            .and_then(|scene| scene.instance_group_mut(self.grass))
            .ok_or_else(|| anyhow::anyhow!("Grass instance group missing"))?;

        group.update_instance_data(&transforms)?;
        Ok(())
    }
}

/// An asteroid that shuttles along X, turning around at the ends of its track.
fn spawn_asteroid(scene: &mut Scene, name: &str, start_x: f32, speed: f32) -> NodeId {
    let mut velocity = speed;

    let node = scene.add_node(
        SceneNode::new(name)
            .with_position(Vec3::new(start_x, 0.0, 0.0))
            .with_update_hook(move |transform: &mut Transform, time: FrameTime| {
                let x = transform.position().x;
                if x > ASTEROID_TRACK {
                    velocity = -velocity.abs();
                } else if x < -ASTEROID_TRACK {
                    velocity = velocity.abs();
                }
                transform.translate(Vec3::new(velocity * time.delta, 0.0, 0.0));
            }),
    );

    let label = name.to_string();
    scene.collisions_mut().add_collider(
        node,
        VolumeKind::Sphere,
        Some(Box::new(move |other: NodeId| {
            log::info!("{} hit {:?}", label, other);
        })),
    );

    node
}
