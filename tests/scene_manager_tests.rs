use std::time::Duration;

use glam::{Mat4, Vec3};
use scenecore::rendering::instancing::InstanceGroup;
use scenecore::rendering::RenderCommand;
use scenecore::{
    AssetLibrary, AssetProvider, Camera, FrameTime, HeadlessRenderer, LoopState, ManualScheduler,
    NodeId, RenderConfig, Scene, SceneId, SceneManager, SceneNode, Transform,
};

type Manager = SceneManager<HeadlessRenderer, AssetLibrary>;

#[cfg(test)]
mod scene_manager_tests {
    use super::*;

    fn manager_with_scene() -> (Manager, SceneId) {
        let mut manager = SceneManager::new(
            HeadlessRenderer::new(),
            AssetLibrary::new(),
            ManualScheduler::new(),
        );
        let scene = manager.add_scene(Scene::new("test", Camera::default()));
        (manager, scene)
    }

    fn spawn_drawable(
        manager: &mut Manager,
        scene: SceneId,
        position: Vec3,
        material: &str,
    ) -> NodeId {
        let node = manager
            .scene_mut(scene)
            .unwrap()
            .add_node(SceneNode::new("drawable").with_position(position));
        manager
            .load_renderable(scene, node, "builtin:cube:0.5", material)
            .unwrap();
        node
    }

    fn run_one_frame(manager: &mut Manager) -> scenecore::FrameStats {
        manager.start();
        let stats = manager.frame(Duration::from_millis(100)).unwrap();
        manager.stop();
        stats
    }

    #[test]
    fn test_one_bind_per_material() {
        let (mut manager, scene) = manager_with_scene();
        for index in 0..5 {
            spawn_drawable(&mut manager, scene, Vec3::new(index as f32 * 0.2, 0.0, 0.0), "red");
        }
        for index in 0..3 {
            spawn_drawable(&mut manager, scene, Vec3::new(0.0, index as f32 * 0.2, 0.0), "blue");
        }

        let stats = run_one_frame(&mut manager);

        assert_eq!(stats.material_binds, 2);
        assert_eq!(stats.draws, 8);
        assert_eq!(manager.renderer().stats().material_binds, 2);
        assert_eq!(manager.renderer().stats().draws, 8);
    }

    #[test]
    fn test_unbatched_draws_in_traversal_order() {
        let (mut manager, scene) = manager_with_scene();
        manager.config_mut().use_batching = false;
        let first = spawn_drawable(&mut manager, scene, Vec3::new(-1.0, 0.0, 0.0), "red");
        let second = spawn_drawable(&mut manager, scene, Vec3::new(1.0, 0.0, 0.0), "blue");

        run_one_frame(&mut manager);

        let drawn: Vec<Mat4> = manager
            .renderer()
            .commands()
            .iter()
            .filter_map(|command| match command {
                RenderCommand::Draw { model, .. } => Some(*model),
                _ => None,
            })
            .collect();
        let scene = manager.scene(scene).unwrap();
        assert_eq!(
            drawn,
            vec![
                scene.get_node(first).unwrap().world_matrix(),
                scene.get_node(second).unwrap().world_matrix()
            ]
        );
        assert_eq!(manager.renderer().stats().material_binds, 0);
    }

    #[test]
    fn test_failed_draw_does_not_abort_frame() {
        let (mut manager, scene) = manager_with_scene();
        let broken = spawn_drawable(&mut manager, scene, Vec3::ZERO, "red");
        for index in 1..4 {
            spawn_drawable(&mut manager, scene, Vec3::new(index as f32 * 0.3, 0.0, 0.0), "red");
        }
        let handle = manager
            .scene(scene)
            .unwrap()
            .get_node(broken)
            .unwrap()
            .renderable()
            .unwrap()
            .handle;
        manager.renderer_mut().fail_draws_for(handle);

        let stats = run_one_frame(&mut manager);

        assert_eq!(stats.draws, 3);
        assert_eq!(stats.failures.len(), 1);
        assert_eq!(stats.failures[0].node, Some(broken));
        assert!(stats.has_failures());
    }

    #[test]
    fn test_offscreen_objects_are_culled() {
        let (mut manager, scene) = manager_with_scene();
        spawn_drawable(&mut manager, scene, Vec3::ZERO, "red");
        spawn_drawable(&mut manager, scene, Vec3::new(0.0, 0.0, 50.0), "red");
        spawn_drawable(&mut manager, scene, Vec3::new(0.0, 0.0, -500.0), "red");

        let stats = run_one_frame(&mut manager);

        assert_eq!(stats.draws, 1);
        assert_eq!(stats.culled, 2);
    }

    #[test]
    fn test_culling_can_be_disabled() {
        let (mut manager, scene) = manager_with_scene();
        *manager.config_mut() = RenderConfig {
            frustum_culling: false,
            ..RenderConfig::default()
        };
        spawn_drawable(&mut manager, scene, Vec3::new(0.0, 0.0, 50.0), "red");

        let stats = run_one_frame(&mut manager);

        assert_eq!(stats.draws, 1);
        assert_eq!(stats.culled, 0);
    }

    #[test]
    fn test_invisible_subtree_is_skipped() {
        let (mut manager, scene) = manager_with_scene();
        let parent = spawn_drawable(&mut manager, scene, Vec3::ZERO, "red");
        let child = spawn_drawable(&mut manager, scene, Vec3::X, "red");
        {
            let scene = manager.scene_mut(scene).unwrap();
            scene.add_child(parent, child).unwrap();
            scene.get_node_mut(parent).unwrap().visible = false;
        }

        let stats = run_one_frame(&mut manager);

        assert_eq!(stats.draws, 0);
        assert_eq!(stats.nodes_visited, 0);
    }

    #[test]
    fn test_first_frame_has_zero_delta() {
        let (mut manager, _) = manager_with_scene();
        manager.start();

        let first = manager.frame(Duration::from_millis(1000)).unwrap();
        let second = manager.frame(Duration::from_millis(1016)).unwrap();

        assert_eq!(first.time.delta, 0.0);
        assert_eq!(first.time.frame_index, 0);
        assert!((second.time.delta - 0.016).abs() < 1e-5);
        assert_eq!(second.time.frame_index, 1);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let (mut manager, _) = manager_with_scene();
        manager.start();

        manager.stop();
        manager.stop();

        assert_eq!(manager.state(), LoopState::Stopped);
        assert!(manager.scheduler().pending().is_none());
        assert!(manager.frame(Duration::from_millis(16)).is_none());
    }

    #[test]
    fn test_update_hooks_run_before_render() {
        let (mut manager, scene) = manager_with_scene();
        manager.config_mut().use_batching = false;
        let node = spawn_drawable(&mut manager, scene, Vec3::ZERO, "red");
        manager
            .scene_mut(scene)
            .unwrap()
            .get_node_mut(node)
            .unwrap()
            .set_update_hook(|transform: &mut Transform, _time: FrameTime| {
                transform.translate(Vec3::new(0.0, 1.0, 0.0));
            });

        run_one_frame(&mut manager);

        let model = manager
            .renderer()
            .commands()
            .iter()
            .find_map(|command| match command {
                RenderCommand::Draw { model, .. } => Some(*model),
                _ => None,
            })
            .unwrap();
        assert_eq!(model.w_axis.truncate(), Vec3::Y);
    }

    #[test]
    fn test_collisions_are_reported_per_frame() {
        let (mut manager, scene) = manager_with_scene();
        let a = spawn_drawable(&mut manager, scene, Vec3::ZERO, "red");
        let b = spawn_drawable(&mut manager, scene, Vec3::new(0.25, 0.0, 0.0), "red");
        {
            let collisions = manager.scene_mut(scene).unwrap().collisions_mut();
            collisions.add_collider(a, scenecore::math::VolumeKind::Sphere, None);
            collisions.add_collider(b, scenecore::math::VolumeKind::Sphere, None);
        }

        let stats = run_one_frame(&mut manager);

        assert_eq!(stats.collisions.len(), 1);

        manager.config_mut().check_collisions = false;
        let stats = run_one_frame(&mut manager);
        assert!(stats.collisions.is_empty());
    }

    #[test]
    fn test_instance_group_is_one_submission() {
        let (mut manager, scene) = manager_with_scene();
        let geometry = manager.assets_mut().load_geometry("builtin:triangle").unwrap();
        let material = manager.assets_mut().load_material("grass").unwrap();
        let (renderable, _) = manager.create_renderable(geometry, material).unwrap();

        let transforms: Vec<Mat4> = (0..10)
            .map(|index| Mat4::from_translation(Vec3::new(index as f32, 0.0, 0.0)))
            .collect();
        let mut group = InstanceGroup::new("grass", renderable, transforms.len());
        group.update_instance_data(&transforms).unwrap();
        manager.scene_mut(scene).unwrap().add_instance_group(group);

        let stats = run_one_frame(&mut manager);

        assert_eq!(stats.instanced_draws, 1);
        assert_eq!(manager.renderer().stats().instances, 10);
        assert_eq!(manager.renderer().stats().instance_uploads, 1);

        // Unchanged data is submitted again but not re-uploaded.
        run_one_frame(&mut manager);
        assert_eq!(manager.renderer().stats().instanced_draws, 2);
        assert_eq!(manager.renderer().stats().instance_uploads, 1);
    }

    #[test]
    fn test_attach_to_missing_node_fails() {
        let (mut manager, scene) = manager_with_scene();
        let node = spawn_drawable(&mut manager, scene, Vec3::ZERO, "red");
        manager.scene_mut(scene).unwrap().destroy_node(node).unwrap();

        assert!(manager
            .load_renderable(scene, node, "builtin:cube", "red")
            .is_err());
    }
}
