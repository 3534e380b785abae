use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec3;
use scenecore::math::{Aabb, BoundingSphere, Bounds, VolumeKind};
use scenecore::{Camera, NodeId, Scene, SceneNode};

#[cfg(test)]
mod collision_tests {
    use super::*;

    fn unit_ball(scene: &mut Scene, name: &str, position: Vec3) -> NodeId {
        scene.add_node(
            SceneNode::new(name)
                .with_position(position)
                .with_bounds(Bounds::from_sphere(BoundingSphere::new(Vec3::ZERO, 1.0))),
        )
    }

    fn boxed(scene: &mut Scene, name: &str, min: Vec3, max: Vec3) -> NodeId {
        scene.add_node(SceneNode::new(name).with_bounds(Bounds::from_aabb(Aabb::new(min, max))))
    }

    #[test]
    fn test_touching_spheres_collide() {
        let mut scene = Scene::new("test", Camera::default());
        let a = unit_ball(&mut scene, "a", Vec3::ZERO);
        let b = unit_ball(&mut scene, "b", Vec3::new(2.0, 0.0, 0.0));
        scene.collisions_mut().add_collider(a, VolumeKind::Sphere, None);
        scene.collisions_mut().add_collider(b, VolumeKind::Sphere, None);

        scene.update_world_matrices();
        let pairs = scene.check_collisions();

        assert_eq!(pairs.len(), 1);
        assert!(pairs[0].involves(a) && pairs[0].involves(b));
    }

    #[test]
    fn test_separated_spheres_do_not_collide() {
        let mut scene = Scene::new("test", Camera::default());
        let a = unit_ball(&mut scene, "a", Vec3::ZERO);
        let b = unit_ball(&mut scene, "b", Vec3::new(2.01, 0.0, 0.0));
        scene.collisions_mut().add_collider(a, VolumeKind::Sphere, None);
        scene.collisions_mut().add_collider(b, VolumeKind::Sphere, None);

        scene.update_world_matrices();

        assert!(scene.check_collisions().is_empty());
    }

    #[test]
    fn test_aabb_pairs_are_found_once() {
        let mut scene = Scene::new("test", Camera::default());
        let a = boxed(&mut scene, "a", Vec3::ZERO, Vec3::ONE);
        let b = boxed(&mut scene, "b", Vec3::splat(0.5), Vec3::splat(2.0));
        let c = boxed(&mut scene, "c", Vec3::splat(3.0), Vec3::splat(4.0));
        for node in [a, b, c] {
            scene.collisions_mut().add_collider(node, VolumeKind::Aabb, None);
        }

        scene.update_world_matrices();
        let pairs = scene.check_collisions();

        assert_eq!(pairs.len(), 1);
        assert!(pairs[0].involves(a));
        assert!(pairs[0].involves(b));
        assert!(!pairs[0].involves(c));
    }

    #[test]
    fn test_reregistering_a_node_never_pairs_it_with_itself() {
        let mut scene = Scene::new("test", Camera::default());
        let a = unit_ball(&mut scene, "a", Vec3::ZERO);
        let first = scene.collisions_mut().add_collider(a, VolumeKind::Sphere, None);
        let second = scene.collisions_mut().add_collider(a, VolumeKind::Aabb, None);

        scene.update_world_matrices();

        assert_eq!(first, second);
        assert_eq!(scene.collisions().len(), 1);
        assert!(scene.check_collisions().is_empty());
    }

    #[test]
    fn test_both_callbacks_receive_the_other_node() {
        let mut scene = Scene::new("test", Camera::default());
        let a = unit_ball(&mut scene, "a", Vec3::ZERO);
        let b = unit_ball(&mut scene, "b", Vec3::new(1.0, 0.0, 0.0));

        let hits: Rc<RefCell<Vec<(NodeId, NodeId)>>> = Rc::default();
        for node in [a, b] {
            let hits = hits.clone();
            scene.collisions_mut().add_collider(
                node,
                VolumeKind::Sphere,
                Some(Box::new(move |other: NodeId| hits.borrow_mut().push((node, other)))),
            );
        }

        scene.update_world_matrices();
        scene.check_collisions();

        let hits = hits.borrow();
        assert_eq!(hits.len(), 2);
        assert!(hits.contains(&(a, b)));
        assert!(hits.contains(&(b, a)));
    }

    #[test]
    fn test_collisions_use_world_space() {
        let mut scene = Scene::new("test", Camera::default());
        let far_parent = scene.add_node(SceneNode::new("far").with_position(Vec3::new(50.0, 0.0, 0.0)));
        let a = unit_ball(&mut scene, "a", Vec3::ZERO);
        let b = unit_ball(&mut scene, "b", Vec3::new(0.5, 0.0, 0.0));
        scene.add_child(far_parent, b).unwrap();
        scene.collisions_mut().add_collider(a, VolumeKind::Sphere, None);
        scene.collisions_mut().add_collider(b, VolumeKind::Sphere, None);

        scene.update_world_matrices();

        assert!(scene.check_collisions().is_empty());
    }

    #[test]
    fn test_unbounded_and_removed_colliders_are_skipped() {
        let mut scene = Scene::new("test", Camera::default());
        let a = unit_ball(&mut scene, "a", Vec3::ZERO);
        let b = unit_ball(&mut scene, "b", Vec3::ZERO);
        let ghost = scene.add_node(SceneNode::new("ghost"));
        scene.collisions_mut().add_collider(a, VolumeKind::Sphere, None);
        let collider_b = scene.collisions_mut().add_collider(b, VolumeKind::Sphere, None);
        scene.collisions_mut().add_collider(ghost, VolumeKind::Sphere, None);

        scene.update_world_matrices();
        assert_eq!(scene.check_collisions().len(), 1);

        assert!(scene.collisions_mut().remove_collider(collider_b));
        assert!(scene.check_collisions().is_empty());
        assert_eq!(scene.collisions().len(), 2);
    }
}
