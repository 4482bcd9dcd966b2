//! End-to-end scenarios: build, commit, mutate, re-commit and emit
//!
//! Exercises the builder, the commit walker and the render emitter together
//! through the built-in node library.

use crate::foundation::math::Vec3;
use crate::nodes::{register_builtin_nodes, Sphere};
use crate::scene::{
    CommitWalker, GraphBuilder, NodeDescription, RenderEmitter, RenderKind, RenderQueue,
    SceneError, SceneGraph, TypeRegistry, AABB,
};
use approx::assert_relative_eq;

fn registry() -> TypeRegistry {
    let registry = TypeRegistry::new();
    register_builtin_nodes(&registry).unwrap();
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_sphere_commit_mutate_render() {
        let registry = registry();
        let mut graph = SceneGraph::new();
        let description = NodeDescription::new("Group")
            .with_child(NodeDescription::new("Sphere").with_value("radius", 2.0_f32));

        let report = GraphBuilder::new(&registry).build(&mut graph, &description);
        assert!(report.is_clean());
        let group = report.root.unwrap();
        let sphere = graph.children(group)[0];

        CommitWalker::commit(&mut graph, group);
        let expected = AABB::empty().union(&AABB::new(Vec3::repeat(-2.0), Vec3::repeat(2.0)));
        assert_eq!(graph.world_bounds(group), expected);

        let group_committed = graph.get(group).unwrap().core().last_committed();
        graph.set_parameter(sphere, "radius", 5.0_f32).unwrap();
        assert!(graph.get(sphere).unwrap().is_stale());
        assert!(!graph.get(group).unwrap().is_stale());
        assert_eq!(graph.get(group).unwrap().core().last_committed(), group_committed);

        let stats = CommitWalker::commit(&mut graph, group);
        assert_eq!(stats.committed, 1);
        assert_eq!(graph.get(group).unwrap().core().last_committed(), group_committed);

        let mut queue = RenderQueue::new();
        RenderEmitter::emit(&graph, group, &mut queue);
        let object = queue.find_by_path("/Group/Sphere").unwrap();
        assert_eq!(object.attribute_as::<f32>("radius"), Some(&5.0));
        assert_eq!(object.bounds.max, Vec3::repeat(5.0));
        assert_eq!(graph.world_bounds(group).min, Vec3::repeat(-5.0));
    }

    #[test]
    fn test_unknown_sibling_reports_one_error() {
        let registry = registry();
        let mut graph = SceneGraph::new();
        let description = NodeDescription::new("Group")
            .with_child(NodeDescription::new("Sphere"))
            .with_child(NodeDescription::new("Teapot"));

        let report = GraphBuilder::new(&registry).build(&mut graph, &description);
        assert_eq!(report.errors, vec![SceneError::UnknownNodeType("Teapot".to_string())]);

        let group = report.root.unwrap();
        let children = graph.children(group);
        assert_eq!(children.len(), 1);
        let child = graph.get(children[0]).unwrap();
        assert!(child.downcast_ref::<Sphere>().is_some());
    }

    #[test]
    fn test_unregistered_type_allocates_nothing() {
        let registry = registry();
        let before = registry.len();
        assert_eq!(
            registry.create("unregistered_name").err(),
            Some(SceneError::UnknownNodeType("unregistered_name".to_string()))
        );
        assert_eq!(registry.len(), before);
    }

    #[test]
    fn test_nested_transforms_compose() {
        let registry = registry();
        let mut graph = SceneGraph::new();
        let description = NodeDescription::new("Transform")
            .with_value("translation", Vec3::new(1.0, 0.0, 0.0))
            .with_child(
                NodeDescription::new("Transform")
                    .with_value("scale", Vec3::repeat(2.0))
                    .with_child(NodeDescription::new("Sphere").with_name("ball")),
            );

        let report = GraphBuilder::new(&registry).build(&mut graph, &description);
        let root = report.root.unwrap();
        CommitWalker::commit(&mut graph, root);

        let bounds = graph.world_bounds(root);
        assert_relative_eq!(bounds.min, Vec3::new(-1.0, -2.0, -2.0), epsilon = 1e-5);
        assert_relative_eq!(bounds.max, Vec3::new(3.0, 2.0, 2.0), epsilon = 1e-5);

        let mut queue = RenderQueue::new();
        RenderEmitter::emit(&graph, root, &mut queue);
        let ball = queue.find_by_path("/Transform/Transform/ball").unwrap();
        assert_relative_eq!(
            *ball.attribute_as::<Vec3>("center").unwrap(),
            Vec3::new(1.0, 0.0, 0.0),
            epsilon = 1e-6
        );
        assert_relative_eq!(ball.bounds.max, Vec3::new(3.0, 2.0, 2.0), epsilon = 1e-5);
    }

    #[test]
    fn test_emitting_subtree_uses_ancestor_transform() {
        let registry = registry();
        let mut graph = SceneGraph::new();
        let description = NodeDescription::new("Transform")
            .with_value("translation", Vec3::new(0.0, 10.0, 0.0))
            .with_child(NodeDescription::new("Sphere").with_name("ball"));
        let root = GraphBuilder::new(&registry).build(&mut graph, &description).root.unwrap();
        CommitWalker::commit(&mut graph, root);

        let ball = graph.find_by_name("ball").unwrap();
        let mut queue = RenderQueue::new();
        assert_eq!(RenderEmitter::emit(&graph, ball, &mut queue), 1);
        let object = &queue.objects()[0];
        assert_eq!(object.path, "/Transform/ball");
        assert_relative_eq!(
            *object.attribute_as::<Vec3>("center").unwrap(),
            Vec3::new(0.0, 10.0, 0.0),
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_full_renderer_scene() {
        let registry = registry();
        let mut graph = SceneGraph::new();
        let description = NodeDescription::new("Renderer")
            .with_value("shade_mode", "primid".to_string())
            .with_value("shadows", true)
            .with_child(NodeDescription::new("Camera").with_slot("camera"))
            .with_child(
                NodeDescription::new("Group")
                    .with_slot("model")
                    .with_child(NodeDescription::new("Sphere"))
                    .with_child(NodeDescription::new("CoordFrame")),
            )
            .with_child(NodeDescription::new("PointLight").with_slot("light"))
            .with_child(NodeDescription::new("DirectionalLight").with_slot("light"));

        let report = GraphBuilder::new(&registry).build(&mut graph, &description);
        assert!(report.is_clean(), "{:?}", report.errors);
        let stats = CommitWalker::commit_all(&mut graph);
        assert_eq!(stats.visited, 7);
        assert_eq!(stats.committed, 7);

        let mut queue = RenderQueue::new();
        assert_eq!(RenderEmitter::emit_all(&graph, &mut queue), 7);
        assert_eq!(queue.count_of(RenderKind::Geometry), 2);
        assert_eq!(queue.count_of(RenderKind::Light), 2);
        assert_eq!(queue.count_of(RenderKind::Camera), 1);
        assert_eq!(queue.count_of(RenderKind::Renderer), 1);
        assert_eq!(queue.batches().len(), 4);

        let renderer = queue.find_by_path("/Renderer").unwrap();
        assert_eq!(renderer.attribute_as::<bool>("shadows"), Some(&true));
        assert_eq!(renderer.attribute_as::<String>("shade_mode").unwrap(), "primid");
    }

    #[test]
    fn test_remove_subtree_then_recommit() {
        let registry = registry();
        let mut graph = SceneGraph::new();
        let description = NodeDescription::new("Group")
            .with_child(
                NodeDescription::new("Group")
                    .with_name("doomed")
                    .with_child(NodeDescription::new("Sphere"))
                    .with_child(NodeDescription::new("Sphere")),
            )
            .with_child(NodeDescription::new("Sphere").with_value("center", Vec3::new(5.0, 0.0, 0.0)));
        let root = GraphBuilder::new(&registry).build(&mut graph, &description).root.unwrap();
        CommitWalker::commit(&mut graph, root);

        let doomed = graph.find_by_name("doomed").unwrap();
        assert_eq!(graph.remove(doomed).unwrap(), 3);
        assert_eq!(graph.len(), 2);

        let stats = CommitWalker::commit(&mut graph, root);
        assert_eq!(stats, crate::scene::CommitStats { visited: 2, committed: 0 });
        assert_eq!(graph.world_bounds(root).min, Vec3::new(4.0, -1.0, -1.0));
    }
}
