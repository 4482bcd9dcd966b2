//! Incremental commit pass
//!
//! Walks a tree parents-first and commits every stale node, plus every clean
//! node whose ancestor transform moved since its last commit. Other clean
//! nodes are skipped but still descended into, since a clean parent can own
//! stale children.

use std::ops::AddAssign;

use super::graph::SceneGraph;
use super::version::VersionStamp;
use crate::foundation::collections::NodeId;
use crate::foundation::math::Mat4;

/// What a node sees while it commits
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CommitContext {
    /// Accumulated transform of the node's ancestors
    pub world_transform: Mat4,
}

impl Default for CommitContext {
    fn default() -> Self {
        Self {
            world_transform: Mat4::identity(),
        }
    }
}

/// Counters from one commit pass
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CommitStats {
    /// Nodes reached by the walk
    pub visited: usize,
    /// Nodes whose `commit` hook ran
    pub committed: usize,
}

impl AddAssign for CommitStats {
    fn add_assign(&mut self, other: Self) {
        self.visited += other.visited;
        self.committed += other.committed;
    }
}

/// Pre-order commit traversal
pub struct CommitWalker;

impl CommitWalker {
    /// Commit every node in the tree at `root` that is stale or sits under a moved ancestor
    ///
    /// Parents commit before their children, so a child sees the transform
    /// its ancestors hold after their own commit. Running the walk twice
    /// without intervening changes commits nothing the second time.
    pub fn commit(graph: &mut SceneGraph, root: NodeId) -> CommitStats {
        let mut stats = CommitStats::default();
        let mut stack = vec![(root, graph.parent_transform(root))];

        while let Some((id, world_transform)) = stack.pop() {
            let Some(node) = graph.get_mut(id) else {
                continue;
            };
            stats.visited += 1;

            if node.core().needs_commit(&world_transform) {
                node.commit(&CommitContext { world_transform });
                node.core_mut().mark_committed(VersionStamp::now(), world_transform);
                stats.committed += 1;
                log::debug!("Committed {}", node.describe());
            }

            let child_transform = world_transform * node.local_transform();
            for child in node.children().into_iter().rev() {
                stack.push((child, child_transform));
            }
        }

        log::info!(
            "Commit pass: {} visited, {} committed",
            stats.visited,
            stats.committed
        );
        stats
    }

    /// Commit every tree in the graph
    pub fn commit_all(graph: &mut SceneGraph) -> CommitStats {
        let mut stats = CommitStats::default();
        for root in graph.roots().to_vec() {
            stats += Self::commit(graph, root);
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;
    use crate::nodes::{Group, Sphere, Transform};

    #[test]
    fn test_second_pass_commits_nothing() {
        let mut graph = SceneGraph::new();
        let group = graph.insert(Group::create());
        let sphere = graph.insert(Sphere::create());
        graph.attach(group, "child", sphere).unwrap();

        let first = CommitWalker::commit(&mut graph, group);
        assert_eq!(first, CommitStats { visited: 2, committed: 2 });

        let stamp = graph.get(sphere).unwrap().core().last_committed();
        let second = CommitWalker::commit(&mut graph, group);
        assert_eq!(second, CommitStats { visited: 2, committed: 0 });
        assert_eq!(graph.get(sphere).unwrap().core().last_committed(), stamp);
    }

    #[test]
    fn test_stale_child_under_clean_parent() {
        let mut graph = SceneGraph::new();
        let group = graph.insert(Group::create());
        let sphere = graph.insert(Sphere::create());
        graph.attach(group, "child", sphere).unwrap();
        CommitWalker::commit(&mut graph, group);

        let group_stamp = graph.get(group).unwrap().core().last_committed();
        graph.set_parameter(sphere, "radius", 3.0_f32).unwrap();
        assert!(!graph.get(group).unwrap().is_stale());

        let stats = CommitWalker::commit(&mut graph, group);
        assert_eq!(stats.committed, 1);
        assert_eq!(graph.get(group).unwrap().core().last_committed(), group_stamp);
        assert!(!graph.get(sphere).unwrap().is_stale());
    }

    #[test]
    fn test_committed_stamp_not_before_modified() {
        let mut graph = SceneGraph::new();
        let sphere = graph.insert(Sphere::create());
        graph.set_parameter(sphere, "radius", 2.0_f32).unwrap();
        CommitWalker::commit_all(&mut graph);

        let core = graph.get(sphere).unwrap().core();
        assert!(core.last_committed() >= core.last_modified());
    }

    #[test]
    fn test_parent_commits_before_children() {
        let mut graph = SceneGraph::new();
        let xfm = graph.insert(Transform::create());
        let sphere = graph.insert(Sphere::create());
        graph.attach(xfm, "child", sphere).unwrap();
        graph.set_parameter(xfm, "translation", Vec3::new(0.0, 4.0, 0.0)).unwrap();

        CommitWalker::commit(&mut graph, xfm);
        let parent = graph.get(xfm).unwrap().core().last_committed();
        let child = graph.get(sphere).unwrap().core().last_committed();
        assert!(parent < child);

        // The sphere caches the world transform its ancestors handed it
        let committed = graph
            .get(sphere)
            .unwrap()
            .downcast_ref::<Sphere>()
            .unwrap()
            .committed_world_center();
        assert_eq!(committed, Vec3::new(0.0, 4.0, 0.0));
    }

    #[test]
    fn test_moving_parent_recommits_clean_child() {
        let mut graph = SceneGraph::new();
        let xfm = graph.insert(Transform::create());
        let ball = graph.insert(Sphere::create());
        graph.attach(xfm, "child", ball).unwrap();
        CommitWalker::commit(&mut graph, xfm);

        graph.set_parameter(xfm, "translation", Vec3::new(7.0, 0.0, 0.0)).unwrap();
        assert!(!graph.get(ball).unwrap().is_stale());

        let stats = CommitWalker::commit(&mut graph, xfm);
        assert_eq!(stats, CommitStats { visited: 2, committed: 2 });
        let sphere = graph.get(ball).unwrap().downcast_ref::<Sphere>().unwrap();
        assert_eq!(sphere.committed_world_center(), Vec3::new(7.0, 0.0, 0.0));

        let settled = CommitWalker::commit(&mut graph, xfm);
        assert_eq!(settled.committed, 0);
    }

    #[test]
    fn test_non_moving_parent_change_leaves_child_alone() {
        let mut graph = SceneGraph::new();
        let group = graph.insert(Group::create());
        let ball = graph.insert(Sphere::create());
        graph.attach(group, "child", ball).unwrap();
        CommitWalker::commit(&mut graph, group);

        graph.set_parameter(group, "note", "renamed".to_string()).unwrap();
        let stats = CommitWalker::commit(&mut graph, group);
        assert_eq!(stats, CommitStats { visited: 2, committed: 1 });
    }
}
