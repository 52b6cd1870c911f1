use rondavel_common::{NodeId, ViewportSize};
use rondavel_scene::{PerspectiveCamera, SceneGraph};
use std::collections::BTreeMap;

/// Scene inspector for developer tooling.
///
/// Read-only queries against the scene graph for debugging and the
/// development UI.
pub struct SceneInspector;

impl SceneInspector {
    /// Produce a summary of the scene and the current output.
    pub fn summary(
        scene: &SceneGraph,
        camera: &PerspectiveCamera,
        viewport: ViewportSize,
        pixel_ratio: f64,
    ) -> SceneSummary {
        SceneSummary {
            node_count: scene.len(),
            by_kind: scene.count_by_kind(),
            camera_position: camera.position.to_array(),
            aspect: camera.aspect(),
            viewport,
            pixel_ratio,
        }
    }

    /// World-space placement of a single node.
    pub fn inspect_node(scene: &SceneGraph, id: NodeId) -> Option<NodeInfo> {
        let node = scene.get(id)?;
        let world = scene.world_matrix(id)?;
        Some(NodeInfo {
            id,
            name: node.name.clone(),
            kind: node.kind.label(),
            world_position: world.transform_point3(glam::Vec3::ZERO).to_array(),
            cast_shadow: node.cast_shadow,
            receive_shadow: node.receive_shadow,
        })
    }

    /// All nodes in traversal order.
    pub fn list_nodes(scene: &SceneGraph) -> Vec<NodeInfo> {
        scene
            .traverse()
            .into_iter()
            .filter_map(|v| Self::inspect_node(scene, v.id))
            .collect()
    }
}

/// Summary of scene state for the inspector.
#[derive(Debug, Clone)]
pub struct SceneSummary {
    pub node_count: usize,
    pub by_kind: BTreeMap<&'static str, usize>,
    pub camera_position: [f32; 3],
    pub aspect: f32,
    pub viewport: ViewportSize,
    pub pixel_ratio: f64,
}

impl std::fmt::Display for SceneSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kinds: Vec<String> = self
            .by_kind
            .iter()
            .map(|(kind, count)| format!("{kind}={count}"))
            .collect();
        let [x, y, z] = self.camera_position;
        write!(
            f,
            "Scene: nodes={} ({}) camera=({x:.2}, {y:.2}, {z:.2}) aspect={:.3} viewport={} @{}",
            self.node_count,
            kinds.join(" "),
            self.aspect,
            self.viewport,
            self.pixel_ratio
        )
    }
}

/// Detailed info about a single node.
#[derive(Debug, Clone)]
pub struct NodeInfo {
    pub id: NodeId,
    pub name: String,
    pub kind: &'static str,
    pub world_position: [f32; 3],
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

impl std::fmt::Display for NodeInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let [x, y, z] = self.world_position;
        write!(
            f,
            "Node [{}] {} ({}) pos=({x:.2}, {y:.2}, {z:.2})",
            self.id.short(),
            self.name,
            self.kind
        )?;
        if self.cast_shadow {
            write!(f, " casts")?;
        }
        if self.receive_shadow {
            write!(f, " receives")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rondavel_scene::{SceneConfig, assemble};

    fn scene() -> rondavel_scene::Assembly {
        assemble(&SceneConfig::default(), ViewportSize::new(1024, 768)).unwrap()
    }

    #[test]
    fn summary_counts_kinds() {
        let a = scene();
        let summary = SceneInspector::summary(&a.scene, &a.camera, ViewportSize::new(1024, 768), 2.0);
        assert_eq!(summary.node_count, 7);
        assert_eq!(summary.by_kind.get("mesh"), Some(&3));
        assert_eq!(summary.by_kind.get("light"), Some(&2));
        assert_eq!(summary.camera_position, [4.0, 2.0, 5.0]);
    }

    #[test]
    fn summary_display() {
        let a = scene();
        let s = SceneInspector::summary(&a.scene, &a.camera, ViewportSize::new(1024, 768), 2.0)
            .to_string();
        assert!(s.contains("nodes=7"));
        assert!(s.contains("viewport=1024x768 @2"));
        assert!(s.contains("aspect=1.333"));
    }

    #[test]
    fn inspect_roof_in_world_space() {
        let a = scene();
        let info = SceneInspector::inspect_node(&a.scene, a.handles.roof).unwrap();
        assert_eq!(info.name, "roof");
        assert_eq!(info.kind, "mesh");
        assert!((info.world_position[1] - 3.2).abs() < 1e-5);
        assert!(info.to_string().contains("casts"));
    }

    #[test]
    fn inspect_missing_node() {
        let a = scene();
        assert!(SceneInspector::inspect_node(&a.scene, NodeId::new()).is_none());
    }

    #[test]
    fn list_follows_traversal() {
        let a = scene();
        let nodes = SceneInspector::list_nodes(&a.scene);
        assert_eq!(nodes.len(), 7);
        assert_eq!(nodes[0].name, "rondavel");
        assert_eq!(nodes[1].name, "body");
    }
}
