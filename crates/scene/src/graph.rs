use crate::geometry::Geometry;
use crate::light::Light;
use crate::material::StandardMaterial;
use glam::Mat4;
use rondavel_common::{NodeId, Transform};
use std::collections::BTreeMap;

/// Errors from scene graph operations.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("node {0:?} not found")]
    UnknownNode(NodeId),
    #[error("node {0:?} is not a light")]
    NotALight(NodeId),
}

/// What a node is, beyond its transform.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Pure transform node that only parents other nodes.
    Group,
    Mesh {
        geometry: Geometry,
        material: StandardMaterial,
    },
    Light(Light),
    /// Marks where the camera sits in the graph. The camera itself is owned
    /// by the application context.
    Camera,
}

impl NodeKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Group => "group",
            Self::Mesh { .. } => "mesh",
            Self::Light(_) => "light",
            Self::Camera => "camera",
        }
    }
}

/// A node in the scene graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: String,
    pub transform: Transform,
    pub kind: NodeKind,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            transform: Transform::default(),
            kind,
            cast_shadow: false,
            receive_shadow: false,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn group(name: impl Into<String>) -> Self {
        Self::new(name, NodeKind::Group)
    }

    pub fn mesh(name: impl Into<String>, geometry: Geometry, material: StandardMaterial) -> Self {
        Self::new(name, NodeKind::Mesh { geometry, material })
    }

    pub fn light(name: impl Into<String>, light: Light) -> Self {
        Self::new(name, NodeKind::Light(light))
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_cast_shadow(mut self, cast: bool) -> Self {
        self.cast_shadow = cast;
        self
    }

    pub fn with_receive_shadow(mut self, receive: bool) -> Self {
        self.receive_shadow = receive;
        self
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn as_light(&self) -> Option<&Light> {
        match &self.kind {
            NodeKind::Light(light) => Some(light),
            _ => None,
        }
    }

    pub fn as_light_mut(&mut self) -> Option<&mut Light> {
        match &mut self.kind {
            NodeKind::Light(light) => Some(light),
            _ => None,
        }
    }
}

/// A node visited during traversal, with its accumulated world matrix.
#[derive(Debug, Clone, Copy)]
pub struct Visit<'a> {
    pub id: NodeId,
    pub node: &'a Node,
    pub world: Mat4,
}

/// The scene container. Owns every node exclusively.
///
/// Nodes are only ever added; there is no removal or reparenting, so a
/// `NodeId` handed out once stays valid for the lifetime of the graph.
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    nodes: BTreeMap<NodeId, Node>,
    /// Top-level nodes in insertion order.
    roots: Vec<NodeId>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Add a node at the top level of the scene.
    pub fn add(&mut self, node: Node) -> NodeId {
        let id = NodeId::new();
        tracing::debug!("add {} {:?} [{}]", node.kind.label(), node.name, id.short());
        self.nodes.insert(id, Node { parent: None, ..node });
        self.roots.push(id);
        id
    }

    /// Add a node as the last child of `parent`.
    pub fn add_child(&mut self, parent: NodeId, node: Node) -> Result<NodeId, SceneError> {
        let id = NodeId::new();
        let parent_node = self
            .nodes
            .get_mut(&parent)
            .ok_or(SceneError::UnknownNode(parent))?;
        parent_node.children.push(id);
        tracing::debug!(
            "add {} {:?} [{}] under [{}]",
            node.kind.label(),
            node.name,
            id.short(),
            parent.short()
        );
        self.nodes.insert(
            id,
            Node {
                parent: Some(parent),
                ..node
            },
        );
        Ok(id)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    pub fn light(&self, id: NodeId) -> Result<&Light, SceneError> {
        self.get(id)
            .ok_or(SceneError::UnknownNode(id))?
            .as_light()
            .ok_or(SceneError::NotALight(id))
    }

    pub fn light_mut(&mut self, id: NodeId) -> Result<&mut Light, SceneError> {
        self.get_mut(id)
            .ok_or(SceneError::UnknownNode(id))?
            .as_light_mut()
            .ok_or(SceneError::NotALight(id))
    }

    /// Find the first node with the given name, in traversal order.
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.traverse()
            .into_iter()
            .find(|v| v.node.name == name)
            .map(|v| v.id)
    }

    /// World matrix of a node: the product of its ancestors' local matrices
    /// and its own.
    pub fn world_matrix(&self, id: NodeId) -> Option<Mat4> {
        let mut node = self.nodes.get(&id)?;
        let mut matrix = node.transform.matrix();
        while let Some(parent) = node.parent {
            node = self.nodes.get(&parent)?;
            matrix = node.transform.matrix() * matrix;
        }
        Some(matrix)
    }

    /// Depth-first, parents before children, siblings in insertion order.
    pub fn traverse(&self) -> Vec<Visit<'_>> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<(NodeId, Mat4)> = self
            .roots
            .iter()
            .rev()
            .map(|id| (*id, Mat4::IDENTITY))
            .collect();
        while let Some((id, parent_world)) = stack.pop() {
            let Some(node) = self.nodes.get(&id) else {
                continue;
            };
            let world = parent_world * node.transform.matrix();
            out.push(Visit { id, node, world });
            stack.extend(node.children.iter().rev().map(|child| (*child, world)));
        }
        out
    }

    /// Number of nodes per kind label, sorted by label.
    pub fn count_by_kind(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for node in self.nodes.values() {
            *counts.entry(node.kind.label()).or_insert(0) += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn graph_starts_empty() {
        let g = SceneGraph::new();
        assert!(g.is_empty());
        assert!(g.traverse().is_empty());
    }

    #[test]
    fn add_child_links_parent() {
        let mut g = SceneGraph::new();
        let group = g.add(Node::group("hut"));
        let child = g.add_child(group, Node::group("roof")).unwrap();
        assert_eq!(g.len(), 2);
        assert_eq!(g.roots(), &[group]);
        assert_eq!(g.get(child).unwrap().parent(), Some(group));
        assert_eq!(g.get(group).unwrap().children(), &[child]);
    }

    #[test]
    fn add_child_to_unknown_parent_fails() {
        let mut g = SceneGraph::new();
        let err = g.add_child(NodeId::new(), Node::group("orphan"));
        assert!(matches!(err, Err(SceneError::UnknownNode(_))));
        assert!(g.is_empty());
    }

    #[test]
    fn world_matrix_composes_parents() {
        let mut g = SceneGraph::new();
        let group = g.add(Node::group("g").with_transform(Transform::from_position(Vec3::new(
            1.0, 0.0, 0.0,
        ))));
        let child = g
            .add_child(
                group,
                Node::group("c").with_transform(Transform::from_position(Vec3::new(0.0, 2.0, 0.0))),
            )
            .unwrap();
        let world = g.world_matrix(child).unwrap();
        assert_eq!(world.transform_point3(Vec3::ZERO), Vec3::new(1.0, 2.0, 0.0));
    }

    #[test]
    fn traversal_is_depth_first_in_insertion_order() {
        let mut g = SceneGraph::new();
        let a = g.add(Node::group("a"));
        g.add_child(a, Node::group("a1")).unwrap();
        g.add_child(a, Node::group("a2")).unwrap();
        g.add(Node::group("b"));

        let names: Vec<&str> = g.traverse().iter().map(|v| v.node.name.as_str()).collect();
        assert_eq!(names, ["a", "a1", "a2", "b"]);
        assert!(g.find_by_name("a2").is_some());
        assert!(g.find_by_name("zz").is_none());
    }

    #[test]
    fn light_lookup_checks_kind() {
        let mut g = SceneGraph::new();
        let group = g.add(Node::group("g"));
        let light = g.add(Node::light("ambient", Light::ambient(Default::default(), 0.5)));
        assert!(g.light(light).is_ok());
        assert!(matches!(g.light(group), Err(SceneError::NotALight(_))));
        g.light_mut(light).unwrap().set_intensity(0.9);
        assert_eq!(g.light(light).unwrap().intensity(), 0.9);
    }

    #[test]
    fn count_by_kind_groups_labels() {
        let mut g = SceneGraph::new();
        g.add(Node::group("g"));
        g.add(Node::new("cam", NodeKind::Camera));
        g.add(Node::group("h"));
        let counts = g.count_by_kind();
        assert_eq!(counts["group"], 2);
        assert_eq!(counts["camera"], 1);
    }
}
