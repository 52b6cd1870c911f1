use glam::{Mat4, Vec3};
use rondavel_common::NodeId;
use rondavel_scene::{
    DirectionalShadow, Geometry, Light, NodeKind, PerspectiveCamera, SceneGraph, StandardMaterial,
};

/// A mesh to draw this frame.
#[derive(Debug, Clone)]
pub struct MeshItem {
    pub id: NodeId,
    pub name: String,
    pub world: Mat4,
    pub geometry: Geometry,
    pub material: StandardMaterial,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

/// A directional light, resolved to world space.
#[derive(Debug, Clone, Copy)]
pub struct DirectionalItem {
    pub id: NodeId,
    /// Linear colour premultiplied by intensity.
    pub radiance: [f32; 3],
    pub position: Vec3,
    pub target: Vec3,
    pub cast_shadow: bool,
    pub shadow: DirectionalShadow,
}

impl DirectionalItem {
    /// Unit vector from the surface towards the light.
    pub fn to_light(&self) -> Vec3 {
        (self.position - self.target).normalize_or_zero()
    }

    pub fn shadow_view_projection(&self) -> Mat4 {
        self.shadow.view_projection(self.position, self.target)
    }
}

/// Everything a backend needs to draw one frame, flattened from the graph.
#[derive(Debug, Clone)]
pub struct FramePacket {
    pub view: Mat4,
    pub projection: Mat4,
    pub camera_position: Vec3,
    pub meshes: Vec<MeshItem>,
    /// Sum of ambient lights, linear, premultiplied by intensity.
    pub ambient: [f32; 3],
    pub directional: Vec<DirectionalItem>,
}

impl FramePacket {
    pub fn collect(scene: &SceneGraph, camera: &PerspectiveCamera) -> Self {
        if camera.needs_projection_update() {
            tracing::warn!("drawing with a stale projection matrix");
        }
        let mut packet = Self {
            view: camera.view_matrix(),
            projection: camera.projection_matrix(),
            camera_position: camera.position,
            meshes: Vec::new(),
            ambient: [0.0; 3],
            directional: Vec::new(),
        };

        for visit in scene.traverse() {
            let node = visit.node;
            match &node.kind {
                NodeKind::Mesh { geometry, material } => packet.meshes.push(MeshItem {
                    id: visit.id,
                    name: node.name.clone(),
                    world: visit.world,
                    geometry: *geometry,
                    material: *material,
                    cast_shadow: node.cast_shadow,
                    receive_shadow: node.receive_shadow,
                }),
                NodeKind::Light(Light::Ambient { color, intensity }) => {
                    let linear = color.to_linear();
                    for (sum, c) in packet.ambient.iter_mut().zip(linear) {
                        *sum += c * intensity;
                    }
                }
                NodeKind::Light(Light::Directional {
                    color,
                    intensity,
                    target,
                    shadow,
                }) => {
                    let [r, g, b] = color.to_linear();
                    packet.directional.push(DirectionalItem {
                        id: visit.id,
                        radiance: [r * intensity, g * intensity, b * intensity],
                        position: visit.world.transform_point3(Vec3::ZERO),
                        target: *target,
                        cast_shadow: node.cast_shadow,
                        shadow: *shadow,
                    });
                }
                NodeKind::Group | NodeKind::Camera => {}
            }
        }
        packet
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }

    /// The first shadow-casting directional light, if any.
    pub fn shadow_light(&self) -> Option<&DirectionalItem> {
        self.directional.iter().find(|d| d.cast_shadow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rondavel_common::ViewportSize;
    use rondavel_scene::{SceneConfig, assemble};

    #[test]
    fn collects_default_scene() {
        let a = assemble(&SceneConfig::default(), ViewportSize::new(800, 600)).unwrap();
        let packet = FramePacket::collect(&a.scene, &a.camera);

        let names: Vec<&str> = packet.meshes.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["body", "roof", "floor"]);
        assert_eq!(packet.directional.len(), 1);

        let moon = packet.shadow_light().unwrap();
        assert_eq!(moon.position, Vec3::new(4.0, 5.0, -2.0));
        assert!((moon.to_light() - Vec3::new(4.0, 5.0, -2.0).normalize()).length() < 1e-5);
        assert_eq!(moon.radiance, [0.75, 0.75, 0.75]);

        // #b9d5ff at 0.2, linearised
        assert!(packet.ambient[2] > packet.ambient[0]);
        assert!((packet.ambient[2] - 0.2).abs() < 1e-5);
    }

    #[test]
    fn mesh_world_matrices_include_group() {
        let a = assemble(&SceneConfig::default(), ViewportSize::new(800, 600)).unwrap();
        let packet = FramePacket::collect(&a.scene, &a.camera);
        let body = &packet.meshes[0];
        assert!(body.cast_shadow);
        assert!((body.world.transform_point3(Vec3::ZERO).y - 1.1).abs() < 1e-5);
        assert!(packet.meshes[2].receive_shadow);
    }

    #[test]
    fn view_projection_matches_camera() {
        let a = assemble(&SceneConfig::default(), ViewportSize::new(800, 600)).unwrap();
        let packet = FramePacket::collect(&a.scene, &a.camera);
        assert_eq!(packet.view_projection(), a.camera.view_projection());
    }
}
