use crate::camera::PerspectiveCamera;
use crate::clock::Clock;
use crate::config::SceneConfig;
use crate::geometry::Geometry;
use crate::graph::{Node, NodeKind, SceneError, SceneGraph};
use crate::light::Light;
use crate::material::StandardMaterial;
use glam::Vec3;
use rondavel_common::{Color, NodeId, Transform, ViewportSize};

/// Ids of the nodes other parts of the application bind to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneHandles {
    pub rondavel: NodeId,
    pub body: NodeId,
    pub roof: NodeId,
    pub floor: NodeId,
    pub ambient: NodeId,
    pub moon: NodeId,
    pub camera: NodeId,
}

/// Result of the one-time scene construction.
#[derive(Debug, Clone)]
pub struct Assembly {
    pub scene: SceneGraph,
    pub camera: PerspectiveCamera,
    pub handles: SceneHandles,
    /// Started as assembly begins.
    pub clock: Clock,
}

/// Build the scene: the hut (body and roof under one group), the floor, the
/// two lights and the camera.
pub fn assemble(config: &SceneConfig, viewport: ViewportSize) -> Result<Assembly, SceneError> {
    let clock = Clock::start();
    let sizes = config.rondavel;
    let mut scene = SceneGraph::new();

    let rondavel = scene.add(Node::group("rondavel").with_cast_shadow(true));
    let body = scene
        .add_child(
            rondavel,
            Node::mesh(
                "body",
                Geometry::cylinder(sizes.radius, sizes.height, sizes.radial_segments),
                StandardMaterial::new(Color::parse(&config.body_color)),
            )
            .with_transform(Transform::from_position(Vec3::new(0.0, sizes.height * 0.5, 0.0)))
            .with_cast_shadow(true),
        )?;
    let roof = scene
        .add_child(
            rondavel,
            Node::mesh(
                "roof",
                Geometry::cone(sizes.roof_radius, sizes.roof_height, sizes.radial_segments),
                StandardMaterial::new(Color::parse(&config.roof_color)),
            )
            .with_transform(Transform::from_position(Vec3::new(
                0.0,
                sizes.height + sizes.roof_height * 0.5,
                0.0,
            )))
            .with_cast_shadow(true),
        )?;

    let floor = scene.add(
        Node::mesh(
            "floor",
            Geometry::plane(config.floor_size, config.floor_size),
            StandardMaterial::new(Color::parse(&config.floor_color)),
        )
        .with_transform(Transform::default().with_euler(-std::f32::consts::FRAC_PI_2, 0.0, 0.0))
        .with_receive_shadow(true),
    );

    let ambient = scene.add(Node::light(
        "ambient",
        Light::ambient(Color::parse(&config.ambient.color), config.ambient.intensity),
    ));

    let mut moon_light = Light::directional(Color::parse(&config.moon.color), config.moon.intensity);
    if let Light::Directional { shadow, .. } = &mut moon_light {
        shadow.map_size = config.moon.shadow_map_size;
    }
    let moon = scene.add(
        Node::light("moon", moon_light)
            .with_transform(Transform::from_position(Vec3::from(config.moon.position)))
            .with_cast_shadow(config.moon.cast_shadow),
    );

    let cam = config.camera;
    let mut camera = PerspectiveCamera::new(
        cam.fov_degrees,
        viewport.aspect().unwrap_or(1.0),
        cam.near,
        cam.far,
    );
    camera.position = Vec3::from(cam.position);
    camera.look_at(Vec3::ZERO);
    let camera_node = scene.add(
        Node::new("camera", NodeKind::Camera)
            .with_transform(Transform::from_position(camera.position)),
    );

    tracing::info!(
        "scene assembled: {} nodes, viewport {viewport}",
        scene.len()
    );

    Ok(Assembly {
        scene,
        camera,
        handles: SceneHandles {
            rondavel,
            body,
            roof,
            floor,
            ambient,
            moon,
            camera: camera_node,
        },
        clock,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_assembly() -> Assembly {
        assemble(&SceneConfig::default(), ViewportSize::new(1280, 720)).unwrap()
    }

    #[test]
    fn hut_parts_share_the_group() {
        let a = default_assembly();
        let group = a.scene.get(a.handles.rondavel).unwrap();
        assert_eq!(group.children(), &[a.handles.body, a.handles.roof]);
        assert_eq!(a.scene.len(), 7);
        assert_eq!(a.scene.roots().len(), 5);
    }

    #[test]
    fn roof_sits_on_body() {
        let a = default_assembly();
        let roof_world = a.scene.world_matrix(a.handles.roof).unwrap();
        let centre = roof_world.transform_point3(Vec3::ZERO);
        assert!((centre.y - 3.2).abs() < 1e-5);
        match &a.scene.get(a.handles.roof).unwrap().kind {
            NodeKind::Mesh {
                geometry: Geometry::Cylinder { radius_top, radius_bottom, .. },
                ..
            } => {
                assert_eq!(*radius_top, 0.0);
                assert_eq!(*radius_bottom, 2.65);
            }
            other => panic!("unexpected roof kind {other:?}"),
        }
    }

    #[test]
    fn floor_lies_flat_and_receives_shadows() {
        let a = default_assembly();
        let floor = a.scene.get(a.handles.floor).unwrap();
        assert!(floor.receive_shadow);
        let normal = floor.transform.rotation * Vec3::Z;
        assert!((normal - Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn lights_use_configured_values() {
        let a = default_assembly();
        let ambient = a.scene.light(a.handles.ambient).unwrap();
        assert_eq!(ambient.intensity(), 0.2);
        assert_eq!(ambient.color().to_hex(), 0xb9d5ff);

        let moon_node = a.scene.get(a.handles.moon).unwrap();
        assert!(moon_node.cast_shadow);
        assert_eq!(moon_node.transform.position, Vec3::new(4.0, 5.0, -2.0));
        assert_eq!(a.scene.light(a.handles.moon).unwrap().intensity(), 0.75);
    }

    #[test]
    fn camera_takes_viewport_aspect() {
        let a = default_assembly();
        assert_eq!(a.camera.aspect(), 1280.0 / 720.0);
        assert_eq!(a.camera.fov_degrees(), 75.0);
        assert_eq!(a.camera.position, Vec3::new(4.0, 2.0, 5.0));
        assert!(!a.camera.needs_projection_update());
        assert!(a.scene.get(a.handles.camera).is_some());
    }

    #[test]
    fn clock_starts_during_assembly() {
        let before = std::time::Instant::now();
        let a = default_assembly();
        let after = std::time::Instant::now();
        assert!(a.clock.started() >= before);
        assert!(a.clock.started() <= after);
    }

    #[test]
    fn zero_height_viewport_falls_back_to_square() {
        let a = assemble(&SceneConfig::default(), ViewportSize::new(640, 0)).unwrap();
        assert_eq!(a.camera.aspect(), 1.0);
    }
}
