use glam::{Mat4, Vec3};

/// Perspective camera looking from `position` towards `target`.
///
/// The projection matrix is cached. Changing any projection parameter marks
/// it stale until `update_projection_matrix` runs; renderers read the cache.
#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveCamera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    fov_degrees: f32,
    aspect: f32,
    near: f32,
    far: f32,
    projection: Mat4,
    projection_dirty: bool,
}

impl PerspectiveCamera {
    pub fn new(fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut camera = Self {
            position: Vec3::ZERO,
            target: Vec3::NEG_Z,
            up: Vec3::Y,
            fov_degrees,
            aspect,
            near,
            far,
            projection: Mat4::IDENTITY,
            projection_dirty: true,
        };
        camera.update_projection_matrix();
        camera
    }

    pub fn fov_degrees(&self) -> f32 {
        self.fov_degrees
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn near(&self) -> f32 {
        self.near
    }

    pub fn far(&self) -> f32 {
        self.far
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
        self.projection_dirty = true;
    }

    pub fn set_fov_degrees(&mut self, fov: f32) {
        self.fov_degrees = fov;
        self.projection_dirty = true;
    }

    pub fn needs_projection_update(&self) -> bool {
        self.projection_dirty
    }

    pub fn update_projection_matrix(&mut self) {
        self.projection = Mat4::perspective_rh(
            self.fov_degrees.to_radians(),
            self.aspect,
            self.near,
            self.far,
        );
        self.projection_dirty = false;
    }

    pub fn look_at(&mut self, target: Vec3) {
        self.target = target;
    }

    /// Cached projection; call `update_projection_matrix` after changes.
    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    /// Camera-to-world matrix. Columns 0 and 1 are the screen right and up axes.
    pub fn world_matrix(&self) -> Mat4 {
        self.view_matrix().inverse()
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self::new(50.0, 1.0, 0.1, 2000.0)
    }
}
