use glam::{Mat4, Vec3};

use crate::coords::{Vec2, Viewport};

/// 2D orthographic camera.
///
/// Maps `[0, w] × [0, h]` screen pixels to clip space with Y increasing
/// downward, then applies the camera's world offset and zoom. `position` is
/// the world point at the top-left corner of the view.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera2D {
    pub position: Vec2,
    /// Per-axis zoom factor; (1, 1) is a 1:1 pixel mapping.
    pub zoom: Vec2,
    viewport_width: f32,
    viewport_height: f32,
}

impl Camera2D {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            position: Vec2::ZERO,
            zoom: Vec2::ONE,
            viewport_width: width,
            viewport_height: height,
        }
    }

    /// Updates the viewport dimensions. Call on window resize.
    ///
    /// Position and zoom are untouched.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.viewport_width = width;
        self.viewport_height = height;
    }

    #[inline]
    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.viewport_width, self.viewport_height)
    }

    /// Combined view-projection matrix for the vertex shader.
    ///
    /// Column-vector convention (`view_proj * vec4(world, 0, 1)` in WGSL):
    /// the world offset applies first, then zoom, then the orthographic
    /// projection. Depth maps to wgpu's [0, 1] range.
    pub fn matrix(&self) -> Mat4 {
        let w = self.viewport_width.max(1.0);
        let h = self.viewport_height.max(1.0);

        // Top at 0, bottom at h: screen convention, +Y down.
        let projection = Mat4::orthographic_rh(0.0, w, h, 0.0, -1.0, 1.0);
        let view = Mat4::from_scale(Vec3::new(self.zoom.x, self.zoom.y, 1.0))
            * Mat4::from_translation(Vec3::new(-self.position.x, -self.position.y, 0.0));

        projection * view
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(camera: &Camera2D, world: Vec2) -> (f32, f32) {
        let clip = camera.matrix() * glam::Vec4::new(world.x, world.y, 0.0, 1.0);
        (clip.x, clip.y)
    }

    #[test]
    fn screen_corners_map_to_clip_corners() {
        let camera = Camera2D::new(800.0, 600.0);

        let (x, y) = project(&camera, Vec2::new(0.0, 0.0));
        assert!((x + 1.0).abs() < 1e-6 && (y - 1.0).abs() < 1e-6, "top-left -> (-1, 1)");

        let (x, y) = project(&camera, Vec2::new(800.0, 600.0));
        assert!((x - 1.0).abs() < 1e-6 && (y + 1.0).abs() < 1e-6, "bottom-right -> (1, -1)");
    }

    #[test]
    fn position_offsets_world() {
        let mut camera = Camera2D::new(800.0, 600.0);
        camera.position = Vec2::new(100.0, 50.0);

        // The world point under the camera's top-left corner lands at clip (-1, 1).
        let (x, y) = project(&camera, Vec2::new(100.0, 50.0));
        assert!((x + 1.0).abs() < 1e-6 && (y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn zoom_scales_view() {
        let mut camera = Camera2D::new(800.0, 600.0);
        camera.zoom = Vec2::splat(2.0);

        // At 2x zoom the world point (200, 150) sits at the viewport center.
        let (x, y) = project(&camera, Vec2::new(200.0, 150.0));
        assert!(x.abs() < 1e-6 && y.abs() < 1e-6);
    }

    #[test]
    fn resize_is_idempotent() {
        let mut once = Camera2D::new(800.0, 600.0);
        once.resize(1024.0, 768.0);

        let mut twice = Camera2D::new(800.0, 600.0);
        twice.resize(1024.0, 768.0);
        twice.resize(1024.0, 768.0);

        assert_eq!(once.matrix(), twice.matrix());
    }

    #[test]
    fn resize_keeps_position_and_zoom() {
        let mut camera = Camera2D::new(800.0, 600.0);
        camera.position = Vec2::new(33.0, -7.0);
        camera.zoom = Vec2::new(2.0, 0.5);

        camera.resize(320.0, 240.0);

        assert_eq!(camera.position, Vec2::new(33.0, -7.0));
        assert_eq!(camera.zoom, Vec2::new(2.0, 0.5));
    }
}
