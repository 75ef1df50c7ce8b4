use crate::coords::Vec2;

/// Spatial state of a 2D entity: pure data, read by the render pass.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    /// World-space position in pixels.
    pub position: Vec2,
    /// Rotation in radians, clockwise on screen (+Y down).
    pub rotation: f32,
    /// Non-uniform scale; multiplies the sprite's render size.
    pub scale: Vec2,
}

impl Transform {
    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            rotation: 0.0,
            scale: Vec2::ONE,
        }
    }
}
