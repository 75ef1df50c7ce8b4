use crate::coords::{ColorRgba, Rect, Vec2};
use crate::gfx::TextureHandle;

/// Drawable component: which texture, how big, which tint, which pivot.
///
/// Holds a handle, not the texture itself. GPU resources stay in the `Textures`
/// registry and outlive every sprite that points at them.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Sprite {
    pub texture: TextureHandle,
    /// Render size in pixels, before the transform's scale.
    pub size: Vec2,
    /// Tint (including alpha); opaque white leaves the texture unchanged.
    pub color: ColorRgba,
    /// Pivot in pixels, relative to the sprite's top-left corner. Rotation
    /// and positioning anchor here.
    pub origin: Vec2,
    /// Texel region to sample; `None` draws the whole texture. The
    /// animation system overwrites this every tick for animated entities.
    pub source: Option<Rect>,
}

impl Sprite {
    /// A sprite rendered at the texture's native pixel size.
    pub fn new(texture: TextureHandle) -> Self {
        Self {
            texture,
            size: Vec2::new(texture.width() as f32, texture.height() as f32),
            color: ColorRgba::WHITE,
            origin: Vec2::ZERO,
            source: None,
        }
    }

    #[must_use]
    pub fn with_size(mut self, size: Vec2) -> Self {
        self.size = size;
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: ColorRgba) -> Self {
        self.color = color;
        self
    }

    /// Anchors rotation and positioning at the sprite's center.
    pub fn origin_to_center(&mut self) {
        self.origin = self.size * 0.5;
    }

    /// Sets the pivot from a normalized (0..1) ratio of the sprite size.
    pub fn origin_from_ratio(&mut self, ratio: Vec2) {
        self.origin = self.size * ratio;
    }
}
