use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Process-unique texture identity.
///
/// Identity, not content: two textures uploaded from the same pixels get
/// distinct ids and therefore batch into distinct groups.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct TextureId(u64);

static NEXT_TEXTURE_ID: AtomicU64 = AtomicU64::new(1);

impl TextureId {
    pub(crate) fn next() -> Self {
        Self(NEXT_TEXTURE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Handle constructor for GPU-free unit tests.
#[cfg(test)]
pub(crate) fn test_handle(width: u32, height: u32) -> TextureHandle {
    TextureHandle::new(TextureId::next(), width, height)
}

/// Cheap copyable key to a texture: identity plus pixel dimensions.
///
/// Components and the batcher carry handles; the owning [`Texture2D`] stays
/// in the [`Textures`] registry. Dimensions ride along because source
/// rectangles are normalized against them at quad-build time.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TextureHandle {
    id: TextureId,
    width: u32,
    height: u32,
}

impl TextureHandle {
    #[inline]
    pub(crate) fn new(id: TextureId, width: u32, height: u32) -> Self {
        Self { id, width, height }
    }

    #[inline]
    pub fn id(&self) -> TextureId {
        self.id
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }
}

/// Texture layer errors. Missing resources are hard failures; there is no
/// fallback texture.
#[derive(Debug, Clone, PartialEq)]
pub enum TextureError {
    /// Pixel buffer length does not match `width * height * 4`.
    SizeMismatch { expected: usize, actual: usize },
    /// A dimension is zero.
    EmptyTexture { width: u32, height: u32 },
    /// Handle does not resolve to a registered texture.
    UnknownHandle(TextureId),
    /// Name was never registered.
    UnknownName(String),
}

impl fmt::Display for TextureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextureError::SizeMismatch { expected, actual } => {
                write!(f, "pixel buffer holds {actual} bytes, expected {expected}")
            }
            TextureError::EmptyTexture { width, height } => {
                write!(f, "texture dimensions {width}x{height} must be non-zero")
            }
            TextureError::UnknownHandle(id) => write!(f, "no texture registered for {id:?}"),
            TextureError::UnknownName(name) => write!(f, "no texture registered as {name:?}"),
        }
    }
}

impl std::error::Error for TextureError {}

/// An RGBA8 image uploaded to the GPU.
///
/// Immutable after creation; shared through the [`Textures`] registry, which
/// owns the GPU resource for the scene's lifetime.
pub struct Texture2D {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    sampler: wgpu::Sampler,
    handle: TextureHandle,
}

impl Texture2D {
    /// Uploads a decoded RGBA8 pixel buffer.
    ///
    /// Decoding happens upstream; this is the narrow seam between asset
    /// loading and the renderer. `pixels` must hold exactly
    /// `width * height * 4` bytes, row-major, top row first.
    pub fn from_rgba8(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        pixels: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Self, TextureError> {
        if width == 0 || height == 0 {
            return Err(TextureError::EmptyTexture { width, height });
        }
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(TextureError::SizeMismatch {
                expected,
                actual: pixels.len(),
            });
        }

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        // Clamp instead of repeat so atlas cells never bleed across edges.
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(label),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        Ok(Self {
            texture,
            view,
            sampler,
            handle: TextureHandle::new(TextureId::next(), width, height),
        })
    }

    #[inline]
    pub fn handle(&self) -> TextureHandle {
        self.handle
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.texture.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.texture.height()
    }

    #[inline]
    pub(crate) fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    #[inline]
    pub(crate) fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }
}

/// Name-keyed texture registry.
///
/// Owns every [`Texture2D`] for the scene's lifetime and resolves the
/// handles that components carry. Lookups fail hard: a dangling handle or an
/// unregistered name is a caller bug, never silently substituted.
#[derive(Default)]
pub struct Textures {
    by_id: HashMap<TextureId, Texture2D>,
    by_name: HashMap<String, TextureId>,
}

impl Textures {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a texture under `name` and returns its handle.
    ///
    /// Re-registering a name replaces the previous texture (the old handle
    /// becomes dangling and will fail lookups).
    pub fn insert(&mut self, name: impl Into<String>, texture: Texture2D) -> TextureHandle {
        let name = name.into();
        let handle = texture.handle();

        if let Some(old_id) = self.by_name.insert(name.clone(), handle.id()) {
            log::warn!("texture {name:?} re-registered; dropping previous upload");
            self.by_id.remove(&old_id);
        }
        self.by_id.insert(handle.id(), texture);

        handle
    }

    pub fn get(&self, handle: TextureHandle) -> Result<&Texture2D, TextureError> {
        self.by_id
            .get(&handle.id())
            .ok_or(TextureError::UnknownHandle(handle.id()))
    }

    pub fn by_name(&self, name: &str) -> Result<&Texture2D, TextureError> {
        let id = self
            .by_name
            .get(name)
            .ok_or_else(|| TextureError::UnknownName(name.to_string()))?;
        self.by_id
            .get(id)
            .ok_or(TextureError::UnknownHandle(*id))
    }

    /// Resolves a registered name to its handle.
    pub fn handle(&self, name: &str) -> Result<TextureHandle, TextureError> {
        self.by_name(name).map(Texture2D::handle)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn texture_ids_are_unique() {
        assert_ne!(TextureId::next(), TextureId::next());
    }

    #[test]
    fn handle_carries_dimensions() {
        let handle = TextureHandle::new(TextureId::next(), 64, 32);
        assert_eq!(handle.width(), 64);
        assert_eq!(handle.height(), 32);
    }

    #[test]
    fn unknown_name_is_an_error() {
        let textures = Textures::new();
        assert!(matches!(
            textures.by_name("missing"),
            Err(TextureError::UnknownName(_))
        ));
    }

    #[test]
    fn unknown_handle_is_an_error() {
        let textures = Textures::new();
        let handle = TextureHandle::new(TextureId::next(), 8, 8);
        assert!(matches!(
            textures.get(handle),
            Err(TextureError::UnknownHandle(_))
        ));
    }
}
