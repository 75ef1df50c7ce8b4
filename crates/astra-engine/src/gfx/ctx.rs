use crate::coords::Viewport;

/// Renderer-facing context (device/queue + surface format + viewport).
///
/// Intentionally small and stable; renderers receive it every frame instead
/// of holding device references themselves.
pub struct RenderCtx<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub surface_format: wgpu::TextureFormat,
    pub viewport: Viewport, // logical px
}

impl<'a> RenderCtx<'a> {
    #[inline]
    pub fn new(
        device: &'a wgpu::Device,
        queue: &'a wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        viewport: Viewport,
    ) -> Self {
        Self {
            device,
            queue,
            surface_format,
            viewport,
        }
    }
}

/// Color target for drawing.
///
/// Carries no encoder: batch flushes record and submit their own command
/// buffers, so the only thing renderers share is the attachment view.
pub struct RenderTarget<'a> {
    pub color_view: &'a wgpu::TextureView,
}

impl<'a> RenderTarget<'a> {
    #[inline]
    pub fn new(color_view: &'a wgpu::TextureView) -> Self {
        Self { color_view }
    }
}
