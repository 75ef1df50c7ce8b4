//! Quad accumulation and flush control for sprite batching.
//!
//! [`SpriteBatch`] owns the CPU side of the batching pipeline: it transforms
//! every sprite into four world-space vertices, tracks which texture the
//! pending quads share, and decides when the accumulated prefix must be
//! handed to the GPU. The GPU side is behind the [`QuadSink`] seam, so the
//! whole state machine runs (and is tested) without a device.
//!
//! Two situations force a flush mid-session:
//! - the draw targets a different texture than the pending quads
//! - the pending quad count has reached capacity
//!
//! Both are silent and lossless. Callers that group draws by texture before
//! submitting (see `scene::sprite_pass`) reach the lower bound of one flush
//! per distinct texture per frame.

use bytemuck::{Pod, Zeroable};
use glam::{Affine2, Mat4};

use crate::coords::{ColorRgba, Rect, Vec2};

use super::texture::{TextureHandle, TextureId};

pub const VERTICES_PER_SPRITE: usize = 4;
pub const INDICES_PER_SPRITE: usize = 6;

/// Default sprite capacity of a batch (and of its GPU buffers).
pub const DEFAULT_CAPACITY: usize = 1000;

/// One corner of a sprite quad.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct SpriteVertex {
    /// World-space position in pixels.
    pub position: [f32; 2],
    /// Normalized texture coordinate in [0, 1].
    pub tex_coord: [f32; 2],
    /// Straight-alpha tint, same for all four corners of a quad.
    pub color: [f32; 4],
}

impl SpriteVertex {
    const ATTRS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x2, // position
        1 => Float32x2, // tex_coord
        2 => Float32x4  // color
    ];

    pub(crate) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SpriteVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Unit-quad corners in draw order: the index pattern below fans them into
/// two counter-clockwise triangles.
const QUAD_CORNERS: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

/// Builds the static index list for `sprite_count` quads.
///
/// Computed once at buffer creation; every flush draws a prefix of it.
pub fn quad_indices(sprite_count: usize) -> Vec<u32> {
    let mut indices = Vec::with_capacity(sprite_count * INDICES_PER_SPRITE);
    for i in 0..sprite_count as u32 {
        let base = i * VERTICES_PER_SPRITE as u32;
        indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }
    indices
}

/// Transforms the unit quad into world-space corner positions.
///
/// `size` scales the quad to pixels first, then `origin` (in pixels) shifts
/// the pivot, then rotation and translation apply. With
/// `origin = size * 0.5` the quad is centered on `position` for every
/// rotation.
pub fn quad_corners(position: Vec2, size: Vec2, origin: Vec2, rotation: f32) -> [[f32; 2]; 4] {
    let m = Affine2::from_angle_translation(rotation, position.into())
        * Affine2::from_translation((-origin).into())
        * Affine2::from_scale(size.into());

    QUAD_CORNERS.map(|c| {
        let p = m.transform_point2(glam::Vec2::new(c[0], c[1]));
        [p.x, p.y]
    })
}

/// Texture coordinates for a quad: the unit square, or `source` normalized
/// against the texture's pixel dimensions for atlas/animation frames.
pub fn quad_uvs(source: Option<Rect>, texture: TextureHandle) -> [[f32; 2]; 4] {
    match source {
        None => QUAD_CORNERS,
        Some(r) => {
            let tw = texture.width() as f32;
            let th = texture.height() as f32;
            let (u0, v0) = (r.x / tw, r.y / th);
            let (u1, v1) = ((r.x + r.w) / tw, (r.y + r.h) / th);
            [[u0, v0], [u1, v0], [u1, v1], [u0, v1]]
        }
    }
}

/// One flushed draw call: the vertex prefix for `quads` quads sharing
/// `texture`, plus the session's view-projection matrix.
pub struct QuadFlush<'a> {
    pub view_proj: Mat4,
    pub vertices: &'a [SpriteVertex],
    pub texture: TextureId,
    pub quads: usize,
}

/// Receiver of flushed quads: the narrow seam between batching logic and
/// the GPU. Production uses the wgpu sprite pipeline; tests use a recorder.
pub trait QuadSink {
    fn flush(&mut self, flush: &QuadFlush<'_>);
}

/// Sprite accumulator with begin/draw/end session semantics.
///
/// A session is the scope between one `begin` and its matching `end`;
/// exactly one texture is pending at any moment inside it. Protocol
/// violations (nested `begin`, `draw`/`end` outside a session) are caller
/// bugs and panic immediately; carrying on would corrupt the next frame's
/// buffer contents.
pub struct SpriteBatch {
    capacity: usize,
    vertices: Vec<SpriteVertex>,
    bound: Option<TextureHandle>,
    view_proj: Option<Mat4>,
    draw_calls: u32,
}

impl SpriteBatch {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// # Panics
    /// Panics if `capacity` is zero.
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "SpriteBatch capacity must be non-zero");
        Self {
            capacity,
            vertices: Vec::with_capacity(capacity * VERTICES_PER_SPRITE),
            bound: None,
            view_proj: None,
            draw_calls: 0,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Quads accumulated since the last flush.
    #[inline]
    pub fn pending(&self) -> usize {
        self.vertices.len() / VERTICES_PER_SPRITE
    }

    #[inline]
    pub fn in_session(&self) -> bool {
        self.view_proj.is_some()
    }

    /// Draw calls issued since the last [`reset_draw_calls`](Self::reset_draw_calls).
    ///
    /// Diagnostics only; the frame owner resets it once per frame.
    #[inline]
    pub fn draw_calls(&self) -> u32 {
        self.draw_calls
    }

    #[inline]
    pub fn reset_draw_calls(&mut self) {
        self.draw_calls = 0;
    }

    /// Opens a batch session with the given view-projection matrix.
    ///
    /// # Panics
    /// Panics if a session is already open.
    pub fn begin(&mut self, view_proj: Mat4) {
        assert!(
            self.view_proj.is_none(),
            "SpriteBatch::begin called twice without a matching end"
        );
        self.view_proj = Some(view_proj);
        self.vertices.clear();
        self.bound = None;
    }

    /// Queues one whole-texture quad.
    ///
    /// # Panics
    /// Panics if called outside a session.
    pub fn draw(
        &mut self,
        sink: &mut dyn QuadSink,
        texture: TextureHandle,
        position: Vec2,
        size: Vec2,
        color: ColorRgba,
        origin: Vec2,
        rotation: f32,
    ) {
        self.push_quad(sink, texture, position, size, None, color, origin, rotation);
    }

    /// Queues one quad sampling `source` (a texel rectangle inside the
    /// texture), the sprite-sheet/animation path.
    ///
    /// # Panics
    /// Panics if called outside a session.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_region(
        &mut self,
        sink: &mut dyn QuadSink,
        texture: TextureHandle,
        position: Vec2,
        size: Vec2,
        source: Rect,
        color: ColorRgba,
        origin: Vec2,
        rotation: f32,
    ) {
        self.push_quad(sink, texture, position, size, Some(source), color, origin, rotation);
    }

    /// Closes the session, flushing any remaining quads.
    ///
    /// An empty session issues no draw call.
    ///
    /// # Panics
    /// Panics if no session is open.
    pub fn end(&mut self, sink: &mut dyn QuadSink) {
        assert!(
            self.view_proj.is_some(),
            "SpriteBatch::end called without a matching begin"
        );
        if self.pending() > 0 {
            self.flush(sink);
        }
        self.bound = None;
        self.view_proj = None;
    }

    #[allow(clippy::too_many_arguments)]
    fn push_quad(
        &mut self,
        sink: &mut dyn QuadSink,
        texture: TextureHandle,
        position: Vec2,
        size: Vec2,
        source: Option<Rect>,
        color: ColorRgba,
        origin: Vec2,
        rotation: f32,
    ) {
        assert!(
            self.view_proj.is_some(),
            "SpriteBatch::draw called outside a begin/end session"
        );

        // Switching textures strands the pending quads: flush them first.
        if self.bound.is_some_and(|b| b.id() != texture.id()) && self.pending() > 0 {
            self.flush(sink);
        }
        if self.pending() == self.capacity {
            self.flush(sink);
        }
        self.bound = Some(texture);

        let corners = quad_corners(position, size, origin, rotation);
        let uvs = quad_uvs(source, texture);
        let rgba = color.to_array();

        for i in 0..VERTICES_PER_SPRITE {
            self.vertices.push(SpriteVertex {
                position: corners[i],
                tex_coord: uvs[i],
                color: rgba,
            });
        }
    }

    fn flush(&mut self, sink: &mut dyn QuadSink) {
        let (Some(view_proj), Some(bound)) = (self.view_proj, self.bound) else {
            return;
        };
        if self.vertices.is_empty() {
            return;
        }

        sink.flush(&QuadFlush {
            view_proj,
            vertices: &self.vertices,
            texture: bound.id(),
            quads: self.pending(),
        });

        self.draw_calls += 1;
        self.vertices.clear();
    }
}

impl Default for SpriteBatch {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::texture::TextureId;

    /// Records every flush instead of touching a GPU.
    #[derive(Default)]
    struct RecordingSink {
        flushes: Vec<(TextureId, usize)>,
    }

    impl QuadSink for RecordingSink {
        fn flush(&mut self, flush: &QuadFlush<'_>) {
            assert_eq!(flush.vertices.len(), flush.quads * VERTICES_PER_SPRITE);
            self.flushes.push((flush.texture, flush.quads));
        }
    }

    fn handle(px: u32) -> TextureHandle {
        TextureHandle::new(TextureId::next(), px, px)
    }

    fn draw_n(batch: &mut SpriteBatch, sink: &mut RecordingSink, texture: TextureHandle, n: usize) {
        for _ in 0..n {
            batch.draw(
                sink,
                texture,
                Vec2::new(10.0, 10.0),
                Vec2::splat(16.0),
                ColorRgba::WHITE,
                Vec2::ZERO,
                0.0,
            );
        }
    }

    // ── flush counting ────────────────────────────────────────────────────

    #[test]
    fn one_texture_one_flush() {
        let mut batch = SpriteBatch::with_capacity(64);
        let mut sink = RecordingSink::default();
        let tex = handle(32);

        batch.begin(Mat4::IDENTITY);
        draw_n(&mut batch, &mut sink, tex, 64);
        batch.end(&mut sink);

        assert_eq!(sink.flushes, vec![(tex.id(), 64)]);
        assert_eq!(batch.draw_calls(), 1);
    }

    #[test]
    fn alternating_textures_flush_every_draw() {
        let mut batch = SpriteBatch::with_capacity(64);
        let mut sink = RecordingSink::default();
        let (a, b) = (handle(32), handle(32));

        batch.begin(Mat4::IDENTITY);
        for i in 0..10 {
            let tex = if i % 2 == 0 { a } else { b };
            draw_n(&mut batch, &mut sink, tex, 1);
        }
        batch.end(&mut sink);

        assert_eq!(batch.draw_calls(), 10);
        // Each flush carried exactly one quad.
        assert!(sink.flushes.iter().all(|&(_, quads)| quads == 1));
    }

    #[test]
    fn overflow_flushes_ceil_of_capacity() {
        let mut batch = SpriteBatch::with_capacity(8);
        let mut sink = RecordingSink::default();
        let tex = handle(32);

        batch.begin(Mat4::IDENTITY);
        draw_n(&mut batch, &mut sink, tex, 21); // ceil(21 / 8) = 3
        batch.end(&mut sink);

        assert_eq!(batch.draw_calls(), 3);
        assert_eq!(
            sink.flushes,
            vec![(tex.id(), 8), (tex.id(), 8), (tex.id(), 5)]
        );
    }

    #[test]
    fn exact_capacity_multiple_has_no_empty_flush() {
        let mut batch = SpriteBatch::with_capacity(8);
        let mut sink = RecordingSink::default();
        let tex = handle(32);

        batch.begin(Mat4::IDENTITY);
        draw_n(&mut batch, &mut sink, tex, 16);
        batch.end(&mut sink);

        assert_eq!(sink.flushes, vec![(tex.id(), 8), (tex.id(), 8)]);
    }

    #[test]
    fn empty_session_issues_no_draw_call() {
        let mut batch = SpriteBatch::new();
        let mut sink = RecordingSink::default();

        batch.begin(Mat4::IDENTITY);
        batch.end(&mut sink);

        assert!(sink.flushes.is_empty());
        assert_eq!(batch.draw_calls(), 0);
    }

    #[test]
    fn first_draw_after_begin_never_flushes() {
        let mut batch = SpriteBatch::new();
        let mut sink = RecordingSink::default();
        let (a, b) = (handle(32), handle(32));

        // One session per texture; the marker resets in between, so the
        // first draw of the second session must not trigger a flush.
        batch.begin(Mat4::IDENTITY);
        draw_n(&mut batch, &mut sink, a, 1);
        batch.end(&mut sink);

        batch.begin(Mat4::IDENTITY);
        draw_n(&mut batch, &mut sink, b, 1);
        assert_eq!(batch.draw_calls(), 1, "no flush before the session's first end");
        batch.end(&mut sink);

        assert_eq!(batch.draw_calls(), 2);
    }

    #[test]
    fn reset_draw_calls_clears_the_counter() {
        let mut batch = SpriteBatch::new();
        let mut sink = RecordingSink::default();

        batch.begin(Mat4::IDENTITY);
        draw_n(&mut batch, &mut sink, handle(32), 3);
        batch.end(&mut sink);
        assert_eq!(batch.draw_calls(), 1);

        batch.reset_draw_calls();
        assert_eq!(batch.draw_calls(), 0);
    }

    // ── protocol violations ───────────────────────────────────────────────

    #[test]
    #[should_panic(expected = "begin called twice")]
    fn nested_begin_panics() {
        let mut batch = SpriteBatch::new();
        batch.begin(Mat4::IDENTITY);
        batch.begin(Mat4::IDENTITY);
    }

    #[test]
    #[should_panic(expected = "end called without a matching begin")]
    fn end_without_begin_panics() {
        let mut batch = SpriteBatch::new();
        let mut sink = RecordingSink::default();
        batch.end(&mut sink);
    }

    #[test]
    #[should_panic(expected = "draw called outside")]
    fn draw_without_begin_panics() {
        let mut batch = SpriteBatch::new();
        let mut sink = RecordingSink::default();
        draw_n(&mut batch, &mut sink, handle(32), 1);
    }

    // ── quad geometry ─────────────────────────────────────────────────────

    fn corner_average(corners: [[f32; 2]; 4]) -> (f32, f32) {
        let sum = corners
            .iter()
            .fold((0.0, 0.0), |acc, c| (acc.0 + c[0], acc.1 + c[1]));
        (sum.0 / 4.0, sum.1 / 4.0)
    }

    #[test]
    fn centered_origin_puts_center_on_position() {
        let size = Vec2::new(40.0, 24.0);
        let corners = quad_corners(Vec2::new(100.0, 200.0), size, size * 0.5, 0.0);

        let (cx, cy) = corner_average(corners);
        assert!((cx - 100.0).abs() < 1e-4);
        assert!((cy - 200.0).abs() < 1e-4);
    }

    #[test]
    fn rotation_preserves_the_center() {
        let size = Vec2::new(40.0, 24.0);
        for rotation in [0.3, std::f32::consts::FRAC_PI_2, 2.5] {
            let corners = quad_corners(Vec2::new(-5.0, 17.0), size, size * 0.5, rotation);
            let (cx, cy) = corner_average(corners);
            assert!((cx + 5.0).abs() < 1e-3, "center x drifted at {rotation}");
            assert!((cy - 17.0).abs() < 1e-3, "center y drifted at {rotation}");
        }
    }

    #[test]
    fn zero_origin_places_top_left_on_position() {
        let corners = quad_corners(Vec2::new(7.0, 9.0), Vec2::new(10.0, 20.0), Vec2::ZERO, 0.0);
        assert_eq!(corners[0], [7.0, 9.0]);
        assert_eq!(corners[2], [17.0, 29.0]);
    }

    #[test]
    fn quarter_turn_maps_width_onto_y() {
        // Rotating the quad 90 degrees about its top-left corner swings the
        // +X edge onto +Y (screen-space clockwise with +Y down).
        let corners = quad_corners(
            Vec2::ZERO,
            Vec2::new(10.0, 10.0),
            Vec2::ZERO,
            std::f32::consts::FRAC_PI_2,
        );
        assert!((corners[1][0]).abs() < 1e-4);
        assert!((corners[1][1] - 10.0).abs() < 1e-4);
    }

    // ── texture coordinates ───────────────────────────────────────────────

    #[test]
    fn whole_texture_uses_unit_uvs() {
        assert_eq!(quad_uvs(None, handle(128)), QUAD_CORNERS);
    }

    #[test]
    fn source_rect_normalizes_against_texture_size() {
        let tex = TextureHandle::new(TextureId::next(), 64, 32);
        let uvs = quad_uvs(Some(Rect::new(16.0, 8.0, 16.0, 8.0)), tex);

        assert_eq!(uvs[0], [0.25, 0.25]);
        assert_eq!(uvs[1], [0.5, 0.25]);
        assert_eq!(uvs[2], [0.5, 0.5]);
        assert_eq!(uvs[3], [0.25, 0.5]);
    }

    // ── vertex/index layout ───────────────────────────────────────────────

    #[test]
    fn index_pattern_fans_two_triangles_per_quad() {
        assert_eq!(quad_indices(2), vec![0, 1, 2, 2, 3, 0, 4, 5, 6, 6, 7, 4]);
    }

    #[test]
    fn tint_is_written_to_all_four_corners() {
        struct Capture(Vec<SpriteVertex>);
        impl QuadSink for Capture {
            fn flush(&mut self, flush: &QuadFlush<'_>) {
                self.0.extend_from_slice(flush.vertices);
            }
        }

        let mut batch = SpriteBatch::new();
        let mut sink = Capture(Vec::new());
        let tint = ColorRgba::new(1.0, 0.5, 0.25, 0.8);

        batch.begin(Mat4::IDENTITY);
        batch.draw(
            &mut sink,
            handle(16),
            Vec2::ZERO,
            Vec2::splat(16.0),
            tint,
            Vec2::ZERO,
            0.0,
        );
        batch.end(&mut sink);

        assert_eq!(sink.0.len(), VERTICES_PER_SPRITE);
        assert!(sink.0.iter().all(|v| v.color == tint.to_array()));
    }
}
