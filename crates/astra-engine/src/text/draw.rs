use crate::coords::{ColorRgba, Rect, Vec2};
use crate::gfx::{RenderCtx, RenderTarget, SpriteRenderer, Texture2D};

use super::font::BitmapFont;

/// One positioned glyph, ready to draw as a quad.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GlyphQuad {
    pub source: Rect,
    pub position: Vec2,
    pub size: Vec2,
}

/// Lays out a single line of text starting at `position`.
///
/// Characters without a glyph are skipped without advancing the pen, the
/// same policy the renderer applies.
pub fn layout<'f>(
    font: &'f BitmapFont,
    text: &'f str,
    position: Vec2,
    scale: f32,
) -> impl Iterator<Item = GlyphQuad> + 'f {
    let mut pen_x = position.x;

    text.chars().filter_map(move |c| {
        let glyph = font.glyph(c)?;

        let quad = GlyphQuad {
            source: glyph.source,
            position: Vec2::new(pen_x + glyph.offset.x * scale, position.y + glyph.offset.y * scale),
            size: glyph.source.size() * scale,
        };
        pen_x += glyph.x_advance * scale;
        Some(quad)
    })
}

/// Draws one line of text through the open batch session.
///
/// `atlas` must be the registered texture behind `font.atlas()`; every glyph
/// shares it, so a text run costs one flush unless it interleaves with other
/// textures. Requires an open session on `sprites` (the batch panics
/// otherwise, like any draw outside begin/end).
#[allow(clippy::too_many_arguments)]
pub fn draw_text(
    sprites: &mut SpriteRenderer,
    ctx: &RenderCtx<'_>,
    target: &RenderTarget<'_>,
    font: &BitmapFont,
    atlas: &Texture2D,
    text: &str,
    position: Vec2,
    color: ColorRgba,
    scale: f32,
) {
    debug_assert_eq!(
        atlas.handle().id(),
        font.atlas().id(),
        "draw_text called with a texture that is not the font's atlas"
    );

    for quad in layout(font, text, position, scale) {
        sprites.draw_region(
            ctx,
            target,
            atlas,
            quad.position,
            quad.size,
            quad.source,
            color,
            Vec2::ZERO,
            0.0,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Rect;
    use crate::gfx::test_handle;
    use crate::text::Glyph;
    use std::collections::HashMap;

    fn test_font() -> BitmapFont {
        let mut glyphs = HashMap::new();
        glyphs.insert(
            'a',
            Glyph {
                source: Rect::new(0.0, 0.0, 8.0, 10.0),
                offset: Vec2::new(1.0, 2.0),
                x_advance: 9.0,
            },
        );
        glyphs.insert(
            'b',
            Glyph {
                source: Rect::new(8.0, 0.0, 8.0, 10.0),
                offset: Vec2::new(0.0, 0.0),
                x_advance: 10.0,
            },
        );
        BitmapFont::from_parts(test_handle(32, 16), glyphs, 12.0)
    }

    #[test]
    fn pen_advances_per_glyph() {
        let font = test_font();
        let quads: Vec<GlyphQuad> = layout(&font, "ab", Vec2::new(100.0, 50.0), 1.0).collect();

        assert_eq!(quads.len(), 2);
        assert_eq!(quads[0].position, Vec2::new(101.0, 52.0)); // pen + offset
        assert_eq!(quads[1].position, Vec2::new(109.0, 50.0)); // advanced by 'a'
        assert_eq!(quads[1].source, Rect::new(8.0, 0.0, 8.0, 10.0));
    }

    #[test]
    fn scale_multiplies_offsets_advances_and_sizes() {
        let font = test_font();
        let quads: Vec<GlyphQuad> = layout(&font, "ab", Vec2::ZERO, 2.0).collect();

        assert_eq!(quads[0].position, Vec2::new(2.0, 4.0));
        assert_eq!(quads[0].size, Vec2::new(16.0, 20.0));
        assert_eq!(quads[1].position, Vec2::new(18.0, 0.0));
    }

    #[test]
    fn unmapped_characters_are_skipped_without_advancing() {
        let font = test_font();
        let quads: Vec<GlyphQuad> = layout(&font, "a?b", Vec2::ZERO, 1.0).collect();

        assert_eq!(quads.len(), 2);
        assert_eq!(quads[1].position.x, 9.0);
    }
}
