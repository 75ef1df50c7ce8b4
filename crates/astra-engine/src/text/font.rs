use std::collections::HashMap;
use std::fmt;

use crate::coords::{Rect, Vec2};
use crate::gfx::TextureHandle;

/// One character's cell in a font atlas.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Glyph {
    /// Texel rectangle inside the atlas.
    pub source: Rect,
    /// Pen-relative render offset in pixels.
    pub offset: Vec2,
    /// Horizontal pen advance to the next glyph.
    pub x_advance: f32,
}

/// Errors from parsing a bitmap-font description.
#[derive(Debug, Clone, PartialEq)]
pub enum FontError {
    MissingField { line: usize, key: &'static str },
    InvalidNumber { line: usize, key: &'static str },
    InvalidChar { line: usize, id: u32 },
    /// The description declared no glyphs at all.
    NoGlyphs,
}

impl fmt::Display for FontError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FontError::MissingField { line, key } => {
                write!(f, "line {line}: missing field {key:?}")
            }
            FontError::InvalidNumber { line, key } => {
                write!(f, "line {line}: field {key:?} is not a number")
            }
            FontError::InvalidChar { line, id } => {
                write!(f, "line {line}: id {id} is not a valid character")
            }
            FontError::NoGlyphs => write!(f, "font description contains no glyphs"),
        }
    }
}

impl std::error::Error for FontError {}

/// A bitmap font: glyph table over one atlas texture.
///
/// The atlas is referenced by handle like every other texture; the font
/// itself owns no GPU state.
#[derive(Debug, Clone, PartialEq)]
pub struct BitmapFont {
    atlas: TextureHandle,
    glyphs: HashMap<char, Glyph>,
    line_height: f32,
}

impl BitmapFont {
    /// Builds a font from an already-assembled glyph table.
    pub fn from_parts(
        atlas: TextureHandle,
        glyphs: HashMap<char, Glyph>,
        line_height: f32,
    ) -> Self {
        Self {
            atlas,
            glyphs,
            line_height,
        }
    }

    /// Parses the line-oriented BMFont text format:
    ///
    /// ```text
    /// common lineHeight=32 ...
    /// char id=65 x=2 y=2 width=20 height=24 xoffset=0 yoffset=4 xadvance=21 ...
    /// ```
    ///
    /// Unknown lines and extra fields are ignored. A missing `common` line
    /// falls back to the tallest glyph extent as the line height.
    pub fn parse(description: &str, atlas: TextureHandle) -> Result<Self, FontError> {
        let mut glyphs = HashMap::new();
        let mut line_height = None;

        for (index, raw) in description.lines().enumerate() {
            let line_no = index + 1;
            let line = raw.trim();

            if let Some(rest) = line.strip_prefix("char ") {
                let id = field_u32(rest, "id", line_no)?;
                let c = char::from_u32(id).ok_or(FontError::InvalidChar { line: line_no, id })?;

                glyphs.insert(
                    c,
                    Glyph {
                        source: Rect::new(
                            field_f32(rest, "x", line_no)?,
                            field_f32(rest, "y", line_no)?,
                            field_f32(rest, "width", line_no)?,
                            field_f32(rest, "height", line_no)?,
                        ),
                        offset: Vec2::new(
                            field_f32(rest, "xoffset", line_no)?,
                            field_f32(rest, "yoffset", line_no)?,
                        ),
                        x_advance: field_f32(rest, "xadvance", line_no)?,
                    },
                );
            } else if let Some(rest) = line.strip_prefix("common ") {
                line_height = Some(field_f32(rest, "lineHeight", line_no)?);
            }
        }

        if glyphs.is_empty() {
            return Err(FontError::NoGlyphs);
        }

        let line_height = line_height.unwrap_or_else(|| {
            glyphs
                .values()
                .map(|g| g.source.h + g.offset.y)
                .fold(0.0, f32::max)
        });

        Ok(Self {
            atlas,
            glyphs,
            line_height,
        })
    }

    #[inline]
    pub fn atlas(&self) -> TextureHandle {
        self.atlas
    }

    #[inline]
    pub fn line_height(&self) -> f32 {
        self.line_height
    }

    #[inline]
    pub fn glyph(&self, c: char) -> Option<&Glyph> {
        self.glyphs.get(&c)
    }

    /// Measures a single line: total advance width × tallest glyph extent
    /// (at least the line height). Unmapped characters contribute nothing.
    pub fn measure(&self, text: &str) -> Vec2 {
        let mut width = 0.0;
        let mut height = self.line_height;

        for c in text.chars() {
            if let Some(glyph) = self.glyphs.get(&c) {
                width += glyph.x_advance;
                height = height.max(glyph.source.h + glyph.offset.y);
            }
        }

        Vec2::new(width, height)
    }
}

fn field<'a>(rest: &'a str, key: &'static str, line: usize) -> Result<&'a str, FontError> {
    rest.split_whitespace()
        .find_map(|part| part.strip_prefix(key)?.strip_prefix('='))
        .ok_or(FontError::MissingField { line, key })
}

fn field_f32(rest: &str, key: &'static str, line: usize) -> Result<f32, FontError> {
    field(rest, key, line)?
        .parse()
        .map_err(|_| FontError::InvalidNumber { line, key })
}

fn field_u32(rest: &str, key: &'static str, line: usize) -> Result<u32, FontError> {
    field(rest, key, line)?
        .parse()
        .map_err(|_| FontError::InvalidNumber { line, key })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::test_handle;

    const SAMPLE: &str = "\
info face=\"demo\" size=32
common lineHeight=36 base=29 scaleW=256 scaleH=256
char id=65   x=2    y=2    width=20   height=24   xoffset=0    yoffset=4    xadvance=21  page=0
char id=66   x=24   y=2    width=18   height=24   xoffset=1    yoffset=4    xadvance=20  page=0
char id=32   x=0    y=0    width=0    height=0    xoffset=0    yoffset=0    xadvance=10  page=0
";

    #[test]
    fn parses_glyphs_and_line_height() {
        let font = BitmapFont::parse(SAMPLE, test_handle(256, 256)).expect("parses");

        assert_eq!(font.line_height(), 36.0);

        let a = font.glyph('A').expect("has A");
        assert_eq!(a.source, Rect::new(2.0, 2.0, 20.0, 24.0));
        assert_eq!(a.offset, Vec2::new(0.0, 4.0));
        assert_eq!(a.x_advance, 21.0);

        assert!(font.glyph(' ').is_some());
        assert!(font.glyph('Z').is_none());
    }

    #[test]
    fn measure_sums_advances() {
        let font = BitmapFont::parse(SAMPLE, test_handle(256, 256)).expect("parses");

        let size = font.measure("AB A");
        assert_eq!(size.x, 21.0 + 20.0 + 10.0 + 21.0);
        assert_eq!(size.y, 36.0);
    }

    #[test]
    fn measure_skips_unmapped_characters() {
        let font = BitmapFont::parse(SAMPLE, test_handle(256, 256)).expect("parses");
        assert_eq!(font.measure("??"), Vec2::new(0.0, 36.0));
    }

    #[test]
    fn missing_field_is_an_error() {
        let broken = "char id=65 x=2 y=2 width=20 height=24 xoffset=0 yoffset=4\n";
        assert_eq!(
            BitmapFont::parse(broken, test_handle(64, 64)),
            Err(FontError::MissingField { line: 1, key: "xadvance" })
        );
    }

    #[test]
    fn malformed_number_is_an_error() {
        let broken = "char id=65 x=oops y=2 width=20 height=24 xoffset=0 yoffset=4 xadvance=21\n";
        assert_eq!(
            BitmapFont::parse(broken, test_handle(64, 64)),
            Err(FontError::InvalidNumber { line: 1, key: "x" })
        );
    }

    #[test]
    fn empty_description_is_an_error() {
        assert_eq!(
            BitmapFont::parse("info face=\"x\"\n", test_handle(64, 64)),
            Err(FontError::NoGlyphs)
        );
    }

    #[test]
    fn missing_common_falls_back_to_glyph_extent() {
        let desc = "char id=65 x=0 y=0 width=10 height=12 xoffset=0 yoffset=3 xadvance=11\n";
        let font = BitmapFont::parse(desc, test_handle(64, 64)).expect("parses");
        assert_eq!(font.line_height(), 15.0);
    }
}
