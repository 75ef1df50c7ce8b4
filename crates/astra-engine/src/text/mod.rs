//! Bitmap-font text rendering.
//!
//! A pure client of the sprite batcher: each glyph becomes one `draw_region`
//! call sampling the font's atlas texture, so a line of text costs a single
//! flush like any other same-texture sprite run.

mod draw;
mod font;

pub use draw::{GlyphQuad, draw_text, layout};
pub use font::{BitmapFont, FontError, Glyph};
