//! Hand-baked 5x7 debug font for the stats overlay.
//!
//! Covers just the characters the overlay prints. Each glyph is seven row
//! bitmasks; the atlas is baked at startup as white-on-transparent pixels so
//! tint colors apply directly.

use std::collections::HashMap;

use astra_engine::coords::{Rect, Vec2};
use astra_engine::gfx::{Texture2D, TextureError};
use astra_engine::text::{BitmapFont, Glyph};
use astra_engine::wgpu;

const GLYPH_W: u32 = 5;
const GLYPH_H: u32 = 7;
/// One blank column/row of padding around each cell.
const CELL_W: u32 = GLYPH_W + 1;
const CELL_H: u32 = GLYPH_H + 1;

#[rustfmt::skip]
const GLYPHS: &[(char, [u8; 7])] = &[
    (' ', [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00000]),
    ('0', [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110]),
    ('1', [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110]),
    ('2', [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111]),
    ('3', [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110]),
    ('4', [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010]),
    ('5', [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110]),
    ('6', [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110]),
    ('7', [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000]),
    ('8', [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110]),
    ('9', [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100]),
    ('C', [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110]),
    ('D', [0b11110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11110]),
    ('E', [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111]),
    ('F', [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000]),
    ('N', [0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001, 0b10001]),
    ('P', [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000]),
    ('S', [0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110]),
    ('T', [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100]),
];

/// Bakes the glyph atlas and builds the matching [`BitmapFont`].
pub fn build(device: &wgpu::Device, queue: &wgpu::Queue) -> Result<(Texture2D, BitmapFont), TextureError> {
    let width = CELL_W * GLYPHS.len() as u32;
    let height = CELL_H;

    let mut pixels = vec![0u8; (width * height * 4) as usize];
    for (slot, (_, rows)) in GLYPHS.iter().enumerate() {
        for (y, row) in rows.iter().enumerate() {
            for x in 0..GLYPH_W {
                if row & (1 << (GLYPH_W - 1 - x)) == 0 {
                    continue;
                }
                let px = slot as u32 * CELL_W + x;
                let at = ((y as u32 * width + px) * 4) as usize;
                pixels[at..at + 4].copy_from_slice(&[0xff, 0xff, 0xff, 0xff]);
            }
        }
    }

    let texture = Texture2D::from_rgba8(device, queue, "debug font atlas", &pixels, width, height)?;

    let mut glyphs = HashMap::new();
    for (slot, (c, _)) in GLYPHS.iter().enumerate() {
        glyphs.insert(
            *c,
            Glyph {
                source: Rect::new(
                    (slot as u32 * CELL_W) as f32,
                    0.0,
                    GLYPH_W as f32,
                    GLYPH_H as f32,
                ),
                offset: Vec2::ZERO,
                x_advance: CELL_W as f32,
            },
        );
    }

    let font = BitmapFont::from_parts(texture.handle(), glyphs, CELL_H as f32);
    Ok((texture, font))
}
