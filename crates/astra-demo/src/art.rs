//! Procedurally generated RGBA8 pixel buffers.
//!
//! The engine consumes decoded pixel data through `Texture2D::from_rgba8`;
//! generating the pixels in code keeps the demo free of asset files.

/// Checkerboard tile, `size` x `size`, alternating every `cell` pixels.
pub fn checker(size: u32, cell: u32, a: [u8; 4], b: [u8; 4]) -> Vec<u8> {
    let mut pixels = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            let even = ((x / cell) + (y / cell)) % 2 == 0;
            pixels.extend_from_slice(if even { &a } else { &b });
        }
    }
    pixels
}

/// Filled disc with a softly faded rim on a transparent background.
pub fn disc(size: u32, color: [u8; 4]) -> Vec<u8> {
    let mut pixels = Vec::with_capacity((size * size * 4) as usize);
    let center = (size as f32 - 1.0) * 0.5;
    let radius = size as f32 * 0.5 - 1.0;

    for y in 0..size {
        for x in 0..size {
            let dx = x as f32 - center;
            let dy = y as f32 - center;
            let d = (dx * dx + dy * dy).sqrt();

            // 1px soft edge.
            let coverage = (radius - d + 1.0).clamp(0.0, 1.0);
            let alpha = (color[3] as f32 * coverage) as u8;
            pixels.extend_from_slice(&[color[0], color[1], color[2], alpha]);
        }
    }
    pixels
}

/// Horizontal sprite-sheet strip of an expanding ring, `frames` cells of
/// `cell` x `cell` pixels.
pub fn ring_sheet(cell: u32, frames: u32, color: [u8; 4]) -> Vec<u8> {
    let width = cell * frames;
    let mut pixels = vec![0u8; (width * cell * 4) as usize];
    let center = (cell as f32 - 1.0) * 0.5;

    for frame in 0..frames {
        let t = (frame as f32 + 1.0) / frames as f32;
        let radius = t * (cell as f32 * 0.5 - 1.5);
        let fade = 1.0 - t * 0.7;

        for y in 0..cell {
            for x in 0..cell {
                let dx = x as f32 - center;
                let dy = y as f32 - center;
                let d = (dx * dx + dy * dy).sqrt();

                let coverage = (1.5 - (d - radius).abs()).clamp(0.0, 1.0);
                let alpha = (color[3] as f32 * coverage * fade) as u8;
                if alpha == 0 {
                    continue;
                }

                let px = frame * cell + x;
                let at = ((y * width + px) * 4) as usize;
                pixels[at..at + 4].copy_from_slice(&[color[0], color[1], color[2], alpha]);
            }
        }
    }
    pixels
}
