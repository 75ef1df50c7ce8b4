//! Geometric value types shared across the engine.
//!
//! Everything here is plain data in pixel units:
//! - world/screen positions are logical pixels, top-left origin, +Y down
//! - texture source rectangles ([`Rect`]) are texel rectangles inside an atlas
//!
//! Matrix algebra lives in `glam`; these types are the engine's public
//! vocabulary and convert into `glam` at the math boundary.

mod color;
mod rect;
mod vec2;
mod viewport;

pub use color::ColorRgba;
pub use rect::Rect;
pub use vec2::Vec2;
pub use viewport::Viewport;
