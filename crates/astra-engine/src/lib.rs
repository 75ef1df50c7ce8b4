//! Astra engine crate.
//!
//! A 2D sprite engine built around one idea: accumulate as many quads as
//! possible per GPU draw call. The `gfx` layer owns the wgpu device and the
//! sprite batcher, `scene` owns entities and the per-frame systems that feed
//! the batcher, and `text` renders bitmap-font glyphs through the same
//! batching contract as every other sprite.

pub use wgpu;

pub mod coords;
pub mod gfx;
pub mod logging;
pub mod scene;
pub mod text;
pub mod time;
pub mod window;
