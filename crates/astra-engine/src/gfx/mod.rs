//! GPU rendering subsystem.
//!
//! Convention:
//! - sprite geometry is computed in world pixels on the CPU (top-left origin,
//!   +Y down) and mapped to clip space by the camera's view-projection matrix
//! - submission is immediate: every batch flush records one render pass with
//!   one indexed draw and submits it on the spot
//! - vertex/index buffers are allocated once at sprite capacity and only
//!   their contents are rewritten per flush

pub mod batch;

mod camera;
mod ctx;
mod device;
mod sprites;
mod texture;

pub use camera::Camera2D;
pub use ctx::{RenderCtx, RenderTarget};
pub use device::{Gpu, SurfaceErrorAction, SurfaceFrame};
pub use sprites::SpriteRenderer;
pub use texture::{Texture2D, TextureError, TextureHandle, TextureId, Textures};

#[cfg(test)]
pub(crate) use texture::test_handle;
