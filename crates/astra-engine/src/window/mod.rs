//! Window + runtime loop.
//!
//! Owns the `winit` event loop and one window, wires them to the GPU layer,
//! and drives the application's per-frame callback. Input devices are not
//! polled here; only resize/close/redraw reach the application.

mod runtime;

pub use runtime::{App, AppControl, FrameCtx, InitCtx, RunConfig, Runtime};
