use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::coords::{ColorRgba, Viewport};
use crate::gfx::{Gpu, RenderCtx, RenderTarget, SurfaceErrorAction};
use crate::time::{FrameClock, FrameTime};

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    pub present_mode: wgpu::PresentMode,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            title: "astra".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
            present_mode: wgpu::PresentMode::Fifo,
        }
    }
}

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// One-time setup context, handed to [`App::init`] after the GPU is up.
pub struct InitCtx<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub viewport: Viewport,
}

/// Per-frame context for [`App::frame`].
pub struct FrameCtx<'a, 'w> {
    gpu: &'a mut Gpu<'w>,
    pub time: FrameTime,
    pub viewport: Viewport,
}

impl FrameCtx<'_, '_> {
    /// Clears the surface, calls `draw` with a ready [`RenderCtx`] and
    /// [`RenderTarget`], then presents.
    ///
    /// The clear pass is submitted before `draw` runs, so the eager
    /// per-flush submissions of the sprite renderer land on an already
    /// cleared attachment.
    pub fn render<F>(&mut self, clear: ColorRgba, draw: F) -> AppControl
    where
        F: FnOnce(&RenderCtx<'_>, &RenderTarget<'_>),
    {
        let frame = match self.gpu.begin_frame() {
            Ok(frame) => frame,
            Err(err) => {
                return match self.gpu.handle_surface_error(err) {
                    SurfaceErrorAction::Fatal => {
                        log::error!("surface error is fatal; exiting");
                        AppControl::Exit
                    }
                    SurfaceErrorAction::Reconfigured | SurfaceErrorAction::SkipFrame => {
                        AppControl::Continue
                    }
                };
            }
        };

        let mut encoder = self
            .gpu
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("astra clear encoder"),
            });
        {
            encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("astra clear pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: clear.r as f64,
                            g: clear.g as f64,
                            b: clear.b as f64,
                            a: clear.a as f64,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
        }
        self.gpu.queue().submit(std::iter::once(encoder.finish()));

        let ctx = RenderCtx::new(
            self.gpu.device(),
            self.gpu.queue(),
            self.gpu.surface_format(),
            self.viewport,
        );
        let target = RenderTarget::new(&frame.view);

        draw(&ctx, &target);

        self.gpu.present(frame);
        AppControl::Continue
    }
}

/// Application contract.
pub trait App {
    /// Called once after the window and GPU exist; create textures and
    /// scene content here.
    fn init(&mut self, ctx: &mut InitCtx<'_>) -> Result<()>;

    /// Called once per frame.
    fn frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;

    /// Called when the window's logical size changes.
    fn resized(&mut self, width: f32, height: f32) {
        let _ = (width, height);
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    pub fn run<A>(config: RunConfig, app: A) -> Result<()>
    where
        A: 'static + App,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = RuntimeState {
            config,
            app,
            window: None,
        };

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        Ok(())
    }
}

#[self_referencing]
struct WindowState {
    clock: FrameClock,
    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

fn logical_viewport(window: &Window) -> Viewport {
    let logical: LogicalSize<f64> = window.inner_size().to_logical(window.scale_factor());
    Viewport::new(logical.width as f32, logical.height as f32)
}

struct RuntimeState<A>
where
    A: App + 'static,
{
    config: RunConfig,
    app: A,
    window: Option<WindowState>,
}

impl<A> ApplicationHandler for RuntimeState<A>
where
    A: App + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = match event_loop.create_window(attrs) {
            Ok(window) => window,
            Err(e) => {
                log::error!("failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        let present_mode = self.config.present_mode;
        let state = WindowStateBuilder {
            clock: FrameClock::new(),
            window,
            gpu_builder: |w| {
                pollster::block_on(Gpu::new(w, present_mode)).expect("GPU initialization failed")
            },
        }
        .build();

        let viewport = logical_viewport(state.borrow_window());
        let init = state.with_gpu(|gpu| {
            self.app.init(&mut InitCtx {
                device: gpu.device(),
                queue: gpu.queue(),
                viewport,
            })
        });
        if let Err(e) = init {
            log::error!("application init failed: {e:#}");
            event_loop.exit();
            return;
        }

        event_loop.set_control_flow(ControlFlow::Poll);
        state.borrow_window().request_redraw();
        self.window = Some(state);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let app = &mut self.app;
        let Some(state) = self.window.as_mut() else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),

            WindowEvent::Resized(size) => {
                state.with_gpu_mut(|gpu| gpu.resize(size));
                let viewport = logical_viewport(state.borrow_window());
                app.resized(viewport.width, viewport.height);
            }

            WindowEvent::RedrawRequested => {
                let mut exit = false;
                state.with_mut(|fields| {
                    let time = fields.clock.tick();
                    let viewport = logical_viewport(fields.window);

                    let mut ctx = FrameCtx {
                        gpu: fields.gpu,
                        time,
                        viewport,
                    };
                    if app.frame(&mut ctx) == AppControl::Exit {
                        exit = true;
                    }
                });

                if exit {
                    event_loop.exit();
                } else {
                    state.borrow_window().request_redraw();
                }
            }

            _ => {}
        }
    }
}
