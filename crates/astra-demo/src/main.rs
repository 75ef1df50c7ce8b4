//! Astra demo: a few hundred sprites on a handful of textures, animated
//! spark rings, a drifting camera and a stats overlay. Enough to watch the
//! batcher hold the draw-call count at one per texture.

mod art;
mod debug_font;

use anyhow::{Context, Result};

use astra_engine::coords::{ColorRgba, Rect, Vec2};
use astra_engine::gfx::{Camera2D, SpriteRenderer, TextureError, Textures};
use astra_engine::logging::{LogConfig, init_logging};
use astra_engine::scene::{
    AnimationSystem, Entity, Scene, SceneSystem, SceneSystems, Sprite, SpriteAnimation,
    SpriteBatchSystem, Transform,
};
use astra_engine::text::{BitmapFont, draw_text};
use astra_engine::time::FpsCounter;
use astra_engine::window::{App, AppControl, FrameCtx, InitCtx, RunConfig, Runtime};

const CLEAR: ColorRgba = ColorRgba::new(0.06, 0.07, 0.1, 1.0);
const SPARK_CELL: f32 = 24.0;
const SPARK_FRAMES: usize = 6;

struct DemoApp {
    scene: Scene,
    systems: SceneSystems,
    textures: Textures,
    sprites: SpriteRenderer,
    camera: Camera2D,
    overlay_camera: Camera2D,
    font: Option<BitmapFont>,
    fps: FpsCounter,
    elapsed: f32,
}

impl DemoApp {
    fn new() -> Self {
        Self {
            scene: Scene::new(),
            systems: SceneSystems::new()
                .with(SceneSystem::Animation(AnimationSystem))
                .with(SceneSystem::SpriteBatch(SpriteBatchSystem)),
            textures: Textures::new(),
            sprites: SpriteRenderer::new(),
            camera: Camera2D::new(1280.0, 720.0),
            overlay_camera: Camera2D::new(1280.0, 720.0),
            font: None,
            fps: FpsCounter::new(),
            elapsed: 0.0,
        }
    }

    fn populate(&mut self) -> Result<()> {
        let tiles = self.textures.handle("tiles")?;
        let orbs = self.textures.handle("orbs")?;
        let sparks = self.textures.handle("sparks")?;

        // A tile floor, inserted first so everything else draws above it.
        for row in 0..8 {
            for col in 0..14 {
                self.scene.add(
                    Entity::new()
                        .with(Transform::at(Vec2::new(col as f32 * 96.0, row as f32 * 96.0)))
                        .with(Sprite::new(tiles).with_size(Vec2::splat(96.0))),
                );
            }
        }

        // Tinted orbs, rotated and scaled at random around their centers.
        fastrand::seed(7);
        for _ in 0..80 {
            let mut sprite = Sprite::new(orbs).with_color(ColorRgba::new(
                0.4 + fastrand::f32() * 0.6,
                0.4 + fastrand::f32() * 0.6,
                0.4 + fastrand::f32() * 0.6,
                0.9,
            ));
            sprite.origin_to_center();

            self.scene.add(
                Entity::new()
                    .with(Transform {
                        position: Vec2::new(fastrand::f32() * 1344.0, fastrand::f32() * 768.0),
                        rotation: fastrand::f32() * std::f32::consts::TAU,
                        scale: Vec2::splat(0.5 + fastrand::f32() * 1.5),
                    })
                    .with(sprite),
            );
        }

        // Looping spark rings, each starting on a different frame phase.
        for i in 0..12 {
            let mut clip = SpriteAnimation::from_strip(
                Rect::new(0.0, 0.0, SPARK_CELL, SPARK_CELL),
                SPARK_FRAMES,
                0.09,
                true,
            );
            clip.advance(0.09 * (i % SPARK_FRAMES) as f32);

            let mut sprite = Sprite::new(sparks).with_size(Vec2::splat(48.0));
            sprite.origin_to_center();

            self.scene.add(
                Entity::new()
                    .with(Transform::at(Vec2::new(
                        100.0 + (i as f32) * 100.0,
                        360.0 + ((i as f32) * 0.8).sin() * 180.0,
                    )))
                    .with(sprite)
                    .with(clip),
            );
        }

        Ok(())
    }
}

impl App for DemoApp {
    fn init(&mut self, ctx: &mut InitCtx<'_>) -> Result<()> {
        use astra_engine::gfx::Texture2D;

        let tiles = Texture2D::from_rgba8(
            ctx.device,
            ctx.queue,
            "tiles",
            &art::checker(64, 8, [0x2a, 0x2f, 0x3a, 0xff], [0x38, 0x40, 0x52, 0xff]),
            64,
            64,
        )
        .context("building tile texture")?;
        self.textures.insert("tiles", tiles);

        let orbs = Texture2D::from_rgba8(
            ctx.device,
            ctx.queue,
            "orbs",
            &art::disc(32, [0xe8, 0xd9, 0xc0, 0xff]),
            32,
            32,
        )
        .context("building orb texture")?;
        self.textures.insert("orbs", orbs);

        let cell = SPARK_CELL as u32;
        let sparks = Texture2D::from_rgba8(
            ctx.device,
            ctx.queue,
            "sparks",
            &art::ring_sheet(cell, SPARK_FRAMES as u32, [0xff, 0xb8, 0x4d, 0xff]),
            cell * SPARK_FRAMES as u32,
            cell,
        )
        .context("building spark sheet")?;
        self.textures.insert("sparks", sparks);

        let (atlas, font) =
            debug_font::build(ctx.device, ctx.queue).context("baking debug font")?;
        self.textures.insert("debug-font", atlas);
        self.font = Some(font);

        self.camera.resize(ctx.viewport.width, ctx.viewport.height);
        self.overlay_camera.resize(ctx.viewport.width, ctx.viewport.height);

        self.populate()?;
        log::info!(
            "scene ready: {} entities over {} textures",
            self.scene.len(),
            self.textures.len()
        );
        Ok(())
    }

    fn resized(&mut self, width: f32, height: f32) {
        self.camera.resize(width, height);
        self.overlay_camera.resize(width, height);
    }

    fn frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let dt = ctx.time.dt;
        self.elapsed += dt;

        let last_frame_draw_calls = self.sprites.draw_calls();
        self.sprites.reset_draw_calls();
        self.systems.update(&mut self.scene, dt);

        // Slow figure-eight drift over the scene.
        self.camera.position = Vec2::new(
            160.0 + (self.elapsed * 0.4).sin() * 140.0,
            60.0 + (self.elapsed * 0.27).cos() * 90.0,
        );

        if let Some(fps) = self.fps.tick(dt) {
            log::debug!("fps {fps:.1}, {last_frame_draw_calls} draw calls last frame");
        }
        let fps_now = self.fps.fps();

        let Self {
            scene,
            systems,
            textures,
            sprites,
            camera,
            overlay_camera,
            font,
            ..
        } = self;

        let mut failure: Option<TextureError> = None;
        let control = ctx.render(CLEAR, |rctx, target| {
            if let Err(e) = systems.render(scene, camera, textures, sprites, rctx, target) {
                failure = Some(e);
                return;
            }

            // Scene cost before the overlay adds its own flush.
            let scene_draw_calls = sprites.draw_calls();

            let Some(font) = font.as_ref() else { return };
            let atlas = match textures.get(font.atlas()) {
                Ok(atlas) => atlas,
                Err(e) => {
                    failure = Some(e);
                    return;
                }
            };

            let line = format!(
                "FPS {:>3.0}  DC {:>2}  ENT {}",
                fps_now,
                scene_draw_calls,
                scene.len()
            );
            sprites.begin(overlay_camera.matrix());
            draw_text(
                sprites,
                rctx,
                target,
                font,
                atlas,
                &line,
                Vec2::new(12.0, 12.0),
                ColorRgba::new(1.0, 1.0, 1.0, 0.9),
                2.0,
            );
            sprites.end(rctx, target);
        });

        if let Some(e) = failure {
            log::error!("frame aborted: {e}");
            return AppControl::Exit;
        }
        control
    }
}

fn main() -> Result<()> {
    init_logging(LogConfig::default());

    Runtime::run(
        RunConfig {
            title: "astra demo".to_string(),
            ..RunConfig::default()
        },
        DemoApp::new(),
    )
}
