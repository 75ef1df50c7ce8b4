use crate::gfx::{Camera2D, RenderCtx, RenderTarget, SpriteRenderer, TextureError, Textures};

use super::animation::AnimationSystem;
use super::sprite_pass::SpriteBatchSystem;
use super::store::Scene;

/// The closed set of scene systems.
///
/// Each variant is update-capable, render-capable, or both; dispatch is a
/// `match`, decided when the list is assembled, never by inspecting types at
/// runtime.
pub enum SceneSystem {
    /// Update-capable: advances clips, writes source rects.
    Animation(AnimationSystem),
    /// Render-capable: groups by texture and drives the batcher.
    SpriteBatch(SpriteBatchSystem),
}

/// Ordered system list built at scene-setup time.
///
/// `update` runs before `render` each frame; within a phase, systems run in
/// registration order.
#[derive(Default)]
pub struct SceneSystems {
    systems: Vec<SceneSystem>,
}

impl SceneSystems {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, system: SceneSystem) -> Self {
        self.systems.push(system);
        self
    }

    pub fn push(&mut self, system: SceneSystem) {
        self.systems.push(system);
    }

    /// Runs the update phase (leaf mutations, e.g. animation ticks).
    pub fn update(&mut self, scene: &mut Scene, dt: f32) {
        for system in &mut self.systems {
            if let SceneSystem::Animation(animation) = system {
                animation.run(scene, dt);
            }
        }
    }

    /// Runs the render phase.
    pub fn render(
        &mut self,
        scene: &Scene,
        camera: &Camera2D,
        textures: &Textures,
        sprites: &mut SpriteRenderer,
        ctx: &RenderCtx<'_>,
        target: &RenderTarget<'_>,
    ) -> Result<(), TextureError> {
        for system in &mut self.systems {
            if let SceneSystem::SpriteBatch(pass) = system {
                pass.run(scene, camera, textures, sprites, ctx, target)?;
            }
        }
        Ok(())
    }
}
