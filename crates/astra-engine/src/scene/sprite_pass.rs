use std::collections::HashMap;
use std::collections::hash_map::Entry;

use crate::gfx::{
    Camera2D, RenderCtx, RenderTarget, SpriteRenderer, TextureError, TextureHandle, TextureId,
    Textures,
};

use super::sprite::Sprite;
use super::store::Scene;
use super::transform::Transform;

/// All drawable entities sharing one texture identity in a frame.
pub struct SpriteGroup<'a> {
    pub texture: TextureHandle,
    pub members: Vec<(&'a Transform, &'a Sprite)>,
}

/// Partitions every `(Transform, Sprite)` entity by texture identity.
///
/// Groups appear in first-seen order; members keep the query's insertion
/// order, which is what pins relative z-order inside a group. Identity means
/// the texture object, never pixel content: two uploads of the same image
/// form two groups.
pub fn group_by_texture(scene: &Scene) -> Vec<SpriteGroup<'_>> {
    let mut groups: Vec<SpriteGroup<'_>> = Vec::new();
    let mut by_id: HashMap<TextureId, usize> = HashMap::new();

    for (_, entity) in scene.query::<Transform, Sprite>() {
        let (Some(transform), Some(sprite)) = (entity.get::<Transform>(), entity.get::<Sprite>())
        else {
            continue;
        };

        match by_id.entry(sprite.texture.id()) {
            Entry::Occupied(slot) => groups[*slot.get()].members.push((transform, sprite)),
            Entry::Vacant(slot) => {
                slot.insert(groups.len());
                groups.push(SpriteGroup {
                    texture: sprite.texture,
                    members: vec![(transform, sprite)],
                });
            }
        }
    }

    groups
}

/// The batching render pass: group by texture, then one batch session per
/// group, so each distinct texture costs exactly one flush per frame (plus
/// capacity overflows).
///
/// Sprites in different groups cannot interleave in z without breaking the
/// grouping; cross-texture layering is a known trade of this design.
#[derive(Debug, Default)]
pub struct SpriteBatchSystem;

impl SpriteBatchSystem {
    /// Renders every `(Transform, Sprite)` entity through `sprites`.
    ///
    /// Fails hard on a sprite whose texture handle is not registered; no
    /// fallback texture is substituted.
    pub fn run(
        &mut self,
        scene: &Scene,
        camera: &Camera2D,
        textures: &Textures,
        sprites: &mut SpriteRenderer,
        ctx: &RenderCtx<'_>,
        target: &RenderTarget<'_>,
    ) -> Result<(), TextureError> {
        let view_proj = camera.matrix();

        for group in group_by_texture(scene) {
            let texture = textures.get(group.texture)?;

            sprites.begin(view_proj);
            for (transform, sprite) in &group.members {
                let size = sprite.size * transform.scale;
                match sprite.source {
                    Some(source) => sprites.draw_region(
                        ctx,
                        target,
                        texture,
                        transform.position,
                        size,
                        source,
                        sprite.color,
                        sprite.origin,
                        transform.rotation,
                    ),
                    None => sprites.draw(
                        ctx,
                        target,
                        texture,
                        transform.position,
                        size,
                        sprite.color,
                        sprite.origin,
                        transform.rotation,
                    ),
                }
            }
            sprites.end(ctx, target);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::{ColorRgba, Vec2};
    use crate::gfx::batch::{QuadFlush, QuadSink, SpriteBatch};
    use crate::gfx::test_handle;
    use crate::scene::Entity;
    use glam::Mat4;

    #[derive(Default)]
    struct RecordingSink {
        flushes: Vec<(TextureId, usize)>,
    }

    impl QuadSink for RecordingSink {
        fn flush(&mut self, flush: &QuadFlush<'_>) {
            self.flushes.push((flush.texture, flush.quads));
        }
    }

    fn sprite_at(x: f32, texture: TextureHandle) -> Entity {
        Entity::new()
            .with(Transform::at(Vec2::new(x, 0.0)))
            .with(Sprite::new(texture))
    }

    #[test]
    fn interleaved_textures_form_two_groups() {
        let (a, b) = (test_handle(32, 32), test_handle(32, 32));

        let mut scene = Scene::new();
        scene.add(sprite_at(0.0, a));
        scene.add(sprite_at(10.0, b));
        scene.add(sprite_at(20.0, a));

        let groups = group_by_texture(&scene);
        assert_eq!(groups.len(), 2);

        // First-seen group order; members keep insertion order.
        assert_eq!(groups[0].texture.id(), a.id());
        assert_eq!(groups[0].members.len(), 2);
        assert_eq!(groups[0].members[0].0.position.x, 0.0);
        assert_eq!(groups[0].members[1].0.position.x, 20.0);

        assert_eq!(groups[1].texture.id(), b.id());
        assert_eq!(groups[1].members.len(), 1);
    }

    #[test]
    fn same_pixels_different_identity_stay_separate() {
        // Handles with equal dimensions but distinct ids: identity, not
        // content, keys the grouping.
        let (a, b) = (test_handle(16, 16), test_handle(16, 16));

        let mut scene = Scene::new();
        scene.add(sprite_at(0.0, a));
        scene.add(sprite_at(1.0, b));

        assert_eq!(group_by_texture(&scene).len(), 2);
    }

    #[test]
    fn entities_without_sprites_are_ignored() {
        let mut scene = Scene::new();
        scene.add(Entity::new().with(Transform::default()));
        scene.add(Entity::new().with(Sprite::new(test_handle(8, 8))));

        assert!(group_by_texture(&scene).is_empty());
    }

    #[test]
    fn grouped_rendering_flushes_once_per_texture() {
        let (a, b) = (test_handle(32, 32), test_handle(32, 32));

        let mut scene = Scene::new();
        scene.add(sprite_at(0.0, a));
        scene.add(sprite_at(10.0, b));
        scene.add(sprite_at(20.0, a));

        // Drive a batch exactly the way the pass does, one session per group.
        let mut batch = SpriteBatch::new();
        let mut sink = RecordingSink::default();
        for group in group_by_texture(&scene) {
            batch.begin(Mat4::IDENTITY);
            for (transform, sprite) in &group.members {
                batch.draw(
                    &mut sink,
                    sprite.texture,
                    transform.position,
                    sprite.size * transform.scale,
                    ColorRgba::WHITE,
                    sprite.origin,
                    transform.rotation,
                );
            }
            batch.end(&mut sink);
        }

        assert_eq!(batch.draw_calls(), 2);
        assert_eq!(sink.flushes, vec![(a.id(), 2), (b.id(), 1)]);
    }
}
