use crate::coords::Rect;

use super::sprite::Sprite;
use super::store::Scene;

/// Frame animation component: an ordered list of source rectangles plus
/// playback state.
///
/// `advance` catches up across multiple frames when one `dt` spans several
/// frame durations, so clip wall-time stays correct under frame drops. A
/// finished non-looping clip stays clamped on its last frame until
/// [`reset`](Self::reset).
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteAnimation {
    frames: Vec<Rect>,
    frame_time: f32,
    looping: bool,

    current: usize,
    timer: f32,
    finished: bool,
}

impl SpriteAnimation {
    /// # Panics
    /// Panics if `frame_time` is not positive.
    pub fn new(frames: Vec<Rect>, frame_time: f32, looping: bool) -> Self {
        assert!(frame_time > 0.0, "animation frame_time must be positive");
        Self {
            frames,
            frame_time,
            looping,
            current: 0,
            timer: 0.0,
            finished: false,
        }
    }

    /// Builds frames from a horizontal sprite-sheet strip: `count` cells of
    /// `first`'s size, advancing rightward from `first`.
    pub fn from_strip(first: Rect, count: usize, frame_time: f32, looping: bool) -> Self {
        let frames = (0..count)
            .map(|i| Rect::new(first.x + first.w * i as f32, first.y, first.w, first.h))
            .collect();
        Self::new(frames, frame_time, looping)
    }

    #[inline]
    pub fn frame_index(&self) -> usize {
        self.current
    }

    #[inline]
    pub fn finished(&self) -> bool {
        self.finished
    }

    /// Source rectangle of the current frame; `None` for an empty clip.
    pub fn current_frame(&self) -> Option<Rect> {
        self.frames.get(self.current).copied()
    }

    /// Returns to frame 0 and clears the finished flag.
    pub fn reset(&mut self) {
        self.current = 0;
        self.timer = 0.0;
        self.finished = false;
    }

    /// Accumulates `dt` and advances whole frames.
    ///
    /// No-op once finished (non-looping) or for empty clips.
    pub fn advance(&mut self, dt: f32) {
        if self.finished || self.frames.is_empty() {
            return;
        }

        self.timer += dt;
        while self.timer >= self.frame_time {
            self.timer -= self.frame_time;

            if self.current + 1 < self.frames.len() {
                self.current += 1;
            } else if self.looping {
                self.current = 0;
            } else {
                // Clamp on the last frame.
                self.finished = true;
                self.timer = 0.0;
                break;
            }
        }
    }
}

/// Advances every animated sprite and writes the resolved source rectangle
/// into its [`Sprite`], ahead of the render pass.
#[derive(Debug, Default)]
pub struct AnimationSystem;

impl AnimationSystem {
    pub fn run(&mut self, scene: &mut Scene, dt: f32) {
        for (animation, sprite) in scene.query_pair_mut::<SpriteAnimation, Sprite>() {
            animation.advance(dt);
            sprite.source = animation.current_frame();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Vec2;
    use crate::gfx::test_handle;
    use crate::scene::{Entity, Transform};

    fn strip(count: usize, looping: bool) -> SpriteAnimation {
        SpriteAnimation::from_strip(Rect::new(0.0, 0.0, 16.0, 16.0), count, 0.1, looping)
    }

    #[test]
    fn strip_frames_advance_rightward() {
        let clip = strip(3, true);
        assert_eq!(clip.current_frame(), Some(Rect::new(0.0, 0.0, 16.0, 16.0)));

        let mut clip = clip;
        clip.advance(0.1);
        assert_eq!(clip.current_frame(), Some(Rect::new(16.0, 0.0, 16.0, 16.0)));
    }

    #[test]
    fn non_looping_clip_finishes_clamped_on_last_frame() {
        let mut clip = strip(4, false);

        for _ in 0..4 {
            clip.advance(0.1);
        }

        assert!(clip.finished());
        assert_eq!(clip.frame_index(), 3);
        assert_eq!(clip.current_frame(), Some(Rect::new(48.0, 0.0, 16.0, 16.0)));

        // A further update changes nothing.
        clip.advance(0.1);
        assert!(clip.finished());
        assert_eq!(clip.frame_index(), 3);
    }

    #[test]
    fn looping_clip_wraps_to_frame_zero() {
        let mut clip = strip(4, true);

        for _ in 0..4 {
            clip.advance(0.1);
        }

        assert!(!clip.finished());
        assert_eq!(clip.frame_index(), 0);
    }

    #[test]
    fn large_dt_catches_up_multiple_frames() {
        let mut clip = strip(8, true);
        clip.advance(0.35);
        assert_eq!(clip.frame_index(), 3);
    }

    #[test]
    fn sub_frame_updates_accumulate() {
        let mut clip = strip(4, true);
        clip.advance(0.05);
        assert_eq!(clip.frame_index(), 0);
        clip.advance(0.05);
        assert_eq!(clip.frame_index(), 1);
    }

    #[test]
    fn reset_restarts_a_finished_clip() {
        let mut clip = strip(2, false);
        clip.advance(1.0);
        assert!(clip.finished());

        clip.reset();
        assert!(!clip.finished());
        assert_eq!(clip.frame_index(), 0);
    }

    #[test]
    fn empty_clip_never_advances() {
        let mut clip = SpriteAnimation::new(Vec::new(), 0.1, true);
        clip.advance(5.0);
        assert_eq!(clip.current_frame(), None);
        assert!(!clip.finished());
    }

    #[test]
    fn system_writes_source_rect_into_sprite() {
        let mut scene = Scene::new();
        scene.add(
            Entity::new()
                .with(Transform::at(Vec2::ZERO))
                .with(Sprite::new(test_handle(64, 16)))
                .with(strip(4, true)),
        );

        let mut system = AnimationSystem;
        system.run(&mut scene, 0.1);

        let (_, entity) = scene.entities().next().expect("entity exists");
        let sprite = entity.get::<Sprite>().expect("sprite exists");
        assert_eq!(sprite.source, Some(Rect::new(16.0, 0.0, 16.0, 16.0)));
    }
}
