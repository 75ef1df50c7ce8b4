/// Frames-per-second rollup over one-second windows.
///
/// Feed it every frame's `dt`; it reports a new average once per second and
/// `None` in between, so overlays update at a readable cadence.
#[derive(Debug, Clone, Default)]
pub struct FpsCounter {
    frames: u32,
    elapsed: f32,
    fps: f32,
}

impl FpsCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recent completed average (0 until the first window closes).
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Accounts one frame; returns the fresh average when a window closes.
    pub fn tick(&mut self, dt: f32) -> Option<f32> {
        self.frames += 1;
        self.elapsed += dt;

        if self.elapsed < 1.0 {
            return None;
        }

        self.fps = self.frames as f32 / self.elapsed;
        self.frames = 0;
        self.elapsed = 0.0;
        Some(self.fps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_once_per_second() {
        let mut counter = FpsCounter::new();

        for _ in 0..58 {
            assert_eq!(counter.tick(1.0 / 60.0), None);
        }

        let mut reported = None;
        for _ in 0..3 {
            if let Some(fps) = counter.tick(1.0 / 60.0) {
                reported = Some(fps);
                break;
            }
        }
        let fps = reported.expect("no report after a full second of frames");
        assert!((fps - 60.0).abs() < 1.0, "got {fps}");
    }

    #[test]
    fn window_resets_after_report() {
        let mut counter = FpsCounter::new();

        counter.tick(1.5); // slow frame closes the window immediately
        assert!(counter.fps() > 0.0);
        assert_eq!(counter.tick(0.016), None);
    }
}
