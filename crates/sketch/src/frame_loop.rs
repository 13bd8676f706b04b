//! The explicit run loop.
//!
//! One iteration per frame: deliver finished asset loads, read the clock,
//! tick the sketch and render. Pacing and time are traits so headless runs
//! can step deterministically.

use std::thread;
use std::time::{Duration, Instant};

use smoke_render::Renderer;

use crate::sketch::Sketch;

const FALLBACK_FPS: f64 = 60.0;

/// Seconds per frame at `fps`. Rates that give no finite, positive,
/// representable interval fall back to 60 fps.
fn frame_interval(fps: f32) -> Duration {
    let fallback = Duration::from_secs_f64(1.0 / FALLBACK_FPS);
    if !(fps.is_finite() && fps > 0.0) {
        return fallback;
    }
    Duration::try_from_secs_f64(1.0 / f64::from(fps)).unwrap_or(fallback)
}

/// Source of elapsed seconds since the loop started.
pub trait Clock {
    fn elapsed_seconds(&mut self) -> f32;
}

impl<C: Clock + ?Sized> Clock for Box<C> {
    fn elapsed_seconds(&mut self) -> f32 {
        (**self).elapsed_seconds()
    }
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self { start: Instant::now() }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn elapsed_seconds(&mut self) -> f32 {
        self.start.elapsed().as_secs_f32()
    }
}

/// Manual clock advancing a fixed step per read, starting at zero.
#[derive(Debug, Clone, Copy)]
pub struct SteppedClock {
    step: f32,
    reads: u64,
}

impl SteppedClock {
    pub fn new(fps: f32) -> Self {
        Self {
            step: frame_interval(fps).as_secs_f32(),
            reads: 0,
        }
    }
}

impl Clock for SteppedClock {
    fn elapsed_seconds(&mut self) -> f32 {
        let t = self.reads as f32 * self.step;
        self.reads += 1;
        t
    }
}

/// Decides when the next frame may run, and whether the loop continues.
pub trait FramePacer {
    /// Block until the next frame is due. `false` stops the loop.
    fn wait_for_frame(&mut self) -> bool;
}

impl<P: FramePacer + ?Sized> FramePacer for Box<P> {
    fn wait_for_frame(&mut self) -> bool {
        (**self).wait_for_frame()
    }
}

/// Runs a fixed number of frames back to back.
#[derive(Debug, Clone, Copy)]
pub struct FrameBudget {
    remaining: u64,
}

impl FrameBudget {
    pub fn new(frames: u64) -> Self {
        Self { remaining: frames }
    }
}

impl FramePacer for FrameBudget {
    fn wait_for_frame(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        true
    }
}

/// Sleeps to hold a target frame rate. Runs forever unless given a limit.
#[derive(Debug, Clone)]
pub struct IntervalPacer {
    interval: Duration,
    next: Option<Instant>,
    limit: Option<u64>,
}

impl IntervalPacer {
    pub fn new(fps: f32) -> Self {
        Self {
            interval: frame_interval(fps),
            next: None,
            limit: None,
        }
    }

    pub fn with_limit(mut self, frames: u64) -> Self {
        self.limit = Some(frames);
        self
    }
}

impl FramePacer for IntervalPacer {
    fn wait_for_frame(&mut self) -> bool {
        if let Some(limit) = self.limit.as_mut() {
            if *limit == 0 {
                return false;
            }
            *limit -= 1;
        }
        let now = Instant::now();
        match self.next {
            Some(due) if due > now => {
                thread::sleep(due - now);
                self.next = Some(due + self.interval);
            }
            // First frame, or running behind: don't try to catch up.
            _ => self.next = Some(now + self.interval),
        }
        true
    }
}

/// Drive `sketch` until `pacer` stops. `on_frame` sees every frame's output
/// and may edit the sketch before the next one. Returns the frame count.
pub fn run<C, P, R, F>(
    sketch: &mut Sketch,
    clock: &mut C,
    pacer: &mut P,
    renderer: &mut R,
    mut on_frame: F,
) -> u64
where
    C: Clock,
    P: FramePacer,
    R: Renderer,
    F: FnMut(&mut Sketch, R::Output),
{
    let mut frames = 0;
    while pacer.wait_for_frame() {
        sketch.poll_assets();
        let elapsed = clock.elapsed_seconds();
        let output = sketch.frame(elapsed, renderer);
        on_frame(sketch, output);
        frames += 1;
    }
    tracing::debug!(frames, "run loop finished");
    frames
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::ControlEdit;
    use smoke_assets::{Pending, TextureData};
    use smoke_common::Viewport;
    use smoke_render::CaptureRenderer;

    fn sketch() -> Sketch {
        Sketch::new(Viewport::default())
    }

    #[test]
    fn stepped_clock_starts_at_zero() {
        let mut clock = SteppedClock::new(4.0);
        assert_eq!(clock.elapsed_seconds(), 0.0);
        assert_eq!(clock.elapsed_seconds(), 0.25);
        assert_eq!(clock.elapsed_seconds(), 0.5);
    }

    #[test]
    fn degenerate_rates_fall_back_to_sixty() {
        let sixty = Duration::from_secs_f64(1.0 / 60.0);
        for fps in [0.0, -5.0, f32::NAN, f32::INFINITY, 1e-39, f32::MIN_POSITIVE] {
            assert_eq!(frame_interval(fps), sixty, "fps {fps}");
        }
        assert_eq!(frame_interval(4.0), Duration::from_millis(250));
    }

    #[test]
    fn tiny_rates_do_not_panic() {
        let mut clock = SteppedClock::new(1e-39);
        clock.elapsed_seconds();
        assert!(clock.elapsed_seconds().is_finite());

        let mut pacer = IntervalPacer::new(1e-39).with_limit(1);
        assert!(pacer.wait_for_frame());
        assert!(!pacer.wait_for_frame());
    }

    #[test]
    fn budget_stops_after_n_frames() {
        let mut budget = FrameBudget::new(2);
        assert!(budget.wait_for_frame());
        assert!(budget.wait_for_frame());
        assert!(!budget.wait_for_frame());
    }

    #[test]
    fn run_writes_scaled_time_each_frame() {
        for speed in [0.0, 0.75, 1.0, 10.0] {
            let mut s = sketch();
            s.apply(ControlEdit::Speed(speed));
            let mut renderer = CaptureRenderer::new();
            let mut expected = SteppedClock::new(60.0);

            let frames = run(
                &mut s,
                &mut SteppedClock::new(60.0),
                &mut FrameBudget::new(5),
                &mut renderer,
                |_, _| {},
            );

            assert_eq!(frames, 5);
            for capture in renderer.frames() {
                assert_eq!(capture.time, expected.elapsed_seconds() * speed);
            }
        }
    }

    #[test]
    fn edits_between_frames_show_up_next_frame() {
        let mut s = sketch();
        let mut renderer = CaptureRenderer::new();
        run(
            &mut s,
            &mut SteppedClock::new(30.0),
            &mut FrameBudget::new(4),
            &mut renderer,
            |sketch, capture| {
                if capture.map(|c| c.frame) == Some(1) {
                    sketch.apply(ControlEdit::Raw(true));
                }
            },
        );

        let raw: Vec<bool> = renderer.frames().iter().map(|c| c.raw).collect();
        assert_eq!(raw, vec![false, false, true, true]);
    }

    #[test]
    fn run_delivers_pending_texture_before_first_draw() {
        let mut s = sketch();
        let texture = TextureData::new("perlin", 1, 1, vec![0; 4]);
        s.set_pending_texture(Pending::ready("perlin", Ok(texture)));
        let mut renderer = CaptureRenderer::new();
        run(
            &mut s,
            &mut SteppedClock::new(60.0),
            &mut FrameBudget::new(1),
            &mut renderer,
            |_, _| {},
        );
        assert!(renderer.frames()[0].texture_loaded);
    }

    #[test]
    fn interval_pacer_respects_limit() {
        let mut pacer = IntervalPacer::new(1000.0).with_limit(3);
        let frames = run(
            &mut sketch(),
            &mut SystemClock::new(),
            &mut pacer,
            &mut CaptureRenderer::new(),
            |_, _| {},
        );
        assert_eq!(frames, 3);
    }
}
