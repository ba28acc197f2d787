//! Two-point tweens
//!
//! A tween interpolates from a start value to an end value over a fixed
//! duration, shaping progress with an [`Easing`] curve.

use crate::easing::Easing;

/// A timed interpolation between two values
#[derive(Clone, Debug)]
pub struct Tween {
    from: f32,
    to: f32,
    /// Duration in milliseconds
    duration_ms: u32,
    easing: Easing,
    /// Time elapsed since start in milliseconds
    elapsed_ms: f32,
    playing: bool,
    started: bool,
}

impl Tween {
    /// Create a stopped tween
    pub fn new(from: f32, to: f32, duration_ms: u32, easing: Easing) -> Self {
        Self {
            from,
            to,
            duration_ms,
            easing,
            elapsed_ms: 0.0,
            playing: false,
            started: false,
        }
    }

    /// Start (or restart) playback from the beginning
    pub fn start(&mut self) {
        self.elapsed_ms = 0.0;
        self.playing = true;
        self.started = true;
    }

    /// Advance the tween by `dt_ms` milliseconds
    ///
    /// Playback stops once the full duration has elapsed.
    pub fn tick(&mut self, dt_ms: f32) {
        if !self.playing {
            return;
        }
        self.elapsed_ms += dt_ms.max(0.0);
        if self.elapsed_ms >= self.duration_ms as f32 {
            self.elapsed_ms = self.duration_ms as f32;
            self.playing = false;
        }
    }

    /// Linear progress (0.0 to 1.0)
    pub fn progress(&self) -> f32 {
        if self.duration_ms == 0 {
            return if self.started { 1.0 } else { 0.0 };
        }
        (self.elapsed_ms / self.duration_ms as f32).clamp(0.0, 1.0)
    }

    /// Current interpolated value
    pub fn value(&self) -> f32 {
        self.from + (self.to - self.from) * self.easing.apply(self.progress())
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// True once the tween has run to completion
    pub fn is_finished(&self) -> bool {
        self.started && !self.playing && self.elapsed_ms >= self.duration_ms as f32
    }
}
