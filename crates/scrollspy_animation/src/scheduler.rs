//! Animation scheduler
//!
//! Holds every registered tween and advances them once per frame. The
//! scheduler never spawns threads: the host calls
//! [`AnimationScheduler::tick_ms`] with its frame delta and keeps requesting
//! frames while the call returns `true`.
//!
//! Tweens are not removed when they finish. Owners read the final value and
//! call [`AnimationScheduler::remove`], which is what lets a finished task
//! terminate without losing its last frame.

use slotmap::{new_key_type, SlotMap};

use crate::tween::Tween;

new_key_type! {
    /// Handle to a registered tween
    pub struct TweenId;
}

/// Cooperative, frame-driven tween scheduler
pub struct AnimationScheduler {
    tweens: SlotMap<TweenId, Tween>,
}

impl AnimationScheduler {
    pub fn new() -> Self {
        Self {
            tweens: SlotMap::with_key(),
        }
    }

    /// Register a tween and start it
    pub fn start(&mut self, mut tween: Tween) -> TweenId {
        tween.start();
        let id = self.tweens.insert(tween);
        tracing::trace!("AnimationScheduler: started tween {:?}", id);
        id
    }

    /// Tick all tweens by a frame delta in milliseconds
    ///
    /// Returns true if any tween is still playing (needs another frame).
    pub fn tick_ms(&mut self, dt_ms: f32) -> bool {
        for (_, tween) in self.tweens.iter_mut() {
            tween.tick(dt_ms);
        }
        self.has_active()
    }

    /// Check if any tween is still playing
    pub fn has_active(&self) -> bool {
        self.tweens.iter().any(|(_, t)| t.is_playing())
    }

    /// Current value of a tween
    pub fn value(&self, id: TweenId) -> Option<f32> {
        self.tweens.get(id).map(Tween::value)
    }

    pub fn is_finished(&self, id: TweenId) -> bool {
        self.tweens.get(id).is_some_and(Tween::is_finished)
    }

    /// Remove a tween, returning it if it was registered
    pub fn remove(&mut self, id: TweenId) -> Option<Tween> {
        self.tweens.remove(id)
    }

    /// Number of registered tweens (playing or not)
    pub fn len(&self) -> usize {
        self.tweens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tweens.is_empty()
    }
}

impl Default for AnimationScheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::easing::Easing;

    #[test]
    fn test_scheduler_tick() {
        let mut scheduler = AnimationScheduler::new();
        let id = scheduler.start(Tween::new(0.0, 100.0, 100, Easing::Linear));

        assert!(scheduler.tick_ms(50.0));
        let value = scheduler.value(id).unwrap();
        assert!((value - 50.0).abs() < 1e-3);

        // Finishing frame reports no more work
        assert!(!scheduler.tick_ms(50.0));
        assert!(scheduler.is_finished(id));
        assert_eq!(scheduler.value(id), Some(100.0));
    }

    #[test]
    fn test_finished_tweens_stay_until_removed() {
        let mut scheduler = AnimationScheduler::new();
        let id = scheduler.start(Tween::new(0.0, 1.0, 10, Easing::Linear));
        scheduler.tick_ms(20.0);

        assert_eq!(scheduler.len(), 1);
        assert!(scheduler.remove(id).is_some());
        assert!(scheduler.is_empty());
        assert_eq!(scheduler.value(id), None);
    }

    #[test]
    fn test_independent_tweens() {
        let mut scheduler = AnimationScheduler::new();
        let a = scheduler.start(Tween::new(0.0, 100.0, 100, Easing::Linear));
        let b = scheduler.start(Tween::new(0.0, 100.0, 200, Easing::Linear));

        scheduler.tick_ms(100.0);
        assert!(scheduler.is_finished(a));
        assert!(!scheduler.is_finished(b));
        assert!(scheduler.has_active());
    }
}
