//! Programmatic scrolling
//!
//! A scroll command moves a surface to a destination offset in one of three
//! ways, picked per command:
//!
//! 1. **Tween** when an easing curve is configured: the offset is
//!    interpolated from its current value over the configured time and
//!    written on every frame.
//! 2. **Stepped** for legacy engines (user agent containing `"MSIE "`):
//!    `steps + 1` evenly spaced jumps delivered by timers.
//! 3. **Native** otherwise: a smooth-scroll request is left on the
//!    document for the host.
//!
//! Frames are driven by [`ScrollDriver::tick`]. Commands on the same
//! surface run independently unless `cancel_overlapping` is set, in which
//! case each command invalidates the animations already running there.

use rustc_hash::FxHashMap;
use scrollspy_animation::{AnimationScheduler, TimerQueue, Tween, TweenId};
use scrollspy_dom::{Document, ScrollTarget};

use crate::options::Options;

/// How a scroll command is carried out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollMethod {
    Tween,
    Stepped,
    Native,
}

/// True for user agents that only support stepped scrolling
pub fn is_legacy_engine(user_agent: &str) -> bool {
    user_agent.find("MSIE ").is_some_and(|pos| pos > 0)
}

#[derive(Debug, Clone, Copy)]
struct ActiveTween {
    id: TweenId,
    target: ScrollTarget,
    generation: u64,
}

#[derive(Debug, Clone, Copy)]
struct Jump {
    target: ScrollTarget,
    top: f32,
    generation: u64,
}

/// Runs scroll commands against a document
#[derive(Default)]
pub struct ScrollDriver {
    scheduler: AnimationScheduler,
    timers: TimerQueue<Jump>,
    tweens: Vec<ActiveTween>,
    generations: FxHashMap<ScrollTarget, u64>,
}

impl ScrollDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start moving `target` to `destination`
    pub fn scroll_to(
        &mut self,
        doc: &mut Document,
        target: ScrollTarget,
        destination: f32,
        options: &Options,
    ) -> ScrollMethod {
        let current = doc.scroll_top(target);
        let generation = self.next_generation(target, options.cancel_overlapping);

        if let Some(easing) = options.easing {
            let id = self
                .scheduler
                .start(Tween::new(current, destination, options.time, easing));
            self.tweens.push(ActiveTween {
                id,
                target,
                generation,
            });
            tracing::debug!(
                "ScrollDriver: tween {:?} {} -> {} over {}ms",
                target,
                current,
                destination,
                options.time
            );
            return ScrollMethod::Tween;
        }

        if is_legacy_engine(doc.user_agent()) {
            let steps = options.steps.max(1);
            let interval = options.time as f32 / steps as f32;
            let gap = destination - current;
            for i in 0..=steps {
                self.timers.schedule(
                    interval * i as f32,
                    Jump {
                        target,
                        top: current + gap / steps as f32 * i as f32,
                        generation,
                    },
                );
            }
            tracing::debug!(
                "ScrollDriver: {} stepped jumps {:?} {} -> {}",
                steps + 1,
                target,
                current,
                destination
            );
            return ScrollMethod::Stepped;
        }

        doc.request_smooth_scroll(target, destination);
        tracing::debug!("ScrollDriver: native smooth scroll {:?} -> {}", target, destination);
        ScrollMethod::Native
    }

    fn next_generation(&mut self, target: ScrollTarget, cancel_overlapping: bool) -> u64 {
        let generation = self.generations.entry(target).or_insert(0);
        if cancel_overlapping {
            *generation += 1;
        }
        *generation
    }

    fn is_current(&self, target: ScrollTarget, generation: u64) -> bool {
        self.generations.get(&target).copied().unwrap_or(0) == generation
    }

    /// Advance animations and timers by one frame, writing scroll offsets
    ///
    /// Returns true if another frame is needed.
    pub fn tick(&mut self, doc: &mut Document, dt_ms: f32) -> bool {
        for jump in self.timers.advance(dt_ms) {
            if self.is_current(jump.target, jump.generation) {
                doc.set_scroll_top(jump.target, jump.top);
            }
        }

        self.scheduler.tick_ms(dt_ms);
        let tweens = std::mem::take(&mut self.tweens);
        for tween in tweens {
            if !self.is_current(tween.target, tween.generation) {
                tracing::trace!("ScrollDriver: dropping superseded tween {:?}", tween.id);
                self.scheduler.remove(tween.id);
                continue;
            }
            if let Some(value) = self.scheduler.value(tween.id) {
                doc.set_scroll_top(tween.target, value);
            }
            if self.scheduler.is_finished(tween.id) {
                self.scheduler.remove(tween.id);
            } else {
                self.tweens.push(tween);
            }
        }

        !self.is_idle()
    }

    /// True when no tween or timer is pending
    pub fn is_idle(&self) -> bool {
        self.tweens.is_empty() && self.timers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scrollspy_animation::Easing;
    use scrollspy_dom::ElementId;

    const LEGACY_UA: &str = "Mozilla/4.0 (compatible; MSIE 8.0; Windows NT 6.1)";

    fn pane_doc() -> (Document, ElementId) {
        let mut doc = Document::new();
        let root = doc.tree().root();
        let pane = doc
            .tree_mut()
            .element("div")
            .height(200.0)
            .scroll_height(2000.0)
            .append_to(root);
        (doc, pane)
    }

    fn linear(time: u32) -> Options {
        Options {
            easing: Some(Easing::Linear),
            time,
            ..Options::default()
        }
    }

    #[test]
    fn test_legacy_engine_detection() {
        assert!(is_legacy_engine(LEGACY_UA));
        assert!(!is_legacy_engine("MSIE 6.0"));
        assert!(!is_legacy_engine("Mozilla/5.0 (X11; Linux x86_64) Firefox/120.0"));
        assert!(!is_legacy_engine(""));
    }

    #[test]
    fn test_tween_writes_each_frame() {
        let (mut doc, pane) = pane_doc();
        let target = ScrollTarget::Element(pane);
        let mut driver = ScrollDriver::new();

        let method = driver.scroll_to(&mut doc, target, 400.0, &linear(100));
        assert_eq!(method, ScrollMethod::Tween);
        assert_eq!(doc.scroll_top(target), 0.0);

        assert!(driver.tick(&mut doc, 50.0));
        assert!((doc.scroll_top(target) - 200.0).abs() < 1e-3);

        assert!(!driver.tick(&mut doc, 50.0));
        assert_eq!(doc.scroll_top(target), 400.0);
        assert!(driver.is_idle());
    }

    #[test]
    fn test_stepped_fallback() {
        let (mut doc, pane) = pane_doc();
        doc.set_user_agent(LEGACY_UA);
        let target = ScrollTarget::Element(pane);
        let mut driver = ScrollDriver::new();
        let options = Options {
            easing: None,
            time: 100,
            steps: 4,
            ..Options::default()
        };

        assert_eq!(
            driver.scroll_to(&mut doc, target, 400.0, &options),
            ScrollMethod::Stepped
        );

        // Jump 0 is due immediately, the rest every 25ms
        assert!(driver.tick(&mut doc, 0.0));
        assert_eq!(doc.scroll_top(target), 0.0);
        assert!(driver.tick(&mut doc, 25.0));
        assert_eq!(doc.scroll_top(target), 100.0);
        assert!(driver.tick(&mut doc, 50.0));
        assert_eq!(doc.scroll_top(target), 300.0);
        assert!(!driver.tick(&mut doc, 25.0));
        assert_eq!(doc.scroll_top(target), 400.0);
    }

    #[test]
    fn test_zero_steps_is_single_step() {
        let (mut doc, pane) = pane_doc();
        doc.set_user_agent(LEGACY_UA);
        let target = ScrollTarget::Element(pane);
        let mut driver = ScrollDriver::new();
        let options = Options {
            easing: None,
            steps: 0,
            ..Options::default()
        };

        driver.scroll_to(&mut doc, target, 300.0, &options);
        driver.tick(&mut doc, 1000.0);
        assert_eq!(doc.scroll_top(target), 300.0);
    }

    #[test]
    fn test_native_smooth_scroll_request() {
        let (mut doc, pane) = pane_doc();
        let target = ScrollTarget::Element(pane);
        let mut driver = ScrollDriver::new();
        let options = Options {
            easing: None,
            ..Options::default()
        };

        assert_eq!(
            driver.scroll_to(&mut doc, target, 640.0, &options),
            ScrollMethod::Native
        );
        assert!(driver.is_idle());
        let pending = doc.take_pending_scrolls();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].target, target);
        assert_eq!(pending[0].top, 640.0);
        assert!(pending[0].smooth);
    }

    #[test]
    fn test_overlapping_tweens_run_independently() {
        let (mut doc, pane) = pane_doc();
        let target = ScrollTarget::Element(pane);
        let mut driver = ScrollDriver::new();

        driver.scroll_to(&mut doc, target, 1000.0, &linear(100));
        driver.tick(&mut doc, 50.0);
        driver.scroll_to(&mut doc, target, 0.0, &linear(100));

        // Both tweens keep writing; the first one finishes later at its target
        driver.tick(&mut doc, 50.0);
        assert!(!driver.is_idle());
        driver.tick(&mut doc, 50.0);
        assert!(driver.is_idle());
    }

    #[test]
    fn test_cancel_overlapping() {
        let (mut doc, pane) = pane_doc();
        let target = ScrollTarget::Element(pane);
        let mut driver = ScrollDriver::new();
        let options = Options {
            cancel_overlapping: true,
            ..linear(100)
        };

        driver.scroll_to(&mut doc, target, 1000.0, &options);
        driver.tick(&mut doc, 50.0);
        assert!((doc.scroll_top(target) - 500.0).abs() < 1e-3);

        driver.scroll_to(&mut doc, target, 0.0, &options);
        driver.tick(&mut doc, 50.0);
        assert!((doc.scroll_top(target) - 250.0).abs() < 1e-3);
        assert!(driver.tick(&mut doc, 25.0));
        assert!(!driver.tick(&mut doc, 25.0));
        assert_eq!(doc.scroll_top(target), 0.0);
        assert!(driver.is_idle());
    }
}
