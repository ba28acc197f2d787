//! Scrollspy Animation System
//!
//! Tween interpolation and frame pacing for programmatic scrolling.
//!
//! # Features
//!
//! - **Easing Curves**: Quadratic and cubic in/out curves plus linear
//! - **Tweens**: Timed interpolation between two values
//! - **Scheduler**: Cooperative, frame-driven ticking of active tweens
//! - **Timers**: Delayed payload delivery for stepped fallbacks

pub mod easing;
pub mod scheduler;
pub mod timer;
pub mod tween;

pub use easing::Easing;
pub use scheduler::{AnimationScheduler, TweenId};
pub use timer::{TimerId, TimerQueue};
pub use tween::Tween;
