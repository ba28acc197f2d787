//! Easing curves
//!
//! Maps linear progress (0.0 to 1.0) onto an eased progress value.

use std::f32::consts::{FRAC_PI_2, PI};

use serde::{Deserialize, Serialize};

/// Easing function applied to tween progress
///
/// Names deserialize in kebab-case (`"cubic-in"`, `"quad-in-out"`,
/// `"bounce-out"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Easing {
    Linear,
    QuadIn,
    QuadOut,
    QuadInOut,
    /// Default curve for scroll-to-section animations
    #[default]
    CubicIn,
    CubicOut,
    CubicInOut,
    QuartIn,
    QuartOut,
    QuartInOut,
    QuintIn,
    QuintOut,
    QuintInOut,
    SineIn,
    SineOut,
    SineInOut,
    ExpoIn,
    ExpoOut,
    ExpoInOut,
    CircIn,
    CircOut,
    CircInOut,
    /// Overshoots below the start before accelerating
    BackIn,
    BackOut,
    BackInOut,
    ElasticIn,
    ElasticOut,
    ElasticInOut,
    BounceIn,
    BounceOut,
    BounceInOut,
}

const BACK: f32 = 1.70158;
const BACK_IN_OUT: f32 = BACK * 1.525;

impl Easing {
    /// Apply easing to a progress value
    ///
    /// Input is clamped to `0.0..=1.0`; every curve maps 0 to 0 and 1 to 1.
    /// Back and elastic curves leave that range in between.
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::QuadIn => t * t,
            Easing::QuadOut => t * (2.0 - t),
            Easing::QuadInOut => in_out(t, |k| k * k),
            Easing::CubicIn => t * t * t,
            Easing::CubicOut => 1.0 - (1.0 - t).powi(3),
            Easing::CubicInOut => in_out(t, |k| k * k * k),
            Easing::QuartIn => t.powi(4),
            Easing::QuartOut => 1.0 - (1.0 - t).powi(4),
            Easing::QuartInOut => in_out(t, |k| k.powi(4)),
            Easing::QuintIn => t.powi(5),
            Easing::QuintOut => 1.0 - (1.0 - t).powi(5),
            Easing::QuintInOut => in_out(t, |k| k.powi(5)),
            Easing::SineIn => 1.0 - (t * FRAC_PI_2).cos(),
            Easing::SineOut => (t * FRAC_PI_2).sin(),
            Easing::SineInOut => 0.5 * (1.0 - (PI * t).cos()),
            Easing::ExpoIn => expo_in(t),
            Easing::ExpoOut => 1.0 - expo_in(1.0 - t),
            Easing::ExpoInOut => in_out(t, expo_in),
            Easing::CircIn => 1.0 - (1.0 - t * t).sqrt(),
            Easing::CircOut => (1.0 - (t - 1.0) * (t - 1.0)).sqrt(),
            Easing::CircInOut => in_out(t, |k| 1.0 - (1.0 - k * k).sqrt()),
            Easing::BackIn => back_in(t, BACK),
            Easing::BackOut => 1.0 - back_in(1.0 - t, BACK),
            Easing::BackInOut => in_out(t, |k| back_in(k, BACK_IN_OUT)),
            Easing::ElasticIn => elastic_in(t),
            Easing::ElasticOut => 1.0 - elastic_in(1.0 - t),
            Easing::ElasticInOut => in_out(t, elastic_in),
            Easing::BounceIn => 1.0 - bounce_out(1.0 - t),
            Easing::BounceOut => bounce_out(t),
            Easing::BounceInOut => in_out(t, |k| 1.0 - bounce_out(1.0 - k)),
        }
    }
}

/// Symmetric in-out curve built from an ease-in curve
fn in_out(t: f32, ease_in: impl Fn(f32) -> f32) -> f32 {
    if t < 0.5 {
        0.5 * ease_in(t * 2.0)
    } else {
        1.0 - 0.5 * ease_in((1.0 - t) * 2.0)
    }
}

fn expo_in(t: f32) -> f32 {
    if t <= 0.0 {
        0.0
    } else {
        1024f32.powf(t - 1.0)
    }
}

fn back_in(t: f32, s: f32) -> f32 {
    t * t * ((s + 1.0) * t - s)
}

fn elastic_in(t: f32) -> f32 {
    if t <= 0.0 || t >= 1.0 {
        return t;
    }
    -(2f32.powf(10.0 * (t - 1.0))) * ((t - 1.1) * 5.0 * PI).sin()
}

fn bounce_out(t: f32) -> f32 {
    const N: f32 = 7.5625;
    const D: f32 = 2.75;
    if t < 1.0 / D {
        N * t * t
    } else if t < 2.0 / D {
        let k = t - 1.5 / D;
        N * k * k + 0.75
    } else if t < 2.5 / D {
        let k = t - 2.25 / D;
        N * k * k + 0.9375
    } else {
        let k = t - 2.625 / D;
        N * k * k + 0.984375
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Easing; 31] = [
        Easing::Linear,
        Easing::QuadIn,
        Easing::QuadOut,
        Easing::QuadInOut,
        Easing::CubicIn,
        Easing::CubicOut,
        Easing::CubicInOut,
        Easing::QuartIn,
        Easing::QuartOut,
        Easing::QuartInOut,
        Easing::QuintIn,
        Easing::QuintOut,
        Easing::QuintInOut,
        Easing::SineIn,
        Easing::SineOut,
        Easing::SineInOut,
        Easing::ExpoIn,
        Easing::ExpoOut,
        Easing::ExpoInOut,
        Easing::CircIn,
        Easing::CircOut,
        Easing::CircInOut,
        Easing::BackIn,
        Easing::BackOut,
        Easing::BackInOut,
        Easing::ElasticIn,
        Easing::ElasticOut,
        Easing::ElasticInOut,
        Easing::BounceIn,
        Easing::BounceOut,
        Easing::BounceInOut,
    ];

    #[test]
    fn test_endpoints() {
        for easing in ALL {
            assert!(easing.apply(0.0).abs() < 1e-5, "{:?} at 0", easing);
            assert!((easing.apply(1.0) - 1.0).abs() < 1e-5, "{:?} at 1", easing);
        }
    }

    #[test]
    fn test_midpoints() {
        assert!((Easing::Linear.apply(0.5) - 0.5).abs() < 1e-6);
        assert!((Easing::CubicIn.apply(0.5) - 0.125).abs() < 1e-6);
        assert!((Easing::CubicOut.apply(0.5) - 0.875).abs() < 1e-6);
        assert!((Easing::QuadInOut.apply(0.5) - 0.5).abs() < 1e-6);
        assert!((Easing::CubicInOut.apply(0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_in_out_curves_are_symmetric() {
        for easing in [
            Easing::QuartInOut,
            Easing::SineInOut,
            Easing::ExpoInOut,
            Easing::CircInOut,
            Easing::BackInOut,
            Easing::BounceInOut,
        ] {
            assert!((easing.apply(0.5) - 0.5).abs() < 1e-5, "{:?}", easing);
            let (a, b) = (easing.apply(0.2), easing.apply(0.8));
            assert!((a + b - 1.0).abs() < 1e-5, "{:?}", easing);
        }
    }

    #[test]
    fn test_extended_curves() {
        assert!((Easing::SineOut.apply(0.5) - (0.5 * FRAC_PI_2).sin()).abs() < 1e-6);
        assert!((Easing::ExpoIn.apply(0.5) - 1.0 / 32.0).abs() < 1e-6);
        assert!((Easing::BounceOut.apply(0.5) - 0.765625).abs() < 1e-5);
        // Back dips below the start, elastic overshoots the end
        assert!(Easing::BackIn.apply(0.2) < 0.0);
        assert!(Easing::ElasticOut.apply(0.15) > 1.0);
    }

    #[test]
    fn test_clamps_out_of_range_progress() {
        assert_eq!(Easing::QuadIn.apply(-1.0), 0.0);
        assert_eq!(Easing::QuadIn.apply(2.0), 1.0);
    }

    #[test]
    fn test_deserialize_names() {
        let easing: Easing = serde_json::from_str("\"cubic-in-out\"").unwrap();
        assert_eq!(easing, Easing::CubicInOut);
        assert_eq!(Easing::default(), Easing::CubicIn);
        let easing: Easing = serde_json::from_str("\"elastic-out\"").unwrap();
        assert_eq!(easing, Easing::ElasticOut);
        assert!(serde_json::from_str::<Easing>("\"bounce\"").is_err());
    }
}
