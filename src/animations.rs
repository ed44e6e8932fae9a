use cgmath::{Vector2, Vector3};
use serde::{Deserialize, Deserializer, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use crate::error::MotionError;

/// Types of easing functions available for interpolation
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    EnumString,
    Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Easing {
    #[default]
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
}

impl Easing {
    /// Maps segment progress `t` in [0, 1] onto the eased curve.
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);

        match self {
            Easing::Linear => t,
            Easing::EaseIn => t * t,
            Easing::EaseOut => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
        }
    }
}

pub fn lerp(start: f32, end: f32, progress: f32) -> f32 {
    start + (end - start) * progress
}

/// Values that can be blended between two keyframes.
pub trait Interpolate: Clone {
    fn interpolate(&self, other: &Self, t: f32) -> Self;
}

impl Interpolate for f32 {
    fn interpolate(&self, other: &Self, t: f32) -> Self {
        lerp(*self, *other, t)
    }
}

impl Interpolate for Vector2<f32> {
    fn interpolate(&self, other: &Self, t: f32) -> Self {
        *self + (*other - *self) * t
    }
}

impl Interpolate for Vector3<f32> {
    fn interpolate(&self, other: &Self, t: f32) -> Self {
        *self + (*other - *self) * t
    }
}

/// A breakpoint on a progress-driven track
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Keyframe<T> {
    /// Progress at which `value` is reached
    pub progress: f32,
    pub value: T,
    /// Type of interpolation to next keyframe
    #[serde(default)]
    pub easing: Easing,
}

impl<T> Keyframe<T> {
    pub fn new(progress: f32, value: T) -> Self {
        Self {
            progress,
            value,
            easing: Easing::Linear,
        }
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }
}

/// Ordered keyframes sampled by progress.
///
/// Breakpoints are strictly increasing and the track is never empty. Sampling
/// outside the first/last breakpoint holds the nearest value.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(transparent)]
pub struct KeyframeTrack<T> {
    keyframes: Vec<Keyframe<T>>,
}

impl<T> KeyframeTrack<T> {
    pub fn new(keyframes: Vec<Keyframe<T>>) -> Result<Self, MotionError> {
        if keyframes.is_empty() {
            return Err(MotionError::EmptyTrack);
        }

        for (index, keyframe) in keyframes.iter().enumerate() {
            if !keyframe.progress.is_finite() {
                return Err(MotionError::NonFiniteKeyframe { index });
            }
            if index > 0 && keyframe.progress <= keyframes[index - 1].progress {
                return Err(MotionError::UnorderedKeyframes { index });
            }
        }

        Ok(Self { keyframes })
    }

    pub fn keyframes(&self) -> &[Keyframe<T>] {
        &self.keyframes
    }

    /// First and last breakpoint progress.
    pub fn domain(&self) -> (f32, f32) {
        let first = self.keyframes[0].progress;
        let last = self.keyframes[self.keyframes.len() - 1].progress;
        (first, last)
    }
}

impl<T: Clone> KeyframeTrack<T> {
    /// Builds a linear track from `(progress, value)` pairs.
    pub fn from_pairs(pairs: &[(f32, T)]) -> Result<Self, MotionError> {
        Self::new(
            pairs
                .iter()
                .map(|(progress, value)| Keyframe::new(*progress, value.clone()))
                .collect(),
        )
    }
}

impl<T: Interpolate> KeyframeTrack<T> {
    pub fn sample(&self, progress: f32) -> T {
        let first = &self.keyframes[0];
        // also catches NaN
        if !(progress > first.progress) {
            return first.value.clone();
        }

        let next = self.keyframes.partition_point(|k| k.progress <= progress);
        if next == self.keyframes.len() {
            return self.keyframes[next - 1].value.clone();
        }

        let start = &self.keyframes[next - 1];
        let end = &self.keyframes[next];
        let t = (progress - start.progress) / (end.progress - start.progress);

        start.value.interpolate(&end.value, start.easing.apply(t))
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for KeyframeTrack<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let keyframes = Vec::<Keyframe<T>>::deserialize(deserializer)?;
        KeyframeTrack::new(keyframes).map_err(serde::de::Error::custom)
    }
}
