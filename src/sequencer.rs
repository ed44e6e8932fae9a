use serde::{Deserialize, Serialize};

use crate::animations::{lerp, Interpolate, Keyframe, KeyframeTrack};
use crate::error::MotionError;
use crate::progress::ScrollProgress;
use crate::scenes::SceneLayout;

/// Derived rendering values for one scene at one progress value.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct VisualState {
    pub opacity: f32,
    /// Vertical offset in css pixels, positive is below the resting position
    pub translate_y: f32,
    pub scale: f32,
}

impl VisualState {
    pub const HELD: VisualState = VisualState {
        opacity: 1.0,
        translate_y: 0.0,
        scale: 1.0,
    };

    pub fn is_visible(&self) -> bool {
        self.opacity > 0.0
    }

    /// CSS `transform` value for direct application to the scene element.
    pub fn css_transform(&self) -> String {
        format!(
            "translate3d(0, {:.2}px, 0) scale({:.4})",
            self.translate_y, self.scale
        )
    }
}

impl Interpolate for VisualState {
    fn interpolate(&self, other: &Self, t: f32) -> Self {
        Self {
            opacity: lerp(self.opacity, other.opacity, t),
            translate_y: lerp(self.translate_y, other.translate_y, t),
            scale: lerp(self.scale, other.scale, t),
        }
    }
}

/// How far scenes travel and shrink while blending.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneMotion {
    pub slide_offset: f32,
    pub min_scale: f32,
}

impl Default for SceneMotion {
    fn default() -> Self {
        Self {
            slide_offset: 60.0,
            min_scale: 0.95,
        }
    }
}

impl SceneMotion {
    fn entering(&self) -> VisualState {
        VisualState {
            opacity: 0.0,
            translate_y: self.slide_offset,
            scale: self.min_scale,
        }
    }

    fn exited(&self) -> VisualState {
        VisualState {
            opacity: 0.0,
            translate_y: -self.slide_offset,
            scale: self.min_scale,
        }
    }
}

/// Maps scroll progress to a visual state per scene: slide up, hold, slide away.
///
/// Each scene is a four-point keyframe track (pre-enter, enter, exit,
/// post-exit). The first scene has no pre-enter point so it is already held
/// when the stage pins, and the last scene finishes exiting at the upper bound
/// of the active range.
#[derive(Clone, Debug)]
pub struct Sequencer {
    layout: SceneLayout,
    motion: SceneMotion,
    tracks: Vec<KeyframeTrack<VisualState>>,
}

impl Sequencer {
    pub fn new(layout: SceneLayout, motion: SceneMotion) -> Result<Self, MotionError> {
        let last = layout.len() - 1;

        let tracks = layout
            .scenes()
            .iter()
            .map(|scene| {
                let mut keyframes = Vec::with_capacity(4);
                if scene.index > 0 {
                    keyframes.push(Keyframe::new(scene.pre_enter(), motion.entering()));
                }
                keyframes.push(Keyframe::new(scene.enter, VisualState::HELD));
                keyframes.push(Keyframe::new(scene.exit, VisualState::HELD));

                let post_exit = if scene.index == last {
                    scene.end
                } else {
                    scene.post_exit()
                };
                keyframes.push(Keyframe::new(post_exit, motion.exited()));

                KeyframeTrack::new(keyframes)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            layout,
            motion,
            tracks,
        })
    }

    pub fn layout(&self) -> &SceneLayout {
        &self.layout
    }

    pub fn motion(&self) -> SceneMotion {
        self.motion
    }

    pub fn scene_count(&self) -> usize {
        self.tracks.len()
    }

    pub fn state(&self, index: usize, progress: impl Into<ScrollProgress>) -> Option<VisualState> {
        let progress = progress.into().value();
        self.tracks.get(index).map(|track| track.sample(progress))
    }

    pub fn states(&self, progress: impl Into<ScrollProgress>) -> Vec<VisualState> {
        let progress = progress.into().value();
        self.tracks
            .iter()
            .map(|track| track.sample(progress))
            .collect()
    }

    /// Scene with the highest opacity, earlier scene on ties. `None` once
    /// every scene has exited.
    pub fn active_scene(&self, progress: impl Into<ScrollProgress>) -> Option<usize> {
        let mut active: Option<(usize, f32)> = None;

        for (index, state) in self.states(progress).iter().enumerate() {
            if !state.is_visible() {
                continue;
            }
            match active {
                Some((_, best)) if best >= state.opacity => {}
                _ => active = Some((index, state.opacity)),
            }
        }

        active.map(|(index, _)| index)
    }
}
