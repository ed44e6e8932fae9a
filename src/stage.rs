use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};
use tracing::debug;

use crate::animations::{Easing, Keyframe, KeyframeTrack};
use crate::camera::{TunnelCamera, TunnelItemState, TunnelSettings};
use crate::content::ContentItem;
use crate::error::MotionError;
use crate::progress::{Region, ScrollProgress};
use crate::scenes::{ActiveRange, SceneLayout};
use crate::sequencer::{SceneMotion, Sequencer, VisualState};
use crate::transform::Transform;

/// The pinned, scroll-driven sections of the site.
#[derive(
    Clone,
    Copy,
    Debug,
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
pub enum StageKind {
    /// Full-page hero with the pinned astronaut graphic
    Hero,
    /// Process steps
    Process,
    /// Portfolio tunnel
    Portfolio,
}

/// Parameters for one stage. Start from `StageConfig::preset`.
#[derive(Clone, Debug, Serialize)]
pub struct StageConfig {
    pub kind: StageKind,
    pub active_range: ActiveRange,
    pub blend_fraction: f32,
    pub motion: SceneMotion,
    /// Keyframes for a pinned graphic that moves across the whole stage
    pub pose: Option<KeyframeTrack<Transform>>,
    pub tunnel: Option<TunnelSettings>,
}

/// Partial config read from json, applied over a preset.
#[derive(Deserialize)]
struct StageOverrides {
    kind: StageKind,
    active_range: Option<ActiveRange>,
    blend_fraction: Option<f32>,
    motion: Option<MotionOverrides>,
    pose: Option<KeyframeTrack<Transform>>,
    tunnel: Option<TunnelOverrides>,
}

#[derive(Deserialize)]
struct MotionOverrides {
    slide_offset: Option<f32>,
    min_scale: Option<f32>,
}

impl MotionOverrides {
    fn apply(self, motion: &mut SceneMotion) {
        if let Some(slide_offset) = self.slide_offset {
            motion.slide_offset = slide_offset;
        }
        if let Some(min_scale) = self.min_scale {
            motion.min_scale = min_scale;
        }
    }
}

#[derive(Deserialize)]
struct TunnelOverrides {
    spacing: Option<f32>,
    focal_length: Option<f32>,
    fade_distance: Option<f32>,
    lateral_offset: Option<f32>,
}

impl TunnelOverrides {
    fn apply(self, tunnel: &mut TunnelSettings) {
        if let Some(spacing) = self.spacing {
            tunnel.spacing = spacing;
        }
        if let Some(focal_length) = self.focal_length {
            tunnel.focal_length = focal_length;
        }
        if let Some(fade_distance) = self.fade_distance {
            tunnel.fade_distance = fade_distance;
        }
        if let Some(lateral_offset) = self.lateral_offset {
            tunnel.lateral_offset = lateral_offset;
        }
    }
}

impl StageConfig {
    pub fn preset(kind: StageKind) -> Self {
        match kind {
            StageKind::Hero => Self {
                kind,
                active_range: ActiveRange {
                    lower: 0.1,
                    upper: 0.95,
                },
                blend_fraction: 0.15,
                motion: SceneMotion {
                    slide_offset: 60.0,
                    min_scale: 0.95,
                },
                pose: astronaut_pose(),
                tunnel: None,
            },
            StageKind::Process => Self {
                kind,
                active_range: ActiveRange {
                    lower: 0.05,
                    upper: 0.95,
                },
                blend_fraction: 0.2,
                motion: SceneMotion {
                    slide_offset: 40.0,
                    min_scale: 0.98,
                },
                pose: None,
                tunnel: None,
            },
            StageKind::Portfolio => Self {
                kind,
                active_range: ActiveRange {
                    lower: 0.05,
                    upper: 1.0,
                },
                blend_fraction: 0.1,
                motion: SceneMotion {
                    slide_offset: 0.0,
                    min_scale: 0.9,
                },
                pose: None,
                tunnel: Some(TunnelSettings::default()),
            },
        }
    }

    /// Reads `{"kind": ..., ...}` and fills anything omitted from the kind's preset.
    pub fn from_json(json: &str) -> Result<Self, MotionError> {
        let overrides: StageOverrides = serde_json::from_str(json)?;
        let mut config = Self::preset(overrides.kind);

        if let Some(range) = overrides.active_range {
            range.validate()?;
            config.active_range = range;
        }
        if let Some(blend_fraction) = overrides.blend_fraction {
            config.blend_fraction = blend_fraction;
        }
        if let Some(motion) = overrides.motion {
            motion.apply(&mut config.motion);
        }
        if overrides.pose.is_some() {
            config.pose = overrides.pose;
        }
        if let Some(tunnel) = overrides.tunnel {
            // kinds without a tunnel start from the default geometry
            let mut settings = config.tunnel.unwrap_or_default();
            tunnel.apply(&mut settings);
            config.tunnel = Some(settings);
        }

        Ok(config)
    }
}

fn astronaut_pose() -> Option<KeyframeTrack<Transform>> {
    let keyframes = vec![
        Keyframe::new(0.0, Transform::new([0.0, 0.0], 0.0, 1.0)).with_easing(Easing::EaseOut),
        Keyframe::new(0.5, Transform::new([-120.0, 80.0], -8.0, 1.15))
            .with_easing(Easing::EaseInOut),
        Keyframe::new(1.0, Transform::new([140.0, -60.0], 12.0, 0.8)),
    ];

    KeyframeTrack::new(keyframes).ok()
}

/// Everything a stage needs to render at one progress value.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StageFrame {
    pub progress: f32,
    /// Introductory header, fading out over the leading margin
    pub intro_opacity: f32,
    /// Exit state, fading in over the trailing margin
    pub outro_opacity: f32,
    pub scenes: Vec<VisualState>,
    pub active: Option<usize>,
    pub pose: Option<Transform>,
    pub tunnel: Vec<TunnelItemState>,
}

/// A sequencer bound to a section's content, plus the section's extras.
#[derive(Clone, Debug)]
pub struct Stage {
    config: StageConfig,
    items: Vec<ContentItem>,
    sequencer: Sequencer,
    tunnel: Option<TunnelCamera>,
}

impl Stage {
    pub fn new(items: Vec<ContentItem>, config: StageConfig) -> Result<Self, MotionError> {
        let layout = SceneLayout::new(items.len(), config.active_range, config.blend_fraction)?;
        let sequencer = Sequencer::new(layout, config.motion)?;
        let tunnel = config
            .tunnel
            .map(|settings| TunnelCamera::for_items(items.len(), config.active_range, settings))
            .transpose()?;

        debug!(
            "built {} stage with {} scenes over [{}, {}]",
            config.kind,
            items.len(),
            config.active_range.lower,
            config.active_range.upper
        );

        Ok(Self {
            config,
            items,
            sequencer,
            tunnel,
        })
    }

    pub fn preset(kind: StageKind, items: Vec<ContentItem>) -> Result<Self, MotionError> {
        Self::new(items, StageConfig::preset(kind))
    }

    pub fn kind(&self) -> StageKind {
        self.config.kind
    }

    pub fn config(&self) -> &StageConfig {
        &self.config
    }

    pub fn items(&self) -> &[ContentItem] {
        &self.items
    }

    pub fn sequencer(&self) -> &Sequencer {
        &self.sequencer
    }

    pub fn tunnel(&self) -> Option<&TunnelCamera> {
        self.tunnel.as_ref()
    }

    pub fn intro_opacity(&self, progress: ScrollProgress) -> f32 {
        let lower = self.config.active_range.lower;
        if lower <= 0.0 {
            return 0.0;
        }
        (1.0 - progress.value() / lower).clamp(0.0, 1.0)
    }

    pub fn outro_opacity(&self, progress: ScrollProgress) -> f32 {
        let upper = self.config.active_range.upper;
        if upper >= 1.0 {
            return 0.0;
        }
        ((progress.value() - upper) / (1.0 - upper)).clamp(0.0, 1.0)
    }

    pub fn frame(&self, progress: impl Into<ScrollProgress>) -> StageFrame {
        let progress = progress.into();

        StageFrame {
            progress: progress.value(),
            intro_opacity: self.intro_opacity(progress),
            outro_opacity: self.outro_opacity(progress),
            scenes: self.sequencer.states(progress),
            active: self.sequencer.active_scene(progress),
            pose: self
                .config
                .pose
                .as_ref()
                .map(|track| track.sample(progress.value())),
            tunnel: self
                .tunnel
                .as_ref()
                .map(|camera| camera.project_all(self.items.len(), progress))
                .unwrap_or_default(),
        }
    }

    /// Document scroll offset that centres scene `index` in its hold.
    pub fn scroll_target(&self, index: usize, region: Region, viewport_height: f64) -> Option<f64> {
        self.sequencer
            .layout()
            .focus_progress(index)
            .map(|progress| region.offset_for(progress, viewport_height))
    }
}
