use thiserror::Error;

/// Failures while building layouts, tracks and stages. Sampling itself never fails.
#[derive(Debug, Error)]
pub enum MotionError {
    #[error("a stage needs at least one scene")]
    NoScenes,
    #[error("active range [{lower}, {upper}] must satisfy 0 <= lower < upper <= 1")]
    InvalidRange { lower: f32, upper: f32 },
    #[error("blend fraction {0} must be greater than 0 and less than 0.5")]
    InvalidBlend(f32),
    #[error("keyframe track has no keyframes")]
    EmptyTrack,
    #[error("keyframe {index} is not strictly after the previous one")]
    UnorderedKeyframes { index: usize },
    #[error("keyframe {index} has a non-finite progress value")]
    NonFiniteKeyframe { index: usize },
    #[error("invalid tunnel camera: {0}")]
    InvalidCamera(&'static str),
    #[error("failed to parse json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),
}
