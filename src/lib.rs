pub mod animations;
pub mod camera;
pub mod contact;
pub mod content;
pub mod error;
pub mod hub;
pub mod progress;
pub mod scenes;
pub mod sequencer;
pub mod stage;
pub mod transform;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use error::MotionError;
pub use progress::ScrollProgress;
pub use sequencer::{Sequencer, VisualState};
pub use stage::{Stage, StageConfig, StageFrame, StageKind};
