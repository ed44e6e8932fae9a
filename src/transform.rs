use std::f32::consts::PI;

use cgmath::{Matrix4, Rad, Vector2, Vector3};
use serde::{Deserialize, Serialize};

use crate::animations::{lerp, Interpolate};

/// Position, rotation and uniform scale of a pinned graphic.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transform {
    /// Offset in css pixels from the element's resting position
    pub position: Vector2<f32>,
    pub rotation: f32, // stored as degrees
    pub scale: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vector2::new(0.0, 0.0),
            rotation: 0.0,
            scale: 1.0,
        }
    }
}

impl Transform {
    pub fn new(position: [f32; 2], rotation: f32, scale: f32) -> Self {
        Self {
            position: Vector2::new(position[0], position[1]),
            rotation,
            scale,
        }
    }

    pub fn rotation_radians(&self) -> f32 {
        self.rotation * (PI / 180.0)
    }

    pub fn to_matrix(&self) -> Matrix4<f32> {
        let translation =
            Matrix4::from_translation(Vector3::new(self.position.x, self.position.y, 0.0));
        let rotation =
            Matrix4::from_axis_angle(Vector3::new(0.0, 0.0, 1.0), Rad(self.rotation_radians()));
        let scale = Matrix4::from_scale(self.scale);

        // translation * rotation * scale
        translation * rotation * scale
    }

    /// CSS `transform` value with the same composition order as `to_matrix`.
    pub fn to_css(&self) -> String {
        format!(
            "translate3d({:.2}px, {:.2}px, 0) rotate({:.2}deg) scale({:.4})",
            self.position.x, self.position.y, self.rotation, self.scale
        )
    }
}

impl Interpolate for Transform {
    fn interpolate(&self, other: &Self, t: f32) -> Self {
        Self {
            position: self.position.interpolate(&other.position, t),
            rotation: lerp(self.rotation, other.rotation, t),
            scale: lerp(self.scale, other.scale, t),
        }
    }
}
