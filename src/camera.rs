use cgmath::{Vector2, Vector3};
use serde::{Deserialize, Serialize};

use crate::animations::{Easing, Keyframe, KeyframeTrack};
use crate::error::MotionError;
use crate::progress::ScrollProgress;
use crate::scenes::ActiveRange;

/// Geometry of the portfolio tunnel, in css pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TunnelSettings {
    /// Depth between consecutive items
    pub spacing: f32,
    /// Css perspective distance
    pub focal_length: f32,
    /// Items further than this are fully transparent
    pub fade_distance: f32,
    /// Items alternate left and right of centre by this much
    pub lateral_offset: f32,
}

impl Default for TunnelSettings {
    fn default() -> Self {
        Self {
            spacing: 600.0,
            focal_length: 1000.0,
            fade_distance: 2400.0,
            lateral_offset: 320.0,
        }
    }
}

impl TunnelSettings {
    fn validate(&self) -> Result<(), MotionError> {
        if !(self.spacing > 0.0) {
            return Err(MotionError::InvalidCamera("spacing must be positive"));
        }
        if !(self.focal_length > self.spacing) {
            return Err(MotionError::InvalidCamera(
                "focal length must exceed item spacing",
            ));
        }
        if !(self.fade_distance > self.spacing) {
            return Err(MotionError::InvalidCamera(
                "fade distance must exceed item spacing",
            ));
        }
        Ok(())
    }
}

/// Where one tunnel item sits relative to the camera.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct TunnelItemState {
    /// Distance in front of the camera; negative once the camera has passed it
    pub distance: f32,
    pub scale: f32,
    pub opacity: f32,
    /// Projected offset from the viewport centre
    pub screen_offset: Vector2<f32>,
    pub visible: bool,
}

impl TunnelItemState {
    /// CSS `transform` for an element inside a container with
    /// `perspective: focal_length`.
    pub fn css_transform(&self, world: Vector3<f32>) -> String {
        format!(
            "translate3d({:.2}px, {:.2}px, {:.2}px)",
            world.x, world.y, -self.distance
        )
    }
}

/// Camera flying down a line of items as progress advances.
#[derive(Clone, Debug, Serialize)]
pub struct TunnelCamera {
    pub depth: KeyframeTrack<f32>,
    pub settings: TunnelSettings,
}

impl TunnelCamera {
    pub fn new(depth: KeyframeTrack<f32>, settings: TunnelSettings) -> Result<Self, MotionError> {
        settings.validate()?;
        Ok(Self { depth, settings })
    }

    /// Camera that reaches the last of `count` items as progress reaches the
    /// upper bound of `range`.
    pub fn for_items(
        count: usize,
        range: ActiveRange,
        settings: TunnelSettings,
    ) -> Result<Self, MotionError> {
        let last_depth = count.saturating_sub(1) as f32 * settings.spacing;
        let depth = KeyframeTrack::new(vec![
            Keyframe::new(range.lower, 0.0).with_easing(Easing::EaseInOut),
            Keyframe::new(range.upper, last_depth),
        ])?;

        Self::new(depth, settings)
    }

    /// World position of item `index`: alternating sides, one spacing deeper each.
    pub fn item_position(&self, index: usize) -> Vector3<f32> {
        let side = if index % 2 == 0 { -1.0 } else { 1.0 };
        Vector3::new(
            side * self.settings.lateral_offset,
            0.0,
            index as f32 * self.settings.spacing,
        )
    }

    pub fn camera_depth(&self, progress: impl Into<ScrollProgress>) -> f32 {
        self.depth.sample(progress.into().value())
    }

    pub fn project(&self, index: usize, progress: impl Into<ScrollProgress>) -> TunnelItemState {
        let camera = self.camera_depth(progress);
        let world = self.item_position(index);
        let distance = world.z - camera;
        let TunnelSettings {
            spacing,
            focal_length,
            fade_distance,
            ..
        } = self.settings;

        let opacity = if distance >= 0.0 {
            // fade in over the last spacing before the far limit
            ((fade_distance - distance) / spacing).clamp(0.0, 1.0)
        } else {
            // passed items fade out within one spacing behind the camera
            (1.0 + distance / spacing).clamp(0.0, 1.0)
        };

        let visible = opacity > 0.0;
        let scale = if visible {
            focal_length / (focal_length + distance)
        } else {
            0.0
        };

        TunnelItemState {
            distance,
            scale,
            opacity,
            screen_offset: Vector2::new(world.x, world.y) * scale,
            visible,
        }
    }

    pub fn project_all(
        &self,
        count: usize,
        progress: impl Into<ScrollProgress>,
    ) -> Vec<TunnelItemState> {
        let progress = progress.into();
        (0..count).map(|index| self.project(index, progress)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera(count: usize) -> TunnelCamera {
        TunnelCamera::for_items(
            count,
            ActiveRange::new(0.0, 1.0).unwrap(),
            TunnelSettings::default(),
        )
        .unwrap()
    }

    #[test]
    fn camera_travels_to_last_item() {
        let cam = camera(5);
        assert_eq!(cam.camera_depth(0.0), 0.0);
        assert_eq!(cam.camera_depth(0.5), 1200.0);
        assert_eq!(cam.camera_depth(1.0), 2400.0);
    }

    #[test]
    fn item_at_camera_is_full_size() {
        let cam = camera(5);
        let front = cam.project(0, 0.0);

        assert_eq!(front.distance, 0.0);
        assert_eq!(front.scale, 1.0);
        assert_eq!(front.opacity, 1.0);
        assert_eq!(front.screen_offset, Vector2::new(-320.0, 0.0));
    }

    #[test]
    fn distant_items_shrink_and_fade() {
        let cam = camera(6);
        let states = cam.project_all(6, 0.0);

        // 600px away with a 1000px focal length
        assert!((states[1].scale - 0.625).abs() < 1e-6);
        assert_eq!(states[3].opacity, 1.0);
        assert!((states[3].distance - 1800.0).abs() < 1e-3);
        assert_eq!(states[4].opacity, 0.0);
        assert!(!states[5].visible);
        assert_eq!(states[5].scale, 0.0);
    }

    #[test]
    fn passed_items_grow_then_disappear() {
        let cam = camera(5);
        // eased depth at 0.25 is 300, so item 0 is 300px behind
        let passed = cam.project(0, 0.25);

        assert_eq!(passed.distance, -300.0);
        assert!(passed.scale > 1.0);
        assert_eq!(passed.opacity, 0.5);

        // camera at 1200: items 0 and 1 are a full spacing or more behind
        assert!(!cam.project(0, 0.5).visible);
        assert!(!cam.project(1, 0.5).visible);
        assert!(cam.project(2, 0.5).visible);
    }

    #[test]
    fn rejects_degenerate_geometry() {
        let range = ActiveRange::default();
        let flat = TunnelSettings {
            spacing: 0.0,
            ..TunnelSettings::default()
        };
        assert!(TunnelCamera::for_items(3, range, flat).is_err());

        let short_focal = TunnelSettings {
            focal_length: 100.0,
            ..TunnelSettings::default()
        };
        assert!(matches!(
            TunnelCamera::for_items(3, range, short_focal),
            Err(MotionError::InvalidCamera(_))
        ));
    }

    #[test]
    fn css_transform_pushes_item_back_by_distance() {
        let cam = camera(3);
        let state = cam.project(2, 0.0);
        assert_eq!(
            state.css_transform(cam.item_position(2)),
            "translate3d(-320.00px, 0.00px, -1200.00px)"
        );
    }
}
