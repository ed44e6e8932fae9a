use serde::{Deserialize, Serialize};

use crate::error::MotionError;

/// One content block's share of the active progress range.
///
/// `start < enter < exit < end` always holds. The blend windows extend one
/// blend width outside the segment (`pre_enter`, `post_exit`) so neighbouring
/// scenes overlap for exactly one shared window.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Scene {
    pub index: usize,
    pub start: f32,
    pub enter: f32,
    pub exit: f32,
    pub end: f32,
    pub blend_width: f32,
}

impl Scene {
    pub fn pre_enter(&self) -> f32 {
        self.start - self.blend_width
    }

    pub fn post_exit(&self) -> f32 {
        self.end + self.blend_width
    }

    pub fn contains(&self, progress: f32) -> bool {
        progress >= self.start && progress < self.end
    }

    /// Middle of the held portion.
    pub fn focus(&self) -> f32 {
        (self.enter + self.exit) / 2.0
    }
}

/// Inclusive progress bounds that the scenes divide between them.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActiveRange {
    pub lower: f32,
    pub upper: f32,
}

impl ActiveRange {
    pub fn new(lower: f32, upper: f32) -> Result<Self, MotionError> {
        let range = Self { lower, upper };
        range.validate()?;
        Ok(range)
    }

    pub fn validate(&self) -> Result<(), MotionError> {
        let ordered = self.lower >= 0.0 && self.upper <= 1.0 && self.lower < self.upper;
        if !ordered {
            return Err(MotionError::InvalidRange {
                lower: self.lower,
                upper: self.upper,
            });
        }
        Ok(())
    }

    pub fn span(&self) -> f32 {
        self.upper - self.lower
    }
}

impl Default for ActiveRange {
    fn default() -> Self {
        Self {
            lower: 0.1,
            upper: 0.95,
        }
    }
}

/// Evenly divided scenes, built once per stage and never mutated.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SceneLayout {
    range: ActiveRange,
    blend_fraction: f32,
    scenes: Vec<Scene>,
}

impl SceneLayout {
    pub fn new(
        scene_count: usize,
        range: ActiveRange,
        blend_fraction: f32,
    ) -> Result<Self, MotionError> {
        if scene_count == 0 {
            return Err(MotionError::NoScenes);
        }
        range.validate()?;
        if !(blend_fraction > 0.0 && blend_fraction < 0.5) {
            return Err(MotionError::InvalidBlend(blend_fraction));
        }

        let segment = range.span() / scene_count as f32;
        let blend_width = segment * blend_fraction;

        let scenes = (0..scene_count)
            .map(|index| {
                let start = range.lower + segment * index as f32;
                // pin the last edge so rounding never leaves a gap before `upper`
                let end = if index + 1 == scene_count {
                    range.upper
                } else {
                    range.lower + segment * (index + 1) as f32
                };

                Scene {
                    index,
                    start,
                    enter: start + blend_width,
                    exit: end - blend_width,
                    end,
                    blend_width,
                }
            })
            .collect();

        Ok(Self {
            range,
            blend_fraction,
            scenes,
        })
    }

    pub fn scenes(&self) -> &[Scene] {
        &self.scenes
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    pub fn range(&self) -> ActiveRange {
        self.range
    }

    pub fn blend_fraction(&self) -> f32 {
        self.blend_fraction
    }

    pub fn scene(&self, index: usize) -> Option<&Scene> {
        self.scenes.get(index)
    }

    /// Index of the segment containing `progress`, clamped to the first and
    /// last scene outside the active range.
    pub fn scene_at(&self, progress: f32) -> usize {
        let last = self.scenes.len() - 1;
        if !(progress > self.range.lower) {
            return 0;
        }

        self.scenes
            .iter()
            .position(|scene| scene.contains(progress))
            .unwrap_or(last)
    }

    /// Progress at which scene `index` is centred in its hold, for scroll-to links.
    pub fn focus_progress(&self, index: usize) -> Option<f32> {
        self.scene(index).map(Scene::focus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn divides_range_evenly() {
        let layout = SceneLayout::new(5, ActiveRange::new(0.1, 0.95).unwrap(), 0.15).unwrap();
        let scenes = layout.scenes();

        assert_eq!(scenes.len(), 5);
        assert!(close(scenes[0].start, 0.1));
        assert!(close(scenes[4].end, 0.95));
        assert!(close(scenes[2].start, 0.44));
        assert!(close(scenes[2].enter, 0.4655));
        assert!(close(scenes[2].exit, 0.5845));
        assert!(close(scenes[2].end, 0.61));
    }

    #[test]
    fn scenes_are_contiguous_and_ordered() {
        for count in 1..12 {
            let layout = SceneLayout::new(count, ActiveRange::default(), 0.2).unwrap();
            for pair in layout.scenes().windows(2) {
                assert_eq!(pair[0].end, pair[1].start);
            }
            for scene in layout.scenes() {
                assert!(scene.start < scene.enter);
                assert!(scene.enter < scene.exit);
                assert!(scene.exit < scene.end);
            }
        }
    }

    #[test]
    fn neighbour_blend_windows_line_up() {
        let layout = SceneLayout::new(3, ActiveRange::new(0.0, 1.0).unwrap(), 0.1).unwrap();
        let scenes = layout.scenes();

        assert!(close(scenes[1].pre_enter(), scenes[0].exit));
        assert!(close(scenes[0].post_exit(), scenes[1].enter));
    }

    #[test]
    fn rejects_bad_parameters() {
        let range = ActiveRange::default();
        assert!(matches!(
            SceneLayout::new(0, range, 0.1),
            Err(MotionError::NoScenes)
        ));
        assert!(matches!(
            SceneLayout::new(3, range, 0.5),
            Err(MotionError::InvalidBlend(_))
        ));
        assert!(matches!(
            SceneLayout::new(3, range, 0.0),
            Err(MotionError::InvalidBlend(_))
        ));
        assert!(matches!(
            ActiveRange::new(0.6, 0.4),
            Err(MotionError::InvalidRange { .. })
        ));
        assert!(ActiveRange::new(-0.1, 0.5).is_err());
        assert!(ActiveRange::new(0.0, 1.2).is_err());
    }

    #[test]
    fn finds_scene_for_progress() {
        let layout = SceneLayout::new(4, ActiveRange::new(0.2, 0.6).unwrap(), 0.1).unwrap();

        assert_eq!(layout.scene_at(0.0), 0);
        assert_eq!(layout.scene_at(0.2), 0);
        assert_eq!(layout.scene_at(0.35), 1);
        assert_eq!(layout.scene_at(0.55), 3);
        assert_eq!(layout.scene_at(0.9), 3);
    }

    #[test]
    fn focus_is_inside_hold() {
        let layout = SceneLayout::new(4, ActiveRange::default(), 0.15).unwrap();
        for (index, scene) in layout.scenes().iter().enumerate() {
            let focus = layout.focus_progress(index).unwrap();
            assert!(focus > scene.enter && focus < scene.exit);
        }
        assert_eq!(layout.focus_progress(9), None);
    }
}
