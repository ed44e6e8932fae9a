use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use tracing::debug;

use crate::error::MotionError;
use crate::stage::StageKind;

/// One content block positioned by a stage. The sequencer only places these,
/// it never formats or validates the copy.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Debug, Default)]
#[serde(default)]
pub struct ContentItem {
    pub id: String,
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    pub tags: Vec<String>,
}

impl ContentItem {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Ordered items for each scroll-driven section of the site.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Debug, Default)]
#[serde(default)]
pub struct SiteContent {
    pub hero: Vec<ContentItem>,
    pub process: Vec<ContentItem>,
    pub portfolio: Vec<ContentItem>,
}

impl SiteContent {
    pub fn from_json(json: &str) -> Result<Self, MotionError> {
        let content: SiteContent = serde_json::from_str(json)?;
        debug!(
            "loaded site content: {} hero, {} process, {} portfolio",
            content.hero.len(),
            content.process.len(),
            content.portfolio.len()
        );
        Ok(content)
    }

    pub fn load(path: &Path) -> Result<Self, MotionError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn items(&self, kind: StageKind) -> &[ContentItem] {
        match kind {
            StageKind::Hero => &self.hero,
            StageKind::Process => &self.process,
            StageKind::Portfolio => &self.portfolio,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_partial_content() {
        let content = SiteContent::from_json(
            r#"{
                "process": [
                    {"id": "discover", "title": "Discover", "description": "We listen."},
                    {"id": "design", "title": "Design", "tags": ["ux", "brand"]}
                ]
            }"#,
        )
        .unwrap();

        assert!(content.hero.is_empty());
        assert_eq!(content.items(StageKind::Process).len(), 2);
        assert_eq!(content.process[1].tags, vec!["ux", "brand"]);
        assert_eq!(content.process[1].image, None);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(
            SiteContent::from_json("{\"hero\": 3}"),
            Err(MotionError::Json(_))
        ));
    }

    #[test]
    fn missing_file_is_an_error() {
        let missing = Path::new("does/not/exist/content.json");
        assert!(matches!(SiteContent::load(missing), Err(MotionError::Io(_))));
    }
}
