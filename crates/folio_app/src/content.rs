//! Site content consumed by the animations
//!
//! Only the numbers that drive animation targets are modelled here: skill
//! levels for bar fills and the point cloud, and stat values for counters.
//! Values are clamped where they are used and never validated.

use crate::error::ContentError;
use crate::sections::clamp_percent;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Skill {
    pub name: String,
    /// Proficiency in percent; may be out of range in the source data
    pub value: f32,
    #[serde(default)]
    pub category: String,
}

impl Skill {
    pub fn new(name: impl Into<String>, value: f32, category: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value,
            category: category.into(),
        }
    }

    /// Fill target in [0, 100]
    pub fn percent(&self) -> f32 {
        clamp_percent(self.value)
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Stat {
    pub label: String,
    pub value: f32,
    #[serde(default)]
    pub suffix: String,
}

impl Stat {
    pub fn new(label: impl Into<String>, value: f32, suffix: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value,
            suffix: suffix.into(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SiteContent {
    pub skills: Vec<Skill>,
    pub stats: Vec<Stat>,
}

impl SiteContent {
    pub fn from_json(text: &str) -> Result<Self, ContentError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Distinct categories in first-seen order
    pub fn categories(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for skill in &self.skills {
            if !out.contains(&skill.category.as_str()) {
                out.push(&skill.category);
            }
        }
        out
    }

    /// Built-in content used by the demo and tests
    pub fn sample() -> Self {
        Self {
            skills: vec![
                Skill::new("TypeScript", 92.0, "frontend"),
                Skill::new("React", 90.0, "frontend"),
                Skill::new("CSS", 85.0, "frontend"),
                Skill::new("Node.js", 80.0, "backend"),
                Skill::new("PostgreSQL", 70.0, "backend"),
                Skill::new("Three.js", 65.0, "graphics"),
                Skill::new("GLSL", 55.0, "graphics"),
            ],
            stats: vec![
                Stat::new("Years of experience", 6.0, "+"),
                Stat::new("Projects shipped", 40.0, "+"),
                Stat::new("Client satisfaction", 98.0, "%"),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_defaults() {
        let content = SiteContent::from_json(
            r#"{
                "skills": [
                    {"name": "Rust", "value": 150, "category": "systems"},
                    {"name": "Go", "value": -10}
                ]
            }"#,
        )
        .unwrap();

        assert!(content.stats.is_empty());
        assert_eq!(content.skills[0].percent(), 100.0);
        assert_eq!(content.skills[1].percent(), 0.0);
        assert_eq!(content.skills[1].category, "");
    }

    #[test]
    fn test_invalid_json() {
        let err = SiteContent::from_json("{\"skills\": 3}").unwrap_err();
        assert!(matches!(err, ContentError::Json(_)));
    }

    #[test]
    fn test_categories_in_order() {
        assert_eq!(
            SiteContent::sample().categories(),
            vec!["frontend", "backend", "graphics"]
        );
    }
}
