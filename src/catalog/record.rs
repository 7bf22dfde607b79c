//! Course records as produced by the catalog scraper.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Identifier joining index positions to catalog records.
pub type CourseId = u64;

/// A course's curriculum, or the scraper's note that none was published.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Curriculum {
    /// Ordered lesson topics.
    Topics(Vec<String>),
    /// Free-text sentinel such as "No curriculum available", shown verbatim.
    Unavailable(String),
}

impl Curriculum {
    /// Render for display: topics comma-separated, sentinel unchanged.
    pub fn display(&self) -> String {
        match self {
            Curriculum::Topics(topics) => topics.join(", "),
            Curriculum::Unavailable(note) => note.clone(),
        }
    }
}

/// A single course in the catalog.
///
/// Every field is optional; placeholders for missing values are chosen
/// where the record is rendered, not here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CourseRecord {
    #[serde(rename = "Course Name", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Short blurb from the listing page.
    #[serde(rename = "Course Details", default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,

    #[serde(rename = "Course Description", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Price per lesson as listed, e.g. "$20" or "Free".
    #[serde(
        rename = "Course Price",
        default,
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub price: Option<String>,

    #[serde(
        rename = "Number of Lessons",
        default,
        deserialize_with = "string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub lessons: Option<String>,

    #[serde(rename = "Course Link", default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,

    #[serde(rename = "Course Curriculum", default, skip_serializing_if = "Option::is_none")]
    pub curriculum: Option<Curriculum>,
}

impl CourseRecord {
    /// Create a record with just a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// Text that represents this course for embedding and as generation context.
    pub fn document_text(&self) -> String {
        format!(
            "Course Name: {}\nDescription: {}\nCurriculum: {}\nPrice: {}",
            self.name.as_deref().unwrap_or_default(),
            self.description.as_deref().unwrap_or_default(),
            self.curriculum.as_ref().map(Curriculum::display).unwrap_or_default(),
            self.price.as_deref().unwrap_or("N/A"),
        )
    }
}

/// Accept a JSON string or number, keeping it as a string.
fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(other) => Some(other.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_scraped_course() {
        let json = r#"{
            "Course Name": "Learn Python",
            "Course Link": "https://brainlox.com/courses/python",
            "Course Details": "Beginner friendly",
            "Course Price": "$20",
            "Number of Lessons": "10",
            "Course Description": "Python from scratch.",
            "Course Curriculum": ["Intro", "Loops"]
        }"#;

        let record: CourseRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.name.as_deref(), Some("Learn Python"));
        assert_eq!(record.lessons.as_deref(), Some("10"));
        assert_eq!(
            record.curriculum,
            Some(Curriculum::Topics(vec!["Intro".to_string(), "Loops".to_string()]))
        );
    }

    #[test]
    fn test_missing_and_sentinel_fields() {
        let json = r#"{
            "Course Name": "Robotics",
            "Number of Lessons": 12,
            "Course Curriculum": "No curriculum available"
        }"#;

        let record: CourseRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.price, None);
        assert_eq!(record.link, None);
        assert_eq!(record.lessons.as_deref(), Some("12"));
        assert_eq!(
            record.curriculum.as_ref().map(Curriculum::display).as_deref(),
            Some("No curriculum available")
        );
    }

    #[test]
    fn test_document_text() {
        let record = CourseRecord {
            name: Some("Data Science".to_string()),
            description: Some("Numbers and models.".to_string()),
            curriculum: Some(Curriculum::Topics(vec![
                "Intro".to_string(),
                "Stats".to_string(),
                "ML".to_string(),
            ])),
            ..Default::default()
        };

        assert_eq!(
            record.document_text(),
            "Course Name: Data Science\nDescription: Numbers and models.\nCurriculum: Intro, Stats, ML\nPrice: N/A"
        );
    }

    #[test]
    fn test_serialize_skips_missing_fields() {
        let json = serde_json::to_value(CourseRecord::named("Chess")).unwrap();
        assert_eq!(json, serde_json::json!({ "Course Name": "Chess" }));
    }
}
