//! Event records as stored and served by the API.
//!
//! The wire shape is plain JSON with snake_case fields. Every field except
//! `title` and `date` has a default, so records written before `category`
//! and `end_datetime` existed still deserialize.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{DineCalError, DineCalResult};

/// Timestamp layouts accepted for `date` / `end_datetime`.
const TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"];

/// Highest accepted rating. 0 means "not rated".
pub const MAX_RATING: i32 = 5;

/// Server-assigned event identifier.
///
/// Opaque to clients: the reference server hands out integers, but any
/// string id is carried through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventId {
    Number(i64),
    Text(String),
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventId::Number(n) => write!(f, "{}", n),
            EventId::Text(s) => f.write_str(s),
        }
    }
}

impl FromStr for EventId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Ok(match s.parse::<i64>() {
            Ok(n) => EventId::Number(n),
            Err(_) => EventId::Text(s.to_string()),
        })
    }
}

impl From<i64> for EventId {
    fn from(n: i64) -> Self {
        EventId::Number(n)
    }
}

/// Kind of gathering. The known kinds serialize to the labels the web form
/// offered; anything else is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    /// 聚餐
    Dinner,
    /// 团建
    TeamBuilding,
    /// 路演
    Roadshow,
    /// 小聚
    Meetup,
    Other(String),
}

impl Category {
    pub const KNOWN: [Category; 4] = [
        Category::Dinner,
        Category::TeamBuilding,
        Category::Roadshow,
        Category::Meetup,
    ];

    /// Wire label for this category.
    pub fn label(&self) -> &str {
        match self {
            Category::Dinner => "聚餐",
            Category::TeamBuilding => "团建",
            Category::Roadshow => "路演",
            Category::Meetup => "小聚",
            Category::Other(s) => s,
        }
    }

    /// Interpret typed input: the wire labels plus English names such as
    /// `dinner` or `team-building`, matched case-insensitively. Anything
    /// else becomes `Other` with surrounding whitespace removed.
    pub fn parse_alias(input: &str) -> Category {
        let trimmed = input.trim();
        match trimmed.to_lowercase().as_str() {
            "聚餐" | "dinner" => Category::Dinner,
            "团建" | "team-building" | "teambuilding" | "team_building" => Category::TeamBuilding,
            "路演" | "roadshow" => Category::Roadshow,
            "小聚" | "meetup" => Category::Meetup,
            _ => Category::Other(trimmed.to_string()),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<String> for Category {
    fn from(s: String) -> Self {
        match s.as_str() {
            "聚餐" => Category::Dinner,
            "团建" => Category::TeamBuilding,
            "路演" => Category::Roadshow,
            "小聚" => Category::Meetup,
            _ => Category::Other(s),
        }
    }
}

impl From<Category> for String {
    fn from(c: Category) -> Self {
        c.label().to_string()
    }
}

/// One scheduled gathering, in the shape the API stores and returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Absent until the server assigns one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EventId>,
    pub title: String,
    #[serde(default)]
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default)]
    pub participants: Vec<String>,
    #[serde(default)]
    pub cost_total: f64,
    #[serde(default)]
    pub rating: i32,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub notes: String,
    /// Start timestamp, `YYYY-MM-DDTHH:MM`.
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_datetime: Option<String>,
    #[serde(default)]
    pub image_path: Option<String>,
}

impl EventRecord {
    pub fn new(title: impl Into<String>, date: impl Into<String>) -> Self {
        EventRecord {
            id: None,
            title: title.into(),
            location: String::new(),
            category: None,
            participants: Vec::new(),
            cost_total: 0.0,
            rating: 0,
            tags: Vec::new(),
            notes: String::new(),
            date: date.into(),
            end_datetime: None,
            image_path: None,
        }
    }

    /// Check the fields the server refuses to store.
    pub fn validate(&self) -> DineCalResult<()> {
        if self.title.trim().is_empty() {
            return Err(DineCalError::Validation("title must not be empty".into()));
        }

        if !(0..=MAX_RATING).contains(&self.rating) {
            return Err(DineCalError::Validation(format!(
                "rating must be between 0 and {} (0 = unrated)",
                MAX_RATING
            )));
        }

        if !self.cost_total.is_finite() || self.cost_total < 0.0 {
            return Err(DineCalError::Validation(
                "cost_total must be a non-negative number".into(),
            ));
        }

        let start = parse_timestamp(&self.date)?;

        if let Some(end) = &self.end_datetime {
            let end = parse_timestamp(end)?;
            if end < start {
                return Err(DineCalError::Validation(
                    "end_datetime must not be before date".into(),
                ));
            }
        }

        Ok(())
    }
}

/// Partial update for an existing record. Absent fields are left alone;
/// an explicit `null` clears an optional field.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventUpdate {
    pub title: Option<String>,
    pub location: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub category: Option<Option<Category>>,
    pub participants: Option<Vec<String>>,
    pub cost_total: Option<f64>,
    pub rating: Option<i32>,
    pub tags: Option<Vec<String>>,
    pub notes: Option<String>,
    pub date: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub end_datetime: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub image_path: Option<Option<String>>,
}

impl EventUpdate {
    pub fn apply_to(self, record: &mut EventRecord) {
        if let Some(v) = self.title {
            record.title = v;
        }
        if let Some(v) = self.location {
            record.location = v;
        }
        if let Some(v) = self.category {
            record.category = v;
        }
        if let Some(v) = self.participants {
            record.participants = v;
        }
        if let Some(v) = self.cost_total {
            record.cost_total = v;
        }
        if let Some(v) = self.rating {
            record.rating = v;
        }
        if let Some(v) = self.tags {
            record.tags = v;
        }
        if let Some(v) = self.notes {
            record.notes = v;
        }
        if let Some(v) = self.date {
            record.date = v;
        }
        if let Some(v) = self.end_datetime {
            record.end_datetime = v;
        }
        if let Some(v) = self.image_path {
            record.image_path = v;
        }
    }
}

fn double_option<'de, D, T>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

/// Parse a combined date+time string (`2024-05-01T18:00`, seconds optional).
pub fn parse_timestamp(s: &str) -> DineCalResult<NaiveDateTime> {
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .ok_or_else(|| DineCalError::InvalidTimestamp(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn record_defaults_missing_fields() {
        let record: EventRecord = serde_json::from_value(json!({
            "id": 3,
            "title": "Hotpot",
            "date": "2024-05-01T18:00"
        }))
        .unwrap();

        assert_eq!(record.id, Some(EventId::Number(3)));
        assert!(record.participants.is_empty());
        assert_eq!(record.cost_total, 0.0);
        assert_eq!(record.rating, 0);
        assert!(record.category.is_none());
        assert!(record.end_datetime.is_none());
    }

    #[test]
    fn event_id_accepts_numbers_and_strings() {
        let n: EventId = serde_json::from_value(json!(7)).unwrap();
        let s: EventId = serde_json::from_value(json!("abc-1")).unwrap();
        assert_eq!(n, EventId::Number(7));
        assert_eq!(s, EventId::Text("abc-1".into()));
        assert_eq!("42".parse::<EventId>().unwrap(), EventId::Number(42));
        assert_eq!(n.to_string(), "7");
    }

    #[test]
    fn category_labels_and_aliases() {
        assert_eq!(Category::from("团建".to_string()), Category::TeamBuilding);
        assert_eq!(
            Category::from("karaoke".to_string()),
            Category::Other("karaoke".into())
        );
        assert_eq!(serde_json::to_value(Category::Roadshow).unwrap(), json!("路演"));

        assert_eq!(Category::parse_alias(" Dinner "), Category::Dinner);
        assert_eq!(Category::parse_alias("TEAM-BUILDING"), Category::TeamBuilding);
        assert_eq!(
            Category::parse_alias(" karaoke "),
            Category::Other("karaoke".into())
        );
    }

    #[test]
    fn stored_category_round_trips_verbatim() {
        for raw in ["Dinner", "meetup", " 聚餐 ", "karaoke"] {
            let record: EventRecord = serde_json::from_value(json!({
                "title": "Hotpot",
                "date": "2024-05-01T18:00",
                "category": raw,
            }))
            .unwrap();
            let back = serde_json::to_value(&record).unwrap();
            assert_eq!(back["category"], json!(raw));
        }
    }

    #[test]
    fn rating_error_mentions_unrated() {
        let mut record = EventRecord::new("Hotpot", "2024-05-01T18:00");
        record.rating = -1;
        let err = record.validate().unwrap_err();
        assert!(err.to_string().contains("between 0 and 5 (0 = unrated)"));
    }

    #[test]
    fn validate_rejects_blank_title() {
        let record = EventRecord::new("  ", "2024-05-01T18:00");
        let err = record.validate().unwrap_err();
        assert_eq!(err.to_string(), "title must not be empty");
    }

    #[test]
    fn validate_rejects_end_before_start() {
        let mut record = EventRecord::new("Hotpot", "2024-05-01T18:00");
        record.end_datetime = Some("2024-05-01T17:00".into());
        assert!(record.validate().is_err());

        record.end_datetime = Some("2024-05-01T20:00".into());
        assert!(record.validate().is_ok());
    }

    #[test]
    fn validate_rejects_out_of_range_rating() {
        let mut record = EventRecord::new("Hotpot", "2024-05-01T18:00");
        record.rating = 6;
        assert!(record.validate().is_err());
        record.rating = 0;
        assert!(record.validate().is_ok());
    }

    #[test]
    fn timestamp_seconds_optional() {
        assert!(parse_timestamp("2024-05-01T18:00").is_ok());
        assert!(parse_timestamp("2024-05-01T18:00:30").is_ok());
        assert!(parse_timestamp("2024-05-01").is_err());
    }

    #[test]
    fn update_distinguishes_null_from_absent() {
        let mut record = EventRecord::new("Hotpot", "2024-05-01T18:00");
        record.image_path = Some("uploads/a.png".into());
        record.category = Some(Category::Dinner);

        let update: EventUpdate = serde_json::from_value(json!({
            "title": "Hotpot night",
            "image_path": null
        }))
        .unwrap();
        update.apply_to(&mut record);

        assert_eq!(record.title, "Hotpot night");
        assert_eq!(record.image_path, None);
        assert_eq!(record.category, Some(Category::Dinner));
    }
}
