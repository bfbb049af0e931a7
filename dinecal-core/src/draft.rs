//! Form drafts and their serialization into event records.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DineCalError;
use crate::event::{Category, EventRecord};

pub const DEFAULT_START_TIME: &str = "18:00";
pub const DEFAULT_END_TIME: &str = "20:00";

/// Time used when a date is given with a blank time.
const MIDNIGHT: &str = "00:00";

/// Separator between the parts folded into `notes` by [`SchemaVersion::V1`].
const V1_NOTES_SEPARATOR: &str = " | ";
const V1_CATEGORY_PREFIX: &str = "类型：";
const V1_END_PREFIX: &str = "结束：";

/// How a draft's category and end time are written into a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaVersion {
    /// Category and end time folded into `notes`; neither is sent as a field.
    V1,
    /// Category and end time are first-class fields.
    #[default]
    V2,
}

impl FromStr for SchemaVersion {
    type Err = DineCalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "v1" | "1" => Ok(SchemaVersion::V1),
            "v2" | "2" => Ok(SchemaVersion::V2),
            other => Err(DineCalError::UnknownSchema(other.to_string())),
        }
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaVersion::V1 => f.write_str("v1"),
            SchemaVersion::V2 => f.write_str("v2"),
        }
    }
}

/// Unsaved input from the create form. Every field is raw text, exactly as
/// typed; nothing is validated until [`Draft::to_record`].
#[derive(Debug, Clone, PartialEq)]
pub struct Draft {
    pub title: String,
    pub location: String,
    pub category: String,
    /// Comma-separated.
    pub participants: String,
    pub cost_total: String,
    pub rating: String,
    /// Comma-separated.
    pub tags: String,
    pub notes: String,
    pub date: String,
    pub start_time: String,
    pub end_date: String,
    pub end_time: String,
    /// Local image to upload before the record is created.
    pub image: Option<PathBuf>,
}

impl Default for Draft {
    fn default() -> Self {
        Draft {
            title: String::new(),
            location: String::new(),
            category: String::new(),
            participants: String::new(),
            cost_total: String::new(),
            rating: String::new(),
            tags: String::new(),
            notes: String::new(),
            date: String::new(),
            start_time: DEFAULT_START_TIME.to_string(),
            end_date: String::new(),
            end_time: DEFAULT_END_TIME.to_string(),
            image: None,
        }
    }
}

impl Draft {
    /// Empty draft prefilled with the selected calendar date.
    pub fn for_date(date: impl Into<String>) -> Self {
        Draft {
            date: date.into(),
            ..Draft::default()
        }
    }

    pub fn start_timestamp(&self) -> String {
        combine(&self.date, &self.start_time)
    }

    /// Only present when an end date was entered.
    pub fn end_timestamp(&self) -> Option<String> {
        if self.end_date.trim().is_empty() {
            None
        } else {
            Some(combine(&self.end_date, &self.end_time))
        }
    }

    pub fn category(&self) -> Option<Category> {
        let trimmed = self.category.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Category::parse_alias(trimmed))
        }
    }

    /// Compose the record to send to the API.
    ///
    /// `image_path` is the reference returned by a preceding upload.
    /// Unparsable numbers become 0.
    pub fn to_record(&self, schema: SchemaVersion, image_path: Option<String>) -> EventRecord {
        let end = self.end_timestamp();
        let category = self.category();

        let (category, notes, end_datetime) = match schema {
            SchemaVersion::V1 => {
                let notes = [
                    self.notes.clone(),
                    category
                        .map(|c| format!("{}{}", V1_CATEGORY_PREFIX, c.label()))
                        .unwrap_or_default(),
                    end.map(|e| format!("{}{}", V1_END_PREFIX, e))
                        .unwrap_or_default(),
                ]
                .into_iter()
                .filter(|part| !part.is_empty())
                .collect::<Vec<_>>()
                .join(V1_NOTES_SEPARATOR);
                (None, notes, None)
            }
            SchemaVersion::V2 => (category, self.notes.clone(), end),
        };

        EventRecord {
            id: None,
            title: self.title.clone(),
            location: self.location.clone(),
            category,
            participants: split_list(&self.participants),
            cost_total: parse_cost(&self.cost_total),
            rating: parse_rating(&self.rating),
            tags: split_list(&self.tags),
            notes,
            date: self.start_timestamp(),
            end_datetime,
            image_path,
        }
    }
}

fn combine(date: &str, time: &str) -> String {
    let time = time.trim();
    let time = if time.is_empty() { MIDNIGHT } else { time };
    format!("{}T{}", date.trim(), time)
}

/// Split comma-separated input, trimming each item and dropping empties.
pub fn split_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Leading decimal number of `input` (`"12.5 yuan"` is 12.5). Anything
/// without one, or that overflows to infinity, is 0.
pub fn parse_cost(input: &str) -> f64 {
    decimal_prefix(input.trim())
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Leading integer of `input` (`"4.5"` is 4, `"3stars"` is 3), else 0.
pub fn parse_rating(input: &str) -> i32 {
    integer_prefix(input.trim()).parse::<i32>().unwrap_or(0)
}

fn sign_len(bytes: &[u8]) -> usize {
    usize::from(matches!(bytes.first(), Some(b'+' | b'-')))
}

fn digits_from(bytes: &[u8], start: usize) -> usize {
    bytes[start..].iter().take_while(|b| b.is_ascii_digit()).count()
}

fn integer_prefix(s: &str) -> &str {
    let bytes = s.as_bytes();
    let sign = sign_len(bytes);
    &s[..sign + digits_from(bytes, sign)]
}

fn decimal_prefix(s: &str) -> &str {
    let bytes = s.as_bytes();
    let mut end = sign_len(bytes);

    let whole = digits_from(bytes, end);
    end += whole;

    let mut fraction = 0;
    if bytes.get(end) == Some(&b'.') {
        fraction = digits_from(bytes, end + 1);
        if whole > 0 || fraction > 0 {
            end += 1 + fraction;
        }
    }

    if whole == 0 && fraction == 0 {
        return "";
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let sign = sign_len(&bytes[end + 1..]);
        let exponent = digits_from(bytes, end + 1 + sign);
        if exponent > 0 {
            end += 1 + sign + exponent;
        }
    }

    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn participants_are_trimmed_and_empties_dropped() {
        let draft = Draft {
            participants: "Alice, Bob ,,".into(),
            ..Draft::for_date("2024-05-01")
        };
        let record = draft.to_record(SchemaVersion::V2, None);
        assert_eq!(record.participants, vec!["Alice", "Bob"]);
    }

    #[test]
    fn tags_split_like_participants() {
        assert_eq!(split_list(" spicy ,, late-night "), vec!["spicy", "late-night"]);
        assert!(split_list("").is_empty());
        assert!(split_list(" , ,").is_empty());
    }

    #[test]
    fn unparsable_cost_becomes_zero() {
        let draft = Draft {
            cost_total: "abc".into(),
            ..Draft::for_date("2024-05-01")
        };
        assert_eq!(draft.to_record(SchemaVersion::V2, None).cost_total, 0.0);
        assert_eq!(parse_cost(" 88.5 "), 88.5);
        assert_eq!(parse_cost("NaN"), 0.0);
        assert_eq!(parse_cost("inf"), 0.0);
    }

    #[test]
    fn unparsable_rating_becomes_zero() {
        assert_eq!(parse_rating("4"), 4);
        assert_eq!(parse_rating("four"), 0);
        assert_eq!(parse_rating(""), 0);
    }

    #[test]
    fn numbers_are_read_from_the_leading_prefix() {
        assert_eq!(parse_rating("4.5"), 4);
        assert_eq!(parse_rating(" 3stars"), 3);
        assert_eq!(parse_rating("-2"), -2);
        assert_eq!(parse_rating("abc"), 0);
        assert_eq!(parse_rating("+"), 0);

        assert_eq!(parse_cost("12.5 yuan"), 12.5);
        assert_eq!(parse_cost("1e3x"), 1000.0);
        assert_eq!(parse_cost("7e"), 7.0);
        assert_eq!(parse_cost(".5"), 0.5);
        assert_eq!(parse_cost("5."), 5.0);
        assert_eq!(parse_cost("abc"), 0.0);
        assert_eq!(parse_cost("."), 0.0);
        assert_eq!(parse_cost("1e999"), 0.0);
    }

    #[test]
    fn start_uses_default_time_and_end_is_absent_without_end_date() {
        let draft = Draft::for_date("2024-05-01");
        let record = draft.to_record(SchemaVersion::V2, None);

        assert_eq!(record.date, "2024-05-01T18:00");
        assert_eq!(record.end_datetime, None);
    }

    #[test]
    fn blank_times_default_to_midnight() {
        let draft = Draft {
            start_time: " ".into(),
            end_date: "2024-05-02".into(),
            end_time: String::new(),
            ..Draft::for_date("2024-05-01")
        };

        assert_eq!(draft.start_timestamp(), "2024-05-01T00:00");
        assert_eq!(draft.end_timestamp().as_deref(), Some("2024-05-02T00:00"));
    }

    #[test]
    fn v2_keeps_category_and_end_as_fields() {
        let draft = Draft {
            category: "团建".into(),
            notes: "bring cash".into(),
            end_date: "2024-05-01".into(),
            ..Draft::for_date("2024-05-01")
        };
        let record = draft.to_record(SchemaVersion::V2, Some("uploads/a.png".into()));

        assert_eq!(record.category, Some(Category::TeamBuilding));
        assert_eq!(record.notes, "bring cash");
        assert_eq!(record.end_datetime.as_deref(), Some("2024-05-01T20:00"));
        assert_eq!(record.image_path.as_deref(), Some("uploads/a.png"));
    }

    #[test]
    fn v1_folds_category_and_end_into_notes() {
        let draft = Draft {
            category: "聚餐".into(),
            notes: "bring cash".into(),
            end_date: "2024-05-01".into(),
            ..Draft::for_date("2024-05-01")
        };
        let record = draft.to_record(SchemaVersion::V1, None);

        assert_eq!(record.category, None);
        assert_eq!(record.end_datetime, None);
        assert_eq!(
            record.notes,
            "bring cash | 类型：聚餐 | 结束：2024-05-01T20:00"
        );
    }

    #[test]
    fn v1_omits_empty_note_parts() {
        let draft = Draft {
            category: "小聚".into(),
            ..Draft::for_date("2024-05-01")
        };
        assert_eq!(draft.to_record(SchemaVersion::V1, None).notes, "类型：小聚");
        assert_eq!(
            Draft::for_date("2024-05-01").to_record(SchemaVersion::V1, None).notes,
            ""
        );
    }

    #[test]
    fn schema_version_parses() {
        assert_eq!("v1".parse::<SchemaVersion>().unwrap(), SchemaVersion::V1);
        assert_eq!("V2".parse::<SchemaVersion>().unwrap(), SchemaVersion::V2);
        assert!("v3".parse::<SchemaVersion>().is_err());
    }
}
