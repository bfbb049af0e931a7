//! Calendar entries: the view-side projection of event records.

use serde::Serialize;

use crate::event::{Category, EventId, EventRecord};

/// An event record reshaped for display on a calendar.
///
/// `start`/`end` are the record's `date`/`end_datetime`; every other field
/// rides along untouched in `extended_props`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarEntry {
    pub id: EventId,
    pub title: String,
    pub start: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    pub extended_props: EntryProps,
}

/// Fields carried opaquely for the detail view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryProps {
    pub location: String,
    pub category: Option<Category>,
    pub participants: Vec<String>,
    pub cost_total: f64,
    pub rating: i32,
    pub tags: Vec<String>,
    pub notes: String,
    pub image_path: Option<String>,
}

impl CalendarEntry {
    /// Project a record. Returns `None` for records the server has not
    /// assigned an id to, since those cannot be selected or deleted.
    pub fn from_record(record: EventRecord) -> Option<Self> {
        let id = record.id?;

        Some(CalendarEntry {
            id,
            title: record.title,
            start: record.date,
            end: record.end_datetime,
            extended_props: EntryProps {
                location: record.location,
                category: record.category,
                participants: record.participants,
                cost_total: record.cost_total,
                rating: record.rating,
                tags: record.tags,
                notes: record.notes,
                image_path: record.image_path,
            },
        })
    }
}

/// Rebuild the full entry list from a fetched record list, preserving order.
///
/// Returns the entries plus the number of records skipped for lacking an id.
pub fn normalize(records: Vec<EventRecord>) -> (Vec<CalendarEntry>, usize) {
    let total = records.len();
    let entries: Vec<CalendarEntry> = records
        .into_iter()
        .filter_map(CalendarEntry::from_record)
        .collect();
    let skipped = total - entries.len();
    (entries, skipped)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: i64, date: &str, end: Option<&str>) -> EventRecord {
        let mut r = EventRecord::new(format!("Event {}", id), date);
        r.id = Some(EventId::Number(id));
        r.end_datetime = end.map(str::to_string);
        r
    }

    #[test]
    fn projection_renames_timestamps_and_keeps_ids() {
        let records = vec![
            record(1, "2024-05-01T18:00", None),
            record(2, "2024-05-02T12:00", Some("2024-05-02T14:00")),
        ];

        let (entries, skipped) = normalize(records.clone());

        assert_eq!(skipped, 0);
        assert_eq!(entries.len(), records.len());
        for (entry, record) in entries.iter().zip(&records) {
            assert_eq!(Some(&entry.id), record.id.as_ref());
            assert_eq!(entry.start, record.date);
            assert_eq!(entry.end, record.end_datetime);
            assert_eq!(entry.title, record.title);
        }
    }

    #[test]
    fn projection_carries_remaining_fields() {
        let mut r = record(5, "2024-05-01T18:00", None);
        r.location = "Haidilao".into();
        r.category = Some(Category::Dinner);
        r.participants = vec!["Alice".into(), "Bob".into()];
        r.cost_total = 320.5;
        r.rating = 4;
        r.tags = vec!["spicy".into()];
        r.notes = "bring cash".into();
        r.image_path = Some("uploads/x.jpg".into());

        let entry = CalendarEntry::from_record(r).unwrap();
        let props = entry.extended_props;

        assert_eq!(props.location, "Haidilao");
        assert_eq!(props.category, Some(Category::Dinner));
        assert_eq!(props.participants, vec!["Alice", "Bob"]);
        assert_eq!(props.cost_total, 320.5);
        assert_eq!(props.rating, 4);
        assert_eq!(props.tags, vec!["spicy"]);
        assert_eq!(props.notes, "bring cash");
        assert_eq!(props.image_path.as_deref(), Some("uploads/x.jpg"));
    }

    #[test]
    fn records_without_id_are_skipped() {
        let mut orphan = record(9, "2024-05-01T18:00", None);
        orphan.id = None;

        let (entries, skipped) = normalize(vec![record(1, "2024-05-01T18:00", None), orphan]);

        assert_eq!(entries.len(), 1);
        assert_eq!(skipped, 1);
    }
}
