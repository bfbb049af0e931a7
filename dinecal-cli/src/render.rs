//! TUI rendering traits for dinecal types.
//!
//! Extension traits that add colored terminal rendering to dinecal-core
//! types using owo_colors.

use chrono::{Local, NaiveDate, NaiveDateTime};
use dinecal_core::event::parse_timestamp;
use dinecal_core::{CalendarEntry, Category};
use owo_colors::OwoColorize;

use crate::notification::{Level, Notification};

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

impl Render for Notification {
    fn render(&self) -> String {
        match self.level {
            Level::Info => format!("  {}", self.message.green()),
            Level::Error => format!("  {}", self.message.red()),
        }
    }
}

impl Render for Category {
    fn render(&self) -> String {
        format!("[{}]", self.label()).cyan().to_string()
    }
}

/// One line in the day-grouped list.
impl Render for CalendarEntry {
    fn render(&self) -> String {
        let time = match parse_timestamp(&self.start) {
            Ok(dt) => dt.format("%H:%M").to_string(),
            Err(_) => self.start.clone(),
        };
        let id = format!("#{}", self.id);

        let mut line = format!("  {:>5} {}", time, self.title);
        if let Some(category) = &self.extended_props.category {
            line.push(' ');
            line.push_str(&category.render());
        }
        if !self.extended_props.location.is_empty() {
            line.push_str(&format!(" @ {}", self.extended_props.location).dimmed().to_string());
        }
        format!("{} {}", line, id.dimmed())
    }
}

/// Start date of an entry, if its timestamp parses.
pub fn entry_date(entry: &CalendarEntry) -> Option<NaiveDate> {
    parse_timestamp(&entry.start).ok().map(|dt| dt.date())
}

/// Entries grouped under day headings, in start order.
pub fn render_entry_list(entries: &[&CalendarEntry]) -> String {
    if entries.is_empty() {
        return "No events found".dimmed().to_string();
    }

    let mut sorted: Vec<&CalendarEntry> = entries.to_vec();
    sorted.sort_by(|a, b| a.start.cmp(&b.start));

    let mut lines = Vec::new();
    let mut current_label: Option<String> = None;

    for entry in sorted {
        let label = match entry_date(entry) {
            Some(date) => format_date_label(date),
            None => entry.start.clone(),
        };

        if current_label.as_ref() != Some(&label) {
            if current_label.is_some() {
                lines.push(String::new());
            }
            lines.push(label.bold().to_string());
            current_label = Some(label);
        }

        lines.push(entry.render());
    }

    lines.join("\n")
}

/// Detail view for a selected entry. `image_url` is the resolved address
/// of the entry's image, if it has one.
pub fn render_detail(entry: &CalendarEntry, image_url: Option<&str>) -> String {
    let props = &entry.extended_props;
    let mut lines = vec![
        entry.title.bold().to_string(),
        field("When", &format_range(&entry.start, entry.end.as_deref())),
    ];

    if !props.location.is_empty() {
        lines.push(field("Where", &props.location));
    }
    if let Some(category) = &props.category {
        lines.push(field("Category", category.label()));
    }
    if !props.participants.is_empty() {
        lines.push(field("Participants", &props.participants.join(", ")));
    }
    lines.push(field("Cost", &format_cost(props.cost_total)));
    lines.push(field("Rating", &format_rating(props.rating)));
    if !props.tags.is_empty() {
        lines.push(field("Tags", &props.tags.join(", ")));
    }
    if !props.notes.is_empty() {
        lines.push(field("Notes", &props.notes));
    }
    if let Some(url) = image_url {
        lines.push(field("Image", url));
    }
    lines.push(field("Id", &entry.id.to_string()));

    lines.join("\n")
}

fn field(name: &str, value: &str) -> String {
    format!("  {} {}", format!("{:<13}", format!("{}:", name)).dimmed(), value)
}

fn format_range(start: &str, end: Option<&str>) -> String {
    let start_dt = parse_timestamp(start).ok();
    let start_str = start_dt
        .map(|dt| dt.format("%a %b %-d %Y, %H:%M").to_string())
        .unwrap_or_else(|| start.to_string());

    let Some(end) = end else {
        return start_str;
    };

    match (start_dt, parse_timestamp(end).ok()) {
        (Some(s), Some(e)) if s.date() == e.date() => {
            format!("{} – {}", start_str, e.format("%H:%M"))
        }
        (_, Some(e)) => format!("{} – {}", start_str, format_full(e)),
        (_, None) => format!("{} – {}", start_str, end),
    }
}

fn format_full(dt: NaiveDateTime) -> String {
    dt.format("%a %b %-d %Y, %H:%M").to_string()
}

fn format_cost(cost: f64) -> String {
    format!("{:.2}", cost)
}

/// Stars for 1–5, "not rated" otherwise.
fn format_rating(rating: i32) -> String {
    match rating {
        1..=5 => {
            let filled = "★".repeat(rating as usize);
            let empty = "☆".repeat(5 - rating as usize);
            format!("{}{}", filled.yellow(), empty.dimmed())
        }
        _ => "not rated".dimmed().to_string(),
    }
}

/// Format a date as a human-readable label (e.g. "Today", "Tomorrow", "Wed May 1")
fn format_date_label(date: NaiveDate) -> String {
    let today = Local::now().date_naive();

    match (date - today).num_days() {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        _ => date.format("%a %b %-d %Y").to_string(),
    }
}
