use anyhow::{Context, Result};
use chrono::NaiveDate;

use crate::client::EventsApi;
use crate::commands::report;
use crate::render::{entry_date, render_entry_list};
use crate::utils::tui::with_spinner;
use crate::view_model::ViewModel;

pub async fn run<A: EventsApi>(
    vm: &mut ViewModel<A>,
    from: Option<String>,
    to: Option<String>,
) -> Result<()> {
    let from = from.as_deref().map(parse_date).transpose()?;
    let to = to.as_deref().map(parse_date).transpose()?;

    let outcome = with_spinner("Loading events", vm.load()).await;
    report(vm, outcome)?;

    let visible: Vec<_> = vm
        .entries()
        .iter()
        .filter(|entry| match entry_date(entry) {
            Some(date) => from.is_none_or(|f| date >= f) && to.is_none_or(|t| date <= t),
            // Entries with unreadable dates only show in unfiltered listings
            None => from.is_none() && to.is_none(),
        })
        .collect();

    println!("{}", render_entry_list(&visible));

    Ok(())
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid date \"{}\" (expected YYYY-MM-DD)", s))
}
