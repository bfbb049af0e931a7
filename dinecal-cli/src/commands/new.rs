use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use dialoguer::{Input, Select};
use dinecal_core::draft::{DEFAULT_END_TIME, DEFAULT_START_TIME};
use dinecal_core::{Category, Draft};

use crate::client::EventsApi;
use crate::commands::report;
use crate::utils::tui::{stdin_is_interactive, with_spinner};
use crate::view_model::ViewModel;

/// Fields of the create form. Everything except the date is optional and
/// passed through as typed.
#[derive(Args, Debug, Default)]
pub struct NewArgs {
    /// Day of the event (YYYY-MM-DD)
    #[arg(short, long)]
    pub date: String,

    /// Start time (HH:MM)
    #[arg(long, default_value = DEFAULT_START_TIME)]
    pub start_time: String,

    /// End day (YYYY-MM-DD); without it the event has no end
    #[arg(long)]
    pub end_date: Option<String>,

    /// End time (HH:MM), used with --end-date
    #[arg(long, default_value = DEFAULT_END_TIME)]
    pub end_time: String,

    #[arg(short, long)]
    pub title: Option<String>,

    #[arg(short, long)]
    pub location: Option<String>,

    /// 聚餐 / 团建 / 路演 / 小聚 (or dinner, team-building, roadshow, meetup)
    #[arg(short, long)]
    pub category: Option<String>,

    /// Comma-separated names
    #[arg(short, long)]
    pub participants: Option<String>,

    /// Total cost
    #[arg(long)]
    pub cost: Option<String>,

    /// 1-5
    #[arg(short, long)]
    pub rating: Option<String>,

    /// Comma-separated tags
    #[arg(long)]
    pub tags: Option<String>,

    #[arg(short, long)]
    pub notes: Option<String>,

    /// Image file to upload and attach
    #[arg(short, long)]
    pub image: Option<PathBuf>,
}

pub async fn run<A: EventsApi>(vm: &mut ViewModel<A>, args: NewArgs) -> Result<()> {
    let interactive = args.title.is_none() && stdin_is_interactive();

    // The list is what the create form opens on top of
    let outcome = with_spinner("Loading events", vm.load()).await;
    report(vm, outcome)?;

    vm.select_date(args.date.clone())?;

    let title = match args.title.clone() {
        Some(title) => title,
        None if interactive => Input::<String>::new()
            .with_prompt("  Title")
            .interact_text()?,
        None => String::new(),
    };

    let category = match args.category.clone() {
        Some(category) => category,
        None if interactive => prompt_category()?,
        None => String::new(),
    };

    if let Some(draft) = vm.draft_mut() {
        fill_draft(draft, args, title, category);
    }

    let outcome = with_spinner("Saving", vm.submit()).await?;
    report(vm, outcome)
}

/// Copy command-line input into the draft, field by field.
fn fill_draft(draft: &mut Draft, args: NewArgs, title: String, category: String) {
    draft.title = title;
    draft.category = category;
    draft.start_time = args.start_time;
    draft.end_time = args.end_time;
    draft.image = args.image;

    if let Some(v) = args.end_date {
        draft.end_date = v;
    }
    if let Some(v) = args.location {
        draft.location = v;
    }
    if let Some(v) = args.participants {
        draft.participants = v;
    }
    if let Some(v) = args.cost {
        draft.cost_total = v;
    }
    if let Some(v) = args.rating {
        draft.rating = v;
    }
    if let Some(v) = args.tags {
        draft.tags = v;
    }
    if let Some(v) = args.notes {
        draft.notes = v;
    }
}

fn prompt_category() -> Result<String> {
    let mut items = vec!["(none)".to_string()];
    items.extend(Category::KNOWN.iter().map(|c| c.label().to_string()));

    let selection = Select::new()
        .with_prompt("  Category")
        .items(&items)
        .default(0)
        .interact()?;

    Ok(if selection == 0 {
        String::new()
    } else {
        items[selection].clone()
    })
}
