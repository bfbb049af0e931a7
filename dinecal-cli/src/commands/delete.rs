use anyhow::Result;
use dialoguer::Confirm;
use dinecal_core::EventId;
use owo_colors::OwoColorize;

use crate::client::Client;
use crate::commands::report;
use crate::render::render_detail;
use crate::utils::tui::{stdin_is_interactive, with_spinner};
use crate::view_model::ViewModel;

pub async fn run(vm: &mut ViewModel<Client>, id: EventId, yes: bool) -> Result<()> {
    let outcome = with_spinner("Loading events", vm.load()).await;
    report(vm, outcome)?;

    vm.select_entry(&id)?;

    if !yes {
        if !stdin_is_interactive() {
            anyhow::bail!("Refusing to delete without confirmation. Pass --yes to skip the prompt.");
        }

        if let Some(entry) = vm.selection() {
            println!("{}", render_detail(entry, None));
            println!();
        }

        let confirmed = Confirm::new()
            .with_prompt("  Delete this event?")
            .default(false)
            .interact()?;

        if !confirmed {
            vm.close()?;
            println!("{}", "  Nothing deleted".dimmed());
            return Ok(());
        }
    }

    let outcome = with_spinner("Deleting", vm.delete_selected()).await?;
    report(vm, outcome)
}
