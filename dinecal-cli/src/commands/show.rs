use anyhow::Result;
use dinecal_core::EventId;

use crate::client::Client;
use crate::commands::report;
use crate::render::render_detail;
use crate::utils::tui::with_spinner;
use crate::view_model::ViewModel;

pub async fn run(vm: &mut ViewModel<Client>, id: EventId) -> Result<()> {
    let outcome = with_spinner("Loading events", vm.load()).await;
    report(vm, outcome)?;

    vm.select_entry(&id)?;

    if let Some(entry) = vm.selection() {
        let image_url = entry
            .extended_props
            .image_path
            .as_deref()
            .map(|path| vm.api().image_url(path));
        println!("{}", render_detail(entry, image_url.as_deref()));
    }

    vm.close()?;

    Ok(())
}
