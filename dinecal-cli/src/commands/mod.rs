pub mod delete;
pub mod list;
pub mod new;
pub mod show;

use anyhow::Result;

use crate::client::EventsApi;
use crate::notification::Level;
use crate::render::Render;
use crate::view_model::{Outcome, ViewModel};

/// Print whatever the last action left in the notification slot, and turn a
/// failed action into an error so the process exits non-zero.
pub fn report<A: EventsApi>(vm: &ViewModel<A>, outcome: Outcome) -> Result<()> {
    let notification = vm.notification();

    if outcome == Outcome::Failed {
        let message = notification
            .filter(|n| n.level == Level::Error)
            .map(|n| n.message.clone())
            .unwrap_or_else(|| "Request failed".to_string());
        anyhow::bail!(message);
    }

    if let Some(notification) = notification {
        println!("{}", notification.render());
    }

    Ok(())
}
