//! View state for the calendar: the entry list, which modal is open, and
//! the notification slot.
//!
//! Every remote action follows the same rule: the entry list is only ever
//! replaced by a successful fetch, and any failure ends up in the
//! notification slot instead of being returned.

use std::time::Duration;

use dinecal_core::{CalendarEntry, Draft, EventId, SchemaVersion, normalize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::client::{ApiError, EventsApi};
use crate::notification::{Notification, NotificationSlot};

const LOAD_FAILED: &str = "Failed to load events";
const UPLOAD_FAILED: &str = "Failed to upload image";
const CREATE_FAILED: &str = "Failed to create event";
const DELETE_FAILED: &str = "Failed to delete event";

/// Which modal is open. Exactly one is active at a time.
#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    Idle,
    /// Create form, with the draft being edited.
    Creating { draft: Draft },
    /// Detail view for one entry.
    Viewing { selection: CalendarEntry },
}

impl Mode {
    fn name(&self) -> &'static str {
        match self {
            Mode::Idle => "idle",
            Mode::Creating { .. } => "creating an event",
            Mode::Viewing { .. } => "viewing an event",
        }
    }
}

/// Result of a remote action. Failures have already been reported through
/// the notification slot.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Succeeded,
    Failed,
}

/// Local misuse of the view model (never caused by the server).
#[derive(Debug, Error, PartialEq)]
pub enum ViewError {
    #[error("Cannot {action} while {state}")]
    InvalidState {
        action: &'static str,
        state: &'static str,
    },

    #[error("Event not found: {0}")]
    EntryNotFound(EventId),
}

pub struct ViewModel<A> {
    api: A,
    schema: SchemaVersion,
    entries: Vec<CalendarEntry>,
    mode: Mode,
    notification: NotificationSlot,
}

impl<A: EventsApi> ViewModel<A> {
    pub fn new(api: A, schema: SchemaVersion, notification_ttl: Duration) -> Self {
        ViewModel {
            api,
            schema,
            entries: Vec::new(),
            mode: Mode::Idle,
            notification: NotificationSlot::new(notification_ttl),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn entries(&self) -> &[CalendarEntry] {
        &self.entries
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn draft(&self) -> Option<&Draft> {
        match &self.mode {
            Mode::Creating { draft } => Some(draft),
            _ => None,
        }
    }

    pub fn draft_mut(&mut self) -> Option<&mut Draft> {
        match &mut self.mode {
            Mode::Creating { draft } => Some(draft),
            _ => None,
        }
    }

    pub fn selection(&self) -> Option<&CalendarEntry> {
        match &self.mode {
            Mode::Viewing { selection } => Some(selection),
            _ => None,
        }
    }

    pub fn notification(&self) -> Option<&Notification> {
        self.notification.current()
    }

    /// Fetch every event and rebuild the entry list from scratch.
    /// On failure the previous list stays as it was.
    pub async fn load(&mut self) -> Outcome {
        match self.api.list_events().await {
            Ok(records) => {
                let (entries, skipped) = normalize(records);
                if skipped > 0 {
                    warn!("Skipped {} event(s) without an id", skipped);
                }
                debug!("Loaded {} event(s)", entries.len());
                self.entries = entries;
                Outcome::Succeeded
            }
            Err(e) => {
                self.report(&e, LOAD_FAILED);
                Outcome::Failed
            }
        }
    }

    /// Open the create form for a calendar date.
    pub fn select_date(&mut self, date: impl Into<String>) -> Result<(), ViewError> {
        self.require_idle("open the create form")?;
        self.mode = Mode::Creating {
            draft: Draft::for_date(date),
        };
        Ok(())
    }

    /// Open the detail view for a loaded entry.
    pub fn select_entry(&mut self, id: &EventId) -> Result<(), ViewError> {
        self.require_idle("open an event")?;

        let entry = self
            .entries
            .iter()
            .find(|e| &e.id == id)
            .cloned()
            .ok_or_else(|| ViewError::EntryNotFound(id.clone()))?;

        self.mode = Mode::Viewing { selection: entry };
        Ok(())
    }

    /// Close the create form, discarding the draft.
    pub fn cancel(&mut self) -> Result<(), ViewError> {
        match self.mode {
            Mode::Creating { .. } => {
                self.mode = Mode::Idle;
                Ok(())
            }
            _ => Err(self.invalid("cancel the create form")),
        }
    }

    /// Close the detail view.
    pub fn close(&mut self) -> Result<(), ViewError> {
        match self.mode {
            Mode::Viewing { .. } => {
                self.mode = Mode::Idle;
                Ok(())
            }
            _ => Err(self.invalid("close the detail view")),
        }
    }

    /// Upload the draft's image (if any), create the event, then reload.
    ///
    /// On failure the form stays open with the draft untouched. A failed
    /// upload stops before anything is created.
    pub async fn submit(&mut self) -> Result<Outcome, ViewError> {
        let draft = match &self.mode {
            Mode::Creating { draft } => draft.clone(),
            _ => return Err(self.invalid("submit")),
        };

        let image_path = match &draft.image {
            Some(path) => match self.api.upload_image(path).await {
                Ok(image_path) => {
                    debug!("Uploaded {} as {}", path.display(), image_path);
                    Some(image_path)
                }
                Err(e) => {
                    self.report(&e, UPLOAD_FAILED);
                    return Ok(Outcome::Failed);
                }
            },
            None => None,
        };

        let record = draft.to_record(self.schema, image_path);

        if let Err(e) = self.api.create_event(&record).await {
            self.report(&e, CREATE_FAILED);
            return Ok(Outcome::Failed);
        }

        self.mode = Mode::Idle;
        self.notification.info("Event created");
        let _ = self.load().await;

        Ok(Outcome::Succeeded)
    }

    /// Delete the entry in the detail view, then reload.
    ///
    /// On failure the detail view stays open.
    pub async fn delete_selected(&mut self) -> Result<Outcome, ViewError> {
        let id = match &self.mode {
            Mode::Viewing { selection } => selection.id.clone(),
            _ => return Err(self.invalid("delete")),
        };

        if let Err(e) = self.api.delete_event(&id).await {
            self.report(&e, DELETE_FAILED);
            return Ok(Outcome::Failed);
        }

        self.mode = Mode::Idle;
        self.notification.info("Event deleted");
        let _ = self.load().await;

        Ok(Outcome::Succeeded)
    }

    fn report(&mut self, err: &ApiError, fallback: &str) {
        warn!("{}: {}", fallback, err);
        self.notification.error(err.user_message(fallback));
    }

    fn require_idle(&self, action: &'static str) -> Result<(), ViewError> {
        match self.mode {
            Mode::Idle => Ok(()),
            _ => Err(self.invalid(action)),
        }
    }

    fn invalid(&self, action: &'static str) -> ViewError {
        ViewError::InvalidState {
            action,
            state: self.mode.name(),
        }
    }
}
