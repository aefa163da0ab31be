//! Interaction controller.
//!
//! Owns the item cache, the gallery and the report form state, and turns
//! user actions (load, submit, delete, search) into store calls followed by a
//! re-render. Every method takes `&mut self`, so exactly one action is in
//! progress at a time. Failures are returned to the caller and also recorded
//! as a [`Notice`] for display; none of them leave the cache half-updated.

use crate::models::{DraftForm, FormField, Item, ItemId};
use crate::rendering::{Gallery, LOAD_FAILED_MESSAGE};
use crate::services::{ImageEncoder, ItemCache};
use crate::storage::{ItemStore, SyncMode};
use crate::{Error, Result};

/// Confirmation prompt shown before deleting.
pub const DELETE_PROMPT: &str = "Are you sure you want to delete this item?";

/// Notice shown after a successful report.
pub const REPORT_SUCCESS_MESSAGE: &str = "Item reported successfully!";

/// Notice shown after a successful delete.
pub const DELETE_SUCCESS_MESSAGE: &str = "Item deleted.";

/// Notice shown when the deleted item no longer existed.
pub const ALREADY_REMOVED_MESSAGE: &str = "Item was already removed.";

/// Severity of a [`Notice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    /// Confirmation of a completed action.
    Info,
    /// A failed action.
    Error,
}

/// A user-visible message about the last action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Severity.
    pub level: NoticeLevel,
    /// Message text.
    pub message: String,
}

impl Notice {
    /// Creates an informational notice.
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    /// Creates an error notice.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Where keyboard focus sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    /// The control that opens the report form.
    Trigger,
    /// A field of the report form.
    Field(FormField),
}

/// State of the report form surface.
#[derive(Debug, Clone)]
pub struct ReportSurface {
    open: bool,
    form: DraftForm,
    focus: Focus,
    field_error: Option<(FormField, String)>,
    submitting: bool,
}

impl Default for ReportSurface {
    fn default() -> Self {
        Self {
            open: false,
            form: DraftForm::default(),
            focus: Focus::Trigger,
            field_error: None,
            submitting: false,
        }
    }
}

impl ReportSurface {
    /// Returns true while the form is shown.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.open
    }

    /// Returns true while the form is hidden from assistive technology.
    #[must_use]
    pub const fn is_hidden(&self) -> bool {
        !self.open
    }

    /// Returns true while the form ignores input.
    #[must_use]
    pub const fn is_inert(&self) -> bool {
        !self.open
    }

    /// Returns the current focus.
    #[must_use]
    pub const fn focus(&self) -> Focus {
        self.focus
    }

    /// Returns the form values as typed.
    #[must_use]
    pub const fn form(&self) -> &DraftForm {
        &self.form
    }

    /// Returns the field-level validation error, if any.
    #[must_use]
    pub fn field_error(&self) -> Option<(FormField, &str)> {
        self.field_error
            .as_ref()
            .map(|(field, message)| (*field, message.as_str()))
    }

    /// Returns true when the submit control accepts input.
    #[must_use]
    pub const fn submit_enabled(&self) -> bool {
        !self.submitting
    }
}

/// Disables the submit control until dropped.
struct InFlight<'a>(&'a mut ReportSurface);

impl<'a> InFlight<'a> {
    fn begin(surface: &'a mut ReportSurface) -> Self {
        surface.submitting = true;
        Self(surface)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.submitting = false;
    }
}

/// Result of a delete request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The item was removed.
    Deleted,
    /// The item did not exist any more.
    AlreadyGone,
    /// The user declined the confirmation.
    Cancelled,
}

/// Drives the item board over a store.
#[derive(Debug)]
pub struct Controller<S: ItemStore> {
    store: S,
    cache: ItemCache,
    gallery: Gallery,
    surface: ReportSurface,
    search_term: String,
    notice: Option<Notice>,
    encoder: ImageEncoder,
}

impl<S: ItemStore> Controller<S> {
    /// Creates a controller with an empty cache.
    #[must_use]
    pub fn new(store: S) -> Self {
        Self {
            store,
            cache: ItemCache::new(),
            gallery: Gallery::new(),
            surface: ReportSurface::default(),
            search_term: String::new(),
            notice: None,
            encoder: ImageEncoder::new(),
        }
    }

    /// Uses `encoder` for attached photos.
    #[must_use]
    pub fn with_encoder(mut self, encoder: ImageEncoder) -> Self {
        self.encoder = encoder;
        self
    }

    /// Returns the store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Returns the cache.
    #[must_use]
    pub const fn cache(&self) -> &ItemCache {
        &self.cache
    }

    /// Returns the current rendering.
    #[must_use]
    pub const fn gallery(&self) -> &Gallery {
        &self.gallery
    }

    /// Returns the report form state.
    #[must_use]
    pub const fn surface(&self) -> &ReportSurface {
        &self.surface
    }

    /// Returns the normalized search term.
    #[must_use]
    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    /// Returns the notice from the last action.
    #[must_use]
    pub const fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Takes the notice, clearing it.
    pub const fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    /// Returns the items matching the search term, oldest first.
    #[must_use]
    pub fn visible_items(&self) -> Vec<&Item> {
        self.cache.filter(&self.search_term)
    }

    /// Fetches the item list and renders it.
    ///
    /// On failure the gallery shows the load-failed message and the cache is
    /// left as it was.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FetchFailed`] if the store cannot list items.
    pub async fn load(&mut self) -> Result<()> {
        match self.refresh().await {
            Ok(()) => {
                self.rerender();
                Ok(())
            },
            Err(e) => {
                tracing::warn!(error = %e, "Initial load failed");
                self.gallery.render_error(LOAD_FAILED_MESSAGE);
                self.notice = Some(Notice::error(e.to_string()));
                Err(e)
            },
        }
    }

    /// Shows the report form and focuses its first field.
    pub fn open_report(&mut self) {
        self.surface.open = true;
        self.surface.submitting = false;
        self.surface.field_error = None;
        self.surface.focus = Focus::Field(FormField::Name);
    }

    /// Hides the report form, clears it and returns focus to the trigger.
    pub fn close_report(&mut self) {
        self.surface.open = false;
        self.surface.form = DraftForm::default();
        self.surface.field_error = None;
        self.surface.focus = Focus::Trigger;
    }

    /// Replaces all form values.
    pub fn fill(&mut self, form: DraftForm) {
        self.surface.form = form;
    }

    /// Sets one form value.
    pub fn set_field(&mut self, field: FormField, value: impl Into<String>) {
        self.surface.form.set(field, value);
    }

    /// Submits the report form.
    ///
    /// Validation and image encoding happen before any store call. On
    /// success the form closes and the list is refreshed and re-rendered.
    /// On failure the form stays open with its values intact.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for a missing field,
    /// [`Error::PayloadTooLarge`] or [`Error::EncodingFailed`] for a bad
    /// photo, [`Error::SubmitFailed`] if the store rejects the report, or
    /// [`Error::InvalidInput`] if the form is closed or already submitting.
    pub async fn submit(&mut self) -> Result<Item> {
        if !self.surface.open {
            return Err(Error::InvalidInput("the report form is not open".to_string()));
        }
        if self.surface.submitting {
            return Err(Error::InvalidInput(
                "a report is already being submitted".to_string(),
            ));
        }

        let draft = match self.surface.form.validate() {
            Ok(draft) => draft,
            Err(e) => {
                if let Error::Validation { field, message } = &e {
                    self.surface.field_error = Some((*field, message.clone()));
                    self.surface.focus = Focus::Field(*field);
                }
                self.notice = Some(Notice::error(e.to_string()));
                return Err(e);
            },
        };
        self.surface.field_error = None;

        // Held across encoding and the store call; every return re-enables submit.
        let image_path = self.surface.form.image.clone();
        let in_flight = InFlight::begin(&mut self.surface);

        let draft = match image_path {
            Some(path) => match self.encoder.encode(&path).await {
                Ok(image) => draft.with_image(image),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Image rejected");
                    self.notice = Some(Notice::error(e.to_string()));
                    return Err(e);
                },
            },
            None => draft,
        };

        let created = self.store.create(&draft).await;
        drop(in_flight);

        let item = match created {
            Ok(item) => item,
            Err(e) => {
                tracing::warn!(error = %e, "Report submission failed");
                self.notice = Some(Notice::error(e.to_string()));
                return Err(e);
            },
        };

        self.close_report();
        let synced = match self.store.sync_mode() {
            SyncMode::Refetch => self.refresh_after_mutation().await,
            SyncMode::Direct => {
                if let Err(e) = self.cache.push(item.clone()) {
                    tracing::warn!(error = %e, "Created item already cached");
                }
                true
            },
        };
        self.rerender();
        if synced {
            self.notice = Some(Notice::info(REPORT_SUCCESS_MESSAGE));
        }
        Ok(item)
    }

    /// Deletes an item after `confirm` approves [`DELETE_PROMPT`].
    ///
    /// Deleting an id the store no longer has counts as success.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DeleteFailed`] if the store fails. The cache is left
    /// untouched in that case.
    pub async fn delete(
        &mut self,
        id: &ItemId,
        confirm: impl FnOnce(&str) -> bool,
    ) -> Result<DeleteOutcome> {
        if !confirm(DELETE_PROMPT) {
            return Ok(DeleteOutcome::Cancelled);
        }

        let removed = match self.store.delete(id).await {
            Ok(removed) => removed,
            Err(e) => {
                tracing::warn!(%id, error = %e, "Delete failed");
                self.notice = Some(Notice::error(e.to_string()));
                return Err(e);
            },
        };

        let synced = match self.store.sync_mode() {
            SyncMode::Refetch => self.refresh_after_mutation().await,
            SyncMode::Direct => {
                self.cache.remove(id);
                true
            },
        };
        self.rerender();

        let (outcome, message) = if removed {
            (DeleteOutcome::Deleted, DELETE_SUCCESS_MESSAGE)
        } else {
            (DeleteOutcome::AlreadyGone, ALREADY_REMOVED_MESSAGE)
        };
        if synced {
            self.notice = Some(Notice::info(message));
        }
        Ok(outcome)
    }

    /// Filters the rendered list by `term`. No I/O.
    ///
    /// The term is trimmed and lowercased. An empty term shows every item.
    pub fn search(&mut self, term: &str) {
        self.search_term = term.trim().to_lowercase();
        self.rerender();
    }

    /// Renders the filtered view of the cache.
    pub fn rerender(&mut self) {
        let visible = self.cache.filter(&self.search_term);
        self.gallery.render(&visible);
    }

    async fn refresh(&mut self) -> Result<()> {
        let items = self.store.list().await?;
        self.cache
            .replace(items)
            .map_err(|e| Error::FetchFailed(e.to_string()))
    }

    /// Refreshes after a confirmed mutation. A failed refetch keeps the last
    /// known list, records an error notice and returns false.
    async fn refresh_after_mutation(&mut self) -> bool {
        match self.refresh().await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Refresh after mutation failed");
                self.notice = Some(Notice::error(e.to_string()));
                false
            },
        }
    }
}
