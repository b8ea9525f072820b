//! One mounted list view plus the form opened on it.

use std::sync::Arc;

use client_core::{
    DeleteOutcome, FormController, ListSynchronizer, RefreshOutcome, ResourceClient,
    SubmitOutcome, SyncEvent,
};
use shared::domain::ProjectId;
use tokio::sync::broadcast::{self, error::TryRecvError};

use crate::ui::{
    self,
    intent::Intent,
    table::{self, TableRow},
};

const NO_FORM: &str = "no form is open, use 'add' or 'edit <id>'";

pub struct ResourceView<R: TableRow> {
    sync: Arc<ListSynchronizer<R>>,
    events: broadcast::Receiver<SyncEvent<R::Id>>,
    form: Option<FormController<R>>,
}

impl<R: TableRow> ResourceView<R> {
    /// Mounts the view and loads its collection.
    pub async fn open(client: Arc<dyn ResourceClient<R>>, parent: Option<ProjectId>) -> Self {
        let sync = ListSynchronizer::mount(client, parent);
        let events = sync.subscribe();
        let view = Self {
            sync,
            events,
            form: None,
        };
        view.sync.refresh().await;
        view
    }

    pub async fn parent(&self) -> Option<ProjectId> {
        self.sync.snapshot().await.parent
    }

    /// Applies a view-level intent. Returns a status line for the user, if any.
    pub async fn handle(&mut self, intent: Intent) -> Option<String> {
        let status = match intent {
            Intent::Add => {
                if self.sync.can_create().await {
                    let form = self.sync.begin_create().await;
                    self.replace_form(form);
                    None
                } else {
                    Some(format!(
                        "open a project's tasks ('tasks <project-id>') to add a {}",
                        R::NOUN
                    ))
                }
            }
            Intent::EditRequest(raw) => {
                let form = self.sync.begin_edit(R::id_from_input(raw)).await;
                let status = (!form.is_editing())
                    .then(|| format!("no {} with id {raw}, opened an empty form", R::NOUN));
                self.replace_form(form);
                status
            }
            Intent::Show(raw) => self
                .sync
                .fetch(R::id_from_input(raw))
                .await
                .map(|item| table::render_details(&item)),
            Intent::DeleteRequest(raw) => {
                self.sync.request_delete(R::id_from_input(raw)).await;
                None
            }
            Intent::ConfirmDelete => match self.sync.confirm_delete().await {
                DeleteOutcome::NothingPending => Some("nothing to confirm".into()),
                DeleteOutcome::Deleted | DeleteOutcome::Failed(_) | DeleteOutcome::Cancelled => {
                    None
                }
            },
            Intent::CancelDelete => {
                self.sync.cancel_delete().await;
                None
            }
            Intent::SubmitDraft => self.submit().await,
            Intent::SetField(field, value) => self.with_form(|form| form.set_field(field, value)),
            Intent::Blur(field) => self.with_form(|form| form.blur(field)),
            Intent::CloseForm => {
                if let Some(form) = self.form.take() {
                    form.cancel();
                }
                None
            }
            Intent::DismissError => {
                self.sync.dismiss_error().await;
                None
            }
            Intent::Refresh => {
                if let RefreshOutcome::Discarded = self.sync.refresh().await {
                    tracing::debug!(resource = R::COLLECTION, "refresh superseded");
                }
                None
            }
            other @ (Intent::OpenProjects | Intent::OpenTasks(_) | Intent::Help | Intent::Quit) => {
                tracing::debug!(intent = ?other, "session intent reached a view");
                None
            }
        };
        self.drain_events();
        status
    }

    pub async fn render(&self, heading: &str) -> String {
        let snapshot = self.sync.snapshot().await;
        ui::render_screen(heading, &snapshot, self.form.as_ref())
    }

    /// Points the view at another parent and reloads; an open form is discarded.
    pub async fn set_scope(&mut self, parent: Option<ProjectId>) {
        if let Some(form) = self.form.take() {
            form.cancel();
        }
        self.sync.set_scope(parent).await;
        self.drain_events();
    }

    /// Drops the form and stops applying results to this view.
    pub async fn close(mut self) {
        if let Some(form) = self.form.take() {
            form.cancel();
        }
        self.sync.unmount().await;
    }

    async fn submit(&mut self) -> Option<String> {
        let Some(form) = self.form.as_ref() else {
            return Some(NO_FORM.into());
        };
        match form.submit().await {
            SubmitOutcome::Saved(saved) => {
                self.form = None;
                Some(format!("saved {} {}", R::NOUN, saved.id()))
            }
            SubmitOutcome::Invalid(errors) => {
                Some(format!("{} field(s) need attention", errors.len()))
            }
            SubmitOutcome::Busy => Some("still saving".into()),
            SubmitOutcome::Failed(_) | SubmitOutcome::Cancelled => None,
        }
    }

    fn with_form(&self, apply: impl FnOnce(&FormController<R>)) -> Option<String> {
        match &self.form {
            Some(form) => {
                apply(form);
                None
            }
            None => Some(NO_FORM.into()),
        }
    }

    fn replace_form(&mut self, form: FormController<R>) {
        if let Some(previous) = self.form.replace(form) {
            previous.cancel();
        }
    }

    fn drain_events(&mut self) {
        loop {
            match self.events.try_recv() {
                Ok(event) => tracing::debug!(resource = R::COLLECTION, ?event, "view event"),
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::debug!(resource = R::COLLECTION, skipped, "view events lagged")
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }
    }
}
