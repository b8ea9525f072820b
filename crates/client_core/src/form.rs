use std::{
    collections::HashSet,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, MutexGuard, PoisonError,
    },
};

use async_trait::async_trait;
use shared::{domain::ProjectId, protocol::EntityPayload};
use tracing::{debug, info, warn};

use crate::{
    cancel::CancelToken,
    draft::{self, Draft, Field, FieldErrors},
    error::ClientError,
    resource::Resource,
    ResourceClient,
};

/// Owner of a form; told how each submission ended.
#[async_trait]
pub trait FormHost: Send + Sync {
    async fn saved(&self, payload: &EntityPayload);
    async fn save_failed(&self, message: String);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode<Id> {
    Create,
    Edit(Id),
}

#[derive(Debug)]
pub enum SubmitOutcome<R> {
    Saved(R),
    Invalid(FieldErrors),
    Failed(String),
    /// Another submission of this form is still outstanding.
    Busy,
    Cancelled,
}

#[derive(Debug, Default)]
struct FormState {
    draft: Draft,
    touched: HashSet<Field>,
    errors: FieldErrors,
}

pub struct FormController<R: Resource> {
    client: Arc<dyn ResourceClient<R>>,
    host: Arc<dyn FormHost>,
    mode: FormMode<R::Id>,
    parent: Option<ProjectId>,
    state: Mutex<FormState>,
    busy: AtomicBool,
    outstanding: Mutex<Option<CancelToken>>,
}

struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<R: Resource> FormController<R> {
    pub fn new(
        client: Arc<dyn ResourceClient<R>>,
        host: Arc<dyn FormHost>,
        mode: FormMode<R::Id>,
        parent: Option<ProjectId>,
        draft: Draft,
    ) -> Self {
        Self {
            client,
            host,
            mode,
            parent,
            state: Mutex::new(FormState {
                draft,
                ..FormState::default()
            }),
            busy: AtomicBool::new(false),
            outstanding: Mutex::new(None),
        }
    }

    pub fn mode(&self) -> FormMode<R::Id> {
        self.mode
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.mode, FormMode::Edit(_))
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    pub fn draft(&self) -> Draft {
        self.state().draft.clone()
    }

    pub fn errors(&self) -> FieldErrors {
        self.state().errors.clone()
    }

    pub fn error(&self, field: Field) -> Option<String> {
        self.state().errors.get(&field).cloned()
    }

    pub fn set_field(&self, field: Field, value: impl Into<String>) {
        let mut state = self.state();
        state.draft.set(field, value);
        if state.touched.contains(&field) {
            revalidate(&mut state, field);
        }
    }

    pub fn blur(&self, field: Field) {
        let mut state = self.state();
        state.touched.insert(field);
        revalidate(&mut state, field);
    }

    /// Touched, error-free and non-empty.
    pub fn is_valid(&self, field: Field) -> bool {
        let state = self.state();
        state.touched.contains(&field)
            && !state.errors.contains_key(&field)
            && !state.draft.get(field).is_empty()
    }

    pub fn is_invalid(&self, field: Field) -> bool {
        let state = self.state();
        state.touched.contains(&field) && state.errors.contains_key(&field)
    }

    pub async fn submit(&self) -> SubmitOutcome<R> {
        let Some(_busy) = BusyGuard::acquire(&self.busy) else {
            debug!(resource = R::NOUN, "submit ignored while a save is outstanding");
            return SubmitOutcome::Busy;
        };

        let payload = {
            let mut state = self.state();
            state.touched.extend(Field::ALL);
            match draft::normalize(&state.draft) {
                Ok(payload) => {
                    state.errors.clear();
                    payload
                }
                Err(errors) => {
                    state.errors = errors.clone();
                    return SubmitOutcome::Invalid(errors);
                }
            }
        };
        let project_id = match self.mode {
            FormMode::Create => match R::creation_parent(self.parent) {
                Ok(project_id) => project_id,
                Err(err) => {
                    warn!(resource = R::NOUN, error = %err, "create refused");
                    return self.fail(&err).await;
                }
            },
            FormMode::Edit(_) => self.parent,
        };
        let payload = EntityPayload {
            project_id,
            ..payload
        };

        let cancel = CancelToken::new();
        *self.outstanding() = Some(cancel.clone());
        let result = match self.mode {
            FormMode::Create => self.client.create(&payload, &cancel).await,
            FormMode::Edit(id) => self.client.update(id, &payload, &cancel).await,
        };
        self.outstanding().take();

        match result {
            Ok(saved) => {
                info!(resource = R::NOUN, id = %saved.id(), "saved");
                self.host.saved(&payload).await;
                *self.state() = FormState::default();
                SubmitOutcome::Saved(saved)
            }
            Err(ClientError::Cancelled) => SubmitOutcome::Cancelled,
            Err(err) => {
                warn!(resource = R::NOUN, error = %err, "save failed");
                self.fail(&err).await
            }
        }
    }

    async fn fail(&self, err: &ClientError) -> SubmitOutcome<R> {
        let message = err
            .notice(&format!("Failed to save {}", R::NOUN))
            .unwrap_or_else(|| err.to_string());
        self.host.save_failed(message.clone()).await;
        SubmitOutcome::Failed(message)
    }

    /// Aborts an outstanding save and discards the draft.
    pub fn cancel(&self) {
        if let Some(token) = self.outstanding().take() {
            token.cancel();
        }
        *self.state() = FormState::default();
    }

    fn state(&self) -> MutexGuard<'_, FormState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn outstanding(&self) -> MutexGuard<'_, Option<CancelToken>> {
        self.outstanding.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn revalidate(state: &mut FormState, field: Field) {
    match draft::validate_field(&state.draft, field) {
        Some(message) => {
            state.errors.insert(field, message);
        }
        None => {
            state.errors.remove(&field);
        }
    }
}

#[cfg(test)]
#[path = "tests/form_tests.rs"]
mod tests;
