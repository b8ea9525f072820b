use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex as StdMutex, PoisonError,
    },
};

use async_trait::async_trait;
use shared::{domain::ProjectId, protocol::EntityPayload};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

use crate::{
    cancel::CancelToken,
    draft::Draft,
    error::ClientError,
    form::{FormController, FormHost, FormMode},
    resource::Resource,
    ResourceClient,
};

const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    Idle,
    Loading,
    Ready,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum RequestKind {
    List,
    Fetch,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    Applied(usize),
    /// A later refresh, a scope change or unmount superseded this one.
    Discarded,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NothingPending,
    Failed(String),
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent<Id> {
    Loading,
    Refreshed { count: usize },
    Failed(String),
    ConfirmDelete(Id),
    Deleted(Id),
    NoticeCleared,
}

#[derive(Debug, Clone)]
pub struct SyncSnapshot<R: Resource> {
    pub phase: LoadPhase,
    pub parent: Option<ProjectId>,
    pub items: Vec<R>,
    pub notice: Option<String>,
    pub pending_delete: Option<R::Id>,
    pub in_flight: usize,
}

impl<R: Resource> SyncSnapshot<R> {
    pub fn is_loading(&self) -> bool {
        self.in_flight > 0
    }
}

struct SyncState<R: Resource> {
    parent: Option<ProjectId>,
    phase: LoadPhase,
    items: Vec<R>,
    notice: Option<String>,
    pending_delete: Option<R::Id>,
    mounted: bool,
    list_seq: u64,
    list_cancel: Option<CancelToken>,
}

/// Handles of requests that have been issued and not yet settled.
#[derive(Debug, Default)]
struct RequestTracker {
    next_handle: AtomicU64,
    live: StdMutex<HashMap<u64, RequestKind>>,
}

impl RequestTracker {
    fn begin(&self, kind: RequestKind) -> InFlight<'_> {
        let handle = self.next_handle.fetch_add(1, Ordering::Relaxed);
        self.live().insert(handle, kind);
        InFlight {
            tracker: self,
            handle,
        }
    }

    fn len(&self) -> usize {
        self.live().len()
    }

    fn live(&self) -> std::sync::MutexGuard<'_, HashMap<u64, RequestKind>> {
        self.live.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Settles its handle when dropped, including when the awaiting future is abandoned.
struct InFlight<'a> {
    tracker: &'a RequestTracker,
    handle: u64,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.tracker.live().remove(&self.handle);
    }
}

/// Owns the collection of one view (all projects, or the tasks of one project).
///
/// Only the most recently issued list request is ever applied; superseded requests are
/// cancelled and their late results dropped.
pub struct ListSynchronizer<R: Resource> {
    client: Arc<dyn ResourceClient<R>>,
    inner: Mutex<SyncState<R>>,
    requests: RequestTracker,
    events: broadcast::Sender<SyncEvent<R::Id>>,
}

impl<R: Resource> ListSynchronizer<R> {
    /// Creates the view state with an empty collection. Call [`Self::refresh`] to load it.
    pub fn mount(client: Arc<dyn ResourceClient<R>>, parent: Option<ProjectId>) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        info!(resource = R::COLLECTION, ?parent, "mounted list view");
        Arc::new(Self {
            client,
            inner: Mutex::new(SyncState {
                parent,
                phase: LoadPhase::Idle,
                items: Vec::new(),
                notice: None,
                pending_delete: None,
                mounted: true,
                list_seq: 0,
                list_cancel: None,
            }),
            requests: RequestTracker::default(),
            events,
        })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent<R::Id>> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> SyncSnapshot<R> {
        let state = self.inner.lock().await;
        SyncSnapshot {
            phase: state.phase,
            parent: state.parent,
            items: state.items.clone(),
            notice: state.notice.clone(),
            pending_delete: state.pending_delete,
            in_flight: self.requests.len(),
        }
    }

    pub async fn refresh(&self) -> RefreshOutcome {
        let (seq, parent, cancel, in_flight) = {
            let mut state = self.inner.lock().await;
            if !state.mounted {
                return RefreshOutcome::Discarded;
            }
            if let Some(previous) = state.list_cancel.take() {
                previous.cancel();
            }
            state.list_seq += 1;
            let cancel = CancelToken::new();
            state.list_cancel = Some(cancel.clone());
            state.phase = LoadPhase::Loading;
            let in_flight = self.requests.begin(RequestKind::List);
            (state.list_seq, state.parent, cancel, in_flight)
        };
        self.emit(SyncEvent::Loading);
        debug!(resource = R::COLLECTION, seq, ?parent, "refreshing collection");

        let result = self.client.list(parent, &cancel).await;

        drop(in_flight);
        let mut state = self.inner.lock().await;
        if cancel.is_cancelled() || !state.mounted || state.list_seq != seq {
            debug!(resource = R::COLLECTION, seq, "dropping superseded list result");
            return RefreshOutcome::Discarded;
        }
        state.list_cancel = None;

        match result {
            Ok(items) => {
                let count = items.len();
                state.items = items;
                state.notice = None;
                state.phase = LoadPhase::Ready;
                drop(state);
                debug!(resource = R::COLLECTION, count, "collection replaced");
                self.emit(SyncEvent::Refreshed { count });
                RefreshOutcome::Applied(count)
            }
            Err(ClientError::Cancelled) => RefreshOutcome::Discarded,
            Err(err) => {
                warn!(resource = R::COLLECTION, error = %err, "failed to load collection");
                let message = err
                    .notice(&format!("Failed to load {}", R::COLLECTION))
                    .unwrap_or_else(|| err.to_string());
                state.notice = Some(message.clone());
                state.phase = LoadPhase::Failed;
                drop(state);
                self.emit(SyncEvent::Failed(message.clone()));
                RefreshOutcome::Failed(message)
            }
        }
    }

    /// Switches the parent scope and reloads. Results still in flight for the old scope
    /// are discarded.
    pub async fn set_scope(&self, parent: Option<ProjectId>) -> RefreshOutcome {
        {
            let mut state = self.inner.lock().await;
            if state.parent != parent {
                debug!(resource = R::COLLECTION, from = ?state.parent, to = ?parent, "scope changed");
                state.parent = parent;
                state.pending_delete = None;
            }
        }
        self.refresh().await
    }

    /// Loads one element straight from the server; the collection is left as it is.
    /// A failure becomes the notice and yields `None`.
    pub async fn fetch(&self, id: R::Id) -> Option<R> {
        let in_flight = self.requests.begin(RequestKind::Fetch);
        let result = self.client.fetch(id, &CancelToken::new()).await;
        drop(in_flight);

        match result {
            Ok(item) => Some(item),
            Err(ClientError::Cancelled) => None,
            Err(err) => {
                warn!(resource = R::NOUN, %id, error = %err, "fetch failed");
                let message = err
                    .notice(&format!("Failed to load {}", R::NOUN))
                    .unwrap_or_else(|| err.to_string());
                let mut state = self.inner.lock().await;
                if state.mounted {
                    state.notice = Some(message.clone());
                    drop(state);
                    self.emit(SyncEvent::Failed(message));
                }
                None
            }
        }
    }

    /// First phase of a delete: records the target and asks for confirmation.
    pub async fn request_delete(&self, id: R::Id) {
        let mut state = self.inner.lock().await;
        if !state.mounted {
            return;
        }
        state.pending_delete = Some(id);
        drop(state);
        self.emit(SyncEvent::ConfirmDelete(id));
    }

    pub async fn cancel_delete(&self) {
        self.inner.lock().await.pending_delete = None;
    }

    pub async fn confirm_delete(&self) -> DeleteOutcome {
        let Some(id) = self.inner.lock().await.pending_delete.take() else {
            return DeleteOutcome::NothingPending;
        };

        let in_flight = self.requests.begin(RequestKind::Delete);
        let result = self.client.delete(id, &CancelToken::new()).await;
        drop(in_flight);

        let mut state = self.inner.lock().await;
        match result {
            Ok(()) => {
                info!(resource = R::NOUN, %id, "deleted");
                if state.mounted {
                    state.notice = None;
                }
                drop(state);
                self.emit(SyncEvent::Deleted(id));
                self.refresh().await;
                DeleteOutcome::Deleted
            }
            Err(ClientError::Cancelled) => DeleteOutcome::Cancelled,
            Err(err) => {
                warn!(resource = R::NOUN, %id, error = %err, "delete failed");
                let message = err
                    .notice(&format!("Failed to delete {}", R::NOUN))
                    .unwrap_or_else(|| err.to_string());
                if state.mounted {
                    state.notice = Some(message.clone());
                    drop(state);
                    self.emit(SyncEvent::Failed(message.clone()));
                }
                DeleteOutcome::Failed(message)
            }
        }
    }

    /// Whether a new element can be created in the current scope.
    pub async fn can_create(&self) -> bool {
        R::creation_parent(self.inner.lock().await.parent).is_ok()
    }

    pub async fn begin_create(self: &Arc<Self>) -> FormController<R> {
        let parent = self.inner.lock().await.parent;
        self.form(FormMode::Create, parent, Draft::default())
    }

    /// Opens the form on a copy of the element with `id`, or an empty form if it is
    /// not in the collection.
    pub async fn begin_edit(self: &Arc<Self>, id: R::Id) -> FormController<R> {
        let (parent, draft) = {
            let state = self.inner.lock().await;
            let draft = state.items.iter().find(|item| item.id() == id).map(R::draft);
            (state.parent, draft)
        };
        match draft {
            Some(draft) => self.form(FormMode::Edit(id), parent, draft),
            None => {
                debug!(resource = R::NOUN, %id, "edit target not in collection, opening empty form");
                self.form(FormMode::Create, parent, Draft::default())
            }
        }
    }

    pub async fn dismiss_error(&self) {
        let mut state = self.inner.lock().await;
        if state.notice.take().is_some() {
            drop(state);
            self.emit(SyncEvent::NoticeCleared);
        }
    }

    /// Cancels the outstanding list request; nothing that completes afterwards is applied.
    pub async fn unmount(&self) {
        let mut state = self.inner.lock().await;
        state.mounted = false;
        state.pending_delete = None;
        if let Some(cancel) = state.list_cancel.take() {
            cancel.cancel();
        }
        info!(resource = R::COLLECTION, parent = ?state.parent, "unmounted list view");
    }

    fn form(
        self: &Arc<Self>,
        mode: FormMode<R::Id>,
        parent: Option<ProjectId>,
        draft: Draft,
    ) -> FormController<R> {
        let host: Arc<dyn FormHost> = self.clone();
        FormController::new(Arc::clone(&self.client), host, mode, parent, draft)
    }

    fn emit(&self, event: SyncEvent<R::Id>) {
        let _ = self.events.send(event);
    }
}

#[async_trait]
impl<R: Resource> FormHost for ListSynchronizer<R> {
    async fn saved(&self, _payload: &EntityPayload) {
        self.refresh().await;
    }

    async fn save_failed(&self, message: String) {
        let mut state = self.inner.lock().await;
        if !state.mounted {
            return;
        }
        state.notice = Some(message.clone());
        drop(state);
        self.emit(SyncEvent::Failed(message));
    }
}

impl<R: Resource> Drop for ListSynchronizer<R> {
    fn drop(&mut self) {
        if let Some(cancel) = self.inner.get_mut().list_cancel.take() {
            cancel.cancel();
        }
    }
}

#[cfg(test)]
#[path = "tests/list_sync_tests.rs"]
mod tests;
