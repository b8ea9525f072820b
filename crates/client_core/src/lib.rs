//! Client-side synchronization of project and task collections with the REST backend.
//!
//! [`ResourceClient`] issues cancellable CRUD calls, [`ListSynchronizer`] owns one view's
//! collection and [`FormController`] owns the single draft being edited.

use async_trait::async_trait;
use shared::{domain::ProjectId, protocol::EntityPayload};

pub mod cancel;
pub mod draft;
pub mod error;
pub mod form;
pub mod list_sync;
pub mod resource;
pub mod transport;

pub use cancel::CancelToken;
pub use draft::{Draft, Field, FieldErrors};
pub use error::{ClientError, ClientResult};
pub use form::{FormController, FormHost, FormMode, SubmitOutcome};
pub use list_sync::{
    DeleteOutcome, ListSynchronizer, LoadPhase, RefreshOutcome, SyncEvent, SyncSnapshot,
};
pub use resource::Resource;
pub use transport::HttpResourceClient;

/// CRUD calls against one remote collection. Each call issues exactly one request and
/// fails with [`ClientError::Cancelled`] if `cancel` fires first.
#[async_trait]
pub trait ResourceClient<R: Resource>: Send + Sync {
    async fn list(&self, parent: Option<ProjectId>, cancel: &CancelToken) -> ClientResult<Vec<R>>;
    async fn fetch(&self, id: R::Id, cancel: &CancelToken) -> ClientResult<R>;
    async fn create(&self, payload: &EntityPayload, cancel: &CancelToken) -> ClientResult<R>;
    async fn update(
        &self,
        id: R::Id,
        payload: &EntityPayload,
        cancel: &CancelToken,
    ) -> ClientResult<R>;
    async fn delete(&self, id: R::Id, cancel: &CancelToken) -> ClientResult<()>;
}

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;
