//! In-memory [`ResourceClient`] with scripted replies for synchronizer and form tests.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::{
    domain::{ProjectId, TaskId},
    protocol::{EntityPayload, Project, Task},
};
use tokio::sync::oneshot;

use crate::{CancelToken, ClientError, ClientResult, Resource, ResourceClient};

#[derive(Debug, Clone, PartialEq)]
pub enum Call<Id> {
    List(Option<ProjectId>),
    Fetch(Id),
    Create(EntityPayload),
    Update(Id, EntityPayload),
    Delete(Id),
}

enum ListReply<R> {
    Ready(ClientResult<Vec<R>>),
    Gated(oneshot::Receiver<ClientResult<Vec<R>>>),
}

/// Serves `server` for lists unless a scripted reply is queued. Gated replies ignore
/// cancellation on purpose: they model a response that arrives after it was superseded.
pub struct ScriptedClient<R: Resource> {
    pub server: Mutex<Vec<R>>,
    calls: Mutex<Vec<Call<R::Id>>>,
    list_replies: Mutex<VecDeque<ListReply<R>>>,
    mutation_status: Mutex<Option<u16>>,
    mutation_gate: Mutex<Option<oneshot::Receiver<()>>>,
}

impl<R: Resource> ScriptedClient<R> {
    pub fn new(server: Vec<R>) -> Arc<Self> {
        Arc::new(Self {
            server: Mutex::new(server),
            calls: Mutex::new(Vec::new()),
            list_replies: Mutex::new(VecDeque::new()),
            mutation_status: Mutex::new(None),
            mutation_gate: Mutex::new(None),
        })
    }

    pub fn calls(&self) -> Vec<Call<R::Id>> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn queue_list(&self, reply: ClientResult<Vec<R>>) {
        self.list_replies
            .lock()
            .expect("replies lock")
            .push_back(ListReply::Ready(reply));
    }

    pub fn gate_list(&self) -> oneshot::Sender<ClientResult<Vec<R>>> {
        let (tx, rx) = oneshot::channel();
        self.list_replies
            .lock()
            .expect("replies lock")
            .push_back(ListReply::Gated(rx));
        tx
    }

    pub fn fail_mutations_with(&self, status: u16) {
        *self.mutation_status.lock().expect("status lock") = Some(status);
    }

    pub fn gate_mutations(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.mutation_gate.lock().expect("gate lock") = Some(rx);
        tx
    }

    fn record(&self, call: Call<R::Id>) {
        self.calls.lock().expect("calls lock").push(call);
    }

    async fn mutation(&self) -> ClientResult<()> {
        let gate = self.mutation_gate.lock().expect("gate lock").take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        match *self.mutation_status.lock().expect("status lock") {
            Some(status) => Err(ClientError::RequestFailed {
                status,
                detail: None,
            }),
            None => Ok(()),
        }
    }

    fn first_item(&self) -> ClientResult<R> {
        self.server
            .lock()
            .expect("server lock")
            .first()
            .cloned()
            .ok_or(ClientError::RequestFailed {
                status: 404,
                detail: Some("not found".into()),
            })
    }
}

#[async_trait]
impl<R: Resource> ResourceClient<R> for ScriptedClient<R> {
    async fn list(&self, parent: Option<ProjectId>, cancel: &CancelToken) -> ClientResult<Vec<R>> {
        self.record(Call::List(parent));
        let reply = self.list_replies.lock().expect("replies lock").pop_front();
        match reply {
            Some(ListReply::Ready(reply)) => cancel.run(async { reply }).await,
            Some(ListReply::Gated(rx)) => rx
                .await
                .unwrap_or_else(|_| Err(ClientError::Network("gate dropped".into()))),
            None => Ok(self.server.lock().expect("server lock").clone()),
        }
    }

    async fn fetch(&self, id: R::Id, _cancel: &CancelToken) -> ClientResult<R> {
        self.record(Call::Fetch(id));
        self.server
            .lock()
            .expect("server lock")
            .iter()
            .find(|item| item.id() == id)
            .cloned()
            .ok_or(ClientError::RequestFailed {
                status: 404,
                detail: None,
            })
    }

    async fn create(&self, payload: &EntityPayload, _cancel: &CancelToken) -> ClientResult<R> {
        self.record(Call::Create(payload.clone()));
        self.mutation().await?;
        self.first_item()
    }

    async fn update(
        &self,
        id: R::Id,
        payload: &EntityPayload,
        _cancel: &CancelToken,
    ) -> ClientResult<R> {
        self.record(Call::Update(id, payload.clone()));
        self.mutation().await?;
        self.first_item()
    }

    async fn delete(&self, id: R::Id, _cancel: &CancelToken) -> ClientResult<()> {
        self.record(Call::Delete(id));
        self.mutation().await?;
        self.server
            .lock()
            .expect("server lock")
            .retain(|item| item.id() != id);
        Ok(())
    }
}

fn timestamp() -> DateTime<Utc> {
    "2024-01-01T00:00:00Z".parse().expect("timestamp")
}

pub fn project(id: i64, title: &str) -> Project {
    Project {
        id: ProjectId(id),
        title: title.to_string(),
        description: None,
        due_date: None,
        assignee: None,
        status: None,
        priority: None,
        created_at: timestamp(),
        updated_at: timestamp(),
    }
}

pub fn task(id: i64, project_id: i64, title: &str, description: &str) -> Task {
    Task {
        id: TaskId(id),
        project_id: Some(ProjectId(project_id)),
        title: title.to_string(),
        description: Some(description.to_string()),
        due_date: None,
        assignee: None,
        status: None,
        priority: None,
        created_at: timestamp(),
        updated_at: timestamp(),
    }
}
