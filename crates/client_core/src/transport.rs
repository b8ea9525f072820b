//! reqwest-backed [`ResourceClient`] speaking JSON to the REST backend.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use shared::{domain::ProjectId, error::ApiError, protocol::EntityPayload};
use tracing::debug;
use url::Url;

use crate::{
    cancel::CancelToken,
    error::{ClientError, ClientResult},
    resource::Resource,
    ResourceClient,
};

#[derive(Debug, Clone)]
pub struct HttpResourceClient {
    http: Client,
    base: Url,
}

impl HttpResourceClient {
    pub fn new(base_url: &str) -> ClientResult<Self> {
        Self::with_timeout(base_url, None)
    }

    /// Validates `base_url` and keeps it as the root of every endpoint. A query string on
    /// the base is carried onto each request; a fragment is dropped.
    pub fn with_timeout(base_url: &str, timeout: Option<Duration>) -> ClientResult<Self> {
        let invalid = |reason: String| ClientError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason,
        };
        let mut base = Url::parse(base_url).map_err(|err| invalid(err.to_string()))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme '{}'", base.scheme())));
        }
        if base.cannot_be_a_base() {
            return Err(invalid("url cannot carry a path".into()));
        }
        base.set_fragment(None);
        let path = base.path().trim_end_matches('/').to_string();
        base.set_path(&path);

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|err| ClientError::Network(format!("failed to build http client: {err}")))?;

        Ok(Self { http, base })
    }

    pub fn base_url(&self) -> &str {
        self.base.as_str()
    }

    /// `path` is a relative resource path such as `projects/3/tasks`.
    fn endpoint(&self, path: &str) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(path.split('/'));
        }
        url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.endpoint(path);
        debug!(%method, %url, "issuing request");
        self.http.request(method, url)
    }

    async fn send(&self, request: RequestBuilder, cancel: &CancelToken) -> ClientResult<Response> {
        cancel
            .run(async {
                let response = request.send().await?;
                ensure_success(response).await
            })
            .await
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        cancel: &CancelToken,
    ) -> ClientResult<T> {
        cancel
            .run(async {
                let response = ensure_success(request.send().await?).await?;
                response
                    .json::<T>()
                    .await
                    .map_err(|err| ClientError::InvalidResponse(err.to_string()))
            })
            .await
    }
}

async fn ensure_success(response: Response) -> ClientResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<ApiError>(&body)
        .ok()
        .and_then(|err| err.message());
    debug!(status = status.as_u16(), ?detail, "request rejected");
    Err(ClientError::RequestFailed {
        status: status.as_u16(),
        detail,
    })
}

#[async_trait]
impl<R: Resource> ResourceClient<R> for HttpResourceClient {
    async fn list(&self, parent: Option<ProjectId>, cancel: &CancelToken) -> ClientResult<Vec<R>> {
        let path = R::list_path(parent)?;
        self.send_json(self.request(Method::GET, &path), cancel)
            .await
    }

    async fn fetch(&self, id: R::Id, cancel: &CancelToken) -> ClientResult<R> {
        self.send_json(self.request(Method::GET, &R::item_path(id)), cancel)
            .await
    }

    async fn create(&self, payload: &EntityPayload, cancel: &CancelToken) -> ClientResult<R> {
        let request = self.request(Method::POST, R::COLLECTION).json(payload);
        self.send_json(request, cancel).await
    }

    async fn update(
        &self,
        id: R::Id,
        payload: &EntityPayload,
        cancel: &CancelToken,
    ) -> ClientResult<R> {
        let request = self.request(Method::PUT, &R::item_path(id)).json(payload);
        self.send_json(request, cancel).await
    }

    async fn delete(&self, id: R::Id, cancel: &CancelToken) -> ClientResult<()> {
        // The backend echoes the deleted row; nothing here needs it.
        self.send(self.request(Method::DELETE, &R::item_path(id)), cancel)
            .await
            .map(drop)
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
