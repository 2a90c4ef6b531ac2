//! Post store backed by the hosted REST API (`/rest/v1/<table>`).

use async_trait::async_trait;
use metrics::counter;
use reqwest::{Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::application::repos::{
    PostFilter, PostOrder, PostStore, RepoError, SLUG_CONSTRAINT,
};
use crate::application::session::AccessToken;
use crate::domain::entities::{PostPatch, PostRecord, PostWrite};
use crate::infra::hosted::{HostedCtx, HostedErrorBody};

pub(crate) const METRIC_STORE_REQUESTS: &str = "blogcraft_store_requests_total";

const UNIQUE_VIOLATION: &str = "23505";
const RETURN_REPRESENTATION: &str = "return=representation";

#[derive(Clone, Debug)]
pub struct RestPostStore {
    ctx: HostedCtx,
    table: String,
}

impl RestPostStore {
    pub fn new(ctx: HostedCtx, table: impl Into<String>) -> Self {
        Self {
            ctx,
            table: table.into(),
        }
    }

    fn table_url(&self, filter: &PostFilter, order: PostOrder) -> Result<Url, RepoError> {
        let mut url = self
            .ctx
            .url(&format!("rest/v1/{}", self.table))
            .map_err(RepoError::from_persistence)?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("select", "*");
            if filter.published_only {
                query.append_pair("is_published", "eq.true");
            }
            if let Some(slug) = &filter.slug {
                query.append_pair("slug", &format!("eq.{slug}"));
            }
            if let Some(id) = filter.id {
                query.append_pair("id", &format!("eq.{id}"));
            }
            if order == PostOrder::NewestFirst {
                query.append_pair("order", "created_at.desc");
            }
        }
        Ok(url)
    }

    fn row_url(&self, id: Uuid) -> Result<Url, RepoError> {
        let mut url = self
            .ctx
            .url(&format!("rest/v1/{}", self.table))
            .map_err(RepoError::from_persistence)?;
        url.query_pairs_mut()
            .append_pair("id", &format!("eq.{id}"));
        Ok(url)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        op: &'static str,
        request: RequestBuilder,
    ) -> Result<T, RepoError> {
        let bytes = self.send_raw(op, request).await?;
        serde_json::from_slice(&bytes)
            .map_err(|err| RepoError::Persistence(format!("failed to parse store response: {err}")))
    }

    async fn send_raw(
        &self,
        op: &'static str,
        request: RequestBuilder,
    ) -> Result<bytes::Bytes, RepoError> {
        let result = exchange(op, request).await;
        let outcome = if result.is_ok() { "ok" } else { "error" };
        counter!(METRIC_STORE_REQUESTS, "op" => op, "outcome" => outcome).increment(1);
        result
    }
}

async fn exchange(op: &'static str, request: RequestBuilder) -> Result<bytes::Bytes, RepoError> {
    let response = request.send().await.map_err(map_transport_error)?;
    let status = response.status();
    let bytes = response.bytes().await.map_err(map_transport_error)?;
    debug!(
        target: "blogcraft::store::rest",
        op,
        status = status.as_u16(),
        "store request completed"
    );
    if status.is_success() {
        return Ok(bytes);
    }

    let err = map_status_error(status, &HostedErrorBody::parse(&bytes));
    warn!(
        target: "blogcraft::store::rest",
        op,
        status = status.as_u16(),
        error = %err,
        "store request failed"
    );
    Err(err)
}

#[async_trait]
impl PostStore for RestPostStore {
    async fn select(
        &self,
        auth: Option<&AccessToken>,
        filter: &PostFilter,
        order: PostOrder,
    ) -> Result<Vec<PostRecord>, RepoError> {
        let url = self.table_url(filter, order)?;
        let request = self
            .ctx
            .request(Method::GET, url, auth.map(AccessToken::as_str));
        self.send("select", request).await
    }

    async fn insert(
        &self,
        auth: &AccessToken,
        record: &PostWrite,
    ) -> Result<PostRecord, RepoError> {
        let url = self
            .ctx
            .url(&format!("rest/v1/{}", self.table))
            .map_err(RepoError::from_persistence)?;
        let request = self
            .ctx
            .request(Method::POST, url, Some(auth.as_str()))
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&[record]);
        let rows: Vec<PostRecord> = self.send("insert", request).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| RepoError::Persistence("store returned no row for insert".into()))
    }

    async fn update(
        &self,
        auth: &AccessToken,
        id: Uuid,
        patch: &PostPatch,
    ) -> Result<PostRecord, RepoError> {
        if patch.is_empty() {
            return Err(RepoError::InvalidInput {
                message: "update without fields".into(),
            });
        }
        let request = self
            .ctx
            .request(Method::PATCH, self.row_url(id)?, Some(auth.as_str()))
            .header("Prefer", RETURN_REPRESENTATION)
            .json(patch);
        let rows: Vec<PostRecord> = self.send("update", request).await?;
        rows.into_iter().next().ok_or(RepoError::NotFound)
    }

    async fn delete(&self, auth: &AccessToken, id: Uuid) -> Result<(), RepoError> {
        let request = self
            .ctx
            .request(Method::DELETE, self.row_url(id)?, Some(auth.as_str()));
        self.send_raw("delete", request).await.map(|_| ())
    }
}

fn map_transport_error(err: reqwest::Error) -> RepoError {
    if err.is_timeout() {
        RepoError::Timeout
    } else {
        RepoError::from_persistence(err)
    }
}

fn map_status_error(status: StatusCode, body: &HostedErrorBody) -> RepoError {
    let message = body.describe(status);
    if status == StatusCode::CONFLICT || body.code.as_deref() == Some(UNIQUE_VIOLATION) {
        return RepoError::Duplicate {
            constraint: constraint_name(&message).unwrap_or(SLUG_CONSTRAINT).to_string(),
        };
    }
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => RepoError::Unauthorized { message },
        StatusCode::NOT_FOUND => RepoError::NotFound,
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            RepoError::InvalidInput { message }
        }
        StatusCode::GATEWAY_TIMEOUT | StatusCode::REQUEST_TIMEOUT => RepoError::Timeout,
        _ => RepoError::Persistence(message),
    }
}

/// Constraint named in a `... unique constraint "name"` message.
fn constraint_name(message: &str) -> Option<&str> {
    let (_, rest) = message.split_once("constraint \"")?;
    let (name, _) = rest.split_once('"')?;
    Some(name)
}
