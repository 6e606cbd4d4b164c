//! HTTP routes over a shared [`DocumentStore`].
//!
//! | Route | Operation |
//! |---|---|
//! | `GET /api/` | list identifiers |
//! | `POST /api/` | add under a fresh identifier |
//! | `GET /api/{id}` | fetch a document |
//! | `POST /api/{id}` | create or replace under `id` |
//! | `DELETE /api/{id}` | remove a document |
//! | `GET /ui/{id}` | render a document on a map |
//! | `GET /health` | liveness and document count |

use std::sync::Arc;

use axum::{
    Json, Router,
    async_trait,
    extract::{FromRequest, Multipart, Path, Request, State},
    http::{StatusCode, header::CONTENT_TYPE},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use geoshelf_core::{
    Document, DocumentId, DocumentStore, InvalidIdError, StoreError, StoreErrorKind,
};
use serde::Serialize;
use thiserror::Error;
use tokio::task::JoinError;
use tracing::{error, info};

use crate::render::render_map;

/// Multipart field carrying an uploaded document.
pub const UPLOAD_FIELD: &str = "geojson";

type SharedStore = Arc<DocumentStore>;

/// Build the application router.
pub fn router(store: SharedStore) -> Router {
    Router::new()
        .route("/api/", get(list_documents).post(create_document))
        .route(
            "/api/:id",
            get(fetch_document)
                .post(replace_document)
                .delete(delete_document),
        )
        .route("/ui/:id", get(render_document))
        .route("/health", get(health))
        .with_state(store)
}

/// Failure of a request handler.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The store rejected the operation.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// The path segment is not a document identifier.
    #[error(transparent)]
    InvalidId(#[from] InvalidIdError),
    /// The request body did not carry a readable document.
    #[error("invalid upload: {0}")]
    Upload(String),
    /// A blocking store operation did not complete.
    #[error("store task failed: {0}")]
    Task(#[from] JoinError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Store(err) => match err.kind() {
                StoreErrorKind::Validation => StatusCode::BAD_REQUEST,
                StoreErrorKind::NotFound => StatusCode::NOT_FOUND,
                StoreErrorKind::Io | StoreErrorKind::CollisionExhausted => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::InvalidId(_) => StatusCode::NOT_FOUND,
            Self::Upload(_) => StatusCode::BAD_REQUEST,
            Self::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("{self}");
        }
        (status, self.to_string()).into_response()
    }
}

/// Document text taken from a request.
///
/// `multipart/form-data` bodies must carry the text in the
/// [`UPLOAD_FIELD`] field; any other body is taken whole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedDocument(pub String);

#[async_trait]
impl<S> FromRequest<S> for UploadedDocument
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if !is_multipart(&req) {
            let text = String::from_request(req, state)
                .await
                .map_err(|rejection| ApiError::Upload(rejection.to_string()))?;
            return Ok(Self(text));
        }
        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::Upload(rejection.to_string()))?;
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|err| ApiError::Upload(err.to_string()))?
        {
            if field.name() == Some(UPLOAD_FIELD) {
                let text = field
                    .text()
                    .await
                    .map_err(|err| ApiError::Upload(err.to_string()))?;
                return Ok(Self(text));
            }
        }
        Err(ApiError::Upload(format!(
            "multipart body has no `{UPLOAD_FIELD}` field"
        )))
    }
}

fn is_multipart(req: &Request) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("multipart/form-data"))
}

#[derive(Debug, Serialize)]
struct Health {
    status: &'static str,
    documents: usize,
}

async fn list_documents(
    State(store): State<SharedStore>,
) -> Result<Json<Vec<DocumentId>>, ApiError> {
    let ids = on_store(store, DocumentStore::list_identifiers).await?;
    Ok(Json(ids))
}

async fn create_document(
    State(store): State<SharedStore>,
    UploadedDocument(content): UploadedDocument,
) -> Result<(StatusCode, String), ApiError> {
    let id = write_document(store, content, None).await?;
    Ok((StatusCode::CREATED, id.to_string()))
}

async fn fetch_document(
    State(store): State<SharedStore>,
    Path(raw): Path<String>,
) -> Result<Json<Document>, ApiError> {
    let id: DocumentId = raw.parse()?;
    let document = on_store(store, move |store| store.get(id)).await??;
    Ok(Json(document))
}

async fn replace_document(
    State(store): State<SharedStore>,
    Path(raw): Path<String>,
    UploadedDocument(content): UploadedDocument,
) -> Result<String, ApiError> {
    let id: DocumentId = raw.parse()?;
    let written = write_document(store, content, Some(id)).await?;
    Ok(written.to_string())
}

async fn delete_document(
    State(store): State<SharedStore>,
    Path(raw): Path<String>,
) -> Result<String, ApiError> {
    let id: DocumentId = raw.parse()?;
    let removed = on_store(store, move |store| store.remove(id)).await??;
    info!("deleted document {removed}");
    Ok(removed.to_string())
}

async fn render_document(
    State(store): State<SharedStore>,
    Path(raw): Path<String>,
) -> Result<Html<String>, ApiError> {
    let id: DocumentId = raw.parse()?;
    let document = on_store(store, move |store| store.get(id)).await??;
    Ok(Html(render_map(id, &document)))
}

async fn health(State(store): State<SharedStore>) -> Result<Json<Health>, ApiError> {
    let documents = on_store(store, DocumentStore::len).await?;
    Ok(Json(Health {
        status: "ok",
        documents,
    }))
}

async fn write_document(
    store: SharedStore,
    content: String,
    id: Option<DocumentId>,
) -> Result<DocumentId, ApiError> {
    let written = on_store(store, move |store| store.add(&content, id)).await??;
    info!("stored document {written}");
    Ok(written)
}

/// Run `operation` on the blocking pool. Every store call takes the store's
/// mutex, and writers hold it across file I/O.
async fn on_store<T, F>(store: SharedStore, operation: F) -> Result<T, ApiError>
where
    F: FnOnce(&DocumentStore) -> T + Send + 'static,
    T: Send + 'static,
{
    Ok(tokio::task::spawn_blocking(move || operation(&store)).await?)
}
