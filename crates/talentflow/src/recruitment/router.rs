use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post, put};
use axum::{Json, Router};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;

use super::domain::{Actor, CandidateId, NotificationId, ProjectId};
use super::progression::FeedbackDraft;
use super::service::{
    NewCandidate, NotificationQuery, PipelineCommit, PipelineError, PipelineService, ProjectDraft,
    ProjectPatch,
};
use super::store::{ActorDirectory, DocumentStore, Notifier, StoreError};

/// Shared handler state: the orchestration service plus the directory that
/// turns bearer tokens into actors.
pub struct RecruitmentState<S, N, D> {
    pub service: Arc<PipelineService<S, N>>,
    pub directory: Arc<D>,
}

impl<S, N, D> Clone for RecruitmentState<S, N, D> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            directory: self.directory.clone(),
        }
    }
}

/// Router builder exposing the pipeline endpoints under `/api`.
pub fn recruitment_router<S, N, D>(state: RecruitmentState<S, N, D>) -> Router
where
    S: DocumentStore + 'static,
    N: Notifier + 'static,
    D: ActorDirectory + 'static,
{
    Router::new()
        .route(
            "/api/projects",
            post(create_project_handler::<S, N, D>).get(list_projects_handler::<S, N, D>),
        )
        .route(
            "/api/projects/:id",
            get(get_project_handler::<S, N, D>)
                .put(update_project_handler::<S, N, D>)
                .delete(delete_project_handler::<S, N, D>),
        )
        .route(
            "/api/projects/:id/overview",
            get(overview_handler::<S, N, D>),
        )
        .route(
            "/api/projects/:id/dashboard",
            get(dashboard_handler::<S, N, D>),
        )
        .route(
            "/api/projects/:id/candidates",
            get(list_candidates_handler::<S, N, D>),
        )
        .route("/api/candidates", post(create_candidate_handler::<S, N, D>))
        .route("/api/candidates/:id", get(get_candidate_handler::<S, N, D>))
        .route(
            "/api/candidates/:id/interview-level",
            put(interview_level_handler::<S, N, D>),
        )
        .route(
            "/api/candidates/:id/feedback",
            put(feedback_handler::<S, N, D>),
        )
        .route("/api/notifications", get(notifications_handler::<S, N, D>))
        .route(
            "/api/notifications/unread-count",
            get(unread_count_handler::<S, N, D>),
        )
        .route(
            "/api/notifications/read-all",
            patch(mark_all_read_handler::<S, N, D>),
        )
        .route(
            "/api/notifications/:id/read",
            patch(mark_read_handler::<S, N, D>),
        )
        .route(
            "/api/notifications/generate",
            post(generate_notices_handler::<S, N, D>),
        )
        .with_state(state)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InterviewLevelRequest {
    interview_level: String,
}

#[derive(Debug, Default, Deserialize)]
struct RoleFilter {
    role: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateRequest {
    today: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
struct CommitBody<T: Serialize> {
    #[serde(flatten)]
    record: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    warning: Option<String>,
}

fn commit_response<T: Serialize>(status: StatusCode, commit: PipelineCommit<T>) -> Response {
    let body = CommitBody {
        record: commit.record,
        warning: commit.warning,
    };
    (status, Json(body)).into_response()
}

fn error_body(kind: &str, message: String) -> Json<serde_json::Value> {
    Json(json!({ "kind": kind, "error": message }))
}

/// Map a pipeline error to its wire representation. Store detail is logged
/// and redacted; everything else surfaces a stable kind plus message.
fn error_response(error: PipelineError) -> Response {
    match error {
        PipelineError::Validation(inner) => (
            StatusCode::BAD_REQUEST,
            error_body("validation", inner.to_string()),
        )
            .into_response(),
        PipelineError::Forbidden { .. } => (
            StatusCode::FORBIDDEN,
            error_body("forbidden", error.to_string()),
        )
            .into_response(),
        PipelineError::NotFound(_) => (
            StatusCode::NOT_FOUND,
            error_body("not_found", error.to_string()),
        )
            .into_response(),
        PipelineError::Store(StoreError::NotFound) => (
            StatusCode::NOT_FOUND,
            error_body("not_found", "document not found".to_string()),
        )
            .into_response(),
        PipelineError::Store(StoreError::Conflict) => (
            StatusCode::CONFLICT,
            error_body("conflict", "document already exists".to_string()),
        )
            .into_response(),
        PipelineError::Store(StoreError::Unavailable(detail)) => {
            error!(%detail, "document store unavailable");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_body("dependency", "document store unavailable".to_string()),
            )
                .into_response()
        }
    }
}

fn bearer_actor<D: ActorDirectory>(headers: &HeaderMap, directory: &D) -> Result<Actor, Response> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    token.and_then(|token| directory.resolve(token)).ok_or_else(|| {
        (
            StatusCode::UNAUTHORIZED,
            error_body(
                "unauthenticated",
                "missing or unknown bearer token".to_string(),
            ),
        )
            .into_response()
    })
}

macro_rules! resolve_actor {
    ($headers:expr, $state:expr) => {
        match bearer_actor(&$headers, $state.directory.as_ref()) {
            Ok(actor) => actor,
            Err(response) => return response,
        }
    };
}

async fn create_candidate_handler<S, N, D>(
    State(state): State<RecruitmentState<S, N, D>>,
    headers: HeaderMap,
    Json(draft): Json<NewCandidate>,
) -> Response
where
    S: DocumentStore + 'static,
    N: Notifier + 'static,
    D: ActorDirectory + 'static,
{
    let actor = resolve_actor!(headers, state);
    match state.service.add_candidate(&actor, draft) {
        Ok(commit) => commit_response(StatusCode::CREATED, commit),
        Err(error) => error_response(error),
    }
}

async fn get_candidate_handler<S, N, D>(
    State(state): State<RecruitmentState<S, N, D>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response
where
    S: DocumentStore + 'static,
    N: Notifier + 'static,
    D: ActorDirectory + 'static,
{
    let actor = resolve_actor!(headers, state);
    match state.service.candidate(&actor, &CandidateId(id)) {
        Ok(candidate) => (StatusCode::OK, Json(candidate)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn interview_level_handler<S, N, D>(
    State(state): State<RecruitmentState<S, N, D>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(request): Json<InterviewLevelRequest>,
) -> Response
where
    S: DocumentStore + 'static,
    N: Notifier + 'static,
    D: ActorDirectory + 'static,
{
    let actor = resolve_actor!(headers, state);
    match state
        .service
        .update_interview_level(&actor, &CandidateId(id), &request.interview_level)
    {
        Ok(commit) => commit_response(StatusCode::OK, commit),
        Err(error) => error_response(error),
    }
}

async fn feedback_handler<S, N, D>(
    State(state): State<RecruitmentState<S, N, D>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(draft): Json<FeedbackDraft>,
) -> Response
where
    S: DocumentStore + 'static,
    N: Notifier + 'static,
    D: ActorDirectory + 'static,
{
    let actor = resolve_actor!(headers, state);
    match state.service.record_feedback(&actor, &CandidateId(id), draft) {
        Ok(commit) => {
            let mut body = json!({ "feedback": commit.record.feedback });
            if let Some(warning) = commit.warning {
                body["warning"] = json!(warning);
            }
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(error) => error_response(error),
    }
}

async fn create_project_handler<S, N, D>(
    State(state): State<RecruitmentState<S, N, D>>,
    headers: HeaderMap,
    Json(draft): Json<ProjectDraft>,
) -> Response
where
    S: DocumentStore + 'static,
    N: Notifier + 'static,
    D: ActorDirectory + 'static,
{
    let actor = resolve_actor!(headers, state);
    match state.service.create_project(&actor, draft) {
        Ok(commit) => commit_response(StatusCode::CREATED, commit),
        Err(error) => error_response(error),
    }
}

async fn list_projects_handler<S, N, D>(
    State(state): State<RecruitmentState<S, N, D>>,
    headers: HeaderMap,
) -> Response
where
    S: DocumentStore + 'static,
    N: Notifier + 'static,
    D: ActorDirectory + 'static,
{
    let actor = resolve_actor!(headers, state);
    match state.service.projects(&actor) {
        Ok(projects) => (StatusCode::OK, Json(projects)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn get_project_handler<S, N, D>(
    State(state): State<RecruitmentState<S, N, D>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response
where
    S: DocumentStore + 'static,
    N: Notifier + 'static,
    D: ActorDirectory + 'static,
{
    let actor = resolve_actor!(headers, state);
    match state.service.project(&actor, &ProjectId(id)) {
        Ok(project) => (StatusCode::OK, Json(project)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn update_project_handler<S, N, D>(
    State(state): State<RecruitmentState<S, N, D>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(patch): Json<ProjectPatch>,
) -> Response
where
    S: DocumentStore + 'static,
    N: Notifier + 'static,
    D: ActorDirectory + 'static,
{
    let actor = resolve_actor!(headers, state);
    match state.service.update_project(&actor, &ProjectId(id), patch) {
        Ok(commit) => commit_response(StatusCode::OK, commit),
        Err(error) => error_response(error),
    }
}

async fn delete_project_handler<S, N, D>(
    State(state): State<RecruitmentState<S, N, D>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response
where
    S: DocumentStore + 'static,
    N: Notifier + 'static,
    D: ActorDirectory + 'static,
{
    let actor = resolve_actor!(headers, state);
    let id = ProjectId(id);
    match state.service.delete_project(&actor, &id) {
        Ok(()) => (StatusCode::OK, Json(json!({ "deleted": id.0 }))).into_response(),
        Err(error) => error_response(error),
    }
}

async fn overview_handler<S, N, D>(
    State(state): State<RecruitmentState<S, N, D>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response
where
    S: DocumentStore + 'static,
    N: Notifier + 'static,
    D: ActorDirectory + 'static,
{
    let actor = resolve_actor!(headers, state);
    match state.service.overview(&actor, &ProjectId(id)) {
        Ok(overview) => (StatusCode::OK, Json(overview)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn dashboard_handler<S, N, D>(
    State(state): State<RecruitmentState<S, N, D>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response
where
    S: DocumentStore + 'static,
    N: Notifier + 'static,
    D: ActorDirectory + 'static,
{
    let actor = resolve_actor!(headers, state);
    match state.service.dashboard(&actor, &ProjectId(id)) {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn list_candidates_handler<S, N, D>(
    State(state): State<RecruitmentState<S, N, D>>,
    Path(id): Path<String>,
    Query(filter): Query<RoleFilter>,
    headers: HeaderMap,
) -> Response
where
    S: DocumentStore + 'static,
    N: Notifier + 'static,
    D: ActorDirectory + 'static,
{
    let actor = resolve_actor!(headers, state);
    match state
        .service
        .candidates(&actor, &ProjectId(id), filter.role.as_deref())
    {
        Ok(candidates) => (StatusCode::OK, Json(candidates)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn notifications_handler<S, N, D>(
    State(state): State<RecruitmentState<S, N, D>>,
    Query(query): Query<NotificationQuery>,
    headers: HeaderMap,
) -> Response
where
    S: DocumentStore + 'static,
    N: Notifier + 'static,
    D: ActorDirectory + 'static,
{
    let actor = resolve_actor!(headers, state);
    match state.service.notifications(&actor, query) {
        Ok(feed) => (StatusCode::OK, Json(feed)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn unread_count_handler<S, N, D>(
    State(state): State<RecruitmentState<S, N, D>>,
    headers: HeaderMap,
) -> Response
where
    S: DocumentStore + 'static,
    N: Notifier + 'static,
    D: ActorDirectory + 'static,
{
    let actor = resolve_actor!(headers, state);
    match state.service.unread_count(&actor) {
        Ok(count) => (StatusCode::OK, Json(json!({ "unread": count }))).into_response(),
        Err(error) => error_response(error),
    }
}

async fn mark_read_handler<S, N, D>(
    State(state): State<RecruitmentState<S, N, D>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response
where
    S: DocumentStore + 'static,
    N: Notifier + 'static,
    D: ActorDirectory + 'static,
{
    let actor = resolve_actor!(headers, state);
    match state.service.mark_read(&actor, &NotificationId(id)) {
        Ok(notification) => (StatusCode::OK, Json(notification)).into_response(),
        Err(error) => error_response(error),
    }
}

async fn mark_all_read_handler<S, N, D>(
    State(state): State<RecruitmentState<S, N, D>>,
    headers: HeaderMap,
) -> Response
where
    S: DocumentStore + 'static,
    N: Notifier + 'static,
    D: ActorDirectory + 'static,
{
    let actor = resolve_actor!(headers, state);
    match state.service.mark_all_read(&actor) {
        Ok(updated) => (StatusCode::OK, Json(json!({ "updated": updated }))).into_response(),
        Err(error) => error_response(error),
    }
}

async fn generate_notices_handler<S, N, D>(
    State(state): State<RecruitmentState<S, N, D>>,
    headers: HeaderMap,
    request: Option<Json<GenerateRequest>>,
) -> Response
where
    S: DocumentStore + 'static,
    N: Notifier + 'static,
    D: ActorDirectory + 'static,
{
    let actor = resolve_actor!(headers, state);
    let today = request
        .and_then(|Json(request)| request.today)
        .unwrap_or_else(|| Utc::now().date_naive());
    match state.service.generate_system_notices(&actor, today) {
        Ok(generated) => (StatusCode::OK, Json(json!({ "generated": generated }))).into_response(),
        Err(error) => error_response(error),
    }
}
