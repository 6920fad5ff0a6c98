//! Endpoint handlers. Each one delegates to a service on [`AppState`].
//!
//! Service calls run on the blocking pool because the JSON store writes and
//! syncs its snapshot on every mutation.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use super::error::{ApiError, ApiResult};
use super::models::{
    ApprovalRequest, CreateBudgetItemRequest, CreateTaskRequest, CreateUserRequest,
    GenerateSubtasksRequest, GenerateSubtasksResponse, HealthResponse, SubmitExpenseRequest,
    UpdateSubtaskStatusRequest,
};
use super::routes::AppState;
use crate::core::{NewTask, RegenerationReport, Services};
use crate::domain::{ApprovalDecision, RecurrenceSpec};

async fn blocking<T, F>(state: &AppState, call: F) -> ApiResult<T>
where
    F: FnOnce(&Services) -> crate::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let services = Arc::clone(&state.services);
    let value = tokio::task::spawn_blocking(move || call(&services))
        .await
        .map_err(|err| ApiError::Internal(format!("service call aborted: {err}")))??;
    Ok(value)
}

fn generation_response(report: RegenerationReport) -> GenerateSubtasksResponse {
    GenerateSubtasksResponse {
        count: report.count(),
        truncated: report.truncated,
        failed: report.failed.into_iter().map(Into::into).collect(),
        subtasks: report.subtasks,
    }
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
    })
}

/// POST /api/tasks
pub async fn create_task(
    State(state): State<AppState>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<impl IntoResponse> {
    let task = blocking(&state, move |services| {
        services.tasks.create_task(NewTask {
            title: req.title,
            start_date: req.start_date,
            end_date: req.end_date,
            recurrence: req.recurrence,
        })
    })
    .await?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// PUT /api/tasks/:id/recurrence
pub async fn set_recurrence(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(spec): Json<RecurrenceSpec>,
) -> ApiResult<Json<GenerateSubtasksResponse>> {
    let report = blocking(&state, move |services| services.tasks.set_recurrence(id, spec)).await?;
    Ok(Json(generation_response(report)))
}

/// POST /api/generate-subtasks
pub async fn generate_subtasks(
    State(state): State<AppState>,
    Json(req): Json<GenerateSubtasksRequest>,
) -> ApiResult<Json<GenerateSubtasksResponse>> {
    let report = blocking(&state, move |services| {
        services.tasks.regenerate_subtasks(req.parent_task_id)
    })
    .await?;
    Ok(Json(generation_response(report)))
}

/// GET /api/tasks/:id/subtasks
pub async fn list_subtasks(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let subtasks = blocking(&state, move |services| services.tasks.subtasks(id)).await?;
    Ok(Json(subtasks))
}

/// PATCH /api/subtasks/:id/status
pub async fn update_subtask_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateSubtaskStatusRequest>,
) -> ApiResult<impl IntoResponse> {
    let subtask = blocking(&state, move |services| {
        services.tasks.set_subtask_status(id, req.status)
    })
    .await?;
    Ok(Json(subtask))
}

/// POST /api/budget-items
pub async fn create_budget_item(
    State(state): State<AppState>,
    Json(req): Json<CreateBudgetItemRequest>,
) -> ApiResult<impl IntoResponse> {
    let item = blocking(&state, move |services| {
        services.budgets.create_budget_item(req.name, req.planned_amount)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// GET /api/budget-items/:id/status
pub async fn budget_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let status = blocking(&state, move |services| services.budgets.status(id)).await?;
    Ok(Json(status))
}

/// POST /api/expenses
pub async fn submit_expense(
    State(state): State<AppState>,
    Json(req): Json<SubmitExpenseRequest>,
) -> ApiResult<impl IntoResponse> {
    let expense = blocking(&state, move |services| {
        services
            .expenses
            .submit_expense(req.budget_item_id, req.amount, req.description)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(expense)))
}

/// GET /api/expenses/:id
pub async fn get_expense(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let expense = blocking(&state, move |services| services.expenses.expense(id)).await?;
    Ok(Json(expense))
}

/// POST /api/expenses/:id/approve
pub async fn submit_approval(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ApprovalRequest>,
) -> ApiResult<impl IntoResponse> {
    let decision = ApprovalDecision::parse(&req.decision).ok_or_else(|| {
        ApiError::BadRequest(format!(
            "unknown decision `{}`; expected approve or reject",
            req.decision
        ))
    })?;
    let result = blocking(&state, move |services| {
        services
            .expenses
            .submit_approval(id, req.approver_id, decision, req.comment)
    })
    .await?;
    Ok(Json(result))
}

/// POST /api/users
pub async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> ApiResult<impl IntoResponse> {
    let user = blocking(&state, move |services| {
        services.users.register_user(&req.name, &req.role)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(user)))
}
