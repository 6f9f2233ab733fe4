//! JSON handlers for `/api/todos`.
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use crate::errors::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::models::{
    CreateTodoRequest, CreatedResponse, MessageResponse, Task, TaskUpdate, TodoListResponse,
    UpdateTodoRequest,
};
use crate::state::AppState;

fn read_body<T>(payload: Result<Json<T>, JsonRejection>) -> AppResult<T> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        tracing::debug!("Rejected request body: {}", rejection.body_text());
        AppError::BadRequest(rejection.body_text())
    })
}

fn message(text: &str) -> Json<MessageResponse> {
    Json(MessageResponse { message: text.to_string() })
}

pub async fn create_todo(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    payload: Result<Json<CreateTodoRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<CreatedResponse>)> {
    let request = read_body(payload)?;

    let id = state
        .tasks
        .create(
            &user.uid,
            request.title.unwrap_or_default(),
            request.content.unwrap_or_default(),
        )
        .await
        .map_err(|e| AppError::from_task(e, "Failed to create todo"))?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse { id, message: "todo created".to_string() }),
    ))
}

pub async fn list_todos(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> AppResult<Json<TodoListResponse>> {
    let todos = state
        .tasks
        .list_mine(&user.uid)
        .await
        .map_err(|e| AppError::from_task(e, "Failed to fetch todos"))?;

    Ok(Json(TodoListResponse { todos }))
}

pub async fn get_todo(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<Task>> {
    let task = state
        .tasks
        .get_one(&user.uid, &id)
        .await
        .map_err(|e| AppError::from_task(e, "Failed to fetch todo"))?;

    Ok(Json(task))
}

pub async fn update_todo(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    payload: Result<Json<UpdateTodoRequest>, JsonRejection>,
) -> AppResult<Json<MessageResponse>> {
    let request = read_body(payload)?;
    let update = match (request.title, request.content, request.status) {
        (Some(title), Some(content), Some(status)) => TaskUpdate { title, content, status },
        _ => return Err(AppError::BadRequest("title, content and status are required".into())),
    };

    state
        .tasks
        .update(&user.uid, &id, update)
        .await
        .map_err(|e| AppError::from_task(e, "Failed to update todo"))?;

    Ok(message("todo updated"))
}

pub async fn delete_todo(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    state
        .tasks
        .delete(&user.uid, &id)
        .await
        .map_err(|e| AppError::from_task(e, "Failed to delete todo"))?;

    Ok(message("todo deleted"))
}
