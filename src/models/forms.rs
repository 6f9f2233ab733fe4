use serde::{Deserialize, Serialize};
use super::task::Task;

// API request bodies. Fields are optional so that a missing field becomes a
// 400 with the usual error body instead of an extractor rejection.
#[derive(Debug, Deserialize, Serialize, Default)]
pub struct CreateTodoRequest {
    pub title: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct UpdateTodoRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub status: Option<bool>,
}

// API response bodies
#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub id: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TodoListResponse {
    pub todos: Vec<Task>,
}

// Web client forms
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub display_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Deserialize)]
pub struct TodoForm {
    pub title: String,
    pub content: String,
}
