use axum::http::StatusCode;
use reqwest::{RequestBuilder, Response};
use serde::Deserialize;
use crate::errors::{ClientError, ClientResult};
use crate::models::{
    CreateTodoRequest, CreatedResponse, Task, TaskUpdate, TodoListResponse,
};

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// Talks to `/api/todos` over HTTP with the caller's bearer token.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn todos_url(&self) -> String {
        format!("{}/api/todos", self.base_url)
    }

    fn todo_url(&self, id: &str) -> String {
        format!("{}/api/todos/{}", self.base_url, urlencoding::encode(id))
    }

    pub async fn list(&self, token: &str) -> ClientResult<Vec<Task>> {
        let response = send(self.http.get(self.todos_url()), token).await?;
        Ok(response.json::<TodoListResponse>().await?.todos)
    }

    pub async fn get(&self, token: &str, id: &str) -> ClientResult<Task> {
        let response = send(self.http.get(self.todo_url(id)), token).await?;
        Ok(response.json().await?)
    }

    pub async fn create(&self, token: &str, title: &str, content: &str) -> ClientResult<String> {
        let body = CreateTodoRequest {
            title: Some(title.to_string()),
            content: Some(content.to_string()),
        };
        let response = send(self.http.post(self.todos_url()).json(&body), token).await?;
        Ok(response.json::<CreatedResponse>().await?.id)
    }

    pub async fn update(&self, token: &str, id: &str, update: &TaskUpdate) -> ClientResult<()> {
        send(self.http.put(self.todo_url(id)).json(update), token).await?;
        Ok(())
    }

    pub async fn delete(&self, token: &str, id: &str) -> ClientResult<()> {
        send(self.http.delete(self.todo_url(id)), token).await?;
        Ok(())
    }
}

async fn send(request: RequestBuilder, token: &str) -> ClientResult<Response> {
    let response = request.bearer_auth(token).send().await?;
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status().as_u16();
    let message = match response.json::<ErrorBody>().await {
        Ok(body) => body.error,
        Err(_) => format!("Request failed with status {}", status),
    };
    tracing::debug!("Todo API answered {}: {}", status, message);
    Err(classify(status, message))
}

fn classify(status: u16, message: String) -> ClientError {
    if status == StatusCode::UNAUTHORIZED.as_u16() {
        ClientError::Unauthenticated
    } else if status == StatusCode::FORBIDDEN.as_u16() && message == "Invalid token" {
        ClientError::InvalidCredential
    } else {
        ClientError::Api { status, message }
    }
}
