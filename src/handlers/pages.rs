//! Web client pages. Every task operation goes through the HTTP API via
//! [`ApiClient`](crate::client::ApiClient).
use axum::{
    extract::{Form, Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use crate::client::{credential, Credential};
use crate::errors::ClientError;
use crate::models::{Task, TaskUpdate, TodoForm};
use crate::state::ClientState;
use super::auth::{redirect_with_error, FlashQuery};
use super::render::{escape_html, flash, Page};

#[derive(Debug, Deserialize)]
pub struct ToggleForm {
    pub title: String,
    pub content: String,
    pub status: bool,
}

// Credential for the current page, or where to send the user instead
async fn signed_in(session: &Session) -> Result<Credential, Response> {
    credential::load(session)
        .await
        .ok_or_else(|| Redirect::to("/login").into_response())
}

// Auth failures end the session; anything else is shown to the user
async fn login_again(session: &Session, err: &ClientError) -> Option<Response> {
    if !err.requires_login() {
        return None;
    }
    credential::clear(session).await;
    Some(redirect_with_error("/login", &err.to_string()))
}

pub async fn home() -> Redirect {
    Redirect::to("/todos")
}

/// Newest first.
pub fn sort_newest_first(tasks: &mut [Task]) {
    tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

fn render_task_rows(tasks: &[Task]) -> String {
    tasks.iter().map(|task| {
        let id = urlencoding::encode(&task.id);
        let done_class = if task.status { " done" } else { "" };
        let (toggle_value, toggle_label) = if task.status {
            ("false", "Mark as not done")
        } else {
            ("true", "Mark as done")
        };
        format!(
            r#"<div class="card{done_class}">
                <form method="post" action="/todos/{id}/toggle" class="toggle">
                    <input type="hidden" name="title" value="{title}">
                    <input type="hidden" name="content" value="{content}">
                    <input type="hidden" name="status" value="{toggle_value}">
                    <button type="submit">{toggle_label}</button>
                </form>
                <h2>{title}</h2>
                <p>{content}</p>
                <p class="meta">{created}</p>
                <div class="actions">
                    <a href="/todos/{id}/edit" class="edit-btn">Edit</a>
                    <form method="post" action="/todos/{id}/delete">
                        <button type="submit" class="delete-btn">Delete</button>
                    </form>
                </div>
            </div>"#,
            done_class = done_class,
            id = id,
            title = escape_html(&task.title),
            content = escape_html(&task.content),
            toggle_value = toggle_value,
            toggle_label = toggle_label,
            created = task.created_at.format("%Y-%m-%d %H:%M:%S"),
        )
    }).collect::<Vec<_>>().join("\n")
}

pub async fn serve_todo_list(
    State(state): State<ClientState>,
    session: Session,
    Query(query): Query<FlashQuery>,
) -> Response {
    let credential = match signed_in(&session).await {
        Ok(credential) => credential,
        Err(redirect) => return redirect,
    };

    let page = Page::new("todos.html")
        .text("display_name", &credential.display_name)
        .html("message", flash("message", query.message.as_deref()));

    match state.api.list(&credential.token).await {
        Ok(mut tasks) => {
            sort_newest_first(&mut tasks);
            tracing::debug!("Rendering {} todos", tasks.len());
            page.html("error", flash("error", query.error.as_deref()))
                .html("todos", render_task_rows(&tasks))
                .render()
        }
        Err(e) => {
            if let Some(redirect) = login_again(&session, &e).await {
                return redirect;
            }
            tracing::error!("Error fetching todos: {}", e);
            page.html("error", flash("error", Some("Failed to load todos. Please try again later.")))
                .html("todos", String::new())
                .render()
        }
    }
}

fn todo_form_page(heading: &str, action: &str, title: &str, content: &str, error: Option<&str>) -> Response {
    Page::new("todo_form.html")
        .text("heading", heading)
        .text("action", action)
        .text("title", title)
        .text("content", content)
        .html("error", flash("error", error))
        .render()
}

fn missing_fields(form: &TodoForm) -> bool {
    form.title.trim().is_empty() || form.content.trim().is_empty()
}

pub async fn serve_create_page() -> Response {
    todo_form_page("Create todo", "/todos/create", "", "", None)
}

pub async fn handle_create(
    State(state): State<ClientState>,
    session: Session,
    Form(form): Form<TodoForm>,
) -> Response {
    let credential = match signed_in(&session).await {
        Ok(credential) => credential,
        Err(redirect) => return redirect,
    };

    if missing_fields(&form) {
        return todo_form_page("Create todo", "/todos/create", &form.title, &form.content,
            Some("Please fill in both fields!"));
    }

    match state.api.create(&credential.token, &form.title, &form.content).await {
        Ok(id) => {
            tracing::info!("Created todo {}", id);
            Redirect::to("/todos").into_response()
        }
        Err(e) => {
            if let Some(redirect) = login_again(&session, &e).await {
                return redirect;
            }
            todo_form_page("Create todo", "/todos/create", &form.title, &form.content,
                Some(&format!("Error creating todo: {}", e)))
        }
    }
}

pub async fn serve_edit_page(
    State(state): State<ClientState>,
    session: Session,
    Path(id): Path<String>,
) -> Response {
    let credential = match signed_in(&session).await {
        Ok(credential) => credential,
        Err(redirect) => return redirect,
    };
    let action = format!("/todos/{}/edit", urlencoding::encode(&id));

    match state.api.get(&credential.token, &id).await {
        Ok(task) => todo_form_page("Edit todo", &action, &task.title, &task.content, None),
        Err(e) => {
            if let Some(redirect) = login_again(&session, &e).await {
                return redirect;
            }
            tracing::warn!("Error fetching todo {}: {}", id, e);
            redirect_with_error("/todos", "Error fetching todo data")
        }
    }
}

pub async fn handle_edit(
    State(state): State<ClientState>,
    session: Session,
    Path(id): Path<String>,
    Form(form): Form<TodoForm>,
) -> Response {
    let credential = match signed_in(&session).await {
        Ok(credential) => credential,
        Err(redirect) => return redirect,
    };
    let action = format!("/todos/{}/edit", urlencoding::encode(&id));

    if missing_fields(&form) {
        return todo_form_page("Edit todo", &action, &form.title, &form.content,
            Some("Please fill in both fields!"));
    }

    // The form only carries title and content; keep the current status
    let result = match state.api.get(&credential.token, &id).await {
        Ok(current) => {
            let update = TaskUpdate { title: form.title.clone(), content: form.content.clone(), status: current.status };
            state.api.update(&credential.token, &id, &update).await
        }
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => Redirect::to("/todos").into_response(),
        Err(e) => {
            if let Some(redirect) = login_again(&session, &e).await {
                return redirect;
            }
            todo_form_page("Edit todo", &action, &form.title, &form.content,
                Some("Error updating todo. Please try again."))
        }
    }
}

pub async fn handle_toggle(
    State(state): State<ClientState>,
    session: Session,
    Path(id): Path<String>,
    Form(form): Form<ToggleForm>,
) -> Response {
    let credential = match signed_in(&session).await {
        Ok(credential) => credential,
        Err(redirect) => return redirect,
    };

    let update = TaskUpdate { title: form.title, content: form.content, status: form.status };
    match state.api.update(&credential.token, &id, &update).await {
        Ok(()) => Redirect::to("/todos").into_response(),
        Err(e) => {
            if let Some(redirect) = login_again(&session, &e).await {
                return redirect;
            }
            tracing::warn!("Error updating the status of {}: {}", id, e);
            redirect_with_error("/todos", "Error updating the status. Please try again.")
        }
    }
}

pub async fn handle_delete(
    State(state): State<ClientState>,
    session: Session,
    Path(id): Path<String>,
) -> Response {
    let credential = match signed_in(&session).await {
        Ok(credential) => credential,
        Err(redirect) => return redirect,
    };

    match state.api.delete(&credential.token, &id).await {
        Ok(()) => Redirect::to("/todos?message=todo%20deleted%20successfully!").into_response(),
        Err(e) => {
            if let Some(redirect) = login_again(&session, &e).await {
                return redirect;
            }
            tracing::warn!("Error deleting todo {}: {}", id, e);
            redirect_with_error("/todos", "Failed to delete the todo.")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn task(id: &str, title: &str, age_secs: i64, status: bool) -> Task {
        Task {
            id: id.into(),
            user_id: "u".into(),
            title: title.into(),
            content: "content".into(),
            status,
            created_at: Utc::now() - Duration::seconds(age_secs),
        }
    }

    #[test]
    fn sorts_newest_first() {
        let mut tasks = vec![task("old", "a", 300, false), task("new", "b", 0, false), task("mid", "c", 60, false)];
        sort_newest_first(&mut tasks);
        let ids: Vec<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "mid", "old"]);
    }

    #[test]
    fn rows_escape_content_and_offer_the_opposite_status() {
        let html = render_task_rows(&[task("t1", "<b>bold</b>", 0, true)]);
        assert!(html.contains("&lt;b&gt;bold&lt;/b&gt;"));
        assert!(!html.contains("<b>bold</b>"));
        assert!(html.contains(r#"name="status" value="false""#));
        assert!(html.contains("/todos/t1/delete"));
        assert!(html.contains("card done"));
    }
}
