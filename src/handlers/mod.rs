mod auth;
mod pages;
mod render;
mod todos;

pub use auth::{
    serve_login_page, serve_register_page, handle_login, handle_register, handle_logout,
    start_federated_login, finish_federated_login,
};
pub use pages::{
    home, serve_todo_list, serve_create_page, handle_create, serve_edit_page, handle_edit,
    handle_toggle, handle_delete,
};
pub use todos::{create_todo, list_todos, get_todo, update_todo, delete_todo};
