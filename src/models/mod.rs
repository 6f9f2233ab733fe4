mod account;
mod forms;
mod task;

pub use account::{Account, AuthEvent, Identity, Session};
pub use forms::{
    CreateTodoRequest, CreatedResponse, LoginForm, MessageResponse, RegisterForm, TodoForm,
    TodoListResponse, UpdateTodoRequest,
};
pub use task::{NewTask, Task, TaskUpdate};
