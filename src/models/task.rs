use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

/// A persisted to-do record.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub content: String,
    pub status: bool,
    pub created_at: DateTime<Utc>,
}

/// Fields the store needs to insert a record; the id is assigned by the store.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub user_id: String,
    pub title: String,
    pub content: String,
    pub status: bool,
    pub created_at: DateTime<Utc>,
}

impl NewTask {
    pub fn into_task(self, id: String) -> Task {
        Task {
            id,
            user_id: self.user_id,
            title: self.title,
            content: self.content,
            status: self.status,
            created_at: self.created_at,
        }
    }
}

// The three mutable fields, written together on update
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TaskUpdate {
    pub title: String,
    pub content: String,
    pub status: bool,
}

impl TaskUpdate {
    pub fn apply(self, task: &mut Task) {
        task.title = self.title;
        task.content = self.content;
        task.status = self.status;
    }
}
