//! Task storage seam and an in-memory reference implementation.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::StoreError;
use crate::priority::Priority;
use crate::todo::TodoDraft;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub owner_id: String,
    pub title: String,
    pub due_date: Option<NaiveDate>,
    pub due_time: Option<NaiveTime>,
    pub priority: Priority,
    pub category: String,
    pub description: String,
    pub completed: bool,
}

/// Fields to change on an existing task. `None` leaves a field as it is.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub due_date: Option<Option<NaiveDate>>,
    pub due_time: Option<Option<NaiveTime>>,
    pub priority: Option<Priority>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
}

impl TaskPatch {
    fn apply(self, task: &mut Task) {
        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
        if let Some(due_time) = self.due_time {
            task.due_time = due_time;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(category) = self.category {
            task.category = category;
        }
        if let Some(description) = self.description {
            task.description = description;
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
    }
}

pub trait TaskStore {
    fn create_task(&mut self, owner_id: &str, draft: TodoDraft) -> Result<Task, StoreError>;
    /// Tasks of `owner_id`, ordered by id.
    fn list_tasks(&self, owner_id: &str) -> Vec<Task>;
    fn update_task(&mut self, id: u64, patch: TaskPatch) -> Result<Task, StoreError>;
    fn delete_task(&mut self, id: u64) -> Result<(), StoreError>;
    fn toggle_task(&mut self, id: u64, completed: bool) -> Result<Task, StoreError>;
}

#[derive(Debug, Default)]
pub struct InMemoryTaskStore {
    tasks: BTreeMap<u64, Task>,
    next_id: u64,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TaskStore for InMemoryTaskStore {
    fn create_task(&mut self, owner_id: &str, draft: TodoDraft) -> Result<Task, StoreError> {
        if draft.title.trim().is_empty() {
            return Err(StoreError::EmptyTitle);
        }
        self.next_id += 1;
        let task = Task {
            id: self.next_id,
            owner_id: owner_id.to_string(),
            title: draft.title,
            due_date: Some(draft.due_date),
            due_time: draft.due_time,
            priority: draft.priority,
            category: draft.category,
            description: draft.description,
            completed: false,
        };
        debug!(id = task.id, owner = owner_id, "task created");
        self.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    fn list_tasks(&self, owner_id: &str) -> Vec<Task> {
        self.tasks
            .values()
            .filter(|task| task.owner_id == owner_id)
            .cloned()
            .collect()
    }

    fn update_task(&mut self, id: u64, patch: TaskPatch) -> Result<Task, StoreError> {
        if patch.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(StoreError::EmptyTitle);
        }
        let task = self.tasks.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        patch.apply(task);
        Ok(task.clone())
    }

    fn delete_task(&mut self, id: u64) -> Result<(), StoreError> {
        self.tasks
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound(id))
    }

    fn toggle_task(&mut self, id: u64, completed: bool) -> Result<Task, StoreError> {
        self.update_task(
            id,
            TaskPatch {
                completed: Some(completed),
                ..TaskPatch::default()
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(title: &str) -> TodoDraft {
        TodoDraft {
            title: title.to_string(),
            due_date: NaiveDate::from_ymd_opt(2024, 1, 11).unwrap(),
            due_time: NaiveTime::from_hms_opt(9, 0, 0),
            priority: Priority::High,
            category: "general".to_string(),
            description: String::new(),
            raw_text: format!("明天上午9点{title}"),
            parsed_by: "rules".to_string(),
        }
    }

    #[test]
    fn create_and_list_by_owner() {
        let mut store = InMemoryTaskStore::new();
        let a = store.create_task("alice", draft("开会")).unwrap();
        store.create_task("bob", draft("买菜")).unwrap();
        let c = store.create_task("alice", draft("写周报")).unwrap();

        assert_eq!(a.id, 1);
        assert!(!a.completed);
        let titles: Vec<_> = store
            .list_tasks("alice")
            .into_iter()
            .map(|t| (t.id, t.title))
            .collect();
        assert_eq!(titles, vec![(a.id, "开会".to_string()), (c.id, "写周报".to_string())]);
        assert!(store.list_tasks("carol").is_empty());
    }

    #[test]
    fn empty_title_is_rejected() {
        let mut store = InMemoryTaskStore::new();
        assert_eq!(store.create_task("alice", draft("  ")), Err(StoreError::EmptyTitle));
    }

    #[test]
    fn update_applies_only_given_fields() {
        let mut store = InMemoryTaskStore::new();
        let task = store.create_task("alice", draft("开会")).unwrap();
        let updated = store
            .update_task(
                task.id,
                TaskPatch {
                    title: Some("部门会议".to_string()),
                    due_time: Some(None),
                    ..TaskPatch::default()
                },
            )
            .unwrap();
        assert_eq!(updated.title, "部门会议");
        assert_eq!(updated.due_time, None);
        assert_eq!(updated.due_date, task.due_date);
        assert_eq!(updated.priority, Priority::High);
    }

    #[test]
    fn toggle_and_delete() {
        let mut store = InMemoryTaskStore::new();
        let task = store.create_task("alice", draft("开会")).unwrap();
        assert!(store.toggle_task(task.id, true).unwrap().completed);
        assert!(!store.toggle_task(task.id, false).unwrap().completed);

        store.delete_task(task.id).unwrap();
        assert_eq!(store.delete_task(task.id), Err(StoreError::NotFound(task.id)));
        assert_eq!(store.toggle_task(task.id, true), Err(StoreError::NotFound(task.id)));
    }
}
