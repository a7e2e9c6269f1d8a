//! In-process todo service for tests.
//!
//! Behaves like the real service (newest first, filter on completion /
//! priority / category, `page_size` limit, not-found on unknown ids) and
//! records every call. Calls can be held in flight with [`FakeTodoService::hold_calls`].

use std::cell::RefCell;
use std::rc::Rc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Notify;

use super::{ServiceError, TodoService};
use crate::models::{NewTodo, Todo, TodoFilter, TodoList};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    List(TodoFilter),
    Create(NewTodo),
    Delete(String),
}

#[derive(Default)]
pub struct FakeTodoService {
    todos: RefCell<Vec<Todo>>,
    calls: RefCell<Vec<Call>>,
    list_failure: RefCell<Option<ServiceError>>,
    create_failure: RefCell<Option<ServiceError>>,
    delete_failure: RefCell<Option<ServiceError>>,
    gate: RefCell<Option<Rc<Notify>>>,
}

impl FakeTodoService {
    /// Service holding `todos`, newest first
    pub fn with_todos(todos: Vec<Todo>) -> Self {
        let service = Self::default();
        *service.todos.borrow_mut() = todos;
        service
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn list_calls(&self) -> usize {
        self.calls.borrow().iter().filter(|call| matches!(call, Call::List(_))).count()
    }

    pub fn create_calls(&self) -> Vec<NewTodo> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                Call::Create(todo) => Some(todo.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn delete_calls(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                Call::Delete(id) => Some(id.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn fail_next_list(&self, err: ServiceError) {
        *self.list_failure.borrow_mut() = Some(err);
    }

    pub fn fail_next_create(&self, err: ServiceError) {
        *self.create_failure.borrow_mut() = Some(err);
    }

    pub fn fail_next_delete(&self, err: ServiceError) {
        *self.delete_failure.borrow_mut() = Some(err);
    }

    /// Calls made from now on wait until [`release_calls`](Self::release_calls)
    pub fn hold_calls(&self) {
        *self.gate.borrow_mut() = Some(Rc::new(Notify::new()));
    }

    /// Let every held call continue and stop holding new ones
    pub fn release_calls(&self) {
        if let Some(gate) = self.gate.borrow_mut().take() {
            gate.notify_waiters();
        }
    }

    async fn wait_if_held(&self) {
        let gate = self.gate.borrow().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
    }
}

fn matches_filter(filter: &TodoFilter, todo: &Todo) -> bool {
    filter.completed.map_or(true, |completed| todo.completed == completed)
        && filter.priority.map_or(true, |priority| todo.priority == priority)
        && filter.category.as_deref().map_or(true, |category| category.is_empty() || todo.category == category)
}

#[async_trait(?Send)]
impl TodoService for FakeTodoService {
    async fn list_todos(&self, filter: &TodoFilter) -> Result<TodoList, ServiceError> {
        self.calls.borrow_mut().push(Call::List(filter.clone()));
        self.wait_if_held().await;
        if let Some(err) = self.list_failure.borrow_mut().take() {
            return Err(err);
        }

        let todos = self.todos.borrow();
        let matching: Vec<Todo> = todos.iter().filter(|todo| matches_filter(filter, todo)).cloned().collect();
        let total = matching.len() as i32;
        let limit = if filter.page_size > 0 { filter.page_size as usize } else { matching.len() };
        Ok(TodoList {
            todos: matching.into_iter().take(limit).collect(),
            total_count: Some(total),
        })
    }

    async fn create_todo(&self, todo: &NewTodo) -> Result<Todo, ServiceError> {
        self.calls.borrow_mut().push(Call::Create(todo.clone()));
        self.wait_if_held().await;
        if let Some(err) = self.create_failure.borrow_mut().take() {
            return Err(err);
        }
        if todo.title.trim().is_empty() {
            return Err(ServiceError::InvalidArgument("title is required".into()));
        }

        let now = Utc::now();
        let created = Todo {
            id: uuid::Uuid::new_v4().to_string(),
            title: todo.title.clone(),
            description: todo.description.clone(),
            completed: false,
            priority: todo.priority,
            category: todo.category.clone(),
            due_date: todo.due_date,
            created_at: Some(now),
            updated_at: Some(now),
        };
        self.todos.borrow_mut().insert(0, created.clone());
        Ok(created)
    }

    async fn delete_todo(&self, id: &str) -> Result<(), ServiceError> {
        self.calls.borrow_mut().push(Call::Delete(id.to_string()));
        self.wait_if_held().await;
        if let Some(err) = self.delete_failure.borrow_mut().take() {
            return Err(err);
        }

        let mut todos = self.todos.borrow_mut();
        let before = todos.len();
        todos.retain(|todo| todo.id != id);
        if todos.len() == before {
            return Err(ServiceError::NotFound(id.to_string()));
        }
        Ok(())
    }
}
