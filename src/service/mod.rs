//! Todo Service Client
//!
//! The page talks to the todo service only through [`TodoService`].

mod connect;
#[cfg(test)]
pub mod fake;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{NewTodo, Todo, TodoFilter, TodoList};

pub use connect::{ConnectTodoClient, SERVICE_NAME};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ServiceError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("[{code}] {message}")]
    Rpc { code: String, message: String },
    #[error("failed to decode response: {0}")]
    Decode(String),
    #[error("todo not found: {0}")]
    NotFound(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl ServiceError {
    /// Map a Connect error code to the matching variant
    pub fn from_code(code: &str, message: String) -> Self {
        match code {
            "not_found" => ServiceError::NotFound(message),
            "invalid_argument" => ServiceError::InvalidArgument(message),
            _ => ServiceError::Rpc { code: code.to_string(), message },
        }
    }
}

/// Remote todo operations consumed by the page.
///
/// Futures are not `Send`: in the browser they run on the single UI thread.
#[async_trait(?Send)]
pub trait TodoService {
    async fn list_todos(&self, filter: &TodoFilter) -> Result<TodoList, ServiceError>;

    async fn create_todo(&self, todo: &NewTodo) -> Result<Todo, ServiceError>;

    async fn delete_todo(&self, id: &str) -> Result<(), ServiceError>;
}
