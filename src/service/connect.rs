//! Connect Client
//!
//! Unary Connect calls with the JSON codec: every procedure is a
//! `POST {base}/todo.v1.TodoService/{Method}` carrying the request message
//! as JSON. Failures come back as a non-2xx status with a `{code, message}`
//! body.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::{ServiceError, TodoService};
use crate::models::{NewTodo, Todo, TodoFilter, TodoList};

/// Fully-qualified protobuf service name
pub const SERVICE_NAME: &str = "todo.v1.TodoService";

#[derive(Serialize)]
struct DeleteTodoRequest<'a> {
    id: &'a str,
}

#[derive(Deserialize)]
struct CreateTodoResponse {
    todo: Todo,
}

#[derive(Deserialize)]
struct DeleteTodoResponse {}

#[derive(Deserialize)]
struct ConnectErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

/// HTTP client for the todo service
#[derive(Debug, Clone)]
pub struct ConnectTodoClient {
    base_url: String,
    http: reqwest::Client,
}

impl ConnectTodoClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub fn procedure_url(&self, method: &str) -> String {
        format!("{}/{}/{}", self.base_url, SERVICE_NAME, method)
    }

    async fn unary<Req, Resp>(&self, method: &str, request: &Req) -> Result<Resp, ServiceError>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let url = self.procedure_url(method);
        log::debug!("[RPC] {} -> {}", method, url);

        let response = self
            .http
            .post(&url)
            .header("Connect-Protocol-Version", "1")
            .json(request)
            .send()
            .await
            .map_err(|e| ServiceError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| ServiceError::Transport(e.to_string()))?;

        if !(200..300).contains(&status) {
            let err = decode_error(status, &body);
            log::debug!("[RPC] {} failed: {}", method, err);
            return Err(err);
        }
        serde_json::from_str(&body).map_err(|e| ServiceError::Decode(e.to_string()))
    }
}

/// Turn a failed Connect response into a [`ServiceError`]
fn decode_error(status: u16, body: &str) -> ServiceError {
    match serde_json::from_str::<ConnectErrorBody>(body) {
        Ok(err) if !err.code.is_empty() => ServiceError::from_code(&err.code, err.message),
        _ => ServiceError::Rpc {
            code: code_for_status(status).to_string(),
            message: format!("HTTP {}", status),
        },
    }
}

/// Connect's fallback mapping for responses without an error body
fn code_for_status(status: u16) -> &'static str {
    match status {
        400 => "internal",
        401 => "unauthenticated",
        403 => "permission_denied",
        404 => "unimplemented",
        429 | 502 | 503 | 504 => "unavailable",
        _ => "unknown",
    }
}

#[async_trait(?Send)]
impl TodoService for ConnectTodoClient {
    async fn list_todos(&self, filter: &TodoFilter) -> Result<TodoList, ServiceError> {
        self.unary("ListTodos", filter).await
    }

    async fn create_todo(&self, todo: &NewTodo) -> Result<Todo, ServiceError> {
        let response: CreateTodoResponse = self.unary("CreateTodo", todo).await?;
        Ok(response.todo)
    }

    async fn delete_todo(&self, id: &str) -> Result<(), ServiceError> {
        let _: DeleteTodoResponse = self.unary("DeleteTodo", &DeleteTodoRequest { id }).await?;
        Ok(())
    }
}
