//! Page View Model
//!
//! Pure snapshot of what the page shows, derived from the list query state,
//! the draft and the mutation flags. Components only render these values.

use query_cache::{QueryState, QueryStatus};
use reactive_stores::Store;

use crate::models::{DraftTodo, Todo, TodoList};

pub const PAGE_TITLE: &str = "Todos";
pub const LOADING_TEXT: &str = "Loading todos...";
pub const EMPTY_TEXT: &str = "No todos found. Create your first todo above!";

pub const CREATE_LABEL: &str = "Create Todo";
pub const CREATING_LABEL: &str = "Creating...";
pub const DELETE_LABEL: &str = "Delete";
pub const DELETING_LABEL: &str = "Deleting...";

/// Which branch of the page is shown
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Loading,
    /// Full error text, shown instead of the form and list
    Failed(String),
    Ready,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormView {
    pub title: String,
    pub description: String,
    pub submit_label: &'static str,
    pub submit_disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TodoRowView {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub priority: String,
    pub category: Option<String>,
    pub status: String,
    pub completed: bool,
    pub delete_label: &'static str,
    pub delete_disabled: bool,
}

/// Whole-page snapshot with field-level reactivity
#[derive(Debug, Clone, PartialEq, Eq, Store)]
pub struct PageView {
    pub phase: Phase,
    pub form: FormView,
    /// "Your Todos (N)"
    pub heading: String,
    pub count: usize,
    pub rows: Vec<TodoRowView>,
    /// Shown when the snapshot is empty or absent
    pub placeholder: Option<&'static str>,
}

pub fn render(list: &QueryState<TodoList>, draft: &DraftTodo, creating: bool, deleting: bool) -> PageView {
    let phase = match (list.status(), &list.error) {
        (QueryStatus::Error, Some(err)) => Phase::Failed(format!("Error loading todos: {}", err)),
        (QueryStatus::Success, _) => Phase::Ready,
        _ => Phase::Loading,
    };

    let rows: Vec<TodoRowView> = match (&phase, list.data.as_deref()) {
        (Phase::Ready, Some(snapshot)) => snapshot.todos.iter().map(|todo| render_row(todo, deleting)).collect(),
        _ => Vec::new(),
    };
    let count = rows.len();

    PageView {
        phase,
        form: FormView {
            title: draft.title.clone(),
            description: draft.description.clone(),
            submit_label: if creating { CREATING_LABEL } else { CREATE_LABEL },
            submit_disabled: creating,
        },
        heading: format!("Your Todos ({})", count),
        count,
        placeholder: rows.is_empty().then_some(EMPTY_TEXT),
        rows,
    }
}

fn render_row(todo: &Todo, deleting: bool) -> TodoRowView {
    TodoRowView {
        id: todo.id.clone(),
        title: todo.title.clone(),
        description: todo.description().map(str::to_string),
        priority: format!("Priority: {}", todo.priority.label()),
        category: todo.category().map(|c| format!("Category: {}", c)),
        status: format!("Status: {}", todo.status_label()),
        completed: todo.completed,
        delete_label: if deleting { DELETING_LABEL } else { DELETE_LABEL },
        delete_disabled: deleting,
    }
}
