//! UI Components
//!
//! Leptos components rendering the page store.

mod new_todo_form;
mod todo_card;
mod todo_list;
mod todo_list_page;

pub use new_todo_form::NewTodoForm;
pub use todo_card::TodoCard;
pub use todo_list::TodoList;
pub use todo_list_page::TodoListView;
