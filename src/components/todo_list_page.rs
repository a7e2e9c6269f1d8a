//! Todo List Page Component
//!
//! Route-level view: loading and error states, or the form and the list.

use leptos::prelude::*;

use crate::components::{NewTodoForm, TodoList};
use crate::store::use_page_store;
use crate::view::{PageViewStoreFields, Phase, LOADING_TEXT, PAGE_TITLE};

#[component]
pub fn TodoListView() -> impl IntoView {
    let store = use_page_store();
    let is_ready = Memo::new(move |_| store.phase().with(|phase| *phase == Phase::Ready));

    view! {
        <div class="todo-page">
            <h1 class="page-title">{PAGE_TITLE}</h1>
            {move || match store.phase().get() {
                Phase::Loading => Some(view! { <div class="loading">{LOADING_TEXT}</div> }.into_any()),
                Phase::Failed(message) => Some(view! { <div class="error">{message}</div> }.into_any()),
                Phase::Ready => None,
            }}
            <Show when=move || is_ready.get()>
                <NewTodoForm />
                <TodoList />
            </Show>
        </div>
    }
}
