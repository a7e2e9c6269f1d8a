//! Todo List Component
//!
//! Heading with count, empty-state placeholder, and one card per todo.

use leptos::prelude::*;

use crate::components::TodoCard;
use crate::store::use_page_store;
use crate::view::PageViewStoreFields;

#[component]
pub fn TodoList() -> impl IntoView {
    let store = use_page_store();

    view! {
        <section class="todo-list">
            <h2 class="section-title">{move || store.heading().get()}</h2>
            {move || store.placeholder().get().map(|text| view! { <div class="empty-state">{text}</div> })}
            <For
                each=move || store.rows().get()
                key=|row| row.id.clone()
                children=move |row| view! { <TodoCard row=row /> }
            />
        </section>
    }
}
