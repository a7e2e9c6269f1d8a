//! Todo Card Component
//!
//! One todo in the list, with its delete button.

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::context::PageContext;
use crate::store::use_page_store;
use crate::view::{PageViewStoreFields, TodoRowView, DELETE_LABEL};

/// A single todo row
#[component]
pub fn TodoCard(row: TodoRowView) -> impl IntoView {
    let ctx = use_context::<PageContext>().expect("PageContext should be provided");
    let store = use_page_store();

    let TodoRowView {
        id,
        title,
        description,
        priority,
        category,
        status,
        completed,
        ..
    } = row;

    // Busy state changes without the card being recreated
    let busy_id = id.clone();
    let delete_state = Memo::new(move |_| {
        store.rows().with(|rows| {
            rows.iter()
                .find(|row| row.id == busy_id)
                .map(|row| (row.delete_label, row.delete_disabled))
                .unwrap_or((DELETE_LABEL, false))
        })
    });

    let on_delete = move |_: web_sys::MouseEvent| {
        let Some(page) = ctx.page() else { return };
        let id = id.clone();
        spawn_local(async move {
            // Failures are logged by the page; the row stays until a refetch says otherwise
            let _ = page.delete_todo(&id).await;
            ctx.refresh();
        });
    };

    view! {
        <div class={if completed { "todo-card completed" } else { "todo-card" }}>
            <div class="todo-card-body">
                <h3 class="todo-title">{title}</h3>
                {description.map(|text| view! { <p class="todo-description">{text}</p> })}
                <div class="todo-meta">
                    <span>{priority}</span>
                    {category.map(|text| view! { <span>{text}</span> })}
                    <span>{status}</span>
                </div>
            </div>
            <button
                class="delete-btn"
                disabled=move || delete_state.get().1
                on:click=on_delete
            >
                {move || delete_state.get().0}
            </button>
        </div>
    }
}
