//! New Todo Form Component
//!
//! Title and description inputs bound to the page's draft.

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::context::PageContext;
use crate::store::use_page_store;
use crate::view::PageViewStoreFields;

/// Form for creating a new todo
#[component]
pub fn NewTodoForm() -> impl IntoView {
    let ctx = use_context::<PageContext>().expect("PageContext should be provided");
    let store = use_page_store();

    let create_todo = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let Some(page) = ctx.page() else { return };
        spawn_local(async move {
            page.submit().await;
            ctx.refresh();
        });
    };

    let on_title = move |ev: web_sys::Event| {
        if let Some(page) = ctx.page() {
            page.set_title(event_target_value(&ev));
            ctx.refresh();
        }
    };

    let on_description = move |ev: web_sys::Event| {
        if let Some(page) = ctx.page() {
            page.set_description(event_target_value(&ev));
            ctx.refresh();
        }
    };

    view! {
        <form class="new-todo-form" on:submit=create_todo>
            <h2 class="section-title">"Create New Todo"</h2>
            <div class="form-field">
                <label for="title">"Title"</label>
                <input
                    id="title"
                    type="text"
                    placeholder="Enter todo title"
                    required
                    prop:value=move || store.form().with(|form| form.title.clone())
                    on:input=on_title
                />
            </div>
            <div class="form-field">
                <label for="description">"Description"</label>
                <textarea
                    id="description"
                    placeholder="Enter todo description"
                    rows="3"
                    prop:value=move || store.form().with(|form| form.description.clone())
                    on:input=on_description
                />
            </div>
            <button
                type="submit"
                class="submit-btn"
                disabled=move || store.form().with(|form| form.submit_disabled)
            >
                {move || store.form().with(|form| form.submit_label)}
            </button>
        </form>
    }
}
