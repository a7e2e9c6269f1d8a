//! Todo Page App
//!
//! Wires the service client, query cache and page controller together and
//! mounts the todo list route.

use std::rc::Rc;

use leptos::prelude::*;
use leptos::task::spawn_local;
use query_cache::QueryClient;
use reactive_stores::Store;

use crate::components::TodoListView;
use crate::config::PageConfig;
use crate::context::PageContext;
use crate::page::TodoListPage;
use crate::service::{ConnectTodoClient, TodoService};

#[component]
pub fn App(config: PageConfig) -> impl IntoView {
    log::info!("[APP] Using todo service at {}", config.api_url);
    let service: Rc<dyn TodoService> = Rc::new(ConnectTodoClient::new(&config.api_url));
    // Invalidated queries refetch in the background on the UI event loop
    let client = QueryClient::with_spawner(|task| spawn_local(task));
    let page = TodoListPage::new(service, client, config);

    let store = Store::new(page.view());
    let ctx = PageContext::new(page, store);
    provide_context(store);
    provide_context(ctx);

    // Re-render on every query or mutation change; dropped with the owner on unmount
    if let Some(page) = ctx.page() {
        StoredValue::new_local(page.subscribe(move || ctx.refresh()));
    }

    // Load todos on mount
    Effect::new(move |_| {
        let Some(page) = ctx.page() else { return };
        spawn_local(async move {
            page.mount().await;
            ctx.refresh();
        });
    });

    view! {
        <main class="main-content">
            <TodoListView />
        </main>
    }
}
