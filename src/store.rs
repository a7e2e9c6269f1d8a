//! Page State Store
//!
//! Uses Leptos reactive_stores for fine-grained reactivity: typing into the
//! form only touches `form`, a refetch only touches the list fields.

use leptos::prelude::*;
use reactive_stores::Store;

use crate::view::{PageView, PageViewStoreFields};

/// Type alias for the store
pub type PageStore = Store<PageView>;

/// Get the page store from context
pub fn use_page_store() -> PageStore {
    expect_context::<PageStore>()
}

/// Copy a fresh snapshot into the store, writing only fields that changed
pub fn store_apply_view(store: &PageStore, view: PageView) {
    let PageView { phase, form, heading, count, rows, placeholder } = view;

    if store.phase().with_untracked(|current| *current != phase) {
        *store.phase().write() = phase;
    }
    if store.form().with_untracked(|current| *current != form) {
        *store.form().write() = form;
    }
    if store.heading().with_untracked(|current| *current != heading) {
        *store.heading().write() = heading;
    }
    if store.count().with_untracked(|current| *current != count) {
        *store.count().write() = count;
    }
    if store.rows().with_untracked(|current| *current != rows) {
        *store.rows().write() = rows;
    }
    if store.placeholder().with_untracked(|current| *current != placeholder) {
        *store.placeholder().write() = placeholder;
    }
}
