//! Page Context
//!
//! Shared handles provided via Leptos Context API.

use std::rc::Rc;

use leptos::prelude::*;

use crate::page::TodoListPage;
use crate::store::{store_apply_view, PageStore};

/// Page controller plus the store its snapshots are rendered from
#[derive(Clone, Copy)]
pub struct PageContext {
    page: StoredValue<Rc<TodoListPage>, LocalStorage>,
    store: PageStore,
}

impl PageContext {
    pub fn new(page: TodoListPage, store: PageStore) -> Self {
        Self {
            page: StoredValue::new_local(Rc::new(page)),
            store,
        }
    }

    /// The controller, or `None` once the page has been unmounted
    pub fn page(&self) -> Option<Rc<TodoListPage>> {
        self.page.try_get_value()
    }

    /// Re-render from the controller's current state
    pub fn refresh(&self) {
        if self.store.is_disposed() {
            return;
        }
        if let Some(page) = self.page() {
            store_apply_view(&self.store, page.view());
        }
    }
}
