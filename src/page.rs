//! Todo List Page Controller
//!
//! Owns the page's behavior independent of the DOM: the list query, the
//! draft form, and the create/delete mutations. Components call into it and
//! render [`TodoListPage::view`].
//!
//! Mutations never touch the displayed list. Their effects show up only
//! after the invalidation-triggered refetch completes.

use std::cell::RefCell;
use std::rc::Rc;

use query_cache::{Mutation, MutationSubscription, QueryClient, QueryError, QueryKey, Subscription};

use crate::config::PageConfig;
use crate::models::{DraftTodo, NewTodo, Todo, TodoFilter, TodoList};
use crate::service::{ServiceError, TodoService, SERVICE_NAME};
use crate::view::{self, PageView};

/// Namespace shared by every todo query; invalidating it refetches them all
pub const QUERY_NAMESPACE: &str = "connect-query";

pub fn todo_query_family() -> QueryKey {
    QueryKey::new([QUERY_NAMESPACE])
}

pub fn list_todos_key(filter: &TodoFilter) -> QueryKey {
    let filter = serde_json::to_string(filter).unwrap_or_default();
    todo_query_family().child(SERVICE_NAME).child("ListTodos").child(filter)
}

/// Result of a form submission
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Title was blank; nothing was sent
    Skipped,
    Created(Todo),
    /// The service rejected the call; the draft is kept
    Failed(ServiceError),
}

pub struct TodoListPage {
    service: Rc<dyn TodoService>,
    client: QueryClient,
    config: PageConfig,
    list_key: QueryKey,
    draft: RefCell<DraftTodo>,
    create: Mutation,
    delete: Mutation,
    /// Keeps the list query observed for as long as the page lives
    _observer: Subscription,
}

/// Listener registrations held by a mounted component
pub struct PageSubscription {
    _query: Subscription,
    _create: MutationSubscription,
    _delete: MutationSubscription,
}

impl TodoListPage {
    pub fn new(service: Rc<dyn TodoService>, client: QueryClient, config: PageConfig) -> Self {
        let filter = config.filter();
        let list_key = list_todos_key(&filter);

        let fetch_service = service.clone();
        client.register(list_key.clone(), move || {
            let service = fetch_service.clone();
            let filter = filter.clone();
            async move {
                service
                    .list_todos(&filter)
                    .await
                    .map_err(|e| QueryError::new(e.to_string()))
            }
        });
        let observer = client.subscribe(list_key.clone(), |_| {});

        Self {
            service,
            client,
            config,
            list_key,
            draft: RefCell::new(DraftTodo::default()),
            create: Mutation::new(),
            delete: Mutation::new(),
            _observer: observer,
        }
    }

    pub fn list_key(&self) -> &QueryKey {
        &self.list_key
    }

    pub fn client(&self) -> &QueryClient {
        &self.client
    }

    /// Call `listener` whenever the list query or a mutation changes state
    pub fn subscribe(&self, listener: impl Fn() + 'static) -> PageSubscription {
        let listener: Rc<dyn Fn()> = Rc::new(listener);
        let on_query = listener.clone();
        let on_create = listener.clone();
        PageSubscription {
            _query: self.client.subscribe(self.list_key.clone(), move |_| on_query()),
            _create: self.create.listen(move |_| on_create()),
            _delete: self.delete.listen(move |_| listener()),
        }
    }

    /// Initial load: fetch the list unless the cache already has it fresh
    pub async fn mount(&self) {
        log::debug!("[TODOS] Mounting list query {}", self.list_key);
        if let Err(e) = self.client.ensure(&self.list_key).await {
            log::warn!("[TODOS] Initial load failed: {}", e);
        }
    }

    pub fn draft(&self) -> DraftTodo {
        self.draft.borrow().clone()
    }

    pub fn set_title(&self, title: impl Into<String>) {
        self.draft.borrow_mut().title = title.into();
    }

    pub fn set_description(&self, description: impl Into<String>) {
        self.draft.borrow_mut().description = description.into();
    }

    /// Submit the draft as a new todo.
    ///
    /// On success the draft is cleared and the todo family refetched. A
    /// failure is only logged; the draft stays so the user can retry.
    pub async fn submit(&self) -> SubmitOutcome {
        let draft = self.draft();
        if !draft.is_submittable() {
            log::debug!("[TODOS] Ignoring submit with blank title");
            return SubmitOutcome::Skipped;
        }

        let new_todo = NewTodo {
            title: draft.title,
            description: draft.description,
            priority: self.config.default_priority,
            category: self.config.default_category.clone(),
            due_date: None,
        };

        match self.create.run(self.service.create_todo(&new_todo)).await {
            Ok(todo) => {
                log::info!("[TODOS] Created todo {}", todo.id);
                self.draft.borrow_mut().clear();
                self.refetch_todos().await;
                SubmitOutcome::Created(todo)
            }
            Err(e) => {
                log::warn!("[TODOS] Create failed: {}", e);
                SubmitOutcome::Failed(e)
            }
        }
    }

    /// Delete one todo, then refetch the todo family. The displayed list is
    /// left alone until that refetch lands.
    pub async fn delete_todo(&self, id: &str) -> Result<(), ServiceError> {
        match self.delete.run(self.service.delete_todo(id)).await {
            Ok(()) => {
                log::info!("[TODOS] Deleted todo {}", id);
                self.refetch_todos().await;
                Ok(())
            }
            Err(e) => {
                log::warn!("[TODOS] Delete of {} failed: {}", id, e);
                Err(e)
            }
        }
    }

    async fn refetch_todos(&self) {
        match self.client.invalidate_queries(&todo_query_family()).await {
            Ok(count) => log::debug!("[TODOS] Refetched {} queries", count),
            Err(e) => log::warn!("[TODOS] Refetch after mutation failed: {}", e),
        }
    }

    pub fn is_creating(&self) -> bool {
        self.create.is_pending()
    }

    pub fn is_deleting(&self) -> bool {
        self.delete.is_pending()
    }

    /// Snapshot of everything the page renders
    pub fn view(&self) -> PageView {
        let list = self.client.state::<TodoList>(&self.list_key);
        view::render(&list, &self.draft.borrow(), self.is_creating(), self.is_deleting())
    }
}
