//! Query Client
//!
//! The cache itself. Entries are created by `register`/`subscribe`, updated
//! by `fetch`, marked stale by `invalidate`, and torn down when their last
//! subscription is dropped. A client built with a spawner refetches observed
//! entries in the background as soon as they are invalidated.

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::rc::{Rc, Weak};

use crate::key::QueryKey;
use crate::state::{QueryError, QueryState};

/// Type-erased future produced by a fetcher
pub type FetchFuture = Pin<Box<dyn Future<Output = Result<Rc<dyn Any>, QueryError>>>>;

/// Type-erased fetch function attached to a key
pub type Fetcher = Rc<dyn Fn() -> FetchFuture>;

/// Future handed to the spawner for a background refetch
pub type LocalTask = Pin<Box<dyn Future<Output = ()>>>;

/// Runs background refetches on the UI event loop
pub type Spawner = Rc<dyn Fn(LocalTask)>;

type Listener = Rc<dyn Fn(&QueryKey)>;

struct Entry {
    data: Option<Rc<dyn Any>>,
    error: Option<QueryError>,
    fetcher: Option<Fetcher>,
    /// Generation of the fetch whose result will be accepted
    in_flight: Option<u64>,
    stale: bool,
    data_updates: u64,
    subscribers: usize,
}

impl Entry {
    fn new() -> Self {
        Self {
            data: None,
            error: None,
            fetcher: None,
            in_flight: None,
            stale: false,
            data_updates: 0,
            subscribers: 0,
        }
    }
}

struct ListenerSlot {
    id: u64,
    key: QueryKey,
    listener: Listener,
}

#[derive(Default)]
struct Inner {
    entries: HashMap<QueryKey, Entry>,
    listeners: Vec<ListenerSlot>,
    next_listener_id: u64,
    next_generation: u64,
    spawner: Option<Spawner>,
}

/// Handle to the query cache. Clones share the same store.
#[derive(Clone, Default)]
pub struct QueryClient {
    inner: Rc<RefCell<Inner>>,
}

impl QueryClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Client whose `invalidate` refetches observed entries through `spawn`
    pub fn with_spawner(spawn: impl Fn(LocalTask) + 'static) -> Self {
        let client = Self::default();
        client.inner.borrow_mut().spawner = Some(Rc::new(spawn));
        client
    }

    /// Attach the function used to fetch `key`, replacing any previous one
    pub fn register<T, F, Fut>(&self, key: QueryKey, fetch: F)
    where
        T: 'static,
        F: Fn() -> Fut + 'static,
        Fut: Future<Output = Result<T, QueryError>> + 'static,
    {
        let fetcher: Fetcher = Rc::new(move || {
            let pending = fetch();
            Box::pin(async move { pending.await.map(|value| Rc::new(value) as Rc<dyn Any>) })
        });
        let mut inner = self.inner.borrow_mut();
        inner.entries.entry(key).or_insert_with(Entry::new).fetcher = Some(fetcher);
    }

    /// Observe `key`. The listener runs after every state change of the entry.
    ///
    /// Dropping the returned [`Subscription`] unsubscribes; dropping the last
    /// one for a key removes the entry from the cache.
    pub fn subscribe(&self, key: QueryKey, listener: impl Fn(&QueryKey) + 'static) -> Subscription {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_listener_id;
        inner.next_listener_id += 1;
        inner.entries.entry(key.clone()).or_insert_with(Entry::new).subscribers += 1;
        inner.listeners.push(ListenerSlot {
            id,
            key: key.clone(),
            listener: Rc::new(listener),
        });
        Subscription {
            id,
            key,
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Typed snapshot of `key`; an empty state when the key is unknown or
    /// holds data of another type
    pub fn state<T: 'static>(&self, key: &QueryKey) -> QueryState<T> {
        let inner = self.inner.borrow();
        let Some(entry) = inner.entries.get(key) else {
            return QueryState::default();
        };
        let data = entry.data.clone().and_then(|data| data.downcast::<T>().ok());
        let is_fetching = entry.in_flight.is_some();
        QueryState {
            is_loading: is_fetching && data.is_none(),
            data,
            error: entry.error.clone(),
            is_fetching,
            is_stale: entry.stale,
            data_updates: entry.data_updates,
        }
    }

    pub fn contains(&self, key: &QueryKey) -> bool {
        self.inner.borrow().entries.contains_key(key)
    }

    /// Whether `key` has at least one subscriber
    pub fn is_active(&self, key: &QueryKey) -> bool {
        self.inner
            .borrow()
            .entries
            .get(key)
            .is_some_and(|entry| entry.subscribers > 0)
    }

    /// Run the registered fetcher for `key` and store its outcome.
    ///
    /// The latest-started fetch wins: a result arriving after a newer fetch
    /// began, or after the entry was torn down, is discarded.
    pub async fn fetch(&self, key: &QueryKey) -> Result<(), QueryError> {
        let (fetcher, generation) = {
            let mut inner = self.inner.borrow_mut();
            inner.next_generation += 1;
            let generation = inner.next_generation;
            let entry = inner
                .entries
                .get_mut(key)
                .ok_or_else(|| QueryError::new(format!("no query registered for {}", key)))?;
            let fetcher = entry
                .fetcher
                .clone()
                .ok_or_else(|| QueryError::new(format!("no fetcher registered for {}", key)))?;
            entry.in_flight = Some(generation);
            (fetcher, generation)
        };
        log::debug!("[QUERY] Fetching {} (generation {})", key, generation);
        self.notify(key);

        let result = fetcher().await;

        let applied = {
            let mut inner = self.inner.borrow_mut();
            match inner.entries.get_mut(key) {
                Some(entry) if entry.in_flight == Some(generation) => {
                    entry.in_flight = None;
                    match &result {
                        Ok(data) => {
                            entry.data = Some(data.clone());
                            entry.error = None;
                            entry.stale = false;
                            entry.data_updates += 1;
                        }
                        Err(err) => entry.error = Some(err.clone()),
                    }
                    true
                }
                _ => false,
            }
        };

        if applied {
            if let Err(err) = &result {
                log::warn!("[QUERY] Fetch of {} failed: {}", key, err);
            }
            self.notify(key);
        } else {
            log::debug!("[QUERY] Discarding superseded result for {} (generation {})", key, generation);
        }
        result.map(|_| ())
    }

    /// Fetch `key` unless it already holds fresh data or a fetch is in flight
    pub async fn ensure(&self, key: &QueryKey) -> Result<(), QueryError> {
        let needed = self
            .inner
            .borrow()
            .entries
            .get(key)
            .is_some_and(|entry| entry.in_flight.is_none() && (entry.data.is_none() || entry.stale));
        if needed {
            self.fetch(key).await
        } else {
            Ok(())
        }
    }

    /// Mark every entry under `prefix` stale and notify its listeners.
    /// Returns the invalidated keys.
    ///
    /// With a spawner, every invalidated entry that is observed is refetched
    /// in the background; without one the caller drives the refetch.
    pub fn invalidate(&self, prefix: &QueryKey) -> Vec<QueryKey> {
        let keys = self.mark_stale(prefix);
        let spawner = self.inner.borrow().spawner.clone();
        if let Some(spawn) = spawner {
            for key in keys.iter().filter(|key| self.is_active(key)) {
                let client = self.clone();
                let key = key.clone();
                spawn(Box::pin(async move {
                    // Failures are stored on the entry and logged by fetch
                    let _ = client.fetch(&key).await;
                }));
            }
        }
        keys
    }

    /// Invalidate `prefix`, then refetch every invalidated entry that is
    /// observed. Resolves with the number of refetched entries once they
    /// have all settled; the first fetch error is returned after all ran.
    pub async fn invalidate_queries(&self, prefix: &QueryKey) -> Result<usize, QueryError> {
        let active: Vec<QueryKey> = self
            .mark_stale(prefix)
            .into_iter()
            .filter(|key| self.is_active(key))
            .collect();

        let mut first_error = None;
        for key in &active {
            if let Err(err) = self.fetch(key).await {
                first_error.get_or_insert(err);
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(active.len()),
        }
    }

    fn mark_stale(&self, prefix: &QueryKey) -> Vec<QueryKey> {
        let keys: Vec<QueryKey> = {
            let mut inner = self.inner.borrow_mut();
            inner
                .entries
                .iter_mut()
                .filter(|(key, _)| key.starts_with(prefix))
                .map(|(key, entry)| {
                    entry.stale = true;
                    key.clone()
                })
                .collect()
        };
        log::debug!("[QUERY] Invalidated {} queries under {}", keys.len(), prefix);
        for key in &keys {
            self.notify(key);
        }
        keys
    }

    fn notify(&self, key: &QueryKey) {
        // Collect first so listeners can read or subscribe re-entrantly
        let listeners: Vec<Listener> = self
            .inner
            .borrow()
            .listeners
            .iter()
            .filter(|slot| &slot.key == key)
            .map(|slot| slot.listener.clone())
            .collect();
        for listener in listeners {
            listener(key);
        }
    }
}

/// Live observation of one query key
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    id: u64,
    key: QueryKey,
    inner: Weak<RefCell<Inner>>,
}

impl Subscription {
    pub fn key(&self) -> &QueryKey {
        &self.key
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(inner) = self.inner.upgrade() else {
            return;
        };
        let mut inner = inner.borrow_mut();
        inner.listeners.retain(|slot| slot.id != self.id);
        let teardown = match inner.entries.get_mut(&self.key) {
            Some(entry) => {
                entry.subscribers = entry.subscribers.saturating_sub(1);
                entry.subscribers == 0
            }
            None => false,
        };
        if teardown {
            inner.entries.remove(&self.key);
            log::debug!("[QUERY] Tore down {}", self.key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::collections::VecDeque;
    use tokio::sync::oneshot;

    fn key() -> QueryKey {
        QueryKey::new(["connect-query", "ListTodos"])
    }

    /// Registers a fetcher returning 1, 2, 3, ... and counting calls
    fn counting_client() -> (QueryClient, Rc<Cell<u32>>) {
        register_counter(QueryClient::new())
    }

    /// Counting client whose background refetches run on the current `LocalSet`
    fn spawning_client() -> (QueryClient, Rc<Cell<u32>>) {
        register_counter(QueryClient::with_spawner(|task| {
            tokio::task::spawn_local(task);
        }))
    }

    fn register_counter(client: QueryClient) -> (QueryClient, Rc<Cell<u32>>) {
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        client.register(key(), move || {
            counter.set(counter.get() + 1);
            let value = counter.get();
            async move { Ok::<_, QueryError>(value) }
        });
        (client, calls)
    }

    async fn settle() {
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_fetch_stores_data() {
        let (client, calls) = counting_client();
        assert_eq!(client.state::<u32>(&key()).data, None);

        client.fetch(&key()).await.unwrap();

        let state = client.state::<u32>(&key());
        assert_eq!(state.data.as_deref(), Some(&1));
        assert!(!state.is_loading);
        assert!(!state.is_stale);
        assert_eq!(state.data_updates, 1);
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test]
    async fn test_state_with_wrong_type_is_empty() {
        let (client, _) = counting_client();
        client.fetch(&key()).await.unwrap();
        assert!(client.state::<String>(&key()).data.is_none());
    }

    #[tokio::test]
    async fn test_fetch_without_registration_fails() {
        let client = QueryClient::new();
        let err = client.fetch(&key()).await.unwrap_err();
        assert!(err.message().contains("no query registered"));
    }

    #[tokio::test]
    async fn test_error_keeps_previous_data() {
        let client = QueryClient::new();
        let fail = Rc::new(Cell::new(false));
        let flag = fail.clone();
        client.register(key(), move || {
            let fail = flag.get();
            async move {
                if fail {
                    Err(QueryError::new("connection refused"))
                } else {
                    Ok(7u32)
                }
            }
        });

        client.fetch(&key()).await.unwrap();
        fail.set(true);
        assert!(client.fetch(&key()).await.is_err());

        let state = client.state::<u32>(&key());
        assert_eq!(state.data.as_deref(), Some(&7));
        assert_eq!(state.error, Some(QueryError::new("connection refused")));
    }

    #[tokio::test]
    async fn test_ensure_only_fetches_when_needed() {
        let (client, calls) = counting_client();

        client.ensure(&key()).await.unwrap();
        client.ensure(&key()).await.unwrap();
        assert_eq!(calls.get(), 1);

        client.invalidate(&QueryKey::new(["connect-query"]));
        client.ensure(&key()).await.unwrap();
        assert_eq!(calls.get(), 2);
    }

    #[tokio::test]
    async fn test_invalidate_marks_stale_and_notifies() {
        let (client, _) = counting_client();
        let notified = Rc::new(Cell::new(0));
        let seen = notified.clone();
        let _sub = client.subscribe(key(), move |_| seen.set(seen.get() + 1));
        client.fetch(&key()).await.unwrap();
        let before = notified.get();

        let keys = client.invalidate(&QueryKey::new(["connect-query"]));

        assert_eq!(keys, vec![key()]);
        assert!(client.state::<u32>(&key()).is_stale);
        assert_eq!(notified.get(), before + 1);
    }

    #[tokio::test]
    async fn test_invalidate_ignores_other_namespaces() {
        let (client, _) = counting_client();
        client.fetch(&key()).await.unwrap();

        let keys = client.invalidate(&QueryKey::new(["other"]));

        assert!(keys.is_empty());
        assert!(!client.state::<u32>(&key()).is_stale);
    }

    #[tokio::test]
    async fn test_invalidate_queries_refetches_observed_entries() {
        let (client, calls) = counting_client();
        let _sub = client.subscribe(key(), |_| {});
        client.fetch(&key()).await.unwrap();

        let refetched = client.invalidate_queries(&QueryKey::new(["connect-query"])).await.unwrap();

        assert_eq!(refetched, 1);
        assert_eq!(calls.get(), 2);
        let state = client.state::<u32>(&key());
        assert_eq!(state.data.as_deref(), Some(&2));
        assert!(!state.is_stale);
    }

    #[tokio::test]
    async fn test_invalidate_queries_skips_unobserved_entries() {
        let (client, calls) = counting_client();
        client.fetch(&key()).await.unwrap();

        let refetched = client.invalidate_queries(&QueryKey::new(["connect-query"])).await.unwrap();

        assert_eq!(refetched, 0);
        assert_eq!(calls.get(), 1);
        assert!(client.state::<u32>(&key()).is_stale);
    }

    #[tokio::test]
    async fn test_invalidate_refetches_observed_entries_in_background() {
        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let (client, calls) = spawning_client();
                let _sub = client.subscribe(key(), |_| {});
                client.fetch(&key()).await.unwrap();

                client.invalidate(&QueryKey::new(["connect-query"]));
                assert!(client.state::<u32>(&key()).is_stale);
                settle().await;

                assert_eq!(calls.get(), 2);
                let state = client.state::<u32>(&key());
                assert_eq!(state.data.as_deref(), Some(&2));
                assert!(!state.is_stale);
                assert!(!state.is_fetching);
            })
            .await;
    }

    #[tokio::test]
    async fn test_background_refetch_skips_unobserved_entries() {
        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let (client, calls) = spawning_client();
                client.fetch(&key()).await.unwrap();

                client.invalidate(&QueryKey::new(["connect-query"]));
                settle().await;

                assert_eq!(calls.get(), 1);
                assert!(client.state::<u32>(&key()).is_stale);
            })
            .await;
    }

    #[tokio::test]
    async fn test_invalidate_queries_fetches_once_with_spawner() {
        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let (client, calls) = spawning_client();
                let _sub = client.subscribe(key(), |_| {});
                client.fetch(&key()).await.unwrap();

                client.invalidate_queries(&QueryKey::new(["connect-query"])).await.unwrap();
                settle().await;

                assert_eq!(calls.get(), 2);
            })
            .await;
    }

    #[tokio::test]
    async fn test_superseded_fetch_is_discarded() {
        let client = QueryClient::new();
        let pending: Rc<RefCell<VecDeque<oneshot::Receiver<u32>>>> = Rc::default();
        let (first_tx, first_rx) = oneshot::channel();
        let (second_tx, second_rx) = oneshot::channel();
        pending.borrow_mut().extend([first_rx, second_rx]);

        let queue = pending.clone();
        client.register(key(), move || {
            let rx = queue.borrow_mut().pop_front();
            async move {
                match rx {
                    Some(rx) => rx.await.map_err(|e| QueryError::new(e.to_string())),
                    None => Err(QueryError::new("no response queued")),
                }
            }
        });

        let responses = async {
            let _ = second_tx.send(2);
            settle().await;
            let _ = first_tx.send(1);
        };
        let (first_key, second_key) = (key(), key());
        let (first, second, ()) = tokio::join!(client.fetch(&first_key), client.fetch(&second_key), responses);

        assert!(first.is_ok());
        assert!(second.is_ok());
        let state = client.state::<u32>(&key());
        assert_eq!(state.data.as_deref(), Some(&2));
        assert_eq!(state.data_updates, 1);
        assert!(!state.is_fetching);
    }

    #[tokio::test]
    async fn test_loading_only_without_data() {
        let client = QueryClient::new();
        let (tx, rx) = oneshot::channel::<u32>();
        let slot = Rc::new(RefCell::new(Some(rx)));
        client.register(key(), move || {
            let rx = slot.borrow_mut().take();
            async move {
                match rx {
                    Some(rx) => rx.await.map_err(|e| QueryError::new(e.to_string())),
                    None => Ok(99),
                }
            }
        });

        let observe = async {
            settle().await;
            let state = client.state::<u32>(&key());
            assert!(state.is_loading);
            assert!(state.is_fetching);
            let _ = tx.send(5);
        };
        let fetch_key = key();
        let (result, ()) = tokio::join!(client.fetch(&fetch_key), observe);
        result.unwrap();
        assert!(!client.state::<u32>(&key()).is_loading);
    }

    #[tokio::test]
    async fn test_last_subscription_tears_down_entry() {
        let (client, _) = counting_client();
        let first = client.subscribe(key(), |_| {});
        let second = client.subscribe(key(), |_| {});
        client.fetch(&key()).await.unwrap();

        drop(first);
        assert!(client.contains(&key()));
        assert!(client.is_active(&key()));

        drop(second);
        assert!(!client.contains(&key()));
        assert!(client.state::<u32>(&key()).data.is_none());
    }

    #[tokio::test]
    async fn test_result_after_teardown_is_ignored() {
        let client = QueryClient::new();
        let (tx, rx) = oneshot::channel::<u32>();
        let slot = Rc::new(RefCell::new(Some(rx)));
        client.register(key(), move || {
            let rx = slot.borrow_mut().take();
            async move {
                match rx {
                    Some(rx) => rx.await.map_err(|e| QueryError::new(e.to_string())),
                    None => Ok(0),
                }
            }
        });
        let sub = client.subscribe(key(), |_| {});

        let unmount = async {
            settle().await;
            drop(sub);
            let _ = tx.send(3);
        };
        let fetch_key = key();
        let (result, ()) = tokio::join!(client.fetch(&fetch_key), unmount);

        assert!(result.is_ok());
        assert!(!client.contains(&key()));
    }
}
