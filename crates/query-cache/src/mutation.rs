//! Mutation Tracking
//!
//! Tracks in-flight remote mutations so the UI can disable controls and
//! show busy labels. Several calls may run concurrently through one
//! `Mutation`; it stays pending until all of them have settled.

use std::cell::RefCell;
use std::future::Future;
use std::rc::{Rc, Weak};

/// Called with the new pending flag on every start and settle
type Listener = Rc<dyn Fn(bool)>;

#[derive(Default)]
struct Inner {
    pending: usize,
    listeners: Vec<(u64, Listener)>,
    next_listener_id: u64,
}

/// Shared handle to one kind of mutation (e.g. "create todo")
#[derive(Clone, Default)]
pub struct Mutation {
    inner: Rc<RefCell<Inner>>,
}

impl Mutation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pending(&self) -> bool {
        self.inner.borrow().pending > 0
    }

    pub fn pending_count(&self) -> usize {
        self.inner.borrow().pending
    }

    /// Listen to every call starting or settling
    pub fn listen(&self, listener: impl Fn(bool) + 'static) -> MutationSubscription {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_listener_id;
        inner.next_listener_id += 1;
        inner.listeners.push((id, Rc::new(listener)));
        MutationSubscription {
            id,
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Drive `future` as one call of this mutation.
    ///
    /// The mutation is pending while the future runs. A future dropped
    /// before completion still releases its call.
    pub async fn run<F: Future>(&self, future: F) -> F::Output {
        let _call = PendingCall::begin(self);
        future.await
    }

    fn notify(&self) {
        let pending = self.is_pending();
        let listeners: Vec<Listener> = self
            .inner
            .borrow()
            .listeners
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in listeners {
            listener(pending);
        }
    }
}

/// Keeps the pending count right even when a call is abandoned mid-flight
struct PendingCall<'a> {
    mutation: &'a Mutation,
}

impl<'a> PendingCall<'a> {
    fn begin(mutation: &'a Mutation) -> Self {
        mutation.inner.borrow_mut().pending += 1;
        mutation.notify();
        Self { mutation }
    }
}

impl Drop for PendingCall<'_> {
    fn drop(&mut self) {
        {
            let mut inner = self.mutation.inner.borrow_mut();
            inner.pending = inner.pending.saturating_sub(1);
        }
        self.mutation.notify();
    }
}

/// Live listener registration on a [`Mutation`]
#[must_use = "dropping a MutationSubscription stops listening immediately"]
pub struct MutationSubscription {
    id: u64,
    inner: Weak<RefCell<Inner>>,
}

impl Drop for MutationSubscription {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.upgrade() {
            inner.borrow_mut().listeners.retain(|(id, _)| *id != self.id);
        }
    }
}
