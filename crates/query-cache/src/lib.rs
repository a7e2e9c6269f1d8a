//! Query Cache
//!
//! Client-side store mapping query keys to fetched data plus loading/error
//! status. Supports invalidation by key prefix, refetch of observed queries
//! (awaited, or spawned in the background), and listener notification on
//! every state change.
//!
//! Handles are `Rc` based: the cache lives on a single UI event loop.

mod key;
mod state;
mod client;
mod mutation;

pub use key::QueryKey;
pub use state::{QueryError, QueryState, QueryStatus};
pub use client::{FetchFuture, Fetcher, LocalTask, QueryClient, Spawner, Subscription};
pub use mutation::{Mutation, MutationSubscription};
