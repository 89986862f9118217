//! Guarded stores, their factories and the dispatcher that routes actions to them.
//!
//! A [`GuardedStore`] holds its whole state as one
//! [`PersistentValue`](crate::value::PersistentValue) and only emits when a replacement
//! actually changes that value.

mod dispatcher;
mod emitter;
mod guarded;
mod spec;

pub use dispatcher::{DispatchError, Dispatcher, DispatcherContext};
pub use emitter::{EventEmitter, EventHandler, StoreEvent, SubscriptionId, CHANGE_EVENT};
pub use guarded::{EqualityMode, GuardedStore, StoreError};
pub use spec::{create_immutable_store, ActionHandler, InitializeFn, StoreFactory, StoreSpec};
