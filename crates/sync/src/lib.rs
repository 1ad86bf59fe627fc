//! Recipe Box data-sync layer.
//!
//! Cached reads and cache-invalidating writes against the recipe backend
//! actor. A [`SyncClient`] owns the session (actor plus caller identity), a
//! process-wide [`QueryCache`], and a [`Notifier`] for write outcomes.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod actor;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod mutations;
pub mod notify;
pub mod queries;
pub mod session;
pub mod telemetry;

#[cfg(test)]
mod test_support;

pub use actor::{ActorError, ActorResult, RecipeActor};
pub use cache::{CacheEvent, Invalidation, QueryCache, QueryKey};
pub use client::SyncClient;
pub use config::{ConfigError, LogFormat, SyncConfig};
pub use error::{Result, SyncError};
pub use mutations::WriteOp;
pub use notify::{ChannelNotifier, Notification, NotificationLevel, Notifier, TracingNotifier};
pub use queries::ProfileQuery;
pub use session::{Session, SessionState};
pub use telemetry::init_tracing;
