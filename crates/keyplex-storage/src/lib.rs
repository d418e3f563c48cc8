//! Keyplex Storage: namespaced key-value access over simple string stores.
//!
//! A [`Plex`] scopes every key under `@{namespace}/` and stores values as
//! JSON text on a shared [`StorageBackend`]. The namespace is given
//! explicitly or derived from the host origin (`app.example.com` becomes
//! `com.example.app`).
//!
//! # Backends
//!
//! | Binding | Backend | Lifetime |
//! |---------|---------|----------|
//! | [`LocalPlex`] | [`LocalStorage`] | Durable, one JSON file per origin |
//! | [`SessionPlex`] | [`SessionStorage`] | In memory, cleared when the session ends |
//!
//! Both bindings run the same code; only the backend differs.
//!
//! # Wildcard deletion
//!
//! `del("cache/%")` removes every backend key that starts with
//! `@{namespace}/cache/`. The match runs over the backend-wide key list, so it
//! is a plain text prefix match and not a namespace-aware one. Use
//! [`Plex::clear`] to drop exactly one namespace.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod backend;
pub mod error;
pub mod local;
pub mod namespace;
pub mod path;
pub mod plex;

pub use backend::{SessionStorage, StorageBackend};
pub use error::{StorageError, StorageResult};
pub use local::{DEFAULT_QUOTA_BYTES, LocalStorage};
pub use namespace::{Detached, HostContext, Namespace, StaticOrigin};
pub use plex::{LocalPlex, Plex, SessionPlex};
