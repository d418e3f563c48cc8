//! Keyplex Test - shared test utilities.
//!
//! Mock backends and fixtures for exercising stores without touching real
//! user data.
//!
//! ```toml
//! [dev-dependencies]
//! keyplex-test.workspace = true
//! ```
//!
//! ```rust,ignore
//! use keyplex_test::{RecordingBackend, BackendCall, plex_over};
//!
//! #[test]
//! fn records_writes() {
//!     let backend = RecordingBackend::new();
//!     let plex = plex_over(backend.clone(), "ns");
//!     plex.set("k", &1).unwrap();
//!     assert!(backend.calls().contains(&BackendCall::Set("@ns/k".into(), "1".into())));
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod fixtures;
pub mod harness;
pub mod mocks;

pub use fixtures::*;
pub use harness::*;
pub use mocks::*;
