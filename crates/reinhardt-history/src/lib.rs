//! Reinhardt History - Navigation history for client-side routing
//!
//! This crate provides the history layer underneath the Reinhardt client
//! router: a single subscribable model of the current location that hides the
//! differences between navigation backends.
//!
//! ## Features
//!
//! - **Ordered navigation**: `push`, `replace`, `go`, `back` and `forward` are
//!   queued and applied to the backend strictly in call order
//! - **Blockers**: interactive guards can suspend navigation until they retry
//!   or cancel, and guard page unload while registered
//! - **Subscriptions**: observers are notified exactly once per committed
//!   change, never for blocked navigation
//! - **Pluggable backends**: browser history and URL fragment (WASM), and an
//!   in-memory list for tests and server rendering
//!
//! ## Architecture
//!
//! - [`location`]: href parsing and entry state
//! - [`history`]: the [`History`] core, queue flushing and notification
//! - [`blocker`]: blocker chain and its [`Retry`] / [`Cancel`] continuations
//! - [`backend`]: the [`HistoryBackend`] contract
//! - [`memory`]: in-memory backend
//! - `browser`: browser and hash backends (WASM only)
//!
//! ## Example
//!
//! ```
//! use reinhardt_history::{MemoryHistoryOptions, create_memory_history};
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let history = create_memory_history(MemoryHistoryOptions::new(["/"]));
//!
//! let changes = Rc::new(Cell::new(0));
//! let counter = changes.clone();
//! let unsubscribe = history
//! 	.subscribe(move || counter.set(counter.get() + 1))
//! 	.unwrap();
//!
//! history.push("/users/42?tab=posts", None).unwrap();
//! assert_eq!(history.location().pathname(), "/users/42");
//! assert_eq!(history.location().search(), "?tab=posts");
//! assert_eq!(changes.get(), 1);
//!
//! unsubscribe.unsubscribe();
//! ```

pub mod backend;
pub mod blocker;
#[cfg(target_arch = "wasm32")]
pub mod browser;
pub mod config;
pub mod error;
pub mod history;
pub mod key;
pub mod location;
pub mod memory;
mod queue;
pub mod subscriber;

pub use backend::{HistoryBackend, Unlisten, UpdateCallback};
pub use blocker::{Cancel, Retry, Unblock};
#[cfg(target_arch = "wasm32")]
pub use browser::{
	BrowserBackend, BrowserHistoryOptions, create_browser_history, create_hash_history,
};
pub use config::MemoryHistoryOptions;
pub use error::NavigationError;
pub use history::{History, Unsubscribe};
pub use location::{HistoryState, Location, parse_location};
pub use memory::{MemoryBackend, create_memory_history};
pub use queue::NavigationType;
pub use subscriber::Subscriber;
