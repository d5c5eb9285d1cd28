//! Navigation backend contract.
//!
//! A [`HistoryBackend`] supplies the primitive operations the
//! [`History`](crate::History) core drives. Backends that can observe changes
//! on their own (the browser's `popstate`) report [`has_native_events`] and
//! deliver notifications through [`listen`]; all others are announced by the
//! core itself after every flush.
//!
//! [`has_native_events`]: HistoryBackend::has_native_events
//! [`listen`]: HistoryBackend::listen

use crate::error::NavigationError;
use crate::location::{HistoryState, Location};
use std::rc::Rc;

/// Callback a backend invokes when the location changed.
pub type UpdateCallback = Rc<dyn Fn()>;

/// Detaches a native listener installed by [`HistoryBackend::listen`].
pub type Unlisten = Box<dyn FnOnce()>;

/// Primitive operations of a navigation environment.
///
/// All methods take `&self`: the core may read [`location`](Self::location)
/// from inside a notification triggered by a mutation, so implementations keep
/// their state behind interior mutability.
pub trait HistoryBackend {
	/// Reads the current location.
	fn location(&self) -> Location;

	/// Adds a new entry.
	fn push_state(&self, path: &str, state: &HistoryState) -> Result<(), NavigationError>;

	/// Overwrites the current entry.
	fn replace_state(&self, path: &str, state: &HistoryState) -> Result<(), NavigationError>;

	/// Moves by `delta` entries.
	fn go(&self, delta: isize) -> Result<(), NavigationError>;

	/// Moves one entry back.
	fn back(&self) -> Result<(), NavigationError>;

	/// Moves one entry forward.
	fn forward(&self) -> Result<(), NavigationError>;

	/// Formats `path` as an href for this backend.
	fn create_href(&self, path: &str) -> String {
		path.to_string()
	}

	/// Returns whether this backend reports changes through [`listen`](Self::listen).
	fn has_native_events(&self) -> bool {
		false
	}

	/// Installs `on_update` as the native change listener.
	///
	/// Only called when [`has_native_events`](Self::has_native_events) is true,
	/// and at most once until the returned [`Unlisten`] runs.
	fn listen(&self, _on_update: UpdateCallback) -> Result<Unlisten, NavigationError> {
		Ok(Box::new(|| {}))
	}

	/// Enables or disables the host's unload confirmation.
	fn set_unload_guard(&self, _enabled: bool) {}
}

impl<B: HistoryBackend + ?Sized> HistoryBackend for Rc<B> {
	fn location(&self) -> Location {
		(**self).location()
	}

	fn push_state(&self, path: &str, state: &HistoryState) -> Result<(), NavigationError> {
		(**self).push_state(path, state)
	}

	fn replace_state(&self, path: &str, state: &HistoryState) -> Result<(), NavigationError> {
		(**self).replace_state(path, state)
	}

	fn go(&self, delta: isize) -> Result<(), NavigationError> {
		(**self).go(delta)
	}

	fn back(&self) -> Result<(), NavigationError> {
		(**self).back()
	}

	fn forward(&self) -> Result<(), NavigationError> {
		(**self).forward()
	}

	fn create_href(&self, path: &str) -> String {
		(**self).create_href(path)
	}

	fn has_native_events(&self) -> bool {
		(**self).has_native_events()
	}

	fn listen(&self, on_update: UpdateCallback) -> Result<Unlisten, NavigationError> {
		(**self).listen(on_update)
	}

	fn set_unload_guard(&self, enabled: bool) {
		(**self).set_unload_guard(enabled)
	}
}
