//! History core.
//!
//! [`History`] turns a [`HistoryBackend`] into a subscribable location model.
//! Navigation calls are queued and flushed in order; registered blockers may
//! suspend the flush until they retry or cancel.
//!
//! # Flush protocol
//!
//! 1. If a blocker is registered, only the first one is consulted and the
//!    flush stops there. Its [`Retry`] restarts the flush, its [`Cancel`]
//!    clears every blocker without touching the queue.
//! 2. Otherwise tasks are drained in FIFO order. Tasks queued while draining
//!    run in the same pass.
//! 3. Backends without native change events are announced by the core
//!    itself once the queue is empty. Backends with native events notify
//!    through the listener installed on the first [`History::subscribe`].

use crate::backend::{HistoryBackend, Unlisten, UpdateCallback};
use crate::blocker::{BlockerChain, Cancel, Retry, Unblock};
use crate::error::NavigationError;
use crate::key::create_key;
use crate::location::{HistoryState, Location};
use crate::queue::{NavigationTask, NavigationType, TaskQueue};
use crate::subscriber::{Subscriber, SubscriberRegistry};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use tracing::{debug, trace, warn};

/// Shared state behind a [`History`] handle.
pub(crate) struct HistoryInner {
	backend: Box<dyn HistoryBackend>,
	location: RefCell<Location>,
	subscribers: RefCell<SubscriberRegistry>,
	unlisten: RefCell<Option<Unlisten>>,
	pub(crate) blockers: RefCell<BlockerChain>,
	queue: RefCell<TaskQueue>,
	unload_guarded: Cell<bool>,
	flushing: Cell<bool>,
	disposed: Cell<bool>,
}

impl HistoryInner {
	fn ensure_active(&self) -> Result<(), NavigationError> {
		if self.disposed.get() {
			Err(NavigationError::Disposed)
		} else {
			Ok(())
		}
	}

	pub(crate) fn try_flush(self: &Rc<Self>) -> Result<(), NavigationError> {
		if self.disposed.get() || self.flushing.get() {
			return Ok(());
		}

		let front = self.blockers.borrow().front();
		if let Some(blocker) = front {
			debug!(
				pending = self.queue.borrow().len(),
				"navigation blocked"
			);
			let weak = Rc::downgrade(self);
			blocker(Retry::new(weak.clone()), Cancel::new(weak));
			return Ok(());
		}

		let result = self.drain();

		if !self.backend.has_native_events() {
			trace!("announcing location change");
			self.on_update();
		} else if self.unlisten.borrow().is_none() {
			*self.location.borrow_mut() = self.backend.location();
		}

		result
	}

	fn drain(&self) -> Result<(), NavigationError> {
		self.flushing.set(true);
		let mut first_error = None;
		let mut drained = 0usize;

		loop {
			let next = self.queue.borrow_mut().dequeue();
			let Some((kind, task)) = next else {
				break;
			};
			drained += 1;
			trace!(%kind, "running navigation task");
			if let Err(err) = task(self.backend.as_ref()) {
				warn!(%kind, error = %err, "navigation task failed");
				first_error.get_or_insert(err);
			}
		}

		self.flushing.set(false);
		debug!(drained, "navigation queue drained");
		first_error.map_or(Ok(()), Err)
	}

	fn queue_task(
		self: &Rc<Self>,
		kind: NavigationType,
		task: NavigationTask,
	) -> Result<(), NavigationError> {
		self.ensure_active()?;
		self.queue.borrow_mut().enqueue(kind, task);
		self.try_flush()
	}

	fn on_update(&self) {
		let location = self.backend.location();
		*self.location.borrow_mut() = location;

		let subscribers = self.subscribers.borrow().snapshot();
		for subscriber in subscribers {
			// Skip entries unsubscribed earlier in this round.
			let registered = self.subscribers.borrow().contains(&subscriber);
			if registered {
				subscriber.notify();
			}
		}
	}

	pub(crate) fn set_unload_guard(&self, enabled: bool) {
		if self.unload_guarded.replace(enabled) != enabled {
			trace!(enabled, "unload guard changed");
			self.backend.set_unload_guard(enabled);
		}
	}

	fn detach_listener(&self) {
		let unlisten = self.unlisten.borrow_mut().take();
		if let Some(unlisten) = unlisten {
			trace!("detaching native history listener");
			unlisten();
		}
	}
}

impl Drop for HistoryInner {
	fn drop(&mut self) {
		self.detach_listener();
		self.set_unload_guard(false);
	}
}

/// A subscribable navigation history.
///
/// `History` is a cheap handle: clones share the same queue, blockers and
/// subscribers. It is single-threaded and never holds an internal borrow
/// while user callbacks run, so callbacks may call back into the handle.
#[derive(Clone)]
pub struct History {
	inner: Rc<HistoryInner>,
}

impl fmt::Debug for History {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("History")
			.field("location", &*self.inner.location.borrow())
			.field("subscribers", &self.inner.subscribers.borrow().len())
			.field("blockers", &self.inner.blockers.borrow().len())
			.field("pending", &self.inner.queue.borrow().len())
			.field("disposed", &self.inner.disposed.get())
			.finish()
	}
}

impl History {
	/// Creates a history driving `backend`.
	pub fn new<B>(backend: B) -> Self
	where
		B: HistoryBackend + 'static,
	{
		let location = backend.location();

		Self {
			inner: Rc::new(HistoryInner {
				backend: Box::new(backend),
				location: RefCell::new(location),
				subscribers: RefCell::new(SubscriberRegistry::new()),
				unlisten: RefCell::new(None),
				blockers: RefCell::new(BlockerChain::new()),
				queue: RefCell::new(TaskQueue::new()),
				unload_guarded: Cell::new(false),
				flushing: Cell::new(false),
				disposed: Cell::new(false),
			}),
		}
	}

	/// Returns the most recently computed location.
	pub fn location(&self) -> Location {
		self.inner.location.borrow().clone()
	}

	/// Registers `subscriber` for location changes.
	///
	/// Registering the same [`Subscriber`] instance again is a no-op. The first
	/// subscriber attaches the backend's native listener.
	pub fn subscribe(
		&self,
		subscriber: impl Into<Subscriber>,
	) -> Result<Unsubscribe, NavigationError> {
		self.inner.ensure_active()?;
		let subscriber = subscriber.into();

		let first = {
			let mut subscribers = self.inner.subscribers.borrow_mut();
			subscribers.insert(subscriber.clone()) && subscribers.len() == 1
		};

		if first && self.inner.backend.has_native_events() {
			let weak = Rc::downgrade(&self.inner);
			let on_update: UpdateCallback = Rc::new(move || {
				if let Some(inner) = weak.upgrade() {
					inner.on_update();
				}
			});

			match self.inner.backend.listen(on_update) {
				Ok(unlisten) => {
					trace!("attached native history listener");
					*self.inner.unlisten.borrow_mut() = Some(unlisten);
				}
				Err(err) => {
					self.inner.subscribers.borrow_mut().remove(&subscriber);
					return Err(err);
				}
			}
		}

		Ok(Unsubscribe {
			history: Rc::downgrade(&self.inner),
			subscriber,
		})
	}

	/// Pushes a new entry with a freshly keyed `state`.
	pub fn push(&self, path: &str, state: Option<HistoryState>) -> Result<(), NavigationError> {
		let state = keyed(state);
		let path = path.to_string();
		self.inner.queue_task(
			NavigationType::Push,
			Box::new(move |backend| backend.push_state(&path, &state)),
		)
	}

	/// Replaces the current entry with a freshly keyed `state`.
	pub fn replace(&self, path: &str, state: Option<HistoryState>) -> Result<(), NavigationError> {
		let state = keyed(state);
		let path = path.to_string();
		self.inner.queue_task(
			NavigationType::Replace,
			Box::new(move |backend| backend.replace_state(&path, &state)),
		)
	}

	/// Moves `delta` entries through the history.
	pub fn go(&self, delta: isize) -> Result<(), NavigationError> {
		self.inner.queue_task(
			NavigationType::Go(delta),
			Box::new(move |backend| backend.go(delta)),
		)
	}

	/// Moves one entry back.
	pub fn back(&self) -> Result<(), NavigationError> {
		self.inner
			.queue_task(NavigationType::Back, Box::new(|backend| backend.back()))
	}

	/// Moves one entry forward.
	pub fn forward(&self) -> Result<(), NavigationError> {
		self.inner.queue_task(
			NavigationType::Forward,
			Box::new(|backend| backend.forward()),
		)
	}

	/// Formats `path` as an href for the backend.
	pub fn create_href(&self, path: &str) -> String {
		self.inner.backend.create_href(path)
	}

	/// Registers a navigation blocker.
	///
	/// While any blocker is registered the host's unload requires
	/// confirmation. See the [`blocker`](crate::blocker) module for the
	/// retry and cancel protocol.
	pub fn block<F>(&self, blocker: F) -> Unblock
	where
		F: Fn(Retry, Cancel) + 'static,
	{
		let history = Rc::downgrade(&self.inner);
		if self.inner.disposed.get() {
			return Unblock::new(history, None);
		}

		let (id, first) = {
			let mut blockers = self.inner.blockers.borrow_mut();
			let id = blockers.push(Rc::new(blocker));
			(id, blockers.len() == 1)
		};
		if first {
			self.inner.set_unload_guard(true);
		}

		Unblock::new(history, Some(id))
	}

	/// Returns the number of queued navigation tasks.
	pub fn pending_navigations(&self) -> usize {
		self.inner.queue.borrow().len()
	}

	/// Returns whether any blocker is registered.
	pub fn is_blocked(&self) -> bool {
		!self.inner.blockers.borrow().is_empty()
	}

	/// Releases the backend listener, subscribers, blockers and queued tasks.
	///
	/// Navigation calls on a disposed history fail with
	/// [`NavigationError::Disposed`].
	pub fn dispose(&self) {
		if self.inner.disposed.replace(true) {
			return;
		}

		self.inner.detach_listener();
		self.inner.subscribers.borrow_mut().clear();
		self.inner.blockers.borrow_mut().clear();
		self.inner.queue.borrow_mut().clear();
		self.inner.set_unload_guard(false);
		debug!("history disposed");
	}
}

fn keyed(state: Option<HistoryState>) -> HistoryState {
	let mut state = state.unwrap_or_default();
	state.set_key(create_key());
	state
}

/// Handle returned by [`History::subscribe`].
///
/// Unregistering is explicit; dropping the handle keeps the subscriber.
#[must_use = "dropping an `Unsubscribe` keeps the subscriber registered"]
#[derive(Debug, Clone)]
pub struct Unsubscribe {
	history: Weak<HistoryInner>,
	subscriber: Subscriber,
}

impl Unsubscribe {
	/// Removes the subscriber. Calling this more than once is a no-op.
	///
	/// Removing the last subscriber detaches the backend's native listener.
	pub fn unsubscribe(&self) {
		let Some(history) = self.history.upgrade() else {
			return;
		};

		let now_empty = {
			let mut subscribers = history.subscribers.borrow_mut();
			subscribers.remove(&self.subscriber) && subscribers.is_empty()
		};
		if now_empty {
			history.detach_listener();
		}
	}
}
