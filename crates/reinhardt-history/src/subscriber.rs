//! Location change subscribers.

use std::fmt;
use std::rc::Rc;

/// A location change callback.
///
/// Identity is the callback instance: cloning a `Subscriber` and registering
/// both clones stores it once.
///
/// # Example
///
/// ```
/// use reinhardt_history::Subscriber;
///
/// let subscriber = Subscriber::new(|| {});
/// assert!(subscriber.same(&subscriber.clone()));
/// assert!(!subscriber.same(&Subscriber::new(|| {})));
/// ```
#[derive(Clone)]
pub struct Subscriber(Rc<dyn Fn()>);

impl Subscriber {
	/// Wraps a callback.
	pub fn new<F>(callback: F) -> Self
	where
		F: Fn() + 'static,
	{
		Self(Rc::new(callback))
	}

	/// Returns whether both handles refer to the same callback.
	pub fn same(&self, other: &Subscriber) -> bool {
		std::ptr::addr_eq(Rc::as_ptr(&self.0), Rc::as_ptr(&other.0))
	}

	pub(crate) fn notify(&self) {
		(self.0)()
	}
}

impl<F> From<F> for Subscriber
where
	F: Fn() + 'static,
{
	fn from(callback: F) -> Self {
		Self::new(callback)
	}
}

impl fmt::Debug for Subscriber {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Subscriber")
			.field(&Rc::as_ptr(&self.0))
			.finish()
	}
}

/// Insertion-ordered set of subscribers.
#[derive(Debug, Default)]
pub(crate) struct SubscriberRegistry {
	subscribers: Vec<Subscriber>,
}

impl SubscriberRegistry {
	pub(crate) fn new() -> Self {
		Self::default()
	}

	/// Adds `subscriber`, returning `false` if it was already present.
	pub(crate) fn insert(&mut self, subscriber: Subscriber) -> bool {
		if self.contains(&subscriber) {
			return false;
		}
		self.subscribers.push(subscriber);
		true
	}

	/// Removes `subscriber`, returning `false` if it was not present.
	pub(crate) fn remove(&mut self, subscriber: &Subscriber) -> bool {
		let before = self.subscribers.len();
		self.subscribers.retain(|s| !s.same(subscriber));
		self.subscribers.len() != before
	}

	pub(crate) fn contains(&self, subscriber: &Subscriber) -> bool {
		self.subscribers.iter().any(|s| s.same(subscriber))
	}

	pub(crate) fn snapshot(&self) -> Vec<Subscriber> {
		self.subscribers.clone()
	}

	pub(crate) fn len(&self) -> usize {
		self.subscribers.len()
	}

	pub(crate) fn is_empty(&self) -> bool {
		self.subscribers.is_empty()
	}

	pub(crate) fn clear(&mut self) {
		self.subscribers.clear();
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use std::cell::Cell;

	#[rstest]
	fn test_registry_set_semantics() {
		let mut registry = SubscriberRegistry::new();
		let subscriber = Subscriber::new(|| {});

		assert!(registry.insert(subscriber.clone()));
		assert!(!registry.insert(subscriber.clone()));
		assert_eq!(registry.len(), 1);
		assert!(registry.insert(Subscriber::new(|| {})));
		assert_eq!(registry.len(), 2);
	}

	#[rstest]
	fn test_registry_remove_is_idempotent() {
		let mut registry = SubscriberRegistry::new();
		let subscriber = Subscriber::new(|| {});
		registry.insert(subscriber.clone());

		assert!(registry.remove(&subscriber));
		assert!(!registry.remove(&subscriber));
		assert!(registry.is_empty());
	}

	#[rstest]
	fn test_registry_snapshot_preserves_order() {
		let calls = Rc::new(Cell::new(0));
		let mut registry = SubscriberRegistry::new();
		for expected in 0..3 {
			let calls = calls.clone();
			registry.insert(Subscriber::new(move || {
				assert_eq!(calls.get(), expected);
				calls.set(calls.get() + 1);
			}));
		}

		for subscriber in registry.snapshot() {
			subscriber.notify();
		}
		assert_eq!(calls.get(), 3);
	}
}
