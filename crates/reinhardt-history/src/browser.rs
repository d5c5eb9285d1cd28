//! Browser and hash navigation backends (WASM only).
//!
//! The backend reads `window.location`, writes through `history.pushState` /
//! `history.replaceState`, and announces changes in two ways: every mutation
//! made through the backend calls the installed listener, and the listener is
//! also bound to the window's `popstate` and `pushstate` events. Code outside
//! this crate that changes the URL can announce it by dispatching a
//! `pushstate` event on `window`.

use crate::backend::{HistoryBackend, Unlisten, UpdateCallback};
use crate::error::NavigationError;
use crate::history::History;
use crate::location::{HistoryState, Location, parse_location};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use tracing::warn;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

const PUSH_STATE_EVENT: &str = "pushstate";
const POP_STATE_EVENT: &str = "popstate";
const BEFORE_UNLOAD_EVENT: &str = "beforeunload";
const HISTORY_EVENTS: [&str; 2] = [PUSH_STATE_EVENT, POP_STATE_EVENT];

type EventClosure = Closure<dyn FnMut(web_sys::Event)>;

/// Options for [`create_browser_history`].
#[derive(Clone, Default)]
pub struct BrowserHistoryOptions {
	get_href: Option<Rc<dyn Fn() -> String>>,
	create_href: Option<Rc<dyn Fn(&str) -> String>>,
}

impl fmt::Debug for BrowserHistoryOptions {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("BrowserHistoryOptions")
			.field("custom_get_href", &self.get_href.is_some())
			.field("custom_create_href", &self.create_href.is_some())
			.finish()
	}
}

impl BrowserHistoryOptions {
	/// Creates default options.
	pub fn new() -> Self {
		Self::default()
	}

	/// Overrides how the current href is read.
	pub fn with_get_href<F>(mut self, get_href: F) -> Self
	where
		F: Fn() -> String + 'static,
	{
		self.get_href = Some(Rc::new(get_href));
		self
	}

	/// Overrides how paths are turned into URLs.
	pub fn with_create_href<F>(mut self, create_href: F) -> Self
	where
		F: Fn(&str) -> String + 'static,
	{
		self.create_href = Some(Rc::new(create_href));
		self
	}
}

fn window() -> Result<web_sys::Window, NavigationError> {
	web_sys::window().ok_or(NavigationError::Unavailable("window"))
}

fn native_history() -> Result<web_sys::History, NavigationError> {
	window()?
		.history()
		.map_err(|_| NavigationError::Unavailable("history"))
}

fn js_error(err: JsValue) -> NavigationError {
	NavigationError::Backend(err.as_string().unwrap_or_else(|| format!("{:?}", err)))
}

fn default_href() -> String {
	let Ok(window) = window() else {
		return "/".to_string();
	};
	let location = window.location();
	format!(
		"{}{}{}",
		location.pathname().unwrap_or_else(|_| "/".to_string()),
		location.search().unwrap_or_default(),
		location.hash().unwrap_or_default()
	)
}

fn hash_href() -> String {
	window()
		.ok()
		.and_then(|window| window.location().hash().ok())
		.map(|hash| match hash.strip_prefix('#') {
			Some(fragment) => fragment.to_string(),
			None => hash,
		})
		.unwrap_or_default()
}

fn remove_history_listener(window: &web_sys::Window, handler: &EventClosure, event: &str) {
	if let Err(err) =
		window.remove_event_listener_with_callback(event, handler.as_ref().unchecked_ref())
	{
		warn!(event, error = ?err, "failed to remove history listener");
	}
}

/// Adds a listener per event. On failure the ones already added are removed
/// before the error is returned.
fn attach_all<E>(
	events: &[&'static str],
	mut add: impl FnMut(&'static str) -> Result<(), E>,
	mut remove: impl FnMut(&'static str),
) -> Result<(), E> {
	for (added, &event) in events.iter().enumerate() {
		if let Err(err) = add(event) {
			for &event in &events[..added] {
				remove(event);
			}
			return Err(err);
		}
	}
	Ok(())
}

fn read_state() -> Option<HistoryState> {
	let value = native_history().ok()?.state().ok()?;
	if value.is_null() || value.is_undefined() {
		return None;
	}
	let json: String = js_sys::JSON::stringify(&value).ok()?.into();
	serde_json::from_str(&json).ok()
}

fn write_state(state: &HistoryState) -> Result<JsValue, NavigationError> {
	let json = serde_json::to_string(state)?;
	js_sys::JSON::parse(&json).map_err(js_error)
}

/// A backend driving the browser's History API.
pub struct BrowserBackend {
	get_href: Rc<dyn Fn() -> String>,
	create_href: Rc<dyn Fn(&str) -> String>,
	listener: Rc<RefCell<Option<UpdateCallback>>>,
	unload_listener: RefCell<Option<EventClosure>>,
}

impl fmt::Debug for BrowserBackend {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("BrowserBackend")
			.field("listening", &self.listener.borrow().is_some())
			.field("unload_guarded", &self.unload_listener.borrow().is_some())
			.finish()
	}
}

impl BrowserBackend {
	/// Creates a backend from options.
	pub fn new(options: BrowserHistoryOptions) -> Self {
		Self {
			get_href: options.get_href.unwrap_or_else(|| Rc::new(default_href)),
			create_href: options
				.create_href
				.unwrap_or_else(|| Rc::new(|path: &str| path.to_string())),
			listener: Rc::new(RefCell::new(None)),
			unload_listener: RefCell::new(None),
		}
	}

	fn notify(&self) {
		let listener = self.listener.borrow().clone();
		if let Some(listener) = listener {
			listener();
		}
	}
}

impl HistoryBackend for BrowserBackend {
	fn location(&self) -> Location {
		parse_location(&(self.get_href)(), read_state())
	}

	fn push_state(&self, path: &str, state: &HistoryState) -> Result<(), NavigationError> {
		let url = (self.create_href)(path);
		native_history()?
			.push_state_with_url(&write_state(state)?, "", Some(&url))
			.map_err(js_error)?;
		self.notify();
		Ok(())
	}

	fn replace_state(&self, path: &str, state: &HistoryState) -> Result<(), NavigationError> {
		let url = (self.create_href)(path);
		native_history()?
			.replace_state_with_url(&write_state(state)?, "", Some(&url))
			.map_err(js_error)?;
		self.notify();
		Ok(())
	}

	fn go(&self, delta: isize) -> Result<(), NavigationError> {
		let delta = i32::try_from(delta)
			.map_err(|_| NavigationError::Backend(format!("delta out of range: {}", delta)))?;
		native_history()?.go_with_delta(delta).map_err(js_error)
	}

	fn back(&self) -> Result<(), NavigationError> {
		native_history()?.back().map_err(js_error)
	}

	fn forward(&self) -> Result<(), NavigationError> {
		native_history()?.forward().map_err(js_error)
	}

	fn create_href(&self, path: &str) -> String {
		(self.create_href)(path)
	}

	fn has_native_events(&self) -> bool {
		true
	}

	fn listen(&self, on_update: UpdateCallback) -> Result<Unlisten, NavigationError> {
		let window = window()?;

		let callback = Rc::clone(&on_update);
		let handler: EventClosure = Closure::new(move |_event: web_sys::Event| callback());
		attach_all(
			&HISTORY_EVENTS,
			|event| window.add_event_listener_with_callback(event, handler.as_ref().unchecked_ref()),
			|event| remove_history_listener(&window, &handler, event),
		)
		.map_err(js_error)?;
		*self.listener.borrow_mut() = Some(on_update);

		let listener = Rc::clone(&self.listener);
		Ok(Box::new(move || {
			for event in HISTORY_EVENTS {
				remove_history_listener(&window, &handler, event);
			}
			listener.borrow_mut().take();
			drop(handler);
		}))
	}

	fn set_unload_guard(&self, enabled: bool) {
		let Ok(window) = window() else {
			return;
		};

		if enabled {
			if self.unload_listener.borrow().is_some() {
				return;
			}
			let handler: EventClosure = Closure::new(|event: web_sys::Event| {
				event.prevent_default();
				if let Some(event) = event.dyn_ref::<web_sys::BeforeUnloadEvent>() {
					event.set_return_value("");
				}
			});
			match window.add_event_listener_with_callback_and_bool(
				BEFORE_UNLOAD_EVENT,
				handler.as_ref().unchecked_ref(),
				true,
			) {
				Ok(()) => *self.unload_listener.borrow_mut() = Some(handler),
				Err(err) => warn!(error = ?err, "failed to install unload guard"),
			}
		} else if let Some(handler) = self.unload_listener.borrow_mut().take() {
			if let Err(err) = window.remove_event_listener_with_callback_and_bool(
				BEFORE_UNLOAD_EVENT,
				handler.as_ref().unchecked_ref(),
				true,
			) {
				warn!(error = ?err, "failed to remove unload guard");
			}
		}
	}
}

/// Creates a history backed by the browser's History API.
pub fn create_browser_history(options: BrowserHistoryOptions) -> History {
	History::new(BrowserBackend::new(options))
}

/// Creates a history that keeps the location in the URL fragment.
pub fn create_hash_history() -> History {
	create_browser_history(
		BrowserHistoryOptions::new()
			.with_get_href(hash_href)
			.with_create_href(|path| format!("#{}", path)),
	)
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::cell::Cell;
	use wasm_bindgen_test::*;

	wasm_bindgen_test_configure!(run_in_browser);

	fn counting(history: &History) -> (Rc<Cell<usize>>, crate::Unsubscribe) {
		let count = Rc::new(Cell::new(0));
		let handle = Rc::clone(&count);
		let unsubscribe = history
			.subscribe(move || handle.set(handle.get() + 1))
			.unwrap();
		(count, unsubscribe)
	}

	fn dispatch(event: &str) {
		let event = web_sys::Event::new(event).unwrap();
		window().unwrap().dispatch_event(&event).unwrap();
	}

	#[wasm_bindgen_test]
	fn test_browser_history_push_updates_url() {
		let history = create_browser_history(BrowserHistoryOptions::new());
		let _unsubscribe = history.subscribe(|| {}).unwrap();

		history.push("/wasm-history?x=1", None).unwrap();

		let location = history.location();
		assert_eq!(location.pathname(), "/wasm-history");
		assert_eq!(location.search(), "?x=1");
		assert!(location.state().key().is_some());
		history.dispose();
	}

	#[wasm_bindgen_test]
	fn test_browser_history_push_notifies_once() {
		let history = create_browser_history(BrowserHistoryOptions::new());
		let (count, _unsubscribe) = counting(&history);

		history.push("/wasm-once", None).unwrap();
		assert_eq!(count.get(), 1);

		history.replace("/wasm-once?tab=2", None).unwrap();
		assert_eq!(count.get(), 2);
		history.dispose();
	}

	#[wasm_bindgen_test]
	fn test_browser_history_native_events_reach_subscribers() {
		let history = create_browser_history(BrowserHistoryOptions::new());
		let (count, _unsubscribe) = counting(&history);

		dispatch(PUSH_STATE_EVENT);
		dispatch(POP_STATE_EVENT);

		assert_eq!(count.get(), 2);
		history.dispose();
	}

	#[wasm_bindgen_test]
	fn test_browser_history_dispose_detaches_listeners() {
		let backend = Rc::new(BrowserBackend::new(BrowserHistoryOptions::new()));
		let history = History::new(Rc::clone(&backend));
		let (count, _unsubscribe) = counting(&history);
		assert!(backend.listener.borrow().is_some());

		history.dispose();
		dispatch(POP_STATE_EVENT);

		assert!(backend.listener.borrow().is_none());
		assert_eq!(count.get(), 0);
	}

	#[wasm_bindgen_test]
	fn test_browser_history_unload_guard_follows_blockers() {
		let backend = Rc::new(BrowserBackend::new(BrowserHistoryOptions::new()));
		let history = History::new(Rc::clone(&backend));
		assert!(backend.unload_listener.borrow().is_none());

		let first = history.block(|_, _| {});
		let second = history.block(|_, _| {});
		assert!(backend.unload_listener.borrow().is_some());

		first.unblock();
		assert!(backend.unload_listener.borrow().is_some());
		second.unblock();
		assert!(backend.unload_listener.borrow().is_none());
	}

	#[wasm_bindgen_test]
	fn test_browser_history_state_round_trips_key() {
		let history = create_browser_history(BrowserHistoryOptions::new());
		history
			.push("/wasm-state", Some(HistoryState::new().with_data("scroll", 40)))
			.unwrap();

		let state = read_state().unwrap();
		assert!(state.key().is_some());
		assert_eq!(state.key(), history.location().state().key());
		assert_eq!(state.get("scroll"), Some(&serde_json::Value::from(40)));
		history.dispose();
	}

	#[wasm_bindgen_test]
	fn test_hash_history_reads_fragment() {
		let location = window().unwrap().location();
		location.set_hash("/x?y=1").unwrap();

		assert_eq!(hash_href(), "/x?y=1");
		let history = create_hash_history();
		assert_eq!(history.location().pathname(), "/x");
		assert_eq!(history.location().search(), "?y=1");

		location.set_hash("").unwrap();
		assert_eq!(hash_href(), "");
	}

	#[wasm_bindgen_test]
	fn test_hash_history_create_href() {
		let history = create_hash_history();
		assert_eq!(history.create_href("/inbox"), "#/inbox");
	}

	#[wasm_bindgen_test]
	fn test_attach_all_rolls_back_on_failure() {
		let removed = RefCell::new(Vec::new());
		let result = attach_all(
			&HISTORY_EVENTS,
			|event| if event == POP_STATE_EVENT { Err(event) } else { Ok(()) },
			|event| removed.borrow_mut().push(event),
		);

		assert_eq!(result, Err(POP_STATE_EVENT));
		assert_eq!(*removed.borrow(), vec![PUSH_STATE_EVENT]);
	}
}
