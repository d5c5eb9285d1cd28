//! Location parsing.
//!
//! This module turns a raw href (`pathname` + optional `?search` + optional
//! `#hash`) into a structured [`Location`] carrying its [`HistoryState`].
//!
//! # Example
//!
//! ```
//! use reinhardt_history::parse_location;
//!
//! let location = parse_location("/a/b?x=1#top", None);
//! assert_eq!(location.pathname(), "/a/b");
//! assert_eq!(location.search(), "?x=1");
//! assert_eq!(location.hash(), "#top");
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// State attached to a history entry.
///
/// The `key` is assigned on every push and replace and distinguishes entries
/// that share the same URL. Caller data is flattened next to the reserved
/// fields when the state is serialized into a native history entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryState {
	/// Generator-assigned entry key.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	key: Option<String>,
	/// Key of a masked location, if any.
	#[serde(rename = "__tempKey", default, skip_serializing_if = "Option::is_none")]
	temp_key: Option<String>,
	/// Masked location shown instead of the real one, if any.
	#[serde(
		rename = "__tempLocation",
		default,
		skip_serializing_if = "Option::is_none"
	)]
	temp_location: Option<Box<Location>>,
	/// Caller-provided state.
	#[serde(flatten)]
	data: Map<String, Value>,
}

impl HistoryState {
	/// Creates an empty state.
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds a caller-provided value.
	pub fn with_data(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
		self.data.insert(name.into(), value.into());
		self
	}

	/// Sets the masked location and its key.
	pub fn with_temp_location(mut self, location: Location, temp_key: impl Into<String>) -> Self {
		self.temp_location = Some(Box::new(location));
		self.temp_key = Some(temp_key.into());
		self
	}

	/// Returns the entry key.
	pub fn key(&self) -> Option<&str> {
		self.key.as_deref()
	}

	/// Returns the masked location key.
	pub fn temp_key(&self) -> Option<&str> {
		self.temp_key.as_deref()
	}

	/// Returns the masked location.
	pub fn temp_location(&self) -> Option<&Location> {
		self.temp_location.as_deref()
	}

	/// Returns a caller-provided value.
	pub fn get(&self, name: &str) -> Option<&Value> {
		self.data.get(name)
	}

	/// Returns all caller-provided values.
	pub fn data(&self) -> &Map<String, Value> {
		&self.data
	}

	pub(crate) fn set_key(&mut self, key: String) {
		self.key = Some(key);
	}
}

/// Structured view of a navigable address.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
	href: String,
	pathname: String,
	search: String,
	hash: String,
	state: HistoryState,
}

impl Location {
	/// Parses an href with an empty state.
	pub fn new(href: &str) -> Self {
		parse_location(href, None)
	}

	/// Returns the full href (`pathname + search + hash`).
	pub fn href(&self) -> &str {
		&self.href
	}

	/// Returns the path portion.
	pub fn pathname(&self) -> &str {
		&self.pathname
	}

	/// Returns the query portion including the leading `?`, or `""`.
	pub fn search(&self) -> &str {
		&self.search
	}

	/// Returns the fragment including the leading `#`, or `""`.
	pub fn hash(&self) -> &str {
		&self.hash
	}

	/// Returns the entry state.
	pub fn state(&self) -> &HistoryState {
		&self.state
	}
}

/// Parses `href` into a [`Location`].
///
/// A `?` that appears after the first `#` belongs to the hash and is never
/// treated as a query separator. Parsing never fails: a missing `?` or `#`
/// yields an empty `search` or `hash`.
pub fn parse_location(href: &str, state: Option<HistoryState>) -> Location {
	let hash_index = href.find('#');
	let search_index = href
		.find('?')
		.filter(|&search| hash_index.is_none_or(|hash| search < hash));

	let pathname_end = search_index.or(hash_index).unwrap_or(href.len());
	let search = search_index
		.map(|start| &href[start..hash_index.unwrap_or(href.len())])
		.unwrap_or_default();
	let hash = hash_index.map(|start| &href[start..]).unwrap_or_default();

	Location {
		href: href.to_string(),
		pathname: href[..pathname_end].to_string(),
		search: search.to_string(),
		hash: hash.to_string(),
		state: state.unwrap_or_default(),
	}
}
