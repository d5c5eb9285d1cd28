//! History configuration.
//!
//! Options are plain `serde` structs so they can be loaded from the same
//! settings files (TOML, JSON) as the rest of an application.

use serde::{Deserialize, Serialize};

fn default_entries() -> Vec<String> {
	vec!["/".to_string()]
}

/// Options for [`create_memory_history`](crate::create_memory_history).
///
/// # Example
///
/// ```
/// use reinhardt_history::MemoryHistoryOptions;
///
/// let options: MemoryHistoryOptions =
/// 	serde_json::from_str(r#"{"initial_entries": ["/", "/about"], "initial_index": 0}"#)
/// 		.unwrap();
/// assert_eq!(options.resolved_index(), 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryHistoryOptions {
	/// Entries the history starts with.
	#[serde(default = "default_entries")]
	pub initial_entries: Vec<String>,
	/// Index of the current entry. Defaults to the last entry.
	#[serde(default)]
	pub initial_index: Option<usize>,
}

impl Default for MemoryHistoryOptions {
	fn default() -> Self {
		Self {
			initial_entries: default_entries(),
			initial_index: None,
		}
	}
}

impl MemoryHistoryOptions {
	/// Creates options starting at `entries`.
	pub fn new<I, S>(entries: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			initial_entries: entries.into_iter().map(Into::into).collect(),
			initial_index: None,
		}
	}

	/// Sets the current entry index.
	pub fn with_initial_index(mut self, index: usize) -> Self {
		self.initial_index = Some(index);
		self
	}

	/// Returns the entries, substituting `["/"]` for an empty list.
	pub fn resolved_entries(&self) -> Vec<String> {
		if self.initial_entries.is_empty() {
			default_entries()
		} else {
			self.initial_entries.clone()
		}
	}

	/// Returns the starting index clamped to the resolved entries.
	pub fn resolved_index(&self) -> usize {
		let last = self.resolved_entries().len() - 1;
		self.initial_index.map_or(last, |index| index.min(last))
	}
}
