//! Error types for history navigation.

/// Error type for navigation operations.
#[derive(Debug, thiserror::Error)]
pub enum NavigationError {
	/// The host navigation primitive rejected the mutation.
	#[error("Navigation failed: {0}")]
	Backend(String),
	/// A required host object (window, history) is not available.
	#[error("Navigation environment unavailable: {0}")]
	Unavailable(&'static str),
	/// The navigation state could not be serialized or deserialized.
	#[error("Invalid navigation state: {0}")]
	State(#[from] serde_json::Error),
	/// The history was disposed and no longer accepts navigation.
	#[error("History has been disposed")]
	Disposed,
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_navigation_error_display() {
		assert_eq!(
			NavigationError::Backend("SecurityError".to_string()).to_string(),
			"Navigation failed: SecurityError"
		);
		assert_eq!(
			NavigationError::Unavailable("window").to_string(),
			"Navigation environment unavailable: window"
		);
		assert_eq!(
			NavigationError::Disposed.to_string(),
			"History has been disposed"
		);
	}

	#[rstest]
	fn test_navigation_error_from_serde() {
		let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
		let err = NavigationError::from(err);
		assert!(matches!(err, NavigationError::State(_)));
		assert!(err.to_string().starts_with("Invalid navigation state"));
	}
}
