//! Property-based tests for location parsing

#![cfg(not(target_arch = "wasm32"))]

use proptest::prelude::*;
use reinhardt_history::parse_location;

proptest! {
	/// Tests that the parsed parts always reassemble into the original href
	#[test]
	fn test_parse_location_reassembles(href in "[/a-z0-9?#=&.%-]{0,40}") {
		let location = parse_location(&href, None);
		let rebuilt = format!("{}{}{}", location.pathname(), location.search(), location.hash());
		prop_assert_eq!(rebuilt, href.clone());
		prop_assert_eq!(location.href(), href.as_str());
	}

	/// Tests that search never contains '#' and hash always starts with it
	#[test]
	fn test_parse_location_part_shapes(href in "[/a-z?#=]{0,30}") {
		let location = parse_location(&href, None);
		prop_assert!(!location.pathname().contains('?') && !location.pathname().contains('#'));
		prop_assert!(!location.search().contains('#'));
		prop_assert!(location.search().is_empty() || location.search().starts_with('?'));
		prop_assert!(location.hash().is_empty() || location.hash().starts_with('#'));
	}

	/// Tests that a '?' inside the fragment is never split out as a query
	#[test]
	fn test_parse_location_query_inside_hash(path in "/[a-z]{0,8}", fragment in "[a-z?=]{0,12}") {
		let href = format!("{}#{}", path, fragment);
		let location = parse_location(&href, None);
		prop_assert_eq!(location.pathname(), path.as_str());
		prop_assert_eq!(location.search(), "");
		prop_assert_eq!(location.hash(), format!("#{}", fragment));
	}
}
