//! History entry key generation.
//!
//! Keys are a per-thread random prefix followed by a monotonically increasing
//! counter, both rendered in base 36. The counter makes every key unique within
//! a session; the prefix keeps keys from different sessions apart.

use rand::Rng;
use std::cell::Cell;

const SEED_WIDTH: usize = 5;
const SEED_SPACE: u64 = 36u64.pow(SEED_WIDTH as u32);

thread_local! {
	static SEED: u64 = rand::thread_rng().gen_range(0..SEED_SPACE);
	static COUNTER: Cell<u64> = const { Cell::new(0) };
}

/// Creates a new unique entry key.
pub fn create_key() -> String {
	let seed = SEED.with(|seed| *seed);
	let count = COUNTER.with(|counter| {
		let next = counter.get().wrapping_add(1);
		counter.set(next);
		next
	});

	let mut key = to_base36(seed);
	while key.len() < SEED_WIDTH {
		key.insert(0, '0');
	}
	key.push_str(&to_base36(count));
	key
}

fn to_base36(mut value: u64) -> String {
	const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

	if value == 0 {
		return "0".to_string();
	}

	let mut buf = Vec::new();
	while value > 0 {
		buf.push(DIGITS[(value % 36) as usize]);
		value /= 36;
	}
	buf.reverse();
	String::from_utf8(buf).unwrap_or_default()
}
