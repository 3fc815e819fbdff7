use core::hash::Hash;
use std::collections::HashMap;

/// Hands out dense ids, the same id for the same key.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct IdGenerator<T: Hash + Eq> {
	storage: HashMap<T, u32>,
	counter: u32,
}

impl<T: Hash + Eq> Default for IdGenerator<T> {
	fn default() -> Self {
		IdGenerator {
			storage: HashMap::new(),
			counter: 0,
		}
	}
}

impl<T: Hash + Eq> IdGenerator<T> {
	pub fn get_or_add_id(&mut self, key: T) -> u32 {
		let storage = &mut self.storage;
		let counter = &mut self.counter;
		*storage.entry(key).or_insert_with(|| {
			let id = *counter;
			*counter += 1;
			id
		})
	}

	pub fn len(&self) -> usize {
		self.counter as usize
	}

	pub fn is_empty(&self) -> bool {
		self.counter == 0
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[derive(Hash, Eq, PartialEq)]
	enum Key {
		A,
		B,
	}

	#[test]
	fn keys_without_default() {
		let mut ids: IdGenerator<Key> = IdGenerator::default();
		assert!(ids.is_empty());
		assert_eq!(ids.get_or_add_id(Key::A), 0);
		assert_eq!(ids.get_or_add_id(Key::B), 1);
		assert_eq!(ids.get_or_add_id(Key::A), 0);
		assert_eq!(ids.len(), 2);
	}
}
