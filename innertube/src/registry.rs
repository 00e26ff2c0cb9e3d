use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::hash::Hash;

use crate::{Connect, Endpoint, Innertube};

/// Shared messaging instances, keyed by an explicit handle.
///
/// The first connection made for a key wins: later requests for the same key
/// get the existing instance and their endpoint is ignored.
pub struct Registry<K, V> {
	instances: HashMap<K, Innertube<V>>,
}

impl<K: Eq + Hash, V: 'static> Registry<K, V> {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn get(&self, key: &K) -> Option<Innertube<V>> {
		self.instances.get(key).cloned()
	}

	pub fn get_or_connect<C: Connect<V>>(
		&mut self,
		key: K,
		endpoint: &Endpoint,
		connector: C,
	) -> Result<Innertube<V>, C::Error> {
		match self.instances.entry(key) {
			Entry::Occupied(entry) => {
				tracing::trace!("reusing registered messaging");
				Ok(entry.get().clone())
			}
			Entry::Vacant(entry) => {
				let messaging = Innertube::new(endpoint, connector)?;
				Ok(entry.insert(messaging).clone())
			}
		}
	}

	/// Forget the instance for `key`. It is not destroyed.
	pub fn remove(&mut self, key: &K) -> Option<Innertube<V>> {
		self.instances.remove(key)
	}

	pub fn len(&self) -> usize {
		self.instances.len()
	}

	pub fn is_empty(&self) -> bool {
		self.instances.is_empty()
	}
}

impl<K, V> Default for Registry<K, V> {
	fn default() -> Self {
		Self {
			instances: HashMap::new(),
		}
	}
}

#[cfg(test)]
mod test {
	use std::cell::Cell;
	use std::rc::Rc;

	use super::*;
	use crate::mock::MockTransport;

	#[test]
	fn first_connection_wins() {
		let mut registry = Registry::new();

		let first = MockTransport::<i64>::new();
		let second = MockTransport::<i64>::new();

		let a = registry.get_or_connect("default", &Endpoint::new().with_remote("a"), first.clone()).unwrap();
		let b = registry.get_or_connect("default", &Endpoint::new().with_remote("b"), second.clone()).unwrap();

		assert_eq!(first.connects(), 1);
		assert_eq!(second.connects(), 0);
		assert_eq!(first.endpoint().unwrap().remote.as_deref(), Some("a"));

		// Both handles drive the same transport.
		b.send("m", ());
		assert_eq!(first.take_calls().len(), 1);

		let hit = Rc::new(Cell::new(false));
		let flag = hit.clone();
		a.receive("m", move |_| flag.set(true));
		first.deliver("m", vec![]);
		assert!(hit.get());
	}

	#[test]
	fn keys_are_independent() {
		let mut registry = Registry::new();

		let left = MockTransport::<i64>::new();
		let right = MockTransport::<i64>::new();

		registry.get_or_connect(1, &Endpoint::new(), left.clone()).unwrap();
		registry.get_or_connect(2, &Endpoint::new(), right.clone()).unwrap();
		assert_eq!(registry.len(), 2);

		registry.get(&2).unwrap().send("m", ());
		assert!(left.take_calls().is_empty());
		assert_eq!(right.take_calls().len(), 1);

		assert!(registry.remove(&1).is_some());
		assert!(registry.get(&1).is_none());
		assert!(!left.destroyed());
	}
}
