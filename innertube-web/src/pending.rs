use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use innertube::Completion;

struct Entry<V, K> {
	completion: Completion<V>,

	// Whatever the remote side holds on to, usually the JS closures.
	_keep: K,
}

type Calls<V, K> = RefCell<HashMap<u64, Entry<V, K>>>;

/// Outgoing calls waiting for the remote to settle them.
///
/// Each entry owns the objects handed to the remote side. Settling either half
/// drops the whole entry, and dropping the table drops everything still pending.
pub(crate) struct Pending<V, K> {
	calls: Rc<Calls<V, K>>,
	next: Cell<u64>,
}

/// Settles one pending call.
pub(crate) struct Settle<V, K> {
	calls: Weak<Calls<V, K>>,
	id: u64,
}

impl<V, K> Pending<V, K> {
	pub fn new() -> Self {
		Self {
			calls: Rc::new(RefCell::new(HashMap::new())),
			next: Cell::new(0),
		}
	}

	/// Reserve a slot; the returned handle can be captured before [Self::insert].
	pub fn reserve(&self) -> Settle<V, K> {
		let id = self.next.get();
		self.next.set(id + 1);

		Settle {
			calls: Rc::downgrade(&self.calls),
			id,
		}
	}

	pub fn insert(&self, settle: &Settle<V, K>, completion: Completion<V>, keep: K) {
		self.calls.borrow_mut().insert(
			settle.id,
			Entry {
				completion,
				_keep: keep,
			},
		);
	}

	/// Forget a call without settling it.
	pub fn cancel(&self, settle: &Settle<V, K>) {
		let entry = self.calls.borrow_mut().remove(&settle.id);
		drop(entry);
	}

	pub fn clear(&self) {
		let entries = std::mem::take(&mut *self.calls.borrow_mut());
		drop(entries);
	}

	pub fn len(&self) -> usize {
		self.calls.borrow().len()
	}
}

impl<V, K> Settle<V, K> {
	pub fn succeed(&self, values: Vec<V>) {
		if let Some(entry) = self.take() {
			entry.completion.succeed(values);
		}
	}

	pub fn fail(&self, error: V) {
		if let Some(entry) = self.take() {
			entry.completion.fail(error);
		}
	}

	fn take(&self) -> Option<Entry<V, K>> {
		let calls = self.calls.upgrade()?;
		let entry = calls.borrow_mut().remove(&self.id);
		if entry.is_none() {
			tracing::trace!(id = self.id, "call already settled");
		}
		entry
	}
}

impl<V, K> Clone for Settle<V, K> {
	fn clone(&self) -> Self {
		Self {
			calls: self.calls.clone(),
			id: self.id,
		}
	}
}

#[cfg(test)]
mod test {
	use super::*;

	// Stands in for the closures: counts how many are still alive.
	fn keep(alive: &Rc<()>) -> [Rc<()>; 2] {
		[alive.clone(), alive.clone()]
	}

	fn completion(log: &Rc<RefCell<Vec<String>>>) -> Completion<i64> {
		let (ok, err) = (log.clone(), log.clone());
		Completion::new(
			move |values: Vec<i64>| ok.borrow_mut().push(format!("ok {values:?}")),
			move |code: i64| err.borrow_mut().push(format!("err {code}")),
		)
	}

	#[test]
	fn success_releases_both_halves() {
		let pending = Pending::new();
		let alive = Rc::new(());
		let log = Rc::new(RefCell::new(Vec::new()));

		let settle = pending.reserve();
		pending.insert(&settle, completion(&log), keep(&alive));
		assert_eq!(Rc::strong_count(&alive), 3);

		settle.succeed(vec![42]);
		assert_eq!(Rc::strong_count(&alive), 1);
		assert_eq!(pending.len(), 0);

		// The other half firing late is a no-op.
		settle.fail(1);
		assert_eq!(*log.borrow(), vec!["ok [42]".to_string()]);
	}

	#[test]
	fn error_releases_both_halves() {
		let pending = Pending::new();
		let alive = Rc::new(());
		let log = Rc::new(RefCell::new(Vec::new()));

		let settle = pending.reserve();
		pending.insert(&settle, completion(&log), keep(&alive));

		settle.fail(7);
		settle.succeed(vec![1]);

		assert_eq!(Rc::strong_count(&alive), 1);
		assert_eq!(*log.borrow(), vec!["err 7".to_string()]);
	}

	#[test]
	fn unanswered_calls_released_on_clear_and_drop() {
		let pending = Pending::new();
		let alive = Rc::new(());
		let log = Rc::new(RefCell::new(Vec::new()));

		for _ in 0..3 {
			let settle = pending.reserve();
			pending.insert(&settle, completion(&log), keep(&alive));
		}
		assert_eq!(pending.len(), 3);

		pending.clear();
		assert_eq!(Rc::strong_count(&alive), 1);

		let settle = pending.reserve();
		pending.insert(&settle, completion(&log), keep(&alive));
		drop(pending);

		assert_eq!(Rc::strong_count(&alive), 1);
		settle.succeed(vec![1]);
		assert!(log.borrow().is_empty());
	}

	#[test]
	fn cancel() {
		let pending = Pending::new();
		let alive = Rc::new(());
		let log = Rc::new(RefCell::new(Vec::new()));

		let settle = pending.reserve();
		pending.insert(&settle, completion(&log), keep(&alive));
		pending.cancel(&settle);

		assert_eq!(Rc::strong_count(&alive), 1);
		settle.succeed(vec![1]);
		assert!(log.borrow().is_empty());
	}
}
