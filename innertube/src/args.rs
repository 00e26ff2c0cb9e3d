use crate::Completion;

/// Converts a call's positional arguments into the transport's argument list.
pub trait IntoArgs<V> {
	fn into_args(self) -> Vec<V>;
}

impl<V> IntoArgs<V> for () {
	fn into_args(self) -> Vec<V> {
		Vec::new()
	}
}

impl<V> IntoArgs<V> for Vec<V> {
	fn into_args(self) -> Vec<V> {
		self
	}
}

impl<V, const N: usize> IntoArgs<V> for [V; N] {
	fn into_args(self) -> Vec<V> {
		self.into()
	}
}

macro_rules! tuple {
	($($t:ident),+) => {
		impl<V, $($t: Into<V>),+> IntoArgs<V> for ($($t,)+) {
			#[allow(non_snake_case)]
			fn into_args(self) -> Vec<V> {
				let ($($t,)+) = self;
				vec![$($t.into()),+]
			}
		}
	};
}

tuple!(A);
tuple!(A, B);
tuple!(A, B, C);
tuple!(A, B, C, D);
tuple!(A, B, C, D, E);
tuple!(A, B, C, D, E, F);

/// The optional success/error pair attached to an outgoing call.
///
/// If either handler is set, the transport receives both and the missing one
/// does nothing. With neither set the call goes out without handlers.
pub struct Handlers<V> {
	success: Option<Box<dyn FnOnce(Vec<V>)>>,
	error: Option<Box<dyn FnOnce(V)>>,
}

impl<V: 'static> Handlers<V> {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn success<F: FnOnce(Vec<V>) + 'static>(mut self, f: F) -> Self {
		self.success = Some(Box::new(f));
		self
	}

	pub fn error<F: FnOnce(V) + 'static>(mut self, f: F) -> Self {
		self.error = Some(Box::new(f));
		self
	}

	pub fn is_empty(&self) -> bool {
		self.success.is_none() && self.error.is_none()
	}

	pub(crate) fn into_completion(self) -> Option<Completion<V>> {
		if self.is_empty() {
			return None;
		}

		let success = self.success.unwrap_or_else(|| Box::new(|_| {}));
		let error = self.error.unwrap_or_else(|| Box::new(|_| {}));
		Some(Completion::from_boxed(success, error))
	}
}

impl<V> Default for Handlers<V> {
	fn default() -> Self {
		Self {
			success: None,
			error: None,
		}
	}
}

#[cfg(test)]
mod test {
	use std::cell::Cell;
	use std::rc::Rc;

	use super::*;

	#[test]
	fn tuples() {
		assert_eq!(IntoArgs::<i64>::into_args(()), Vec::<i64>::new());
		assert_eq!(IntoArgs::<i64>::into_args((2012, 1, 1)), vec![2012i64, 1, 1]);
		assert_eq!(IntoArgs::<String>::into_args(("a", "b")), vec!["a".to_string(), "b".to_string()]);
		assert_eq!([1i64, 2].into_args(), vec![1, 2]);
	}

	#[test]
	fn empty_handlers() {
		assert!(Handlers::<i64>::new().into_completion().is_none());
	}

	#[test]
	fn missing_error_is_noop() {
		let hit = Rc::new(Cell::new(false));
		let flag = hit.clone();

		let completion = Handlers::<i64>::new()
			.success(move |_| flag.set(true))
			.into_completion()
			.unwrap();

		completion.fail(5);
		assert!(!hit.get());
	}
}
