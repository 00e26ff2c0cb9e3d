use std::fmt;
use std::rc::Weak;

use crate::messaging::Inner;
use crate::Endpoint;

/// Delivers calls between two endpoints.
///
/// Implementations own the actual cross-window plumbing (handshake, framing,
/// serialization). The facade only decides what to call and with which
/// arguments.
pub trait Transport<V> {
	/// Invoke `channel` on the remote side with `method` and its positional arguments.
	///
	/// The argument list is always present, even when empty.
	fn call(&self, channel: &str, method: &str, args: Vec<V>, completion: Option<Completion<V>>);

	/// Release everything the transport holds.
	fn destroy(&self);
}

/// Builds a transport for an endpoint.
///
/// The transport keeps the [Link] to signal readiness and to deliver inbound calls.
pub trait Connect<V> {
	type Transport: Transport<V> + 'static;
	type Error;

	fn connect(self, endpoint: &Endpoint, link: Link<V>) -> Result<Self::Transport, Self::Error>;
}

impl<V, T, E, F> Connect<V> for F
where
	F: FnOnce(&Endpoint, Link<V>) -> Result<T, E>,
	T: Transport<V> + 'static,
{
	type Transport = T;
	type Error = E;

	fn connect(self, endpoint: &Endpoint, link: Link<V>) -> Result<T, E> {
		self(endpoint, link)
	}
}

/// The success/error pair travelling with a call.
pub struct Completion<V> {
	success: Box<dyn FnOnce(Vec<V>)>,
	error: Box<dyn FnOnce(V)>,
}

impl<V> Completion<V> {
	pub fn new<S, E>(success: S, error: E) -> Self
	where
		S: FnOnce(Vec<V>) + 'static,
		E: FnOnce(V) + 'static,
	{
		Self::from_boxed(Box::new(success), Box::new(error))
	}

	pub(crate) fn from_boxed(success: Box<dyn FnOnce(Vec<V>)>, error: Box<dyn FnOnce(V)>) -> Self {
		Self { success, error }
	}

	/// Report the returned value(s) of the call.
	pub fn succeed(self, values: Vec<V>) {
		(self.success)(values)
	}

	/// Report a failed call.
	pub fn fail(self, error: V) {
		(self.error)(error)
	}

	pub fn into_parts(self) -> (Box<dyn FnOnce(Vec<V>)>, Box<dyn FnOnce(V)>) {
		(self.success, self.error)
	}
}

impl<V> fmt::Debug for Completion<V> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Completion").finish_non_exhaustive()
	}
}

/// The transport's handle back into the messaging facade.
///
/// It does not keep the facade alive; once every [crate::Innertube] handle is
/// dropped, signals through the link are ignored.
pub struct Link<V> {
	inner: Weak<Inner<V>>,
}

impl<V: 'static> Link<V> {
	pub(crate) fn new(inner: Weak<Inner<V>>) -> Self {
		Self { inner }
	}

	/// The handshake completed. Only the first signal has an effect.
	pub fn ready(&self) {
		match self.inner.upgrade() {
			Some(inner) => inner.signal_ready(),
			None => tracing::trace!("ready signal after messaging was dropped"),
		}
	}

	/// Route an inbound call on `channel` into the receive table.
	///
	/// `reply` is the caller's completion, if the transport has one.
	pub fn deliver(&self, channel: &str, method: &str, args: Vec<V>, reply: Option<Completion<V>>) {
		let Some(inner) = self.inner.upgrade() else {
			tracing::trace!(channel, method, "inbound call after messaging was dropped");
			return;
		};

		if let Err(err) = inner.deliver(channel, method, args, reply) {
			tracing::warn!(%err, channel, method, "dropping inbound call");
		}
	}
}

impl<V> Clone for Link<V> {
	fn clone(&self) -> Self {
		Self {
			inner: self.inner.clone(),
		}
	}
}
