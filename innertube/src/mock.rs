use std::cell::{Cell, RefCell};
use std::convert::Infallible;
use std::rc::Rc;

use crate::{Completion, Connect, Endpoint, Link, Transport};

pub struct Call<V> {
	pub channel: String,
	pub method: String,
	pub args: Vec<V>,
	pub completion: Option<Completion<V>>,
}

/// Records outgoing calls and lets a test play the remote side.
pub struct MockTransport<V> {
	calls: Rc<RefCell<Vec<Call<V>>>>,
	link: Rc<RefCell<Option<Link<V>>>>,
	endpoint: Rc<RefCell<Option<Endpoint>>>,
	connects: Rc<Cell<usize>>,
	destroyed: Rc<Cell<bool>>,
	ready_on_connect: bool,
}

impl<V: 'static> MockTransport<V> {
	pub fn new() -> Self {
		Self {
			calls: Default::default(),
			link: Default::default(),
			endpoint: Default::default(),
			connects: Default::default(),
			destroyed: Default::default(),
			ready_on_connect: false,
		}
	}

	/// A transport whose handshake completes while connecting.
	pub fn ready_on_connect() -> Self {
		Self {
			ready_on_connect: true,
			..Self::new()
		}
	}

	pub fn link(&self) -> Link<V> {
		self.link.borrow().clone().expect("not connected")
	}

	pub fn signal_ready(&self) {
		self.link().ready();
	}

	/// Deliver an inbound call on the default `message` channel.
	pub fn deliver(&self, method: &str, args: Vec<V>) {
		self.link().deliver("message", method, args, None);
	}

	pub fn take_calls(&self) -> Vec<Call<V>> {
		std::mem::take(&mut *self.calls.borrow_mut())
	}

	pub fn endpoint(&self) -> Option<Endpoint> {
		self.endpoint.borrow().clone()
	}

	pub fn connects(&self) -> usize {
		self.connects.get()
	}

	pub fn destroyed(&self) -> bool {
		self.destroyed.get()
	}
}

impl<V> Clone for MockTransport<V> {
	fn clone(&self) -> Self {
		Self {
			calls: self.calls.clone(),
			link: self.link.clone(),
			endpoint: self.endpoint.clone(),
			connects: self.connects.clone(),
			destroyed: self.destroyed.clone(),
			ready_on_connect: self.ready_on_connect,
		}
	}
}

impl<V> Transport<V> for MockTransport<V> {
	fn call(&self, channel: &str, method: &str, args: Vec<V>, completion: Option<Completion<V>>) {
		self.calls.borrow_mut().push(Call {
			channel: channel.to_string(),
			method: method.to_string(),
			args,
			completion,
		});
	}

	fn destroy(&self) {
		self.destroyed.set(true);
	}
}

impl<V: 'static> Connect<V> for MockTransport<V> {
	type Transport = Self;
	type Error = Infallible;

	fn connect(self, endpoint: &Endpoint, link: Link<V>) -> Result<Self, Infallible> {
		self.connects.set(self.connects.get() + 1);
		*self.endpoint.borrow_mut() = Some(endpoint.clone());
		*self.link.borrow_mut() = Some(link.clone());

		if self.ready_on_connect {
			link.ready();
		}

		Ok(self)
	}
}
