use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::{Completion, Connect, Endpoint, Error, Handlers, Interface, IntoArgs, Link, Result, Transport};

/// The version answered by the version shim.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The name of the call answered by the version shim.
pub const VERSION_METHOD: &str = "version";

type Receiver<V> = Rc<dyn Fn(&[V])>;
type Answerer<V> = Rc<dyn Fn(&[V]) -> Option<V>>;

pub(crate) struct Inner<V> {
	state: RefCell<State<V>>,
}

struct State<V> {
	transport: Option<Rc<dyn Transport<V>>>,
	interface: Interface,

	ready: bool,
	destroyed: bool,

	ready_callbacks: Vec<Box<dyn FnOnce()>>,
	receivers: HashMap<String, Vec<Receiver<V>>>,
	answerers: HashMap<String, Answerer<V>>,
	method_missing: Vec<Rc<dyn Fn()>>,

	version: Option<Rc<dyn Fn() -> V>>,
}

/// A messaging endpoint: named calls out, per-name receivers in.
///
/// Cloning is cheap and every clone refers to the same endpoint. Callbacks are
/// never run while internal state is borrowed, so they may call back into the
/// endpoint.
pub struct Innertube<V> {
	inner: Rc<Inner<V>>,
}

impl<V: 'static> Innertube<V> {
	/// Connect a new endpoint.
	///
	/// The endpoint is copied; the transport gets the copy and a [Link] back to
	/// this instance.
	pub fn new<C: Connect<V>>(endpoint: &Endpoint, connector: C) -> std::result::Result<Self, C::Error> {
		let endpoint = endpoint.clone();

		let inner = Rc::new(Inner {
			state: RefCell::new(State {
				transport: None,
				interface: endpoint.interface.clone(),
				ready: false,
				destroyed: false,
				ready_callbacks: Vec::new(),
				receivers: HashMap::new(),
				answerers: HashMap::new(),
				method_missing: Vec::new(),
				version: None,
			}),
		});

		// The transport may signal readiness before it is returned.
		let transport = connector.connect(&endpoint, Link::new(Rc::downgrade(&inner)))?;
		inner.state.borrow_mut().transport = Some(Rc::new(transport));

		tracing::debug!(remote = ?endpoint.remote, channel = %endpoint.interface.remote, "connected");

		Ok(Self { inner })
	}

	/// Answer inbound `version` calls with [VERSION], ahead of any receiver.
	pub fn with_version_shim(self) -> Self
	where
		V: From<&'static str>,
	{
		self.inner.state.borrow_mut().version = Some(Rc::new(|| V::from(VERSION)));
		self
	}

	pub fn is_ready(&self) -> bool {
		self.inner.state.borrow().ready
	}

	/// Run `callback` once the transport is ready, or right away if it already is.
	pub fn ready<F: FnOnce() + 'static>(&self, callback: F) -> &Self {
		let ready = self.inner.state.borrow().ready;
		match ready {
			true => callback(),
			false => self.inner.state.borrow_mut().ready_callbacks.push(Box::new(callback)),
		}

		self
	}

	/// Call `method` on the remote side.
	pub fn send<A: IntoArgs<V>>(&self, method: &str, args: A) -> &Self {
		self.call(method, args.into_args(), None)
	}

	/// Call `method` on the remote side with a success and/or error handler.
	pub fn send_with<A: IntoArgs<V>>(&self, method: &str, args: A, handlers: Handlers<V>) -> &Self {
		self.call(method, args.into_args(), handlers.into_completion())
	}

	/// Call `method` and dispatch its result to the receivers of `method`.
	///
	/// The result is indistinguishable from the remote calling `method` itself.
	pub fn request<A: IntoArgs<V>>(&self, method: &str, args: A) -> &Self {
		let inner = Rc::downgrade(&self.inner);
		let name = method.to_string();

		let handlers = Handlers::new().success(move |values: Vec<V>| match inner.upgrade() {
			Some(inner) => {
				if let Err(err) = inner.dispatch(&name, &values) {
					tracing::debug!(%err, method = %name, "dropping response");
				}
			}
			None => tracing::trace!(method = %name, "response after messaging was dropped"),
		});

		self.send_with(method, args, handlers)
	}

	/// Run `callback` with the arguments of every inbound `method` call.
	pub fn receive<F: Fn(&[V]) + 'static>(&self, method: &str, callback: F) -> &Self {
		self.inner
			.state
			.borrow_mut()
			.receivers
			.entry(method.to_string())
			.or_default()
			.push(Rc::new(callback));
		self
	}

	/// Answer inbound `method` calls with the value returned by `callback`.
	///
	/// An answered method is not passed to the receivers of the same name.
	/// Returning `None` sends no reply. Registering again replaces the answerer.
	pub fn answer<F: Fn(&[V]) -> Option<V> + 'static>(&self, method: &str, callback: F) -> &Self {
		self.inner
			.state
			.borrow_mut()
			.answerers
			.insert(method.to_string(), Rc::new(callback));
		self
	}

	/// Run `callback` for every inbound call without a receiver.
	pub fn method_missing<F: Fn() + 'static>(&self, callback: F) -> &Self {
		self.inner.state.borrow_mut().method_missing.push(Rc::new(callback));
		self
	}

	/// Tear down the transport.
	///
	/// Every clone is affected. Later calls are logged and ignored.
	pub fn destroy(&self) {
		let transport = {
			let mut state = self.inner.state.borrow_mut();
			state.destroyed = true;
			state.ready_callbacks.clear();
			state.receivers.clear();
			state.answerers.clear();
			state.method_missing.clear();
			state.transport.take()
		};

		match transport {
			Some(transport) => {
				tracing::debug!("destroying transport");
				transport.destroy();
			}
			None => tracing::warn!(err = %Error::Destroyed, "destroy called twice"),
		}
	}

	fn call(&self, method: &str, args: Vec<V>, completion: Option<Completion<V>>) -> &Self {
		if let Err(err) = self.inner.call(method, args, completion) {
			tracing::warn!(%err, method, "dropping outgoing call");
		}
		self
	}
}

impl<V> Clone for Innertube<V> {
	fn clone(&self) -> Self {
		Self {
			inner: self.inner.clone(),
		}
	}
}

impl<V: 'static> Inner<V> {
	fn call(&self, method: &str, args: Vec<V>, completion: Option<Completion<V>>) -> Result<()> {
		let (transport, channel) = {
			let state = self.state.borrow();
			let transport = state.transport.clone().ok_or(Error::Destroyed)?;
			(transport, state.interface.remote.clone())
		};

		tracing::trace!(%channel, method, args = args.len(), "calling remote");
		transport.call(&channel, method, args, completion);

		Ok(())
	}

	pub(crate) fn signal_ready(&self) {
		let callbacks = {
			let mut state = self.state.borrow_mut();
			if state.ready || state.destroyed {
				tracing::trace!("ignoring repeated ready signal");
				return;
			}

			state.ready = true;
			std::mem::take(&mut state.ready_callbacks)
		};

		tracing::debug!(callbacks = callbacks.len(), "ready");

		for callback in callbacks {
			// A previous callback may have destroyed us.
			if self.state.borrow().destroyed {
				tracing::trace!("skipping ready callbacks after destroy");
				break;
			}

			callback();
		}
	}

	pub(crate) fn deliver(&self, channel: &str, method: &str, args: Vec<V>, reply: Option<Completion<V>>) -> Result<()> {
		let answerer = {
			let state = self.state.borrow();
			if state.destroyed {
				return Err(Error::Destroyed);
			}

			if !state.interface.exposes(channel) {
				return Err(Error::UnknownChannel(channel.to_string()));
			}

			match (method, &state.version) {
				(VERSION_METHOD, Some(version)) => {
					let version = version.clone();
					Some(Rc::new(move |_: &[V]| Some(version())) as Answerer<V>)
				}
				_ => state.answerers.get(method).cloned(),
			}
		};

		if let Some(answerer) = answerer {
			match (answerer(&args), reply) {
				(Some(value), Some(reply)) => reply.succeed(vec![value]),
				(Some(_), None) => tracing::trace!(method, "no reply handler for answer"),
				(None, _) => {}
			}
			return Ok(());
		}

		self.dispatch(method, &args)
	}

	/// The single funnel for inbound calls and request responses.
	fn dispatch(&self, method: &str, args: &[V]) -> Result<()> {
		let dispatch = {
			let state = self.state.borrow();
			if state.destroyed {
				return Err(Error::Destroyed);
			}

			match state.receivers.get(method) {
				Some(receivers) => Dispatch::Receivers(receivers.clone()),
				None => Dispatch::Missing(state.method_missing.clone()),
			}
		};

		match dispatch {
			Dispatch::Receivers(receivers) => {
				for receiver in receivers {
					receiver(args);
				}
			}
			Dispatch::Missing(hooks) => {
				tracing::debug!(method, hooks = hooks.len(), "method missing");
				for hook in hooks {
					hook();
				}
			}
		}

		Ok(())
	}
}

enum Dispatch<V> {
	Receivers(Vec<Receiver<V>>),
	Missing(Vec<Rc<dyn Fn()>>),
}
